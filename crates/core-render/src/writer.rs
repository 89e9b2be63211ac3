//! Terminal writer abstraction.
//!
//! Callers build a short-lived list of primitive commands and flush it once
//! into any `std::io::Write` sink. Commands preserve ordering; nothing is
//! written until [`Writer::flush_into`].

use anyhow::Result;
use crossterm::{
    cursor::{MoveLeft, MoveRight, MoveToColumn},
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Absolute column on the current row, 0-based.
    MoveToColumn(u16),
    MoveRight(u16),
    MoveLeft(u16),
    /// Erase from the cursor to the end of the current row.
    ClearToEol,
    Print(String),
}

#[derive(Debug, Default)]
pub struct Writer {
    cmds: Vec<Command>,
}

impl Writer {
    pub fn new() -> Self {
        Self { cmds: Vec::new() }
    }
    pub fn move_to_column(&mut self, col: u16) {
        self.cmds.push(Command::MoveToColumn(col));
    }
    pub fn move_right(&mut self, n: u16) {
        if n > 0 {
            self.cmds.push(Command::MoveRight(n));
        }
    }
    pub fn move_left(&mut self, n: u16) {
        if n > 0 {
            self.cmds.push(Command::MoveLeft(n));
        }
    }
    pub fn clear_to_eol(&mut self) {
        self.cmds.push(Command::ClearToEol);
    }
    pub fn print<S: Into<String>>(&mut self, s: S) {
        let s: String = s.into();
        if !s.is_empty() {
            self.cmds.push(Command::Print(s));
        }
    }
    pub fn commands(&self) -> &[Command] {
        &self.cmds
    }
    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Queue every command into `out`, then flush it.
    pub fn flush_into<W: Write>(self, out: &mut W) -> Result<()> {
        for c in self.cmds {
            match c {
                Command::MoveToColumn(col) => queue!(out, MoveToColumn(col))?,
                Command::MoveRight(n) => queue!(out, MoveRight(n))?,
                Command::MoveLeft(n) => queue!(out, MoveLeft(n))?,
                Command::ClearToEol => queue!(out, Clear(ClearType::UntilNewLine))?,
                Command::Print(s) => queue!(out, Print(s))?,
            }
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn zero_moves_and_empty_prints_are_dropped() {
        let mut w = Writer::new();
        w.move_left(0);
        w.move_right(0);
        w.print("");
        assert!(w.is_empty());
    }

    #[test]
    fn emits_vt100_sequences_in_order() {
        let mut w = Writer::new();
        w.move_to_column(0);
        w.clear_to_eol();
        w.print("> ab");
        w.move_to_column(3);
        w.move_left(2);
        w.move_right(1);
        let mut out = Vec::new();
        w.flush_into(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\x1b[1G\x1b[K> ab\x1b[4G\x1b[2D\x1b[1C"
        );
    }
}
