//! Terminal backend abstraction and crossterm implementation.
//!
//! The REPL edits a single row in place, so entering the terminal means raw
//! mode only: no alternate screen, no hidden cursor, scrollback untouched.

use anyhow::Result;
use crossterm::{
    terminal::{disable_raw_mode, enable_raw_mode},
    tty::IsTty,
};
use std::io::stdin;

pub trait TerminalBackend {
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
}

/// True when stdin is attached to a terminal. Piped input skips raw mode.
pub fn stdin_is_tty() -> bool {
    stdin().is_tty()
}

pub struct CrosstermBackend {
    entered: bool,
}

/// RAII guard ensuring terminal state restoration even if caller early-returns or panics.
pub struct TerminalGuard<'a, B: TerminalBackend> {
    backend: &'a mut B,
    active: bool,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self { entered: false }
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }
}

/// Enter `backend` and return a guard that will leave on drop.
pub fn enter_guard<B: TerminalBackend>(backend: &mut B) -> Result<TerminalGuard<'_, B>> {
    backend.enter()?;
    Ok(TerminalGuard {
        backend,
        active: true,
    })
}

impl<B: TerminalBackend> TerminalGuard<'_, B> {
    /// Leave early, reporting any restoration error instead of swallowing it.
    pub fn release(mut self) -> Result<()> {
        self.active = false;
        self.backend.leave()
    }
}

impl TerminalBackend for CrosstermBackend {
    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            self.entered = true;
            tracing::debug!(target: "terminal", "raw_mode_enabled");
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            disable_raw_mode()?;
            self.entered = false;
            tracing::debug!(target: "terminal", "raw_mode_disabled");
        }
        Ok(())
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl<B: TerminalBackend> Drop for TerminalGuard<'_, B> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.backend.leave();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recording {
        calls: Vec<&'static str>,
    }

    impl TerminalBackend for Recording {
        fn enter(&mut self) -> Result<()> {
            self.calls.push("enter");
            Ok(())
        }
        fn leave(&mut self) -> Result<()> {
            self.calls.push("leave");
            Ok(())
        }
    }

    #[test]
    fn guard_leaves_on_drop() {
        let mut backend = Recording::default();
        {
            let _guard = enter_guard(&mut backend).unwrap();
        }
        assert_eq!(backend.calls, vec!["enter", "leave"]);
    }

    #[test]
    fn release_leaves_exactly_once() {
        let mut backend = Recording::default();
        let guard = enter_guard(&mut backend).unwrap();
        guard.release().unwrap();
        assert_eq!(backend.calls, vec!["enter", "leave"]);
    }

    #[test]
    fn fresh_backend_is_not_entered() {
        let backend = CrosstermBackend::new();
        assert!(!backend.is_entered());
    }
}
