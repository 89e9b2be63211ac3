//! Commands every session starts with.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use core_actions::required_arg;
use core_state::read_transcript;

use crate::{ExitReason, Session};

pub(crate) fn register<W: Write + 'static>(session: &mut Session<W>) {
    session.define_command("help", "Print this help message", help::<W>);
    session.define_command("exit", "Exit the REPL", exit::<W>);
    session.define_command("save", "Save all evaluated lines in this session to a file", save::<W>);
    session.define_command("load", "Load a file and evaluate each line", load::<W>);
}

fn help<W: Write + 'static>(session: &mut Session<W>, _args: &[String]) -> Result<()> {
    let lines = session.commands.help_lines();
    let width = lines.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    let sentinel = session.sentinel;
    let text = lines
        .iter()
        .map(|(keyword, help)| format!("{sentinel}{keyword:<width$}  {help}"))
        .collect::<Vec<_>>()
        .join("\n");
    session.print(&text)
}

fn exit<W: Write + 'static>(session: &mut Session<W>, _args: &[String]) -> Result<()> {
    session.terminate(ExitReason::Command)
}

fn save<W: Write + 'static>(session: &mut Session<W>, args: &[String]) -> Result<()> {
    let path = required_arg("save", args, 0, "path")?;
    session.history.save_transcript(Path::new(path))?;
    session.print(&format!("Session saved to: {path}"))
}

/// Each non-blank line goes through the normal evaluation path, echoed after
/// the prompt. A failing line is reported and the rest still run.
fn load<W: Write + 'static>(session: &mut Session<W>, args: &[String]) -> Result<()> {
    let path = required_arg("load", args, 0, "path")?;
    let lines = read_transcript(Path::new(path))?;
    tracing::info!(target: "runtime.command", lines = lines.len(), "load_begin");
    for line in lines.iter().filter(|l| !l.trim().is_empty()) {
        let echo = format!("{}{line}", session.prompt);
        session.print(&echo)?;
        session.evaluate_and_print(line)?;
    }
    Ok(())
}
