//! The read-evaluate-print session loop.
//!
//! A [`Session`] consumes decoded key events one at a time, edits its
//! [`LineBuffer`], recalls [`History`], and on Enter either dispatches a
//! dot-command or hands the line to its [`Evaluator`]. Output goes through a
//! [`Renderer`] over any `std::io::Write` sink.
//!
//! Cycle: `Reading` → `Submitting` → `Dispatching` | `Evaluating` →
//! `Printing` → `Reading`. Blank submissions take the `Clearing` shortcut.
//! Ctrl+C, Ctrl+D, `.exit` or the end of input move to `Terminating`, after
//! which no further events are processed.
//!
//! Failures inside a cycle (unknown keyword, failing command, evaluation
//! error, transcript I/O) are formatted through the [`ResultWriter`] and the
//! loop continues. Only a failing output sink ends [`Session::run`] with an
//! error.

mod builtins;
mod state;

use std::io::Write;

use anyhow::Result;
use core_actions::{CommandError, CommandParser, CommandRegistry, ParsedLine};
use core_eval::{Calc, Context, EvalError, Evaluator, InspectWriter, ResultWriter, Value};
use core_events::{Event, KeyEvent};
use core_render::Renderer;
use core_state::History;
use core_text::LineBuffer;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace};

pub use state::{ExitReason, SessionReport, SessionState};

pub const DEFAULT_PROMPT: &str = "> ";
pub const DEFAULT_SENTINEL: char = '.';

pub struct Session<W: Write + 'static> {
    prompt: String,
    sentinel: char,
    buffer: LineBuffer,
    history: History,
    context: Context,
    evaluator: Box<dyn Evaluator>,
    writer: Box<dyn ResultWriter>,
    commands: CommandRegistry<Session<W>>,
    renderer: Renderer<W>,
    state: SessionState,
    /// False while a submitted line is being dispatched or evaluated.
    idle: bool,
    exit: Option<ExitReason>,
}

impl<W: Write + 'static> Session<W> {
    /// A session with the `calc` evaluator, the inspecting writer and the
    /// built-in commands (`help`, `exit`, `save`, `load`).
    pub fn new(output: W) -> Self {
        let mut session = Self {
            prompt: DEFAULT_PROMPT.to_string(),
            sentinel: DEFAULT_SENTINEL,
            buffer: LineBuffer::new(),
            history: History::new(),
            context: Context::new(),
            evaluator: Box::new(Calc::new()),
            writer: Box::new(InspectWriter),
            commands: CommandRegistry::new(),
            renderer: Renderer::new(output),
            state: SessionState::Reading,
            idle: true,
            exit: None,
        };
        builtins::register(&mut session);
        session
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_sentinel(mut self, sentinel: char) -> Self {
        self.sentinel = sentinel;
        self
    }

    pub fn with_evaluator(mut self, evaluator: impl Evaluator + 'static) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    pub fn with_writer(mut self, writer: impl ResultWriter + 'static) -> Self {
        self.writer = Box::new(writer);
        self
    }

    /// Register (or replace) a dot-command.
    pub fn define_command<F>(
        &mut self,
        keyword: impl Into<String>,
        help: impl Into<String>,
        action: F,
    )
    where
        F: Fn(&mut Session<W>, &[String]) -> Result<()> + 'static,
    {
        self.commands.define(keyword, help, action);
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn sentinel(&self) -> char {
        self.sentinel
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn exit_reason(&self) -> Option<ExitReason> {
        self.exit
    }

    pub fn is_terminated(&self) -> bool {
        self.exit.is_some()
    }

    pub fn output(&self) -> &W {
        self.renderer.get_ref()
    }

    /// Evaluate `expr` and store the result in `_`, without touching the
    /// terminal or the history.
    pub fn run_expression(&mut self, expr: &str) -> Result<Value, EvalError> {
        let value = self.evaluator.evaluate(expr, &mut self.context)?;
        self.context.set_last_result(value.clone());
        Ok(value)
    }

    /// Run a registered command as if `.keyword args` had been submitted,
    /// e.g. replaying a transcript before the first prompt.
    pub fn run_command(&mut self, keyword: &str, args: &[String]) -> Result<()> {
        self.idle = false;
        let result = self.dispatch(keyword, args);
        self.idle = true;
        result
    }

    /// Paint the first prompt.
    pub fn start(&mut self) -> Result<()> {
        info!(
            target: "runtime.session",
            sentinel = %self.sentinel,
            commands = self.commands.len(),
            "session_started"
        );
        self.redraw()
    }

    /// Drive the session from an event channel until it terminates.
    ///
    /// The receiver is closed as soon as the session stops so the input task
    /// observes the shutdown on its next send.
    pub async fn run(mut self, mut rx: mpsc::Receiver<Event>) -> Result<SessionReport<W>> {
        self.start()?;
        while !self.is_terminated() {
            let Some(event) = rx.recv().await else {
                debug!(target: "runtime.session", "event_channel_closed");
                self.terminate(ExitReason::InputClosed)?;
                break;
            };
            if let Err(e) = self.handle_event(event) {
                error!(target: "runtime.session", error = %e, "output_failed");
                rx.close();
                return Err(e);
            }
        }
        rx.close();
        let reason = self.exit.unwrap_or(ExitReason::InputClosed);
        Ok(SessionReport {
            reason,
            output: self.renderer.into_inner(),
        })
    }

    pub fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Shutdown => self.terminate(ExitReason::InputClosed),
        }
    }

    /// Apply one key. Keys arriving after termination are dropped.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.is_terminated() {
            trace!(target: "runtime.session", kind = key.kind_label(), "key_after_terminate");
            return Ok(());
        }
        trace!(target: "runtime.session", kind = key.kind_label(), "key");
        match key {
            KeyEvent::Character(text) => {
                if self.buffer.insert(&text) > 0 {
                    self.redraw()?;
                }
            }
            KeyEvent::Backspace => {
                if self.buffer.delete_before() {
                    self.redraw()?;
                }
            }
            KeyEvent::Left => {
                if let Some(width) = self.buffer.move_left() {
                    self.renderer.move_cursor(-i32::from(width))?;
                }
            }
            KeyEvent::Right => {
                if let Some(width) = self.buffer.move_right() {
                    self.renderer.move_cursor(i32::from(width))?;
                }
            }
            KeyEvent::Up => {
                let live_empty = self.buffer.is_empty();
                if let Some(entry) = self.history.recall_previous(live_empty).map(str::to_owned) {
                    self.buffer.replace(&entry);
                    self.redraw()?;
                }
            }
            KeyEvent::Down => {
                if let Some(entry) = self.history.recall_next().map(str::to_owned) {
                    self.buffer.replace(&entry);
                    self.redraw()?;
                }
            }
            KeyEvent::Enter => self.submit()?,
            KeyEvent::Interrupt => self.terminate(ExitReason::Interrupt)?,
            KeyEvent::EndOfInput => self.terminate(ExitReason::EndOfInput)?,
            KeyEvent::Ignored => {}
        }
        Ok(())
    }

    fn submit(&mut self) -> Result<()> {
        self.state = SessionState::Submitting;
        if self.buffer.is_blank() {
            self.state = SessionState::Clearing;
            self.buffer.clear();
            self.history.reset_cursor();
            self.renderer.line_break()?;
            return self.redraw();
        }

        let line = self.buffer.text();
        self.renderer.line_break()?;
        self.renderer.flush()?;
        self.buffer.clear();
        self.history.reset_cursor();

        self.idle = false;
        match CommandParser::parse(&line, self.sentinel) {
            ParsedLine::Command { keyword, args } => self.dispatch(&keyword, &args)?,
            ParsedLine::Expression => self.evaluate_and_print(&line)?,
        }
        self.idle = true;

        if self.is_terminated() {
            return Ok(());
        }
        self.redraw()
    }

    fn dispatch(&mut self, keyword: &str, args: &[String]) -> Result<()> {
        self.state = SessionState::Dispatching;
        let Some(handle) = self.commands.lookup(keyword) else {
            debug!(target: "runtime.command", keyword_len = keyword.len(), "unknown_keyword");
            let message = CommandError::UnknownKeyword(keyword.to_string()).to_string();
            return self.print_value(&Value::String(message));
        };
        debug!(target: "runtime.command", keyword = %handle.keyword, args = args.len(), "dispatch");
        if let Err(err) = handle.invoke(self, args) {
            debug!(target: "runtime.command", keyword = %handle.keyword, "command_failed");
            let text = self.writer.format_error(&*err);
            self.print(&text)?;
        }
        Ok(())
    }

    /// The evaluation path shared by Enter and `.load`: record the line,
    /// evaluate, print the value or the formatted error.
    fn evaluate_and_print(&mut self, line: &str) -> Result<()> {
        self.state = SessionState::Evaluating;
        self.history.push(line);
        match self.run_expression(line) {
            Ok(value) => self.print_value(&value),
            Err(err) => {
                debug!(target: "runtime.session", line_len = line.len(), "evaluation_failed");
                let text = self.writer.format_error(&err);
                self.print(&text)
            }
        }
    }

    fn print_value(&mut self, value: &Value) -> Result<()> {
        let text = self.writer.format_value(value);
        self.print(&text)
    }

    fn print(&mut self, text: &str) -> Result<()> {
        self.state = SessionState::Printing;
        self.renderer.print_block(text)
    }

    fn redraw(&mut self) -> Result<()> {
        self.state = SessionState::Reading;
        self.renderer.redraw(&self.prompt, &self.buffer.snapshot())
    }

    /// Stop the session. The trailing line break is only written when the
    /// prompt is showing, so `.exit` output is not followed by a blank row.
    fn terminate(&mut self, reason: ExitReason) -> Result<()> {
        if self.is_terminated() {
            return Ok(());
        }
        self.state = SessionState::Terminating;
        self.exit = Some(reason);
        info!(
            target: "runtime.shutdown",
            reason = reason.as_str(),
            history = self.history.len(),
            "session_terminated"
        );
        self.renderer.finish(self.idle)
    }
}
