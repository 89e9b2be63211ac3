use std::fmt;

/// Where the session loop currently is. Exposed for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Reading,
    Submitting,
    Clearing,
    Dispatching,
    Evaluating,
    Printing,
    Terminating,
}

/// Why the session ended. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Ctrl+C.
    Interrupt,
    /// Ctrl+D.
    EndOfInput,
    /// `.exit` (exit status 0).
    Command,
    /// The input stream ended or the event channel closed.
    InputClosed,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::Interrupt => "interrupt",
            ExitReason::EndOfInput => "end_of_input",
            ExitReason::Command => "command",
            ExitReason::InputClosed => "input_closed",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by [`Session::run`](crate::Session::run) once the loop stops.
#[derive(Debug)]
pub struct SessionReport<W> {
    pub reason: ExitReason,
    /// The output sink, flushed and no longer written to.
    pub output: W,
}
