//! Dot-command classification and the command registry.
//!
//! A submitted line that starts with the sentinel character is a command
//! (`.help`, `.save out.txt`); anything else goes to the evaluator. Parsing is
//! pure; executing a command is the session's job, using handles looked up
//! from [`CommandRegistry`].

pub mod command_parser;
pub mod registry;

pub use command_parser::{CommandParser, ParsedLine};
pub use registry::{CommandAction, CommandError, CommandHandle, CommandRegistry, required_arg};
