//! Keyword → handler registry.
//!
//! Handlers are closed records (`help` text plus an action) keyed by keyword;
//! redefining a keyword replaces the previous record. The registry is generic
//! over the target the action mutates so it can live inside that target:
//! [`CommandRegistry::lookup`] hands out a cloned [`CommandHandle`], releasing
//! the borrow of the registry before the action runs with `&mut S`.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

pub type CommandAction<S> = Arc<dyn Fn(&mut S, &[String]) -> anyhow::Result<()>>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Invalid REPL keyword")]
    UnknownKeyword(String),
    #[error(".{keyword} requires a {argument} argument")]
    MissingArgument {
        keyword: String,
        argument: &'static str,
    },
}

/// Fetch argument `index` or fail with [`CommandError::MissingArgument`].
pub fn required_arg<'a>(
    keyword: &str,
    args: &'a [String],
    index: usize,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| CommandError::MissingArgument {
            keyword: keyword.to_string(),
            argument,
        })
}

pub struct CommandHandle<S> {
    pub keyword: String,
    pub help: String,
    action: CommandAction<S>,
}

impl<S> Clone for CommandHandle<S> {
    fn clone(&self) -> Self {
        Self {
            keyword: self.keyword.clone(),
            help: self.help.clone(),
            action: Arc::clone(&self.action),
        }
    }
}

impl<S> std::fmt::Debug for CommandHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandle")
            .field("keyword", &self.keyword)
            .field("help", &self.help)
            .finish_non_exhaustive()
    }
}

impl<S> CommandHandle<S> {
    pub fn invoke(&self, target: &mut S, args: &[String]) -> anyhow::Result<()> {
        (self.action)(target, args)
    }
}

pub struct CommandRegistry<S> {
    commands: BTreeMap<String, CommandHandle<S>>,
}

impl<S> Default for CommandRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> CommandRegistry<S> {
    pub fn new() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }

    /// Register `keyword`, replacing any previous definition.
    /// Returns true when an existing command was replaced.
    pub fn define<F>(
        &mut self,
        keyword: impl Into<String>,
        help: impl Into<String>,
        action: F,
    ) -> bool
    where
        F: Fn(&mut S, &[String]) -> anyhow::Result<()> + 'static,
    {
        let keyword = keyword.into();
        let handle = CommandHandle {
            keyword: keyword.clone(),
            help: help.into(),
            action: Arc::new(action),
        };
        let replaced = self.commands.insert(keyword.clone(), handle).is_some();
        tracing::debug!(target: "runtime.command", %keyword, replaced, "command_defined");
        replaced
    }

    pub fn lookup(&self, keyword: &str) -> Option<CommandHandle<S>> {
        self.commands.get(keyword).cloned()
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.commands.contains_key(keyword)
    }

    /// `(keyword, help)` pairs sorted by keyword.
    pub fn help_lines(&self) -> Vec<(&str, &str)> {
        self.commands
            .values()
            .map(|c| (c.keyword.as_str(), c.help.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
