//! Evaluation seam between the session loop and an expression language.
//!
//! The session owns a [`Context`] and lends it to an [`Evaluator`] for every
//! submitted line; a [`ResultWriter`] turns the outcome into display text.
//! [`calc::Calc`] is a small arithmetic language used as the default
//! evaluator and in tests; embedders plug in their own through the trait.

pub mod calc;
mod context;
mod error;
mod writer;

pub use calc::Calc;
pub use context::{Context, LAST_RESULT};
pub use error::EvalError;
pub use writer::{InspectWriter, ResultWriter, inspect};

/// Result of a successful evaluation. `Null` plays the role of "undefined".
pub type Value = serde_json::Value;

/// Evaluates one submitted line against the session's bindings.
///
/// Implementations may read and write any binding except [`LAST_RESULT`],
/// which the session updates after each successful call.
pub trait Evaluator {
    fn evaluate(&mut self, source: &str, context: &mut Context) -> Result<Value, EvalError>;
}

impl<F> Evaluator for F
where
    F: FnMut(&str, &mut Context) -> Result<Value, EvalError>,
{
    fn evaluate(&mut self, source: &str, context: &mut Context) -> Result<Value, EvalError> {
        self(source, context)
    }
}
