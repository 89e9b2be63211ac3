use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("SyntaxError: {message} at offset {offset}")]
    Syntax { message: String, offset: usize },
    #[error("ReferenceError: {0} is not defined")]
    Undefined(String),
    #[error("TypeError: {0}")]
    Type(String),
    #[error("RangeError: division by zero")]
    DivisionByZero,
    #[error("RangeError: result is not a finite number")]
    NonFinite,
    #[error("TypeError: cannot assign to reserved binding {0}")]
    ReservedBinding(String),
    /// Free-form failure raised by an embedder's evaluator.
    #[error("{0}")]
    Message(String),
}

impl EvalError {
    pub fn syntax(message: impl Into<String>, offset: usize) -> Self {
        EvalError::Syntax {
            message: message.into(),
            offset,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        EvalError::Message(message.into())
    }
}
