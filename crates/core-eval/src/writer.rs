use std::error::Error;

use crate::Value;

/// Turns evaluation outcomes into the text printed after a submission.
pub trait ResultWriter {
    fn format_value(&self, value: &Value) -> String;

    /// Default: `Uncaught <error>` followed by each source in the chain.
    fn format_error(&self, error: &dyn Error) -> String {
        let mut out = format!("Uncaught {error}");
        let mut source = error.source();
        while let Some(cause) = source {
            out.push_str(": ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}

/// Strings print verbatim; everything else goes through [`inspect`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InspectWriter;

impl ResultWriter for InspectWriter {
    fn format_value(&self, value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => inspect(other),
        }
    }
}

/// Structural rendering of a value. Strings are quoted, `Null` reads as
/// `undefined`, containers use compact JSON-style notation.
pub fn inspect(value: &Value) -> String {
    match value {
        Value::Null => "undefined".to_string(),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(inspect).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{k}: {}", inspect(v)))
                .collect();
            if inner.is_empty() {
                "{}".to_string()
            } else {
                format!("{{ {} }}", inner.join(", "))
            }
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EvalError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn strings_are_verbatim() {
        assert_eq!(
            InspectWriter.format_value(&json!("Invalid REPL keyword")),
            "Invalid REPL keyword"
        );
    }

    #[test]
    fn non_strings_are_inspected() {
        let w = InspectWriter;
        assert_eq!(w.format_value(&json!(3)), "3");
        assert_eq!(w.format_value(&json!(0.5)), "0.5");
        assert_eq!(w.format_value(&json!(true)), "true");
        assert_eq!(w.format_value(&Value::Null), "undefined");
        assert_eq!(w.format_value(&json!([1, "a", null])), "[1, \"a\", undefined]");
        assert_eq!(w.format_value(&json!({"a": 1})), "{ a: 1 }");
        assert_eq!(w.format_value(&json!({})), "{}");
    }

    #[test]
    fn errors_include_source_chain() {
        #[derive(Debug)]
        struct Outer(EvalError);
        impl std::fmt::Display for Outer {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "load failed")
            }
        }
        impl Error for Outer {
            fn source(&self) -> Option<&(dyn Error + 'static)> {
                Some(&self.0)
            }
        }
        let err = Outer(EvalError::DivisionByZero);
        assert_eq!(
            InspectWriter.format_error(&err),
            "Uncaught load failed: RangeError: division by zero"
        );
        assert_eq!(
            InspectWriter.format_error(&EvalError::Undefined("x".into())),
            "Uncaught ReferenceError: x is not defined"
        );
    }
}
