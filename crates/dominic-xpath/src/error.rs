//! Errors raised while compiling or evaluating an expression.

/// An error from the `XPath` engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XPathError {
    /// The expression text does not match the `XPath` 1.0 grammar.
    #[error("invalid XPath at offset {position}: {message}")]
    Parse {
        /// Character offset of the offending token.
        position: usize,
        /// What the parser expected or found.
        message: String,
    },

    /// A value had the wrong type for the operation applied to it.
    #[error("expected {expected}, found {found}")]
    Type {
        /// The type the operation needs.
        expected: &'static str,
        /// The type the expression produced.
        found: &'static str,
    },

    /// The expression calls a function outside the core library.
    #[error("unknown function {0}()")]
    UnknownFunction(String),

    /// A core function was called with the wrong number of arguments.
    #[error("{function}() takes {expected} argument(s), {found} given")]
    Arity {
        /// Function name.
        function: String,
        /// Accepted argument counts, for example `"2 or 3"`.
        expected: &'static str,
        /// Number of arguments in the call.
        found: usize,
    },

    /// A `$name` reference with no binding in the context.
    #[error("undefined variable ${0}")]
    UndefinedVariable(String),
}

impl XPathError {
    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }
}
