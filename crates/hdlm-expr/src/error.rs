//! Error types for hdlm-expr

/// Result type for expression operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons an expression is rejected or fails to evaluate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("{construct} is not allowed in expressions")]
    Disallowed { construct: String },

    #[error("function not allowed: {name}")]
    FunctionNotAllowed { name: String },

    #[error("unknown variable: {name}")]
    UnknownVariable { name: String },

    #[error("{function}() takes {expected} argument(s), got {got}")]
    Arity {
        function: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("unsupported operand type(s) for {op}: {left} and {right}")]
    OperandTypes {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("bad operand type for {op}: {operand}")]
    UnaryOperandType {
        op: &'static str,
        operand: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in {op}")]
    Overflow { op: &'static str },

    #[error("math domain error in {function}")]
    Domain { function: &'static str },

    #[error("invalid argument for {function}(): {message}")]
    InvalidArgument {
        function: &'static str,
        message: String,
    },
}

impl Error {
    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            offset,
            message: message.into(),
        }
    }

    pub(crate) fn disallowed(construct: impl Into<String>) -> Self {
        Self::Disallowed {
            construct: construct.into(),
        }
    }
}
