//! Sandboxed expressions for derived parameters
//!
//! Parameters may declare an `expr` such as `log2(DEPTH)` or
//! `${WIDTH} * 2 + 1`, evaluated against the already-resolved values of
//! their siblings. The language is a closed subset of arithmetic:
//!
//! - literals: integers (decimal, `0x`, `0b`, `0o`), reals, quoted strings,
//!   `true`/`false`/`True`/`False`
//! - identifiers looked up in the context
//! - `+ - * / // % **`, `& | ^ ~ << >>`, unary `-`/`+`
//! - one comparison per operand pair (`< <= > >= == !=`)
//! - `c ? a : b` and `a if c else b`
//! - calls to the functions listed by [`Builtin::names`], positional only
//!
//! Anything else is rejected by name before evaluation starts.
//!
//! ```
//! use std::collections::BTreeMap;
//! use hdlm_expr::{Value, evaluate};
//!
//! let context = BTreeMap::from([("DEPTH".to_string(), Value::Int(256))]);
//! assert_eq!(evaluate("log2(DEPTH)", &context).unwrap(), Value::Int(8));
//! ```

pub mod ast;
pub mod builtins;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::{Captures, Regex};

pub use ast::Expr;
pub use builtins::Builtin;
pub use error::{Error, Result};
pub use eval::Evaluator;
pub use parser::parse;
pub use value::{Value, ValueKind};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{(\w+)\}").unwrap());

/// Replace `${NAME}` placeholders with the literal value of `NAME` from
/// `context`, or with the bare identifier `NAME` when it is absent.
pub fn substitute<'a>(expression: &'a str, context: &BTreeMap<String, Value>) -> Cow<'a, str> {
    PLACEHOLDER.replace_all(expression, |caps: &Captures| {
        let name = &caps[1];
        match context.get(name) {
            Some(value) => value.to_literal(),
            None => name.to_string(),
        }
    })
}

/// Substitute placeholders, parse, and evaluate `expression`.
pub fn evaluate(expression: &str, context: &BTreeMap<String, Value>) -> Result<Value> {
    let substituted = substitute(expression, context);
    let expr = parse(&substituted)?;
    let value = Evaluator::new(context).eval(&expr)?;
    tracing::trace!(expression, %value, "evaluated expression");
    Ok(value)
}

/// Free identifiers of `expression`, placeholders included.
pub fn identifiers(expression: &str) -> Result<BTreeSet<String>> {
    let substituted = substitute(expression, &BTreeMap::new());
    Ok(parse(&substituted)?.identifiers())
}
