//! Error types for hdlm-graph

use std::fmt;

/// A dependency cycle, listed from the first repeated node back to itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .path.join(" -> "))]
pub struct Cycle {
    pub path: Vec<String>,
}

impl Cycle {
    /// Distinct nodes taking part in the cycle.
    pub fn participants(&self) -> &[String] {
        match self.path.split_last() {
            Some((_, rest)) if !rest.is_empty() => rest,
            _ => &self.path,
        }
    }
}

/// Failure of a strict walk: either a cycle or an error raised while
/// expanding a node's dependencies.
#[derive(Debug)]
pub enum WalkError<E> {
    Cycle(Cycle),
    Expand(E),
}

impl<E: fmt::Display> fmt::Display for WalkError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cycle(cycle) => write!(f, "circular dependency: {cycle}"),
            Self::Expand(err) => err.fmt(f),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for WalkError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cycle(cycle) => Some(cycle),
            Self::Expand(err) => Some(err),
        }
    }
}
