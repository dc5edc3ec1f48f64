//! Dependency ordering for hdlm
//!
//! One depth-first walk with three node states (unvisited, in progress,
//! completed) serves every graph in the system: configuration inheritance
//! chains, expression parameters referencing each other, and the library
//! dependency graph. Results are always dependency-first.

pub mod error;
pub mod graph;
pub mod walk;

pub use error::{Cycle, WalkError};
pub use graph::DependencyGraph;
pub use walk::{walk, walk_lenient};
