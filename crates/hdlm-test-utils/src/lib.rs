//! Shared test utilities for the hdlm workspace.
//!
//! This crate provides standardised fixtures so crate test suites do not
//! each grow their own. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: git repositories with tags and branches, usable as library
//!   remotes through their filesystem URL
//! - [`workspace`]: [`TestWorkspace`] for an initialised hdlm root plus
//!   description-file helpers

pub mod git;
pub mod workspace;

pub use git::FixtureRepo;
pub use workspace::{TestWorkspace, description};
