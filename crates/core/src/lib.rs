//! Core types for zizmor-action.
//!
//! The action is a straight pipeline, one module per stage:
//!
//! 1. [`inputs`] reads and validates the `GHA_ZIZMOR_*` inputs
//! 2. [`tools`] provisions a runnable zizmor
//! 3. [`command`] assembles its argument vector
//! 4. [`runner`] executes it with a minimal environment
//! 5. [`publish`] routes its output back to the workflow
//!
//! [`workflow`] holds the GitHub Actions runner plumbing shared by the stages.

pub mod command;
pub mod error;
pub mod inputs;
pub mod publish;
pub mod runner;
pub mod tools;
pub mod workflow;

pub use error::{Error, Result};
