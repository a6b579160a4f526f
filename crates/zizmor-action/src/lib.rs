//! zizmor-action: run the zizmor workflow auditor as a GitHub Actions step.
//!
//! The binary is a thin launcher. It validates the action's inputs, makes a
//! zizmor executable available (a verified GitHub release or `uvx`), runs it
//! once with a minimal environment, and hands its output back to the runner
//! as plain text or as a SARIF step output.

pub mod cli;
pub mod launch;
pub mod tracing;

pub use launch::{EXIT_BOOTSTRAP_FAILURE, report, run};
