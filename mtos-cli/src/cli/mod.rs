//! Command-line interface for the MToS pipeline.
//!
//! The single `run` command loads an image, builds its multivariate tree of
//! shapes and optionally writes the fused depth map and an area-filtered
//! mean-colour reconstruction.

mod commands;

pub use commands::{Cli, CliError, Command, ExecutionSummary, RunCommand, render_summary, run_cli};
