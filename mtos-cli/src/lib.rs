//! Support library for the `mtos` binary.
//!
//! Re-exports the CLI and logging modules so doctests and integration tests
//! can drive the command pipeline without spawning a subprocess.

pub mod cli;
pub mod logging;
