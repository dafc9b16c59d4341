//! Benchmark support crate for MToS.
//!
//! Provides seeded synthetic images and parameter types used by the Criterion
//! benchmarks of the single-channel builders and of the fused pipeline.

pub mod error;
pub mod params;
pub mod source;
