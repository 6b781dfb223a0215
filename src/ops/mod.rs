//! High-level operations driven by the CLI.

pub mod generate;

pub use generate::{generate, GenerateSummary};
