//! CLI commands for the causality comparison tool.

pub mod check;
pub mod compare;
pub mod generate;

pub use check::{run_check, CheckArgs};
pub use compare::{run_compare, CompareArgs};
pub use generate::{run_generate, GenerateArgs};
