//! Test execution module

pub mod execution;
pub mod options;

// Re-export public types
pub use execution::{Execution, Harness};
pub use options::RunOptions;
