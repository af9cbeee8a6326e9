//! # testsuite-rs
//!
//! An orchestration engine for directory-based test suites.
//!
//! Tests are laid out as a three-level tree: suite directories hold group
//! directories, and groups hold case files (and nested groups). The engine
//! discovers the tree, executes every case while honoring before, after and
//! around hooks, tracks each case's pass/fail/error status, stops cleanly on
//! SIGINT, can rerun only the cases that failed, and reports each failure with
//! a command that reruns it.
//!
//! ```no_run
//! use testsuite_rs::{testsuite, EntityKind, Hooks};
//!
//! let summary = testsuite::run("acceptance")
//!     .hooks(Hooks::new().before(EntityKind::Suite, |suite| {
//!         println!("starting {}", suite.name);
//!         Ok(())
//!     }))
//!     .invoke()
//!     .unwrap();
//! std::process::exit(summary.exit_code());
//! ```

pub mod aggregate;
pub mod cancel;
pub mod case;
pub mod config;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod group;
pub mod hooks;
pub mod logging;
pub mod report;
pub mod run;
pub mod runner;
pub mod status;
pub mod suite;

pub use aggregate::{StatusCounts, StatusTree};
pub use cancel::{install_interrupt_handler, CancellationFlag, InterruptHandler};
pub use case::Case;
pub use config::{Configuration, ConfigurationProvider, EnvConfiguration, SuiteConfiguration};
pub use error::{Error, Result};
pub use executor::{CommandExecutor, Executor};
pub use group::{Entry, Group, GroupCollection};
pub use hooks::{EntityKind, HookEntity, Hooks, Phase};
pub use report::{BacktraceFilter, ConsoleSink, LogSink, MemorySink, Reporter};
pub use run::{Execution, Harness, RunOptions};
pub use runner::{RunSummary, Runner};
pub use status::{Failure, Outcome, Status};
pub use suite::Suite;

/// Entry point for running the suites under a directory
///
/// ```no_run
/// use testsuite_rs::{testsuite, ConsoleSink};
///
/// testsuite::run("acceptance")
///     .sink(ConsoleSink)
///     .handle_interrupts(true)
///     .invoke()
///     .unwrap();
/// ```
pub mod testsuite {
    use super::*;
    use std::path::PathBuf;

    /// Create a runner for the suites under `root`, with default settings
    pub fn run(root: impl Into<PathBuf>) -> Runner {
        Runner::with_provider(Configuration::new(root))
    }
}
