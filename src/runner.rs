//! Process-level entry point: configuration, discovery, execution, reports

use crate::aggregate::{self, StatusCounts};
use crate::cancel::{self, CancellationFlag};
use crate::config::{ConfigurationProvider, EnvConfiguration};
use crate::discovery;
use crate::error::Result;
use crate::executor::Executor;
use crate::hooks::Hooks;
use crate::report::{BacktraceFilter, LogSink};
use crate::run::Harness;
use crate::suite::Suite;
use std::rc::Rc;

/// Builder for one complete run over every discovered suite
pub struct Runner {
    provider: Box<dyn ConfigurationProvider>,
    hooks: Hooks,
    executor: Option<Box<dyn Executor>>,
    sinks: Vec<Box<dyn LogSink>>,
    backtrace_filter: Option<Box<dyn BacktraceFilter>>,
    cancellation: CancellationFlag,
    handle_interrupts: bool,
}

impl Runner {
    /// A runner reading its configuration from `TESTSUITE_*` variables
    pub fn new() -> Self {
        Self::with_provider(EnvConfiguration)
    }

    pub fn with_provider<P: ConfigurationProvider + 'static>(provider: P) -> Self {
        Self {
            provider: Box::new(provider),
            hooks: Hooks::new(),
            executor: None,
            sinks: Vec::new(),
            backtrace_filter: None,
            cancellation: CancellationFlag::new(),
            handle_interrupts: false,
        }
    }

    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Replace the command executor derived from the configuration
    pub fn executor<E: Executor + 'static>(mut self, executor: E) -> Self {
        self.executor = Some(Box::new(executor));
        self
    }

    pub fn sink<S: LogSink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn backtrace_filter<F: BacktraceFilter + 'static>(mut self, filter: F) -> Self {
        self.backtrace_filter = Some(Box::new(filter));
        self
    }

    /// Share a cancellation flag with the caller
    pub fn cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = flag;
        self
    }

    /// Route SIGINT to the cancellation flag for the duration of the run
    pub fn handle_interrupts(mut self, enabled: bool) -> Self {
        self.handle_interrupts = enabled;
        self
    }

    /// Run every suite, optionally rerun failures, and report
    pub fn invoke(self) -> Result<RunSummary> {
        let handler = if self.handle_interrupts {
            Some(cancel::install_interrupt_handler(&self.cancellation)?)
        } else {
            None
        };

        let result = self.run_suites();
        if let Some(handler) = handler {
            handler.uninstall();
        }
        result
    }

    fn run_suites(self) -> Result<RunSummary> {
        let configuration = self.provider.configuration()?;
        let options = configuration.run_options.clone();
        let rerun = configuration.rerun_failed;
        let directories = discovery::suite_directories(&configuration)?;

        let mut harness = Harness::new(configuration)
            .hooks(self.hooks)
            .cancellation(self.cancellation.clone());
        if let Some(executor) = self.executor {
            harness = harness.boxed_executor(executor);
        }
        if let Some(filter) = self.backtrace_filter {
            harness = harness.boxed_backtrace_filter(filter);
        }
        for sink in self.sinks {
            harness = harness.boxed_sink(sink);
        }
        let harness = Rc::new(harness);

        let mut suites = Vec::new();
        for directory in directories {
            let mut suite = Suite::new(directory, Rc::clone(&harness)).build_dependencies()?;
            suite.filter_from_options(&options);
            if suite.has_available_tests() {
                suites.push(suite);
            } else {
                log::info!("No tests to run in {}", suite.directory().display());
            }
        }

        for suite in suites.iter_mut() {
            if self.cancellation.is_cancelled() {
                break;
            }
            suite.run(&options)?;
        }

        if rerun {
            for suite in suites.iter_mut() {
                if self.cancellation.is_cancelled() {
                    break;
                }
                suite.rerun_failed(&options)?;
            }
        }

        let mut counts = StatusCounts::default();
        for suite in &suites {
            suite.report(&options);
            counts += aggregate::count_by_status(suite);
        }
        for suite in &suites {
            suite.final_report();
        }

        let cancelled = self.cancellation.is_cancelled();
        if cancelled {
            log::warn!("Run was interrupted; remaining tests were not executed");
        }
        log::info!(
            "{} passed / {} failed / {} errored / {} pending",
            counts.passed,
            counts.failed,
            counts.errored,
            counts.pending
        );

        Ok(RunSummary {
            suites: suites.len(),
            counts,
            cancelled,
        })
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

/// Totals of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Suites with tests to run
    pub suites: usize,
    pub counts: StatusCounts,
    /// Whether an interrupt stopped the run early
    pub cancelled: bool,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.counts.failed > 0 || self.counts.errored > 0
    }

    /// Process exit status: 1 on failures or interruption, else 0
    pub fn exit_code(&self) -> i32 {
        if self.has_failures() || self.cancelled {
            1
        } else {
            0
        }
    }
}
