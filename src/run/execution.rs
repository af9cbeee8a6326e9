//! Shared orchestration context for suites, groups and cases

use crate::cancel::CancellationFlag;
use crate::case::Case;
use crate::config::Configuration;
use crate::executor::{CommandExecutor, Executor};
use crate::hooks::Hooks;
use crate::report::{BacktraceFilter, LogSink, Messages, Reporter};
use crate::run::options::RunOptions;

/// Everything a suite needs to execute and report its tree
///
/// One harness is shared by every suite of a run.
pub struct Harness {
    configuration: Configuration,
    hooks: Hooks,
    executor: Box<dyn Executor>,
    reporter: Reporter,
    cancellation: CancellationFlag,
}

impl Harness {
    /// Create a harness that executes cases with the configured command
    pub fn new(configuration: Configuration) -> Self {
        let executor = CommandExecutor::new(&configuration.command);
        let reporter = Reporter::new(&configuration);
        Self {
            configuration,
            hooks: Hooks::new(),
            executor: Box::new(executor),
            reporter,
            cancellation: CancellationFlag::new(),
        }
    }

    /// Replace the registered hooks
    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Replace the case executor
    pub fn executor<E: Executor + 'static>(self, executor: E) -> Self {
        self.boxed_executor(Box::new(executor))
    }

    pub fn boxed_executor(mut self, executor: Box<dyn Executor>) -> Self {
        self.executor = executor;
        self
    }

    /// Register an additional log sink for reports
    pub fn sink<S: LogSink + 'static>(self, sink: S) -> Self {
        self.boxed_sink(Box::new(sink))
    }

    pub fn boxed_sink(mut self, sink: Box<dyn LogSink>) -> Self {
        self.reporter.add_boxed_sink(sink);
        self
    }

    /// Replace the backtrace filter used by reports
    pub fn backtrace_filter<F: BacktraceFilter + 'static>(self, filter: F) -> Self {
        self.boxed_backtrace_filter(Box::new(filter))
    }

    pub fn boxed_backtrace_filter(mut self, filter: Box<dyn BacktraceFilter>) -> Self {
        self.reporter.set_boxed_backtrace_filter(filter);
        self
    }

    /// Replace how report lines are formatted
    pub fn messages(mut self, messages: Messages) -> Self {
        self.reporter.set_messages(messages);
        self
    }

    /// Share an existing cancellation flag
    pub fn cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = flag;
        self
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn registered_hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn cancellation_flag(&self) -> &CancellationFlag {
        &self.cancellation
    }
}

/// A single pass over the tree: the harness plus the options of this run
#[derive(Clone, Copy)]
pub struct Execution<'a> {
    harness: &'a Harness,
    options: &'a RunOptions,
}

impl<'a> Execution<'a> {
    pub fn new(harness: &'a Harness, options: &'a RunOptions) -> Self {
        Self { harness, options }
    }

    pub fn hooks(&self) -> &'a Hooks {
        &self.harness.hooks
    }

    pub fn executor(&self) -> &'a dyn Executor {
        self.harness.executor.as_ref()
    }

    pub fn options(&self) -> &'a RunOptions {
        self.options
    }

    /// Checkpoint polled before each sibling unit is launched
    pub fn is_cancelled(&self) -> bool {
        self.harness.cancellation.is_cancelled()
    }

    pub fn selects(&self, case: &Case) -> bool {
        self.options.selects(case)
    }
}
