//! Rendering case outcomes and suite summaries to log sinks
//!
//! A [`Reporter`] turns a case into a block of lines, each tagged with a
//! [`MessageKind`], and sends every line to every registered [`LogSink`] at
//! the severity the kind maps to.

pub mod backtrace;
pub mod message;
pub mod sink;

pub use backtrace::{BacktraceFilter, ProjectFrames};
pub use message::{MessageKind, Messages};
pub use sink::{ConsoleSink, LogForwarder, LogSink, MemorySink, SinkLevel};

use crate::aggregate;
use crate::case::Case;
use crate::config::Configuration;
use crate::run::RunOptions;
use crate::status::{Failure, Outcome};
use crate::suite::Suite;

/// Renders reports to the registered sinks
pub struct Reporter {
    sinks: Vec<Box<dyn LogSink>>,
    messages: Messages,
    backtrace_filter: Box<dyn BacktraceFilter>,
    program: String,
    environment: String,
}

impl Reporter {
    /// A reporter without sinks, filtering backtraces to the project root
    pub fn new(configuration: &Configuration) -> Self {
        Self {
            sinks: Vec::new(),
            messages: Messages::detect(),
            backtrace_filter: Box::new(ProjectFrames::new(&configuration.project_root)),
            program: configuration.program.clone(),
            environment: configuration.environment.clone(),
        }
    }

    pub fn add_sink<S: LogSink + 'static>(&mut self, sink: S) {
        self.add_boxed_sink(Box::new(sink));
    }

    pub fn add_boxed_sink(&mut self, sink: Box<dyn LogSink>) {
        self.sinks.push(sink);
    }

    pub fn set_backtrace_filter<F: BacktraceFilter + 'static>(&mut self, filter: F) {
        self.set_boxed_backtrace_filter(Box::new(filter));
    }

    pub fn set_boxed_backtrace_filter(&mut self, filter: Box<dyn BacktraceFilter>) {
        self.backtrace_filter = filter;
    }

    pub fn set_messages(&mut self, messages: Messages) {
        self.messages = messages;
    }

    fn emit(&self, kind: MessageKind, text: &str) {
        let line = self.messages.format(kind, text);
        for sink in &self.sinks {
            match kind.level() {
                SinkLevel::Info => sink.info(&line),
                SinkLevel::Error => sink.error(&line),
                SinkLevel::Fatal => sink.fatal(&line),
            }
        }
    }

    /// A tab-prefixed body line
    fn body(&self, kind: MessageKind, text: &str) {
        self.emit(kind, &format!("\t{}", text));
    }

    pub fn newline(&self) {
        self.emit(MessageKind::Info, "");
    }

    pub fn banner(&self, text: &str) {
        self.emit(MessageKind::Banner, text);
    }

    pub fn invert(&self, text: &str) {
        self.emit(MessageKind::Invert, text);
    }

    /// Report one case: header, then its outcome
    pub fn report(&self, case: &Case) {
        self.header(case);
        match case.outcome() {
            Some(Outcome::Passed) => self.body(MessageKind::Pass, "TEST Passed!"),
            Some(Outcome::Failed(failure)) | Some(Outcome::Errored(failure)) => {
                self.failure(failure)
            }
            None => {}
        }
        self.newline();
    }

    /// Report a failed or errored case with the command that reruns it
    ///
    /// Cases in any other state are skipped.
    pub fn final_report(&self, case: &Case, environment_variables: &[String]) {
        let failure = match case.failure() {
            Some(failure) => failure,
            None => return,
        };
        self.header(case);
        self.failure(failure);
        self.newline();
        self.body(MessageKind::Info, "To Rerun");
        self.body(
            MessageKind::Info,
            &self.rerun_command(case, environment_variables),
        );
        self.newline();
    }

    /// Report every case of `suite` allowed by `options`, then a summary
    pub fn report_suite(&self, suite: &Suite, options: &RunOptions) {
        for case in suite.cases() {
            if options.reports(case) {
                self.report(case);
            }
        }

        let counts = aggregate::count_by_status(suite);
        self.emit(
            MessageKind::Info,
            &format!(
                "{} passed / {} failed / {} errored / {} pending",
                counts.passed, counts.failed, counts.errored, counts.pending
            ),
        );
        if let (Some(name), Some(elapsed)) = (suite.name(), suite.time_elapsed()) {
            self.emit(
                MessageKind::Info,
                &format!("Suite {} finished in {:.2}s", name, elapsed),
            );
        }
    }

    /// Shell command that reruns `case` with the listed variables
    pub fn rerun_command(&self, case: &Case, environment_variables: &[String]) -> String {
        self.rerun_command_with(case, environment_variables, |name| std::env::var(name).ok())
    }

    /// [`Reporter::rerun_command`] reading variable values through `lookup`
    ///
    /// Variables without a value are left out.
    pub fn rerun_command_with<F>(
        &self,
        case: &Case,
        environment_variables: &[String],
        lookup: F,
    ) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut command = String::new();
        for name in environment_variables {
            if let Some(value) = lookup(name) {
                command.push_str(&format!("{}={} ", name, value));
            }
        }
        command.push_str(&format!(
            "{} {} {}",
            self.program,
            self.environment,
            case.trimmed_path()
        ));
        command
    }

    fn header(&self, case: &Case) {
        self.newline();
        self.emit(MessageKind::Name, case.display_path());
        let time = match case.elapsed() {
            Some(elapsed) => format!("time: {:.3}s", elapsed.as_secs_f64()),
            None => "time: -".to_string(),
        };
        self.body(MessageKind::Info, &time);
        self.newline();
    }

    /// Only the banner is fatal; failure details go to the error level
    fn failure(&self, failure: &Failure) {
        self.body(MessageKind::Failure, "TEST failed");
        self.body(MessageKind::Error, &failure.kind);
        self.body(MessageKind::Error, &failure.message);
        for frame in self.backtrace_filter.filtered_backtrace(&failure.backtrace) {
            self.body(MessageKind::Error, &frame);
        }
    }
}
