//! Destinations for report lines

use std::cell::RefCell;
use std::rc::Rc;

/// A destination for report lines at three severities
pub trait LogSink {
    fn info(&self, line: &str);
    fn error(&self, line: &str);
    fn fatal(&self, line: &str);
}

/// Writes info lines to stdout, errors and fatals to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn info(&self, line: &str) {
        println!("{}", line);
    }

    fn error(&self, line: &str) {
        eprintln!("{}", line);
    }

    fn fatal(&self, line: &str) {
        eprintln!("{}", line);
    }
}

/// Forwards report lines to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogForwarder;

impl LogSink for LogForwarder {
    fn info(&self, line: &str) {
        log::info!(target: "testsuite::report", "{}", line);
    }

    fn error(&self, line: &str) {
        log::error!(target: "testsuite::report", "{}", line);
    }

    fn fatal(&self, line: &str) {
        log::error!(target: "testsuite::report", "FATAL {}", line);
    }
}

/// Severity a line was delivered at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkLevel {
    Info,
    Error,
    Fatal,
}

/// Keeps every line in a shared buffer
///
/// Clones share the buffer, so a clone can be handed to a reporter and the
/// original inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Rc<RefCell<Vec<(SinkLevel, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every captured line, in order
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().iter().map(|(_, line)| line.clone()).collect()
    }

    /// Captured lines delivered at `level`
    pub fn lines_at(&self, level: SinkLevel) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, line)| line.clone())
            .collect()
    }

    /// All captured lines joined by newlines
    pub fn contents(&self) -> String {
        self.lines().join("\n")
    }

    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }

    fn push(&self, level: SinkLevel, line: &str) {
        self.lines.borrow_mut().push((level, line.to_string()));
    }
}

impl LogSink for MemorySink {
    fn info(&self, line: &str) {
        self.push(SinkLevel::Info, line);
    }

    fn error(&self, line: &str) {
        self.push(SinkLevel::Error, line);
    }

    fn fatal(&self, line: &str) {
        self.push(SinkLevel::Fatal, line);
    }
}
