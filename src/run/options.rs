//! Options narrowing which cases a run executes or reports

use crate::case::Case;
use crate::error::Result;
use crate::status::Status;
use regex::Regex;

/// Filters passed through `run`, `rerun_failed`, `filter_from_options` and `report`
///
/// `include` and `exclude` are matched against a case's display path.
/// `only` restricts reports to cases with one status; it never affects
/// execution.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Only run cases whose display path matches
    pub include: Option<Regex>,
    /// Skip cases whose display path matches
    pub exclude: Option<Regex>,
    /// Only report cases with this status
    pub only: Option<Status>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the include filter
    pub fn include(mut self, pattern: &str) -> Result<Self> {
        self.include = Some(Regex::new(pattern)?);
        Ok(self)
    }

    /// Set the exclude filter
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        self.exclude = Some(Regex::new(pattern)?);
        Ok(self)
    }

    /// Restrict reports to cases with `status`
    pub fn only(mut self, status: Status) -> Self {
        self.only = Some(status);
        self
    }

    /// Whether `case` passes the include and exclude filters
    pub fn selects(&self, case: &Case) -> bool {
        let path = case.display_path();
        let included = self.include.as_ref().map_or(true, |re| re.is_match(path));
        let excluded = self.exclude.as_ref().map_or(false, |re| re.is_match(path));
        included && !excluded
    }

    /// Whether `case` should appear in a report
    pub fn reports(&self, case: &Case) -> bool {
        self.only.map_or(true, |status| case.status() == status)
    }
}
