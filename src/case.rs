//! A single test case: the smallest executable unit

use crate::error::Result;
use crate::hooks::{EntityKind, HookEntity};
use crate::run::Execution;
use crate::status::{Failure, Outcome, Status};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// One test case file and the outcome of its latest execution attempt
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    path: PathBuf,
    display_path: String,
    elapsed: Option<Duration>,
    outcome: Option<Outcome>,
}

impl Case {
    /// Create a pending case; the display path is `path` relative to `project_root`
    pub fn new(path: impl Into<PathBuf>, project_root: impl AsRef<Path>) -> Self {
        let path = path.into();
        let display_path = path
            .strip_prefix(project_root.as_ref())
            .unwrap_or(&path)
            .to_string_lossy()
            .to_string();
        Self {
            path,
            display_path,
            elapsed: None,
            outcome: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the project root, as shown in reports and rerun commands
    pub fn display_path(&self) -> &str {
        &self.display_path
    }

    /// The display path without surrounding whitespace or a leading `./`
    pub fn trimmed_path(&self) -> &str {
        let trimmed = self.display_path.trim();
        trimmed.strip_prefix("./").unwrap_or(trimmed)
    }

    pub fn status(&self) -> Status {
        self.outcome
            .as_ref()
            .map(Outcome::status)
            .unwrap_or(Status::Pending)
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.outcome.as_ref().and_then(Outcome::failure)
    }

    /// Execution time of the latest attempt
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Store the result of an execution attempt, replacing any previous one
    pub fn record(&mut self, outcome: Outcome, elapsed: Duration) {
        self.outcome = Some(outcome);
        self.elapsed = Some(elapsed);
    }

    pub(crate) fn entity(&self) -> HookEntity {
        HookEntity {
            kind: EntityKind::Case,
            name: self.display_path.clone(),
            path: self.path.clone(),
        }
    }

    /// Execute the case through the configured executor, wrapped in case hooks
    pub fn execute(&mut self, exec: &Execution<'_>) -> Result<()> {
        let entity = self.entity();
        exec.hooks().wrap(EntityKind::Case, &entity, || {
            log::debug!("Executing case {}", self.display_path);
            let started = Instant::now();
            let outcome = exec.executor().execute(self);
            let elapsed = started.elapsed();
            log::debug!(
                "Case {} {} in {} ms",
                self.display_path,
                outcome.status(),
                elapsed.as_millis()
            );
            self.record(outcome, elapsed);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_path_is_relative_to_project_root() {
        let case = Case::new("/work/acceptance/login_suite/auth/valid.sh", "/work");
        assert_eq!(case.display_path(), "acceptance/login_suite/auth/valid.sh");
        assert_eq!(case.status(), Status::Pending);
        assert!(case.elapsed().is_none());
    }

    #[test]
    fn display_path_falls_back_to_full_path() {
        let case = Case::new("other/valid.sh", "/work");
        assert_eq!(case.display_path(), "other/valid.sh");
    }

    #[test]
    fn trimmed_path_drops_dot_prefix() {
        let case = Case::new("./suite/case.sh", "/nowhere");
        assert_eq!(case.trimmed_path(), "suite/case.sh");
    }

    #[test]
    fn record_overwrites_previous_outcome() {
        let mut case = Case::new("/p/case.sh", "/p");
        case.record(
            Outcome::Failed(Failure::new("AssertionError", "expected 200")),
            Duration::from_millis(40),
        );
        assert_eq!(case.status(), Status::Failed);
        assert_eq!(case.failure().unwrap().message, "expected 200");

        case.record(Outcome::Passed, Duration::from_millis(12));
        assert_eq!(case.status(), Status::Passed);
        assert!(case.failure().is_none());
        assert_eq!(case.elapsed(), Some(Duration::from_millis(12)));
    }
}
