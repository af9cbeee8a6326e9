//! Case status and execution outcomes

use std::fmt;

/// Status of a case, or the status being queried on a subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Not executed yet
    Pending,
    /// Executed and passed
    Passed,
    /// An assertion-level failure
    Failed,
    /// An unexpected error while executing the case
    Errored,
}

impl Status {
    /// All statuses, in summary order
    pub const ALL: [Status; 4] = [
        Status::Passed,
        Status::Failed,
        Status::Errored,
        Status::Pending,
    ];

    /// Whether this status makes a case eligible for a rerun
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failed | Status::Errored)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Pending => "pending",
            Status::Passed => "passed",
            Status::Failed => "failed",
            Status::Errored => "errored",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Status {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Status::Pending),
            "pass" | "passed" => Ok(Status::Passed),
            "fail" | "failed" => Ok(Status::Failed),
            "error" | "errored" => Ok(Status::Errored),
            _ => Err(crate::Error::Generic(format!(
                "Unknown status '{}': must be one of pending, passed, failed, errored",
                s
            ))),
        }
    }
}

/// Exception identity captured when a case fails or errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Kind of the failure, e.g. `AssertionError` or `RuntimeError`
    pub kind: String,
    /// Human readable message
    pub message: String,
    /// Raw, unfiltered backtrace frames
    pub backtrace: Vec<String>,
}

impl Failure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            backtrace: Vec::new(),
        }
    }

    pub fn with_backtrace<I, S>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.backtrace = frames.into_iter().map(Into::into).collect();
        self
    }
}

/// Terminal result of one execution attempt of a case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed(Failure),
    Errored(Failure),
}

impl Outcome {
    pub fn status(&self) -> Status {
        match self {
            Outcome::Passed => Status::Passed,
            Outcome::Failed(_) => Status::Failed,
            Outcome::Errored(_) => Status::Errored,
        }
    }

    /// The captured failure, if any
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Passed => None,
            Outcome::Failed(failure) | Outcome::Errored(failure) => Some(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_maps_to_status() {
        assert_eq!(Outcome::Passed.status(), Status::Passed);
        let failure = Failure::new("AssertionError", "expected 1, got 2");
        assert_eq!(Outcome::Failed(failure.clone()).status(), Status::Failed);
        assert_eq!(Outcome::Errored(failure).status(), Status::Errored);
    }

    #[test]
    fn only_failed_and_errored_are_failures() {
        assert!(Status::Failed.is_failure());
        assert!(Status::Errored.is_failure());
        assert!(!Status::Passed.is_failure());
        assert!(!Status::Pending.is_failure());
    }

    #[test]
    fn parse_status_aliases() {
        assert_eq!("fail".parse::<Status>().unwrap(), Status::Failed);
        assert_eq!("errored".parse::<Status>().unwrap(), Status::Errored);
        assert!("missing".parse::<Status>().is_err());
    }
}
