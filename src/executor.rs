//! Executing a case body and classifying its outcome

use crate::case::Case;
use crate::status::{Failure, Outcome};
use std::process::Command;

/// Runs one case and classifies the result
///
/// Any `Fn(&Case) -> Outcome` is an executor.
pub trait Executor {
    fn execute(&self, case: &Case) -> Outcome;
}

impl<F> Executor for F
where
    F: Fn(&Case) -> Outcome,
{
    fn execute(&self, case: &Case) -> Outcome {
        self(case)
    }
}

/// Executes a case by running a program, with `{}` in the arguments replaced
/// by the case path
///
/// Exit status 0 passes and exit status 1 is an assertion failure. Any other
/// status, termination by signal, or failure to spawn is an error. When the
/// last line of stderr looks like `Kind: message`, it becomes the failure's
/// kind and message; stderr lines form the backtrace.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    program: String,
    args: Vec<String>,
}

impl CommandExecutor {
    /// Build from a command line such as `["sh", "{}"]`
    ///
    /// An empty command runs the case file directly.
    pub fn new(command: &[String]) -> Self {
        match command.split_first() {
            Some((program, args)) => Self {
                program: program.clone(),
                args: args.to_vec(),
            },
            None => Self {
                program: "{}".to_string(),
                args: Vec::new(),
            },
        }
    }

    fn construct_command(&self, case: &Case) -> Command {
        let path = case.path().to_string_lossy();
        let mut cmd = Command::new(self.program.replace("{}", &path));
        cmd.args(self.args.iter().map(|arg| arg.replace("{}", &path)));
        // A terminal interrupt must only reach the runner, which lets the
        // running case finish.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        cmd
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new(&["sh".to_string(), "{}".to_string()])
    }
}

impl Executor for CommandExecutor {
    fn execute(&self, case: &Case) -> Outcome {
        let output = match self.construct_command(case).output() {
            Ok(output) => output,
            Err(e) => {
                return Outcome::Errored(Failure::new(
                    "SpawnError",
                    format!("{}: {}", self.program, e),
                ))
            }
        };

        if output.status.success() {
            return Outcome::Passed;
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let frames: Vec<String> = stderr
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        let failure = match frames.last().and_then(|line| split_kind(line)) {
            Some((kind, message)) => Failure::new(kind, message),
            None => Failure::new(
                "ExitStatus",
                match output.status.code() {
                    Some(code) => format!("exited with status {}", code),
                    None => "terminated by signal".to_string(),
                },
            ),
        }
        .with_backtrace(frames);

        match output.status.code() {
            Some(1) => Outcome::Failed(failure),
            _ => Outcome::Errored(failure),
        }
    }
}

/// Split `RuntimeError: boom` into its kind and message
fn split_kind(line: &str) -> Option<(&str, &str)> {
    let (kind, message) = line.split_once(": ")?;
    let kind = kind.trim();
    let is_identifier = !kind.is_empty()
        && kind
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == ':' || c == '.');
    is_identifier.then(|| (kind, message.trim()))
}
