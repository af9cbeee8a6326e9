//! Whole runs through `Runner`, from discovery to exit code

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use testsuite_rs::{
    testsuite, Case, CancellationFlag, Configuration, Error, Failure, MemorySink, Outcome,
    RunOptions, Runner, Status,
};

fn touch(root: &Path, relative: &str, body: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn flaky_free(case: &Case) -> Outcome {
    if case.display_path().contains("broken") {
        Outcome::Failed(Failure::new("AssertionError", "expected 200, got 500"))
    } else {
        Outcome::Passed
    }
}

#[test]
fn clean_run_exits_zero() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "billing_suite/invoices/create.sh", "");
    touch(dir.path(), "search_suite/query/basic.sh", "");

    let summary = testsuite::run(dir.path())
        .executor(flaky_free)
        .invoke()
        .unwrap();

    assert_eq!(summary.suites, 2);
    assert_eq!(summary.counts.passed, 2);
    assert!(!summary.cancelled);
    assert_eq!(summary.exit_code(), 0);
}

#[test]
fn failures_are_reported_with_rerun_command() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "billing_suite/invoices/create.sh", "");
    touch(dir.path(), "billing_suite/invoices/broken_refund.sh", "");

    std::env::set_var("BILLING_REGION", "eu");
    let sink = MemorySink::new();
    let configuration = Configuration::new(dir.path())
        .environment("ci")
        .environment_variable("BILLING_REGION");
    let summary = Runner::with_provider(configuration)
        .executor(flaky_free)
        .sink(sink.clone())
        .invoke()
        .unwrap();

    assert_eq!(summary.counts.failed, 1);
    assert_eq!(summary.exit_code(), 1);

    let contents = sink.contents();
    assert!(contents.contains("TEST failed"));
    assert!(contents.contains("expected 200, got 500"));
    assert!(contents.contains("To Rerun"));
    assert!(contents
        .contains("BILLING_REGION=eu testsuite ci billing_suite/invoices/broken_refund.sh"));
}

#[test]
fn rerun_pass_recovers_flaky_cases() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("attempted");
    touch(dir.path(), "billing_suite/invoices/flaky.sh", "");

    let seen = marker.clone();
    let executor = move |_: &Case| {
        if seen.exists() {
            Outcome::Passed
        } else {
            fs::write(&seen, "").unwrap();
            Outcome::Errored(Failure::new("Timeout", "upstream slow"))
        }
    };

    let sink = MemorySink::new();
    let summary = Runner::with_provider(Configuration::new(dir.path()).rerun_failed(true))
        .executor(executor)
        .sink(sink.clone())
        .invoke()
        .unwrap();

    assert!(marker.exists());
    assert_eq!(summary.counts.passed, 1);
    assert_eq!(summary.counts.errored, 0);
    assert_eq!(summary.exit_code(), 0);
    assert!(sink.contents().contains("Rerunning failed tests for billing"));
    assert!(!sink.contents().contains("To Rerun"));
}

#[test]
fn include_filter_limits_execution() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "billing_suite/invoices/create.sh", "");
    touch(dir.path(), "billing_suite/invoices/broken_refund.sh", "");
    touch(dir.path(), "search_suite/query/basic.sh", "");

    let options = RunOptions::new().include("invoices/create").unwrap();
    let summary = Runner::with_provider(Configuration::new(dir.path()).run_options(options))
        .executor(flaky_free)
        .invoke()
        .unwrap();

    assert_eq!(summary.suites, 1);
    assert_eq!(summary.counts.total(), 1);
    assert_eq!(summary.counts.get(Status::Passed), 1);
}

#[test]
fn cancelled_before_start_runs_nothing() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "billing_suite/invoices/create.sh", "");

    let flag = CancellationFlag::new();
    flag.cancel();
    let summary = testsuite::run(dir.path())
        .cancellation(flag)
        .executor(|_: &Case| -> Outcome { panic!("nothing should execute") })
        .invoke()
        .unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.counts.pending, 1);
    assert_eq!(summary.exit_code(), 1);
}

#[test]
fn missing_suites_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = testsuite::run(dir.path()).invoke().unwrap_err();
    assert!(matches!(err, Error::NoSuites { .. }));
}

#[cfg(unix)]
#[test]
fn command_executor_runs_shell_cases() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "shell_suite/basics/ok.sh", "exit 0\n");
    touch(
        dir.path(),
        "shell_suite/basics/bad.sh",
        "echo 'AssertionError: wrong answer' >&2\nexit 1\n",
    );

    let sink = MemorySink::new();
    let summary = testsuite::run(dir.path())
        .sink(sink.clone())
        .invoke()
        .unwrap();

    assert_eq!(summary.counts.passed, 1);
    assert_eq!(summary.counts.failed, 1);
    let contents = sink.contents();
    assert!(contents.contains("AssertionError"));
    assert!(contents.contains("wrong answer"));
    assert!(contents.contains("testsuite local shell_suite/basics/bad.sh"));
}
