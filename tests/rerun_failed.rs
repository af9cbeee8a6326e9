//! Rerunning only the failed and errored cases of a suite

use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use tempfile::TempDir;
use testsuite_rs::aggregate;
use testsuite_rs::{
    Case, Configuration, EntityKind, Failure, Harness, Hooks, Outcome, RunOptions, Status, Suite,
};

type Calls = Rc<RefCell<Vec<String>>>;

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "").unwrap();
}

/// Executor that records every call; cases listed in `failing` fail until removed
fn recording_executor(
    calls: &Calls,
    failing: &Rc<RefCell<HashSet<String>>>,
) -> impl Fn(&Case) -> Outcome + 'static {
    let calls = Rc::clone(calls);
    let failing = Rc::clone(failing);
    move |case: &Case| {
        let name = case.display_path().to_string();
        calls.borrow_mut().push(name.clone());
        if failing.borrow().contains(&name) {
            Outcome::Failed(Failure::new("AssertionError", "still broken"))
        } else if name.ends_with("crash.sh") {
            Outcome::Errored(Failure::new("RuntimeError", "boom"))
        } else {
            Outcome::Passed
        }
    }
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "api_suite/orders/create.sh");
    touch(dir.path(), "api_suite/orders/cancel.sh");
    touch(dir.path(), "api_suite/users/crash.sh");
    touch(dir.path(), "api_suite/users/signup.sh");
    touch(dir.path(), "api_suite/users/admin/grant.sh");
    dir
}

#[test]
fn rerun_touches_exactly_failed_and_errored() {
    let dir = fixture();
    let calls: Calls = Rc::default();
    let failing = Rc::new(RefCell::new(HashSet::from([
        "api_suite/orders/cancel.sh".to_string()
    ])));
    let harness = Harness::new(Configuration::new(dir.path()))
        .executor(recording_executor(&calls, &failing));
    let mut suite = Suite::new(dir.path().join("api_suite"), Rc::new(harness))
        .build_dependencies()
        .unwrap();

    let options = RunOptions::new();
    suite.run(&options).unwrap();
    assert_eq!(calls.borrow().len(), 5);

    let before: Vec<String> = aggregate::failed_cases(&suite)
        .iter()
        .map(|c| c.display_path().to_string())
        .collect();
    assert_eq!(
        before,
        vec!["api_suite/orders/cancel.sh", "api_suite/users/crash.sh"]
    );
    let first_end = suite.end_time().unwrap();

    calls.borrow_mut().clear();
    failing.borrow_mut().clear();
    suite.rerun_failed(&options).unwrap();

    assert_eq!(*calls.borrow(), before);
    let cancel = suite
        .cases()
        .into_iter()
        .find(|c| c.display_path() == "api_suite/orders/cancel.sh")
        .unwrap();
    assert_eq!(cancel.status(), Status::Passed);
    assert_eq!(aggregate::failed_cases(&suite).len(), 1);
    assert_eq!(aggregate::count_by_status(&suite).passed, 4);
    assert!(suite.end_time().unwrap() >= first_end);
}

#[test]
fn rerun_without_failures_is_a_noop() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "api_suite/orders/create.sh");

    let calls: Calls = Rc::default();
    let failing = Rc::default();
    let harness = Harness::new(Configuration::new(dir.path()))
        .executor(recording_executor(&calls, &failing));
    let mut suite = Suite::new(dir.path().join("api_suite"), Rc::new(harness))
        .build_dependencies()
        .unwrap();

    suite.run(&RunOptions::new()).unwrap();
    let end_time = suite.end_time();
    calls.borrow_mut().clear();

    suite.rerun_failed(&RunOptions::new()).unwrap();
    assert!(calls.borrow().is_empty());
    assert_eq!(suite.end_time(), end_time);
}

#[test]
fn rerun_skips_hooks_of_clean_groups() {
    let dir = fixture();
    let calls: Calls = Rc::default();
    let failing = Rc::default();
    let groups: Calls = Rc::default();
    let seen = Rc::clone(&groups);
    let hooks = Hooks::new().before(EntityKind::Group, move |group| {
        seen.borrow_mut().push(group.name.clone());
        Ok(())
    });
    let harness = Harness::new(Configuration::new(dir.path()))
        .hooks(hooks)
        .executor(recording_executor(&calls, &failing));
    let mut suite = Suite::new(dir.path().join("api_suite"), Rc::new(harness))
        .build_dependencies()
        .unwrap();

    suite.run(&RunOptions::new()).unwrap();
    assert_eq!(*groups.borrow(), vec!["orders", "users", "admin"]);

    groups.borrow_mut().clear();
    suite.rerun_failed(&RunOptions::new()).unwrap();
    assert_eq!(*groups.borrow(), vec!["users"]);
}
