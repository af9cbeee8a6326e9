//! Status queries over the suite → group → case tree
//!
//! Every node exposes its leaf cases through [`StatusTree`]. Aggregates are
//! recomputed from the current case state on each call.

use crate::case::Case;
use crate::status::Status;

/// A node of the test tree that can enumerate its leaf cases depth-first
pub trait StatusTree {
    /// Visit every leaf case under this node, in depth-first order
    fn visit_cases<'a>(&'a self, visit: &mut dyn FnMut(&'a Case));
}

/// All cases under `node` whose current status equals `status`
pub fn cases_with_status<T: StatusTree + ?Sized>(node: &T, status: Status) -> Vec<&Case> {
    cases_with_any_status(node, &[status])
}

/// All cases under `node` whose current status is one of `statuses`
pub fn cases_with_any_status<'a, T: StatusTree + ?Sized>(
    node: &'a T,
    statuses: &[Status],
) -> Vec<&'a Case> {
    let mut cases = Vec::new();
    node.visit_cases(&mut |case| {
        if statuses.contains(&case.status()) {
            cases.push(case);
        }
    });
    cases
}

/// Whether any case under `node` currently has `status`
pub fn has_status<T: StatusTree + ?Sized>(node: &T, status: Status) -> bool {
    let mut found = false;
    node.visit_cases(&mut |case| found |= case.status() == status);
    found
}

/// The failed ∪ errored subset, in tree order
pub fn failed_cases<T: StatusTree + ?Sized>(node: &T) -> Vec<&Case> {
    cases_with_any_status(node, &[Status::Failed, Status::Errored])
}

/// Whether any case under `node` failed or errored
pub fn has_failures<T: StatusTree + ?Sized>(node: &T) -> bool {
    has_status(node, Status::Failed) || has_status(node, Status::Errored)
}

/// Every leaf case under `node`
pub fn all_cases<T: StatusTree + ?Sized>(node: &T) -> Vec<&Case> {
    let mut cases = Vec::new();
    node.visit_cases(&mut |case| cases.push(case));
    cases
}

/// Per-status case counts for a subtree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub pending: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errored + self.pending
    }

    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Passed => self.passed,
            Status::Failed => self.failed,
            Status::Errored => self.errored,
            Status::Pending => self.pending,
        }
    }
}

impl std::ops::AddAssign for StatusCounts {
    fn add_assign(&mut self, other: Self) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.errored += other.errored;
        self.pending += other.pending;
    }
}

/// Count cases under `node` by status
pub fn count_by_status<T: StatusTree + ?Sized>(node: &T) -> StatusCounts {
    let mut counts = StatusCounts::default();
    node.visit_cases(&mut |case| match case.status() {
        Status::Passed => counts.passed += 1,
        Status::Failed => counts.failed += 1,
        Status::Errored => counts.errored += 1,
        Status::Pending => counts.pending += 1,
    });
    counts
}

impl StatusTree for Case {
    fn visit_cases<'a>(&'a self, visit: &mut dyn FnMut(&'a Case)) {
        visit(self)
    }
}

impl<T: StatusTree> StatusTree for [T] {
    fn visit_cases<'a>(&'a self, visit: &mut dyn FnMut(&'a Case)) {
        for node in self {
            node.visit_cases(visit);
        }
    }
}

impl<T: StatusTree> StatusTree for Vec<T> {
    fn visit_cases<'a>(&'a self, visit: &mut dyn FnMut(&'a Case)) {
        self.as_slice().visit_cases(visit)
    }
}
