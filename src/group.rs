//! Groups of cases and the collection of groups owned by a suite

use crate::aggregate::{self, StatusTree};
use crate::case::Case;
use crate::config::Configuration;
use crate::discovery::{self, EntryType};
use crate::error::Result;
use crate::hooks::{EntityKind, HookEntity};
use crate::run::{Execution, RunOptions};
use std::path::{Path, PathBuf};

/// A child of a group
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Case(Case),
    Group(Group),
}

/// A named directory of cases and nested groups
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    name: String,
    directory: PathBuf,
    entries: Vec<Entry>,
}

impl Group {
    pub fn new(name: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            entries: Vec::new(),
        }
    }

    /// Append a case
    pub fn with_case(mut self, case: Case) -> Self {
        self.entries.push(Entry::Case(case));
        self
    }

    /// Append a nested group
    pub fn with_group(mut self, group: Group) -> Self {
        self.entries.push(Entry::Group(group));
        self
    }

    /// Build a group from `directory`
    ///
    /// Files matching the case pattern become cases; sub-directories that
    /// contain cases become nested groups. Files and directories are
    /// interleaved in name order.
    pub fn discover(directory: &Path, configuration: &Configuration) -> Result<Self> {
        let case_pattern = discovery::glob_regex(&configuration.case_pattern)?;
        Self::discover_with(directory, configuration, &case_pattern)
    }

    fn discover_with(
        directory: &Path,
        configuration: &Configuration,
        case_pattern: &regex::Regex,
    ) -> Result<Self> {
        let name = directory
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| directory.display().to_string());
        let mut group = Group::new(name, directory);

        let files = discovery::entries(directory, EntryType::File, case_pattern)?;
        let any = discovery::glob_regex("*")?;
        let dirs = discovery::entries(directory, EntryType::Dir, &any)?;

        let mut children: Vec<(PathBuf, bool)> = files
            .into_iter()
            .map(|p| (p, false))
            .chain(dirs.into_iter().map(|p| (p, true)))
            .collect();
        children.sort();

        for (path, is_dir) in children {
            if is_dir {
                let nested = Self::discover_with(&path, configuration, case_pattern)?;
                if nested.has_available_tests() {
                    group.entries.push(Entry::Group(nested));
                }
            } else {
                group
                    .entries
                    .push(Entry::Case(Case::new(path, &configuration.project_root)));
            }
        }

        log::debug!(
            "Discovered group {} with {} entries",
            group.name,
            group.entries.len()
        );
        Ok(group)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    fn entity(&self) -> HookEntity {
        HookEntity {
            kind: EntityKind::Group,
            name: self.name.clone(),
            path: self.directory.clone(),
        }
    }

    pub fn has_available_tests(&self) -> bool {
        !aggregate::all_cases(self).is_empty()
    }

    fn has_selected_cases(&self, options: &RunOptions) -> bool {
        aggregate::all_cases(self)
            .into_iter()
            .any(|case| options.selects(case))
    }

    /// Drop cases rejected by `options`, then nested groups left empty
    pub fn filter_from_options(&mut self, options: &RunOptions) {
        self.entries.retain_mut(|entry| match entry {
            Entry::Case(case) => options.selects(case),
            Entry::Group(group) => {
                group.filter_from_options(options);
                group.has_available_tests()
            }
        });
    }

    /// Execute every selected case, depth-first, inside group hooks
    ///
    /// Groups without a selected case are skipped entirely.
    pub fn run(&mut self, exec: &Execution<'_>) -> Result<()> {
        if !self.has_selected_cases(exec.options()) {
            return Ok(());
        }
        let entity = self.entity();
        let entries = &mut self.entries;
        exec.hooks().wrap(EntityKind::Group, &entity, || {
            for entry in entries.iter_mut() {
                if exec.is_cancelled() {
                    log::warn!("Cancelled, not starting the rest of group {}", entity.name);
                    break;
                }
                match entry {
                    Entry::Case(case) => {
                        if exec.selects(case) {
                            case.execute(exec)?;
                        }
                    }
                    Entry::Group(group) => group.run(exec)?,
                }
            }
            Ok(())
        })
    }

    /// Execute again only the cases that failed or errored
    ///
    /// Status is checked as each entry is reached, so a nested group is
    /// skipped when none of its cases is failing at that moment.
    pub fn rerun_failed(&mut self, exec: &Execution<'_>) -> Result<()> {
        if !aggregate::has_failures(self) {
            return Ok(());
        }
        let entity = self.entity();
        let entries = &mut self.entries;
        exec.hooks().wrap(EntityKind::Group, &entity, || {
            for entry in entries.iter_mut() {
                if exec.is_cancelled() {
                    log::warn!("Cancelled, not rerunning the rest of group {}", entity.name);
                    break;
                }
                match entry {
                    Entry::Case(case) => {
                        if case.status().is_failure() && exec.selects(case) {
                            case.execute(exec)?;
                        }
                    }
                    Entry::Group(group) => group.rerun_failed(exec)?,
                }
            }
            Ok(())
        })
    }
}

impl StatusTree for Group {
    fn visit_cases<'a>(&'a self, visit: &mut dyn FnMut(&'a Case)) {
        for entry in &self.entries {
            match entry {
                Entry::Case(case) => visit(case),
                Entry::Group(group) => group.visit_cases(visit),
            }
        }
    }
}

/// The top-level groups of a suite
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupCollection {
    groups: Vec<Group>,
}

impl GroupCollection {
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn has_available_tests(&self) -> bool {
        self.groups.iter().any(Group::has_available_tests)
    }

    /// Narrow every group in place and drop groups left without cases
    pub fn filter_from_options(&mut self, options: &RunOptions) {
        self.groups.retain_mut(|group| {
            group.filter_from_options(options);
            group.has_available_tests()
        });
    }

    pub fn run(&mut self, exec: &Execution<'_>) -> Result<()> {
        for group in &mut self.groups {
            if exec.is_cancelled() {
                log::warn!("Cancelled, not starting group {}", group.name());
                break;
            }
            group.run(exec)?;
        }
        Ok(())
    }

    pub fn rerun_failed(&mut self, exec: &Execution<'_>) -> Result<()> {
        for group in &mut self.groups {
            if exec.is_cancelled() {
                log::warn!("Cancelled, not rerunning group {}", group.name());
                break;
            }
            group.rerun_failed(exec)?;
        }
        Ok(())
    }
}

impl StatusTree for GroupCollection {
    fn visit_cases<'a>(&'a self, visit: &mut dyn FnMut(&'a Case)) {
        self.groups.visit_cases(visit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{cases_with_status, failed_cases};
    use crate::run::Harness;
    use crate::status::{Failure, Outcome, Status};
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn case(path: &str) -> Case {
        Case::new(path, "/")
    }

    /// Executor failing every case whose path contains "bad"
    fn by_name(case: &Case) -> Outcome {
        if case.display_path().contains("bad") {
            Outcome::Failed(Failure::new("AssertionError", "bad case"))
        } else {
            Outcome::Passed
        }
    }

    fn tree() -> Group {
        Group::new("root", "/root")
            .with_case(case("/root/a.sh"))
            .with_group(
                Group::new("nested", "/root/nested")
                    .with_case(case("/root/nested/bad.sh"))
                    .with_case(case("/root/nested/c.sh")),
            )
            .with_case(case("/root/d.sh"))
    }

    #[test]
    fn run_executes_depth_first() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&order);
        let harness = Harness::new(Configuration::default()).executor(move |case: &Case| {
            seen.borrow_mut().push(case.display_path().to_string());
            Outcome::Passed
        });
        let options = RunOptions::default();
        let exec = Execution::new(&harness, &options);

        let mut group = tree();
        group.run(&exec).unwrap();

        assert_eq!(
            *order.borrow(),
            vec!["root/a.sh", "root/nested/bad.sh", "root/nested/c.sh", "root/d.sh"]
        );
        assert!(cases_with_status(&group, Status::Pending).is_empty());
    }

    #[test]
    fn cancellation_stops_before_next_unit() {
        let harness = Harness::new(Configuration::default());
        let flag = harness.cancellation_flag().clone();
        let harness = harness.executor(move |_: &Case| {
            flag.cancel();
            Outcome::Passed
        });
        let options = RunOptions::default();
        let exec = Execution::new(&harness, &options);

        let mut group = tree();
        group.run(&exec).unwrap();

        assert_eq!(cases_with_status(&group, Status::Passed).len(), 1);
        assert_eq!(cases_with_status(&group, Status::Pending).len(), 3);
    }

    #[test]
    fn rerun_only_touches_failures() {
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let harness = Harness::new(Configuration::default()).executor(move |case: &Case| {
            *counter.borrow_mut() += 1;
            by_name(case)
        });
        let options = RunOptions::default();
        let exec = Execution::new(&harness, &options);

        let mut group = tree();
        group.run(&exec).unwrap();
        assert_eq!(*calls.borrow(), 4);
        assert_eq!(failed_cases(&group).len(), 1);

        group.rerun_failed(&exec).unwrap();
        assert_eq!(*calls.borrow(), 5);
        assert_eq!(cases_with_status(&group, Status::Passed).len(), 3);
    }

    #[test]
    fn rerun_without_failures_is_a_noop() {
        let mut group = tree();
        for entry in group.entries.iter_mut() {
            if let Entry::Case(case) = entry {
                case.record(Outcome::Passed, Duration::ZERO);
            }
        }
        let harness = Harness::new(Configuration::default())
            .executor(|_: &Case| -> Outcome { panic!("nothing should run") });
        let options = RunOptions::default();
        group.rerun_failed(&Execution::new(&harness, &options)).unwrap();
    }

    #[test]
    fn run_honors_filters_without_removing_cases() {
        let harness = Harness::new(Configuration::default()).executor(by_name);
        let options = RunOptions::new().include("nested").unwrap();
        let exec = Execution::new(&harness, &options);

        let mut group = tree();
        group.run(&exec).unwrap();

        assert_eq!(aggregate::all_cases(&group).len(), 4);
        assert_eq!(cases_with_status(&group, Status::Pending).len(), 2);
    }

    #[test]
    fn filter_prunes_empty_groups() {
        let mut group = tree();
        group.filter_from_options(&RunOptions::new().exclude("nested").unwrap());
        assert_eq!(group.entries().len(), 2);
        assert!(group
            .entries()
            .iter()
            .all(|entry| matches!(entry, Entry::Case(_))));
    }

    #[test]
    fn discover_builds_nested_groups() {
        let dir = TempDir::new().unwrap();
        let group_dir = dir.path().join("auth");
        fs::create_dir_all(group_dir.join("tokens")).unwrap();
        fs::create_dir_all(group_dir.join("empty")).unwrap();
        fs::write(group_dir.join("b_login.sh"), "exit 0").unwrap();
        fs::write(group_dir.join("a_logout.sh"), "exit 0").unwrap();
        fs::write(group_dir.join("notes.md"), "ignored").unwrap();
        fs::write(group_dir.join("tokens").join("refresh.sh"), "exit 0").unwrap();

        let configuration = Configuration::new(dir.path()).case_pattern("*.sh");
        let group = Group::discover(&group_dir, &configuration).unwrap();

        assert_eq!(group.name(), "auth");
        let paths: Vec<_> = aggregate::all_cases(&group)
            .into_iter()
            .map(|c| c.display_path().to_string())
            .collect();
        assert_eq!(
            paths,
            vec!["auth/a_logout.sh", "auth/b_login.sh", "auth/tokens/refresh.sh"]
        );
        assert_eq!(group.entries().len(), 3);
    }
}
