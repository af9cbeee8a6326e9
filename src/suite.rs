//! A test suite: one discovery directory, its groups and its run history

use crate::aggregate::{self, StatusTree};
use crate::case::Case;
use crate::config::SuiteConfiguration;
use crate::discovery::{self, EntryType};
use crate::error::Result;
use crate::group::{Group, GroupCollection};
use crate::hooks::{EntityKind, HookEntity};
use crate::run::{Execution, Harness, RunOptions};
use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Top-level orchestrator for one suite directory
pub struct Suite {
    directory: PathBuf,
    harness: Rc<Harness>,
    configuration: SuiteConfiguration,
    groups: Option<GroupCollection>,
    start_time: Option<DateTime<Local>>,
    end_time: Option<DateTime<Local>>,
    has_run: bool,
}

impl Suite {
    pub fn new(directory: impl Into<PathBuf>, harness: Rc<Harness>) -> Self {
        Self {
            directory: directory.into(),
            harness,
            configuration: SuiteConfiguration::default(),
            groups: None,
            start_time: None,
            end_time: None,
            has_run: false,
        }
    }

    /// Use an already built group collection instead of discovering one
    pub fn with_groups(mut self, groups: Vec<Group>) -> Self {
        self.groups = (!groups.is_empty()).then(|| GroupCollection::new(groups));
        self
    }

    /// Discover the suite's configuration files and groups
    ///
    /// Configuration files are loaded first, then every directory matching
    /// the group pattern becomes a group. A suite without matching group
    /// directories has no group collection.
    pub fn build_dependencies(mut self) -> Result<Self> {
        let configuration = self.harness.configuration();
        let config_pattern = discovery::glob_regex(&configuration.suite_config_pattern)?;
        let group_pattern = discovery::glob_regex(&configuration.group_pattern)?;

        for file in discovery::entries(&self.directory, EntryType::File, &config_pattern)? {
            self.configuration.load_file(&file)?;
        }

        let mut groups = Vec::new();
        for dir in discovery::entries(&self.directory, EntryType::Dir, &group_pattern)? {
            groups.push(Group::discover(&dir, configuration)?);
        }
        log::debug!(
            "Suite {} has {} group(s)",
            self.directory.display(),
            groups.len()
        );

        Ok(self.with_groups(groups))
    }

    /// Execute the whole tree inside suite hooks
    ///
    /// Does nothing when the suite has no groups or cancellation was already
    /// requested.
    pub fn run(&mut self, options: &RunOptions) -> Result<&mut Self> {
        if self.groups.is_none() {
            return Ok(self);
        }
        if self.harness.cancellation_flag().is_cancelled() {
            log::warn!("Cancelled, skipping suite {}", self.directory.display());
            return Ok(self);
        }

        self.start_time = Some(Local::now());
        self.has_run = true;
        if let Some(name) = self.name() {
            self.harness
                .reporter()
                .banner(&format!("Running Test Suite: {}", name));
        }

        self.execute(options, GroupCollection::run)?;
        self.end_time = Some(Local::now());
        Ok(self)
    }

    /// Execute again the cases that are currently failed or errored
    pub fn rerun_failed(&mut self, options: &RunOptions) -> Result<&mut Self> {
        if self.groups.is_none() || !aggregate::has_failures(&*self) {
            return Ok(self);
        }
        if self.harness.cancellation_flag().is_cancelled() {
            log::warn!("Cancelled, skipping rerun of suite {}", self.directory.display());
            return Ok(self);
        }

        if let Some(name) = self.name() {
            let reporter = self.harness.reporter();
            reporter.newline();
            reporter.invert(&format!("Rerunning failed tests for {}", name));
            reporter.newline();
        }

        self.execute(options, GroupCollection::rerun_failed)?;
        self.end_time = Some(Local::now());
        Ok(self)
    }

    fn execute<F>(&mut self, options: &RunOptions, pass: F) -> Result<()>
    where
        F: FnOnce(&mut GroupCollection, &Execution<'_>) -> Result<()>,
    {
        let entity = self.entity();
        let harness = &self.harness;
        let groups = &mut self.groups;
        let exec = Execution::new(harness, options);
        harness.registered_hooks().wrap(EntityKind::Suite, &entity, || match groups {
            Some(groups) => pass(groups, &exec),
            None => Ok(()),
        })
    }

    /// Report every case, then a summary
    pub fn report(&self, options: &RunOptions) {
        if self.groups.is_none() {
            return;
        }
        self.harness.reporter().report_suite(self, options);
    }

    /// Report failed and errored cases with a command to rerun each
    pub fn final_report(&self) {
        let environment_variables = self.environment_variables();
        for case in aggregate::failed_cases(self) {
            self.harness
                .reporter()
                .final_report(case, &environment_variables);
        }
    }

    /// Suite name: the directory name with the suite pattern's suffix removed
    ///
    /// `None` when the directory does not contain the suffix.
    pub fn name(&self) -> Option<String> {
        let suffix = self.harness.configuration().suite_pattern.replace('*', "");
        let directory = self.directory.to_str()?;
        let stripped = if suffix.is_empty() {
            directory
        } else {
            &directory[..directory.rfind(&suffix)?]
        };
        Path::new(stripped)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
    }

    fn entity(&self) -> HookEntity {
        HookEntity {
            kind: EntityKind::Suite,
            name: self
                .name()
                .unwrap_or_else(|| self.directory.display().to_string()),
            path: self.directory.clone(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn groups(&self) -> Option<&GroupCollection> {
        self.groups.as_ref()
    }

    pub fn configuration(&self) -> &SuiteConfiguration {
        &self.configuration
    }

    /// The suite's base URL, or the run-wide one
    pub fn base_url(&self) -> Option<&str> {
        self.configuration
            .base_url
            .as_deref()
            .or(self.harness.configuration().base_url.as_deref())
    }

    /// Variables surfaced in rerun commands: run-wide ones, then the suite's
    pub fn environment_variables(&self) -> Vec<String> {
        let mut names = self.harness.configuration().environment_variables.clone();
        for name in &self.configuration.environment_variables {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    /// Narrow the tree in place
    pub fn filter_from_options(&mut self, options: &RunOptions) {
        if let Some(groups) = self.groups.as_mut() {
            groups.filter_from_options(options);
        }
    }

    pub fn has_available_tests(&self) -> bool {
        self.groups
            .as_ref()
            .map_or(false, GroupCollection::has_available_tests)
    }

    pub fn has_run(&self) -> bool {
        self.has_run
    }

    pub fn start_time(&self) -> Option<DateTime<Local>> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Local>> {
        self.end_time
    }

    /// Seconds between start and end, once both are known
    pub fn time_elapsed(&self) -> Option<f64> {
        let (start, end) = (self.start_time?, self.end_time?);
        (end - start).to_std().ok().map(|d| d.as_secs_f64())
    }

    /// Every leaf case, depth-first
    pub fn cases(&self) -> Vec<&Case> {
        aggregate::all_cases(self)
    }

    /// Timing and identity of the suite
    ///
    /// Keys are `time_elapsed`, `start_time`, `end_time`, `directory` and
    /// `name`; a value that cannot be computed is left out.
    pub fn metadata(&self) -> Map<String, Value> {
        let fields = [
            ("time_elapsed", self.time_elapsed().map(Value::from)),
            (
                "start_time",
                self.start_time.map(|t| Value::from(t.to_rfc3339())),
            ),
            ("end_time", self.end_time.map(|t| Value::from(t.to_rfc3339()))),
            ("directory", self.directory.to_str().map(Value::from)),
            ("name", self.name().map(Value::from)),
        ];
        fields
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key.to_string(), value)))
            .collect()
    }
}

impl fmt::Debug for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suite")
            .field("directory", &self.directory)
            .field("configuration", &self.configuration)
            .field("groups", &self.groups)
            .field("start_time", &self.start_time)
            .field("end_time", &self.end_time)
            .field("has_run", &self.has_run)
            .finish()
    }
}

impl StatusTree for Suite {
    fn visit_cases<'a>(&'a self, visit: &mut dyn FnMut(&'a Case)) {
        if let Some(groups) = &self.groups {
            groups.visit_cases(visit);
        }
    }
}
