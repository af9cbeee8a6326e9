//! Run configuration and suite-level configuration files

use crate::error::{Error, Result};
use crate::run::RunOptions;
use log::LevelFilter;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for one invocation of the runner
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Directory searched for suites
    pub root: PathBuf,
    /// Case paths are displayed relative to this directory
    pub project_root: PathBuf,
    /// Suite directory pattern; its `*`-stripped text is removed from suite names
    pub suite_pattern: String,
    /// Group directory pattern inside a suite
    pub group_pattern: String,
    /// Case file pattern inside a group
    pub case_pattern: String,
    /// Suite configuration file pattern, loaded before groups are discovered
    pub suite_config_pattern: String,
    /// Name of the active environment, part of the rerun command
    pub environment: String,
    /// Invocation token of the runner, part of the rerun command
    pub program: String,
    /// Environment variables surfaced in rerun commands, in order
    pub environment_variables: Vec<String>,
    /// Base URL handed to suites without their own
    pub base_url: Option<String>,
    /// Command used by the default executor; `{}` is the case path
    pub command: Vec<String>,
    /// Whether to rerun failed cases once after the main pass
    pub rerun_failed: bool,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
    /// Filters applied to every suite
    pub run_options: RunOptions,
}

impl Configuration {
    /// Create a configuration with default settings rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Configuration {
            project_root: root.clone(),
            root,
            suite_pattern: "*_suite".to_string(),
            group_pattern: "*".to_string(),
            case_pattern: "*".to_string(),
            suite_config_pattern: "*_configuration.toml".to_string(),
            environment: "local".to_string(),
            program: "testsuite".to_string(),
            environment_variables: Vec::new(),
            base_url: None,
            command: vec!["sh".to_string(), "{}".to_string()],
            rerun_failed: false,
            log_level: LevelFilter::Info,
            log_file: None,
            run_options: RunOptions::default(),
        }
    }

    /// Read the configuration from `TESTSUITE_*` process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, falling back to defaults
    ///
    /// Lists (`TESTSUITE_ENV_VARS`) are comma separated; `TESTSUITE_COMMAND`
    /// is split on whitespace.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root = lookup("TESTSUITE_ROOT").unwrap_or_else(|| ".".to_string());
        let mut config = Configuration::new(root);

        if let Some(project_root) = lookup("TESTSUITE_PROJECT_ROOT") {
            config.project_root = PathBuf::from(project_root);
        }
        if let Some(pattern) = lookup("TESTSUITE_SUITE_PATTERN") {
            config.suite_pattern = pattern;
        }
        if let Some(pattern) = lookup("TESTSUITE_GROUP_PATTERN") {
            config.group_pattern = pattern;
        }
        if let Some(pattern) = lookup("TESTSUITE_CASE_PATTERN") {
            config.case_pattern = pattern;
        }
        if let Some(environment) = lookup("TESTSUITE_ENV") {
            config.environment = environment;
        }
        if let Some(program) = lookup("TESTSUITE_PROGRAM") {
            config.program = program;
        }
        if let Some(names) = lookup("TESTSUITE_ENV_VARS") {
            config.environment_variables = names
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }
        config.base_url = lookup("TESTSUITE_BASE_URL");
        if let Some(command) = lookup("TESTSUITE_COMMAND") {
            config.command = command.split_whitespace().map(str::to_string).collect();
        }
        config.rerun_failed = lookup("TESTSUITE_RERUN")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);
        if let Some(level) = lookup("TESTSUITE_LOG") {
            config.log_level = level
                .parse()
                .map_err(|_| Error::Generic(format!("Invalid log level: {}", level)))?;
        }
        config.log_file = lookup("TESTSUITE_LOG_FILE").map(PathBuf::from);

        let mut options = RunOptions::new();
        if let Some(pattern) = lookup("TESTSUITE_INCLUDE") {
            options = options.include(&pattern)?;
        }
        if let Some(pattern) = lookup("TESTSUITE_EXCLUDE") {
            options = options.exclude(&pattern)?;
        }
        if let Some(status) = lookup("TESTSUITE_ONLY") {
            options = options.only(status.parse()?);
        }
        config.run_options = options;

        Ok(config)
    }

    /// Set the project root used for display paths
    pub fn project_root(mut self, project_root: impl Into<PathBuf>) -> Self {
        self.project_root = project_root.into();
        self
    }

    /// Set the suite directory pattern
    pub fn suite_pattern(mut self, pattern: &str) -> Self {
        self.suite_pattern = pattern.to_string();
        self
    }

    /// Set the group directory pattern
    pub fn group_pattern(mut self, pattern: &str) -> Self {
        self.group_pattern = pattern.to_string();
        self
    }

    /// Set the case file pattern
    pub fn case_pattern(mut self, pattern: &str) -> Self {
        self.case_pattern = pattern.to_string();
        self
    }

    /// Set the active environment name
    pub fn environment(mut self, environment: &str) -> Self {
        self.environment = environment.to_string();
        self
    }

    /// Set the program token printed in rerun commands
    pub fn program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    /// Surface an environment variable in rerun commands
    pub fn environment_variable(mut self, name: &str) -> Self {
        self.environment_variables.push(name.to_string());
        self
    }

    /// Set the default base URL
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.to_string());
        self
    }

    /// Set the command run by the default executor
    pub fn command(mut self, command: &[&str]) -> Self {
        self.command = command.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Enable or disable the rerun pass for failed cases
    pub fn rerun_failed(mut self, rerun: bool) -> Self {
        self.rerun_failed = rerun;
        self
    }

    /// Set the filters applied to every suite
    pub fn run_options(mut self, options: RunOptions) -> Self {
        self.run_options = options;
        self
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Source of the run configuration
pub trait ConfigurationProvider {
    fn configuration(&self) -> Result<Configuration>;
}

impl ConfigurationProvider for Configuration {
    fn configuration(&self) -> Result<Configuration> {
        Ok(self.clone())
    }
}

/// Provider reading `TESTSUITE_*` environment variables
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfiguration;

impl ConfigurationProvider for EnvConfiguration {
    fn configuration(&self) -> Result<Configuration> {
        Configuration::from_env()
    }
}

/// Settings read from a suite's `*_configuration.toml` files
///
/// ```toml
/// base_url = "https://staging.example.com"
/// environment_variables = ["API_TOKEN", "REGION"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SuiteConfiguration {
    pub base_url: Option<String>,
    pub environment_variables: Vec<String>,
}

impl SuiteConfiguration {
    /// Merge a configuration file into this one
    ///
    /// A later file's `base_url` wins; environment variables accumulate.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)?;
        let loaded: SuiteConfiguration = toml::from_str(&content)
            .map_err(|e| Error::config_error(path.to_string_lossy(), e))?;
        log::debug!("Loaded suite configuration {}", path.display());

        if loaded.base_url.is_some() {
            self.base_url = loaded.base_url;
        }
        for name in loaded.environment_variables {
            if !self.environment_variables.contains(&name) {
                self.environment_variables.push(name);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = Configuration::from_vars(vars(&[])).unwrap();
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.suite_pattern, "*_suite");
        assert_eq!(config.command, vec!["sh", "{}"]);
        assert!(!config.rerun_failed);
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn reads_overrides() {
        let config = Configuration::from_vars(vars(&[
            ("TESTSUITE_ROOT", "acceptance"),
            ("TESTSUITE_ENV", "staging"),
            ("TESTSUITE_ENV_VARS", "API_TOKEN, REGION,"),
            ("TESTSUITE_RERUN", "TRUE"),
            ("TESTSUITE_LOG", "debug"),
            ("TESTSUITE_COMMAND", "bash -e {}"),
            ("TESTSUITE_ONLY", "failed"),
        ]))
        .unwrap();

        assert_eq!(config.root, PathBuf::from("acceptance"));
        assert_eq!(config.project_root, PathBuf::from("acceptance"));
        assert_eq!(config.environment, "staging");
        assert_eq!(config.environment_variables, vec!["API_TOKEN", "REGION"]);
        assert!(config.rerun_failed);
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.command, vec!["bash", "-e", "{}"]);
        assert_eq!(config.run_options.only, Some(Status::Failed));
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(Configuration::from_vars(vars(&[("TESTSUITE_LOG", "loud")])).is_err());
        assert!(Configuration::from_vars(vars(&[("TESTSUITE_INCLUDE", "(")])).is_err());
    }

    #[test]
    fn suite_configuration_files_merge() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("a_configuration.toml");
        let second = dir.path().join("b_configuration.toml");
        fs::write(
            &first,
            "base_url = \"http://localhost:3000\"\nenvironment_variables = [\"API_TOKEN\"]\n",
        )
        .unwrap();
        fs::write(&second, "environment_variables = [\"API_TOKEN\", \"REGION\"]\n").unwrap();

        let mut config = SuiteConfiguration::default();
        config.load_file(&first).unwrap();
        config.load_file(&second).unwrap();

        assert_eq!(config.base_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(config.environment_variables, vec!["API_TOKEN", "REGION"]);
    }

    #[test]
    fn malformed_suite_configuration_names_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken_configuration.toml");
        fs::write(&path, "base_url = [").unwrap();

        let err = SuiteConfiguration::default().load_file(&path).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("broken_configuration.toml"));
    }
}
