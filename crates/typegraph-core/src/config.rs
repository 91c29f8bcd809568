//! Resolver configuration with precedence tracking.
//!
//! Precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (`TYPEGRAPH_*`)
//! 3. JSON config file
//! 4. Defaults

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ProjectId;

/// Root of the Java type hierarchy; array members resolve against it.
pub const DEFAULT_ROOT_TYPE: &str = "java.lang.Object";

/// Project that `Unknown` placeholder rows are filed under.
pub const DEFAULT_UNKNOWNS_PROJECT: ProjectId = ProjectId(0);

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while assembling configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value could not be parsed.
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    /// IO error reading the config file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Config file is not valid JSON for [`ConfigFile`].
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

// ============================================================================
// Model Mode
// ============================================================================

/// Whether type models also wire an inheritance graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelMode {
    /// Declared entities only; cheap, no virtual dispatch.
    Plain,
    /// Entities plus extends/implements parents; supports virtual dispatch.
    #[default]
    Virtual,
}

impl FromStr for ModelMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(ModelMode::Plain),
            "virtual" => Ok(ModelMode::Virtual),
            other => Err(ConfigError::InvalidValue {
                key: "mode".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ModelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelMode::Plain => f.write_str("plain"),
            ModelMode::Virtual => f.write_str("virtual"),
        }
    }
}

// ============================================================================
// Configuration Sources
// ============================================================================

/// Configuration value source (for precedence tracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigSource {
    /// Built-in default value.
    Default = 0,
    /// From the JSON config file.
    ConfigFile = 1,
    /// From environment variable.
    EnvVar = 2,
    /// From CLI flag (highest precedence).
    CliFlag = 3,
}

/// A configuration value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        ConfigValue { value, source }
    }
}

/// On-disk configuration. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub root_type: Option<String>,
    #[serde(default)]
    pub mode: Option<ModelMode>,
    #[serde(default)]
    pub core_library: Option<ProjectId>,
    #[serde(default)]
    pub unknowns_project: Option<ProjectId>,
    #[serde(default)]
    pub libraries: Option<Vec<ProjectId>>,
    #[serde(default)]
    pub projects: Option<Vec<ProjectId>>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root_type: Option<String>,
    pub mode: Option<ModelMode>,
    pub core_library: Option<ProjectId>,
    pub unknowns_project: Option<ProjectId>,
    pub libraries: Option<Vec<ProjectId>>,
    pub projects: Option<Vec<ProjectId>>,
}

// ============================================================================
// Configuration Resolution
// ============================================================================

/// Resolved configuration with precedence information.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// FQN of the root object type.
    pub root_type: ConfigValue<String>,
    /// Plain or virtual models.
    pub mode: ConfigValue<ModelMode>,
    /// Project holding the platform core library, if any.
    pub core_library: Option<ConfigValue<ProjectId>>,
    /// Owner of placeholder rows for unresolvable names.
    pub unknowns_project: ConfigValue<ProjectId>,
    /// Third-party libraries included in the shared baseline.
    pub libraries: ConfigValue<Vec<ProjectId>>,
    /// Projects to resolve against the baseline.
    pub projects: ConfigValue<Vec<ProjectId>>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            root_type: ConfigValue::new(DEFAULT_ROOT_TYPE.to_string(), ConfigSource::Default),
            mode: ConfigValue::new(ModelMode::default(), ConfigSource::Default),
            core_library: None,
            unknowns_project: ConfigValue::new(DEFAULT_UNKNOWNS_PROJECT, ConfigSource::Default),
            libraries: ConfigValue::new(Vec::new(), ConfigSource::Default),
            projects: ConfigValue::new(Vec::new(), ConfigSource::Default),
        }
    }
}

impl ResolverConfig {
    /// Resolve configuration from all sources, reading the real environment.
    pub fn resolve(file: Option<&ConfigFile>, cli: &CliOverrides) -> ConfigResult<Self> {
        Self::resolve_with_env(file, cli, |key| std::env::var(key).ok())
    }

    /// Resolve configuration with an explicit environment lookup.
    pub fn resolve_with_env(
        file: Option<&ConfigFile>,
        cli: &CliOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<Self> {
        let mut config = ResolverConfig::default();
        if let Some(file) = file {
            config.apply_file(file);
        }
        config.apply_env(env)?;
        config.apply_cli(cli);
        Ok(config)
    }

    fn apply_file(&mut self, file: &ConfigFile) {
        let source = ConfigSource::ConfigFile;
        if let Some(root) = &file.root_type {
            self.root_type = ConfigValue::new(root.clone(), source);
        }
        if let Some(mode) = file.mode {
            self.mode = ConfigValue::new(mode, source);
        }
        if let Some(core) = file.core_library {
            self.core_library = Some(ConfigValue::new(core, source));
        }
        if let Some(unknowns) = file.unknowns_project {
            self.unknowns_project = ConfigValue::new(unknowns, source);
        }
        if let Some(libraries) = &file.libraries {
            self.libraries = ConfigValue::new(libraries.clone(), source);
        }
        if let Some(projects) = &file.projects {
            self.projects = ConfigValue::new(projects.clone(), source);
        }
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> ConfigResult<()> {
        let source = ConfigSource::EnvVar;
        if let Some(root) = env("TYPEGRAPH_ROOT_TYPE") {
            self.root_type = ConfigValue::new(root, source);
        }
        if let Some(mode) = env("TYPEGRAPH_MODE") {
            self.mode = ConfigValue::new(mode.parse()?, source);
        }
        if let Some(core) = env("TYPEGRAPH_CORE_LIBRARY") {
            let id = parse_project_id("TYPEGRAPH_CORE_LIBRARY", &core)?;
            self.core_library = Some(ConfigValue::new(id, source));
        }
        if let Some(unknowns) = env("TYPEGRAPH_UNKNOWNS_PROJECT") {
            let id = parse_project_id("TYPEGRAPH_UNKNOWNS_PROJECT", &unknowns)?;
            self.unknowns_project = ConfigValue::new(id, source);
        }
        if let Some(libraries) = env("TYPEGRAPH_LIBRARIES") {
            let ids = parse_project_list("TYPEGRAPH_LIBRARIES", &libraries)?;
            self.libraries = ConfigValue::new(ids, source);
        }
        if let Some(projects) = env("TYPEGRAPH_PROJECTS") {
            let ids = parse_project_list("TYPEGRAPH_PROJECTS", &projects)?;
            self.projects = ConfigValue::new(ids, source);
        }
        Ok(())
    }

    fn apply_cli(&mut self, cli: &CliOverrides) {
        let source = ConfigSource::CliFlag;
        if let Some(root) = &cli.root_type {
            self.root_type = ConfigValue::new(root.clone(), source);
        }
        if let Some(mode) = cli.mode {
            self.mode = ConfigValue::new(mode, source);
        }
        if let Some(core) = cli.core_library {
            self.core_library = Some(ConfigValue::new(core, source));
        }
        if let Some(unknowns) = cli.unknowns_project {
            self.unknowns_project = ConfigValue::new(unknowns, source);
        }
        if let Some(libraries) = &cli.libraries {
            self.libraries = ConfigValue::new(libraries.clone(), source);
        }
        if let Some(projects) = &cli.projects {
            self.projects = ConfigValue::new(projects.clone(), source);
        }
    }
}

/// Parse a single project id.
pub fn parse_project_id(key: &str, value: &str) -> ConfigResult<ProjectId> {
    value
        .trim()
        .parse::<u32>()
        .map(ProjectId::new)
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}

/// Parse a comma-separated list of project ids. Empty items are ignored.
pub fn parse_project_list(key: &str, value: &str) -> ConfigResult<Vec<ProjectId>> {
    value
        .split(',')
        .filter(|item| !item.trim().is_empty())
        .map(|item| parse_project_id(key, item))
        .collect()
}
