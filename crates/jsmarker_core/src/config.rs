//! Project configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use jsonc_parser::ParseOptions;
use jsonschema::Validator;
use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::host::PreferenceStore;
use crate::options::{LintOptions, OptionValue};

// Embed the schema
const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/config.json");
static CONFIG_SCHEMA: OnceLock<Validator> = OnceLock::new();

/// Command line of the external lint engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

/// Configuration stored in `.jsmarker.jsonc` at the project root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Lint option values (the preference store).
    #[serde(default)]
    pub options: BTreeMap<String, OptionValue>,

    /// Glob patterns excluded from the project tree.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    /// Declared text encoding of the project's files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineConfig>,

    /// Directory containing the configuration file.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl ProjectConfig {
    /// File names searched for, in order of preference.
    pub const CONFIG_FILES: [&str; 2] = [".jsmarker.jsonc", ".jsmarker.json"];

    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration seeded with the install-time option defaults.
    pub fn seeded() -> Self {
        Self {
            options: LintOptions::defaults()
                .iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
            ..Self::default()
        }
    }

    /// Finds a configuration file in `dir`.
    pub fn discover(dir: impl AsRef<Path>) -> Option<PathBuf> {
        Self::CONFIG_FILES
            .iter()
            .map(|name| dir.as_ref().join(name))
            .find(|path| path.is_file())
    }

    /// Loads configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BuildError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            BuildError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_json(&content)?;
        if let Some(parent) = path.parent() {
            config.base_dir = Some(parent.to_path_buf());
        }
        Ok(config)
    }

    /// Parses JSONC text and validates it against the embedded schema.
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        let value = jsonc_parser::parse_to_serde_value(json, &ParseOptions::default())
            .map_err(|e| BuildError::config(format!("Invalid JSON: {}", e)))?
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));

        let schema = CONFIG_SCHEMA.get_or_init(|| {
            let schema_json: serde_json::Value =
                serde_json::from_str(SCHEMA_JSON).expect("Invalid embedded config schema");
            Validator::new(&schema_json).expect("Invalid config schema compilation")
        });

        if let Err(e) = schema.validate(&value) {
            return Err(BuildError::config(format!(
                "Config validation failed: {} at {}",
                e,
                e.instance_path()
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| BuildError::config(format!("Invalid config: {}", e)))
    }

    /// The engine section with a relative command path resolved against
    /// [`ProjectConfig::base_dir`]. Bare command names are left for `PATH`
    /// lookup.
    pub fn resolved_engine(&self) -> Option<EngineConfig> {
        let mut engine = self.engine.clone()?;
        let command = Path::new(&engine.command);
        if let Some(base_dir) = &self.base_dir
            && command.is_relative()
            && command.components().count() > 1
        {
            engine.command = base_dir.join(command).to_string_lossy().into_owned();
        }
        Some(engine)
    }

    /// Pretty JSON written by `init`.
    pub fn to_json_pretty(&self) -> Result<String, BuildError> {
        serde_json::to_string_pretty(self)
            .map(|mut json| {
                json.push('\n');
                json
            })
            .map_err(|e| BuildError::Internal(format!("Failed to serialize config: {}", e)))
    }
}

/// Preference store backed by a configuration file.
///
/// The file is read again on every [`PreferenceStore::load`], so edits made
/// between passes take effect on the next pass.
#[derive(Debug, Clone)]
pub struct ConfigPreferences {
    path: Option<PathBuf>,
}

impl ConfigPreferences {
    /// `None` means there is no configuration file and the defaults apply.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl PreferenceStore for ConfigPreferences {
    fn load(&self) -> Result<BTreeMap<String, OptionValue>, BuildError> {
        match &self.path {
            Some(path) => ProjectConfig::from_file(path)
                .map(|config| config.options)
                .map_err(|e| BuildError::preference_access(e.to_string())),
            None => Ok(BTreeMap::new()),
        }
    }
}
