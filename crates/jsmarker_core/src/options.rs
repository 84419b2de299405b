//! Lint options and their per-pass resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::host::PreferenceStore;

/// Indentation width seeded at install time.
pub const DEFAULT_INDENT: i64 = 4;
/// Maximum number of reported issues seeded at install time.
pub const DEFAULT_MAXERR: i64 = 50;

/// Boolean rule flags enabled at install time.
const DEFAULT_ENABLED: [&str; 3] = ["eqeqeq", "undef", "white"];

/// A single option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
}

/// The option set handed to the lint engine.
///
/// Keys are lower-cased option names. Options that are absent fall back to the
/// engine's own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LintOptions(BTreeMap<String, OptionValue>);

impl LintOptions {
    /// Creates an empty option set.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// The values seeded once at install time.
    pub fn defaults() -> Self {
        let mut options = Self::new();
        for name in DEFAULT_ENABLED {
            options.set(name, OptionValue::Bool(true));
        }
        options.set("indent", OptionValue::Int(DEFAULT_INDENT));
        options.set("maxerr", OptionValue::Int(DEFAULT_MAXERR));
        options
    }

    /// Sets an option, lower-casing its name.
    pub fn set(&mut self, name: &str, value: OptionValue) {
        self.0.insert(name.to_ascii_lowercase(), value);
    }

    pub fn get(&self, name: &str) -> Option<OptionValue> {
        self.0.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            OptionValue::Bool(b) => Some(b),
            OptionValue::Int(_) => None,
        }
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            OptionValue::Int(i) => Some(i),
            OptionValue::Bool(_) => None,
        }
    }

    pub fn indent(&self) -> Option<i64> {
        self.get_int("indent")
    }

    pub fn max_errors(&self) -> Option<i64> {
        self.get_int("maxerr")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, OptionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolves the options for one pass.
    ///
    /// Stored values are layered over [`LintOptions::defaults`]. If the store
    /// cannot be read, `last_known` is used, or the defaults when there is none.
    pub fn resolve(store: &dyn PreferenceStore, last_known: Option<&LintOptions>) -> Self {
        match store.load() {
            Ok(values) => {
                let mut options = Self::defaults();
                for (name, value) in values {
                    options.set(&name, value);
                }
                debug!("Resolved {} lint options", options.len());
                options
            }
            Err(e) => {
                warn!("{}; using last known lint options", e);
                last_known.cloned().unwrap_or_else(Self::defaults)
            }
        }
    }

    /// Hash identifying this option set.
    pub fn hash(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

impl FromIterator<(String, OptionValue)> for LintOptions {
    fn from_iter<I: IntoIterator<Item = (String, OptionValue)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (name, value) in iter {
            options.set(&name, value);
        }
        options
    }
}
