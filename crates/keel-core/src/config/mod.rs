//! # Keel Core Configuration
//!
//! Section-keyed configuration consumed by the environment. Each component
//! reads the section named after its identity; the `core` section also
//! carries the package and component ignore lists.
//!
//! Files are read as INI unless their extension names a structured format
//! ([`ConfigFormat`]). Structured formats map top-level tables to sections and
//! flatten nested tables into dotted keys, so `[database] host = "x"` inside
//! the `core` table becomes `database.host`.
//!
//! Values loaded through [`Config::from_env`] are interpolated against the
//! process environment: `%(NAME)s` is replaced by variable `NAME` and `%%`
//! by a literal `%`.
pub mod error;
mod ini;
pub mod settings;

use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::kernel::constants;
pub use error::ConfigError;
pub use settings::Settings;

static INTERPOLATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%(%|\(([^)]*)\)s)?").expect("valid interpolation pattern"));

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// INI (.ini, .conf, .cfg, or any unrecognised extension)
    Ini,
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Ini => "INI",
            ConfigFormat::Json => "JSON",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "YAML",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "TOML",
        }
    }

    /// Determine format from file extension, defaulting to INI.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(ConfigFormat::Json),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            #[cfg(feature = "toml-config")]
            "toml" => Ok(ConfigFormat::Toml),
            "yaml" | "yml" | "toml" => Err(ConfigError::UnsupportedFormat(format!(
                "'{}' support is not compiled in",
                ext
            ))),
            _ => Ok(ConfigFormat::Ini),
        }
    }
}

/// Section-keyed key/value configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    sections: IndexMap<String, IndexMap<String, String>>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the file named by `KEEL_CONFIG` and interpolate it against the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var_os(constants::CONFIG_PATH_VAR)
            .ok_or_else(|| ConfigError::PathVariableMissing(constants::CONFIG_PATH_VAR.to_string()))?;
        Self::load_interpolated(Path::new(&path))
    }

    /// Load `path` and substitute `%(VAR)s` references from the process environment.
    pub fn load_interpolated(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        let vars: HashMap<String, String> = std::env::vars().collect();
        config.interpolate(&vars)?;
        Ok(config)
    }

    /// Read and parse a configuration file, choosing the format by extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path)?;
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::io(e, "read_config", path.to_path_buf()))?;
        log::info!("Loading {} configuration from {}", format.name(), path.display());
        Self::parse(&text, format)
    }

    pub fn parse(text: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let sections = match format {
            ConfigFormat::Ini => ini::parse(text)?,
            ConfigFormat::Json => {
                let value: serde_json::Value = serde_json::from_str(text).map_err(|e| ConfigError::Deserialization {
                    format: format.name().to_string(),
                    source: Box::new(e),
                })?;
                sections_from_value(value, format)?
            }
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => {
                let value: serde_json::Value = serde_yaml::from_str(text).map_err(|e| ConfigError::Deserialization {
                    format: format.name().to_string(),
                    source: Box::new(e),
                })?;
                sections_from_value(value, format)?
            }
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => {
                let value: serde_json::Value = toml::from_str(text).map_err(|e| ConfigError::Deserialization {
                    format: format.name().to_string(),
                    source: Box::new(e),
                })?;
                sections_from_value(value, format)?
            }
        };
        Ok(Self { sections })
    }

    /// Replace `%(NAME)s` with `vars[NAME]` and `%%` with `%` in every value.
    pub fn interpolate(&mut self, vars: &HashMap<String, String>) -> Result<(), ConfigError> {
        for (section, entries) in self.sections.iter_mut() {
            for (key, value) in entries.iter_mut() {
                *value = interpolate_value(value, vars, section, key)?;
            }
        }
        Ok(())
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Section names in file order.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn items(&self, section: &str) -> Option<&IndexMap<String, String>> {
        self.sections.get(section)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections.get(section)?.get(key).map(String::as_str)
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    pub fn add_section(&mut self, section: &str) {
        self.sections.entry(section.to_string()).or_default();
    }

    /// Settings for `section`; empty when the section is absent.
    pub fn settings(&self, section: &str) -> Settings {
        self.sections
            .get(section)
            .cloned()
            .map(Settings::from_map)
            .unwrap_or_default()
    }
}

fn interpolate_value(
    value: &str,
    vars: &HashMap<String, String>,
    section: &str,
    key: &str,
) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(value.len());
    let mut last = 0;

    for caps in INTERPOLATION.captures_iter(value) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&value[last..whole.start()]);

        match (caps.get(1).map(|m| m.as_str()), caps.get(2)) {
            (Some("%"), _) => out.push('%'),
            (Some(_), Some(name)) => {
                let resolved = vars.get(name.as_str()).ok_or_else(|| ConfigError::UndefinedVariable {
                    section: section.to_string(),
                    key: key.to_string(),
                    variable: name.as_str().to_string(),
                })?;
                out.push_str(resolved);
            }
            _ => {
                return Err(ConfigError::MalformedInterpolation {
                    section: section.to_string(),
                    key: key.to_string(),
                    offset: whole.start(),
                });
            }
        }
        last = whole.end();
    }

    out.push_str(&value[last..]);
    Ok(out)
}

fn sections_from_value(
    value: serde_json::Value,
    format: ConfigFormat,
) -> Result<IndexMap<String, IndexMap<String, String>>, ConfigError> {
    let serde_json::Value::Object(top) = value else {
        return Err(ConfigError::parse(format.name(), 1, "top level must be a table of sections"));
    };

    let mut sections = IndexMap::new();
    for (name, body) in top {
        let serde_json::Value::Object(entries) = body else {
            return Err(ConfigError::parse(
                format.name(),
                1,
                format!("section '{}' must be a table", name),
            ));
        };
        let mut flat = IndexMap::new();
        flatten_into(&mut flat, None, entries);
        sections.insert(name, flat);
    }
    Ok(sections)
}

fn flatten_into(
    out: &mut IndexMap<String, String>,
    prefix: Option<&str>,
    entries: serde_json::Map<String, serde_json::Value>,
) {
    for (key, value) in entries {
        let full_key = match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key,
        };
        match value {
            serde_json::Value::Object(nested) => flatten_into(out, Some(&full_key), nested),
            other => {
                out.insert(full_key, scalar_to_string(other));
            }
        }
    }
}

fn scalar_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests;
