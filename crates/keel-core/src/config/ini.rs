//! Reader for INI-style configuration files.
//!
//! Supported syntax: `[section]` headers, `key = value` or `key: value`
//! entries, `#` and `;` comment lines, and indented continuation lines that
//! append to the previous value. Keys are lowercased. Entries of a `[DEFAULT]`
//! section are copied into every other section that does not set them.
use indexmap::IndexMap;

use crate::config::error::ConfigError;

const FORMAT: &str = "INI";
const DEFAULT_SECTION: &str = "DEFAULT";

type Sections = IndexMap<String, IndexMap<String, String>>;

pub(crate) fn parse(text: &str) -> Result<Sections, ConfigError> {
    let mut sections: Sections = IndexMap::new();
    let mut section: Option<String> = None;
    let mut last_key: Option<String> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim_end();
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            last_key = None;
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        // Indented line directly after an entry continues its value.
        if line.len() != trimmed.len() {
            if let (Some(name), Some(key)) = (&section, &last_key) {
                if let Some(value) = sections.get_mut(name).and_then(|s| s.get_mut(key)) {
                    if !value.is_empty() {
                        value.push('\n');
                    }
                    value.push_str(trimmed);
                    continue;
                }
            }
        }

        if let Some(rest) = trimmed.strip_prefix('[') {
            let name = rest
                .strip_suffix(']')
                .ok_or_else(|| ConfigError::parse(FORMAT, line_no, "unterminated section header"))?
                .trim();
            if name.is_empty() {
                return Err(ConfigError::parse(FORMAT, line_no, "empty section name"));
            }
            sections.entry(name.to_string()).or_default();
            section = Some(name.to_string());
            last_key = None;
            continue;
        }

        let name = section
            .as_ref()
            .ok_or_else(|| ConfigError::parse(FORMAT, line_no, "entry before any section header"))?;
        let split_at = trimmed
            .find(['=', ':'])
            .ok_or_else(|| ConfigError::parse(FORMAT, line_no, format!("expected 'key = value', found '{}'", trimmed)))?;
        let key = trimmed[..split_at].trim().to_lowercase();
        if key.is_empty() {
            return Err(ConfigError::parse(FORMAT, line_no, "empty key"));
        }
        let value = trimmed[split_at + 1..].trim().to_string();

        sections.entry(name.clone()).or_default().insert(key.clone(), value);
        last_key = Some(key);
    }

    if let Some(defaults) = sections.shift_remove(DEFAULT_SECTION) {
        for entries in sections.values_mut() {
            for (key, value) in &defaults {
                entries.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
    }

    Ok(sections)
}
