//! # Data File Parser
//!
//! Reads the sectioned `key=value` text format used by the data tables.

use crate::{CavernsError, CavernsResult};
use std::path::Path;
use std::str::FromStr;

/// One `[Name]` section and its key/value pairs, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigSection {
    pub name: String,
    values: Vec<(String, String)>,
}

impl ConfigSection {
    /// Creates an empty section.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    /// Appends a key/value pair. Earlier pairs with the same key win on lookup.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.push((key.into(), value.into()));
    }

    /// Gets the raw value for a key.
    pub fn get_value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Gets a required value parsed into `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use caverns::ConfigFile;
    ///
    /// let config = ConfigFile::parse("[Monster]\nid=3\nname=Goblin\n").unwrap();
    /// let goblin = &config.sections()[0];
    /// assert_eq!(goblin.get::<u32>("id").unwrap(), 3);
    /// assert!(goblin.get::<u32>("speed").is_err());
    /// ```
    pub fn get<T: FromStr>(&self, key: &str) -> CavernsResult<T> {
        let raw = self.get_value(key).ok_or_else(|| {
            CavernsError::Config(format!("[{}] is missing key '{}'", self.name, key))
        })?;
        raw.trim().parse::<T>().map_err(|_| {
            CavernsError::Config(format!(
                "[{}] key '{}' has unparseable value '{}'",
                self.name, key, raw
            ))
        })
    }

    /// Iterates over all key/value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A parsed data file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigFile {
    sections: Vec<ConfigSection>,
}

impl ConfigFile {
    /// Parses data-file text.
    ///
    /// Lines starting with `[` open a section, blank lines, `#` comments and
    /// lines starting with a space are skipped, and every other line must be
    /// `key=value`. Lines without `=` are ignored.
    pub fn parse(text: &str) -> CavernsResult<Self> {
        let mut sections: Vec<ConfigSection> = Vec::new();

        for (line_no, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim_end_matches('\r');
            if line.is_empty() || line.starts_with(' ') || line.starts_with('#') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let name = header.trim_end().trim_end_matches(']');
                sections.push(ConfigSection::new(name));
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            if value.is_empty() {
                continue;
            }

            let section = sections.last_mut().ok_or_else(|| {
                CavernsError::Config(format!(
                    "line {}: key '{}' appears before any [section]",
                    line_no + 1,
                    key
                ))
            })?;
            section.push(key, value);
        }

        Ok(Self { sections })
    }

    /// Reads and parses a data file from disk.
    pub fn load(path: impl AsRef<Path>) -> CavernsResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded data file {}", path.as_ref().display());
        Self::parse(&text)
    }

    /// All sections in file order.
    pub fn sections(&self) -> &[ConfigSection] {
        &self.sections
    }

    /// First section with the given name.
    pub fn section(&self, name: &str) -> Option<&ConfigSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Looks up a value in the section at `index`.
    pub fn get_value(&self, index: usize, key: &str) -> Option<&str> {
        self.sections.get(index)?.get_value(key)
    }
}
