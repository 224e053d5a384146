//! Configuration model: the two file dialects and their in-memory shapes.

use crate::error::ConfError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered options of one scope. `None` marks a bare option without `=value`.
pub type Options = IndexMap<String, Option<String>>;

/// Ordered sections of a sectioned file.
pub type Sections = IndexMap<String, Options>;

/// File dialect understood by the reader and merge writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Dialect {
    /// Unsectioned shell-style `key=value` / `key` lines.
    Flat,
    /// INI-style `[section]` groups of `key = value` lines.
    Sectioned,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Flat => "flat",
            Dialect::Sectioned => "sectioned",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = ConfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" | "shell" => Ok(Dialect::Flat),
            "sectioned" | "ini" => Ok(Dialect::Sectioned),
            _ => Err(ConfError::UnknownDialect(s.to_string())),
        }
    }
}

impl TryFrom<String> for Dialect {
    type Error = ConfError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Parsed configuration, one variant per dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigModel {
    Flat(Options),
    Sectioned(Sections),
}

impl ConfigModel {
    /// Empty model of the given dialect.
    pub fn new(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Flat => Self::new_flat(),
            Dialect::Sectioned => Self::new_sectioned(),
        }
    }

    pub fn new_flat() -> Self {
        ConfigModel::Flat(Options::new())
    }

    pub fn new_sectioned() -> Self {
        ConfigModel::Sectioned(Sections::new())
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            ConfigModel::Flat(_) => Dialect::Flat,
            ConfigModel::Sectioned(_) => Dialect::Sectioned,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ConfigModel::Flat(options) => options.is_empty(),
            ConfigModel::Sectioned(sections) => sections.is_empty(),
        }
    }

    pub fn as_flat(&self) -> Option<&Options> {
        match self {
            ConfigModel::Flat(options) => Some(options),
            ConfigModel::Sectioned(_) => None,
        }
    }

    pub fn as_sectioned(&self) -> Option<&Sections> {
        match self {
            ConfigModel::Sectioned(sections) => Some(sections),
            ConfigModel::Flat(_) => None,
        }
    }

    pub fn section(&self, name: &str) -> Option<&Options> {
        self.as_sectioned().and_then(|sections| sections.get(name))
    }

    /// Options of `name`, creating an empty section at the end if it is missing.
    /// Returns `None` for flat models.
    pub fn section_mut(&mut self, name: &str) -> Option<&mut Options> {
        match self {
            ConfigModel::Sectioned(sections) => {
                Some(sections.entry(name.to_string()).or_default())
            }
            ConfigModel::Flat(_) => None,
        }
    }

    /// Remove a whole section, keeping the order of the others.
    pub fn remove_section(&mut self, name: &str) -> Option<Options> {
        match self {
            ConfigModel::Sectioned(sections) => sections.shift_remove(name),
            ConfigModel::Flat(_) => None,
        }
    }

    /// Look up an option. Flat models take `section = None`, sectioned models a
    /// section name. The outer `Option` is presence, the inner one the value.
    pub fn get(&self, section: Option<&str>, key: &str) -> Result<Option<Option<&str>>, ConfError> {
        let options = match (self, section) {
            (ConfigModel::Flat(options), None) => Some(options),
            (ConfigModel::Sectioned(sections), Some(name)) => sections.get(name),
            _ => return Err(self.scope_mismatch()),
        };
        Ok(options.and_then(|o| o.get(key)).map(|v| v.as_deref()))
    }

    /// Insert or replace an option. Existing keys keep their position; new keys
    /// (and new sections) go to the end.
    pub fn set(
        &mut self,
        section: Option<&str>,
        key: impl Into<String>,
        value: Option<String>,
    ) -> Result<(), ConfError> {
        let options = self.scope_mut(section)?;
        options.insert(key.into(), value);
        Ok(())
    }

    /// Remove an option, returning its previous value if it existed.
    pub fn remove(
        &mut self,
        section: Option<&str>,
        key: &str,
    ) -> Result<Option<Option<String>>, ConfError> {
        let removed = match (self, section) {
            (ConfigModel::Flat(options), None) => options.shift_remove(key),
            (ConfigModel::Sectioned(sections), Some(name)) => {
                sections.get_mut(name).and_then(|o| o.shift_remove(key))
            }
            (model, _) => return Err(model.scope_mismatch()),
        };
        Ok(removed)
    }

    fn scope_mut(&mut self, section: Option<&str>) -> Result<&mut Options, ConfError> {
        match (self, section) {
            (ConfigModel::Flat(options), None) => Ok(options),
            (ConfigModel::Sectioned(sections), Some(name)) => {
                Ok(sections.entry(name.to_string()).or_default())
            }
            (model, _) => Err(model.scope_mismatch()),
        }
    }

    fn scope_mismatch(&self) -> ConfError {
        let found = self.dialect();
        let expected = match found {
            Dialect::Flat => Dialect::Sectioned,
            Dialect::Sectioned => Dialect::Flat,
        };
        ConfError::DialectMismatch { expected, found }
    }
}
