//! Structured logging for applications embedding confkeep.
//!
//! The library only emits `tracing` events (reads at debug, commits at info,
//! duplicate keys and directory sync failures at warn). [`init_logging`]
//! installs a global subscriber for hosts that do not bring their own.
//!
//! Environment variables take precedence over [`LoggingConfig`]:
//! `CONFKEEP_LOG` (full filter), `CONFKEEP_LOG_MODULES` (`target=level,...`),
//! `CONFKEEP_LOG_FORMAT` and `CONFKEEP_LOG_OUTPUT`.

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const FILTER_ENV: &str = "CONFKEEP_LOG";
const MODULES_ENV: &str = "CONFKEEP_LOG_MODULES";
const FORMAT_ENV: &str = "CONFKEEP_LOG_FORMAT";
const OUTPUT_ENV: &str = "CONFKEEP_LOG_OUTPUT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(SettingsError::Logging(format!(
                "unknown log format '{}', expected text or json",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    #[default]
    Stderr,
    File,
}

impl FromStr for LogOutput {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(LogOutput::Stdout),
            "stderr" => Ok(LogOutput::Stderr),
            "file" => Ok(LogOutput::File),
            other => Err(SettingsError::Logging(format!(
                "unknown log output '{}', expected stdout, stderr or file",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level: trace, debug, info, warn, error or off
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Destination when `output = "file"`
    pub file: PathBuf,
    /// ANSI colors; never used for file output
    pub color: bool,
    /// Per-target levels, e.g. `"confkeep::merge" = "debug"`
    pub modules: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            output: LogOutput::Stderr,
            file: PathBuf::from("confkeep.log"),
            color: true,
            modules: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    fn effective_format(&self) -> Result<LogFormat, SettingsError> {
        match std::env::var(FORMAT_ENV) {
            Ok(value) => value.parse(),
            Err(_) => Ok(self.format),
        }
    }

    fn effective_output(&self) -> Result<LogOutput, SettingsError> {
        match std::env::var(OUTPUT_ENV) {
            Ok(value) => value.parse(),
            Err(_) => Ok(self.output),
        }
    }

    /// Level filter: `CONFKEEP_LOG` replaces everything, otherwise the base
    /// level plus module directives from the config and `CONFKEEP_LOG_MODULES`.
    fn filter(&self) -> Result<EnvFilter, SettingsError> {
        if let Ok(filter) = EnvFilter::try_from_env(FILTER_ENV) {
            return Ok(filter);
        }

        let mut filter = EnvFilter::new(&self.level);
        if self.level == "off" {
            return Ok(filter);
        }

        for (target, level) in &self.modules {
            filter = filter.add_directive(directive(target, level)?);
        }
        if let Ok(spec) = std::env::var(MODULES_ENV) {
            for (target, level) in spec.split(',').filter_map(|entry| entry.split_once('=')) {
                filter = filter.add_directive(directive(target.trim(), level.trim())?);
            }
        }
        Ok(filter)
    }
}

fn directive(target: &str, level: &str) -> Result<Directive, SettingsError> {
    format!("{}={}", target, level)
        .parse()
        .map_err(|e| SettingsError::Logging(format!("bad log directive for {}: {}", target, e)))
}

fn open_append(path: &Path) -> Result<File, SettingsError> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| {
            SettingsError::Logging(format!("cannot create {}: {}", dir.display(), e))
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| SettingsError::Logging(format!("cannot open {}: {}", path.display(), e)))
}

/// Install the global subscriber. Fails if one is already set.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), SettingsError> {
    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);

    let filter = config.filter()?;
    let format = config.effective_format()?;
    let output = config.effective_output()?;

    let writer = match output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::File => BoxMakeWriter::new(Mutex::new(open_append(&config.file)?)),
    };
    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(config.color && output != LogOutput::File)
        .with_writer(writer);

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Json => registry.with(layer.json()).try_init(),
        LogFormat::Text => registry.with(layer).try_init(),
    };
    installed.map_err(|e| SettingsError::Logging(e.to_string()))
}
