//! Refuses models the merged output could not represent.
//!
//! A write must leave a file that reads back as the model that was written.
//! Empty names and embedded line breaks are rejected up front; everything else
//! is checked by parsing the merged lines again and comparing the result.

use crate::error::ConfError;
use crate::model::{ConfigModel, Options};
use crate::reader;

/// Cheap structural checks on every name and value of `desired`.
pub(super) fn entries(desired: &ConfigModel) -> Result<(), ConfError> {
    match desired {
        ConfigModel::Flat(options) => options_in(None, options),
        ConfigModel::Sectioned(sections) => {
            for (name, options) in sections {
                if name.is_empty() {
                    return Err(ConfError::invalid(section(name), "name is empty"));
                }
                if breaks_line(name) {
                    return Err(ConfError::invalid(section(name), "name contains a line break"));
                }
                options_in(Some(name), options)?;
            }
            Ok(())
        }
    }
}

fn options_in(scope: Option<&str>, options: &Options) -> Result<(), ConfError> {
    for (key, value) in options {
        if key.is_empty() {
            return Err(ConfError::invalid(option(scope, key), "name is empty"));
        }
        if breaks_line(key) {
            return Err(ConfError::invalid(option(scope, key), "name contains a line break"));
        }
        if value.as_deref().is_some_and(breaks_line) {
            return Err(ConfError::invalid(option(scope, key), "value contains a line break"));
        }
    }
    Ok(())
}

/// Parse `lines` as the desired dialect and require the desired model back.
pub(super) fn reads_back(lines: &[String], desired: &ConfigModel) -> Result<(), ConfError> {
    let reread = match reader::parse(&lines.concat(), desired.dialect()) {
        Ok((model, _)) => model,
        Err(e) => {
            let entry = failing_line(&e)
                .and_then(|line| lines.get(line - 1))
                .map(|text| format!("line {:?}", text.trim_end()))
                .unwrap_or_else(|| "configuration".to_string());
            return Err(ConfError::invalid(entry, format!("output would not parse ({})", e)));
        }
    };

    if reread == *desired {
        return Ok(());
    }
    Err(ConfError::invalid(
        first_difference(desired, &reread),
        "would not read back unchanged",
    ))
}

fn failing_line(error: &ConfError) -> Option<usize> {
    match error {
        ConfError::Tokenize { line, .. } | ConfError::Parse { line, .. } => Some(*line),
        _ => None,
    }
}

fn first_difference(desired: &ConfigModel, reread: &ConfigModel) -> String {
    let differs = |want: &Options, got: Option<&Options>| {
        want.iter()
            .find(|(key, value)| got.and_then(|g| g.get(*key)) != Some(*value))
            .map(|(key, _)| key.clone())
    };

    match (desired, reread) {
        (ConfigModel::Flat(want), ConfigModel::Flat(got)) => {
            if let Some(key) = differs(want, Some(got)) {
                return option(None, &key);
            }
        }
        (ConfigModel::Sectioned(want), ConfigModel::Sectioned(got)) => {
            for (name, options) in want {
                let Some(found) = got.get(name) else {
                    return section(name);
                };
                if let Some(key) = differs(options, Some(found)) {
                    return option(Some(name), &key);
                }
            }
        }
        _ => {}
    }
    "configuration".to_string()
}

fn breaks_line(text: &str) -> bool {
    text.contains(['\n', '\r'])
}

fn section(name: &str) -> String {
    format!("section {:?}", name)
}

fn option(scope: Option<&str>, key: &str) -> String {
    match scope {
        Some(name) => format!("option {:?} in section {:?}", key, name),
        None => format!("option {:?}", key),
    }
}
