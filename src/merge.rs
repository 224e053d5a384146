//! Merge writer
//!
//! Reconciles the raw lines of the original file with a desired model. Unchanged
//! entries pass through verbatim, changed entries are rewritten in place,
//! entries missing from the desired model are dropped and new entries are
//! appended. Comments, blank lines, spacing and quoting of everything else are
//! left untouched.

use crate::document::{LineEnding, RawDocument, RawLine};
use crate::error::ConfError;
use crate::model::ConfigModel;
use tracing::debug;

mod check;
mod flat;
mod sectioned;

/// Counters reported after each merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub kept: usize,
    pub rewritten: usize,
    pub dropped: usize,
    pub appended: usize,
}

/// Produce the new file content as an ordered list of lines, each ending with
/// its own terminator.
///
/// Fails with [`ConfError::InvalidEntry`] when `desired` holds a name or value
/// the output could not represent, such as an empty key or a line break.
pub fn merge(raw: &RawDocument, desired: &ConfigModel) -> Result<Vec<String>, ConfError> {
    merge_with_stats(raw, desired).map(|(lines, _)| lines)
}

/// Same as [`merge`], also returning what happened to each entry.
pub fn merge_with_stats(
    raw: &RawDocument,
    desired: &ConfigModel,
) -> Result<(Vec<String>, MergeStats), ConfError> {
    if raw.dialect() != desired.dialect() {
        return Err(ConfError::DialectMismatch {
            expected: raw.dialect(),
            found: desired.dialect(),
        });
    }

    check::entries(desired)?;

    let mut out = Output::default();
    let mut stats = MergeStats::default();
    match desired {
        ConfigModel::Flat(options) => flat::merge(raw, options, &mut out, &mut stats),
        ConfigModel::Sectioned(sections) => {
            sectioned::merge(raw, sections, &mut out, &mut stats)
        }
    }

    debug!(
        dialect = %desired.dialect(),
        kept = stats.kept,
        rewritten = stats.rewritten,
        dropped = stats.dropped,
        appended = stats.appended,
        "Merged configuration"
    );
    let lines = out.finish();
    check::reads_back(&lines, desired)?;
    Ok((lines, stats))
}

/// Output lines under construction.
#[derive(Debug, Default)]
struct Output {
    lines: Vec<(String, LineEnding)>,
}

impl Output {
    fn len(&self) -> usize {
        self.lines.len()
    }

    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn keep(&mut self, line: &RawLine) {
        self.lines.push((line.text.clone(), line.ending));
    }

    /// Rewritten line; keeps the original terminator.
    fn replace(&mut self, line: &RawLine, text: String) {
        self.lines.push((text, line.ending));
    }

    fn append(&mut self, text: String) {
        self.lines.push((text, LineEnding::Lf));
    }

    fn insert(&mut self, at: usize, texts: Vec<String>) {
        let new_lines = texts.into_iter().map(|text| (text, LineEnding::Lf));
        self.lines.splice(at..at, new_lines);
    }

    /// Only the final line may stay unterminated.
    fn finish(self) -> Vec<String> {
        let last = self.lines.len().saturating_sub(1);
        self.lines
            .into_iter()
            .enumerate()
            .map(|(idx, (mut text, ending))| {
                match ending {
                    LineEnding::None if idx != last => text.push('\n'),
                    _ => text.push_str(ending.as_str()),
                }
                text
            })
            .collect()
    }
}
