//! Sectioned dialect: `[section]` headers followed by `key = value` lines.
//!
//! Options follow the same keep/rewrite/drop rule as the flat dialect, scoped to
//! their section. Options missing from a section are inserted after its last
//! kept option, sections missing from the model are dropped whole (comments
//! included), and sections new to the file are appended at the end.

use super::{MergeStats, Output};
use crate::document::{LineKind, OptionLine, RawDocument, RawLine};
use crate::model::{Options, Sections};
use crate::tokenizer::quote_value;
use indexmap::IndexSet;

/// Section currently being copied to the output.
struct ActiveSection<'a> {
    options: &'a Options,
    pending: IndexSet<&'a str>,
    /// Output position right after the last line belonging to the section.
    insert_at: usize,
}

impl ActiveSection<'_> {
    fn flush(self, out: &mut Output, stats: &mut MergeStats) {
        let lines: Vec<String> = self
            .pending
            .iter()
            .map(|key| render(key, self.options.get(*key).and_then(|v| v.as_deref())))
            .collect();
        stats.appended += lines.len();
        out.insert(self.insert_at, lines);
    }
}

pub(super) fn merge(
    raw: &RawDocument,
    desired: &Sections,
    out: &mut Output,
    stats: &mut MergeStats,
) {
    let mut pending_sections: IndexSet<&str> = desired.keys().map(String::as_str).collect();
    let mut active: Option<ActiveSection<'_>> = None;
    // Lines before the first header are copied; lines of a dropped section are not.
    let mut copying = true;

    for line in raw.lines() {
        match &line.kind {
            LineKind::SectionHeader { name } => {
                if let Some(section) = active.take() {
                    section.flush(out, stats);
                }
                match desired.get(name) {
                    Some(options) if pending_sections.shift_remove(name.as_str()) => {
                        out.keep(line);
                        active = Some(ActiveSection {
                            options,
                            pending: options.keys().map(String::as_str).collect(),
                            insert_at: out.len(),
                        });
                        copying = true;
                    }
                    _ => copying = false,
                }
            }
            LineKind::Passthrough => {
                if copying {
                    out.keep(line);
                }
            }
            LineKind::Option(option) => {
                let Some(section) = active.as_mut().filter(|_| copying) else {
                    stats.dropped += 1;
                    continue;
                };
                if !section.pending.shift_remove(option.key.as_str()) {
                    stats.dropped += 1;
                    continue;
                }

                let wanted = section
                    .options
                    .get(&option.key)
                    .and_then(|v| v.as_deref());
                if wanted == option.value.as_deref() {
                    out.keep(line);
                    stats.kept += 1;
                } else {
                    out.replace(line, rewrite(line, option, wanted));
                    stats.rewritten += 1;
                }
                section.insert_at = out.len();
            }
        }
    }

    if let Some(section) = active.take() {
        section.flush(out, stats);
    }

    for name in pending_sections {
        let Some(options) = desired.get(name) else {
            continue;
        };
        if !out.is_empty() {
            out.append(String::new());
        }
        out.append(format!("[{}]", name));
        for (key, value) in options {
            out.append(render(key, value.as_deref()));
            stats.appended += 1;
        }
    }
}

/// Indented line for an option that was not in the file.
fn render(key: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!("  {}", assignment(key, value)),
        None => format!("  {}", key),
    }
}

/// `key = value`, or `key =` for an empty value.
fn assignment(key: &str, value: &str) -> String {
    match quote_value(value, None, true) {
        rendered if rendered.is_empty() => format!("{} =", key),
        rendered => format!("{} = {}", key, rendered),
    }
}

/// Replace the value region in place, keeping the key, the spacing around `=`
/// and any trailing comment as written.
fn rewrite(line: &RawLine, option: &OptionLine, wanted: Option<&str>) -> String {
    let hint = &option.hint;
    let text = &line.text;
    let key = &text[hint.key_span.clone()];

    let mut entry = match (wanted, &hint.value_span) {
        (None, _) => key.to_string(),
        (Some(value), Some(span)) => {
            let mut entry = text[hint.key_span.start..span.start].to_string();
            let rendered = quote_value(value, hint.quote, true);
            if span.is_empty() && entry.ends_with('=') && !rendered.is_empty() {
                entry.push(' ');
            }
            entry.push_str(&rendered);
            entry
        }
        (Some(value), None) => assignment(key, value),
    };

    let rest = &text[hint.entry_span.end..];
    if rest.starts_with('#') && !entry.ends_with(char::is_whitespace) {
        entry.push(' ');
    }

    format!("{}{}{}", &text[..hint.entry_span.start], entry, rest)
}
