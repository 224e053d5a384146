//! Flat dialect: `key=value` and bare `key` lines without sections.

use super::{MergeStats, Output};
use crate::document::{LineKind, OptionLine, RawDocument, RawLine};
use crate::model::Options;
use crate::tokenizer::quote_value;
use indexmap::IndexSet;

pub(super) fn merge(raw: &RawDocument, desired: &Options, out: &mut Output, stats: &mut MergeStats) {
    let mut pending: IndexSet<&str> = desired.keys().map(String::as_str).collect();

    for line in raw.lines() {
        let option = match &line.kind {
            LineKind::Option(option) => option,
            LineKind::Passthrough | LineKind::SectionHeader { .. } => {
                out.keep(line);
                continue;
            }
        };

        // Covers keys removed from the model and repeats of a handled key.
        if !pending.shift_remove(option.key.as_str()) {
            stats.dropped += 1;
            continue;
        }

        let wanted = desired.get(&option.key).and_then(|v| v.as_deref());
        if wanted == option.value.as_deref() {
            out.keep(line);
            stats.kept += 1;
        } else {
            out.replace(line, rewrite(line, option, wanted));
            stats.rewritten += 1;
        }
    }

    for key in pending {
        let value = desired.get(key).and_then(|v| v.as_deref());
        out.append(render(key, value));
        stats.appended += 1;
    }
}

/// New line for an option that was not in the file.
pub(super) fn render(key: &str, value: Option<&str>) -> String {
    let key = quote_value(key, None, false);
    match value {
        Some(value) => format!("{}={}", key, quote_value(value, None, false)),
        None => key,
    }
}

/// Replace the option token in place; text around it, including any trailing
/// comment, is kept as written.
fn rewrite(line: &RawLine, option: &OptionLine, wanted: Option<&str>) -> String {
    let hint = &option.hint;
    let text = &line.text;

    let key = if hint.key_span.is_empty() {
        quote_value(&option.key, None, false)
    } else {
        text[hint.key_span.clone()].to_string()
    };
    let entry = match wanted {
        Some(value) => format!("{}={}", key, quote_value(value, hint.quote, false)),
        None => key,
    };

    format!(
        "{}{}{}",
        &text[..hint.entry_span.start],
        entry,
        &text[hint.entry_span.end..]
    )
}
