//! Raw document retained next to the parsed model.
//!
//! Every line of the original file is kept verbatim together with its line
//! terminator and the classification the reader derived from it. Option lines
//! carry an explicit [`FormatHint`] so the merge writer can rewrite a value in
//! place without re-parsing the line.

use crate::model::Dialect;
use crate::tokenizer::{Comment, QuoteStyle};
use std::ops::Range;

/// Terminator that ended a raw line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
    /// Final line of a file without a trailing newline.
    None,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::None => "",
        }
    }
}

/// Where the pieces of an option entry sit in its raw line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatHint {
    /// Whole entry: the first token for flat lines, key through value for
    /// sectioned lines.
    pub entry_span: Range<usize>,
    /// Raw key text as written, reusable verbatim on rewrite.
    pub key_span: Range<usize>,
    /// Raw value region including any quotes; `None` for bare options.
    pub value_span: Option<Range<usize>>,
    pub quote: Option<QuoteStyle>,
    pub comment: Option<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionLine {
    pub key: String,
    pub value: Option<String>,
    pub hint: FormatHint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Blank or comment-only.
    Passthrough,
    SectionHeader { name: String },
    Option(OptionLine),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// Line text without its terminator.
    pub text: String,
    pub ending: LineEnding,
    pub kind: LineKind,
}

impl RawLine {
    /// Text followed by its original terminator.
    pub fn full_text(&self) -> String {
        format!("{}{}", self.text, self.ending.as_str())
    }
}

/// Original file content, one entry per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    dialect: Dialect,
    lines: Vec<RawLine>,
}

impl RawDocument {
    pub(crate) fn new(dialect: Dialect, lines: Vec<RawLine>) -> Self {
        Self { dialect, lines }
    }

    /// Document for a file that does not exist yet.
    pub fn empty(dialect: Dialect) -> Self {
        Self::new(dialect, Vec::new())
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn lines(&self) -> &[RawLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Formatting hint of the first line defining `key` in `section`
    /// (`None` for flat documents).
    pub fn hint(&self, section: Option<&str>, key: &str) -> Option<&FormatHint> {
        let mut current: Option<&str> = None;
        for line in &self.lines {
            match &line.kind {
                LineKind::SectionHeader { name } => current = Some(name.as_str()),
                LineKind::Option(option) if option.key == key && current == section => {
                    return Some(&option.hint);
                }
                _ => {}
            }
        }
        None
    }

    /// Reassemble the original text byte-for-byte.
    pub fn to_text(&self) -> String {
        self.lines.iter().map(RawLine::full_text).collect()
    }
}

/// Split text into lines, keeping each line's terminator.
pub(crate) fn split_lines(text: &str) -> Vec<(&str, LineEnding)> {
    text.split_inclusive('\n')
        .map(|chunk| {
            if let Some(body) = chunk.strip_suffix("\r\n") {
                (body, LineEnding::CrLf)
            } else if let Some(body) = chunk.strip_suffix('\n') {
                (body, LineEnding::Lf)
            } else {
                (chunk, LineEnding::None)
            }
        })
        .collect()
}
