//! Reader: raw text to [`ConfigModel`] plus the retained [`RawDocument`].

use crate::document::{
    split_lines, FormatHint, LineEnding, LineKind, OptionLine, RawDocument, RawLine,
};
use crate::error::ConfError;
use crate::model::{ConfigModel, Dialect, Options, Sections};
use crate::tokenizer::{tokenize, QuoteStyle, TokenStyle, TokenizedLine};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

/// Empty flat model, for files that do not exist yet.
pub fn new_flat() -> ConfigModel {
    ConfigModel::new_flat()
}

/// Empty sectioned model, for files that do not exist yet.
pub fn new_sectioned() -> ConfigModel {
    ConfigModel::new_sectioned()
}

/// Read and parse the file at `path`.
///
/// A missing file is reported as [`ConfError::NotFound`], never as an I/O error,
/// so callers can fall back to an empty model.
pub fn read(path: &Path, dialect: Dialect) -> Result<(ConfigModel, RawDocument), ConfError> {
    let text = fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ConfError::NotFound(path.to_path_buf())
        } else {
            ConfError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let parsed = parse(&text, dialect)?;
    debug!(
        path = %path.display(),
        dialect = %dialect,
        lines = parsed.1.lines().len(),
        "Read configuration file"
    );
    Ok(parsed)
}

/// Parse in-memory text as `dialect`.
pub fn parse(text: &str, dialect: Dialect) -> Result<(ConfigModel, RawDocument), ConfError> {
    match dialect {
        Dialect::Flat => parse_flat(text),
        Dialect::Sectioned => parse_sectioned(text),
    }
}

fn tokenize_line(text: &str, line_no: usize) -> Result<TokenizedLine, ConfError> {
    tokenize(text).map_err(|source| ConfError::Tokenize {
        line: line_no,
        source,
    })
}

fn parse_flat(text: &str) -> Result<(ConfigModel, RawDocument), ConfError> {
    let mut options = Options::new();
    let mut lines = Vec::new();

    for (idx, (body, ending)) in split_lines(text).into_iter().enumerate() {
        let line_no = idx + 1;
        let tokenized = tokenize_line(body, line_no)?;
        let kind = match flat_option(body, tokenized, line_no)? {
            Some(option) => {
                if options.contains_key(&option.key) {
                    warn!(
                        key = %option.key,
                        line = line_no,
                        "Option defined more than once; the later value wins"
                    );
                }
                options.insert(option.key.clone(), option.value.clone());
                LineKind::Option(option)
            }
            None => LineKind::Passthrough,
        };
        lines.push(raw_line(body, ending, kind));
    }

    Ok((
        ConfigModel::Flat(options),
        RawDocument::new(Dialect::Flat, lines),
    ))
}

/// Classify a flat line: the first token is `key=value` or a bare `key`.
fn flat_option(
    body: &str,
    tokenized: TokenizedLine,
    line_no: usize,
) -> Result<Option<OptionLine>, ConfError> {
    let TokenizedLine { tokens, comment } = tokenized;
    let Some(first) = tokens.into_iter().next() else {
        return Ok(None);
    };

    let (key, value) = match first.text.split_once('=') {
        Some((key, value)) => (key.to_string(), Some(value.to_string())),
        None => (first.text.clone(), None),
    };
    if key.is_empty() {
        return Err(ConfError::parse(line_no, "missing option name before '='"));
    }

    let raw = &body[first.span.clone()];
    let (key_span, value_span, quote) = match raw.find('=') {
        // The raw key is reusable only if it reads back as the parsed key.
        Some(eq) if value.is_some() && reads_as(&raw[..eq], &key) => {
            let value_start = first.span.start + eq + 1;
            let value_span = value_start..first.span.end;
            let quote = quoted_style(&body[value_span.clone()]);
            (first.span.start..value_start - 1, Some(value_span), quote)
        }
        _ if value.is_none() => (first.span.clone(), None, None),
        _ => (first.span.start..first.span.start, None, None),
    };

    Ok(Some(OptionLine {
        key,
        value,
        hint: FormatHint {
            entry_span: first.span,
            key_span,
            value_span,
            quote,
            comment,
        },
    }))
}

fn parse_sectioned(text: &str) -> Result<(ConfigModel, RawDocument), ConfError> {
    let mut sections = Sections::new();
    let mut current: Option<String> = None;
    let mut lines = Vec::new();

    for (idx, (body, ending)) in split_lines(text).into_iter().enumerate() {
        let line_no = idx + 1;
        let tokenized = tokenize_line(body, line_no)?;
        if tokenized.is_passthrough() {
            lines.push(raw_line(body, ending, LineKind::Passthrough));
            continue;
        }

        let content_end = tokenized
            .comment
            .as_ref()
            .map(|c| c.start)
            .unwrap_or(body.len());

        if body.trim_start().starts_with('[') {
            let name = section_name(&body[..content_end], line_no)?;
            if sections.contains_key(&name) {
                return Err(ConfError::parse(
                    line_no,
                    format!("section '{}' already exists", name),
                ));
            }
            sections.insert(name.clone(), Options::new());
            current = Some(name.clone());
            lines.push(raw_line(body, ending, LineKind::SectionHeader { name }));
            continue;
        }

        let Some(section) = current.as_ref() else {
            return Err(ConfError::parse(
                line_no,
                "option appears before any section header",
            ));
        };
        let option = sectioned_option(body, content_end, &tokenized, line_no)?;
        let options = sections.entry(section.clone()).or_default();
        if options.contains_key(&option.key) {
            return Err(ConfError::parse(
                line_no,
                format!(
                    "option '{}' in section '{}' already exists",
                    option.key, section
                ),
            ));
        }
        options.insert(option.key.clone(), option.value.clone());
        lines.push(raw_line(body, ending, LineKind::Option(option)));
    }

    Ok((
        ConfigModel::Sectioned(sections),
        RawDocument::new(Dialect::Sectioned, lines),
    ))
}

fn section_name(header: &str, line_no: usize) -> Result<String, ConfError> {
    let header = header.trim();
    let inner = header
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| {
            ConfError::parse(line_no, format!("malformed section header: {}", header))
        })?;
    let name = inner.trim();
    if name.is_empty() {
        return Err(ConfError::parse(line_no, "empty section name"));
    }
    Ok(name.to_string())
}

/// Classify a `key = value` (or bare `key`) line inside a section.
fn sectioned_option(
    body: &str,
    content_end: usize,
    tokenized: &TokenizedLine,
    line_no: usize,
) -> Result<OptionLine, ConfError> {
    let content = &body[..content_end];
    let key_start = content.len() - content.trim_start().len();

    let Some(eq) = content.find('=') else {
        let key_span = key_start..content.trim_end().len();
        return Ok(OptionLine {
            key: body[key_span.clone()].to_string(),
            value: None,
            hint: FormatHint {
                entry_span: key_span.clone(),
                key_span,
                value_span: None,
                quote: None,
                comment: tokenized.comment.clone(),
            },
        });
    };

    let key_end = content[..eq].trim_end().len();
    if key_end <= key_start {
        return Err(ConfError::parse(line_no, "missing option name before '='"));
    }
    let key_span = key_start..key_end;

    let after_eq = &content[eq + 1..];
    let value_start = eq + 1 + (after_eq.len() - after_eq.trim_start().len());
    let value_end = tokenized
        .tokens
        .iter()
        .map(|t| t.span.end)
        .filter(|end| *end > value_start)
        .max()
        .unwrap_or(value_start);
    let value_span = value_start..value_end;

    let raw_value = &body[value_span.clone()];
    let quote = quoted_style(raw_value);
    let value = match quote {
        Some(_) => single_token_text(raw_value).unwrap_or_else(|| raw_value.to_string()),
        None => raw_value.to_string(),
    };

    Ok(OptionLine {
        key: body[key_span.clone()].to_string(),
        value: Some(value),
        hint: FormatHint {
            entry_span: key_span.start..value_span.end,
            key_span,
            value_span: Some(value_span),
            quote,
            comment: tokenized.comment.clone(),
        },
    })
}

/// Quote style when `raw` is exactly one fully quoted token.
fn quoted_style(raw: &str) -> Option<QuoteStyle> {
    let tokenized = tokenize(raw).ok()?;
    match (tokenized.tokens.as_slice(), &tokenized.comment) {
        ([token], None) => match token.style {
            TokenStyle::Quoted(style) => Some(style),
            _ => None,
        },
        _ => None,
    }
}

fn single_token_text(raw: &str) -> Option<String> {
    let tokenized = tokenize(raw).ok()?;
    match tokenized.tokens.as_slice() {
        [token] => Some(token.text.clone()),
        _ => None,
    }
}

/// True if `raw` tokenizes to exactly `expected`.
fn reads_as(raw: &str, expected: &str) -> bool {
    single_token_text(raw).as_deref() == Some(expected)
}

fn raw_line(body: &str, ending: LineEnding, kind: LineKind) -> RawLine {
    RawLine {
        text: body.to_string(),
        ending,
        kind,
    }
}
