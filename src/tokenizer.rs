//! Shell-like line tokenizer.
//!
//! Splits one line into words the way a POSIX shell lexer does: single quotes
//! group text literally, double quotes group text and honor `\"` and `\\`, and an
//! unquoted backslash escapes the next character. An unquoted `#` starts a comment
//! that runs to the end of the line; the comment is returned separately so
//! callers can reproduce it on rewrite. Byte spans of every token are kept so a
//! writer can replace one token without touching the rest of the line.

use crate::error::TokenizeError;
use std::ops::Range;

/// Quote character used around a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    Single,
    Double,
}

impl QuoteStyle {
    pub fn as_char(self) -> char {
        match self {
            QuoteStyle::Single => '\'',
            QuoteStyle::Double => '"',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            '\'' => Some(QuoteStyle::Single),
            '"' => Some(QuoteStyle::Double),
            _ => None,
        }
    }
}

/// How a token was written in the source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStyle {
    /// No quoting at all.
    Bare,
    /// The whole token is exactly one quoted segment, e.g. `"a b"`.
    Quoted(QuoteStyle),
    /// Quoted and unquoted pieces joined, e.g. `key="a b"`.
    Mixed,
}

/// A single word after quote removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub span: Range<usize>,
    pub style: TokenStyle,
}

/// Trailing `#` comment of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Byte offset of the `#`.
    pub start: usize,
    /// Comment text including the `#`, without the line terminator.
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizedLine {
    pub tokens: Vec<Token>,
    pub comment: Option<Comment>,
}

impl TokenizedLine {
    /// Blank or comment-only line.
    pub fn is_passthrough(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Partially built token while scanning.
struct Pending {
    text: String,
    start: usize,
    quote_segments: usize,
    first_quote: Option<QuoteStyle>,
    has_bare: bool,
}

impl Pending {
    fn new(start: usize) -> Self {
        Self {
            text: String::new(),
            start,
            quote_segments: 0,
            first_quote: None,
            has_bare: false,
        }
    }

    fn finish(self, end: usize) -> Token {
        let style = match (self.quote_segments, self.has_bare, self.first_quote) {
            (0, _, _) => TokenStyle::Bare,
            (1, false, Some(quote)) => TokenStyle::Quoted(quote),
            _ => TokenStyle::Mixed,
        };
        Token {
            text: self.text,
            span: self.start..end,
            style,
        }
    }
}

/// Tokenize one line. Any trailing `\n` or `\r\n` is ignored.
pub fn tokenize(line: &str) -> Result<TokenizedLine, TokenizeError> {
    let line = line.trim_end_matches(['\n', '\r']);
    let mut tokens = Vec::new();
    let mut current: Option<Pending> = None;
    let mut chars = line.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if let Some(pending) = current.take() {
                    tokens.push(pending.finish(idx));
                }
            }
            '#' => {
                if let Some(pending) = current.take() {
                    tokens.push(pending.finish(idx));
                }
                return Ok(TokenizedLine {
                    tokens,
                    comment: Some(Comment {
                        start: idx,
                        text: line[idx..].to_string(),
                    }),
                });
            }
            '\\' => {
                let pending = current.get_or_insert_with(|| Pending::new(idx));
                pending.has_bare = true;
                match chars.next() {
                    Some((_, escaped)) => pending.text.push(escaped),
                    None => return Err(TokenizeError::DanglingEscape { column: idx + 1 }),
                }
            }
            '\'' | '"' => {
                let quote = QuoteStyle::from_char(c).unwrap_or(QuoteStyle::Double);
                let pending = current.get_or_insert_with(|| Pending::new(idx));
                pending.quote_segments += 1;
                pending.first_quote.get_or_insert(quote);
                let mut closed = false;
                while let Some((inner_idx, inner)) = chars.next() {
                    if inner == c {
                        closed = true;
                        break;
                    }
                    if quote == QuoteStyle::Double && inner == '\\' {
                        match chars.peek() {
                            Some(&(_, next)) if next == '"' || next == '\\' => {
                                pending.text.push(next);
                                chars.next();
                                continue;
                            }
                            Some(_) => {}
                            None => {
                                return Err(TokenizeError::DanglingEscape {
                                    column: inner_idx + 1,
                                })
                            }
                        }
                    }
                    pending.text.push(inner);
                }
                if !closed {
                    return Err(TokenizeError::UnterminatedQuote {
                        quote: c,
                        column: idx + 1,
                    });
                }
            }
            _ => {
                let pending = current.get_or_insert_with(|| Pending::new(idx));
                pending.has_bare = true;
                pending.text.push(c);
            }
        }
    }

    if let Some(pending) = current.take() {
        tokens.push(pending.finish(line.len()));
    }

    Ok(TokenizedLine {
        tokens,
        comment: None,
    })
}

/// Characters that force a value to be quoted when written back.
fn needs_quoting(value: &str, allow_inner_space: bool) -> bool {
    if value.is_empty() {
        return false;
    }
    if value.starts_with(char::is_whitespace) || value.ends_with(char::is_whitespace) {
        return true;
    }
    value.chars().any(|c| {
        matches!(c, '"' | '\'' | '#' | '\\')
            || (c.is_whitespace() && (!allow_inner_space || c != ' '))
    })
}

/// Render a value so that tokenizing it again yields the same text.
///
/// A `preferred` quote style is kept when the value is non-empty; otherwise the
/// value is written bare unless it contains characters the tokenizer would
/// interpret, in which case it is double-quoted.
pub fn quote_value(value: &str, preferred: Option<QuoteStyle>, allow_inner_space: bool) -> String {
    let style = match preferred {
        Some(_) if value.is_empty() => None,
        Some(QuoteStyle::Single) if value.contains('\'') => Some(QuoteStyle::Double),
        Some(style) => Some(style),
        None if needs_quoting(value, allow_inner_space) => Some(QuoteStyle::Double),
        None => None,
    };

    match style {
        None => value.to_string(),
        Some(QuoteStyle::Single) => format!("'{}'", value),
        Some(QuoteStyle::Double) => {
            let mut out = String::with_capacity(value.len() + 2);
            out.push('"');
            for c in value.chars() {
                if c == '"' || c == '\\' {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
            out
        }
    }
}
