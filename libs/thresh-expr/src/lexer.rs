//! Tokenizer for alarm expression text
//!
//! Words are maximal runs of characters that are neither whitespace nor one of
//! the restricted characters `(){}&|<>=",`. Keywords (`and`, `lt`, `times`, ...)
//! are left as words; the parser decides from context whether a word is a
//! keyword or a name.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ExprError, Result};

static NUMBER_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[-+]?(\d+(\.\d*)?|\.\d+)$").ok());

static INTEGER_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\d+$").ok());

/// Token text shown for errors at the end of input
pub(crate) const EOF: &str = "<EOF>";

/// Decimal literal with optional sign, no exponent
pub(crate) fn is_number(text: &str) -> bool {
    NUMBER_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(text))
}

/// Unsigned decimal integer
pub(crate) fn is_integer(text: &str) -> bool {
    INTEGER_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(text))
}

fn is_restricted(ch: char) -> bool {
    matches!(
        ch,
        '(' | ')' | '{' | '}' | '&' | '|' | '<' | '>' | '=' | '"' | ','
    )
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Word(String),
    /// Double-quoted string, quotes included
    Quoted(String),
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Equals,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(text) | Token::Quoted(text) => f.write_str(text),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
            Token::LeftBrace => f.write_str("{"),
            Token::RightBrace => f.write_str("}"),
            Token::Comma => f.write_str(","),
            Token::Equals => f.write_str("="),
            Token::Less => f.write_str("<"),
            Token::LessEqual => f.write_str("<="),
            Token::Greater => f.write_str(">"),
            Token::GreaterEqual => f.write_str(">="),
            Token::And => f.write_str("&&"),
            Token::Or => f.write_str("||"),
        }
    }
}

/// Token with the character offset where it starts
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub position: usize,
}

/// Split `text` into tokens
pub(crate) fn tokenize(text: &str) -> Result<Vec<Spanned>> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().enumerate().peekable();

    while let Some((position, ch)) = chars.next() {
        let token = match ch {
            c if c.is_whitespace() => continue,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '{' => Token::LeftBrace,
            '}' => Token::RightBrace,
            ',' => Token::Comma,
            '=' => Token::Equals,
            '<' => {
                if chars.next_if(|&(_, next)| next == '=').is_some() {
                    Token::LessEqual
                } else {
                    Token::Less
                }
            },
            '>' => {
                if chars.next_if(|&(_, next)| next == '=').is_some() {
                    Token::GreaterEqual
                } else {
                    Token::Greater
                }
            },
            '&' => {
                if chars.next_if(|&(_, next)| next == '&').is_none() {
                    return Err(ExprError::syntax(position, "&", "expected '&&'"));
                }
                Token::And
            },
            '|' => {
                if chars.next_if(|&(_, next)| next == '|').is_none() {
                    return Err(ExprError::syntax(position, "|", "expected '||'"));
                }
                Token::Or
            },
            '"' => {
                let mut quoted = String::from('"');
                let mut closed = false;
                for (_, next) in chars.by_ref() {
                    quoted.push(next);
                    if next == '"' {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(ExprError::syntax(
                        position,
                        quoted,
                        "unterminated quoted string",
                    ));
                }
                Token::Quoted(quoted)
            },
            _ => {
                let mut word = String::from(ch);
                while let Some((_, next)) =
                    chars.next_if(|&(_, next)| !next.is_whitespace() && !is_restricted(next))
                {
                    word.push(next);
                }
                Token::Word(word)
            },
        };
        tokens.push(Spanned { token, position });
    }

    Ok(tokens)
}
