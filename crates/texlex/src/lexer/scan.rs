//! Lexing of a single token.
//!
//! Every function here takes the escaped buffer and the offset of the first character
//!     of the construct, and returns a token whose literal starts at that offset.
//! Lexing a token reads the buffer from the start offset up to at most one character
//!     past the end of its literal, which is what makes position-keyed caching sound.
//! The one exception is a `]` in math, which looks back for its `[`.
//! Math bodies are only lexed by the uncached lexers of nested regions.

use super::args;
use super::section::{self, Nesting};
use super::{lex_nested, Scope};
use crate::error::{Error, ErrorKind};
use crate::escape;
use crate::token::{
    Accent, AccentKind, Block, Bracket, Command, Comment, Content, Math, MathPosition,
    Placeholder, Script, ScriptKind, Token,
};

/// Accents like `\'e` that take a single unit directly.
const VARIABLE_ACCENTS: [char; 7] = ['^', '~', '`', '\'', '"', '=', '.'];

/// Letter accents like `\c{c}` that must be followed by a brace group.
const BLOCK_ACCENTS: [char; 7] = ['H', 'c', 'b', 'd', 'u', 'v', 't'];

/// Non-letter characters that form a one-character command, like `\,`.
const CONTROL_SYMBOLS: [char; 11] = [',', ';', ':', '!', '>', '<', '|', '/', '-', '@', ' '];

/// Characters that end a content run, apart from brackets.
fn is_significant(c: char) -> bool {
    matches!(
        c,
        '\\' | '{' | '}' | '$' | '&' | '%' | '#' | '^' | '_'
    )
}

fn char_at(s: &str, p: usize) -> Option<char> {
    s.get(p..)?.chars().next()
}

/// Lex the token starting at `p`, or return `None` at the end of the buffer.
pub(super) fn lex_token(s: &str, p: usize, scope: Scope) -> Result<Option<Token>, Error> {
    let c = match char_at(s, p) {
        None => return Ok(None),
        Some(c) => c,
    };
    let token = match c {
        '{' => Token::Block(block(s, p, scope)?),
        '\\' => backslash(s, p, scope)?,
        '^' => script(s, p, scope, ScriptKind::Superscript)?,
        '_' => script(s, p, scope, ScriptKind::Subscript)?,
        '&' => Token::ColumnAlign,
        '%' => comment(s, p),
        '#' => placeholder(s, p)?,
        '$' => Token::Math(dollar_math(s, p, scope)?),
        '}' => {
            return Err(Error::at(p, ErrorKind::NoMatchingOpener { closing: c }));
        }
        '[' if !scope.math => bracket(s, p, scope)?,
        ']' if !scope.math || open_brackets(&s[..p]) == 0 => {
            return Err(Error::at(p, ErrorKind::NoMatchingOpener { closing: c }));
        }
        _ => content(s, p, scope),
    };
    Ok(Some(token))
}

fn block(s: &str, p: usize, scope: Scope) -> Result<Block, Error> {
    let close = section::group_end(s, p)?;
    Ok(Block {
        tokens: lex_nested(&s[p + 1..close], p + 1, scope.nested())?,
        literal: s[p..close + 1].to_string(),
    })
}

/// Lex a bracketed span of running text, like `[1]` or `[\ref{x}]`.
///
/// A span holding only text is the start of a content run.
/// Anything else is a [Bracket] token.
fn bracket(s: &str, p: usize, scope: Scope) -> Result<Token, Error> {
    let close = section::group_end(s, p)?;
    let inner = &s[p + 1..close];
    if !inner.contains(is_significant) {
        return Ok(content(s, p, scope));
    }
    Ok(Token::Bracket(Bracket {
        tokens: lex_nested(inner, p + 1, scope.nested())?,
        literal: s[p..close + 1].to_string(),
    }))
}

fn backslash(s: &str, p: usize, scope: Scope) -> Result<Token, Error> {
    let c = match char_at(s, p + 1) {
        None => return Err(Error::at(p, ErrorKind::EmptyControlSequence)),
        Some(c) => c,
    };
    match c {
        '[' => Ok(Token::Math(math(s, p, scope, 2, r"\]", MathPosition::Display)?)),
        '(' => Ok(Token::Math(math(s, p, scope, 2, r"\)", MathPosition::Inline)?)),
        ']' | ')' => Err(Error::new(
            p..p + 2,
            ErrorKind::UnexpectedMathCloser {
                closing: s[p..p + 2].to_string(),
            },
        )),
        c if VARIABLE_ACCENTS.contains(&c) => {
            let body = modifiable_unit(s, p, p + 2, scope, "accent")?;
            let end = p + 2 + body.span_len();
            Ok(Token::Accent(Accent {
                kind: AccentKind::Variable,
                mark: c,
                body: Box::new(body),
                literal: s[p..end].to_string(),
            }))
        }
        c if BLOCK_ACCENTS.contains(&c) && char_at(s, p + 2) == Some('{') => {
            let body = block(s, p + 2, scope)?;
            let end = p + 2 + body.literal.len();
            Ok(Token::Accent(Accent {
                kind: AccentKind::BlockRequired,
                mark: c,
                body: Box::new(Token::Block(body)),
                literal: s[p..end].to_string(),
            }))
        }
        c if c.is_ascii_alphanumeric() => Ok(Token::Command(command(s, p, scope)?)),
        c if CONTROL_SYMBOLS.contains(&c) => Ok(Token::Command(Command {
            name: c.to_string(),
            arguments: vec![],
            literal: s[p..p + 2].to_string(),
        })),
        _ => Err(Error::at(p, ErrorKind::EmptyControlSequence)),
    }
}

fn command(s: &str, p: usize, scope: Scope) -> Result<Command, Error> {
    let name_start = p + 1;
    let mut name_end = match s[name_start..].find(|c: char| !c.is_ascii_alphanumeric()) {
        None => s.len(),
        Some(i) => name_start + i,
    };
    if char_at(s, name_end) == Some('*') {
        name_end += 1;
    }
    let (arguments, end) = args::parse_arguments(s, name_end, scope)?;
    Ok(Command {
        name: s[name_start..name_end].to_string(),
        arguments,
        literal: s[p..end].to_string(),
    })
}

fn dollar_math(s: &str, p: usize, scope: Scope) -> Result<Math, Error> {
    if s[p + 1..].starts_with('$') {
        math(s, p, scope, 2, "$$", MathPosition::Display)
    } else {
        math(s, p, scope, 1, "$", MathPosition::Inline)
    }
}

fn math(
    s: &str,
    p: usize,
    scope: Scope,
    opening_len: usize,
    closing: &str,
    position: MathPosition,
) -> Result<Math, Error> {
    let body_start = p + opening_len;
    let close = match section::find_terminator(s, body_start, closing, Nesting::Braces)? {
        None => {
            return Err(Error::new(
                p..s.len(),
                ErrorKind::UnterminatedMath {
                    closing: closing.to_string(),
                },
            ))
        }
        Some(close) => close,
    };
    Ok(Math {
        position,
        tokens: lex_nested(&s[body_start..close], body_start, scope.nested_math())?,
        literal: s[p..close + closing.len()].to_string(),
    })
}

fn script(s: &str, p: usize, scope: Scope, kind: ScriptKind) -> Result<Token, Error> {
    let construct = match kind {
        ScriptKind::Superscript => "superscript",
        ScriptKind::Subscript => "subscript",
    };
    let body = modifiable_unit(s, p, p + 1, scope, construct)?;
    let end = p + 1 + body.span_len();
    Ok(Token::Script(Script {
        kind,
        body: Box::new(body),
        literal: s[p..end].to_string(),
    }))
}

/// Lex the unit at `p` that a script or accent starting at `start` applies to.
///
/// This is a single alphanumeric character, a brace group, or a command.
fn modifiable_unit(
    s: &str,
    start: usize,
    p: usize,
    scope: Scope,
    construct: &str,
) -> Result<Token, Error> {
    let invalid = || {
        let end = p + char_at(s, p).map(char::len_utf8).unwrap_or(0);
        Error::new(
            start..end,
            ErrorKind::InvalidModifiableUnit {
                construct: construct.to_string(),
            },
        )
    };
    match char_at(s, p) {
        Some('{') => Ok(Token::Block(block(s, p, scope)?)),
        Some('\\') => match backslash(s, p, scope)? {
            token @ (Token::Command(_) | Token::Accent(_)) => Ok(token),
            _ => Err(invalid()),
        },
        Some(c) if c.is_alphanumeric() => {
            Ok(Token::Content(Content::new(&s[p..p + c.len_utf8()])))
        }
        _ => Err(invalid()),
    }
}

fn comment(s: &str, p: usize) -> Token {
    let end = match s[p..].find('\n') {
        None => s.len(),
        Some(i) => p + i + 1,
    };
    let body = &s[p + 1..end];
    let body = body.strip_suffix('\n').unwrap_or(body);
    let body = body.strip_suffix('\r').unwrap_or(body);
    Token::Comment(Comment {
        text: escape::deescape(body).into_owned(),
        literal: s[p..end].to_string(),
    })
}

fn placeholder(s: &str, p: usize) -> Result<Token, Error> {
    let digits_start = p + 1;
    let digits_end = match s[digits_start..].find(|c: char| !c.is_ascii_digit()) {
        None => s.len(),
        Some(i) => digits_start + i,
    };
    if digits_end == digits_start {
        return Err(Error::at(p, ErrorKind::EmptyPlaceholder));
    }
    let index = s[digits_start..digits_end]
        .parse::<usize>()
        .map_err(|_| Error::new(p..digits_end, ErrorKind::PlaceholderTooLarge))?;
    Ok(Token::Placeholder(Placeholder {
        index,
        literal: s[p..digits_end].to_string(),
    }))
}

/// Number of brackets opened and not yet closed in `prefix`.
fn open_brackets(prefix: &str) -> usize {
    prefix.chars().fold(0_usize, |open, c| match c {
        '[' => open + 1,
        ']' => open.saturating_sub(1),
        _ => open,
    })
}

/// Lex a maximal run of text.
///
/// Outside of math a run may start with a bracketed span of text, like `[1] and`;
///     any other bracket ends it.
/// In math a `[` is plain text, so `[0, 1)` is a single run, and a `]` ends the run
///     unless it starts it.
fn content(s: &str, p: usize, scope: Scope) -> Token {
    let mut depth: usize = 0;
    let mut end = s.len();
    for (i, c) in s[p..].char_indices() {
        let ends_run = match c {
            '[' if scope.math => false,
            ']' if scope.math => i > 0,
            '[' if i == 0 || depth > 0 => {
                depth += 1;
                false
            }
            ']' if depth > 0 => {
                depth -= 1;
                false
            }
            '[' | ']' => true,
            c => is_significant(c),
        };
        if ends_run {
            end = p + i;
            break;
        }
    }
    Token::Content(Content::new(&s[p..end]))
}
