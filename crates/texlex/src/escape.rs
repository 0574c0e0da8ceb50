//! Reversible escaping of TeX special characters.
//!
//! Escaped special characters like `\%` or `\{` look like structure to a naive
//! scanner: the `%` would start a comment and the `{` would open a group.
//! Before lexing, every such escape sequence is replaced by a single sentinel character
//! taken from the Unicode private use area.
//! After this the lexer can treat every remaining `%`, `{`, etc. as structural.
//!
//! Three transformations are provided:
//!
//! - [escape] turns raw source code into the lexer's buffer format.
//!     It also removes line continuations: a backslash directly followed by a newline
//!     and any horizontal whitespace at the start of the next line.
//! - [unescape] replaces sentinels with the literal character they stand for.
//!     This is used for the human-readable text of content tokens.
//! - [deescape] replaces sentinels with the original escape sequence.
//!     This is used to recover source code, e.g. for comment bodies.
//!
//! ```
//! # use texlex::escape;
//! let buffer = escape::escape(r"50\% off");
//! assert_eq!(escape::unescape(&buffer), "50% off");
//! assert_eq!(escape::deescape(&buffer), r"50\% off");
//! ```
//!
//! The transformations are exact inverses only if the raw source does not itself contain
//! characters from the sentinel range U+E000..U+E009.
//! Such characters are passed through unchanged by [escape] and then misread by
//! the other two functions.

use std::borrow::Cow;

struct Escape {
    /// The escape sequence as it appears in source code.
    escaped: &'static str,
    /// The character the escape sequence represents.
    literal: char,
}

const SENTINEL_BASE: u32 = 0xE000;

/// Escape sequences, indexed by sentinel offset from [SENTINEL_BASE].
const ESCAPES: [Escape; 10] = [
    Escape {
        escaped: r"\#",
        literal: '#',
    },
    Escape {
        escaped: r"\%",
        literal: '%',
    },
    Escape {
        escaped: r"\{",
        literal: '{',
    },
    Escape {
        escaped: r"\}",
        literal: '}',
    },
    Escape {
        escaped: r"\\",
        literal: '\\',
    },
    Escape {
        escaped: r"\&",
        literal: '&',
    },
    Escape {
        escaped: r"\$",
        literal: '$',
    },
    Escape {
        escaped: r"\_",
        literal: '_',
    },
    Escape {
        escaped: r"\^{}",
        literal: '^',
    },
    Escape {
        escaped: r"\~{}",
        literal: '~',
    },
];

fn sentinel(index: usize) -> char {
    // The base plus a table index is always inside the private use area.
    char::from_u32(SENTINEL_BASE + index as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn lookup(c: char) -> Option<&'static Escape> {
    let index = (c as u32).checked_sub(SENTINEL_BASE)?;
    ESCAPES.get(index as usize)
}

/// Returns true if the character is an escape sentinel.
pub fn is_sentinel(c: char) -> bool {
    lookup(c).is_some()
}

/// Convert raw source code into the lexer's buffer format.
pub fn escape(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(i) = rest.find('\\') {
        result.push_str(&rest[..i]);
        rest = &rest[i..];
        if let Some((index, e)) = ESCAPES
            .iter()
            .enumerate()
            .find(|(_, e)| rest.starts_with(e.escaped))
        {
            result.push(sentinel(index));
            rest = &rest[e.escaped.len()..];
            continue;
        }
        if let Some(after) = strip_line_continuation(rest) {
            rest = after;
            continue;
        }
        result.push('\\');
        rest = &rest[1..];
    }
    result.push_str(rest);
    result
}

/// If the string starts with a line continuation, returns the string after it.
fn strip_line_continuation(s: &str) -> Option<&str> {
    let s = s.strip_prefix('\\')?;
    let s = s.strip_prefix("\r\n").or_else(|| s.strip_prefix('\n'))?;
    Some(s.trim_start_matches([' ', '\t']))
}

/// Replace every sentinel with the literal character it represents.
pub fn unescape(text: &str) -> Cow<'_, str> {
    replace_sentinels(text, |e, s| s.push(e.literal))
}

/// Replace every sentinel with the escape sequence it was created from.
pub fn deescape(text: &str) -> Cow<'_, str> {
    replace_sentinels(text, |e, s| s.push_str(e.escaped))
}

fn replace_sentinels<F: Fn(&Escape, &mut String)>(text: &str, f: F) -> Cow<'_, str> {
    if !text.chars().any(is_sentinel) {
        return Cow::Borrowed(text);
    }
    let mut s = String::with_capacity(text.len());
    for c in text.chars() {
        match lookup(c) {
            None => s.push(c),
            Some(e) => f(e, &mut s),
        }
    }
    Cow::Owned(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! escape_tests {
        ( $( ($name: ident, $raw: expr, $unescaped: expr, $deescaped: expr), )+ ) => {
            $(
            #[test]
            fn $name() {
                let buffer = escape($raw);
                assert_eq!(unescape(&buffer), $unescaped);
                assert_eq!(deescape(&buffer), $deescaped);
            }
            )+
        };
    }

    escape_tests![
        (no_escapes, "plain text", "plain text", "plain text"),
        (percent, r"50\%", "50%", r"50\%"),
        (hash, r"\#1", "#1", r"\#1"),
        (braces, r"\{x\}", "{x}", r"\{x\}"),
        (backslash, r"a\\b", r"a\b", r"a\\b"),
        (ampersand, r"A\&B", "A&B", r"A\&B"),
        (dollar, r"\$5", "$5", r"\$5"),
        (underscore, r"a\_b", "a_b", r"a\_b"),
        (caret, r"x\^{}y", "x^y", r"x\^{}y"),
        (tilde, r"x\~{}y", "x~y", r"x\~{}y"),
        (caret_with_argument_is_not_escaped, r"\^{o}", r"\^{o}", r"\^{o}"),
        (escaped_backslash_then_comment, r"\\%", r"\%", r"\\%"),
        (line_continuation, "a\\\n   b", "ab", "ab"),
        (line_continuation_with_tab, "a\\\n\tb", "ab", "ab"),
        (line_continuation_crlf, "a\\\r\nb", "ab", "ab"),
        (escaped_backslash_before_newline, "a\\\\\nb", "a\\\nb", "a\\\\\nb"),
        (trailing_backslash, "a\\", "a\\", "a\\"),
        (multibyte, r"é\%ü", "é%ü", r"é\%ü"),
    ];

    #[test]
    fn sentinels_are_single_characters() {
        let buffer = escape(r"\%\#");
        assert_eq!(buffer.chars().count(), 2);
        assert!(buffer.chars().all(is_sentinel));
    }

    #[test]
    fn unescape_without_sentinels_borrows() {
        assert!(matches!(unescape("abc"), Cow::Borrowed("abc")));
    }
}
