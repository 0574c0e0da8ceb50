//! Scanning of nested sections.
//!
//! A section is the part of the buffer between an opening delimiter and the matching
//!     closing delimiter, e.g. the body of `{...}` or of `$...$`.
//! Groups nested inside the section are tracked on an explicit stack so that the
//!     closing delimiter is only recognized at nesting depth zero.

use crate::error::{Error, ErrorKind};

/// Which opening characters create nesting inside a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Nesting {
    /// Only `{` and `}` nest.
    ///
    /// Used for brace groups and math, where unbalanced brackets like `[0, 1)` are normal.
    Braces,
    /// Both braces and brackets nest.
    ///
    /// Used for optional arguments, where `[a[b]c]` is a single argument.
    BracesAndBrackets,
}

fn closing_for(opening: char) -> char {
    match opening {
        '[' => ']',
        _ => '}',
    }
}

/// Find the offset of `terminator` ending the section that starts at `start`.
///
/// Returns `None` if the input ends before the terminator is found at depth zero.
/// Closing characters that do not match the innermost open group are an error,
///     as are groups opened in the section that are never closed.
/// Comments are skipped, so braces inside a comment do not nest.
pub(crate) fn find_terminator(
    s: &str,
    start: usize,
    terminator: &str,
    nesting: Nesting,
) -> Result<Option<usize>, Error> {
    let mut stack: Vec<(char, usize)> = vec![];
    let mut i = start;
    while let Some(c) = s[i..].chars().next() {
        if stack.is_empty() && s[i..].starts_with(terminator) {
            return Ok(Some(i));
        }
        // Brackets never nest inside braces, e.g. `[a{]}b]`.
        let brackets_nest =
            nesting == Nesting::BracesAndBrackets && !matches!(stack.last(), Some(('{', _)));
        match c {
            '{' => {
                stack.push((c, i));
            }
            '[' if brackets_nest => {
                stack.push((c, i));
            }
            '}' | ']' if c == '}' || brackets_nest => match stack.pop() {
                None => {
                    return Err(Error::at(i, ErrorKind::NoMatchingOpener { closing: c }));
                }
                Some((opening, _)) if closing_for(opening) == c => {}
                Some((opening, opening_position)) => {
                    return Err(Error::at(
                        i,
                        ErrorKind::MismatchedDelimiter {
                            opening,
                            opening_position,
                            closing: c,
                        },
                    ));
                }
            },
            '%' => {
                i = match s[i..].find('\n') {
                    None => s.len(),
                    Some(j) => i + j + 1,
                };
                continue;
            }
            _ => {}
        }
        i += c.len_utf8();
    }
    match stack.pop() {
        None => Ok(None),
        Some((opening, opening_position)) => Err(Error::new(
            opening_position..s.len(),
            ErrorKind::NeverTerminated { opening },
        )),
    }
}

/// Find the offset of the character closing the group that opens at `p`.
///
/// The character at `p` must be `{` or `[`.
pub(crate) fn group_end(s: &str, p: usize) -> Result<usize, Error> {
    let (opening, nesting) = match s[p..].chars().next() {
        Some('[') => ('[', Nesting::BracesAndBrackets),
        _ => ('{', Nesting::Braces),
    };
    let mut buf = [0_u8; 4];
    let terminator = closing_for(opening).encode_utf8(&mut buf);
    match find_terminator(s, p + 1, terminator, nesting)? {
        Some(i) => Ok(i),
        None => Err(Error::new(
            p..s.len(),
            ErrorKind::NeverTerminated { opening },
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! group_end_tests {
        ( $( ($name: ident, $input: expr, $want: expr), )+ ) => {
            $(
            #[test]
            fn $name() {
                let got = group_end($input, 0).map_err(|err| err.kind);
                assert_eq!(got, $want);
            }
            )+
        };
    }

    group_end_tests![
        (empty_brace_group, "{}", Ok(1)),
        (nested_braces, "{a{b}c}d", Ok(6)),
        (brackets_do_not_nest_in_braces, "{a]b}", Ok(4)),
        (nested_brackets, "[a[b]c]", Ok(6)),
        (brackets_in_braces_in_brackets, "[a{]}b]", Ok(6)),
        (
            never_terminated,
            "{a{b}",
            Err(ErrorKind::NeverTerminated { opening: '{' })
        ),
        (
            inner_group_never_terminated,
            "[a{b",
            Err(ErrorKind::NeverTerminated { opening: '{' })
        ),
        (
            mismatched,
            "[a[b}]",
            Err(ErrorKind::MismatchedDelimiter {
                opening: '[',
                opening_position: 2,
                closing: '}'
            })
        ),
        (brace_in_comment, "{a%}\n}", Ok(5)),
        (multibyte_content, "{é{ü}}", Ok(7)),
    ];

    #[test]
    fn inner_never_terminated_points_at_innermost_opener() {
        let err = group_end("[a{b", 0).unwrap_err();
        assert_eq!(err.span, 2..4);
    }

    #[test]
    fn terminator_not_found() {
        assert_eq!(find_terminator("a{b}c", 0, "$", Nesting::Braces), Ok(None));
    }

    #[test]
    fn terminator_inside_group_is_skipped() {
        assert_eq!(
            find_terminator(r"a{$}b$c", 0, "$", Nesting::Braces),
            Ok(Some(5))
        );
    }

    #[test]
    fn multi_character_terminator() {
        assert_eq!(
            find_terminator(r"[0,1)\]", 0, r"\]", Nesting::Braces),
            Ok(Some(5))
        );
    }
}
