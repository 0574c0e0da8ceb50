//! Parsing of command arguments.
//!
//! After a command name, every `{...}` or `[...]` group that *immediately* follows is an
//!     argument of the command.
//! The first other character ends the argument list; in particular `\item [x]` has no
//!     arguments.
//!
//! The body of an optional argument is parsed further into one of three forms:
//!
//! - A bare switch like `[h]` or `[\small]`: a single content or command token without `=`.
//! - Key/value pairs like `[width=\textwidth, angle=90]`. The value of a pair is a token
//!     sequence and may contain commands and groups.
//! - Any other token sequence, e.g. `[\textbf{Note:} see]`.

use super::section;
use super::{lex_nested, Scope};
use crate::error::{Error, ErrorKind};
use crate::escape;
use crate::token::{
    Argument, Content, KeyValue, OptionalArgument, OptionalValue, RequiredArgument, Token,
};

/// Parse the arguments starting at `p`.
///
/// Returns the arguments and the offset just past the last one.
pub(super) fn parse_arguments(
    s: &str,
    mut p: usize,
    scope: Scope,
) -> Result<(Vec<Argument>, usize), Error> {
    let mut arguments = vec![];
    loop {
        let opening = match s[p..].chars().next() {
            Some(c @ ('{' | '[')) => c,
            _ => break,
        };
        let close = section::group_end(s, p)?;
        let body_span = p + 1..close;
        let tokens = lex_nested(&s[body_span.clone()], body_span.start, scope.nested())?;
        let literal = s[p..close + 1].to_string();
        arguments.push(match opening {
            '{' => Argument::Required(RequiredArgument { tokens, literal }),
            _ => Argument::Optional(OptionalArgument {
                value: optional_value(tokens, body_span)?,
                literal,
            }),
        });
        p = close + 1;
    }
    Ok((arguments, p))
}

/// Build the value of an optional argument from the tokens of its body.
///
/// The span is the body's location, used for error messages.
fn optional_value(
    tokens: Vec<Token>,
    span: std::ops::Range<usize>,
) -> Result<OptionalValue, Error> {
    let has_pairs = tokens
        .iter()
        .any(|token| matches!(token, Token::Content(content) if content.literal.contains('=')));
    if !has_pairs {
        return Ok(match <[Token; 1]>::try_from(tokens) {
            Ok([token @ (Token::Command(_) | Token::Content(_))]) => {
                OptionalValue::Single(Box::new(token))
            }
            Ok([token]) => OptionalValue::Tokens(vec![token]),
            Err(tokens) => OptionalValue::Tokens(tokens),
        });
    }
    let mut builder = PairsBuilder {
        pairs: vec![],
        key: None,
        value: vec![],
        pending: String::new(),
        span,
    };
    for token in tokens {
        match token {
            Token::Content(content) => builder.content(&content.literal)?,
            token => builder.token(token)?,
        }
    }
    builder.finish()
}

/// Left-to-right accumulator of key/value pairs.
struct PairsBuilder {
    pairs: Vec<KeyValue>,
    /// Key of the pair being built.
    key: Option<String>,
    /// Value tokens of the pair being built.
    value: Vec<Token>,
    /// Text of the current segment while no key is open.
    ///
    /// A key may be split by a comment, as in `a% note` then `=1`.
    pending: String,
    span: std::ops::Range<usize>,
}

impl PairsBuilder {
    fn missing_equals(&self, segment: &str) -> Error {
        Error::new(
            self.span.clone(),
            ErrorKind::MissingEquals {
                segment: escape::deescape(segment.trim()).into_owned(),
            },
        )
    }

    /// Add text. Every comma in the text ends the current segment.
    fn content(&mut self, literal: &str) -> Result<(), Error> {
        for (i, text) in literal.split(',').enumerate() {
            if i > 0 {
                self.end_segment()?;
            }
            self.text(text)?;
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), Error> {
        if self.key.is_some() {
            // Continuation of the value of the open pair, e.g. the ` cm` in `a=\x cm`.
            if text.contains('=') {
                return Err(self.missing_equals(text));
            }
            self.push_value_text(text);
            return Ok(());
        }
        self.pending.push_str(text);
        let segment = std::mem::take(&mut self.pending);
        let (key, value) = match segment.split_once('=') {
            None => {
                self.pending = segment;
                return Ok(());
            }
            Some(kv) => kv,
        };
        let key = key.trim();
        if key.is_empty() || value.contains('=') {
            return Err(self.missing_equals(&segment));
        }
        self.key = Some(escape::unescape(key).into_owned());
        self.push_value_text(value);
        Ok(())
    }

    /// End the current segment at a comma or at the end of the argument.
    fn end_segment(&mut self) -> Result<(), Error> {
        if self.key.is_none() {
            let segment = std::mem::take(&mut self.pending);
            return Err(self.missing_equals(&segment));
        }
        self.close_pair()
    }

    fn push_value_text(&mut self, text: &str) {
        let text = if self.value.is_empty() {
            text.trim_start()
        } else {
            text
        };
        if !text.is_empty() {
            self.value.push(Token::Content(Content::new(text)));
        }
    }

    fn token(&mut self, token: Token) -> Result<(), Error> {
        if self.key.is_none() {
            if let Token::Comment(_) = token {
                return Ok(());
            }
            return Err(Error::new(self.span.clone(), ErrorKind::ValueWithoutKey));
        }
        self.value.push(token);
        Ok(())
    }

    fn close_pair(&mut self) -> Result<(), Error> {
        let key = match self.key.take() {
            None => return Ok(()),
            Some(key) => key,
        };
        while let Some(Token::Content(last)) = self.value.last() {
            let trimmed = last.literal.trim_end();
            if trimmed.len() == last.literal.len() {
                break;
            }
            let trimmed = Content::new(trimmed);
            self.value.pop();
            if !trimmed.literal.is_empty() {
                self.value.push(Token::Content(trimmed));
                break;
            }
        }
        if self.value.is_empty() {
            return Err(self.missing_equals(&format!["{key}="]));
        }
        self.pairs.push(KeyValue {
            key,
            value: std::mem::take(&mut self.value),
        });
        Ok(())
    }

    fn finish(mut self) -> Result<OptionalValue, Error> {
        self.end_segment()?;
        Ok(OptionalValue::Pairs(self.pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lexer;

    fn value(body: &str) -> Result<OptionalValue, ErrorKind> {
        let tokens = Lexer::new(body).read_to_end().map_err(|err| err.kind)?;
        optional_value(tokens, 0..body.len()).map_err(|err| err.kind)
    }

    /// Render pairs as `key=value` with values in source form.
    fn pairs(body: &str) -> Vec<(String, String)> {
        match value(body) {
            Ok(OptionalValue::Pairs(pairs)) => pairs
                .into_iter()
                .map(|kv| {
                    let value: String = kv.value.iter().map(|t| t.source()).collect();
                    (kv.key, value)
                })
                .collect(),
            other => panic!("expected pairs, got {other:?}"),
        }
    }

    fn kv(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn bare_content_switch() {
        match value("h").unwrap() {
            OptionalValue::Single(token) => assert_eq!(token.source(), "h"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bare_command_switch() {
        match value(r"\small").unwrap() {
            OptionalValue::Single(token) => assert_eq!(token.command_name(), Some("small")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_body() {
        assert_eq!(value(""), Ok(OptionalValue::Tokens(vec![])));
    }

    #[test]
    fn token_list_without_keys() {
        match value(r"\textbf{Note:} see").unwrap() {
            OptionalValue::Tokens(tokens) => assert_eq!(tokens.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn single_block_is_a_token_list() {
        assert!(matches!(value("{x}"), Ok(OptionalValue::Tokens(tokens)) if tokens.len() == 1));
    }

    macro_rules! pairs_tests {
        ( $( ($name: ident, $body: expr, [ $( ($k: expr, $v: expr) ),* ]), )+ ) => {
            $(
            #[test]
            fn $name() {
                similar_asserts::assert_eq!(pairs($body), vec![ $( kv($k, $v) ),* ]);
            }
            )+
        };
    }

    pairs_tests![
        (single_pair, "a=1", [("a", "1")]),
        (several_pairs, "a=1,b=2,c=3", [("a", "1"), ("b", "2"), ("c", "3")]),
        (whitespace_is_trimmed, " a = 1 , b= 2 ", [("a", "1"), ("b", "2")]),
        (command_value, r"width=\textwidth", [("width", r"\textwidth")]),
        (
            command_value_then_text_pair,
            r"width=\textwidth, height=3cm",
            [("width", r"\textwidth"), ("height", "3cm")]
        ),
        (
            text_pair_then_command_value,
            r"angle=90,width=\linewidth",
            [("angle", "90"), ("width", r"\linewidth")]
        ),
        (
            value_mixing_commands_and_text,
            r"width=0.5\textwidth, scale=2",
            [("width", r"0.5\textwidth"), ("scale", "2")]
        ),
        (
            value_with_group,
            r"label={a, b}, x=1",
            [("label", "{a, b}"), ("x", "1")]
        ),
        (
            nested_optional_argument_in_value,
            r"font=\fontsize[x=1]{10}, y=2",
            [("font", r"\fontsize[x=1]{10}"), ("y", "2")]
        ),
        (
            comment_between_pairs,
            "a=1,% note\n b=2",
            [("a", "1"), ("b", "2")]
        ),
        (comment_inside_key, "ab% note\n=1", [("ab", "1")]),
        (
            escaped_comma_stays_in_value,
            r"sep=\,",
            [("sep", r"\,")]
        ),
    ];

    #[test]
    fn missing_equals_sign() {
        assert!(matches!(
            value("a=1,b"),
            Err(ErrorKind::MissingEquals { segment }) if segment == "b"
        ));
    }

    #[test]
    fn empty_value() {
        assert!(matches!(
            value("a=,b=2"),
            Err(ErrorKind::MissingEquals { segment }) if segment == "a="
        ));
    }

    #[test]
    fn trailing_comma() {
        assert!(matches!(
            value("a=1,"),
            Err(ErrorKind::MissingEquals { segment }) if segment.is_empty()
        ));
    }

    #[test]
    fn doubled_comma() {
        assert!(matches!(
            value("a=1,,b=2"),
            Err(ErrorKind::MissingEquals { segment }) if segment.is_empty()
        ));
    }

    #[test]
    fn blank_segment() {
        assert!(matches!(
            value("a=1, ,b=2"),
            Err(ErrorKind::MissingEquals { .. })
        ));
    }

    #[test]
    fn two_equals_signs() {
        assert!(matches!(value("a=1=2"), Err(ErrorKind::MissingEquals { .. })));
    }

    #[test]
    fn command_before_any_key() {
        assert_eq!(value(r"\x, a=1"), Err(ErrorKind::ValueWithoutKey));
    }
}
