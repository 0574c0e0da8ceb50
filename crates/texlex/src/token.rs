//! Tokens produced by the lexer.
//!
//! A [Token] is an immutable tree.
//! Every token records its `literal`: the exact slice of the lexer's escaped buffer
//!     it was produced from.
//! Concatenating the literals of the top-level tokens of a document gives back the
//!     escaped buffer, byte for byte.
//! Structured tokens (commands, groups, math, accents and scripts) additionally own
//!     the tokens lexed from their bodies.

use crate::escape;
use std::borrow::Cow;

/// A token in a LaTeX document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Token {
    /// A backslash-introduced named command, like `\section{Intro}`.
    Command(Command),
    /// A math region, like `$x$` or `\[ x \]`.
    Math(Math),
    /// A brace-delimited group that is not the argument of a command.
    Block(Block),
    /// A bracketed span of running text that contains more than text, like `[\ref{x}]`.
    Bracket(Bracket),
    /// A diacritic applied to the following unit, like `\'e` or `\c{c}`.
    Accent(Accent),
    /// A comment, from `%` to the end of the line.
    Comment(Comment),
    /// The column separator `&`.
    ColumnAlign,
    /// A macro parameter reference like `#1`.
    Placeholder(Placeholder),
    /// A superscript or subscript.
    Script(Script),
    /// Plain text.
    Content(Content),
}

impl Token {
    /// The exact slice of the escaped buffer this token was produced from.
    pub fn literal(&self) -> &str {
        use Token::*;
        match self {
            Command(t) => &t.literal,
            Math(t) => &t.literal,
            Block(t) => &t.literal,
            Bracket(t) => &t.literal,
            Accent(t) => &t.literal,
            Comment(t) => &t.literal,
            ColumnAlign => "&",
            Placeholder(t) => &t.literal,
            Script(t) => &t.literal,
            Content(t) => &t.literal,
        }
    }

    /// Number of buffer bytes consumed to produce this token.
    ///
    /// The lexer's cursor advances by exactly this amount.
    pub fn span_len(&self) -> usize {
        match self {
            Token::Content(content) => content.original_length(),
            _ => self.literal().len(),
        }
    }

    /// The token as it appeared in the original, unescaped source code.
    pub fn source(&self) -> Cow<'_, str> {
        escape::deescape(self.literal())
    }

    /// The direct children of this token.
    ///
    /// For commands this is empty; their children are reached through their arguments.
    pub fn children(&self) -> &[Token] {
        match self {
            Token::Math(math) => &math.tokens,
            Token::Block(block) => &block.tokens,
            Token::Bracket(bracket) => &bracket.tokens,
            Token::Accent(accent) => std::slice::from_ref(accent.body.as_ref()),
            Token::Script(script) => std::slice::from_ref(script.body.as_ref()),
            Token::Command(_)
            | Token::Comment(_)
            | Token::ColumnAlign
            | Token::Placeholder(_)
            | Token::Content(_) => &[],
        }
    }

    /// The name of the command, if this token is a command.
    pub fn command_name(&self) -> Option<&str> {
        match self {
            Token::Command(command) => Some(&command.name),
            _ => None,
        }
    }

    /// A short human readable name for the kind of this token.
    pub fn kind_name(&self) -> &'static str {
        use Token::*;
        match self {
            Command(_) => "command",
            Math(_) => "math",
            Block(_) => "block",
            Bracket(_) => "bracket",
            Accent(_) => "accent",
            Comment(_) => "comment",
            ColumnAlign => "column alignment",
            Placeholder(_) => "placeholder",
            Script(_) => "script",
            Content(_) => "content",
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source())
    }
}

/// A command like `\documentclass[12pt]{article}`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Command {
    /// Name of the command, without the backslash.
    pub name: String,
    /// Arguments in the order they appear in the source.
    pub arguments: Vec<Argument>,
    pub literal: String,
}

impl Command {
    /// The `i`-th required argument, counting only required arguments.
    pub fn required(&self, i: usize) -> Option<&RequiredArgument> {
        self.arguments
            .iter()
            .filter_map(|arg| match arg {
                Argument::Required(r) => Some(r),
                Argument::Optional(_) => None,
            })
            .nth(i)
    }

    /// The `i`-th optional argument, counting only optional arguments.
    pub fn optional(&self, i: usize) -> Option<&OptionalArgument> {
        self.arguments
            .iter()
            .filter_map(|arg| match arg {
                Argument::Optional(o) => Some(o),
                Argument::Required(_) => None,
            })
            .nth(i)
    }
}

/// An argument to a command.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Argument {
    Required(RequiredArgument),
    Optional(OptionalArgument),
}

impl Argument {
    /// The exact buffer slice of the argument, including its delimiters.
    pub fn literal(&self) -> &str {
        match self {
            Argument::Required(r) => &r.literal,
            Argument::Optional(o) => &o.literal,
        }
    }
}

/// The contents of one `{...}` group following a command.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RequiredArgument {
    pub tokens: Vec<Token>,
    pub literal: String,
}

/// The contents of one `[...]` group following a command.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionalArgument {
    pub value: OptionalValue,
    pub literal: String,
}

/// Parsed body of an optional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptionalValue {
    /// A bare switch like `[h]` or `[\small]`.
    Single(Box<Token>),
    /// A list of key/value pairs like `[width=3cm, angle=90]`.
    Pairs(Vec<KeyValue>),
    /// Any other body, e.g. `[\textbf{Note:} see]` or the empty body `[]`.
    Tokens(Vec<Token>),
}

/// One `key=value` pair of an optional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyValue {
    /// The key, unescaped and with surrounding whitespace removed.
    pub key: String,
    pub value: Vec<Token>,
}

/// Whether a math region is typeset inline or as a centered display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MathPosition {
    /// `$...$` or `\(...\)`.
    Inline,
    /// `$$...$$` or `\[...\]`.
    Display,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Math {
    pub position: MathPosition,
    pub tokens: Vec<Token>,
    pub literal: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    pub tokens: Vec<Token>,
    pub literal: String,
}

/// Brackets in running text, e.g. `[\ref{x}]` in `see [\ref{x}] here`.
///
/// Bracketed spans holding only text, like `[1]`, are part of a [Content] token instead.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bracket {
    pub tokens: Vec<Token>,
    pub literal: String,
}

/// The two forms of accent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccentKind {
    /// Accents like `\'e` or `\^{o}` that take any modifiable unit.
    Variable,
    /// Letter accents like `\c{c}` that are only accents when followed by a brace group.
    BlockRequired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Accent {
    pub kind: AccentKind,
    /// The character after the backslash, e.g. `'` for `\'e`.
    pub mark: char,
    /// The unit the accent applies to.
    pub body: Box<Token>,
    pub literal: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Comment {
    /// Body of the comment, after the `%` and without the newline.
    ///
    /// Escape sequences in the body are shown as they appear in the source.
    pub text: String,
    pub literal: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placeholder {
    /// The parameter number, e.g. 1 for `#1`.
    pub index: usize,
    pub literal: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScriptKind {
    /// `^`
    Superscript,
    /// `_`
    Subscript,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Script {
    pub kind: ScriptKind,
    pub body: Box<Token>,
    pub literal: String,
}

/// A maximal run of text containing no structurally significant characters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Content {
    /// The text with escape sequences replaced by the characters they represent.
    pub text: String,
    pub literal: String,
}

impl Content {
    pub(crate) fn new(literal: &str) -> Content {
        Content {
            text: escape::unescape(literal).into_owned(),
            literal: literal.to_string(),
        }
    }

    /// Length of the content in the escaped buffer.
    ///
    /// This differs from the length of [Content::text] when the text contains escapes.
    pub fn original_length(&self) -> usize {
        self.literal.len()
    }
}
