//! Errors raised while lexing.
//!
//! Lexing errors are fatal to the token being built.
//! There is no recovery inside the lexer: the error is returned to the caller,
//!     who may decide how to resynchronize (e.g. by skipping to the next line).

/// Error encountered when lexing a LaTeX document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Error {
    /// Location of the problem, as a byte range into the escaped buffer.
    pub span: std::ops::Range<usize>,
    pub kind: ErrorKind,
}

/// Kind of a lexing error.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// A `{` or `[` is never closed before the end of the input.
    NeverTerminated { opening: char },

    /// A `}` or `]` appears without a matching opening character.
    NoMatchingOpener { closing: char },

    /// A closing character does not match the innermost open group;
    ///     e.g. `[a}`.
    MismatchedDelimiter {
        opening: char,
        /// Offset of the opening character.
        opening_position: usize,
        closing: char,
    },

    /// A math region is never closed.
    UnterminatedMath {
        /// The delimiter that was expected, e.g. `$` or `\]`.
        closing: String,
    },

    /// A `\]` or `\)` appears outside of math.
    UnexpectedMathCloser { closing: String },

    /// A backslash is not followed by a command name or a supported symbol.
    EmptyControlSequence,

    /// A `#` is not followed by a parameter number.
    EmptyPlaceholder,

    /// A parameter number does not fit in a machine integer.
    PlaceholderTooLarge,

    /// A superscript, subscript or accent is not followed by a single character,
    ///     a brace group or a command.
    InvalidModifiableUnit {
        /// The construct being built, e.g. `superscript`.
        construct: String,
    },

    /// A segment of a key/value optional argument is not of the form `key=value`.
    MissingEquals { segment: String },

    /// A value appears in a key/value optional argument without a key.
    ValueWithoutKey,

    /// Groups, arguments and math regions are nested more deeply than the lexer allows.
    NestingTooDeep {
        /// The maximum nesting depth.
        limit: usize,
    },
}

/// Label on an error message.
///
/// A label identifies a particular piece of source code and some
/// information about it.
pub struct ErrorLabel {
    pub span: std::ops::Range<usize>,
    pub text: String,
}

impl Error {
    pub(crate) fn new(span: std::ops::Range<usize>, kind: ErrorKind) -> Error {
        Error { span, kind }
    }

    pub(crate) fn at(position: usize, kind: ErrorKind) -> Error {
        Error {
            span: position..position + 1,
            kind,
        }
    }

    /// Move the error by the provided number of bytes.
    ///
    /// Errors raised by the lexer of a nested region are relative to that region.
    /// This is used to rebase them onto the enclosing buffer.
    pub fn offset(mut self, by: usize) -> Error {
        self.span = self.span.start + by..self.span.end + by;
        if let ErrorKind::MismatchedDelimiter {
            opening_position, ..
        } = &mut self.kind
        {
            *opening_position += by;
        }
        self
    }

    pub fn message(&self) -> String {
        use ErrorKind::*;
        match &self.kind {
            NeverTerminated { opening } => {
                format!["The opening character `{opening}` is never terminated"]
            }
            NoMatchingOpener { closing } => {
                format!["The closing character `{closing}` has no matching opening character"]
            }
            MismatchedDelimiter {
                opening, closing, ..
            } => format!["The closing character `{closing}` does not match `{opening}`"],
            UnterminatedMath { closing } => {
                format!["The math region is never terminated by `{closing}`"]
            }
            UnexpectedMathCloser { closing } => {
                format!["`{closing}` appears outside of a math region"]
            }
            EmptyControlSequence => "A backslash is not followed by a command name".into(),
            EmptyPlaceholder => "A `#` is not followed by a parameter number".into(),
            PlaceholderTooLarge => "The parameter number is too large".into(),
            InvalidModifiableUnit { construct } => {
                format!["The {construct} is not followed by a character, group or command"]
            }
            MissingEquals { .. } => {
                "Keys and values must be separated by an equals sign".into()
            }
            ValueWithoutKey => "A value appears in an optional argument without a key".into(),
            NestingTooDeep { limit } => {
                format!["Groups are nested more than {limit} levels deep"]
            }
        }
    }

    pub fn main_span(&self) -> std::ops::Range<usize> {
        self.span.clone()
    }

    pub fn labels(&self) -> Vec<ErrorLabel> {
        use ErrorKind::*;
        match &self.kind {
            MismatchedDelimiter {
                opening,
                opening_position,
                closing,
            } => vec![
                ErrorLabel {
                    span: self.main_span(),
                    text: format!["`{closing}` appears here"],
                },
                ErrorLabel {
                    span: *opening_position..*opening_position + 1,
                    text: format!["the innermost open group starts with `{opening}` here"],
                },
            ],
            NeverTerminated { opening } => vec![ErrorLabel {
                span: self.main_span(),
                text: format!["the group opened by `{opening}` continues to the end of the input"],
            }],
            MissingEquals { segment } => vec![ErrorLabel {
                span: self.main_span(),
                text: format!["the segment `{segment}` appears in this argument"],
            }],
            NoMatchingOpener { .. }
            | UnterminatedMath { .. }
            | UnexpectedMathCloser { .. }
            | EmptyControlSequence
            | EmptyPlaceholder
            | PlaceholderTooLarge
            | InvalidModifiableUnit { .. }
            | ValueWithoutKey
            | NestingTooDeep { .. } => vec![ErrorLabel {
                span: self.main_span(),
                text: "error occurred here".into(),
            }],
        }
    }

    pub fn notes(&self) -> Vec<String> {
        use ErrorKind::*;
        match &self.kind {
            NoMatchingOpener { .. } => {
                vec![r"to typeset a literal brace use `\{` or `\}`".to_string()]
            }
            EmptyPlaceholder => vec![r"to typeset a literal hash use `\#`".to_string()],
            InvalidModifiableUnit { .. } => vec![
                "to apply it to more than one character surround them with braces".to_string(),
            ],
            MissingEquals { .. } => {
                vec!["key/value pairs are separated by commas, e.g. `[a=1, b=2]`".to_string()]
            }
            NeverTerminated { .. }
            | MismatchedDelimiter { .. }
            | UnterminatedMath { .. }
            | UnexpectedMathCloser { .. }
            | EmptyControlSequence
            | PlaceholderTooLarge
            | ValueWithoutKey
            | NestingTooDeep { .. } => vec![],
        }
    }

    /// Build a terminal diagnostic for this error.
    ///
    /// Spans are byte offsets into the escaped buffer, so the report must be printed
    ///     against [crate::Lexer::buffer], not the original source.
    #[cfg(feature = "ariadne")]
    pub fn ariadne_report<'a>(
        &self,
        file_name: &'a str,
    ) -> ariadne::Report<'static, (&'a str, std::ops::Range<usize>)> {
        let config = ariadne::Config::default().with_index_type(ariadne::IndexType::Byte);
        let labels = self.labels().into_iter().enumerate().map(|(i, label)| {
            let color = if i == 0 {
                ariadne::Color::BrightRed
            } else {
                ariadne::Color::BrightYellow
            };
            ariadne::Label::new((file_name, label.span))
                .with_message(label.text)
                .with_color(color)
        });
        let mut report =
            ariadne::Report::build(ariadne::ReportKind::Error, (file_name, self.main_span()))
                .with_config(config)
                .with_message(self.message())
                .with_labels(labels);
        report.with_notes(self.notes());
        report.finish()
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (bytes {}..{})",
            self.message(),
            self.span.start,
            self.span.end
        )
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_moves_all_positions() {
        let err = Error::new(
            3..4,
            ErrorKind::MismatchedDelimiter {
                opening: '[',
                opening_position: 1,
                closing: '}',
            },
        )
        .offset(10);
        assert_eq!(err.span, 13..14);
        let labels = err.labels();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[1].span, 11..12);
    }

    #[cfg(feature = "ariadne")]
    #[test]
    fn report_labels_follow_multibyte_text() {
        let mut lexer = crate::Lexer::new("é\\% {a");
        let err = lexer.read_to_end().unwrap_err();
        assert_eq!(err.span, 6..8);
        let mut out = Vec::new();
        err.ariadne_report("doc.tex")
            .write(("doc.tex", ariadne::Source::from(lexer.buffer())), &mut out)
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("continues to the end of the input"), "{out}");
    }

    #[test]
    fn display_includes_span() {
        let err = Error::at(5, ErrorKind::EmptyPlaceholder);
        assert_eq!(
            format!("{err}"),
            "A `#` is not followed by a parameter number (bytes 5..6)"
        );
    }
}
