//! The incremental lexer.
//!
//! A [Lexer] owns an escaped buffer and a cursor into it.
//! Tokens are produced on demand, one at a time, starting at the cursor.
//! The buffer may be edited at any time with [Lexer::insert] and [Lexer::remove];
//!     the cursor and the attached [LexerCache] are adjusted so that lexing can continue
//!     without re-scanning the document.
//!
//! Nested regions (command arguments, groups, math bodies and so on) are lexed by a
//!     transient lexer over a copy of the region.
//! These lexers never use a cache.
//! Regions may be nested at most [MAX_NESTING_DEPTH] levels deep.

mod args;
mod scan;
mod section;

use crate::cache::{LexerCache, NoCache};
use crate::error::{Error, ErrorKind};
use crate::escape;
use crate::token::Token;
use std::borrow::Cow;

/// Maximum number of nested groups, arguments and math regions.
///
/// Deeper input is rejected with [ErrorKind::NestingTooDeep].
pub const MAX_NESTING_DEPTH: usize = 128;

/// Position of a lexer's buffer in the document tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Scope {
    /// Number of enclosing regions.
    depth: usize,
    /// Whether the buffer is inside a math region.
    math: bool,
}

impl Scope {
    fn nested(self) -> Scope {
        Scope {
            depth: self.depth + 1,
            ..self
        }
    }

    fn nested_math(self) -> Scope {
        Scope {
            math: true,
            ..self.nested()
        }
    }
}

/// Incremental lexer for LaTeX documents.
#[derive(Debug, Clone)]
pub struct Lexer<C: LexerCache = NoCache> {
    buffer: String,
    cursor: usize,
    cache: C,
    scope: Scope,
}

impl Lexer<NoCache> {
    /// Create a new lexer for the provided source code, without a cache.
    pub fn new(source: &str) -> Lexer<NoCache> {
        Lexer::with_cache(source, NoCache)
    }

    /// Create a lexer over a nested region that is already escaped.
    fn from_escaped(buffer: String, scope: Scope) -> Lexer<NoCache> {
        Lexer {
            buffer,
            cursor: 0,
            cache: NoCache,
            scope,
        }
    }
}

impl<C: LexerCache> Lexer<C> {
    /// Create a new lexer for the provided source code, backed by the provided cache.
    ///
    /// The cache is assumed to describe the escaped form of `source`.
    pub fn with_cache(source: &str, cache: C) -> Lexer<C> {
        Lexer {
            buffer: escape::escape(source),
            cursor: 0,
            cache,
            scope: Scope::default(),
        }
    }

    /// The escaped buffer.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// The current document, in its original unescaped form.
    pub fn source(&self) -> Cow<'_, str> {
        escape::deescape(&self.buffer)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length of the escaped buffer in bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Returns the token at the cursor without advancing, or `None` at the end of the buffer.
    pub fn peek(&mut self) -> Result<Option<Token>, Error> {
        self.peek_ahead(0)
    }

    /// Returns the token starting `lookahead` bytes after the cursor, without advancing.
    ///
    /// The lookahead is in buffer bytes, not tokens.
    pub fn peek_ahead(&mut self, lookahead: usize) -> Result<Option<Token>, Error> {
        let position = floor_char_boundary(
            &self.buffer,
            self.cursor.saturating_add(lookahead).min(self.buffer.len()),
        );
        if let Some(token) = self.cache.get(position) {
            return Ok(Some(token.clone()));
        }
        let token = scan::lex_token(&self.buffer, position, self.scope)?;
        if let Some(token) = &token {
            self.cache.add(position, token.clone());
        }
        Ok(token)
    }

    /// Returns the token at the cursor and advances past it.
    ///
    /// On error the cursor does not move.
    pub fn next_token(&mut self) -> Result<Option<Token>, Error> {
        let token = self.peek()?;
        if let Some(token) = &token {
            self.cursor += token.span_len();
        }
        Ok(token)
    }

    /// Iterate over the tokens from the cursor to the end of the buffer.
    pub fn tokens(&mut self) -> Tokens<'_, C> {
        Tokens {
            lexer: self,
            failed: false,
        }
    }

    /// Lex the whole document from the start.
    pub fn read_to_end(&mut self) -> Result<Vec<Token>, Error> {
        self.seek(0);
        self.tokens().collect()
    }

    /// Move the cursor.
    ///
    /// Positions past the end of the buffer are clamped to the end.
    /// A negative position is an offset from the end, clamped to the start.
    pub fn seek(&mut self, position: isize) -> &mut Self {
        self.cursor = self.normalize(position);
        tracing::trace!(position, cursor = self.cursor, "seek");
        self
    }

    /// Insert source code at the provided position.
    ///
    /// The position is normalized as in [Lexer::seek].
    /// The text is escaped before insertion.
    /// If the cursor is at or after the insertion point it moves forward with the text
    ///     that follows it.
    pub fn insert(&mut self, position: isize, text: &str) -> &mut Self {
        let p = self.normalize(position);
        let escaped = escape::escape(text);
        if escaped.is_empty() {
            return self;
        }
        self.buffer.insert_str(p, &escaped);
        if self.cursor >= p {
            self.cursor += escaped.len();
        }
        self.cache.invalidate(p);
        self.cache.shift(p, escaped.len());
        tracing::debug!(
            position = p,
            len = escaped.len(),
            cursor = self.cursor,
            "inserted text"
        );
        self
    }

    /// Remove the range of the buffer between the provided positions.
    ///
    /// Both positions are normalized as in [Lexer::seek] and swapped if out of order.
    /// A cursor after the range moves back by the length of the range;
    ///     a cursor inside the range moves to its start.
    pub fn remove(&mut self, start: isize, end: isize) -> &mut Self {
        let (start, end) = {
            let a = self.normalize(start);
            let b = self.normalize(end);
            if a <= b {
                (a, b)
            } else {
                (b, a)
            }
        };
        if start == end {
            return self;
        }
        self.buffer.replace_range(start..end, "");
        let len = end - start;
        if self.cursor >= end {
            self.cursor -= len;
        } else if self.cursor > start {
            self.cursor = start;
        }
        self.cache.invalidate(start);
        self.cache.remove(start, end);
        tracing::debug!(start, end, cursor = self.cursor, "removed text");
        self
    }

    fn normalize(&self, position: isize) -> usize {
        let len = self.buffer.len();
        let p = if position < 0 {
            len.saturating_sub(position.unsigned_abs())
        } else {
            position.unsigned_abs().min(len)
        };
        floor_char_boundary(&self.buffer, p)
    }
}

/// Largest char boundary of `s` that is at most `p`.
fn floor_char_boundary(s: &str, mut p: usize) -> usize {
    while !s.is_char_boundary(p) {
        p -= 1;
    }
    p
}

/// Lex a nested region of a buffer.
///
/// The region is lexed in isolation; errors are rebased by `offset`, the region's position
///     in the enclosing buffer.
/// `scope` is the scope of the region itself.
fn lex_nested(inner: &str, offset: usize, scope: Scope) -> Result<Vec<Token>, Error> {
    if scope.depth > MAX_NESTING_DEPTH {
        return Err(Error::new(
            offset..offset + inner.len(),
            ErrorKind::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
            },
        ));
    }
    Lexer::from_escaped(inner.to_string(), scope)
        .read_to_end()
        .map_err(|err| err.offset(offset))
}

/// Iterator over the tokens of a [Lexer], returned by [Lexer::tokens].
///
/// The iterator ends after the first error.
pub struct Tokens<'a, C: LexerCache = NoCache> {
    lexer: &'a mut Lexer<C>,
    failed: bool,
}

impl<C: LexerCache> Iterator for Tokens<'_, C> {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.lexer.next_token() {
            Ok(token) => token.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

impl<C: LexerCache> std::iter::FusedIterator for Tokens<'_, C> {}
