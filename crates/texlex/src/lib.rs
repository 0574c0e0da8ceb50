//! # Texlex: an incremental lexer for LaTeX documents.
//!
//! This crate turns LaTeX source code into a stream of structured tokens:
//!     commands with their arguments, math regions, groups, accents, scripts, comments
//!     and plain text.
//! Every token records the exact text it was produced from, so the document can be
//!     reconstructed from the tokens byte for byte.
//!
//! The lexer supports editor-style use.
//! Text may be inserted into and removed from the document while it is being lexed;
//!     the lexer's cursor and its optional token cache are kept consistent with the edit.
//!
//! ```
//! use texlex::Lexer;
//!
//! let mut lexer = Lexer::new(r"\documentclass[12pt]{article}");
//! let tokens = lexer.read_to_end().unwrap();
//! assert_eq!(tokens[0].command_name(), Some("documentclass"));
//!
//! lexer.remove(1, 9);
//! let tokens = lexer.read_to_end().unwrap();
//! assert_eq!(tokens[0].command_name(), Some("class"));
//! ```
//!
//! Escaped special characters like `\%` are replaced by sentinel characters before lexing;
//!     see the [escape] module.
//! Offsets used by the lexer API are byte offsets into this escaped buffer.

pub mod cache;
mod error;
pub mod escape;
mod lexer;
pub mod token;

pub use cache::{LexerCache, NoCache, SimpleCache};
pub use error::{Error, ErrorKind, ErrorLabel};
pub use lexer::{Lexer, Tokens, MAX_NESTING_DEPTH};
pub use token::Token;
