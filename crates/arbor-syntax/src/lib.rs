//! `arbor-syntax` - Incremental parsing engine and persistent concrete
//! syntax tree for live-edited documents.
//!
//! A [`Document`] owns a mutable text source and keeps a syntax tree
//! synchronized with it: after recording the edits applied to the text,
//! a reparse costs time proportional to the size of the change, not the
//! size of the document. Untouched subtrees of the previous revision are
//! shared by reference into the new one.
//!
//! The grammar arrives as an opaque, immutable [`Language`] artifact (a
//! symbol table, a lexer automaton, and an LR parse table) produced by an
//! external compiler; text arrives through the pull-based [`Input`] trait.
//! Malformed source never fails a parse: unmatched spans become `ERROR`
//! nodes and the engine always returns a tree.
//!
//! # Example
//!
//! ```no_run
//! use arbor_syntax::{Document, InputEdit};
//! # fn language() -> std::sync::Arc<arbor_syntax::Language> { unimplemented!() }
//!
//! let mut doc = Document::new();
//! doc.set_language(language());
//! doc.set_input_text("a + b * c");
//! doc.parse()?;
//!
//! // Replace "*" with "+" and reparse incrementally.
//! doc.set_input_text("a + b + c");
//! doc.edit(InputEdit { position: 6, chars_removed: 1, chars_inserted: 1 });
//! doc.parse()?;
//!
//! let root = doc.root().unwrap();
//! println!("{}", root.to_sexp());
//! # Ok::<(), arbor_syntax::ParseError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod debug;
pub mod document;
pub mod edit;
pub mod error;
pub mod input;
pub mod language;
mod lexer;
pub mod node;
mod parser;
pub mod text;
pub mod tree;

pub use debug::{DebugKind, Debugger};
pub use document::Document;
pub use edit::InputEdit;
pub use error::{InputError, LanguageError, ParseError};
pub use input::{Input, StringInput};
pub use language::{
    Action, CharSet, Language, LexState, LexTable, ParseState, ParseTable, Symbol, SymbolInfo,
};
pub use node::Node;
pub use text::Point;
pub use tree::Tree;
