//! `arbor-langs` - Grammar artifacts for the arbor parsing engine.
//!
//! The engine consumes grammars as opaque [`arbor_syntax::Language`]
//! values; this crate is the external compiler that produces them. The
//! [`GrammarBuilder`] turns productions into SLR(1) parse tables, the
//! [`LexiconBuilder`] turns token declarations into a lexer automaton,
//! and the [`arithmetic`] and [`statements`] modules assemble two small
//! fixture languages used by the integration suites.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod arithmetic;
pub mod grammar;
pub mod lexicon;
pub mod statements;

pub use arithmetic::{arithmetic, Arithmetic};
pub use grammar::{GrammarBuilder, GrammarError};
pub use lexicon::{LexiconBuilder, LexiconError};
pub use statements::{statements, Statements};

use thiserror::Error;

/// Errors from assembling a complete language artifact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LanguageBuildError {
    /// The grammar did not compile.
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// The lexicon did not compile.
    #[error(transparent)]
    Lexicon(#[from] LexiconError),

    /// The assembled tables failed the engine's validation.
    #[error(transparent)]
    Language(#[from] arbor_syntax::LanguageError),
}
