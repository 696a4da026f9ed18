//! Error types for the parsing engine.

use thiserror::Error;

/// Errors raised by an [`Input`](crate::input::Input) adapter.
///
/// Input errors abort the parse in progress; the document's previous tree
/// revision is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// The adapter could not reposition to the requested coordinates.
    #[error("input seek to character {chars} (byte {bytes}) failed")]
    Seek {
        /// Requested character offset.
        chars: usize,
        /// Requested byte offset.
        bytes: usize,
    },

    /// The adapter failed to produce the next chunk of text.
    #[error("input read failed: {0}")]
    Read(String),
}

/// Errors detected while assembling a [`Language`](crate::language::Language)
/// from its tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LanguageError {
    /// The symbol table is missing the reserved error/end/start entries.
    #[error("symbol table must contain the {0} reserved symbols")]
    MissingReservedSymbols(usize),

    /// A table refers to a symbol id outside the symbol table.
    #[error("table refers to unknown symbol id {0}")]
    UnknownSymbol(u16),

    /// A lexer transition targets a state outside the table.
    #[error("lex state {state} transition targets unknown state {target}")]
    UnknownLexState {
        /// State holding the bad transition.
        state: u32,
        /// The out-of-range target.
        target: u32,
    },

    /// A parser action targets a state outside the table.
    #[error("parse state {state} refers to unknown state {target}")]
    UnknownParseState {
        /// State holding the bad action or goto.
        state: u32,
        /// The out-of-range target.
        target: u32,
    },

    /// A reduction claims zero children; productions must consume input.
    #[error("empty production for symbol id {0}")]
    EmptyProduction(u16),

    /// The designated start symbol is reserved or is a terminal.
    #[error("invalid start symbol id {0}")]
    InvalidStartSymbol(u16),
}

/// Errors surfaced by [`Document::parse`](crate::document::Document::parse).
///
/// Malformed source text is never an error: it is absorbed into the tree as
/// `ERROR` nodes. Only missing collaborators, adapter failures, and corrupt
/// grammar artifacts surface here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No language has been assigned to the document.
    #[error("document has no language")]
    MissingLanguage,

    /// No input source has been assigned to the document.
    #[error("document has no input")]
    MissingInput,

    /// The input adapter failed; the previous tree revision is untouched.
    #[error(transparent)]
    Input(#[from] InputError),

    /// The language's parse table is internally inconsistent (a transition
    /// required by the automaton is absent). Validation at construction
    /// rejects most of these; this is the fail-fast for the remainder.
    #[error("parse table has no transition from state {state} on symbol id {symbol}")]
    Table {
        /// State the automaton was in.
        state: u32,
        /// Symbol id with no action or goto.
        symbol: u16,
    },
}
