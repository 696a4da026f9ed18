//! Table-driven lexer over a pull-based input source.
//!
//! The lexer runs the language's maximal-munch DFA against characters
//! pulled lazily from an [`Input`] adapter. It records, for every token,
//! how many characters it examined beyond the accepted end; that window is
//! what the incremental engine consults to decide whether an edit can
//! affect the token. The lexer can be repositioned to any previously
//! computed absolute position, which is how parsing resumes after a reused
//! subtree.

use std::collections::VecDeque;

use crate::error::InputError;
use crate::input::Input;
use crate::language::{LexTable, Symbol};
use crate::text::Extent;

/// One lexing step: a token, or end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scanned {
    /// A token with its leading skipped text and content extent.
    Token {
        symbol: Symbol,
        padding: Extent,
        size: Extent,
        /// Characters examined past the token's end, at least one (the
        /// character, or end of input, that terminated the munch).
        lookahead_chars: usize,
    },
    /// End of input, preceded by any trailing skipped text.
    End { padding: Extent },
}

/// A character cursor over an [`Input`] adapter.
pub(crate) struct Lexer<'a> {
    input: &'a mut dyn Input,
    /// Characters pulled from the input but not yet consumed.
    pending: VecDeque<char>,
    /// Absolute position of the next unconsumed character.
    pos: Extent,
    exhausted: bool,
}

impl<'a> Lexer<'a> {
    /// Positions the input at the start of the document.
    pub(crate) fn new(input: &'a mut dyn Input) -> Result<Self, InputError> {
        input.seek(0, 0)?;
        Ok(Self {
            input,
            pending: VecDeque::new(),
            pos: Extent::ZERO,
            exhausted: false,
        })
    }

    /// The position the next token's padding will start at.
    pub(crate) fn position(&self) -> Extent {
        self.pos
    }

    /// Repositions the lexer. A no-op when already there; otherwise any
    /// buffered text is discarded and the input adapter is asked to seek.
    pub(crate) fn seek_to(&mut self, target: Extent) -> Result<(), InputError> {
        if target == self.pos && self.pending.is_empty() {
            return Ok(());
        }
        self.input.seek(target.chars, target.bytes)?;
        self.pending.clear();
        self.exhausted = false;
        self.pos = target;
        Ok(())
    }

    /// The character `i` places ahead of the cursor, if the document is
    /// that long.
    fn peek(&mut self, i: usize) -> Result<Option<char>, InputError> {
        while self.pending.len() <= i && !self.exhausted {
            let chunk = self.input.read()?;
            if chunk.is_empty() {
                self.exhausted = true;
            } else {
                self.pending.extend(chunk.chars());
            }
        }
        Ok(self.pending.get(i).copied())
    }

    /// Consumes `count` characters, advancing the position.
    fn bump(&mut self, count: usize) {
        for _ in 0..count {
            if let Some(c) = self.pending.pop_front() {
                self.pos += Extent::of_char(c);
            }
        }
    }

    /// Scans the next token with maximal munch. Characters in the table's
    /// skip set are consumed as padding first. A character the DFA cannot
    /// start from becomes a one-character `ERROR` token, so lexing never
    /// fails on malformed text.
    pub(crate) fn next_token(&mut self, table: &LexTable) -> Result<Scanned, InputError> {
        let mut padding = Extent::ZERO;
        while let Some(c) = self.peek(0)? {
            if !table.skip.contains(c) {
                break;
            }
            padding += Extent::of_char(c);
            self.bump(1);
        }

        if self.peek(0)?.is_none() {
            return Ok(Scanned::End { padding });
        }

        let mut state = 0usize;
        let mut consumed = 0usize;
        let mut size = Extent::ZERO;
        // Furthest character index inspected; the position one past the
        // last token character counts even at end of input, so that an
        // append there invalidates the token.
        let mut examined = 0usize;
        let mut accepted: Option<(Symbol, usize, Extent)> = None;
        loop {
            examined = consumed + 1;
            let Some(c) = self.peek(consumed)? else { break };
            let Some(next) = table
                .states
                .get(state)
                .and_then(|s| s.transition(c))
            else {
                break;
            };
            state = next as usize;
            consumed += 1;
            size += Extent::of_char(c);
            if let Some(symbol) = table.states.get(state).and_then(|s| s.accept) {
                accepted = Some((symbol, consumed, size));
            }
        }

        let (symbol, len, size) = accepted.unwrap_or_else(|| {
            // No accepting prefix: emit the offending character itself.
            let c = self.pending.front().copied();
            let size = c.map_or(Extent::ZERO, Extent::of_char);
            (Symbol::ERROR, 1, size)
        });
        self.bump(len);
        let lookahead_chars = examined.saturating_sub(len).max(1);
        Ok(Scanned::Token {
            symbol,
            padding,
            size,
            lookahead_chars,
        })
    }
}
