//! The parse engine.
//!
//! Full and incremental parsing share one LR driver. A full parse lexes
//! the whole input and runs shift/reduce to completion. An incremental
//! parse additionally consults the previous revision through
//! [`reuse::ReuseSource`]: wherever the old tree has an untouched node
//! starting exactly at the current position, that node is taken wholesale
//! instead of being re-lexed and re-parsed, so the cost of a reparse
//! tracks the edited region rather than the document.
//!
//! Malformed input never fails the parse. Tokens with no available action
//! are collected into `ERROR` nodes until a token the current state can
//! act on reappears, and an unfinishable suffix at end of input is wrapped
//! the same way, so every parse ends in a tree.

mod reuse;
mod stack;

use std::sync::Arc;

use crate::debug::{debug_event, DebugKind, Debugger};
use crate::edit::ChangeSet;
use crate::error::{InputError, ParseError};
use crate::input::Input;
use crate::language::{Action, Language, Symbol};
use crate::lexer::{Lexer, Scanned};
use crate::text::Extent;
use crate::tree::{GreenNode, Tree};

use reuse::{Candidate, ReuseSource};
use stack::Stack;

/// Produces the next tree revision.
///
/// With a previous revision and a non-empty change set this is an
/// incremental reparse; with neither it is a full parse. An empty change
/// set over an existing revision short-circuits: the old root is reused
/// wholesale under the new generation without touching the input.
pub(crate) fn parse(
    language: &Arc<Language>,
    input: &mut dyn Input,
    changes: &ChangeSet,
    previous: Option<&Tree>,
    debugger: &mut Option<Box<dyn Debugger>>,
) -> Result<Tree, ParseError> {
    let generation = previous.map_or(0, |tree| tree.generation + 1);
    if let Some(prev) = previous {
        if changes.is_empty() {
            debug_event!(debugger, DebugKind::Parse, "previous tree reused unchanged");
            return Ok(Tree {
                root: Arc::clone(&prev.root),
                language: Arc::clone(language),
                generation,
                total: prev.total,
            });
        }
    }

    let lexer = Lexer::new(input)?;
    let reuse = previous.map(|tree| ReuseSource::new(&tree.root, tree.total.chars, changes));
    Driver {
        language,
        changes,
        reuse,
        lexer,
        debugger,
        generation,
        stack: Stack::default(),
        pos: Extent::ZERO,
    }
    .run()
}

/// The pending lookahead: a token, a whole reused subtree, or end of
/// input.
enum Lookahead<'a> {
    Token(Arc<GreenNode>),
    Subtree(Candidate<'a>),
    End { padding: Extent },
}

struct Driver<'s> {
    language: &'s Arc<Language>,
    changes: &'s ChangeSet,
    reuse: Option<ReuseSource<'s>>,
    lexer: Lexer<'s>,
    debugger: &'s mut Option<Box<dyn Debugger>>,
    generation: u64,
    stack: Stack,
    /// Absolute position in the new document where the next padding
    /// starts.
    pos: Extent,
}

impl<'s> Driver<'s> {
    fn run(mut self) -> Result<Tree, ParseError> {
        let mut la = self.next_lookahead(false)?;
        let end_padding = loop {
            let state = self.stack.state();
            la = match la {
                Lookahead::Subtree(candidate) => {
                    let symbol = candidate.green.symbol;
                    let kind = self.name(symbol);
                    if candidate.green.entry_state == state {
                        if let Some(next) = self.language.goto(state, symbol) {
                            debug_event!(
                                self.debugger,
                                DebugKind::Parse,
                                "reuse {} {}..{} -> state {}",
                                kind,
                                self.pos.chars,
                                self.pos.chars + candidate.green.padded().chars,
                                next
                            );
                            self.pos += candidate.green.padded();
                            self.stack.push(next, vec![Arc::clone(candidate.green)]);
                            self.next_lookahead(false)?
                        } else {
                            self.step_down(candidate)?
                        }
                    } else {
                        // The subtree cannot attach yet; its first token
                        // decides whether pending reductions bring the
                        // automaton to the subtree's entry state.
                        match self.language.action(state, candidate.leading_token_symbol()) {
                            Some(Action::Reduce { symbol, count }) => {
                                self.reduce(symbol, count)?;
                                Lookahead::Subtree(candidate)
                            }
                            _ => self.step_down(candidate)?,
                        }
                    }
                }
                Lookahead::Token(token) => match self.language.action(state, token.symbol) {
                    Some(Action::Shift(next)) => {
                        let kind = self.name(token.symbol);
                        debug_event!(
                            self.debugger,
                            DebugKind::Parse,
                            "shift {} -> state {}",
                            kind,
                            next
                        );
                        self.pos += token.padded();
                        self.stack.push(next, vec![token]);
                        self.next_lookahead(false)?
                    }
                    Some(Action::Reduce { symbol, count }) => {
                        self.reduce(symbol, count)?;
                        Lookahead::Token(token)
                    }
                    Some(Action::Accept) | None => self.recover(token)?,
                },
                Lookahead::End { padding } => match self.language.action(state, Symbol::END) {
                    Some(Action::Reduce { symbol, count }) => {
                        self.reduce(symbol, count)?;
                        Lookahead::End { padding }
                    }
                    Some(Action::Accept) => {
                        debug_event!(self.debugger, DebugKind::Parse, "accept");
                        break padding;
                    }
                    Some(Action::Shift(_)) | None => {
                        if self.recover_at_end() {
                            Lookahead::End { padding }
                        } else {
                            break padding;
                        }
                    }
                },
            };
        };

        let children = self.stack.into_greens();
        let root = GreenNode::root(children, self.generation);
        let total = root.padded() + end_padding;
        Ok(Tree {
            root,
            language: Arc::clone(self.language),
            generation: self.generation,
            total,
        })
    }

    fn name(&self, symbol: Symbol) -> &'s str {
        self.language.symbol_name(symbol).unwrap_or("?")
    }

    /// Performs one reduction, splicing hidden symbols through without a
    /// node.
    fn reduce(&mut self, symbol: Symbol, count: u16) -> Result<(), ParseError> {
        let state = self.stack.state();
        let popped = self.stack.pop_for_reduce(count).ok_or(ParseError::Table {
            state,
            symbol: symbol.0,
        })?;
        let next = self
            .language
            .goto(popped.exposed_state, symbol)
            .ok_or(ParseError::Table {
                state: popped.exposed_state,
                symbol: symbol.0,
            })?;
        let info = self.language.info(symbol);
        debug_event!(
            self.debugger,
            DebugKind::Parse,
            "reduce {} x{} -> state {}",
            info.name,
            count,
            next
        );
        if info.hidden {
            self.stack.push(next, popped.children);
        } else {
            let node = GreenNode::interior(
                symbol,
                info.named,
                popped.children,
                popped.exposed_state,
                self.generation,
            );
            self.stack.push(next, vec![node]);
        }
        self.stack.restore_trailing(popped.trailing);
        Ok(())
    }

    /// Replaces a subtree lookahead that cannot attach with its first
    /// child, or with a fresh token at the innermost level.
    fn step_down(&mut self, candidate: Candidate<'s>) -> Result<Lookahead<'s>, InputError> {
        match candidate.break_down() {
            Some(inner) => self.resolve(inner, false),
            None => self.fresh(),
        }
    }

    /// The next lookahead at `self.pos`: a reused old node when the
    /// position maps cleanly into the previous revision, a fresh token
    /// otherwise. `tokens_only` suppresses subtree reuse during error
    /// recovery, where resynchronization is decided token by token.
    fn next_lookahead(&mut self, tokens_only: bool) -> Result<Lookahead<'s>, InputError> {
        let candidate = match &self.reuse {
            Some(source) => self
                .changes
                .map_new_to_old(self.pos.chars)
                .and_then(|old_pos| source.candidate_at(old_pos)),
            None => None,
        };
        match candidate {
            Some(candidate) => self.resolve(candidate, tokens_only),
            None => self.fresh(),
        }
    }

    /// Walks a candidate down to the largest reusable piece, falling back
    /// to fresh lexing when even the leading token is touched.
    fn resolve(
        &mut self,
        candidate: Candidate<'s>,
        tokens_only: bool,
    ) -> Result<Lookahead<'s>, InputError> {
        let mut candidate = Some(candidate);
        while let Some(current) = candidate {
            let Some(source) = &self.reuse else { break };
            if current.green.is_token() {
                if source.token_reusable(&current) {
                    let kind = self.name(current.green.symbol);
                    debug_event!(
                        self.debugger,
                        DebugKind::Parse,
                        "reuse token {} at {}",
                        kind,
                        self.pos.chars
                    );
                    return Ok(Lookahead::Token(Arc::clone(current.green)));
                }
                break;
            }
            if !tokens_only && source.subtree_clean(&current) {
                return Ok(Lookahead::Subtree(current));
            }
            candidate = current.break_down();
        }
        self.fresh()
    }

    /// Lexes one token from the input, seeking there first if the lexer
    /// is positioned elsewhere (after a reused subtree).
    fn fresh(&mut self) -> Result<Lookahead<'s>, InputError> {
        self.lexer.seek_to(self.pos)?;
        match self.lexer.next_token(self.language.lex_table())? {
            Scanned::Token {
                symbol,
                padding,
                size,
                lookahead_chars,
            } => {
                let start = self.pos.chars + padding.chars;
                let kind = self.name(symbol);
                debug_event!(
                    self.debugger,
                    DebugKind::Lex,
                    "token {} {}..{} lookahead {}",
                    kind,
                    start,
                    start + size.chars,
                    lookahead_chars
                );
                let named = self.language.info(symbol).named;
                Ok(Lookahead::Token(GreenNode::token(
                    symbol,
                    named,
                    padding,
                    size,
                    lookahead_chars,
                    self.generation,
                )))
            }
            Scanned::End { padding } => {
                debug_event!(
                    self.debugger,
                    DebugKind::Lex,
                    "end of input at {}",
                    self.pos.chars + padding.chars
                );
                Ok(Lookahead::End { padding })
            }
        }
    }

    /// Panic-mode recovery: collects `first` and every following token the
    /// current state has no action for into one `ERROR` node, pushed as an
    /// extra slot, then resumes with the token that resynchronized.
    fn recover(&mut self, first: Arc<GreenNode>) -> Result<Lookahead<'s>, ParseError> {
        let state = self.stack.state();
        debug_event!(
            self.debugger,
            DebugKind::Parse,
            "error recovery start at {} (state {})",
            self.pos.chars + first.padding.chars,
            state
        );
        self.pos += first.padded();
        let mut skipped = vec![first];
        let la = loop {
            let la = self.next_lookahead(true)?;
            match la {
                Lookahead::Token(token) => {
                    let action = self.language.action(state, token.symbol);
                    if action.is_some_and(|a| !matches!(a, Action::Accept)) {
                        break Lookahead::Token(token);
                    }
                    let kind = self.name(token.symbol);
                    debug_event!(self.debugger, DebugKind::Parse, "skip {kind}");
                    self.pos += token.padded();
                    skipped.push(token);
                }
                Lookahead::Subtree(_) | Lookahead::End { .. } => break la,
            }
        };
        let count = skipped.len();
        let error = GreenNode::interior(Symbol::ERROR, true, skipped, state, self.generation);
        self.stack.push_extra(error);
        debug_event!(
            self.debugger,
            DebugKind::Parse,
            "error recovery end ({count} tokens skipped)"
        );
        Ok(la)
    }

    /// Recovery at end of input: pops the unfinishable suffix of the stack
    /// into an `ERROR` node, exposing a state that can act on end of
    /// input. Returns `false` when no such state exists and the parse must
    /// finish with what it has.
    fn recover_at_end(&mut self) -> bool {
        debug_event!(
            self.debugger,
            DebugKind::Parse,
            "error recovery start at end of input"
        );
        let mut popped = Vec::new();
        let found = loop {
            if self.language.action(self.stack.state(), Symbol::END).is_some() {
                break true;
            }
            let Some(slot) = self.stack.pop() else { break false };
            popped.push(slot);
        };
        if popped.is_empty() || (!found && popped.iter().all(|slot| slot.extra)) {
            // Nothing to wrap, or only error material already wrapped once.
            self.stack.restore(popped);
            debug_event!(self.debugger, DebugKind::Parse, "error recovery end (empty)");
            return false;
        }
        let children: Vec<Arc<GreenNode>> = popped
            .into_iter()
            .rev()
            .flat_map(|slot| slot.greens)
            .collect();
        let error = GreenNode::interior(
            Symbol::ERROR,
            true,
            children,
            self.stack.state(),
            self.generation,
        );
        self.stack.push_extra(error);
        debug_event!(self.debugger, DebugKind::Parse, "error recovery end");
        found
    }
}
