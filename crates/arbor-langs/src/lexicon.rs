//! Lexicon compiler: token declarations to a lexer automaton.
//!
//! A lexicon is declared as literal strings (operators, punctuation) and
//! one-or-more character classes (identifiers, numbers), plus a skip set
//! for inter-token whitespace. [`LexiconBuilder::build`] compiles the
//! declarations into the deterministic maximal-munch [`LexTable`] the
//! engine runs. Literals are trie-merged, so shared prefixes (`=` and
//! `==`) coexist and the longer match wins; a literal or class whose
//! first character another token class already claims is rejected rather
//! than silently shadowed.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;

use arbor_syntax::{CharSet, LexState, LexTable, Symbol};

/// Errors detected while compiling a lexicon.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexiconError {
    /// A token's first character is already claimed by a character-class
    /// token; the automaton could not decide which one to lex.
    #[error("token id {second} starts with characters already claimed by token id {first}")]
    Overlap {
        /// The previously declared token.
        first: u16,
        /// The conflicting token.
        second: u16,
    },

    /// Two literals spell the same text.
    #[error("token ids {first} and {second} match the same text")]
    Duplicate {
        /// The previously declared token.
        first: u16,
        /// The conflicting token.
        second: u16,
    },

    /// A literal token with no characters.
    #[error("token id {0} has an empty literal")]
    EmptyLiteral(u16),

    /// A class token with no characters.
    #[error("token id {0} has an empty character class")]
    EmptyClass(u16),

    /// The skip set contains a character that also starts a token.
    #[error("skip set overlaps the start of token id {0}")]
    SkipOverlap(u16),
}

/// Declarative builder for a [`LexTable`].
#[derive(Debug, Clone, Default)]
pub struct LexiconBuilder {
    skip: CharSet,
    literals: Vec<(Symbol, SmolStr)>,
    classes: Vec<(Symbol, CharSet)>,
}

impl LexiconBuilder {
    /// An empty lexicon.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds characters skipped between tokens.
    pub fn skip(&mut self, set: &CharSet) -> &mut Self {
        self.skip.insert_set(set);
        self
    }

    /// Declares a token matching exactly `text`.
    pub fn literal(&mut self, symbol: Symbol, text: &str) -> &mut Self {
        self.literals.push((symbol, text.into()));
        self
    }

    /// Declares a token matching one or more characters of `set`.
    pub fn class_plus(&mut self, symbol: Symbol, set: CharSet) -> &mut Self {
        self.classes.push((symbol, set));
        self
    }

    /// Compiles the declarations into a lexer automaton.
    pub fn build(&self) -> Result<LexTable, LexiconError> {
        let mut states = vec![LexState::default()];

        for (symbol, set) in &self.classes {
            if set.is_empty() {
                return Err(LexiconError::EmptyClass(symbol.0));
            }
            for (claimed, target) in &states[0].transitions {
                if claimed.intersects(set) {
                    let first = states[*target as usize]
                        .accept
                        .map_or(0, |s| s.0);
                    return Err(LexiconError::Overlap {
                        first,
                        second: symbol.0,
                    });
                }
            }
            let target = u32::try_from(states.len()).unwrap_or(u32::MAX);
            states.push(LexState {
                accept: Some(*symbol),
                transitions: vec![(set.clone(), target)],
            });
            states[0].transitions.push((set.clone(), target));
        }

        let mut trie: FxHashMap<(u32, char), u32> = FxHashMap::default();
        for (symbol, text) in &self.literals {
            if text.is_empty() {
                return Err(LexiconError::EmptyLiteral(symbol.0));
            }
            let mut state = 0u32;
            for c in text.chars() {
                if state == 0 {
                    if let Some((class_sym, _)) =
                        self.classes.iter().find(|(_, set)| set.contains(c))
                    {
                        return Err(LexiconError::Overlap {
                            first: class_sym.0,
                            second: symbol.0,
                        });
                    }
                }
                state = match trie.get(&(state, c)) {
                    Some(&next) => next,
                    None => {
                        let next = u32::try_from(states.len()).unwrap_or(u32::MAX);
                        states.push(LexState::default());
                        states[state as usize]
                            .transitions
                            .push((CharSet::of(c), next));
                        trie.insert((state, c), next);
                        next
                    }
                };
            }
            let accept = &mut states[state as usize].accept;
            if let Some(previous) = accept {
                return Err(LexiconError::Duplicate {
                    first: previous.0,
                    second: symbol.0,
                });
            }
            *accept = Some(*symbol);
        }

        for (set, target) in &states[0].transitions {
            if set.intersects(&self.skip) {
                let claimed = states[*target as usize].accept.map_or(0, |s| s.0);
                return Err(LexiconError::SkipOverlap(claimed));
            }
        }

        Ok(LexTable {
            states,
            skip: self.skip.clone(),
        })
    }
}
