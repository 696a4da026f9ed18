//! Grammar artifacts.
//!
//! A [`Language`] is an immutable bundle of a symbol table, a lexer DFA,
//! and an SLR parse table. It is produced outside this crate (see the
//! `arbor-langs` compiler) and consumed read-only by the engine; one
//! `Language` may be shared across any number of documents and threads.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::error::LanguageError;

/// A grammar symbol id.
///
/// Ids `0..=2` are reserved across all grammars: [`Symbol::ERROR`] marks
/// spans the parser could not match, [`Symbol::END`] is end of input, and
/// [`Symbol::START`] is the synthetic root every tree is wrapped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Symbol(pub u16);

impl Symbol {
    /// Span the grammar could not match.
    pub const ERROR: Symbol = Symbol(0);
    /// End of input.
    pub const END: Symbol = Symbol(1);
    /// Synthetic root symbol.
    pub const START: Symbol = Symbol(2);

    /// The number of reserved, cross-grammar symbol ids.
    pub const RESERVED: u16 = 3;

    fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// Per-symbol metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    /// Display name, resolved by node views and s-expression rendering.
    pub name: SmolStr,
    /// Whether the symbol is grammar-significant (a production or a token
    /// class such as an identifier) as opposed to a literal token.
    pub named: bool,
    /// Hidden symbols never produce tree nodes; their children splice into
    /// the enclosing node. Used for chain and precedence helper rules.
    pub hidden: bool,
}

impl SymbolInfo {
    /// A named, visible symbol.
    pub fn named(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            named: true,
            hidden: false,
        }
    }

    /// An anonymous (literal) symbol.
    pub fn anonymous(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            named: false,
            hidden: false,
        }
    }

    /// A hidden helper symbol.
    pub fn hidden(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            named: true,
            hidden: true,
        }
    }

    /// The metadata for the three reserved symbols, in id order.
    #[must_use]
    pub fn reserved() -> [SymbolInfo; 3] {
        [
            SymbolInfo::named("ERROR"),
            SymbolInfo::anonymous("END"),
            SymbolInfo::named("START"),
        ]
    }
}

/// A set of characters stored as sorted, disjoint inclusive ranges.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CharSet {
    ranges: Vec<(char, char)>,
}

impl CharSet {
    /// The empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding a single character.
    #[must_use]
    pub fn of(c: char) -> Self {
        Self::new().with_range(c, c)
    }

    /// Adds the inclusive range `lo..=hi`.
    #[must_use]
    pub fn with_range(mut self, lo: char, hi: char) -> Self {
        self.insert_range(lo, hi);
        self
    }

    /// Adds every character in `chars`.
    #[must_use]
    pub fn with_chars(mut self, chars: &str) -> Self {
        for c in chars.chars() {
            self.insert_range(c, c);
        }
        self
    }

    /// Inserts the inclusive range `lo..=hi`, merging overlaps.
    pub fn insert_range(&mut self, lo: char, hi: char) {
        debug_assert!(lo <= hi);
        self.ranges.push((lo, hi));
        self.ranges.sort_unstable();
        let mut merged: Vec<(char, char)> = Vec::with_capacity(self.ranges.len());
        for &(lo, hi) in &self.ranges {
            match merged.last_mut() {
                Some(last) if lo as u32 <= last.1 as u32 + 1 => {
                    last.1 = last.1.max(hi);
                }
                _ => merged.push((lo, hi)),
            }
        }
        self.ranges = merged;
    }

    /// Inserts every character of `other`.
    pub fn insert_set(&mut self, other: &CharSet) {
        for &(lo, hi) in &other.ranges {
            self.insert_range(lo, hi);
        }
    }

    /// Membership test.
    #[must_use]
    pub fn contains(&self, c: char) -> bool {
        self.ranges
            .binary_search_by(|&(lo, hi)| {
                if c < lo {
                    std::cmp::Ordering::Greater
                } else if c > hi {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// Whether the two sets share any character.
    #[must_use]
    pub fn intersects(&self, other: &CharSet) -> bool {
        let mut a = self.ranges.iter().peekable();
        let mut b = other.ranges.iter().peekable();
        while let (Some(&&(alo, ahi)), Some(&&(blo, bhi))) = (a.peek(), b.peek()) {
            if ahi < blo {
                a.next();
            } else if bhi < alo {
                b.next();
            } else {
                return true;
            }
        }
        false
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// One state of the lexer DFA.
#[derive(Debug, Clone, Default)]
pub struct LexState {
    /// Token to emit if the munch stops in this state.
    pub accept: Option<Symbol>,
    /// Outgoing transitions; the sets must be pairwise disjoint.
    pub transitions: Vec<(CharSet, u32)>,
}

impl LexState {
    pub(crate) fn transition(&self, c: char) -> Option<u32> {
        self.transitions
            .iter()
            .find(|(set, _)| set.contains(c))
            .map(|&(_, target)| target)
    }
}

/// The lexer DFA. State `0` is the start state; lexing is maximal-munch,
/// and characters in `skip` are consumed between tokens as padding.
#[derive(Debug, Clone, Default)]
pub struct LexTable {
    /// DFA states; entry is state `0`.
    pub states: Vec<LexState>,
    /// Characters skipped between tokens (whitespace).
    pub skip: CharSet,
}

/// A parser action, keyed by (state, lookahead terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Consume the lookahead and move to the given state.
    Shift(u32),
    /// Pop `count` symbols and produce `symbol`.
    Reduce {
        /// Symbol produced by the reduction.
        symbol: Symbol,
        /// Number of grammar symbols on the production's right-hand side.
        count: u16,
    },
    /// The start symbol is complete and end of input has been reached.
    Accept,
}

/// One LR state.
#[derive(Debug, Clone, Default)]
pub struct ParseState {
    /// Terminal-keyed actions (including [`Symbol::END`]).
    pub actions: FxHashMap<Symbol, Action>,
    /// Nonterminal-keyed successor states.
    pub gotos: FxHashMap<Symbol, u32>,
}

/// The SLR parse table. State `0` is the start state.
#[derive(Debug, Clone, Default)]
pub struct ParseTable {
    /// LR states; entry is state `0`.
    pub states: Vec<ParseState>,
    /// The grammar's start symbol (may be hidden).
    pub start_symbol: Symbol,
}

/// An immutable grammar artifact: symbol table, lexer DFA, parse table.
#[derive(Debug)]
pub struct Language {
    symbols: Vec<SymbolInfo>,
    lex: LexTable,
    parse: ParseTable,
}

impl Language {
    /// Assembles and validates a language.
    ///
    /// `symbols` must start with the three [reserved](SymbolInfo::reserved)
    /// entries; every symbol id referenced by either table must be in
    /// range, every state reference must be in range, and reductions must
    /// pop at least one symbol.
    pub fn new(
        symbols: Vec<SymbolInfo>,
        lex: LexTable,
        parse: ParseTable,
    ) -> Result<Self, LanguageError> {
        let count = symbols.len();
        if count < usize::from(Symbol::RESERVED) {
            return Err(LanguageError::MissingReservedSymbols(usize::from(
                Symbol::RESERVED,
            )));
        }
        let check_symbol = |sym: Symbol| {
            if sym.index() < count {
                Ok(())
            } else {
                Err(LanguageError::UnknownSymbol(sym.0))
            }
        };

        let lex_states = u32::try_from(lex.states.len()).unwrap_or(u32::MAX);
        for (id, state) in lex.states.iter().enumerate() {
            let id = u32::try_from(id).unwrap_or(u32::MAX);
            if let Some(sym) = state.accept {
                check_symbol(sym)?;
            }
            for &(_, target) in &state.transitions {
                if target >= lex_states {
                    return Err(LanguageError::UnknownLexState { state: id, target });
                }
            }
        }

        let parse_states = u32::try_from(parse.states.len()).unwrap_or(u32::MAX);
        for (id, state) in parse.states.iter().enumerate() {
            let id = u32::try_from(id).unwrap_or(u32::MAX);
            for (&sym, &action) in &state.actions {
                check_symbol(sym)?;
                match action {
                    Action::Shift(target) if target >= parse_states => {
                        return Err(LanguageError::UnknownParseState { state: id, target });
                    }
                    Action::Reduce { symbol, count } => {
                        check_symbol(symbol)?;
                        if count == 0 {
                            return Err(LanguageError::EmptyProduction(symbol.0));
                        }
                    }
                    _ => {}
                }
            }
            for (&sym, &target) in &state.gotos {
                check_symbol(sym)?;
                if target >= parse_states {
                    return Err(LanguageError::UnknownParseState { state: id, target });
                }
            }
        }

        let start = parse.start_symbol;
        if start.0 < Symbol::RESERVED || start.index() >= count {
            return Err(LanguageError::InvalidStartSymbol(start.0));
        }

        Ok(Self {
            symbols,
            lex,
            parse,
        })
    }

    /// Number of symbols, including the reserved ids.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// The display name for a symbol, or `None` if the id is out of range.
    #[must_use]
    pub fn symbol_name(&self, symbol: Symbol) -> Option<&str> {
        self.symbols.get(symbol.index()).map(|info| info.name.as_str())
    }

    /// Whether a symbol is grammar-significant; out-of-range ids are not.
    #[must_use]
    pub fn symbol_is_named(&self, symbol: Symbol) -> bool {
        self.symbols
            .get(symbol.index())
            .is_some_and(|info| info.named)
    }

    pub(crate) fn info(&self, symbol: Symbol) -> &SymbolInfo {
        &self.symbols[symbol.index()]
    }

    pub(crate) fn lex_table(&self) -> &LexTable {
        &self.lex
    }

    pub(crate) fn start_symbol(&self) -> Symbol {
        self.parse.start_symbol
    }

    pub(crate) fn action(&self, state: u32, lookahead: Symbol) -> Option<Action> {
        self.parse
            .states
            .get(state as usize)
            .and_then(|s| s.actions.get(&lookahead))
            .copied()
    }

    pub(crate) fn goto(&self, state: u32, symbol: Symbol) -> Option<u32> {
        self.parse
            .states
            .get(state as usize)
            .and_then(|s| s.gotos.get(&symbol))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_membership_and_merging() {
        let set = CharSet::new()
            .with_range('a', 'f')
            .with_range('d', 'k')
            .with_chars("xz");
        assert!(set.contains('a'));
        assert!(set.contains('k'));
        assert!(set.contains('x'));
        assert!(!set.contains('y'));
        assert!(!set.contains('m'));
    }

    #[test]
    fn charset_intersection() {
        let letters = CharSet::new().with_range('a', 'z');
        let digits = CharSet::new().with_range('0', '9');
        let hex = CharSet::new().with_range('0', '9').with_range('a', 'f');
        assert!(!letters.intersects(&digits));
        assert!(letters.intersects(&hex));
        assert!(digits.intersects(&hex));
    }

    fn minimal_symbols() -> Vec<SymbolInfo> {
        let mut symbols = SymbolInfo::reserved().to_vec();
        symbols.push(SymbolInfo::named("word"));
        symbols.push(SymbolInfo::named("phrase"));
        symbols
    }

    #[test]
    fn validates_reserved_symbols_present() {
        let err = Language::new(vec![SymbolInfo::named("ERROR")], LexTable::default(), {
            let mut parse = ParseTable::default();
            parse.start_symbol = Symbol(3);
            parse
        })
        .unwrap_err();
        assert_eq!(err, LanguageError::MissingReservedSymbols(3));
    }

    #[test]
    fn validates_start_symbol() {
        let mut parse = ParseTable::default();
        parse.start_symbol = Symbol::ERROR;
        let err = Language::new(minimal_symbols(), LexTable::default(), parse).unwrap_err();
        assert_eq!(err, LanguageError::InvalidStartSymbol(0));
    }

    #[test]
    fn validates_table_references() {
        let mut state = ParseState::default();
        state.actions.insert(Symbol(9), Action::Shift(0));
        let mut parse = ParseTable::default();
        parse.states.push(state);
        parse.start_symbol = Symbol(4);
        let err = Language::new(minimal_symbols(), LexTable::default(), parse).unwrap_err();
        assert_eq!(err, LanguageError::UnknownSymbol(9));
    }

    #[test]
    fn symbol_introspection() {
        let mut parse = ParseTable::default();
        parse.start_symbol = Symbol(4);
        let language = Language::new(minimal_symbols(), LexTable::default(), parse).unwrap();
        assert_eq!(language.symbol_count(), 5);
        assert_eq!(language.symbol_name(Symbol::ERROR), Some("ERROR"));
        assert_eq!(language.symbol_name(Symbol(3)), Some("word"));
        assert_eq!(language.symbol_name(Symbol(40)), None);
        assert!(language.symbol_is_named(Symbol(3)));
        assert!(!language.symbol_is_named(Symbol::END));
    }
}
