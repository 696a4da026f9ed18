//! Grammar compiler: productions to SLR(1) parse tables.
//!
//! [`GrammarBuilder`] allocates the symbol table (terminals, visible
//! rules, hidden rules), collects productions, and compiles the SLR(1)
//! [`ParseTable`] from the LR(0) item-set collection with FOLLOW-set
//! reduces. Grammars the single-lookahead automaton cannot decide are
//! rejected with the conflicting state and symbol named, as are
//! unit-production cycles, which would loop the runtime's chain
//! reductions forever.

use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use thiserror::Error;

use arbor_syntax::{Action, ParseState, ParseTable, Symbol, SymbolInfo};

/// Errors detected while compiling a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// No start symbol was chosen.
    #[error("no start symbol chosen")]
    MissingStart,

    /// The start symbol is a terminal or reserved.
    #[error("start symbol `{0}` is not a rule")]
    StartNotRule(SmolStr),

    /// A production refers to a symbol this builder did not allocate.
    #[error("production refers to unknown symbol id {0}")]
    UnknownSymbol(u16),

    /// A production names a reserved symbol; error, end-of-input, and the
    /// synthetic start are the engine's, not the grammar's.
    #[error("production uses reserved symbol `{0}`")]
    ReservedSymbol(SmolStr),

    /// A terminal on the left-hand side of a production.
    #[error("terminal `{0}` cannot have productions")]
    TerminalLhs(SmolStr),

    /// A production with an empty right-hand side.
    #[error("empty production for `{0}`")]
    EmptyProduction(SmolStr),

    /// A rule that is referenced but never defined.
    #[error("rule `{0}` has no productions")]
    UndefinedRule(SmolStr),

    /// A cycle of unit productions (`a -> b`, `b -> a`).
    #[error("unit-production cycle through `{0}`")]
    UnitCycle(SmolStr),

    /// A state where shifting and reducing both apply on one lookahead.
    #[error("state {state}: shift/reduce conflict on `{symbol}`")]
    ShiftReduce {
        /// LR state index.
        state: usize,
        /// Lookahead symbol name.
        symbol: SmolStr,
    },

    /// A state where two reductions apply on one lookahead.
    #[error("state {state}: reduce/reduce conflict on `{symbol}`")]
    ReduceReduce {
        /// LR state index.
        state: usize,
        /// Lookahead symbol name.
        symbol: SmolStr,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolKind {
    Terminal,
    Rule,
}

#[derive(Debug, Clone)]
struct Production {
    lhs: Symbol,
    rhs: Vec<Symbol>,
}

/// Declarative builder for a grammar and its symbol table.
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    symbols: Vec<SymbolInfo>,
    kinds: Vec<SymbolKind>,
    productions: Vec<Production>,
    start: Option<Symbol>,
}

impl Default for GrammarBuilder {
    fn default() -> Self {
        Self {
            symbols: SymbolInfo::reserved().to_vec(),
            kinds: vec![SymbolKind::Terminal, SymbolKind::Terminal, SymbolKind::Rule],
            productions: Vec::new(),
            start: None,
        }
    }
}

impl GrammarBuilder {
    /// An empty grammar holding only the reserved symbols.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self, info: SymbolInfo, kind: SymbolKind) -> Symbol {
        let id = u16::try_from(self.symbols.len()).unwrap_or(u16::MAX);
        self.symbols.push(info);
        self.kinds.push(kind);
        Symbol(id)
    }

    /// Allocates a named terminal (a token class such as an identifier).
    pub fn token(&mut self, name: &str) -> Symbol {
        self.allocate(SymbolInfo::named(name), SymbolKind::Terminal)
    }

    /// Allocates an anonymous terminal (a literal token).
    pub fn literal(&mut self, name: &str) -> Symbol {
        self.allocate(SymbolInfo::anonymous(name), SymbolKind::Terminal)
    }

    /// Allocates a visible rule; it produces tree nodes.
    pub fn rule(&mut self, name: &str) -> Symbol {
        self.allocate(SymbolInfo::named(name), SymbolKind::Rule)
    }

    /// Allocates a hidden rule; its children splice into the parent node.
    pub fn hidden_rule(&mut self, name: &str) -> Symbol {
        self.allocate(SymbolInfo::hidden(name), SymbolKind::Rule)
    }

    /// Adds one production.
    pub fn production(&mut self, lhs: Symbol, rhs: &[Symbol]) -> &mut Self {
        self.productions.push(Production {
            lhs,
            rhs: rhs.to_vec(),
        });
        self
    }

    /// Chooses the start rule.
    pub fn start(&mut self, symbol: Symbol) -> &mut Self {
        self.start = Some(symbol);
        self
    }

    fn name(&self, symbol: Symbol) -> SmolStr {
        self.symbols
            .get(usize::from(symbol.0))
            .map_or_else(|| SmolStr::new(format!("#{}", symbol.0)), |info| info.name.clone())
    }

    fn is_rule(&self, symbol: Symbol) -> bool {
        self.kinds.get(usize::from(symbol.0)) == Some(&SymbolKind::Rule)
    }

    fn check(&self, symbol: Symbol) -> Result<(), GrammarError> {
        if usize::from(symbol.0) >= self.symbols.len() {
            return Err(GrammarError::UnknownSymbol(symbol.0));
        }
        if symbol.0 < Symbol::RESERVED {
            return Err(GrammarError::ReservedSymbol(self.name(symbol)));
        }
        Ok(())
    }

    /// Compiles the grammar. On success returns the symbol table (ready
    /// for [`arbor_syntax::Language::new`]) and the parse table.
    pub fn build(&self) -> Result<(Vec<SymbolInfo>, ParseTable), GrammarError> {
        let start = self.start.ok_or(GrammarError::MissingStart)?;
        self.check(start)
            .map_err(|_| GrammarError::StartNotRule(self.name(start)))?;
        if !self.is_rule(start) {
            return Err(GrammarError::StartNotRule(self.name(start)));
        }

        for production in &self.productions {
            self.check(production.lhs)?;
            if !self.is_rule(production.lhs) {
                return Err(GrammarError::TerminalLhs(self.name(production.lhs)));
            }
            if production.rhs.is_empty() {
                return Err(GrammarError::EmptyProduction(self.name(production.lhs)));
            }
            for &symbol in &production.rhs {
                self.check(symbol)?;
            }
        }

        let defined: FxHashSet<Symbol> =
            self.productions.iter().map(|p| p.lhs).collect();
        let referenced = self
            .productions
            .iter()
            .flat_map(|p| p.rhs.iter().copied())
            .chain(std::iter::once(start));
        for symbol in referenced {
            if self.is_rule(symbol) && !defined.contains(&symbol) {
                return Err(GrammarError::UndefinedRule(self.name(symbol)));
            }
        }

        self.reject_unit_cycles()?;

        // Augmented grammar: production 0 wraps the chosen start rule.
        let mut productions = vec![Production {
            lhs: Symbol::START,
            rhs: vec![start],
        }];
        productions.extend(self.productions.iter().cloned());

        let follow = self.follow_sets(&productions);
        self.assemble(&productions, &follow, start)
    }

    fn reject_unit_cycles(&self) -> Result<(), GrammarError> {
        // Edges a -> b for every unit production; a cycle would make the
        // runtime reduce forever without consuming input.
        let mut edges: FxHashMap<Symbol, Vec<Symbol>> = FxHashMap::default();
        for production in &self.productions {
            if let [single] = production.rhs.as_slice() {
                if self.is_rule(*single) {
                    edges.entry(production.lhs).or_default().push(*single);
                }
            }
        }
        let mut done: FxHashSet<Symbol> = FxHashSet::default();
        for &origin in edges.keys() {
            if done.contains(&origin) {
                continue;
            }
            let mut on_path: FxHashSet<Symbol> = std::iter::once(origin).collect();
            let mut frames: Vec<(Symbol, usize)> = vec![(origin, 0)];
            while let Some((node, next)) = frames.pop() {
                let successors = edges.get(&node).map_or(&[] as &[Symbol], Vec::as_slice);
                if let Some(&succ) = successors.get(next) {
                    frames.push((node, next + 1));
                    if on_path.contains(&succ) {
                        return Err(GrammarError::UnitCycle(self.name(succ)));
                    }
                    if !done.contains(&succ) {
                        on_path.insert(succ);
                        frames.push((succ, 0));
                    }
                } else {
                    done.insert(node);
                    on_path.remove(&node);
                }
            }
        }
        Ok(())
    }

    fn first_sets(&self, productions: &[Production]) -> FxHashMap<Symbol, FxHashSet<Symbol>> {
        let mut first: FxHashMap<Symbol, FxHashSet<Symbol>> = FxHashMap::default();
        let mut changed = true;
        while changed {
            changed = false;
            for production in productions {
                let leading = production.rhs[0];
                let additions: Vec<Symbol> = if self.is_rule(leading) {
                    first.get(&leading).into_iter().flatten().copied().collect()
                } else {
                    vec![leading]
                };
                let entry = first.entry(production.lhs).or_default();
                for symbol in additions {
                    changed |= entry.insert(symbol);
                }
            }
        }
        first
    }

    fn follow_sets(&self, productions: &[Production]) -> FxHashMap<Symbol, FxHashSet<Symbol>> {
        let first = self.first_sets(productions);
        let first_of = |symbol: Symbol| -> Vec<Symbol> {
            if self.is_rule(symbol) {
                first.get(&symbol).into_iter().flatten().copied().collect()
            } else {
                vec![symbol]
            }
        };

        let mut follow: FxHashMap<Symbol, FxHashSet<Symbol>> = FxHashMap::default();
        follow
            .entry(Symbol::START)
            .or_default()
            .insert(Symbol::END);
        let mut changed = true;
        while changed {
            changed = false;
            for production in productions {
                for (i, &symbol) in production.rhs.iter().enumerate() {
                    if !self.is_rule(symbol) {
                        continue;
                    }
                    let additions: Vec<Symbol> = match production.rhs.get(i + 1) {
                        Some(&next) => first_of(next),
                        None => follow
                            .get(&production.lhs)
                            .into_iter()
                            .flatten()
                            .copied()
                            .collect(),
                    };
                    let entry = follow.entry(symbol).or_default();
                    for addition in additions {
                        changed |= entry.insert(addition);
                    }
                }
            }
        }
        follow
    }

    fn assemble(
        &self,
        productions: &[Production],
        follow: &FxHashMap<Symbol, FxHashSet<Symbol>>,
        start: Symbol,
    ) -> Result<(Vec<SymbolInfo>, ParseTable), GrammarError> {
        // LR(0) items are (production, dot) pairs; sets are kept sorted so
        // they can key the state map.
        type Item = (u32, u32);

        let closure = |mut set: BTreeSet<Item>| -> BTreeSet<Item> {
            let mut work: Vec<Item> = set.iter().copied().collect();
            while let Some((p, dot)) = work.pop() {
                let rhs = &productions[p as usize].rhs;
                let Some(&symbol) = rhs.get(dot as usize) else {
                    continue;
                };
                if !self.is_rule(symbol) {
                    continue;
                }
                for (q, production) in productions.iter().enumerate() {
                    if production.lhs == symbol {
                        let item = (u32::try_from(q).unwrap_or(u32::MAX), 0);
                        if set.insert(item) {
                            work.push(item);
                        }
                    }
                }
            }
            set
        };

        let mut states: Vec<BTreeSet<Item>> =
            vec![closure(std::iter::once((0, 0)).collect())];
        let mut index: FxHashMap<Vec<Item>, u32> = FxHashMap::default();
        index.insert(states[0].iter().copied().collect(), 0);
        let mut transitions: Vec<FxHashMap<Symbol, u32>> = Vec::new();

        let mut i = 0;
        while i < states.len() {
            let mut moves: FxHashMap<Symbol, BTreeSet<Item>> = FxHashMap::default();
            for &(p, dot) in &states[i] {
                if let Some(&symbol) = productions[p as usize].rhs.get(dot as usize) {
                    moves.entry(symbol).or_default().insert((p, dot + 1));
                }
            }
            let mut outgoing = FxHashMap::default();
            let mut ordered: Vec<(Symbol, BTreeSet<Item>)> = moves.into_iter().collect();
            ordered.sort_by_key(|(symbol, _)| symbol.0);
            for (symbol, kernel) in ordered {
                let closed = closure(kernel);
                let key: Vec<Item> = closed.iter().copied().collect();
                let target = match index.get(&key) {
                    Some(&existing) => existing,
                    None => {
                        let id = u32::try_from(states.len()).unwrap_or(u32::MAX);
                        states.push(closed);
                        index.insert(key, id);
                        id
                    }
                };
                outgoing.insert(symbol, target);
            }
            transitions.push(outgoing);
            i += 1;
        }

        let empty = FxHashSet::default();
        let mut table: Vec<ParseState> = Vec::with_capacity(states.len());
        for (i, items) in states.iter().enumerate() {
            let mut state = ParseState::default();
            for (&symbol, &target) in &transitions[i] {
                if self.is_rule(symbol) {
                    state.gotos.insert(symbol, target);
                } else {
                    state.actions.insert(symbol, Action::Shift(target));
                }
            }
            for &(p, dot) in items {
                let production = &productions[p as usize];
                if (dot as usize) < production.rhs.len() {
                    continue;
                }
                let (action, lookaheads): (Action, Vec<Symbol>) = if p == 0 {
                    (Action::Accept, vec![Symbol::END])
                } else {
                    let count = u16::try_from(production.rhs.len()).unwrap_or(u16::MAX);
                    let lookaheads = follow
                        .get(&production.lhs)
                        .unwrap_or(&empty)
                        .iter()
                        .copied()
                        .collect();
                    (
                        Action::Reduce {
                            symbol: production.lhs,
                            count,
                        },
                        lookaheads,
                    )
                };
                for lookahead in lookaheads {
                    match state.actions.get(&lookahead) {
                        None => {
                            state.actions.insert(lookahead, action);
                        }
                        Some(existing) if *existing == action => {}
                        Some(Action::Shift(_)) => {
                            return Err(GrammarError::ShiftReduce {
                                state: i,
                                symbol: self.name(lookahead),
                            });
                        }
                        Some(_) => {
                            return Err(GrammarError::ReduceReduce {
                                state: i,
                                symbol: self.name(lookahead),
                            });
                        }
                    }
                }
            }
            table.push(state);
        }

        Ok((
            self.symbols.clone(),
            ParseTable {
                states: table,
                start_symbol: start,
            },
        ))
    }
}
