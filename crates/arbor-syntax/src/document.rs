//! The process-facing document aggregate.
//!
//! A [`Document`] owns everything one parsed text needs: a language, an
//! input source, the current tree revision, the pending edit log, a parse
//! counter, and an optional debugger. It is single-threaded by contract;
//! the `&mut self` lifecycle operations and the tree-borrowing node views
//! make one-mutator-at-a-time a compile-time property rather than a
//! runtime check.

use std::sync::Arc;

use crate::debug::Debugger;
use crate::edit::{ChangeSet, InputEdit};
use crate::error::ParseError;
use crate::input::{Input, StringInput};
use crate::language::Language;
use crate::node::Node;
use crate::parser;
use crate::tree::Tree;

/// A text document kept in sync with its syntax tree.
///
/// Lifecycle: create, assign a language and an input (in either order),
/// then alternate between recording edits and calling [`parse`]. Each
/// successful parse consumes the edit log, replaces the tree revision,
/// and increments the parse counter. Dropping the document releases the
/// tree; node views cannot outlive it.
///
/// [`parse`]: Document::parse
#[derive(Default)]
pub struct Document {
    language: Option<Arc<Language>>,
    input: Option<Box<dyn Input>>,
    debugger: Option<Box<dyn Debugger>>,
    tree: Option<Tree>,
    changes: ChangeSet,
    parse_count: u64,
}

impl Document {
    /// Creates an empty document with no language, input, or tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The document's language, if one has been assigned.
    #[must_use]
    pub fn language(&self) -> Option<&Arc<Language>> {
        self.language.as_ref()
    }

    /// Assigns the language. Grammars are not interchangeable mid-tree:
    /// the current tree revision and any pending edits are discarded, so
    /// the next parse is a full one.
    pub fn set_language(&mut self, language: Arc<Language>) {
        self.language = Some(language);
        self.tree = None;
        self.changes.clear();
    }

    /// The current input adapter.
    #[must_use]
    pub fn input(&self) -> Option<&dyn Input> {
        self.input.as_deref()
    }

    /// Assigns the input adapter.
    ///
    /// Swapping the input does not touch the tree or the edit log: the log
    /// remains authoritative for the next incremental parse. Replacing the
    /// text wholesale without recording matching edits is a contract
    /// violation; call [`invalidate`](Document::invalidate) instead.
    pub fn set_input(&mut self, input: Box<dyn Input>) {
        self.input = Some(input);
    }

    /// Assigns an in-memory string as the input.
    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.set_input(Box::new(StringInput::new(text)));
    }

    /// The installed tracing hook, if any.
    #[must_use]
    pub fn debugger(&self) -> Option<&dyn Debugger> {
        self.debugger.as_deref()
    }

    /// Installs the tracing hook, replacing any previous one.
    pub fn set_debugger(&mut self, debugger: Box<dyn Debugger>) {
        self.debugger = Some(debugger);
    }

    /// Removes the tracing hook.
    pub fn clear_debugger(&mut self) {
        self.debugger = None;
    }

    /// Records one text mutation. Nothing is reparsed until the next
    /// [`parse`](Document::parse); edits accumulate in application order,
    /// each interpreted against the document as already edited.
    pub fn edit(&mut self, edit: InputEdit) {
        self.changes.record(edit);
    }

    /// Discards the current tree revision and the edit log, forcing the
    /// next parse to run from scratch. For mutations too complex to
    /// describe as edits, or after replacing the input text wholesale.
    pub fn invalidate(&mut self) {
        self.tree = None;
        self.changes.clear();
    }

    /// Parses the input, replacing the current tree revision.
    ///
    /// Requires a language and an input. Malformed text is not an error;
    /// it surfaces as `ERROR` nodes in the tree. An input adapter failure
    /// aborts the parse and leaves the previous revision and the edit log
    /// untouched.
    pub fn parse(&mut self) -> Result<(), ParseError> {
        let language = self.language.as_ref().ok_or(ParseError::MissingLanguage)?;
        let input = self.input.as_deref_mut().ok_or(ParseError::MissingInput)?;
        let tree = parser::parse(
            language,
            input,
            &self.changes,
            self.tree.as_ref(),
            &mut self.debugger,
        )?;
        self.tree = Some(tree);
        self.changes.clear();
        self.parse_count += 1;
        Ok(())
    }

    /// How many parses have completed successfully, including ones that
    /// reused the previous tree wholesale.
    #[must_use]
    pub fn parse_count(&self) -> u64 {
        self.parse_count
    }

    /// The current tree revision, if the document has been parsed.
    #[must_use]
    pub fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    /// The root node of the current tree revision.
    #[must_use]
    pub fn root(&self) -> Option<Node<'_>> {
        self.tree.as_ref().map(Tree::root)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("has_language", &self.language.is_some())
            .field("has_input", &self.input.is_some())
            .field("has_tree", &self.tree.is_some())
            .field("pending_edits", &!self.changes.is_empty())
            .field("parse_count", &self.parse_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::InputError;
    use crate::language::{
        Action, CharSet, LexState, LexTable, ParseState, ParseTable, Symbol, SymbolInfo,
    };

    use super::*;

    const WORD: Symbol = Symbol(3);
    const DOC: Symbol = Symbol(4);

    /// A language of exactly one lowercase word.
    fn one_word_language() -> Arc<Language> {
        let mut symbols = SymbolInfo::reserved().to_vec();
        symbols.push(SymbolInfo::named("word"));
        symbols.push(SymbolInfo::hidden("_doc"));

        let letters = CharSet::new().with_range('a', 'z');
        let lex = LexTable {
            states: vec![
                LexState {
                    accept: None,
                    transitions: vec![(letters.clone(), 1)],
                },
                LexState {
                    accept: Some(WORD),
                    transitions: vec![(letters, 1)],
                },
            ],
            skip: CharSet::new().with_chars(" \n"),
        };

        let mut s0 = ParseState::default();
        s0.actions.insert(WORD, Action::Shift(1));
        s0.gotos.insert(DOC, 2);
        let mut s1 = ParseState::default();
        s1.actions.insert(
            Symbol::END,
            Action::Reduce {
                symbol: DOC,
                count: 1,
            },
        );
        let mut s2 = ParseState::default();
        s2.actions.insert(Symbol::END, Action::Accept);

        let parse = ParseTable {
            states: vec![s0, s1, s2],
            start_symbol: DOC,
        };
        Language::new(symbols, lex, parse).unwrap().into()
    }

    fn parsed(text: &str) -> Document {
        let mut doc = Document::new();
        doc.set_language(one_word_language());
        doc.set_input_text(text);
        doc.parse().unwrap();
        doc
    }

    #[test]
    fn parse_requires_language_and_input() {
        let mut doc = Document::new();
        assert_eq!(doc.parse(), Err(ParseError::MissingLanguage));
        doc.set_language(one_word_language());
        assert_eq!(doc.parse(), Err(ParseError::MissingInput));
        assert_eq!(doc.parse_count(), 0);
        assert!(doc.root().is_none());
    }

    #[test]
    fn parse_builds_a_tree_and_counts() {
        let doc = parsed("hello");
        assert_eq!(doc.parse_count(), 1);
        let root = doc.root().unwrap();
        assert_eq!(root.to_sexp(), "(START (word))");
        assert_eq!(root.end_char(), 5);
        assert!(root.has_changes());
    }

    #[test]
    fn reparse_without_edits_reuses_the_tree_wholesale() {
        let mut doc = parsed("hello");
        doc.parse().unwrap();
        assert_eq!(doc.parse_count(), 2);
        let root = doc.root().unwrap();
        assert_eq!(root.to_sexp(), "(START (word))");
        assert!(!root.has_changes());
        assert!(!root.child(0).unwrap().has_changes());
    }

    #[test]
    fn set_language_discards_the_tree() {
        let mut doc = parsed("hello");
        doc.set_language(one_word_language());
        assert!(doc.tree().is_none());
        assert_eq!(doc.parse_count(), 1);
    }

    #[test]
    fn invalidate_forces_a_full_parse() {
        let mut doc = parsed("hello");
        doc.invalidate();
        assert!(doc.tree().is_none());
        doc.parse().unwrap();
        // A from-scratch parse regenerates every node.
        assert!(doc.root().unwrap().child(0).unwrap().has_changes());
    }

    #[test]
    fn debugger_observes_lexing_and_parsing() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let events: Rc<RefCell<Vec<(crate::debug::DebugKind, String)>>> =
            Rc::default();
        let sink = Rc::clone(&events);
        let mut doc = Document::new();
        doc.set_language(one_word_language());
        doc.set_input_text("hello");
        doc.set_debugger(Box::new(move |kind: crate::debug::DebugKind, message: &str| {
            sink.borrow_mut().push((kind, message.to_string()));
        }));
        doc.parse().unwrap();
        let events = events.borrow();
        assert!(events
            .iter()
            .any(|(k, m)| *k == crate::debug::DebugKind::Lex && m.contains("word")));
        assert!(events
            .iter()
            .any(|(k, m)| *k == crate::debug::DebugKind::Parse && m.contains("shift")));
        assert!(events
            .iter()
            .any(|(k, m)| *k == crate::debug::DebugKind::Parse && m.contains("reduce")));
    }

    struct BrokenInput;

    impl Input for BrokenInput {
        fn read(&mut self) -> Result<&str, InputError> {
            Err(InputError::Read("device gone".into()))
        }

        fn seek(&mut self, _chars: usize, _bytes: usize) -> Result<(), InputError> {
            Ok(())
        }
    }

    #[test]
    fn input_failure_leaves_the_previous_tree_untouched() {
        let mut doc = parsed("hello");
        doc.set_input(Box::new(BrokenInput));
        doc.edit(InputEdit {
            position: 0,
            chars_removed: 1,
            chars_inserted: 1,
        });
        let err = doc.parse().unwrap_err();
        assert!(matches!(err, ParseError::Input(InputError::Read(_))));
        assert_eq!(doc.parse_count(), 1);
        assert_eq!(doc.root().unwrap().to_sexp(), "(START (word))");
        // The edit log survives for a retry.
        doc.set_input_text("jello");
        doc.parse().unwrap();
        assert_eq!(doc.parse_count(), 2);
        assert_eq!(doc.root().unwrap().to_sexp(), "(START (word))");
    }
}
