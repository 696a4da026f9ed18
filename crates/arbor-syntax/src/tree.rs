//! The persistent syntax tree.
//!
//! Trees are immutable once returned by the engine. A reparse produces a
//! new [`Tree`] revision whose untouched subtrees are the previous
//! revision's nodes, shared by reference. Sharing is safe because nodes
//! store only *relative* extents: a reused subtree needs no position
//! rewriting when text before it grows or shrinks.
//!
//! Each node records the revision that created it; a node "has changes"
//! exactly when its generation matches the owning tree's, so reused
//! subtrees report unchanged at every depth without being copied.

use std::sync::Arc;

use crate::language::{Language, Symbol};
use crate::node::Node;
use crate::text::Extent;

/// One node of the shared tree structure. `children` is empty exactly for
/// tokens. `padding` is the skipped text (whitespace) between the previous
/// token and this node's first character; for an interior node it equals
/// the first child's padding.
#[derive(Debug)]
pub(crate) struct GreenNode {
    pub(crate) symbol: Symbol,
    pub(crate) named: bool,
    pub(crate) generation: u64,
    pub(crate) padding: Extent,
    pub(crate) size: Extent,
    /// Characters the lexer examined beyond the node's end while producing
    /// its last token. Edits inside this window invalidate the node.
    pub(crate) lookahead_chars: usize,
    /// LR state in force before this node's first token was shifted.
    /// A nonterminal is only reusable when the automaton is back in this
    /// state.
    pub(crate) entry_state: u32,
    pub(crate) contains_error: bool,
    pub(crate) children: Vec<Arc<GreenNode>>,
}

impl GreenNode {
    pub(crate) fn token(
        symbol: Symbol,
        named: bool,
        padding: Extent,
        size: Extent,
        lookahead_chars: usize,
        generation: u64,
    ) -> Arc<Self> {
        Arc::new(Self {
            symbol,
            named,
            generation,
            padding,
            size,
            lookahead_chars,
            entry_state: 0,
            contains_error: symbol == Symbol::ERROR,
            children: Vec::new(),
        })
    }

    /// Builds an interior node over `children` (non-empty, in source
    /// order). Extents, lookahead, and the error flag derive from the
    /// children.
    pub(crate) fn interior(
        symbol: Symbol,
        named: bool,
        children: Vec<Arc<GreenNode>>,
        entry_state: u32,
        generation: u64,
    ) -> Arc<Self> {
        debug_assert!(!children.is_empty());
        let padding = children[0].padding;
        let mut size = children[0].size;
        for child in &children[1..] {
            size += child.padded();
        }
        let lookahead_chars = children.last().map_or(0, |c| c.lookahead_chars);
        let contains_error =
            symbol == Symbol::ERROR || children.iter().any(|c| c.contains_error);
        Arc::new(Self {
            symbol,
            named,
            generation,
            padding,
            size,
            lookahead_chars,
            entry_state,
            contains_error,
            children,
        })
    }

    /// Builds the synthetic root. Unlike other interior nodes the root has
    /// no padding of its own: its span starts at the beginning of the
    /// document, and its size covers every child's padded extent.
    pub(crate) fn root(children: Vec<Arc<GreenNode>>, generation: u64) -> Arc<Self> {
        let mut size = Extent::ZERO;
        for child in &children {
            size += child.padded();
        }
        let contains_error = children.iter().any(|c| c.contains_error);
        Arc::new(Self {
            symbol: Symbol::START,
            named: true,
            generation,
            padding: Extent::ZERO,
            size,
            lookahead_chars: 0,
            entry_state: 0,
            contains_error,
            children,
        })
    }

    pub(crate) fn is_token(&self) -> bool {
        self.children.is_empty()
    }

    /// The node's full extent including its leading padding.
    pub(crate) fn padded(&self) -> Extent {
        self.padding + self.size
    }
}

/// One immutable revision of the syntax tree.
///
/// Obtained from [`Document::tree`](crate::document::Document::tree) after
/// a successful parse. Node views borrow the tree, so they cannot outlive
/// the revision they came from.
#[derive(Debug)]
pub struct Tree {
    pub(crate) root: Arc<GreenNode>,
    pub(crate) language: Arc<Language>,
    pub(crate) generation: u64,
    /// Extent of the whole document, including text after the last token.
    pub(crate) total: Extent,
}

impl Tree {
    /// The root node. Its range always covers the entire document,
    /// including leading and trailing skipped text.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        Node::root(self)
    }

    /// The language this revision was parsed with.
    #[must_use]
    pub fn language(&self) -> &Arc<Language> {
        &self.language
    }

    /// Document length in bytes.
    #[must_use]
    pub fn len_bytes(&self) -> usize {
        self.total.bytes
    }

    /// Document length in characters.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.total.chars
    }
}
