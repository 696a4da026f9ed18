//! Navigable views into a tree revision.
//!
//! A [`Node`] is a copyable value: a reference to the owning [`Tree`] plus
//! the node's absolute offset. It owns nothing and every operation is a
//! pure read. Because views borrow the tree, the borrow checker enforces
//! the lifetime contract: no view survives the next reparse of its
//! document.

use std::fmt::Write as _;

use crate::language::Symbol;
use crate::text::Point;
use crate::tree::{GreenNode, Tree};

/// A lightweight reference to one node of a [`Tree`] revision.
///
/// Equality is node identity (same tree, same underlying node, same
/// position), not structural similarity. Navigation that walks off the
/// tree (`parent` of the root, `child` out of range, sibling of the last
/// child) returns `None`.
#[derive(Clone, Copy)]
pub struct Node<'tree> {
    tree: &'tree Tree,
    green: &'tree GreenNode,
    /// Absolute extent of everything before this node's padding.
    offset: crate::text::Extent,
}

impl<'tree> Node<'tree> {
    pub(crate) fn root(tree: &'tree Tree) -> Self {
        Self {
            tree,
            green: &tree.root,
            offset: crate::text::Extent::ZERO,
        }
    }

    fn content_start(&self) -> crate::text::Extent {
        self.offset + self.green.padding
    }

    fn content_end(&self) -> crate::text::Extent {
        if self.is_root() {
            self.tree.total
        } else {
            self.content_start() + self.green.size
        }
    }

    fn is_root(&self) -> bool {
        std::ptr::eq(self.green, &*self.tree.root)
    }

    /// The node's grammar symbol.
    #[must_use]
    pub fn symbol(&self) -> Symbol {
        self.green.symbol
    }

    /// The symbol's display name, resolved through the owning language.
    #[must_use]
    pub fn kind(&self) -> &'tree str {
        self.tree
            .language
            .symbol_name(self.green.symbol)
            .unwrap_or("")
    }

    /// Whether the node is grammar-significant (a production or named
    /// token class) rather than a literal token.
    #[must_use]
    pub fn is_named(&self) -> bool {
        self.green.named
    }

    /// Whether this is an `ERROR` node.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.green.symbol == Symbol::ERROR
    }

    /// Whether this node or any descendant is an `ERROR` node.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.green.contains_error
    }

    /// Whether this node's subtree was produced by the most recent parse,
    /// as opposed to reused from the previous revision.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.green.generation == self.tree.generation
    }

    /// Start of the node's span as a byte offset.
    #[must_use]
    pub fn start_byte(&self) -> usize {
        self.content_start().bytes
    }

    /// Start of the node's span as a character offset.
    #[must_use]
    pub fn start_char(&self) -> usize {
        self.content_start().chars
    }

    /// Start of the node's span as a row/column point.
    #[must_use]
    pub fn start_point(&self) -> Point {
        self.content_start().point
    }

    /// End of the node's span as a byte offset.
    #[must_use]
    pub fn end_byte(&self) -> usize {
        self.content_end().bytes
    }

    /// End of the node's span as a character offset.
    #[must_use]
    pub fn end_char(&self) -> usize {
        self.content_end().chars
    }

    /// End of the node's span as a row/column point.
    #[must_use]
    pub fn end_point(&self) -> Point {
        self.content_end().point
    }

    /// Number of children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.green.children.len()
    }

    /// Number of named children.
    #[must_use]
    pub fn named_child_count(&self) -> usize {
        self.green.children.iter().filter(|c| c.named).count()
    }

    /// Iterates the node's children in source order.
    pub fn children(&self) -> impl Iterator<Item = Node<'tree>> + 'tree {
        let tree = self.tree;
        let mut run = self.offset;
        self.green.children.iter().map(move |child| {
            let node = Node {
                tree,
                green: child,
                offset: run,
            };
            run += child.padded();
            node
        })
    }

    /// The `i`th child.
    #[must_use]
    pub fn child(&self, i: usize) -> Option<Node<'tree>> {
        self.children().nth(i)
    }

    /// The `i`th named child.
    #[must_use]
    pub fn named_child(&self, i: usize) -> Option<Node<'tree>> {
        self.children().filter(Node::is_named).nth(i)
    }

    /// The node's parent, recomputed by descending from the root.
    #[must_use]
    pub fn parent(&self) -> Option<Node<'tree>> {
        if self.is_root() {
            return None;
        }
        let mut cursor = self.tree.root();
        loop {
            let mut descend = None;
            for child in cursor.children() {
                if child == *self {
                    return Some(cursor);
                }
                let start = child.offset.chars;
                let end = start + child.green.padded().chars;
                if start <= self.offset.chars
                    && self.offset.chars + self.green.padded().chars <= end
                {
                    descend = Some(child);
                }
            }
            cursor = descend?;
        }
    }

    fn sibling(&self, delta: isize, named_only: bool) -> Option<Node<'tree>> {
        let parent = self.parent()?;
        let siblings: Vec<Node<'tree>> = parent.children().collect();
        let index = siblings.iter().position(|s| s == self)?;
        let mut i = index;
        loop {
            i = i.checked_add_signed(delta)?;
            let candidate = *siblings.get(i)?;
            if !named_only || candidate.is_named() {
                return Some(candidate);
            }
        }
    }

    /// The next sibling in source order.
    #[must_use]
    pub fn next_sibling(&self) -> Option<Node<'tree>> {
        self.sibling(1, false)
    }

    /// The previous sibling in source order.
    #[must_use]
    pub fn prev_sibling(&self) -> Option<Node<'tree>> {
        self.sibling(-1, false)
    }

    /// The next named sibling.
    #[must_use]
    pub fn next_named_sibling(&self) -> Option<Node<'tree>> {
        self.sibling(1, true)
    }

    /// The previous named sibling.
    #[must_use]
    pub fn prev_named_sibling(&self) -> Option<Node<'tree>> {
        self.sibling(-1, true)
    }

    fn descendant_for_range(
        &self,
        start: usize,
        end: usize,
        by_bytes: bool,
        named_only: bool,
    ) -> Option<Node<'tree>> {
        let measure = |e: crate::text::Extent| if by_bytes { e.bytes } else { e.chars };
        if start < measure(self.content_start()) || end > measure(self.content_end()) {
            return None;
        }
        let mut cursor = *self;
        let mut best = if !named_only || cursor.is_named() {
            Some(cursor)
        } else {
            None
        };
        'descend: loop {
            for child in cursor.children() {
                if measure(child.content_start()) <= start && end <= measure(child.content_end())
                {
                    if !named_only || child.is_named() {
                        best = Some(child);
                    }
                    cursor = child;
                    continue 'descend;
                }
            }
            return best;
        }
    }

    /// The smallest node whose span contains the byte range `start..=end`.
    /// Returns `None` when the range is not contained in this node's span;
    /// a range falling in the gap between children resolves to the
    /// enclosing node.
    #[must_use]
    pub fn descendant_for_byte_range(&self, start: usize, end: usize) -> Option<Node<'tree>> {
        self.descendant_for_range(start, end, true, false)
    }

    /// The smallest node whose span contains the character range
    /// `start..=end`; boundary policy as for
    /// [`descendant_for_byte_range`](Self::descendant_for_byte_range).
    #[must_use]
    pub fn descendant_for_char_range(&self, start: usize, end: usize) -> Option<Node<'tree>> {
        self.descendant_for_range(start, end, false, false)
    }

    /// The smallest named node whose span contains the byte range.
    #[must_use]
    pub fn named_descendant_for_byte_range(
        &self,
        start: usize,
        end: usize,
    ) -> Option<Node<'tree>> {
        self.descendant_for_range(start, end, true, true)
    }

    /// The smallest named node whose span contains the character range.
    #[must_use]
    pub fn named_descendant_for_char_range(
        &self,
        start: usize,
        end: usize,
    ) -> Option<Node<'tree>> {
        self.descendant_for_range(start, end, false, true)
    }

    /// Renders the subtree as an s-expression: named nodes as
    /// `(kind child…)`, anonymous tokens as their quoted name.
    #[must_use]
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        self.write_sexp(&mut out);
        out
    }

    fn write_sexp(&self, out: &mut String) {
        if !self.is_named() {
            let _ = write!(out, "\"{}\"", self.kind());
            return;
        }
        let _ = write!(out, "({}", self.kind());
        for child in self.children() {
            out.push(' ');
            child.write_sexp(out);
        }
        out.push(')');
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree)
            && std::ptr::eq(self.green, other.green)
            && self.offset == other.offset
    }
}

impl Eq for Node<'_> {}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}..{}) {}..{}",
            self.kind(),
            self.start_char(),
            self.end_char(),
            self.start_point(),
            self.end_point()
        )
    }
}
