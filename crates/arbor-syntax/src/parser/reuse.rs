//! Subtree reuse against the previous tree revision.
//!
//! During an incremental parse the engine repeatedly asks: does a node of
//! the old tree start exactly where parsing currently stands, and is it
//! safe to take wholesale? A token is safe when no edit touches the text
//! it was lexed from, including the characters it looked ahead at. A
//! nonterminal additionally requires the automaton to be in the same state
//! the node was originally built from, and an untouched window extending
//! through the first token *after* the node, because the reduction that
//! closed the node consulted that token. Candidates that fail are broken
//! down into their first child, which starts at the same position; the
//! innermost failure falls back to fresh lexing.

use std::sync::Arc;

use crate::edit::ChangeSet;
use crate::text::Extent;
use crate::tree::GreenNode;

/// The previous revision, viewed in its own (old) coordinates.
pub(super) struct ReuseSource<'a> {
    root: &'a Arc<GreenNode>,
    /// One past the old document's last character; appends land here.
    horizon: usize,
    changes: &'a ChangeSet,
}

/// An old-tree node whose padded span starts at the queried position.
#[derive(Clone)]
pub(super) struct Candidate<'a> {
    pub(super) green: &'a Arc<GreenNode>,
    /// Absolute old position where the node's padding begins.
    abs: Extent,
    /// One past the furthest old character whose identity the node's
    /// construction depended on: through the following token's lookahead.
    following_reach: usize,
}

impl<'a> ReuseSource<'a> {
    pub(super) fn new(
        root: &'a Arc<GreenNode>,
        old_total_chars: usize,
        changes: &'a ChangeSet,
    ) -> Self {
        Self {
            root,
            horizon: old_total_chars + 1,
            changes,
        }
    }

    /// The outermost node (never the root) whose padded span starts at
    /// `old_pos`, found by descending from the root.
    pub(super) fn candidate_at(&self, old_pos: usize) -> Option<Candidate<'a>> {
        let mut node = self.root;
        let mut abs = Extent::ZERO;
        let mut reach = self.horizon;
        loop {
            let mut offset = abs;
            let mut found = None;
            for (i, child) in node.children.iter().enumerate() {
                let end = offset.chars + child.padded().chars;
                if offset.chars == old_pos || (offset.chars < old_pos && old_pos < end) {
                    let child_reach = node
                        .children
                        .get(i + 1)
                        .map_or(reach, |next| first_token_reach(next, offset + child.padded()));
                    found = Some((child, offset, child_reach));
                    break;
                }
                if offset.chars > old_pos {
                    break;
                }
                offset += child.padded();
            }
            let (child, child_abs, child_reach) = found?;
            if child_abs.chars == old_pos {
                return Some(Candidate {
                    green: child,
                    abs: child_abs,
                    following_reach: child_reach,
                });
            }
            node = child;
            abs = child_abs;
            reach = child_reach;
        }
    }

    /// Whether a token candidate's lexical window is untouched.
    pub(super) fn token_reusable(&self, candidate: &Candidate<'_>) -> bool {
        debug_assert!(candidate.green.is_token());
        let start = candidate.abs.chars;
        let end = start + candidate.green.padded().chars + candidate.green.lookahead_chars;
        !candidate.green.contains_error && !self.changes.intersects_old(start, end)
    }

    /// Whether a nonterminal candidate's construction window is untouched.
    /// The state checks are the caller's: they depend on where the
    /// automaton currently stands.
    pub(super) fn subtree_clean(&self, candidate: &Candidate<'_>) -> bool {
        !candidate.green.contains_error
            && !self
                .changes
                .intersects_old(candidate.abs.chars, candidate.following_reach)
    }
}

impl<'a> Candidate<'a> {
    /// Descends to the first child, which starts at the same position. The
    /// child's dependency window ends at the next sibling's first token,
    /// or inherits this node's when there is none.
    pub(super) fn break_down(&self) -> Option<Candidate<'a>> {
        let first = self.green.children.first()?;
        let following_reach = self
            .green
            .children
            .get(1)
            .map_or(self.following_reach, |next| {
                first_token_reach(next, self.abs + first.padded())
            });
        Some(Candidate {
            green: first,
            abs: self.abs,
            following_reach,
        })
    }

    /// Symbol of the subtree's first token; drives reduce decisions while
    /// the subtree itself is the pending lookahead.
    pub(super) fn leading_token_symbol(&self) -> crate::language::Symbol {
        let mut node = self.green;
        while let Some(first) = node.children.first() {
            node = first;
        }
        node.symbol
    }
}

/// One past the end of the lexical window of the leftmost token under
/// `green`, whose padding starts at `abs`.
fn first_token_reach(green: &Arc<GreenNode>, abs: Extent) -> usize {
    let mut node = green;
    while let Some(first) = node.children.first() {
        node = first;
    }
    abs.chars + node.padded().chars + node.lookahead_chars
}

#[cfg(test)]
mod tests {
    use crate::edit::InputEdit;
    use crate::language::Symbol;

    use super::*;

    const WORD: Symbol = Symbol(3);
    const PAIR: Symbol = Symbol(4);

    fn extent(chars: usize) -> Extent {
        Extent {
            bytes: chars,
            chars,
            point: crate::text::Point::new(0, chars),
        }
    }

    fn token(padding: usize, size: usize) -> Arc<GreenNode> {
        GreenNode::token(WORD, true, extent(padding), extent(size), 1, 0)
    }

    /// "ab cd ef": (pair ab cd) ef under the root.
    fn old_tree() -> Arc<GreenNode> {
        let pair = GreenNode::interior(
            PAIR,
            true,
            vec![token(0, 2), token(1, 2)],
            0,
            0,
        );
        GreenNode::root(vec![pair, token(1, 2)], 0)
    }

    fn changed(edits: &[(usize, usize, usize)]) -> ChangeSet {
        let mut set = ChangeSet::default();
        for &(position, chars_removed, chars_inserted) in edits {
            set.record(InputEdit {
                position,
                chars_removed,
                chars_inserted,
            });
        }
        set
    }

    #[test]
    fn finds_the_outermost_candidate_first() {
        let root = old_tree();
        let changes = changed(&[(7, 1, 1)]);
        let source = ReuseSource::new(&root, 8, &changes);
        let candidate = source.candidate_at(0).unwrap();
        assert_eq!(candidate.green.symbol, PAIR);
        let inner = candidate.break_down().unwrap();
        assert_eq!(inner.green.symbol, WORD);
        assert!(inner.break_down().is_none());
        assert!(source.candidate_at(1).is_none());
        assert_eq!(source.candidate_at(5).unwrap().green.symbol, WORD);
    }

    #[test]
    fn edit_inside_the_span_blocks_the_subtree() {
        let root = old_tree();
        let changes = changed(&[(4, 1, 1)]);
        let source = ReuseSource::new(&root, 8, &changes);
        let pair = source.candidate_at(0).unwrap();
        assert!(!source.subtree_clean(&pair));
        let ab = pair.break_down().unwrap();
        assert!(source.token_reusable(&ab));
    }

    #[test]
    fn edit_in_the_following_token_blocks_the_subtree_but_not_its_tokens() {
        let root = old_tree();
        // "ef" starts at 6; the pair's closing reduce consulted it.
        let changes = changed(&[(6, 1, 1)]);
        let source = ReuseSource::new(&root, 8, &changes);
        let pair = source.candidate_at(0).unwrap();
        assert!(!source.subtree_clean(&pair));
        // "cd" starts (with its padding) at 2 and looked ahead to 6.
        let cd = source.candidate_at(2).unwrap();
        assert!(source.token_reusable(&cd));
    }

    #[test]
    fn append_at_the_end_blocks_the_final_token_and_its_ancestors() {
        let root = old_tree();
        let changes = changed(&[(8, 0, 3)]);
        let source = ReuseSource::new(&root, 8, &changes);
        // "ef" may merge with the appended text, so neither it nor the
        // pair whose closing reduce consulted it can be taken wholesale.
        let pair = source.candidate_at(0).unwrap();
        assert!(!source.subtree_clean(&pair));
        let ef = source.candidate_at(5).unwrap();
        assert!(!source.token_reusable(&ef));
        // The pair's own tokens looked no further than "ef"'s start.
        let ab = pair.break_down().unwrap();
        assert!(source.token_reusable(&ab));
        assert!(source.token_reusable(&source.candidate_at(2).unwrap()));
    }

    #[test]
    fn leading_token_symbol_descends_the_left_spine() {
        let root = old_tree();
        let changes = changed(&[]);
        let source = ReuseSource::new(&root, 8, &changes);
        let pair = source.candidate_at(0).unwrap();
        assert_eq!(pair.leading_token_symbol(), WORD);
    }
}
