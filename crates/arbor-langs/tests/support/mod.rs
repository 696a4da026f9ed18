//! Shared helpers for the integration suites.

// Each suite compiles this module separately and uses its own subset.
#![allow(dead_code)]

use std::sync::Arc;

use arbor_syntax::{Document, InputEdit, Language, Node};

/// Parses `text` from scratch.
pub fn scratch(language: &Arc<Language>, text: &str) -> Document {
    let mut doc = Document::new();
    doc.set_language(Arc::clone(language));
    doc.set_input_text(text);
    doc.parse().expect("scratch parse");
    doc
}

/// Applies one edit the way an editor would: mutates the text, swaps the
/// document's input, and records the edit in character coordinates.
pub fn apply_edit(
    doc: &mut Document,
    text: &mut String,
    position: usize,
    remove: usize,
    insert: &str,
) {
    let start = byte_of(text, position);
    let end = byte_of(text, position + remove);
    text.replace_range(start..end, insert);
    doc.set_input_text(text.clone());
    doc.edit(InputEdit {
        position,
        chars_removed: remove,
        chars_inserted: insert.chars().count(),
    });
}

fn byte_of(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(byte, _)| byte)
}

/// The document's root rendered as an s-expression.
pub fn sexp(doc: &Document) -> String {
    doc.root().expect("parsed document").to_sexp()
}

/// Asserts two trees are node-for-node identical: symbol, named flag,
/// every coordinate of both endpoints, and child structure.
pub fn assert_trees_equal(a: Node<'_>, b: Node<'_>) {
    assert_eq!(a.symbol(), b.symbol(), "symbol of {a:?} vs {b:?}");
    assert_eq!(a.is_named(), b.is_named(), "named flag of {a:?}");
    assert_eq!(a.start_byte(), b.start_byte(), "start byte of {a:?}");
    assert_eq!(a.end_byte(), b.end_byte(), "end byte of {a:?}");
    assert_eq!(a.start_char(), b.start_char(), "start char of {a:?}");
    assert_eq!(a.end_char(), b.end_char(), "end char of {a:?}");
    assert_eq!(a.start_point(), b.start_point(), "start point of {a:?}");
    assert_eq!(a.end_point(), b.end_point(), "end point of {a:?}");
    assert_eq!(a.child_count(), b.child_count(), "children of {a:?}");
    for (ca, cb) in a.children().zip(b.children()) {
        assert_trees_equal(ca, cb);
    }
}

/// Asserts the containment and ordering invariant for every node.
pub fn assert_well_formed(node: Node<'_>) {
    let mut previous_end = node.start_char();
    for child in node.children() {
        assert!(
            node.start_char() <= child.start_char(),
            "child starts before parent: {child:?} in {node:?}"
        );
        assert!(
            previous_end <= child.start_char(),
            "children overlap at {child:?}"
        );
        assert!(
            child.end_char() <= node.end_char(),
            "child ends after parent: {child:?} in {node:?}"
        );
        previous_end = child.end_char();
        assert_well_formed(child);
    }
}
