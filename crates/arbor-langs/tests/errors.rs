//! Malformed input never fails a parse; it surfaces as `ERROR` nodes with
//! predictable spans.

mod support;

use arbor_langs::{arithmetic, statements};
use expect_test::expect;
use support::{apply_edit, assert_trees_equal, assert_well_formed, scratch, sexp};

#[test]
fn empty_and_blank_inputs_parse_to_bare_roots() {
    let fixture = arithmetic().unwrap();
    let doc = scratch(&fixture.language, "");
    let root = doc.root().unwrap();
    assert_eq!(root.child_count(), 0);
    assert_eq!(root.start_char(), 0);
    assert_eq!(root.end_char(), 0);
    expect![[r#"(START)"#]].assert_eq(&sexp(&doc));

    // Whitespace-only input: still no children, but the root spans it.
    let doc = scratch(&fixture.language, "  \n ");
    let root = doc.root().unwrap();
    assert_eq!(root.child_count(), 0);
    assert_eq!(root.end_char(), 4);
    assert_eq!(root.end_point(), arbor_syntax::Point::new(1, 1));
}

#[test]
fn unlexable_input_becomes_one_error_node() {
    let fixture = arithmetic().unwrap();
    let doc = scratch(&fixture.language, "???");
    let root = doc.root().unwrap();
    expect![[r#"(START (ERROR (ERROR) (ERROR) (ERROR)))"#]].assert_eq(&sexp(&doc));
    let error = root.child(0).unwrap();
    assert!(error.is_error());
    assert_eq!(error.start_char(), 0);
    assert_eq!(error.end_char(), 3);
    assert_well_formed(root);
}

#[test]
fn malformed_span_is_contained_between_valid_neighbors() {
    let fixture = arithmetic().unwrap();
    let doc = scratch(&fixture.language, "a + ? b * c");
    expect![[
        r#"(START (sum (identifier) "+" (ERROR (ERROR)) (product (identifier) "*" (identifier))))"#
    ]]
    .assert_eq(&sexp(&doc));
    let root = doc.root().unwrap();
    let error = root
        .descendant_for_char_range(4, 5)
        .expect("error token location");
    assert!(error.is_error());
    assert_well_formed(root);
}

#[test]
fn incomplete_input_wraps_the_dangling_suffix() {
    let fixture = arithmetic().unwrap();
    let doc = scratch(&fixture.language, "a +");
    expect![[r#"(START (identifier) (ERROR "+"))"#]].assert_eq(&sexp(&doc));

    let doc = scratch(&fixture.language, "(a + b");
    expect![[r#"(START (ERROR "(" (sum (identifier) "+" (identifier))))"#]]
        .assert_eq(&sexp(&doc));
    assert_well_formed(doc.root().unwrap());
}

#[test]
fn trailing_garbage_after_a_complete_expression() {
    let fixture = arithmetic().unwrap();
    let doc = scratch(&fixture.language, "a + b c");
    expect![[r#"(START (sum (identifier) "+" (identifier)) (ERROR (identifier)))"#]]
        .assert_eq(&sexp(&doc));
}

#[test]
fn error_regions_reparse_like_anything_else() {
    let fixture = statements().unwrap();
    let mut text = String::from("aa;\nbb = ;\ncc;");
    let mut doc = scratch(&fixture.language, &text);
    assert!(doc.root().unwrap().has_error());

    // Repair the malformed assignment; the tree must match scratch.
    apply_edit(&mut doc, &mut text, 9, 0, "dd ");
    doc.parse().unwrap();
    assert_eq!(text, "aa;\nbb = dd ;\ncc;");
    let fresh = scratch(&fixture.language, &text);
    assert_eq!(sexp(&doc), sexp(&fresh));
    assert_trees_equal(doc.root().unwrap(), fresh.root().unwrap());
    assert!(!doc.root().unwrap().has_error());

    // And breaking it again must match scratch too.
    apply_edit(&mut doc, &mut text, 5, 1, "?");
    doc.parse().unwrap();
    let fresh = scratch(&fixture.language, &text);
    assert_eq!(sexp(&doc), sexp(&fresh));
    assert_trees_equal(doc.root().unwrap(), fresh.root().unwrap());
}

#[test]
fn error_trees_still_satisfy_containment() {
    let fixture = arithmetic().unwrap();
    for text in [") a + b", "a + + b", "((a)", "1 2 3", "* / -", "a?b?c"] {
        let doc = scratch(&fixture.language, text);
        let root = doc.root().unwrap();
        assert_well_formed(root);
        assert_eq!(root.start_char(), 0);
        assert_eq!(root.end_char(), text.chars().count());
    }
}
