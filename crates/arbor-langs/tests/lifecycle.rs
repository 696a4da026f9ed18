//! Document lifecycle: idempotent parses, parse counting, adapter
//! behavior, and failure handling end to end.

mod support;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use arbor_langs::{arithmetic, statements};
use arbor_syntax::{
    DebugKind, Document, Input, InputEdit, InputError, ParseError, StringInput,
};
use support::{apply_edit, assert_trees_equal, scratch, sexp};

#[test]
fn parsing_twice_is_idempotent_and_counted() {
    let fixture = arithmetic().unwrap();
    let mut doc = scratch(&fixture.language, "a * (b + c)");
    let first = sexp(&doc);
    doc.parse().unwrap();
    assert_eq!(doc.parse_count(), 2);
    assert_eq!(sexp(&doc), first);

    let other = scratch(&fixture.language, "a * (b + c)");
    assert_trees_equal(doc.root().unwrap(), other.root().unwrap());
}

#[test]
fn chunked_reads_parse_identically() {
    let fixture = arithmetic().unwrap();
    let text = "aé + (bb * cc) - d";
    let reference = scratch(&fixture.language, text);
    for chunk_size in 1..6 {
        let mut doc = Document::new();
        doc.set_language(Arc::clone(&fixture.language));
        doc.set_input(Box::new(StringInput::new(text).with_chunk_size(chunk_size)));
        doc.parse().unwrap();
        assert_trees_equal(doc.root().unwrap(), reference.root().unwrap());
    }
}

/// Allows the initial rewind but refuses to reposition mid-document, like
/// a forward-only stream.
struct ForwardOnly {
    inner: StringInput,
}

impl Input for ForwardOnly {
    fn read(&mut self) -> Result<&str, InputError> {
        self.inner.read()
    }

    fn seek(&mut self, chars: usize, bytes: usize) -> Result<(), InputError> {
        if chars > 0 {
            return Err(InputError::Seek { chars, bytes });
        }
        self.inner.seek(chars, bytes)
    }
}

#[test]
fn seek_failure_aborts_and_preserves_the_revision() {
    let fixture = statements().unwrap();
    let mut text = String::from("aa;\nbb;\ncc;");
    let mut doc = scratch(&fixture.language, &text);
    let before = sexp(&doc);

    // Edit the last statement; the engine reuses the earlier ones and
    // then must seek past them, which this adapter refuses.
    text.replace_range(8..10, "xy");
    doc.set_input(Box::new(ForwardOnly {
        inner: StringInput::new(text.clone()),
    }));
    doc.edit(InputEdit {
        position: 8,
        chars_removed: 2,
        chars_inserted: 2,
    });
    let err = doc.parse().unwrap_err();
    assert!(matches!(err, ParseError::Input(InputError::Seek { .. })));
    assert_eq!(doc.parse_count(), 1);
    assert_eq!(sexp(&doc), before);

    // A seekable adapter over the same text completes the reparse.
    doc.set_input_text(text.clone());
    doc.parse().unwrap();
    assert_eq!(doc.parse_count(), 2);
    let fresh = scratch(&fixture.language, &text);
    assert_trees_equal(doc.root().unwrap(), fresh.root().unwrap());
}

#[test]
fn one_language_serves_many_documents() {
    let fixture = arithmetic().unwrap();
    let one = scratch(&fixture.language, "a + b");
    let two = scratch(&fixture.language, "c * d");
    assert_eq!(sexp(&one), r#"(START (sum (identifier) "+" (identifier)))"#);
    assert_eq!(sexp(&two), r#"(START (product (identifier) "*" (identifier)))"#);
    assert!(Arc::ptr_eq(one.tree().unwrap().language(), &fixture.language));
    assert_eq!(fixture.language.symbol_count(), 18);
    assert_eq!(fixture.language.symbol_name(fixture.sum), Some("sum"));
}

#[test]
fn debugger_sees_reuse_during_incremental_parses() {
    let fixture = statements().unwrap();
    let events: Rc<RefCell<Vec<(DebugKind, String)>>> = Rc::default();
    let sink = Rc::clone(&events);

    let mut text = String::from("aa;\nbb;\ncc;");
    let mut doc = Document::new();
    doc.set_language(Arc::clone(&fixture.language));
    doc.set_input_text(text.clone());
    doc.set_debugger(Box::new(move |kind: DebugKind, message: &str| {
        sink.borrow_mut().push((kind, message.to_string()));
    }));
    doc.parse().unwrap();
    assert!(events.borrow().iter().any(|(k, _)| *k == DebugKind::Lex));
    assert!(events
        .borrow()
        .iter()
        .any(|(k, m)| *k == DebugKind::Parse && m.starts_with("shift")));

    events.borrow_mut().clear();
    apply_edit(&mut doc, &mut text, 9, 1, "x");
    doc.parse().unwrap();
    assert!(events
        .borrow()
        .iter()
        .any(|(k, m)| *k == DebugKind::Parse && m.starts_with("reuse")));

    // Clearing the hook silences it without affecting results.
    events.borrow_mut().clear();
    doc.clear_debugger();
    doc.parse().unwrap();
    assert!(events.borrow().is_empty());
    let fresh = scratch(&fixture.language, &text);
    assert_trees_equal(doc.root().unwrap(), fresh.root().unwrap());
}

#[test]
fn debugger_reports_error_recovery() {
    let fixture = arithmetic().unwrap();
    let events: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink = Rc::clone(&events);
    let mut doc = Document::new();
    doc.set_language(Arc::clone(&fixture.language));
    doc.set_input_text("a + + b");
    doc.set_debugger(Box::new(move |_: DebugKind, message: &str| {
        sink.borrow_mut().push(message.to_string());
    }));
    doc.parse().unwrap();
    let events = events.borrow();
    assert!(events.iter().any(|m| m.starts_with("error recovery start")));
    assert!(events.iter().any(|m| m.starts_with("error recovery end")));
}
