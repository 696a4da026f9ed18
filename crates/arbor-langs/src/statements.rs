//! Statement list fixture.
//!
//! Lines of `name;` and `name = name;` under a hidden left-recursive
//! list, so statements sit directly beneath the root. Editing one
//! statement leaves the rest as reusable subtrees, which is what the
//! incremental suites measure.

use std::sync::Arc;

use arbor_syntax::{CharSet, Language, Symbol};

use crate::grammar::GrammarBuilder;
use crate::lexicon::LexiconBuilder;
use crate::LanguageBuildError;

/// The compiled statement-list language plus the symbols tests assert on.
#[derive(Debug, Clone)]
pub struct Statements {
    /// The language artifact.
    pub language: Arc<Language>,
    /// Name token.
    pub name: Symbol,
    /// `name;` node.
    pub statement: Symbol,
    /// `name = name;` node.
    pub assignment: Symbol,
}

/// Compiles the statement-list fixture.
pub fn statements() -> Result<Statements, LanguageBuildError> {
    let mut g = GrammarBuilder::new();
    let name = g.token("name");
    let semi = g.literal(";");
    let eq = g.literal("=");
    let statement = g.rule("statement");
    let assignment = g.rule("assignment");
    let list = g.hidden_rule("_list");
    let item = g.hidden_rule("_item");

    g.production(list, &[list, item])
        .production(list, &[item])
        .production(item, &[statement])
        .production(item, &[assignment])
        .production(statement, &[name, semi])
        .production(assignment, &[name, eq, name, semi])
        .start(list);
    let (symbols, parse) = g.build()?;

    let lex = LexiconBuilder::new()
        .skip(&CharSet::new().with_chars(" \t\n"))
        .class_plus(name, CharSet::new().with_range('a', 'z'))
        .literal(semi, ";")
        .literal(eq, "=")
        .build()?;

    let language = Arc::new(Language::new(symbols, lex, parse)?);
    Ok(Statements {
        language,
        name,
        statement,
        assignment,
    })
}
