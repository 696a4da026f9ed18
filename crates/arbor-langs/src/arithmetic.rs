//! Arithmetic expression fixture.
//!
//! Identifiers, integers, the four binary operators with the usual
//! precedence, and parentheses. Precedence is layered through hidden
//! chain rules, so bare operands stay bare in the tree: `a + b * c`
//! parses to `(sum (identifier) "+" (product (identifier) "*"
//! (identifier)))` with no wrapper nodes around the leaves.

use std::sync::Arc;

use arbor_syntax::{CharSet, Language, Symbol};

use crate::grammar::GrammarBuilder;
use crate::lexicon::LexiconBuilder;
use crate::LanguageBuildError;

/// The compiled arithmetic language plus the symbols tests assert on.
#[derive(Debug, Clone)]
pub struct Arithmetic {
    /// The language artifact.
    pub language: Arc<Language>,
    /// Identifier token.
    pub identifier: Symbol,
    /// Integer token.
    pub number: Symbol,
    /// Additive expression node.
    pub sum: Symbol,
    /// Multiplicative expression node.
    pub product: Symbol,
    /// Parenthesized expression node.
    pub paren_expression: Symbol,
}

/// Compiles the arithmetic fixture.
pub fn arithmetic() -> Result<Arithmetic, LanguageBuildError> {
    let mut g = GrammarBuilder::new();
    let identifier = g.token("identifier");
    let number = g.token("number");
    let plus = g.literal("+");
    let minus = g.literal("-");
    let star = g.literal("*");
    let slash = g.literal("/");
    let lparen = g.literal("(");
    let rparen = g.literal(")");
    let sum = g.rule("sum");
    let product = g.rule("product");
    let paren_expression = g.rule("paren_expression");
    let expr = g.hidden_rule("_expr");
    let additive = g.hidden_rule("_additive");
    let multiplicative = g.hidden_rule("_multiplicative");
    let primary = g.hidden_rule("_primary");

    g.production(expr, &[additive])
        .production(additive, &[sum])
        .production(additive, &[multiplicative])
        .production(sum, &[additive, plus, multiplicative])
        .production(sum, &[additive, minus, multiplicative])
        .production(multiplicative, &[product])
        .production(multiplicative, &[primary])
        .production(product, &[multiplicative, star, primary])
        .production(product, &[multiplicative, slash, primary])
        .production(primary, &[identifier])
        .production(primary, &[number])
        .production(primary, &[paren_expression])
        .production(paren_expression, &[lparen, expr, rparen])
        .start(expr);
    let (symbols, parse) = g.build()?;

    let lex = LexiconBuilder::new()
        .skip(&CharSet::new().with_chars(" \t\n"))
        .class_plus(
            identifier,
            CharSet::new()
                .with_range('a', 'z')
                .with_range('A', 'Z')
                .with_range('À', 'ÿ')
                .with_chars("_"),
        )
        .class_plus(number, CharSet::new().with_range('0', '9'))
        .literal(plus, "+")
        .literal(minus, "-")
        .literal(star, "*")
        .literal(slash, "/")
        .literal(lparen, "(")
        .literal(rparen, ")")
        .build()?;

    let language = Arc::new(Language::new(symbols, lex, parse)?);
    Ok(Arithmetic {
        language,
        identifier,
        number,
        sum,
        product,
        paren_expression,
    })
}
