//! `dyn-grammar` is a library for building a recursive descent parser whose
//! grammar is ordinary data rather than compiled Rust code.
//!
//! # Overview
//!
//! Most parser generators compile a grammar written in a dedicated DSL into
//! target-language source code ahead of time. This library takes a different
//! approach: a [Grammar] is a [Rule] map the host program builds and mutates
//! at run time, loaded from a config file, assembled from user input,
//! whatever the host needs, and a [Parser] interprets it directly against
//! source text, producing a concrete syntax tree ([CstValue]) or a
//! [ParseError] describing the furthest point the grammar could reach.
//!
//! # Design
//!
//! A [Rule] is an open record: `capture`, `parse`, `sequence`, `repeat`,
//! `optional`, `options`, and a bare `type_name` reference can all coexist on
//! the same value, and the engine dispatches between them in a fixed order
//! (see [Parser]'s top-level docs). This is deliberate: a `Grammar` built at
//! run time needs a data shape a host can inspect and edit field by field,
//! not a closed set of statically-typed production combinators.
//!
//! # Example
//!
//! ```
//! use dyn_grammar::{Grammar, Identifier, Parser, Rule, RuleOrKeyword};
//!
//! let mut grammar = Grammar::new();
//! grammar.add_rule(
//!     "SCRIPT",
//!     Rule::sequence([
//!         Rule::keyword("hello"),
//!         RuleOrKeyword::from(Rule::terminal(Identifier).capture("NAME")),
//!     ]),
//! );
//!
//! let parser = Parser::new(grammar).unwrap();
//! let cst = parser.parse("hello world").unwrap();
//! let name = cst.as_node().unwrap();
//! assert_eq!(name.node_type, "NAME");
//! ```
mod cst;
#[cfg(test)]
mod demos;
mod error;
mod grammar;
mod lexer;
mod parser;
mod position;
mod rule;
mod token;
mod token_stream;

pub use cst::{CstNode, CstValue};
pub use error::{ImplementationError, LexError, ParseError};
pub use grammar::Grammar;
pub use lexer::Lexer;
pub use parser::Parser;
pub use position::Position;
pub use rule::{
    Identifier, NumberLiteral, Rule, RuleOrKeyword, StringLiteral, TerminalParser, TerminalValue,
};
pub use token::{Token, TokenKind};
pub use token_stream::{Cursor, TokenStream};
