//! Right-recursive binary expressions with `*` binding tighter than `+`.
//!
//! Grammars built from named references (rather than nested closures) are
//! how a recursive grammar is expressed at all: `ADDITIVE` refers to
//! `MULTIPLICATIVE` and `MULTIPLICATIVE` refers to itself, purely by name,
//! resolved at parse time against the [Grammar] map rather than at
//! construction time against a Rust value.
use crate::{Grammar, NumberLiteral, Parser, Rule, RuleOrKeyword};

pub fn grammar() -> Grammar {
    let mut grammar = Grammar::new();

    grammar.add_rule("NUMBER", Rule::terminal(NumberLiteral).capture("NUMBER"));

    grammar.add_rule(
        "MULTIPLICATIVE",
        Rule::options([
            RuleOrKeyword::from(
                Rule::sequence([
                    RuleOrKeyword::from(Rule::reference("NUMBER")),
                    Rule::keyword("*"),
                    RuleOrKeyword::from(Rule::reference("MULTIPLICATIVE")),
                ])
                .capture("MUL"),
            ),
            RuleOrKeyword::from(Rule::reference("NUMBER")),
        ]),
    );

    grammar.add_rule(
        "ADDITIVE",
        Rule::options([
            RuleOrKeyword::from(
                Rule::sequence([
                    RuleOrKeyword::from(Rule::reference("MULTIPLICATIVE")),
                    Rule::keyword("+"),
                    RuleOrKeyword::from(Rule::reference("ADDITIVE")),
                ])
                .capture("ADD"),
            ),
            RuleOrKeyword::from(Rule::reference("MULTIPLICATIVE")),
        ]),
    );

    grammar.add_rule("SCRIPT", Rule::reference("ADDITIVE"));

    grammar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let parser = Parser::new(grammar()).unwrap();
        // The right operand of the addition is itself a multiplication node,
        // not a bare number, so "*" grouped its operands before "+" did.
        let cst = parser.parse("1 + 2 * 3").unwrap();
        let add = cst.as_node().unwrap();
        assert_eq!(add.node_type, "ADD");
        let children = add.children();
        assert_eq!(children[0].node_type, "NUMBER");
        assert_eq!(children[1].node_type, "MUL");
    }

    #[test]
    fn a_single_number_parses_without_any_operator() {
        let parser = Parser::new(grammar()).unwrap();
        let cst = parser.parse("42").unwrap();
        assert_eq!(cst.as_node().unwrap().node_type, "NUMBER");
    }
}
