//! A tiny statement language used to exercise diagnostic formatting and the
//! furthest-error heuristic across dissimilar alternatives.
use crate::{Grammar, Identifier, NumberLiteral, Parser, Rule, RuleOrKeyword};

fn expression() -> Rule {
    Rule::options([
        RuleOrKeyword::from(Rule::terminal(NumberLiteral)),
        RuleOrKeyword::from(Rule::terminal(Identifier)),
    ])
}

pub fn grammar() -> Grammar {
    let mut grammar = Grammar::new();

    grammar.add_rule(
        "SAY",
        Rule::sequence([Rule::keyword("say"), RuleOrKeyword::from(expression())]).capture("SAY"),
    );

    grammar.add_rule(
        "IF_STMT",
        Rule::sequence([
            Rule::keyword("if"),
            RuleOrKeyword::from(expression()),
            Rule::keyword("then"),
            RuleOrKeyword::from(Rule::reference("SAY")),
        ])
        .capture("IF"),
    );

    grammar.add_rule(
        "WHILE_STMT",
        Rule::sequence([
            Rule::keyword("while"),
            RuleOrKeyword::from(expression()),
            Rule::keyword("do"),
            RuleOrKeyword::from(Rule::reference("SAY")),
        ])
        .capture("WHILE"),
    );

    grammar.add_rule(
        "SCRIPT",
        Rule::options([
            RuleOrKeyword::from(Rule::reference("IF_STMT")),
            RuleOrKeyword::from(Rule::reference("WHILE_STMT")),
        ]),
    );

    grammar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_a_diagnostic_with_a_source_excerpt_and_caret() {
        let parser = Parser::new(grammar()).unwrap();
        let err = parser.parse("if x then nonsense").unwrap_err();
        assert!(err.contains("at line 1:"));
        assert!(err.contains("nonsense"));
        assert!(err.contains('^'));
    }

    /// Neither alternative matches, but `IF_STMT` gets three tokens further
    /// into the input than `WHILE_STMT` (which fails immediately on the
    /// leading keyword) before it fails. The reported error belongs to the
    /// alternative that went furthest, not the first one tried.
    #[test]
    fn the_furthest_failing_alternative_wins_the_diagnostic() {
        let parser = Parser::new(grammar()).unwrap();
        let err = parser.parse_value("if x then nonsense").unwrap_err();
        assert_eq!(err.token.unwrap().value, "nonsense");
    }

    #[test]
    fn a_complete_if_statement_parses() {
        let parser = Parser::new(grammar()).unwrap();
        let cst = parser.parse("if x then say hello").unwrap();
        assert_eq!(cst.as_node().unwrap().node_type, "IF");
    }
}
