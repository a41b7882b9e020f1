//! The smallest possible grammar: a keyword followed by a captured noun.
use crate::{Grammar, Identifier, Parser, Rule, RuleOrKeyword};

pub fn grammar() -> Grammar {
    let mut grammar = Grammar::new();
    grammar.add_rule(
        "SCRIPT",
        Rule::sequence([
            Rule::keyword("hello"),
            RuleOrKeyword::from(Rule::terminal(Identifier).capture("NOUN")),
        ]),
    );
    grammar
}

/// A `SCRIPT` that is a bare repetition of greeting statements: a top-level
/// `repeat` entry's CST list length tracks the number of statements in the
/// source, and comments between them leave no trace in the tree.
pub fn script_of_greetings() -> Grammar {
    let mut grammar = Grammar::new();
    grammar.add_rule(
        "GREETING",
        Rule::sequence([
            Rule::keyword("hello"),
            RuleOrKeyword::from(Rule::terminal(Identifier).capture("NOUN")),
        ])
        .capture("hello"),
    );
    grammar.add_rule("SCRIPT", Rule::reference("GREETING").repeated());
    grammar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_a_greeting() {
        let parser = Parser::new(grammar()).unwrap();
        let cst = parser.parse("hello world").unwrap();
        let noun = cst.as_node().unwrap();
        assert_eq!(noun.node_type, "NOUN");
        assert_eq!(noun.value.as_str(), Some("world"));
    }

    #[test]
    fn trailing_input_is_left_unconsumed_rather_than_an_error() {
        // Entry-rule parsing does not implicitly require the whole source
        // to be consumed.
        let parser = Parser::new(grammar()).unwrap();
        let cst = parser.parse("hello world and then some").unwrap();
        assert_eq!(cst.as_node().unwrap().value.as_str(), Some("world"));
    }

    #[test]
    fn comments_are_transparent_to_matching() {
        let parser = Parser::new(grammar()).unwrap();
        let cst = parser.parse("hello // the addressee\nworld").unwrap();
        assert_eq!(cst.as_node().unwrap().value.as_str(), Some("world"));
    }

    #[test]
    fn a_repeated_entry_rule_yields_one_node_per_statement_with_comments_elided() {
        let parser = Parser::new(script_of_greetings()).unwrap();
        let cst = parser
            .parse_value("// greet\nhello world\n// done\nhello world")
            .unwrap();
        let greetings = cst.as_list().unwrap();
        assert_eq!(greetings.len(), 2);
        for greeting in greetings {
            let node = greeting.as_node().unwrap();
            assert_eq!(node.node_type, "hello");
            let noun = node.value.as_node().unwrap();
            assert_eq!(noun.node_type, "NOUN");
            assert_eq!(noun.value.as_str(), Some("world"));
        }
    }
}
