use crate::{ImplementationError, Rule, RuleOrKeyword};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Clone, Default)]
/// A named set of [Rule]s, built and mutated by the host at run time.
///
/// `Grammar` itself performs no matching; it is a data container that the
/// [Parser](crate::Parser) interprets. The only work it does is bookkeeping
/// that is naturally grammar-wide rather than rule-local: collecting the
/// keyword set the [Lexer](crate::Lexer) needs, and validating that every
/// bare reference resolves to a name that actually exists in the map.
pub struct Grammar {
    rules: HashMap<String, Rc<Rule>>,
}

impl Grammar {
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Insert or replace the rule named `name`.
    pub fn add_rule(&mut self, name: impl Into<String>, rule: impl Into<Rc<Rule>>) -> &mut Self {
        self.rules.insert(name.into(), rule.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Rc<Rule>> {
        self.rules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(|k| k.as_str())
    }

    /// Walk every rule reachable from `entry`, collecting the literal
    /// `RuleOrKeyword::Keyword` strings that appear in any `sequence` or
    /// `options` list. The result feeds the [Lexer](crate::Lexer) so it can
    /// tell keywords apart from plain identifiers before any matching starts.
    pub fn collect_keywords(&self, entry: &str) -> Result<HashSet<String>, ImplementationError> {
        let mut keywords = HashSet::new();
        let mut visited = HashSet::new();
        self.walk_keywords(entry, &mut keywords, &mut visited)?;
        Ok(keywords)
    }

    fn walk_keywords(
        &self,
        name: &str,
        keywords: &mut HashSet<String>,
        visited: &mut HashSet<String>,
    ) -> Result<(), ImplementationError> {
        if !visited.insert(name.to_string()) {
            return Ok(());
        }
        let rule = self.rules.get(name).ok_or_else(|| {
            ImplementationError::new(
                name.to_string(),
                format!("Rule '{}' is referenced but not defined in the grammar.", name),
            )
        })?;
        self.walk_rule_keywords(rule, keywords, visited)
    }

    fn walk_rule_keywords(
        &self,
        rule: &Rule,
        keywords: &mut HashSet<String>,
        visited: &mut HashSet<String>,
    ) -> Result<(), ImplementationError> {
        for list in [&rule.sequence, &rule.options].into_iter().flatten() {
            for item in list {
                match item {
                    RuleOrKeyword::Keyword(word) => {
                        keywords.insert(word.clone());
                    }
                    RuleOrKeyword::Rule(nested) => {
                        if let Some(name) = nested.references_name() {
                            self.walk_keywords(name, keywords, visited)?;
                        } else {
                            self.walk_rule_keywords(nested, keywords, visited)?;
                        }
                    }
                }
            }
        }
        if let Some(name) = rule.references_name() {
            self.walk_keywords(name, keywords, visited)?;
        }
        Ok(())
    }

    /// Confirm every bare reference reachable from `entry` resolves to a rule
    /// that actually exists in this grammar. Run once at
    /// [Parser::new](crate::Parser::new) time so a misconfigured grammar
    /// fails fast with a named rule rather than as a confusing parse-time
    /// panic or an endlessly propagating `None`.
    pub fn validate(&self, entry: &str) -> Result<(), ImplementationError> {
        if !self.rules.contains_key(entry) {
            return Err(ImplementationError::new(
                entry.to_string(),
                format!("Entry rule '{}' is not defined in the grammar.", entry),
            ));
        }
        let mut visited = HashSet::new();
        self.validate_rule(entry, &mut visited)
    }

    fn validate_rule(
        &self,
        name: &str,
        visited: &mut HashSet<String>,
    ) -> Result<(), ImplementationError> {
        if !visited.insert(name.to_string()) {
            return Ok(());
        }
        let rule = self.rules.get(name).ok_or_else(|| {
            ImplementationError::new(
                name.to_string(),
                format!("Rule '{}' is referenced but not defined in the grammar.", name),
            )
        })?;
        self.validate_nested(rule, visited)
    }

    fn validate_nested(
        &self,
        rule: &Rule,
        visited: &mut HashSet<String>,
    ) -> Result<(), ImplementationError> {
        if let Some(name) = rule.references_name() {
            return self.validate_rule(name, visited);
        }
        for list in [&rule.sequence, &rule.options].into_iter().flatten() {
            for item in list {
                if let RuleOrKeyword::Rule(nested) = item {
                    self.validate_nested(nested, visited)?;
                }
            }
        }
        Ok(())
    }

    /// Render the rule set as a human-readable listing, one line per rule,
    /// useful for a host inspecting a grammar it assembled programmatically.
    pub fn build_grammar(&self) -> String {
        let mut names: Vec<&String> = self.rules.keys().collect();
        names.sort();
        let mut out = String::new();
        for name in names {
            let rule = &self.rules[name];
            out.push_str(&format!("{} := {}\n", name, describe(rule)));
        }
        out
    }
}

fn describe(rule: &Rule) -> String {
    let mut parts = Vec::new();
    if let Some(seq) = &rule.sequence {
        parts.push(format!("sequence({})", describe_list(seq)));
    }
    if let Some(opts) = &rule.options {
        parts.push(format!("options({})", describe_list(opts)));
    }
    if rule.parse.is_some() {
        parts.push("terminal".to_string());
    }
    if let Some(name) = rule.references_name() {
        parts.push(format!("ref({})", name));
    }
    if rule.repeat {
        parts.push("repeated".to_string());
    }
    if rule.optional {
        parts.push("optional".to_string());
    }
    if let Some(sep) = &rule.separator {
        parts.push(format!("separator({:?})", sep));
    }
    if rule.capture {
        parts.push(format!(
            "capture({:?})",
            rule.type_name.as_deref().unwrap_or("?")
        ));
    }
    if parts.is_empty() {
        "<empty>".to_string()
    } else {
        parts.join(" ")
    }
}

fn describe_list(list: &[RuleOrKeyword]) -> String {
    list.iter()
        .map(|item| match item {
            RuleOrKeyword::Keyword(word) => format!("{:?}", word),
            RuleOrKeyword::Rule(rule) => {
                if rule.is_pure_reference() {
                    rule.type_name.clone().unwrap_or_default()
                } else {
                    format!("({})", describe(rule))
                }
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_keywords_from_sequence_and_options() {
        let mut grammar = Grammar::new();
        grammar.add_rule(
            "GREETING",
            Rule::sequence([Rule::keyword("hello"), Rule::reference("NAME").into()]),
        );
        grammar.add_rule(
            "NAME",
            Rule::options([Rule::keyword("world"), Rule::keyword("there")]),
        );
        let keywords = grammar.collect_keywords("GREETING").unwrap();
        assert_eq!(
            keywords,
            HashSet::from(["hello".to_string(), "world".to_string(), "there".to_string()])
        );
    }

    #[test]
    fn validate_rejects_dangling_reference() {
        let mut grammar = Grammar::new();
        grammar.add_rule("ENTRY", Rule::reference("MISSING"));
        let err = grammar.validate("ENTRY").unwrap_err();
        assert_eq!(err.what, "MISSING");
    }

    #[test]
    fn validate_rejects_missing_entry() {
        let grammar = Grammar::new();
        assert!(grammar.validate("ENTRY").is_err());
    }

    #[test]
    fn validate_accepts_well_formed_grammar() {
        let mut grammar = Grammar::new();
        grammar.add_rule("ENTRY", Rule::sequence([Rule::keyword("hi")]));
        assert!(grammar.validate("ENTRY").is_ok());
    }

    #[test]
    fn collects_keywords_through_a_repeated_entry_reference() {
        // The common `SCRIPT := repeat(STATEMENT)` shape: `.repeated()`/
        // `.optional()` must not block the grammar-wide walk from following
        // the wrapped reference.
        let mut grammar = Grammar::new();
        grammar.add_rule("SCRIPT", Rule::reference("STATEMENT").repeated());
        grammar.add_rule("STATEMENT", Rule::sequence([Rule::keyword("say")]));
        let keywords = grammar.collect_keywords("SCRIPT").unwrap();
        assert_eq!(keywords, HashSet::from(["say".to_string()]));
    }

    #[test]
    fn validate_follows_a_repeated_reference_to_a_dangling_rule() {
        let mut grammar = Grammar::new();
        grammar.add_rule("SCRIPT", Rule::reference("STATEMENT").repeated());
        let err = grammar.validate("SCRIPT").unwrap_err();
        assert_eq!(err.what, "STATEMENT");
    }

    #[test]
    fn build_grammar_renders_every_rule() {
        let mut grammar = Grammar::new();
        grammar.add_rule("A", Rule::sequence([Rule::keyword("x")]));
        grammar.add_rule("B", Rule::reference("A"));
        let rendered = grammar.build_grammar();
        assert!(rendered.contains("A := sequence"));
        assert!(rendered.contains("B := ref(A)"));
    }
}
