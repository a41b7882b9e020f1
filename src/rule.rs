use crate::Token;
use std::fmt::Debug;
use std::rc::Rc;

#[derive(Debug, Clone)]
/// The value produced by a [TerminalParser].
pub enum TerminalValue {
    Str(String),
    Number(f64),
}

/// A terminal rule's conversion callback: takes the consumed [Token] and
/// returns either a scalar value or an error message.
///
/// Built-in implementations cover the common cases (string unquoting,
/// numeric conversion, identifier passthrough); [Rule::terminal_fn] wraps an
/// arbitrary closure for anything more specific a grammar needs.
pub trait TerminalParser: Debug {
    fn convert(&self, token: &Token) -> Result<TerminalValue, String>;
}

#[derive(Debug, Default, Clone, Copy)]
/// Strips the surrounding quotes from a `String` token.
pub struct StringLiteral;

impl TerminalParser for StringLiteral {
    fn convert(&self, token: &Token) -> Result<TerminalValue, String> {
        let value = &token.value;
        let unquoted = if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            &value[1..value.len() - 1]
        } else {
            value.as_str()
        };
        Ok(TerminalValue::Str(unquoted.to_string()))
    }
}

#[derive(Debug, Default, Clone, Copy)]
/// Converts a `Number` token's lexeme into an `f64`.
pub struct NumberLiteral;

impl TerminalParser for NumberLiteral {
    fn convert(&self, token: &Token) -> Result<TerminalValue, String> {
        token
            .value
            .parse::<f64>()
            .map(TerminalValue::Number)
            .map_err(|_| format!("'{}' is not a valid number.", token.value))
    }
}

#[derive(Debug, Default, Clone, Copy)]
/// Returns a token's lexeme unchanged.
pub struct Identifier;

impl TerminalParser for Identifier {
    fn convert(&self, token: &Token) -> Result<TerminalValue, String> {
        Ok(TerminalValue::Str(token.value.clone()))
    }
}

struct FnTerminal<F>(F);

impl<F> Debug for FnTerminal<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnTerminal")
    }
}

impl<F: Fn(&Token) -> Result<TerminalValue, String>> TerminalParser for FnTerminal<F> {
    fn convert(&self, token: &Token) -> Result<TerminalValue, String> {
        (self.0)(token)
    }
}

#[derive(Clone)]
/// Either a bare keyword literal (matched case-insensitively against the
/// next token's value) or a nested [Rule]. This is the element type of a
/// [sequence](Rule::sequence) or [options](Rule::options) list.
pub enum RuleOrKeyword {
    Keyword(String),
    Rule(Rc<Rule>),
}

impl From<Rule> for RuleOrKeyword {
    fn from(rule: Rule) -> Self {
        RuleOrKeyword::Rule(Rc::new(rule))
    }
}
impl From<Rc<Rule>> for RuleOrKeyword {
    fn from(rule: Rc<Rule>) -> Self {
        RuleOrKeyword::Rule(rule)
    }
}
impl From<&str> for RuleOrKeyword {
    fn from(word: &str) -> Self {
        RuleOrKeyword::Keyword(word.to_string())
    }
}
impl From<String> for RuleOrKeyword {
    fn from(word: String) -> Self {
        RuleOrKeyword::Keyword(word)
    }
}

#[derive(Clone, Default)]
/// A grammar rule.
///
/// Fields are deliberately an open record rather than a tagged enum: a
/// `Grammar` is built and edited by a host at run time, and the engine's
/// dispatch order (§4.4 of the design: `capture`, then `parse`, then
/// `sequence`, then `repeat`, then `optional`, then `options`, then a bare
/// `type` reference) is part of the contract, driven by which fields are
/// present on a single record rather than by a variant tag. The builder
/// methods below exist purely for ergonomic construction; they do not
/// change this shape.
pub struct Rule {
    /// Name of another rule (reference) or the tag used to label the CST
    /// node emitted when `capture` is set.
    pub type_name: Option<String>,
    pub capture: bool,
    pub parse: Option<Rc<dyn TerminalParser>>,
    pub sequence: Option<Vec<RuleOrKeyword>>,
    pub options: Option<Vec<RuleOrKeyword>>,
    pub repeat: bool,
    pub optional: bool,
    /// Accepted but not enforced by the dispatcher (see §9 design note and
    /// DESIGN.md): a grammar-authoring hint surfaced through
    /// [Grammar::build_grammar](crate::Grammar::build_grammar), never
    /// consumed during matching.
    pub separator: Option<String>,
}

impl Rule {
    /// A bare keyword literal, matched case-insensitively.
    pub fn keyword(word: impl Into<String>) -> RuleOrKeyword {
        RuleOrKeyword::Keyword(word.into())
    }

    /// A reference to another named rule in the [Grammar](crate::Grammar).
    pub fn reference(name: impl Into<String>) -> Rule {
        Rule {
            type_name: Some(name.into()),
            ..Default::default()
        }
    }

    /// A terminal rule backed by a [TerminalParser].
    pub fn terminal<P: TerminalParser + 'static>(parser: P) -> Rule {
        Rule {
            parse: Some(Rc::new(parser)),
            ..Default::default()
        }
    }

    /// A terminal rule backed by a plain closure.
    pub fn terminal_fn<F>(f: F) -> Rule
    where
        F: Fn(&Token) -> Result<TerminalValue, String> + 'static,
    {
        Rule {
            parse: Some(Rc::new(FnTerminal(f))),
            ..Default::default()
        }
    }

    /// An ordered sequence, all of whose children must match in order.
    pub fn sequence(children: impl IntoIterator<Item = impl Into<RuleOrKeyword>>) -> Rule {
        Rule {
            sequence: Some(children.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// Ordered alternatives; the first that matches wins (leftmost-wins, see
    /// §4.10 of the design).
    pub fn options(children: impl IntoIterator<Item = impl Into<RuleOrKeyword>>) -> Rule {
        Rule {
            options: Some(children.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// Wrap the result of the remaining fields in a CST node tagged `tag`.
    pub fn capture(mut self, tag: impl Into<String>) -> Rule {
        self.capture = true;
        self.type_name = Some(tag.into());
        self
    }

    /// Match zero or more occurrences.
    pub fn repeated(mut self) -> Rule {
        self.repeat = true;
        self
    }

    /// Match zero or one occurrence without failing the parent.
    pub fn optional(mut self) -> Rule {
        self.optional = true;
        self
    }

    /// Attach a separator hint to a repeated rule (see `separator` field docs).
    pub fn with_separator(mut self, separator: impl Into<String>) -> Rule {
        self.separator = Some(separator.into());
        self
    }

    pub(crate) fn without_capture(&self) -> Rule {
        let mut clone = self.clone();
        clone.capture = false;
        clone
    }

    pub(crate) fn without_repeat(&self) -> Rule {
        let mut clone = self.clone();
        clone.repeat = false;
        clone
    }

    pub(crate) fn without_optional(&self) -> Rule {
        let mut clone = self.clone();
        clone.optional = false;
        clone
    }

    /// True exactly when this rule is dispatch case 10 of §4.4: a bare
    /// reference to another named rule, with no other field in play.
    pub(crate) fn is_pure_reference(&self) -> bool {
        !self.capture
            && self.parse.is_none()
            && self.sequence.is_none()
            && !self.repeat
            && !self.optional
            && self.options.is_none()
            && self.type_name.is_some()
    }

    /// The name this rule ultimately resolves to via dispatch case 10,
    /// ignoring `repeat`/`optional` wrapping. Unlike [is_pure_reference](Self::is_pure_reference),
    /// this still reports a name for `Rule::reference("X").repeated()` or
    /// `.optional()`: those wrappers don't change *what* is referenced, only
    /// how many times or whether it must match, so grammar-wide walks
    /// (keyword extraction, reference validation) need to follow them too,
    /// unlike `capture`/`parse`/`sequence`/`options`, which are checked
    /// earlier in the dispatch chain and would consume the match before a
    /// reference is ever considered.
    pub(crate) fn references_name(&self) -> Option<&str> {
        if !self.capture && self.parse.is_none() && self.sequence.is_none() && self.options.is_none()
        {
            self.type_name.as_deref()
        } else {
            None
        }
    }
}
