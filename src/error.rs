use crate::Token;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone)]
/// An error returned when a grammar is misconstructed by the host: a dangling
/// rule reference, a missing entry rule, or an otherwise ill-formed [Rule](crate::Rule).
///
/// This is distinct from [ParseError]: it reports a bug in the grammar itself,
/// not a syntax error in the parsed source.
pub struct ImplementationError {
    pub what: String,
    pub message: String,
}

impl ImplementationError {
    pub fn new(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            message: message.into(),
        }
    }
}

impl Display for ImplementationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ImplementationError: {}-{}", self.what, self.message)
    }
}

impl std::error::Error for ImplementationError {}

#[derive(Debug, Clone)]
/// A fatal error raised while splitting source text into tokens, e.g. an
/// unterminated string literal.
pub struct LexError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl LexError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

impl Display for LexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LexError: {} at line {}:{}",
            self.message, self.line, self.column
        )
    }
}

impl std::error::Error for LexError {}

#[derive(Debug, Clone)]
/// An error raised while matching the grammar against the token stream.
///
/// `token` is the offending token, when one was consumed or peeked at the
/// point of failure. `expected` is a short human description of what the
/// production wanted to see there, used by callers that want to build their
/// own diagnostics instead of the formatted [message](ParseError::message).
///
/// `exit` is set internally whenever the failure originates inside a
/// [repeated](crate::Rule::repeated) production (see §4.8 of the design):
/// once set, [options](crate::Rule::options) stop trying sibling
/// alternatives and propagate the error unchanged, rather than risk masking
/// a deep, clearly-wrong branch with a shallower retry.
pub struct ParseError {
    pub message: String,
    pub token: Option<Token>,
    pub expected: Option<String>,
    pub(crate) exit: bool,
}

impl ParseError {
    pub fn new(
        message: impl Into<String>,
        token: Option<Token>,
        expected: Option<String>,
    ) -> Self {
        Self {
            message: message.into(),
            token,
            expected,
            exit: false,
        }
    }

    pub fn unexpected_end_of_input() -> Self {
        Self::new("Unexpected end of input.", None, None)
    }

    pub(crate) fn with_exit(mut self) -> Self {
        self.exit = true;
        self
    }

    /// Whether this failure must not be masked by an enclosing alternation.
    pub fn is_exit(&self) -> bool {
        self.exit
    }

    /// Token index used to rank "how deep" a failed alternative got, for the
    /// furthest-error heuristic in [options](crate::Rule::options).
    pub(crate) fn rank(&self, end_of_input_rank: usize) -> usize {
        self.token.as_ref().map_or(end_of_input_rank, |t| t.index)
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SyntaxError: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::new(
            format!("{} at line {}:{}", err.message, err.line, err.column),
            None,
            None,
        )
    }
}
