use crate::{
    CstNode, CstValue, Grammar, ImplementationError, Lexer, ParseError, Position, Rule,
    RuleOrKeyword, TerminalValue, Token, TokenStream,
};

const DEFAULT_ENTRY: &str = "SCRIPT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Log {
    Enabled,
    Disabled,
}

/// Drives a [Grammar] against source text, producing either a [CstValue] or a
/// [ParseError] describing the furthest point the grammar was able to reach.
///
/// Construction validates the grammar once (§4.2 of the design) so that a
/// dangling rule reference surfaces as an [ImplementationError] up front,
/// rather than resurfacing confusingly on every parse.
pub struct Parser {
    grammar: Grammar,
    entry: String,
    debug: Log,
}

impl Parser {
    pub fn new(grammar: Grammar) -> Result<Self, ImplementationError> {
        Self::with_entry(grammar, DEFAULT_ENTRY, false)
    }

    pub fn with_debug(grammar: Grammar, debug: bool) -> Result<Self, ImplementationError> {
        Self::with_entry(grammar, DEFAULT_ENTRY, debug)
    }

    pub fn with_entry(
        grammar: Grammar,
        entry: impl Into<String>,
        debug: bool,
    ) -> Result<Self, ImplementationError> {
        let entry = entry.into();
        grammar.validate(&entry)?;
        Ok(Self {
            grammar,
            entry,
            debug: if debug { Log::Enabled } else { Log::Disabled },
        })
    }

    /// Tokenize and parse `source` starting from the entry rule, returning a
    /// formatted diagnostic (source excerpt + caret, see §4.11) on failure.
    pub fn parse(&self, source: &str) -> Result<CstValue, String> {
        self.parse_value(source)
            .map_err(|err| self.format_error(source, &err))
    }

    /// Like [parse](Self::parse) but returns the structured [ParseError]
    /// instead of a formatted string, for callers that want to build their
    /// own diagnostics.
    pub fn parse_value(&self, source: &str) -> Result<CstValue, ParseError> {
        let keywords = self
            .grammar
            .collect_keywords(&self.entry)
            .map_err(|err| ParseError::new(err.message, None, None))?;
        let tokens = Lexer::lex(source, &keywords)?;
        let mut stream = TokenStream::new(source, tokens);
        let entry_rule = self.grammar.get(&self.entry).expect("validated at construction");
        // No implicit end-of-input check here: a successful match of the
        // entry rule is returned as-is even when tokens remain unconsumed. A
        // host that wants "whole source must be consumed" semantics
        // expresses that in the grammar itself, e.g. by making `SCRIPT` a
        // `repeat` that runs to the stream's natural end.
        self.eval_rule(entry_rule, &mut stream, None)
    }

    fn skip_trivia(&self, stream: &mut TokenStream) {
        while matches!(
            stream.peek().map(|t| t.kind),
            Some(crate::TokenKind::Comment)
        ) {
            let _ = stream.consume();
        }
    }

    fn log(&self, message: impl Fn() -> String) {
        if self.debug == Log::Enabled {
            eprintln!("{}", message());
        }
    }

    /// Evaluate `rule` at the stream's current position. Dispatch order
    /// follows §4.4: capture wraps everything else, a terminal `parse`
    /// converts a single token, `sequence` matches every child in order,
    /// `repeat` loops a fixed-point attempt, `optional` tries once and
    /// tolerates failure, `options` tries alternatives left to right with
    /// furthest-error tracking, and a bare `type_name` with none of the above
    /// is a reference to another named rule.
    ///
    /// `end_hint` is the sentinel an enclosing [sequence](Rule::sequence)
    /// expects to see right after this rule (§4.7): a wrapped [repeat](Rule::repeated)
    /// uses it to decide when to stop looping instead of running its inner
    /// shape until it outright fails. It is threaded through wrappers that
    /// don't establish a new boundary of their own (`capture`, `optional`,
    /// `options`, a bare reference) and dropped at anything that does
    /// (`sequence` computes fresh hints for its own children).
    fn eval_rule(
        &self,
        rule: &Rule,
        stream: &mut TokenStream,
        end_hint: Option<&RuleOrKeyword>,
    ) -> Result<CstValue, ParseError> {
        self.skip_trivia(stream);

        if rule.capture {
            let inner = rule.without_capture();
            let start = stream.peek().cloned();
            let value = self.eval_rule(&inner, stream, end_hint)?;
            let tag = rule
                .type_name
                .clone()
                .unwrap_or_else(|| "ANONYMOUS".to_string());
            let position = if self.debug == Log::Enabled {
                start.as_ref().map(|t| Position::new(t.line, t.column))
            } else {
                None
            };
            return Ok(CstValue::Node(CstNode::new(tag, value, position)));
        }

        if let Some(parser) = &rule.parse {
            let token = stream.consume()?;
            return parser
                .convert(&token)
                .map(|value| match value {
                    TerminalValue::Str(s) => CstValue::Str(s),
                    TerminalValue::Number(n) => CstValue::Number(n),
                })
                .map_err(|message| ParseError::new(message, Some(token), None));
        }

        if let Some(sequence) = &rule.sequence {
            return self.eval_sequence(sequence, stream);
        }

        if rule.repeat {
            return self.eval_repeat(&rule.without_repeat(), stream, end_hint);
        }

        if rule.optional {
            return self.eval_optional(&rule.without_optional(), stream, end_hint);
        }

        if let Some(options) = &rule.options {
            return self.eval_options(options, stream, end_hint);
        }

        if rule.is_pure_reference() {
            let name = rule.type_name.as_ref().unwrap();
            let referenced = self
                .grammar
                .get(name)
                .expect("validated at construction")
                .clone();
            self.log(|| format!("-> {}", name));
            return self.eval_rule(&referenced, stream, end_hint);
        }

        Err(ParseError::new(
            "Rule has no matchable field (no parse, sequence, options, or reference).",
            stream.peek().cloned(),
            None,
        ))
    }

    fn eval_rule_or_keyword(
        &self,
        item: &RuleOrKeyword,
        stream: &mut TokenStream,
        end_hint: Option<&RuleOrKeyword>,
    ) -> Result<CstValue, ParseError> {
        match item {
            RuleOrKeyword::Keyword(word) => self.eval_keyword(word, stream),
            RuleOrKeyword::Rule(rule) => self.eval_rule(rule, stream, end_hint),
        }
    }

    /// Keywords are matched case-insensitively against the next token's
    /// value and discarded from the resulting CST (they carry no
    /// information beyond their own presence). If the matched token was
    /// itself lexed as `Keyword` (i.e. it is a reserved word of this
    /// grammar), the rule string must be purely alphanumeric: a grammar
    /// author who writes a punctuation literal that happens to collide with
    /// a reserved word gets a clear error instead of a silent mismatch
    /// (§4.5).
    fn eval_keyword(&self, word: &str, stream: &mut TokenStream) -> Result<CstValue, ParseError> {
        self.skip_trivia(stream);
        match stream.peek() {
            Some(token) if token.value.eq_ignore_ascii_case(word) => {
                if token.kind == crate::TokenKind::Keyword
                    && !word.chars().all(|c| c.is_alphanumeric())
                {
                    let token = token.clone();
                    return Err(ParseError::new(
                        format!("Unexpected keyword '{}'.", word),
                        Some(token),
                        None,
                    ));
                }
                stream.consume()?;
                Ok(CstValue::None)
            }
            Some(token) => Err(ParseError::new(
                format!("Expected '{}' but found '{}'.", word, token.value),
                Some(token.clone()),
                Some(word.to_string()),
            )),
            None => Err(ParseError::unexpected_end_of_input()),
        }
    }

    /// All children must match in order. Discarded children (`CstValue::None`
    /// from a bare keyword) are dropped; exactly one remaining captured
    /// child is returned unwrapped rather than as a singleton list (§4.6).
    ///
    /// Each child is evaluated with `end_hint` set to the next child in the
    /// list (§4.7). A [repeat](Rule::repeated) nested in that child uses it
    /// to recognize the sequence's next sentinel and stop instead of trying
    /// to fold it into the repetition.
    fn eval_sequence(
        &self,
        sequence: &[RuleOrKeyword],
        stream: &mut TokenStream,
    ) -> Result<CstValue, ParseError> {
        let mut values = Vec::new();
        for (i, item) in sequence.iter().enumerate() {
            let end_hint = sequence.get(i + 1);
            let value = self.eval_rule_or_keyword(item, stream, end_hint)?;
            if !value.is_none() {
                values.push(value);
            }
        }
        match values.len() {
            0 => Ok(CstValue::None),
            1 => Ok(values.into_iter().next().unwrap()),
            _ => Ok(CstValue::List(values)),
        }
    }

    /// Loop matching `rule` until the stream is exhausted or the enclosing
    /// sequence's sentinel appears, returning everything matched so far. A
    /// repetition only ever succeeds with zero matches through one of those
    /// two exits. "Zero or more" does not mean a failed first attempt is
    /// silently accepted as "zero". Per §4.8, any failure to match `rule`
    /// while the stream still holds unconsumed, non-sentinel content sets
    /// the error's [exit](ParseError::is_exit) flag and rethrows immediately,
    /// so an enclosing [options](Rule::options) cannot mask a deep failure
    /// inside a repetition by retrying a shallower sibling alternative.
    ///
    /// Before each iteration, if the enclosing sequence passed an
    /// `end_hint`, speculatively try it at the current position (restoring
    /// the cursor either way: this is a lookahead, not a commitment). If it
    /// matches, the loop stops and leaves the sentinel for the enclosing
    /// sequence to consume, rather than risking the repeated rule itself
    /// swallowing it.
    fn eval_repeat(
        &self,
        rule: &Rule,
        stream: &mut TokenStream,
        end_hint: Option<&RuleOrKeyword>,
    ) -> Result<CstValue, ParseError> {
        let mut items = Vec::new();
        while !stream.is_at_end() {
            let checkpoint = stream.position();
            if let Some(hint) = end_hint {
                let sentinel_matches = self.eval_rule_or_keyword(hint, stream, None).is_ok();
                stream.seek(checkpoint)?;
                if sentinel_matches {
                    break;
                }
            }
            match self.eval_rule(rule, stream, None) {
                Ok(value) => {
                    if !value.is_none() {
                        items.push(value);
                    }
                    if stream.position() == checkpoint {
                        // The rule matched without consuming input; looping
                        // further would never terminate.
                        break;
                    }
                }
                Err(err) => {
                    stream.seek(checkpoint)?;
                    return Err(err.with_exit());
                }
            }
        }
        Ok(CstValue::List(items))
    }

    /// Try `rule` once; on failure, restore the cursor and succeed with
    /// `CstValue::None` rather than propagating the error. [exit](ParseError::is_exit)
    /// is never set here: an optional's failure is exactly the kind of
    /// shallow, expected non-match that an enclosing `options` is entitled
    /// to retry past, unlike a failure inside a `repeat`.
    fn eval_optional(
        &self,
        rule: &Rule,
        stream: &mut TokenStream,
        end_hint: Option<&RuleOrKeyword>,
    ) -> Result<CstValue, ParseError> {
        let checkpoint = stream.position();
        match self.eval_rule(rule, stream, end_hint) {
            Ok(value) => Ok(value),
            Err(_) => {
                stream.seek(checkpoint)?;
                Ok(CstValue::None)
            }
        }
    }

    /// Try alternatives left to right; the first to match wins outright
    /// (§4.10, leftmost-wins: `options` is not "longest match"). If every
    /// alternative fails, report the one whose failure got furthest into the
    /// token stream, since that is almost always the branch the author of
    /// the source actually intended. Ties are folded into a generalized
    /// "expected X or Y" message so no single alternative's wording is
    /// picked arbitrarily. Any failure already marked
    /// [exit](ParseError::is_exit) (originating inside a nested `repeat`) is
    /// rethrown immediately instead of being weighed against siblings.
    fn eval_options(
        &self,
        options: &[RuleOrKeyword],
        stream: &mut TokenStream,
        end_hint: Option<&RuleOrKeyword>,
    ) -> Result<CstValue, ParseError> {
        let checkpoint = stream.position();
        let end_of_input_rank = usize::MAX;
        let mut furthest: Option<ParseError> = None;
        let mut furthest_rank = 0usize;
        let mut tied_expected: Vec<String> = Vec::new();

        for item in options {
            stream.seek(checkpoint)?;
            match self.eval_rule_or_keyword(item, stream, end_hint) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if err.is_exit() {
                        return Err(err);
                    }
                    let rank = err.rank(end_of_input_rank);
                    match rank.cmp(&furthest_rank) {
                        std::cmp::Ordering::Greater if furthest.is_some() => {
                            furthest_rank = rank;
                            tied_expected = err.expected.clone().into_iter().collect();
                            furthest = Some(err);
                        }
                        std::cmp::Ordering::Equal if furthest.is_some() => {
                            if let Some(expected) = &err.expected {
                                tied_expected.push(expected.clone());
                            }
                        }
                        _ if furthest.is_none() => {
                            furthest_rank = rank;
                            tied_expected = err.expected.clone().into_iter().collect();
                            furthest = Some(err);
                        }
                        _ => {}
                    }
                }
            }
        }

        stream.seek(checkpoint)?;
        let mut err = furthest.unwrap_or_else(ParseError::unexpected_end_of_input);
        tied_expected.dedup();
        if tied_expected.len() > 1 {
            let found = err
                .token
                .as_ref()
                .map(|t| t.value.clone())
                .unwrap_or_else(|| "end of input".to_string());
            err.message = format!("Expected {} but found '{}'.", tied_expected.join(" or "), found);
        }
        Err(err)
    }

    fn format_error(&self, source: &str, err: &ParseError) -> String {
        let stream = TokenStream::new(source, Vec::new());
        match &err.token {
            Some(token) => {
                let excerpt = stream.get_lines_of_code(token.line.saturating_sub(2).max(1), token.line);
                let gutter = stream.gutter_width(token.line);
                let caret = format!("{}{}", " ".repeat(gutter + token.column.saturating_sub(1)), "^");
                format!(
                    "{} at line {}:{}\n\n{}\n{}",
                    err.message, token.line, token.column, excerpt, caret
                )
            }
            None => format!("{} at end of input", err.message),
        }
    }
}
