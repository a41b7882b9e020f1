use crate::{LexError, Token, TokenKind};
use std::collections::HashSet;

const OPERATOR_CHARS: &str = "+-*/><=%";
const BRACKET_CHARS: &str = "()[]{}";

/// Stateless left-to-right scanner that splits source text into [Token]s.
///
/// The keyword set is supplied by the caller (the [Parser](crate::Parser)
/// extracts it from the [Grammar](crate::Grammar) before lexing, see §4.3 of
/// the design) so the lexer itself stays grammar-agnostic.
pub struct Lexer;

impl Lexer {
    /// Tokenize `source`, returning every token including `Whitespace` (the
    /// [TokenStream](crate::TokenStream) filters those out afterwards).
    /// Keyword lookup is case-sensitive: a keyword `"Hello"` in the grammar
    /// will not turn a lexeme `hello` into a `Keyword` token here, even
    /// though the engine's later keyword match is itself case-insensitive.
    /// This mismatch is deliberate, see §9 of the design notes.
    pub fn lex(source: &str, keywords: &HashSet<String>) -> Result<Vec<Token>, LexError> {
        let chars: Vec<char> = source.chars().collect();
        let mut pos = 0usize;
        let mut line = 1usize;
        let mut column = 1usize;
        let mut tokens = Vec::new();

        while pos < chars.len() {
            let start_index = pos;
            let start_line = line;
            let start_column = column;
            let c = chars[pos];

            if c.is_whitespace() {
                let mut value = String::new();
                while pos < chars.len() && chars[pos].is_whitespace() {
                    let ch = chars[pos];
                    value.push(ch);
                    pos += 1;
                    if ch == '\n' {
                        line += 1;
                        column = 1;
                    } else {
                        column += 1;
                    }
                }
                tokens.push(Token::new(
                    TokenKind::Whitespace,
                    value,
                    start_line,
                    start_column,
                    start_index,
                ));
                continue;
            }

            if c == '/' && chars.get(pos + 1) == Some(&'/') {
                let mut value = String::new();
                while pos < chars.len() && chars[pos] != '\n' {
                    value.push(chars[pos]);
                    pos += 1;
                    column += 1;
                }
                tokens.push(Token::new(
                    TokenKind::Comment,
                    value,
                    start_line,
                    start_column,
                    start_index,
                ));
                continue;
            }

            let is_sign = c == '+' || c == '-';
            let starts_number = c.is_ascii_digit()
                || (is_sign && chars.get(pos + 1).is_some_and(|n| n.is_ascii_digit()));
            if starts_number {
                let mut value = String::new();
                if is_sign {
                    value.push(c);
                    pos += 1;
                    column += 1;
                }
                while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                    value.push(chars[pos]);
                    pos += 1;
                    column += 1;
                }
                tokens.push(Token::new(
                    TokenKind::Number,
                    value,
                    start_line,
                    start_column,
                    start_index,
                ));
                continue;
            }

            if c == '"' {
                let mut value = String::new();
                value.push(c);
                pos += 1;
                column += 1;
                loop {
                    if pos >= chars.len() {
                        return Err(LexError::new(
                            start_line,
                            start_column,
                            "Unterminated string literal.",
                        ));
                    }
                    let ch = chars[pos];
                    value.push(ch);
                    pos += 1;
                    if ch == '\n' {
                        line += 1;
                        column = 1;
                    } else {
                        column += 1;
                    }
                    if ch == '"' {
                        break;
                    }
                }
                tokens.push(Token::new(
                    TokenKind::String,
                    value,
                    start_line,
                    start_column,
                    start_index,
                ));
                continue;
            }

            if OPERATOR_CHARS.contains(c) {
                pos += 1;
                column += 1;
                tokens.push(Token::new(
                    TokenKind::Operator,
                    c.to_string(),
                    start_line,
                    start_column,
                    start_index,
                ));
                continue;
            }

            if BRACKET_CHARS.contains(c) {
                pos += 1;
                column += 1;
                tokens.push(Token::new(
                    TokenKind::Bracket,
                    c.to_string(),
                    start_line,
                    start_column,
                    start_index,
                ));
                continue;
            }

            if c.is_ascii_alphabetic() {
                let mut value = String::new();
                while pos < chars.len() && chars[pos].is_ascii_alphanumeric() {
                    value.push(chars[pos]);
                    pos += 1;
                    column += 1;
                }
                let kind = if keywords.contains(&value) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Identifier
                };
                tokens.push(Token::new(kind, value, start_line, start_column, start_index));
                continue;
            }

            // Unknown single character: skipped, not emitted.
            pos += 1;
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }

        Ok(tokens)
    }
}
