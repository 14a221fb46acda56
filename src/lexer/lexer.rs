use thiserror::Error;
use super::token::{Token, TokenKind};

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum LexError {
    #[error("Unterminated quote starting at position {0}")]
    UnterminatedQuote(usize),
}

/// Splits one line of input into words and operators.
///
/// A backslash makes the next character literal, double quotes group text
/// (including spaces and operator characters) into the current word, and
/// neither the backslash nor the quotes survive into the output.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    tokens: Vec<Token>,
    buf: String,
    word_start: Option<usize>,
    quote_start: Option<usize>,
    escaped: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            chars: input.chars().collect(),
            pos: 0,
            tokens: Vec::new(),
            buf: String::new(),
            word_start: None,
            quote_start: None,
            escaped: false,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        while self.pos < self.chars.len() {
            let ch = self.chars[self.pos];

            if self.escaped {
                self.buf.push(ch);
                self.escaped = false;
                self.pos += 1;
                continue;
            }

            let in_quotes = self.quote_start.is_some();
            match ch {
                '\\' => {
                    self.mark_word();
                    self.escaped = true;
                }
                '"' => {
                    self.mark_word();
                    self.quote_start = match self.quote_start {
                        Some(_) => None,
                        None => Some(self.pos),
                    };
                }
                '|' | '>' | '<' | '&' | ';' if !in_quotes => {
                    self.flush_word();
                    self.push_operator(ch);
                }
                ' ' | '\t' if !in_quotes => self.flush_word(),
                _ => {
                    self.mark_word();
                    self.buf.push(ch);
                }
            }
            self.pos += 1;
        }

        self.flush_word();

        if let Some(start) = self.quote_start {
            return Err(LexError::UnterminatedQuote(start));
        }
        Ok(self.tokens)
    }

    fn mark_word(&mut self) {
        if self.word_start.is_none() {
            self.word_start = Some(self.pos);
        }
    }

    // Quotes or escapes with no content (`""`) never produce an empty word.
    fn flush_word(&mut self) {
        let start = self.word_start.take();
        if self.buf.is_empty() {
            return;
        }
        let lexeme = std::mem::take(&mut self.buf);
        self.tokens.push(Token::word(lexeme, (start.unwrap_or(self.pos), self.pos)));
    }

    fn push_operator(&mut self, ch: char) {
        let start = self.pos;
        let kind = match ch {
            '|' => TokenKind::Pipe,
            '<' => TokenKind::RedirectIn,
            '&' => TokenKind::Background,
            ';' => TokenKind::Semicolon,
            _ if self.chars.get(self.pos + 1) == Some(&'>') => {
                self.pos += 1;
                TokenKind::RedirectAppend
            }
            _ => TokenKind::RedirectOut,
        };
        self.tokens.push(Token::operator(kind, start));
    }
}
