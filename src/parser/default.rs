use crate::ast::{Command, Redirect};
use crate::lexer::{Token, TokenKind};
use super::{ParseError, Parser};
use super::validate::validate;

/// Single left-to-right scan that keeps one command under construction.
pub struct DefaultParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    commands: Vec<Command>,
    current: Command,
}

impl<'a> DefaultParser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            commands: Vec::new(),
            current: Command::default(),
        }
    }

    fn next(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect_target(&mut self, op: &Token) -> Result<String, ParseError> {
        match self.next() {
            Some(tok) if tok.is_word() => Ok(tok.lexeme.clone()),
            _ => Err(ParseError::MissingRedirectionTarget {
                operator: op.lexeme.clone(),
                pos: op.span.0,
            }),
        }
    }

    fn commit(&mut self) {
        let cmd = std::mem::take(&mut self.current);
        self.commands.push(cmd);
    }

    // Background is a property of the whole pipeline: flag the just-committed
    // command and every stage feeding into it.
    fn mark_background(&mut self) {
        for cmd in self.commands.iter_mut().rev() {
            cmd.is_background = true;
            if !cmd.is_pipe_end {
                break;
            }
        }
    }

    fn step(&mut self, tok: &'a Token) -> Result<(), ParseError> {
        match tok.kind {
            TokenKind::Pipe => {
                if self.current.tokens.is_empty() {
                    return Err(ParseError::EmptyPipeSegment { pos: tok.span.0 });
                }
                self.current.is_pipe_start = true;
                self.commit();
                self.current.is_pipe_end = true;
            }
            TokenKind::Background => {
                if !self.current.is_empty() {
                    self.commit();
                } else if std::mem::take(&mut self.current).is_pipe_end {
                    // `a | &` closes the dangling pipe, `a` no longer feeds anything
                    if let Some(last) = self.commands.last_mut() {
                        last.is_pipe_start = false;
                    }
                }
                self.mark_background();
            }
            TokenKind::RedirectOut | TokenKind::RedirectAppend => {
                let path = self.expect_target(tok)?;
                let append = tok.kind == TokenKind::RedirectAppend;
                self.current.redirect_output = Some(Redirect::output(path, append));
            }
            TokenKind::RedirectIn => {
                let path = self.expect_target(tok)?;
                self.current.redirect_input = Some(Redirect::input(path));
            }
            TokenKind::Semicolon => {
                if !self.current.is_empty() {
                    self.commit();
                }
            }
            TokenKind::Word => self.current.tokens.push(tok.lexeme.clone()),
        }
        Ok(())
    }
}

impl<'a> Parser for DefaultParser<'a> {
    fn parse(&mut self) -> Result<Vec<Command>, ParseError> {
        while let Some(tok) = self.next() {
            self.step(tok)?;
        }
        if !self.current.is_empty() {
            self.commit();
        }

        let commands = std::mem::take(&mut self.commands);
        for cmd in &commands {
            validate(cmd).map_err(ParseError::InvalidCommandStructure)?;
        }
        Ok(commands)
    }
}
