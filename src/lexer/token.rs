#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,           // Argument text, quotes and escapes already resolved
    Pipe,           // |
    RedirectOut,    // >
    RedirectAppend, // >>
    RedirectIn,     // <
    Background,     // &
    Semicolon,      // ;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,       // Resolved text
    pub span: (usize, usize), // Char positions in the source line [start, end)
}

impl Token {
    pub fn word(lexeme: impl Into<String>, span: (usize, usize)) -> Self {
        Token {
            kind: TokenKind::Word,
            lexeme: lexeme.into(),
            span,
        }
    }

    pub fn operator(kind: TokenKind, start: usize) -> Self {
        let lexeme = match kind {
            TokenKind::Pipe => "|",
            TokenKind::RedirectOut => ">",
            TokenKind::RedirectAppend => ">>",
            TokenKind::RedirectIn => "<",
            TokenKind::Background => "&",
            TokenKind::Semicolon => ";",
            TokenKind::Word => "",
        };
        Token {
            kind,
            lexeme: lexeme.to_string(),
            span: (start, start + lexeme.len()),
        }
    }

    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }
}
