// src/frontend/lexer.rs

use crate::errors::LexerError;
use crate::frontend::token::{Keyword, Span, Token, TokenType};

const SYMBOLS: &str = "{}()[].,;+-*/&|<>=~";

/// Streaming lexer over Jack source text.
///
/// The lexer materializes only the current token and a single
/// lookahead. It initializes to the first token, produces `Eof` at the
/// end of input, and stays on `Eof` thereafter. Lexical failures are
/// collected and surface as `Error` tokens so the parser can keep
/// consuming the stream.
pub struct Lexer<'src> {
    source: &'src str,
    chars: std::iter::Peekable<std::str::CharIndices<'src>>,
    start: usize,
    current: usize,
    line: u32,
    column: u32,
    start_line: u32,
    start_column: u32,
    errors: Vec<LexerError>,
    current_tok: Token,
    lookahead: Token,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Self {
            source,
            chars: source.char_indices().peekable(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
            errors: Vec::new(),
            current_tok: Token::eof(Span::default()),
            lookahead: Token::eof(Span::default()),
        };
        lexer.current_tok = lexer.scan_token();
        lexer.lookahead = lexer.scan_token();
        lexer
    }

    /// The token the stream is positioned on.
    pub fn current(&self) -> &Token {
        &self.current_tok
    }

    /// One token of lookahead.
    pub fn peek(&self) -> &Token {
        &self.lookahead
    }

    /// Step the stream forward by one token.
    pub fn advance(&mut self) {
        let next = self.scan_token();
        self.current_tok = std::mem::replace(&mut self.lookahead, next);
    }

    pub fn has_more(&self) -> bool {
        self.current_tok.ty != TokenType::Eof
    }

    /// Take all collected errors, leaving the internal list empty.
    pub fn take_errors(&mut self) -> Vec<LexerError> {
        std::mem::take(&mut self.errors)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn scan_token(&mut self) -> Token {
        self.skip_whitespace();

        self.start = self.current;
        self.start_column = self.column;
        self.start_line = self.line;

        let Some(c) = self.advance_char() else {
            return Token::eof(self.span_here());
        };

        match c {
            '/' => match self.peek_char() {
                Some('/') => {
                    while self.peek_char().is_some_and(|c| c != '\n') {
                        self.advance_char();
                    }
                    self.scan_token()
                }
                Some('*') => {
                    self.advance_char();
                    self.block_comment()
                }
                _ => self.make_token(TokenType::Symbol('/')),
            },
            '"' => self.string(),
            c if SYMBOLS.contains(c) => self.make_token(TokenType::Symbol(c)),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),
            _ => self.error_token(LexerError::UnexpectedCharacter {
                ch: c,
                span: self.span_here().into(),
            }),
        }
    }

    /// Skip whitespace; line/column bookkeeping happens in `advance_char`.
    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\r' | '\n') = self.peek_char() {
            self.advance_char();
        }
    }

    /// Consume a `/* ... */` block comment (non-nesting). The `/*` has
    /// already been consumed.
    fn block_comment(&mut self) -> Token {
        loop {
            match self.advance_char() {
                None => {
                    return self.error_token(LexerError::UnterminatedBlockComment {
                        span: self.span_here().into(),
                    });
                }
                Some('*') if self.peek_char() == Some('/') => {
                    self.advance_char();
                    return self.scan_token();
                }
                Some(_) => {}
            }
        }
    }

    fn advance_char(&mut self) -> Option<char> {
        let (idx, c) = self.chars.next()?;
        self.current = idx + c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn span_here(&self) -> Span {
        Span::new(
            self.start,
            self.current,
            self.start_line,
            self.start_column,
            self.line,
            self.column,
        )
    }

    fn make_token(&self, ty: TokenType) -> Token {
        Token::new(ty, &self.source[self.start..self.current], self.span_here())
    }

    /// Record an error and produce an `Error` token in its place.
    fn error_token(&mut self, error: LexerError) -> Token {
        let message = error.to_string();
        self.errors.push(error);
        Token::new(TokenType::Error, message, self.span_here())
    }

    /// Scan an identifier, then check it against the keyword table.
    fn identifier(&mut self) -> Token {
        while self
            .peek_char()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance_char();
        }

        let text = &self.source[self.start..self.current];
        match Keyword::from_str(text) {
            Some(kw) => self.make_token(TokenType::Keyword(kw)),
            None => self.make_token(TokenType::Identifier),
        }
    }

    /// Scan a maximal run of digits. The value must fit in 0..=32767;
    /// negative literals are a parser concern.
    fn number(&mut self) -> Token {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance_char();
        }

        let text = &self.source[self.start..self.current];
        match text.parse::<u32>() {
            Ok(value) if value <= 32767 => self.make_token(TokenType::IntConst),
            _ => self.error_token(LexerError::IntegerOutOfRange {
                span: self.span_here().into(),
            }),
        }
    }

    /// Scan a string literal. No embedded newlines, no escape sequences.
    fn string(&mut self) -> Token {
        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    return self.error_token(LexerError::UnterminatedString {
                        span: self.span_here().into(),
                    });
                }
                Some('"') => {
                    self.advance_char();
                    return self.make_token(TokenType::StringConst);
                }
                Some(_) => {
                    self.advance_char();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(source: &str) -> Vec<TokenType> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        while lexer.has_more() {
            out.push(lexer.current().ty);
            lexer.advance();
        }
        out
    }

    #[test]
    fn lex_symbols() {
        assert_eq!(
            types("{ } ( ) [ ] . , ; ~"),
            vec![
                TokenType::Symbol('{'),
                TokenType::Symbol('}'),
                TokenType::Symbol('('),
                TokenType::Symbol(')'),
                TokenType::Symbol('['),
                TokenType::Symbol(']'),
                TokenType::Symbol('.'),
                TokenType::Symbol(','),
                TokenType::Symbol(';'),
                TokenType::Symbol('~'),
            ]
        );
    }

    #[test]
    fn lex_keywords_and_identifiers() {
        assert_eq!(
            types("class Main let x"),
            vec![
                TokenType::Keyword(Keyword::Class),
                TokenType::Identifier,
                TokenType::Keyword(Keyword::Let),
                TokenType::Identifier,
            ]
        );
    }

    #[test]
    fn lex_integer_at_position() {
        let mut lexer = Lexer::new("  417");
        let tok = lexer.current().clone();
        assert_eq!(tok.ty, TokenType::IntConst);
        assert_eq!(tok.lexeme, "417");
        assert_eq!(tok.span.line, 1);
        assert_eq!(tok.span.column, 3);
    }

    #[test]
    fn lex_integer_bounds() {
        assert_eq!(types("32767"), vec![TokenType::IntConst]);

        let mut lexer = Lexer::new("32768");
        assert_eq!(lexer.current().ty, TokenType::Error);
        let errors = lexer.take_errors();
        assert!(matches!(errors[0], LexerError::IntegerOutOfRange { .. }));
    }

    #[test]
    fn lex_string() {
        let mut lexer = Lexer::new("\"hello world\"");
        let tok = lexer.current();
        assert_eq!(tok.ty, TokenType::StringConst);
        assert_eq!(tok.lexeme, "\"hello world\"");
    }

    #[test]
    fn lex_unterminated_string() {
        let mut lexer = Lexer::new("\"hello\nlet");
        assert_eq!(lexer.current().ty, TokenType::Error);
        let errors = lexer.take_errors();
        assert!(matches!(errors[0], LexerError::UnterminatedString { .. }));
        // The lexer keeps going after the error.
        assert_eq!(lexer.peek().ty, TokenType::Keyword(Keyword::Let));
    }

    #[test]
    fn lex_line_comment() {
        assert_eq!(
            types("1 // comment with let do if\n2"),
            vec![TokenType::IntConst, TokenType::IntConst]
        );
    }

    #[test]
    fn lex_block_comment() {
        assert_eq!(
            types("1 /* spans\ntwo lines */ 2"),
            vec![TokenType::IntConst, TokenType::IntConst]
        );
    }

    #[test]
    fn lex_unterminated_block_comment() {
        let mut lexer = Lexer::new("/* never closed");
        assert_eq!(lexer.current().ty, TokenType::Error);
        let errors = lexer.take_errors();
        assert!(matches!(
            errors[0],
            LexerError::UnterminatedBlockComment { .. }
        ));
    }

    #[test]
    fn lex_slash_is_a_symbol() {
        assert_eq!(
            types("a / b"),
            vec![
                TokenType::Identifier,
                TokenType::Symbol('/'),
                TokenType::Identifier,
            ]
        );
    }

    #[test]
    fn lex_tracks_lines_and_columns() {
        let mut lexer = Lexer::new("let\n  x");
        assert_eq!(lexer.current().span.line, 1);
        assert_eq!(lexer.current().span.column, 1);
        lexer.advance();
        assert_eq!(lexer.current().span.line, 2);
        assert_eq!(lexer.current().span.column, 3);
    }

    #[test]
    fn lex_stays_on_eof() {
        let mut lexer = Lexer::new("x");
        lexer.advance();
        assert!(!lexer.has_more());
        lexer.advance();
        assert_eq!(lexer.current().ty, TokenType::Eof);
        assert_eq!(lexer.peek().ty, TokenType::Eof);
    }

    #[test]
    fn lex_collects_multiple_errors() {
        let mut lexer = Lexer::new("@ # $");
        assert_eq!(lexer.current().ty, TokenType::Error);
        lexer.advance();
        lexer.advance();
        assert_eq!(lexer.take_errors().len(), 3);
    }

    #[test]
    fn lex_unexpected_character() {
        let mut lexer = Lexer::new("let @ x");
        assert_eq!(lexer.current().ty, TokenType::Keyword(Keyword::Let));
        lexer.advance();
        assert_eq!(lexer.current().ty, TokenType::Error);
        let errors = lexer.take_errors();
        assert!(matches!(
            &errors[0],
            LexerError::UnexpectedCharacter { ch: '@', .. }
        ));
    }
}
