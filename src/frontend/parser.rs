// src/frontend/parser.rs

use crate::errors::{LexerError, ParserError};
use crate::frontend::ast::*;
use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Keyword, Span, Token, TokenType};

/// Recursive-descent parser for declarations and statements; expression
/// parsing is Pratt-driven (see `parse_expr`).
///
/// Errors accumulate in a list and trigger panic-mode recovery, so one
/// pass can report several problems. A file with any error contributes
/// no AST to later phases.
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    previous: Token,
    errors: Vec<ParserError>,
    next_node: u32,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: Lexer::new(source),
            previous: Token::eof(Span::default()),
            errors: Vec::new(),
            next_node: 0,
        }
    }

    /// Parse the translation unit: exactly one class per file.
    pub fn parse(&mut self) -> Result<Class, Vec<ParserError>> {
        let class = self.parse_class();

        if !self.check(TokenType::Eof) {
            self.report(ParserError::TrailingTokens {
                span: self.cur().span.into(),
            });
        }

        match class {
            Some(class) if self.errors.is_empty() && !self.lexer.has_errors() => Ok(class),
            _ => Err(std::mem::take(&mut self.errors)),
        }
    }

    /// Take lexer errors (for diagnostic rendering).
    pub fn take_lexer_errors(&mut self) -> Vec<LexerError> {
        self.lexer.take_errors()
    }

    fn parse_class(&mut self) -> Option<Class> {
        let start = self.cur().span;
        self.expect_keyword(Keyword::Class);
        let name = self.expect_identifier()?;
        self.expect_symbol('{');

        let mut vars = Vec::new();
        let mut subs: Vec<SubroutineDec> = Vec::new();
        let mut has_constructor = false;

        while !self.check_symbol('}') && !self.check(TokenType::Eof) {
            match self.cur().ty {
                TokenType::Keyword(Keyword::Static | Keyword::Field) => {
                    if !subs.is_empty() {
                        self.report(ParserError::VarAfterSubroutine {
                            span: self.cur().span.into(),
                        });
                        self.synchronize();
                        continue;
                    }
                    if let Some(dec) = self.parse_class_var_dec() {
                        vars.push(dec);
                    }
                }
                TokenType::Keyword(
                    Keyword::Constructor | Keyword::Function | Keyword::Method,
                ) => {
                    if self.check_keyword(Keyword::Constructor) {
                        has_constructor = true;
                    }
                    if let Some(dec) = self.parse_subroutine_dec() {
                        subs.push(dec);
                    }
                }
                _ => {
                    self.report(ParserError::InvalidClassMember {
                        span: self.cur().span.into(),
                    });
                    self.synchronize();
                }
            }
        }

        if !has_constructor {
            self.report(ParserError::MissingConstructor {
                class: name.name.clone(),
                span: start.merge(name.span).into(),
            });
        }

        self.expect_symbol('}');
        let span = start.merge(self.previous.span);

        Some(Class {
            name: name.name,
            vars,
            subs,
            span,
        })
    }

    fn parse_class_var_dec(&mut self) -> Option<ClassVarDec> {
        let start = self.cur().span;
        let kind = if self.check_keyword(Keyword::Static) {
            ClassVarKind::Static
        } else {
            ClassVarKind::Field
        };
        self.advance();

        let Some(ty) = self.parse_type(false) else {
            self.synchronize();
            return None;
        };

        let names = self.parse_name_list()?;
        self.expect_symbol(';');

        Some(ClassVarDec {
            kind,
            ty,
            names,
            span: start.merge(self.previous.span),
        })
    }

    fn parse_subroutine_dec(&mut self) -> Option<SubroutineDec> {
        let start = self.cur().span;
        let kind = match self.cur().ty {
            TokenType::Keyword(Keyword::Constructor) => SubroutineKind::Constructor,
            TokenType::Keyword(Keyword::Method) => SubroutineKind::Method,
            _ => SubroutineKind::Function,
        };
        self.advance();

        let Some(return_type) = self.parse_type(true) else {
            self.synchronize();
            return None;
        };
        let name = self.expect_identifier()?;

        self.expect_symbol('(');
        let params = self.parse_param_list();
        self.expect_symbol(')');

        self.expect_symbol('{');
        let locals = self.parse_local_vars();
        let body = self.parse_statements();
        self.expect_symbol('}');

        Some(SubroutineDec {
            kind,
            return_type,
            name: name.name,
            params,
            locals,
            body,
            span: start.merge(name.span),
        })
    }

    fn parse_param_list(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        if self.check_symbol(')') {
            return params;
        }

        loop {
            let Some(ty) = self.parse_type(false) else {
                // Reported in parse_type; the caller's ')' expect recovers.
                return params;
            };
            let Some(name) = self.expect_identifier() else {
                return params;
            };
            let span = ty.span.merge(name.span);
            params.push(Param {
                ty,
                name: name.name,
                span,
            });
            if !self.match_symbol(',') {
                break;
            }
        }

        params
    }

    fn parse_local_vars(&mut self) -> Vec<VarDec> {
        let mut decls = Vec::new();

        while self.match_keyword(Keyword::Var) {
            let start = self.previous.span;
            let Some(ty) = self.parse_type(false) else {
                self.synchronize();
                continue;
            };
            let Some(names) = self.parse_name_list() else {
                continue;
            };
            self.expect_symbol(';');
            decls.push(VarDec {
                ty,
                names,
                span: start.merge(self.previous.span),
            });
        }

        decls
    }

    /// `ident (',' ident)*` in a variable declaration.
    fn parse_name_list(&mut self) -> Option<Vec<Ident>> {
        let mut names = Vec::new();
        loop {
            let name = self.expect_identifier()?;
            names.push(name);
            if !self.match_symbol(',') {
                break;
            }
        }
        Some(names)
    }

    /// `int | char | boolean | void (when allowed) | ident`, with
    /// optional `<type, ...>` generic arguments.
    pub(crate) fn parse_type(&mut self, allow_void: bool) -> Option<TypeExpr> {
        let tok = self.cur().clone();
        let base = match tok.ty {
            TokenType::Keyword(Keyword::Int | Keyword::Char | Keyword::Boolean) => {
                self.advance();
                tok.lexeme
            }
            TokenType::Keyword(Keyword::Void) => {
                if !allow_void {
                    self.report(ParserError::VoidVariable {
                        span: tok.span.into(),
                    });
                    return None;
                }
                self.advance();
                tok.lexeme
            }
            TokenType::Identifier => {
                self.advance();
                tok.lexeme
            }
            _ => {
                self.report(ParserError::ExpectedType {
                    span: tok.span.into(),
                });
                return None;
            }
        };

        let mut ty = TypeExpr::new(base, tok.span);
        if self.match_symbol('<') {
            loop {
                if let Some(arg) = self.parse_type(false) {
                    ty.generics.push(arg);
                }
                if !self.match_symbol(',') {
                    break;
                }
            }
            self.expect_symbol('>');
            ty.span = tok.span.merge(self.previous.span);
        }
        Some(ty)
    }

    // ------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------

    pub(crate) fn cur(&self) -> &Token {
        self.lexer.current()
    }

    pub(crate) fn prev_span(&self) -> Span {
        self.previous.span
    }

    pub(crate) fn advance(&mut self) {
        self.previous = self.lexer.current().clone();
        self.lexer.advance();
    }

    pub(crate) fn check(&self, ty: TokenType) -> bool {
        self.cur().ty == ty
    }

    pub(crate) fn check_symbol(&self, c: char) -> bool {
        self.cur().ty == TokenType::Symbol(c)
    }

    pub(crate) fn check_keyword(&self, kw: Keyword) -> bool {
        self.cur().ty == TokenType::Keyword(kw)
    }

    pub(crate) fn match_symbol(&mut self, c: char) -> bool {
        if self.check_symbol(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_keyword(&mut self, kw: Keyword) -> bool {
        if self.check_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Require a symbol; on mismatch, report and enter panic recovery.
    pub(crate) fn expect_symbol(&mut self, c: char) {
        if self.match_symbol(c) {
            return;
        }
        self.report(ParserError::ExpectedToken {
            expected: c.to_string(),
            found: self.cur().display().to_string(),
            span: self.cur().span.into(),
        });
        self.synchronize();
    }

    fn expect_keyword(&mut self, kw: Keyword) {
        if self.match_keyword(kw) {
            return;
        }
        self.report(ParserError::ExpectedToken {
            expected: kw.as_str().to_string(),
            found: self.cur().display().to_string(),
            span: self.cur().span.into(),
        });
        self.synchronize();
    }

    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        if self.check(TokenType::Identifier) {
            let tok = self.cur().clone();
            self.advance();
            return Some(Ident {
                name: tok.lexeme,
                span: tok.span,
            });
        }
        self.report(ParserError::ExpectedIdentifier {
            found: self.cur().display().to_string(),
            span: self.cur().span.into(),
        });
        self.synchronize();
        None
    }

    pub(crate) fn report(&mut self, error: ParserError) {
        self.errors.push(error);
    }

    pub(crate) fn alloc_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    /// Panic-mode recovery: advance past the offending token, then
    /// discard until a safe harbor, either a ';' (consumed) or a
    /// statement/declaration keyword (left on the stream).
    pub(crate) fn synchronize(&mut self) {
        self.advance();

        while !self.check(TokenType::Eof) {
            if self.check_symbol(';') {
                self.advance();
                return;
            }
            if let TokenType::Keyword(
                Keyword::Class
                | Keyword::Constructor
                | Keyword::Function
                | Keyword::Method
                | Keyword::Var
                | Keyword::Let
                | Keyword::Do
                | Keyword::If
                | Keyword::While
                | Keyword::Return,
            ) = self.cur().ty
            {
                return;
            }
            self.advance();
        }
    }
}
