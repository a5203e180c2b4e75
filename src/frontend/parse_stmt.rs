// src/frontend/parse_stmt.rs

use crate::errors::ParserError;
use crate::frontend::ast::*;
use crate::frontend::parse_expr::Precedence;
use crate::frontend::parser::Parser;
use crate::frontend::token::{Keyword, TokenType};

impl<'src> Parser<'src> {
    /// Statements until the closing '}' of the enclosing block.
    pub(crate) fn parse_statements(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();

        while !self.check_symbol('}') && !self.check(TokenType::Eof) {
            let stmt = match self.cur().ty {
                TokenType::Keyword(Keyword::Let) => self.parse_let_statement(),
                TokenType::Keyword(Keyword::If) => self.parse_if_statement(),
                TokenType::Keyword(Keyword::While) => self.parse_while_statement(),
                TokenType::Keyword(Keyword::Do) => self.parse_do_statement(),
                TokenType::Keyword(Keyword::Return) => self.parse_return_statement(),
                _ => {
                    self.report(ParserError::ExpectedStatement {
                        found: self.cur().display().to_string(),
                        span: self.cur().span.into(),
                    });
                    self.synchronize();
                    continue;
                }
            };

            if let Some(stmt) = stmt {
                statements.push(stmt);
            }
        }

        statements
    }

    /// `'let' ident ('[' expr ']')? '=' expr ';'`
    fn parse_let_statement(&mut self) -> Option<Stmt> {
        let start = self.cur().span;
        self.advance();

        let name = self.expect_identifier()?;

        let index = if self.match_symbol('[') {
            let index = self.parse_expression(Precedence::Lowest)?;
            self.expect_symbol(']');
            Some(index)
        } else {
            None
        };

        self.expect_symbol('=');
        let value = self.parse_expression(Precedence::Lowest)?;
        self.expect_symbol(';');

        Some(Stmt::Let(LetStmt {
            name: name.name,
            name_span: name.span,
            index,
            value,
            span: start.merge(self.prev_span()),
        }))
    }

    /// `'if' '(' expr ')' '{' statements '}' ('else' '{' statements '}')?`
    fn parse_if_statement(&mut self) -> Option<Stmt> {
        let start = self.cur().span;
        self.advance();

        self.expect_symbol('(');
        let cond = self.parse_expression(Precedence::Lowest)?;
        self.expect_symbol(')');

        self.expect_symbol('{');
        let then_branch = self.parse_statements();
        self.expect_symbol('}');

        let else_branch = if self.match_keyword(Keyword::Else) {
            self.expect_symbol('{');
            let stmts = self.parse_statements();
            self.expect_symbol('}');
            Some(stmts)
        } else {
            None
        };

        Some(Stmt::If(IfStmt {
            cond,
            then_branch,
            else_branch,
            span: start.merge(self.prev_span()),
        }))
    }

    /// `'while' '(' expr ')' '{' statements '}'`
    fn parse_while_statement(&mut self) -> Option<Stmt> {
        let start = self.cur().span;
        self.advance();

        self.expect_symbol('(');
        let cond = self.parse_expression(Precedence::Lowest)?;
        self.expect_symbol(')');

        self.expect_symbol('{');
        let body = self.parse_statements();
        self.expect_symbol('}');

        Some(Stmt::While(WhileStmt {
            cond,
            body,
            span: start.merge(self.prev_span()),
        }))
    }

    /// `'do' expr ';'`; the expression must be a subroutine call.
    fn parse_do_statement(&mut self) -> Option<Stmt> {
        let start = self.cur().span;
        self.advance();

        let call = self.parse_expression(Precedence::Lowest)?;
        if !call.is_call() {
            self.report(ParserError::DoWithoutCall {
                span: call.span.into(),
            });
            return None;
        }
        self.expect_symbol(';');

        Some(Stmt::Do(DoStmt {
            call,
            span: start.merge(self.prev_span()),
        }))
    }

    /// `'return' expr? ';'`
    fn parse_return_statement(&mut self) -> Option<Stmt> {
        let start = self.cur().span;
        self.advance();

        let value = if self.check_symbol(';') {
            None
        } else {
            Some(self.parse_expression(Precedence::Lowest)?)
        };
        self.expect_symbol(';');

        Some(Stmt::Return(ReturnStmt {
            value,
            span: start.merge(self.prev_span()),
        }))
    }
}
