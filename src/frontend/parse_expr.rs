// src/frontend/parse_expr.rs
//
// Pratt (top-down operator precedence) expression parsing. Two lookup
// layers drive dispatch: specific lexemes (symbols and the literal
// keywords) override token categories (integers, strings, identifiers).
// Rules carry enum-discriminated handlers rather than function pointers.

use crate::errors::ParserError;
use crate::frontend::ast::*;
use crate::frontend::parser::Parser;
use crate::frontend::token::{Keyword, Token, TokenType};

/// The precedence ladder, low to high. All binary operators are
/// left-associative except '=' (right; only reachable in expression
/// position, where it is vestigial).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Precedence {
    Lowest,
    Equals,
    Compare,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

/// Prefix (null-denotation) handlers.
#[derive(Debug, Clone, Copy)]
enum Nud {
    Integer,
    Str,
    Ident,
    KeywordConst,
    Group,
    Unary,
}

/// Infix/suffix (left-denotation) handlers.
#[derive(Debug, Clone, Copy)]
enum Led {
    Binary,
    Call,
    Index,
}

struct ParseRule {
    nud: Option<Nud>,
    led: Option<Led>,
    precedence: Precedence,
}

impl ParseRule {
    const fn new(nud: Option<Nud>, led: Option<Led>, precedence: Precedence) -> Self {
        Self {
            nud,
            led,
            precedence,
        }
    }

    const fn none() -> Self {
        Self::new(None, None, Precedence::Lowest)
    }
}

/// The dispatch table. Specific symbols and keywords first, then the
/// generic token categories; anything else can neither start nor
/// continue an expression.
fn rule_for(token: &Token) -> ParseRule {
    match token.ty {
        TokenType::Symbol(c) => match c {
            '(' => ParseRule::new(Some(Nud::Group), None, Precedence::Lowest),
            '~' => ParseRule::new(Some(Nud::Unary), None, Precedence::Prefix),
            '-' => ParseRule::new(Some(Nud::Unary), Some(Led::Binary), Precedence::Sum),
            '+' | '|' => ParseRule::new(None, Some(Led::Binary), Precedence::Sum),
            '*' | '/' | '&' => ParseRule::new(None, Some(Led::Binary), Precedence::Product),
            '=' => ParseRule::new(None, Some(Led::Binary), Precedence::Equals),
            '<' | '>' => ParseRule::new(None, Some(Led::Binary), Precedence::Compare),
            '.' => ParseRule::new(None, Some(Led::Call), Precedence::Call),
            '[' => ParseRule::new(None, Some(Led::Index), Precedence::Index),
            _ => ParseRule::none(),
        },
        TokenType::Keyword(
            Keyword::True | Keyword::False | Keyword::Null | Keyword::This,
        ) => ParseRule::new(Some(Nud::KeywordConst), None, Precedence::Lowest),
        TokenType::IntConst => ParseRule::new(Some(Nud::Integer), None, Precedence::Lowest),
        TokenType::StringConst => ParseRule::new(Some(Nud::Str), None, Precedence::Lowest),
        TokenType::Identifier => ParseRule::new(Some(Nud::Ident), None, Precedence::Lowest),
        _ => ParseRule::none(),
    }
}

impl<'src> Parser<'src> {
    /// Core Pratt loop: run the nud for the current token, then fold
    /// led handlers while their precedence exceeds `min_precedence`.
    pub(crate) fn parse_expression(&mut self, min_precedence: Precedence) -> Option<Expr> {
        let Some(nud) = rule_for(self.cur()).nud else {
            self.report(ParserError::ExpectedExpression {
                found: self.cur().display().to_string(),
                span: self.cur().span.into(),
            });
            self.synchronize();
            return None;
        };

        let mut left = self.run_nud(nud)?;

        loop {
            let rule = rule_for(self.cur());
            if rule.precedence <= min_precedence {
                break;
            }
            let Some(led) = rule.led else { break };
            left = self.run_led(led, left)?;
        }

        Some(left)
    }

    fn run_nud(&mut self, nud: Nud) -> Option<Expr> {
        match nud {
            Nud::Integer => self.parse_integer_nud(),
            Nud::Str => self.parse_string_nud(),
            Nud::Ident => self.parse_identifier_nud(),
            Nud::KeywordConst => self.parse_keyword_nud(),
            Nud::Group => self.parse_group_nud(),
            Nud::Unary => self.parse_unary_nud(),
        }
    }

    fn run_led(&mut self, led: Led, left: Expr) -> Option<Expr> {
        match led {
            Led::Binary => self.parse_binary_led(left),
            Led::Call => self.parse_call_led(left),
            Led::Index => self.parse_index_led(left),
        }
    }

    fn parse_integer_nud(&mut self) -> Option<Expr> {
        let tok = self.cur().clone();
        self.advance();
        // The lexer only emits IntConst for values in 0..=32767.
        let value = tok.lexeme.parse::<u16>().unwrap_or(0);
        Some(Expr {
            id: self.alloc_node(),
            kind: ExprKind::IntLit(value),
            span: tok.span,
        })
    }

    fn parse_string_nud(&mut self) -> Option<Expr> {
        let tok = self.cur().clone();
        self.advance();
        // Strip the surrounding quotes; Jack has no escape sequences.
        let content = tok.lexeme[1..tok.lexeme.len() - 1].to_string();
        Some(Expr {
            id: self.alloc_node(),
            kind: ExprKind::StringLit(content),
            span: tok.span,
        })
    }

    /// An identifier either names a value, absorbs `Array<...>` display
    /// generics, or starts a receiverless call when followed by '('.
    fn parse_identifier_nud(&mut self) -> Option<Expr> {
        let tok = self.cur().clone();
        self.advance();

        let mut generics = Vec::new();
        if tok.lexeme == "Array" && self.check_symbol('<') {
            self.advance();
            loop {
                if let Some(arg) = self.parse_type(false) {
                    generics.push(arg);
                }
                if !self.match_symbol(',') {
                    break;
                }
            }
            self.expect_symbol('>');
        }

        if self.match_symbol('(') {
            let args = self.parse_expression_list();
            self.expect_symbol(')');
            let span = tok.span.merge(self.prev_span());
            return Some(Expr {
                id: self.alloc_node(),
                kind: ExprKind::Call(Box::new(CallExpr {
                    receiver: None,
                    name: tok.lexeme,
                    name_span: tok.span,
                    args,
                })),
                span,
            });
        }

        Some(Expr {
            id: self.alloc_node(),
            kind: ExprKind::Identifier(IdentExpr {
                name: tok.lexeme,
                generics,
            }),
            span: tok.span,
        })
    }

    fn parse_keyword_nud(&mut self) -> Option<Expr> {
        let tok = self.cur().clone();
        self.advance();
        let TokenType::Keyword(kw) = tok.ty else {
            return None;
        };
        let value = KeywordConst::from_keyword(kw)?;
        Some(Expr {
            id: self.alloc_node(),
            kind: ExprKind::KeywordLit(value),
            span: tok.span,
        })
    }

    /// `( expr )` returns the inner expression; no grouping node.
    fn parse_group_nud(&mut self) -> Option<Expr> {
        self.advance();
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_symbol(')');
        Some(expr)
    }

    fn parse_unary_nud(&mut self) -> Option<Expr> {
        let tok = self.cur().clone();
        let TokenType::Symbol(op) = tok.ty else {
            return None;
        };
        self.advance();

        let operand = self.parse_expression(Precedence::Prefix)?;
        let span = tok.span.merge(operand.span);
        Some(Expr {
            id: self.alloc_node(),
            kind: ExprKind::Unary(Box::new(UnaryExpr { op, operand })),
            span,
        })
    }

    fn parse_binary_led(&mut self, left: Expr) -> Option<Expr> {
        let tok = self.cur().clone();
        let TokenType::Symbol(op) = tok.ty else {
            return None;
        };
        let precedence = rule_for(&tok).precedence;
        self.advance();

        // '=' is right-associative: recurse one level below its own
        // precedence. Everything else is left-associative.
        let next_min = if op == '=' {
            Precedence::Lowest
        } else {
            precedence
        };
        let right = self.parse_expression(next_min)?;
        let span = left.span.merge(right.span);

        Some(Expr {
            id: self.alloc_node(),
            kind: ExprKind::Binary(Box::new(BinaryExpr { op, left, right })),
            span,
        })
    }

    /// `left '.' ident '(' exprList ')'`
    fn parse_call_led(&mut self, left: Expr) -> Option<Expr> {
        self.advance();

        let name = self.expect_identifier()?;
        self.expect_symbol('(');
        let args = self.parse_expression_list();
        self.expect_symbol(')');

        let span = left.span.merge(self.prev_span());
        Some(Expr {
            id: self.alloc_node(),
            kind: ExprKind::Call(Box::new(CallExpr {
                receiver: Some(left),
                name: name.name,
                name_span: name.span,
                args,
            })),
            span,
        })
    }

    /// `left '[' expr ']'`
    fn parse_index_led(&mut self, left: Expr) -> Option<Expr> {
        self.advance();

        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_symbol(']');

        let span = left.span.merge(self.prev_span());
        Some(Expr {
            id: self.alloc_node(),
            kind: ExprKind::Index(Box::new(IndexExpr { base: left, index })),
            span,
        })
    }

    fn parse_expression_list(&mut self) -> Vec<Expr> {
        let mut expressions = Vec::new();
        if self.check_symbol(')') {
            return expressions;
        }

        loop {
            let Some(expr) = self.parse_expression(Precedence::Lowest) else {
                return expressions;
            };
            expressions.push(expr);
            if !self.check_symbol(',') && !self.check_symbol(')') {
                self.report(ParserError::ExpectedToken {
                    expected: "',' or ')'".to_string(),
                    found: self.cur().display().to_string(),
                    span: self.cur().span.into(),
                });
                self.synchronize();
                return expressions;
            }
            if !self.match_symbol(',') {
                break;
            }
        }

        expressions
    }
}
