//! Recursive descent parser.
//!
//! ```text
//! program := (stmt? NEWLINE)* stmt?
//! stmt    := "let" IDENT "=" expr
//!          | "fn" IDENT "(" (IDENT ("," IDENT)*)? ")" "=" expr
//!          | "exit" expr?
//!          | "fail" expr?
//!          | expr
//! expr    := primary ("." IDENT | "(" (expr ("," expr)*)? ")")*
//! primary := INT | STRING | IDENT | "{" (IDENT ":" expr ("," IDENT ":" expr)*)? "}"
//!          | "(" expr ")"
//! ```

use std::sync::Arc;

use vigil_engine::{EngineError, ErrorLocation, NodeTags};
use vigil_text::{PositionMap, SourceLocation, Span};

use crate::ast::{Expr, ExprKind, FunctionDef, Stmt, StmtKind};
use crate::lexer::{lex, Token, TokenKind};

/// Maps byte spans of one text to source locations.
pub(crate) struct Locator<'text> {
    map: PositionMap<'text>,
}

impl<'text> Locator<'text> {
    pub fn new(text: &'text str) -> Self {
        Locator {
            map: PositionMap::new(text),
        }
    }

    pub fn location(&self, span: Span) -> SourceLocation {
        let start = self.map.position_of(span.start as usize);
        let end = self.map.position_of(span.end as usize);
        SourceLocation::new(start.line + 1, start.character + 1, end.line + 1, end.character)
    }
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    text_len: usize,
    source_name: &'a str,
    locator: Locator<'a>,
}

pub(crate) fn parse(text: &str, source_name: &str) -> Result<Vec<Stmt>, EngineError> {
    let locator = Locator::new(text);
    let tokens = lex(text).map_err(|e| {
        EngineError::syntax(
            e.message,
            Some(ErrorLocation::new(source_name, locator.location(e.span))),
        )
    })?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        text_len: text.len(),
        source_name,
        locator,
    };
    parser.program()
}

type ParseResult<T> = Result<T, EngineError>;

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn at_line_end(&self) -> bool {
        matches!(self.peek_kind(), None | Some(TokenKind::Newline))
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>, span: Span) -> EngineError {
        EngineError::syntax(
            message,
            Some(ErrorLocation::new(self.source_name, self.locator.location(span))),
        )
    }

    /// Span of the next token, or an empty span at the end of the text.
    fn next_span(&self) -> Span {
        self.peek().map_or_else(
            || {
                let end = u32::try_from(self.text_len).unwrap_or(u32::MAX);
                Span::new(end, end)
            },
            |t| t.span,
        )
    }

    fn unexpected(&self, expected: &str) -> EngineError {
        let found = self
            .peek_kind()
            .map_or_else(|| "end of input".to_owned(), TokenKind::describe);
        self.error(format!("expected {expected}, found {found}"), self.next_span())
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> ParseResult<Span> {
        if self.peek_kind() == Some(kind) {
            if let Some(token) = self.bump() {
                return Ok(token.span);
            }
        }
        Err(self.unexpected(expected))
    }

    fn ident(&mut self, expected: &str) -> ParseResult<(String, Span)> {
        if let Some(TokenKind::Ident(name)) = self.peek_kind() {
            let name = name.clone();
            let span = self.next_span();
            self.pos += 1;
            return Ok((name, span));
        }
        Err(self.unexpected(expected))
    }

    fn program(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        loop {
            while self.peek_kind() == Some(&TokenKind::Newline) {
                self.pos += 1;
            }
            if self.peek().is_none() {
                return Ok(stmts);
            }
            stmts.push(self.stmt()?);
            if !self.at_line_end() {
                return Err(self.unexpected("end of line"));
            }
        }
    }

    fn stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.next_span().start;
        let kind = match self.peek_kind() {
            Some(TokenKind::Let) => {
                self.pos += 1;
                let (name, _) = self.ident("a variable name")?;
                self.expect(&TokenKind::Eq, "`=`")?;
                StmtKind::Let {
                    name,
                    value: self.expr()?,
                }
            }
            Some(TokenKind::Fn) => {
                self.pos += 1;
                StmtKind::Fn(Arc::new(self.function()?))
            }
            Some(TokenKind::Exit) => {
                self.pos += 1;
                StmtKind::Exit(self.optional_expr()?)
            }
            Some(TokenKind::Fail) => {
                self.pos += 1;
                StmtKind::Fail(self.optional_expr()?)
            }
            _ => StmtKind::Expr(self.expr()?),
        };
        let end = self.tokens[..self.pos].last().map_or(start, |t| t.span.end);
        let span = Span::new(start, end);
        Ok(Stmt {
            kind,
            span,
            location: self.locator.location(span),
        })
    }

    fn function(&mut self) -> ParseResult<FunctionDef> {
        let (name, _) = self.ident("a function name")?;
        self.expect(&TokenKind::LParen, "`(`")?;
        let mut params = Vec::new();
        if self.peek_kind() != Some(&TokenKind::RParen) {
            loop {
                params.push(self.ident("a parameter name")?.0);
                if self.peek_kind() != Some(&TokenKind::Comma) {
                    break;
                }
                self.pos += 1;
            }
        }
        self.expect(&TokenKind::RParen, "`)`")?;
        self.expect(&TokenKind::Eq, "`=`")?;
        let mut body = self.expr()?;
        body.tags |= NodeTags::STATEMENT;
        Ok(FunctionDef { name, params, body })
    }

    fn optional_expr(&mut self) -> ParseResult<Option<Expr>> {
        if self.at_line_end() {
            Ok(None)
        } else {
            self.expr().map(Some)
        }
    }

    fn make(&self, kind: ExprKind, span: Span) -> Expr {
        let tags = match kind {
            ExprKind::Call { .. } => NodeTags::EXPRESSION | NodeTags::CALL,
            _ => NodeTags::EXPRESSION,
        };
        Expr {
            kind,
            span,
            location: self.locator.location(span),
            tags,
        }
    }

    fn expr(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            match self.peek_kind() {
                Some(TokenKind::Dot) => {
                    self.pos += 1;
                    let (member, member_span) = self.ident("a member name after `.`")?;
                    let span = Span::new(expr.span.start, member_span.end);
                    expr = self.make(
                        ExprKind::Member {
                            object: Box::new(expr),
                            member,
                        },
                        span,
                    );
                }
                Some(TokenKind::LParen) => {
                    self.pos += 1;
                    let args = self.comma_separated(&TokenKind::RParen, Self::expr)?;
                    let close = self.expect(&TokenKind::RParen, "`)`")?;
                    let span = Span::new(expr.span.start, close.end);
                    expr = self.make(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    fn comma_separated<T>(
        &mut self,
        close: &TokenKind,
        mut item: impl FnMut(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<Vec<T>> {
        let mut items = Vec::new();
        if self.peek_kind() == Some(close) {
            return Ok(items);
        }
        loop {
            items.push(item(self)?);
            if self.peek_kind() != Some(&TokenKind::Comma) {
                return Ok(items);
            }
            self.pos += 1;
        }
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.unexpected("an expression"));
        };
        match token.kind {
            TokenKind::Int(value) => {
                self.pos += 1;
                Ok(self.make(ExprKind::Int(value), token.span))
            }
            TokenKind::Str(value) => {
                self.pos += 1;
                Ok(self.make(ExprKind::Str(value), token.span))
            }
            TokenKind::Ident(name) => {
                self.pos += 1;
                Ok(self.make(ExprKind::Ident(name), token.span))
            }
            TokenKind::LBrace => {
                self.pos += 1;
                let fields = self.comma_separated(&TokenKind::RBrace, |p| {
                    let (name, _) = p.ident("a field name")?;
                    p.expect(&TokenKind::Colon, "`:`")?;
                    Ok((name, p.expr()?))
                })?;
                let close = self.expect(&TokenKind::RBrace, "`}`")?;
                Ok(self.make(ExprKind::Record(fields), Span::new(token.span.start, close.end)))
            }
            TokenKind::LParen => {
                self.pos += 1;
                let inner = self.expr()?;
                self.expect(&TokenKind::RParen, "`)`")?;
                Ok(inner)
            }
            _ => Err(self.unexpected("an expression")),
        }
    }
}
