mod expr;
mod stmt;

use cursor::Line;
use errors::{ErrorKind, Location, LoxError, LoxErrors, Result};
use scanner::{Token, TokenData};

pub use expr::{Expr, LiteralValue};
pub use stmt::Stmt;

use TokenData::*;

#[derive(Debug)]
pub struct ParserError<'a> {
    error: ParserErrorType,
    token: Token<'a>,
}

impl<'a> From<ParserError<'a>> for LoxError {
    fn from(error: ParserError<'a>) -> Self {
        let location = if error.token.is_eof() {
            Location::End
        } else {
            Location::Lexeme(error.token.lexeme().to_string())
        };
        LoxError::new(ErrorKind::Parse, error.token.line(), error.error).at(location)
    }
}

impl<'a> ParserError<'a> {
    fn new(error: ParserErrorType, token: Token<'a>) -> Self {
        Self { token, error }
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum ParserErrorType {
    #[error("Expect ')' after expression.")]
    MissingRightParen,
    #[error("Expect expression.")]
    ExpectedExpression,
    #[error("Expect ';' after value.")]
    ExpectedSemicolonAfterValue,
    #[error("Expect ';' after expression.")]
    ExpectedSemicolonAfterExpression,
    #[error("Expression nested too deeply.")]
    TooDeep,
}

/// Most groupings and unary operators that may enclose a token. Each one costs a full trip down
/// the precedence ladder on the stack.
const MAX_NESTING: usize = 128;

/// Tallest expression tree the parser builds. Evaluating, printing and dropping a tree all
/// recurse once per level.
const MAX_HEIGHT: usize = 512;

/// Parses a scanned token list into statements, see [`Parser::parse`].
pub fn parse(tokens: Vec<Token<'_>>) -> (Vec<Stmt<'_>>, LoxErrors) {
    Parser::new(tokens).parse()
}

#[derive(Debug)]
pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    current: usize,
    /// Open groupings and unary operators around the current token.
    depth: usize,
    /// Height of the expression most recently parsed.
    height: usize,
}

impl<'a> Parser<'a> {
    pub fn new(mut tokens: Vec<Token<'a>>) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let line = tokens.last().map_or(Line(1), Token::line);
            tokens.push(Token::eof(line));
        }
        Self { tokens, current: 0, depth: 0, height: 0 }
    }

    /// Parses statements until the end of input.
    ///
    /// A statement that fails to parse is dropped and its error recorded, then the parser
    /// skips ahead to the next statement boundary and carries on. The returned statements are
    /// only safe to run if the error list is empty.
    pub fn parse(mut self) -> (Vec<Stmt<'a>>, LoxErrors) {
        let mut errors = LoxErrors::default();
        let mut stmts = Vec::new();
        while !self.is_at_end() {
            match self.statement() {
                Ok(stmt) => {
                    log::trace!("Parsed {stmt}");
                    stmts.push(stmt)
                }
                Err(e) => {
                    log::debug!("Hit error: {:?}, syncing...", e);
                    errors.push(e);
                    self.synchronize();
                }
            }
        }

        log::debug!("Parsed {} statements, {} errors", stmts.len(), errors.len());
        (stmts, errors)
    }

    fn statement(&mut self) -> Result<Stmt<'a>> {
        if self.consume(Print).is_some() {
            return self.print_statement();
        }

        self.expression_statement()
    }

    fn print_statement(&mut self) -> Result<Stmt<'a>> {
        let value = self.expression()?;

        self.consume_or_error(Semicolon, ParserErrorType::ExpectedSemicolonAfterValue)?;

        Ok(Stmt::Print(value))
    }

    fn expression_statement(&mut self) -> Result<Stmt<'a>> {
        let value = self.expression()?;

        self.consume_or_error(Semicolon, ParserErrorType::ExpectedSemicolonAfterExpression)?;

        Ok(Stmt::Expression(value))
    }

    fn expression(&mut self) -> Result<Expr<'a>> {
        self.equality()
    }

    fn equality(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.comparison()?;

        while let BangEqual | EqualEqual = self.peek().data {
            let operator = self.advance();
            let left_height = self.height;
            let right = self.comparison()?;
            expr = self.binary(expr, left_height, operator, right)?;
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.term()?;

        while let Greater | GreaterEqual | Less | LessEqual = self.peek().data {
            let operator = self.advance();
            let left_height = self.height;
            let right = self.term()?;
            expr = self.binary(expr, left_height, operator, right)?;
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.factor()?;

        while let Plus | Minus = self.peek().data {
            let operator = self.advance();
            let left_height = self.height;
            let right = self.factor()?;
            expr = self.binary(expr, left_height, operator, right)?;
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.unary()?;

        while let Star | Slash = self.peek().data {
            let operator = self.advance();
            let left_height = self.height;
            let right = self.unary()?;
            expr = self.binary(expr, left_height, operator, right)?;
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr<'a>> {
        if let Minus | Bang = self.peek().data {
            let operator = self.advance();
            let right = self.nested(&operator, Self::unary)?;
            self.grow(self.height, &operator)?;
            return Ok(Expr::unary(operator, right));
        }
        self.primary()
    }

    fn binary(
        &mut self,
        left: Expr<'a>,
        left_height: usize,
        operator: Token<'a>,
        right: Expr<'a>,
    ) -> Result<Expr<'a>> {
        self.grow(left_height.max(self.height), &operator)?;
        Ok(Expr::binary(left, operator, right))
    }

    fn primary(&mut self) -> Result<Expr<'a>> {
        if let Some(literal) = self.peek().literal() {
            self.advance();
            self.height = 1;
            return Ok(Expr::Literal(literal.into()));
        }

        let value = match self.peek().data {
            False => LiteralValue::Boolean(false),
            True => LiteralValue::Boolean(true),
            Nil => LiteralValue::Nil,
            LeftParen => {
                let paren = self.advance();
                let expr = self.nested(&paren, Self::expression)?;

                self.consume_or_error(RightParen, ParserErrorType::MissingRightParen)?;

                self.grow(self.height, &paren)?;
                return Ok(Expr::grouping(expr));
            }
            _ => {
                return Err(
                    ParserError::new(ParserErrorType::ExpectedExpression, self.peek().clone()).into()
                )
            }
        };

        self.advance();
        self.height = 1;
        Ok(Expr::Literal(value))
    }

    /// Parses one grouping or unary level deeper than `token`.
    fn nested(
        &mut self,
        token: &Token<'a>,
        parse: impl FnOnce(&mut Self) -> Result<Expr<'a>>,
    ) -> Result<Expr<'a>> {
        if self.depth >= MAX_NESTING {
            return Err(ParserError::new(ParserErrorType::TooDeep, token.clone()).into());
        }
        self.depth += 1;
        let expr = parse(self);
        self.depth -= 1;
        expr
    }

    /// Records the height of a node at `token` whose tallest child is `child_height` high.
    fn grow(&mut self, child_height: usize, token: &Token<'a>) -> Result<()> {
        if child_height >= MAX_HEIGHT {
            return Err(ParserError::new(ParserErrorType::TooDeep, token.clone()).into());
        }
        self.height = child_height + 1;
        Ok(())
    }

    fn consume(&mut self, token: TokenData) -> Option<Token<'a>> {
        debug_assert!(!matches!(token, Number(_) | Str(_)));
        if self.peek().data == token {
            Some(self.advance())
        } else {
            None
        }
    }

    fn consume_or_error(&mut self, token: TokenData, error_type: ParserErrorType) -> Result<Token<'a>> {
        match self.consume(token) {
            Some(token) => Ok(token),
            None => Err(ParserError::new(error_type, self.peek().clone()).into()),
        }
    }

    /// Discards tokens until the next likely statement boundary: just past a `;`, or just before
    /// a keyword that starts a statement.
    fn synchronize(&mut self) {
        // A `print` at the error position begins the next statement
        if self.peek().data != Print {
            self.advance();
        }

        while !self.is_at_end() {
            if let Some(Token { data: Semicolon, .. }) = self.previous() {
                return;
            }
            if self.peek().data.starts_statement() {
                return;
            }
            self.advance();
        }
    }
}

// Helpers
impl<'a> Parser<'a> {
    fn peek(&self) -> &Token<'a> {
        &self.tokens[self.current]
    }

    fn previous(&self) -> Option<&Token<'a>> {
        self.current.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    fn advance(&mut self) -> Token<'a> {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }
}
