mod expr;

use cursor::Line;
use diagnostics::{Diagnostic, Location};
pub use expr::{Expr, LiteralValue};
use scanner::{Literal, Token, TokenType};

use TokenType::*;

pub type Result<T> = std::result::Result<T, ParseError>;

/// Height limit for parsed expression trees. Printing and evaluating recurse
/// over the tree, so deeper input is rejected here instead.
pub const MAX_DEPTH: usize = 256;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParserErrorType {
    #[error("Expect expression.")]
    ExpectedExpression,
    #[error("Expect ')' after expression.")]
    ExpectedRightParen,
    #[error("Expression nests too deeply.")]
    TooDeep,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error{location}: {error}")]
pub struct ParseError {
    pub error: ParserErrorType,
    pub line: Line,
    pub location: Location,
}

impl ParseError {
    fn new(error: ParserErrorType, token: &Token) -> Self {
        let location =
            if token.is_eof() { Location::AtEnd } else { Location::At(token.lexeme.to_string()) };
        Self { error, line: token.line, location }
    }
}

impl From<ParseError> for Diagnostic {
    fn from(e: ParseError) -> Self {
        Diagnostic::Syntax { line: e.line, location: e.location, message: e.error.to_string() }
    }
}

/// Parses a single expression from `tokens`.
///
/// The first syntax error aborts the whole parse. Tokens following a complete
/// expression are left unread.
pub fn parse<'a>(tokens: &[Token<'a>]) -> Result<Expr<'a>> {
    Parser::new(tokens).parse()
}

/// A parsed expression and the height of its tree.
struct Node<'a> {
    expr: Expr<'a>,
    depth: usize,
}

#[derive(Debug)]
pub struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    current: usize,
    // Returned by `peek` once `tokens` is exhausted, so a slice that lacks the
    // trailing `Eof` still parses (and fails) cleanly.
    end: Token<'a>,
    // Unary operators and groupings currently being parsed.
    nesting: usize,
}

impl<'t, 'a> Parser<'t, 'a> {
    pub fn new(tokens: &'t [Token<'a>]) -> Self {
        let end = match tokens.last() {
            Some(last) if last.is_eof() => last.clone(),
            Some(last) => Token::eof(last.line),
            None => Token::eof(Line::default()),
        };
        Self { tokens, current: 0, end, nesting: 0 }
    }

    pub fn parse(mut self) -> Result<Expr<'a>> {
        match self.expression() {
            Ok(node) => {
                log::trace!("Parsed {} with depth {}", node.expr, node.depth);
                Ok(node.expr)
            }
            Err(e) => {
                log::debug!("Parse failed: {:?}", e);
                Err(e)
            }
        }
    }

    fn expression(&mut self) -> Result<Node<'a>> {
        self.equality()
    }

    fn equality(&mut self) -> Result<Node<'a>> {
        let mut node = self.comparison()?;

        while let BangEqual | EqualEqual = self.peek_type() {
            let operator = self.advance();
            let right = self.comparison()?;
            node = binary(node, operator, right)?;
        }
        Ok(node)
    }

    fn comparison(&mut self) -> Result<Node<'a>> {
        let mut node = self.term()?;

        while let Greater | GreaterEqual | Less | LessEqual = self.peek_type() {
            let operator = self.advance();
            let right = self.term()?;
            node = binary(node, operator, right)?;
        }
        Ok(node)
    }

    fn term(&mut self) -> Result<Node<'a>> {
        let mut node = self.factor()?;

        while let Plus | Minus = self.peek_type() {
            let operator = self.advance();
            let right = self.factor()?;
            node = binary(node, operator, right)?;
        }
        Ok(node)
    }

    fn factor(&mut self) -> Result<Node<'a>> {
        let mut node = self.unary()?;

        while let Star | Slash = self.peek_type() {
            let operator = self.advance();
            let right = self.unary()?;
            node = binary(node, operator, right)?;
        }
        Ok(node)
    }

    fn unary(&mut self) -> Result<Node<'a>> {
        if let Minus | Bang = self.peek_type() {
            let operator = self.advance();
            self.descend(&operator)?;
            let right = self.unary()?;
            self.nesting -= 1;

            let depth = nested_depth(right.depth, &operator)?;
            let expr = Expr::Unary { operator, right: Box::new(right.expr) };
            return Ok(Node { expr, depth });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Node<'a>> {
        let literal = self.peek().literal;
        let value = match (self.peek_type(), literal) {
            (False, _) => LiteralValue::Boolean(false),
            (True, _) => LiteralValue::Boolean(true),
            (Nil, _) => LiteralValue::Nil,
            (Number, Some(Literal::Number(n))) => LiteralValue::Number(n),
            (Str, Some(Literal::Str(s))) => LiteralValue::Str(s),
            (LeftParen, _) => return self.grouping(),
            _ => return Err(ParseError::new(ParserErrorType::ExpectedExpression, self.peek())),
        };

        self.advance();
        Ok(Node { expr: Expr::Literal(value), depth: 1 })
    }

    fn grouping(&mut self) -> Result<Node<'a>> {
        let paren = self.advance();
        self.descend(&paren)?;
        let inner = self.expression()?;
        self.consume_or_error(RightParen, ParserErrorType::ExpectedRightParen)?;
        self.nesting -= 1;

        let depth = nested_depth(inner.depth, &paren)?;
        Ok(Node { expr: Expr::Grouping(Box::new(inner.expr)), depth })
    }
}

// Helpers
impl<'t, 'a> Parser<'t, 'a> {
    fn peek(&self) -> &Token<'a> {
        self.tokens.get(self.current).unwrap_or(&self.end)
    }

    fn peek_type(&self) -> TokenType {
        self.peek().token_type
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

    fn consume_or_error(
        &mut self,
        token_type: TokenType,
        error: ParserErrorType,
    ) -> Result<Token<'a>> {
        if self.peek_type() == token_type {
            Ok(self.advance())
        } else {
            Err(ParseError::new(error, self.peek()))
        }
    }

    /// Enters a unary operand or a grouping opened by `token`.
    fn descend(&mut self, token: &Token<'a>) -> Result<()> {
        self.nesting = nested_depth(self.nesting, token)?;
        Ok(())
    }
}

fn binary<'a>(left: Node<'a>, operator: Token<'a>, right: Node<'a>) -> Result<Node<'a>> {
    let depth = nested_depth(left.depth.max(right.depth), &operator)?;
    let expr = Expr::Binary { left: Box::new(left.expr), operator, right: Box::new(right.expr) };
    Ok(Node { expr, depth })
}

/// Depth of a node one level above `inner`, or `TooDeep` at `token`.
fn nested_depth(inner: usize, token: &Token) -> Result<usize> {
    let depth = inner + 1;
    if depth > MAX_DEPTH {
        log::debug!("Nesting limit of {} exceeded at line {}", MAX_DEPTH, token.line);
        return Err(ParseError::new(ParserErrorType::TooDeep, token));
    }
    Ok(depth)
}
