//! Recursive-descent formula parser
//!
//! Precedence, loosest first:
//!
//! ```text
//! conditional  = or ( "?" conditional ":" conditional )?
//! or           = and ( "or" and )*
//! and          = comparison ( "and" comparison )*
//! comparison   = additive ( ("==" | "!=" | "<" | "<=" | ">" | ">=") additive )*
//! additive     = term ( ("+" | "-" | "||") term )*
//! term         = unary ( ("*" | "/" | "%") unary )*
//! unary        = ("-" | "+" | "not") unary | power
//! power        = primary ( "^" unary )?
//! primary      = number | string | true | false | null
//!              | ident ( "(" args? ")" )? | "(" conditional ")"
//! ```

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::lexer::{Lexer, Span, Token, TokenKind};
use super::value::Value;
use super::EvalError;

/// Deepest expression tree a formula may build. Bounds the recursion of
/// parsing, evaluation and drop alike.
pub const MAX_DEPTH: usize = 128;

/// Parse a formula into an expression tree.
pub fn parse(source: &str) -> Result<Expr, EvalError> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser::new(tokens);
    if parser.at_eof() {
        return Err(EvalError::parse(0, "empty formula"));
    }
    let expr = parser.parse_conditional()?;
    if !parser.at_eof() {
        let token = parser.advance();
        return Err(EvalError::parse(
            token.span.start,
            format!("unexpected {}", describe(&token.kind)),
        ));
    }
    Ok(expr)
}

// `depth` counts the tree levels opened above the current token: one per
// conditional, unary operator and chained binary operator. A failed parse
// is discarded, so only the success paths restore it.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn descend(&mut self) -> Result<(), EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::parse(self.peek_span().start, "formula nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_conditional(&mut self) -> Result<Expr, EvalError> {
        let mark = self.depth;
        self.descend()?;
        let cond = self.parse_or()?;
        let expr = if self.check(&TokenKind::Question) {
            self.advance();
            let then = self.parse_conditional()?;
            self.expect(TokenKind::Colon)?;
            let otherwise = self.parse_conditional()?;
            Expr::Conditional {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            }
        } else {
            cond
        };
        self.depth = mark;
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<Expr, EvalError> {
        let mark = self.depth;
        let mut lhs = self.parse_and()?;
        while self.check(&TokenKind::Or) {
            self.advance();
            self.descend()?;
            let rhs = self.parse_and()?;
            lhs = binary(BinaryOp::Or, lhs, rhs);
        }
        self.depth = mark;
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, EvalError> {
        let mark = self.depth;
        let mut lhs = self.parse_comparison()?;
        while self.check(&TokenKind::And) {
            self.advance();
            self.descend()?;
            let rhs = self.parse_comparison()?;
            lhs = binary(BinaryOp::And, lhs, rhs);
        }
        self.depth = mark;
        Ok(lhs)
    }

    fn parse_comparison(&mut self) -> Result<Expr, EvalError> {
        let mark = self.depth;
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Ne,
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Ge => BinaryOp::Ge,
                _ => {
                    self.depth = mark;
                    return Ok(lhs);
                }
            };
            self.advance();
            self.descend()?;
            let rhs = self.parse_additive()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, EvalError> {
        let mark = self.depth;
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                TokenKind::Concat => BinaryOp::Concat,
                _ => {
                    self.depth = mark;
                    return Ok(lhs);
                }
            };
            self.advance();
            self.descend()?;
            let rhs = self.parse_term()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_term(&mut self) -> Result<Expr, EvalError> {
        let mark = self.depth;
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => {
                    self.depth = mark;
                    return Ok(lhs);
                }
            };
            self.advance();
            self.descend()?;
            let rhs = self.parse_unary()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, EvalError> {
        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Not => UnaryOp::Not,
            _ => return self.parse_power(),
        };
        self.advance();
        let mark = self.depth;
        self.descend()?;
        let operand = self.parse_unary()?;
        self.depth = mark;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    // `-2 ^ 2` is `-(2 ^ 2)`; the exponent may carry its own sign.
    fn parse_power(&mut self) -> Result<Expr, EvalError> {
        let base = self.parse_primary()?;
        if !self.check(&TokenKind::Caret) {
            return Ok(base);
        }
        self.advance();
        let mark = self.depth;
        self.descend()?;
        let exponent = self.parse_unary()?;
        self.depth = mark;
        Ok(binary(BinaryOp::Pow, base, exponent))
    }

    fn parse_primary(&mut self) -> Result<Expr, EvalError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(n) => Ok(Expr::Literal(Value::Number(n))),
            TokenKind::Str(s) => Ok(Expr::Literal(Value::Text(s))),
            TokenKind::True => Ok(Expr::Literal(Value::Bool(true))),
            TokenKind::False => Ok(Expr::Literal(Value::Bool(false))),
            TokenKind::Null => Ok(Expr::Literal(Value::Null)),
            TokenKind::Ident(name) => {
                if self.check(&TokenKind::LParen) {
                    self.advance();
                    let args = self.parse_args()?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            TokenKind::LParen => {
                let inner = self.parse_conditional()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            other => Err(EvalError::parse(
                token.span.start,
                format!("expected a value, found {}", describe(&other)),
            )),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, EvalError> {
        let mut args = Vec::new();
        if self.check(&TokenKind::RParen) {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_conditional()?);
            if self.check(&TokenKind::Comma) {
                self.advance();
                continue;
            }
            self.expect(TokenKind::RParen)?;
            return Ok(args);
        }
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn at_eof(&self) -> bool {
        self.check(&TokenKind::Eof)
    }

    // Never moves past the trailing Eof.
    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token, EvalError> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(EvalError::parse(
                self.peek_span().start,
                format!("expected {}, found {}", describe(&expected), describe(self.peek_kind())),
            ))
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Number(n) => format!("number {}", n),
        TokenKind::Str(s) => format!("string {:?}", s),
        TokenKind::Ident(name) => format!("identifier '{}'", name),
        TokenKind::True => "'true'".into(),
        TokenKind::False => "'false'".into(),
        TokenKind::Null => "'null'".into(),
        TokenKind::And => "'and'".into(),
        TokenKind::Or => "'or'".into(),
        TokenKind::Not => "'not'".into(),
        TokenKind::Plus => "'+'".into(),
        TokenKind::Minus => "'-'".into(),
        TokenKind::Star => "'*'".into(),
        TokenKind::Slash => "'/'".into(),
        TokenKind::Percent => "'%'".into(),
        TokenKind::Caret => "'^'".into(),
        TokenKind::Concat => "'||'".into(),
        TokenKind::EqEq => "'=='".into(),
        TokenKind::NotEq => "'!='".into(),
        TokenKind::Lt => "'<'".into(),
        TokenKind::Le => "'<='".into(),
        TokenKind::Gt => "'>'".into(),
        TokenKind::Ge => "'>='".into(),
        TokenKind::Question => "'?'".into(),
        TokenKind::Colon => "':'".into(),
        TokenKind::LParen => "'('".into(),
        TokenKind::RParen => "')'".into(),
        TokenKind::Comma => "','".into(),
        TokenKind::Eof => "end of formula".into(),
    }
}
