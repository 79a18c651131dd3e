//! Formula parsing.
//!
//! Converts the body of a formula (the text after `=`) into an [`Expr`] tree.
//! Parsing is a pure function: the grid is never consulted, so references
//! outside the grid parse fine and are caught by the evaluator.
//!
//! Grammar:
//!
//! ```text
//! sum    := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := NUMBER | REFERENCE | '(' sum ')' | '-' factor
//! ```

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use super::cell::formula_body;
use super::cell_ref::CellRef;
use super::error::ParseError;

/// Binary arithmetic operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
        }
    }

    fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }
}

/// A parsed formula.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Reference(CellRef),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Cells read by this formula, deduplicated, in order of first appearance.
    pub fn references(&self) -> Vec<CellRef> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references(&self, out: &mut Vec<CellRef>) {
        match self {
            Expr::Number(_) => {}
            Expr::Reference(cell) => {
                if !out.contains(cell) {
                    out.push(*cell);
                }
            }
            Expr::Negate(inner) => inner.collect_references(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_references(out);
                rhs.collect_references(out);
            }
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parent: BinaryOp, right: bool) -> fmt::Result {
        let needs_parens = match self {
            Expr::Binary { op, .. } => {
                op.precedence() < parent.precedence()
                    || (right
                        && op.precedence() == parent.precedence()
                        && matches!(parent, BinaryOp::Sub | BinaryOp::Div))
            }
            _ => false,
        };
        if needs_parens {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Reference(cell) => write!(f, "{}", cell),
            Expr::Negate(inner) => match inner.as_ref() {
                Expr::Binary { .. } => write!(f, "-({})", inner),
                _ => write!(f, "-{}", inner),
            },
            Expr::Binary { op, lhs, rhs } => {
                lhs.fmt_operand(f, *op, false)?;
                write!(f, "{}", op.symbol())?;
                rhs.fmt_operand(f, *op, true)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Reference(CellRef),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {}", n),
            Token::Reference(cell) => write!(f, "reference {}", cell),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Star => f.write_str("'*'"),
            Token::Slash => f.write_str("'/'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Eof => f.write_str("end of formula"),
        }
    }
}

/// Scans formula text into tokens, tracking character positions.
struct Lexer<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
    /// Characters consumed so far.
    char_pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer {
            src,
            chars: src.char_indices().peekable(),
            char_pos: 0,
        }
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if next.is_some() {
            self.char_pos += 1;
        }
        next
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Returns the next token and the character offset where it starts.
    fn next_token(&mut self) -> Result<(Token, usize), ParseError> {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.bump();
        }

        let start = self.char_pos;
        let Some((byte_start, ch)) = self.bump() else {
            return Ok((Token::Eof, start));
        };

        let token = match ch {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_ascii_digit() || c == '.' => self.read_number(byte_start, start)?,
            c if c.is_ascii_alphabetic() => self.read_reference(byte_start, start)?,
            other => {
                return Err(ParseError::new(
                    start,
                    format!("unexpected character '{}'", other),
                ));
            }
        };
        Ok((token, start))
    }

    fn end_of(&mut self) -> usize {
        self.chars.peek().map(|&(i, _)| i).unwrap_or(self.src.len())
    }

    fn read_number(&mut self, byte_start: usize, start: usize) -> Result<Token, ParseError> {
        while self
            .peek_char()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.bump();
        }
        if self.peek_char().is_some_and(|c| c == 'e' || c == 'E') {
            self.bump();
            if self.peek_char().is_some_and(|c| c == '+' || c == '-') {
                self.bump();
            }
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        let end = self.end_of();
        let text = &self.src[byte_start..end];
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Token::Number(n)),
            Ok(_) => Err(ParseError::new(start, format!("number out of range '{}'", text))),
            Err(_) => Err(ParseError::new(start, format!("invalid number '{}'", text))),
        }
    }

    fn read_reference(&mut self, byte_start: usize, start: usize) -> Result<Token, ParseError> {
        while self.peek_char().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.bump();
        }
        let letters_end = self.end_of();
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        let end = self.end_of();
        let name = &self.src[byte_start..end];

        if letters_end == end {
            // Function library hook: NAME( ... ) would be dispatched here.
            let mut rest = self.src[end..].chars().skip_while(|c| c.is_whitespace());
            if rest.next() == Some('(') {
                return Err(ParseError::new(
                    start,
                    format!("unknown function '{}'", name),
                ));
            }
            return Err(ParseError::new(start, format!("unknown name '{}'", name)));
        }
        if self.peek_char().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ParseError::new(start, format!("invalid reference near '{}'", name)));
        }

        CellRef::decode(&name.to_ascii_uppercase())
            .map(Token::Reference)
            .map_err(|_| ParseError::new(start, format!("invalid reference '{}'", name)))
    }
}

/// Deepest expression tree the parser will build. Evaluation, display and
/// drop all recurse over the tree, so this also bounds their stack use.
pub const MAX_DEPTH: usize = 256;

/// Recursive descent parser over the lexer's token stream.
///
/// Each production returns the parsed expression with its tree depth.
struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    position: usize,
    /// Open parentheses and unary minuses on the call stack.
    nesting: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(src);
        let (current, position) = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current,
            position,
            nesting: 0,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        let (token, position) = self.lexer.next_token()?;
        self.current = token;
        self.position = position;
        Ok(())
    }

    fn check_depth(&self, depth: usize) -> Result<(), ParseError> {
        if depth > MAX_DEPTH {
            return Err(ParseError::new(self.position, "formula nested too deeply"));
        }
        Ok(())
    }

    fn parse(mut self) -> Result<Expr, ParseError> {
        if self.current == Token::Eof {
            return Err(ParseError::new(self.position, "empty formula"));
        }
        let (expr, _) = self.parse_sum()?;
        if self.current != Token::Eof {
            return Err(ParseError::new(
                self.position,
                format!("unexpected {} after expression", self.current),
            ));
        }
        Ok(expr)
    }

    fn parse_sum(&mut self) -> Result<(Expr, usize), ParseError> {
        let (mut lhs, mut depth) = self.parse_term()?;
        loop {
            let op = match self.current {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => return Ok((lhs, depth)),
            };
            self.advance()?;
            let (rhs, rhs_depth) = self.parse_term()?;
            depth = depth.max(rhs_depth) + 1;
            self.check_depth(depth)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_term(&mut self) -> Result<(Expr, usize), ParseError> {
        let (mut lhs, mut depth) = self.parse_factor()?;
        loop {
            let op = match self.current {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                _ => return Ok((lhs, depth)),
            };
            self.advance()?;
            let (rhs, rhs_depth) = self.parse_factor()?;
            depth = depth.max(rhs_depth) + 1;
            self.check_depth(depth)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_factor(&mut self) -> Result<(Expr, usize), ParseError> {
        match self.current.clone() {
            Token::Number(n) => {
                self.advance()?;
                Ok((Expr::Number(n), 1))
            }
            Token::Reference(cell) => {
                self.advance()?;
                Ok((Expr::Reference(cell), 1))
            }
            Token::Minus => {
                self.nest()?;
                self.advance()?;
                let (inner, depth) = self.parse_factor()?;
                self.nesting -= 1;
                Ok((Expr::Negate(Box::new(inner)), depth + 1))
            }
            Token::LParen => {
                let open = self.position;
                self.nest()?;
                self.advance()?;
                let inner = self.parse_sum()?;
                if self.current != Token::RParen {
                    return Err(ParseError::new(
                        self.position,
                        format!("expected ')' to close '(' at {}, found {}", open, self.current),
                    ));
                }
                self.advance()?;
                self.nesting -= 1;
                Ok(inner)
            }
            other => Err(ParseError::new(
                self.position,
                format!("expected a number, reference or '(', found {}", other),
            )),
        }
    }

    fn nest(&mut self) -> Result<(), ParseError> {
        self.nesting += 1;
        self.check_depth(self.nesting)
    }
}

/// Parse a formula body (without the leading marker).
pub fn parse_formula(body: &str) -> Result<Expr, ParseError> {
    Parser::new(body)?.parse()
}

/// Parse raw cell input. Literals are never parsed and yield `None`.
pub fn parse_input(input: &str) -> Option<Result<Expr, ParseError>> {
    formula_body(input).map(parse_formula)
}
