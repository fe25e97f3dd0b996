//! A small boolean expression language over a single numeric variable.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! or      := and  (("or" | "|" | "||") and)*
//! and     := not  (("and" | "&" | "&&") not)*
//! not     := ("not" | "~" | "!") not | cmp
//! cmp     := sum  (("<" | "<=" | ">" | ">=" | "==" | "!=") sum)*
//! sum     := prod (("+" | "-") prod)*
//! prod    := unary (("*" | "/") unary)*
//! unary   := "-" unary | atom
//! atom    := number | "nan" | "inf" | "true" | "false" | var | "(" or ")"
//! ```
//!
//! Keywords are case-insensitive. The variable is `val` or the value field
//! name (optionally in backticks). Comparison chains such as `0 < val <= 10`
//! mean `0 < val and val <= 10`.

use crate::TsIdxError;

/// Arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
}

impl CmpOp {
    fn apply(self, a: f64, b: f64) -> bool {
        match self {
            Self::Lt => a < b,
            Self::Le => a <= b,
            Self::Gt => a > b,
            Self::Ge => a >= b,
            Self::Eq => a == b,
            Self::Ne => a != b,
        }
    }
}

/// Compiled expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal.
    Num(f64),
    /// Boolean literal.
    Bool(bool),
    /// The bound variable.
    Var,
    /// Arithmetic negation.
    Neg(Box<Expr>),
    /// Logical negation.
    Not(Box<Expr>),
    /// Binary arithmetic.
    Arith(ArithOp, Box<Expr>, Box<Expr>),
    /// Comparison chain: `first op1 e1 op2 e2 ...`.
    Compare(Box<Expr>, Vec<(CmpOp, Expr)>),
    /// Logical conjunction.
    And(Box<Expr>, Box<Expr>),
    /// Logical disjunction.
    Or(Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy)]
enum Value {
    Num(f64),
    Bool(bool),
}

impl Value {
    const fn as_num(self) -> f64 {
        match self {
            Self::Num(x) => x,
            Self::Bool(true) => 1.0,
            Self::Bool(false) => 0.0,
        }
    }

    fn truthy(self) -> bool {
        match self {
            Self::Num(x) => x != 0.0,
            Self::Bool(b) => b,
        }
    }
}

impl Expr {
    /// Compile `text`, accepting `val` and `var_name` (case-insensitively)
    /// as the variable.
    ///
    /// ```
    /// use tsidx_core::timeseries::expr::Expr;
    ///
    /// let e = Expr::parse("val > 2 and val < 10", "price").unwrap();
    /// assert!(e.matches(5.0));
    /// assert!(!e.matches(10.0));
    /// let e = Expr::parse("0 <= PRICE * 2 <= 4", "price").unwrap();
    /// assert!(e.matches(2.0));
    /// assert!(Expr::parse("val >", "price").is_err());
    /// ```
    ///
    /// # Errors
    /// Returns `TsIdxError::InvalidFilter` on lexical or syntax errors, on
    /// unknown identifiers and on nesting deeper than 64 levels.
    pub fn parse(text: &str, var_name: &str) -> Result<Self, TsIdxError> {
        let tokens = lex(text, var_name)?;
        let mut p = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = p.or()?;
        match p.peek() {
            None => Ok(expr),
            Some(t) => Err(TsIdxError::InvalidFilter(format!(
                "unexpected {t:?} in {text:?}"
            ))),
        }
    }

    /// True when the expression holds for `x`.
    #[must_use]
    pub fn matches(&self, x: f64) -> bool {
        self.eval(x).truthy()
    }

    fn eval(&self, x: f64) -> Value {
        match self {
            Self::Num(n) => Value::Num(*n),
            Self::Bool(b) => Value::Bool(*b),
            Self::Var => Value::Num(x),
            Self::Neg(e) => Value::Num(-e.eval(x).as_num()),
            Self::Not(e) => Value::Bool(!e.eval(x).truthy()),
            Self::Arith(op, a, b) => {
                let (a, b) = (a.eval(x).as_num(), b.eval(x).as_num());
                Value::Num(match op {
                    ArithOp::Add => a + b,
                    ArithOp::Sub => a - b,
                    ArithOp::Mul => a * b,
                    ArithOp::Div => a / b,
                })
            }
            Self::Compare(first, rest) => {
                let mut lhs = first.eval(x).as_num();
                for (op, e) in rest {
                    let rhs = e.eval(x).as_num();
                    if !op.apply(lhs, rhs) {
                        return Value::Bool(false);
                    }
                    lhs = rhs;
                }
                Value::Bool(true)
            }
            Self::And(a, b) => Value::Bool(a.eval(x).truthy() && b.eval(x).truthy()),
            Self::Or(a, b) => Value::Bool(a.eval(x).truthy() || b.eval(x).truthy()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Var,
    True,
    False,
    And,
    Or,
    Not,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Cmp(CmpOp),
}

fn lex(text: &str, var_name: &str) -> Result<Vec<Token>, TsIdxError> {
    let err = |msg: String| TsIdxError::InvalidFilter(msg);
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                out.push(Token::LParen);
                i += 1;
            }
            ')' => {
                out.push(Token::RParen);
                i += 1;
            }
            '+' => {
                out.push(Token::Plus);
                i += 1;
            }
            '-' => {
                out.push(Token::Minus);
                i += 1;
            }
            '*' => {
                out.push(Token::Star);
                i += 1;
            }
            '/' => {
                out.push(Token::Slash);
                i += 1;
            }
            '~' => {
                out.push(Token::Not);
                i += 1;
            }
            '&' | '|' => {
                out.push(if c == '&' { Token::And } else { Token::Or });
                i += if next == Some(c) { 2 } else { 1 };
            }
            '<' | '>' | '=' | '!' => {
                let (tok, width) = match (c, next) {
                    ('<', Some('=')) => (Token::Cmp(CmpOp::Le), 2),
                    ('<', _) => (Token::Cmp(CmpOp::Lt), 1),
                    ('>', Some('=')) => (Token::Cmp(CmpOp::Ge), 2),
                    ('>', _) => (Token::Cmp(CmpOp::Gt), 1),
                    ('=', Some('=')) => (Token::Cmp(CmpOp::Eq), 2),
                    ('!', Some('=')) => (Token::Cmp(CmpOp::Ne), 2),
                    ('!', _) => (Token::Not, 1),
                    _ => return Err(err(format!("unexpected '=' at {i} in {text:?}"))),
                };
                out.push(tok);
                i += width;
            }
            '`' => {
                let start = i + 1;
                let Some(len) = chars[start..].iter().position(|&ch| ch == '`') else {
                    return Err(err(format!("unterminated backtick in {text:?}")));
                };
                let ident: String = chars[start..start + len].iter().collect();
                out.push(ident_token(&ident, var_name, text)?);
                i = start + len + 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                if i < chars.len() && matches!(chars[i], 'e' | 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && matches!(chars[j], '+' | '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let lit: String = chars[start..i].iter().collect();
                let n = lit
                    .parse::<f64>()
                    .map_err(|_| err(format!("bad number {lit:?} in {text:?}")))?;
                out.push(Token::Num(n));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.')
                {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                out.push(ident_token(&ident, var_name, text)?);
            }
            other => {
                return Err(err(format!("unexpected character {other:?} in {text:?}")));
            }
        }
    }
    Ok(out)
}

fn ident_token(ident: &str, var_name: &str, text: &str) -> Result<Token, TsIdxError> {
    let lower = ident.to_lowercase();
    Ok(match lower.as_str() {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "true" => Token::True,
        "false" => Token::False,
        "nan" => Token::Num(f64::NAN),
        "inf" | "infinity" => Token::Num(f64::INFINITY),
        "val" => Token::Var,
        _ if !var_name.is_empty() && lower == var_name.to_lowercase() => Token::Var,
        _ => {
            return Err(TsIdxError::InvalidFilter(format!(
                "unknown name {ident:?} in {text:?}"
            )));
        }
    })
}

/// Nesting limit for `not`, unary signs and parentheses.
const MAX_DEPTH: usize = 64;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn nested(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<Expr, TsIdxError>,
    ) -> Result<Expr, TsIdxError> {
        if self.depth >= MAX_DEPTH {
            return Err(TsIdxError::InvalidFilter(format!(
                "expression nested deeper than {MAX_DEPTH} levels"
            )));
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, t: &Token) -> bool {
        if self.peek() == Some(t) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or(&mut self) -> Result<Expr, TsIdxError> {
        let mut lhs = self.and()?;
        while self.eat(&Token::Or) {
            let rhs = self.and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, TsIdxError> {
        let mut lhs = self.not()?;
        while self.eat(&Token::And) {
            let rhs = self.not()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn not(&mut self) -> Result<Expr, TsIdxError> {
        if self.eat(&Token::Not) {
            let inner = self.nested(Self::not)?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.cmp()
    }

    fn cmp(&mut self) -> Result<Expr, TsIdxError> {
        let first = self.sum()?;
        let mut rest = Vec::new();
        while let Some(Token::Cmp(op)) = self.peek().cloned() {
            self.pos += 1;
            rest.push((op, self.sum()?));
        }
        Ok(if rest.is_empty() {
            first
        } else {
            Expr::Compare(Box::new(first), rest)
        })
    }

    fn sum(&mut self) -> Result<Expr, TsIdxError> {
        let mut lhs = self.prod()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => ArithOp::Add,
                Some(Token::Minus) => ArithOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.prod()?;
            lhs = Expr::Arith(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn prod(&mut self) -> Result<Expr, TsIdxError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => ArithOp::Mul,
                Some(Token::Slash) => ArithOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Arith(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> Result<Expr, TsIdxError> {
        if self.eat(&Token::Minus) {
            let inner = self.nested(Self::unary)?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        if self.eat(&Token::Plus) {
            return self.nested(Self::unary);
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Expr, TsIdxError> {
        let tok = self.peek().cloned();
        self.pos += 1;
        match tok {
            Some(Token::Num(n)) => Ok(Expr::Num(n)),
            Some(Token::Var) => Ok(Expr::Var),
            Some(Token::True) => Ok(Expr::Bool(true)),
            Some(Token::False) => Ok(Expr::Bool(false)),
            Some(Token::LParen) => {
                let inner = self.nested(Self::or)?;
                if self.eat(&Token::RParen) {
                    Ok(inner)
                } else {
                    Err(TsIdxError::InvalidFilter("missing ')'".into()))
                }
            }
            Some(t) => Err(TsIdxError::InvalidFilter(format!("unexpected {t:?}"))),
            None => Err(TsIdxError::InvalidFilter(
                "unexpected end of expression".into(),
            )),
        }
    }
}
