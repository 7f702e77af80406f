//! Plural expression language.
//!
//! A C-style expression over the single variable `n`: integer literals,
//! ternary `?:`, `||`, `&&`, `!`, unary `-`, equality, relational comparison, and
//! `+ - * / %`. Booleans are the integers 0 and 1.

use super::PluralFormsError;

/// Characters that may appear in a plural expression. Everything else is
/// deleted before parsing.
const ALLOWED: &str = "0123456789n()?:!<>=&|%+-*/ ";

/// Delete every character outside the allowed set.
pub(crate) fn sanitize(source: &str) -> String {
	source.chars().filter(|c| ALLOWED.contains(*c)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
	Or,
	And,
	Eq,
	Ne,
	Lt,
	Le,
	Gt,
	Ge,
	Add,
	Sub,
	Mul,
	Div,
	Rem,
}

impl BinaryOp {
	/// Binding strength; higher binds tighter. All levels are left-associative.
	fn precedence(self) -> u8 {
		match self {
			Self::Or => 1,
			Self::And => 2,
			Self::Eq | Self::Ne => 3,
			Self::Lt | Self::Le | Self::Gt | Self::Ge => 4,
			Self::Add | Self::Sub => 5,
			Self::Mul | Self::Div | Self::Rem => 6,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Expr {
	Number(i64),
	N,
	Not(Box<Expr>),
	Neg(Box<Expr>),
	Binary(BinaryOp, Box<Expr>, Box<Expr>),
	Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
}

/// Failure while evaluating an expression for a particular `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub(crate) enum EvalError {
	#[error("division by zero")]
	DivisionByZero,
	#[error("arithmetic overflow")]
	Overflow,
}

impl Expr {
	/// Parse an already sanitized expression.
	pub(crate) fn parse(source: &str) -> Result<Self, PluralFormsError> {
		let tokens = tokenize(source)?;
		if tokens.is_empty() {
			return Err(PluralFormsError::EmptyExpression);
		}
		let mut parser = Parser { tokens, pos: 0 };
		let expr = parser.ternary()?;
		match parser.tokens.get(parser.pos) {
			None => Ok(expr),
			Some(&(position, token)) => Err(PluralFormsError::UnexpectedToken {
				position,
				token: token.to_string(),
			}),
		}
	}

	pub(crate) fn eval(&self, n: i64) -> Result<i64, EvalError> {
		Ok(match self {
			Self::Number(value) => *value,
			Self::N => n,
			Self::Not(inner) => i64::from(inner.eval(n)? == 0),
			Self::Neg(inner) => inner.eval(n)?.checked_neg().ok_or(EvalError::Overflow)?,
			Self::Ternary(cond, then, otherwise) => {
				if cond.eval(n)? != 0 {
					then.eval(n)?
				} else {
					otherwise.eval(n)?
				}
			}
			Self::Binary(BinaryOp::And, lhs, rhs) => {
				i64::from(lhs.eval(n)? != 0 && rhs.eval(n)? != 0)
			}
			Self::Binary(BinaryOp::Or, lhs, rhs) => {
				i64::from(lhs.eval(n)? != 0 || rhs.eval(n)? != 0)
			}
			Self::Binary(op, lhs, rhs) => {
				let (a, b) = (lhs.eval(n)?, rhs.eval(n)?);
				match op {
					BinaryOp::Eq => i64::from(a == b),
					BinaryOp::Ne => i64::from(a != b),
					BinaryOp::Lt => i64::from(a < b),
					BinaryOp::Le => i64::from(a <= b),
					BinaryOp::Gt => i64::from(a > b),
					BinaryOp::Ge => i64::from(a >= b),
					BinaryOp::Add => a.checked_add(b).ok_or(EvalError::Overflow)?,
					BinaryOp::Sub => a.checked_sub(b).ok_or(EvalError::Overflow)?,
					BinaryOp::Mul => a.checked_mul(b).ok_or(EvalError::Overflow)?,
					BinaryOp::Div | BinaryOp::Rem if b == 0 => {
						return Err(EvalError::DivisionByZero);
					}
					BinaryOp::Div => a.checked_div(b).ok_or(EvalError::Overflow)?,
					BinaryOp::Rem => a.checked_rem(b).ok_or(EvalError::Overflow)?,
					BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
				}
			}
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
	Number(i64),
	N,
	LParen,
	RParen,
	Question,
	Colon,
	Not,
	Op(BinaryOp),
}

impl std::fmt::Display for Token {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let text = match self {
			Self::Number(value) => return write!(f, "{value}"),
			Self::N => "n",
			Self::LParen => "(",
			Self::RParen => ")",
			Self::Question => "?",
			Self::Colon => ":",
			Self::Not => "!",
			Self::Op(op) => match op {
				BinaryOp::Or => "||",
				BinaryOp::And => "&&",
				BinaryOp::Eq => "==",
				BinaryOp::Ne => "!=",
				BinaryOp::Lt => "<",
				BinaryOp::Le => "<=",
				BinaryOp::Gt => ">",
				BinaryOp::Ge => ">=",
				BinaryOp::Add => "+",
				BinaryOp::Sub => "-",
				BinaryOp::Mul => "*",
				BinaryOp::Div => "/",
				BinaryOp::Rem => "%",
			},
		};
		f.write_str(text)
	}
}

fn tokenize(source: &str) -> Result<Vec<(usize, Token)>, PluralFormsError> {
	let bytes = source.as_bytes();
	let mut tokens = Vec::new();
	let mut pos = 0;

	while pos < bytes.len() {
		let start = pos;
		let next = bytes.get(pos + 1).copied();
		let token = match bytes[pos] {
			b' ' => {
				pos += 1;
				continue;
			}
			b'0'..=b'9' => {
				while pos < bytes.len() && bytes[pos].is_ascii_digit() {
					pos += 1;
				}
				let digits = &source[start..pos];
				let value = digits
					.parse::<i64>()
					.map_err(|_| PluralFormsError::NumberOverflow(digits.to_string()))?;
				tokens.push((start, Token::Number(value)));
				continue;
			}
			b'n' => Token::N,
			b'(' => Token::LParen,
			b')' => Token::RParen,
			b'?' => Token::Question,
			b':' => Token::Colon,
			b'+' => Token::Op(BinaryOp::Add),
			b'-' => Token::Op(BinaryOp::Sub),
			b'*' => Token::Op(BinaryOp::Mul),
			b'/' => Token::Op(BinaryOp::Div),
			b'%' => Token::Op(BinaryOp::Rem),
			b'!' if next == Some(b'=') => {
				pos += 1;
				Token::Op(BinaryOp::Ne)
			}
			b'!' => Token::Not,
			b'=' if next == Some(b'=') => {
				pos += 1;
				Token::Op(BinaryOp::Eq)
			}
			b'<' if next == Some(b'=') => {
				pos += 1;
				Token::Op(BinaryOp::Le)
			}
			b'<' => Token::Op(BinaryOp::Lt),
			b'>' if next == Some(b'=') => {
				pos += 1;
				Token::Op(BinaryOp::Ge)
			}
			b'>' => Token::Op(BinaryOp::Gt),
			b'&' if next == Some(b'&') => {
				pos += 1;
				Token::Op(BinaryOp::And)
			}
			b'|' if next == Some(b'|') => {
				pos += 1;
				Token::Op(BinaryOp::Or)
			}
			other => {
				return Err(PluralFormsError::UnexpectedToken {
					position: start,
					token: char::from(other).to_string(),
				});
			}
		};
		pos += 1;
		tokens.push((start, token));
	}

	Ok(tokens)
}

struct Parser {
	tokens: Vec<(usize, Token)>,
	pos: usize,
}

impl Parser {
	fn peek(&self) -> Option<Token> {
		self.tokens.get(self.pos).map(|&(_, token)| token)
	}

	fn advance(&mut self) -> Option<Token> {
		let token = self.peek()?;
		self.pos += 1;
		Some(token)
	}

	fn expect(&mut self, expected: Token) -> Result<(), PluralFormsError> {
		match self.tokens.get(self.pos) {
			Some(&(_, token)) if token == expected => {
				self.pos += 1;
				Ok(())
			}
			Some(&(position, token)) => Err(PluralFormsError::UnexpectedToken {
				position,
				token: token.to_string(),
			}),
			None => Err(PluralFormsError::UnexpectedEnd),
		}
	}

	fn ternary(&mut self) -> Result<Expr, PluralFormsError> {
		let cond = self.binary(1)?;
		if self.peek() != Some(Token::Question) {
			return Ok(cond);
		}
		self.pos += 1;
		let then = self.ternary()?;
		self.expect(Token::Colon)?;
		let otherwise = self.ternary()?;
		Ok(Expr::Ternary(
			Box::new(cond),
			Box::new(then),
			Box::new(otherwise),
		))
	}

	fn binary(&mut self, min_precedence: u8) -> Result<Expr, PluralFormsError> {
		let mut lhs = self.unary()?;
		while let Some(Token::Op(op)) = self.peek() {
			let precedence = op.precedence();
			if precedence < min_precedence {
				break;
			}
			self.pos += 1;
			let rhs = self.binary(precedence + 1)?;
			lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
		}
		Ok(lhs)
	}

	fn unary(&mut self) -> Result<Expr, PluralFormsError> {
		match self.peek() {
			Some(Token::Not) => {
				self.pos += 1;
				Ok(Expr::Not(Box::new(self.unary()?)))
			}
			Some(Token::Op(BinaryOp::Sub)) => {
				self.pos += 1;
				Ok(Expr::Neg(Box::new(self.unary()?)))
			}
			_ => self.primary(),
		}
	}

	fn primary(&mut self) -> Result<Expr, PluralFormsError> {
		let position = self.tokens.get(self.pos).map(|&(p, _)| p);
		match self.advance() {
			Some(Token::Number(value)) => Ok(Expr::Number(value)),
			Some(Token::N) => Ok(Expr::N),
			Some(Token::LParen) => {
				let inner = self.ternary()?;
				self.expect(Token::RParen)?;
				Ok(inner)
			}
			Some(token) => Err(PluralFormsError::UnexpectedToken {
				position: position.unwrap_or_default(),
				token: token.to_string(),
			}),
			None => Err(PluralFormsError::UnexpectedEnd),
		}
	}
}
