//! Plural rule compiled from a `Plural-Forms` header.
//!
//! The header has the shape `nplurals=N; plural=EXPR;`. The expression comes
//! from untrusted catalog data, so it is reduced to a fixed character set and
//! parsed into a small syntax tree before it is ever evaluated.

mod expr;

use expr::Expr;
use once_cell::sync::Lazy;
use regex::Regex;

static NPLURALS_RE: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"nplurals\s*=\s*(\d+)").expect("valid nplurals regex"));
static PLURAL_RE: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"plural\s*=\s*([^;]+)").expect("valid plural regex"));

/// Why a `Plural-Forms` value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum PluralFormsError {
	/// No `nplurals=N` directive.
	#[error("missing nplurals directive")]
	MissingNplurals,
	/// No `plural=EXPR` directive.
	#[error("missing plural expression")]
	MissingPlural,
	/// `nplurals` is zero or does not fit in `usize`.
	#[error("invalid nplurals value: {0}")]
	InvalidNplurals(String),
	/// Nothing was left of the expression after sanitizing.
	#[error("empty plural expression")]
	EmptyExpression,
	/// A token appeared where it cannot.
	#[error("unexpected '{token}' at position {position}")]
	UnexpectedToken {
		/// Offset in the sanitized expression.
		position: usize,
		/// The offending token.
		token: String,
	},
	/// The expression stopped in the middle of a construct.
	#[error("unexpected end of plural expression")]
	UnexpectedEnd,
	/// An integer literal does not fit in 64 bits.
	#[error("integer literal out of range: {0}")]
	NumberOverflow(String),
}

/// A compiled plural rule: the number of forms and a classifier from count to
/// form index.
///
/// The default rule has two forms and selects index 0 only for `n == 1`.
///
/// # Example
/// ```
/// use reinhardt_gettext::PluralRule;
///
/// let rule = PluralRule::compile("nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10||n%100>=20) ? 1 : 2);");
///
/// assert_eq!(rule.nplurals(), 3);
/// assert_eq!(rule.index(1), 0);
/// assert_eq!(rule.index(3), 1);
/// assert_eq!(rule.index(11), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralRule {
	nplurals: usize,
	expr: Option<Expr>,
}

impl Default for PluralRule {
	fn default() -> Self {
		Self {
			nplurals: 2,
			expr: None,
		}
	}
}

impl PluralRule {
	/// Compile a `Plural-Forms` value, falling back to the default rule.
	///
	/// A rejected value is reported through a `tracing` warning. Use
	/// [`PluralRule::try_parse`] to get the reason instead.
	pub fn compile(plural_forms: &str) -> Self {
		Self::try_parse(plural_forms).unwrap_or_else(|err| {
			tracing::warn!(
				plural_forms = %plural_forms,
				error = %err,
				"Failed to parse plural forms, using default rule"
			);
			Self::default()
		})
	}

	/// Compile a `Plural-Forms` value, reporting why it was rejected.
	pub fn try_parse(plural_forms: &str) -> Result<Self, PluralFormsError> {
		let nplurals = NPLURALS_RE
			.captures(plural_forms)
			.and_then(|caps| caps.get(1))
			.ok_or(PluralFormsError::MissingNplurals)?
			.as_str();
		let expression = PLURAL_RE
			.captures(plural_forms)
			.and_then(|caps| caps.get(1))
			.ok_or(PluralFormsError::MissingPlural)?
			.as_str();

		let nplurals = match nplurals.parse::<usize>() {
			Ok(0) | Err(_) => {
				return Err(PluralFormsError::InvalidNplurals(nplurals.to_string()));
			}
			Ok(value) => value,
		};
		let expr = Expr::parse(&expr::sanitize(expression.trim()))?;

		Ok(Self {
			nplurals,
			expr: Some(expr),
		})
	}

	/// Number of plural forms the catalog declares.
	pub fn nplurals(&self) -> usize {
		self.nplurals
	}

	/// Whether this is the built-in two-form rule.
	pub fn is_default(&self) -> bool {
		self.expr.is_none()
	}

	/// Select the plural form index for `n`.
	///
	/// If evaluation fails (division by zero, overflow) or yields a negative
	/// value, the default classification is used for this call. Values past
	/// the last form select the last form.
	pub fn index(&self, n: u64) -> usize {
		let Some(expr) = &self.expr else {
			return default_index(n);
		};

		let result = i64::try_from(n)
			.map_err(|_| expr::EvalError::Overflow)
			.and_then(|n| expr.eval(n));
		match result.map(usize::try_from) {
			Ok(Ok(index)) => index.min(self.nplurals - 1),
			Ok(Err(_)) => {
				tracing::debug!(
					n,
					"Plural expression returned a negative index, using default rule"
				);
				default_index(n)
			}
			Err(err) => {
				tracing::debug!(n, error = %err, "Plural expression failed, using default rule");
				default_index(n)
			}
		}
	}
}

fn default_index(n: u64) -> usize {
	if n == 1 { 0 } else { 1 }
}
