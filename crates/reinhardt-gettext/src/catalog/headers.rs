//! Header block of a catalog.
//!
//! The header entry's translation is a newline-delimited list of
//! `Name: value` lines. Names are case-insensitive and stored lowercased;
//! later lines overwrite earlier ones.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const CONTENT_TYPE: &str = "content-type";
const LANGUAGE: &str = "language";
const PLURAL_FORMS: &str = "plural-forms";

/// Header fields of a catalog.
///
/// The well-known fields have dedicated accessors; every other header is
/// available through [`Headers::get`] and [`Headers::iter`].
///
/// # Example
/// ```
/// use reinhardt_gettext::Headers;
///
/// let headers = Headers::parse_block("Language: fr\nX-Generator: Poedit 3.4\n");
///
/// assert_eq!(headers.language(), Some("fr"));
/// assert_eq!(headers.get("x-generator"), Some("Poedit 3.4"));
/// assert_eq!(headers.get("X-Generator"), Some("Poedit 3.4"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct Headers {
	content_type: Option<String>,
	language: Option<String>,
	plural_forms: Option<String>,
	extra: BTreeMap<String, String>,
}

impl Headers {
	/// Create an empty header set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse a header block into a fresh header set.
	pub fn parse_block(block: &str) -> Self {
		let mut headers = Self::new();
		headers.merge_block(block);
		headers
	}

	/// Parse a header block and merge it into this set.
	///
	/// Lines without a colon, or with an empty name or value, are skipped.
	pub fn merge_block(&mut self, block: &str) {
		for line in block.split('\n') {
			let Some((name, value)) = line.trim().split_once(':') else {
				continue;
			};
			let value = value.trim();
			if name.trim().is_empty() || value.is_empty() {
				continue;
			}
			self.insert(name, value);
		}
	}

	/// Set a header, replacing any previous value under the same name.
	pub fn insert(&mut self, name: &str, value: impl Into<String>) {
		let name = name.trim().to_lowercase();
		let value = value.into();
		match name.as_str() {
			CONTENT_TYPE => self.content_type = Some(value),
			LANGUAGE => self.language = Some(value),
			PLURAL_FORMS => self.plural_forms = Some(value),
			_ => {
				self.extra.insert(name, value);
			}
		}
	}

	/// Look up a header by name, ignoring case.
	pub fn get(&self, name: &str) -> Option<&str> {
		let name = name.trim().to_lowercase();
		match name.as_str() {
			CONTENT_TYPE => self.content_type.as_deref(),
			LANGUAGE => self.language.as_deref(),
			PLURAL_FORMS => self.plural_forms.as_deref(),
			other => self.extra.get(other).map(String::as_str),
		}
	}

	/// `Content-Type`, passed through untouched.
	pub fn content_type(&self) -> Option<&str> {
		self.content_type.as_deref()
	}

	/// `Language`, passed through untouched.
	pub fn language(&self) -> Option<&str> {
		self.language.as_deref()
	}

	/// `Plural-Forms`, which drives plural selection.
	pub fn plural_forms(&self) -> Option<&str> {
		self.plural_forms.as_deref()
	}

	/// Iterate over `(lowercased name, value)` pairs.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		let known = [
			(CONTENT_TYPE, self.content_type.as_deref()),
			(LANGUAGE, self.language.as_deref()),
			(PLURAL_FORMS, self.plural_forms.as_deref()),
		];
		known
			.into_iter()
			.filter_map(|(name, value)| value.map(|v| (name, v)))
			.chain(self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str())))
	}

	/// Number of headers present.
	pub fn len(&self) -> usize {
		self.iter().count()
	}

	/// Whether no header is present.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl From<BTreeMap<String, String>> for Headers {
	fn from(map: BTreeMap<String, String>) -> Self {
		let mut headers = Self::new();
		for (name, value) in map {
			headers.insert(&name, value);
		}
		headers
	}
}

impl From<Headers> for BTreeMap<String, String> {
	fn from(headers: Headers) -> Self {
		headers
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}
}
