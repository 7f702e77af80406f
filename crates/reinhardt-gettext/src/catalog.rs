//! Message catalog for storing parsed translations
//!
//! Both the textual and the binary parser produce a [`ParsedCatalog`]: a
//! [`Catalog`] keyed by lookup key plus the [`Headers`] taken from the header
//! entry (the one whose source text is empty).

mod headers;

pub use headers::Headers;

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Separator between context and source text in a lookup key.
///
/// Matches the on-disk convention of both `.po` and `.mo` catalogs.
pub const CONTEXT_SEPARATOR: char = '\u{4}';

/// Build the lookup key for a source text qualified by `context`.
///
/// # Example
///
/// ```
/// use reinhardt_gettext::key_with_context;
///
/// assert_eq!(key_with_context("menu", "Save"), "menu\u{4}Save");
/// ```
pub fn key_with_context(context: &str, id: &str) -> String {
	let mut key = String::with_capacity(context.len() + id.len() + 1);
	key.push_str(context);
	key.push(CONTEXT_SEPARATOR);
	key.push_str(id);
	key
}

/// A single translation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
	/// Source text (`msgid`).
	pub id: String,
	/// Disambiguating context (`msgctxt`).
	#[serde(default)]
	pub context: Option<String>,
	/// Plural source text (`msgid_plural`), kept for reference only.
	#[serde(default)]
	pub plural_id: Option<String>,
	#[serde(deserialize_with = "deserialize_translations")]
	translations: Vec<String>,
}

/// Keep at least one slot, as [`CatalogEntry::new`] does.
fn deserialize_translations<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let mut translations = Vec::<String>::deserialize(deserializer)?;
	if translations.is_empty() {
		translations.push(String::new());
	}
	Ok(translations)
}

impl CatalogEntry {
	/// Create an entry with the given translations.
	///
	/// Index 0 is the singular form, higher indices are plural forms. An
	/// empty list is stored as a single empty translation so that every entry
	/// holds at least one slot.
	pub fn new(id: impl Into<String>, translations: Vec<String>) -> Self {
		let translations = if translations.is_empty() {
			vec![String::new()]
		} else {
			translations
		};
		Self {
			id: id.into(),
			context: None,
			plural_id: None,
			translations,
		}
	}

	/// Set the context of this entry.
	pub fn with_context(mut self, context: impl Into<String>) -> Self {
		self.context = Some(context.into());
		self
	}

	/// Set the plural source text of this entry.
	pub fn with_plural_id(mut self, plural_id: impl Into<String>) -> Self {
		self.plural_id = Some(plural_id.into());
		self
	}

	/// The lookup key this entry is stored under.
	pub fn key(&self) -> String {
		match &self.context {
			Some(context) => key_with_context(context, &self.id),
			None => self.id.clone(),
		}
	}

	/// All stored translation forms, singular first.
	pub fn translations(&self) -> &[String] {
		&self.translations
	}

	/// The singular translation, if it is not empty.
	pub fn singular(&self) -> Option<&str> {
		self.form(0)
	}

	/// The plural form at `index`, clamped to the last stored form.
	///
	/// Returns `None` when the selected slot is empty.
	pub fn plural_form(&self, index: usize) -> Option<&str> {
		let last = self.translations.len().saturating_sub(1);
		self.form(index.min(last))
	}

	fn form(&self, index: usize) -> Option<&str> {
		self.translations
			.get(index)
			.map(String::as_str)
			.filter(|s| !s.is_empty())
	}
}

/// Mapping from lookup key to [`CatalogEntry`].
///
/// # Example
/// ```
/// use reinhardt_gettext::{Catalog, CatalogEntry};
///
/// let mut catalog = Catalog::new();
/// let entry = CatalogEntry::new("Save", vec!["Enregistrer".to_string()]).with_context("button");
/// catalog.insert(entry);
///
/// assert!(catalog.get("Save").is_none());
/// assert_eq!(
///     catalog.get_with_context("button", "Save").and_then(|e| e.singular()),
///     Some("Enregistrer")
/// );
/// ```
///
/// Serialized as a map from lookup key to entry. On deserialization the keys
/// are recomputed from the entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
	entries: HashMap<String, CatalogEntry>,
}

impl<'de> Deserialize<'de> for Catalog {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let entries = HashMap::<String, CatalogEntry>::deserialize(deserializer)?;
		let mut catalog = Catalog::new();
		for entry in entries.into_values() {
			catalog.insert(entry);
		}
		Ok(catalog)
	}
}

impl Catalog {
	/// Create an empty catalog.
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert an entry under its computed key, replacing any previous entry.
	pub fn insert(&mut self, entry: CatalogEntry) -> Option<CatalogEntry> {
		self.entries.insert(entry.key(), entry)
	}

	/// Look up an entry by raw lookup key.
	pub fn get(&self, key: &str) -> Option<&CatalogEntry> {
		self.entries.get(key)
	}

	/// Look up a context-qualified entry.
	pub fn get_with_context(&self, context: &str, id: &str) -> Option<&CatalogEntry> {
		self.entries.get(&key_with_context(context, id))
	}

	/// Whether an entry is stored under `key`.
	pub fn contains_key(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	pub(crate) fn remove(&mut self, key: &str) -> Option<CatalogEntry> {
		self.entries.remove(key)
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the catalog holds no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterate over `(lookup key, entry)` pairs in arbitrary order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v))
	}
}

/// Output of the `.po` and `.mo` parsers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCatalog {
	/// Translations, without the header entry.
	pub catalog: Catalog,
	/// Header fields from the header entry.
	pub headers: Headers,
}
