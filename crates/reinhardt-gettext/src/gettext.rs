//! Catalog state and the gettext lookup functions
//!
//! A [`Gettext`] owns exactly one loaded catalog together with its headers and
//! plural rule. Loading replaces all three at once; a failed load leaves the
//! previous state untouched. Lookups never fail: a missing or empty
//! translation falls back to the source text.

use crate::catalog::{Catalog, CatalogEntry, Headers, ParsedCatalog, key_with_context};
use crate::error::GettextResult;
use crate::mo_parser::{MO_MAGIC_BE, MO_MAGIC_LE, parse_mo, parse_mo_file};
use crate::plural::PluralRule;
use crate::po_parser::{parse_po, parse_po_file};
use serde::{Deserialize, Serialize};
use std::io::Read;

const DEFAULT_LOCALE: &str = "en";
const DEFAULT_DOMAIN: &str = "messages";

/// Construction options for [`Gettext`].
///
/// Missing fields take their defaults when deserialized, so the options can be
/// embedded in a larger settings file.
///
/// # Example
/// ```
/// use reinhardt_gettext::{Gettext, GettextOptions};
///
/// let gt = Gettext::with_options(GettextOptions::new().with_locale("ru"));
/// assert_eq!(gt.locale(), "ru");
/// assert_eq!(gt.domain(), "messages");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GettextOptions {
	/// Locale label, stored but not interpreted.
	pub locale: String,
	/// Text domain label, stored but not interpreted.
	pub domain: String,
}

impl Default for GettextOptions {
	fn default() -> Self {
		Self {
			locale: DEFAULT_LOCALE.to_string(),
			domain: DEFAULT_DOMAIN.to_string(),
		}
	}
}

impl GettextOptions {
	/// Options with the default locale (`en`) and domain (`messages`).
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the locale label.
	pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
		self.locale = locale.into();
		self
	}

	/// Set the domain label.
	pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
		self.domain = domain.into();
		self
	}
}

/// On-disk catalog format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
	/// Textual `.po` catalog.
	Po,
	/// Compiled `.mo` catalog.
	Mo,
}

impl CatalogFormat {
	/// Guess the format from the leading magic number.
	///
	/// Anything that does not start with a `.mo` magic is treated as text.
	pub fn detect(data: &[u8]) -> Self {
		let magic = data
			.get(..4)
			.and_then(|b| <[u8; 4]>::try_from(b).ok())
			.map(u32::from_le_bytes);
		match magic {
			Some(MO_MAGIC_LE | MO_MAGIC_BE) => Self::Mo,
			_ => Self::Po,
		}
	}
}

impl std::fmt::Display for CatalogFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Po => f.write_str("po"),
			Self::Mo => f.write_str("mo"),
		}
	}
}

/// Already-read catalog content handed to [`Gettext::load`].
#[derive(Debug, Clone, Copy)]
pub enum CatalogSource<'a> {
	/// Text of a `.po` catalog.
	Po(&'a str),
	/// Bytes of a `.mo` catalog.
	Mo(&'a [u8]),
}

impl CatalogSource<'_> {
	/// Format of this source.
	pub fn format(&self) -> CatalogFormat {
		match self {
			Self::Po(_) => CatalogFormat::Po,
			Self::Mo(_) => CatalogFormat::Mo,
		}
	}
}

/// A loaded catalog and the lookup operations over it.
///
/// # Example
/// ```
/// use reinhardt_gettext::Gettext;
///
/// let mut gt = Gettext::new();
/// gt.load_po_str(r#"
/// msgid ""
/// msgstr "Plural-Forms: nplurals=2; plural=(n != 1);\n"
///
/// msgid "One file"
/// msgid_plural "%d files"
/// msgstr[0] "%d Datei"
/// msgstr[1] "%d Dateien"
/// "#);
///
/// assert_eq!(gt.ngettext("One file", "%d files", 1), "1 Datei");
/// assert_eq!(gt.ngettext("One file", "%d files", 3), "3 Dateien");
/// assert_eq!(gt.gettext("Untranslated"), "Untranslated");
/// ```
#[derive(Debug, Clone)]
pub struct Gettext {
	locale: String,
	domain: String,
	catalog: Catalog,
	headers: Headers,
	plural_rule: PluralRule,
}

impl Default for Gettext {
	fn default() -> Self {
		Self::with_options(GettextOptions::default())
	}
}

impl Gettext {
	/// Create an empty instance with the default locale and domain.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create an empty instance with the given labels.
	pub fn with_options(options: GettextOptions) -> Self {
		Self {
			locale: options.locale,
			domain: options.domain,
			catalog: Catalog::new(),
			headers: Headers::new(),
			plural_rule: PluralRule::default(),
		}
	}

	/// Replace the loaded catalog with `source`.
	///
	/// Only `.mo` input can fail; on failure nothing is replaced.
	pub fn load(&mut self, source: CatalogSource<'_>) -> GettextResult<()> {
		let parsed = match source {
			CatalogSource::Po(content) => parse_po(content),
			CatalogSource::Mo(data) => parse_mo(data)?,
		};
		self.install(parsed, source.format());
		Ok(())
	}

	/// Replace the loaded catalog with the given `.po` text.
	pub fn load_po_str(&mut self, content: &str) {
		self.install(parse_po(content), CatalogFormat::Po);
	}

	/// Replace the loaded catalog with the given `.mo` bytes.
	pub fn load_mo_bytes(&mut self, data: &[u8]) -> GettextResult<()> {
		self.load(CatalogSource::Mo(data))
	}

	/// Replace the loaded catalog with `data`, detecting its format.
	///
	/// Textual catalogs must be UTF-8.
	pub fn load_bytes(&mut self, data: &[u8]) -> GettextResult<()> {
		match CatalogFormat::detect(data) {
			CatalogFormat::Mo => self.load(CatalogSource::Mo(data)),
			CatalogFormat::Po => self.load(CatalogSource::Po(std::str::from_utf8(data)?)),
		}
	}

	/// Read a `.po` catalog from `reader` and load it.
	pub fn load_po_reader<R: Read>(&mut self, reader: R) -> GettextResult<()> {
		let parsed = parse_po_file(reader)?;
		self.install(parsed, CatalogFormat::Po);
		Ok(())
	}

	/// Read a `.mo` catalog from `reader` and load it.
	pub fn load_mo_reader<R: Read>(&mut self, reader: R) -> GettextResult<()> {
		let parsed = parse_mo_file(reader)?;
		self.install(parsed, CatalogFormat::Mo);
		Ok(())
	}

	fn install(&mut self, parsed: ParsedCatalog, format: CatalogFormat) {
		let ParsedCatalog { catalog, headers } = parsed;
		self.plural_rule = headers
			.plural_forms()
			.map(PluralRule::compile)
			.unwrap_or_default();
		self.catalog = catalog;
		self.headers = headers;
		tracing::debug!(
			%format,
			entries = self.catalog.len(),
			nplurals = self.plural_rule.nplurals(),
			locale = %self.locale,
			domain = %self.domain,
			"Loaded catalog"
		);
	}

	/// Translate `msgid`, or return it unchanged.
	pub fn gettext<'a>(&'a self, msgid: &'a str) -> &'a str {
		self.catalog
			.get(msgid)
			.and_then(CatalogEntry::singular)
			.unwrap_or(msgid)
	}

	/// Translate a message with plural forms and substitute `%d` with `count`.
	///
	/// Without a translation, `singular` is used for a count of 1 and `plural`
	/// otherwise.
	pub fn ngettext(&self, singular: &str, plural: &str, count: u64) -> String {
		match self.plural_translation(self.catalog.get(singular), count) {
			Some(translated) => translated,
			None => {
				let source = if count == 1 { singular } else { plural };
				substitute_count(source, count)
			}
		}
	}

	/// Translate `msgid` in `context`, falling back to [`Gettext::gettext`].
	pub fn pgettext<'a>(&'a self, context: &str, msgid: &'a str) -> &'a str {
		self.catalog
			.get_with_context(context, msgid)
			.and_then(CatalogEntry::singular)
			.unwrap_or_else(|| self.gettext(msgid))
	}

	/// Translate a plural message in `context`, falling back to
	/// [`Gettext::ngettext`].
	pub fn npgettext(&self, context: &str, singular: &str, plural: &str, count: u64) -> String {
		let entry = self.catalog.get(&key_with_context(context, singular));
		self.plural_translation(entry, count)
			.unwrap_or_else(|| self.ngettext(singular, plural, count))
	}

	fn plural_translation(&self, entry: Option<&CatalogEntry>, count: u64) -> Option<String> {
		let index = self.plural_rule.index(count);
		entry
			.and_then(|entry| entry.plural_form(index))
			.map(|form| substitute_count(form, count))
	}

	/// Headers of the loaded catalog.
	pub fn headers(&self) -> &Headers {
		&self.headers
	}

	/// All loaded translations, without the header entry.
	pub fn translations(&self) -> &Catalog {
		&self.catalog
	}

	/// Plural rule compiled from the loaded catalog's `Plural-Forms`.
	pub fn plural_rule(&self) -> &PluralRule {
		&self.plural_rule
	}

	/// Drop the loaded catalog, headers and plural rule.
	///
	/// The locale and domain labels are kept.
	pub fn clear_translations(&mut self) {
		self.catalog = Catalog::new();
		self.headers = Headers::new();
		self.plural_rule = PluralRule::default();
		tracing::debug!(locale = %self.locale, "Cleared translations");
	}

	/// Set the locale label.
	pub fn set_locale(&mut self, locale: impl Into<String>) {
		self.locale = locale.into();
	}

	/// Current locale label.
	pub fn locale(&self) -> &str {
		&self.locale
	}

	/// Set the domain label.
	pub fn set_domain(&mut self, domain: impl Into<String>) {
		self.domain = domain.into();
	}

	/// Current domain label.
	pub fn domain(&self) -> &str {
		&self.domain
	}
}

/// Replace every `%d` in `template` with `count`.
fn substitute_count(template: &str, count: u64) -> String {
	template.replace("%d", &count.to_string())
}
