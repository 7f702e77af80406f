//! Gettext .po file parser
//!
//! This module parses the textual catalog format into a [`ParsedCatalog`].
//! Parsing never fails: lines that cannot be understood are skipped.

use crate::catalog::{Catalog, CatalogEntry, Headers, ParsedCatalog};
use crate::error::GettextResult;
use std::io::Read;

/// Highest accepted `N` in `msgstr[N]`, exclusive. Lines past it are ignored.
pub const MAX_PLURAL_FORMS: usize = 1024;

/// Entry being assembled from consecutive keyword lines
#[derive(Debug, Clone, Default)]
struct PoEntry {
	msgctxt: Option<String>,
	msgid: Option<String>,
	msgid_plural: Option<String>,
	msgstr: Vec<String>,
}

impl PoEntry {
	/// A `msgctxt` was read and its `msgid` has not arrived yet
	fn awaits_msgid(&self) -> bool {
		self.msgctxt.is_some() && self.msgid.is_none()
	}

	fn set_msgstr(&mut self, index: usize, value: String) {
		if self.msgstr.len() <= index {
			self.msgstr.resize(index + 1, String::new());
		}
		self.msgstr[index] = value;
	}
}

/// Parse the text of a .po catalog
///
/// # Examples
///
/// ```
/// use reinhardt_gettext::po_parser::parse_po;
///
/// let parsed = parse_po(r#"
/// msgid ""
/// msgstr "Language: fr\n"
///
/// msgid "Hello"
/// msgstr "Bonjour"
/// "#);
///
/// assert_eq!(parsed.headers.language(), Some("fr"));
/// assert_eq!(parsed.catalog.get("Hello").and_then(|e| e.singular()), Some("Bonjour"));
/// assert!(parsed.catalog.get("").is_none());
/// ```
pub fn parse_po(content: &str) -> ParsedCatalog {
	let content = content.strip_prefix('\u{feff}').unwrap_or(content);
	let mut catalog = Catalog::new();
	let mut current_entry = PoEntry::default();
	let mut current_msgstr_index: Option<usize> = None;

	for (line_no, line) in content.lines().enumerate() {
		let trimmed = line.trim();

		// Skip empty lines and comments
		if trimmed.is_empty() || trimmed.starts_with('#') {
			continue;
		}

		if let Some(value) = parse_keyword(trimmed, "msgctxt") {
			add_entry_to_catalog(&mut catalog, std::mem::take(&mut current_entry));
			current_entry.msgctxt = Some(unescape_string(value));
			current_msgstr_index = None;
		} else if let Some(value) = parse_keyword(trimmed, "msgid") {
			if !current_entry.awaits_msgid() {
				add_entry_to_catalog(&mut catalog, std::mem::take(&mut current_entry));
			}
			current_entry.msgid = Some(unescape_string(value));
			current_msgstr_index = None;
		} else if let Some(value) = parse_keyword(trimmed, "msgid_plural") {
			current_entry.msgid_plural = Some(unescape_string(value));
			current_msgstr_index = None;
		} else if let Some((index, value)) = parse_indexed_msgstr(trimmed) {
			current_entry.set_msgstr(index, unescape_string(value));
			current_msgstr_index = Some(index);
		} else if let Some(value) = parse_keyword(trimmed, "msgstr") {
			current_entry.set_msgstr(0, unescape_string(value));
			current_msgstr_index = Some(0);
		} else if let Some(value) = parse_quoted(trimmed) {
			let value = unescape_string(value);
			let target = match current_msgstr_index {
				Some(index) => current_entry.msgstr.get_mut(index),
				// Continuation of msgid_plural, msgid or msgctxt
				None => current_entry
					.msgid_plural
					.as_mut()
					.or(current_entry.msgid.as_mut())
					.or(current_entry.msgctxt.as_mut()),
			};
			if let Some(existing) = target {
				existing.push_str(&value);
			}
		} else {
			tracing::trace!(line = line_no + 1, "Ignoring unrecognized PO line");
		}
	}

	// Add the last entry
	add_entry_to_catalog(&mut catalog, current_entry);

	let headers = catalog
		.remove("")
		.and_then(|header| header.translations().first().map(|block| Headers::parse_block(block)))
		.unwrap_or_default();

	tracing::debug!(entries = catalog.len(), "Parsed PO catalog");
	ParsedCatalog { catalog, headers }
}

/// Parse a .po catalog from a reader
///
/// The whole stream is read before parsing; it must be UTF-8.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
/// use reinhardt_gettext::po_parser::parse_po_file;
///
/// let file = File::open("locale/fr/LC_MESSAGES/messages.po").unwrap();
/// let parsed = parse_po_file(file).unwrap();
/// ```
pub fn parse_po_file<R: Read>(mut reader: R) -> GettextResult<ParsedCatalog> {
	let mut bytes = Vec::new();
	reader.read_to_end(&mut bytes)?;
	let content = std::str::from_utf8(&bytes)?;
	Ok(parse_po(content))
}

/// Parse a keyword and its quoted value from a line
fn parse_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
	let rest = line.strip_prefix(keyword)?;
	parse_quoted(rest.trim())
}

/// Parse indexed msgstr (e.g., `msgstr[0]`, `msgstr[1]`)
fn parse_indexed_msgstr(line: &str) -> Option<(usize, &str)> {
	let rest = line.strip_prefix("msgstr[")?;
	let (index_str, rest) = rest.split_once(']')?;
	let index: usize = index_str.trim().parse().ok()?;
	if index >= MAX_PLURAL_FORMS {
		return None;
	}
	Some((index, parse_quoted(rest.trim())?))
}

/// Strip the surrounding double quotes of a string literal
fn parse_quoted(s: &str) -> Option<&str> {
	s.strip_prefix('"')?.strip_suffix('"')
}

/// Unescape a string (handle \n, \t, \r, \", \\)
fn unescape_string(s: &str) -> String {
	let mut result = String::with_capacity(s.len());
	let mut chars = s.chars();

	while let Some(ch) = chars.next() {
		if ch == '\\' {
			if let Some(next_ch) = chars.next() {
				match next_ch {
					'n' => result.push('\n'),
					't' => result.push('\t'),
					'r' => result.push('\r'),
					'"' => result.push('"'),
					'\\' => result.push('\\'),
					_ => {
						result.push('\\');
						result.push(next_ch);
					}
				}
			} else {
				result.push('\\');
			}
		} else {
			result.push(ch);
		}
	}

	result
}

/// Commit a finished entry if it has a source text and a translation
fn add_entry_to_catalog(catalog: &mut Catalog, entry: PoEntry) {
	let PoEntry {
		msgctxt,
		msgid,
		msgid_plural,
		msgstr,
	} = entry;
	let Some(msgid) = msgid else {
		return;
	};
	if msgstr.is_empty() {
		return;
	}

	let mut catalog_entry = CatalogEntry::new(msgid, msgstr);
	catalog_entry.context = msgctxt;
	catalog_entry.plural_id = msgid_plural;
	catalog.insert(catalog_entry);
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn singular<'a>(parsed: &'a ParsedCatalog, key: &str) -> Option<&'a str> {
		parsed.catalog.get(key).and_then(|e| e.singular())
	}

	#[rstest]
	fn test_parse_simple_translation() {
		let po_content = r#"
msgid "Hello"
msgstr "Bonjour"

msgid "Goodbye"
msgstr "Au revoir"
"#;

		let parsed = parse_po(po_content);
		assert_eq!(singular(&parsed, "Hello"), Some("Bonjour"));
		assert_eq!(singular(&parsed, "Goodbye"), Some("Au revoir"));
		assert_eq!(parsed.catalog.len(), 2);
	}

	#[rstest]
	fn test_parse_plural_translation() {
		let po_content = r#"
msgid "One file"
msgid_plural "%d files"
msgstr[0] "%d файл"
msgstr[1] "%d файла"
msgstr[2] "%d файлов"
"#;

		let parsed = parse_po(po_content);
		let entry = parsed.catalog.get("One file").unwrap();
		assert_eq!(entry.translations(), ["%d файл", "%d файла", "%d файлов"]);
		assert_eq!(entry.plural_id.as_deref(), Some("%d files"));
	}

	#[rstest]
	fn test_parse_sparse_plural_indices_fill_gaps() {
		let po_content = r#"
msgid "item"
msgid_plural "items"
msgstr[2] "third"
"#;

		let parsed = parse_po(po_content);
		let entry = parsed.catalog.get("item").unwrap();
		assert_eq!(entry.translations(), ["", "", "third"]);
	}

	#[rstest]
	fn test_parse_contextual_translation() {
		let po_content = r#"
msgctxt "button"
msgid "Save"
msgstr "Сохранить"

msgctxt "menu"
msgid "Save"
msgstr "Сохранить как"
"#;

		let parsed = parse_po(po_content);
		let button = parsed.catalog.get_with_context("button", "Save").unwrap();
		assert_eq!(button.singular(), Some("Сохранить"));
		assert_eq!(button.context.as_deref(), Some("button"));
		assert_eq!(singular(&parsed, "menu\u{4}Save"), Some("Сохранить как"));
		assert!(parsed.catalog.get("Save").is_none());
	}

	#[rstest]
	fn test_plain_entry_after_context_entry_is_separate() {
		let po_content = r#"
msgctxt "menu"
msgid "Open"
msgstr "Ouvrir"
msgid "Close"
msgstr "Fermer"
"#;

		let parsed = parse_po(po_content);
		assert_eq!(singular(&parsed, "menu\u{4}Open"), Some("Ouvrir"));
		assert_eq!(singular(&parsed, "Close"), Some("Fermer"));
		assert_eq!(parsed.catalog.get("Close").unwrap().context, None);
	}

	#[rstest]
	fn test_parse_multiline_string() {
		let po_content = r#"
msgid "This is a long "
"message that spans "
"multiple lines"
msgstr "Ceci est un long "
"message qui s'étend "
"sur plusieurs lignes"
"#;

		let parsed = parse_po(po_content);
		assert_eq!(
			singular(&parsed, "This is a long message that spans multiple lines"),
			Some("Ceci est un long message qui s'étend sur plusieurs lignes")
		);
	}

	#[rstest]
	fn test_continuation_extends_last_touched_plural_slot() {
		let po_content = r#"
msgid "file"
msgid_plural "files"
msgstr[0] "un "
"fichier"
msgstr[1] "des "
"fichiers"
"#;

		let parsed = parse_po(po_content);
		let entry = parsed.catalog.get("file").unwrap();
		assert_eq!(entry.translations(), ["un fichier", "des fichiers"]);
	}

	#[rstest]
	fn test_parse_escape_sequences() {
		let po_content = r#"
msgid "Line 1\nLine 2\tTabbed"
msgstr "Ligne 1\nLigne 2\tTabulée \"citée\" C:\\temp\r"
"#;

		let parsed = parse_po(po_content);
		assert_eq!(
			singular(&parsed, "Line 1\nLine 2\tTabbed"),
			Some("Ligne 1\nLigne 2\tTabulée \"citée\" C:\\temp\r")
		);
	}

	#[rstest]
	fn test_parse_with_comments() {
		let po_content = r#"
# Translator comment
#. Extracted comment
#: reference.py:10
#, fuzzy
msgid "Hello"
msgstr "Bonjour"
"#;

		let parsed = parse_po(po_content);
		assert_eq!(singular(&parsed, "Hello"), Some("Bonjour"));
	}

	#[rstest]
	fn test_parse_header_entry() {
		let po_content = r#"
msgid ""
msgstr ""
"Content-Type: text/plain; charset=UTF-8\n"
"Language: ru\n"
"Plural-Forms: nplurals=3; plural=(n%10==1 ? 0 : 1);\n"

msgid "Hello"
msgstr "Привет"
"#;

		let parsed = parse_po(po_content);
		assert_eq!(
			parsed.headers.content_type(),
			Some("text/plain; charset=UTF-8")
		);
		assert_eq!(parsed.headers.language(), Some("ru"));
		assert_eq!(
			parsed.headers.plural_forms(),
			Some("nplurals=3; plural=(n%10==1 ? 0 : 1);")
		);
		assert!(!parsed.catalog.contains_key(""));
		assert_eq!(parsed.catalog.len(), 1);
	}

	#[rstest]
	fn test_entry_without_msgstr_is_dropped() {
		let po_content = r#"
msgid "Orphan"

msgid "Hello"
msgstr "Bonjour"
"#;

		let parsed = parse_po(po_content);
		assert!(parsed.catalog.get("Orphan").is_none());
		assert_eq!(singular(&parsed, "Hello"), Some("Bonjour"));
	}

	#[rstest]
	fn test_duplicate_msgid_last_wins() {
		let po_content = r#"
msgid "Hello"
msgstr "Bonjour"

msgid "Hello"
msgstr "Salut"
"#;

		let parsed = parse_po(po_content);
		assert_eq!(singular(&parsed, "Hello"), Some("Salut"));
		assert_eq!(parsed.catalog.len(), 1);
	}

	#[rstest]
	#[case("msgid Hello\nmsgstr \"Bonjour\"")]
	#[case("msgid \"Hello\"\nmsgstr Bonjour")]
	#[case("msgid \"\nmsgstr \"\"")]
	#[case("\"\nmsgstr[x] \"a\"\nmsgstr[0 \"b\"")]
	fn test_malformed_lines_are_ignored(#[case] po_content: &str) {
		let parsed = parse_po(po_content);
		assert!(parsed.catalog.get("Hello").and_then(|e| e.singular()).is_none());
	}

	#[rstest]
	#[case("18446744073709551615")]
	#[case("18446744073709551616")]
	#[case("50000000")]
	#[case("1024")]
	fn test_oversized_plural_index_is_ignored(#[case] index: &str) {
		let po_content = format!(
			"msgid \"a\"\nmsgstr[{index}] \"x\"\n\nmsgid \"Hello\"\nmsgstr \"Bonjour\"\n"
		);

		let parsed = parse_po(&po_content);
		assert!(parsed.catalog.get("a").is_none());
		assert_eq!(singular(&parsed, "Hello"), Some("Bonjour"));
	}

	#[rstest]
	fn test_highest_accepted_plural_index() {
		let po_content = format!(
			"msgid \"a\"\nmsgstr[0] \"x\"\nmsgstr[{}] \"y\"\n",
			MAX_PLURAL_FORMS - 1
		);

		let parsed = parse_po(&po_content);
		let entry = parsed.catalog.get("a").unwrap();
		assert_eq!(entry.translations().len(), MAX_PLURAL_FORMS);
		assert_eq!(entry.plural_form(MAX_PLURAL_FORMS - 1), Some("y"));
	}

	#[rstest]
	fn test_consecutive_msgctxt_keeps_second_context() {
		let po_content = r#"
msgctxt "toolbar"
msgctxt "menu"
msgid "Save"
msgstr "Enregistrer"
"#;

		let parsed = parse_po(po_content);
		assert_eq!(singular(&parsed, "menu\u{4}Save"), Some("Enregistrer"));
		assert!(!parsed.catalog.contains_key("toolbar\u{4}Save"));
		assert!(!parsed.catalog.contains_key("Save"));
		assert_eq!(parsed.catalog.len(), 1);
	}

	#[rstest]
	fn test_parse_crlf_and_bom() {
		let po_content = "\u{feff}msgid \"Hello\"\r\nmsgstr \"Bonjour\"\r\n";

		let parsed = parse_po(po_content);
		assert_eq!(singular(&parsed, "Hello"), Some("Bonjour"));
	}

	#[rstest]
	fn test_parse_empty_file() {
		let parsed = parse_po("");
		assert!(parsed.catalog.is_empty());
		assert!(parsed.headers.is_empty());
	}

	#[rstest]
	fn test_parse_po_file_rejects_invalid_utf8() {
		let bytes: &[u8] = b"msgid \"Hello\"\nmsgstr \"\xff\"\n";

		let result = parse_po_file(bytes);
		assert!(matches!(result, Err(crate::GettextError::InvalidUtf8(_))));
	}

	#[rstest]
	fn test_parse_po_file_from_reader() {
		let bytes: &[u8] = "msgid \"Hello\"\nmsgstr \"Hallo\"\n".as_bytes();

		let parsed = parse_po_file(bytes).unwrap();
		assert_eq!(singular(&parsed, "Hello"), Some("Hallo"));
	}

	#[rstest]
	fn test_unescape_string() {
		assert_eq!(unescape_string("Hello\\nWorld"), "Hello\nWorld");
		assert_eq!(unescape_string("Tab\\there"), "Tab\there");
		assert_eq!(unescape_string("Quote\\\"here"), "Quote\"here");
		assert_eq!(unescape_string("Backslash\\\\here"), "Backslash\\here");
		assert_eq!(unescape_string("Backslash\\\\nothing"), "Backslash\\nothing");
		assert_eq!(unescape_string("Unknown \\x kept"), "Unknown \\x kept");
		assert_eq!(unescape_string("Trailing \\"), "Trailing \\");
	}
}
