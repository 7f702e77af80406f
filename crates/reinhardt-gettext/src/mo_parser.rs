//! Gettext .mo file parser
//!
//! Layout of a revision 0 binary catalog, all integers 32-bit in the byte
//! order announced by the magic number and all offsets absolute:
//!
//! | Offset | Field |
//! |--------|-------|
//! | 0      | magic |
//! | 4      | revision |
//! | 8      | number of strings N |
//! | 12     | offset of the original strings table |
//! | 16     | offset of the translated strings table |
//! | 20     | hash table size (unused) |
//! | 24     | hash table offset (unused) |
//!
//! Each table holds N `(length, offset)` pairs pointing into the string pool.
//! Plural forms are separated by NUL bytes, contexts by `\u{4}`.

use crate::catalog::{CONTEXT_SEPARATOR, Catalog, CatalogEntry, Headers, ParsedCatalog};
use crate::error::{FormatError, GettextResult};
use std::io::Read;

/// Magic number of a catalog written in little-endian byte order.
pub const MO_MAGIC_LE: u32 = 0x950412de;
/// Magic number of a big-endian catalog, read in little-endian order.
pub const MO_MAGIC_BE: u32 = 0xde120495;

const HEADER_SIZE: usize = 28;
const TABLE_ENTRY_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
	Little,
	Big,
}

/// Bounds-checked view of the buffer in the detected byte order.
struct MoReader<'a> {
	data: &'a [u8],
	order: ByteOrder,
}

impl<'a> MoReader<'a> {
	fn span(
		&self,
		what: &'static str,
		offset: usize,
		length: usize,
	) -> Result<&'a [u8], FormatError> {
		offset
			.checked_add(length)
			.and_then(|end| self.data.get(offset..end))
			.ok_or(FormatError::OutOfBounds {
				what,
				offset,
				length,
				size: self.data.len(),
			})
	}

	fn u32_at(&self, what: &'static str, offset: usize) -> Result<u32, FormatError> {
		let bytes: [u8; 4] = self
			.span(what, offset, 4)?
			.try_into()
			.map_err(|_| FormatError::OutOfBounds {
				what,
				offset,
				length: 4,
				size: self.data.len(),
			})?;
		Ok(match self.order {
			ByteOrder::Little => u32::from_le_bytes(bytes),
			ByteOrder::Big => u32::from_be_bytes(bytes),
		})
	}

	fn usize_at(&self, what: &'static str, offset: usize) -> Result<usize, FormatError> {
		let value = self.u32_at(what, offset)?;
		usize::try_from(value).map_err(|_| FormatError::OutOfBounds {
			what,
			offset,
			length: 4,
			size: self.data.len(),
		})
	}

	/// Decode all strings of one `(length, offset)` table.
	fn string_table(
		&self,
		what: &'static str,
		table_offset: usize,
		count: usize,
	) -> Result<Vec<String>, FormatError> {
		let table_len = count
			.checked_mul(TABLE_ENTRY_SIZE)
			.ok_or(FormatError::OutOfBounds {
				what,
				offset: table_offset,
				length: usize::MAX,
				size: self.data.len(),
			})?;
		self.span(what, table_offset, table_len)?;

		(0..count)
			.map(|i| {
				let entry_offset = table_offset + i * TABLE_ENTRY_SIZE;
				let length = self.usize_at(what, entry_offset)?;
				let offset = self.usize_at(what, entry_offset + 4)?;
				let bytes = self.span("string", offset, length)?;
				Ok(String::from_utf8_lossy(bytes).into_owned())
			})
			.collect()
	}
}

/// Parse a binary .mo catalog held in memory
///
/// Fails with [`FormatError`] on a bad magic number, a revision other than 0,
/// or tables and strings that point outside the buffer. Invalid UTF-8 inside
/// strings is replaced with U+FFFD.
///
/// # Examples
///
/// ```
/// use reinhardt_gettext::FormatError;
/// use reinhardt_gettext::mo_parser::parse_mo;
///
/// let err = parse_mo(b"not a catalog, just some text").unwrap_err();
/// assert!(matches!(err, FormatError::BadMagic(_)));
/// ```
pub fn parse_mo(data: &[u8]) -> Result<ParsedCatalog, FormatError> {
	let magic_bytes: [u8; 4] = data
		.get(..4)
		.and_then(|b| b.try_into().ok())
		.ok_or(FormatError::Truncated {
			needed: 4,
			actual: data.len(),
		})?;
	let order = match u32::from_le_bytes(magic_bytes) {
		MO_MAGIC_LE => ByteOrder::Little,
		MO_MAGIC_BE => ByteOrder::Big,
		other => return Err(FormatError::BadMagic(other)),
	};
	if data.len() < HEADER_SIZE {
		return Err(FormatError::Truncated {
			needed: HEADER_SIZE,
			actual: data.len(),
		});
	}

	let reader = MoReader { data, order };
	let version = reader.u32_at("version", 4)?;
	if version != 0 {
		return Err(FormatError::UnsupportedVersion(version));
	}
	let count = reader.usize_at("message count", 8)?;
	let originals_offset = reader.usize_at("original table offset", 12)?;
	let translations_offset = reader.usize_at("translation table offset", 16)?;
	tracing::trace!(
		?order,
		count,
		originals_offset,
		translations_offset,
		"Read MO header"
	);

	let originals = reader.string_table("original table", originals_offset, count)?;
	let translations = reader.string_table("translation table", translations_offset, count)?;

	let mut catalog = Catalog::new();
	let mut headers = Headers::new();
	for (original, translation) in originals.iter().zip(&translations) {
		if original.is_empty() {
			headers.merge_block(translation);
			continue;
		}
		catalog.insert(entry_from_strings(original, translation));
	}

	tracing::debug!(entries = catalog.len(), "Parsed MO catalog");
	Ok(ParsedCatalog { catalog, headers })
}

/// Parse a binary .mo catalog from a reader
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
/// use reinhardt_gettext::mo_parser::parse_mo_file;
///
/// let file = File::open("locale/fr/LC_MESSAGES/messages.mo").unwrap();
/// let parsed = parse_mo_file(file).unwrap();
/// ```
pub fn parse_mo_file<R: Read>(mut reader: R) -> GettextResult<ParsedCatalog> {
	let mut data = Vec::new();
	reader.read_to_end(&mut data)?;
	Ok(parse_mo(&data)?)
}

fn entry_from_strings(original: &str, translation: &str) -> CatalogEntry {
	let mut segments = original.split('\0');
	let source = segments.next().unwrap_or_default();
	let plural_id = segments.next();

	let forms: Vec<String> = translation.split('\0').map(String::from).collect();
	let mut entry = match source.split_once(CONTEXT_SEPARATOR) {
		Some((context, id)) => CatalogEntry::new(id, forms).with_context(context),
		None => CatalogEntry::new(source, forms),
	};
	entry.plural_id = plural_id.map(String::from);
	entry
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	/// Lay out a revision 0 catalog: header, both tables, then the string pool.
	fn build_mo(messages: &[(&str, &str)], big_endian: bool) -> Vec<u8> {
		let put = |buf: &mut Vec<u8>, value: u32| {
			if big_endian {
				buf.extend_from_slice(&value.to_be_bytes());
			} else {
				buf.extend_from_slice(&value.to_le_bytes());
			}
		};
		let count = messages.len() as u32;
		let originals_offset = HEADER_SIZE as u32;
		let translations_offset = originals_offset + count * 8;
		let mut pool_offset = translations_offset + count * 8;

		let mut buf = Vec::new();
		put(&mut buf, MO_MAGIC_LE);
		put(&mut buf, 0);
		put(&mut buf, count);
		put(&mut buf, originals_offset);
		put(&mut buf, translations_offset);
		put(&mut buf, 0);
		put(&mut buf, 0);

		let mut pool = Vec::new();
		let mut tables = [Vec::new(), Vec::new()];
		for (side, table) in tables.iter_mut().enumerate() {
			for (original, translation) in messages {
				let text = if side == 0 { original } else { translation };
				put(table, text.len() as u32);
				put(table, pool_offset);
				pool.extend_from_slice(text.as_bytes());
				pool_offset += text.len() as u32;
			}
		}
		buf.extend(tables.concat());
		buf.extend(pool);
		buf
	}

	const MESSAGES: &[(&str, &str)] = &[
		(
			"",
			"Content-Type: text/plain; charset=UTF-8\nLanguage: ru\nPlural-Forms: nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);\n",
		),
		("Hello, world!", "Привет, мир!"),
		("One file\0%d files", "%d файл\0%d файла\0%d файлов"),
		("button\u{4}Save", "Сохранить"),
	];

	#[rstest]
	#[case(false)]
	#[case(true)]
	fn test_parse_both_byte_orders(#[case] big_endian: bool) {
		// Arrange
		let data = build_mo(MESSAGES, big_endian);

		// Act
		let parsed = parse_mo(&data).unwrap();

		// Assert
		assert_eq!(parsed.catalog.len(), 3);
		assert_eq!(
			parsed.catalog.get("Hello, world!").and_then(|e| e.singular()),
			Some("Привет, мир!")
		);
		assert_eq!(parsed.headers.language(), Some("ru"));
	}

	#[rstest]
	fn test_plural_entry_is_split_on_nul() {
		// Arrange
		let data = build_mo(MESSAGES, false);

		// Act
		let parsed = parse_mo(&data).unwrap();

		// Assert
		let entry = parsed.catalog.get("One file").unwrap();
		assert_eq!(entry.translations(), ["%d файл", "%d файла", "%d файлов"]);
		assert_eq!(entry.plural_id.as_deref(), Some("%d files"));
		assert!(!parsed.catalog.contains_key("One file\0%d files"));
	}

	#[rstest]
	fn test_context_entry_is_keyed_with_separator() {
		// Arrange
		let data = build_mo(MESSAGES, false);

		// Act
		let parsed = parse_mo(&data).unwrap();

		// Assert
		let entry = parsed.catalog.get_with_context("button", "Save").unwrap();
		assert_eq!(entry.id, "Save");
		assert_eq!(entry.context.as_deref(), Some("button"));
		assert_eq!(entry.singular(), Some("Сохранить"));
	}

	#[rstest]
	fn test_header_entry_is_not_in_catalog() {
		// Arrange
		let data = build_mo(MESSAGES, false);

		// Act
		let parsed = parse_mo(&data).unwrap();

		// Assert
		assert!(!parsed.catalog.contains_key(""));
		assert_eq!(
			parsed.headers.content_type(),
			Some("text/plain; charset=UTF-8")
		);
		assert!(parsed.headers.plural_forms().unwrap().starts_with("nplurals=3;"));
	}

	#[rstest]
	fn test_empty_catalog() {
		// Arrange
		let data = build_mo(&[], false);

		// Act
		let parsed = parse_mo(&data).unwrap();

		// Assert
		assert!(parsed.catalog.is_empty());
		assert!(parsed.headers.is_empty());
	}

	#[rstest]
	fn test_bad_magic() {
		// Arrange
		let mut data = build_mo(MESSAGES, false);
		data[0] = 0x00;

		// Act
		let result = parse_mo(&data);

		// Assert
		assert_eq!(result, Err(FormatError::BadMagic(0x95041200)));
	}

	#[rstest]
	#[case(false)]
	#[case(true)]
	fn test_unsupported_version(#[case] big_endian: bool) {
		// Arrange
		let mut data = build_mo(MESSAGES, big_endian);
		let version = if big_endian { 1u32.to_be_bytes() } else { 1u32.to_le_bytes() };
		data[4..8].copy_from_slice(&version);

		// Act
		let result = parse_mo(&data);

		// Assert
		assert_eq!(result, Err(FormatError::UnsupportedVersion(1)));
	}

	#[rstest]
	#[case(0)]
	#[case(3)]
	#[case(12)]
	fn test_truncated_header(#[case] len: usize) {
		// Arrange
		let data = build_mo(MESSAGES, false);

		// Act
		let result = parse_mo(&data[..len]);

		// Assert
		assert!(matches!(result, Err(FormatError::Truncated { .. })));
	}

	#[rstest]
	fn test_string_past_end_of_buffer() {
		// Arrange
		let data = build_mo(MESSAGES, false);
		let truncated = &data[..data.len() - 1];

		// Act
		let result = parse_mo(truncated);

		// Assert
		assert!(matches!(
			result,
			Err(FormatError::OutOfBounds { what: "string", .. })
		));
	}

	#[rstest]
	fn test_table_past_end_of_buffer() {
		// Arrange
		let mut data = build_mo(MESSAGES, false);
		data[8..12].copy_from_slice(&u32::MAX.to_le_bytes());

		// Act
		let result = parse_mo(&data);

		// Assert
		assert!(matches!(
			result,
			Err(FormatError::OutOfBounds { what: "original table", .. })
		));
	}

	#[rstest]
	fn test_invalid_utf8_is_replaced() {
		// Arrange
		let mut data = build_mo(&[("Hello", "Hallo")], false);
		let last = data.len() - 1;
		data[last] = 0xff;

		// Act
		let parsed = parse_mo(&data).unwrap();

		// Assert
		assert_eq!(
			parsed.catalog.get("Hello").and_then(|e| e.singular()),
			Some("Hall\u{fffd}")
		);
	}

	#[rstest]
	fn test_parse_mo_file_from_reader() {
		// Arrange
		let data = build_mo(MESSAGES, false);

		// Act
		let parsed = parse_mo_file(data.as_slice()).unwrap();

		// Assert
		assert_eq!(parsed.catalog.len(), 3);
	}
}
