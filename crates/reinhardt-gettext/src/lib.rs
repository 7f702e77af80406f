//! Gettext catalogs for Reinhardt
//!
//! Loads GNU gettext translation catalogs, either the textual `.po` format or
//! the compiled binary `.mo` format, and answers translation lookups against
//! them. Catalogs are handed over as already-read text or bytes (or any
//! [`std::io::Read`]); locating files on disk is left to the caller.
//!
//! # Features
//!
//! - **PO parsing**: comments, contexts, plural entries and multi-line strings
//! - **MO parsing**: little- and big-endian catalogs, validated against truncation
//! - **Plural rules**: `Plural-Forms` expressions are sanitized and parsed into
//!   a syntax tree, never executed as code
//! - **Lookups**: `gettext`, `ngettext`, `pgettext` and `npgettext` with
//!   fallback to the source text
//!
//! # Quick Start
//!
//! ```
//! use reinhardt_gettext::Gettext;
//!
//! let mut gt = Gettext::new();
//! gt.load_po_str(r#"
//! msgid ""
//! msgstr ""
//! "Language: ru\n"
//! "Plural-Forms: nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);\n"
//!
//! msgid "One file"
//! msgid_plural "%d files"
//! msgstr[0] "%d файл"
//! msgstr[1] "%d файла"
//! msgstr[2] "%d файлов"
//!
//! msgctxt "button"
//! msgid "Save"
//! msgstr "Сохранить"
//! "#);
//!
//! assert_eq!(gt.ngettext("One file", "%d files", 21), "21 файл");
//! assert_eq!(gt.ngettext("One file", "%d files", 5), "5 файлов");
//! assert_eq!(gt.pgettext("button", "Save"), "Сохранить");
//! assert_eq!(gt.gettext("Cancel"), "Cancel");
//! ```

pub mod catalog;
pub mod error;
pub mod gettext;
pub mod mo_parser;
pub mod plural;
pub mod po_parser;

pub use catalog::{
	CONTEXT_SEPARATOR, Catalog, CatalogEntry, Headers, ParsedCatalog, key_with_context,
};
pub use error::{FormatError, GettextError, GettextResult};
pub use gettext::{CatalogFormat, CatalogSource, Gettext, GettextOptions};
pub use plural::{PluralFormsError, PluralRule};
