//! Loads a Russian catalog from `.po` text and from `.mo` bytes and prints
//! a few lookups against each.
//!
//! Run with `RUST_LOG=reinhardt_gettext=debug` to see load events.

use reinhardt_gettext::{Gettext, GettextOptions, GettextResult};
use tracing_subscriber::EnvFilter;

const RU_PO: &str = r#"
msgid ""
msgstr ""
"Content-Type: text/plain; charset=UTF-8\n"
"Language: ru\n"
"Plural-Forms: nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);\n"

msgid "Hello, world!"
msgstr "Привет, мир!"

msgid "Welcome"
msgstr "Добро пожаловать"

msgid "One file"
msgid_plural "%d files"
msgstr[0] "%d файл"
msgstr[1] "%d файла"
msgstr[2] "%d файлов"

msgctxt "button"
msgid "Save"
msgstr "Сохранить"

msgctxt "menu"
msgid "Save"
msgstr "Сохранить как"

msgctxt "navigation"
msgid "Home"
msgstr "Главная"

msgid "Thank you"
msgstr "Спасибо"
"#;

/// Encode `messages` as a little-endian revision 0 `.mo` catalog.
fn compile_mo(messages: &[(&str, &str)]) -> Vec<u8> {
	let count = messages.len() as u32;
	let originals_at = 28;
	let translations_at = originals_at + count * 8;
	let pool_at = translations_at + count * 8;

	let mut out = Vec::new();
	for value in [0x950412de, 0, count, originals_at, translations_at, 0, 0] {
		out.extend_from_slice(&u32::to_le_bytes(value));
	}

	let mut pool = Vec::new();
	let strings = messages
		.iter()
		.map(|(original, _)| *original)
		.chain(messages.iter().map(|(_, translation)| *translation));
	for text in strings {
		out.extend_from_slice(&(text.len() as u32).to_le_bytes());
		out.extend_from_slice(&(pool_at + pool.len() as u32).to_le_bytes());
		pool.extend_from_slice(text.as_bytes());
		pool.push(0);
	}
	out.extend(pool);
	out
}

fn print_lookups(gt: &Gettext) {
	println!("Current locale: {}", gt.locale());
	println!("Current domain: {}", gt.domain());
	println!();

	println!("=== Simple Translations ===");
	for msgid in ["Hello, world!", "Welcome", "Thank you"] {
		println!("{:?} -> {:?}", msgid, gt.gettext(msgid));
	}
	println!();

	println!("=== Context-aware Translations ===");
	println!("Button Save: {}", gt.pgettext("button", "Save"));
	println!("Menu Save: {}", gt.pgettext("menu", "Save"));
	println!("Navigation Home: {}", gt.pgettext("navigation", "Home"));
	println!();

	println!("=== Plural Forms ===");
	for count in [1, 2, 5, 21, 22, 25] {
		println!("{} -> {}", count, gt.ngettext("One file", "%d files", count));
	}
	println!();

	println!("=== Fallbacks ===");
	println!("Unknown message: {}", gt.gettext("This message does not exist"));
	println!("Unknown context: {}", gt.pgettext("unknown", "Save"));
	println!();

	println!("=== Headers ===");
	for (name, value) in gt.headers().iter() {
		println!("{}: {}", name, value);
	}
	println!();
}

fn main() -> GettextResult<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.init();

	let mut gt = Gettext::with_options(GettextOptions::new().with_locale("ru"));

	println!("##### Loaded from .po #####");
	gt.load_po_str(RU_PO);
	print_lookups(&gt);

	let mo = compile_mo(&[
		("", "Language: ru\nPlural-Forms: nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);\n"),
		("Hello, world!", "Привет, мир!"),
		("One file\0%d files", "%d файл\0%d файла\0%d файлов"),
		("button\u{4}Save", "Сохранить"),
	]);

	println!("##### Loaded from .mo ({} bytes) #####", mo.len());
	gt.load_bytes(&mo)?;
	print_lookups(&gt);

	gt.clear_translations();
	println!("After clear: {}", gt.gettext("Hello, world!"));
	Ok(())
}
