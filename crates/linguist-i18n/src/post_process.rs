//! Casing post-processors
//!
//! Each method appends a post-processor to the key. Casing uses the locale of
//! the key being translated, or the engine's default locale when it has none.

use crate::key::Key;
use crate::locale::Locale;
use crate::string_utils::{capitalize_first, capitalize_words, to_lowercase_locale, to_uppercase_locale};
use crate::translations::Translations;

fn casing_locale(key: &Key) -> Locale {
	match key.locale() {
		Some(locale) => locale.clone(),
		None => Translations::global().settings().default_locale,
	}
}

impl Key {
	/// Uppercase the first character of the translation.
	pub fn capitalize(&self) -> Key {
		self.with_post_processor(|key, text| capitalize_first(&text, &casing_locale(key)))
	}

	/// Uppercase the first character of each space-separated word.
	pub fn capitalize_words(&self) -> Key {
		self.with_post_processor(|key, text| capitalize_words(&text, &casing_locale(key)))
	}

	/// Lowercase the translation.
	pub fn lowercase(&self) -> Key {
		self.with_post_processor(|key, text| to_lowercase_locale(&text, &casing_locale(key)))
	}

	/// Uppercase the translation.
	pub fn uppercase(&self) -> Key {
		self.with_post_processor(|key, text| to_uppercase_locale(&text, &casing_locale(key)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_processors_use_key_locale() {
		// Arrange
		let key = Key::new("post.turkish").with_locale(Locale::parse("tr").unwrap());

		// Act
		let upper = key.uppercase().post_process("istanbul".to_string());
		let lower = key.lowercase().post_process("ISTANBUL".to_string());

		// Assert
		assert_eq!(upper, "İSTANBUL");
		assert_eq!(lower, "ıstanbul");
	}

	#[rstest]
	fn test_processors_chain() {
		let key = Key::new("post.chain")
			.with_locale(Locale::english())
			.lowercase()
			.capitalize_words();

		assert_eq!(key.post_process("HELLO THERE".to_string()), "Hello There");
	}

	#[rstest]
	fn test_capitalize_only_first_character() {
		let key = Key::new("post.capitalize").with_locale(Locale::english()).capitalize();

		assert_eq!(key.post_process("hello there".to_string()), "Hello there");
	}
}
