//! Helpers for working with translated strings

use crate::locale::Locale;

/// Placeholder translators use for values that are intentionally empty.
pub const EMPTY_VALUE_STRING: &str = "∅∅∅";

fn is_turkic(locale: &Locale) -> bool {
	matches!(locale.language(), "tr" | "az")
}

/// Uppercase `text` using the casing rules of `locale`.
pub fn to_uppercase_locale(text: &str, locale: &Locale) -> String {
	if !is_turkic(locale) {
		return text.to_uppercase();
	}

	let mut result = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'i' => result.push('İ'),
			_ => result.extend(c.to_uppercase()),
		}
	}
	result
}

/// Lowercase `text` using the casing rules of `locale`.
pub fn to_lowercase_locale(text: &str, locale: &Locale) -> String {
	if !is_turkic(locale) {
		return text.to_lowercase();
	}

	let mut result = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'I' => result.push('ı'),
			'İ' => result.push('i'),
			_ => result.extend(c.to_lowercase()),
		}
	}
	result
}

/// Uppercase the first character of `text` when it is lowercase.
pub fn capitalize_first(text: &str, locale: &Locale) -> String {
	let mut chars = text.chars();
	match chars.next() {
		Some(first) if first.is_lowercase() => {
			let mut result = to_uppercase_locale(&first.to_string(), locale);
			result.push_str(chars.as_str());
			result
		}
		_ => text.to_string(),
	}
}

/// Capitalize each space-separated word of `text`.
///
/// ```
/// use linguist_i18n::Locale;
/// use linguist_i18n::string_utils::capitalize_words;
///
/// assert_eq!(capitalize_words("hello  big world", &Locale::english()), "Hello  Big World");
/// ```
pub fn capitalize_words(text: &str, locale: &Locale) -> String {
	text.split(' ')
		.map(|word| capitalize_first(word, locale))
		.collect::<Vec<_>>()
		.join(" ")
}

/// Split a translated list on `separator`, trimming entries and dropping
/// [`EMPTY_VALUE_STRING`] markers.
pub fn split_translated(text: &str, separator: &str) -> Vec<String> {
	text.split(separator)
		.map(str::trim)
		.filter(|entry| *entry != EMPTY_VALUE_STRING)
		.map(str::to_string)
		.collect()
}

/// Whether a translation is empty or the [`EMPTY_VALUE_STRING`] marker.
pub fn is_empty_translation(text: &str) -> bool {
	text.is_empty() || text == EMPTY_VALUE_STRING
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn locale(tag: &str) -> Locale {
		Locale::parse(tag).unwrap()
	}

	#[rstest]
	#[case("en", "istanbul", "ISTANBUL")]
	#[case("tr", "istanbul", "İSTANBUL")]
	#[case("az", "bir", "BİR")]
	fn test_uppercase(#[case] tag: &str, #[case] input: &str, #[case] expected: &str) {
		assert_eq!(to_uppercase_locale(input, &locale(tag)), expected);
	}

	#[rstest]
	#[case("en", "ISTANBUL", "istanbul")]
	#[case("tr", "ISTANBUL", "ıstanbul")]
	#[case("tr", "İSTANBUL", "istanbul")]
	fn test_lowercase(#[case] tag: &str, #[case] input: &str, #[case] expected: &str) {
		assert_eq!(to_lowercase_locale(input, &locale(tag)), expected);
	}

	#[rstest]
	#[case("banana", "Banana")]
	#[case("Banana", "Banana")]
	#[case("1 banana", "1 banana")]
	#[case("", "")]
	fn test_capitalize_first(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(capitalize_first(input, &Locale::english()), expected);
	}

	#[rstest]
	fn test_capitalize_words_turkic() {
		assert_eq!(capitalize_words("iki ılık", &locale("tr")), "İki Ilık");
	}

	#[rstest]
	fn test_split_translated_drops_empty_markers() {
		// Arrange
		let text = " apple, ∅∅∅ ,banana ,";

		// Act
		let entries = split_translated(text, ",");

		// Assert
		assert_eq!(entries, vec!["apple", "banana", ""]);
	}

	#[rstest]
	#[case("", true)]
	#[case("∅∅∅", true)]
	#[case(" ", false)]
	#[case("value", false)]
	fn test_is_empty_translation(#[case] input: &str, #[case] expected: bool) {
		assert_eq!(is_empty_translation(input), expected);
	}
}
