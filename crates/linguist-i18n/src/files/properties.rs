//! Java-style `.properties` files
//!
//! Supports `#` and `!` comments, `=`, `:` and whitespace separators, line
//! continuations with a trailing backslash and the `\t \n \r \f \uXXXX`
//! escapes. Input is decoded as UTF-8, falling back to ISO-8859-1.

use super::{FileFormat, TranslationTable};
use crate::error::{I18nError, I18nResult};

const WHITESPACE: [char; 3] = [' ', '\t', '\x0c'];

/// The `properties` file format.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesFormat;

impl FileFormat for PropertiesFormat {
	fn identifiers(&self) -> Vec<String> {
		vec!["properties".to_string()]
	}

	fn parse(&self, resource: &str, bytes: &[u8]) -> I18nResult<TranslationTable> {
		parse_properties(resource, &decode(bytes))
	}
}

fn decode(bytes: &[u8]) -> String {
	match std::str::from_utf8(bytes) {
		Ok(text) => text.strip_prefix('\u{feff}').unwrap_or(text).to_string(),
		Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
	}
}

/// Parse properties text into a table, keeping declaration order.
///
/// A key declared twice keeps its first position and its last value.
///
/// # Example
/// ```
/// use linguist_i18n::files::properties::parse_properties;
///
/// let table = parse_properties("inline", "greeting = Hello, \\\n    {0}!\n# comment").unwrap();
/// assert_eq!(table.get("greeting").map(String::as_str), Some("Hello, {0}!"));
/// ```
pub fn parse_properties(resource: &str, input: &str) -> I18nResult<TranslationTable> {
	let mut table = TranslationTable::new();
	let mut lines = input.lines().enumerate();

	while let Some((index, line)) = lines.next() {
		let line_number = index + 1;
		let trimmed = line.trim_start_matches(WHITESPACE);
		if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
			continue;
		}

		let mut logical = trimmed.to_string();
		while has_continuation(&logical) {
			logical.pop();
			match lines.next() {
				Some((_, next)) => logical.push_str(next.trim_start_matches(WHITESPACE)),
				None => break,
			}
		}

		let (key, value) = split_entry(&logical);
		let key = unescape(resource, line_number, key)?;
		let value = unescape(resource, line_number, value)?;
		table.insert(key, value);
	}

	Ok(table)
}

fn has_continuation(line: &str) -> bool {
	line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (&str, &str) {
	let mut escaped = false;

	for (index, c) in line.char_indices() {
		if escaped {
			escaped = false;
			continue;
		}

		match c {
			'\\' => escaped = true,
			'=' | ':' => {
				let value = line[index + 1..].trim_start_matches(WHITESPACE);
				return (&line[..index], value);
			}
			c if WHITESPACE.contains(&c) => {
				let rest = line[index..].trim_start_matches(WHITESPACE);
				let value = rest
					.strip_prefix(['=', ':'])
					.map_or(rest, |v| v.trim_start_matches(WHITESPACE));
				return (&line[..index], value);
			}
			_ => {}
		}
	}

	(line, "")
}

fn unescape(resource: &str, line: usize, input: &str) -> I18nResult<String> {
	let mut out = String::with_capacity(input.len());
	let mut chars = input.chars().peekable();

	while let Some(c) = chars.next() {
		if c != '\\' {
			out.push(c);
			continue;
		}

		match chars.next() {
			Some('t') => out.push('\t'),
			Some('n') => out.push('\n'),
			Some('r') => out.push('\r'),
			Some('f') => out.push('\x0c'),
			Some('u') => {
				let high = read_hex(resource, line, &mut chars)?;
				let code = if (0xD800..0xDC00).contains(&high) {
					let low = match (chars.next(), chars.next()) {
						(Some('\\'), Some('u')) => read_hex(resource, line, &mut chars)?,
						_ => return Err(malformed(resource, line, "unpaired surrogate")),
					};
					if !(0xDC00..0xE000).contains(&low) {
						return Err(malformed(resource, line, "unpaired surrogate"));
					}
					0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
				} else {
					high
				};

				let decoded = char::from_u32(code)
					.ok_or_else(|| malformed(resource, line, "invalid code point"))?;
				out.push(decoded);
			}
			Some(other) => out.push(other),
			None => {}
		}
	}

	Ok(out)
}

fn read_hex(
	resource: &str,
	line: usize,
	chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> I18nResult<u32> {
	let digits: String = (0..4).filter_map(|_| chars.next()).collect();
	if digits.len() != 4 {
		return Err(malformed(resource, line, "malformed \\uXXXX escape"));
	}

	u32::from_str_radix(&digits, 16).map_err(|_| malformed(resource, line, "malformed \\uXXXX escape"))
}

fn malformed(resource: &str, line: usize, message: &str) -> I18nError {
	I18nError::Parse {
		resource: resource.to_string(),
		message: format!("line {line}: {message}"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn parse(input: &str) -> TranslationTable {
		parse_properties("test.properties", input).unwrap()
	}

	#[rstest]
	#[case("key=value", "key", "value")]
	#[case("key = value", "key", "value")]
	#[case("key:value", "key", "value")]
	#[case("key value", "key", "value")]
	#[case("key\t=\tvalue with spaces  ", "key", "value with spaces  ")]
	#[case("   indented=yes", "indented", "yes")]
	#[case("empty=", "empty", "")]
	#[case("bare", "bare", "")]
	#[case("with\\=equals=v", "with=equals", "v")]
	#[case("with\\ space=v", "with space", "v")]
	fn test_separators(#[case] input: &str, #[case] key: &str, #[case] value: &str) {
		let table = parse(input);
		assert_eq!(table.get(key).map(String::as_str), Some(value));
	}

	#[rstest]
	fn test_comments_and_blank_lines_are_skipped() {
		let table = parse("# comment\n! also comment\n\n   \na=1\n  # indented comment\nb=2");

		assert_eq!(table.len(), 2);
		assert_eq!(table.keys().collect::<Vec<_>>(), vec!["a", "b"]);
	}

	#[rstest]
	fn test_continuation_lines() {
		// Arrange
		let input = "message=first \\\n    second \\\n\tthird\nnext=ok";

		// Act
		let table = parse(input);

		// Assert
		assert_eq!(
			table.get("message").map(String::as_str),
			Some("first second third")
		);
		assert_eq!(table.get("next").map(String::as_str), Some("ok"));
	}

	#[rstest]
	fn test_escaped_backslash_is_not_a_continuation() {
		let table = parse("path=C:\\\\\nnext=1");

		assert_eq!(table.get("path").map(String::as_str), Some("C:\\"));
		assert_eq!(table.get("next").map(String::as_str), Some("1"));
	}

	#[rstest]
	#[case("a=tab\\there", "tab\there")]
	#[case("a=line\\nbreak", "line\nbreak")]
	#[case("a=caf\\u00e9", "café")]
	#[case("a=\\uD83D\\uDE00", "😀")]
	#[case("a=it\\'s", "it's")]
	fn test_escapes(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(parse(input).get("a").map(String::as_str), Some(expected));
	}

	#[rstest]
	#[case("a=\\u12")]
	#[case("a=\\uXYZW")]
	#[case("a=\\uD83Dx")]
	fn test_malformed_unicode_escape(#[case] input: &str) {
		let err = parse_properties("bad.properties", input).unwrap_err();

		assert!(matches!(err, I18nError::Parse { ref resource, .. } if resource == "bad.properties"));
		assert!(err.to_string().contains("line 1"));
	}

	#[rstest]
	fn test_duplicate_key_keeps_position_and_last_value() {
		let table = parse("a=1\nb=2\na=3");

		assert_eq!(table.keys().collect::<Vec<_>>(), vec!["a", "b"]);
		assert_eq!(table.get("a").map(String::as_str), Some("3"));
	}

	#[rstest]
	fn test_latin1_fallback() {
		// Arrange
		let bytes = b"greeting=caf\xe9";

		// Act
		let table = PropertiesFormat.parse("latin1.properties", bytes).unwrap();

		// Assert
		assert_eq!(table.get("greeting").map(String::as_str), Some("café"));
	}

	#[rstest]
	fn test_crlf_line_endings() {
		let table = parse("a=1\r\nb=2\r\n");

		assert_eq!(table.get("a").map(String::as_str), Some("1"));
		assert_eq!(table.get("b").map(String::as_str), Some("2"));
	}
}
