//! Locale-aware number rendering for the built-in message formats
//!
//! Covers grouping and decimal separators and the percent sign placement for
//! common languages. Fractions are limited to three digits unless a decimal
//! pattern asks otherwise.

use crate::locale::Locale;

const MAX_FRACTION_DIGITS: usize = 3;

/// Separators used when rendering numbers for a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberSymbols {
	/// Thousands separator.
	pub grouping: char,
	/// Decimal separator.
	pub decimal: char,
	/// Text placed between the number and `%`.
	pub percent_spacing: &'static str,
}

impl NumberSymbols {
	/// Symbols for the given locale, defaulting to English conventions.
	pub fn for_locale(locale: &Locale) -> Self {
		match locale.language() {
			"de" | "es" | "it" | "nl" | "pt" | "id" | "da" | "tr" | "el" | "ro" | "hr" | "sl"
			| "sr" => Self {
				grouping: '.',
				decimal: ',',
				percent_spacing: if matches!(locale.language(), "de" | "es" | "da" | "el") {
					"\u{a0}"
				} else {
					""
				},
			},
			"fr" => Self {
				grouping: '\u{202f}',
				decimal: ',',
				percent_spacing: "\u{202f}",
			},
			"ru" | "uk" | "pl" | "cs" | "sk" | "fi" | "sv" | "nb" | "no" | "bg" | "hu" | "lt"
			| "lv" | "et" => Self {
				grouping: '\u{a0}',
				decimal: ',',
				percent_spacing: "\u{a0}",
			},
			_ => Self {
				grouping: ',',
				decimal: '.',
				percent_spacing: "",
			},
		}
	}
}

/// Render an integer with grouping separators.
pub fn format_int(value: i64, locale: &Locale) -> String {
	let symbols = NumberSymbols::for_locale(locale);
	let digits = group(&value.unsigned_abs().to_string(), symbols.grouping);

	if value < 0 {
		format!("-{digits}")
	} else {
		digits
	}
}

/// Render a number with up to three fraction digits.
///
/// # Example
/// ```
/// use linguist_i18n::Locale;
/// use linguist_i18n::messages::number::format_number;
///
/// let en = Locale::parse("en").unwrap();
/// let de = Locale::parse("de").unwrap();
///
/// assert_eq!(format_number(1234.5678, &en), "1,234.568");
/// assert_eq!(format_number(1234.5, &de), "1.234,5");
/// ```
pub fn format_number(value: f64, locale: &Locale) -> String {
	render(value, MAX_FRACTION_DIGITS, locale)
}

/// Render a number rounded to an integer.
pub fn format_integer(value: f64, locale: &Locale) -> String {
	render(value, 0, locale)
}

/// Render a ratio as a rounded percentage (`0.25` becomes `25%`).
pub fn format_percent(value: f64, locale: &Locale) -> String {
	let symbols = NumberSymbols::for_locale(locale);
	format!(
		"{}{}%",
		render(value * 100.0, 0, locale),
		symbols.percent_spacing
	)
}

/// Render a number with a fraction digit range and optional grouping, as
/// described by a decimal pattern such as `#,##0.00`.
///
/// # Example
/// ```
/// use linguist_i18n::Locale;
/// use linguist_i18n::messages::number::format_fixed;
///
/// let en = Locale::parse("en").unwrap();
///
/// assert_eq!(format_fixed(1234.5, 2, 2, true, &en), "1,234.50");
/// assert_eq!(format_fixed(1234.5, 0, 0, false, &en), "1234");
/// ```
pub fn format_fixed(
	value: f64,
	min_fraction: usize,
	max_fraction: usize,
	grouping: bool,
	locale: &Locale,
) -> String {
	let symbols = NumberSymbols::for_locale(locale);
	render_digits(
		value,
		min_fraction.min(max_fraction),
		max_fraction,
		grouping.then_some(symbols.grouping),
		symbols.decimal,
	)
}

fn render(value: f64, fraction_digits: usize, locale: &Locale) -> String {
	let symbols = NumberSymbols::for_locale(locale);
	render_digits(
		value,
		0,
		fraction_digits,
		Some(symbols.grouping),
		symbols.decimal,
	)
}

fn render_digits(
	value: f64,
	min_fraction: usize,
	max_fraction: usize,
	grouping: Option<char>,
	decimal: char,
) -> String {
	if value.is_nan() {
		return "NaN".to_string();
	}
	if value.is_infinite() {
		return if value > 0.0 { "∞" } else { "-∞" }.to_string();
	}

	let magnitude = if max_fraction == 0 {
		value.abs().round_ties_even()
	} else {
		value.abs()
	};
	let fixed = format!("{:.*}", max_fraction, magnitude);
	let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
	let significant = fraction.trim_end_matches('0').len();
	let fraction = &fraction[..significant.max(min_fraction)];

	let mut out = String::new();
	if value.is_sign_negative() && (integer != "0" || fraction.bytes().any(|b| b != b'0')) {
		out.push('-');
	}
	match grouping {
		Some(separator) => out.push_str(&group(integer, separator)),
		None => out.push_str(integer),
	}
	if !fraction.is_empty() {
		out.push(decimal);
		out.push_str(fraction);
	}

	out
}

fn group(digits: &str, separator: char) -> String {
	let len = digits.len();
	let mut out = String::with_capacity(len + len / 3);

	for (index, digit) in digits.chars().enumerate() {
		if index > 0 && (len - index) % 3 == 0 {
			out.push(separator);
		}
		out.push(digit);
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn locale(tag: &str) -> Locale {
		Locale::parse(tag).unwrap()
	}

	#[rstest]
	#[case(0, "0")]
	#[case(999, "999")]
	#[case(1000, "1,000")]
	#[case(-1234567, "-1,234,567")]
	#[case(i64::MIN, "-9,223,372,036,854,775,808")]
	fn test_format_int_en(#[case] value: i64, #[case] expected: &str) {
		assert_eq!(format_int(value, &locale("en")), expected);
	}

	#[rstest]
	#[case("de", "1.234.567")]
	#[case("fr", "1\u{202f}234\u{202f}567")]
	#[case("ru", "1\u{a0}234\u{a0}567")]
	#[case("ja", "1,234,567")]
	fn test_format_int_locales(#[case] tag: &str, #[case] expected: &str) {
		assert_eq!(format_int(1234567, &locale(tag)), expected);
	}

	#[rstest]
	#[case(1.5, "1.5")]
	#[case(2.0, "2")]
	#[case(0.1234, "0.123")]
	#[case(-0.0001, "0")]
	#[case(-12345.25, "-12,345.25")]
	#[case(f64::NAN, "NaN")]
	fn test_format_number_en(#[case] value: f64, #[case] expected: &str) {
		assert_eq!(format_number(value, &locale("en")), expected);
	}

	#[rstest]
	fn test_format_integer_rounds_half_even() {
		let en = locale("en");

		assert_eq!(format_integer(2.5, &en), "2");
		assert_eq!(format_integer(3.5, &en), "4");
		assert_eq!(format_integer(1234.4, &en), "1,234");
	}

	#[rstest]
	#[case("en", "25%")]
	#[case("de", "25\u{a0}%")]
	#[case("fr", "25\u{202f}%")]
	fn test_format_percent(#[case] tag: &str, #[case] expected: &str) {
		assert_eq!(format_percent(0.25, &locale(tag)), expected);
	}

	#[rstest]
	#[case(1234.5, 2, 2, true, "1,234.50")]
	#[case(1234.5678, 2, 2, true, "1,234.57")]
	#[case(0.5, 1, 3, false, "0.5")]
	#[case(2.0, 1, 3, false, "2.0")]
	#[case(1234.5, 0, 0, false, "1234")]
	#[case(-0.001, 2, 2, true, "0.00")]
	fn test_format_fixed_en(
		#[case] value: f64,
		#[case] min: usize,
		#[case] max: usize,
		#[case] grouping: bool,
		#[case] expected: &str,
	) {
		assert_eq!(format_fixed(value, min, max, grouping, &locale("en")), expected);
	}

	#[rstest]
	fn test_format_fixed_uses_locale_separators() {
		assert_eq!(format_fixed(1234.5, 2, 2, true, &locale("de")), "1.234,50");
	}
}
