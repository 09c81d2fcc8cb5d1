//! Locale identifiers
//!
//! [`Locale`] wraps a [`LanguageIdentifier`] and adds the pieces the resolution
//! engine relies on: the single-subtag test, locale doubling, candidate lists
//! for parent lookup and the suffix used in resource file names.

use crate::error::{I18nError, I18nResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use unic_langid::LanguageIdentifier;
use unic_langid::subtags::Region;

/// Environment variables consulted by [`Locale::system`], in order.
const LOCALE_ENV_VARS: [&str; 4] = ["LINGUIST_LOCALE", "LC_ALL", "LC_MESSAGES", "LANG"];

/// A language/region identifier such as `en` or `en-GB`.
///
/// # Example
/// ```
/// use linguist_i18n::Locale;
///
/// let locale: Locale = "en_GB".parse().unwrap();
/// assert_eq!(locale.tag(), "en-GB");
/// assert_eq!(locale.resource_suffix(), "en_GB");
/// assert!(!locale.is_single_subtag());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Locale(LanguageIdentifier);

impl Locale {
	/// The root locale (`und`), used for base resources without a suffix.
	pub fn root() -> Self {
		Self::default()
	}

	/// English, the last-resort default.
	pub fn english() -> Self {
		Self(LanguageIdentifier::from_parts(
			"en".parse().unwrap_or_default(),
			None,
			None,
			&[],
		))
	}

	/// Parse a locale tag. Both `-` and `_` are accepted as separators.
	pub fn parse(tag: &str) -> I18nResult<Self> {
		let normalized = tag.trim().replace('_', "-");
		if normalized.is_empty() {
			return Err(I18nError::InvalidLocale(tag.to_string()));
		}

		normalized
			.parse::<LanguageIdentifier>()
			.map(Self)
			.map_err(|_| I18nError::InvalidLocale(tag.to_string()))
	}

	/// Build a locale from a language and an optional region.
	pub fn new(language: &str, region: Option<&str>) -> I18nResult<Self> {
		match region {
			Some(region) => Self::parse(&format!("{language}-{region}")),
			None => Self::parse(language),
		}
	}

	/// Detect the platform locale from the environment.
	///
	/// Checks `LINGUIST_LOCALE`, `LC_ALL`, `LC_MESSAGES` and `LANG` in that
	/// order, ignoring encodings (`.UTF-8`), modifiers (`@euro`) and the `C` /
	/// `POSIX` locales. Falls back to English.
	pub fn system() -> Self {
		LOCALE_ENV_VARS
			.iter()
			.filter_map(|var| std::env::var(var).ok())
			.find_map(|value| Self::from_posix(&value))
			.unwrap_or_else(Self::english)
	}

	fn from_posix(value: &str) -> Option<Self> {
		let tag = value.split(['.', '@']).next().unwrap_or_default().trim();
		if tag.is_empty() || tag == "C" || tag == "POSIX" {
			return None;
		}

		Self::parse(tag).ok()
	}

	/// The canonical language tag, e.g. `en-GB`.
	pub fn tag(&self) -> String {
		self.0.to_string()
	}

	/// The language subtag.
	pub fn language(&self) -> &str {
		self.0.language.as_str()
	}

	/// The region subtag, if any.
	pub fn region(&self) -> Option<&str> {
		self.0.region.as_ref().map(|region| region.as_str())
	}

	/// Whether this is the root locale.
	pub fn is_root(&self) -> bool {
		self.0 == LanguageIdentifier::default()
	}

	/// Whether the tag consists of a single subtag (`en` rather than `en-US`).
	pub fn is_single_subtag(&self) -> bool {
		!self.tag().contains(['-', '_'])
	}

	/// The locale formed by pairing the language with itself as a region
	/// (`en` becomes `en-EN`).
	///
	/// Returns `None` when the language can't be used as a region subtag.
	pub fn doubled(&self) -> Option<Self> {
		if self.is_root() {
			return None;
		}

		let region = Region::from_str(&self.language().to_ascii_uppercase()).ok()?;

		Some(Self(LanguageIdentifier::from_parts(
			self.0.language,
			None,
			Some(region),
			&[],
		)))
	}

	/// Candidate locales for parent lookup, most specific first and ending
	/// with the root locale.
	///
	/// `en-Latn-GB` yields `en-Latn-GB`, `en-Latn`, `en-GB`, `en`, root.
	pub fn candidates(&self) -> Vec<Self> {
		let id = &self.0;
		let language = id.language;
		let mut candidates = vec![self.clone()];

		let mut push = |candidate: LanguageIdentifier| {
			let candidate = Self(candidate);
			if !candidates.contains(&candidate) {
				candidates.push(candidate);
			}
		};

		push(LanguageIdentifier::from_parts(language, id.script, id.region, &[]));
		if id.script.is_some() {
			push(LanguageIdentifier::from_parts(language, id.script, None, &[]));
		}
		push(LanguageIdentifier::from_parts(language, None, id.region, &[]));
		push(LanguageIdentifier::from_parts(language, None, None, &[]));
		push(LanguageIdentifier::default());

		candidates
	}

	/// Suffix used in resource names: `en_GB` for `en-GB`, empty for root.
	pub fn resource_suffix(&self) -> String {
		if self.is_root() {
			return String::new();
		}

		let id = &self.0;
		let mut parts = vec![id.language.as_str().to_string()];
		if let Some(script) = &id.script {
			parts.push(script.as_str().to_string());
		}
		if let Some(region) = &id.region {
			parts.push(region.as_str().to_string());
		}
		parts.extend(id.variants().map(|variant| variant.as_str().to_string()));

		parts.join("_")
	}

	/// Access the underlying language identifier.
	pub fn as_language_identifier(&self) -> &LanguageIdentifier {
		&self.0
	}
}

impl fmt::Display for Locale {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for Locale {
	type Err = I18nError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl From<LanguageIdentifier> for Locale {
	fn from(id: LanguageIdentifier) -> Self {
		Self(id)
	}
}

impl Serialize for Locale {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.tag())
	}
}

impl<'de> Deserialize<'de> for Locale {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let tag = String::deserialize(deserializer)?;
		Self::parse(&tag).map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn locale(tag: &str) -> Locale {
		Locale::parse(tag).unwrap()
	}

	#[rstest]
	#[case("en", "en")]
	#[case("en_GB", "en-GB")]
	#[case("EN-gb", "en-GB")]
	#[case("zh-hant-tw", "zh-Hant-TW")]
	fn test_parse_canonicalizes(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(locale(input).tag(), expected);
	}

	#[rstest]
	#[case("")]
	#[case("e!")]
	fn test_parse_rejects_invalid(#[case] input: &str) {
		assert!(matches!(
			Locale::parse(input),
			Err(I18nError::InvalidLocale(_))
		));
	}

	#[rstest]
	#[case("en", true)]
	#[case("de", true)]
	#[case("en-US", false)]
	#[case("und", true)]
	fn test_single_subtag(#[case] tag: &str, #[case] expected: bool) {
		assert_eq!(locale(tag).is_single_subtag(), expected);
	}

	#[rstest]
	fn test_doubled_pairs_language_with_itself() {
		// Arrange
		let english = locale("en");

		// Act
		let doubled = english.doubled().unwrap();

		// Assert
		assert_eq!(doubled.tag(), "en-EN");
		assert_eq!(doubled.language(), "en");
		assert_eq!(doubled.region(), Some("EN"));
	}

	#[rstest]
	fn test_doubled_rejects_three_letter_languages() {
		assert_eq!(locale("fil").doubled(), None);
		assert_eq!(Locale::root().doubled(), None);
	}

	#[rstest]
	fn test_candidates_end_with_root() {
		// Arrange
		let british = locale("en-GB");

		// Act
		let candidates: Vec<String> = british.candidates().iter().map(Locale::tag).collect();

		// Assert
		assert_eq!(candidates, vec!["en-GB", "en", "und"]);
	}

	#[rstest]
	fn test_candidates_with_script() {
		let candidates: Vec<String> = locale("zh-Hant-TW")
			.candidates()
			.iter()
			.map(Locale::tag)
			.collect();
		assert_eq!(
			candidates,
			vec!["zh-Hant-TW", "zh-Hant", "zh-TW", "zh", "und"]
		);
	}

	#[rstest]
	fn test_root_candidates_are_just_root() {
		assert_eq!(Locale::root().candidates(), vec![Locale::root()]);
	}

	#[rstest]
	#[case("en", "en")]
	#[case("en-GB", "en_GB")]
	#[case("de-DE", "de_DE")]
	#[case("und", "")]
	fn test_resource_suffix(#[case] tag: &str, #[case] expected: &str) {
		assert_eq!(locale(tag).resource_suffix(), expected);
	}

	#[rstest]
	#[case("de_DE.UTF-8", Some("de-DE"))]
	#[case("fr_FR@euro", Some("fr-FR"))]
	#[case("C", None)]
	#[case("POSIX", None)]
	#[case("", None)]
	fn test_from_posix(#[case] value: &str, #[case] expected: Option<&str>) {
		assert_eq!(
			Locale::from_posix(value).map(|l| l.tag()),
			expected.map(str::to_string)
		);
	}

	#[rstest]
	fn test_serde_uses_tag() {
		let json = serde_json::to_string(&locale("en-GB")).unwrap();
		assert_eq!(json, "\"en-GB\"");

		let back: Locale = serde_json::from_str("\"de_AT\"").unwrap();
		assert_eq!(back.tag(), "de-AT");
	}
}
