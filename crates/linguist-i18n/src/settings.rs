//! Process-wide translation settings

use crate::bundle::Bundle;
use crate::locale::Locale;
use serde::{Deserialize, Serialize};

/// Prefix prepended to every bundle name.
pub const DEFAULT_BUNDLE_PREFIX: &str = "translations";

/// Suffix appended to bundle names with fewer than two separators.
pub const DEFAULT_BUNDLE_SUFFIX: &str = "strings";

/// Suffix that turns a prefixed bundle name into its override name.
pub const OVERRIDE_SUFFIX: &str = "_override";

/// Settings read by the resolution engine.
///
/// These are expected to be configured once during host startup.
///
/// # Example
/// ```
/// use linguist_i18n::{Bundle, I18nSettings, Locale};
///
/// let settings = I18nSettings::default()
/// 	.with_default_locale(Locale::parse("de").unwrap())
/// 	.with_default_bundle(Bundle::new("app"));
///
/// assert_eq!(settings.default_locale.tag(), "de");
/// assert_eq!(settings.default_bundle_prefix, "translations");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nSettings {
	/// Locale used when a key doesn't specify one.
	pub default_locale: Locale,
	/// Prefix for bundle names (`core` becomes `translations.core.strings`).
	pub default_bundle_prefix: String,
	/// Suffix for bundle names with fewer than two separators.
	pub default_bundle_suffix: String,
	/// Bundle used for keys without one, and as the key-level fallback.
	pub default_bundle: Option<Bundle>,
}

impl Default for I18nSettings {
	fn default() -> Self {
		Self {
			default_locale: Locale::system(),
			default_bundle_prefix: DEFAULT_BUNDLE_PREFIX.to_string(),
			default_bundle_suffix: DEFAULT_BUNDLE_SUFFIX.to_string(),
			default_bundle: None,
		}
	}
}

impl I18nSettings {
	/// Build settings from the environment.
	///
	/// Reads `LINGUIST_DEFAULT_LOCALE`, `LINGUIST_BUNDLE_PREFIX`,
	/// `LINGUIST_BUNDLE_SUFFIX` and `LINGUIST_DEFAULT_BUNDLE`. Unset or invalid
	/// values keep their defaults.
	pub fn from_env() -> Self {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
		let mut settings = Self::default();

		if let Some(locale) = lookup("LINGUIST_DEFAULT_LOCALE") {
			match Locale::parse(&locale) {
				Ok(locale) => settings.default_locale = locale,
				Err(err) => tracing::warn!("Ignoring LINGUIST_DEFAULT_LOCALE: {}", err),
			}
		}
		if let Some(prefix) = lookup("LINGUIST_BUNDLE_PREFIX").filter(|s| !s.is_empty()) {
			settings.default_bundle_prefix = prefix;
		}
		if let Some(suffix) = lookup("LINGUIST_BUNDLE_SUFFIX").filter(|s| !s.is_empty()) {
			settings.default_bundle_suffix = suffix;
		}
		if let Some(bundle) = lookup("LINGUIST_DEFAULT_BUNDLE").filter(|s| !s.is_empty()) {
			settings.default_bundle = Some(Bundle::new(bundle));
		}

		settings
	}

	/// Set the default locale.
	pub fn with_default_locale(mut self, locale: Locale) -> Self {
		self.default_locale = locale;
		self
	}

	/// Set the bundle name prefix.
	pub fn with_bundle_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.default_bundle_prefix = prefix.into();
		self
	}

	/// Set the bundle name suffix.
	pub fn with_bundle_suffix(mut self, suffix: impl Into<String>) -> Self {
		self.default_bundle_suffix = suffix.into();
		self
	}

	/// Set the default bundle.
	pub fn with_default_bundle(mut self, bundle: Bundle) -> Self {
		self.default_bundle = Some(bundle);
		self
	}

	/// Expand a bundle name into its resource name.
	///
	/// `core` becomes `translations.core.strings`; `core.errors` becomes
	/// `translations.core.errors` since the prefixed form already has two
	/// separators.
	pub fn prefixed_name(&self, bundle_name: &str) -> String {
		let prefixed = format!("{}.{}", self.default_bundle_prefix, bundle_name);

		if prefixed.matches('.').count() < 2 {
			format!("{}.{}", prefixed, self.default_bundle_suffix)
		} else {
			prefixed
		}
	}

	/// The override name for an already-prefixed bundle name.
	pub fn override_name(prefixed_name: &str) -> String {
		format!("{prefixed_name}{OVERRIDE_SUFFIX}")
	}
}
