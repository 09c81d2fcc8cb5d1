//! # Linguist
//!
//! Key and bundle based internationalization for Rust applications.
//!
//! Translations are addressed by keys grouped into bundles. Each bundle is
//! read from resource files (`.properties` or YAML) and its strings are
//! rendered with an ICU message format.
//!
//! ## Feature Flags
//!
//! - `i18n` - The translation resolution engine and built-in formats
//! - `full` (default) - All features enabled
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use linguist::prelude::*;
//!
//! Translations::global().set_settings(
//! 	I18nSettings::default()
//! 		.with_default_locale(Locale::english())
//! 		.with_default_bundle(Bundle::new("app")),
//! );
//!
//! // Looks up `command.greet` in `translations/app/strings_en.properties`,
//! // then `translations/app/strings.properties`
//! let greeting = Key::new("command.greet").translate_with(["Ada"]).unwrap();
//! ```

#[cfg(feature = "i18n")]
pub mod i18n;

/// Commonly used types
pub mod prelude {
	#[cfg(feature = "i18n")]
	pub use crate::i18n::{
		Bundle, I18nError, I18nResult, I18nSettings, Key, Locale, PlaceholderPosition,
		Translations, Value,
	};
}
