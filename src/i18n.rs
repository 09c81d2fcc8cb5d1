//! Internationalization module.
//!
//! Key and bundle based translation resolution with pluggable file formats,
//! message formats and resource loaders.
//!
//! # Examples
//!
//! ```rust,no_run
//! use linguist::i18n::{Bundle, Key, Locale};
//!
//! let key = Key::in_bundle("command.banana", Bundle::new("core"));
//! let german = key.translate_locale(Locale::parse("de").unwrap()).unwrap();
//! ```

#[cfg(feature = "i18n")]
pub use linguist_i18n::*;
