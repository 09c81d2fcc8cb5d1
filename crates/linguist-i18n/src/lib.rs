//! Key and bundle based translation resolution
//!
//! Translations are addressed by a [`Key`] (the string's identifier plus an
//! optional [`Bundle`] and [`Locale`]) and resolved through pluggable file
//! formats, message formats and resource loaders.
//!
//! ## Resolution
//!
//! A bundle named `core` is looked up as `translations.core.strings`, i.e. the
//! resources `translations/core/strings_{locale}.{ext}` and
//! `translations/core/strings.{ext}`. An optional `strings_override` source
//! shadows individual keys. See [`Translations`] for the full algorithm.
//!
//! ## Formats
//!
//! - File formats: `properties` (default) and `yaml`/`yml`
//! - Message formats: `icu-v1` (default) and `icu-v2`
//!
//! Both sets are extensible through [`Registries`].
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use linguist_i18n::{Bundle, EmbeddedLoader, I18nSettings, Key, Locale, Registries, Translations};
//!
//! let loader = EmbeddedLoader::new("app")
//! 	.with_resource("translations/shop/strings.properties", "cart={0, plural, =0 {empty} other {# items}}");
//!
//! let engine = Translations::new(
//! 	Arc::new(Registries::with_defaults()),
//! 	I18nSettings::default()
//! 		.with_default_locale(Locale::english())
//! 		.with_default_bundle(Bundle::new("shop")),
//! )
//! .with_default_loader(Arc::new(loader));
//!
//! assert_eq!(engine.translate_key(&Key::new("cart"), vec![3.into()]).unwrap(), "3 items");
//! assert_eq!(engine.translate_key(&Key::new("checkout"), vec![]).unwrap(), "checkout");
//! ```

pub mod bundle;
pub mod error;
pub mod files;
pub mod key;
pub mod loader;
pub mod locale;
pub mod messages;
pub mod post_process;
pub mod registries;
pub mod settings;
pub mod string_utils;
pub mod translations;
pub mod value;

pub use bundle::{Bundle, BundleBuilder, DEFAULT_FILE_FORMAT};
pub use error::{BoxError, FormatKind, I18nError, I18nResult};
pub use files::{FileFormat, LoadedSource, Provenance, SourceLevel, TranslationTable};
pub use key::{Key, PlaceholderPosition, PostProcessor};
pub use loader::{ChainLoader, DirectoryLoader, EmbeddedLoader, ResourceLoader, global_loader};
pub use locale::Locale;
pub use messages::{MessageFormat, MessageFormatError, NamedPlaceholders};
pub use registries::Registries;
pub use settings::I18nSettings;
pub use string_utils::EMPTY_VALUE_STRING;
pub use translations::Translations;
pub use value::Value;
