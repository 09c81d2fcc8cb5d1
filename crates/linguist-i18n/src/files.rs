//! File formats and locale chain loading
//!
//! A [`FileFormat`] turns the bytes of one physical resource into an ordered
//! key → pattern table. [`load_source`] stacks those tables into a
//! [`LoadedSource`]: the most specific locale level first, then its parents,
//! then the root resource.

pub mod properties;
pub mod yaml;

pub use properties::PropertiesFormat;
pub use yaml::YamlFormat;

use crate::error::I18nResult;
use crate::loader::{ResourceLoader, global_loader};
use crate::locale::Locale;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Ordered key → raw pattern table parsed from one resource.
pub type TranslationTable = IndexMap<String, String>;

/// A pluggable translation file format.
pub trait FileFormat: Send + Sync + fmt::Debug {
	/// Identifiers this format answers to. Each one doubles as a file
	/// extension.
	fn identifiers(&self) -> Vec<String>;

	/// Parse a resource into a table, keeping declaration order.
	fn parse(&self, resource: &str, bytes: &[u8]) -> I18nResult<TranslationTable>;

	/// Locale to try when no resource exists for `locale` or its parents.
	///
	/// The default policy falls back to the configured default locale unless
	/// the requested locale already is the default.
	fn fallback_locale(&self, _base_name: &str, locale: &Locale, default: &Locale) -> Option<Locale> {
		(locale != default).then(|| default.clone())
	}

	/// Loader used for the last-resort lookup when no candidate loader
	/// has the resource.
	fn default_loader(&self) -> Arc<dyn ResourceLoader> {
		global_loader()
	}
}

/// Which loader and extension satisfied a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
	/// Name of the loader.
	pub loader: String,
	/// File extension of the most specific level.
	pub extension: String,
}

/// One parsed resource in a locale chain.
#[derive(Debug, Clone)]
pub struct SourceLevel {
	/// Locale this level was loaded for (root for the base resource).
	pub locale: Locale,
	/// Resource path that was read.
	pub resource: String,
	/// Extension the resource was found under.
	pub extension: String,
	/// Parsed entries.
	pub table: TranslationTable,
}

/// A bundle's translations for one locale, as a chain of levels.
#[derive(Debug, Clone)]
pub struct LoadedSource {
	bundle: String,
	locale: Locale,
	provenance: Provenance,
	levels: Vec<SourceLevel>,
}

impl LoadedSource {
	/// Build a source from its levels, most specific first.
	///
	/// Returns `None` when there are no levels.
	pub fn new(
		bundle: impl Into<String>,
		locale: Locale,
		loader: impl Into<String>,
		levels: Vec<SourceLevel>,
	) -> Option<Self> {
		let extension = levels.first()?.extension.clone();

		Some(Self {
			bundle: bundle.into(),
			locale,
			provenance: Provenance {
				loader: loader.into(),
				extension,
			},
			levels,
		})
	}

	/// Prefixed bundle name this source was loaded for.
	pub fn bundle(&self) -> &str {
		&self.bundle
	}

	/// Requested locale.
	pub fn locale(&self) -> &Locale {
		&self.locale
	}

	/// Loader and extension that satisfied the source.
	pub fn provenance(&self) -> &Provenance {
		&self.provenance
	}

	/// Levels, most specific first.
	pub fn levels(&self) -> &[SourceLevel] {
		&self.levels
	}

	/// Look a key up through the chain.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.levels
			.iter()
			.find_map(|level| level.table.get(key))
			.map(String::as_str)
	}

	/// Whether any level defines the key.
	pub fn contains_key(&self, key: &str) -> bool {
		self.levels.iter().any(|level| level.table.contains_key(key))
	}

	/// Keys in declaration order: the most specific level's keys first, then
	/// keys only its parents define.
	pub fn keys(&self) -> Vec<&str> {
		let mut seen = HashSet::new();

		self.levels
			.iter()
			.flat_map(|level| level.table.keys())
			.filter(|key| seen.insert(key.as_str()))
			.map(String::as_str)
			.collect()
	}

	/// The first key in declaration order.
	pub fn first_key(&self) -> Option<&str> {
		self.levels
			.iter()
			.find_map(|level| level.table.keys().next())
			.map(String::as_str)
	}
}

/// Resource path for a dotted bundle name: `translations.core.strings`
/// becomes `translations/core/strings`.
pub fn resource_base(bundle_name: &str) -> String {
	bundle_name.replace('.', "/")
}

/// Load the locale chain for `bundle_name` through `loader`.
///
/// Tries `base_{suffix}.{ext}` for every candidate of `locale` and every
/// identifier of the format. When no locale-specific level exists, the
/// format's fallback locale and its candidates are tried instead. The root
/// resource `base.{ext}` is always appended last. Returns `Ok(None)` when the
/// chain is empty.
pub fn load_source(
	format: &dyn FileFormat,
	loader: &dyn ResourceLoader,
	bundle_name: &str,
	locale: &Locale,
	default_locale: &Locale,
) -> I18nResult<Option<LoadedSource>> {
	let base = resource_base(bundle_name);
	let extensions = format.identifiers();

	let read_level = |level_locale: &Locale| -> I18nResult<Option<SourceLevel>> {
		let suffix = level_locale.resource_suffix();

		for extension in &extensions {
			let resource = if suffix.is_empty() {
				format!("{base}.{extension}")
			} else {
				format!("{base}_{suffix}.{extension}")
			};

			tracing::trace!("Trying {} through loader '{}'", resource, loader.name());
			if let Some(bytes) = loader.load(&resource)? {
				let table = format.parse(&resource, &bytes)?;
				return Ok(Some(SourceLevel {
					locale: level_locale.clone(),
					resource,
					extension: extension.clone(),
					table,
				}));
			}
		}

		Ok(None)
	};

	let read_chain = |chain_locale: &Locale| -> I18nResult<Vec<SourceLevel>> {
		let mut levels = Vec::new();
		for candidate in chain_locale.candidates() {
			if candidate.is_root() {
				continue;
			}
			if let Some(level) = read_level(&candidate)? {
				levels.push(level);
			}
		}
		Ok(levels)
	};

	let mut levels = read_chain(locale)?;
	if levels.is_empty()
		&& let Some(fallback) = format.fallback_locale(bundle_name, locale, default_locale)
	{
		tracing::trace!(
			"No {} resources for {}, falling back to {}",
			bundle_name,
			locale,
			fallback
		);
		levels = read_chain(&fallback)?;
	}
	if let Some(root) = read_level(&Locale::root())? {
		levels.push(root);
	}

	Ok(LoadedSource::new(
		bundle_name,
		locale.clone(),
		loader.name(),
		levels,
	))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::loader::EmbeddedLoader;
	use rstest::{fixture, rstest};

	fn locale(tag: &str) -> Locale {
		Locale::parse(tag).unwrap()
	}

	#[fixture]
	fn loader() -> EmbeddedLoader {
		EmbeddedLoader::new("embedded")
			.with_resource("translations/test/strings.properties", "a=root a\nb=root b\nc=root c")
			.with_resource("translations/test/strings_en.properties", "b=en b\na=en a")
			.with_resource("translations/test/strings_en_GB.properties", "a=gb a")
			.with_resource("translations/test/strings_de.properties", "a=de a")
	}

	#[rstest]
	fn test_chain_is_most_specific_first(loader: EmbeddedLoader) {
		// Act
		let source = load_source(
			&PropertiesFormat,
			&loader,
			"translations.test.strings",
			&locale("en-GB"),
			&locale("en"),
		)
		.unwrap()
		.unwrap();

		// Assert
		let levels: Vec<String> = source.levels().iter().map(|l| l.locale.tag()).collect();
		assert_eq!(levels, vec!["en-GB", "en", "und"]);
		assert_eq!(source.get("a"), Some("gb a"));
		assert_eq!(source.get("b"), Some("en b"));
		assert_eq!(source.get("c"), Some("root c"));
		assert_eq!(source.get("d"), None);
		assert_eq!(source.keys(), vec!["a", "b", "c"]);
		assert_eq!(source.first_key(), Some("a"));
		assert_eq!(
			source.provenance(),
			&Provenance {
				loader: "embedded".to_string(),
				extension: "properties".to_string(),
			}
		);
	}

	#[rstest]
	fn test_missing_locale_uses_default_locale(loader: EmbeddedLoader) {
		// Act
		let source = load_source(
			&PropertiesFormat,
			&loader,
			"translations.test.strings",
			&locale("fr"),
			&locale("de"),
		)
		.unwrap()
		.unwrap();

		// Assert
		assert_eq!(source.get("a"), Some("de a"));
		assert_eq!(source.locale().tag(), "fr");
	}

	#[rstest]
	fn test_missing_locale_without_fallback_uses_root(loader: EmbeddedLoader) {
		let source = load_source(
			&PropertiesFormat,
			&loader,
			"translations.test.strings",
			&locale("fr"),
			&locale("fr"),
		)
		.unwrap()
		.unwrap();

		assert_eq!(source.levels().len(), 1);
		assert_eq!(source.get("a"), Some("root a"));
	}

	#[rstest]
	fn test_unknown_bundle_is_none(loader: EmbeddedLoader) {
		let source = load_source(
			&PropertiesFormat,
			&loader,
			"translations.missing.strings",
			&locale("en"),
			&locale("en"),
		)
		.unwrap();

		assert!(source.is_none());
	}

	#[rstest]
	fn test_parse_errors_propagate() {
		let loader = EmbeddedLoader::new("broken")
			.with_resource("translations/bad/strings.properties", "a=\\uZZZZ");

		let result = load_source(
			&PropertiesFormat,
			&loader,
			"translations.bad.strings",
			&locale("en"),
			&locale("en"),
		);

		assert!(matches!(result, Err(crate::I18nError::Parse { .. })));
	}

	#[rstest]
	fn test_resource_base() {
		assert_eq!(
			resource_base("translations.core.strings"),
			"translations/core/strings"
		);
	}
}
