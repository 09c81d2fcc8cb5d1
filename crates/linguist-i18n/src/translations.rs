//! Translation resolution engine
//!
//! [`Translations`] turns a [`Key`] into a formatted string:
//!
//! 1. The effective bundle and locale are the key's own, or the configured
//!    defaults.
//! 2. The bundle's source and its optional override source are resolved and
//!    cached per (prefixed name, locale). Loaders are probed in order: the
//!    loader pinned to the bundle, the engine's default loader, the
//!    platform-global loader, then every loader returned by discovery
//!    callbacks. The file format's own default loader is the last resort.
//! 3. The override source shadows the base source key by key. A key missing
//!    from both is retried in the default bundle, and finally the key text
//!    itself is used as the pattern.
//! 4. The pattern is rendered by the bundle's message format, and the key's
//!    post-processors run over the result.
//!
//! A single-subtag locale such as `de` is also resolved as its doubled form
//! (`de-DE`). When the two sources disagree on their first key, the doubled
//! one is used.

use crate::bundle::Bundle;
use crate::error::{I18nError, I18nResult};
use crate::files::{FileFormat, LoadedSource, load_source, resource_base};
use crate::key::{Key, PlaceholderPosition};
use crate::loader::{ResourceLoader, global_loader};
use crate::locale::Locale;
use crate::messages::{MessageFormat, NamedPlaceholders};
use crate::registries::Registries;
use crate::settings::I18nSettings;
use crate::value::Value;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

static GLOBAL_TRANSLATIONS: Lazy<Translations> =
	Lazy::new(|| Translations::new(Registries::global(), I18nSettings::from_env()));

type CacheKey = (String, Locale);

/// Resolves keys against bundles and renders them.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use linguist_i18n::{Bundle, EmbeddedLoader, I18nSettings, Key, Locale, Registries, Translations};
///
/// let loader = EmbeddedLoader::new("docs")
/// 	.with_resource("translations/docs/strings.properties", "greeting=Hello, {0}!")
/// 	.with_resource("translations/docs/strings_de.properties", "greeting=Hallo, {0}!");
///
/// let engine = Translations::new(
/// 	Arc::new(Registries::with_defaults()),
/// 	I18nSettings::default().with_default_locale(Locale::english()),
/// )
/// .with_default_loader(Arc::new(loader));
///
/// let key = Key::in_bundle("greeting", Bundle::new("docs"));
/// let german = key.with_locale(Locale::parse("de").unwrap());
///
/// assert_eq!(engine.translate_key(&key, vec!["Ada".into()]).unwrap(), "Hello, Ada!");
/// assert_eq!(engine.translate_key(&german, vec!["Ada".into()]).unwrap(), "Hallo, Ada!");
/// ```
pub struct Translations {
	registries: Arc<Registries>,
	settings: RwLock<I18nSettings>,
	default_loader: Arc<dyn ResourceLoader>,
	cache: RwLock<HashMap<CacheKey, Option<Arc<LoadedSource>>>>,
}

impl std::fmt::Debug for Translations {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Translations")
			.field("settings", &*self.settings.read())
			.field("default_loader", &self.default_loader.name())
			.field("cached_sources", &self.cache.read().len())
			.finish()
	}
}

impl Translations {
	/// An engine over `registries`, reading resources through the
	/// platform-global loader by default.
	pub fn new(registries: Arc<Registries>, settings: I18nSettings) -> Self {
		Self {
			registries,
			settings: RwLock::new(settings),
			default_loader: global_loader(),
			cache: RwLock::new(HashMap::new()),
		}
	}

	/// Replace the engine's default loader.
	pub fn with_default_loader(mut self, loader: Arc<dyn ResourceLoader>) -> Self {
		self.default_loader = loader;
		self
	}

	/// The process-wide engine, configured from the environment.
	pub fn global() -> &'static Self {
		&GLOBAL_TRANSLATIONS
	}

	/// Registries this engine resolves formats and loaders through.
	pub fn registries(&self) -> &Registries {
		&self.registries
	}

	/// A snapshot of the current settings.
	pub fn settings(&self) -> I18nSettings {
		self.settings.read().clone()
	}

	/// Update the settings and drop every cached source.
	///
	/// Settings are meant to be applied at startup. A lookup running
	/// concurrently with this call may cache a source resolved against the
	/// previous settings.
	pub fn configure(&self, change: impl FnOnce(&mut I18nSettings)) {
		change(&mut self.settings.write());
		self.clear_cache();
	}

	/// Replace the settings and drop every cached source. The same
	/// restriction as [`Translations::configure`] applies.
	pub fn set_settings(&self, settings: I18nSettings) {
		self.configure(|current| *current = settings);
	}

	/// Set the locale used for keys without one.
	pub fn set_default_locale(&self, locale: Locale) {
		tracing::debug!("Default locale set to {}", locale);
		self.configure(|settings| settings.default_locale = locale);
	}

	/// Set the bundle used for keys without one.
	pub fn set_default_bundle(&self, bundle: Option<Bundle>) {
		self.configure(|settings| settings.default_bundle = bundle);
	}

	/// Drop every cached source.
	pub fn clear_cache(&self) {
		self.cache.write().clear();
	}

	/// Number of cached (name, locale) entries, including absent overrides.
	pub fn cached_sources(&self) -> usize {
		self.cache.read().len()
	}

	fn effective(&self, key: &Key) -> I18nResult<(Bundle, Locale)> {
		let settings = self.settings.read();

		let bundle = match key.bundle() {
			Some(bundle) => bundle.clone(),
			None => settings.default_bundle.clone().ok_or_else(|| {
				I18nError::Configuration(format!(
					"{key} has no bundle and no default bundle is configured"
				))
			})?,
		};
		let locale = key
			.locale()
			.cloned()
			.unwrap_or_else(|| settings.default_locale.clone());

		Ok((bundle, locale))
	}

	/// Whether the key's base source contains it.
	///
	/// Override sources are not consulted, and resolution failures count as
	/// absent.
	pub fn has_key(&self, key: &Key) -> bool {
		let result = self
			.effective(key)
			.and_then(|(bundle, locale)| self.get_bundles(&bundle, &locale));

		match result {
			Ok((base, _)) => base.contains_key(key.key()),
			Err(err) => {
				tracing::trace!("Unable to check {}: {}", key, err);
				false
			}
		}
	}

	/// The raw pattern for `key`, override first.
	///
	/// Fails with [`I18nError::MissingResource`] when neither source holds the
	/// key.
	pub fn get(&self, key: &Key) -> I18nResult<String> {
		let (bundle, locale) = self.effective(key)?;
		let (base, override_source) = self.get_bundles(&bundle, &locale)?;

		let value = override_source
			.as_deref()
			.and_then(|source| source.get(key.key()))
			.or_else(|| base.get(key.key()))
			.map(str::to_string);

		match value {
			Some(value) => {
				tracing::trace!("Result: {} -> {}", key.key(), value);
				Ok(value)
			}
			None => Err(I18nError::missing_key(
				base.bundle(),
				locale.tag(),
				key.key(),
			)),
		}
	}

	/// The pattern for `key`, retried in the default bundle and finally
	/// replaced by the key text.
	fn get_translated_string(&self, key: &Key) -> I18nResult<String> {
		let err = match self.get(key) {
			Ok(value) => return Ok(value),
			Err(err) if err.is_missing_resource() => err,
			Err(err) => return Err(err),
		};

		let default_bundle = self.settings.read().default_bundle.clone();
		if let (Some(bundle), Some(default)) = (key.bundle(), default_bundle)
			&& *bundle != default
		{
			tracing::trace!("{}, retrying in the default bundle", err);

			match self.get(&key.with_bundle(default)) {
				Ok(value) => return Ok(value),
				Err(err) if err.is_missing_resource() => {}
				Err(err) => return Err(err),
			}
		}

		tracing::trace!("Unable to find translation for {}: {}", key, err);
		Ok(key.key().to_string())
	}

	fn formatter(&self, bundle: &Bundle) -> I18nResult<Arc<dyn MessageFormat>> {
		self.registries
			.message_formats()
			.get_or_error(bundle.message_format_id())
	}

	/// Render `key` with ordinal arguments. Preset placeholders and
	/// post-processors are not applied.
	pub fn translate_ordinal(&self, key: &Key, replacements: &[Value]) -> I18nResult<String> {
		if key.is_empty() {
			return Ok(String::new());
		}

		let (bundle, locale) = self.effective(key)?;
		let pattern = self.get_translated_string(key)?;
		let formatter = self.formatter(&bundle)?;

		formatter
			.format_ordinal(&pattern, &locale, replacements)
			.map_err(|source| I18nError::Format {
				identifier: formatter.identifier().to_string(),
				source,
			})
	}

	/// Render `key` with named arguments. Preset placeholders and
	/// post-processors are not applied.
	pub fn translate_named(&self, key: &Key, replacements: &NamedPlaceholders) -> I18nResult<String> {
		if key.is_empty() {
			return Ok(String::new());
		}

		let (bundle, locale) = self.effective(key)?;
		let pattern = self.get_translated_string(key)?;
		let formatter = self.formatter(&bundle)?;

		formatter
			.format_named(&pattern, &locale, replacements)
			.map_err(|source| I18nError::Format {
				identifier: formatter.identifier().to_string(),
				source,
			})
	}

	/// Translate `key`: ordinal when there are arguments or preset ordinal
	/// placeholders, named otherwise.
	pub fn translate_key(&self, key: &Key, replacements: Vec<Value>) -> I18nResult<String> {
		if !replacements.is_empty() || !key.ordinal_placeholders().is_empty() {
			self.translate_key_array(key, replacements)
		} else {
			self.translate_key_named(key, NamedPlaceholders::new())
		}
	}

	/// Translate `key` with ordinal arguments merged with its presets.
	pub fn translate_key_array(&self, key: &Key, replacements: Vec<Value>) -> I18nResult<String> {
		let presets = key.ordinal_placeholders().iter().cloned();
		let merged: Vec<Value> = match key.placeholder_position() {
			PlaceholderPosition::First => presets.chain(replacements).collect(),
			PlaceholderPosition::Last => replacements.into_iter().chain(presets).collect(),
		};

		let resolved = merged
			.into_iter()
			.map(|value| self.resolve_nested(key, value))
			.collect::<I18nResult<Vec<_>>>()?;

		Ok(key.post_process(self.translate_ordinal(key, &resolved)?))
	}

	/// Translate `key` with named arguments merged with its presets.
	pub fn translate_key_named(
		&self,
		key: &Key,
		replacements: NamedPlaceholders,
	) -> I18nResult<String> {
		let presets = key.named_placeholders().clone();
		let merged = match key.placeholder_position() {
			PlaceholderPosition::First => {
				let mut merged = presets;
				merged.extend(replacements);
				merged
			}
			PlaceholderPosition::Last => {
				let mut merged = replacements;
				merged.extend(presets);
				merged
			}
		};

		let resolved = merged
			.into_iter()
			.map(|(name, value)| self.resolve_nested(key, value).map(|value| (name, value)))
			.collect::<I18nResult<NamedPlaceholders>>()?;

		Ok(key.post_process(self.translate_named(key, &resolved)?))
	}

	/// Translate a placeholder value that is itself a key, inheriting the
	/// parent's bundle and locale where it has none.
	fn resolve_nested(&self, parent: &Key, value: Value) -> I18nResult<Value> {
		match value {
			Value::Key(nested) if parent.translate_nested_keys() => {
				let nested = nested
					.with_bundle_opt(parent.bundle().cloned(), false)
					.with_locale_opt(parent.locale().cloned(), false);
				Ok(Value::Str(self.translate_key(&nested, Vec::new())?))
			}
			other => Ok(other),
		}
	}

	/// The base source and optional override source for `bundle` in `locale`.
	pub fn get_bundles(
		&self,
		bundle: &Bundle,
		locale: &Locale,
	) -> I18nResult<(Arc<LoadedSource>, Option<Arc<LoadedSource>>)> {
		let file_format = self
			.registries
			.file_formats()
			.get_or_error(bundle.file_format_id())?;
		self.formatter(bundle)?;

		let settings = self.settings();
		let name = settings.prefixed_name(bundle.name());
		let override_name = I18nSettings::override_name(&name);
		let base_key = (name.clone(), locale.clone());
		let override_key = (override_name.clone(), locale.clone());

		{
			let cache = self.cache.read();
			if let Some(Some(base)) = cache.get(&base_key) {
				let override_source = cache.get(&override_key).cloned().flatten();
				return Ok((base.clone(), override_source));
			}
		}

		tracing::trace!("Getting bundle {} for locale {}", name, locale);
		let default_locale = &settings.default_locale;

		let mut base = self.resolve_with(file_format.as_ref(), bundle, &name, locale, default_locale)?;
		if locale.is_single_subtag() {
			base = self.prefer_doubled(base, file_format.as_ref(), bundle, &name, locale, default_locale);
		}

		let override_source =
			match self.resolve_with(file_format.as_ref(), bundle, &override_name, locale, default_locale) {
				Ok(source) => Some(Arc::new(source)),
				Err(err) if err.is_missing_resource() => {
					tracing::trace!("No override bundle found for {}", name);
					None
				}
				Err(err) => return Err(err),
			};

		let base = Arc::new(base);
		let mut cache = self.cache.write();
		cache.insert(base_key, Some(base.clone()));
		cache.insert(override_key, override_source.clone());

		Ok((base, override_source))
	}

	fn prefer_doubled(
		&self,
		first: LoadedSource,
		file_format: &dyn FileFormat,
		bundle: &Bundle,
		name: &str,
		locale: &Locale,
		default_locale: &Locale,
	) -> LoadedSource {
		let Some(doubled) = locale.doubled() else {
			return first;
		};

		let second = match self.resolve_with(file_format, bundle, name, &doubled, default_locale) {
			Ok(second) => second,
			Err(err) => {
				tracing::trace!("Keeping {} for {}: {}", locale, name, err);
				return first;
			}
		};

		let differs = first
			.first_key()
			.is_some_and(|key| first.get(key) != second.get(key));

		if differs {
			tracing::debug!("Using {} instead of {} for {}", doubled, locale, name);
			second
		} else {
			first
		}
	}

	/// Find and load the source called `name` for `locale`.
	///
	/// Fails with [`I18nError::MissingResource`] when no loader has it.
	pub fn resolve_source(&self, bundle: &Bundle, name: &str, locale: &Locale) -> I18nResult<LoadedSource> {
		let file_format = self
			.registries
			.file_formats()
			.get_or_error(bundle.file_format_id())?;
		let default_locale = self.settings.read().default_locale.clone();

		self.resolve_with(file_format.as_ref(), bundle, name, locale, &default_locale)
	}

	fn candidate_loaders(&self, bundle: &Bundle) -> Vec<(String, Arc<dyn ResourceLoader>)> {
		let mut loaders: Vec<(String, Arc<dyn ResourceLoader>)> = vec![
			("bundle".to_string(), bundle.loader().clone()),
			("current".to_string(), self.default_loader.clone()),
			("system".to_string(), global_loader()),
		];
		loaders.extend(self.registries.loaders().discovered_loaders());

		let mut unique: Vec<(String, Arc<dyn ResourceLoader>)> = Vec::with_capacity(loaders.len());
		for (name, loader) in loaders {
			if !unique.iter().any(|(_, seen)| Arc::ptr_eq(seen, &loader)) {
				unique.push((name, loader));
			}
		}
		unique
	}

	fn resolve_with(
		&self,
		file_format: &dyn FileFormat,
		bundle: &Bundle,
		name: &str,
		locale: &Locale,
		default_locale: &Locale,
	) -> I18nResult<LoadedSource> {
		let base = resource_base(name);
		let loaders = self.candidate_loaders(bundle);

		tracing::trace!(
			"Searching for {} with locale {} across {} loaders",
			name,
			locale,
			loaders.len()
		);

		for extension in file_format.identifiers() {
			let path = format!("{base}.{extension}");

			for (loader_name, loader) in &loaders {
				if !loader.contains(&path) {
					tracing::trace!("{} not in '{}' loader", path, loader_name);
					continue;
				}

				if let Some(source) = load_source(file_format, loader.as_ref(), name, locale, default_locale)? {
					tracing::debug!(
						"Found {} with locale {} and format '{}' in '{}' loader",
						name,
						locale,
						extension,
						loader_name
					);
					return Ok(source);
				}
			}
		}

		tracing::debug!(
			"Couldn't find {} with locale {} in any loader, trying the format's default loader",
			name,
			locale
		);

		let fallback = file_format.default_loader();
		load_source(file_format, fallback.as_ref(), name, locale, default_locale)?
			.ok_or_else(|| I18nError::missing_source(name, locale.tag()))
	}
}
