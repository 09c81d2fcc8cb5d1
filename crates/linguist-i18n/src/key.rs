//! Translation keys
//!
//! A [`Key`] is an immutable reference to one translatable string plus the
//! context needed to resolve it: an optional bundle and locale, preset
//! placeholders and a post-processing pipeline. Every `with_*`, `without_*`
//! and `filter_*` method returns a new key and leaves the receiver alone.
//!
//! Keys created from the same text with [`Key::new`] share one instance until
//! an override changes them.

use crate::bundle::Bundle;
use crate::error::{I18nError, I18nResult};
use crate::locale::Locale;
use crate::messages::NamedPlaceholders;
use crate::translations::Translations;
use crate::value::Value;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Transforms a translated string. Receives the key being translated.
pub type PostProcessor = Arc<dyn Fn(&Key, String) -> String + Send + Sync>;

/// Where preset placeholders go relative to call-site arguments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderPosition {
	/// Presets come first; call-site named arguments win on duplicates.
	#[default]
	First,
	/// Call-site arguments come first; preset named placeholders win on
	/// duplicates.
	Last,
}

static INTERNED_KEYS: Lazy<RwLock<HashMap<String, Key>>> = Lazy::new(|| RwLock::new(HashMap::new()));

#[derive(Clone)]
struct KeyData {
	key: String,
	bundle: Option<Bundle>,
	locale: Option<Locale>,
	placeholder_position: PlaceholderPosition,
	translate_nested_keys: bool,
	ordinal_placeholders: Vec<Value>,
	named_placeholders: NamedPlaceholders,
	post_processors: Vec<PostProcessor>,
}

impl KeyData {
	fn new(key: String) -> Self {
		Self {
			key,
			bundle: None,
			locale: None,
			placeholder_position: PlaceholderPosition::First,
			translate_nested_keys: true,
			ordinal_placeholders: Vec::new(),
			named_placeholders: NamedPlaceholders::new(),
			post_processors: Vec::new(),
		}
	}
}

/// An immutable reference to a translatable string.
///
/// # Example
/// ```
/// use linguist_i18n::{Bundle, Key, Locale};
///
/// let key = Key::new("command.banana");
/// assert!(Key::ptr_eq(&key, &Key::new("command.banana")));
///
/// let german = key
/// 	.with_bundle(Bundle::new("test.strings"))
/// 	.with_locale(Locale::parse("de").unwrap());
///
/// assert_eq!(
/// 	german.to_string(),
/// 	r#"Key "command.banana" (Bundle test.strings/properties/icu-v1, Locale de)"#
/// );
/// assert!(key.bundle().is_none());
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "KeyRepr", into = "KeyRepr")]
pub struct Key {
	inner: Arc<KeyData>,
}

impl Key {
	/// The interned key for `text`.
	pub fn new(text: impl Into<String>) -> Self {
		let text = text.into();

		if let Some(key) = INTERNED_KEYS.read().get(&text) {
			return key.clone();
		}

		INTERNED_KEYS
			.write()
			.entry(text.clone())
			.or_insert_with(|| Self {
				inner: Arc::new(KeyData::new(text)),
			})
			.clone()
	}

	/// The interned key for `text`, bound to `bundle`.
	pub fn in_bundle(text: impl Into<String>, bundle: Bundle) -> Self {
		Self::new(text).with_bundle(bundle)
	}

	/// The empty key, which always translates to an empty string.
	pub fn empty() -> Self {
		Self::new("")
	}

	/// Whether this key has empty text.
	pub fn is_empty(&self) -> bool {
		self.inner.key.is_empty()
	}

	/// Whether two keys are the same instance.
	pub fn ptr_eq(a: &Self, b: &Self) -> bool {
		Arc::ptr_eq(&a.inner, &b.inner)
	}

	fn modify(&self, change: impl FnOnce(&mut KeyData)) -> Self {
		let mut data = (*self.inner).clone();
		change(&mut data);
		Self {
			inner: Arc::new(data),
		}
	}

	/// Key text.
	pub fn key(&self) -> &str {
		&self.inner.key
	}

	/// Bundle override.
	pub fn bundle(&self) -> Option<&Bundle> {
		self.inner.bundle.as_ref()
	}

	/// Locale override.
	pub fn locale(&self) -> Option<&Locale> {
		self.inner.locale.as_ref()
	}

	/// Where preset placeholders are merged.
	pub fn placeholder_position(&self) -> PlaceholderPosition {
		self.inner.placeholder_position
	}

	/// Whether placeholder values that are keys get translated first.
	pub fn translate_nested_keys(&self) -> bool {
		self.inner.translate_nested_keys
	}

	/// Preset ordinal placeholders.
	pub fn ordinal_placeholders(&self) -> &[Value] {
		&self.inner.ordinal_placeholders
	}

	/// Preset named placeholders.
	pub fn named_placeholders(&self) -> &NamedPlaceholders {
		&self.inner.named_placeholders
	}

	/// Post-processors, in the order they run.
	pub fn post_processors(&self) -> &[PostProcessor] {
		&self.inner.post_processors
	}

	/// Keep only the ordinal placeholders matching `predicate`.
	pub fn filter_ordinal_placeholders(&self, predicate: impl Fn(&Value) -> bool) -> Self {
		self.modify(|data| data.ordinal_placeholders.retain(|value| predicate(value)))
	}

	/// Keep only the named placeholders matching `predicate`.
	pub fn filter_named_placeholders(&self, predicate: impl Fn(&str, &Value) -> bool) -> Self {
		self.modify(|data| {
			data.named_placeholders
				.retain(|name, value| predicate(name, value))
		})
	}

	/// Keep only the post-processors matching `predicate`.
	pub fn filter_post_processors(&self, predicate: impl Fn(&PostProcessor) -> bool) -> Self {
		self.modify(|data| data.post_processors.retain(|processor| predicate(processor)))
	}

	/// Append a post-processor.
	pub fn with_post_processor(
		&self,
		processor: impl Fn(&Key, String) -> String + Send + Sync + 'static,
	) -> Self {
		self.modify(|data| data.post_processors.push(Arc::new(processor)))
	}

	/// Append several post-processors.
	pub fn with_post_processors(&self, processors: impl IntoIterator<Item = PostProcessor>) -> Self {
		self.modify(|data| data.post_processors.extend(processors))
	}

	/// Append preset ordinal placeholders.
	///
	/// Fails with [`I18nError::Configuration`] when the key already has named
	/// placeholders.
	pub fn with_ordinal_placeholders<V: Into<Value>>(
		&self,
		placeholders: impl IntoIterator<Item = V>,
	) -> I18nResult<Self> {
		if !self.inner.named_placeholders.is_empty() {
			return Err(I18nError::Configuration(
				"this key already has named placeholders; only one kind may be used at once"
					.to_string(),
			));
		}

		Ok(self.modify(|data| {
			data.ordinal_placeholders
				.extend(placeholders.into_iter().map(Into::into))
		}))
	}

	/// Add preset named placeholders, replacing existing ones with the same
	/// name.
	///
	/// Fails with [`I18nError::Configuration`] when the key already has
	/// ordinal placeholders.
	pub fn with_named_placeholders<K: Into<String>, V: Into<Value>>(
		&self,
		placeholders: impl IntoIterator<Item = (K, V)>,
	) -> I18nResult<Self> {
		if !self.inner.ordinal_placeholders.is_empty() {
			return Err(I18nError::Configuration(
				"this key already has ordinal placeholders; only one kind may be used at once"
					.to_string(),
			));
		}

		Ok(self.modify(|data| {
			data.named_placeholders.extend(
				placeholders
					.into_iter()
					.map(|(name, value)| (name.into(), value.into())),
			)
		}))
	}

	/// Set where preset placeholders are merged.
	pub fn with_placeholder_position(&self, position: PlaceholderPosition) -> Self {
		if position == self.inner.placeholder_position {
			return self.clone();
		}
		self.modify(|data| data.placeholder_position = position)
	}

	/// Set whether nested keys get translated.
	pub fn with_translate_nested_keys(&self, translate: bool) -> Self {
		if translate == self.inner.translate_nested_keys {
			return self.clone();
		}
		self.modify(|data| data.translate_nested_keys = translate)
	}

	/// Bind to `bundle`, replacing any existing bundle.
	pub fn with_bundle(&self, bundle: Bundle) -> Self {
		self.with_bundle_opt(Some(bundle), true)
	}

	/// Bind to `bundle`. When `overwrite` is false this only applies if no
	/// bundle is set.
	pub fn with_bundle_opt(&self, bundle: Option<Bundle>, overwrite: bool) -> Self {
		if bundle.as_ref() == self.bundle() || (self.bundle().is_some() && !overwrite) {
			return self.clone();
		}
		self.modify(|data| data.bundle = bundle)
	}

	/// Bind to `locale`, replacing any existing locale.
	pub fn with_locale(&self, locale: Locale) -> Self {
		self.with_locale_opt(Some(locale), true)
	}

	/// Bind to `locale`. When `overwrite` is false this only applies if no
	/// locale is set.
	pub fn with_locale_opt(&self, locale: Option<Locale>, overwrite: bool) -> Self {
		if locale.as_ref() == self.locale() || (self.locale().is_some() && !overwrite) {
			return self.clone();
		}
		self.modify(|data| data.locale = locale)
	}

	/// Set bundle and locale together, each subject to its own overwrite
	/// flag. Returns the same instance when nothing changes.
	pub fn with_both(
		&self,
		bundle: Option<Bundle>,
		locale: Option<Locale>,
		overwrite_bundle: bool,
		overwrite_locale: bool,
	) -> Self {
		let bundle = if self.bundle().is_none() || overwrite_bundle {
			bundle
		} else {
			self.inner.bundle.clone()
		};
		let locale = if self.locale().is_none() || overwrite_locale {
			locale
		} else {
			self.inner.locale.clone()
		};

		if bundle.as_ref() == self.bundle() && locale.as_ref() == self.locale() {
			return self.clone();
		}
		self.modify(|data| {
			data.bundle = bundle;
			data.locale = locale;
		})
	}

	/// Drop all preset ordinal placeholders.
	pub fn without_ordinal_placeholders(&self) -> Self {
		if self.inner.ordinal_placeholders.is_empty() {
			return self.clone();
		}
		self.modify(|data| data.ordinal_placeholders.clear())
	}

	/// Drop all preset named placeholders.
	pub fn without_named_placeholders(&self) -> Self {
		if self.inner.named_placeholders.is_empty() {
			return self.clone();
		}
		self.modify(|data| data.named_placeholders.clear())
	}

	/// Drop the bundle override.
	pub fn without_bundle(&self) -> Self {
		self.with_both(None, self.inner.locale.clone(), true, true)
	}

	/// Drop the locale override.
	pub fn without_locale(&self) -> Self {
		self.with_both(self.inner.bundle.clone(), None, true, true)
	}

	/// Drop both overrides.
	pub fn without_both(&self) -> Self {
		self.with_both(None, None, true, true)
	}

	/// Run the post-processors over `translation`.
	pub fn post_process(&self, translation: String) -> String {
		self.inner
			.post_processors
			.iter()
			.fold(translation, |current, processor| processor(self, current))
	}

	/// Translate with the preset placeholders only.
	pub fn translate(&self) -> I18nResult<String> {
		Translations::global().translate_key(self, Vec::new())
	}

	/// Translate with ordinal arguments, or with the named presets when there
	/// are neither arguments nor ordinal presets.
	pub fn translate_with<V: Into<Value>>(
		&self,
		replacements: impl IntoIterator<Item = V>,
	) -> I18nResult<String> {
		Translations::global()
			.translate_key(self, replacements.into_iter().map(Into::into).collect())
	}

	/// Translate with ordinal arguments.
	pub fn translate_array(&self, replacements: &[Value]) -> I18nResult<String> {
		Translations::global().translate_key_array(self, replacements.to_vec())
	}

	/// Translate with named arguments.
	pub fn translate_named<K: Into<String>, V: Into<Value>>(
		&self,
		replacements: impl IntoIterator<Item = (K, V)>,
	) -> I18nResult<String> {
		let replacements = replacements
			.into_iter()
			.map(|(name, value)| (name.into(), value.into()))
			.collect();
		Translations::global().translate_key_named(self, replacements)
	}

	/// [`Key::translate`] in the given locale.
	pub fn translate_locale(&self, locale: Locale) -> I18nResult<String> {
		self.with_locale(locale).translate()
	}

	/// [`Key::translate_array`] in the given locale.
	pub fn translate_array_locale(&self, locale: Locale, replacements: &[Value]) -> I18nResult<String> {
		self.with_locale(locale).translate_array(replacements)
	}

	/// [`Key::translate_named`] in the given locale.
	pub fn translate_named_locale<K: Into<String>, V: Into<Value>>(
		&self,
		locale: Locale,
		replacements: impl IntoIterator<Item = (K, V)>,
	) -> I18nResult<String> {
		self.with_locale(locale).translate_named(replacements)
	}
}

impl PartialEq for Key {
	fn eq(&self, other: &Self) -> bool {
		if Self::ptr_eq(self, other) {
			return true;
		}

		let (a, b) = (&*self.inner, &*other.inner);
		a.key == b.key
			&& a.bundle == b.bundle
			&& a.locale == b.locale
			&& a.placeholder_position == b.placeholder_position
			&& a.translate_nested_keys == b.translate_nested_keys
			&& a.ordinal_placeholders == b.ordinal_placeholders
			&& a.named_placeholders == b.named_placeholders
			&& a.post_processors.len() == b.post_processors.len()
			&& a.post_processors
				.iter()
				.zip(&b.post_processors)
				.all(|(x, y)| Arc::ptr_eq(x, y))
	}
}

impl fmt::Debug for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let data = &*self.inner;
		f.debug_struct("Key")
			.field("key", &data.key)
			.field("bundle", &data.bundle)
			.field("locale", &data.locale)
			.field("placeholder_position", &data.placeholder_position)
			.field("translate_nested_keys", &data.translate_nested_keys)
			.field("ordinal_placeholders", &data.ordinal_placeholders)
			.field("named_placeholders", &data.named_placeholders)
			.field("post_processors", &data.post_processors.len())
			.finish()
	}
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Key \"{}\"", self.inner.key)?;

		match (self.bundle(), self.locale()) {
			(None, None) => Ok(()),
			(Some(bundle), None) => write!(f, " ({bundle})"),
			(None, Some(locale)) => write!(f, " (Locale {locale})"),
			(Some(bundle), Some(locale)) => write!(f, " ({bundle}, Locale {locale})"),
		}
	}
}

impl From<&str> for Key {
	fn from(text: &str) -> Self {
		Self::new(text)
	}
}

impl From<String> for Key {
	fn from(text: String) -> Self {
		Self::new(text)
	}
}

/// Serialized form of a key. Placeholders and post-processors are not
/// carried over.
#[derive(Serialize, Deserialize)]
struct KeyRepr {
	key: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	bundle: Option<Bundle>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	locale: Option<Locale>,
	#[serde(default)]
	placeholder_position: PlaceholderPosition,
	#[serde(default = "default_translate_nested_keys")]
	translate_nested_keys: bool,
}

fn default_translate_nested_keys() -> bool {
	true
}

impl From<KeyRepr> for Key {
	fn from(repr: KeyRepr) -> Self {
		Key::new(repr.key)
			.with_both(repr.bundle, repr.locale, true, true)
			.with_placeholder_position(repr.placeholder_position)
			.with_translate_nested_keys(repr.translate_nested_keys)
	}
}

impl From<Key> for KeyRepr {
	fn from(key: Key) -> Self {
		let data = &*key.inner;
		Self {
			key: data.key.clone(),
			bundle: data.bundle.clone(),
			locale: data.locale.clone(),
			placeholder_position: data.placeholder_position,
			translate_nested_keys: data.translate_nested_keys,
		}
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
	fn test_same_text_is_interned() {
		// Arrange
		let a = Key::new("key.interned");

		// Act
		let b = Key::from("key.interned");
		let c = Key::new("key.interned".to_string());

		// Assert
		assert!(Key::ptr_eq(&a, &b));
		assert!(Key::ptr_eq(&a, &c));
		assert!(!Key::ptr_eq(&a, &Key::new("key.other")));
	}

	#[rstest]
	fn test_overrides_produce_new_instances() {
		// Arrange
		let base = Key::new("key.override");
		let bundle = Bundle::new("key.tests");

		// Act
		let bound = base.with_bundle(bundle.clone());
		let same = bound.with_bundle(bundle);

		// Assert
		assert!(!Key::ptr_eq(&base, &bound));
		assert!(Key::ptr_eq(&bound, &same));
		assert!(base.bundle().is_none());
		assert_eq!(bound.bundle().map(Bundle::name), Some("key.tests"));
	}

	#[rstest]
	fn test_with_locale_overwrite_flag() {
		// Arrange
		let english = Key::new("key.locale").with_locale(locale("en"));

		// Act
		let kept = english.with_locale_opt(Some(locale("de")), false);
		let replaced = english.with_locale(locale("de"));
		let filled = Key::new("key.locale").with_locale_opt(Some(locale("de")), false);

		// Assert
		assert!(Key::ptr_eq(&kept, &english));
		assert_eq!(replaced.locale(), Some(&locale("de")));
		assert_eq!(filled.locale(), Some(&locale("de")));
	}

	#[rstest]
	fn test_with_both_respects_flags_and_returns_self_on_no_op() {
		// Arrange
		let bundle = Bundle::new("key.both");
		let key = Key::new("key.both").with_both(Some(bundle.clone()), Some(locale("en")), true, true);

		// Act
		let unchanged = key.with_both(Some(Bundle::new("key.other")), Some(locale("fr")), false, false);
		let locale_only = key.with_both(None, Some(locale("fr")), false, true);

		// Assert
		assert!(Key::ptr_eq(&unchanged, &key));
		assert_eq!(locale_only.bundle(), Some(&bundle));
		assert_eq!(locale_only.locale(), Some(&locale("fr")));
	}

	#[rstest]
	fn test_without_overrides() {
		let key = Key::new("key.without")
			.with_bundle(Bundle::new("key.without"))
			.with_locale(locale("en"));

		assert!(key.without_bundle().bundle().is_none());
		assert_eq!(key.without_bundle().locale(), Some(&locale("en")));
		assert!(key.without_locale().locale().is_none());
		assert!(key.without_locale().bundle().is_some());

		let cleared = key.without_both();
		assert!(cleared.bundle().is_none() && cleared.locale().is_none());
		assert!(Key::ptr_eq(&cleared.without_both(), &cleared));
	}

	#[rstest]
	fn test_mixing_placeholder_kinds_fails() {
		// Arrange
		let ordinal = Key::new("key.mixed").with_ordinal_placeholders(["a"]).unwrap();
		let named = Key::new("key.mixed").with_named_placeholders([("n", 1)]).unwrap();

		// Act
		let ordinal_then_named = ordinal.with_named_placeholders([("n", 1)]);
		let named_then_ordinal = named.with_ordinal_placeholders(["a"]);

		// Assert
		assert!(matches!(ordinal_then_named, Err(I18nError::Configuration(_))));
		assert!(matches!(named_then_ordinal, Err(I18nError::Configuration(_))));
	}

	#[rstest]
	fn test_named_placeholders_merge_with_existing() {
		let key = Key::new("key.named")
			.with_named_placeholders([("a", 1), ("b", 2)])
			.unwrap()
			.with_named_placeholders([("b", 3), ("c", 4)])
			.unwrap();

		let named = key.named_placeholders();
		assert_eq!(named.len(), 3);
		assert_eq!(named.get("a"), Some(&Value::Int(1)));
		assert_eq!(named.get("b"), Some(&Value::Int(3)));
	}

	#[rstest]
	fn test_filters() {
		// Arrange
		let key = Key::new("key.filter")
			.with_ordinal_placeholders([1, 2, 3, 4])
			.unwrap()
			.with_post_processor(|_, s| s.to_uppercase())
			.with_post_processor(|_, s| format!("{s}!"));

		// Act
		let even = key.filter_ordinal_placeholders(|v| matches!(v, Value::Int(i) if i % 2 == 0));
		let first_processor = key.filter_post_processors({
			let keep = key.post_processors()[0].clone();
			move |p| Arc::ptr_eq(p, &keep)
		});

		// Assert
		assert_eq!(even.ordinal_placeholders(), &[Value::Int(2), Value::Int(4)]);
		assert_eq!(key.ordinal_placeholders().len(), 4);
		assert_eq!(first_processor.post_processors().len(), 1);
		assert_eq!(first_processor.post_process("hi".to_string()), "HI");
	}

	#[rstest]
	fn test_filter_named_placeholders() {
		let key = Key::new("key.filter_named")
			.with_named_placeholders([("keep", 1), ("drop", 2)])
			.unwrap()
			.filter_named_placeholders(|name, _| name == "keep");

		assert_eq!(key.named_placeholders().len(), 1);
		assert!(key.named_placeholders().contains_key("keep"));
	}

	#[rstest]
	fn test_post_processors_run_in_order_and_see_the_key() {
		let key = Key::new("key.pipeline")
			.with_post_processor(|_, s| format!("{s}-a"))
			.with_post_processor(|key, s| format!("{s}-{}", key.key()));

		assert_eq!(key.post_process("x".to_string()), "x-a-key.pipeline");
	}

	#[rstest]
	#[case(None, None, r#"Key "key.display""#)]
	#[case(Some("key.display"), None, r#"Key "key.display" (Bundle key.display/properties/icu-v1)"#)]
	#[case(None, Some("en-GB"), r#"Key "key.display" (Locale en-GB)"#)]
	fn test_display(#[case] bundle: Option<&str>, #[case] tag: Option<&str>, #[case] expected: &str) {
		let key = Key::new("key.display").with_both(
			bundle.map(Bundle::new),
			tag.map(locale),
			true,
			true,
		);

		assert_eq!(key.to_string(), expected);
	}

	#[rstest]
	fn test_serde_skips_transient_fields() {
		// Arrange
		let key = Key::new("key.serde")
			.with_locale(locale("en-GB"))
			.with_placeholder_position(PlaceholderPosition::Last)
			.with_ordinal_placeholders(["dropped"])
			.unwrap();

		// Act
		let json = serde_json::to_value(&key).unwrap();
		let back: Key = serde_json::from_value(json.clone()).unwrap();

		// Assert
		assert_eq!(
			json,
			serde_json::json!({
				"key": "key.serde",
				"locale": "en-GB",
				"placeholder_position": "last",
				"translate_nested_keys": true,
			})
		);
		assert_eq!(back.locale(), Some(&locale("en-GB")));
		assert_eq!(back.placeholder_position(), PlaceholderPosition::Last);
		assert!(back.ordinal_placeholders().is_empty());
	}

	#[rstest]
	fn test_equality_compares_values() {
		let a = Key::new("key.eq").with_locale(locale("en"));
		let b = Key::new("key.eq").with_locale(locale("en"));

		assert!(!Key::ptr_eq(&a, &b));
		assert_eq!(a, b);
		assert_ne!(a, b.with_locale(locale("de")));
	}

	#[rstest]
	fn test_empty_key() {
		assert!(Key::empty().is_empty());
		assert!(!Key::new("x").is_empty());
	}
}
