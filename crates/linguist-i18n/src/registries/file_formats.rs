//! File format registry

use crate::error::{FormatKind, I18nError, I18nResult};
use crate::files::{FileFormat, PropertiesFormat, YamlFormat};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps identifiers to file formats.
///
/// A format is registered under every identifier it declares. Registering
/// again under an existing identifier replaces the previous format.
///
/// # Example
/// ```
/// use linguist_i18n::registries::FileFormatRegistry;
///
/// let registry = FileFormatRegistry::with_defaults();
/// assert!(registry.get("yml").is_some());
/// assert!(registry.get_or_error("toml").is_err());
/// ```
#[derive(Debug, Default)]
pub struct FileFormatRegistry {
	formats: RwLock<HashMap<String, Arc<dyn FileFormat>>>,
}

impl FileFormatRegistry {
	/// An empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// A registry holding `properties` and `yaml`/`yml`.
	pub fn with_defaults() -> Self {
		let registry = Self::new();
		registry.register(Arc::new(PropertiesFormat));
		registry.register(Arc::new(YamlFormat));
		registry
	}

	/// The process-wide registry.
	pub fn global() -> &'static Self {
		super::Registries::global_ref().file_formats()
	}

	/// Register a format under each of its identifiers.
	pub fn register(&self, format: Arc<dyn FileFormat>) {
		let mut formats = self.formats.write();
		for identifier in format.identifiers() {
			tracing::debug!("Registering file format '{}': {:?}", identifier, format);
			formats.insert(identifier, format.clone());
		}
	}

	/// Remove every identifier the format declares.
	pub fn unregister(&self, format: &dyn FileFormat) {
		let mut formats = self.formats.write();
		for identifier in format.identifiers() {
			formats.remove(&identifier);
		}
	}

	/// Remove a single identifier, returning the format it pointed to.
	pub fn unregister_identifier(&self, identifier: &str) -> Option<Arc<dyn FileFormat>> {
		self.formats.write().remove(identifier)
	}

	/// Look a format up.
	pub fn get(&self, identifier: &str) -> Option<Arc<dyn FileFormat>> {
		self.formats.read().get(identifier).cloned()
	}

	/// Look a format up, failing when it isn't registered.
	pub fn get_or_error(&self, identifier: &str) -> I18nResult<Arc<dyn FileFormat>> {
		self.get(identifier).ok_or_else(|| I18nError::UnknownFormat {
			kind: FormatKind::File,
			identifier: identifier.to_string(),
		})
	}

	/// Whether an identifier is registered.
	pub fn contains(&self, identifier: &str) -> bool {
		self.formats.read().contains_key(identifier)
	}

	/// Registered identifiers, sorted.
	pub fn identifiers(&self) -> Vec<String> {
		let mut identifiers: Vec<String> = self.formats.read().keys().cloned().collect();
		identifiers.sort();
		identifiers
	}
}
