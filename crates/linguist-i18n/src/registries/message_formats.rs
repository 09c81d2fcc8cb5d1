//! Message format registry

use crate::error::{FormatKind, I18nError, I18nResult};
use crate::messages::{IcuFormatV1, IcuFormatV2, MessageFormat};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Identifier of the message format bundles use unless told otherwise.
pub const DEFAULT_MESSAGE_FORMAT: &str = IcuFormatV1::IDENTIFIER;

/// Maps identifiers to message formats. Last registration wins.
#[derive(Debug, Default)]
pub struct MessageFormatRegistry {
	formats: RwLock<HashMap<String, Arc<dyn MessageFormat>>>,
}

impl MessageFormatRegistry {
	/// An empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// A registry holding `icu-v1` and `icu-v2`.
	pub fn with_defaults() -> Self {
		let registry = Self::new();
		registry.register(Arc::new(IcuFormatV1));
		registry.register(Arc::new(IcuFormatV2));
		registry
	}

	/// The process-wide registry.
	pub fn global() -> &'static Self {
		super::Registries::global_ref().message_formats()
	}

	/// Register a format under its identifier.
	pub fn register(&self, format: Arc<dyn MessageFormat>) {
		tracing::debug!("Registering message format '{}'", format.identifier());
		self.formats
			.write()
			.insert(format.identifier().to_string(), format);
	}

	/// Remove a format, returning it.
	pub fn unregister(&self, identifier: &str) -> Option<Arc<dyn MessageFormat>> {
		self.formats.write().remove(identifier)
	}

	/// Look a format up.
	pub fn get(&self, identifier: &str) -> Option<Arc<dyn MessageFormat>> {
		self.formats.read().get(identifier).cloned()
	}

	/// Look a format up, failing when it isn't registered.
	pub fn get_or_error(&self, identifier: &str) -> I18nResult<Arc<dyn MessageFormat>> {
		self.get(identifier).ok_or_else(|| I18nError::UnknownFormat {
			kind: FormatKind::Message,
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
