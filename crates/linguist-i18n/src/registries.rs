//! Format and loader registries
//!
//! Three independent, thread-safe registries back the resolution engine:
//!
//! - [`FileFormatRegistry`]: identifier → [`FileFormat`](crate::FileFormat),
//!   last registration wins
//! - [`MessageFormatRegistry`]: identifier →
//!   [`MessageFormat`](crate::MessageFormat), last registration wins
//! - [`LoaderRegistry`]: bundle name → loader, first registration wins
//!
//! [`Registries::global`] holds the process-wide set, populated with the
//! built-in formats. Hosts and tests that need isolation build their own with
//! [`Registries::with_defaults`].

pub mod file_formats;
pub mod loaders;
pub mod message_formats;

pub use file_formats::FileFormatRegistry;
pub use loaders::{DiscoveryCallback, LoaderRegistry};
pub use message_formats::{DEFAULT_MESSAGE_FORMAT, MessageFormatRegistry};

use once_cell::sync::Lazy;
use std::sync::Arc;

static GLOBAL_REGISTRIES: Lazy<Arc<Registries>> = Lazy::new(|| Arc::new(Registries::with_defaults()));

/// The three registries used by one engine.
#[derive(Debug, Default)]
pub struct Registries {
	file_formats: FileFormatRegistry,
	message_formats: MessageFormatRegistry,
	loaders: LoaderRegistry,
}

impl Registries {
	/// Empty registries, without the built-in formats.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registries holding the built-in file and message formats.
	pub fn with_defaults() -> Self {
		Self {
			file_formats: FileFormatRegistry::with_defaults(),
			message_formats: MessageFormatRegistry::with_defaults(),
			loaders: LoaderRegistry::new(),
		}
	}

	/// The process-wide registries.
	pub fn global() -> Arc<Self> {
		GLOBAL_REGISTRIES.clone()
	}

	pub(crate) fn global_ref() -> &'static Self {
		&GLOBAL_REGISTRIES
	}

	/// File format registry.
	pub fn file_formats(&self) -> &FileFormatRegistry {
		&self.file_formats
	}

	/// Message format registry.
	pub fn message_formats(&self) -> &MessageFormatRegistry {
		&self.message_formats
	}

	/// Loader registry.
	pub fn loaders(&self) -> &LoaderRegistry {
		&self.loaders
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_with_defaults_holds_builtin_formats() {
		let registries = Registries::with_defaults();

		assert_eq!(
			registries.file_formats().identifiers(),
			vec!["properties", "yaml", "yml"]
		);
		assert_eq!(
			registries.message_formats().identifiers(),
			vec!["icu-v1", "icu-v2"]
		);
	}

	#[rstest]
	fn test_new_is_empty() {
		let registries = Registries::new();

		assert!(registries.file_formats().identifiers().is_empty());
		assert!(registries.message_formats().identifiers().is_empty());
	}

	#[rstest]
	fn test_global_is_shared() {
		assert!(Arc::ptr_eq(&Registries::global(), &Registries::global()));
		assert!(std::ptr::eq(Registries::global_ref(), &*Registries::global()));
	}
}
