//! Translation bundles

use crate::error::I18nResult;
use crate::files::FileFormat;
use crate::loader::ResourceLoader;
use crate::messages::MessageFormat;
use crate::registries::{DEFAULT_MESSAGE_FORMAT, FileFormatRegistry, LoaderRegistry, MessageFormatRegistry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// File format bundles use unless told otherwise.
pub const DEFAULT_FILE_FORMAT: &str = "properties";

/// A named translation source bound to a file format and a message format.
///
/// Constructing a bundle registers its loader in the global
/// [`LoaderRegistry`]. The first registration for a name wins, and every
/// bundle carries the loader that registry holds for its name.
///
/// Equality and hashing use the name and the two format identifiers; the
/// loader is not compared.
///
/// # Example
/// ```
/// use linguist_i18n::Bundle;
///
/// let bundle = Bundle::builder("core.errors").message_format("icu-v2").build();
///
/// assert_eq!(bundle.to_string(), "Bundle core.errors/properties/icu-v2");
/// assert_eq!(bundle, Bundle::builder("core.errors").message_format("icu-v2").build());
/// assert_ne!(bundle, Bundle::new("core.errors"));
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "BundleRepr", into = "BundleRepr")]
pub struct Bundle {
	name: String,
	file_format: String,
	message_format: String,
	loader: Arc<dyn ResourceLoader>,
}

impl Bundle {
	/// A bundle using the default file and message formats.
	pub fn new(name: impl Into<String>) -> Self {
		Self::builder(name).build()
	}

	/// Start building a bundle.
	pub fn builder(name: impl Into<String>) -> BundleBuilder {
		BundleBuilder {
			name: name.into(),
			file_format: DEFAULT_FILE_FORMAT.to_string(),
			message_format: DEFAULT_MESSAGE_FORMAT.to_string(),
			loader: None,
		}
	}

	/// Dotted bundle name, e.g. `core.strings`.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// File format identifier.
	pub fn file_format_id(&self) -> &str {
		&self.file_format
	}

	/// Message format identifier.
	pub fn message_format_id(&self) -> &str {
		&self.message_format
	}

	/// Loader pinned to this bundle's name.
	pub fn loader(&self) -> &Arc<dyn ResourceLoader> {
		&self.loader
	}

	/// The file format, from the global registry.
	pub fn file_format(&self) -> I18nResult<Arc<dyn FileFormat>> {
		FileFormatRegistry::global().get_or_error(&self.file_format)
	}

	/// The message format, from the global registry.
	pub fn message_formatter(&self) -> I18nResult<Arc<dyn MessageFormat>> {
		MessageFormatRegistry::global().get_or_error(&self.message_format)
	}
}

/// Builder for [`Bundle`].
#[derive(Debug)]
pub struct BundleBuilder {
	name: String,
	file_format: String,
	message_format: String,
	loader: Option<Arc<dyn ResourceLoader>>,
}

impl BundleBuilder {
	/// Set the file format identifier.
	pub fn file_format(mut self, identifier: impl Into<String>) -> Self {
		self.file_format = identifier.into();
		self
	}

	/// Set the message format identifier.
	pub fn message_format(mut self, identifier: impl Into<String>) -> Self {
		self.message_format = identifier.into();
		self
	}

	/// Offer a loader for this bundle's name. It is only used when no loader
	/// has been registered for the name yet.
	pub fn loader(mut self, loader: Arc<dyn ResourceLoader>) -> Self {
		self.loader = Some(loader);
		self
	}

	/// Build the bundle, registering its loader.
	pub fn build(self) -> Bundle {
		let registry = LoaderRegistry::global();
		if let Some(loader) = self.loader {
			registry.register(self.name.clone(), loader);
		}
		let loader = registry.get_for_bundle(&self.name);

		Bundle {
			name: self.name,
			file_format: self.file_format,
			message_format: self.message_format,
			loader,
		}
	}
}

impl PartialEq for Bundle {
	fn eq(&self, other: &Self) -> bool {
		self.name == other.name
			&& self.file_format == other.file_format
			&& self.message_format == other.message_format
	}
}

impl Eq for Bundle {}

impl Hash for Bundle {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.name.hash(state);
		self.file_format.hash(state);
		self.message_format.hash(state);
	}
}

impl fmt::Debug for Bundle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Bundle")
			.field("name", &self.name)
			.field("file_format", &self.file_format)
			.field("message_format", &self.message_format)
			.field("loader", &self.loader.name())
			.finish()
	}
}

impl fmt::Display for Bundle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Bundle {}/{}/{}",
			self.name, self.file_format, self.message_format
		)
	}
}

#[derive(Serialize, Deserialize)]
struct BundleRepr {
	name: String,
	#[serde(default = "default_file_format")]
	file_format: String,
	#[serde(default = "default_message_format")]
	message_format: String,
}

fn default_file_format() -> String {
	DEFAULT_FILE_FORMAT.to_string()
}

fn default_message_format() -> String {
	DEFAULT_MESSAGE_FORMAT.to_string()
}

impl From<BundleRepr> for Bundle {
	fn from(repr: BundleRepr) -> Self {
		Bundle::builder(repr.name)
			.file_format(repr.file_format)
			.message_format(repr.message_format)
			.build()
	}
}

impl From<Bundle> for BundleRepr {
	fn from(bundle: Bundle) -> Self {
		Self {
			name: bundle.name,
			file_format: bundle.file_format,
			message_format: bundle.message_format,
		}
	}
}
