//! Error types for translation resolution.
//!
//! Every fallible operation in this crate returns [`I18nResult`]. Only
//! [`I18nError::MissingResource`] is recovered internally (at the translate
//! boundary, where the literal key text is returned instead); every other
//! variant reaches the caller unchanged.

use thiserror::Error;

/// Boxed error used as the cause of message-format failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for translation operations.
pub type I18nResult<T> = Result<T, I18nError>;

/// Which registry an unknown identifier was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
	/// The file format registry.
	File,
	/// The message format registry.
	Message,
}

impl std::fmt::Display for FormatKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::File => write!(f, "file format"),
			Self::Message => write!(f, "message format"),
		}
	}
}

/// Translation errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum I18nError {
	/// No file or message format is registered under the identifier.
	#[error("unknown {kind}: {identifier}")]
	UnknownFormat {
		/// Registry that was searched.
		kind: FormatKind,
		/// Identifier that was requested.
		identifier: String,
	},

	/// No source (or no key within a source) could be found.
	#[error("{}", describe_missing(.bundle, .locale, .key))]
	MissingResource {
		/// Bundle name that was searched.
		bundle: String,
		/// Locale tag that was searched.
		locale: String,
		/// Key that was requested, when the source itself was found.
		key: Option<String>,
	},

	/// The caller configured something inconsistently.
	#[error("configuration error: {0}")]
	Configuration(String),

	/// A message format rejected a pattern or its arguments.
	#[error("message format '{identifier}' failed: {source}")]
	Format {
		/// Identifier of the failing message format.
		identifier: String,
		/// Underlying cause reported by the format.
		#[source]
		source: BoxError,
	},

	/// A translation resource could not be parsed.
	#[error("failed to parse {resource}: {message}")]
	Parse {
		/// Resource path.
		resource: String,
		/// Parser message.
		message: String,
	},

	/// A loader failed to read a resource it claimed to have.
	#[error("failed to read {resource}: {source}")]
	Io {
		/// Resource path.
		resource: String,
		/// Underlying IO error.
		#[source]
		source: std::io::Error,
	},

	/// A locale tag could not be parsed.
	#[error("invalid locale: {0}")]
	InvalidLocale(String),
}

impl I18nError {
	/// Create a missing-source error.
	pub fn missing_source(bundle: impl Into<String>, locale: impl Into<String>) -> Self {
		Self::MissingResource {
			bundle: bundle.into(),
			locale: locale.into(),
			key: None,
		}
	}

	/// Create a missing-key error.
	pub fn missing_key(
		bundle: impl Into<String>,
		locale: impl Into<String>,
		key: impl Into<String>,
	) -> Self {
		Self::MissingResource {
			bundle: bundle.into(),
			locale: locale.into(),
			key: Some(key.into()),
		}
	}

	/// Whether this error is [`I18nError::MissingResource`].
	pub fn is_missing_resource(&self) -> bool {
		matches!(self, Self::MissingResource { .. })
	}
}

fn describe_missing(bundle: &str, locale: &str, key: &Option<String>) -> String {
	match key {
		Some(key) => format!("can't find key '{key}' in bundle {bundle}, locale {locale}"),
		None => format!("can't find bundle {bundle}, locale {locale}"),
	}
}
