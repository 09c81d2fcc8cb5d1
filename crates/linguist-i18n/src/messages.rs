//! Message format strategies
//!
//! A [`MessageFormat`] substitutes placeholders into a raw pattern. The engine
//! never interprets pattern syntax itself; it only picks the strategy named by
//! the bundle and wraps any failure in [`crate::I18nError::Format`].

pub mod icu_v1;
pub mod icu_v2;
pub mod number;

pub use icu_v1::IcuFormatV1;
pub use icu_v2::IcuFormatV2;

use crate::error::BoxError;
use crate::locale::Locale;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Named placeholder map passed to [`MessageFormat::format_named`].
pub type NamedPlaceholders = HashMap<String, Value>;

/// A pluggable placeholder substitution strategy.
///
/// Implementations must be stateless from the caller's point of view: the
/// same arguments always produce the same output, from any thread.
pub trait MessageFormat: Send + Sync + fmt::Debug {
	/// Identifier bundles refer to this format by.
	fn identifier(&self) -> &str;

	/// Format `pattern` with name-addressed placeholders.
	fn format_named(
		&self,
		pattern: &str,
		locale: &Locale,
		placeholders: &NamedPlaceholders,
	) -> Result<String, BoxError>;

	/// Format `pattern` with position-addressed placeholders.
	fn format_ordinal(
		&self,
		pattern: &str,
		locale: &Locale,
		placeholders: &[Value],
	) -> Result<String, BoxError>;
}

/// Errors raised by the built-in message formats.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MessageFormatError {
	/// The pattern is malformed.
	#[error("syntax error at offset {offset}: {message}")]
	Syntax {
		/// Character offset into the pattern.
		offset: usize,
		/// What was wrong.
		message: String,
	},

	/// An argument has the wrong type for how it is used.
	#[error("invalid argument '{name}': {message}")]
	InvalidArgument {
		/// Argument name or index.
		name: String,
		/// What was wrong.
		message: String,
	},

	/// The pattern calls a formatting function this format doesn't provide.
	#[error("unknown function ':{0}'")]
	UnknownFunction(String),
}

impl MessageFormatError {
	pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
		Self::Syntax {
			offset,
			message: message.into(),
		}
	}

	pub(crate) fn not_a_number(name: &str) -> Self {
		Self::InvalidArgument {
			name: name.to_string(),
			message: "not a number".to_string(),
		}
	}
}

/// Placeholder values addressed by name.
///
/// Ordinal placeholders answer to their index, so `{0}` and `$0` both reach
/// the first one.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Arguments<'a> {
	Named(&'a NamedPlaceholders),
	Ordinal(&'a [Value]),
}

impl<'a> Arguments<'a> {
	pub(crate) fn get(&self, name: &str) -> Option<&'a Value> {
		match self {
			Self::Named(map) => map.get(name),
			Self::Ordinal(values) => name.parse::<usize>().ok().and_then(|i| values.get(i)),
		}
	}
}

/// Render a value without an explicit format type: numbers use the locale's
/// number format, everything else its display form.
pub(crate) fn format_plain(value: &Value, locale: &Locale) -> String {
	match value {
		Value::Int(i) => number::format_int(*i, locale),
		Value::Float(f) => number::format_number(*f, locale),
		other => other.to_string(),
	}
}
