//! Placeholder values

use crate::key::Key;
use std::fmt;

/// A value substituted into a translation pattern.
///
/// Values that hold a [`Key`] are translated before substitution when the
/// owning key has nested-key translation enabled.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Absent value, rendered as `null`.
	Null,
	/// Boolean value.
	Bool(bool),
	/// Integer value.
	Int(i64),
	/// Floating point value.
	Float(f64),
	/// Plain string.
	Str(String),
	/// Another translation key.
	Key(Key),
}

impl Value {
	/// Numeric view of the value, used by number and plural formatting.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Int(i) => Some(*i as f64),
			Self::Float(f) => Some(*f),
			Self::Str(s) => s.trim().parse().ok(),
			_ => None,
		}
	}

	/// The nested key, if this value holds one.
	pub fn as_key(&self) -> Option<&Key> {
		match self {
			Self::Key(key) => Some(key),
			_ => None,
		}
	}

	/// Whether this value is numeric.
	pub fn is_number(&self) -> bool {
		matches!(self, Self::Int(_) | Self::Float(_))
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => write!(f, "null"),
			Self::Bool(b) => write!(f, "{b}"),
			Self::Int(i) => write!(f, "{i}"),
			Self::Float(x) => write!(f, "{x}"),
			Self::Str(s) => write!(f, "{s}"),
			Self::Key(key) => write!(f, "{key}"),
		}
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::Str(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}

impl From<&String> for Value {
	fn from(value: &String) -> Self {
		Self::Str(value.clone())
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

macro_rules! impl_from_int {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for Value {
				fn from(value: $ty) -> Self {
					Self::Int(i64::from(value))
				}
			}
		)*
	};
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for Value {
	fn from(value: usize) -> Self {
		i64::try_from(value).map_or(Self::Float(value as f64), Self::Int)
	}
}

impl From<u64> for Value {
	fn from(value: u64) -> Self {
		i64::try_from(value).map_or(Self::Float(value as f64), Self::Int)
	}
}

impl From<f32> for Value {
	fn from(value: f32) -> Self {
		Self::Float(f64::from(value))
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<Key> for Value {
	fn from(value: Key) -> Self {
		Self::Key(value)
	}
}

impl From<&Key> for Value {
	fn from(value: &Key) -> Self {
		Self::Key(value.clone())
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}
