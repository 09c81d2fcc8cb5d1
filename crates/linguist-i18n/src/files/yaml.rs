//! YAML translation files
//!
//! Nested mappings are flattened into dotted keys and sequence items are
//! addressed as `key[index]`:
//!
//! ```yaml
//! command:
//!   banana: banana
//!   fruits:
//!     - apple
//!     - pear
//! ```
//!
//! yields `command.banana`, `command.fruits[0]` and `command.fruits[1]`.

use super::{FileFormat, TranslationTable};
use crate::error::{I18nError, I18nResult};
use serde_yaml::Value as YamlValue;

/// The `yaml` / `yml` file format.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFormat;

impl FileFormat for YamlFormat {
	fn identifiers(&self) -> Vec<String> {
		vec!["yaml".to_string(), "yml".to_string()]
	}

	fn parse(&self, resource: &str, bytes: &[u8]) -> I18nResult<TranslationTable> {
		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(TranslationTable::new());
		}

		let document: YamlValue =
			serde_yaml::from_slice(bytes).map_err(|err| I18nError::Parse {
				resource: resource.to_string(),
				message: err.to_string(),
			})?;

		let mut table = TranslationTable::new();
		match document {
			YamlValue::Null => {}
			YamlValue::Mapping(_) => flatten(resource, "", &document, &mut table)?,
			_ => {
				return Err(I18nError::Parse {
					resource: resource.to_string(),
					message: "expected a mapping at the top level".to_string(),
				});
			}
		}

		Ok(table)
	}
}

fn flatten(
	resource: &str,
	prefix: &str,
	value: &YamlValue,
	table: &mut TranslationTable,
) -> I18nResult<()> {
	match value {
		YamlValue::Null => {}
		YamlValue::Bool(b) => {
			table.insert(prefix.to_string(), b.to_string());
		}
		YamlValue::Number(n) => {
			table.insert(prefix.to_string(), n.to_string());
		}
		YamlValue::String(s) => {
			table.insert(prefix.to_string(), s.clone());
		}
		YamlValue::Sequence(items) => {
			for (index, item) in items.iter().enumerate() {
				flatten(resource, &format!("{prefix}[{index}]"), item, table)?;
			}
		}
		YamlValue::Mapping(mapping) => {
			for (key, item) in mapping {
				let key = scalar_key(resource, key)?;
				let path = if prefix.is_empty() {
					key
				} else {
					format!("{prefix}.{key}")
				};
				flatten(resource, &path, item, table)?;
			}
		}
		YamlValue::Tagged(tagged) => flatten(resource, prefix, &tagged.value, table)?,
	}

	Ok(())
}

fn scalar_key(resource: &str, key: &YamlValue) -> I18nResult<String> {
	match key {
		YamlValue::String(s) => Ok(s.clone()),
		YamlValue::Number(n) => Ok(n.to_string()),
		YamlValue::Bool(b) => Ok(b.to_string()),
		_ => Err(I18nError::Parse {
			resource: resource.to_string(),
			message: format!("unsupported mapping key: {key:?}"),
		}),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn parse(input: &str) -> I18nResult<TranslationTable> {
		YamlFormat.parse("test.yml", input.as_bytes())
	}

	#[rstest]
	fn test_nested_maps_flatten_to_dotted_keys() {
		// Arrange
		let input = "command:\n  banana: banana\n  nested:\n    deep: value\ntop: level\n";

		// Act
		let table = parse(input).unwrap();

		// Assert
		assert_eq!(
			table.keys().map(String::as_str).collect::<Vec<_>>(),
			vec!["command.banana", "command.nested.deep", "top"]
		);
		assert_eq!(table.get("command.nested.deep").map(String::as_str), Some("value"));
	}

	#[rstest]
	fn test_sequences_and_scalars() {
		let table = parse("fruits:\n  - apple\n  - pear\ncount: 3\nflag: true\nnothing: ~\n").unwrap();

		assert_eq!(table.get("fruits[0]").map(String::as_str), Some("apple"));
		assert_eq!(table.get("fruits[1]").map(String::as_str), Some("pear"));
		assert_eq!(table.get("count").map(String::as_str), Some("3"));
		assert_eq!(table.get("flag").map(String::as_str), Some("true"));
		assert!(!table.contains_key("nothing"));
	}

	#[rstest]
	fn test_empty_document() {
		assert!(parse("").unwrap().is_empty());
	}

	#[rstest]
	#[case("- just\n- a list\n")]
	#[case("key: [unclosed\n")]
	fn test_invalid_documents(#[case] input: &str) {
		assert!(matches!(parse(input), Err(I18nError::Parse { .. })));
	}

	#[rstest]
	fn test_identifiers() {
		assert_eq!(YamlFormat.identifiers(), vec!["yaml", "yml"]);
	}
}
