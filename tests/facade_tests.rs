//! Facade re-export tests

use linguist::i18n::EmbeddedLoader;
use linguist::prelude::*;
use rstest::rstest;
use serial_test::serial;
use std::sync::Arc;

#[rstest]
#[serial(i18n)]
fn test_prelude_translates_through_global_engine() {
	// Arrange
	let loader = EmbeddedLoader::new("facade")
		.with_resource("translations/facade/strings.properties", "greet=Hello, {0}!");
	let bundle = Bundle::builder("facade").loader(Arc::new(loader)).build();
	Translations::global().set_settings(
		I18nSettings::default()
			.with_default_locale(Locale::english())
			.with_default_bundle(bundle),
	);

	// Act
	let greeting = Key::new("greet").translate_with(["Ada"]).unwrap();
	let missing = Key::new("missing.key").translate().unwrap();

	// Assert
	assert_eq!(greeting, "Hello, Ada!");
	assert_eq!(missing, "missing.key");
}
