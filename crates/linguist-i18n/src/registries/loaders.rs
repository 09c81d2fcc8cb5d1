//! Resource loader registry
//!
//! Pins a loader to each bundle name the first time the name is seen, and
//! holds the discovery callbacks hosts use to contribute extra loaders (for
//! plugins whose translations live outside the host's resource path).

use crate::error::BoxError;
use crate::loader::{ResourceLoader, global_loader};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// Callback returning named loaders to probe after the built-in ones.
pub type DiscoveryCallback =
	Arc<dyn Fn() -> Result<Vec<(String, Arc<dyn ResourceLoader>)>, BoxError> + Send + Sync>;

/// Maps bundle names to loaders. First registration wins.
#[derive(Default)]
pub struct LoaderRegistry {
	loaders: RwLock<HashMap<String, Arc<dyn ResourceLoader>>>,
	callbacks: RwLock<Vec<(String, DiscoveryCallback)>>,
}

impl fmt::Debug for LoaderRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let callbacks: Vec<String> = self
			.callbacks
			.read()
			.iter()
			.map(|(name, _)| name.clone())
			.collect();

		f.debug_struct("LoaderRegistry")
			.field("loaders", &*self.loaders.read())
			.field("callbacks", &callbacks)
			.finish()
	}
}

impl LoaderRegistry {
	/// An empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// The process-wide registry.
	pub fn global() -> &'static Self {
		super::Registries::global_ref().loaders()
	}

	/// Pin `loader` to `bundle_name`.
	///
	/// Returns `false`, leaving the existing loader in place, when the name is
	/// already registered.
	pub fn register(&self, bundle_name: impl Into<String>, loader: Arc<dyn ResourceLoader>) -> bool {
		let bundle_name = bundle_name.into();
		let mut loaders = self.loaders.write();

		if loaders.contains_key(&bundle_name) {
			tracing::trace!("Loader for bundle '{}' already registered", bundle_name);
			return false;
		}

		tracing::debug!(
			"Registering loader '{}' for bundle '{}'",
			loader.name(),
			bundle_name
		);
		loaders.insert(bundle_name, loader);
		true
	}

	/// The loader pinned to `bundle_name`, if any.
	pub fn get(&self, bundle_name: &str) -> Option<Arc<dyn ResourceLoader>> {
		self.loaders.read().get(bundle_name).cloned()
	}

	/// The loader pinned to `bundle_name`, pinning the platform-global loader
	/// when none is registered yet.
	pub fn get_for_bundle(&self, bundle_name: &str) -> Arc<dyn ResourceLoader> {
		if let Some(loader) = self.get(bundle_name) {
			return loader;
		}

		self.loaders
			.write()
			.entry(bundle_name.to_string())
			.or_insert_with(global_loader)
			.clone()
	}

	/// Add a named discovery callback. A callback with the same name is
	/// replaced.
	pub fn add_discovery_callback<F>(&self, name: impl Into<String>, callback: F)
	where
		F: Fn() -> Result<Vec<(String, Arc<dyn ResourceLoader>)>, BoxError> + Send + Sync + 'static,
	{
		let name = name.into();
		let mut callbacks = self.callbacks.write();
		callbacks.retain(|(existing, _)| *existing != name);
		callbacks.push((name, Arc::new(callback)));
	}

	/// Remove a discovery callback, returning whether it existed.
	pub fn remove_discovery_callback(&self, name: &str) -> bool {
		let mut callbacks = self.callbacks.write();
		let before = callbacks.len();
		callbacks.retain(|(existing, _)| existing != name);
		callbacks.len() != before
	}

	/// Run every discovery callback and collect the loaders they return.
	///
	/// A callback that fails or panics is logged and contributes nothing.
	pub fn discovered_loaders(&self) -> Vec<(String, Arc<dyn ResourceLoader>)> {
		let callbacks: Vec<(String, DiscoveryCallback)> = self.callbacks.read().clone();
		let mut discovered = Vec::new();

		for (name, callback) in callbacks {
			match catch_unwind(AssertUnwindSafe(|| callback())) {
				Ok(Ok(loaders)) => {
					tracing::trace!(
						"Discovery callback '{}' returned {} loaders",
						name,
						loaders.len()
					);
					discovered.extend(loaders);
				}
				Ok(Err(err)) => {
					tracing::warn!("Loader discovery callback '{}' failed: {}", name, err);
				}
				Err(_) => {
					tracing::warn!("Loader discovery callback '{}' panicked", name);
				}
			}
		}

		discovered
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::loader::EmbeddedLoader;
	use rstest::rstest;
	use std::sync::Mutex;
	use tracing_subscriber::layer::SubscriberExt as _;
	use tracing_subscriber::util::SubscriberInitExt as _;

	fn embedded(name: &str) -> Arc<dyn ResourceLoader> {
		Arc::new(EmbeddedLoader::new(name))
	}

	/// A tracing layer that captures warning messages
	struct WarningCapture {
		logs: Arc<Mutex<Vec<String>>>,
	}

	impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarningCapture {
		fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
			struct MessageVisitor {
				message: String,
			}

			impl tracing::field::Visit for MessageVisitor {
				fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
					if field.name() == "message" {
						self.message = format!("{:?}", value);
					}
				}
			}

			if *event.metadata().level() != tracing::Level::WARN {
				return;
			}

			let mut visitor = MessageVisitor {
				message: String::new(),
			};
			event.record(&mut visitor);
			self.logs.lock().unwrap().push(visitor.message);
		}
	}

	#[rstest]
	fn test_first_registration_wins() {
		// Arrange
		let registry = LoaderRegistry::new();
		let first = embedded("first");

		// Act
		let registered_first = registry.register("core", first.clone());
		let registered_second = registry.register("core", embedded("second"));

		// Assert
		assert!(registered_first);
		assert!(!registered_second);
		assert!(Arc::ptr_eq(&registry.get("core").unwrap(), &first));
	}

	#[rstest]
	fn test_get_for_bundle_pins_global_loader() {
		// Arrange
		let registry = LoaderRegistry::new();

		// Act
		let loader = registry.get_for_bundle("unregistered");

		// Assert
		assert!(Arc::ptr_eq(&loader, &global_loader()));
		assert!(!registry.register("unregistered", embedded("late")));
	}

	#[rstest]
	fn test_discovery_callbacks_collect_loaders() {
		// Arrange
		let registry = LoaderRegistry::new();
		registry.add_discovery_callback("plugins", || {
			Ok(vec![
				("a".to_string(), embedded("a")),
				("b".to_string(), embedded("b")),
			])
		});
		registry.add_discovery_callback("more", || Ok(vec![("c".to_string(), embedded("c"))]));

		// Act
		let names: Vec<String> = registry
			.discovered_loaders()
			.into_iter()
			.map(|(name, _)| name)
			.collect();

		// Assert
		assert_eq!(names, vec!["a", "b", "c"]);
	}

	#[rstest]
	fn test_failing_callbacks_are_logged_and_skipped() {
		// Arrange
		let logs = Arc::new(Mutex::new(Vec::new()));
		let capture = WarningCapture { logs: logs.clone() };
		let _guard = tracing_subscriber::registry().with(capture).set_default();

		let registry = LoaderRegistry::new();
		registry.add_discovery_callback("broken", || Err("plugin directory missing".into()));
		registry.add_discovery_callback("panicking", || panic!("plugin exploded"));
		registry.add_discovery_callback("working", || Ok(vec![("ok".to_string(), embedded("ok"))]));

		// Act
		let discovered = registry.discovered_loaders();

		// Assert
		assert_eq!(discovered.len(), 1);
		assert_eq!(discovered[0].0, "ok");

		let captured = logs.lock().unwrap();
		assert_eq!(captured.len(), 2);
		assert!(captured[0].contains("'broken' failed: plugin directory missing"));
		assert!(captured[1].contains("'panicking' panicked"));
	}

	#[rstest]
	fn test_callbacks_replace_and_remove_by_name() {
		let registry = LoaderRegistry::new();
		registry.add_discovery_callback("plugins", || Ok(vec![("old".to_string(), embedded("old"))]));
		registry.add_discovery_callback("plugins", || Ok(vec![("new".to_string(), embedded("new"))]));

		let discovered = registry.discovered_loaders();
		assert_eq!(discovered.len(), 1);
		assert_eq!(discovered[0].0, "new");

		assert!(registry.remove_discovery_callback("plugins"));
		assert!(!registry.remove_discovery_callback("plugins"));
		assert!(registry.discovered_loaders().is_empty());
	}
}
