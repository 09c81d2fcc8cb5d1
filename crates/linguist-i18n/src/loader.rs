//! Resource loaders
//!
//! A [`ResourceLoader`] answers two questions for a slash-separated resource
//! path such as `translations/core/strings_en.properties`: whether it can see
//! the resource, and what its bytes are. The engine probes loaders in priority
//! order and parses through the first one that answers.

use crate::error::{I18nError, I18nResult};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Environment variable holding the platform-global loader's search path.
pub const RESOURCE_PATH_ENV: &str = "LINGUIST_RESOURCE_PATH";

/// Directory searched by the platform-global loader when the environment
/// variable is unset.
pub const DEFAULT_RESOURCE_DIR: &str = "resources";

/// Capability for reading translation resources.
pub trait ResourceLoader: Send + Sync + fmt::Debug {
	/// Short name used in logs and provenance.
	fn name(&self) -> &str;

	/// Whether the loader can see a resource at `path`.
	fn contains(&self, path: &str) -> bool;

	/// Read the resource at `path`, or `None` when it doesn't exist.
	fn load(&self, path: &str) -> I18nResult<Option<Vec<u8>>>;
}

static GLOBAL_LOADER: Lazy<Arc<dyn ResourceLoader>> = Lazy::new(|| {
	let roots: Vec<PathBuf> = match std::env::var_os(RESOURCE_PATH_ENV) {
		Some(paths) => std::env::split_paths(&paths).collect(),
		None => vec![PathBuf::from(DEFAULT_RESOURCE_DIR)],
	};

	tracing::debug!("Platform resource loader searching {:?}", roots);
	Arc::new(DirectoryLoader::with_roots("system", roots))
});

/// The platform-global loader.
///
/// Searches the directories listed in `LINGUIST_RESOURCE_PATH`, or
/// `./resources` when it is unset.
pub fn global_loader() -> Arc<dyn ResourceLoader> {
	GLOBAL_LOADER.clone()
}

/// Loads resources from one or more directories, first match wins.
///
/// Paths containing `..`, root or prefix components are never resolved.
///
/// # Example
/// ```
/// use linguist_i18n::{DirectoryLoader, ResourceLoader};
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::create_dir_all(dir.path().join("translations")).unwrap();
/// std::fs::write(dir.path().join("translations/app.properties"), "a=b").unwrap();
///
/// let loader = DirectoryLoader::new(dir.path());
/// assert!(loader.contains("translations/app.properties"));
/// assert!(!loader.contains("../secret.properties"));
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
	name: String,
	roots: Vec<PathBuf>,
}

impl DirectoryLoader {
	/// Create a loader over a single directory.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self::with_roots("directory", vec![root.into()])
	}

	/// Create a named loader over several directories.
	pub fn with_roots(name: impl Into<String>, roots: Vec<PathBuf>) -> Self {
		Self {
			name: name.into(),
			roots,
		}
	}

	/// Directories searched by this loader.
	pub fn roots(&self) -> &[PathBuf] {
		&self.roots
	}

	fn resolve(&self, path: &str) -> Option<PathBuf> {
		let relative = Path::new(path);
		let is_safe = relative
			.components()
			.all(|component| matches!(component, Component::Normal(_)));
		if !is_safe {
			return None;
		}

		self.roots
			.iter()
			.map(|root| root.join(relative))
			.find(|candidate| candidate.is_file())
	}
}

impl ResourceLoader for DirectoryLoader {
	fn name(&self) -> &str {
		&self.name
	}

	fn contains(&self, path: &str) -> bool {
		self.resolve(path).is_some()
	}

	fn load(&self, path: &str) -> I18nResult<Option<Vec<u8>>> {
		let Some(file) = self.resolve(path) else {
			return Ok(None);
		};

		std::fs::read(&file).map(Some).map_err(|source| I18nError::Io {
			resource: file.display().to_string(),
			source,
		})
	}
}

/// Serves resources held in memory.
///
/// Useful for translations compiled into the binary with `include_bytes!` and
/// for tests.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedLoader {
	name: String,
	resources: HashMap<String, Arc<[u8]>>,
}

impl EmbeddedLoader {
	/// Create an empty loader.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			resources: HashMap::new(),
		}
	}

	/// Add a resource.
	pub fn with_resource(mut self, path: impl Into<String>, bytes: impl AsRef<[u8]>) -> Self {
		self.insert(path, bytes);
		self
	}

	/// Add or replace a resource.
	pub fn insert(&mut self, path: impl Into<String>, bytes: impl AsRef<[u8]>) {
		self.resources.insert(path.into(), Arc::from(bytes.as_ref()));
	}

	/// Number of resources held.
	pub fn len(&self) -> usize {
		self.resources.len()
	}

	/// Whether no resources are held.
	pub fn is_empty(&self) -> bool {
		self.resources.is_empty()
	}
}

impl ResourceLoader for EmbeddedLoader {
	fn name(&self) -> &str {
		&self.name
	}

	fn contains(&self, path: &str) -> bool {
		self.resources.contains_key(path)
	}

	fn load(&self, path: &str) -> I18nResult<Option<Vec<u8>>> {
		Ok(self.resources.get(path).map(|bytes| bytes.to_vec()))
	}
}

/// Tries each inner loader in order.
#[derive(Debug, Clone)]
pub struct ChainLoader {
	name: String,
	loaders: Vec<Arc<dyn ResourceLoader>>,
}

impl ChainLoader {
	/// Create a chain over the given loaders.
	pub fn new(name: impl Into<String>, loaders: Vec<Arc<dyn ResourceLoader>>) -> Self {
		Self {
			name: name.into(),
			loaders,
		}
	}
}

impl ResourceLoader for ChainLoader {
	fn name(&self) -> &str {
		&self.name
	}

	fn contains(&self, path: &str) -> bool {
		self.loaders.iter().any(|loader| loader.contains(path))
	}

	fn load(&self, path: &str) -> I18nResult<Option<Vec<u8>>> {
		for loader in &self.loaders {
			if let Some(bytes) = loader.load(path)? {
				return Ok(Some(bytes));
			}
		}

		Ok(None)
	}
}
