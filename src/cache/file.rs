//! File-backed [`TokenCache`] that survives helper restarts.
//!
//! Entries are written as plaintext JSON; point the cache at a file only the current user can
//! read.

// std
use std::{
	fs::{self, File, OpenOptions},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::TokenPair,
	cache::{CacheError, CacheFuture, CacheKey, TokenCache},
};

/// Persists token pairs to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileCache {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<CacheKey, TokenPair>>>,
}
impl FileCache {
	/// Opens (or creates) a cache at the provided path, eagerly loading existing entries.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<CacheKey, TokenPair>, CacheError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| CacheError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(HashMap::new());
		}

		let entries: Vec<(CacheKey, TokenPair)> =
			serde_json::from_slice(&bytes).map_err(|e| CacheError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(entries.into_iter().collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), CacheError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| CacheError::Backend {
				message: format!("Failed to create cache directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &HashMap<CacheKey, TokenPair>) -> Result<(), CacheError> {
		Self::ensure_parent_exists(&self.path)?;

		// Sorted so the file is stable across writes.
		let mut snapshot: Vec<_> = contents.iter().collect();

		snapshot.sort_by(|a, b| a.0.cmp(b.0));

		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| CacheError::Serialization {
				message: format!("Failed to serialize cache snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = Self::create_private(&tmp_path).map_err(|e| CacheError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| CacheError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| CacheError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| CacheError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	#[cfg(unix)]
	fn create_private(path: &Path) -> std::io::Result<File> {
		// std
		use std::os::unix::fs::OpenOptionsExt;

		OpenOptions::new().write(true).create(true).truncate(true).mode(0o600).open(path)
	}

	#[cfg(not(unix))]
	fn create_private(path: &Path) -> std::io::Result<File> {
		OpenOptions::new().write(true).create(true).truncate(true).open(path)
	}
}
impl TokenCache for FileCache {
	fn get<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<TokenPair>> {
		Box::pin(async move { Ok(self.inner.read().get(key).cloned()) })
	}

	fn put(&self, key: CacheKey, pair: TokenPair) -> CacheFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			guard.insert(key, pair);
			self.persist_locked(&guard)
		})
	}

	fn invalidate<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			if guard.remove(key).is_some() {
				self.persist_locked(&guard)?;
			}

			Ok(())
		})
	}
}
