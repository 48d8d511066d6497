//! Token cache contracts and built-in cache implementations.

pub mod file;
pub mod memory;

pub use file::FileCache;
pub use memory::MemoryCache;

// self
use crate::{_prelude::*, auth::TokenPair};

/// Future returned by every [`TokenCache`] operation.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CacheError>> + 'a + Send>>;

/// Keyed storage for token pairs shared by every acquisition flow.
///
/// Implementations must be safe to call from concurrent acquisitions. Writes for the same key
/// are not coordinated by the authority client; the last writer wins.
pub trait TokenCache
where
	Self: Send + Sync,
{
	/// Returns the pair stored under `key`, if any.
	fn get<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<TokenPair>>;

	/// Stores or replaces the pair under `key`.
	fn put(&self, key: CacheKey, pair: TokenPair) -> CacheFuture<'_, ()>;

	/// Removes the pair stored under `key`; removing a missing key is not an error.
	fn invalidate<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, ()>;
}

/// Error type produced by [`TokenCache`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CacheError {
	/// Serialization failures surfaced by the backend.
	#[error("Cache serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Cache backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Identifies one cached token pair.
///
/// Two acquisitions share an entry only when they target the same authority, target URI,
/// client, resource, and identity.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CacheKey {
	/// Authority URL (trailing slash trimmed).
	pub authority: String,
	/// Target URI the credential is requested for.
	pub target_uri: String,
	/// Client identifier.
	pub client_id: String,
	/// Resource identifier.
	pub resource: String,
	/// Username or tenant identity the pair belongs to, when known up front.
	pub identity: Option<String>,
}
impl CacheKey {
	/// Builds a key without an identity component.
	pub fn new(
		authority: impl Into<String>,
		target_uri: impl Into<String>,
		client_id: impl Into<String>,
		resource: impl Into<String>,
	) -> Self {
		Self {
			authority: authority.into(),
			target_uri: target_uri.into(),
			client_id: client_id.into(),
			resource: resource.into(),
			identity: None,
		}
	}

	/// Scopes the key to an identity.
	pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
		self.identity = Some(identity.into());

		self
	}
}
