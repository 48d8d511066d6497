//! Ambient identity collaborator used by the silent flow when no credentials are supplied.

// self
use crate::{_prelude::*, auth::IdentityAssertion, flows::TokenTarget};

/// Future returned by [`AmbientIdentity::assertion`].
pub type AmbientFuture<'a> = Pin<Box<dyn Future<Output = Result<IdentityAssertion>> + 'a + Send>>;

/// Source of an identity assertion for whoever is signed in to the current environment
/// (integrated Windows auth, a workload identity federation token, ...).
pub trait AmbientIdentity
where
	Self: Send + Sync,
{
	/// Produces an assertion the authority will accept for `target`.
	///
	/// Implementations return [`Error::AuthenticationFailed`] when no identity is available.
	fn assertion<'a>(&'a self, target: &'a TokenTarget) -> AmbientFuture<'a>;
}
