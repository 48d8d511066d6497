//! Acquisition flows powered by the [`AzureAuthority`] facade.

pub mod common;

mod interactive;
mod refresh;
mod silent;

pub use common::TokenTarget;

// self
use crate::{
	_prelude::*,
	ambient::AmbientIdentity,
	authority::AuthorityEndpoint,
	cache::TokenCache,
	exchange::TransportErrorMapper,
	http::TokenHttpClient,
	strategy::{AuthorityStrategy, DefaultAuthorityStrategy},
	user_agent::UserAgentBridge,
};
#[cfg(feature = "reqwest")]
use crate::{exchange::DefaultTransportErrorMapper, http::ReqwestHttpClient};

#[cfg(feature = "reqwest")]
/// Authority client specialized for the crate's default reqwest transport stack.
pub type ReqwestAzureAuthority = AzureAuthority<ReqwestHttpClient, DefaultTransportErrorMapper>;

/// Interfaces with an Azure AD authority to acquire, refresh, and cache token pairs.
///
/// The client owns the authority endpoint and shared references to the HTTP transport, token
/// cache, user agent, and error strategy. It keeps no per-request state, so one instance can
/// be shared across tasks behind an [`Arc`]. Concurrent acquisitions for the same cache key are
/// not coalesced; each may contact the authority and the last cache write wins.
pub struct AzureAuthority<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	endpoint: AuthorityEndpoint,
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
	cache: Arc<dyn TokenCache>,
	user_agent: Arc<dyn UserAgentBridge>,
	strategy: Arc<dyn AuthorityStrategy>,
	ambient_identity: Option<Arc<dyn AmbientIdentity>>,
	expiry_margin: Duration,
}
impl<C, M> AzureAuthority<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Cached access tokens expiring within this window are treated as expired.
	pub const DEFAULT_EXPIRY_MARGIN: Duration = Duration::minutes(5);

	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		endpoint: AuthorityEndpoint,
		cache: Arc<dyn TokenCache>,
		user_agent: Arc<dyn UserAgentBridge>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			endpoint,
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			cache,
			user_agent,
			strategy: Arc::new(DefaultAuthorityStrategy),
			ambient_identity: None,
			expiry_margin: Self::DEFAULT_EXPIRY_MARGIN,
		}
	}

	/// Replaces the error classification and request decoration strategy.
	pub fn with_strategy(mut self, strategy: Arc<dyn AuthorityStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Enables identity-assertion acquisition when no credentials are supplied.
	pub fn with_ambient_identity(mut self, ambient: Arc<dyn AmbientIdentity>) -> Self {
		self.ambient_identity = Some(ambient);

		self
	}

	/// Overrides the cache freshness window (negative values clamp to zero).
	pub fn with_expiry_margin(mut self, margin: Duration) -> Self {
		self.expiry_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Authority endpoint this client talks to.
	pub fn endpoint(&self) -> &AuthorityEndpoint {
		&self.endpoint
	}

	/// Authority URL used to interact with the identity service.
	pub fn authority_host_url(&self) -> &str {
		self.endpoint.as_str()
	}

	/// Current cache freshness window.
	pub fn expiry_margin(&self) -> Duration {
		self.expiry_margin
	}
}
#[cfg(feature = "reqwest")]
impl AzureAuthority<ReqwestHttpClient, DefaultTransportErrorMapper> {
	/// Creates a client for `endpoint` backed by its own reqwest transport.
	pub fn new(
		endpoint: AuthorityEndpoint,
		cache: Arc<dyn TokenCache>,
		user_agent: Arc<dyn UserAgentBridge>,
	) -> Self {
		Self::with_http_client(
			endpoint,
			cache,
			user_agent,
			ReqwestHttpClient::default(),
			Arc::new(DefaultTransportErrorMapper),
		)
	}

	/// Validates `authority_host_url` and creates a reqwest-backed client for it.
	pub fn with_authority_host_url(
		authority_host_url: &str,
		cache: Arc<dyn TokenCache>,
		user_agent: Arc<dyn UserAgentBridge>,
	) -> Result<Self> {
		Ok(Self::new(AuthorityEndpoint::parse(authority_host_url)?, cache, user_agent))
	}
}
impl<C, M> Clone for AzureAuthority<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			endpoint: self.endpoint.clone(),
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			cache: self.cache.clone(),
			user_agent: self.user_agent.clone(),
			strategy: self.strategy.clone(),
			ambient_identity: self.ambient_identity.clone(),
			expiry_margin: self.expiry_margin,
		}
	}
}
impl<C, M> Debug for AzureAuthority<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AzureAuthority")
			.field("endpoint", &self.endpoint)
			.field("ambient_identity_set", &self.ambient_identity.is_some())
			.field("expiry_margin", &self.expiry_margin)
			.finish()
	}
}
