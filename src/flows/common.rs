//! Shared helpers for flow implementations (targets, cache keys, token endpoint calls).

// self
use crate::{
	_prelude::*,
	auth::{ClientId, TokenPair},
	cache::CacheKey,
	codec::GrantType,
	error::ArgumentError,
	exchange::{TokenExchange, TransportErrorMapper},
	flows::AzureAuthority,
	http::TokenHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	uri,
};

/// What a token is requested for: target URI, client, and resource.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TokenTarget {
	target_uri: String,
	client_id: ClientId,
	resource: String,
}
impl TokenTarget {
	/// Validates and bundles the per-request identifiers.
	///
	/// Fails with [`Error::InvalidArgument`] when the target URI is not well formed, the client
	/// id is invalid, or the resource is blank.
	pub fn new(target_uri: &str, client_id: &str, resource: &str) -> Result<Self> {
		if !uri::is_well_formed_uri(target_uri) {
			return Err(ArgumentError::InvalidTargetUri { value: target_uri.to_owned() }.into());
		}

		let client_id = ClientId::new(client_id)?;

		if resource.trim().is_empty() {
			return Err(ArgumentError::EmptyResource.into());
		}

		Ok(Self { target_uri: target_uri.to_owned(), client_id, resource: resource.to_owned() })
	}

	/// Resource the credential is requested for.
	pub fn target_uri(&self) -> &str {
		&self.target_uri
	}

	/// Client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Resource identifier placed in the `resource` parameter.
	pub fn resource(&self) -> &str {
		&self.resource
	}
}

/// How a flow produced its pair; drives the recorded outcome.
pub(crate) enum Acquisition {
	Cached(TokenPair),
	Issued(TokenPair),
}
impl Acquisition {
	fn into_pair(self) -> TokenPair {
		match self {
			Acquisition::Cached(pair) | Acquisition::Issued(pair) => pair,
		}
	}
}

/// Records the settled outcome on the span and counter, then unwraps the pair.
pub(crate) fn settle(
	kind: FlowKind,
	span: &FlowSpan,
	result: Result<Acquisition>,
) -> Result<TokenPair> {
	let outcome = match &result {
		Ok(Acquisition::Cached(_)) => FlowOutcome::CacheHit,
		other => FlowOutcome::of(other),
	};

	obs::record_flow_outcome(kind, outcome);
	span.record_outcome(outcome);

	result.map(Acquisition::into_pair)
}

/// Form parameters every grant carries.
pub(crate) fn base_form(target: &TokenTarget) -> BTreeMap<String, String> {
	BTreeMap::from([
		("client_id".to_owned(), target.client_id().to_owned()),
		("resource".to_owned(), target.resource().to_owned()),
	])
}

impl<C, M> AzureAuthority<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn cache_key(&self, target: &TokenTarget, identity: Option<&str>) -> CacheKey {
		let key = CacheKey::new(
			self.endpoint.as_str(),
			target.target_uri(),
			target.client_id(),
			target.resource(),
		);

		match identity {
			Some(identity) => key.with_identity(identity),
			None => key,
		}
	}

	/// Redeems a grant at `<authority>/oauth2/token`.
	pub(crate) async fn redeem(
		&self,
		grant: GrantType,
		form: BTreeMap<String, String>,
	) -> Result<TokenPair> {
		let exchange = TokenExchange {
			http_client: self.http_client.as_ref(),
			mapper: self.transport_mapper.as_ref(),
			strategy: self.strategy.as_ref(),
			token_endpoint: self.endpoint.token_endpoint()?,
		};

		exchange.redeem(grant, form).await
	}
}
