//! Interactive authorization-code acquisition through a [`UserAgentBridge`].
//!
//! The authority client builds the authorize URL (PKCE S256 + random `state`), hands it to
//! the bridge, and redeems the returned code. Cancellation races the bridge: a triggered
//! [`CancellationToken`] or a dropped future aborts the bridge exactly once.

mod session;

// crates.io
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	auth::TokenPair,
	codec::{self, GrantType},
	error::ArgumentError,
	exchange::TransportErrorMapper,
	flows::{
		AzureAuthority, TokenTarget,
		common::{self, Acquisition},
	},
	http::TokenHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	uri,
	user_agent::{AuthorizationOutcome, UserAgentBridge},
};
use session::AuthorizationRequest;

impl<C, M> AzureAuthority<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Acquires a pair by walking the user through the authority's sign-in page.
	///
	/// `extra_query_parameters` is appended as-is to the authorize URL query. The pair is
	/// cached without an identity component. Triggering `cancellation` resolves the call with
	/// [`Error::Cancelled`]; while the user agent is open it is aborted, and once the code is
	/// being redeemed nothing is cached.
	pub async fn acquire_token_interactive(
		&self,
		target: &TokenTarget,
		redirect_uri: &str,
		extra_query_parameters: Option<&str>,
		cancellation: &CancellationToken,
	) -> Result<TokenPair> {
		const KIND: FlowKind = FlowKind::Interactive;

		let span = FlowSpan::new(KIND, "acquire_token_interactive");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				if !uri::is_well_formed_uri(redirect_uri) {
					return Err(Error::from(ArgumentError::InvalidRedirectUri {
						value: redirect_uri.to_owned(),
					}));
				}

				let request = session::build_request(
					self.endpoint.authorize_endpoint()?,
					target,
					redirect_uri,
					extra_query_parameters,
				)?;
				let outcome = self.run_user_agent(&request, cancellation).await?;
				let pair = tokio::select! {
					biased;

					_ = cancellation.cancelled() => return Err(Error::Cancelled),
					pair = self.redeem_outcome(target, &request, outcome) => pair?,
				};

				self.cache.put(self.cache_key(target, None), pair.clone()).await?;

				Ok(Acquisition::Issued(pair))
			})
			.await;

		common::settle(KIND, &span, result)
	}

	async fn run_user_agent(
		&self,
		request: &AuthorizationRequest,
		cancellation: &CancellationToken,
	) -> Result<AuthorizationOutcome> {
		let mut guard = AbortGuard::new(self.user_agent.as_ref());
		let interaction =
			self.user_agent.perform_interactive_auth(&request.authorize_url, &request.redirect_uri);

		tokio::select! {
			biased;

			_ = cancellation.cancelled() => {
				guard.abort_now();

				Err(Error::Cancelled)
			},
			outcome = interaction => {
				guard.disarm();

				outcome.map_err(|e| Error::AuthenticationFailed { reason: e.to_string() })
			},
		}
	}

	async fn redeem_outcome(
		&self,
		target: &TokenTarget,
		request: &AuthorizationRequest,
		outcome: AuthorizationOutcome,
	) -> Result<TokenPair> {
		match outcome {
			AuthorizationOutcome::Code { code, state } => {
				request.validate_state(state.as_deref())?;

				let mut form = common::base_form(target);

				form.insert("code".into(), code);
				form.insert("redirect_uri".into(), request.redirect_uri.clone());
				form.insert("code_verifier".into(), request.code_verifier().to_owned());

				self.redeem(GrantType::AuthorizationCode, form).await
			},
			AuthorizationOutcome::Tokens(raw) =>
				Ok(codec::decode_token_response(&raw, OffsetDateTime::now_utc())?),
			AuthorizationOutcome::Cancelled => Err(Error::AuthenticationFailed {
				reason: "the user cancelled the interactive sign-in".into(),
			}),
			AuthorizationOutcome::Denied { error, description } => {
				let reason = match description {
					Some(description) => format!("{error} ({description})"),
					None => error,
				};

				Err(Error::AuthenticationFailed { reason })
			},
		}
	}
}

/// Aborts the bridge when dropped while still armed.
struct AbortGuard<'a> {
	bridge: &'a dyn UserAgentBridge,
	armed: bool,
}
impl<'a> AbortGuard<'a> {
	fn new(bridge: &'a dyn UserAgentBridge) -> Self {
		Self { bridge, armed: true }
	}

	fn abort_now(&mut self) {
		if std::mem::take(&mut self.armed) {
			self.bridge.abort();
		}
	}

	fn disarm(&mut self) {
		self.armed = false;
	}
}
impl Drop for AbortGuard<'_> {
	fn drop(&mut self) {
		self.abort_now();
	}
}
