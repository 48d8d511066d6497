//! Silent acquisition: cache first, then the password or identity-assertion grant.
//!
//! [`AzureAuthority::acquire_token_silent`] never prompts. Explicit credentials select the
//! resource-owner password grant; without them the configured [`AmbientIdentity`] supplies an
//! assertion and the matching bearer-assertion grant is used instead.
//!
//! [`AmbientIdentity`]: crate::ambient::AmbientIdentity

// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenPair},
	codec::GrantType,
	exchange::TransportErrorMapper,
	flows::{
		AzureAuthority, TokenTarget,
		common::{self, Acquisition},
	},
	http::TokenHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C, M> AzureAuthority<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Acquires a pair from the cache, the supplied credentials, or the ambient identity.
	///
	/// Cached pairs are reused while their access token stays outside the expiry margin. A
	/// freshly issued pair is cached under a key scoped to the credential's username (or to no
	/// identity for ambient acquisitions).
	pub async fn acquire_token_silent(
		&self,
		target: &TokenTarget,
		credentials: Option<&Credential>,
	) -> Result<TokenPair> {
		const KIND: FlowKind = FlowKind::Silent;

		let span = FlowSpan::new(KIND, "acquire_token_silent");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let key = self.cache_key(target, credentials.map(Credential::username));

				if let Some(cached) = self.cache.get(&key).await? {
					let now = OffsetDateTime::now_utc();

					if !cached.expires_within(now, self.expiry_margin) {
						return Ok(Acquisition::Cached(cached));
					}
				}

				let (grant, form) = match credentials {
					Some(credential) => password_form(target, credential),
					None => self.assertion_form(target).await?,
				};
				let pair = self.redeem(grant, form).await?;

				self.cache.put(key, pair.clone()).await?;

				Ok(Acquisition::Issued(pair))
			})
			.await;

		common::settle(KIND, &span, result)
	}

	async fn assertion_form(
		&self,
		target: &TokenTarget,
	) -> Result<(GrantType, BTreeMap<String, String>)> {
		let ambient = self.ambient_identity.as_ref().ok_or_else(|| Error::AuthenticationFailed {
			reason: "no credentials were supplied and no ambient identity is configured".into(),
		})?;
		let assertion = ambient.assertion(target).await?;
		let mut form = common::base_form(target);

		form.insert("assertion".into(), assertion.encoded());

		Ok((assertion.kind().grant_type(), form))
	}
}

fn password_form(
	target: &TokenTarget,
	credential: &Credential,
) -> (GrantType, BTreeMap<String, String>) {
	let mut form = common::base_form(target);

	form.insert("username".into(), credential.username().to_owned());
	form.insert("password".into(), credential.password().expose().to_owned());

	(GrantType::Password, form)
}
