//! Refresh token redemption with carry-forward and cache invalidation.
//!
//! [`AzureAuthority::acquire_token_by_refresh_token`] always contacts the authority; it does
//! not consult the cache first. Pairs are cached under the token's target identity. Interactive
//! and ambient acquisitions cache under no identity, so the identity-less entry is also
//! updated (on success) or invalidated (on rejection) when it holds the redeemed refresh token.

// self
use crate::{
	_prelude::*,
	auth::{Token, TokenKind, TokenPair},
	cache::CacheKey,
	codec::GrantType,
	error::ArgumentError,
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
	/// Exchanges `refresh_token` for a new pair.
	///
	/// Fails with [`Error::InvalidArgument`] (and performs no I/O) unless the token is a
	/// refresh token. When the authority does not rotate the refresh token the input token is
	/// carried forward in the returned pair.
	pub async fn acquire_token_by_refresh_token(
		&self,
		target: &TokenTarget,
		refresh_token: &Token,
	) -> Result<TokenPair> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "acquire_token_by_refresh_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				if refresh_token.kind() != TokenKind::Refresh {
					return Err(Error::from(ArgumentError::NotARefreshToken {
						found: refresh_token.kind(),
					}));
				}

				let key = self.cache_key(target, refresh_token.target_identity());
				let shared = self.shared_entry(target, &key, refresh_token).await?;
				let mut form = common::base_form(target);

				form.insert("refresh_token".into(), refresh_token.value().expose().to_owned());

				let pair = match self.redeem(GrantType::RefreshToken, form).await {
					Ok(pair) => pair,
					Err(err) => {
						if matches!(err, Error::TokenExpired { .. }) {
							// The rejection is what the caller needs to see.
							let _ = self.cache.invalidate(&key).await;

							if let Some(shared) = &shared {
								let _ = self.cache.invalidate(shared).await;
							}
						}

						return Err(err);
					},
				};
				let pair = carry_forward(pair, refresh_token)?;

				if let Some(shared) = shared {
					self.cache.put(shared, pair.clone()).await?;
				}

				self.cache.put(key, pair.clone()).await?;

				Ok(Acquisition::Issued(pair))
			})
			.await;

		common::settle(KIND, &span, result)
	}

	/// Identity-less key other than `key` whose cached pair carries `refresh_token`.
	async fn shared_entry(
		&self,
		target: &TokenTarget,
		key: &CacheKey,
		refresh_token: &Token,
	) -> Result<Option<CacheKey>> {
		let shared = self.cache_key(target, None);

		if &shared == key {
			return Ok(None);
		}

		let holds = self
			.cache
			.get(&shared)
			.await?
			.is_some_and(|cached| holds_refresh_token(&cached, refresh_token));

		Ok(holds.then_some(shared))
	}
}

fn holds_refresh_token(pair: &TokenPair, refresh_token: &Token) -> bool {
	pair.refresh_token()
		.is_some_and(|cached| cached.value().expose() == refresh_token.value().expose())
}

fn carry_forward(pair: TokenPair, previous: &Token) -> Result<TokenPair> {
	if pair.refresh_token().is_some() {
		return Ok(pair);
	}

	let mut carried = TokenPair::new(pair.access_token().clone(), Some(previous.clone()))?;

	if let Some(identity) = pair.identity_token() {
		carried = carried.with_identity_token(identity.clone())?;
	}

	Ok(carried)
}
