//! Immutable token values and the token pairs returned by every acquisition flow.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Kind of credential carried by a [`Token`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
	/// Bearer access token presented to the target resource.
	Access,
	/// Refresh token exchanged with the authority for new access tokens.
	Refresh,
	/// Identity (id_token) describing the signed-in principal.
	Identity,
}
impl TokenKind {
	/// Returns a stable lowercase label.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenKind::Access => "access",
			TokenKind::Refresh => "refresh",
			TokenKind::Identity => "identity",
		}
	}
}
impl Display for TokenKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Errors raised when token values violate their invariants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum TokenError {
	/// Token value was empty.
	#[error("The {kind} token value cannot be empty.")]
	EmptyValue {
		/// Kind of the rejected token.
		kind: TokenKind,
	},
	/// Token placed in a pair slot reserved for another kind.
	#[error("Expected a {expected} token but found a {found} token.")]
	KindMismatch {
		/// Kind required by the slot.
		expected: TokenKind,
		/// Kind actually supplied.
		found: TokenKind,
	},
}

/// A single issued credential; never mutated once handed out.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TokenRepr", into = "TokenRepr")]
pub struct Token {
	kind: TokenKind,
	value: TokenSecret,
	target_identity: Option<String>,
	expires_at: Option<OffsetDateTime>,
}
impl Token {
	/// Creates a token of the given kind, rejecting empty values.
	pub fn new(kind: TokenKind, value: impl Into<String>) -> Result<Self, TokenError> {
		let value = TokenSecret::new(value);

		if value.is_empty() {
			return Err(TokenError::EmptyValue { kind });
		}

		Ok(Self { kind, value, target_identity: None, expires_at: None })
	}

	/// Scopes the token to an identity or tenant.
	pub fn with_target_identity(mut self, identity: impl Into<String>) -> Self {
		self.target_identity = Some(identity.into());

		self
	}

	/// Stamps the absolute expiry instant.
	pub fn with_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Token kind.
	pub fn kind(&self) -> TokenKind {
		self.kind
	}

	/// Token value. Callers must avoid logging it.
	pub fn value(&self) -> &TokenSecret {
		&self.value
	}

	/// Identity or tenant the token is scoped to, when known.
	pub fn target_identity(&self) -> Option<&str> {
		self.target_identity.as_deref()
	}

	/// Absolute expiry instant, when the authority reported one.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_at
	}

	/// Returns `true` once `instant` reaches the expiry; tokens without expiry never expire.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}

	/// Checks expiry against the current UTC clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("kind", &self.kind)
			.field("value", &"<redacted>")
			.field("target_identity", &self.target_identity)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[derive(Clone, Serialize, Deserialize)]
struct TokenRepr {
	kind: TokenKind,
	value: TokenSecret,
	#[serde(default)]
	target_identity: Option<String>,
	#[serde(default)]
	expires_at: Option<OffsetDateTime>,
}
impl TryFrom<TokenRepr> for Token {
	type Error = TokenError;

	fn try_from(repr: TokenRepr) -> Result<Self, Self::Error> {
		if repr.value.is_empty() {
			return Err(TokenError::EmptyValue { kind: repr.kind });
		}

		Ok(Self {
			kind: repr.kind,
			value: repr.value,
			target_identity: repr.target_identity,
			expires_at: repr.expires_at,
		})
	}
}
impl From<Token> for TokenRepr {
	fn from(token: Token) -> Self {
		Self {
			kind: token.kind,
			value: token.value,
			target_identity: token.target_identity,
			expires_at: token.expires_at,
		}
	}
}

/// Result of a successful acquisition: an access token plus optional companions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TokenPairRepr", into = "TokenPairRepr")]
pub struct TokenPair {
	access_token: Token,
	refresh_token: Option<Token>,
	identity_token: Option<Token>,
}
impl TokenPair {
	/// Pairs an access token with an optional refresh token, enforcing their kinds.
	pub fn new(access_token: Token, refresh_token: Option<Token>) -> Result<Self, TokenError> {
		expect_kind(&access_token, TokenKind::Access)?;

		if let Some(refresh) = &refresh_token {
			expect_kind(refresh, TokenKind::Refresh)?;
		}

		Ok(Self { access_token, refresh_token, identity_token: None })
	}

	/// Attaches the identity token issued alongside the pair.
	pub fn with_identity_token(mut self, token: Token) -> Result<Self, TokenError> {
		expect_kind(&token, TokenKind::Identity)?;

		self.identity_token = Some(token);

		Ok(self)
	}

	/// Access token (always present).
	pub fn access_token(&self) -> &Token {
		&self.access_token
	}

	/// Refresh token, when the grant issued one.
	pub fn refresh_token(&self) -> Option<&Token> {
		self.refresh_token.as_ref()
	}

	/// Identity token, when the grant issued one.
	pub fn identity_token(&self) -> Option<&Token> {
		self.identity_token.as_ref()
	}

	/// Identity or tenant the access token is scoped to.
	pub fn target_identity(&self) -> Option<&str> {
		self.access_token.target_identity()
	}

	/// Access token expiry.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.access_token.expires_at()
	}

	/// Returns `true` once the access token expired at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.access_token.is_expired_at(instant)
	}

	/// Returns `true` when the access token expires at or before `instant + margin`.
	pub fn expires_within(&self, instant: OffsetDateTime, margin: Duration) -> bool {
		self.access_token.is_expired_at(instant.saturating_add(margin))
	}
}

fn expect_kind(token: &Token, expected: TokenKind) -> Result<(), TokenError> {
	if token.kind == expected {
		Ok(())
	} else {
		Err(TokenError::KindMismatch { expected, found: token.kind })
	}
}

#[derive(Clone, Serialize, Deserialize)]
struct TokenPairRepr {
	access_token: Token,
	#[serde(default)]
	refresh_token: Option<Token>,
	#[serde(default)]
	identity_token: Option<Token>,
}
impl TryFrom<TokenPairRepr> for TokenPair {
	type Error = TokenError;

	fn try_from(repr: TokenPairRepr) -> Result<Self, Self::Error> {
		let pair = TokenPair::new(repr.access_token, repr.refresh_token)?;

		match repr.identity_token {
			Some(identity) => pair.with_identity_token(identity),
			None => Ok(pair),
		}
	}
}
impl From<TokenPair> for TokenPairRepr {
	fn from(pair: TokenPair) -> Self {
		Self {
			access_token: pair.access_token,
			refresh_token: pair.refresh_token,
			identity_token: pair.identity_token,
		}
	}
}
