//! Caller-supplied user credentials and ambient identity assertions.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, auth::TokenSecret, codec::GrantType};

/// Username/secret pair forwarded to the resource-owner password grant.
///
/// The authority client never persists credentials; they are borrowed for the duration of a
/// single request.
#[derive(Clone)]
pub struct Credential {
	username: String,
	password: TokenSecret,
}
impl Credential {
	/// Creates a credential from a username and secret.
	pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self { username: username.into(), password: TokenSecret::new(password) }
	}

	/// Username (UPN) presented to the authority.
	pub fn username(&self) -> &str {
		&self.username
	}

	/// Secret presented to the authority. Callers must avoid logging it.
	pub fn password(&self) -> &TokenSecret {
		&self.password
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Assertion formats accepted by the identity-assertion grants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionType {
	/// SAML 1.1 token obtained from a WS-Trust endpoint (integrated Windows auth).
	Saml11Bearer,
	/// SAML 2.0 token obtained from a WS-Trust endpoint.
	Saml20Bearer,
	/// JWT issued by a trusted identity provider.
	JwtBearer,
}
impl AssertionType {
	/// Grant used to redeem this assertion.
	pub fn grant_type(self) -> GrantType {
		match self {
			AssertionType::Saml11Bearer => GrantType::Saml11Bearer,
			AssertionType::Saml20Bearer => GrantType::Saml20Bearer,
			AssertionType::JwtBearer => GrantType::JwtBearer,
		}
	}
}

/// Proof of the ambient identity of the running environment.
#[derive(Clone, Debug)]
pub struct IdentityAssertion {
	kind: AssertionType,
	value: TokenSecret,
}
impl IdentityAssertion {
	/// Wraps an assertion of the given type.
	pub fn new(kind: AssertionType, value: impl Into<String>) -> Self {
		Self { kind, value: TokenSecret::new(value) }
	}

	/// Assertion format.
	pub fn kind(&self) -> AssertionType {
		self.kind
	}

	/// Value placed in the `assertion` form parameter.
	///
	/// SAML assertions travel base64-encoded; JWT assertions are already URL-safe.
	pub fn encoded(&self) -> String {
		match self.kind {
			AssertionType::Saml11Bearer | AssertionType::Saml20Bearer =>
				STANDARD.encode(self.value.expose().as_bytes()),
			AssertionType::JwtBearer => self.value.expose().to_owned(),
		}
	}
}
