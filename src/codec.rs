//! Wire codec for authority token requests and responses.
//!
//! Requests are `application/x-www-form-urlencoded` bodies whose required parameters are
//! checked locally per [`GrantType`]. Responses are Azure AD v1 JSON documents; `expires_in`
//! (and `not_before`) may arrive either as numbers or as numeric strings.

mod grant;

pub use grant::*;

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use url::form_urlencoded::Serializer;
// self
use crate::{
	_prelude::*,
	auth::{Token, TokenKind, TokenPair},
	error::{ArgumentError, ProtocolError},
};

/// OAuth error document returned by the authority on failed token requests.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AuthorityErrorResponse {
	/// OAuth `error` code (e.g. `invalid_grant`).
	pub error: String,
	/// Human-readable description, usually prefixed with an `AADSTS` code.
	#[serde(default)]
	pub error_description: Option<String>,
	/// Numeric AADSTS codes.
	#[serde(default)]
	pub error_codes: Vec<u32>,
	/// Correlation identifier for support requests.
	#[serde(default)]
	pub correlation_id: Option<String>,
	/// Authority-side trace identifier.
	#[serde(default)]
	pub trace_id: Option<String>,
}

#[derive(Deserialize)]
struct RawTokenResponse {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	token_type: Option<String>,
	#[serde(default)]
	expires_in: Option<Seconds>,
	#[serde(default)]
	not_before: Option<Seconds>,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	id_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Seconds {
	Number(i64),
	Text(String),
}
impl Seconds {
	fn value(&self, field: &'static str) -> Result<i64, ProtocolError> {
		match self {
			Seconds::Number(value) => Ok(*value),
			Seconds::Text(text) => text
				.trim()
				.parse()
				.map_err(|_| ProtocolError::InvalidSeconds { field, value: text.clone() }),
		}
	}
}

#[derive(Deserialize)]
struct IdTokenClaims {
	#[serde(default)]
	tid: Option<String>,
	#[serde(default)]
	oid: Option<String>,
}

/// Encodes a token request body, rejecting missing required parameters before any I/O.
///
/// `grant_type` is always emitted first; a `grant_type` entry inside `parameters` is ignored.
pub fn encode_token_request(
	grant: GrantType,
	parameters: &BTreeMap<String, String>,
) -> Result<String, ArgumentError> {
	for &parameter in grant.required_parameters() {
		if parameters.get(parameter).is_none_or(|value| value.is_empty()) {
			return Err(ArgumentError::MissingParameter { grant: grant.label(), parameter });
		}
	}

	let mut body = Serializer::new(String::new());

	body.append_pair("grant_type", grant.as_str());

	for (key, value) in parameters.iter().filter(|(key, _)| *key != "grant_type") {
		body.append_pair(key, value);
	}

	Ok(body.finish())
}

/// Decodes a successful token response into a [`TokenPair`].
///
/// The access token expiry is `issued_at + expires_in`, where `issued_at` is the response's
/// `not_before` claim when present and `received_at` otherwise.
pub fn decode_token_response(
	raw: &[u8],
	received_at: OffsetDateTime,
) -> Result<TokenPair, ProtocolError> {
	let de = &mut serde_json::Deserializer::from_slice(raw);
	let response: RawTokenResponse =
		serde_path_to_error::deserialize(de).map_err(|source| ProtocolError::Malformed { source })?;
	let access_value = non_empty(response.access_token)
		.ok_or(ProtocolError::MissingField { field: "access_token" })?;

	non_empty(response.token_type).ok_or(ProtocolError::MissingField { field: "token_type" })?;

	let expires_in = response
		.expires_in
		.ok_or(ProtocolError::MissingField { field: "expires_in" })?
		.value("expires_in")?;

	if expires_in < 0 {
		return Err(ProtocolError::NegativeExpiresIn { value: expires_in });
	}

	let issued_at = match response.not_before {
		Some(not_before) => OffsetDateTime::from_unix_timestamp(not_before.value("not_before")?)
			.map_err(|_| ProtocolError::ExpiryOutOfRange)?,
		None => received_at,
	};
	let expires_at = issued_at
		.checked_add(Duration::seconds(expires_in))
		.ok_or(ProtocolError::ExpiryOutOfRange)?;
	let id_token = non_empty(response.id_token);
	let identity = id_token.as_deref().and_then(target_identity_from_id_token);
	let scoped = |token: Token| match &identity {
		Some(identity) => token.with_target_identity(identity.clone()),
		None => token,
	};
	let access = scoped(Token::new(TokenKind::Access, access_value)?.with_expires_at(expires_at));
	let refresh = non_empty(response.refresh_token)
		.map(|value| Token::new(TokenKind::Refresh, value).map(scoped))
		.transpose()?;
	let pair = TokenPair::new(access, refresh)?;

	match id_token {
		Some(value) => {
			let identity_token = scoped(Token::new(TokenKind::Identity, value)?);

			Ok(pair.with_identity_token(identity_token)?)
		},
		None => Ok(pair),
	}
}

/// Decodes an OAuth error body, returning `None` for anything that is not one.
pub fn decode_error_response(raw: &[u8]) -> Option<AuthorityErrorResponse> {
	serde_json::from_slice::<AuthorityErrorResponse>(raw)
		.ok()
		.filter(|response| !response.error.is_empty())
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|value| !value.is_empty())
}

// Azure AD v1 id_tokens are unsigned JWTs; only the tenant/object claims are read.
fn target_identity_from_id_token(id_token: &str) -> Option<String> {
	let payload = id_token.split('.').nth(1)?;
	let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
	let claims = serde_json::from_slice::<IdTokenClaims>(&bytes).ok()?;

	claims.tid.or(claims.oid).filter(|identity| !identity.is_empty())
}
