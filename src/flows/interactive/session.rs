// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	error::{ArgumentError, ProtocolError},
	flows::TokenTarget,
};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;
const PKCE_METHOD: &str = "S256";

/// One interactive authorization attempt: authorize URL plus the secrets that must survive
/// until the redirect comes back.
#[derive(Clone)]
pub(crate) struct AuthorizationRequest {
	pub(crate) authorize_url: Url,
	pub(crate) redirect_uri: String,
	state: String,
	pkce: PkcePair,
}
impl AuthorizationRequest {
	pub(crate) fn code_verifier(&self) -> &str {
		&self.pkce.verifier
	}

	/// Authorities always echo `state`; a missing value counts as a mismatch.
	pub(crate) fn validate_state(&self, returned: Option<&str>) -> Result<()> {
		match returned {
			Some(state) if state == self.state => Ok(()),
			_ => Err(ProtocolError::StateMismatch.into()),
		}
	}
}
impl Debug for AuthorizationRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationRequest")
			.field("authorize_url", &self.authorize_url.as_str())
			.field("redirect_uri", &self.redirect_uri)
			.field("code_challenge", &self.pkce.challenge)
			.finish()
	}
}

#[derive(Clone)]
struct PkcePair {
	verifier: String,
	challenge: String,
}
impl PkcePair {
	fn generate() -> Self {
		let verifier = random_string(PKCE_VERIFIER_LEN);
		let challenge = compute_pkce_challenge(&verifier);

		Self { verifier, challenge }
	}
}

/// Builds the authorize URL for `target`, appending `extra_query_parameters` verbatim.
pub(crate) fn build_request(
	authorize_endpoint: Url,
	target: &TokenTarget,
	redirect_uri: &str,
	extra_query_parameters: Option<&str>,
) -> Result<AuthorizationRequest> {
	let state = random_string(STATE_LEN);
	let pkce = PkcePair::generate();
	let authorize_url = build_authorize_url(
		authorize_endpoint,
		target,
		redirect_uri,
		&state,
		&pkce,
		extra_query_parameters,
	)?;

	Ok(AuthorizationRequest { authorize_url, redirect_uri: redirect_uri.to_owned(), state, pkce })
}

fn build_authorize_url(
	mut url: Url,
	target: &TokenTarget,
	redirect_uri: &str,
	state: &str,
	pkce: &PkcePair,
	extra_query_parameters: Option<&str>,
) -> Result<Url> {
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("response_type", "code");
	pairs.append_pair("client_id", target.client_id());
	pairs.append_pair("resource", target.resource());
	pairs.append_pair("redirect_uri", redirect_uri);
	pairs.append_pair("state", state);
	pairs.append_pair("code_challenge", &pkce.challenge);
	pairs.append_pair("code_challenge_method", PKCE_METHOD);

	drop(pairs);

	let extra = extra_query_parameters
		.map(|raw| raw.trim_start_matches(['?', '&']))
		.filter(|raw| !raw.is_empty());
	let Some(extra) = extra else {
		return Ok(url);
	};
	let combined = match url.query() {
		Some(query) => format!("{query}&{extra}"),
		None => extra.to_owned(),
	};

	url.set_query(Some(&combined));

	// Re-parse so malformed escapes surface before the user agent sees the URL.
	Url::parse(url.as_str())
		.map_err(|source| ArgumentError::InvalidQueryParameters { source }.into())
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn compute_pkce_challenge(verifier: &str) -> String {
	let mut hasher = Sha256::new();

	hasher.update(verifier.as_bytes());

	URL_SAFE_NO_PAD.encode(hasher.finalize())
}
