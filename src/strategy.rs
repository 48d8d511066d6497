//! Authority strategy hooks that customize token requests and classify OAuth errors.
//!
//! Implementations decorate outgoing token request forms and map authority error bodies
//! into the crate's error taxonomy without tying flows to any particular HTTP client.

// self
use crate::{_prelude::*, codec::GrantType};

/// Strategy hook that allows deployments to decorate requests and classify errors.
///
/// Implementors are required to be `Send + Sync`, and the hooks only use crate-owned data
/// types so downstream crates never depend on reqwest-specific structures. Override only
/// what you need; `augment_token_request` has a default no-op implementation.
pub trait AuthorityStrategy: Send + Sync {
	/// Maps an authority-reported failure into the error taxonomy.
	fn classify_token_error(&self, ctx: &AuthorityErrorContext) -> AuthorityErrorKind;

	/// Gives deployments a chance to add form parameters (e.g. `client_secret`,
	/// `client_info`) before the request is encoded.
	fn augment_token_request(&self, _grant: GrantType, _form: &mut BTreeMap<String, String>) {}
}

/// Canonical authority denial categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthorityErrorKind {
	/// Supplied username/secret or identity assertion was rejected.
	InvalidCredentials,
	/// Refresh token is invalid, expired, or revoked.
	TokenExpired,
	/// Any other denial (consent, interaction required, disabled client, ...).
	AuthenticationFailed,
}

/// Context passed to strategies when classifying a failed token request.
///
/// Only primitive data is kept (status code, OAuth fields, AADSTS codes, body preview) so
/// strategies stay decoupled from the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorityErrorContext {
	/// Grant type associated with the failing request.
	pub grant_type: GrantType,
	/// HTTP status code returned by the authority, when available.
	pub http_status: Option<u16>,
	/// Authority-supplied OAuth `error` field.
	pub oauth_error: Option<String>,
	/// Authority-supplied OAuth `error_description` field.
	pub error_description: Option<String>,
	/// Numeric AADSTS codes reported alongside the error.
	pub error_codes: Vec<u32>,
	/// Truncated preview of the raw error body, for fields the context does not lift out.
	pub body_preview: Option<String>,
}
impl AuthorityErrorContext {
	/// Creates a new context scoped to the provided grant type.
	pub fn new(grant_type: GrantType) -> Self {
		Self {
			grant_type,
			http_status: None,
			oauth_error: None,
			error_description: None,
			error_codes: Vec::new(),
			body_preview: None,
		}
	}

	/// Adds an HTTP status code.
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the OAuth error code string returned by the authority.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Adds the OAuth `error_description` field.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}

	/// Adds AADSTS error codes.
	pub fn with_error_codes(mut self, codes: impl IntoIterator<Item = u32>) -> Self {
		self.error_codes.extend(codes);

		self
	}

	/// Adds a truncated body preview.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into()));

		self
	}

	/// Returns `true` if any AADSTS code in `codes` was reported, either structurally or in
	/// the description text.
	pub fn has_any_code(&self, codes: &[u32]) -> bool {
		codes.iter().any(|code| {
			self.error_codes.contains(code)
				|| self
					.error_description
					.as_deref()
					.is_some_and(|text| mentions_code(text, *code))
		})
	}
}

// `AADSTS50053` must not match inside `AADSTS500531`.
fn mentions_code(text: &str, code: u32) -> bool {
	let needle = format!("AADSTS{code}");

	text.match_indices(&needle).any(|(idx, _)| {
		!text[idx + needle.len()..].starts_with(|ch: char| ch.is_ascii_digit())
	})
}

/// Default strategy encoding Azure AD's error conventions.
///
/// `invalid_grant` means a bad refresh token on the refresh grant and bad user credentials on
/// the password and assertion grants, unless the AADSTS code says the user must interact
/// (MFA, consent, device compliance). Everything else is a generic authentication failure.
#[derive(Debug, Default)]
pub struct DefaultAuthorityStrategy;
impl DefaultAuthorityStrategy {
	/// Codes that require the user to interact with the authority.
	pub const INTERACTION_REQUIRED_CODES: &'static [u32] = &[50076, 50079, 50158, 53000, 65001];
	/// Codes that reject the supplied credentials.
	pub const INVALID_CREDENTIAL_CODES: &'static [u32] = &[50034, 50053, 50055, 50057, 50126];
}
impl Display for DefaultAuthorityStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-authority-strategy")
	}
}
impl AuthorityStrategy for DefaultAuthorityStrategy {
	fn classify_token_error(&self, ctx: &AuthorityErrorContext) -> AuthorityErrorKind {
		if ctx.has_any_code(Self::INTERACTION_REQUIRED_CODES) {
			return AuthorityErrorKind::AuthenticationFailed;
		}

		let grant = ctx.grant_type;
		let error = ctx.oauth_error.as_deref().map(str::to_ascii_lowercase);

		match (grant, error.as_deref()) {
			(GrantType::RefreshToken, Some("invalid_grant")) => AuthorityErrorKind::TokenExpired,
			(grant, _)
				if grant.presents_user_credentials()
					&& ctx.has_any_code(Self::INVALID_CREDENTIAL_CODES) =>
				AuthorityErrorKind::InvalidCredentials,
			(grant, Some("invalid_grant")) if grant.presents_user_credentials() =>
				AuthorityErrorKind::InvalidCredentials,
			_ => AuthorityErrorKind::AuthenticationFailed,
		}
	}
}

const BODY_PREVIEW_LIMIT: usize = 256;

/// Truncates response bodies so they can be embedded in errors and contexts.
pub(crate) fn truncate_preview(body: String) -> String {
	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}
