//! Authority-level error types shared across flows, codecs, caches, and transports.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by every acquisition operation.
///
/// Callers typically map [`Error::InvalidCredentials`], [`Error::TokenExpired`], and
/// [`Error::AuthenticationFailed`] to a re-prompt, and [`Error::Protocol`] /
/// [`Error::Transport`] to a hard failure. Nothing is retried internally.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Caller supplied malformed input; never reaches the network.
	#[error(transparent)]
	InvalidArgument(#[from] ArgumentError),
	/// Authority rejected the supplied username/secret.
	#[error("Authority rejected the supplied credentials: {reason}.")]
	InvalidCredentials {
		/// Authority- or client-supplied reason string.
		reason: String,
	},
	/// Authority rejected the refresh token itself; re-authenticate instead of retrying.
	#[error("Refresh token is invalid or expired: {reason}.")]
	TokenExpired {
		/// Authority- or client-supplied reason string.
		reason: String,
	},
	/// Generic denial (user cancelled in the user agent, consent denied, unknown rejection).
	#[error("Authentication failed: {reason}.")]
	AuthenticationFailed {
		/// Authority- or client-supplied reason string.
		reason: String,
	},
	/// Authority response could not be parsed or validated.
	#[error(transparent)]
	Protocol(#[from] ProtocolError),
	/// Network or I/O failure beneath the HTTP layer.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token cache failure.
	#[error("{0}")]
	Cache(
		#[from]
		#[source]
		crate::cache::CacheError,
	),
	/// Caller cancelled the acquisition before it completed.
	#[error("Token acquisition was cancelled.")]
	Cancelled,
}
impl From<crate::auth::TokenError> for Error {
	fn from(e: crate::auth::TokenError) -> Self {
		ArgumentError::from(e).into()
	}
}
impl From<crate::auth::IdentifierError> for Error {
	fn from(e: crate::auth::IdentifierError) -> Self {
		ArgumentError::from(e).into()
	}
}

/// Local validation failures raised before any I/O happens.
#[derive(Debug, ThisError)]
pub enum ArgumentError {
	/// Authority URL is not a well-formed URI.
	#[error("Authority URL `{value}` is not a well-formed URI.")]
	InvalidAuthorityUrl {
		/// Rejected input.
		value: String,
	},
	/// Authority URL cannot carry the `/oauth2/...` endpoint paths.
	#[error("Authority URL `{value}` cannot be used as a base for OAuth endpoints.")]
	UnusableAuthorityUrl {
		/// Rejected authority URL.
		value: String,
	},
	/// Redirect URI is not a well-formed URI.
	#[error("Redirect URI `{value}` is not a well-formed URI.")]
	InvalidRedirectUri {
		/// Rejected input.
		value: String,
	},
	/// Target URI is not a well-formed URI.
	#[error("Target URI `{value}` is not a well-formed URI.")]
	InvalidTargetUri {
		/// Rejected input.
		value: String,
	},
	/// Resource identifier is empty.
	#[error("Resource identifier cannot be empty.")]
	EmptyResource,
	/// Tenant or client identifier failed validation.
	#[error(transparent)]
	Identifier(#[from] crate::auth::IdentifierError),
	/// Token construction failed validation.
	#[error(transparent)]
	Token(#[from] crate::auth::TokenError),
	/// Refresh flow received a token that is not a refresh token.
	#[error("Expected a refresh token but received a {found} token.")]
	NotARefreshToken {
		/// Kind of the token that was supplied.
		found: crate::auth::TokenKind,
	},
	/// A parameter required by the grant is missing or empty.
	#[error("The {grant} grant requires the `{parameter}` parameter.")]
	MissingParameter {
		/// Grant label.
		grant: &'static str,
		/// Missing parameter name.
		parameter: &'static str,
	},
	/// Extra query parameters produced an unparsable authorization URL.
	#[error("Extra query parameters produce an invalid authorization URL.")]
	InvalidQueryParameters {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
}

/// Authority responses that could not be decoded or validated.
#[derive(Debug, ThisError)]
pub enum ProtocolError {
	/// Response body was not the expected JSON document.
	#[error("Token endpoint returned malformed JSON.")]
	Malformed {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Mandatory response field is absent or empty.
	#[error("Token response is missing the `{field}` field.")]
	MissingField {
		/// Missing field name.
		field: &'static str,
	},
	/// `expires_in` is negative.
	#[error("The expires_in value must not be negative (got {value}).")]
	NegativeExpiresIn {
		/// Reported value.
		value: i64,
	},
	/// `expires_in` or `not_before` is not a valid number of seconds.
	#[error("The `{field}` value `{value}` is not a valid number of seconds.")]
	InvalidSeconds {
		/// Offending field name.
		field: &'static str,
		/// Reported value.
		value: String,
	},
	/// Expiry computation overflowed the supported time range.
	#[error("The token expiry exceeds the supported range.")]
	ExpiryOutOfRange,
	/// Error status without a decodable OAuth error body.
	#[error("Token endpoint returned HTTP {status} without an OAuth error body.")]
	UnexpectedStatus {
		/// HTTP status code.
		status: u16,
		/// Truncated body preview.
		body_preview: String,
	},
	/// Authorization response carried a different `state` than the request.
	#[error("Authorization response state does not match the request.")]
	StateMismatch,
	/// Decoded tokens violate the token pair invariants.
	#[error(transparent)]
	Token(#[from] crate::auth::TokenError),
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the authority.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the authority.")]
	Io(#[from] std::io::Error),
	/// Transport failed without a structured error.
	#[error("HTTP client error occurred while calling the authority: {message}.")]
	Other {
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
