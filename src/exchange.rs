//! Token endpoint round-trips: encode, send, decode, classify.

pub use oauth2;

// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError,
	http::{
		Method, Request,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	auth::TokenPair,
	codec::{self, AuthorityErrorResponse, GrantType},
	error::{ArgumentError, ProtocolError, TransportError},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	strategy::{self, AuthorityErrorContext, AuthorityErrorKind, AuthorityStrategy},
};

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into an [`Error`].
	fn map_transport_error(
		&self,
		grant: GrantType,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper: every transport failure surfaces as [`Error::Transport`], never retried.
#[derive(Clone, Debug, Default)]
pub struct DefaultTransportErrorMapper;
impl<E> TransportErrorMapper<E> for DefaultTransportErrorMapper
where
	E: 'static + Send + Sync + StdError,
{
	fn map_transport_error(
		&self,
		grant: GrantType,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<E>,
	) -> Error {
		// Grant and metadata are not needed to classify transport failures.
		let _ = (grant, meta);

		match err {
			HttpClientError::Reqwest(inner) => TransportError::network(*inner).into(),
			HttpClientError::Http(inner) => ArgumentError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => TransportError::Other { message }.into(),
			_ => TransportError::Other { message: "unrecognized HTTP client failure".into() }
				.into(),
		}
	}
}

/// One token endpoint round-trip bound to a transport, mapper, and strategy.
pub(crate) struct TokenExchange<'a, C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) http_client: &'a C,
	pub(crate) mapper: &'a M,
	pub(crate) strategy: &'a dyn AuthorityStrategy,
	pub(crate) token_endpoint: Url,
}
impl<C, M> TokenExchange<'_, C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Redeems `grant` with the provided form parameters.
	///
	/// Missing required parameters fail before the transport is touched.
	pub(crate) async fn redeem(
		&self,
		grant: GrantType,
		mut form: BTreeMap<String, String>,
	) -> Result<TokenPair> {
		self.strategy.augment_token_request(grant, &mut form);

		let body = codec::encode_token_request(grant, &form)?;
		let request = Request::builder()
			.method(Method::POST)
			.uri(self.token_endpoint.as_str())
			.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
			.header(ACCEPT, "application/json")
			.body(body.into_bytes())
			.map_err(ArgumentError::from)?;
		let slot = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(slot.clone());
		let response = handle
			.call(request)
			.await
			.map_err(|err| self.mapper.map_transport_error(grant, slot.take().as_ref(), err))?;
		let received_at = OffsetDateTime::now_utc();
		let status = response.status();

		if status.is_success() {
			return Ok(codec::decode_token_response(response.body(), received_at)?);
		}

		Err(map_error_response(self.strategy, grant, status.as_u16(), response.body(), slot.take()))
	}
}

fn map_error_response(
	strategy: &dyn AuthorityStrategy,
	grant: GrantType,
	status: u16,
	body: &[u8],
	meta: Option<ResponseMetadata>,
) -> Error {
	let Some(response) = codec::decode_error_response(body) else {
		let preview = strategy::truncate_preview(String::from_utf8_lossy(body).into_owned());

		return ProtocolError::UnexpectedStatus { status, body_preview: preview }.into();
	};
	let mut ctx = AuthorityErrorContext::new(grant)
		.with_http_status(status)
		.with_oauth_error(response.error.clone())
		.with_error_codes(response.error_codes.iter().copied())
		.with_body_preview(String::from_utf8_lossy(body));

	if let Some(description) = &response.error_description {
		ctx = ctx.with_error_description(description.clone());
	}

	let reason = describe(&response, meta.as_ref());

	match strategy.classify_token_error(&ctx) {
		AuthorityErrorKind::InvalidCredentials => Error::InvalidCredentials { reason },
		AuthorityErrorKind::TokenExpired => Error::TokenExpired { reason },
		AuthorityErrorKind::AuthenticationFailed => Error::AuthenticationFailed { reason },
	}
}

// Azure descriptions carry trace/correlation lines after the first one; keep the headline.
fn describe(response: &AuthorityErrorResponse, meta: Option<&ResponseMetadata>) -> String {
	let headline = response
		.error_description
		.as_deref()
		.and_then(|description| description.lines().next())
		.map(|line| line.trim().trim_end_matches('.'))
		.filter(|line| !line.is_empty());
	let mut reason = match headline {
		Some(line) => format!("{} ({line})", response.error),
		None => response.error.clone(),
	};

	if let Some(id) = meta.and_then(|meta| meta.request_id.as_deref()) {
		reason.push_str(&format!(" [request id {id}]"));
	}

	reason
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::strategy::DefaultAuthorityStrategy;

	#[test]
	fn oauth_errors_are_classified_with_headline_reason() {
		let body = br#"{"error":"invalid_grant","error_description":"AADSTS50126: Error validating credentials due to invalid username or password.\r\nTrace ID: t\r\nCorrelation ID: c","error_codes":[50126]}"#;
		let meta = ResponseMetadata { status: Some(400), request_id: Some("req-9".into()) };
		let err =
			map_error_response(&DefaultAuthorityStrategy, GrantType::Password, 400, body, Some(meta));

		match err {
			Error::InvalidCredentials { reason } => assert_eq!(
				reason,
				"invalid_grant (AADSTS50126: Error validating credentials due to invalid username \
				 or password) [request id req-9]"
			),
			other => panic!("Unexpected classification: {other:?}."),
		}
	}

	#[test]
	fn refresh_rejections_map_to_token_expired() {
		let body = br#"{"error":"invalid_grant","error_description":"AADSTS70008: The refresh token has expired."}"#;
		let err =
			map_error_response(&DefaultAuthorityStrategy, GrantType::RefreshToken, 400, body, None);

		assert!(matches!(err, Error::TokenExpired { .. }));
	}

	#[test]
	fn non_oauth_error_bodies_are_protocol_errors() {
		let err = map_error_response(
			&DefaultAuthorityStrategy,
			GrantType::Password,
			503,
			b"<html>Service Unavailable</html>",
			None,
		);

		assert!(matches!(
			err,
			Error::Protocol(ProtocolError::UnexpectedStatus { status: 503, .. })
		));
	}

	#[test]
	fn strategies_see_the_error_body_preview() {
		struct PreviewStrategy(Mutex<Option<String>>);
		impl AuthorityStrategy for PreviewStrategy {
			fn classify_token_error(&self, ctx: &AuthorityErrorContext) -> AuthorityErrorKind {
				*self.0.lock() = ctx.body_preview.clone();

				AuthorityErrorKind::AuthenticationFailed
			}
		}

		let strategy = PreviewStrategy(Mutex::new(None));
		let body = br#"{"error":"interaction_required","claims":"{\"access_token\":{}}"}"#;
		let err = map_error_response(&strategy, GrantType::Password, 400, body, None);
		let preview = strategy.0.lock().clone().expect("Preview should reach the strategy.");

		assert!(matches!(err, Error::AuthenticationFailed { .. }));
		assert!(preview.contains("\"claims\""));
	}

	#[test]
	fn default_mapper_surfaces_transport_errors() {
		let err = TransportErrorMapper::<std::io::Error>::map_transport_error(
			&DefaultTransportErrorMapper,
			GrantType::RefreshToken,
			None,
			HttpClientError::Io(std::io::Error::other("connection refused")),
		);

		assert!(matches!(err, Error::Transport(TransportError::Io(_))));
	}
}
