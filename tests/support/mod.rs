//! Scripted collaborators shared by the integration tests.

#![allow(dead_code)]

pub use std::{
	collections::{BTreeMap, VecDeque},
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

pub use azure_authority::{
	AzureAuthority, CancellationToken, TokenTarget,
	ambient::{AmbientFuture, AmbientIdentity},
	auth::{AssertionType, Credential, IdentityAssertion, Token, TokenKind, TokenPair},
	authority::AuthorityEndpoint,
	cache::{CacheKey, MemoryCache, TokenCache},
	error::{ArgumentError, Error, ProtocolError, Result, TransportError},
	exchange::{
		DefaultTransportErrorMapper, TransportErrorMapper,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse},
	},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	url::{Url, form_urlencoded},
	user_agent::{AuthorizationOutcome, UserAgentBridge, UserAgentError, UserAgentFuture},
};
pub use parking_lot::Mutex;
pub use serde_json::json;
pub use time::{Duration, OffsetDateTime};

pub const TARGET_URI: &str = "https://dev.azure.com/contoso";
pub const CLIENT_ID: &str = "872cd9fa-d31f-45e0-9eab-6e460a02d1f1";
pub const RESOURCE: &str = "499b84ac-1321-427f-aa17-267ca6975798";
pub const REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
pub const TENANT_ID: &str = "72f988bf-86f1-41af-91ab-2d7cd011db47";
/// Unsigned id token whose `tid` claim is [`TENANT_ID`].
pub const ID_TOKEN: &str =
	"eyJhbGciOiJub25lIn0.eyJ0aWQiOiI3MmY5ODhiZi04NmYxLTQxYWYtOTFhYi0yZDdjZDAxMWRiNDcifQ.";

pub type TestAuthority = AzureAuthority<ScriptedHttpClient, DefaultTransportErrorMapper>;

#[derive(Debug)]
pub enum FakeTransportError {
	ConnectionRefused,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::ConnectionRefused => write!(f, "Connection refused."),
		}
	}
}
impl StdError for FakeTransportError {}

/// Scripted authority reply.
#[derive(Clone, Debug)]
pub enum Reply {
	Status(u16, String),
	Refuse,
	/// Never answers.
	Stall,
}

/// A token request observed by [`ScriptedHttpClient`].
#[derive(Clone, Debug)]
pub struct RecordedRequest {
	pub uri: String,
	pub form: BTreeMap<String, String>,
	pub first_key: Option<String>,
}

#[derive(Default)]
struct ScriptedState {
	replies: Mutex<VecDeque<Reply>>,
	fallback: Mutex<Option<Reply>>,
	requests: Mutex<Vec<RecordedRequest>>,
}

/// Fake transport that answers from a queue of scripted replies and records every request.
#[derive(Clone, Default)]
pub struct ScriptedHttpClient(Arc<ScriptedState>);
impl ScriptedHttpClient {
	/// Answers every request with `reply`.
	pub fn always(reply: Reply) -> Self {
		let client = Self::default();

		*client.0.fallback.lock() = Some(reply);

		client
	}

	/// Answers requests with `replies` in order.
	pub fn sequence(replies: impl IntoIterator<Item = Reply>) -> Self {
		let client = Self::default();

		client.0.replies.lock().extend(replies);

		client
	}

	pub fn calls(&self) -> usize {
		self.0.requests.lock().len()
	}

	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.0.requests.lock().clone()
	}
}
impl TokenHttpClient for ScriptedHttpClient {
	type Handle = ScriptedHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		ScriptedHandle { state: self.0.clone(), slot }
	}
}

pub struct ScriptedHandle {
	state: Arc<ScriptedState>,
	slot: ResponseMetadataSlot,
}
impl<'a> AsyncHttpClient<'a> for ScriptedHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send>>;

	fn call(&'a self, request: HttpRequest) -> Self::Future {
		let state = self.state.clone();
		let slot = self.slot.clone();

		Box::pin(async move {
			assert!(
				slot.take().is_none(),
				"ResponseMetadataSlot must be clear before dispatching a request."
			);

			let pairs: Vec<(String, String)> =
				form_urlencoded::parse(request.body()).into_owned().collect();

			state.requests.lock().push(RecordedRequest {
				uri: request.uri().to_string(),
				first_key: pairs.first().map(|(key, _)| key.clone()),
				form: pairs.into_iter().collect(),
			});

			let reply = state.replies.lock().pop_front().or_else(|| state.fallback.lock().clone());

			match reply {
				Some(Reply::Status(status, body)) => {
					slot.store(ResponseMetadata {
						status: Some(status),
						request_id: Some("scripted-request".into()),
					});

					let mut response = HttpResponse::new(body.into_bytes());

					*response.status_mut() = status
						.try_into()
						.expect("Scripted status codes should be valid HTTP statuses.");

					Ok(response)
				},
				Some(Reply::Refuse) =>
					Err(HttpClientError::Reqwest(Box::new(FakeTransportError::ConnectionRefused))),
				Some(Reply::Stall) => std::future::pending().await,
				None => panic!("Scripted HTTP client ran out of replies."),
			}
		})
	}
}

/// Scripted behavior of [`FakeUserAgent`].
#[derive(Clone, Debug)]
pub enum Interaction {
	/// Never completes; only cancellation ends the interaction.
	Pending,
	/// Returns `code` with the `state` found in the authorization URL.
	EchoCode(String),
	/// Returns a fixed outcome.
	Outcome(AuthorizationOutcome),
	/// Fails inside the user agent.
	Crash,
}

/// User agent double that records navigations and abort calls.
pub struct FakeUserAgent {
	interaction: Interaction,
	calls: AtomicUsize,
	aborts: AtomicUsize,
	last_url: Mutex<Option<Url>>,
}
impl FakeUserAgent {
	pub fn new(interaction: Interaction) -> Arc<Self> {
		Arc::new(Self {
			interaction,
			calls: AtomicUsize::new(0),
			aborts: AtomicUsize::new(0),
			last_url: Mutex::new(None),
		})
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn aborts(&self) -> usize {
		self.aborts.load(Ordering::SeqCst)
	}

	pub fn last_url(&self) -> Option<Url> {
		self.last_url.lock().clone()
	}
}
impl UserAgentBridge for FakeUserAgent {
	fn perform_interactive_auth<'a>(
		&'a self,
		authorization_url: &'a Url,
		_redirect_uri: &'a str,
	) -> UserAgentFuture<'a> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);
			*self.last_url.lock() = Some(authorization_url.clone());

			match &self.interaction {
				Interaction::Pending => std::future::pending().await,
				Interaction::EchoCode(code) => {
					let state = authorization_url
						.query_pairs()
						.find(|(key, _)| key == "state")
						.map(|(_, value)| value.into_owned());

					Ok(AuthorizationOutcome::Code { code: code.clone(), state })
				},
				Interaction::Outcome(outcome) => Ok(outcome.clone()),
				Interaction::Crash => Err(UserAgentError::new("browser exited unexpectedly")),
			}
		})
	}

	fn abort(&self) {
		self.aborts.fetch_add(1, Ordering::SeqCst);
	}
}

/// Ambient identity double returning a fixed JWT assertion.
#[derive(Default)]
pub struct FakeAmbientIdentity {
	calls: AtomicUsize,
}
impl FakeAmbientIdentity {
	pub const ASSERTION: &'static str = "eyJhbGciOiJub25lIn0.eyJzdWIiOiJhbWJpZW50In0.";

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl AmbientIdentity for FakeAmbientIdentity {
	fn assertion<'a>(&'a self, _target: &'a TokenTarget) -> AmbientFuture<'a> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);

			Ok(IdentityAssertion::new(AssertionType::JwtBearer, Self::ASSERTION))
		})
	}
}

pub fn target() -> TokenTarget {
	TokenTarget::new(TARGET_URI, CLIENT_ID, RESOURCE).expect("Target fixture should be valid.")
}

pub fn token_body(access: &str, refresh: Option<&str>, expires_in: i64) -> String {
	let mut body = json!({
		"token_type": "Bearer",
		"expires_in": expires_in.to_string(),
		"resource": RESOURCE,
		"access_token": access,
	});

	if let Some(refresh) = refresh {
		body["refresh_token"] = json!(refresh);
	}

	body.to_string()
}

pub fn ok(access: &str, refresh: Option<&str>) -> Reply {
	Reply::Status(200, token_body(access, refresh, 3600))
}

pub fn ok_with_id_token(access: &str, refresh: &str) -> Reply {
	let body = token_body(access, Some(refresh), 3600);
	let mut body: serde_json::Value =
		serde_json::from_str(&body).expect("Token body fixture should be JSON.");

	body["id_token"] = json!(ID_TOKEN);

	Reply::Status(200, body.to_string())
}

pub fn oauth_error(status: u16, error: &str, code: u32, description: &str) -> Reply {
	Reply::Status(
		status,
		json!({
			"error": error,
			"error_description":
				format!("AADSTS{code}: {description}\r\nTrace ID: t\r\nCorrelation ID: c"),
			"error_codes": [code],
		})
		.to_string(),
	)
}

pub fn build_authority(
	http: &ScriptedHttpClient,
	cache: &MemoryCache,
	user_agent: Arc<FakeUserAgent>,
) -> TestAuthority {
	AzureAuthority::with_http_client(
		AuthorityEndpoint::default(),
		Arc::new(cache.clone()),
		user_agent,
		http.clone(),
		DefaultTransportErrorMapper,
	)
}

pub fn cache_key(identity: Option<&str>) -> CacheKey {
	let key = CacheKey::new(AuthorityEndpoint::default().as_str(), TARGET_URI, CLIENT_ID, RESOURCE);

	match identity {
		Some(identity) => key.with_identity(identity),
		None => key,
	}
}

pub fn pair_expiring_at(
	access: &str,
	refresh: Option<&str>,
	expires_at: OffsetDateTime,
) -> TokenPair {
	let access = Token::new(TokenKind::Access, access)
		.expect("Access token fixture should be valid.")
		.with_expires_at(expires_at);
	let refresh = refresh.map(|value| {
		Token::new(TokenKind::Refresh, value).expect("Refresh token fixture should be valid.")
	});

	TokenPair::new(access, refresh).expect("Pair fixture should be valid.")
}

pub async fn seed(cache: &MemoryCache, key: CacheKey, pair: TokenPair) {
	cache.put(key, pair).await.expect("Failed to seed the memory cache.");
}
