//! Interactive user-agent collaborator used by the authorization-code flow.
//!
//! The authority client never drives a browser itself. It builds the authorization URL, hands
//! it to a [`UserAgentBridge`], and redeems whatever the bridge reports back.

// self
use crate::_prelude::*;

/// Future returned by [`UserAgentBridge::perform_interactive_auth`].
pub type UserAgentFuture<'a> =
	Pin<Box<dyn Future<Output = Result<AuthorizationOutcome, UserAgentError>> + 'a + Send>>;

/// Browser or embedded web view capable of completing an interactive authorization.
pub trait UserAgentBridge
where
	Self: Send + Sync,
{
	/// Navigates to `authorization_url` and waits until the user agent reaches `redirect_uri`
	/// (or the user gives up).
	fn perform_interactive_auth<'a>(
		&'a self,
		authorization_url: &'a Url,
		redirect_uri: &'a str,
	) -> UserAgentFuture<'a>;

	/// Tears down a pending interaction.
	///
	/// Called exactly once when the caller cancels or drops an in-flight interactive
	/// acquisition; never called after the interaction completed.
	fn abort(&self);
}

/// Result reported by the user agent once the interaction settles.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthorizationOutcome {
	/// Redirect carried an authorization code.
	Code {
		/// Authorization code to redeem.
		code: String,
		/// `state` echoed by the authority, if any.
		state: Option<String>,
	},
	/// User agent already redeemed the code and returned the raw token response body.
	Tokens(Vec<u8>),
	/// User closed the window or otherwise cancelled.
	Cancelled,
	/// Authority redirected with an OAuth error (consent denied, access denied, ...).
	Denied {
		/// OAuth `error` value.
		error: String,
		/// OAuth `error_description`, if present.
		description: Option<String>,
	},
}
impl Debug for AuthorizationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Code { state, .. } =>
				f.debug_struct("Code").field("code", &"<redacted>").field("state", state).finish(),
			Self::Tokens(raw) =>
				f.debug_tuple("Tokens").field(&format_args!("{} bytes", raw.len())).finish(),
			Self::Cancelled => f.write_str("Cancelled"),
			Self::Denied { error, description } => f
				.debug_struct("Denied")
				.field("error", error)
				.field("description", description)
				.finish(),
		}
	}
}

/// Failure inside the user agent itself (could not launch, crashed, ...).
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("User agent failed: {message}.")]
pub struct UserAgentError {
	/// Human-readable error payload.
	pub message: String,
}
impl UserAgentError {
	/// Wraps a message.
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn debug_redacts_authorization_codes() {
		let outcome =
			AuthorizationOutcome::Code { code: "0.AAAA-secret".into(), state: Some("s1".into()) };
		let rendered = format!("{outcome:?}");

		assert!(!rendered.contains("secret"));
		assert!(rendered.contains("s1"));
		assert_eq!(format!("{:?}", AuthorizationOutcome::Tokens(vec![0; 4])), "Tokens(4 bytes)");
	}
}
