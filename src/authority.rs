//! Authority endpoint configuration.
//!
//! An [`AuthorityEndpoint`] is validated once, when the authority client is built, and is
//! immutable afterwards. The OAuth endpoints are derived from it by appending
//! `oauth2/authorize` and `oauth2/token` to the authority path.

// self
use crate::{_prelude::*, auth::TenantId, error::ArgumentError, uri};

/// Base URL for Azure AD logon services.
pub const AUTHORITY_HOST_URL_BASE: &str = "https://login.microsoftonline.com";
/// Multi-tenant authority used when no tenant is configured.
pub const DEFAULT_AUTHORITY_HOST_URL: &str = "https://login.microsoftonline.com/common";

/// Returns the authority URL for a tenant: `AUTHORITY_HOST_URL_BASE + "/" + tenant_id`.
pub fn authority_url(tenant_id: &str) -> Result<String> {
	let tenant = TenantId::new(tenant_id)?;

	Ok(format!("{AUTHORITY_HOST_URL_BASE}/{tenant}"))
}

/// Validated authority URL (host plus tenant or `common` path segment).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuthorityEndpoint(Url);
impl AuthorityEndpoint {
	/// Parses an authority URL, failing with [`ArgumentError::InvalidAuthorityUrl`] when the
	/// string is not a well-formed URI.
	pub fn parse(value: &str) -> Result<Self> {
		if !uri::is_well_formed_uri(value) {
			return Err(ArgumentError::InvalidAuthorityUrl { value: value.to_owned() }.into());
		}

		let url = Url::parse(value)
			.map_err(|_| ArgumentError::InvalidAuthorityUrl { value: value.to_owned() })?;

		Ok(Self(url))
	}

	/// Authority for a specific tenant under [`AUTHORITY_HOST_URL_BASE`].
	pub fn for_tenant(tenant: &TenantId) -> Result<Self> {
		Self::parse(&format!("{AUTHORITY_HOST_URL_BASE}/{tenant}"))
	}

	/// Authority URL as configured.
	pub fn url(&self) -> &Url {
		&self.0
	}

	/// Authority URL without a trailing slash, used for cache partitioning.
	pub fn as_str(&self) -> &str {
		self.0.as_str().trim_end_matches('/')
	}

	/// `<authority>/oauth2/authorize`.
	pub fn authorize_endpoint(&self) -> Result<Url> {
		self.endpoint("authorize")
	}

	/// `<authority>/oauth2/token`.
	pub fn token_endpoint(&self) -> Result<Url> {
		self.endpoint("token")
	}

	fn endpoint(&self, leaf: &str) -> Result<Url> {
		let mut url = self.0.clone();

		url.set_query(None);
		url.set_fragment(None);
		url.path_segments_mut()
			.map_err(|_| ArgumentError::UnusableAuthorityUrl { value: self.0.to_string() })?
			.pop_if_empty()
			.extend(["oauth2", leaf]);

		Ok(url)
	}
}
impl Default for AuthorityEndpoint {
	fn default() -> Self {
		// Constant literal; parsing cannot fail.
		Self(Url::parse(DEFAULT_AUTHORITY_HOST_URL).expect("Default authority URL must parse."))
	}
}
impl Debug for AuthorityEndpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "AuthorityEndpoint({})", self.as_str())
	}
}
impl Display for AuthorityEndpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for AuthorityEndpoint {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
impl TryFrom<String> for AuthorityEndpoint {
	type Error = Error;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}
impl From<AuthorityEndpoint> for String {
	fn from(value: AuthorityEndpoint) -> Self {
		value.as_str().to_owned()
	}
}
