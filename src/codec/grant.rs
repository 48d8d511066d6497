// self
use crate::_prelude::*;

/// OAuth 2.0 grant types the authority client can redeem at the token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Authorization code returned by the interactive user agent.
	AuthorizationCode,
	/// Refresh token previously issued by the authority.
	RefreshToken,
	/// Resource-owner password credentials.
	Password,
	/// SAML 1.1 bearer assertion for the ambient identity.
	Saml11Bearer,
	/// SAML 2.0 bearer assertion for the ambient identity.
	Saml20Bearer,
	/// JWT bearer assertion for the ambient identity.
	JwtBearer,
}
impl GrantType {
	/// Returns the `grant_type` wire identifier.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
			GrantType::Password => "password",
			GrantType::Saml11Bearer => "urn:ietf:params:oauth:grant-type:saml1_1-bearer",
			GrantType::Saml20Bearer => "urn:ietf:params:oauth:grant-type:saml2-bearer",
			GrantType::JwtBearer => "urn:ietf:params:oauth:grant-type:jwt-bearer",
		}
	}

	/// Returns a short label suitable for error messages and span fields.
	pub const fn label(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
			GrantType::Password => "password",
			GrantType::Saml11Bearer => "saml1_1_bearer",
			GrantType::Saml20Bearer => "saml2_bearer",
			GrantType::JwtBearer => "jwt_bearer",
		}
	}

	/// Form parameters that must be present and non-empty for this grant.
	pub const fn required_parameters(self) -> &'static [&'static str] {
		match self {
			GrantType::AuthorizationCode => &["client_id", "resource", "code", "redirect_uri"],
			GrantType::RefreshToken => &["client_id", "resource", "refresh_token"],
			GrantType::Password => &["client_id", "resource", "username", "password"],
			GrantType::Saml11Bearer | GrantType::Saml20Bearer | GrantType::JwtBearer =>
				&["client_id", "resource", "assertion"],
		}
	}

	/// Returns `true` when the grant presents user credentials or an identity assertion.
	pub const fn presents_user_credentials(self) -> bool {
		matches!(
			self,
			GrantType::Password
				| GrantType::Saml11Bearer
				| GrantType::Saml20Bearer
				| GrantType::JwtBearer
		)
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.label())
	}
}
