//! Serde-friendly client configuration.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	error::ConfigError,
	provision::{KeyPolicy, PortalEndpoints},
};

/// Everything needed to build and log in a [`Client`](crate::client::Client), typically loaded from a config file.
///
/// Only `email` and `password` are required; every other field falls back to the documented
/// default.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Developer-portal account email.
	pub email: String,
	/// Developer-portal account password.
	pub password: String,
	/// Secrets requested at login (clamped into `1..=10`).
	#[serde(default = "default_token_count")]
	pub token_count: usize,
	/// Requests per second granted to each secret.
	#[serde(default = "default_per_token_rate")]
	pub per_token_rate: u32,
	/// Name stamped on provisioned keys.
	#[serde(default = "default_key_name")]
	pub key_name: String,
	/// Scope requested for provisioned keys.
	#[serde(default = "default_key_scope")]
	pub key_scope: String,
	/// Fixed caller IP bound to created keys.
	#[serde(default)]
	pub ip_override: Option<String>,
	/// Resource API root.
	#[serde(default = "default_api_base")]
	pub api_base: String,
	/// Developer portal root.
	#[serde(default = "default_portal_base")]
	pub portal_base: String,
}
impl ClientConfig {
	/// Public game-data API root.
	pub const DEFAULT_API_BASE: &'static str = "https://api.clashofclans.com/v1";
	/// Secrets requested at login unless overridden.
	pub const DEFAULT_TOKEN_COUNT: usize = 1;
	/// Requests per second granted to each pooled secret unless overridden.
	pub const DEFAULT_PER_TOKEN_RATE: u32 = 10;

	/// Creates a configuration with defaults for everything but the credentials.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self {
			email: email.into(),
			password: password.into(),
			token_count: default_token_count(),
			per_token_rate: default_per_token_rate(),
			key_name: default_key_name(),
			key_scope: default_key_scope(),
			ip_override: None,
			api_base: default_api_base(),
			portal_base: default_portal_base(),
		}
	}

	/// Returns the login credential.
	pub fn credential(&self) -> Credential {
		Credential::new(&self.email, &self.password)
	}

	/// Validates the key name/scope and produces the exchange policy.
	pub fn key_policy(&self) -> Result<KeyPolicy, ConfigError> {
		let mut builder = KeyPolicy::builder().name(&self.key_name).scope(&self.key_scope);

		if let Some(ip) = &self.ip_override {
			builder = builder.ip_override(ip);
		}

		Ok(builder.build()?)
	}

	/// Resolves the portal endpoints.
	pub fn portal_endpoints(&self) -> Result<PortalEndpoints, ConfigError> {
		PortalEndpoints::parse(&self.portal_base)
	}

	/// Parses the resource API root.
	pub fn api_base_url(&self) -> Result<Url, ConfigError> {
		Url::parse(&self.api_base)
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "api_base", source })
	}
}
impl Debug for ClientConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientConfig")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.field("token_count", &self.token_count)
			.field("per_token_rate", &self.per_token_rate)
			.field("key_name", &self.key_name)
			.field("key_scope", &self.key_scope)
			.field("ip_override", &self.ip_override)
			.field("api_base", &self.api_base)
			.field("portal_base", &self.portal_base)
			.finish()
	}
}

fn default_token_count() -> usize {
	ClientConfig::DEFAULT_TOKEN_COUNT
}

fn default_per_token_rate() -> u32 {
	ClientConfig::DEFAULT_PER_TOKEN_RATE
}

fn default_key_name() -> String {
	KeyPolicy::DEFAULT_NAME.into()
}

fn default_key_scope() -> String {
	KeyPolicy::DEFAULT_SCOPE.into()
}

fn default_api_base() -> String {
	ClientConfig::DEFAULT_API_BASE.into()
}

fn default_portal_base() -> String {
	PortalEndpoints::DEFAULT_BASE.into()
}
