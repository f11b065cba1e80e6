//! Developer-portal endpoint set.

// self
use crate::{_prelude::*, error::ConfigError};

/// Absolute URLs of the four portal calls the key exchange makes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalEndpoints {
	/// `POST` email/password login.
	pub login: Url,
	/// `POST` list of the account's keys.
	pub list: Url,
	/// `POST` revoke one key by id.
	pub revoke: Url,
	/// `POST` create one key.
	pub create: Url,
}
impl PortalEndpoints {
	/// Public developer portal.
	pub const DEFAULT_BASE: &'static str = "https://developer.clashofclans.com";

	/// Resolves every endpoint against `base` (for example a staging host or mock server).
	pub fn from_base(base: &Url) -> Result<Self, ConfigError> {
		let mut base = base.clone();

		if !base.path().ends_with('/') {
			let path = format!("{}/", base.path());

			base.set_path(&path);
		}

		let join = |endpoint: &'static str, path: &str| {
			base.join(path).map_err(|source| ConfigError::InvalidEndpoint { endpoint, source })
		};

		Ok(Self {
			login: join("login", "api/login")?,
			list: join("list_keys", "api/apikey/list")?,
			revoke: join("revoke_key", "api/apikey/revoke")?,
			create: join("create_key", "api/apikey/create")?,
		})
	}

	/// Parses `base` and resolves every endpoint against it.
	pub fn parse(base: &str) -> Result<Self, ConfigError> {
		let url = Url::parse(base)
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "portal_base", source })?;

		Self::from_base(&url)
	}
}
impl Default for PortalEndpoints {
	fn default() -> Self {
		Self::parse(Self::DEFAULT_BASE).expect("Built-in portal base URL must resolve.")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn default_endpoints_point_at_public_portal() {
		let endpoints = PortalEndpoints::default();

		assert_eq!(endpoints.login.as_str(), "https://developer.clashofclans.com/api/login");
		assert_eq!(endpoints.list.as_str(), "https://developer.clashofclans.com/api/apikey/list");
		assert_eq!(
			endpoints.revoke.as_str(),
			"https://developer.clashofclans.com/api/apikey/revoke"
		);
		assert_eq!(
			endpoints.create.as_str(),
			"https://developer.clashofclans.com/api/apikey/create"
		);
	}

	#[test]
	fn base_paths_are_preserved() {
		let endpoints = PortalEndpoints::parse("http://127.0.0.1:8080/portal")
			.expect("Mock base should resolve.");

		assert_eq!(endpoints.login.as_str(), "http://127.0.0.1:8080/portal/api/login");
	}

	#[test]
	fn invalid_bases_are_reported() {
		let err = PortalEndpoints::parse("not a url").expect_err("Garbage base must fail.");

		assert!(matches!(err, ConfigError::InvalidEndpoint { endpoint: "portal_base", .. }));
	}
}
