//! Naming and scoping policy applied to keys the exchange provisions.

// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, KeyName, KeyScope},
};

/// Key policy shared by every exchange built from it.
///
/// `name` is how the exchange recognizes its own keys: matching, reuse, and revocation only ever
/// consider keys carrying exactly this name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPolicy {
	/// Name stamped on created keys.
	pub name: KeyName,
	/// Access scope requested for created keys.
	pub scope: KeyScope,
	/// Fixed caller IP; when set, the session token is not decoded.
	#[serde(default)]
	pub ip_override: Option<String>,
}
impl KeyPolicy {
	/// Upper bound on keys the portal allows per account.
	pub const MAX_KEYS: usize = 10;
	/// Key name used when none is configured.
	pub const DEFAULT_NAME: &'static str = "Created with coc-broker";
	/// Key scope used when none is configured.
	pub const DEFAULT_SCOPE: &'static str = "clash";

	/// Creates a policy with an explicit name and scope.
	pub fn new(name: KeyName, scope: KeyScope) -> Self {
		Self { name, scope, ip_override: None }
	}

	/// Starts a builder seeded with the defaults.
	pub fn builder() -> KeyPolicyBuilder {
		KeyPolicyBuilder::default()
	}

	/// Pins the caller IP instead of deriving it from the login session.
	///
	/// Blank values clear the override.
	pub fn with_ip_override(mut self, ip: impl Into<String>) -> Self {
		self.ip_override = normalize_ip(ip.into());

		self
	}

	/// Returns the trimmed IP override, ignoring blank values that bypassed the builder.
	pub fn fixed_ip(&self) -> Option<&str> {
		self.ip_override.as_deref().map(str::trim).filter(|ip| !ip.is_empty())
	}

	/// Clamps a requested key count into `1..=MAX_KEYS`.
	pub fn clamp_count(count: usize) -> usize {
		count.clamp(1, Self::MAX_KEYS)
	}
}
impl Default for KeyPolicy {
	fn default() -> Self {
		Self::new(KeyName::from_static(Self::DEFAULT_NAME), KeyScope::from_static(Self::DEFAULT_SCOPE))
	}
}

/// Builder for [`KeyPolicy`] values taking unvalidated strings.
#[derive(Clone, Debug, Default)]
pub struct KeyPolicyBuilder {
	name: Option<String>,
	scope: Option<String>,
	ip_override: Option<String>,
}
impl KeyPolicyBuilder {
	/// Sets the key name.
	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());

		self
	}

	/// Sets the key scope.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Pins the caller IP.
	pub fn ip_override(mut self, ip: impl Into<String>) -> Self {
		self.ip_override = Some(ip.into());

		self
	}

	/// Validates the identifiers and produces the policy.
	pub fn build(self) -> Result<KeyPolicy, IdentifierError> {
		let name = match self.name {
			Some(name) => KeyName::new(name)?,
			None => KeyName::from_static(KeyPolicy::DEFAULT_NAME),
		};
		let scope = match self.scope {
			Some(scope) => KeyScope::new(scope)?,
			None => KeyScope::from_static(KeyPolicy::DEFAULT_SCOPE),
		};
		let ip_override = self.ip_override.and_then(normalize_ip);

		Ok(KeyPolicy { name, scope, ip_override })
	}
}

fn normalize_ip(ip: String) -> Option<String> {
	let trimmed = ip.trim();

	if trimmed.is_empty() { None } else { Some(trimmed.to_owned()) }
}
