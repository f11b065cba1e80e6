//! Server-side API keys as listed by the developer portal.

// crates.io
use serde::Deserializer;
// self
use crate::{
	_prelude::*,
	auth::{ApiSecret, KeyName},
};

/// One entry of the portal's `/api/apikey/list` response.
///
/// Every field is optional on the wire; absent or `null` values decode to empty defaults so a
/// single odd entry never fails the whole listing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteKey {
	/// Portal identifier used by the revoke endpoint.
	#[serde(default, deserialize_with = "null_as_default")]
	pub id: String,
	/// Key name chosen at creation time.
	#[serde(default, deserialize_with = "null_as_default")]
	pub name: String,
	/// Free-form description.
	#[serde(default)]
	pub description: Option<String>,
	/// CIDR ranges the key may be used from.
	#[serde(default, deserialize_with = "null_as_default")]
	pub cidr_ranges: Vec<String>,
	/// Access scopes granted to the key.
	#[serde(default, deserialize_with = "null_as_default")]
	pub scopes: Vec<String>,
	/// Bearer secret.
	#[serde(default, rename = "key")]
	pub secret: Option<ApiSecret>,
}
impl RemoteKey {
	/// Returns `true` when the key carries exactly the configured name.
	pub fn is_named(&self, name: &KeyName) -> bool {
		self.name == name.as_ref()
	}

	/// Returns `true` when any CIDR range is textually prefixed by `ip`.
	pub fn allows_ip(&self, ip: &str) -> bool {
		self.cidr_ranges.iter().any(|cidr| cidr.starts_with(ip))
	}

	/// Returns `true` when the key is one of ours and usable from `ip`.
	pub fn matches(&self, name: &KeyName, ip: &str) -> bool {
		self.is_named(name) && self.allows_ip(ip)
	}

	/// Returns `true` when the key is one of ours but bound to another address.
	pub fn is_stale(&self, name: &KeyName, ip: &str) -> bool {
		self.is_named(name) && !self.allows_ip(ip)
	}
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
