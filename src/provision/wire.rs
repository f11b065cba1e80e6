// Portal request/response bodies.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{ApiSecret, RemoteKey, key::null_as_default},
};

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
	#[serde(default, rename = "temporaryAPIToken")]
	pub temporary_api_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListKeysResponse {
	#[serde(default, deserialize_with = "null_as_default")]
	pub keys: Vec<RemoteKey>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RevokeKeyRequest<'a> {
	pub id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateKeyRequest<'a> {
	pub name: &'a str,
	pub description: &'a str,
	pub cidr_ranges: [&'a str; 1],
	pub scopes: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateKeyResponse {
	#[serde(default)]
	key: Option<serde_json::Value>,
}
impl CreateKeyResponse {
	/// Accepts `{"key":{"key":"…"}}` as well as `{"key":"…"}`.
	pub fn into_secret(self) -> Option<ApiSecret> {
		let secret = match self.key? {
			serde_json::Value::String(secret) => secret,
			serde_json::Value::Object(mut nested) => match nested.remove("key")? {
				serde_json::Value::String(secret) => secret,
				_ => return None,
			},
			_ => return None,
		};

		Some(ApiSecret::new(secret))
	}
}

pub(crate) fn decode<T>(body: &[u8]) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
}
