//! Short-lived portal session tokens and caller-IP derivation.
//!
//! `/api/login` answers with a `temporaryAPIToken`: three dot-separated segments whose middle
//! segment is base64-encoded JSON. The portal records the caller's address at
//! `limits[1].cidrs[0]` (for example `1.2.3.4/32`). The key exchange reads it once to decide
//! which existing keys are usable from this machine and which CIDR new keys must be bound to.

// crates.io
use base64::{
	Engine,
	engine::general_purpose::{STANDARD, URL_SAFE},
};
// self
use crate::_prelude::*;

/// Failures raised while turning a session token into a caller IP.
#[derive(Debug, ThisError)]
pub enum SessionTokenError {
	/// The login response carried no `temporaryAPIToken`.
	#[error("Login response is missing the temporary API token.")]
	Missing,
	/// The token had fewer than two dot-separated segments.
	#[error("Session token has {segments} segment(s); at least 2 are required.")]
	TooFewSegments {
		/// Number of segments found.
		segments: usize,
	},
	/// The payload segment is not valid base64.
	#[error("Session token payload is not valid base64.")]
	Base64(#[source] base64::DecodeError),
	/// The decoded payload is not valid JSON.
	#[error("Session token payload is not valid JSON.")]
	Json(#[source] serde_json::Error),
	/// The payload holds no CIDR at `limits[1].cidrs[0]`.
	#[error("Session token payload does not carry a caller CIDR.")]
	MissingCidr,
}

/// Temporary portal token returned by `/api/login`; used once, then dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);
impl SessionToken {
	const CIDR_POINTER: &'static str = "/limits/1/cidrs/0";

	/// Wraps a raw token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw token. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Decodes the payload and returns the bare caller IP (the CIDR with its mask removed).
	pub fn caller_ip(&self) -> Result<String, SessionTokenError> {
		let cidr = self.caller_cidr()?;
		let ip = cidr.split_once('/').map_or(cidr.as_str(), |(ip, _)| ip);

		Ok(ip.to_owned())
	}

	/// Decodes the payload and returns the raw CIDR string recorded by the portal.
	pub fn caller_cidr(&self) -> Result<String, SessionTokenError> {
		let payload = self.payload()?;

		payload
			.pointer(Self::CIDR_POINTER)
			.and_then(serde_json::Value::as_str)
			.map(str::trim)
			.filter(|cidr| !cidr.is_empty())
			.map(str::to_owned)
			.ok_or(SessionTokenError::MissingCidr)
	}

	fn payload(&self) -> Result<serde_json::Value, SessionTokenError> {
		let segments = self.0.split('.').collect::<Vec<_>>();

		if segments.len() < 2 {
			return Err(SessionTokenError::TooFewSegments { segments: segments.len() });
		}

		let bytes = decode_segment(segments[1])?;

		serde_json::from_slice(&bytes).map_err(SessionTokenError::Json)
	}
}
impl Debug for SessionToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SessionToken").field(&"<redacted>").finish()
	}
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, SessionTokenError> {
	let mut padded = segment.trim_end_matches('=').to_owned();

	padded.extend(std::iter::repeat_n('=', (4 - padded.len() % 4) % 4));

	// Accept both alphabets; JWT payloads are nominally base64url.
	STANDARD
		.decode(&padded)
		.or_else(|_| URL_SAFE.decode(&padded))
		.map_err(SessionTokenError::Base64)
}
