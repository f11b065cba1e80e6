//! Crate-level error types shared by the key exchange, the throttle, and the client facade.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Non-success status, unreadable body, or network failure on a remote call.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The login session token could not be turned into a caller IP.
	#[error(transparent)]
	MalformedSessionToken(#[from] crate::auth::SessionTokenError),
	/// A create-key call failed; no partial secret list is returned.
	#[error(transparent)]
	KeyProvisioning(#[from] crate::provision::ProvisioningError),

	/// The developer portal rejected the email/password pair.
	#[error("Developer portal rejected the supplied credentials.")]
	InvalidCredentials,
	/// The caller was interrupted while waiting for throttle capacity.
	#[error("Interrupted while waiting for request throttle capacity.")]
	ThrottleInterrupted,
	/// A resource call was made before a successful login.
	#[error("Client is not logged in.")]
	NotLoggedIn,
	/// The resource endpoint answered 404.
	#[error("Resource not found: {resource}.")]
	NotFound {
		/// Resource label (tag, path) that could not be found.
		resource: String,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// An endpoint URL could not be resolved against its base.
	#[error("Endpoint `{endpoint}` could not be resolved.")]
	InvalidEndpoint {
		/// Endpoint label.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Throttle parameters are out of range.
	#[error(transparent)]
	Throttle(#[from] crate::throttle::ThrottleConfigError),
	/// Token pool could not be built.
	#[error(transparent)]
	Pool(#[from] crate::pool::PoolError),
	/// Key name or scope failed validation.
	#[error(transparent)]
	Identifier(#[from] crate::auth::IdentifierError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (status, body, network).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Remote endpoint answered with a non-success status.
	#[error("The {endpoint} endpoint returned HTTP {status}: {body_preview}.")]
	Status {
		/// Endpoint label (`login`, `list_keys`, resource path).
		endpoint: String,
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body_preview: String,
	},
	/// Remote endpoint answered with JSON that does not match the expected shape.
	#[error("The {endpoint} endpoint returned malformed JSON.")]
	ResponseParse {
		/// Endpoint label.
		endpoint: String,
		/// Structured parsing failure, including the offending field path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Request body could not be serialized.
	#[error("Request body for the {endpoint} endpoint could not be serialized.")]
	RequestEncode {
		/// Endpoint label.
		endpoint: String,
		/// Serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Endpoint label.
		endpoint: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Wraps a transport-specific network error.
	pub fn network(
		endpoint: impl Into<String>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { endpoint: endpoint.into(), source: Box::new(src) }
	}

	/// Builds a status failure, keeping a bounded preview of the response body.
	pub fn status(endpoint: impl Into<String>, status: u16, body: &[u8]) -> Self {
		Self::Status { endpoint: endpoint.into(), status, body_preview: preview(body) }
	}

	/// Returns the HTTP status code when the failure came from a response.
	pub fn http_status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			_ => None,
		}
	}
}

pub(crate) fn preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	if text.chars().count() <= TransportError::BODY_PREVIEW_LIMIT {
		return text.into_owned();
	}

	text.chars().take(TransportError::BODY_PREVIEW_LIMIT).collect()
}
