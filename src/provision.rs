//! Credential-to-secret provisioning against the developer portal.
//!
//! [`KeyExchange`] logs in with an email/password pair, derives the caller IP from the session
//! token, reuses keys already bound to that IP, revokes this crate's keys bound elsewhere, and
//! creates whatever is still missing. The [`Authenticator`] trait is the seam the client facade
//! depends on, so tests and embedders can substitute their own secret source.

pub mod endpoints;
pub mod policy;

mod exchange;
mod metrics;
mod wire;

pub use endpoints::*;
pub use metrics::ExchangeMetrics;
pub use policy::*;

// self
use crate::{
	_prelude::*,
	auth::{ApiSecret, Credential},
	http::HttpTransport,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Strategy for turning portal credentials into API secrets.
///
/// Implementations must be safe to share across threads. The client facade calls
/// [`obtain_tokens`](Authenticator::obtain_tokens) once per login.
pub trait Authenticator
where
	Self: Send + Sync,
{
	/// Returns exactly `count` secrets (after clamping), or fails without a partial list.
	fn obtain_tokens(&self, credential: &Credential, count: usize) -> Result<Vec<ApiSecret>>;

	/// Returns a single secret; equivalent to `obtain_tokens(credential, 1)`.
	fn obtain_token(&self, credential: &Credential) -> Result<ApiSecret> {
		self.obtain_tokens(credential, 1)?
			.into_iter()
			.next()
			.ok_or_else(|| ProvisioningError::NoSecrets.into())
	}
}

/// Failures of a create-key call. Always fatal to the whole exchange.
#[derive(Debug, ThisError)]
pub enum ProvisioningError {
	/// The create-key endpoint answered with a non-success status.
	#[error("Create-key endpoint returned HTTP {status}: {body_preview}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body_preview: String,
	},
	/// The create-key response did not match either accepted shape.
	#[error("Create-key endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The create-key response parsed but carried no secret.
	#[error("Create-key response did not contain a key secret.")]
	MissingSecret,
	/// The create-key request body could not be serialized.
	#[error("Create-key request could not be serialized.")]
	RequestEncode(#[source] serde_json::Error),
	/// The transport failed before a response arrived.
	#[error("Network error occurred while creating a key.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// An authenticator returned an empty secret list.
	#[error("Authenticator returned no secrets.")]
	NoSecrets,
}

/// Developer-portal key exchange over an injected [`HttpTransport`].
///
/// The exchange holds no per-login state: every [`obtain_tokens`](Self::obtain_tokens) call is
/// self-contained. Key name and scope come from the [`KeyPolicy`] supplied at construction, so
/// independently configured exchanges can coexist in one process.
pub struct KeyExchange<T>
where
	T: ?Sized + HttpTransport,
{
	/// HTTP transport used for every portal request.
	pub transport: Arc<T>,
	/// Key naming/scoping policy.
	pub policy: KeyPolicy,
	/// Portal endpoint set.
	pub endpoints: PortalEndpoints,
	/// Shared counters describing how exchanges were satisfied.
	pub metrics: Arc<ExchangeMetrics>,
}
impl<T> KeyExchange<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates an exchange against the public developer portal.
	pub fn new(transport: impl Into<Arc<T>>, policy: KeyPolicy) -> Self {
		Self {
			transport: transport.into(),
			policy,
			endpoints: PortalEndpoints::default(),
			metrics: Default::default(),
		}
	}

	/// Points the exchange at a different portal (staging, mock server).
	pub fn with_endpoints(mut self, endpoints: PortalEndpoints) -> Self {
		self.endpoints = endpoints;

		self
	}

	/// Shares an existing counter set instead of the exchange's own.
	pub fn with_metrics(mut self, metrics: Arc<ExchangeMetrics>) -> Self {
		self.metrics = metrics;

		self
	}
}
#[cfg(feature = "reqwest")]
impl KeyExchange<ReqwestHttpClient> {
	/// Creates an exchange backed by the default cookie-aware reqwest transport.
	pub fn with_default_transport(policy: KeyPolicy) -> Result<Self> {
		Ok(Self::new(ReqwestHttpClient::new()?, policy))
	}
}
impl<T> Authenticator for KeyExchange<T>
where
	T: ?Sized + HttpTransport,
{
	fn obtain_tokens(&self, credential: &Credential, count: usize) -> Result<Vec<ApiSecret>> {
		KeyExchange::obtain_tokens(self, credential, count)
	}
}
impl<T> Clone for KeyExchange<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: Arc::clone(&self.transport),
			policy: self.policy.clone(),
			endpoints: self.endpoints.clone(),
			metrics: Arc::clone(&self.metrics),
		}
	}
}
impl<T> Debug for KeyExchange<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("KeyExchange")
			.field("policy", &self.policy)
			.field("endpoints", &self.endpoints)
			.finish()
	}
}
