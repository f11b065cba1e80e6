//! Transport primitives shared by the key exchange and the client facade.
//!
//! [`HttpTransport`] is the crate's only dependency on an HTTP stack: a synchronous
//! `execute(request) -> response` capability. Anything that can move bytes (a direct
//! socket client, an adapted async client, a test fake) can implement it. The default
//! [`ReqwestHttpClient`] wraps a blocking reqwest client with a cookie store, because the
//! developer portal keeps the login session in a cookie between `/api/login` and the key
//! management calls.

// std
#[cfg(feature = "reqwest")] use std::time::Duration as StdDuration;
// self
use crate::_prelude::*;

/// HTTP verbs used by the portal and resource endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical upper-case verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Transport-agnostic request handed to [`HttpTransport::execute`].
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
	/// HTTP verb.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Header name/value pairs in insertion order.
	pub headers: Vec<(String, String)>,
	/// Raw request body; empty for bodiless requests.
	pub body: Vec<u8>,
}
impl HttpRequest {
	/// Creates a bodiless request with no headers.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: Vec::new(), body: Vec::new() }
	}

	/// Appends a header, replacing any existing header with the same (case-insensitive) name.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		let name = name.into();

		self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
		self.headers.push((name, value.into()));

		self
	}

	/// Sets the raw request body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = body.into();

		self
	}

	/// Serializes `value` as the JSON body and sets `Content-Type` accordingly.
	pub fn with_json<T>(self, value: &T) -> Result<Self, serde_json::Error>
	where
		T: ?Sized + Serialize,
	{
		let body = serde_json::to_vec(value)?;

		Ok(self.with_header("Content-Type", "application/json").with_body(body))
	}

	/// Looks up a header value by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(existing, _)| existing.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}
impl Debug for HttpRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		// Header values and bodies may carry passwords or bearer secrets.
		let header_names = self.headers.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();

		f.debug_struct("HttpRequest")
			.field("method", &self.method)
			.field("url", &self.url.as_str())
			.field("headers", &header_names)
			.field("body_len", &self.body.len())
			.finish()
	}
}

/// Status code plus raw body returned by [`HttpTransport::execute`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Creates a response from a status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Synchronous HTTP capability used by every outbound call.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared (behind
/// `Arc`) by the key exchange and by every thread issuing resource calls. Errors are only for
/// failures that produced no HTTP response; non-success statuses are returned as ordinary
/// [`HttpResponse`] values and classified by the caller.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Executes `request` and blocks until a response (or transport failure) is available.
	fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::TransportError>;
}

/// Thin wrapper around a blocking [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The default client keeps cookies between calls and applies a 20 second connect timeout and
/// a 30 second request timeout. Configure any custom [`ReqwestClient`] with a cookie store as
/// well, otherwise key management calls made after login are rejected by the portal.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	const CONNECT_TIMEOUT: StdDuration = StdDuration::from_secs(20);
	const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);

	/// Builds the default cookie-aware blocking client.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder()
			.cookie_store(true)
			.connect_timeout(Self::CONNECT_TIMEOUT)
			.timeout(Self::REQUEST_TIMEOUT)
			.build()?;

		Ok(Self(client))
	}

	/// Wraps an existing blocking reqwest client.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::TransportError> {
		let method = match request.method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Delete => reqwest::Method::DELETE,
		};
		let mut builder = self.0.request(method, request.url);

		for (name, value) in request.headers {
			builder = builder.header(name, value);
		}

		let response = builder.body(request.body).send()?;
		let status = response.status().as_u16();
		let body = response.bytes()?.to_vec();

		Ok(HttpResponse { status, body })
	}
}
