//! Game-data client multiplexing a pool of API secrets behind one shared throttle.
//!
//! [`Client::login`] runs the configured [`Authenticator`] once, then publishes a
//! [`TokenPool`] and a [`RequestThrottle`] sized to `secrets × per_token_rate` requests per
//! second. Every resource call afterwards acquires the throttle, takes the next pooled secret,
//! and sends it as a bearer token. The pool/throttle pair is swapped in as one unit, so
//! concurrent callers never observe a half-initialized session.

pub mod config;
pub mod tag;

pub use config::*;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{ApiSecret, Credential},
	error::{ConfigError, TransportError},
	http::{HttpRequest, HttpResponse, HttpTransport, Method},
	pool::TokenPool,
	provision::{Authenticator, KeyExchange, ProvisioningError},
	throttle::{RequestThrottle, ThrottleInterrupt},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Thread-safe resource client; share it behind an `Arc` after login.
pub struct Client<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
	authenticator: Arc<dyn Authenticator>,
	api_base: Url,
	token_count: usize,
	per_token_rate: u32,
	session: RwLock<Option<Arc<Session>>>,
	interrupt: ThrottleInterrupt,
}
impl<T> Client<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a logged-out client using `authenticator` to obtain secrets.
	pub fn new(
		transport: impl Into<Arc<T>>,
		authenticator: Arc<dyn Authenticator>,
	) -> Result<Self> {
		let api_base = Url::parse(ClientConfig::DEFAULT_API_BASE)
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "api_base", source })?;

		Ok(Self {
			transport: transport.into(),
			authenticator,
			api_base,
			token_count: ClientConfig::DEFAULT_TOKEN_COUNT,
			per_token_rate: ClientConfig::DEFAULT_PER_TOKEN_RATE,
			session: RwLock::new(None),
			interrupt: ThrottleInterrupt::new(),
		})
	}

	/// Builds a client whose authenticator is a [`KeyExchange`] over the same transport.
	pub fn from_config(config: &ClientConfig, transport: impl Into<Arc<T>>) -> Result<Self> {
		let transport = transport.into();
		let exchange = KeyExchange::<T>::new(Arc::clone(&transport), config.key_policy()?)
			.with_endpoints(config.portal_endpoints()?);

		Ok(Self::new(transport, Arc::new(exchange))?
			.with_api_base(config.api_base_url()?)
			.with_token_count(config.token_count)
			.with_per_token_rate(config.per_token_rate))
	}

	/// Overrides the resource API root.
	pub fn with_api_base(mut self, api_base: Url) -> Self {
		self.api_base = api_base;

		self
	}

	/// Overrides how many secrets [`login`](Self::login) requests.
	pub fn with_token_count(mut self, token_count: usize) -> Self {
		self.token_count = token_count;

		self
	}

	/// Overrides the per-secret request rate used by [`login`](Self::login).
	pub fn with_per_token_rate(mut self, per_token_rate: u32) -> Self {
		self.per_token_rate = per_token_rate;

		self
	}

	/// Logs in with the configured token count and per-secret rate.
	pub fn login(&self, credential: &Credential) -> Result<()> {
		self.login_with(credential, self.token_count, self.per_token_rate)
	}

	/// Logs in, requesting `token_count` secrets each allowed `per_token_rate` requests/second.
	pub fn login_with(
		&self,
		credential: &Credential,
		token_count: usize,
		per_token_rate: u32,
	) -> Result<()> {
		let secrets = self.authenticator.obtain_tokens(credential, token_count)?;

		if secrets.is_empty() {
			return Err(ProvisioningError::NoSecrets.into());
		}

		self.install(secrets, per_token_rate)
	}

	/// Skips the authenticator and serves requests with pre-obtained secrets.
	pub fn login_with_tokens<I>(&self, secrets: I, per_token_rate: u32) -> Result<()>
	where
		I: IntoIterator,
		I::Item: Into<ApiSecret>,
	{
		self.install(secrets.into_iter().map(Into::into).collect(), per_token_rate)
	}

	fn install(&self, secrets: Vec<ApiSecret>, per_token_rate: u32) -> Result<()> {
		let pool = TokenPool::new(secrets).map_err(ConfigError::from)?;
		let total = u32::try_from(pool.len())
			.unwrap_or(u32::MAX)
			.saturating_mul(per_token_rate.max(1))
			.max(1);
		let throttle = RequestThrottle::per_second(total).map_err(ConfigError::from)?;

		*self.session.write() = Some(Arc::new(Session { pool, throttle }));

		Ok(())
	}

	/// Returns `true` once a login has succeeded.
	pub fn is_logged_in(&self) -> bool {
		self.session.read().is_some()
	}

	/// Returns the first pooled secret, if logged in.
	pub fn token(&self) -> Option<ApiSecret> {
		self.session.read().as_ref().map(|session| session.pool.first().clone())
	}

	/// Returns every pooled secret in rotation order, if logged in.
	pub fn tokens(&self) -> Option<Vec<ApiSecret>> {
		self.session.read().as_ref().map(|session| session.pool.secrets().to_vec())
	}

	/// Returns the handle that aborts callers blocked on the throttle.
	pub fn interrupt_handle(&self) -> ThrottleInterrupt {
		self.interrupt.clone()
	}

	/// Fetches the clan identified by `tag` (normalized with [`tag::correct_tag`]).
	pub fn clan(&self, tag: &str) -> Result<serde_json::Value> {
		self.get_json(&format!("/clans/{}", tag::path_tag(tag)))
	}

	/// Fetches the member list of the clan identified by `tag`.
	pub fn clan_members(&self, tag: &str) -> Result<serde_json::Value> {
		self.get_json(&format!("/clans/{}/members", tag::path_tag(tag)))
	}

	/// Fetches the player identified by `tag`.
	pub fn player(&self, tag: &str) -> Result<serde_json::Value> {
		self.get_json(&format!("/players/{}", tag::path_tag(tag)))
	}

	/// Checks an in-game API token against a player; `true` only when the API reports `ok`.
	pub fn verify_player_token(&self, tag: &str, token: &str) -> Result<bool> {
		let path = format!("/players/{}/verifytoken", tag::path_tag(tag));
		let response =
			self.call(Method::Post, &path, Some(&serde_json::json!({ "token": token })))?;
		let status = serde_json::from_slice::<serde_json::Value>(&response.body)
			.ok()
			.and_then(|body| body.get("status").and_then(|s| s.as_str()).map(str::to_owned));

		Ok(status.is_some_and(|status| status.eq_ignore_ascii_case("ok")))
	}

	/// Issues an authenticated `GET {api_base}{path}` and decodes the JSON body.
	pub fn get_json<R>(&self, path: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let response = self.call::<()>(Method::Get, path, None)?;

		decode(path, &response)
	}

	/// Issues an authenticated `POST {api_base}{path}` with a JSON body and decodes the reply.
	pub fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let response = self.call(Method::Post, path, Some(body))?;

		decode(path, &response)
	}

	fn call<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<HttpResponse>
	where
		B: ?Sized + Serialize,
	{
		let session = self.session.read().clone().ok_or(Error::NotLoggedIn)?;
		let url = self.resource_url(path)?;

		session.throttle.acquire_interruptible(&self.interrupt)?;

		let mut request = HttpRequest::new(method, url)
			.with_header("Accept", "application/json")
			.with_header("Authorization", session.pool.next().bearer());

		if let Some(body) = body {
			request = request.with_json(body).map_err(|source| TransportError::RequestEncode {
				endpoint: path.into(),
				source,
			})?;
		}

		let response =
			self.transport.execute(request).map_err(|e| TransportError::network(path, e))?;

		match response.status {
			404 => Err(Error::NotFound { resource: path.into() }),
			_ if !response.is_success() =>
				Err(TransportError::status(path, response.status, &response.body).into()),
			_ => Ok(response),
		}
	}

	fn resource_url(&self, path: &str) -> Result<Url> {
		let base = self.api_base.as_str().trim_end_matches('/');
		let path = path.trim_start_matches('/');

		Url::parse(&format!("{base}/{path}"))
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "resource", source }.into())
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestHttpClient> {
	/// Builds a client over the default cookie-aware reqwest transport.
	pub fn with_default_transport(config: &ClientConfig) -> Result<Self> {
		Self::from_config(config, ReqwestHttpClient::new()?)
	}
}
impl<T> Debug for Client<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("api_base", &self.api_base.as_str())
			.field("token_count", &self.token_count)
			.field("per_token_rate", &self.per_token_rate)
			.field("session", &self.session.read().as_deref())
			.finish()
	}
}

#[derive(Debug)]
struct Session {
	pool: TokenPool,
	throttle: RequestThrottle,
}

fn decode<R>(path: &str, response: &HttpResponse) -> Result<R>
where
	R: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(&response.body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
		TransportError::ResponseParse { endpoint: path.into(), source }.into()
	})
}
