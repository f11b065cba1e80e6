//! Login → derive IP → list → reconcile → create.
//!
//! A single pass with no retries. Reused keys come first in listed order, created keys are
//! appended in creation order, and the caller gets exactly the clamped count or an error.
//! Only the reconciliation step tolerates failure: a stale key that cannot be revoked merely
//! occupies one of the account's slots until the next exchange.

// crates.io
use time::macros::format_description;
// self
use crate::{
	_prelude::*,
	auth::{ApiSecret, Credential, RemoteKey, SessionToken, SessionTokenError},
	error::TransportError,
	http::{HttpRequest, HttpResponse, HttpTransport, Method},
	obs::{self, ExchangeSpan, ExchangeStage, StageOutcome},
	provision::{
		KeyExchange, KeyPolicy, ProvisioningError,
		wire::{
			self, CreateKeyRequest, CreateKeyResponse, ListKeysResponse, LoginResponse,
			RevokeKeyRequest,
		},
	},
};

impl<T> KeyExchange<T>
where
	T: ?Sized + HttpTransport,
{
	/// Exchanges `credential` for exactly `count` API secrets bound to the caller's IP.
	///
	/// `count` is clamped into `1..=`[`KeyPolicy::MAX_KEYS`] before any request is sent.
	pub fn obtain_tokens(&self, credential: &Credential, count: usize) -> Result<Vec<ApiSecret>> {
		let needed = KeyPolicy::clamp_count(count);

		self.stage(ExchangeStage::Exchange, || self.run(credential, needed))
	}

	fn run(&self, credential: &Credential, needed: usize) -> Result<Vec<ApiSecret>> {
		let session = self.stage(ExchangeStage::Login, || self.login(credential))?;
		let ip = self.stage(ExchangeStage::DeriveIp, || self.caller_ip(session))?;
		let keys = self.stage(ExchangeStage::ListKeys, || self.list_keys())?;
		let mut secrets = keys
			.into_iter()
			.filter(|key| key.matches(&self.policy.name, &ip))
			.filter_map(|key| key.secret)
			.take(needed)
			.collect::<Vec<_>>();
		let reused = secrets.len();

		if reused == needed {
			self.finish(reused, 0, 0);

			return Ok(secrets);
		}

		let revoked = self.reconcile(&ip);

		self.stage(ExchangeStage::Create, || {
			while secrets.len() < needed {
				secrets.push(self.create_key(&ip)?);
			}

			Ok(())
		})?;
		self.finish(reused, needed - reused, revoked);

		Ok(secrets)
	}

	fn login(&self, credential: &Credential) -> Result<Option<SessionToken>> {
		const ENDPOINT: &str = "login";

		let request = self.json_request(ENDPOINT, self.endpoints.login.clone(), credential)?;
		let response = self.send(ENDPOINT, request)?;

		match response.status {
			401 | 403 => return Err(Error::InvalidCredentials),
			_ if !response.is_success() =>
				return Err(TransportError::status(ENDPOINT, response.status, &response.body).into()),
			_ => (),
		}

		let body = wire::decode::<LoginResponse>(&response.body).map_err(|source| {
			TransportError::ResponseParse { endpoint: ENDPOINT.into(), source }
		})?;

		Ok(body.temporary_api_token.filter(|token| !token.is_empty()).map(SessionToken::new))
	}

	fn caller_ip(&self, session: Option<SessionToken>) -> Result<String> {
		if let Some(ip) = self.policy.fixed_ip() {
			return Ok(ip.to_owned());
		}

		let session = session.ok_or(SessionTokenError::Missing)?;

		Ok(session.caller_ip()?)
	}

	fn list_keys(&self) -> Result<Vec<RemoteKey>> {
		const ENDPOINT: &str = "list_keys";

		let request = HttpRequest::new(Method::Post, self.endpoints.list.clone())
			.with_header("Accept", "application/json");
		let response = self.send(ENDPOINT, request)?;

		if !response.is_success() {
			return Err(TransportError::status(ENDPOINT, response.status, &response.body).into());
		}

		let body = wire::decode::<ListKeysResponse>(&response.body).map_err(|source| {
			TransportError::ResponseParse { endpoint: ENDPOINT.into(), source }
		})?;

		Ok(body.keys)
	}

	// Revokes keys carrying our name that are bound elsewhere; returns how many were revoked.
	fn reconcile(&self, ip: &str) -> usize {
		let _span = ExchangeSpan::new(ExchangeStage::Reconcile).entered();

		obs::record_stage_outcome(ExchangeStage::Reconcile, StageOutcome::Attempt);

		let keys = match self.list_keys() {
			Ok(keys) => keys,
			Err(e) => {
				self.swallow(None, &e);

				return 0;
			},
		};
		let mut revoked = 0;

		for key in keys.iter().filter(|key| key.is_stale(&self.policy.name, ip)) {
			if key.id.is_empty() {
				continue;
			}

			match self.revoke_key(&key.id) {
				Ok(()) => revoked += 1,
				Err(e) => self.swallow(Some(&key.id), &e),
			}
		}

		obs::record_stage_outcome(ExchangeStage::Reconcile, StageOutcome::Success);

		revoked
	}

	fn revoke_key(&self, id: &str) -> Result<()> {
		const ENDPOINT: &str = "revoke_key";

		let request =
			self.json_request(ENDPOINT, self.endpoints.revoke.clone(), &RevokeKeyRequest { id })?;
		let response = self.send(ENDPOINT, request)?;

		if !response.is_success() {
			return Err(TransportError::status(ENDPOINT, response.status, &response.body).into());
		}

		Ok(())
	}

	fn create_key(&self, ip: &str) -> Result<ApiSecret, ProvisioningError> {
		let description = key_description(OffsetDateTime::now_utc());
		let body = CreateKeyRequest {
			name: &self.policy.name,
			description: &description,
			cidr_ranges: [ip],
			scopes: [&self.policy.scope],
		};
		let request = HttpRequest::new(Method::Post, self.endpoints.create.clone())
			.with_header("Accept", "application/json")
			.with_json(&body)
			.map_err(ProvisioningError::RequestEncode)?;
		let response = self
			.transport
			.execute(request)
			.map_err(|e| ProvisioningError::Network { source: Box::new(e) })?;

		if !response.is_success() {
			return Err(ProvisioningError::Status {
				status: response.status,
				body_preview: crate::error::preview(&response.body),
			});
		}

		wire::decode::<CreateKeyResponse>(&response.body)
			.map_err(|source| ProvisioningError::ResponseParse { source })?
			.into_secret()
			.ok_or(ProvisioningError::MissingSecret)
	}

	fn json_request<B>(&self, endpoint: &'static str, url: Url, body: &B) -> Result<HttpRequest>
	where
		B: ?Sized + Serialize,
	{
		HttpRequest::new(Method::Post, url)
			.with_header("Accept", "application/json")
			.with_json(body)
			.map_err(|source| TransportError::RequestEncode { endpoint: endpoint.into(), source }.into())
	}

	fn send(&self, endpoint: &'static str, request: HttpRequest) -> Result<HttpResponse> {
		self.transport.execute(request).map_err(|e| TransportError::network(endpoint, e).into())
	}

	fn stage<R>(&self, stage: ExchangeStage, f: impl FnOnce() -> Result<R>) -> Result<R> {
		let _span = ExchangeSpan::new(stage).entered();

		obs::record_stage_outcome(stage, StageOutcome::Attempt);

		let result = f();

		match &result {
			Ok(_) => obs::record_stage_outcome(stage, StageOutcome::Success),
			Err(_) => obs::record_stage_outcome(stage, StageOutcome::Failure),
		}

		result
	}

	fn swallow(&self, key_id: Option<&str>, error: &Error) {
		self.metrics.record_revoke_failure();
		obs::record_stage_outcome(ExchangeStage::Reconcile, StageOutcome::Failure);
		obs::warn_swallowed(ExchangeStage::Reconcile, key_id, error);
	}

	fn finish(&self, reused: usize, created: usize, revoked: usize) {
		self.metrics.record_exchange(reused, created, revoked);
		obs::note_exchange_result(reused, created, revoked);
	}
}

fn key_description(now: OffsetDateTime) -> String {
	let stamp = now
		.format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
		.unwrap_or_else(|_| now.unix_timestamp().to_string());

	format!("Created on {stamp} UTC")
}
