// std
use std::{
	thread,
	time::{Duration, Instant},
};
// self
use coc_broker::{
	_preludet::*,
	auth::{ApiSecret, Credential},
	client::{Client, ClientConfig},
	error::TransportError,
	http::{HttpRequest, HttpResponse, HttpTransport, Method},
	provision::Authenticator,
};

#[derive(Debug, ThisError)]
#[error("Fake API is unreachable.")]
struct Unreachable;

// Answers every request with a fixed status/body and records what it saw.
struct FakeApi {
	status: u16,
	body: String,
	seen: Mutex<Vec<HttpRequest>>,
}
impl FakeApi {
	fn new(status: u16, body: impl Into<String>) -> Arc<Self> {
		Arc::new(Self { status, body: body.into(), seen: Mutex::new(Vec::new()) })
	}

	fn authorizations(&self) -> Vec<String> {
		self.seen
			.lock()
			.iter()
			.filter_map(|request| request.header("Authorization").map(str::to_owned))
			.collect()
	}

	fn last(&self) -> HttpRequest {
		self.seen.lock().last().cloned().expect("At least one request should have been sent.")
	}
}
impl HttpTransport for FakeApi {
	type TransportError = Unreachable;

	fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::TransportError> {
		self.seen.lock().push(request);

		Ok(HttpResponse::new(self.status, self.body.as_bytes()))
	}
}

// Hands out `secret-0..count` and remembers the requested counts.
#[derive(Default)]
struct CountingAuthenticator {
	requested: Mutex<Vec<usize>>,
}
impl Authenticator for CountingAuthenticator {
	fn obtain_tokens(&self, _: &Credential, count: usize) -> Result<Vec<ApiSecret>> {
		self.requested.lock().push(count);

		Ok((0..count).map(|i| ApiSecret::new(format!("secret-{i}"))).collect())
	}
}

struct RejectingAuthenticator;
impl Authenticator for RejectingAuthenticator {
	fn obtain_tokens(&self, _: &Credential, _: usize) -> Result<Vec<ApiSecret>> {
		Err(Error::InvalidCredentials)
	}
}

fn client(api: &Arc<FakeApi>, authenticator: Arc<dyn Authenticator>) -> Client<FakeApi> {
	Client::new(Arc::clone(api), authenticator).expect("Client should build.")
}

fn credential() -> Credential {
	Credential::new("dev@example.com", "hunter2")
}

#[test]
fn resource_calls_require_login() {
	let api = FakeApi::new(200, "{}");
	let client = client(&api, Arc::new(CountingAuthenticator::default()));

	assert!(!client.is_logged_in());
	assert!(client.token().is_none());
	assert!(matches!(client.clan("#2PP"), Err(Error::NotLoggedIn)));
	assert!(api.seen.lock().is_empty());
}

#[test]
fn login_uses_configured_count_and_publishes_the_pool() {
	let api = FakeApi::new(200, "{\"tag\":\"#2PP\"}");
	let authenticator = Arc::new(CountingAuthenticator::default());
	let client = client(&api, authenticator.clone()).with_token_count(3);

	client.login(&credential()).expect("Login should succeed.");

	assert!(client.is_logged_in());
	assert_eq!(*authenticator.requested.lock(), [3]);
	assert_eq!(client.token().map(|secret| secret.expose().to_owned()).as_deref(), Some("secret-0"));
	assert_eq!(client.tokens().map(|secrets| secrets.len()), Some(3));
}

#[test]
fn failed_login_leaves_the_client_logged_out() {
	let api = FakeApi::new(200, "{}");
	let client = client(&api, Arc::new(RejectingAuthenticator));
	let err = client.login(&credential()).expect_err("Rejected credentials must fail.");

	assert!(matches!(err, Error::InvalidCredentials));
	assert!(!client.is_logged_in());
}

#[test]
fn requests_rotate_bearer_secrets_round_robin() {
	let api = FakeApi::new(200, "{\"tag\":\"#X\"}");
	let client = client(&api, Arc::new(CountingAuthenticator::default()));

	client.login_with_tokens(["t1", "t2"], 1_000).expect("Pre-obtained tokens should install.");

	for _ in 0..3 {
		client.clan("#x").expect("Clan lookup should succeed.");
	}

	assert_eq!(api.authorizations(), ["Bearer t1", "Bearer t2", "Bearer t1"]);
}

#[test]
fn clan_lookup_normalizes_and_encodes_the_tag() {
	let api = FakeApi::new(200, "{\"tag\":\"#123ABC0\",\"name\":\"My Clan\"}");
	let client = client(&api, Arc::new(CountingAuthenticator::default()));

	client.login(&credential()).expect("Login should succeed.");

	let clan = client.clan(" 123abc o").expect("Clan lookup should succeed.");
	let request = api.last();

	assert_eq!(clan["name"], "My Clan");
	assert_eq!(request.method, Method::Get);
	assert_eq!(request.url.as_str(), "https://api.clashofclans.com/v1/clans/%23123ABC0");
	assert_eq!(request.header("Authorization"), Some("Bearer secret-0"));
	assert_eq!(request.header("Accept"), Some("application/json"));
}

#[test]
fn not_found_and_server_errors_are_distinguished() {
	let api = FakeApi::new(404, "{\"reason\":\"notFound\"}");
	let client = client(&api, Arc::new(CountingAuthenticator::default()));

	client.login(&credential()).expect("Login should succeed.");

	assert!(matches!(client.player("#ABC"), Err(Error::NotFound { .. })));

	let api = FakeApi::new(503, "maintenance");
	let client = self::client(&api, Arc::new(CountingAuthenticator::default()));

	client.login(&credential()).expect("Login should succeed.");

	let err = client.clan("#ABC").expect_err("Server errors must surface.");

	assert!(matches!(err, Error::Transport(TransportError::Status { status: 503, .. })));
}

#[test]
fn verify_player_token_posts_the_token_and_reads_status() {
	let api = FakeApi::new(200, "{\"tag\":\"#ABC\",\"token\":\"t\",\"status\":\"ok\"}");
	let client = client(&api, Arc::new(CountingAuthenticator::default()));

	client.login(&credential()).expect("Login should succeed.");

	assert!(client.verify_player_token("#abc", "in-game").expect("Verification should succeed."));

	let request = api.last();
	let body = serde_json::from_slice::<serde_json::Value>(&request.body)
		.expect("Verification body should be JSON.");

	assert_eq!(request.method, Method::Post);
	assert!(request.url.path().ends_with("/players/%23ABC/verifytoken"));
	assert_eq!(body, serde_json::json!({ "token": "in-game" }));

	let api = FakeApi::new(200, "{\"status\":\"invalid\"}");
	let client = self::client(&api, Arc::new(CountingAuthenticator::default()));

	client.login(&credential()).expect("Login should succeed.");

	assert!(!client.verify_player_token("#abc", "wrong").expect("Verification should succeed."));
}

#[test]
fn shared_throttle_caps_combined_rate() {
	let api = FakeApi::new(200, "{}");
	let client = Arc::new(client(&api, Arc::new(CountingAuthenticator::default())));

	// Two secrets at one request per second each: four calls need a second window.
	client.login_with_tokens(["a", "b"], 1).expect("Tokens should install.");

	let start = Instant::now();
	let handles = (0..4)
		.map(|_| {
			let client = Arc::clone(&client);

			thread::spawn(move || client.get_json::<serde_json::Value>("/locations"))
		})
		.collect::<Vec<_>>();

	for handle in handles {
		handle.join().expect("Caller thread should not panic.").expect("Call should succeed.");
	}

	assert!(start.elapsed() >= Duration::from_millis(1_000));
	assert_eq!(api.seen.lock().len(), 4);
}

#[test]
fn interrupt_handle_aborts_waiting_callers() {
	let api = FakeApi::new(200, "{}");
	let client = Arc::new(client(&api, Arc::new(CountingAuthenticator::default())));

	client.login_with_tokens(["only"], 1).expect("Token should install.");
	client.get_json::<serde_json::Value>("/locations").expect("First call should be admitted.");

	let waiter = {
		let client = Arc::clone(&client);

		thread::spawn(move || client.get_json::<serde_json::Value>("/locations"))
	};

	thread::sleep(Duration::from_millis(50));
	client.interrupt_handle().interrupt();

	let result = waiter.join().expect("Waiter should not panic.");

	assert!(matches!(result, Err(Error::ThrottleInterrupted)));
	assert_eq!(api.seen.lock().len(), 1);
}

#[test]
fn empty_token_lists_are_rejected() {
	let api = FakeApi::new(200, "{}");
	let client = client(&api, Arc::new(CountingAuthenticator::default()));

	assert!(matches!(client.login_with_tokens(Vec::<String>::new(), 10), Err(Error::Config(_))));
	assert!(!client.is_logged_in());
}

#[test]
fn config_wires_portal_and_api_bases() {
	let api = FakeApi::new(200, "{}");
	let mut config = ClientConfig::new("dev@example.com", "hunter2");

	config.api_base = "https://proxy.example.com/coc/v1/".into();

	let client: Client<FakeApi> =
		Client::from_config(&config, Arc::clone(&api)).expect("Config should build.");

	client.login_with_tokens(["t"], 10).expect("Token should install.");
	client.get_json::<serde_json::Value>("/labels/clans").expect("Call should succeed.");

	assert_eq!(api.last().url.as_str(), "https://proxy.example.com/coc/v1/labels/clans");
}

#[test]
fn malformed_json_reports_the_resource_path() {
	let api = FakeApi::new(200, "not json");
	let client = client(&api, Arc::new(CountingAuthenticator::default()));

	client.login(&credential()).expect("Login should succeed.");

	let err = client.get_json::<serde_json::Value>("/clans/%232PP").expect_err("Garbage must fail.");

	assert!(matches!(
		err,
		Error::Transport(TransportError::ResponseParse { ref endpoint, .. }) if endpoint == "/clans/%232PP"
	));
}
