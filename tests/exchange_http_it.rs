// crates.io
use httpmock::prelude::*;
// self
use coc_broker::{
	_preludet::*,
	auth::Credential,
	error::TransportError,
	provision::{KeyPolicy, ProvisioningError},
};

fn credential() -> Credential {
	Credential::new("dev@example.com", "hunter2")
}

fn login_body(cidr: &str) -> String {
	serde_json::json!({ "status": { "code": 0 }, "temporaryAPIToken": session_token_for(cidr) })
		.to_string()
}

#[test]
fn exchange_reuses_listed_keys_over_http() {
	let server = MockServer::start();
	let exchange = build_reqwest_test_exchange(&server.base_url());
	let login = server.mock(|when, then| {
		when.method(POST)
			.path("/api/login")
			.header("content-type", "application/json")
			.json_body(serde_json::json!({ "email": "dev@example.com", "password": "hunter2" }));
		then.status(200)
			.header("content-type", "application/json")
			.header("set-cookie", "session=portal-cookie; Path=/")
			.body(login_body("127.0.0.1/32"));
	});
	let list = server.mock(|when, then| {
		when.method(POST).path("/api/apikey/list").header_exists("cookie");
		then.status(200).header("content-type", "application/json").body(
			serde_json::json!({
				"keys": [
					{ "id": "1", "name": KeyPolicy::DEFAULT_NAME, "cidrRanges": ["127.0.0.1/32"], "key": "listed" }
				]
			})
			.to_string(),
		);
	});
	let create = server.mock(|when, then| {
		when.method(POST).path("/api/apikey/create");
		then.status(500);
	});
	let secrets =
		exchange.obtain_tokens(&credential(), 1).expect("Listed key should be reused over HTTP.");

	assert_eq!(secrets.len(), 1);
	assert_eq!(secrets[0].expose(), "listed");

	login.assert_calls(1);
	list.assert_calls(1);
	create.assert_calls(0);
}

#[test]
fn exchange_revokes_and_creates_over_http() {
	let server = MockServer::start();
	let exchange = build_reqwest_test_exchange(&server.base_url());
	let _login = server.mock(|when, then| {
		when.method(POST).path("/api/login");
		then.status(200).body(login_body("127.0.0.1/32"));
	});
	let list = server.mock(|when, then| {
		when.method(POST).path("/api/apikey/list");
		then.status(200).body(
			serde_json::json!({
				"keys": [
					{ "id": "stale-1", "name": KeyPolicy::DEFAULT_NAME, "cidrRanges": ["10.0.0.1/32"], "key": "old" }
				]
			})
			.to_string(),
		);
	});
	let revoke = server.mock(|when, then| {
		when.method(POST).path("/api/apikey/revoke").json_body(serde_json::json!({ "id": "stale-1" }));
		then.status(200).body("{}");
	});
	let create = server.mock(|when, then| {
		when.method(POST)
			.path("/api/apikey/create")
			.body_includes("\"cidrRanges\":[\"127.0.0.1\"]")
			.body_includes("\"scopes\":[\"clash\"]");
		then.status(200).body("{\"key\":{\"id\":\"new\",\"key\":\"created-secret\"}}");
	});
	let secrets =
		exchange.obtain_tokens(&credential(), 2).expect("Exchange should create missing keys.");
	let exposed = secrets.iter().map(|secret| secret.expose()).collect::<Vec<_>>();

	assert_eq!(exposed, ["created-secret", "created-secret"]);

	list.assert_calls(2);
	revoke.assert_calls(1);
	create.assert_calls(2);

	assert_eq!(exchange.metrics.keys_revoked(), 1);
	assert_eq!(exchange.metrics.keys_created(), 2);
}

#[test]
fn exchange_maps_http_failures() {
	let server = MockServer::start();
	let exchange = build_reqwest_test_exchange(&server.base_url());
	let _login = server.mock(|when, then| {
		when.method(POST).path("/api/login");
		then.status(403).body("{\"reason\":\"invalidCredentials\"}");
	});
	let err = exchange.obtain_tokens(&credential(), 1).expect_err("Forbidden login must fail.");

	assert!(matches!(err, Error::InvalidCredentials));

	let server = MockServer::start();
	let exchange = build_reqwest_test_exchange(&server.base_url());
	let _login = server.mock(|when, then| {
		when.method(POST).path("/api/login");
		then.status(200).body(login_body("127.0.0.1/32"));
	});
	let _list = server.mock(|when, then| {
		when.method(POST).path("/api/apikey/list");
		then.status(200).body("{\"keys\":[]}");
	});
	let _create = server.mock(|when, then| {
		when.method(POST).path("/api/apikey/create");
		then.status(200).body("{\"status\":\"ok\"}");
	});
	let err = exchange.obtain_tokens(&credential(), 1).expect_err("Missing secret must fail.");

	assert!(matches!(err, Error::KeyProvisioning(ProvisioningError::MissingSecret)));
}

#[test]
fn unreachable_portal_is_a_network_error() {
	// Port 9 (discard) on localhost is closed in test environments.
	let exchange = build_reqwest_test_exchange("http://127.0.0.1:9");
	let err = exchange.obtain_tokens(&credential(), 1).expect_err("Closed port must fail.");

	assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
}
