#![cfg(feature = "reqwest")]

// std
use std::collections::BTreeMap;
// crates.io
use httpmock::prelude::*;
// self
use token_gate::{
	error::RefreshFailure,
	reqwest::Client,
	token::{HttpRefreshInvoker, RefreshInvoker},
	url::Url,
};

fn invoker_for(server: &MockServer) -> HttpRefreshInvoker {
	let endpoint = Url::parse(&server.url("/v3/auth/token/renew"))
		.expect("Mock renewal endpoint should parse.");

	HttpRefreshInvoker::new(Client::new(), endpoint)
}

#[tokio::test]
async fn successful_renewal_parses_the_token_pair() {
	let server = MockServer::start_async().await;
	let invoker = invoker_for(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v3/auth/token/renew")
				.header("authorization", "Bearer access-0")
				.json_body_includes(r#"{"token":"refresh-0","username":"ana"}"#);
			then.status(200).header("content-type", "application/json").body(
				r#"{"token":"access-1","refreshToken":"refresh-1","expiresIn":3600}"#,
			);
		})
		.await;
	let session_data = BTreeMap::from([("username".to_owned(), "ana".to_owned())]);
	let pair = invoker
		.refresh("access-0", "refresh-0", &session_data)
		.await
		.expect("Renewal against the mock endpoint should succeed.");

	mock.assert_async().await;

	assert_eq!(pair.access_token.expose(), "access-1");
	assert_eq!(pair.refresh_token.expose(), "refresh-1");
	assert_eq!(pair.expires_in, time::Duration::seconds(3_600));
}

#[tokio::test]
async fn terminal_failures_carry_status_and_mined_code() {
	let server = MockServer::start_async().await;
	let invoker = invoker_for(&server);

	server
		.mock_async(|when, then| {
			when.method(POST).path("/v3/auth/token/renew");
			then.status(401)
				.header("content-type", "application/json")
				.body(r#"{"code":1001,"message":"refresh token expired"}"#);
		})
		.await;

	let failure = invoker
		.refresh("access-0", "refresh-0", &BTreeMap::new())
		.await
		.expect_err("A 401 response should classify as a failure.");

	assert!(matches!(
		&failure,
		RefreshFailure::Client { status: 401, error_code: Some(1001), message }
			if message == "refresh token expired"
	));
	assert_eq!(failure.status(), Some(401));
	assert_eq!(failure.error_code(), Some(1001));
}

#[tokio::test]
async fn server_failures_classify_without_a_body() {
	let server = MockServer::start_async().await;
	let invoker = invoker_for(&server);

	server
		.mock_async(|when, then| {
			when.method(POST).path("/v3/auth/token/renew");
			then.status(503);
		})
		.await;

	let failure = invoker
		.refresh("access-0", "refresh-0", &BTreeMap::new())
		.await
		.expect_err("A 503 response should classify as a failure.");

	assert!(matches!(failure, RefreshFailure::Server { status: 503, error_code: None, .. }));
}

#[tokio::test]
async fn malformed_success_bodies_surface_as_decode_failures() {
	let server = MockServer::start_async().await;
	let invoker = invoker_for(&server);

	server
		.mock_async(|when, then| {
			when.method(POST).path("/v3/auth/token/renew");
			then.status(200).header("content-type", "application/json").body("not json");
		})
		.await;

	let failure = invoker
		.refresh("access-0", "refresh-0", &BTreeMap::new())
		.await
		.expect_err("A malformed success body should classify as a failure.");

	assert!(matches!(failure, RefreshFailure::Decode { .. }));
	// No usable HTTP classification, so the authenticator treats it as transient.
	assert_eq!(failure.status(), None);
}
