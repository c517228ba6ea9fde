#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use expense_bridge::{
	_preludet::*,
	auth::{AuthorizationCallback, ProviderId},
	error::{ConfigError, SessionError, UpstreamError},
	flows::FlowState,
	provider::ProviderDescriptor,
	store::TokenStore,
};

const CONSUMER_KEY: &str = "consumer-it";
const CONSUMER_SECRET: &str = "secret-it";

fn build_descriptor(server: &MockServer) -> ProviderDescriptor {
	let provider_id = ProviderId::new("mock-expenses")
		.expect("Provider identifier should be valid for authorization test.");

	ProviderDescriptor::builder(provider_id)
		.request_token_endpoint(
			Url::parse(&server.url("/get_request_token"))
				.expect("Mock request-token endpoint should parse successfully."),
		)
		.authorize_endpoint(
			Url::parse(&server.url("/authorize"))
				.expect("Mock authorize endpoint should parse successfully."),
		)
		.access_token_endpoint(
			Url::parse(&server.url("/get_access_token"))
				.expect("Mock access-token endpoint should parse successfully."),
		)
		.expenses_endpoint(
			Url::parse(&server.url("/get_expenses"))
				.expect("Mock expenses endpoint should parse successfully."),
		)
		.callback(
			Url::parse("https://app.example.com/expenses/callback")
				.expect("Callback URI should parse successfully."),
		)
		.build()
		.expect("Provider descriptor should build successfully.")
}

#[tokio::test]
async fn begin_and_complete_obtain_and_prime_tokens() {
	let server = MockServer::start_async().await;
	let descriptor = build_descriptor(&server);
	let (connector, store) =
		build_reqwest_test_connector(descriptor, CONSUMER_KEY, CONSUMER_SECRET);
	let request_token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/get_request_token");
			then.status(200)
				.header("content-type", "application/x-www-form-urlencoded")
				.body("oauth_token=req-token&oauth_token_secret=req-secret&oauth_callback_confirmed=true");
		})
		.await;
	let pending = connector.begin().await.expect("Request-token leg should succeed.");

	request_token_mock.assert_async().await;

	assert_eq!(pending.token, "req-token");
	assert!(pending.callback_confirmed);
	assert_eq!(pending.authorize_url.query(), Some("oauth_token=req-token"));
	assert!(pending.authorize_url.as_str().starts_with(&server.url("/authorize")));
	assert_eq!(connector.state(), FlowState::AwaitingUserAuthorization);
	assert!(
		!connector.connected().await.expect("Connected check should succeed."),
		"No access token may exist before the exchange completes.",
	);

	let access_token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/get_access_token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200)
				.header("content-type", "application/x-www-form-urlencoded")
				.body("oauth_token=acc-token&oauth_token_secret=acc-secret");
		})
		.await;
	let expenses_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/get_expenses").query_param("limit", "100");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"expenses\":[{\"id\":1,\"cost\":\"12.50\"},{\"id\":2,\"cost\":\"3.00\"}]}");
		})
		.await;
	let access = connector
		.complete(AuthorizationCallback::new("req-token", "verifier-1"))
		.await
		.expect("Verifier exchange should succeed.");

	access_token_mock.assert_async().await;
	expenses_mock.assert_async().await;

	assert_eq!(access.token, "acc-token");
	assert_eq!(access.token_secret.expose(), "acc-secret");
	assert_eq!(connector.state(), FlowState::Authorized);
	assert!(connector.connected().await.expect("Connected check should succeed."));

	let cached = connector.cached_expenses().expect("Cache should be primed after completion.");

	assert_eq!(cached.len(), 2);
	assert_eq!(cached[0]["cost"], "12.50");

	let stored = store
		.get_access_token()
		.await
		.expect("Token store read should succeed.")
		.expect("Access token should be persisted.");

	assert_eq!(stored.token, "acc-token");
	assert!(
		store.take_pending().await.expect("Pending read should succeed.").is_none(),
		"The pending request token must be discarded once the exchange completes.",
	);
}

#[tokio::test]
async fn begin_surfaces_upstream_failures_with_raw_body() {
	let server = MockServer::start_async().await;
	let descriptor = build_descriptor(&server);
	let (connector, _) = build_reqwest_test_connector(descriptor, CONSUMER_KEY, CONSUMER_SECRET);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/get_request_token");
			then.status(503).body("provider unavailable");
		})
		.await;
	let err = connector.begin().await.expect_err("Non-2xx responses must fail the leg.");

	mock.assert_async().await;

	match err {
		Error::Upstream(UpstreamError::Status { endpoint, status, body }) => {
			assert_eq!(endpoint, "request-token");
			assert_eq!(status, 503);
			assert_eq!(body, "provider unavailable");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert_eq!(connector.state(), FlowState::Failed);
}

#[tokio::test]
async fn begin_fails_hard_when_the_grant_lacks_a_token() {
	let server = MockServer::start_async().await;
	let descriptor = build_descriptor(&server);
	let (connector, _) = build_reqwest_test_connector(descriptor, CONSUMER_KEY, CONSUMER_SECRET);
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/get_request_token");
			then.status(200).body("error=invalid_consumer_key");
		})
		.await;
	let err = connector.begin().await.expect_err("A grant without oauth_token must fail.");

	match err {
		Error::Upstream(UpstreamError::MissingToken { endpoint, body }) => {
			assert_eq!(endpoint, "request-token");
			assert_eq!(body, "error=invalid_consumer_key");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn begin_treats_an_unconfirmed_callback_as_a_configuration_error() {
	let server = MockServer::start_async().await;
	let descriptor = build_descriptor(&server);
	let (connector, _) = build_reqwest_test_connector(descriptor, CONSUMER_KEY, CONSUMER_SECRET);
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/get_request_token");
			then.status(200)
				.body("oauth_token=req-token&oauth_token_secret=req-secret&oauth_callback_confirmed=false");
		})
		.await;
	let err = connector.begin().await.expect_err("An unconfirmed callback must fail.");

	assert!(matches!(err, Error::Config(ConfigError::CallbackRejected { .. })));
}

#[tokio::test]
async fn complete_rejects_mismatched_callback_tokens() {
	let server = MockServer::start_async().await;
	let descriptor = build_descriptor(&server);
	let (connector, _) = build_reqwest_test_connector(descriptor, CONSUMER_KEY, CONSUMER_SECRET);
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/get_request_token");
			then.status(200)
				.body("oauth_token=expected-token&oauth_token_secret=sec&oauth_callback_confirmed=true");
		})
		.await;

	connector.begin().await.expect("Request-token leg should succeed.");

	let err = connector
		.complete(AuthorizationCallback::new("other-token", "verifier-1"))
		.await
		.expect_err("A mismatched callback token must fail even with a valid verifier.");

	assert!(matches!(err, Error::Session(SessionError::RequestTokenMismatch)));
	assert_eq!(connector.state(), FlowState::Failed);

	// The mismatch consumed the pending record, so even the right token cannot
	// resume the attempt; the user restarts from `begin`.
	let err = connector
		.complete(AuthorizationCallback::new("expected-token", "verifier-1"))
		.await
		.expect_err("A consumed attempt must not be resumable.");

	assert!(matches!(err, Error::Session(SessionError::NoPendingAuthorization)));
}

#[tokio::test]
async fn complete_without_a_pending_attempt_is_a_session_error() {
	let server = MockServer::start_async().await;
	let descriptor = build_descriptor(&server);
	let (connector, _) = build_reqwest_test_connector(descriptor, CONSUMER_KEY, CONSUMER_SECRET);
	let err = connector
		.complete(AuthorizationCallback::new("any-token", "any-verifier"))
		.await
		.expect_err("Completion without a pending attempt must fail.");

	assert!(matches!(err, Error::Session(SessionError::NoPendingAuthorization)));
	assert_eq!(connector.state(), FlowState::Failed);
}

#[tokio::test]
async fn a_second_begin_supersedes_the_first_attempt() {
	let server = MockServer::start_async().await;
	let descriptor = build_descriptor(&server);
	let (connector, _) = build_reqwest_test_connector(descriptor, CONSUMER_KEY, CONSUMER_SECRET);
	let mut first_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/get_request_token");
			then.status(200)
				.body("oauth_token=token-1&oauth_token_secret=secret-1&oauth_callback_confirmed=true");
		})
		.await;
	let first = connector.begin().await.expect("First request-token leg should succeed.");

	assert_eq!(first.token, "token-1");

	first_mock.delete_async().await;

	let _second_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/get_request_token");
			then.status(200)
				.body("oauth_token=token-2&oauth_token_secret=secret-2&oauth_callback_confirmed=true");
		})
		.await;
	let second = connector.begin().await.expect("Second request-token leg should succeed.");

	assert_eq!(second.token, "token-2");

	// The first attempt's callback can no longer complete; it was superseded,
	// not merged.
	let err = connector
		.complete(AuthorizationCallback::new("token-1", "verifier-1"))
		.await
		.expect_err("The superseded attempt must be unusable.");

	assert!(matches!(err, Error::Session(SessionError::RequestTokenMismatch)));
}
