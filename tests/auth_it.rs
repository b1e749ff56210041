mod support;

// std
use std::sync::Arc;
// self
use support::*;

#[tokio::test]
async fn token_is_reused_across_api_calls() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server, "t-1").await;
	let prices = server
		.mock_async(|when, then| {
			when.method(GET).path(PRICES_PATH).header("authorization", "Bearer t-1");
			then.status(200).json_body(json!({ "data": [] }));
		})
		.await;
	let client = build_client(test_config(&server));
	let query = PriceQuery::new().batch(1).use_cache(false);

	for _ in 0..3 {
		client.get_all_pfs_prices(&query).await.expect("Price call should succeed.");
	}

	token.assert_calls_async(1).await;
	prices.assert_calls_async(3).await;
}

#[tokio::test]
async fn enveloped_token_response_is_accepted() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.json_body(json!({ "client_id": CLIENT_ID, "client_secret": CLIENT_SECRET }));
			then.status(200).json_body(json!({
				"success": true,
				"data": { "access_token": "wrapped", "refresh_token": "r-1", "expires_in": 3_600 }
			}));
		})
		.await;
	let client = build_client(test_config(&server));
	let secret =
		client.authenticator().access_token().await.expect("Enveloped token should be accepted.");

	token.assert_async().await;

	assert_eq!(secret.expose(), "wrapped");

	let record = client.authenticator().current().expect("Token should be cached.");

	assert_eq!(record.refresh_token.as_ref().map(|secret| secret.expose()), Some("r-1"));
	assert!(record.expires_at > record.issued_at);
}

#[tokio::test]
async fn rejected_credentials_surface_as_auth_error() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(401).body("{\"message\":\"invalid client\"}");
		})
		.await;
	let client = build_client(test_config(&server));
	let err = client
		.get_all_pfs_info(&ForecourtQuery::new().batch(1))
		.await
		.expect_err("Rejected credentials should fail the call.");

	token.assert_async().await;

	assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));
	assert!(!err.is_retryable());
}

#[tokio::test]
async fn malformed_token_response_is_reported_with_path() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).json_body(json!({ "access_token": "t", "expires_in": "soon" }));
		})
		.await;

	let client = build_client(test_config(&server));
	let err = client
		.authenticator()
		.access_token()
		.await
		.expect_err("Non-numeric expiry should fail.");

	match err {
		Error::Auth(AuthError::TokenResponseParse { source }) =>
			assert_eq!(source.path().to_string(), "expires_in"),
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_share_one_exchange() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.delay(Duration::from_millis(200))
				.json_body(json!({ "access_token": "shared", "expires_in": 3_600 }));
		})
		.await;
	let client = Arc::new(build_client(test_config(&server)));
	let handles = (0..8)
		.map(|_| {
			let client = client.clone();

			tokio::spawn(async move { client.authenticator().access_token().await })
		})
		.collect::<Vec<_>>();

	for handle in handles {
		let secret = handle
			.await
			.expect("Token task should not panic.")
			.expect("Token fetch should succeed.");

		assert_eq!(secret.expose(), "shared");
	}

	token.assert_calls_async(1).await;
}

#[tokio::test]
async fn near_expiry_token_is_refreshed() {
	let server = MockServer::start_async().await;
	let generate = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).json_body(json!({
				"access_token": "short-lived",
				"refresh_token": "r-1",
				"expires_in": 30
			}));
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(REFRESH_PATH)
				.json_body(json!({ "client_id": CLIENT_ID, "refresh_token": "r-1" }));
			then.status(200).json_body(json!({ "access_token": "renewed", "expires_in": 3_600 }));
		})
		.await;
	let client = build_client(test_config(&server));
	let auth = client.authenticator();

	let first = auth.access_token().await.expect("First token should be issued.");
	let second = auth.access_token().await.expect("Token should be refreshed.");
	let third = auth.access_token().await.expect("Renewed token should be cached.");

	assert_eq!(first.expose(), "short-lived");
	assert_eq!(second.expose(), "renewed");
	assert_eq!(third.expose(), "renewed");

	generate.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;

	let record = auth.current().expect("Renewed token should be cached.");

	assert_eq!(
		record.refresh_token.as_ref().map(|secret| secret.expose()),
		Some("r-1"),
		"Refresh secret should carry over when the endpoint omits a new one."
	);
}

#[tokio::test]
async fn rejected_refresh_falls_back_to_client_credentials() {
	let server = MockServer::start_async().await;
	let generate = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).json_body(json!({
				"access_token": "short-lived",
				"refresh_token": "r-stale",
				"expires_in": 30
			}));
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH_PATH);
			then.status(401).body("{\"message\":\"refresh token expired\"}");
		})
		.await;
	let client = build_client(test_config(&server));
	let auth = client.authenticator();

	auth.access_token().await.expect("First token should be issued.");
	auth.access_token().await.expect("Fallback exchange should succeed.");

	refresh.assert_calls_async(1).await;
	generate.assert_calls_async(2).await;
}
