//! Shared fixtures for the integration suites.

#![allow(dead_code)]

pub use std::time::{Duration, Instant};

pub use httpmock::{Mock, prelude::*};
pub use serde_json::{Value, json};

pub use fuel_finder::{
	FuelFinderClient,
	reqwest::Client as ReqwestClient,
	cache::{CacheTtl, ResourceKind},
	compat::Compat,
	config::{ClientConfig, ClientConfigBuilder, CompatMode},
	error::{ApiError, AuthError, ConfigError, Error, TransportError},
	query::{EffectiveTimestamp, ForecourtQuery, PriceQuery},
	rate_limit::RateLimitConfig,
};

pub const CLIENT_ID: &str = "client-it";
pub const CLIENT_SECRET: &str = "secret-it";
pub const TOKEN_PATH: &str = "/api/v1/oauth/generate_access_token";
pub const REFRESH_PATH: &str = "/api/v1/oauth/regenerate_access_token";
pub const PRICES_PATH: &str = "/api/v1/pfs/fuel-prices";
pub const PFS_PATH: &str = "/api/v1/pfs";

/// Limits loose enough to never wait, with millisecond backoff.
pub fn fast_rate_limit() -> RateLimitConfig {
	RateLimitConfig::per_minute(1_000)
		.with_base_delay(Duration::from_millis(10))
		.with_max_delay(Duration::from_millis(100))
		.with_daily_limit(None)
}

pub fn test_config(server: &MockServer) -> ClientConfigBuilder {
	ClientConfig::builder(CLIENT_ID, CLIENT_SECRET)
		.base_url(server.url("/api/v1"))
		.timeout(Duration::from_secs(5))
		.rate_limit(fast_rate_limit())
		.compat(CompatMode::Current)
}

/// Reqwest client that trusts the mock server's self-signed certificate.
pub fn test_reqwest_client(config: &ClientConfig) -> ReqwestClient {
	ReqwestClient::builder()
		.timeout(config.timeout)
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.")
}

pub fn build_client(builder: ClientConfigBuilder) -> FuelFinderClient {
	let config = builder.build().expect("Test configuration should build.");
	let http = test_reqwest_client(&config);

	FuelFinderClient::with_http_client(config, http).expect("Test client should build.")
}

pub async fn mock_token<'a>(server: &'a MockServer, access_token: &str) -> Mock<'a> {
	let body = json!({ "access_token": access_token, "expires_in": 3_600 });

	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").json_body(body);
		})
		.await
}

pub fn pfs_info(node_id: &str, latitude: f64, longitude: f64) -> Value {
	json!({
		"node_id": node_id,
		"trading_name": format!("Station {node_id}"),
		"brand_name": "Acme",
		"location": {
			"latitude": latitude,
			"longitude": longitude,
			"address_line_1": "1 High Street",
			"city": "London",
			"country": "England",
			"postcode": "SW1A 1AA"
		}
	})
}

pub fn pfs_info_batch(prefix: &str, count: usize) -> Value {
	Value::Array((0..count).map(|idx| pfs_info(&format!("{prefix}-{idx}"), 51.5, -0.12)).collect())
}

pub fn pfs_prices(node_id: &str, prices: &[(&str, f64)]) -> Value {
	let fuel_prices = prices
		.iter()
		.map(|(fuel_type, price)| {
			json!({
				"fuel_type": fuel_type,
				"price": format!("{price:09.4}"),
				"price_last_updated": "2025-06-01T08:00:00Z"
			})
		})
		.collect::<Vec<_>>();

	json!({
		"node_id": node_id,
		"mft_organisation_name": "Acme Fuels Ltd",
		"trading_name": format!("Station {node_id}"),
		"public_phone_number": null,
		"fuel_prices": fuel_prices
	})
}

pub fn pfs_prices_batch(prefix: &str, count: usize) -> Value {
	Value::Array(
		(0..count).map(|idx| pfs_prices(&format!("{prefix}-{idx}"), &[("E10", 139.9)])).collect(),
	)
}
