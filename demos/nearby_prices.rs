//! Finds stations near Westminster and prints their E10 prices, against a local mock of the
//! Fuel Finder API so the demo runs without credentials.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use fuel_finder::{
	FuelFinderClient,
	config::{ClientConfig, CompatMode},
	reqwest::Client as ReqwestClient,
	geo::DEFAULT_RADIUS_KM,
	query::PriceQuery,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/oauth/generate_access_token");
			then.status(200)
				.json_body(json!({ "data": { "access_token": "demo-access", "expires_in": 3_600 } }));
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/pfs").query_param("batch-number", "1");
			then.status(200).json_body(json!({ "data": [
				{
					"node_id": "waterloo",
					"trading_name": "Waterloo Road Services",
					"location": { "latitude": 51.5033, "longitude": -0.1145 }
				},
				{
					"node_id": "victoria",
					"trading_name": "Victoria Forecourt",
					"location": { "latitude": "51.4965", "longitude": "-0.1447" }
				}
			] }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/pfs/fuel-prices").query_param("batch-number", "1");
			then.status(200).json_body(json!({ "data": [
				{
					"node_id": "waterloo",
					"trading_name": "Waterloo Road Services",
					"fuel_prices": [{ "fuel_type": "E10", "price": "0141.9000" }]
				},
				{
					"node_id": "victoria",
					"trading_name": "Victoria Forecourt",
					"fuel_prices": [{ "fuel_type": "E10", "price": 138.7 }]
				}
			] }));
		})
		.await;

	let config = ClientConfig::builder("demo-client", "demo-secret")
		.base_url(server.url("/api/v1"))
		.compat(CompatMode::Current)
		.build()?;
	// The mock server presents a self-signed certificate.
	let http = ReqwestClient::builder()
		.timeout(config.timeout)
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()?;
	let client = FuelFinderClient::with_http_client(config, http)?;
	let nearby = client.search_by_location(51.5007, -0.1246, DEFAULT_RADIUS_KM).await?;
	let prices = client.get_all_pfs_prices(&PriceQuery::new()).await?;

	for (distance, station) in &nearby {
		let e10 = prices
			.iter()
			.find(|pfs| pfs.node_id == station.node_id)
			.and_then(|pfs| pfs.price_for("E10"))
			.and_then(|price| price.price);

		match e10 {
			Some(pence) => println!("{} ({distance:.2} km): E10 {pence:.1}p.", station.trading_name),
			None => println!("{} ({distance:.2} km): no E10 price.", station.trading_name),
		}
	}

	if let Some(stats) = client.cache_stats() {
		println!("Cache: {} hits, {} misses.", stats.hits, stats.misses);
	}

	token_mock.assert_async().await;

	Ok(())
}
