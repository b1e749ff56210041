mod support;

// self
use support::*;

const WESTMINSTER: (f64, f64) = (51.5007, -0.1246);

#[tokio::test]
async fn nearby_stations_are_sorted_by_distance() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server, "t-1").await;
	let forecourts = server
		.mock_async(|when, then| {
			when.method(GET).path(PFS_PATH).query_param("batch-number", "1");
			then.status(200).json_body(json!({
				"data": [
					pfs_info("croydon", 51.3762, -0.0982),
					pfs_info("waterloo", 51.5033, -0.1145),
					pfs_info("manchester", 53.4808, -2.2426),
					pfs_info("victoria", 51.4965, -0.1447),
					{ "node_id": "unplaced", "trading_name": "No Location" }
				]
			}));
		})
		.await;
	let client = build_client(test_config(&server));
	let hits = client
		.search_by_location(WESTMINSTER.0, WESTMINSTER.1, 5.)
		.await
		.expect("Search should succeed.");
	let names = hits.iter().map(|(_, info)| info.node_id.as_str()).collect::<Vec<_>>();

	assert_eq!(names, ["waterloo", "victoria"]);
	assert!(hits.windows(2).all(|pair| pair[0].0 <= pair[1].0));
	assert!(hits.iter().all(|(distance, _)| *distance <= 5.));

	let wide = client
		.search_by_location(WESTMINSTER.0, WESTMINSTER.1, 20.)
		.await
		.expect("Wide search should succeed.");

	assert_eq!(wide.len(), 3);
	assert_eq!(wide.last().map(|(_, info)| info.node_id.as_str()), Some("croydon"));

	forecourts.assert_calls_async(1).await;
}

#[tokio::test]
async fn invalid_search_area_is_rejected_before_any_request() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server, "t-1").await;
	let client = build_client(test_config(&server));

	for (latitude, longitude, radius) in [(91., 0., 5.), (0., -181., 5.), (51.5, -0.1, 0.)] {
		let err = client
			.search_by_location(latitude, longitude, radius)
			.await
			.expect_err("Out-of-range input should be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidCoordinate { .. })));
	}

	token.assert_calls_async(0).await;
}
