//! Fuel price listing.

// self
use crate::{
	_prelude::*,
	cache::{CacheTtl, ResourceKind, ResponseCache},
	http::ApiHttpClient,
	model::{FuelPrice, Pfs},
	query::{EffectiveTimestamp, PriceQuery},
	service::ResourceFetcher,
};

/// Service for `/pfs/fuel-prices` (15 minute default TTL).
#[derive(Debug)]
pub struct PriceService {
	fetcher: Arc<ResourceFetcher<Pfs>>,
}
impl PriceService {
	/// Creates the service over the shared transport and optional cache.
	pub fn new(http: Arc<ApiHttpClient>, cache: Option<Arc<ResponseCache>>) -> Self {
		Self { fetcher: Arc::new(ResourceFetcher::new(ResourceKind::Prices, http, cache)) }
	}

	/// Underlying fetcher.
	pub fn fetcher(&self) -> &Arc<ResourceFetcher<Pfs>> {
		&self.fetcher
	}

	/// Replaces the TTL for newly cached price payloads.
	pub fn set_cache_ttl(&self, ttl: CacheTtl) {
		self.fetcher.set_ttl(ttl);
	}

	/// Stations with prices: one batch when `query` names a batch, otherwise every batch.
	pub async fn get_all_pfs_prices(&self, query: &PriceQuery) -> Result<Vec<Pfs>> {
		self.fetcher.fetch(query).await
	}

	/// Prices changed since `since`; reads batch 1 unless `batch_number` says otherwise.
	pub async fn get_incremental_updates(
		&self,
		since: EffectiveTimestamp,
		batch_number: Option<u32>,
	) -> Result<Vec<Pfs>> {
		let query = PriceQuery::new().batch(batch_number.unwrap_or(1)).since(since);

		self.fetcher.fetch(&query).await
	}
}

/// Finds a station by `node_id`.
pub fn find_pfs<'a>(stations: &'a [Pfs], node_id: &str) -> Option<&'a Pfs> {
	stations.iter().find(|pfs| pfs.node_id == node_id)
}

/// Collects every price entry for `fuel_type` across `stations`.
pub fn prices_by_fuel_type<'a, I>(stations: I, fuel_type: &str) -> Vec<FuelPrice>
where
	I: IntoIterator<Item = &'a Pfs>,
{
	stations
		.into_iter()
		.flat_map(|pfs| pfs.fuel_prices.iter())
		.filter(|price| price.fuel_type == fuel_type)
		.cloned()
		.collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn station(node_id: &str, prices: &[(&str, f64)]) -> Pfs {
		Pfs {
			node_id: node_id.into(),
			mft_organisation_name: None,
			trading_name: format!("Station {node_id}"),
			public_phone_number: None,
			fuel_prices: prices
				.iter()
				.map(|(fuel_type, price)| FuelPrice {
					fuel_type: (*fuel_type).into(),
					price: Some(*price),
					price_last_updated: None,
					price_change_effective_timestamp: None,
				})
				.collect(),
		}
	}

	#[test]
	fn find_by_node_id() {
		let stations = [station("a", &[]), station("b", &[])];

		assert_eq!(find_pfs(&stations, "b").map(|pfs| pfs.node_id.as_str()), Some("b"));
		assert!(find_pfs(&stations, "z").is_none());
	}

	#[test]
	fn fuel_type_filter_spans_stations() {
		let stations = [
			station("a", &[("E10", 139.9), ("B7_STANDARD", 149.9)]),
			station("b", &[("E10", 135.0)]),
		];
		let e10 = prices_by_fuel_type(&stations, "E10");

		assert_eq!(e10.iter().filter_map(|price| price.price).collect::<Vec<_>>(), [139.9, 135.0]);
		assert!(prices_by_fuel_type(&stations, "LPG").is_empty());
	}
}
