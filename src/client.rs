//! High-level client for the Fuel Finder API.
//!
//! [`FuelFinderClient`] owns one limiter, one authenticator, and at most one response cache,
//! shared by the price and forecourt services. Every record it returns is wrapped in
//! [`Compat`] according to the configured [`CompatMode`].

// self
use crate::{
	_prelude::*,
	auth::Authenticator,
	cache::{CacheStats, CacheTtl, ResourceKind, ResponseCache},
	compat::{self, Compat},
	config::{ClientConfig, CompatMode},
	geo::{self, Coordinates},
	http::{self, ApiHttpClient},
	model::{FuelPrice, Pfs, PfsInfo},
	query::{EffectiveTimestamp, ForecourtQuery, PriceQuery},
	rate_limit::RateLimiter,
	service::{self, ForecourtService, Pages, PriceService},
};

/// Async client for fuel prices and forecourt information.
#[derive(Debug)]
pub struct FuelFinderClient {
	config: ClientConfig,
	http: Arc<ApiHttpClient>,
	cache: Option<Arc<ResponseCache>>,
	prices: PriceService,
	forecourts: ForecourtService,
}
impl FuelFinderClient {
	/// Creates a client with its own HTTP connection pool.
	pub fn new(config: ClientConfig) -> Result<Self> {
		let http = http::build_reqwest_client(&config)?;

		Self::with_http_client(config, http)
	}

	/// Creates a client from the `FUEL_FINDER_*` environment variables.
	pub fn from_env() -> Result<Self> {
		Self::new(ClientConfig::from_env()?)
	}

	/// Creates a client that sends every request (token and API) through `http`.
	pub fn with_http_client(config: ClientConfig, http: ReqwestClient) -> Result<Self> {
		let limiter = Arc::new(RateLimiter::new(config.rate_limit.clone())?);
		let auth = Arc::new(Authenticator::new(&config, http.clone()));
		let api = Arc::new(ApiHttpClient::new(&config, http, auth, limiter));
		let cache = config.cache_enabled.then(|| {
			let cache = ResponseCache::new();

			Arc::new(match config.cache_max_entries {
				Some(max) => cache.with_max_entries(max),
				None => cache,
			})
		});
		let prices = PriceService::new(api.clone(), cache.clone());
		let forecourts = ForecourtService::new(api.clone(), cache.clone());

		Ok(Self { config, http: api, cache, prices, forecourts })
	}

	/// Active configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Presentation mode applied to returned records.
	pub fn compat_mode(&self) -> CompatMode {
		self.config.compat
	}

	/// Shared token manager.
	pub fn authenticator(&self) -> &Arc<Authenticator> {
		self.http.authenticator()
	}

	/// Shared rate limiter.
	pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
		self.http.limiter()
	}

	/// Stations with their prices; every batch unless `query` names one.
	pub async fn get_all_pfs_prices(&self, query: &PriceQuery) -> Result<Vec<Compat<Pfs>>> {
		self.present(self.prices.get_all_pfs_prices(query).await)
	}

	/// Station with prices by `node_id`, searching every batch.
	pub async fn get_pfs(&self, node_id: &str) -> Result<Option<Compat<Pfs>>> {
		let stations = self.fetch_all_prices().await?;

		Ok(service::find_pfs(&stations, node_id).cloned().map(|pfs| self.wrap(pfs)))
	}

	/// Every price entry for `fuel_type` across all stations.
	pub async fn get_prices_by_fuel_type(&self, fuel_type: &str) -> Result<Vec<FuelPrice>> {
		let stations = self.fetch_all_prices().await?;

		Ok(service::prices_by_fuel_type(&stations, fuel_type))
	}

	/// Prices changed since `since` (first batch).
	pub async fn get_incremental_price_updates(
		&self,
		since: EffectiveTimestamp,
	) -> Result<Vec<Compat<Pfs>>> {
		self.present(self.prices.get_incremental_updates(since, None).await)
	}

	/// Station details; every batch unless `query` names one.
	pub async fn get_all_pfs_info(&self, query: &ForecourtQuery) -> Result<Vec<Compat<PfsInfo>>> {
		self.present(self.forecourts.get_all_pfs(query).await)
	}

	/// Station details changed since `since`.
	pub async fn get_incremental_pfs_info(
		&self,
		since: EffectiveTimestamp,
	) -> Result<Vec<Compat<PfsInfo>>> {
		self.present(self.forecourts.get_incremental_pfs(since, None).await)
	}

	/// Station details by `node_id`, searching every batch.
	pub async fn get_pfs_info(&self, node_id: &str) -> Result<Option<Compat<PfsInfo>>> {
		let stations = self.fetch_all_forecourts().await?;

		Ok(service::find_pfs_info(&stations, node_id).cloned().map(|info| self.wrap(info)))
	}

	/// Cursor over station details, one batch of up to 500 per call.
	pub fn pfs_info_pages(&self) -> PfsInfoPages {
		PfsInfoPages {
			pages: self.forecourts.pages(ForecourtQuery::new()),
			mode: self.config.compat,
		}
	}

	/// Stations within `radius_km` of the given point, nearest first, with their distance in
	/// kilometres. [`geo::DEFAULT_RADIUS_KM`] is the conventional radius.
	pub async fn search_by_location(
		&self,
		latitude: f64,
		longitude: f64,
		radius_km: f64,
	) -> Result<Vec<(f64, Compat<PfsInfo>)>> {
		let center = Coordinates::new(latitude, longitude)?;
		let radius_km = geo::validate_radius(radius_km)?;
		let stations = self.fetch_all_forecourts().await?;

		Ok(geo::nearby(stations, center, radius_km, PfsInfo::coordinates)
			.into_iter()
			.map(|(distance, info)| (distance, self.wrap(info)))
			.collect())
	}

	/// Drops every cached response. No-op when caching is disabled.
	pub fn clear_cache(&self) {
		if let Some(cache) = &self.cache {
			cache.clear();
		}
	}

	/// Sets the TTL used for responses of `kind` cached from now on.
	pub fn set_cache_ttl(&self, kind: ResourceKind, ttl: CacheTtl) {
		match kind {
			ResourceKind::Prices => self.prices.set_cache_ttl(ttl),
			ResourceKind::Forecourts => self.forecourts.set_cache_ttl(ttl),
		}
	}

	/// Cache counters; `None` when caching is disabled.
	pub fn cache_stats(&self) -> Option<CacheStats> {
		self.cache.as_ref().map(|cache| cache.stats())
	}

	async fn fetch_all_prices(&self) -> Result<Vec<Pfs>> {
		self.prices
			.get_all_pfs_prices(&PriceQuery::new())
			.await
			.map_err(|e| compat::map_error(self.config.compat, e))
	}

	async fn fetch_all_forecourts(&self) -> Result<Vec<PfsInfo>> {
		self.forecourts
			.get_all_pfs(&ForecourtQuery::new())
			.await
			.map_err(|e| compat::map_error(self.config.compat, e))
	}

	fn wrap<T>(&self, record: T) -> Compat<T> {
		Compat::wrap(self.config.compat, record)
	}

	fn present<T>(&self, result: Result<Vec<T>>) -> Result<Vec<Compat<T>>> {
		result
			.map(|records| Compat::wrap_all(self.config.compat, records))
			.map_err(|e| compat::map_error(self.config.compat, e))
	}
}

/// Batch cursor returned by [`FuelFinderClient::pfs_info_pages`].
#[derive(Debug)]
pub struct PfsInfoPages {
	pages: Pages<PfsInfo, ForecourtQuery>,
	mode: CompatMode,
}
impl PfsInfoPages {
	/// Fetches the next non-empty batch; `Ok(None)` once every batch has been read.
	pub async fn next_batch(&mut self) -> Result<Option<Vec<Compat<PfsInfo>>>> {
		match self.pages.next_batch().await {
			Ok(batch) => Ok(batch.map(|records| Compat::wrap_all(self.mode, records))),
			Err(e) => Err(compat::map_error(self.mode, e)),
		}
	}

	/// Batch number the next call will request, or `None` when exhausted.
	pub fn next_batch_number(&self) -> Option<u32> {
		self.pages.next_batch_number()
	}
}
