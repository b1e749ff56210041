//! Forecourt information listing.

// self
use crate::{
	_prelude::*,
	cache::{CacheTtl, ResourceKind, ResponseCache},
	http::ApiHttpClient,
	model::PfsInfo,
	query::{BatchQuery, EffectiveTimestamp, ForecourtQuery},
	service::{Pages, ResourceFetcher},
};

/// Service for `/pfs` (1 hour default TTL).
#[derive(Debug)]
pub struct ForecourtService {
	fetcher: Arc<ResourceFetcher<PfsInfo>>,
}
impl ForecourtService {
	/// Creates the service over the shared transport and optional cache.
	pub fn new(http: Arc<ApiHttpClient>, cache: Option<Arc<ResponseCache>>) -> Self {
		Self { fetcher: Arc::new(ResourceFetcher::new(ResourceKind::Forecourts, http, cache)) }
	}

	/// Underlying fetcher.
	pub fn fetcher(&self) -> &Arc<ResourceFetcher<PfsInfo>> {
		&self.fetcher
	}

	/// Replaces the TTL for newly cached forecourt payloads.
	pub fn set_cache_ttl(&self, ttl: CacheTtl) {
		self.fetcher.set_ttl(ttl);
	}

	/// Station details: one batch when `query` names a batch, otherwise every batch.
	pub async fn get_all_pfs(&self, query: &ForecourtQuery) -> Result<Vec<PfsInfo>> {
		self.fetcher.fetch(query).await
	}

	/// Station details changed since `since`, as a single request.
	pub async fn get_incremental_pfs(
		&self,
		since: EffectiveTimestamp,
		batch_number: Option<u32>,
	) -> Result<Vec<PfsInfo>> {
		let query = ForecourtQuery { batch_number, ..ForecourtQuery::new().since(since) };
		let params = query.params_for(query.batch_number)?;

		self.fetcher.fetch_batch(&params, query.use_cache).await
	}

	/// Cursor yielding one batch per call.
	pub fn pages(&self, query: ForecourtQuery) -> Pages<PfsInfo, ForecourtQuery> {
		Pages::new(self.fetcher.clone(), query)
	}
}

/// Finds a station by `node_id`.
pub fn find_pfs_info<'a>(stations: &'a [PfsInfo], node_id: &str) -> Option<&'a PfsInfo> {
	stations.iter().find(|info| info.node_id == node_id)
}
