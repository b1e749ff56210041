//! Per-resource services layered over the shared transport and response cache.
//!
//! A [`ResourceFetcher`] owns the cache policy for one endpoint: it derives the cache key from
//! the endpoint plus its wire parameters, serves live entries without touching the network, and
//! stores successful payloads under the resource's current TTL. Payloads are only cached after
//! they decode, so a malformed response is fetched again on the next call.

mod forecourts;
mod prices;

pub use forecourts::*;
pub use prices::*;

// std
use std::marker::PhantomData;
// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	cache::{CacheKey, CacheTtl, ResourceKind, ResponseCache},
	error::ApiError,
	http::{ApiHttpClient, QueryParams},
	model,
	obs::{self, ApiSpan, Operation, Outcome},
	query::BatchQuery,
};

/// Records in a full batch; a shorter batch is the last one.
pub const BATCH_SIZE: usize = 500;

/// Cache-aware batch fetcher for a single resource kind.
pub struct ResourceFetcher<T> {
	kind: ResourceKind,
	http: Arc<ApiHttpClient>,
	cache: Option<Arc<ResponseCache>>,
	ttl: RwLock<CacheTtl>,
	_record: PhantomData<fn() -> T>,
}
impl<T> ResourceFetcher<T>
where
	T: DeserializeOwned,
{
	/// Creates a fetcher for `kind`; `cache = None` disables caching entirely.
	pub fn new(
		kind: ResourceKind,
		http: Arc<ApiHttpClient>,
		cache: Option<Arc<ResponseCache>>,
	) -> Self {
		Self { kind, http, cache, ttl: RwLock::new(kind.default_ttl()), _record: PhantomData }
	}

	/// Resource served by this fetcher.
	pub fn kind(&self) -> ResourceKind {
		self.kind
	}

	/// TTL applied to newly stored payloads.
	pub fn ttl(&self) -> CacheTtl {
		*self.ttl.read()
	}

	/// Replaces the TTL for payloads stored from now on.
	pub fn set_ttl(&self, ttl: CacheTtl) {
		*self.ttl.write() = ttl;
	}

	/// Fetches the batch named by `query`, or every batch when none is named.
	pub async fn fetch<Q>(&self, query: &Q) -> Result<Vec<T>>
	where
		Q: BatchQuery,
	{
		match query.requested_batch() {
			Some(batch) => {
				let params = query.params_for(Some(batch))?;

				self.fetch_batch(&params, query.cache_enabled()).await
			},
			None => self.fetch_all(query).await,
		}
	}

	/// Walks batches from 1 until an empty batch, a short batch, or a missing batch after the
	/// first.
	pub async fn fetch_all<Q>(&self, query: &Q) -> Result<Vec<T>>
	where
		Q: BatchQuery,
	{
		let mut records = Vec::new();
		let mut batch = 1;

		loop {
			let params = query.params_for(Some(batch))?;
			let page = match self.fetch_batch(&params, query.cache_enabled()).await {
				Ok(page) => page,
				Err(Error::Api(ApiError::BatchNotFound { .. })) if batch > 1 => break,
				Err(e) => return Err(e),
			};
			let len = page.len();

			records.extend(page);

			if len < BATCH_SIZE {
				break;
			}

			batch += 1;
		}

		Ok(records)
	}

	/// Fetches one request's worth of records, consulting the cache when `use_cache` is set.
	pub async fn fetch_batch(&self, params: &QueryParams, use_cache: bool) -> Result<Vec<T>> {
		let operation = self.operation();
		let endpoint = self.kind.endpoint();
		let cache = self.cache.as_ref().filter(|_| use_cache);
		let key =
			CacheKey::new(endpoint, params.iter().map(|(name, value)| (*name, value.as_str())));

		if let Some(payload) = cache.and_then(|cache| cache.get(&key)) {
			obs::record_operation_outcome(operation, Outcome::CacheHit);

			return model::decode_records(endpoint, Value::clone(&payload)).map_err(Error::from);
		}

		obs::record_operation_outcome(operation, Outcome::Attempt);

		let span = ApiSpan::new(operation, "fetch_batch");
		let result = span
			.instrument(async {
				let payload = self.http.get(endpoint, params).await?;
				let records = model::decode_records(endpoint, payload.clone())?;

				if let Some(cache) = cache {
					cache.set(key, Arc::new(payload), self.ttl());
				}

				Ok::<_, Error>(records)
			})
			.await;

		obs::record_operation_outcome(
			operation,
			if result.is_ok() { Outcome::Success } else { Outcome::Failure },
		);

		result
	}

	fn operation(&self) -> Operation {
		match self.kind {
			ResourceKind::Prices => Operation::Prices,
			ResourceKind::Forecourts => Operation::Forecourts,
		}
	}
}
impl<T> Debug for ResourceFetcher<T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ResourceFetcher")
			.field("kind", &self.kind)
			.field("cache_enabled", &self.cache.is_some())
			.field("ttl", &*self.ttl.read())
			.finish()
	}
}

/// Lazy cursor over successive batches of one listing.
pub struct Pages<T, Q> {
	fetcher: Arc<ResourceFetcher<T>>,
	query: Q,
	next: u32,
	done: bool,
}
impl<T, Q> Pages<T, Q>
where
	T: DeserializeOwned,
	Q: BatchQuery,
{
	/// Starts at the batch named in `query`, or batch 1.
	pub fn new(fetcher: Arc<ResourceFetcher<T>>, query: Q) -> Self {
		let next = query.requested_batch().unwrap_or(1);

		Self { fetcher, query, next, done: false }
	}

	/// Batch number the next call will request.
	pub fn next_batch_number(&self) -> Option<u32> {
		(!self.done).then_some(self.next)
	}

	/// Fetches the next batch; `Ok(None)` once the listing is exhausted.
	///
	/// Errors leave the cursor in place, so the same batch can be retried.
	pub async fn next_batch(&mut self) -> Result<Option<Vec<T>>> {
		if self.done {
			return Ok(None);
		}

		let params = self.query.params_for(Some(self.next))?;
		let page = match self.fetcher.fetch_batch(&params, self.query.cache_enabled()).await {
			Ok(page) => page,
			Err(Error::Api(ApiError::BatchNotFound { .. })) if self.next > 1 => {
				self.done = true;

				return Ok(None);
			},
			Err(e) => return Err(e),
		};

		if page.len() < BATCH_SIZE {
			self.done = true;
		} else {
			self.next += 1;
		}

		if page.is_empty() { Ok(None) } else { Ok(Some(page)) }
	}
}
impl<T, Q> Debug for Pages<T, Q>
where
	Q: Debug,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Pages")
			.field("kind", &self.fetcher.kind)
			.field("query", &self.query)
			.field("next", &self.next)
			.field("done", &self.done)
			.finish()
	}
}
