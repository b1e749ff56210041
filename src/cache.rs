//! In-memory response cache with per-entry TTL and lazy expiry.
//!
//! Entries are never returned once their expiry instant has passed; expired entries are
//! dropped by the next [`ResponseCache::get`] that observes them (or by a capacity purge in
//! [`ResponseCache::set`]). The cache only stores what callers hand it, so errors are never
//! cached.

mod key;

pub use key::*;

// std
use std::{
	num::NonZeroUsize,
	sync::atomic::{AtomicU64, Ordering},
};
// crates.io
use tokio::time::Instant;
// self
use crate::{_prelude::*, error::ConfigError, obs};

/// Strictly positive time-to-live for a cache entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheTtl(Duration);
impl CacheTtl {
	/// Validates and wraps `ttl`.
	pub fn new(ttl: Duration) -> Result<Self, ConfigError> {
		if ttl.is_zero() { Err(ConfigError::NonPositiveTtl) } else { Ok(Self(ttl)) }
	}

	/// Shorthand for [`CacheTtl::new`] with whole seconds.
	pub fn from_secs(secs: u64) -> Result<Self, ConfigError> {
		Self::new(Duration::from_secs(secs))
	}

	/// Returns the wrapped duration.
	pub fn get(self) -> Duration {
		self.0
	}
}
impl TryFrom<Duration> for CacheTtl {
	type Error = ConfigError;

	fn try_from(ttl: Duration) -> Result<Self, Self::Error> {
		Self::new(ttl)
	}
}

/// API resource classes with distinct freshness requirements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
	/// Fuel prices (`/pfs/fuel-prices`).
	Prices,
	/// Forecourt information (`/pfs`).
	Forecourts,
}
impl ResourceKind {
	/// Returns a stable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			ResourceKind::Prices => "prices",
			ResourceKind::Forecourts => "forecourts",
		}
	}

	/// Endpoint path relative to the API base URL.
	pub const fn endpoint(self) -> &'static str {
		match self {
			ResourceKind::Prices => "/pfs/fuel-prices",
			ResourceKind::Forecourts => "/pfs",
		}
	}

	/// Default TTL: 15 minutes for prices, 1 hour for forecourts.
	pub const fn default_ttl(self) -> CacheTtl {
		match self {
			ResourceKind::Prices => CacheTtl(Duration::from_secs(15 * 60)),
			ResourceKind::Forecourts => CacheTtl(Duration::from_secs(60 * 60)),
		}
	}
}
impl Display for ResourceKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ResourceKind {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"prices" => Ok(Self::Prices),
			"forecourts" => Ok(Self::Forecourts),
			other => Err(ConfigError::UnknownResource { value: other.to_owned() }),
		}
	}
}

/// Snapshot of cache counters.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CacheStats {
	/// Lookups that returned a live entry.
	pub hits: u64,
	/// Lookups that found nothing live.
	pub misses: u64,
	/// `hits + misses`.
	pub total: u64,
	/// Hit percentage rounded to two decimals; `0.0` before any lookup.
	pub hit_rate: f64,
	/// Stored entries, including expired ones not yet dropped.
	pub size: usize,
}

#[derive(Debug)]
struct CacheEntry<V> {
	value: V,
	expires_at: Instant,
}
impl<V> CacheEntry<V> {
	fn is_live(&self, now: Instant) -> bool {
		now < self.expires_at
	}
}

/// Thread-safe TTL cache keyed by [`CacheKey`].
#[derive(Debug)]
pub struct ResponseCache<V = Arc<Value>> {
	entries: RwLock<HashMap<CacheKey, CacheEntry<V>>>,
	max_entries: Option<NonZeroUsize>,
	hits: AtomicU64,
	misses: AtomicU64,
}
impl<V> ResponseCache<V>
where
	V: Clone,
{
	/// Creates an unbounded cache.
	pub fn new() -> Self {
		Self {
			entries: RwLock::new(HashMap::new()),
			max_entries: None,
			hits: AtomicU64::new(0),
			misses: AtomicU64::new(0),
		}
	}

	/// Bounds the number of stored entries; the soonest-expiring entry is evicted first.
	pub fn with_max_entries(mut self, max: NonZeroUsize) -> Self {
		self.max_entries = Some(max);

		self
	}

	/// Returns the live value for `key`, dropping it first if it has expired.
	pub fn get(&self, key: &CacheKey) -> Option<V> {
		let now = Instant::now();
		let found = self
			.entries
			.read()
			.get(key)
			.map(|entry| entry.is_live(now).then(|| entry.value.clone()));
		let value = match found {
			Some(Some(value)) => Some(value),
			Some(None) => {
				let mut entries = self.entries.write();

				// Another caller may have refreshed the entry between the two locks.
				if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
					entries.remove(key);
				}

				None
			},
			None => None,
		};

		if value.is_some() {
			self.hits.fetch_add(1, Ordering::Relaxed);
		} else {
			self.misses.fetch_add(1, Ordering::Relaxed);
		}

		obs::record_cache_lookup(value.is_some());

		value
	}

	/// Stores `value` under `key` until `now + ttl`, replacing any previous entry.
	pub fn set(&self, key: CacheKey, value: V, ttl: CacheTtl) {
		let now = Instant::now();
		let expires_at = now.checked_add(ttl.get()).unwrap_or_else(far_future);
		let mut entries = self.entries.write();
		let full = self
			.max_entries
			.is_some_and(|max| !entries.contains_key(&key) && entries.len() >= max.get());

		if full {
			entries.retain(|_, entry| entry.is_live(now));

			let still_full = self.max_entries.is_some_and(|max| entries.len() >= max.get());
			let victim = entries
				.iter()
				.min_by_key(|(_, entry)| entry.expires_at)
				.map(|(key, _)| key.clone())
				.filter(|_| still_full);

			if let Some(victim) = victim {
				entries.remove(&victim);

				obs::cache_evicted(entries.len());
			}
		}

		entries.insert(key, CacheEntry { value, expires_at });
	}

	/// Removes a single entry, returning whether it existed.
	pub fn remove(&self, key: &CacheKey) -> bool {
		self.entries.write().remove(key).is_some()
	}

	/// Drops every entry and resets the counters. Idempotent.
	pub fn clear(&self) {
		self.entries.write().clear();
		self.hits.store(0, Ordering::Relaxed);
		self.misses.store(0, Ordering::Relaxed);
	}

	/// Drops every expired entry, returning how many were removed.
	pub fn purge_expired(&self) -> usize {
		let now = Instant::now();
		let mut entries = self.entries.write();
		let before = entries.len();

		entries.retain(|_, entry| entry.is_live(now));

		before - entries.len()
	}

	/// Number of stored entries, including expired ones not yet dropped.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}

	/// Snapshot of hit/miss counters and size.
	pub fn stats(&self) -> CacheStats {
		let hits = self.hits.load(Ordering::Relaxed);
		let misses = self.misses.load(Ordering::Relaxed);
		let total = hits + misses;
		let hit_rate = if total == 0 {
			0.
		} else {
			(hits as f64 / total as f64 * 10_000.).round() / 100.
		};

		CacheStats { hits, misses, total, hit_rate, size: self.len() }
	}
}
impl<V> Default for ResponseCache<V>
where
	V: Clone,
{
	fn default() -> Self {
		Self::new()
	}
}

// Roughly 30 years out; only reached when a TTL overflows `Instant`.
fn far_future() -> Instant {
	Instant::now() + Duration::from_secs(60 * 60 * 24 * 365 * 30)
}
