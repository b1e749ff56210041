//! Optional observability hooks for API calls, the response cache, and the rate limiter.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `fuel_finder.request` with the `operation` and `stage`
//!   fields, plus `debug`/`warn` events for limiter waits, backoff sleeps, cache evictions, and
//!   deprecated compatibility accessors.
//! - Enable `metrics` to increment `fuel_finder_operation_total` (labeled by `operation` +
//!   `outcome`) and `fuel_finder_cache_lookup_total` (labeled by `result`), and to record
//!   `fuel_finder_rate_limit_wait_seconds`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Client operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Access token generation or refresh.
	Token,
	/// Fuel price listing.
	Prices,
	/// Forecourt information listing.
	Forecourts,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::Token => "token",
			Operation::Prices => "prices",
			Operation::Forecourts => "forecourts",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to an operation.
	Attempt,
	/// Served from the response cache.
	CacheHit,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::CacheHit => "cache_hit",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
