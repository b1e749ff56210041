//! Explicit filter sets for the listing endpoints.

// crates.io
use time::{
	PrimitiveDateTime, UtcOffset, format_description::BorrowedFormatItem,
	macros::format_description,
};
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::{BATCH_NUMBER_PARAM, EFFECTIVE_START_PARAM, QueryParams},
};

const EFFECTIVE_FORMAT: &[BorrowedFormatItem<'static>] =
	format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Incremental-update cutoff in the API's `YYYY-MM-DD HH:MM:SS` (UTC) format.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EffectiveTimestamp(String);
impl EffectiveTimestamp {
	/// Validates `raw` against `YYYY-MM-DD HH:MM:SS`.
	pub fn parse(raw: &str) -> Result<Self, ConfigError> {
		let raw = raw.trim();

		PrimitiveDateTime::parse(raw, EFFECTIVE_FORMAT)
			.map(|_| Self(raw.to_owned()))
			.map_err(|_| ConfigError::InvalidTimestamp { value: raw.to_owned() })
	}

	/// Formats `moment` after converting it to UTC.
	pub fn from_datetime(moment: OffsetDateTime) -> Result<Self, ConfigError> {
		moment
			.to_offset(UtcOffset::UTC)
			.format(EFFECTIVE_FORMAT)
			.map(Self)
			.map_err(|_| ConfigError::InvalidTimestamp { value: moment.to_string() })
	}

	/// Returns the wire representation.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for EffectiveTimestamp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for EffectiveTimestamp {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
impl TryFrom<String> for EffectiveTimestamp {
	type Error = ConfigError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}
impl From<EffectiveTimestamp> for String {
	fn from(value: EffectiveTimestamp) -> Self {
		value.0
	}
}

/// Common view over the listing filters, used by the pagination driver.
pub trait BatchQuery {
	/// Explicitly requested batch, if any.
	fn requested_batch(&self) -> Option<u32>;

	/// Incremental cutoff, if any.
	fn effective_start(&self) -> Option<&EffectiveTimestamp>;

	/// Whether the response cache may serve and store this query.
	fn cache_enabled(&self) -> bool;

	/// Wire parameters for `batch`, validating the batch number.
	fn params_for(&self, batch: Option<u32>) -> Result<QueryParams, ConfigError> {
		build_params(batch, self.effective_start())
	}
}

/// Filters for `/pfs/fuel-prices`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceQuery {
	/// Single batch to fetch; `None` fetches every batch.
	pub batch_number: Option<u32>,
	/// Only return prices changed since this instant.
	pub effective_start_timestamp: Option<EffectiveTimestamp>,
	/// Consult and populate the response cache.
	pub use_cache: bool,
}
impl PriceQuery {
	/// Query for every batch, cache enabled.
	pub fn new() -> Self {
		Self::default()
	}

	/// Restricts the query to one batch.
	pub fn batch(mut self, batch_number: u32) -> Self {
		self.batch_number = Some(batch_number);

		self
	}

	/// Restricts the query to changes since `timestamp`.
	pub fn since(mut self, timestamp: EffectiveTimestamp) -> Self {
		self.effective_start_timestamp = Some(timestamp);

		self
	}

	/// Enables or disables the response cache for this query.
	pub fn use_cache(mut self, use_cache: bool) -> Self {
		self.use_cache = use_cache;

		self
	}
}
impl BatchQuery for PriceQuery {
	fn requested_batch(&self) -> Option<u32> {
		self.batch_number
	}

	fn effective_start(&self) -> Option<&EffectiveTimestamp> {
		self.effective_start_timestamp.as_ref()
	}

	fn cache_enabled(&self) -> bool {
		self.use_cache
	}
}
impl Default for PriceQuery {
	fn default() -> Self {
		Self { batch_number: None, effective_start_timestamp: None, use_cache: true }
	}
}

/// Filters for `/pfs`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForecourtQuery {
	/// Single batch to fetch; `None` fetches every batch.
	pub batch_number: Option<u32>,
	/// Only return stations changed since this instant.
	pub effective_start_timestamp: Option<EffectiveTimestamp>,
	/// Consult and populate the response cache.
	pub use_cache: bool,
}
impl ForecourtQuery {
	/// Query for every batch, cache enabled.
	pub fn new() -> Self {
		Self::default()
	}

	/// Restricts the query to one batch.
	pub fn batch(mut self, batch_number: u32) -> Self {
		self.batch_number = Some(batch_number);

		self
	}

	/// Restricts the query to changes since `timestamp`.
	pub fn since(mut self, timestamp: EffectiveTimestamp) -> Self {
		self.effective_start_timestamp = Some(timestamp);

		self
	}

	/// Enables or disables the response cache for this query.
	pub fn use_cache(mut self, use_cache: bool) -> Self {
		self.use_cache = use_cache;

		self
	}
}
impl BatchQuery for ForecourtQuery {
	fn requested_batch(&self) -> Option<u32> {
		self.batch_number
	}

	fn effective_start(&self) -> Option<&EffectiveTimestamp> {
		self.effective_start_timestamp.as_ref()
	}

	fn cache_enabled(&self) -> bool {
		self.use_cache
	}
}
impl Default for ForecourtQuery {
	fn default() -> Self {
		Self { batch_number: None, effective_start_timestamp: None, use_cache: true }
	}
}

fn build_params(
	batch: Option<u32>,
	since: Option<&EffectiveTimestamp>,
) -> Result<QueryParams, ConfigError> {
	let mut params = QueryParams::new();

	if let Some(batch) = batch {
		if batch == 0 {
			return Err(ConfigError::InvalidBatchNumber);
		}

		params.push((BATCH_NUMBER_PARAM, batch.to_string()));
	}
	if let Some(since) = since {
		params.push((EFFECTIVE_START_PARAM, since.as_str().to_owned()));
	}

	Ok(params)
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn effective_timestamp_validates_format() {
		assert!(EffectiveTimestamp::parse("2025-01-31 23:59:00").is_ok());
		assert!(matches!(
			EffectiveTimestamp::parse("2025-01-31T23:59:00"),
			Err(ConfigError::InvalidTimestamp { .. })
		));
		assert!("2025-02-30 00:00:00".parse::<EffectiveTimestamp>().is_err());
	}

	#[test]
	fn effective_timestamp_from_datetime_uses_utc() {
		let stamp = EffectiveTimestamp::from_datetime(datetime!(2025-03-01 10:15:00 +01:00))
			.expect("Offsets should format.");

		assert_eq!(stamp.as_str(), "2025-03-01 09:15:00");
	}

	#[test]
	fn params_reject_batch_zero() {
		assert!(matches!(PriceQuery::new().params_for(Some(0)), Err(ConfigError::InvalidBatchNumber)));
	}

	#[test]
	fn params_include_filters() {
		let since = EffectiveTimestamp::parse("2025-01-01 00:00:00").expect("Timestamp should parse.");
		let params = ForecourtQuery::new()
			.since(since)
			.params_for(Some(3))
			.expect("Params should build.");

		assert_eq!(
			params,
			vec![
				(BATCH_NUMBER_PARAM, "3".to_owned()),
				(EFFECTIVE_START_PARAM, "2025-01-01 00:00:00".to_owned())
			]
		);
		assert!(PriceQuery::new().params_for(None).expect("Empty params should build.").is_empty());
	}
}
