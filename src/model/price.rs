//! Records served by `/pfs/fuel-prices`.

// self
use crate::{
	_prelude::*,
	model::de::{lenient_f64, lenient_timestamp},
};

/// A single fuel price at a station.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FuelPrice {
	/// Fuel grade label, e.g. `E10` or `B7_STANDARD`.
	pub fuel_type: String,
	/// Price in pence per litre; `None` when the station reports no price.
	#[serde(default, deserialize_with = "lenient_f64")]
	pub price: Option<f64>,
	/// When the station last reported this price.
	#[serde(default, deserialize_with = "lenient_timestamp")]
	pub price_last_updated: Option<OffsetDateTime>,
	/// When the price change took effect at the pump.
	#[serde(default, deserialize_with = "lenient_timestamp")]
	pub price_change_effective_timestamp: Option<OffsetDateTime>,
}

/// Petrol filling station with its current prices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pfs {
	/// Unique station identifier.
	pub node_id: String,
	/// Operating organisation.
	#[serde(default)]
	pub mft_organisation_name: Option<String>,
	/// Name shown on the forecourt.
	pub trading_name: String,
	/// Public contact number.
	#[serde(default)]
	pub public_phone_number: Option<String>,
	/// Prices per fuel grade.
	#[serde(default)]
	pub fuel_prices: Vec<FuelPrice>,
}
impl Pfs {
	/// Returns the price entry for `fuel_type`, if the station sells it.
	pub fn price_for(&self, fuel_type: &str) -> Option<&FuelPrice> {
		self.fuel_prices.iter().find(|price| price.fuel_type == fuel_type)
	}
}
