//! Records served by `/pfs`.

// self
use crate::{_prelude::*, model::de::lenient_f64};

/// Postal address of a station.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
	/// First address line.
	pub address_line_1: String,
	/// Second address line.
	#[serde(default)]
	pub address_line_2: Option<String>,
	/// Town or city.
	pub city: String,
	/// Country.
	pub country: String,
	/// County.
	#[serde(default)]
	pub county: Option<String>,
	/// Postcode.
	pub postcode: String,
}

/// Coordinates plus the address fields the API embeds alongside them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
	/// Latitude in decimal degrees.
	#[serde(default, deserialize_with = "lenient_f64")]
	pub latitude: Option<f64>,
	/// Longitude in decimal degrees.
	#[serde(default, deserialize_with = "lenient_f64")]
	pub longitude: Option<f64>,
	/// First address line.
	#[serde(default)]
	pub address_line_1: Option<String>,
	/// Second address line.
	#[serde(default)]
	pub address_line_2: Option<String>,
	/// Town or city.
	#[serde(default)]
	pub city: Option<String>,
	/// Country.
	#[serde(default)]
	pub country: Option<String>,
	/// County.
	#[serde(default)]
	pub county: Option<String>,
	/// Postcode.
	#[serde(default)]
	pub postcode: Option<String>,
}
impl Location {
	/// Returns `(latitude, longitude)` when both are present.
	pub fn coordinates(&self) -> Option<(f64, f64)> {
		Some((self.latitude?, self.longitude?))
	}

	/// Returns the full postal address when every required line is present.
	pub fn address(&self) -> Option<Address> {
		Some(Address {
			address_line_1: self.address_line_1.clone()?,
			address_line_2: self.address_line_2.clone(),
			city: self.city.clone()?,
			country: self.country.clone()?,
			county: self.county.clone(),
			postcode: self.postcode.clone()?,
		})
	}
}

/// Petrol filling station details, without prices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PfsInfo {
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
	/// Whether the trading name equals the brand name.
	#[serde(default)]
	pub is_same_trading_and_brand_name: Option<bool>,
	/// Fuel brand.
	#[serde(default)]
	pub brand_name: Option<String>,
	/// Temporarily closed.
	#[serde(default)]
	pub temporary_closure: Option<bool>,
	/// Permanently closed.
	#[serde(default)]
	pub permanent_closure: Option<bool>,
	/// Date of permanent closure, as reported.
	#[serde(default)]
	pub permanent_closure_date: Option<String>,
	/// Motorway service area.
	#[serde(default)]
	pub is_motorway_service_station: Option<bool>,
	/// Supermarket forecourt.
	#[serde(default)]
	pub is_supermarket_service_station: Option<bool>,
	/// Position and address.
	#[serde(default)]
	pub location: Option<Location>,
	/// On-site amenities.
	#[serde(default)]
	pub amenities: Option<Vec<String>>,
	/// Opening hours, passed through untyped.
	#[serde(default)]
	pub opening_times: Option<Value>,
	/// Fuel grades sold.
	#[serde(default)]
	pub fuel_types: Option<Vec<String>>,
}
impl PfsInfo {
	/// Returns `(latitude, longitude)` when the station has coordinates.
	pub fn coordinates(&self) -> Option<(f64, f64)> {
		self.location.as_ref().and_then(Location::coordinates)
	}

	/// Returns `true` when the station reports either kind of closure.
	pub fn is_closed(&self) -> bool {
		self.temporary_closure.unwrap_or(false) || self.permanent_closure.unwrap_or(false)
	}
}
