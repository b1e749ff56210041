//! Great-circle distance and proximity search over station records.

// self
use crate::{_prelude::*, error::ConfigError};

/// Mean Earth radius used by [`haversine_km`].
pub const EARTH_RADIUS_KM: f64 = 6_371.;
/// Search radius used when callers do not pick one.
pub const DEFAULT_RADIUS_KM: f64 = 5.;

/// Validated WGS84 position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
	/// Latitude in decimal degrees, within `[-90, 90]`.
	pub latitude: f64,
	/// Longitude in decimal degrees, within `[-180, 180]`.
	pub longitude: f64,
}
impl Coordinates {
	/// Validates and wraps a position.
	pub fn new(latitude: f64, longitude: f64) -> Result<Self, ConfigError> {
		if !(-90. ..=90.).contains(&latitude) {
			return Err(ConfigError::InvalidCoordinate { name: "latitude", value: latitude });
		}
		if !(-180. ..=180.).contains(&longitude) {
			return Err(ConfigError::InvalidCoordinate { name: "longitude", value: longitude });
		}

		Ok(Self { latitude, longitude })
	}

	/// Great-circle distance to `other` in kilometres.
	pub fn distance_km(self, other: Self) -> f64 {
		haversine_km((self.latitude, self.longitude), (other.latitude, other.longitude))
	}
}

/// Haversine distance in kilometres between two `(latitude, longitude)` pairs in degrees.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
	let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
	let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());
	let a = ((lat2 - lat1) / 2.).sin().powi(2)
		+ lat1.cos() * lat2.cos() * ((lon2 - lon1) / 2.).sin().powi(2);

	2. * EARTH_RADIUS_KM * a.sqrt().min(1.).asin()
}

/// Rejects radii that are not finite and strictly positive.
pub fn validate_radius(radius_km: f64) -> Result<f64, ConfigError> {
	if radius_km.is_finite() && radius_km > 0. {
		Ok(radius_km)
	} else {
		Err(ConfigError::InvalidCoordinate { name: "radius_km", value: radius_km })
	}
}

/// Keeps records within `radius_km` of `center`, nearest first, paired with their distance.
///
/// Records for which `locate` returns `None` are skipped. Ties keep their input order.
pub fn nearby<T, I, F>(records: I, center: Coordinates, radius_km: f64, locate: F) -> Vec<(f64, T)>
where
	I: IntoIterator<Item = T>,
	F: Fn(&T) -> Option<(f64, f64)>,
{
	let origin = (center.latitude, center.longitude);
	let mut hits = records
		.into_iter()
		.filter_map(|record| {
			let distance = haversine_km(origin, locate(&record)?);

			(distance <= radius_km).then_some((distance, record))
		})
		.collect::<Vec<_>>();

	hits.sort_by(|a, b| a.0.total_cmp(&b.0));

	hits
}
