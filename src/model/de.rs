//! Lenient field decoders for the shapes the API actually emits.

// crates.io
use serde::{Deserializer, de::Error as DeError};
use time::{
	PrimitiveDateTime,
	format_description::{BorrowedFormatItem, well_known::Rfc3339},
	macros::format_description,
};
// self
use crate::_prelude::*;

const NAIVE_FORMATS: [&[BorrowedFormatItem<'static>]; 3] = [
	format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
	format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
	format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
];

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
	Number(f64),
	String(String),
}

/// Parses RFC 3339, or a naive `YYYY-MM-DD[T ]HH:MM:SS[.fff]` timestamp taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
	let raw = raw.trim();

	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc3339) {
		return Some(moment);
	}

	NAIVE_FORMATS
		.iter()
		.find_map(|format| PrimitiveDateTime::parse(raw, format).ok())
		.map(PrimitiveDateTime::assume_utc)
}

/// Decodes a number, a numeric string (`"0120.0000"`), an empty string, or `null`.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<NumberOrString>::deserialize(deserializer)? {
		None => Ok(None),
		Some(NumberOrString::Number(value)) => Ok(Some(value)),
		Some(NumberOrString::String(raw)) if raw.trim().is_empty() => Ok(None),
		Some(NumberOrString::String(raw)) => raw
			.trim()
			.parse()
			.map(Some)
			.map_err(|_| DeError::custom(format!("`{raw}` is not a number"))),
	}
}

/// Decodes an optional timestamp via [`parse_timestamp`]; empty strings become `None`.
pub fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<String>::deserialize(deserializer)? {
		None => Ok(None),
		Some(raw) if raw.trim().is_empty() => Ok(None),
		Some(raw) => parse_timestamp(&raw)
			.map(Some)
			.ok_or_else(|| DeError::custom(format!("`{raw}` is not a recognised timestamp"))),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	use time::macros::datetime;
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	struct Probe {
		#[serde(default, deserialize_with = "lenient_f64")]
		price: Option<f64>,
		#[serde(default, deserialize_with = "lenient_timestamp")]
		at: Option<OffsetDateTime>,
	}

	fn probe(value: Value) -> Probe {
		serde_json::from_value(value).expect("Probe should decode.")
	}

	#[test]
	fn prices_accept_padded_strings_and_numbers() {
		assert_eq!(probe(json!({ "price": "0120.9000" })).price, Some(120.9));
		assert_eq!(probe(json!({ "price": 131.5 })).price, Some(131.5));
		assert_eq!(probe(json!({ "price": "" })).price, None);
		assert_eq!(probe(json!({ "price": null })).price, None);
		assert_eq!(probe(json!({})).price, None);
		assert!(serde_json::from_value::<Probe>(json!({ "price": "n/a" })).is_err());
	}

	#[test]
	fn timestamps_accept_common_layouts() {
		let expected = datetime!(2025-02-03 04:05:06 UTC);

		assert_eq!(parse_timestamp("2025-02-03T04:05:06Z"), Some(expected));
		assert_eq!(parse_timestamp("2025-02-03T05:05:06+01:00"), Some(expected));
		assert_eq!(parse_timestamp("2025-02-03T04:05:06"), Some(expected));
		assert_eq!(parse_timestamp("2025-02-03 04:05:06"), Some(expected));
		assert_eq!(
			parse_timestamp("2025-02-03T04:05:06.250"),
			Some(expected + time::Duration::milliseconds(250))
		);
		assert_eq!(parse_timestamp("03/02/2025"), None);
		assert_eq!(probe(json!({ "at": "" })).at, None);
	}
}
