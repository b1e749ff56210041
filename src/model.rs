//! Typed records decoded from API payloads.
//!
//! Unknown fields are ignored so additive API changes do not break decoding. The retired
//! per-record `success`/`message` fields are the exception: a record carrying them is rejected
//! with [`ApiError::DeprecatedFields`], since their presence means the payload was produced by
//! the old response format and cannot be trusted to have the current shape.

pub mod de;

mod forecourt;
mod price;

pub use forecourt::*;
pub use price::*;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::ApiError};

const DEPRECATED_FIELDS: [&str; 2] = ["success", "message"];

/// Decodes a batch payload into records; `null` is treated as an empty batch.
pub fn decode_records<T>(endpoint: &str, payload: Value) -> Result<Vec<T>, ApiError>
where
	T: DeserializeOwned,
{
	let items = match payload {
		Value::Null => return Ok(Vec::new()),
		Value::Array(items) => items,
		other => {
			return serde_path_to_error::deserialize(other)
				.map_err(|source| ApiError::ResponseParse { endpoint: endpoint.to_owned(), source });
		},
	};

	items.into_iter().map(|item| decode_record(endpoint, item)).collect()
}

/// Decodes a single record, rejecting retired envelope fields.
pub fn decode_record<T>(endpoint: &str, item: Value) -> Result<T, ApiError>
where
	T: DeserializeOwned,
{
	if let Value::Object(map) = &item {
		let fields = DEPRECATED_FIELDS
			.iter()
			.filter(|field| map.contains_key(**field))
			.map(|field| field.to_string())
			.collect::<Vec<_>>();

		if !fields.is_empty() {
			return Err(ApiError::DeprecatedFields { fields });
		}
	}

	serde_path_to_error::deserialize(item)
		.map_err(|source| ApiError::ResponseParse { endpoint: endpoint.to_owned(), source })
}
