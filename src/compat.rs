//! Presentation adapter for callers still written against the retired response envelope.
//!
//! The API used to wrap every record in `{success, message, ...}`. In
//! [`CompatMode::Legacy`] the client hands back [`Compat::Legacy`] records whose
//! [`LegacyResponse::success`]/[`LegacyResponse::message`] accessors keep working (with a
//! deprecation warning per access), and a missing batch is reported as
//! [`ApiError::InvalidBatchNumber`]. [`CompatMode::Current`] returns records untouched.

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, config::CompatMode, error::ApiError, obs};

/// A record as returned by the client, in either presentation mode.
#[derive(Clone, Debug, PartialEq)]
pub enum Compat<T> {
	/// Plain record.
	Current(T),
	/// Record carrying the deprecated envelope accessors.
	Legacy(LegacyResponse<T>),
}
impl<T> Compat<T> {
	/// Wraps `value` according to `mode`.
	pub fn wrap(mode: CompatMode, value: T) -> Self {
		match mode {
			CompatMode::Current => Self::Current(value),
			CompatMode::Legacy => Self::Legacy(LegacyResponse::new(value)),
		}
	}

	/// Wraps every record in `values`.
	pub fn wrap_all(mode: CompatMode, values: Vec<T>) -> Vec<Self> {
		values.into_iter().map(|value| Self::wrap(mode, value)).collect()
	}

	/// Returns the record.
	pub fn into_inner(self) -> T {
		match self {
			Self::Current(value) => value,
			Self::Legacy(legacy) => legacy.into_inner(),
		}
	}

	/// Returns the legacy view, if this record was wrapped in legacy mode.
	pub fn as_legacy(&self) -> Option<&LegacyResponse<T>> {
		match self {
			Self::Current(_) => None,
			Self::Legacy(legacy) => Some(legacy),
		}
	}
}
impl<T> Deref for Compat<T> {
	type Target = T;

	fn deref(&self) -> &T {
		match self {
			Self::Current(value) => value,
			Self::Legacy(legacy) => legacy,
		}
	}
}

/// Record plus the always-successful envelope fields of the old format.
#[derive(Clone, Debug, PartialEq)]
pub struct LegacyResponse<T> {
	inner: T,
}
impl<T> LegacyResponse<T> {
	/// Wraps `inner`.
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Always `true`; errors are reported through `Result`.
	#[deprecated(note = "errors are reported through `Result`; use `CompatMode::Current`")]
	pub fn success(&self) -> bool {
		obs::deprecated_field("success");

		true
	}

	/// Always empty.
	#[deprecated(note = "the API no longer returns messages; use `CompatMode::Current`")]
	pub fn message(&self) -> &'static str {
		obs::deprecated_field("message");

		""
	}

	/// Returns the record.
	pub fn into_inner(self) -> T {
		self.inner
	}
}
impl<T> Deref for LegacyResponse<T> {
	type Target = T;

	fn deref(&self) -> &T {
		&self.inner
	}
}

/// Rewrites errors into the shape legacy callers expect.
pub fn map_error(mode: CompatMode, error: Error) -> Error {
	match (mode, error) {
		(CompatMode::Legacy, Error::Api(ApiError::BatchNotFound { batch })) =>
			ApiError::InvalidBatchNumber { batch }.into(),
		(_, error) => error,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	#[allow(deprecated)]
	fn legacy_records_keep_envelope_accessors() {
		let record = Compat::wrap(CompatMode::Legacy, String::from("n-1"));
		let legacy = record.as_legacy().expect("Legacy mode should wrap.");

		assert!(legacy.success());
		assert_eq!(legacy.message(), "");
		assert_eq!(record.len(), 3);
		assert_eq!(record.into_inner(), "n-1");
	}

	#[test]
	fn current_records_are_plain() {
		let records = Compat::wrap_all(CompatMode::Current, vec![1, 2]);

		assert!(records.iter().all(|record| record.as_legacy().is_none()));
		assert_eq!(records.into_iter().map(Compat::into_inner).collect::<Vec<_>>(), [1, 2]);
	}

	#[test]
	fn missing_batch_maps_only_in_legacy_mode() {
		let legacy = map_error(CompatMode::Legacy, ApiError::BatchNotFound { batch: 4 }.into());
		let current = map_error(CompatMode::Current, ApiError::BatchNotFound { batch: 4 }.into());

		assert!(matches!(legacy, Error::Api(ApiError::InvalidBatchNumber { batch: 4 })));
		assert!(matches!(current, Error::Api(ApiError::BatchNotFound { batch: 4 })));
	}
}
