//! Client-level error types shared across authentication, transport, and API layers.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// JSON decoding failure annotated with the path of the offending field.
pub type JsonPathError = serde_path_to_error::Error<serde_json::Error>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token endpoint failure.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Upstream API returned an error or an unusable payload.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Transport failure (DNS, TCP, TLS, timeouts).
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl Error {
	/// Returns `true` when retrying the same call later may succeed.
	pub fn is_retryable(&self) -> bool {
		match self {
			Self::Transport(_) => true,
			Self::Api(ApiError::RateLimited { .. } | ApiError::DailyLimitExceeded { .. }) => true,
			Self::Api(ApiError::Server { .. }) => true,
			Self::Auth(AuthError::TokenEndpoint { status, .. }) => *status >= 500,
			_ => false,
		}
	}

	/// Returns the upstream or locally computed wait hint, if one is known.
	pub fn retry_after(&self) -> Option<Duration> {
		match self {
			Self::Api(ApiError::RateLimited { retry_after, .. }) => *retry_after,
			Self::Api(ApiError::DailyLimitExceeded { resets_in, .. }) => Some(*resets_in),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised while constructing client components.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL `{url}` is invalid.")]
	InvalidBaseUrl {
		/// Raw URL that failed to parse.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Client credentials were not supplied.
	#[error("Missing credential `{name}`.")]
	MissingCredentials {
		/// Credential or environment variable name.
		name: &'static str,
	},
	/// Environment label is neither `production` nor `test`.
	#[error("Unknown environment `{value}`; expected `production` or `test`.")]
	UnknownEnvironment {
		/// Label that failed to parse.
		value: String,
	},
	/// Resource label is neither `prices` nor `forecourts`.
	#[error("Unknown resource `{value}`; expected `prices` or `forecourts`.")]
	UnknownResource {
		/// Label that failed to parse.
		value: String,
	},
	/// Cache TTL must be strictly positive.
	#[error("Cache TTL must be positive.")]
	NonPositiveTtl,
	/// Request timeout must be strictly positive.
	#[error("Request timeout must be positive.")]
	NonPositiveTimeout,
	/// Retry budget must allow at least one attempt.
	#[error("Maximum retries must be at least 1.")]
	InvalidRetryCount,
	/// Rate limiter settings are inconsistent.
	#[error("Invalid rate limit configuration: {reason}.")]
	InvalidRateLimit {
		/// Which constraint failed.
		reason: &'static str,
	},
	/// Batch numbers start at 1.
	#[error("Batch number must be at least 1.")]
	InvalidBatchNumber,
	/// Timestamp filter does not match `YYYY-MM-DD HH:MM:SS`.
	#[error("Timestamp `{value}` must use the `YYYY-MM-DD HH:MM:SS` format.")]
	InvalidTimestamp {
		/// Rejected input.
		value: String,
	},
	/// Coordinate or radius is out of range.
	#[error("Invalid {name}: {value}.")]
	InvalidCoordinate {
		/// Parameter name.
		name: &'static str,
		/// Rejected value.
		value: f64,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Token endpoint failures.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Token endpoint rejected the client credentials.
	#[error("Token endpoint rejected the client credentials.")]
	InvalidCredentials,
	/// Refresh endpoint rejected the refresh token.
	#[error("Refresh endpoint rejected the refresh token (HTTP {status}).")]
	RefreshRejected {
		/// HTTP status code.
		status: u16,
	},
	/// Token endpoint responded with an unexpected status.
	#[error("Token endpoint returned HTTP {status}: {message}.")]
	TokenEndpoint {
		/// HTTP status code.
		status: u16,
		/// Response body or summary.
		message: String,
	},
	/// Token endpoint responded with a body that could not be decoded.
	#[error("Token endpoint returned a malformed body.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: JsonPathError,
	},
	/// Token endpoint returned a non-positive lifetime.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
}

/// Failures reported by, or derived from, the Fuel Finder API.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// Resource does not exist.
	#[error("Resource not found: {url}.")]
	NotFound {
		/// Requested URL.
		url: String,
	},
	/// Requested batch is past the end of the data set.
	#[error("Batch {batch} was not found.")]
	BatchNotFound {
		/// Requested batch number.
		batch: u32,
	},
	/// Legacy-mode rendering of [`ApiError::BatchNotFound`].
	#[error("Invalid batch number: {batch}.")]
	InvalidBatchNumber {
		/// Requested batch number.
		batch: u32,
	},
	/// API rejected the request parameters.
	#[error("Request validation failed: {message}.")]
	Validation {
		/// Response body or summary.
		message: String,
	},
	/// API rejected the bearer token.
	#[error("Unauthorized; the access token was rejected.")]
	Unauthorized,
	/// Throttling persisted past the backoff budget.
	#[error("Rate limit exceeded after {attempts} backoff attempts.")]
	RateLimited {
		/// Backoff attempts made before giving up.
		attempts: u32,
		/// Last `Retry-After` hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Local daily request budget is spent.
	#[error("Daily request limit of {limit} reached; resets in {}s.", .resets_in.as_secs())]
	DailyLimitExceeded {
		/// Configured daily limit.
		limit: u32,
		/// Time until the budget resets.
		resets_in: Duration,
	},
	/// Upstream server failure.
	#[error("Server error (HTTP {status}): {message}.")]
	Server {
		/// HTTP status code.
		status: u16,
		/// Response body or summary.
		message: String,
	},
	/// Status outside the documented set.
	#[error("Unexpected HTTP {status}: {message}.")]
	UnexpectedStatus {
		/// HTTP status code.
		status: u16,
		/// Response body or summary.
		message: String,
	},
	/// Response body could not be decoded.
	#[error("Failed to decode response from {endpoint}.")]
	ResponseParse {
		/// Endpoint path that produced the body.
		endpoint: String,
		/// Structured parsing failure.
		#[source]
		source: JsonPathError,
	},
	/// Record still carries retired envelope fields.
	#[error("Response record carries deprecated fields: {}.", .fields.join(", "))]
	DeprecatedFields {
		/// Offending field names.
		fields: Vec<String>,
	},
}

/// Transport-level failures (network, timeouts).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Request did not complete within the configured timeout.
	#[error("Request timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout { source: Box::new(e) } } else { Self::network(e) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn retry_hints_follow_variant() {
		let limited: Error =
			ApiError::RateLimited { attempts: 3, retry_after: Some(Duration::from_secs(5)) }.into();
		let daily: Error =
			ApiError::DailyLimitExceeded { limit: 10, resets_in: Duration::from_secs(30) }.into();
		let invalid: Error = AuthError::InvalidCredentials.into();

		assert!(limited.is_retryable());
		assert_eq!(limited.retry_after(), Some(Duration::from_secs(5)));
		assert_eq!(daily.retry_after(), Some(Duration::from_secs(30)));
		assert!(!invalid.is_retryable());
		assert_eq!(invalid.retry_after(), None);
	}

	#[test]
	fn deprecated_fields_are_listed() {
		let err = ApiError::DeprecatedFields { fields: vec!["success".into(), "message".into()] };

		assert_eq!(err.to_string(), "Response record carries deprecated fields: success, message.");
	}
}
