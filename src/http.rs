//! Authenticated GET transport for the Fuel Finder API.
//!
//! Every request is admitted by the limiter (daily budget and sliding window), then carries a
//! bearer token from the [`Authenticator`]. HTTP 429 responses go through the limiter's
//! backoff, transport failures are retried up to the configured budget, and other statuses are
//! mapped onto [`ApiError`] variants. Successful bodies are returned with the `data` wrapper
//! removed.

// crates.io
use reqwest::header::{HeaderMap, RETRY_AFTER, USER_AGENT};
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	auth::Authenticator,
	config::ClientConfig,
	error::{ApiError, ConfigError, JsonPathError, TransportError},
	obs,
	rate_limit::{BackoffOutcome, RateLimiter},
};

/// Query parameter carrying the 1-based batch index.
pub const BATCH_NUMBER_PARAM: &str = "batch-number";
/// Query parameter carrying the incremental-update cutoff.
pub const EFFECTIVE_START_PARAM: &str = "effective-start-timestamp";

const BODY_SUMMARY_LIMIT: usize = 512;

/// Query parameters as sent on the wire.
pub type QueryParams = Vec<(&'static str, String)>;

/// Builds the reqwest client used for API and token calls.
pub fn build_reqwest_client(config: &ClientConfig) -> Result<ReqwestClient, ConfigError> {
	ReqwestClient::builder()
		.timeout(config.timeout)
		.build()
		.map_err(ConfigError::http_client_build)
}

/// GET transport wired to the limiter and authenticator.
#[derive(Debug)]
pub struct ApiHttpClient {
	http: ReqwestClient,
	base_url: Url,
	max_retries: u32,
	auth: Arc<Authenticator>,
	limiter: Arc<RateLimiter>,
}
impl ApiHttpClient {
	/// Creates a transport over `http` for the API root in `config`.
	pub fn new(
		config: &ClientConfig,
		http: ReqwestClient,
		auth: Arc<Authenticator>,
		limiter: Arc<RateLimiter>,
	) -> Self {
		Self { http, base_url: config.base_url.clone(), max_retries: config.max_retries, auth, limiter }
	}

	/// Returns the shared limiter.
	pub fn limiter(&self) -> &Arc<RateLimiter> {
		&self.limiter
	}

	/// Returns the shared authenticator.
	pub fn authenticator(&self) -> &Arc<Authenticator> {
		&self.auth
	}

	/// Absolute URL for `endpoint`.
	pub fn url(&self, endpoint: &str) -> String {
		format!(
			"{}/{}",
			self.base_url.as_str().trim_end_matches('/'),
			endpoint.trim_start_matches('/')
		)
	}

	/// Issues an authenticated GET and returns the unwrapped JSON payload.
	pub async fn get(&self, endpoint: &str, params: &[(&'static str, String)]) -> Result<Value> {
		let url = self.url(endpoint);
		let mut failures = 0;

		loop {
			self.limiter.acquire_within_budget().await?;

			let token = self.auth.access_token().await?;

			obs::request_dispatched(endpoint, failures + 1);

			let sent = self
				.http
				.get(&url)
				.header(USER_AGENT, concat!("fuel-finder/", env!("CARGO_PKG_VERSION")))
				.bearer_auth(token.expose())
				.query(params)
				.send()
				.await;
			let response = match sent {
				Ok(response) => response,
				Err(e) => {
					failures += 1;

					if failures < self.max_retries {
						obs::transport_retry(endpoint, failures, &e);

						continue;
					}

					return Err(TransportError::from(e).into());
				},
			};
			let status = response.status().as_u16();
			let retry_after = parse_retry_after(response.headers());
			let bytes = match response.bytes().await {
				Ok(bytes) => bytes,
				Err(e) => {
					failures += 1;

					if failures < self.max_retries {
						obs::transport_retry(endpoint, failures, &e);

						continue;
					}

					return Err(TransportError::from(e).into());
				},
			};

			if status == 429 {
				match self.limiter.handle_rate_limit_error(retry_after).await {
					BackoffOutcome::Retry { .. } => continue,
					BackoffOutcome::Exhausted { attempts } =>
						return Err(ApiError::RateLimited { attempts, retry_after }.into()),
				}
			}

			self.limiter.record_success();

			return match status {
				200..=299 => decode_json(&bytes).map(unwrap_envelope).map_err(|source| {
					ApiError::ResponseParse { endpoint: endpoint.to_owned(), source }.into()
				}),
				401 => {
					self.auth.invalidate();

					Err(ApiError::Unauthorized.into())
				},
				_ => Err(map_error_status(status, &url, params, &bytes).into()),
			};
		}
	}
}

fn map_error_status(
	status: u16,
	url: &str,
	params: &[(&'static str, String)],
	body: &[u8],
) -> ApiError {
	match status {
		400 => ApiError::Validation { message: body_summary(body) },
		404 => match batch_number(params) {
			Some(batch) => ApiError::BatchNotFound { batch },
			None => ApiError::NotFound { url: url.to_owned() },
		},
		500.. => ApiError::Server { status, message: body_summary(body) },
		_ => ApiError::UnexpectedStatus { status, message: body_summary(body) },
	}
}

fn batch_number(params: &[(&'static str, String)]) -> Option<u32> {
	params
		.iter()
		.find(|(name, _)| *name == BATCH_NUMBER_PARAM)
		.and_then(|(_, value)| value.parse().ok())
}

/// Parses a JSON body, reporting the failing path on error.
pub(crate) fn decode_json(bytes: &[u8]) -> Result<Value, JsonPathError> {
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut deserializer)
}

/// Strips the `{"data": ...}` wrapper (with or without `success`/`message` siblings).
pub(crate) fn unwrap_envelope(value: Value) -> Value {
	match value {
		Value::Object(mut map) if map.contains_key("data") =>
			map.remove("data").unwrap_or(Value::Null),
		other => other,
	}
}

/// Lossy, truncated rendering of a response body for error messages.
pub(crate) fn body_summary(bytes: &[u8]) -> String {
	let text = String::from_utf8_lossy(bytes);
	let text = text.trim();

	match text.char_indices().nth(BODY_SUMMARY_LIMIT) {
		Some((cut, _)) => format!("{}...", &text[..cut]),
		None => text.to_owned(),
	}
}

/// Reads `Retry-After` as delta-seconds or an HTTP date; zero or past values yield `None`.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return (secs > 0).then(|| Duration::from_secs(secs));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Duration::try_from(delta).ok();
		}
	}

	None
}
