// self
use crate::{_prelude::*, obs::Operation};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedRequest<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedRequest<F> = F;

/// A span wrapping one client operation.
#[derive(Clone, Debug)]
pub struct ApiSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl ApiSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(operation: Operation, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("fuel_finder.request", operation = operation.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (operation, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRequest<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs an outbound GET.
pub fn request_dispatched(endpoint: &str, attempt: u32) {
	#[cfg(feature = "tracing")]
	tracing::debug!(endpoint, attempt, "dispatching request");
	#[cfg(not(feature = "tracing"))]
	let _ = (endpoint, attempt);
}

/// Logs a limiter wait before admission.
pub fn rate_limit_wait(wait: Duration) {
	#[cfg(feature = "tracing")]
	tracing::debug!(wait_ms = wait.as_millis() as u64, "rate limit window full; waiting");
	#[cfg(not(feature = "tracing"))]
	let _ = wait;
}

/// Logs a backoff sleep after a throttling response.
pub fn backoff_sleep(attempt: u32, delay: Duration) {
	#[cfg(feature = "tracing")]
	tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, "throttled; backing off");
	#[cfg(not(feature = "tracing"))]
	let _ = (attempt, delay);
}

/// Logs a transport failure that will be retried.
pub fn transport_retry(endpoint: &str, attempt: u32, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(endpoint, attempt, %error, "transport failure; retrying");
	#[cfg(not(feature = "tracing"))]
	let _ = (endpoint, attempt, error);
}

/// Logs a failed token refresh before falling back to a new client-credentials exchange.
pub fn token_refresh_fallback(error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	tracing::debug!(%error, "token refresh failed; requesting a new token");
	#[cfg(not(feature = "tracing"))]
	let _ = error;
}

/// Logs a capacity eviction from the response cache.
pub fn cache_evicted(size: usize) {
	#[cfg(feature = "tracing")]
	tracing::debug!(size, "response cache full; evicted soonest-expiring entry");
	#[cfg(not(feature = "tracing"))]
	let _ = size;
}

/// Logs access to a field kept only for backward compatibility.
pub fn deprecated_field(field: &'static str) {
	#[cfg(feature = "tracing")]
	tracing::warn!(
		field,
		"`{field}` is deprecated and will be removed; switch the client to CompatMode::Current"
	);
	#[cfg(not(feature = "tracing"))]
	let _ = field;
}
