//! Sliding-window admission control plus exponential backoff for throttled responses.
//!
//! [`RateLimiter::acquire`] suspends callers until one more request fits inside the trailing
//! window, and [`RateLimiter::handle_rate_limit_error`] sleeps between retries after the
//! upstream answers with HTTP 429. All bookkeeping sits behind short `parking_lot` critical
//! sections that never span an `.await`, so a cancelled waiter never records an admission.

mod backoff;
mod window;

pub use backoff::*;
pub use window::*;

// crates.io
use tokio::time::{self, Instant};
// self
use crate::{
	_prelude::*,
	config::Environment,
	error::{ApiError, ConfigError},
	obs,
};

/// Tunables for [`RateLimiter`].
#[derive(Clone, Debug, PartialEq)]
pub struct RateLimitConfig {
	/// Admission ceiling inside one trailing window.
	pub requests_per_window: u32,
	/// Length of the trailing window.
	pub window: Duration,
	/// Delay before the first retry when upstream gives no hint.
	pub base_delay: Duration,
	/// Upper bound on a computed (non-hinted) backoff delay.
	pub max_delay: Duration,
	/// Consecutive throttling signals tolerated before giving up.
	pub max_attempts: u32,
	/// Random spread applied to computed delays, as a fraction in `[0, 1]`.
	pub jitter_ratio: f64,
	/// Optional cap on admissions per 24 hours.
	pub daily_limit: Option<u32>,
}
impl RateLimitConfig {
	const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
	const DEFAULT_MAX_ATTEMPTS: u32 = 3;
	const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(300);
	const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

	/// Creates a config admitting `requests_per_minute` per 60-second window.
	pub fn per_minute(requests_per_minute: u32) -> Self {
		Self {
			requests_per_window: requests_per_minute,
			window: Self::DEFAULT_WINDOW,
			base_delay: Self::DEFAULT_BASE_DELAY,
			max_delay: Self::DEFAULT_MAX_DELAY,
			max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
			jitter_ratio: 0.,
			daily_limit: None,
		}
	}

	/// Returns the published limits for `environment`.
	pub fn for_environment(environment: Environment) -> Self {
		Self::per_minute(environment.requests_per_minute())
			.with_daily_limit(Some(environment.daily_limit()))
	}

	/// Overrides the trailing window length.
	pub fn with_window(mut self, window: Duration) -> Self {
		self.window = window;

		self
	}

	/// Overrides the base backoff delay.
	pub fn with_base_delay(mut self, delay: Duration) -> Self {
		self.base_delay = delay;

		self
	}

	/// Overrides the backoff delay cap.
	pub fn with_max_delay(mut self, delay: Duration) -> Self {
		self.max_delay = delay;

		self
	}

	/// Overrides the backoff attempt cap.
	pub fn with_max_attempts(mut self, attempts: u32) -> Self {
		self.max_attempts = attempts;

		self
	}

	/// Overrides the jitter ratio.
	pub fn with_jitter_ratio(mut self, ratio: f64) -> Self {
		self.jitter_ratio = ratio;

		self
	}

	/// Sets or clears the daily admission cap.
	pub fn with_daily_limit(mut self, limit: Option<u32>) -> Self {
		self.daily_limit = limit;

		self
	}

	/// Checks the invariants enforced by [`RateLimiter::new`].
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.requests_per_window == 0 {
			return Err(ConfigError::InvalidRateLimit { reason: "requests_per_window must be > 0" });
		}
		if self.window.is_zero() {
			return Err(ConfigError::InvalidRateLimit { reason: "window must be > 0" });
		}
		if self.max_attempts == 0 {
			return Err(ConfigError::InvalidRateLimit { reason: "max_attempts must be > 0" });
		}
		if self.max_delay < self.base_delay {
			return Err(ConfigError::InvalidRateLimit { reason: "max_delay must be >= base_delay" });
		}
		if !(0. ..=1.).contains(&self.jitter_ratio) {
			return Err(ConfigError::InvalidRateLimit { reason: "jitter_ratio must be within [0, 1]" });
		}
		if self.daily_limit == Some(0) {
			return Err(ConfigError::InvalidRateLimit { reason: "daily_limit must be > 0" });
		}

		Ok(())
	}
}
impl Default for RateLimitConfig {
	fn default() -> Self {
		Self::for_environment(Environment::default())
	}
}

/// Admission gate consulted before every network call.
#[derive(Debug)]
pub struct RateLimiter {
	config: RateLimitConfig,
	window: Mutex<SlidingWindow>,
	daily: Mutex<DailyQuota>,
	backoff: Mutex<BackoffState>,
}
impl RateLimiter {
	/// Builds a limiter after validating `config`.
	pub fn new(config: RateLimitConfig) -> Result<Self, ConfigError> {
		config.validate()?;

		let now = Instant::now();

		Ok(Self {
			window: Mutex::new(SlidingWindow::new(config.requests_per_window, config.window)),
			daily: Mutex::new(DailyQuota::new(config.daily_limit, now)),
			backoff: Mutex::new(BackoffState::default()),
			config,
		})
	}

	/// Returns the active configuration.
	pub fn config(&self) -> &RateLimitConfig {
		&self.config
	}

	/// Suspends until one more admission keeps the trailing window under the ceiling, then
	/// records it. Never fails; the daily budget is counted but not enforced.
	pub async fn acquire(&self) {
		// Only the budget check can fail, and it is skipped here.
		let _ = self.admit(false).await;
	}

	/// Like [`Self::acquire`], but fails without waiting once the daily budget is spent.
	///
	/// The budget check and the admission are taken under the daily lock together, so concurrent
	/// callers cannot overshoot the budget.
	pub async fn acquire_within_budget(&self) -> Result<(), ApiError> {
		self.admit(true).await
	}

	async fn admit(&self, enforce_budget: bool) -> Result<(), ApiError> {
		let mut waited = Duration::ZERO;

		loop {
			let wait = {
				let now = Instant::now();
				let mut daily = self.daily.lock();

				if enforce_budget {
					daily.check(now)?;
				}

				match self.window.lock().try_admit(now) {
					Ok(()) => {
						daily.record(now);

						break;
					},
					Err(wait) => wait,
				}
			};

			obs::rate_limit_wait(wait);
			time::sleep(wait).await;

			waited += wait;
		}

		if !waited.is_zero() {
			obs::record_rate_limit_wait(waited);
		}

		Ok(())
	}

	/// Fails when the daily budget is spent, without recording anything.
	pub fn check_daily_quota(&self) -> Result<(), ApiError> {
		self.daily.lock().check(Instant::now())
	}

	/// Sleeps before the next retry of a throttled request, or reports that the attempt budget
	/// is spent.
	///
	/// `retry_after` takes precedence over the computed exponential delay. Exhaustion resets the
	/// attempt counter so the next operation starts fresh.
	pub async fn handle_rate_limit_error(&self, retry_after: Option<Duration>) -> BackoffOutcome {
		let outcome = self.backoff.lock().advance(&self.config, retry_after);

		if let BackoffOutcome::Retry { delay, attempt } = outcome {
			obs::backoff_sleep(attempt, delay);
			time::sleep(delay).await;
		}

		outcome
	}

	/// Clears the backoff counter after a non-throttled response.
	pub fn record_success(&self) {
		self.backoff.lock().reset();
	}

	/// Consecutive throttling signals seen since the last reset.
	pub fn attempts(&self) -> u32 {
		self.backoff.lock().attempt()
	}

	/// Admissions currently counted inside the trailing window.
	pub fn in_flight_window(&self) -> usize {
		self.window.lock().len_at(Instant::now())
	}

	/// Admissions counted against the current daily budget.
	pub fn daily_count(&self) -> u32 {
		self.daily.lock().count()
	}
}
