//! Exponential backoff state for consecutive throttling responses.

// crates.io
use rand::Rng;
// self
use crate::{_prelude::*, rate_limit::RateLimitConfig};

/// Result of [`RateLimiter::handle_rate_limit_error`](crate::rate_limit::RateLimiter::handle_rate_limit_error).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackoffOutcome {
	/// The limiter slept for `delay`; the caller should retry.
	Retry {
		/// Time slept before returning.
		delay: Duration,
		/// Attempt number this sleep belonged to, starting at 1.
		attempt: u32,
	},
	/// The attempt budget is spent; the caller should fail the operation.
	Exhausted {
		/// Attempts made before giving up.
		attempts: u32,
	},
}
impl BackoffOutcome {
	/// Returns `true` for [`BackoffOutcome::Retry`].
	pub fn should_retry(&self) -> bool {
		matches!(self, Self::Retry { .. })
	}
}

/// Count of consecutive throttling signals.
#[derive(Debug, Default)]
pub struct BackoffState {
	attempt: u32,
}
impl BackoffState {
	/// Decides the next delay and bumps the counter, or resets it once the cap is reached.
	pub fn advance(&mut self, config: &RateLimitConfig, hint: Option<Duration>) -> BackoffOutcome {
		if self.attempt >= config.max_attempts {
			let attempts = self.attempt;

			self.reset();

			return BackoffOutcome::Exhausted { attempts };
		}

		let delay = match hint {
			Some(delay) => delay,
			None => jittered(
				exponential_delay(config.base_delay, self.attempt).min(config.max_delay),
				config.jitter_ratio,
			),
		};

		self.attempt += 1;

		BackoffOutcome::Retry { delay, attempt: self.attempt }
	}

	/// Returns the counter to zero.
	pub fn reset(&mut self) {
		self.attempt = 0;
	}

	/// Current counter value.
	pub fn attempt(&self) -> u32 {
		self.attempt
	}
}

/// `base * 2^attempt`, saturating at [`Duration::MAX`].
pub fn exponential_delay(base: Duration, attempt: u32) -> Duration {
	2_u32.checked_pow(attempt).and_then(|factor| base.checked_mul(factor)).unwrap_or(Duration::MAX)
}

fn jittered(delay: Duration, ratio: f64) -> Duration {
	if ratio <= 0. || delay.is_zero() {
		return delay;
	}

	let spread = rand::rng().random_range(-ratio..=ratio);

	Duration::try_from_secs_f64(delay.as_secs_f64() * (1. + spread)).unwrap_or(delay)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn exponential_delay_saturates() {
		assert_eq!(exponential_delay(Duration::from_secs(1), 0), Duration::from_secs(1));
		assert_eq!(exponential_delay(Duration::from_secs(1), 3), Duration::from_secs(8));
		assert_eq!(exponential_delay(Duration::from_secs(1), 40), Duration::MAX);
	}

	#[test]
	fn computed_delay_respects_cap() {
		let config = RateLimitConfig::per_minute(1)
			.with_max_attempts(10)
			.with_max_delay(Duration::from_secs(3));
		let mut state = BackoffState::default();
		let delays = (0..4)
			.map(|_| match state.advance(&config, None) {
				BackoffOutcome::Retry { delay, .. } => delay,
				BackoffOutcome::Exhausted { .. } => panic!("Budget should not be spent."),
			})
			.collect::<Vec<_>>();

		assert_eq!(delays, [1, 2, 3, 3].map(Duration::from_secs));
	}

	#[test]
	fn jitter_stays_within_ratio() {
		let base = Duration::from_secs(10);

		for _ in 0..100 {
			let delay = jittered(base, 0.2);

			assert!(delay >= Duration::from_millis(7_999) && delay <= Duration::from_millis(12_001));
		}

		assert_eq!(jittered(base, 0.), base);
	}
}
