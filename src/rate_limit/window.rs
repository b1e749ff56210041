//! Admission bookkeeping: the trailing request window and the daily budget.

// crates.io
use tokio::time::Instant;
// self
use crate::{_prelude::*, error::ApiError};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Admission instants inside the trailing window, oldest first.
#[derive(Debug)]
pub struct SlidingWindow {
	admissions: VecDeque<Instant>,
	capacity: usize,
	window: Duration,
}
impl SlidingWindow {
	/// Creates an empty window admitting `capacity` requests per `window`.
	pub fn new(capacity: u32, window: Duration) -> Self {
		let capacity = usize::try_from(capacity).unwrap_or(usize::MAX);

		Self { admissions: VecDeque::with_capacity(capacity.min(1_024)), capacity, window }
	}

	/// Records an admission at `now` if it fits; otherwise returns how long to wait before the
	/// oldest admission leaves the window.
	pub fn try_admit(&mut self, now: Instant) -> Result<(), Duration> {
		self.prune(now);

		if self.admissions.len() < self.capacity {
			self.admissions.push_back(now);

			return Ok(());
		}

		let wait = self
			.admissions
			.front()
			.map(|oldest| self.window.saturating_sub(now.saturating_duration_since(*oldest)))
			.unwrap_or(self.window);

		Err(wait)
	}

	/// Number of admissions still inside the window at `now`.
	pub fn len_at(&mut self, now: Instant) -> usize {
		self.prune(now);

		self.admissions.len()
	}

	fn prune(&mut self, now: Instant) {
		while let Some(oldest) = self.admissions.front() {
			if now.saturating_duration_since(*oldest) >= self.window {
				self.admissions.pop_front();
			} else {
				break;
			}
		}
	}
}

/// Admissions counted against a rolling 24-hour budget.
#[derive(Debug)]
pub struct DailyQuota {
	limit: Option<u32>,
	count: u32,
	resets_at: Instant,
}
impl DailyQuota {
	/// Starts a fresh budget at `now`.
	pub fn new(limit: Option<u32>, now: Instant) -> Self {
		Self { limit, count: 0, resets_at: now + DAY }
	}

	/// Fails when the budget for the current day is spent.
	pub fn check(&mut self, now: Instant) -> Result<(), ApiError> {
		self.roll(now);

		match self.limit {
			Some(limit) if self.count >= limit =>
				Err(ApiError::DailyLimitExceeded { limit, resets_in: self.resets_at - now }),
			_ => Ok(()),
		}
	}

	/// Counts one admission at `now`.
	pub fn record(&mut self, now: Instant) {
		self.roll(now);

		self.count = self.count.saturating_add(1);
	}

	/// Admissions recorded since the last reset.
	pub fn count(&self) -> u32 {
		self.count
	}

	fn roll(&mut self, now: Instant) {
		if now >= self.resets_at {
			self.count = 0;
			self.resets_at = now + DAY;
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn entry_leaves_window_at_exact_boundary() {
		let start = Instant::now();
		let mut window = SlidingWindow::new(1, Duration::from_secs(60));

		window.try_admit(start).expect("First admission should fit.");

		assert_eq!(
			window.try_admit(start + Duration::from_secs(20)),
			Err(Duration::from_secs(40))
		);
		assert_eq!(window.len_at(start + Duration::from_secs(59)), 1);
		assert_eq!(window.len_at(start + Duration::from_secs(60)), 0);
		assert!(window.try_admit(start + Duration::from_secs(60)).is_ok());
	}

	#[test]
	fn quota_reports_time_until_reset() {
		let start = Instant::now();
		let mut quota = DailyQuota::new(Some(1), start);

		quota.record(start);

		let err = quota
			.check(start + Duration::from_secs(3_600))
			.expect_err("Spent quota should refuse further requests.");

		assert!(matches!(
			err,
			ApiError::DailyLimitExceeded { limit: 1, resets_in } if resets_in == DAY - Duration::from_secs(3_600)
		));
	}

	#[test]
	fn unlimited_quota_always_admits() {
		let start = Instant::now();
		let mut quota = DailyQuota::new(None, start);

		for _ in 0..1_000 {
			quota.record(start);
		}

		assert!(quota.check(start).is_ok());
		assert_eq!(quota.count(), 1_000);
	}
}
