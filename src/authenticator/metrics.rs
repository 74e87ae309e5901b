// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing authenticator activity.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	successes: AtomicU64,
	failures: AtomicU64,
	fast_path: AtomicU64,
	aborts: AtomicU64,
}
impl RefreshMetrics {
	/// Returns the total number of refresh-endpoint invocations.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh invocations that produced a new token pair.
	pub fn successes(&self) -> u64 {
		self.successes.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh invocations that failed.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	/// Returns the number of callers re-signed without any network call.
	pub fn fast_path_hits(&self) -> u64 {
		self.fast_path.load(Ordering::Relaxed)
	}

	/// Returns the number of callers turned away by an armed abort flag.
	pub fn aborted_waits(&self) -> u64 {
		self.aborts.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.successes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_fast_path(&self) {
		self.fast_path.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_aborted_wait(&self) {
		self.aborts.fetch_add(1, Ordering::Relaxed);
	}
}
