// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing how key exchanges were satisfied.
#[derive(Debug, Default)]
pub struct ExchangeMetrics {
	exchanges: AtomicU64,
	reused: AtomicU64,
	created: AtomicU64,
	revoked: AtomicU64,
	revoke_failures: AtomicU64,
}
impl ExchangeMetrics {
	/// Returns the number of completed exchanges.
	pub fn exchanges(&self) -> u64 {
		self.exchanges.load(Ordering::Relaxed)
	}

	/// Returns the number of existing keys handed back without creating anything.
	pub fn keys_reused(&self) -> u64 {
		self.reused.load(Ordering::Relaxed)
	}

	/// Returns the number of keys created.
	pub fn keys_created(&self) -> u64 {
		self.created.load(Ordering::Relaxed)
	}

	/// Returns the number of stale keys revoked.
	pub fn keys_revoked(&self) -> u64 {
		self.revoked.load(Ordering::Relaxed)
	}

	/// Returns the number of reconciliation failures that were swallowed.
	pub fn revoke_failures(&self) -> u64 {
		self.revoke_failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_exchange(&self, reused: usize, created: usize, revoked: usize) {
		self.exchanges.fetch_add(1, Ordering::Relaxed);
		self.reused.fetch_add(reused as u64, Ordering::Relaxed);
		self.created.fetch_add(created as u64, Ordering::Relaxed);
		self.revoked.fetch_add(revoked as u64, Ordering::Relaxed);
	}

	pub(crate) fn record_revoke_failure(&self) {
		self.revoke_failures.fetch_add(1, Ordering::Relaxed);
	}
}
