//! Shared sliding-window request throttle.
//!
//! [`RequestThrottle`] bounds the combined request rate of every pooled secret to
//! `max_requests` admissions per rolling window. Callers block until capacity frees up; the
//! throttle never rejects. The admission queue is the only mutable state and each
//! evict/decide/record step runs under one lock, so two threads can never both observe spare
//! capacity and both slip past the cap. Waiting happens outside the lock.

// std
use std::{
	thread,
	time::{Duration, Instant},
};
// self
use crate::{_prelude::*, obs};

/// Throttle parameters that cannot produce a usable window.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ThrottleConfigError {
	/// `max_requests` must be positive.
	#[error("Throttle max_requests must be greater than zero.")]
	ZeroMaxRequests,
	/// `window_millis` must be positive.
	#[error("Throttle window_millis must be greater than zero.")]
	ZeroWindow,
}

/// Blocking sliding-window limiter shared by every outbound resource call.
pub struct RequestThrottle {
	max_requests: usize,
	window: Duration,
	admitted: Mutex<VecDeque<Instant>>,
}
impl RequestThrottle {
	const MIN_BACKOFF: Duration = Duration::from_millis(1);

	/// Creates a throttle admitting `max_requests` per `window_millis` milliseconds.
	pub fn new(max_requests: u32, window_millis: u64) -> Result<Self, ThrottleConfigError> {
		if max_requests == 0 {
			return Err(ThrottleConfigError::ZeroMaxRequests);
		}
		if window_millis == 0 {
			return Err(ThrottleConfigError::ZeroWindow);
		}

		let max_requests = max_requests as usize;

		Ok(Self {
			max_requests,
			window: Duration::from_millis(window_millis),
			admitted: Mutex::new(VecDeque::with_capacity(max_requests)),
		})
	}

	/// Creates a throttle admitting `max_requests` per second.
	pub fn per_second(max_requests: u32) -> Result<Self, ThrottleConfigError> {
		Self::new(max_requests, 1_000)
	}

	/// Blocks until the request may proceed, then records the admission.
	pub fn acquire(&self) {
		loop {
			match self.try_acquire() {
				Ok(()) => return,
				Err(wait) => {
					obs::record_throttle_wait(wait);
					thread::sleep(wait);
				},
			}
		}
	}

	/// Like [`acquire`](Self::acquire), but gives up with [`Error::ThrottleInterrupted`] once
	/// `interrupt` is triggered. An interrupted caller never consumes a permit.
	pub fn acquire_interruptible(&self, interrupt: &ThrottleInterrupt) -> Result<()> {
		loop {
			if interrupt.is_interrupted() {
				return Err(Error::ThrottleInterrupted);
			}

			match self.try_acquire() {
				Ok(()) => return Ok(()),
				Err(wait) => {
					obs::record_throttle_wait(wait);

					if interrupt.wait(wait) {
						return Err(Error::ThrottleInterrupted);
					}
				},
			}
		}
	}

	/// Runs one admission attempt without blocking.
	///
	/// Returns `Err(wait)` with the time until the oldest admission leaves the window, floored
	/// at one millisecond so retry loops never spin.
	pub fn try_acquire(&self) -> Result<(), Duration> {
		self.try_acquire_at(Instant::now())
	}

	pub(crate) fn try_acquire_at(&self, now: Instant) -> Result<(), Duration> {
		let mut admitted = self.admitted.lock();

		while admitted
			.front()
			.is_some_and(|oldest| now.saturating_duration_since(*oldest) >= self.window)
		{
			admitted.pop_front();
		}

		if admitted.len() < self.max_requests {
			admitted.push_back(now);

			return Ok(());
		}

		let oldest = admitted.front().copied().unwrap_or(now);
		let remaining = self.window.saturating_sub(now.saturating_duration_since(oldest));

		Err(remaining.max(Self::MIN_BACKOFF))
	}

	/// Maximum admissions per window.
	pub fn max_requests(&self) -> usize {
		self.max_requests
	}

	/// Window length.
	pub fn window(&self) -> Duration {
		self.window
	}

	/// Number of admissions still inside the trailing window.
	pub fn admitted_in_window(&self) -> usize {
		let now = Instant::now();

		self.admitted
			.lock()
			.iter()
			.filter(|at| now.saturating_duration_since(**at) < self.window)
			.count()
	}
}
impl Debug for RequestThrottle {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestThrottle")
			.field("max_requests", &self.max_requests)
			.field("window", &self.window)
			.finish()
	}
}

/// Cloneable cancellation handle for [`RequestThrottle::acquire_interruptible`].
///
/// Triggering the handle wakes every caller currently waiting with it and fails any later
/// attempt until [`reset`](Self::reset) is called.
#[derive(Clone, Default)]
pub struct ThrottleInterrupt(Arc<InterruptState>);
impl ThrottleInterrupt {
	/// Creates an untriggered handle.
	pub fn new() -> Self {
		Self::default()
	}

	/// Triggers the interrupt and wakes all waiters.
	pub fn interrupt(&self) {
		*self.0.triggered.lock() = true;

		self.0.wake.notify_all();
	}

	/// Clears a previous trigger.
	pub fn reset(&self) {
		*self.0.triggered.lock() = false;
	}

	/// Returns `true` once the handle has been triggered.
	pub fn is_interrupted(&self) -> bool {
		*self.0.triggered.lock()
	}

	// Waits up to `timeout`; returns whether the handle was triggered.
	fn wait(&self, timeout: Duration) -> bool {
		let mut triggered = self.0.triggered.lock();

		if !*triggered {
			self.0.wake.wait_for(&mut triggered, timeout);
		}

		*triggered
	}
}
impl Debug for ThrottleInterrupt {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ThrottleInterrupt").field(&self.is_interrupted()).finish()
	}
}

#[derive(Default)]
struct InterruptState {
	triggered: Mutex<bool>,
	wake: Condvar,
}
