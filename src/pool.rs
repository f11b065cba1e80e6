//! Lock-free round-robin selection over a fixed set of API secrets.
//!
//! The secret list is frozen at construction; only the atomic cursor moves. Each call to
//! [`TokenPool::next`] claims one cursor value with a single `fetch_add`, so fairness holds in
//! logical call order: across any `len()` consecutive claims every secret is handed out exactly
//! once, however the calling threads interleave.

// std
use std::sync::atomic::{AtomicUsize, Ordering};
// self
use crate::{_prelude::*, auth::ApiSecret};

/// Errors raised while building a [`TokenPool`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum PoolError {
	/// No secrets were supplied.
	#[error("Token pool requires at least one secret.")]
	Empty,
}

/// Immutable round-robin rotator shared by every thread issuing resource calls.
pub struct TokenPool {
	secrets: Arc<[ApiSecret]>,
	cursor: AtomicUsize,
}
impl TokenPool {
	/// Copies `secrets` into a new pool; fails when the sequence is empty.
	pub fn new<I>(secrets: I) -> Result<Self, PoolError>
	where
		I: IntoIterator,
		I::Item: Into<ApiSecret>,
	{
		let secrets = secrets.into_iter().map(Into::into).collect::<Arc<[ApiSecret]>>();

		if secrets.is_empty() {
			return Err(PoolError::Empty);
		}

		Ok(Self { secrets, cursor: AtomicUsize::new(0) })
	}

	/// Returns the next secret in rotation. Never blocks.
	pub fn next(&self) -> &ApiSecret {
		let claimed = self.cursor.fetch_add(1, Ordering::Relaxed);

		&self.secrets[claimed % self.secrets.len()]
	}

	/// Returns the first secret in construction order.
	pub fn first(&self) -> &ApiSecret {
		&self.secrets[0]
	}

	/// Returns every pooled secret in construction order.
	pub fn secrets(&self) -> &[ApiSecret] {
		&self.secrets
	}

	/// Number of pooled secrets.
	pub fn len(&self) -> usize {
		self.secrets.len()
	}

	/// Always `false`; construction rejects empty pools.
	pub fn is_empty(&self) -> bool {
		self.secrets.is_empty()
	}
}
impl Debug for TokenPool {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenPool")
			.field("len", &self.secrets.len())
			.field("cursor", &self.cursor.load(Ordering::Relaxed))
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::thread;
	// self
	use super::*;

	fn pool(values: &[&str]) -> TokenPool {
		TokenPool::new(values.iter().copied()).expect("Pool fixture should build.")
	}

	#[test]
	fn rotates_in_construction_order() {
		let pool = pool(&["a", "b", "c"]);
		let seen = (0..7).map(|_| pool.next().expose().to_owned()).collect::<Vec<_>>();

		assert_eq!(seen, ["a", "b", "c", "a", "b", "c", "a"]);
		assert_eq!(pool.first().expose(), "a");
		assert_eq!(pool.len(), 3);
	}

	#[test]
	fn rejects_empty_input() {
		let err = TokenPool::new(Vec::<ApiSecret>::new()).expect_err("Empty pools must fail.");

		assert_eq!(err, PoolError::Empty);
	}

	#[test]
	fn single_secret_pool_always_returns_it() {
		let pool = pool(&["only"]);

		for _ in 0..5 {
			assert_eq!(pool.next().expose(), "only");
		}
	}

	#[test]
	fn concurrent_callers_share_the_rotation_evenly() {
		const THREADS: usize = 8;
		const CALLS: usize = 300;

		let pool = Arc::new(pool(&["a", "b", "c"]));
		let handles = (0..THREADS)
			.map(|_| {
				let pool = Arc::clone(&pool);

				thread::spawn(move || {
					(0..CALLS).map(|_| pool.next().expose().to_owned()).collect::<Vec<_>>()
				})
			})
			.collect::<Vec<_>>();
		let mut counts = HashMap::<String, usize>::new();

		for handle in handles {
			for secret in handle.join().expect("Pool worker should not panic.") {
				*counts.entry(secret).or_default() += 1;
			}
		}

		// 8 * 300 claims over 3 secrets; every claim window of 3 covers each secret once.
		assert_eq!(counts.len(), 3);
		assert!(counts.values().all(|count| *count == THREADS * CALLS / 3));
	}

	#[test]
	fn debug_hides_secrets() {
		let rendered = format!("{:?}", pool(&["super-secret"]));

		assert!(!rendered.contains("super-secret"));
	}
}
