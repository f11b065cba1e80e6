//! Optional observability helpers for the key exchange and the request throttle.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `coc_broker.exchange` with a `stage` field, plus
//!   `warn` events for swallowed reconciliation failures and `debug` events for throttle waits.
//! - Enable `metrics` to increment the `coc_broker_exchange_total` counter for every stage
//!   attempt/success/failure (labeled by `stage` + `outcome`) and the
//!   `coc_broker_throttle_wait_total` counter whenever a caller has to wait.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Key exchange stages observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangeStage {
	/// Whole `obtain_tokens` call.
	Exchange,
	/// Portal login.
	Login,
	/// Caller IP derivation from the session token.
	DeriveIp,
	/// Listing existing keys.
	ListKeys,
	/// Revoking keys bound to other addresses.
	Reconcile,
	/// Creating new keys.
	Create,
}
impl ExchangeStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ExchangeStage::Exchange => "exchange",
			ExchangeStage::Login => "login",
			ExchangeStage::DeriveIp => "derive_ip",
			ExchangeStage::ListKeys => "list_keys",
			ExchangeStage::Reconcile => "reconcile",
			ExchangeStage::Create => "create",
		}
	}
}
impl Display for ExchangeStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller, or swallowed during reconciliation.
	Failure,
}
impl StageOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageOutcome::Attempt => "attempt",
			StageOutcome::Success => "success",
			StageOutcome::Failure => "failure",
		}
	}
}
impl Display for StageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
