// std
use std::time::Duration;
// self
use crate::obs::{ExchangeStage, StageOutcome};

/// Records a stage outcome via the global metrics recorder (when enabled).
pub fn record_stage_outcome(stage: ExchangeStage, outcome: StageOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"coc_broker_exchange_total",
			"stage" => stage.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (stage, outcome);
	}
}

/// Records that a throttle caller had to wait, and for how long.
pub fn record_throttle_wait(wait: Duration) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("coc_broker_throttle_wait_total").increment(1);
	}
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(wait_ms = wait.as_secs_f64() * 1_000.0, "request throttle saturated");
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = wait;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_features() {
		record_stage_outcome(ExchangeStage::Create, StageOutcome::Failure);
		record_throttle_wait(Duration::from_millis(3));
	}
}
