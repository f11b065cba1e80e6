// self
use crate::{_prelude::*, obs::ExchangeStage};

/// A span builder used by the key exchange.
#[derive(Clone, Debug)]
pub struct ExchangeSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl ExchangeSpan {
	/// Creates a new span tagged with the provided stage.
	pub fn new(stage: ExchangeStage) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("coc_broker.exchange", stage = stage.as_str());

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Enters the span for the remainder of the current scope.
	pub fn entered(self) -> ExchangeSpanGuard {
		#[cfg(feature = "tracing")]
		{
			ExchangeSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			ExchangeSpanGuard {}
		}
	}
}

/// RAII guard returned by [`ExchangeSpan::entered`].
pub struct ExchangeSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for ExchangeSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ExchangeSpanGuard(..)")
	}
}

/// Emits a `warn` event for a reconciliation failure that is deliberately not propagated.
pub fn warn_swallowed(stage: ExchangeStage, key_id: Option<&str>, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			stage = stage.as_str(),
			key_id = key_id.unwrap_or("-"),
			error = %error,
			"reconciliation step failed; continuing"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, key_id, error);
	}
}

/// Emits a `debug` event summarizing how a key exchange was satisfied.
pub fn note_exchange_result(reused: usize, created: usize, revoked: usize) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(reused, created, revoked, "key exchange completed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (reused, created, revoked);
	}
}
