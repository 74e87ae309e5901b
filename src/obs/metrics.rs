// self
use crate::obs::{FlowOutcome, GateFlow};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: GateFlow, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"token_gate_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_flow_outcome_noop_without_metrics() {
		record_flow_outcome(GateFlow::Refresh, FlowOutcome::Failure);
	}
}
