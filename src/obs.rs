//! Optional observability helpers for gate flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `token_gate.flow` with the `flow`
//!   (refresh/cache) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `token_gate_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Gate flow kinds observed by the instrumentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateFlow {
	/// Coordinated access-token refresh triggered by an auth challenge.
	Refresh,
	/// TTL-governed response cache lookup/write cycle.
	Cache,
}
impl GateFlow {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			GateFlow::Refresh => "refresh",
			GateFlow::Cache => "cache",
		}
	}
}
impl Display for GateFlow {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a gate helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
