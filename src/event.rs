//! Structured event contracts for refresh observability.
//!
//! Events are fire-and-forget: the gate never consumes a sink's return value, and
//! a sink must never fail the calling path. Names and property keys are stable
//! strings so downstream analytics pipelines can match on them.

// self
use crate::_prelude::*;

/// Canonical event names emitted by the gate.
pub mod names {
	/// The refresh endpoint rejected the refresh token as expired/invalid.
	pub const REFRESH_TOKEN_NOT_VALID: &str = "refresh_token_not_valid";
	/// An HTTP-level error was observed during a refresh call.
	pub const HTTP_ERROR: &str = "http_error";
	/// A coordinated refresh cycle ended without producing a new token.
	pub const REFRESHING_AUTH_TOKEN_FAILED: &str = "refreshing_auth_token_failed";
	/// An I/O failure interrupted a refresh call before a response was obtained.
	pub const REFRESH_TOKEN_API_IO_FAILURE: &str = "refresh_token_api_io_failure";
}

/// Canonical property keys attached to gate events.
pub mod props {
	/// HTTP status code of the observed failure.
	pub const HTTP_CODE: &str = "httpCode";
	/// Application error code mined from the failure body.
	pub const BACKEND_CODE: &str = "backendCode";
	/// Human-readable failure summary.
	pub const ERROR_MESSAGE: &str = "ErrorMessage";
}

/// Property bag attached to a logged event.
pub type EventProps = BTreeMap<String, serde_json::Value>;

/// Builds the standard property bag for failure events.
pub fn event_props(http_code: u16, backend_code: i64, message: &str) -> EventProps {
	let mut properties = EventProps::new();

	properties.insert(props::HTTP_CODE.into(), http_code.into());
	properties.insert(props::BACKEND_CODE.into(), backend_code.into());
	properties.insert(props::ERROR_MESSAGE.into(), message.into());

	properties
}

/// Sink consuming structured gate events.
pub trait EventSink
where
	Self: Send + Sync,
{
	/// Records one named event with its property bag.
	fn log_event(&self, name: &str, properties: EventProps);
}

/// Sink that discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopEventSink;
impl EventSink for NoopEventSink {
	fn log_event(&self, _name: &str, _properties: EventProps) {}
}

/// Sink that forwards events to the `tracing` subscriber as structured records.
#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventSink;
#[cfg(feature = "tracing")]
impl EventSink for TracingEventSink {
	fn log_event(&self, name: &str, properties: EventProps) {
		let rendered =
			serde_json::to_string(&properties).unwrap_or_else(|_| "{}".into());

		tracing::info!(target: "token_gate::event", event = name, properties = %rendered);
	}
}
