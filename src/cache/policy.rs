//! Per-call cache TTL policies and header bridging.
//!
//! Callers normally attach a [`CachePolicy`] to the call site directly. Stacks
//! that cannot thread per-call metadata may instead bridge the policy through the
//! `Cache-Duration`/`Cache-Unit` request headers; the interceptor strips those
//! before the request leaves the process, and strips `Cache-Control`/`Pragma`
//! from cache-controlled responses so downstream HTTP caches stay out of the way.

// std
use std::str::FromStr;
// crates.io
use http::HeaderMap;
// self
use crate::_prelude::*;

/// Request header carrying the bridged cache duration magnitude.
pub const CACHE_DURATION_HEADER: &str = "Cache-Duration";
/// Request header carrying the bridged cache duration unit.
pub const CACHE_UNIT_HEADER: &str = "Cache-Unit";
/// Standard response header removed from cache-controlled responses.
pub const CACHE_CONTROL_HEADER: &str = "Cache-Control";
/// Legacy response header removed from cache-controlled responses.
pub const PRAGMA_HEADER: &str = "Pragma";

/// Duration unit for a cache policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheUnit {
	/// Whole seconds.
	Seconds,
	/// Whole minutes.
	Minutes,
	/// Whole hours.
	Hours,
	/// Whole days.
	Days,
}
impl CacheUnit {
	/// Returns the unit's length in seconds.
	pub const fn as_secs(self) -> u64 {
		match self {
			CacheUnit::Seconds => 1,
			CacheUnit::Minutes => 60,
			CacheUnit::Hours => 3_600,
			CacheUnit::Days => 86_400,
		}
	}

	/// Returns a stable label for headers and logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheUnit::Seconds => "seconds",
			CacheUnit::Minutes => "minutes",
			CacheUnit::Hours => "hours",
			CacheUnit::Days => "days",
		}
	}
}
impl Display for CacheUnit {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for CacheUnit {
	type Err = CacheUnitParseError;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"second" | "seconds" => Ok(CacheUnit::Seconds),
			"minute" | "minutes" => Ok(CacheUnit::Minutes),
			"hour" | "hours" => Ok(CacheUnit::Hours),
			"day" | "days" => Ok(CacheUnit::Days),
			_ => Err(CacheUnitParseError { raw: raw.to_owned() }),
		}
	}
}

/// Error raised when a bridged cache unit is unrecognized.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unrecognized cache unit `{raw}`.")]
pub struct CacheUnitParseError {
	/// The rejected unit string.
	pub raw: String,
}

/// TTL policy attached to one cacheable call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicy {
	/// Duration magnitude.
	pub duration: u64,
	/// Duration unit (defaults to minutes when bridged without a unit header).
	pub unit: CacheUnit,
}
impl CachePolicy {
	/// Builds a policy from a magnitude and unit.
	pub const fn new(duration: u64, unit: CacheUnit) -> Self {
		Self { duration, unit }
	}

	/// Returns the policy's TTL as a [`Duration`].
	pub fn ttl(&self) -> Duration {
		Duration::seconds(self.duration.saturating_mul(self.unit.as_secs()) as i64)
	}

	/// Computes the expiry instant for an entry written at `now`.
	pub fn expires_at(&self, now: OffsetDateTime) -> OffsetDateTime {
		now + self.ttl()
	}

	/// Reads a bridged policy from request headers, if one is present.
	///
	/// `Cache-Duration` is required; `Cache-Unit` falls back to minutes. A
	/// malformed duration disables caching rather than guessing.
	pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
		let duration =
			headers.get(CACHE_DURATION_HEADER)?.to_str().ok()?.trim().parse::<u64>().ok()?;
		let unit = headers
			.get(CACHE_UNIT_HEADER)
			.and_then(|value| value.to_str().ok())
			.and_then(|raw| raw.parse().ok())
			.unwrap_or(CacheUnit::Minutes);

		Some(Self::new(duration, unit))
	}
}

/// Removes the policy bridge headers from an outbound request's header map.
pub fn strip_request_bridge_headers(headers: &mut HeaderMap) {
	headers.remove(CACHE_DURATION_HEADER);
	headers.remove(CACHE_UNIT_HEADER);
}

/// Removes standard cache-control headers from a cache-controlled response.
pub fn strip_response_cache_headers(headers: &mut BTreeMap<String, String>) {
	headers.retain(|name, _| {
		!name.eq_ignore_ascii_case(CACHE_CONTROL_HEADER) && !name.eq_ignore_ascii_case(PRAGMA_HEADER)
	});
}
