//! Cached response entries with expiry metadata.

// self
use crate::_prelude::*;

/// One cached HTTP response with the metadata needed to replay it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
	/// Raw response body bytes.
	pub body: Vec<u8>,
	/// Response headers, values comma-joined when the upstream repeated a name.
	pub headers: BTreeMap<String, String>,
	/// HTTP status code of the cached response.
	pub status_code: u16,
	/// Content type of the cached body.
	pub content_type: String,
	/// Instant the entry was written.
	pub created_at: OffsetDateTime,
	/// Instant after which the entry must be treated as a miss.
	pub expires_at: OffsetDateTime,
}
impl CacheEntry {
	/// Returns `true` once the provided instant passes the expiry fence.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant > self.expires_at
	}

	/// Convenience helper that checks expiry against the current UTC instant.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn entry(expires_at: OffsetDateTime) -> CacheEntry {
		CacheEntry {
			body: b"{}".to_vec(),
			headers: BTreeMap::new(),
			status_code: 200,
			content_type: "application/json".into(),
			created_at: expires_at - Duration::minutes(5),
			expires_at,
		}
	}

	#[test]
	fn expiry_fence_is_exclusive() {
		let expires = macros::datetime!(2025-06-01 12:00 UTC);
		let entry = entry(expires);

		assert!(!entry.is_expired_at(macros::datetime!(2025-06-01 11:59 UTC)));
		assert!(!entry.is_expired_at(expires));
		assert!(entry.is_expired_at(macros::datetime!(2025-06-01 12:00:01 UTC)));
	}

	#[test]
	fn entries_round_trip_through_json() {
		let original = entry(macros::datetime!(2025-06-01 12:00 UTC));
		let payload =
			serde_json::to_string(&original).expect("Cache entry should serialize to JSON.");
		let restored: CacheEntry =
			serde_json::from_str(&payload).expect("Serialized entry should deserialize.");

		assert_eq!(restored, original);
	}
}
