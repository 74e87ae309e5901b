//! Deterministic cache keys derived from request content.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, transport::RequestTemplate};

/// Opaque deterministic cache key.
///
/// Identical logical requests always produce identical keys; distinct bodies on
/// the same URL for mutating methods always produce distinct keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);
impl CacheKey {
	/// Returns the key's string form.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for CacheKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Computes the cache key for a request.
///
/// `GET` (and any other body-less method) keys on method + URL; `POST`/`PUT`/
/// `PATCH` additionally digest the serialized body so distinct payloads to the
/// same endpoint never collide.
pub fn generate_key(request: &RequestTemplate) -> CacheKey {
	match request.method.as_str() {
		"POST" | "PUT" | "PATCH" => body_based_key(request),
		method => plain_key(method, &request.url),
	}
}

fn plain_key(method: &str, url: &Url) -> CacheKey {
	CacheKey(format!("{method}:{}", digest(url.as_str().as_bytes())))
}

fn body_based_key(request: &RequestTemplate) -> CacheKey {
	let body_digest = request.body.as_deref().map(digest).unwrap_or_else(|| "nobody".into());

	CacheKey(format!(
		"{}:{}:{body_digest}",
		request.method,
		digest(request.url.as_str().as_bytes())
	))
}

/// SHA-256 digest rendered with the URL-safe alphabet so keys double as file names.
pub(crate) fn digest(bytes: &[u8]) -> String {
	let mut hasher = Sha256::new();

	hasher.update(bytes);

	URL_SAFE_NO_PAD.encode(hasher.finalize())
}
