//! Transport-facing request primitives shared by the authenticator and the cache.
//!
//! The gate never owns a socket. The embedding HTTP stack hands failed responses
//! to the authenticator as [`AuthChallenge`] values and receives re-signed
//! [`RequestTemplate`]s back; the cache interceptor keys and replays the same
//! template type. A `reqwest` conversion is provided behind the default feature
//! so reqwest-based stacks avoid hand-rolling the mapping.

// crates.io
use http::{HeaderMap, HeaderValue, Method, StatusCode, header::AUTHORIZATION};
// self
use crate::_prelude::*;

/// Bearer scheme prefix expected on authorized requests.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Transport-agnostic outbound request snapshot.
///
/// Carries exactly the parts the gate needs: the method + URL + body feed the
/// cache key, and the header map feeds bearer detection and re-signing.
#[derive(Clone)]
pub struct RequestTemplate {
	/// HTTP method of the original call.
	pub method: Method,
	/// Fully resolved request URL.
	pub url: Url,
	/// Header map of the original call, including its `Authorization` header.
	pub headers: HeaderMap,
	/// Serialized request body, when the call carried one.
	pub body: Option<Vec<u8>>,
}
impl RequestTemplate {
	/// Creates a template with empty headers and no body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: None }
	}

	/// Attaches a serialized request body.
	pub fn with_body(mut self, body: Vec<u8>) -> Self {
		self.body = Some(body);

		self
	}

	/// Inserts (or replaces) a header.
	pub fn with_header(mut self, name: http::header::HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Returns the bearer token carried by the `Authorization` header, if any.
	pub fn bearer_token(&self) -> Option<&str> {
		self.headers.get(AUTHORIZATION)?.to_str().ok()?.strip_prefix(BEARER_PREFIX)
	}

	/// Returns `true` when the request carried a recognized bearer authorization.
	pub fn has_bearer_authorization(&self) -> bool {
		self.bearer_token().is_some()
	}

	/// Clones the template with its `Authorization` header replaced by
	/// `Bearer <access_token>`.
	pub fn with_bearer_token(&self, access_token: &str) -> Result<Self> {
		let value = HeaderValue::from_str(&format!("{BEARER_PREFIX}{access_token}"))
			.map_err(|e| Error::InvalidAuthorization { source: e })?;
		let mut signed = self.clone();

		signed.headers.insert(AUTHORIZATION, value);

		Ok(signed)
	}

	/// Builds a [`reqwest::Request`] from the template using the provided client.
	#[cfg(feature = "reqwest")]
	pub fn to_reqwest(&self, client: &ReqwestClient) -> Result<reqwest::Request> {
		let mut builder =
			client.request(self.method.clone(), self.url.clone()).headers(self.headers.clone());

		if let Some(body) = &self.body {
			builder = builder.body(body.clone());
		}

		builder.build().map_err(Error::transport)
	}
}
impl Debug for RequestTemplate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestTemplate")
			.field("method", &self.method)
			.field("url", &self.url.as_str())
			.field("authorization", &self.has_bearer_authorization().then_some("<redacted>"))
			.field("header_count", &self.headers.len())
			.field("body_len", &self.body.as_ref().map(Vec::len))
			.finish()
	}
}

/// Authentication-failure response handed to the gate by the transport layer.
#[derive(Clone, Debug)]
pub struct AuthChallenge {
	/// Status code of the failed response.
	pub status: StatusCode,
	/// The request that produced the failed response.
	pub request: RequestTemplate,
}
impl AuthChallenge {
	/// Wraps a failed response's status and originating request.
	pub fn new(status: StatusCode, request: RequestTemplate) -> Self {
		Self { status, request }
	}

	/// Returns `true` when the response carries the 401 challenge the gate handles.
	pub fn is_unauthorized(&self) -> bool {
		self.status == StatusCode::UNAUTHORIZED
	}
}
