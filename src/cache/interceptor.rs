//! TTL-driven caching interceptor wrapping an upstream transport.

// self
use crate::{
	_prelude::*,
	cache::{
		CacheEntry, CachePolicy, CacheStore, generate_key, strip_request_bridge_headers,
		strip_response_cache_headers,
	},
	obs::{self, FlowOutcome, FlowSpan, GateFlow},
	transport::RequestTemplate,
};

/// Response header describing whether a response was served from cache or network.
pub const CACHE_SOURCE_HEADER: &str = "X-Cache-Source";

/// Origin of a [`CachedResponse`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheSource {
	/// The response came from the upstream transport.
	Network,
	/// The response was replayed from the cache store.
	Cache,
}
impl CacheSource {
	/// Returns the stable label written into [`CACHE_SOURCE_HEADER`].
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheSource::Network => "network",
			CacheSource::Cache => "cache",
		}
	}
}
impl Display for CacheSource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Upstream HTTP response consumed by the interceptor.
#[derive(Clone, Debug)]
pub struct UpstreamResponse {
	/// HTTP status code.
	pub status_code: u16,
	/// Response headers, values comma-joined when the upstream repeated a name.
	pub headers: BTreeMap<String, String>,
	/// Content type of the body.
	pub content_type: String,
	/// Raw body bytes.
	pub body: Vec<u8>,
}

/// Response surfaced by [`CacheInterceptor::execute`].
#[derive(Clone, Debug)]
pub struct CachedResponse {
	/// HTTP status code.
	pub status_code: u16,
	/// Response headers, including [`CACHE_SOURCE_HEADER`].
	pub headers: BTreeMap<String, String>,
	/// Content type of the body.
	pub content_type: String,
	/// Raw body bytes.
	pub body: Vec<u8>,
	/// Where the response came from.
	pub source: CacheSource,
}
impl CachedResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status_code)
	}

	fn from_network(upstream: UpstreamResponse, cache_controlled: bool) -> Self {
		let mut headers = upstream.headers;

		if cache_controlled {
			strip_response_cache_headers(&mut headers);
		}

		headers.insert(CACHE_SOURCE_HEADER.to_owned(), CacheSource::Network.as_str().to_owned());

		Self {
			status_code: upstream.status_code,
			headers,
			content_type: upstream.content_type,
			body: upstream.body,
			source: CacheSource::Network,
		}
	}

	fn from_entry(entry: CacheEntry) -> Self {
		let mut headers = entry.headers;

		strip_response_cache_headers(&mut headers);
		headers.insert(CACHE_SOURCE_HEADER.to_owned(), CacheSource::Cache.as_str().to_owned());

		Self {
			status_code: entry.status_code,
			headers,
			content_type: entry.content_type,
			body: entry.body,
			source: CacheSource::Cache,
		}
	}
}

/// Boxed future returned by [`CacheTransport::dispatch`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<UpstreamResponse>> + 'a + Send>>;

/// Abstraction over the HTTP stack performing the real call on a cache miss.
pub trait CacheTransport
where
	Self: Send + Sync,
{
	/// Executes the request upstream and collects the full response.
	fn dispatch<'a>(&'a self, request: &'a RequestTemplate) -> TransportFuture<'a>;
}

/// Applies per-call TTL policies over a [`CacheStore`] and an upstream transport.
///
/// The interceptor, not the store, decides freshness: an expired entry is a
/// miss, and only successful (2xx) upstream responses are written back.
pub struct CacheInterceptor {
	store: Arc<dyn CacheStore>,
}
impl CacheInterceptor {
	/// Creates an interceptor over the provided store.
	pub fn new(store: Arc<dyn CacheStore>) -> Self {
		Self { store }
	}

	/// Executes `request` with caching governed by `policy`.
	///
	/// When `policy` is `None`, the request headers are consulted for a bridged
	/// policy; without one the call passes straight through (the bridge headers
	/// are stripped from the outbound request either way).
	pub async fn execute(
		&self,
		request: &RequestTemplate,
		policy: Option<CachePolicy>,
		transport: &dyn CacheTransport,
	) -> Result<CachedResponse> {
		let span = FlowSpan::new(GateFlow::Cache, "execute");

		obs::record_flow_outcome(GateFlow::Cache, FlowOutcome::Attempt);

		let result = span.instrument(self.execute_inner(request, policy, transport)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(GateFlow::Cache, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(GateFlow::Cache, FlowOutcome::Failure),
		}

		result
	}

	async fn execute_inner(
		&self,
		request: &RequestTemplate,
		policy: Option<CachePolicy>,
		transport: &dyn CacheTransport,
	) -> Result<CachedResponse> {
		let policy = policy.or_else(|| CachePolicy::from_headers(&request.headers));
		let mut outbound = request.clone();

		strip_request_bridge_headers(&mut outbound.headers);

		let Some(policy) = policy else {
			let upstream = transport.dispatch(&outbound).await?;

			return Ok(CachedResponse::from_network(upstream, false));
		};
		let key = generate_key(request);
		let now = OffsetDateTime::now_utc();

		if let Some(entry) = self.store.get(&key).await {
			if !entry.is_expired_at(now) {
				return Ok(CachedResponse::from_entry(entry));
			}
		}

		let upstream = transport.dispatch(&outbound).await?;

		if (200..300).contains(&upstream.status_code) {
			let entry = CacheEntry {
				body: upstream.body.clone(),
				headers: upstream.headers.clone(),
				status_code: upstream.status_code,
				content_type: upstream.content_type.clone(),
				created_at: now,
				expires_at: policy.expires_at(now),
			};

			let _ = self.store.put(&key, entry).await;
		}

		Ok(CachedResponse::from_network(upstream, true))
	}
}
impl Debug for CacheInterceptor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("CacheInterceptor(..)")
	}
}

/// [`CacheTransport`] backed by a shared reqwest client.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestCacheTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestCacheTransport {
	/// Wraps an existing reqwest client.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl CacheTransport for ReqwestCacheTransport {
	fn dispatch<'a>(&'a self, request: &'a RequestTemplate) -> TransportFuture<'a> {
		Box::pin(async move {
			let outbound = request.to_reqwest(&self.0)?;
			let response = self.0.execute(outbound).await.map_err(Error::transport)?;
			let status_code = response.status().as_u16();
			let content_type = response
				.headers()
				.get(http::header::CONTENT_TYPE)
				.and_then(|value| value.to_str().ok())
				.unwrap_or("application/octet-stream")
				.to_owned();
			let headers = flatten_headers(response.headers());
			let body = response.bytes().await.map_err(Error::transport)?.to_vec();

			Ok(UpstreamResponse { status_code, headers, content_type, body })
		})
	}
}

/// Collapses a header map into name → comma-joined values, skipping opaque bytes.
#[cfg(feature = "reqwest")]
fn flatten_headers(headers: &http::HeaderMap) -> BTreeMap<String, String> {
	let mut flattened: BTreeMap<String, String> = BTreeMap::new();

	for (name, value) in headers {
		let Ok(value) = value.to_str() else {
			continue;
		};

		flattened
			.entry(name.as_str().to_owned())
			.and_modify(|existing| {
				existing.push_str(", ");
				existing.push_str(value);
			})
			.or_insert_with(|| value.to_owned());
	}

	flattened
}
