//! Session collaborator contracts owned by the embedding application.
//!
//! The gate never persists credentials itself. The application supplies a
//! [`TokenStore`] that owns the current token pair; the authenticator mutates it
//! exclusively through [`TokenStore::on_token_refreshed`] and
//! [`TokenStore::on_token_expires`], and only ever while holding the single-flight
//! refresh lock.

// self
use crate::_prelude::*;

/// Application-owned store for the current access/refresh token pair.
///
/// Reads may race with an in-flight refresh by design: a stale read at worst
/// triggers one redundant refresh cycle, never a corrupted token, because all
/// mutations funnel through the authenticator's lock holder.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Returns the current access token.
	fn access_token(&self) -> String;

	/// Returns the current refresh token.
	fn refresh_token(&self) -> String;

	/// Returns opaque session data forwarded verbatim to the refresh endpoint.
	fn session_data(&self) -> BTreeMap<String, String> {
		BTreeMap::new()
	}

	/// Applies a freshly rotated token pair.
	fn on_token_refreshed(&self, access_token: &str, refresh_token: &str, expires_in: Duration);

	/// Signals that the session is unrecoverable and the user must re-authenticate.
	fn on_token_expires(&self);
}

/// An (HTTP status, application error code) pair identifying one terminal refresh
/// failure condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCodePair {
	/// HTTP status code the failure response must carry.
	pub status: u16,
	/// Application error code the failure body must carry.
	pub code: i64,
}
impl ErrorCodePair {
	/// Builds a pair from its status and application code.
	pub const fn new(status: u16, code: i64) -> Self {
		Self { status, code }
	}

	/// Returns `true` only when both dimensions match; a missing body code never
	/// matches.
	pub fn matches(&self, status: u16, code: Option<i64>) -> bool {
		self.status == status && code == Some(self.code)
	}
}

/// Supplies the terminal-failure pairs recognized by the authenticator.
pub trait ErrorCodeProvider
where
	Self: Send + Sync,
{
	/// Pair meaning the refresh token itself has expired.
	fn refresh_token_expired(&self) -> ErrorCodePair {
		ErrorCodePair::new(401, 1001)
	}

	/// Pair meaning the user session no longer exists upstream.
	fn user_session_not_found(&self) -> ErrorCodePair {
		ErrorCodePair::new(403, 1002)
	}
}

/// Stock [`ErrorCodeProvider`] exposing the default pairs.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultErrorCodes;
impl ErrorCodeProvider for DefaultErrorCodes {}

struct SessionState {
	access_token: String,
	refresh_token: String,
	session_data: BTreeMap<String, String>,
	logged_out: bool,
}

/// Thread-safe in-process [`TokenStore`] for local development and tests.
pub struct MemorySessionStore {
	inner: RwLock<SessionState>,
}
impl MemorySessionStore {
	/// Creates a store seeded with the provided token pair.
	pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
		Self {
			inner: RwLock::new(SessionState {
				access_token: access_token.into(),
				refresh_token: refresh_token.into(),
				session_data: BTreeMap::new(),
				logged_out: false,
			}),
		}
	}

	/// Attaches opaque session data forwarded to the refresh endpoint.
	pub fn with_session_data(self, session_data: BTreeMap<String, String>) -> Self {
		self.inner.write().session_data = session_data;

		self
	}

	/// Returns `true` once [`TokenStore::on_token_expires`] has been observed.
	pub fn is_logged_out(&self) -> bool {
		self.inner.read().logged_out
	}
}
impl TokenStore for MemorySessionStore {
	fn access_token(&self) -> String {
		self.inner.read().access_token.clone()
	}

	fn refresh_token(&self) -> String {
		self.inner.read().refresh_token.clone()
	}

	fn session_data(&self) -> BTreeMap<String, String> {
		self.inner.read().session_data.clone()
	}

	fn on_token_refreshed(&self, access_token: &str, refresh_token: &str, _expires_in: Duration) {
		let mut state = self.inner.write();

		state.access_token = access_token.to_owned();
		state.refresh_token = refresh_token.to_owned();
		state.logged_out = false;
	}

	fn on_token_expires(&self) {
		self.inner.write().logged_out = true;
	}
}
impl Debug for MemorySessionStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.inner.read();

		f.debug_struct("MemorySessionStore")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &"<redacted>")
			.field("session_data_keys", &state.session_data.len())
			.field("logged_out", &state.logged_out)
			.finish()
	}
}
