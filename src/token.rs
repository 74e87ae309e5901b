//! Token primitives and the refresh-invocation contract.

#[cfg(feature = "reqwest")] pub mod remote;
#[cfg(feature = "reqwest")] pub use remote::HttpRefreshInvoker;

// self
use crate::{_prelude::*, error::RefreshFailure};

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Token pair produced by a successful refresh call.
///
/// The pair is applied to the application's token store exclusively through
/// [`TokenStore::on_token_refreshed`](crate::session::TokenStore::on_token_refreshed),
/// and only by the task holding the single-flight refresh lock.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenPair {
	/// Fresh access token secret.
	pub access_token: TokenSecret,
	/// Fresh refresh token secret.
	pub refresh_token: TokenSecret,
	/// Relative lifetime reported by the refresh endpoint.
	pub expires_in: Duration,
}
impl TokenPair {
	/// Builds a pair from raw token values and a relative lifetime.
	pub fn new(
		access_token: impl Into<String>,
		refresh_token: impl Into<String>,
		expires_in: Duration,
	) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: TokenSecret::new(refresh_token),
			expires_in,
		}
	}
}

/// Boxed future returned by [`RefreshInvoker::refresh`].
pub type RefreshFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TokenPair, RefreshFailure>> + 'a + Send>>;

/// Contract for the single network call exchanging a refresh token for a new pair.
///
/// Implementations must never panic on upstream failures; every failure mode maps
/// into a [`RefreshFailure`] so the authenticator can classify it.
pub trait RefreshInvoker
where
	Self: Send + Sync,
{
	/// Performs one refresh call with the caller's current credentials.
	fn refresh<'a>(
		&'a self,
		access_token: &'a str,
		refresh_token: &'a str,
		session_data: &'a BTreeMap<String, String>,
	) -> RefreshFuture<'a>;
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
		assert_eq!(secret.expose(), "super-secret");
	}

	#[test]
	fn pair_wraps_raw_values() {
		let pair = TokenPair::new("at-5f21", "rt-9c44", Duration::seconds(3600));

		assert_eq!(pair.access_token.expose(), "at-5f21");
		assert_eq!(pair.refresh_token.expose(), "rt-9c44");
		assert_eq!(pair.expires_in, Duration::seconds(3600));
		assert!(!format!("{pair:?}").contains("at-5f21"));
	}
}
