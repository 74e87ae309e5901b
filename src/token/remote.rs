//! Reqwest-backed refresh invoker for JSON token-renewal endpoints.
//!
//! The invoker issues a single `POST` per call: the refresh token plus the
//! caller's opaque session data form the JSON body, and the current access token
//! rides along as a bearer header for endpoints that validate it. Every failure
//! mode maps into a [`RefreshFailure`] so the authenticator can classify it.

// self
use crate::{
	_prelude::*,
	error::{RefreshFailure, mine_error_body},
	token::{RefreshFuture, RefreshInvoker, TokenPair},
};

#[derive(Debug, Serialize)]
struct RenewRequest<'a> {
	token: &'a str,
	#[serde(flatten)]
	session: &'a BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RenewResponse {
	token: String,
	#[serde(rename = "refreshToken")]
	refresh_token: String,
	#[serde(default, rename = "expiresIn")]
	expires_in: u64,
}

/// [`RefreshInvoker`] that exchanges refresh tokens against an HTTP endpoint.
#[derive(Clone, Debug)]
pub struct HttpRefreshInvoker {
	client: ReqwestClient,
	endpoint: Url,
}
impl HttpRefreshInvoker {
	/// Creates an invoker targeting the provided renewal endpoint.
	pub fn new(client: ReqwestClient, endpoint: Url) -> Self {
		Self { client, endpoint }
	}

	async fn renew(
		&self,
		access_token: &str,
		refresh_token: &str,
		session_data: &BTreeMap<String, String>,
	) -> Result<TokenPair, RefreshFailure> {
		let payload = RenewRequest { token: refresh_token, session: session_data };
		let response = self
			.client
			.post(self.endpoint.clone())
			.bearer_auth(access_token)
			.json(&payload)
			.send()
			.await
			.map_err(|e| RefreshFailure::Io { message: e.to_string() })?;
		let status = response.status();
		let bytes = response
			.bytes()
			.await
			.map_err(|e| RefreshFailure::Io { message: e.to_string() })?;

		if !status.is_success() {
			let mined = mine_error_body(&bytes);
			let message = mined
				.message
				.unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_owned());

			return Err(RefreshFailure::from_status(status.as_u16(), mined.code, message));
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&bytes);
		let parsed: RenewResponse = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|e| RefreshFailure::Decode { source: e })?;

		Ok(TokenPair::new(
			parsed.token,
			parsed.refresh_token,
			Duration::seconds(parsed.expires_in as i64),
		))
	}
}
impl RefreshInvoker for HttpRefreshInvoker {
	fn refresh<'a>(
		&'a self,
		access_token: &'a str,
		refresh_token: &'a str,
		session_data: &'a BTreeMap<String, String>,
	) -> RefreshFuture<'a> {
		Box::pin(self.renew(access_token, refresh_token, session_data))
	}
}
