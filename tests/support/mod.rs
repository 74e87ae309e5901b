//! Shared fixtures for token-gate integration tests.

// Each integration test crate compiles this module independently, so helpers
// unused by one crate are expected.
#![allow(dead_code)]

// std
use std::{
	collections::{BTreeMap, VecDeque},
	sync::{
		Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};
// crates.io
use time::Duration;
// self
use token_gate::{
	error::RefreshFailure,
	event::{EventProps, EventSink},
	http::{Method, StatusCode, header::AUTHORIZATION},
	session::TokenStore,
	token::{RefreshFuture, RefreshInvoker, TokenPair},
	transport::{AuthChallenge, RequestTemplate},
	url::Url,
};

/// Token store that records every rotation and logout for later assertions.
pub struct TestSessionStore {
	tokens: Mutex<(String, String)>,
	session_data: BTreeMap<String, String>,
	refreshed: Mutex<Vec<(String, String, Duration)>>,
	expired: AtomicUsize,
}
impl TestSessionStore {
	pub fn new(access_token: &str, refresh_token: &str) -> Self {
		Self {
			tokens: Mutex::new((access_token.to_owned(), refresh_token.to_owned())),
			session_data: BTreeMap::new(),
			refreshed: Mutex::new(Vec::new()),
			expired: AtomicUsize::new(0),
		}
	}

	pub fn refreshed(&self) -> Vec<(String, String, Duration)> {
		self.refreshed.lock().expect("Refresh log lock should not be poisoned.").clone()
	}

	pub fn expired_count(&self) -> usize {
		self.expired.load(Ordering::SeqCst)
	}
}
impl TokenStore for TestSessionStore {
	fn access_token(&self) -> String {
		self.tokens.lock().expect("Token lock should not be poisoned.").0.clone()
	}

	fn refresh_token(&self) -> String {
		self.tokens.lock().expect("Token lock should not be poisoned.").1.clone()
	}

	fn session_data(&self) -> BTreeMap<String, String> {
		self.session_data.clone()
	}

	fn on_token_refreshed(&self, access_token: &str, refresh_token: &str, expires_in: Duration) {
		*self.tokens.lock().expect("Token lock should not be poisoned.") =
			(access_token.to_owned(), refresh_token.to_owned());
		self.refreshed.lock().expect("Refresh log lock should not be poisoned.").push((
			access_token.to_owned(),
			refresh_token.to_owned(),
			expires_in,
		));
	}

	fn on_token_expires(&self) {
		self.expired.fetch_add(1, Ordering::SeqCst);
	}
}

/// Refresh invoker that replays a scripted sequence of outcomes.
pub struct ScriptedRefreshInvoker {
	outcomes: Mutex<VecDeque<Result<TokenPair, RefreshFailure>>>,
	calls: AtomicUsize,
	delay: Option<std::time::Duration>,
}
impl ScriptedRefreshInvoker {
	pub fn new(outcomes: Vec<Result<TokenPair, RefreshFailure>>) -> Self {
		Self { outcomes: Mutex::new(outcomes.into()), calls: AtomicUsize::new(0), delay: None }
	}

	/// Holds each call open for `delay`, keeping concurrent waiters queued.
	pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
		self.delay = Some(delay);

		self
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl RefreshInvoker for ScriptedRefreshInvoker {
	fn refresh<'a>(
		&'a self,
		_access_token: &'a str,
		_refresh_token: &'a str,
		_session_data: &'a BTreeMap<String, String>,
	) -> RefreshFuture<'a> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);

			if let Some(delay) = self.delay {
				tokio::time::sleep(delay).await;
			}

			self.outcomes
				.lock()
				.expect("Outcome lock should not be poisoned.")
				.pop_front()
				.unwrap_or_else(|| {
					Err(RefreshFailure::Io { message: "refresh script exhausted".into() })
				})
		})
	}
}

/// Event sink that records every event for later assertions.
#[derive(Default)]
pub struct RecordingEventSink {
	events: Mutex<Vec<(String, EventProps)>>,
}
impl RecordingEventSink {
	pub fn count(&self, name: &str) -> usize {
		self.events
			.lock()
			.expect("Event lock should not be poisoned.")
			.iter()
			.filter(|(recorded, _)| recorded == name)
			.count()
	}
}
impl EventSink for RecordingEventSink {
	fn log_event(&self, name: &str, properties: EventProps) {
		self.events
			.lock()
			.expect("Event lock should not be poisoned.")
			.push((name.to_owned(), properties));
	}
}

/// Builds a 401 challenge whose request carried `Authorization: Bearer <token>`.
pub fn bearer_challenge(token: &str) -> AuthChallenge {
	let url = Url::parse("https://api.example.com/widgets")
		.expect("Challenge fixture URL should parse.");
	let request = RequestTemplate::new(Method::GET, url).with_header(
		AUTHORIZATION,
		format!("Bearer {token}").parse().expect("Challenge fixture header should be valid."),
	);

	AuthChallenge::new(StatusCode::UNAUTHORIZED, request)
}

/// Builds a token pair with a one-hour lifetime.
pub fn token_pair(access_token: &str, refresh_token: &str) -> TokenPair {
	TokenPair::new(access_token, refresh_token, Duration::seconds(3_600))
}
