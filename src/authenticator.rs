//! Single-flight access-token refresh coordination for auth-challenged requests.
//!
//! The gate exposes [`Authenticator::authenticate`] so transport stacks can hand
//! over any 401 response whose request carried a bearer token. However many
//! requests fail concurrently, at most one refresh call reaches the endpoint per
//! coordinated cycle: the first caller to acquire the refresh lock performs the
//! exchange while every other caller suspends on the same lock, then either takes
//! the fast path (the token already changed under it) or observes the settled
//! abort state. Terminal refresh failures force a logout through
//! [`TokenStore::on_token_expires`]; transient failures retry within a bounded
//! budget.

mod metrics;

pub use metrics::RefreshMetrics;

// std
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
// self
use crate::{
	_prelude::*,
	error::RefreshFailure,
	event::{EventProps, EventSink, NoopEventSink, event_props, names},
	obs::{self, FlowOutcome, FlowSpan, GateFlow},
	session::{DefaultErrorCodes, ErrorCodeProvider, TokenStore},
	token::RefreshInvoker,
	transport::{AuthChallenge, RequestTemplate},
};

/// Coordinates single-flight token refreshes across concurrent request pipelines.
pub struct Authenticator {
	session: Arc<dyn TokenStore>,
	invoker: Arc<dyn RefreshInvoker>,
	error_codes: Arc<dyn ErrorCodeProvider>,
	events: Arc<dyn EventSink>,
	refresh_metrics: Arc<RefreshMetrics>,
	refresh_lock: AsyncMutex<()>,
	should_abort: AtomicBool,
	waiting: AtomicUsize,
	retry_budget: usize,
}
impl Authenticator {
	const DEFAULT_RETRY_BUDGET: usize = 3;

	/// Creates an authenticator with the default retry budget, stock error-code
	/// pairs, and a no-op event sink.
	pub fn new(session: Arc<dyn TokenStore>, invoker: Arc<dyn RefreshInvoker>) -> Self {
		Self {
			session,
			invoker,
			error_codes: Arc::new(DefaultErrorCodes),
			events: Arc::new(NoopEventSink),
			refresh_metrics: Default::default(),
			refresh_lock: AsyncMutex::new(()),
			should_abort: AtomicBool::new(false),
			waiting: AtomicUsize::new(0),
			retry_budget: Self::DEFAULT_RETRY_BUDGET,
		}
	}

	/// Replaces the terminal-failure (status, code) pairs.
	pub fn with_error_codes(mut self, error_codes: Arc<dyn ErrorCodeProvider>) -> Self {
		self.error_codes = error_codes;

		self
	}

	/// Replaces the event sink.
	pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
		self.events = events;

		self
	}

	/// Overrides the bounded per-cycle retry budget (defaults to 3, minimum 1).
	pub fn with_retry_budget(mut self, budget: usize) -> Self {
		self.retry_budget = budget.max(1);

		self
	}

	/// Returns a handle to the authenticator's activity counters.
	pub fn refresh_metrics(&self) -> Arc<RefreshMetrics> {
		self.refresh_metrics.clone()
	}

	/// Handles an authentication challenge, returning the re-signed request to
	/// retry, or `None` when the original failure must surface to the caller.
	///
	/// Returns `None` immediately unless the response is a 401 whose request
	/// carried a `Bearer` authorization header. Refresh failures never escape this
	/// method; they are classified and translated into retry/abort decisions.
	pub async fn authenticate(&self, challenge: AuthChallenge) -> Option<RequestTemplate> {
		if !challenge.is_unauthorized() || !challenge.request.has_bearer_authorization() {
			return None;
		}

		let span = FlowSpan::new(GateFlow::Refresh, "authenticate");

		obs::record_flow_outcome(GateFlow::Refresh, FlowOutcome::Attempt);

		let result = span.instrument(self.coordinate(&challenge)).await;

		match &result {
			Some(_) => obs::record_flow_outcome(GateFlow::Refresh, FlowOutcome::Success),
			None => obs::record_flow_outcome(GateFlow::Refresh, FlowOutcome::Failure),
		}

		result
	}

	async fn coordinate(&self, challenge: &AuthChallenge) -> Option<RequestTemplate> {
		// Read outside the lock; all mutations happen under it.
		let attempted_token = self.session.access_token();

		self.waiting.fetch_add(1, Ordering::SeqCst);

		let _flight = self.refresh_lock.lock().await;
		// Declared after the lock guard so the decrement runs before the unlock.
		let _waiter = WaiterGuard(&self.waiting);
		let current_token = self.session.access_token();

		if current_token != attempted_token {
			// Another caller already rotated the token while we queued.
			self.refresh_metrics.record_fast_path();

			return challenge.request.with_bearer_token(&current_token).ok();
		}

		if self.should_abort.load(Ordering::SeqCst) {
			// Only the last queued waiter may reset the flag.
			if self.waiting.load(Ordering::SeqCst) == 1 {
				self.should_abort.store(false, Ordering::SeqCst);
			}

			self.refresh_metrics.record_aborted_wait();

			return None;
		}

		self.refresh_or_abort(challenge).await
	}

	async fn refresh_or_abort(&self, challenge: &AuthChallenge) -> Option<RequestTemplate> {
		for _ in 0..self.retry_budget {
			self.refresh_metrics.record_attempt();

			let outcome = self
				.invoker
				.refresh(
					&self.session.access_token(),
					&self.session.refresh_token(),
					&self.session.session_data(),
				)
				.await;

			match outcome {
				Ok(pair) => {
					self.refresh_metrics.record_success();
					self.session.on_token_refreshed(
						pair.access_token.expose(),
						pair.refresh_token.expose(),
						pair.expires_in,
					);

					return challenge.request.with_bearer_token(pair.access_token.expose()).ok();
				},
				Err(failure) => {
					self.refresh_metrics.record_failure();

					if self.observe_failure(&failure) {
						return None;
					}
				},
			}
		}

		self.events.log_event(names::REFRESHING_AUTH_TOKEN_FAILED, EventProps::new());
		self.arm_abort();

		None
	}

	/// Logs the failure and returns `true` when it is terminal for the session.
	fn observe_failure(&self, failure: &RefreshFailure) -> bool {
		let Some(status) = failure.status() else {
			self.events.log_event(
				names::REFRESH_TOKEN_API_IO_FAILURE,
				event_props(0, 0, &failure.to_string()),
			);

			return false;
		};
		let backend_code = failure.error_code();

		self.events.log_event(
			names::HTTP_ERROR,
			event_props(status, backend_code.unwrap_or(0), &failure.to_string()),
		);

		if !self.is_terminal(status, backend_code) {
			return false;
		}

		self.events.log_event(
			names::REFRESH_TOKEN_NOT_VALID,
			event_props(status, backend_code.unwrap_or(0), &failure.to_string()),
		);
		self.session.on_token_expires();
		self.arm_abort();

		true
	}

	fn is_terminal(&self, status: u16, code: Option<i64>) -> bool {
		self.error_codes.refresh_token_expired().matches(status, code)
			|| self.error_codes.user_session_not_found().matches(status, code)
	}

	/// Arms the abort flag only when other waiters are still queued behind us.
	fn arm_abort(&self) {
		self.should_abort.store(self.waiting.load(Ordering::SeqCst) > 1, Ordering::SeqCst);
	}
}
impl Debug for Authenticator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authenticator")
			.field("retry_budget", &self.retry_budget)
			.field("waiting", &self.waiting.load(Ordering::SeqCst))
			.field("should_abort", &self.should_abort.load(Ordering::SeqCst))
			.finish()
	}
}

struct WaiterGuard<'a>(&'a AtomicUsize);
impl Drop for WaiterGuard<'_> {
	fn drop(&mut self) {
		self.0.fetch_sub(1, Ordering::SeqCst);
	}
}
