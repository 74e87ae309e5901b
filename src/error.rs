//! Gate-level error types shared by the authenticator, cache, and transports.

// self
use crate::_prelude::*;

/// Gate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gate error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Cache-backend failure.
	#[error("{0}")]
	Cache(
		#[from]
		#[source]
		crate::cache::CacheStoreError,
	),
	/// Request re-signing produced an invalid `Authorization` header value.
	#[error("Authorization header value is invalid.")]
	InvalidAuthorization {
		/// Underlying header validation failure.
		#[source]
		source: http::header::InvalidHeaderValue,
	},
	/// Transport failure (DNS, TCP, TLS) while dispatching an upstream call.
	#[error("Network error occurred while dispatching the request.")]
	Transport {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl Error {
	/// Wraps a transport-specific network error.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}
}

/// Classifiable failure produced by a refresh invocation.
///
/// The authenticator never surfaces these to the original caller; it only inspects
/// the HTTP status and mined application error code to decide between retrying,
/// aborting, and forcing a logout.
#[derive(Debug, ThisError)]
pub enum RefreshFailure {
	/// Transport or I/O failure before an HTTP response was obtained.
	#[error("I/O failure while calling the refresh endpoint: {message}.")]
	Io {
		/// Human-readable transport failure summary.
		message: String,
	},
	/// Refresh endpoint answered with a client error (HTTP 400-499).
	#[error("Refresh endpoint returned client error {status}: {message}.")]
	Client {
		/// HTTP status code of the failure response.
		status: u16,
		/// Application error code mined from the response body, if any.
		error_code: Option<i64>,
		/// Human-readable failure summary.
		message: String,
	},
	/// Refresh endpoint answered with a server error (HTTP 500-599).
	#[error("Refresh endpoint returned server error {status}: {message}.")]
	Server {
		/// HTTP status code of the failure response.
		status: u16,
		/// Application error code mined from the response body, if any.
		error_code: Option<i64>,
		/// Human-readable failure summary.
		message: String,
	},
	/// Refresh endpoint answered 2xx with a body that could not be parsed.
	#[error("Refresh endpoint returned malformed JSON.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl RefreshFailure {
	/// Classifies a failure response by HTTP status range.
	///
	/// Statuses outside 400-599 carry no usable classification and degrade to
	/// [`RefreshFailure::Io`].
	pub fn from_status(status: u16, error_code: Option<i64>, message: impl Into<String>) -> Self {
		let message = message.into();

		match status {
			400..=499 => Self::Client { status, error_code, message },
			500..=599 => Self::Server { status, error_code, message },
			_ => Self::Io { message: format!("Unexpected HTTP status {status}: {message}") },
		}
	}

	/// Returns the HTTP status carried by the failure, if a response was obtained.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Client { status, .. } | Self::Server { status, .. } => Some(*status),
			Self::Io { .. } | Self::Decode { .. } => None,
		}
	}

	/// Returns the application error code mined from the failure body, if any.
	pub fn error_code(&self) -> Option<i64> {
		match self {
			Self::Client { error_code, .. } | Self::Server { error_code, .. } => *error_code,
			Self::Io { .. } | Self::Decode { .. } => None,
		}
	}
}

/// Application-level payload mined from a refresh failure body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorBody {
	/// Application error code, from `code` or `error_code`.
	pub code: Option<i64>,
	/// Human-readable message, from `message` or the first element of `errors`.
	pub message: Option<String>,
}

/// Mines the application error code and message out of a JSON failure body.
///
/// Accepts the code as either a JSON number or a numeric string. Absent or
/// unparsable bodies yield an empty [`ErrorBody`] rather than an error.
pub fn mine_error_body(bytes: &[u8]) -> ErrorBody {
	let Ok(value) = serde_json::from_slice::<serde_json::Value>(bytes) else {
		return ErrorBody::default();
	};
	let code = value
		.get("code")
		.and_then(as_error_code)
		.or_else(|| value.get("error_code").and_then(as_error_code));
	let message = value
		.get("message")
		.and_then(serde_json::Value::as_str)
		.filter(|m| !m.trim().is_empty())
		.map(str::to_owned)
		.or_else(|| {
			value
				.get("errors")
				.and_then(serde_json::Value::as_array)
				.and_then(|errors| errors.first())
				.and_then(serde_json::Value::as_str)
				.map(str::to_owned)
		});

	ErrorBody { code, message }
}

fn as_error_code(value: &serde_json::Value) -> Option<i64> {
	value.as_i64().or_else(|| value.as_str().and_then(|raw| raw.trim().parse().ok()))
}
