//! Rust’s drop-in bearer-token gate—single-flight refresh coordination, challenge-driven
//! re-auth, and content-addressed response caching in one crate built for production.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod authenticator;
pub mod cache;
pub mod error;
pub mod event;
pub mod obs;
pub mod session;
pub mod token;
pub mod transport;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::Client as ReqwestClient;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use http;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {httpmock as _, tokio as _};
