//! Clash of Clans developer-portal key provisioning: trade an email/password pair for API
//! secrets, rotate them fairly, and keep every caller under one shared sliding-window budget.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod obs;
pub mod pool;
pub mod provision;
pub mod throttle;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests and demos; compiled alongside the
	//! default reqwest transport.

	pub use crate::_prelude::*;

	// crates.io
	use base64::{Engine, engine::general_purpose::STANDARD};
	// self
	use crate::{
		http::ReqwestHttpClient,
		provision::{KeyExchange, KeyPolicy, PortalEndpoints},
	};

	/// Key exchange type alias used by reqwest-backed integration tests.
	pub type ReqwestTestExchange = KeyExchange<ReqwestHttpClient>;

	/// Builds a blocking reqwest HTTP client suitable for talking to an `httpmock` server.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		ReqwestHttpClient::new().expect("Failed to build Reqwest client for tests.")
	}

	/// Constructs a [`KeyExchange`] pointed at `portal_base` with the default key policy.
	pub fn build_reqwest_test_exchange(portal_base: &str) -> ReqwestTestExchange {
		let base = Url::parse(portal_base).expect("Mock portal base URL should parse.");
		let endpoints =
			PortalEndpoints::from_base(&base).expect("Mock portal endpoints should resolve.");

		KeyExchange::new(Arc::new(test_reqwest_http_client()), KeyPolicy::default())
			.with_endpoints(endpoints)
	}

	/// Encodes a session token whose payload restricts the login to `cidr`, matching the
	/// shape the developer portal returns from `/api/login`.
	pub fn session_token_for(cidr: &str) -> String {
		let header = STANDARD.encode("{}");
		let payload = STANDARD.encode(format!("{{\"limits\":[null,{{\"cidrs\":[\"{cidr}\"]}}]}}"));

		format!("{header}.{payload}.sig")
	}
}

mod _prelude {
	pub use std::{
		collections::{HashMap, VecDeque},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Condvar, Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{blocking::Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
