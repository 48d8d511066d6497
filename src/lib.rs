//! Azure AD authority client for credential helpers: interactive, silent, and refresh-token
//! acquisition over pluggable token caches, user agents, and HTTP transports.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod ambient;
pub mod auth;
pub mod authority;
pub mod cache;
pub mod codec;
pub mod error;
pub mod exchange;
pub mod flows;
pub mod http;
pub mod obs;
pub mod strategy;
pub mod uri;
pub mod user_agent;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use authority::{AUTHORITY_HOST_URL_BASE, DEFAULT_AUTHORITY_HOST_URL, authority_url};
pub use flows::{AzureAuthority, TokenTarget};
#[cfg(feature = "reqwest")] pub use reqwest;
pub use tokio_util::sync::CancellationToken;
pub use url;
#[cfg(test)] use httpmock as _;
