//! Async client for the UK Government Fuel Finder API: OAuth2 client credentials, paginated
//! fuel price and forecourt endpoints, a TTL response cache, and a sliding-window rate limiter
//! with exponential backoff.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod client;
pub mod compat;
pub mod config;
pub mod error;
pub mod geo;
pub mod http;
pub mod model;
pub mod obs;
pub mod query;
pub mod rate_limit;
pub mod service;

mod _prelude {
	pub use std::{
		collections::{HashMap, VecDeque},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		str::FromStr,
		sync::Arc,
		time::Duration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use client::{FuelFinderClient, PfsInfoPages};
pub use compat::Compat;
pub use config::{ClientConfig, CompatMode, Environment};
pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
