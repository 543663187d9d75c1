//! Core library for the `cityweather` app.
//!
//! This crate defines:
//! - Configuration handling
//! - The WeatherAPI.com client behind the `WeatherProvider` trait
//! - Device-local key-value storage for the last viewed city
//! - The debounced search-and-forecast retrieval flow
//!
//! It is used by `cityweather-cli`, but any other front-end can drive the
//! same [`FlowController`] and render its [`ViewState`].

pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod model;
pub mod provider;
pub mod slot;
pub mod storage;

pub use config::Config;
pub use controller::{FetchOutcome, FlowController, FlowSettings, ViewState};
pub use error::{ApiError, StorageError};
pub use model::{ForecastRequest, LocationCandidate, WeatherSnapshot};
pub use provider::{WeatherProvider, provider_from_config};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
