use crate::{
    Config,
    error::ApiError,
    model::{ForecastRequest, LocationCandidate, WeatherSnapshot},
    provider::weatherapi::WeatherApiProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod weatherapi;

#[cfg(test)]
pub(crate) mod fake;

/// Remote geocoding and forecast service.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Places whose name starts with `query`. Callers decide the minimum query length.
    async fn search_locations(&self, query: &str) -> Result<Vec<LocationCandidate>, ApiError>;

    async fn fetch_forecast(&self, request: &ForecastRequest) -> Result<WeatherSnapshot, ApiError>;
}

/// Construct the WeatherAPI.com provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for WeatherAPI.com.\n\
                 Hint: run `cityweather configure` and enter your API key."
        )
    })?;

    let provider = WeatherApiProvider::with_options(
        api_key.to_owned(),
        config.base_url(),
        config.request_timeout(),
    )?;

    Ok(Arc::new(provider))
}
