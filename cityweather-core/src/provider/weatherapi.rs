use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    error::ApiError,
    model::{ForecastRequest, LocationCandidate, WeatherSnapshot},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// WeatherAPI.com error code for "No matching location found."
const NO_MATCHING_LOCATION: i64 = 1006;

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn with_options(
        api_key: String,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self { api_key, base_url: base_url.trim_end_matches('/').to_string(), http })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        subject: &str,
    ) -> Result<T, ApiError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status, &body, subject));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct WaErrorBody {
    error: WaErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WaErrorDetail {
    code: i64,
}

fn classify_failure(status: StatusCode, body: &str, subject: &str) -> ApiError {
    let api_code = serde_json::from_str::<WaErrorBody>(body).ok().map(|b| b.error.code);

    if status == StatusCode::NOT_FOUND || api_code == Some(NO_MATCHING_LOCATION) {
        return ApiError::NotFound(subject.to_string());
    }

    ApiError::Status { status: status.as_u16(), body: truncate_body(body) }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn search_locations(&self, query: &str) -> Result<Vec<LocationCandidate>, ApiError> {
        tracing::debug!(query, "searching locations");
        self.get_json("search.json", &[("q", query)], query).await
    }

    async fn fetch_forecast(&self, request: &ForecastRequest) -> Result<WeatherSnapshot, ApiError> {
        tracing::debug!(city = request.city(), days = request.days(), "fetching forecast");

        let days = request.days().to_string();
        self.get_json(
            "forecast.json",
            &[("q", request.city()), ("days", days.as_str()), ("aqi", "no"), ("alerts", "no")],
            request.city(),
        )
        .await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_1006_is_not_found() {
        let body = r#"{"error":{"code":1006,"message":"No matching location found."}}"#;
        let err = classify_failure(StatusCode::BAD_REQUEST, body, "Atlantis");
        assert!(matches!(err, ApiError::NotFound(ref city) if city == "Atlantis"));
    }

    #[test]
    fn other_api_errors_keep_status() {
        let body = r#"{"error":{"code":2006,"message":"API key is invalid."}}"#;
        let err = classify_failure(StatusCode::UNAUTHORIZED, body, "London");
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("API key is invalid"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn long_bodies_are_truncated_on_char_boundary() {
        let body = "é".repeat(300);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let provider = WeatherApiProvider::with_options(
            "KEY".into(),
            "http://localhost:1234/v1/",
            DEFAULT_TIMEOUT,
        )
        .expect("client builds");
        assert_eq!(provider.base_url, "http://localhost:1234/v1");
    }
}
