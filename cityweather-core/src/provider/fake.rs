//! Scriptable in-process provider for controller tests.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::{
    error::ApiError,
    model::{
        Astro, Condition, CurrentConditions, DaySummary, Forecast, ForecastDay, ForecastRequest,
        LocationCandidate, SnapshotLocation, WeatherSnapshot,
    },
};

use super::WeatherProvider;

#[derive(Debug, Default)]
pub(crate) struct FakeProvider {
    searches: Mutex<Vec<String>>,
    forecasts: Mutex<Vec<(String, u8)>>,
    candidates: Mutex<Vec<LocationCandidate>>,
    failing_search: Mutex<bool>,
    missing: Mutex<HashSet<String>>,
    broken: Mutex<HashSet<String>>,
    forecast_holds: Mutex<HashMap<String, Arc<Notify>>>,
    search_hold: Mutex<Option<Arc<Notify>>>,
}

impl FakeProvider {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn set_candidates(&self, candidates: Vec<LocationCandidate>) {
        *self.candidates.lock() = candidates;
    }

    pub(crate) fn fail_searches(&self) {
        *self.failing_search.lock() = true;
    }

    /// Forecasts for `city` answer `NotFound`.
    pub(crate) fn mark_missing(&self, city: &str) {
        self.missing.lock().insert(city.to_string());
    }

    /// Forecasts for `city` fail with a 503.
    pub(crate) fn mark_broken(&self, city: &str) {
        self.broken.lock().insert(city.to_string());
    }

    /// Forecasts for `city` wait until the returned gate is notified.
    pub(crate) fn hold_forecast(&self, city: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.forecast_holds.lock().insert(city.to_string(), gate.clone());
        gate
    }

    /// Searches wait until the returned gate is notified.
    pub(crate) fn hold_searches(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.search_hold.lock() = Some(gate.clone());
        gate
    }

    pub(crate) fn searches(&self) -> Vec<String> {
        self.searches.lock().clone()
    }

    pub(crate) fn forecasts(&self) -> Vec<(String, u8)> {
        self.forecasts.lock().clone()
    }
}

#[async_trait]
impl WeatherProvider for FakeProvider {
    async fn search_locations(&self, query: &str) -> Result<Vec<LocationCandidate>, ApiError> {
        self.searches.lock().push(query.to_string());

        let hold = self.search_hold.lock().clone();
        if let Some(gate) = hold {
            gate.notified().await;
        }

        if *self.failing_search.lock() {
            return Err(ApiError::Status { status: 503, body: "unavailable".into() });
        }

        Ok(self.candidates.lock().clone())
    }

    async fn fetch_forecast(&self, request: &ForecastRequest) -> Result<WeatherSnapshot, ApiError> {
        let city = request.city().to_string();
        self.forecasts.lock().push((city.clone(), request.days()));

        let hold = self.forecast_holds.lock().get(&city).cloned();
        if let Some(gate) = hold {
            gate.notified().await;
        }

        if self.missing.lock().contains(&city) {
            return Err(ApiError::NotFound(city));
        }
        if self.broken.lock().contains(&city) {
            return Err(ApiError::Status { status: 503, body: "unavailable".into() });
        }

        Ok(snapshot_for(&city, request.days()))
    }
}

/// A plausible snapshot whose location is parsed back out of `"<name>,<country>"`.
pub(crate) fn snapshot_for(city: &str, days: u8) -> WeatherSnapshot {
    let (name, country) = city.split_once(',').unwrap_or((city, "Unknown"));
    let first = NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date");

    let forecastday = first
        .iter_days()
        .take(days as usize)
        .map(|date| ForecastDay {
            date,
            day: DaySummary {
                avgtemp_c: 12.5,
                condition: Condition { text: "Partly cloudy".into() },
            },
            astro: Astro { sunrise: "07:21 AM".into() },
        })
        .collect();

    WeatherSnapshot {
        current: CurrentConditions {
            temp_c: 14.0,
            condition: Condition { text: "Partly cloudy".into() },
            wind_kph: 9.4,
            humidity: 72,
        },
        location: SnapshotLocation {
            name: name.trim().to_string(),
            country: country.trim().to_string(),
        },
        forecast: Forecast { forecastday },
    }
}
