//! The retrieval flow behind the home screen: debounced city search,
//! location selection, forecast fetch and the persisted last city.
//!
//! Every request that can write shared state carries a [`Ticket`]. Issuing a
//! new ticket for the same slot invalidates the older ones, so a late
//! completion of a superseded search or forecast is dropped instead of
//! overwriting newer state.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::{
    debounce::Debouncer,
    error::ApiError,
    model::{ForecastRequest, LocationCandidate, WeatherSnapshot},
    provider::WeatherProvider,
    slot::{Slot, Ticket},
    storage::{KeyValueStore, LAST_CITY_KEY},
};

pub const DEFAULT_CITY: &str = "London, United Kingdom";
pub const DEFAULT_FORECAST_DAYS: u8 = 7;
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
pub const MIN_QUERY_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSettings {
    /// City fetched on load when nothing has been persisted yet.
    pub default_city: String,
    pub forecast_days: u8,
    pub search_debounce: Duration,
    /// Search input shorter than this never reaches the API.
    pub min_query_chars: usize,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            default_city: DEFAULT_CITY.to_string(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            min_query_chars: MIN_QUERY_CHARS,
        }
    }
}

/// What the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub search_visible: bool,
    pub candidates: Vec<LocationCandidate>,
    pub weather: Option<WeatherSnapshot>,
    pub loading: bool,
    /// Message from the last failed forecast fetch.
    pub error: Option<String>,
}

/// How a fetch-triggering action ended.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The snapshot is now the live weather.
    Applied,
    /// A newer action started before this one settled; its result was dropped.
    Superseded,
    Failed(ApiError),
}

impl FetchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[derive(Debug, Default)]
struct FlowState {
    search_visible: bool,
    candidates: Slot<Vec<LocationCandidate>>,
    weather: Slot<Option<WeatherSnapshot>>,
    loading: bool,
    error: Option<String>,
}

impl FlowState {
    fn view(&self) -> ViewState {
        ViewState {
            search_visible: self.search_visible,
            candidates: self.candidates.get().clone(),
            weather: self.weather.get().clone(),
            loading: self.loading,
            error: self.error.clone(),
        }
    }
}

#[derive(Debug)]
struct Shared {
    provider: Arc<dyn WeatherProvider>,
    storage: Arc<dyn KeyValueStore>,
    settings: FlowSettings,
    state: Mutex<FlowState>,
    updates: watch::Sender<ViewState>,
}

impl Shared {
    /// Mutate state and publish the resulting view. Never await inside `f`.
    fn update<R>(&self, f: impl FnOnce(&mut FlowState) -> R) -> R {
        let mut state = self.state.lock();
        let out = f(&mut *state);
        self.updates.send_replace(state.view());
        out
    }

    fn search_is_current(&self, ticket: Ticket) -> bool {
        self.state.lock().candidates.is_current(ticket)
    }

    fn weather_is_current(&self, ticket: Ticket) -> bool {
        self.state.lock().weather.is_current(ticket)
    }

    async fn run_search(&self, text: String, ticket: Ticket) {
        let query = text.trim();

        if query.chars().count() < self.settings.min_query_chars {
            self.update(|state| state.candidates.commit(ticket, Vec::new()));
            return;
        }

        if !self.search_is_current(ticket) {
            return;
        }

        match self.provider.search_locations(query).await {
            Ok(found) => {
                tracing::debug!(query, count = found.len(), "location search finished");
                let applied = self.update(|state| state.candidates.commit(ticket, found));
                if !applied {
                    tracing::debug!(query, "discarding superseded search results");
                }
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "location search failed, keeping candidates");
            }
        }
    }

    async fn fetch(&self, city: &str) -> Result<WeatherSnapshot, ApiError> {
        let request = ForecastRequest::new(city, self.settings.forecast_days)?;
        self.provider.fetch_forecast(&request).await
    }

    fn settle(
        &self,
        ticket: Ticket,
        city: &str,
        result: Result<WeatherSnapshot, ApiError>,
    ) -> FetchOutcome {
        self.update(|state| {
            if !state.weather.is_current(ticket) {
                tracing::debug!(city, "discarding superseded forecast");
                return FetchOutcome::Superseded;
            }

            state.loading = false;
            match result {
                Ok(snapshot) => {
                    tracing::info!(city, "forecast updated");
                    state.weather.commit(ticket, Some(snapshot));
                    state.error = None;
                    FetchOutcome::Applied
                }
                Err(e) => {
                    tracing::warn!(city, error = %e, "forecast fetch failed");
                    state.error = Some(e.to_string());
                    FetchOutcome::Failed(e)
                }
            }
        })
    }

    async fn initial_city(&self) -> String {
        match self.storage.get(LAST_CITY_KEY).await {
            Ok(Some(city)) if !city.trim().is_empty() => city,
            Ok(_) => self.settings.default_city.clone(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read last city, using default");
                self.settings.default_city.clone()
            }
        }
    }

    async fn persist_city(&self, city: &str) {
        if let Err(e) = self.storage.set(LAST_CITY_KEY, city).await {
            tracing::warn!(city, error = %e, "failed to persist last city");
        }
    }
}

/// Drives the home screen. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct FlowController {
    shared: Arc<Shared>,
    search: Arc<Debouncer<(String, Ticket)>>,
}

impl FlowController {
    /// Starts out loading, since the first thing a mounted screen does is
    /// [`load`](Self::load). Must be called from within a Tokio runtime (the
    /// search debouncer spawns its timer).
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        storage: Arc<dyn KeyValueStore>,
        settings: FlowSettings,
    ) -> Self {
        let state = FlowState { loading: true, ..FlowState::default() };
        let (updates, _) = watch::channel(state.view());
        let quiet = settings.search_debounce;

        let shared = Arc::new(Shared {
            provider,
            storage,
            settings,
            state: Mutex::new(state),
            updates,
        });

        let worker = shared.clone();
        let search = Debouncer::new(quiet, move |(text, ticket): (String, Ticket)| {
            let shared = worker.clone();
            async move { shared.run_search(text, ticket).await }
        });

        Self { shared, search: Arc::new(search) }
    }

    pub fn view(&self) -> ViewState {
        self.shared.state.lock().view()
    }

    /// Receives a fresh [`ViewState`] after every change.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.shared.updates.subscribe()
    }

    /// Fetch the forecast for the persisted city, or the default city when
    /// nothing was persisted. A persisted city the API no longer resolves
    /// falls back to the default once.
    pub async fn load(&self) -> FetchOutcome {
        let ticket = self.shared.update(|state| {
            state.loading = true;
            state.error = None;
            state.weather.issue()
        });

        let mut city = self.shared.initial_city().await;
        tracing::info!(city = %city, "loading forecast");
        let mut result = self.shared.fetch(&city).await;

        let default_city = &self.shared.settings.default_city;
        if matches!(&result, Err(e) if e.is_not_found())
            && city != *default_city
            && self.shared.weather_is_current(ticket)
        {
            tracing::warn!(city = %city, "last city no longer resolves, falling back to default");
            city = default_city.clone();
            result = self.shared.fetch(&city).await;
        }

        self.shared.settle(ticket, &city, result)
    }

    /// Feed the search box's current text. The lookup runs once the input has
    /// been quiet for the debounce window.
    pub fn search_text_changed(&self, text: impl Into<String>) {
        let ticket = self.shared.state.lock().candidates.issue();
        self.search.call((text.into(), ticket));
    }

    /// Show or hide the search box. Returns the new visibility.
    pub fn toggle_search(&self) -> bool {
        self.shared.update(|state| {
            state.search_visible = !state.search_visible;
            state.search_visible
        })
    }

    /// Switch to `candidate`: clear the candidate list, hide the search box,
    /// fetch its forecast and, once that succeeded, persist it as the last city.
    pub async fn select_location(&self, candidate: &LocationCandidate) -> FetchOutcome {
        let city = candidate.city_query();
        self.search.cancel();

        let ticket = self.shared.update(|state| {
            state.loading = true;
            state.error = None;
            state.search_visible = false;
            state.candidates.issue();
            state.candidates.set(Vec::new());
            state.weather.issue()
        });

        tracing::info!(city = %city, "location selected");
        let result = self.shared.fetch(&city).await;
        let outcome = self.shared.settle(ticket, &city, result);

        if outcome.is_applied() {
            self.shared.persist_city(&city).await;
        }

        outcome
    }
}
