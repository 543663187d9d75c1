use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// A place returned by the location search.
///
/// Only `name` and `country` are interpreted; everything else the API sends
/// (`id`, `region`, `lat`, `lon`, `url`, ...) is kept in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub name: String,
    pub country: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LocationCandidate {
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self { name: name.into(), country: country.into(), extra: Map::new() }
    }

    /// The forecast query for this place, also the value persisted as the last city.
    pub fn city_query(&self) -> String {
        format!("{},{}", self.name, self.country)
    }

    pub fn region(&self) -> Option<&str> {
        self.extra.get("region").and_then(Value::as_str).filter(|r| !r.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct ForecastRequest {
    city: String,
    days: u8,
}

impl ForecastRequest {
    pub fn new(city: impl Into<String>, days: u8) -> Result<Self, ApiError> {
        if days == 0 {
            return Err(ApiError::InvalidRequest(
                "a forecast needs at least one day".to_string(),
            ));
        }

        Ok(Self { city: city.into(), days })
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn days(&self) -> u8 {
        self.days
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub condition: Condition,
    pub wind_kph: f64,
    pub humidity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotLocation {
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub avgtemp_c: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Astro {
    pub sunrise: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub day: DaySummary,
    pub astro: Astro,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub forecastday: Vec<ForecastDay>,
}

/// Everything the home screen shows for one city: current conditions,
/// location and the multi-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    pub location: SnapshotLocation,
    pub forecast: Forecast,
}

impl WeatherSnapshot {
    /// Sunrise of the first forecast day, shown next to wind and humidity.
    pub fn sunrise(&self) -> Option<&str> {
        self.forecast.forecastday.first().map(|d| d.astro.sunrise.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_query_has_no_space_after_comma() {
        let loc = LocationCandidate::new("Paris", "France");
        assert_eq!(loc.city_query(), "Paris,France");
    }

    #[test]
    fn candidate_keeps_passthrough_fields() {
        let loc: LocationCandidate = serde_json::from_value(serde_json::json!({
            "id": 2801268,
            "name": "London",
            "region": "City of London, Greater London",
            "country": "United Kingdom",
            "lat": 51.52,
            "lon": -0.11,
            "url": "london-city-of-london-greater-london-united-kingdom"
        }))
        .expect("candidate should parse");

        assert_eq!(loc.name, "London");
        assert_eq!(loc.country, "United Kingdom");
        assert_eq!(loc.region(), Some("City of London, Greater London"));
        assert_eq!(loc.extra.get("id"), Some(&serde_json::json!(2801268)));
    }

    #[test]
    fn forecast_request_rejects_zero_days() {
        let err = ForecastRequest::new("London", 0).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));

        let req = ForecastRequest::new("London", 7).expect("7 days is valid");
        assert_eq!(req.city(), "London");
        assert_eq!(req.days(), 7);
    }

    #[test]
    fn snapshot_sunrise_comes_from_first_day() {
        let snapshot: WeatherSnapshot = serde_json::from_value(serde_json::json!({
            "location": { "name": "Oslo", "country": "Norway" },
            "current": {
                "temp_c": -3.0,
                "condition": { "text": "Light snow" },
                "wind_kph": 11.2,
                "humidity": 86
            },
            "forecast": { "forecastday": [
                {
                    "date": "2026-01-10",
                    "day": { "avgtemp_c": -4.1, "condition": { "text": "Light snow" } },
                    "astro": { "sunrise": "09:12 AM" }
                },
                {
                    "date": "2026-01-11",
                    "day": { "avgtemp_c": -6.0, "condition": { "text": "Sunny" } },
                    "astro": { "sunrise": "09:10 AM" }
                }
            ]}
        }))
        .expect("snapshot should parse");

        assert_eq!(snapshot.sunrise(), Some("09:12 AM"));
        assert_eq!(
            snapshot.forecast.forecastday[1].date,
            NaiveDate::from_ymd_opt(2026, 1, 11).expect("valid date")
        );
    }
}
