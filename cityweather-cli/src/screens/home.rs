//! Home screen: search box, candidate list, current conditions and the
//! daily forecast strip.

use std::fmt::Write;

use cityweather_core::{LocationCandidate, ViewState, WeatherSnapshot, model::ForecastDay};

const STRIP_CELL_WIDTH: usize = 12;

pub fn render(view: &ViewState) -> String {
    if view.loading {
        return "\n        ( loading forecast... )\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&render_search(view));

    if let Some(error) = &view.error {
        let _ = writeln!(out, "\n  ! {error}");
    }

    match &view.weather {
        Some(weather) => {
            out.push('\n');
            out.push_str(&render_weather(weather));
        }
        None => out.push_str("\n  No forecast to show yet. Press / to search for a city.\n"),
    }

    out
}

fn render_search(view: &ViewState) -> String {
    if !view.search_visible {
        return format!("{:>width$}\n", "[/] search", width = STRIP_CELL_WIDTH * 4);
    }

    let mut out = String::from("  Search city: type a name and press enter, [/] closes\n");
    if !view.candidates.is_empty() {
        out.push_str(&render_candidates(&view.candidates));
    }
    out
}

/// Numbered candidate list; numbers are 1-based to match what the user types.
pub fn render_candidates(candidates: &[LocationCandidate]) -> String {
    let mut out = String::new();
    for (index, loc) in candidates.iter().enumerate() {
        let _ = write!(out, "  {:>2}. \u{1F4CD} {}, {}", index + 1, loc.name, loc.country);
        if let Some(region) = loc.region() {
            let _ = write!(out, "  ({region})");
        }
        out.push('\n');
    }
    out
}

pub fn render_weather(weather: &WeatherSnapshot) -> String {
    let current = &weather.current;
    let mut out = String::new();

    let _ = writeln!(out, "  {}, {}", weather.location.name, weather.location.country);
    let _ = writeln!(out);
    let _ = writeln!(out, "        {}", weather_icon(&current.condition.text));
    let _ = writeln!(out, "       {}\u{B0}", current.temp_c);
    let _ = writeln!(out, "     {}", current.condition.text);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  wind {}km   humidity {}%   sunrise {}",
        current.wind_kph,
        current.humidity,
        weather.sunrise().unwrap_or("--"),
    );

    if !weather.forecast.forecastday.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  Daily forecast");
        out.push_str(&render_strip(&weather.forecast.forecastday));
    }

    out
}

/// One column per day, laid out horizontally.
fn render_strip(days: &[ForecastDay]) -> String {
    let icons: Vec<String> =
        days.iter().map(|d| weather_icon(&d.day.condition.text).to_string()).collect();
    let names: Vec<String> = days.iter().map(|d| d.date.format("%A").to_string()).collect();
    let temps: Vec<String> = days.iter().map(|d| format!("{}\u{B0}", d.day.avgtemp_c)).collect();

    [icons, names, temps]
        .iter()
        .map(|row| {
            let cells: String = row.iter().map(|c| format!("{c:<STRIP_CELL_WIDTH$}")).collect();
            format!("  {}\n", cells.trim_end())
        })
        .collect()
}

/// Picture for a WeatherAPI.com condition label.
pub fn weather_icon(condition: &str) -> &'static str {
    let text = condition.to_lowercase();

    if text.contains("thunder") {
        "\u{26C8}"
    } else if ["snow", "sleet", "blizzard", "ice"].iter().any(|k| text.contains(k)) {
        "\u{1F328}"
    } else if ["rain", "drizzle", "shower"].iter().any(|k| text.contains(k)) {
        "\u{1F327}"
    } else if text.contains("partly") {
        "\u{26C5}"
    } else if text.contains("cloud") || text.contains("overcast") {
        "\u{2601}"
    } else if text.contains("mist") || text.contains("fog") {
        "\u{1F32B}"
    } else if text.contains("sunny") || text.contains("clear") {
        "\u{2600}"
    } else {
        "\u{1F321}"
    }
}
