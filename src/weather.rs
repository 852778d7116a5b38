/*
 *  weather.rs
 *
 *  agendash - agenda at a glance
 *	(c) 2025-26 the agendash authors
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use std::time::Duration;

use log::{debug, warn};
use reqwest::{header, Client};
use serde::Deserialize;

use crate::locale::Labels;

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/dwd-icon";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

/// Unit system for temperature display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl UnitSystem {
    /// Tolerant parse. Accepts the long names and single-letter aliases.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "imperial" | "f" | "fahrenheit" => UnitSystem::Imperial,
            "standard" | "k" | "kelvin" => UnitSystem::Standard,
            "metric" | "c" | "celsius" | "" => UnitSystem::Metric,
            other => {
                warn!("unknown unit system {other:?}, using metric");
                UnitSystem::Metric
            }
        }
    }
}

/// Formatted temperature with full unit suffix.
pub fn convert_temp(celsius: Option<f64>, units: UnitSystem) -> String {
    match celsius {
        None => "--".to_string(),
        Some(c) => match units {
            UnitSystem::Imperial => format!("{}°F", (c * 9.0 / 5.0 + 32.0).round() as i64),
            UnitSystem::Standard => format!("{}K", (c + 273.15).round() as i64),
            UnitSystem::Metric => format!("{}°C", c.round() as i64),
        },
    }
}

/// Short form for ranges: degree sign only, suffix added once per line.
pub fn convert_temp_short(celsius: Option<f64>, units: UnitSystem) -> String {
    match celsius {
        None => "--".to_string(),
        Some(c) => {
            let v = match units {
                UnitSystem::Imperial => (c * 9.0 / 5.0 + 32.0).round() as i64,
                UnitSystem::Standard => (c + 273.15).round() as i64,
                UnitSystem::Metric => c.round() as i64,
            };
            format!("{v}°")
        }
    }
}

pub fn unit_suffix(units: UnitSystem) -> &'static str {
    match units {
        UnitSystem::Imperial => "F",
        UnitSystem::Standard => "K",
        UnitSystem::Metric => "C",
    }
}

/// WMO weather code to a short ASCII description. Codes outside the
/// table come back as "?" so a new code never breaks the layout.
pub fn describe(code: i64) -> &'static str {
    match code {
        0 => "Clear",
        1 => "Mostly Clear",
        2 => "Partly Cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 => "Light Drizzle",
        53 => "Drizzle",
        55 => "Heavy Drizzle",
        61 => "Light Rain",
        63 => "Rain",
        65 => "Heavy Rain",
        71 => "Light Snow",
        73 => "Snow",
        75 => "Heavy Snow",
        80 => "Showers",
        81 => "Rain Showers",
        82 => "Heavy Showers",
        95 => "Thunderstorm",
        96 | 99 => "T-storm + Hail",
        _ => "?",
    }
}

/// Fixed daytime sampling hours for the today column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HourSlot {
    Morning,
    Noon,
    Afternoon,
}

impl HourSlot {
    pub const ALL: [HourSlot; 3] = [HourSlot::Morning, HourSlot::Noon, HourSlot::Afternoon];

    pub fn hour(self) -> u32 {
        match self {
            HourSlot::Morning => 8,
            HourSlot::Noon => 12,
            HourSlot::Afternoon => 15,
        }
    }

    pub fn label_12h(self) -> &'static str {
        match self {
            HourSlot::Morning => "8am",
            HourSlot::Noon => "Noon",
            HourSlot::Afternoon => "3pm",
        }
    }

    pub fn label_24h(self) -> &'static str {
        match self {
            HourSlot::Morning => "08:00",
            HourSlot::Noon => "12:00",
            HourSlot::Afternoon => "15:00",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temperature_c: Option<f64>,
    pub windspeed_kmh: Option<f64>,
    pub code: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TodayConditions {
    pub temp_min_c: Option<f64>,
    pub temp_max_c: Option<f64>,
    pub code: i64,
    /// Temperatures at the fixed daytime slots, in slot order.
    pub hourly: Vec<(HourSlot, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    pub label: String,
    pub code: i64,
    pub temp_min_c: Option<f64>,
    pub temp_max_c: Option<f64>,
    pub precipitation_mm: Option<f64>,
}

/// Normalized weather for one render. An empty snapshot is the fail-soft
/// result of any fetch or decode problem.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherSnapshot {
    pub current: Option<CurrentConditions>,
    pub today: Option<TodayConditions>,
    pub forecast: Vec<ForecastDay>,
}

impl WeatherSnapshot {
    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.today.is_none() && self.forecast.is_empty()
    }
}

// Wire shape of the Open-Meteo response. Every field defaults so a
// partial payload degrades instead of failing the decode.
#[derive(Debug, Default, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    current_weather: Option<ApiCurrent>,
    #[serde(default)]
    daily: ApiDaily,
    #[serde(default)]
    hourly: ApiHourly,
}

#[derive(Debug, Default, Deserialize)]
struct ApiCurrent {
    temperature: Option<f64>,
    windspeed: Option<f64>,
    weathercode: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiDaily {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    weathercode: Vec<Option<i64>>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiHourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
}

fn get_opt<T: Copy>(v: &[Option<T>], i: usize) -> Option<T> {
    v.get(i).copied().flatten()
}

/// Flatten the API payload into a snapshot. Daily index 0 is today,
/// 1 and 2 feed the forecast rows labelled per locale.
pub fn normalize(data: ApiResponse, labels: &Labels) -> WeatherSnapshot {
    let current = data.current_weather.map(|c| CurrentConditions {
        temperature_c: c.temperature,
        windspeed_kmh: c.windspeed,
        code: c.weathercode.unwrap_or(0),
    });

    let daily = &data.daily;
    let today = daily.time.first().map(|today_str| {
        let mut hourly = Vec::new();
        for slot in HourSlot::ALL {
            for (idx, t) in data.hourly.time.iter().enumerate() {
                if !t.starts_with(today_str.as_str()) {
                    continue;
                }
                // ISO stamps like "2026-08-26T08:00"
                let hour = t.get(11..13).and_then(|h| h.parse::<u32>().ok());
                if hour == Some(slot.hour()) {
                    if let Some(temp) = get_opt(&data.hourly.temperature_2m, idx) {
                        hourly.push((slot, temp));
                    }
                    break;
                }
            }
        }
        TodayConditions {
            temp_min_c: get_opt(&daily.temperature_2m_min, 0),
            temp_max_c: get_opt(&daily.temperature_2m_max, 0),
            code: get_opt(&daily.weathercode, 0).unwrap_or(0),
            hourly,
        }
    });

    let day_labels = [labels.tomorrow, labels.day_after_tomorrow];
    let forecast = (1..daily.time.len().min(3))
        .map(|i| ForecastDay {
            label: day_labels[i - 1].to_string(),
            code: get_opt(&daily.weathercode, i).unwrap_or(0),
            temp_min_c: get_opt(&daily.temperature_2m_min, i),
            temp_max_c: get_opt(&daily.temperature_2m_max, i),
            precipitation_mm: get_opt(&daily.precipitation_sum, i),
        })
        .collect();

    WeatherSnapshot { current, today, forecast }
}

fn build_client() -> Result<Client, reqwest::Error> {
    let mut headers = header::HeaderMap::new();
    headers.insert("User-Agent", header::HeaderValue::from_static(USER_AGENT));
    headers.insert("Accept", header::HeaderValue::from_static("application/json"));
    headers.insert("Connection", header::HeaderValue::from_static("close"));

    Client::builder()
        .connect_timeout(FETCH_TIMEOUT)
        .default_headers(headers)
        .timeout(FETCH_TIMEOUT)
        .build()
}

pub async fn fetch_weather(
    latitude: f64,
    longitude: f64,
    timezone: &str,
    labels: &Labels,
) -> Result<WeatherSnapshot, reqwest::Error> {
    let client = build_client()?;
    let response = client
        .get(FORECAST_URL)
        .query(&[
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("current_weather", "true".to_string()),
            (
                "daily",
                "temperature_2m_max,temperature_2m_min,precipitation_sum,weathercode".to_string(),
            ),
            ("hourly", "temperature_2m".to_string()),
            ("forecast_days", "3".to_string()),
            ("timezone", timezone.to_string()),
        ])
        .send()
        .await?
        .error_for_status()?;

    let data: ApiResponse = response.json().await?;
    let snapshot = normalize(data, labels);
    debug!(
        "weather fetched: current={} today={} forecast_days={}",
        snapshot.current.is_some(),
        snapshot.today.is_some(),
        snapshot.forecast.len()
    );
    Ok(snapshot)
}

/// Weather is decoration. Any failure logs a warning and yields an
/// empty snapshot so the agenda still renders.
pub async fn fetch_weather_or_empty(
    latitude: f64,
    longitude: f64,
    timezone: &str,
    labels: &Labels,
) -> WeatherSnapshot {
    match fetch_weather(latitude, longitude, timezone, labels).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("weather fetch failed, rendering without it: {e}");
            WeatherSnapshot::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::EN;

    fn sample_json() -> &'static str {
        r#"{
            "current_weather": {"temperature": 21.6, "windspeed": 11.2, "weathercode": 2},
            "daily": {
                "time": ["2026-08-26", "2026-08-27", "2026-08-28"],
                "temperature_2m_max": [24.1, 19.0, 22.3],
                "temperature_2m_min": [14.8, 12.2, 13.0],
                "precipitation_sum": [0.0, 4.2, null],
                "weathercode": [2, 61, 3]
            },
            "hourly": {
                "time": [
                    "2026-08-26T08:00", "2026-08-26T12:00", "2026-08-26T15:00",
                    "2026-08-27T08:00"
                ],
                "temperature_2m": [15.4, 21.0, 23.2, 12.9]
            }
        }"#
    }

    #[test]
    fn test_normalize_full_payload() {
        let data: ApiResponse = serde_json::from_str(sample_json()).unwrap();
        let snap = normalize(data, &EN);
        assert!(!snap.is_empty());

        let current = snap.current.unwrap();
        assert_eq!(current.temperature_c, Some(21.6));
        assert_eq!(current.code, 2);

        let today = snap.today.unwrap();
        assert_eq!(today.temp_min_c, Some(14.8));
        assert_eq!(today.temp_max_c, Some(24.1));
        assert_eq!(
            today.hourly,
            vec![
                (HourSlot::Morning, 15.4),
                (HourSlot::Noon, 21.0),
                (HourSlot::Afternoon, 23.2),
            ]
        );

        assert_eq!(snap.forecast.len(), 2);
        assert_eq!(snap.forecast[0].label, "Tomorrow");
        assert_eq!(snap.forecast[0].precipitation_mm, Some(4.2));
        assert_eq!(snap.forecast[1].label, "Day after tomorrow");
        assert_eq!(snap.forecast[1].precipitation_mm, None);
    }

    #[test]
    fn test_normalize_empty_payload() {
        let data: ApiResponse = serde_json::from_str("{}").unwrap();
        let snap = normalize(data, &EN);
        assert!(snap.is_empty());
    }

    #[test]
    fn test_normalize_missing_hourly() {
        let data: ApiResponse = serde_json::from_str(
            r#"{"daily": {"time": ["2026-08-26"], "weathercode": [0]}}"#,
        )
        .unwrap();
        let snap = normalize(data, &EN);
        let today = snap.today.unwrap();
        assert!(today.hourly.is_empty());
        assert_eq!(today.temp_min_c, None);
        assert!(snap.forecast.is_empty());
    }

    #[test]
    fn test_convert_temp() {
        assert_eq!(convert_temp(Some(21.4), UnitSystem::Metric), "21°C");
        assert_eq!(convert_temp(Some(0.0), UnitSystem::Imperial), "32°F");
        assert_eq!(convert_temp(Some(0.0), UnitSystem::Standard), "273K");
        assert_eq!(convert_temp(None, UnitSystem::Metric), "--");
        assert_eq!(convert_temp_short(Some(21.4), UnitSystem::Imperial), "71°");
        assert_eq!(convert_temp_short(None, UnitSystem::Standard), "--");
        assert_eq!(unit_suffix(UnitSystem::Metric), "C");
    }

    #[test]
    fn test_unit_system_parse() {
        assert_eq!(UnitSystem::parse("Imperial"), UnitSystem::Imperial);
        assert_eq!(UnitSystem::parse("k"), UnitSystem::Standard);
        assert_eq!(UnitSystem::parse(""), UnitSystem::Metric);
        assert_eq!(UnitSystem::parse("bogus"), UnitSystem::Metric);
    }

    #[test]
    fn test_describe_codes() {
        assert_eq!(describe(0), "Clear");
        assert_eq!(describe(96), "T-storm + Hail");
        assert_eq!(describe(42), "?");
    }
}
