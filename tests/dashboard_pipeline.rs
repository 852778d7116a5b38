/*
 *  dashboard_pipeline.rs
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

//! End-to-end pipeline coverage without the network: inline ICS text
//! and a canned Open-Meteo payload, through normalization and layout,
//! down to encoded PNG bytes.

use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;

use agendash::calendar::{events_from_ics, Window};
use agendash::canvas::Canvas;
use agendash::color::{parse_hex, BLACK, GREEN, WHITE};
use agendash::event::{inject_placeholders, local_midnight};
use agendash::layout::{render_dashboard, LayoutOptions, TimeFormat};
use agendash::locale::{labels_for, EN};
use agendash::weather::{normalize, ApiResponse, UnitSystem, WeatherSnapshot};

fn tz() -> Tz {
    "Europe/Berlin".parse().unwrap()
}

fn fixed_now() -> DateTime<Tz> {
    let date = NaiveDate::from_ymd_opt(2026, 8, 26).unwrap();
    local_midnight(tz(), date) + Duration::hours(10)
}

fn base_options() -> LayoutOptions {
    LayoutOptions {
        width: 800,
        height: 480,
        tz: tz(),
        now: fixed_now(),
        time_format: TimeFormat::TwelveHour,
        font_scale: 1.0,
        labels: EN,
        units: UnitSystem::Metric,
        bg: WHITE,
        fg: BLACK,
    }
}

const SAMPLE_ICS: &str = "BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:-//test//test//EN\n\
BEGIN:VEVENT\nSUMMARY:Doctor appointment\nDTSTART:20260826T130000Z\nDTEND:20260826T140000Z\nEND:VEVENT\n\
BEGIN:VEVENT\nSUMMARY:Town fair\nDTSTART;VALUE=DATE:20260827\nDTEND;VALUE=DATE:20260828\nEND:VEVENT\n\
BEGIN:VEVENT\nSUMMARY:Morning swim\nDTSTART:20260820T060000Z\nDTEND:20260820T070000Z\n\
RRULE:FREQ=DAILY;COUNT=30\nEND:VEVENT\n\
END:VCALENDAR\n";

const SAMPLE_WEATHER: &str = r#"{
    "current_weather": {"temperature": 19.3, "windspeed": 14.0, "weathercode": 61},
    "daily": {
        "time": ["2026-08-26", "2026-08-27", "2026-08-28"],
        "temperature_2m_max": [22.0, 18.5, 20.1],
        "temperature_2m_min": [12.4, 11.0, 12.8],
        "precipitation_sum": [1.2, 0.0, 3.4],
        "weathercode": [61, 3, 80]
    },
    "hourly": {
        "time": ["2026-08-26T08:00", "2026-08-26T12:00", "2026-08-26T15:00"],
        "temperature_2m": [13.1, 19.0, 21.5]
    }
}"#;

fn sample_events() -> Vec<agendash::event::Event> {
    let now = fixed_now();
    let window = Window::from_now(tz(), now);
    events_from_ics(SAMPLE_ICS, "test", parse_hex("#007BFF"), tz(), window, now).unwrap()
}

#[test]
fn aggregates_timed_all_day_and_recurring_events() {
    let events = sample_events();
    let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();

    assert!(titles.contains(&"Doctor appointment"));
    assert!(titles.contains(&"Town fair"));
    // The daily swim recurs into the window; the 06:00 UTC instance for
    // today has already ended at 10:00 local and is filtered out.
    let today = fixed_now().date_naive();
    let swims: Vec<_> = events.iter().filter(|e| e.title == "Morning swim").collect();
    assert!(!swims.is_empty());
    assert!(swims.iter().all(|e| e.start.date_in(tz()) > today));
}

#[test]
fn placeholders_fill_the_empty_third_day() {
    let mut events = sample_events();
    let labels = labels_for("en");
    inject_placeholders(&mut events, tz(), fixed_now(), &labels);

    // Day 3 had nothing scheduled besides the recurring swim. Remove the
    // swims first to simulate a genuinely free day.
    let mut events: Vec<_> = events.into_iter().filter(|e| e.title != "Morning swim").collect();
    inject_placeholders(&mut events, tz(), fixed_now(), &labels);

    let day3 = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
    let rows: Vec<_> = events.iter().filter(|e| e.start.date_in(tz()) == day3).collect();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_placeholder());
    assert_eq!(rows[0].title, "Nothing scheduled!");
}

#[test]
fn full_render_produces_png() {
    let mut events = sample_events();
    inject_placeholders(&mut events, tz(), fixed_now(), &EN);

    let data: ApiResponse = serde_json::from_str(SAMPLE_WEATHER).unwrap();
    let snapshot = normalize(data, &EN);
    assert!(!snapshot.is_empty());

    let opts = base_options();
    let mut canvas = Canvas::new(opts.width, opts.height, opts.bg);
    render_dashboard(&mut canvas, &events, &snapshot, &opts).unwrap();

    // Today's header band is green.
    assert_eq!(canvas.pixel(4, 60), Some(GREEN));

    let png = canvas.encode_png().unwrap();
    assert_eq!(&png[1..4], b"PNG");
    assert!(png.len() > 1000);
}

#[test]
fn weather_outage_still_renders_full_agenda() {
    let mut events = sample_events();
    inject_placeholders(&mut events, tz(), fixed_now(), &EN);

    let opts = base_options();
    let mut canvas = Canvas::new(opts.width, opts.height, opts.bg);
    render_dashboard(&mut canvas, &events, &WeatherSnapshot::default(), &opts).unwrap();

    assert_eq!(canvas.width(), 800);
    assert_eq!(canvas.height(), 480);
    // Agenda column still painted.
    assert_eq!(canvas.pixel(4, 60), Some(GREEN));
    // PNG encoding unaffected by the empty right column.
    assert!(canvas.encode_png().unwrap().len() > 1000);
}

#[test]
fn localized_render_uses_label_set() {
    let mut events: Vec<agendash::event::Event> = Vec::new();
    let labels = labels_for("de");
    inject_placeholders(&mut events, tz(), fixed_now(), &labels);
    assert_eq!(events[0].title, "Nix mehr los heute!");
    assert_eq!(events[1].title, "Nix geplant!");

    let mut opts = base_options();
    opts.labels = labels;
    let mut canvas = Canvas::new(opts.width, opts.height, opts.bg);
    render_dashboard(&mut canvas, &events, &WeatherSnapshot::default(), &opts).unwrap();
}
