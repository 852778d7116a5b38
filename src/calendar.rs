/*
 *  calendar.rs
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

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use embedded_graphics::pixelcolor::Rgb888;
use icalendar::parser::{read_calendar, unfold, Component, Property};
use icalendar::{CalendarDateTime, DatePerhapsTime};
use log::{debug, warn};
use reqwest::{header, Client};
use rrule::RRuleSet;
use thiserror::Error;

use crate::color::contrast_color;
use crate::event::{local_midnight, Event, EventStamp};

const FETCH_TIMEOUT: StdDuration = StdDuration::from_secs(30);
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

// Per-rule ceiling for occurrence expansion. Covers every sane pattern
// inside a two week window.
const MAX_OCCURRENCES: u16 = 512;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("failed to fetch calendar {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to parse calendar {url}: {reason}")]
    Parse { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// One configured calendar feed with its accent color.
#[derive(Debug, Clone)]
pub struct CalendarSource {
    pub url: String,
    pub color: Rgb888,
}

/// Half-open aggregation window in the display timezone.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl Window {
    /// Local midnight of `now`'s day through two weeks out. Wider than
    /// the three rendered days so long-running events that began
    /// earlier still land on the agenda.
    pub fn from_now(tz: Tz, now: DateTime<Tz>) -> Self {
        let start = local_midnight(tz, now.date_naive());
        Window { start, end: start + Duration::weeks(2) }
    }
}

/// Timestamp as the feed wrote it, before timezone normalization.
#[derive(Debug, Clone)]
enum RawStamp {
    Date(NaiveDate),
    Utc(DateTime<Utc>),
    Floating(NaiveDateTime),
    Zoned { local: NaiveDateTime, tzid: String },
}

impl From<DatePerhapsTime> for RawStamp {
    fn from(dpt: DatePerhapsTime) -> Self {
        match dpt {
            DatePerhapsTime::Date(d) => RawStamp::Date(d),
            DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
                CalendarDateTime::Utc(dt) => RawStamp::Utc(dt),
                CalendarDateTime::Floating(naive) => RawStamp::Floating(naive),
                CalendarDateTime::WithTimezone { date_time, tzid } => {
                    RawStamp::Zoned { local: date_time, tzid }
                }
            },
        }
    }
}

fn resolve_local(tz: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    use chrono::TimeZone;
    match tz.from_local_datetime(&naive).earliest() {
        Some(dt) => dt,
        None => tz.from_utc_datetime(&naive),
    }
}

impl RawStamp {
    fn is_date(&self) -> bool {
        matches!(self, RawStamp::Date(_))
    }

    /// Normalize into the display timezone. Floating times are read as
    /// display-local wall time; an unknown TZID degrades to floating.
    fn resolve(&self, tz: Tz) -> EventStamp {
        match self {
            RawStamp::Date(d) => EventStamp::Date(*d),
            RawStamp::Utc(dt) => EventStamp::Zoned(dt.with_timezone(&tz)),
            RawStamp::Floating(naive) => EventStamp::Zoned(resolve_local(tz, *naive)),
            RawStamp::Zoned { local, tzid } => match tzid.parse::<Tz>() {
                Ok(src) => EventStamp::Zoned(resolve_local(src, *local).with_timezone(&tz)),
                Err(_) => {
                    warn!("unknown TZID {tzid:?}, treating stamp as floating");
                    EventStamp::Zoned(resolve_local(tz, *local))
                }
            },
        }
    }

    /// DTSTART line for the rrule parser, matching the stamp variant.
    fn dtstart_line(&self) -> String {
        match self {
            RawStamp::Date(d) => format!("DTSTART:{}T000000Z", d.format("%Y%m%d")),
            RawStamp::Utc(dt) => format!("DTSTART:{}", dt.format("%Y%m%dT%H%M%SZ")),
            RawStamp::Floating(naive) => format!("DTSTART:{}Z", naive.format("%Y%m%dT%H%M%S")),
            RawStamp::Zoned { local, tzid } => {
                format!("DTSTART;TZID={tzid}:{}", local.format("%Y%m%dT%H%M%S"))
            }
        }
    }

    /// Map an rrule occurrence back onto this stamp's variant.
    fn occurrence(&self, occ: &DateTime<rrule::Tz>) -> RawStamp {
        match self {
            RawStamp::Date(_) => RawStamp::Date(occ.date_naive()),
            RawStamp::Utc(_) => RawStamp::Utc(occ.with_timezone(&Utc)),
            RawStamp::Floating(_) => RawStamp::Floating(occ.naive_utc()),
            RawStamp::Zoned { tzid, .. } => {
                RawStamp::Zoned { local: occ.naive_local(), tzid: tzid.clone() }
            }
        }
    }

    fn shift(&self, delta: Duration) -> RawStamp {
        match self {
            RawStamp::Date(d) => RawStamp::Date(*d + Duration::days(delta.num_days())),
            RawStamp::Utc(dt) => RawStamp::Utc(*dt + delta),
            RawStamp::Floating(naive) => RawStamp::Floating(*naive + delta),
            RawStamp::Zoned { local, tzid } => {
                RawStamp::Zoned { local: *local + delta, tzid: tzid.clone() }
            }
        }
    }
}

/// Re-emit a parsed property as a content line for the rrule parser.
fn property_line(p: &Property) -> String {
    let mut line = p.name.as_ref().to_string();
    for param in &p.params {
        line.push(';');
        line.push_str(param.key.as_ref());
        if let Some(v) = &param.val {
            line.push('=');
            line.push_str(v.as_ref());
        }
    }
    line.push(':');
    line.push_str(p.val.as_ref());
    line
}

/// ICS DURATION value to a chrono duration (P1DT2H30M, PT45M, P2W).
fn parse_ics_duration(value: &str) -> Option<Duration> {
    let trimmed = value.trim_start_matches(['+', '-']);
    let parsed = iso8601::duration(trimmed).ok()?;
    let std: StdDuration = parsed.into();
    Duration::from_std(std).ok()
}

struct RawEvent {
    summary: String,
    start: RawStamp,
    end: Option<RawStamp>,
}

fn raw_end(vevent: &Component<'_>, start: &RawStamp, summary: &str) -> Option<RawStamp> {
    if let Some(prop) = vevent.find_prop("DTEND") {
        match DatePerhapsTime::try_from(prop) {
            Ok(dpt) => return Some(RawStamp::from(dpt)),
            Err(_) => {
                // Conservative: an unreadable end never hides the event.
                warn!("unparsable DTEND on {summary:?}, keeping event without end");
                return None;
            }
        }
    }
    if let Some(prop) = vevent.find_prop("DURATION") {
        match parse_ics_duration(prop.val.as_ref()) {
            Some(dur) => return Some(start.shift(dur)),
            None => {
                warn!("unparsable DURATION on {summary:?}, keeping event without end");
                return None;
            }
        }
    }
    None
}

/// Expand one recurring master within the window. The master itself is
/// replaced by its occurrences.
fn expand_recurring(
    vevent: &Component<'_>,
    master: &RawEvent,
    rrule_prop: &Property,
    window: Window,
    tz: Tz,
) -> Vec<RawEvent> {
    let mut lines = vec![master.start.dtstart_line()];
    lines.push(format!("RRULE:{}", rrule_prop.val.as_ref()));
    for p in vevent.properties.iter().filter(|p| p.name == "EXDATE") {
        lines.push(property_line(p));
    }
    let rrule_str = lines.join("\n");

    let rrule_set: RRuleSet = match rrule_str.parse() {
        Ok(set) => set,
        Err(e) => {
            warn!("unparsable RRULE on {:?}, treating as single event: {e}", master.summary);
            return vec![RawEvent {
                summary: master.summary.clone(),
                start: master.start.clone(),
                end: master.end.clone(),
            }];
        }
    };

    // Master duration, so occurrences that started before the window but
    // are still running get picked up.
    let duration = match &master.end {
        Some(end) => {
            let d = end.resolve(tz).instant_in(tz) - master.start.resolve(tz).instant_in(tz);
            if d > Duration::zero() { d } else { Duration::zero() }
        }
        None => Duration::zero(),
    };

    let rtz: rrule::Tz = Utc.into();
    let after = (window.start.with_timezone(&Utc) - duration - Duration::seconds(1))
        .with_timezone(&rtz);
    let before = window.end.with_timezone(&Utc).with_timezone(&rtz);

    let result = rrule_set.after(after).before(before).all(MAX_OCCURRENCES);

    result
        .dates
        .iter()
        .map(|occ| {
            let start = master.start.occurrence(occ);
            let end = master.end.as_ref().map(|_| start.shift(duration));
            RawEvent { summary: master.summary.clone(), start, end }
        })
        .collect()
}

/// True if the event has fully ended from the agenda's point of view.
///
/// Uses the end when there is one, else the start. Anything ending on an
/// earlier day is gone; a timed event ending today is gone once its end
/// instant has passed. All-day rows stay for their whole last day.
fn has_ended(event: &Event, tz: Tz, now: DateTime<Tz>) -> bool {
    let end = event.effective_end(tz);
    let today = now.date_naive();
    let end_date = end.date_in(tz);
    if end_date < today {
        return true;
    }
    if end_date == today && !event.all_day && end.instant_in(tz) <= now {
        return true;
    }
    false
}

fn overlaps_window(start: &EventStamp, end: &EventStamp, window: Window, tz: Tz) -> bool {
    end.instant_in(tz) >= window.start && start.instant_in(tz) < window.end
}

/// Parse one ICS document into normalized, filtered events.
///
/// Pure with respect to the network; the fetch path and the tests both
/// come through here.
pub fn events_from_ics(
    ics: &str,
    url: &str,
    color: Rgb888,
    tz: Tz,
    window: Window,
    now: DateTime<Tz>,
) -> Result<Vec<Event>, CalendarError> {
    let unfolded = unfold(ics);
    let calendar = read_calendar(&unfolded)
        .map_err(|e| CalendarError::Parse { url: url.to_string(), reason: e.to_string() })?;

    let text_color = contrast_color(color);
    let mut events = Vec::new();

    for vevent in calendar.components.iter().filter(|c| c.name == "VEVENT") {
        let summary = vevent
            .find_prop("SUMMARY")
            .map(|p| p.val.to_string())
            .unwrap_or_else(|| "(No title)".to_string());

        let start = match vevent.find_prop("DTSTART").map(DatePerhapsTime::try_from) {
            Some(Ok(dpt)) => RawStamp::from(dpt),
            _ => {
                warn!("VEVENT {summary:?} has no usable DTSTART, skipping");
                continue;
            }
        };
        let end = raw_end(vevent, &start, &summary);
        let raw = RawEvent { summary, start, end };

        let instances = match vevent.find_prop("RRULE") {
            Some(rrule_prop) => expand_recurring(vevent, &raw, rrule_prop, window, tz),
            None => vec![raw],
        };

        for instance in instances {
            let all_day = instance.start.is_date();
            let start = instance.start.resolve(tz);
            let end = instance.end.as_ref().map(|e| e.resolve(tz));
            let effective_end = end.unwrap_or(start);
            if !overlaps_window(&start, &effective_end, window, tz) {
                continue;
            }
            let event = Event {
                title: instance.summary,
                start,
                end,
                all_day,
                background_color: color,
                text_color,
                tags: vec![],
            };
            if has_ended(&event, tz, now) {
                debug!("dropping ended event {:?}", event.title);
                continue;
            }
            events.push(event);
        }
    }

    Ok(events)
}

fn build_client() -> Result<Client, reqwest::Error> {
    let mut headers = header::HeaderMap::new();
    headers.insert("User-Agent", header::HeaderValue::from_static(USER_AGENT));
    headers.insert("Accept", header::HeaderValue::from_static("text/calendar, text/plain"));
    headers.insert("Connection", header::HeaderValue::from_static("close"));

    Client::builder()
        .connect_timeout(FETCH_TIMEOUT)
        .default_headers(headers)
        .timeout(FETCH_TIMEOUT)
        .build()
}

fn normalize_url(url: &str) -> String {
    match url.strip_prefix("webcal://") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    }
}

/// Fetch and aggregate every configured source. Any failing source
/// fails the whole aggregation; a half-empty agenda would read as
/// "free day" and that lie is worse than an error.
pub async fn fetch_events(
    sources: &[CalendarSource],
    tz: Tz,
    window: Window,
    now: DateTime<Tz>,
) -> Result<Vec<Event>, CalendarError> {
    let client = build_client().map_err(CalendarError::Client)?;

    let mut events = Vec::new();
    for source in sources {
        let url = normalize_url(&source.url);
        let body = fetch_one(&client, &url).await?;
        let parsed = events_from_ics(&body, &url, source.color, tz, window, now)?;
        debug!("{} events from {url}", parsed.len());
        events.extend(parsed);
    }
    Ok(events)
}

async fn fetch_one(client: &Client, url: &str) -> Result<String, CalendarError> {
    let wrap = |source| CalendarError::Fetch { url: url.to_string(), source };
    let response = client.get(url).send().await.map_err(wrap)?;
    let response = response.error_for_status().map_err(wrap)?;
    response.text().await.map_err(wrap)
}
