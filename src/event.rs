/*
 *  event.rs
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

use chrono::{DateTime, Days, NaiveDate, TimeZone};
use chrono_tz::Tz;
use embedded_graphics::pixelcolor::Rgb888;

use crate::color::{contrast_color, parse_hex, DEFAULT_CALENDAR_COLOR};
use crate::locale::Labels;

/// Synthetic rows carry this tag so the layout can suppress their
/// time label.
pub const PLACEHOLDER_TAG: &str = "agenda-placeholder";

/// A resolved point in time. Date-only stamps keep their calendar date
/// and only become an instant when a comparison needs one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventStamp {
    Zoned(DateTime<Tz>),
    Date(NaiveDate),
}

impl EventStamp {
    /// Calendar date in the display timezone.
    pub fn date_in(&self, tz: Tz) -> NaiveDate {
        match self {
            EventStamp::Zoned(dt) => dt.with_timezone(&tz).date_naive(),
            EventStamp::Date(d) => *d,
        }
    }

    /// Concrete instant in the display timezone. Date-only stamps
    /// resolve to local midnight.
    pub fn instant_in(&self, tz: Tz) -> DateTime<Tz> {
        match self {
            EventStamp::Zoned(dt) => dt.with_timezone(&tz),
            EventStamp::Date(d) => local_midnight(tz, *d),
        }
    }
}

/// One agenda row, already normalized to the display timezone model.
#[derive(Debug, Clone)]
pub struct Event {
    pub title: String,
    pub start: EventStamp,
    pub end: Option<EventStamp>,
    pub all_day: bool,
    pub background_color: Rgb888,
    pub text_color: Rgb888,
    pub tags: Vec<String>,
}

impl Event {
    pub fn is_placeholder(&self) -> bool {
        self.tags.iter().any(|t| t == PLACEHOLDER_TAG)
    }

    /// End stamp for filtering. Events without an end, or with an end
    /// before their start, use the start.
    pub fn effective_end(&self, tz: Tz) -> EventStamp {
        match self.end {
            Some(end) if end.instant_in(tz) >= self.start.instant_in(tz) => end,
            _ => self.start,
        }
    }
}

/// Midnight of `date` in `tz`. A DST gap at midnight takes the earliest
/// valid wall time instead.
pub fn local_midnight(tz: Tz, date: NaiveDate) -> DateTime<Tz> {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    match tz.from_local_datetime(&naive).earliest() {
        Some(dt) => dt,
        None => tz.from_utc_datetime(&naive),
    }
}

fn has_event_on(events: &[Event], tz: Tz, date: NaiveDate) -> bool {
    events.iter().any(|e| e.start.date_in(tz) == date)
}

fn placeholder(title: &str, date: NaiveDate) -> Event {
    let bg = parse_hex(DEFAULT_CALENDAR_COLOR);
    Event {
        title: title.to_string(),
        start: EventStamp::Date(date),
        end: None,
        all_day: true,
        background_color: bg,
        text_color: contrast_color(bg),
        tags: vec![PLACEHOLDER_TAG.to_string()],
    }
}

/// Guarantee every agenda day has at least one row. Today gets the
/// "nothing more" label since earlier events may simply have passed;
/// later days get the "nothing scheduled" label.
pub fn inject_placeholders(events: &mut Vec<Event>, tz: Tz, now: DateTime<Tz>, labels: &Labels) {
    let today = now.date_naive();
    if !has_event_on(events, tz, today) {
        events.push(placeholder(labels.nothing_more_today, today));
    }
    for offset in 1..=2u64 {
        if let Some(date) = today.checked_add_days(Days::new(offset)) {
            if !has_event_on(events, tz, date) {
                events.push(placeholder(labels.no_events, date));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::EN;
    use chrono::Utc;

    fn tz() -> Tz {
        "Europe/Berlin".parse().unwrap()
    }

    fn timed(title: &str, date: NaiveDate, hour: u32) -> Event {
        let start = local_midnight(tz(), date) + chrono::Duration::hours(hour as i64);
        Event {
            title: title.into(),
            start: EventStamp::Zoned(start),
            end: Some(EventStamp::Zoned(start + chrono::Duration::hours(1))),
            all_day: false,
            background_color: Rgb888::new(0, 123, 255),
            text_color: Rgb888::new(255, 255, 255),
            tags: vec![],
        }
    }

    #[test]
    fn test_stamp_date_in_tz() {
        // 23:30 UTC is already the next day in Berlin.
        let utc = Utc.with_ymd_and_hms(2026, 3, 1, 23, 30, 0).unwrap();
        let stamp = EventStamp::Zoned(utc.with_timezone(&tz()));
        assert_eq!(stamp.date_in(tz()), NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
    }

    #[test]
    fn test_inject_fills_empty_days() {
        let now = local_midnight(tz(), NaiveDate::from_ymd_opt(2026, 8, 26).unwrap())
            + chrono::Duration::hours(14);
        let mut events = vec![timed("dentist", NaiveDate::from_ymd_opt(2026, 8, 27).unwrap(), 9)];
        inject_placeholders(&mut events, tz(), now, &EN);
        assert_eq!(events.len(), 3);

        let today_rows: Vec<_> = events
            .iter()
            .filter(|e| e.start.date_in(tz()) == now.date_naive())
            .collect();
        assert_eq!(today_rows.len(), 1);
        assert!(today_rows[0].is_placeholder());
        assert_eq!(today_rows[0].title, EN.nothing_more_today);
        assert!(today_rows[0].all_day);

        let day3 = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let later: Vec<_> = events.iter().filter(|e| e.start.date_in(tz()) == day3).collect();
        assert_eq!(later[0].title, EN.no_events);
    }

    #[test]
    fn test_inject_skips_covered_days() {
        let now = local_midnight(tz(), NaiveDate::from_ymd_opt(2026, 8, 26).unwrap())
            + chrono::Duration::hours(8);
        let mut events = vec![
            timed("a", NaiveDate::from_ymd_opt(2026, 8, 26).unwrap(), 9),
            timed("b", NaiveDate::from_ymd_opt(2026, 8, 27).unwrap(), 9),
            timed("c", NaiveDate::from_ymd_opt(2026, 8, 28).unwrap(), 9),
        ];
        inject_placeholders(&mut events, tz(), now, &EN);
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| !e.is_placeholder()));
    }

    #[test]
    fn test_effective_end_ignores_inverted_range() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 26).unwrap();
        let mut e = timed("x", date, 10);
        e.end = Some(EventStamp::Zoned(
            local_midnight(tz(), date) + chrono::Duration::hours(5),
        ));
        assert_eq!(e.effective_end(tz()), e.start);
    }
}
