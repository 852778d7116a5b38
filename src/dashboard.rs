/*
 *  dashboard.rs
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

use chrono::Utc;
use log::{debug, info};
use thiserror::Error;

use crate::calendar::{self, CalendarError, CalendarSource, Window};
use crate::canvas::{Canvas, CanvasError};
use crate::color::{BLACK, WHITE};
use crate::config::Config;
use crate::event::inject_placeholders;
use crate::layout::{render_dashboard, LayoutOptions};
use crate::weather;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Render(#[from] CanvasError),
}

/// One full render: fetch, normalize, lay out, encode. Everything the
/// image shows is a function of the config and the wall clock.
pub async fn generate_image(cfg: &Config) -> Result<Vec<u8>, DashboardError> {
    let tz = cfg.timezone();
    let now = Utc::now().with_timezone(&tz);
    let window = Window::from_now(tz, now);
    let labels = cfg.labels();

    let sources: Vec<CalendarSource> = cfg
        .urls()
        .iter()
        .cloned()
        .zip(cfg.effective_colors())
        .map(|(url, color)| CalendarSource { url, color })
        .collect();

    let mut events = calendar::fetch_events(&sources, tz, window, now).await?;
    info!("aggregated {} events from {} calendars", events.len(), sources.len());
    inject_placeholders(&mut events, tz, now, &labels);

    let (lat, lon) = cfg.coordinates();
    let snapshot = weather::fetch_weather_or_empty(lat, lon, tz.name(), &labels).await;

    let (width, height) = cfg.dimensions();
    let opts = LayoutOptions {
        width,
        height,
        tz,
        now,
        time_format: cfg.time_format(),
        font_scale: cfg.font_scale(),
        labels,
        units: cfg.units(),
        bg: WHITE,
        fg: BLACK,
    };

    let mut canvas = Canvas::new(width, height, opts.bg);
    // Canvas drawing is infallible; clipping handles the edges.
    match render_dashboard(&mut canvas, &events, &snapshot, &opts) {
        Ok(()) => {}
        Err(infallible) => match infallible {},
    }
    debug!("rendered {width}x{height} dashboard");

    Ok(canvas.encode_png()?)
}
