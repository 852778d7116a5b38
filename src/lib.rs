/*
 *  lib.rs
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

//! Agenda + weather dashboard renderer. Aggregates iCalendar feeds and
//! an Open-Meteo forecast into one deterministic PNG per invocation.

pub mod calendar;
pub mod canvas;
pub mod color;
pub mod config;
pub mod dashboard;
pub mod draw;
pub mod event;
pub mod fonts;
pub mod layout;
pub mod locale;
pub mod weather;
