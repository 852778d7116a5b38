/*
 *  color.rs
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

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

pub const WHITE: Rgb888 = Rgb888::new(255, 255, 255);
pub const BLACK: Rgb888 = Rgb888::new(0, 0, 0);
pub const RED: Rgb888 = Rgb888::new(224, 0, 0);
pub const GREEN: Rgb888 = Rgb888::new(0, 200, 0);
pub const BLUE: Rgb888 = Rgb888::new(0, 0, 255);
pub const LIGHT_GRAY: Rgb888 = Rgb888::new(200, 200, 200);

/// Fallback accent used when a calendar has no explicit color.
pub const DEFAULT_CALENDAR_COLOR: &str = "#007BFF";

/// Parse a `#RRGGBB` hex string. Anything malformed falls back to the
/// default calendar accent so a bad config entry never kills a render.
pub fn parse_hex(s: &str) -> Rgb888 {
    fn parse_strict(s: &str) -> Option<Rgb888> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Rgb888::new(r, g, b))
    }
    match parse_strict(s.trim()) {
        Some(c) => c,
        None => {
            log::warn!("unparsable hex color {s:?}, using default");
            parse_strict(DEFAULT_CALENDAR_COLOR).unwrap_or(BLUE)
        }
    }
}

/// Black or white, whichever reads better on `bg`.
///
/// YIQ luma, integer arithmetic. 150 and up takes black text.
pub fn contrast_color(bg: Rgb888) -> Rgb888 {
    let yiq = (299u32 * bg.r() as u32 + 587 * bg.g() as u32 + 114 * bg.b() as u32) / 1000;
    if yiq >= 150 { BLACK } else { WHITE }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_roundtrip() {
        assert_eq!(parse_hex("#007BFF"), Rgb888::new(0, 123, 255));
        assert_eq!(parse_hex("#ffffff"), WHITE);
        assert_eq!(parse_hex(" #E00000 "), RED);
    }

    #[test]
    fn test_parse_hex_fallback() {
        let default = parse_hex(DEFAULT_CALENDAR_COLOR);
        assert_eq!(parse_hex("blue"), default);
        assert_eq!(parse_hex("#12345"), default);
        assert_eq!(parse_hex("#12345G"), default);
        assert_eq!(parse_hex(""), default);
    }

    #[test]
    fn test_contrast_boundary() {
        // Pure gray 150 sits exactly on the threshold: black text.
        assert_eq!(contrast_color(Rgb888::new(150, 150, 150)), BLACK);
        assert_eq!(contrast_color(Rgb888::new(149, 149, 149)), WHITE);
        assert_eq!(contrast_color(WHITE), BLACK);
        assert_eq!(contrast_color(BLACK), WHITE);
        // Saturated blue is dark by YIQ despite its high B channel.
        assert_eq!(contrast_color(BLUE), WHITE);
    }
}
