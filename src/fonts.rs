/*
 *  fonts.rs
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

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::iso_8859_1::{
    FONT_4X6, FONT_5X8, FONT_6X10, FONT_6X13, FONT_6X13_BOLD, FONT_7X13, FONT_7X13_BOLD,
    FONT_8X13, FONT_8X13_BOLD, FONT_9X15, FONT_9X15_BOLD, FONT_9X18, FONT_9X18_BOLD, FONT_10X20,
};

/// Multiplier for a named font-size keyword. Unknown keywords render at 1.0.
pub fn font_scale(keyword: &str) -> f32 {
    match keyword {
        "x-small" => 0.7,
        "smaller" => 0.8,
        "small" => 0.9,
        "normal" => 1.0,
        "large" => 1.1,
        "larger" => 1.2,
        "x-large" => 1.3,
        _ => 1.0,
    }
}

// Ladders ordered by glyph height. Selection picks the tallest font that
// still fits the requested pixel height, so two nearby requests can land
// on the same face. ISO 8859-1 faces cover the non-English label sets.
const REGULAR: &[&MonoFont<'static>] = &[
    &FONT_4X6,
    &FONT_5X8,
    &FONT_6X10,
    &FONT_6X13,
    &FONT_7X13,
    &FONT_8X13,
    &FONT_9X15,
    &FONT_9X18,
    &FONT_10X20,
];

const BOLD: &[&MonoFont<'static>] = &[
    &FONT_4X6,
    &FONT_5X8,
    &FONT_6X10,
    &FONT_6X13_BOLD,
    &FONT_7X13_BOLD,
    &FONT_8X13_BOLD,
    &FONT_9X15_BOLD,
    &FONT_9X18_BOLD,
    &FONT_10X20,
];

fn pick(ladder: &'static [&MonoFont<'static>], px: u32) -> &'static MonoFont<'static> {
    let mut best = ladder[0];
    for font in ladder {
        if font.character_size.height <= px {
            best = *font;
        }
    }
    best
}

pub fn font_for_px(px: u32) -> &'static MonoFont<'static> {
    pick(REGULAR, px)
}

pub fn bold_font_for_px(px: u32) -> &'static MonoFont<'static> {
    pick(BOLD, px)
}

/// Rendered width in pixels of `text` in `font`.
pub fn text_width(font: &MonoFont<'_>, text: &str) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0;
    }
    n * font.character_size.width + (n - 1) * font.character_spacing
}
