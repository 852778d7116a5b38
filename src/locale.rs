/*
 *  locale.rs
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

/// Fixed label strings for one display language.
///
/// Weekday and month names stay English regardless; only these labels
/// localize. Adding a language is adding one table entry below.
#[derive(Debug, Clone, Copy)]
pub struct Labels {
    pub all_day: &'static str,
    pub no_events: &'static str,
    pub nothing_more_today: &'static str,
    pub today: &'static str,
    pub tomorrow: &'static str,
    pub day_after_tomorrow: &'static str,
}

pub const EN: Labels = Labels {
    all_day: "All day",
    no_events: "Nothing scheduled!",
    nothing_more_today: "Nothing more for today.",
    today: "Today",
    tomorrow: "Tomorrow",
    day_after_tomorrow: "Day after tomorrow",
};

pub const DE: Labels = Labels {
    all_day: "Ganztägig",
    no_events: "Nix geplant!",
    nothing_more_today: "Nix mehr los heute!",
    today: "Heute",
    tomorrow: "Morgen",
    day_after_tomorrow: "Übermorgen",
};

pub const ES: Labels = Labels {
    all_day: "Todo el día",
    no_events: "¡Nada programado!",
    nothing_more_today: "Nada más para hoy.",
    today: "Hoy",
    tomorrow: "Mañana",
    day_after_tomorrow: "Pasado mañana",
};

pub const FR: Labels = Labels {
    all_day: "Toute la journée",
    no_events: "Rien de prévu !",
    nothing_more_today: "Rien d'autre pour aujourd'hui.",
    today: "Aujourd'hui",
    tomorrow: "Demain",
    day_after_tomorrow: "Après-demain",
};

/// Unknown codes fall back to English rather than failing the render.
pub fn labels_for(code: &str) -> Labels {
    match code.to_ascii_lowercase().as_str() {
        "de" => DE,
        "es" => ES,
        "fr" => FR,
        "en" => EN,
        other => {
            if !other.is_empty() {
                log::debug!("no label set for locale {other:?}, using en");
            }
            EN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_for_known() {
        assert_eq!(labels_for("de").today, "Heute");
        assert_eq!(labels_for("FR").tomorrow, "Demain");
        assert_eq!(labels_for("es").all_day, "Todo el día");
    }

    #[test]
    fn test_labels_for_unknown_falls_back() {
        assert_eq!(labels_for("zz").today, "Today");
        assert_eq!(labels_for("").no_events, "Nothing scheduled!");
    }
}
