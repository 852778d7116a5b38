use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use chrono_tz::Tz;
use embedded_graphics::pixelcolor::Rgb888;

use crate::color::{parse_hex, DEFAULT_CALENDAR_COLOR};
use crate::fonts::font_scale;
use crate::layout::TimeFormat;
use crate::locale::{labels_for, Labels};
use crate::weather::UnitSystem;

const DEFAULT_TIMEZONE: &str = "America/New_York";
const DEFAULT_LATITUDE: f64 = 49.8728;
const DEFAULT_LONGITUDE: f64 = 8.6512;
const DEFAULT_WIDTH: u32 = 800;
const DEFAULT_HEIGHT: u32 = 480;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration. All fields optional so YAML and CLI can
/// each fill in a subset; getters resolve the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// iCalendar feed URLs, aggregated in order
    pub calendar_urls: Option<Vec<String>>,
    /// parallel accent colors, padded with the default when shorter
    pub calendar_colors: Option<Vec<String>>,
    pub timezone: Option<String>,
    /// "12h" | "24h"
    pub time_format: Option<String>,
    /// CSS-style keyword: x-small .. x-large
    pub font_size: Option<String>,
    pub locale: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// metric | imperial | standard
    pub units: Option<String>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// swap width/height for portrait panels
    pub vertical: Option<bool>,
}

impl Config {
    pub fn urls(&self) -> &[String] {
        self.calendar_urls.as_deref().unwrap_or(&[])
    }

    /// One parsed color per configured URL. A color list shorter than
    /// the URL list is discarded wholesale: every source gets the
    /// default accent rather than guessing which URL each color meant.
    pub fn effective_colors(&self) -> Vec<Rgb888> {
        let n = self.urls().len();
        let named = self.calendar_colors.as_deref().unwrap_or(&[]);
        if named.len() < n {
            return vec![parse_hex(DEFAULT_CALENDAR_COLOR); n];
        }
        named.iter().take(n).map(|c| parse_hex(c)).collect()
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
            .as_deref()
            .unwrap_or(DEFAULT_TIMEZONE)
            .parse()
            .unwrap_or(chrono_tz::America::New_York)
    }

    pub fn time_format(&self) -> TimeFormat {
        TimeFormat::parse(self.time_format.as_deref().unwrap_or("12h"))
    }

    pub fn font_scale(&self) -> f32 {
        font_scale(self.font_size.as_deref().unwrap_or("normal"))
    }

    pub fn labels(&self) -> Labels {
        labels_for(self.locale.as_deref().unwrap_or("en"))
    }

    pub fn coordinates(&self) -> (f64, f64) {
        (
            self.latitude.unwrap_or(DEFAULT_LATITUDE),
            self.longitude.unwrap_or(DEFAULT_LONGITUDE),
        )
    }

    pub fn units(&self) -> UnitSystem {
        UnitSystem::parse(self.units.as_deref().unwrap_or("metric"))
    }

    /// Final pixel dimensions, already swapped for vertical mounting.
    pub fn dimensions(&self) -> (u32, u32) {
        let d = self.display.clone().unwrap_or_default();
        let w = d.width.unwrap_or(DEFAULT_WIDTH);
        let h = d.height.unwrap_or(DEFAULT_HEIGHT);
        if d.vertical.unwrap_or(false) { (h, w) } else { (w, h) }
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "agendash", about = "Agenda + weather dashboard renderer", version)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// iCalendar URL (repeatable)
    #[arg(long = "url", action = ArgAction::Append)]
    pub urls: Vec<String>,
    /// Hex accent color for the matching --url (repeatable)
    #[arg(long = "color", action = ArgAction::Append)]
    pub colors: Vec<String>,
    #[arg(long)]
    pub timezone: Option<String>,
    #[arg(long)]
    pub time_format: Option<String>,
    #[arg(long)]
    pub font_size: Option<String>,
    #[arg(long)]
    pub locale: Option<String>,
    #[arg(long)]
    pub latitude: Option<f64>,
    #[arg(long)]
    pub longitude: Option<f64>,
    #[arg(long)]
    pub units: Option<String>,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    #[arg(long, action = ArgAction::SetTrue)]
    pub vertical: bool,
    /// Where to write the rendered PNG
    #[arg(long, short = 'o', default_value = "dashboard.png", value_hint = ValueHint::FilePath)]
    pub output: PathBuf,
    /// Verbose logging
    #[arg(long, short = 'v', action = ArgAction::SetTrue)]
    pub debug: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Runtime knobs that live on the CLI only.
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub output: PathBuf,
    pub debug: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<(Config, RunArgs), ConfigError> {
    let cli = Cli::parse();

    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, &cli);

    // 4) Validate
    validate(&cfg)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    let run = RunArgs { output: cli.output, debug: cli.debug };
    Ok((cfg, run))
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/agendash/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/agendash/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/agendash.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["agendash.yaml", "config.yaml", "config/agendash.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.calendar_urls.is_some()   { dst.calendar_urls = src.calendar_urls; }
    if src.calendar_colors.is_some() { dst.calendar_colors = src.calendar_colors; }
    if src.timezone.is_some()        { dst.timezone = src.timezone; }
    if src.time_format.is_some()     { dst.time_format = src.time_format; }
    if src.font_size.is_some()       { dst.font_size = src.font_size; }
    if src.locale.is_some()          { dst.locale = src.locale; }
    if src.latitude.is_some()        { dst.latitude = src.latitude; }
    if src.longitude.is_some()       { dst.longitude = src.longitude; }
    if src.units.is_some()           { dst.units = src.units; }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.width.is_some()    { dst.width = src.width; }
    if src.height.is_some()   { dst.height = src.height; }
    if src.vertical.is_some() { dst.vertical = src.vertical; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if !cli.urls.is_empty()          { cfg.calendar_urls = Some(cli.urls.clone()); }
    if !cli.colors.is_empty()        { cfg.calendar_colors = Some(cli.colors.clone()); }
    if cli.timezone.is_some()        { cfg.timezone = cli.timezone.clone(); }
    if cli.time_format.is_some()     { cfg.time_format = cli.time_format.clone(); }
    if cli.font_size.is_some()       { cfg.font_size = cli.font_size.clone(); }
    if cli.locale.is_some()          { cfg.locale = cli.locale.clone(); }
    if cli.latitude.is_some()        { cfg.latitude = cli.latitude; }
    if cli.longitude.is_some()       { cfg.longitude = cli.longitude; }
    if cli.units.is_some()           { cfg.units = cli.units.clone(); }

    let any_display = cli.width.is_some() || cli.height.is_some() || cli.vertical;
    if any_display && cfg.display.is_none() {
        cfg.display = Some(DisplayConfig::default());
    }
    if let Some(display) = cfg.display.as_mut() {
        if cli.width.is_some()  { display.width = cli.width; }
        if cli.height.is_some() { display.height = cli.height; }
        if cli.vertical         { display.vertical = Some(true); }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let urls = cfg.urls();
    if urls.is_empty() {
        return Err(ConfigError::Validation(
            "at least one calendar URL is required".into(),
        ));
    }
    if urls.iter().any(|u| u.trim().is_empty()) {
        return Err(ConfigError::Validation("calendar URLs must not be blank".into()));
    }
    if let Some(tz) = cfg.timezone.as_deref() {
        if tz.parse::<Tz>().is_err() {
            return Err(ConfigError::Validation(format!("unknown timezone: {tz}")));
        }
    }
    if let Some(fmt) = cfg.time_format.as_deref() {
        match fmt {
            "12h" | "24h" => {}
            _ => return Err(ConfigError::Validation("time_format must be 12h|24h".into())),
        }
    }
    if let Some(lat) = cfg.latitude {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ConfigError::Validation("latitude must be -90..=90".into()));
        }
    }
    if let Some(lon) = cfg.longitude {
        if !(-180.0..=180.0).contains(&lon) {
            return Err(ConfigError::Validation("longitude must be -180..=180".into()));
        }
    }
    if let Some(display) = cfg.display.as_ref() {
        if let (Some(w), Some(h)) = (display.width, display.height) {
            if w == 0 || h == 0 {
                return Err(ConfigError::Validation("display width/height must be > 0".into()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> Config {
        Config {
            calendar_urls: Some(vec!["https://example.com/a.ics".into()]),
            ..Config::default()
        }
    }

    #[test]
    fn test_validate_requires_url() {
        assert!(validate(&Config::default()).is_err());
        assert!(validate(&minimal()).is_ok());
        let blank = Config {
            calendar_urls: Some(vec!["  ".into()]),
            ..Config::default()
        };
        assert!(validate(&blank).is_err());
    }

    #[test]
    fn test_validate_timezone() {
        let mut cfg = minimal();
        cfg.timezone = Some("Europe/Berlin".into());
        assert!(validate(&cfg).is_ok());
        cfg.timezone = Some("Nowhere/Special".into());
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_effective_colors_matching_list() {
        let mut cfg = minimal();
        cfg.calendar_urls = Some(vec!["a".into(), "b".into()]);
        cfg.calendar_colors = Some(vec!["#ff0000".into(), "#00ff00".into()]);
        let colors = cfg.effective_colors();
        assert_eq!(colors, vec![parse_hex("#ff0000"), parse_hex("#00ff00")]);
    }

    #[test]
    fn test_effective_colors_short_list_all_default() {
        // A partial color list is ambiguous; nobody keeps their color.
        let mut cfg = minimal();
        cfg.calendar_urls = Some(vec!["a".into(), "b".into(), "c".into()]);
        cfg.calendar_colors = Some(vec!["#ff0000".into()]);
        let colors = cfg.effective_colors();
        assert_eq!(colors, vec![parse_hex(DEFAULT_CALENDAR_COLOR); 3]);
        // No list at all behaves the same.
        cfg.calendar_colors = None;
        assert_eq!(cfg.effective_colors(), vec![parse_hex(DEFAULT_CALENDAR_COLOR); 3]);
    }

    #[test]
    fn test_effective_colors_long_list_truncated() {
        let mut cfg = minimal();
        cfg.calendar_colors = Some(vec!["#ff0000".into(), "#00ff00".into()]);
        let colors = cfg.effective_colors();
        assert_eq!(colors, vec![parse_hex("#ff0000")]);
    }

    #[test]
    fn test_dimensions_vertical_swap() {
        let mut cfg = minimal();
        assert_eq!(cfg.dimensions(), (800, 480));
        cfg.display = Some(DisplayConfig {
            width: Some(640),
            height: Some(384),
            vertical: Some(true),
        });
        assert_eq!(cfg.dimensions(), (384, 640));
    }

    #[test]
    fn test_yaml_merge() {
        let yaml = r#"
calendar_urls:
  - https://example.com/cal.ics
timezone: Europe/Berlin
display:
  width: 640
"#;
        let parsed: Config = serde_yaml::from_str(yaml).unwrap();
        let mut cfg = Config::default();
        merge(&mut cfg, parsed);
        assert_eq!(cfg.timezone.as_deref(), Some("Europe/Berlin"));
        assert_eq!(cfg.dimensions(), (640, 480));
        assert_eq!(cfg.time_format(), TimeFormat::TwelveHour);
    }
}
