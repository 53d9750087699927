//! Colour theme for the skein viewer.
//!
//! Themes are TOML files. The default theme is embedded in the binary via
//! [`include_str!`] so the viewer works without any files on disk.
//!
//! # Logger shades
//!
//! Every logger carries a colour index in `0..SHADE_COUNT`, computed from its
//! root ancestor. The theme maps that index onto its 24-entry palette, so a
//! whole logger tree shares one shade.

use config::{Config, File, FileFormat};
use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;
use skein_core::color::SHADE_COUNT;
use skein_core::Level;

const DEFAULT_THEME_SRC: &str = include_str!("themes/default.toml");

// ---------------------------------------------------------------------------
// Raw (serde) types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct RawStyle {
    fg: Option<String>,
    bg: Option<String>,
    #[serde(default)]
    bold: bool,
    #[serde(default)]
    dim: bool,
    #[serde(default)]
    italic: bool,
    #[serde(default)]
    underlined: bool,
}

impl RawStyle {
    fn into_style(self) -> Style {
        let mut style = Style::default();
        if let Some(c) = self.fg.as_deref().and_then(parse_color) {
            style = style.fg(c);
        }
        if let Some(c) = self.bg.as_deref().and_then(parse_color) {
            style = style.bg(c);
        }
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.dim {
            style = style.add_modifier(Modifier::DIM);
        }
        if self.italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.underlined {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        style
    }
}

#[derive(Debug, Deserialize)]
struct RawLevels {
    debug: RawStyle,
    log: RawStyle,
    info: RawStyle,
    warn: RawStyle,
    error: RawStyle,
    remote: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    label: RawStyle,
    separator: RawStyle,
    payload: RawStyle,
    timestamp: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawFilter {
    prompt: RawStyle,
    chevron: RawStyle,
    valid: RawStyle,
    invalid: RawStyle,
    #[serde(default)]
    text: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawBorders {
    frame: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawShades {
    palette: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawTheme {
    levels: RawLevels,
    record: RawRecord,
    filter: RawFilter,
    borders: RawBorders,
    shades: RawShades,
}

// ---------------------------------------------------------------------------
// Public Theme type
// ---------------------------------------------------------------------------

/// Resolved viewer theme. All styles are ready-made ratatui [`Style`]s.
#[derive(Debug, Clone)]
pub struct Theme {
    pub level_debug: Style,
    pub level_log: Style,
    pub level_info: Style,
    pub level_warn: Style,
    pub level_error: Style,
    pub level_remote: Style,

    /// Label segments of the logger chain.
    pub label: Style,
    /// The dashed rule under each record.
    pub separator: Style,
    pub payload: Style,
    pub timestamp: Style,

    pub filter_prompt: Style,
    pub filter_chevron: Style,
    pub filter_valid: Style,
    pub filter_invalid: Style,
    pub filter_text: Style,

    pub border: Style,

    shades: Vec<Color>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::load_default()
    }
}

impl Theme {
    /// Load the embedded default theme.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed.
    pub fn load_default() -> Self {
        Self::from_toml_str(DEFAULT_THEME_SRC).expect("embedded default theme must be valid TOML")
    }

    /// Parse a theme from a TOML string.
    ///
    /// Unknown keys are ignored. The palette must hold exactly
    /// [`SHADE_COUNT`] colours so every colour index has a shade.
    pub fn from_toml_str(src: &str) -> anyhow::Result<Self> {
        let raw: RawTheme = Config::builder()
            .add_source(File::from_str(src, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        let shades = raw
            .shades
            .palette
            .iter()
            .map(|s| parse_color(s).ok_or_else(|| anyhow::anyhow!("invalid shade colour {s:?}")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        anyhow::ensure!(
            shades.len() == SHADE_COUNT,
            "palette has {} shades, expected {SHADE_COUNT}",
            shades.len()
        );

        Ok(Self {
            level_debug: raw.levels.debug.into_style(),
            level_log: raw.levels.log.into_style(),
            level_info: raw.levels.info.into_style(),
            level_warn: raw.levels.warn.into_style(),
            level_error: raw.levels.error.into_style(),
            level_remote: raw.levels.remote.into_style(),
            label: raw.record.label.into_style(),
            separator: raw.record.separator.into_style(),
            payload: raw.record.payload.into_style(),
            timestamp: raw.record.timestamp.into_style(),
            filter_prompt: raw.filter.prompt.into_style(),
            filter_chevron: raw.filter.chevron.into_style(),
            filter_valid: raw.filter.valid.into_style(),
            filter_invalid: raw.filter.invalid.into_style(),
            filter_text: raw.filter.text.into_style(),
            border: raw.borders.frame.into_style(),
            shades,
        })
    }

    pub fn level_style(&self, level: Level) -> Style {
        match level {
            Level::Debug => self.level_debug,
            Level::Log => self.level_log,
            Level::Info => self.level_info,
            Level::Warn => self.level_warn,
            Level::Error => self.level_error,
            Level::Remote => self.level_remote,
        }
    }

    /// Foreground style for a logger colour index. Out-of-range indices wrap.
    pub fn shade(&self, color_index: usize) -> Style {
        Style::default().fg(self.shades[color_index % self.shades.len()])
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a colour name into a ratatui [`Color`].
///
/// Accepts named terminal colours (case-insensitive), `#rrggbb` hex, and
/// `indexed:N`.
fn parse_color(s: &str) -> Option<Color> {
    match s.to_ascii_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "dark_gray" | "darkgray" | "dark_grey" | "darkgrey" => Some(Color::DarkGray),
        "light_red" => Some(Color::LightRed),
        "light_green" => Some(Color::LightGreen),
        "light_yellow" => Some(Color::LightYellow),
        "light_blue" => Some(Color::LightBlue),
        "light_magenta" => Some(Color::LightMagenta),
        "light_cyan" => Some(Color::LightCyan),
        "white" => Some(Color::White),
        s if s.starts_with('#') && s.len() == 7 => {
            let r = u8::from_str_radix(&s[1..3], 16).ok()?;
            let g = u8::from_str_radix(&s[3..5], 16).ok()?;
            let b = u8::from_str_radix(&s[5..7], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        s if s.starts_with("indexed:") => {
            let n: u8 = s["indexed:".len()..].parse().ok()?;
            Some(Color::Indexed(n))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
