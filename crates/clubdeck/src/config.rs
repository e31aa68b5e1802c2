use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "clubdeck";

pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Runtime configuration. Lives in memory for the process lifetime; the
/// settings panel edits this and never writes it back to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Length of the manually started countdown, minutes (1..=60).
    pub countdown_minutes: u32,
    /// Weekday of the automatic start, 0 = Sunday .. 6 = Saturday.
    pub auto_start_day: u32,
    /// Hour of the automatic start (0..=23).
    pub auto_start_hour: u32,
    /// Minute of the automatic start (0..=59).
    pub auto_start_minute: u32,
    pub final_slide: FinalSlideKind,
    /// Text for `FinalSlideKind::Text`, image path for `FinalSlideKind::Image`.
    pub final_slide_content: String,
}

impl Default for Settings {
    fn default() -> Self {
        // Wednesday 18:00, five-minute manual timer, plain black final slide
        Self {
            countdown_minutes: 5,
            auto_start_day: 3,
            auto_start_hour: 18,
            auto_start_minute: 0,
            final_slide: FinalSlideKind::Black,
            final_slide_content: String::new(),
        }
    }
}

impl Settings {
    /// Clamp every numeric field into its valid range. Applied before any
    /// edited settings are accepted.
    pub fn clamped(mut self) -> Self {
        self.countdown_minutes = self.countdown_minutes.clamp(1, 60);
        self.auto_start_day = self.auto_start_day.min(6);
        self.auto_start_hour = self.auto_start_hour.min(23);
        self.auto_start_minute = self.auto_start_minute.min(59);
        self
    }

    pub fn auto_start_day_name(&self) -> &'static str {
        DAY_NAMES[self.auto_start_day.min(6) as usize]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinalSlideKind {
    #[default]
    Black,
    Text,
    Image,
}

impl FinalSlideKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Black => "Black screen",
            Self::Text => "Custom text",
            Self::Image => "Custom image",
        }
    }

    pub fn all() -> &'static [FinalSlideKind] {
        &[
            FinalSlideKind::Black,
            FinalSlideKind::Text,
            FinalSlideKind::Image,
        ]
    }
}

/// Startup defaults file. Seeds the initial [`Settings`] when the kiosk
/// launches; edited with `clubdeck config set`, never by the running app.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown_minutes: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_start_day: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_start_hour: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_start_minute: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_slide: Option<FinalSlideKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_slide_content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windowed: Option<bool>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `clubdeck config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# clubdeck startup defaults\n{yaml}");
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    /// The settings the kiosk starts with: built-in defaults overridden by
    /// whatever the file provides, then clamped.
    pub fn initial_settings(&self) -> Settings {
        let mut settings = Settings::default();
        if let Some(d) = &self.defaults {
            if let Some(v) = d.countdown_minutes {
                settings.countdown_minutes = v;
            }
            if let Some(v) = d.auto_start_day {
                settings.auto_start_day = v;
            }
            if let Some(v) = d.auto_start_hour {
                settings.auto_start_hour = v;
            }
            if let Some(v) = d.auto_start_minute {
                settings.auto_start_minute = v;
            }
            if let Some(v) = d.final_slide {
                settings.final_slide = v;
            }
            if let Some(v) = &d.final_slide_content {
                settings.final_slide_content = v.clone();
            }
        }
        settings.clamped()
    }

    pub fn windowed(&self) -> bool {
        self.defaults
            .as_ref()
            .and_then(|d| d.windowed)
            .unwrap_or(false)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let defaults = self.defaults.get_or_insert_with(DefaultsConfig::default);
        match key {
            "defaults.countdown_minutes" => {
                let minutes: u32 = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid minutes: {value}"))?;
                if !(1..=60).contains(&minutes) {
                    anyhow::bail!("Invalid countdown_minutes: {value}. Must be 1-60.");
                }
                defaults.countdown_minutes = Some(minutes);
            }
            "defaults.auto_start_day" => {
                defaults.auto_start_day = Some(parse_day(value)?);
            }
            "defaults.auto_start_hour" => {
                let hour: u32 = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid hour: {value}"))?;
                if hour > 23 {
                    anyhow::bail!("Invalid auto_start_hour: {value}. Must be 0-23.");
                }
                defaults.auto_start_hour = Some(hour);
            }
            "defaults.auto_start_minute" => {
                let minute: u32 = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid minute: {value}"))?;
                if minute > 59 {
                    anyhow::bail!("Invalid auto_start_minute: {value}. Must be 0-59.");
                }
                defaults.auto_start_minute = Some(minute);
            }
            "defaults.final_slide" => {
                let kind = match value {
                    "black" => FinalSlideKind::Black,
                    "text" => FinalSlideKind::Text,
                    "image" => FinalSlideKind::Image,
                    _ => anyhow::bail!(
                        "Invalid final_slide: {value}. Must be 'black', 'text', or 'image'."
                    ),
                };
                defaults.final_slide = Some(kind);
            }
            "defaults.final_slide_content" => {
                defaults.final_slide_content = Some(value.to_string());
            }
            "defaults.windowed" => {
                let windowed = match value {
                    "true" => true,
                    "false" => false,
                    _ => anyhow::bail!("Invalid windowed: {value}. Must be 'true' or 'false'."),
                };
                defaults.windowed = Some(windowed);
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: defaults.countdown_minutes, \
                 defaults.auto_start_day, defaults.auto_start_hour, defaults.auto_start_minute, \
                 defaults.final_slide, defaults.final_slide_content, defaults.windowed"
            ),
        }
        Ok(())
    }
}

/// Accepts a weekday number (0 = Sunday) or a case-insensitive day name.
fn parse_day(value: &str) -> Result<u32> {
    if let Ok(day) = value.parse::<u32>() {
        if day > 6 {
            anyhow::bail!("Invalid day: {value}. Must be 0 (Sunday) to 6 (Saturday).");
        }
        return Ok(day);
    }
    let lowered = value.to_lowercase();
    DAY_NAMES
        .iter()
        .position(|name| name.to_lowercase() == lowered)
        .map(|i| i as u32)
        .ok_or_else(|| anyhow::anyhow!("Invalid day: {value}. Use 0-6 or a weekday name."))
}
