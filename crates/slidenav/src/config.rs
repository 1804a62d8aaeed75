use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::input::KeyMap;
use crate::nav::{Landing, NavPolicy};
use crate::presenter::Options;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "slidenav";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<KeysConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<OverviewConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_mode: Option<String>,

    /// Advance from the last slide back to the first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jump_landing: Option<Landing>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_width: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeysConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toc: Option<char>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<char>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverviewConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Where a presentation opens when no location is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    First,
    Overview,
    Toc,
    Slide(usize),
}

impl StartMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "first" => Some(Self::First),
            "overview" => Some(Self::Overview),
            "toc" => Some(Self::Toc),
            n => n.parse::<usize>().ok().filter(|n| *n > 0).map(Self::Slide),
        }
    }
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
                anyhow::anyhow!("No config found. Run `slidenav config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("using default config: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# slidenav configuration\n{yaml}");
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.theme" => {
                match value {
                    "light" | "dark" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'."),
                }
                self.defaults_mut().theme = Some(value.to_string());
            }
            "defaults.start_mode" => {
                if StartMode::parse(value).is_none() {
                    anyhow::bail!(
                        "Invalid start_mode: {value}. Must be 'first', 'overview', 'toc', or a slide number."
                    );
                }
                self.defaults_mut().start_mode = Some(value.to_string());
            }
            "defaults.wrap" => {
                let wrap = value
                    .parse::<bool>()
                    .map_err(|_| anyhow::anyhow!("Invalid wrap: {value}. Must be 'true' or 'false'."))?;
                self.defaults_mut().wrap = Some(wrap);
            }
            "defaults.jump_landing" => {
                let landing = Landing::from_name(value).ok_or_else(|| {
                    anyhow::anyhow!(
                        "Invalid jump_landing: {value}. Must be 'hidden' or 'revealed'."
                    )
                })?;
                self.defaults_mut().jump_landing = Some(landing);
            }
            "defaults.design_width" => {
                let width = value
                    .parse::<f32>()
                    .ok()
                    .filter(|w| w.is_finite() && *w > 0.0)
                    .ok_or_else(|| {
                        anyhow::anyhow!("Invalid design_width: {value}. Must be a positive number.")
                    })?;
                self.defaults_mut().design_width = Some(width);
            }
            "keys.toc" | "keys.grid" => {
                let mut chars = value.chars();
                let c = match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_alphanumeric() => c.to_ascii_lowercase(),
                    _ => anyhow::bail!("Invalid key: {value}. Must be a single letter or digit."),
                };
                let keys = self.keys.get_or_insert_with(KeysConfig::default);
                if key == "keys.toc" {
                    keys.toc = Some(c);
                } else {
                    keys.grid = Some(c);
                }
            }
            "overview.enabled" => {
                let enabled = value.parse::<bool>().map_err(|_| {
                    anyhow::anyhow!("Invalid overview.enabled: {value}. Must be 'true' or 'false'.")
                })?;
                self.overview
                    .get_or_insert_with(OverviewConfig::default)
                    .enabled = Some(enabled);
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: defaults.theme, defaults.start_mode, defaults.wrap, defaults.jump_landing, defaults.design_width, keys.toc, keys.grid, overview.enabled"
            ),
        }
        Ok(())
    }

    pub fn theme_name(&self) -> &str {
        self.defaults
            .as_ref()
            .and_then(|d| d.theme.as_deref())
            .unwrap_or("light")
    }

    pub fn start_mode(&self) -> StartMode {
        self.defaults
            .as_ref()
            .and_then(|d| d.start_mode.as_deref())
            .and_then(StartMode::parse)
            .unwrap_or(StartMode::First)
    }

    pub fn presenter_options(&self) -> Options {
        let defaults = self.defaults.clone().unwrap_or_default();
        let keys = self.keys.clone().unwrap_or_default();
        let fallback = Options::default();
        Options {
            policy: NavPolicy {
                wrap_forward: defaults.wrap.unwrap_or(false),
                jump_landing: defaults.jump_landing.unwrap_or_default(),
            },
            keys: KeyMap {
                toc: keys.toc.unwrap_or(fallback.keys.toc),
                grid: keys.grid.unwrap_or(fallback.keys.grid),
            },
            grid_enabled: self
                .overview
                .as_ref()
                .and_then(|o| o.enabled)
                .unwrap_or(true),
            design_width: defaults.design_width.unwrap_or(fallback.design_width),
        }
    }

    fn defaults_mut(&mut self) -> &mut DefaultsConfig {
        self.defaults.get_or_insert_with(DefaultsConfig::default)
    }
}
