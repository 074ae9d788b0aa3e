// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use testify_app::Screen;
use tracing::Level;

pub const APP_NAME: &str = "testify";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_STATUS_CLEAR_SECS: u64 = 4;
const DEFAULT_RESEARCHER: &str = "Guest researcher";
const DEFAULT_INSTITUTION: &str = "Independent";
const START_SCREENS: [&str; 3] = ["catalog", "labs", "orders"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub catalog: CatalogSource,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub profile: Profile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            catalog: CatalogSource::default(),
            ui: Ui::default(),
            logging: Logging::default(),
            profile: Profile::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSource {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub start_screen: Option<String>,
    pub status_clear_secs: Option<u64>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            start_screen: Some("catalog".to_owned()),
            status_clear_secs: Some(DEFAULT_STATUS_CLEAR_SECS),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Logging {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: Some("info".to_owned()),
            file: None,
        }
    }
}

/// Who lab orders are filed under.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    pub researcher: Option<String>,
    pub institution: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("TESTIFY_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set TESTIFY_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` at the top",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(catalog) = &self.catalog.path
            && catalog.trim().is_empty()
        {
            bail!(
                "catalog.path in {} is empty; remove it to use the built-in catalog",
                path.display()
            );
        }

        if let Some(screen) = &self.ui.start_screen
            && !START_SCREENS.contains(&screen.as_str())
        {
            bail!(
                "ui.start_screen in {} must be one of {}, got {screen:?}",
                path.display(),
                START_SCREENS.join(", ")
            );
        }

        if let Some(secs) = self.ui.status_clear_secs
            && secs == 0
        {
            bail!(
                "ui.status_clear_secs in {} must be positive, got 0",
                path.display()
            );
        }

        if let Some(level) = &self.logging.level {
            parse_level(level).with_context(|| format!("logging.level in {}", path.display()))?;
        }

        for (key, value) in [
            ("profile.researcher", &self.profile.researcher),
            ("profile.institution", &self.profile.institution),
        ] {
            if let Some(value) = value
                && value.trim().is_empty()
            {
                bail!(
                    "{key} in {} is empty; remove it to use the default",
                    path.display()
                );
            }
        }

        Ok(())
    }

    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.catalog.path.as_deref().map(PathBuf::from)
    }

    pub fn start_screen(&self) -> Screen {
        self.ui
            .start_screen
            .as_deref()
            .and_then(Screen::parse)
            .unwrap_or(Screen::Catalog)
    }

    pub fn status_clear(&self) -> Duration {
        Duration::from_secs(
            self.ui
                .status_clear_secs
                .unwrap_or(DEFAULT_STATUS_CLEAR_SECS),
        )
    }

    pub fn log_level(&self) -> Level {
        self.logging
            .level
            .as_deref()
            .and_then(|level| parse_level(level).ok())
            .unwrap_or(Level::INFO)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.logging.file {
            return Ok(PathBuf::from(file));
        }
        let cache_root = dirs::cache_dir().ok_or_else(|| {
            anyhow!("cannot resolve cache directory; set [logging].file in the config")
        })?;
        Ok(cache_root.join(APP_NAME).join("testify.log"))
    }

    pub fn researcher(&self) -> &str {
        self.profile
            .researcher
            .as_deref()
            .unwrap_or(DEFAULT_RESEARCHER)
    }

    pub fn institution(&self) -> &str {
        self.profile
            .institution
            .as_deref()
            .unwrap_or(DEFAULT_INSTITUTION)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# testify config\n# Place this file at: {}\n\nversion = 1\n\n[catalog]\n# Optional. Replaces the built-in lab catalog.\n# path = \"/absolute/path/to/catalog.toml\"\n\n[ui]\n# catalog | labs | orders\nstart_screen = \"catalog\"\nstatus_clear_secs = {}\n\n[logging]\n# error | warn | info | debug | trace; RUST_LOG overrides\nlevel = \"info\"\n# file = \"/absolute/path/to/testify.log\"\n\n[profile]\nresearcher = \"{}\"\ninstitution = \"{}\"\n",
            path.display(),
            DEFAULT_STATUS_CLEAR_SECS,
            DEFAULT_RESEARCHER,
            DEFAULT_INSTITUTION,
        )
    }
}

fn parse_level(raw: &str) -> Result<Level> {
    raw.trim().parse::<Level>().map_err(|_| {
        anyhow!("invalid log level {raw:?}; use one of: error, warn, info, debug, trace")
    })
}
