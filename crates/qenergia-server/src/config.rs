// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of QEnergia.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use chrono_tz::Tz;
use qenergia_core::estimator::Tariff;
use qenergia_core::pipeline::TransitionPolicy;
use qenergia_core::proposal_number::{DEFAULT_PREFIX, DEFAULT_TIMEZONE};
use qenergia_core::validation::ConsumptionLimits;
use qenergia_i18n::Language;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub handoff: HandoffSettings,
    #[serde(default)]
    pub tariff: Tariff,
    #[serde(default)]
    pub limits: ConsumptionLimits,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub proposals: ProposalSettings,
    #[serde(default)]
    pub i18n: I18nSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HandoffSettings {
    /// One JSON file per browser session lands here
    #[serde(default = "default_handoff_dir")]
    pub dir: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSettings {
    /// TOML kit catalog; the built-in standard catalog when unset
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProposalSettings {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// IANA name, decides which month a proposal number carries
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub transition_policy: TransitionPolicy,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct I18nSettings {
    #[serde(default)]
    pub language: Language,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_owned()
}

fn default_port() -> u16 {
    8080
}

fn default_db_path() -> String {
    "./data/qenergia.db".to_owned()
}

fn default_handoff_dir() -> String {
    qenergia_core::handoff::DEFAULT_HANDOFF_DIR.to_owned()
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_owned()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.name().to_owned()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for HandoffSettings {
    fn default() -> Self {
        Self {
            dir: default_handoff_dir(),
        }
    }
}

impl Default for ProposalSettings {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            timezone: default_timezone(),
            transition_policy: TransitionPolicy::default(),
        }
    }
}

impl ProposalSettings {
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone.parse::<Tz>().map_err(|e| {
            anyhow!(
                "proposals.timezone {:?} is not a known time zone: {e}",
                self.timezone
            )
        })
    }
}

impl ServerConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let tariff = &self.tariff;
        if !(tariff.unit_price.is_finite() && tariff.unit_price > 0.0) {
            bail!("tariff.unit_price must be positive");
        }
        if !(tariff.minimum_fee.is_finite() && tariff.minimum_fee >= 0.0) {
            bail!("tariff.minimum_fee must not be negative");
        }
        if !(tariff.performance_factor > 0.0 && tariff.performance_factor <= 1.0) {
            bail!("tariff.performance_factor must be in (0, 1]");
        }

        let limits = &self.limits;
        if !(limits.min_kwh > 0.0 && limits.min_kwh.is_finite()) {
            bail!("limits.min_kwh must be positive");
        }
        if !(limits.max_kwh.is_finite() && limits.max_kwh >= limits.min_kwh) {
            bail!("limits.max_kwh must not be below limits.min_kwh");
        }

        let prefix = &self.proposals.prefix;
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            bail!("proposals.prefix must be non-empty and alphanumeric");
        }
        self.proposals.timezone()?;

        if self.database.path.is_empty() {
            bail!("database.path must be set");
        }
        if self.handoff.dir.is_empty() {
            bail!("handoff.dir must be set");
        }
        Ok(())
    }
}
