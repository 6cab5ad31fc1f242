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

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kit::Kit;

/// Roof the kit will be mounted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoofType {
    #[default]
    #[serde(alias = "ceramica")]
    CeramicTile,
    #[serde(alias = "fibrocimento")]
    FiberCement,
    #[serde(alias = "metalico")]
    Metal,
}

impl RoofType {
    pub const ALL: [RoofType; 3] = [RoofType::CeramicTile, RoofType::FiberCement, RoofType::Metal];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CeramicTile => "ceramic_tile",
            Self::FiberCement => "fiber_cement",
            Self::Metal => "metal",
        }
    }

    /// Translation key of the display label
    #[must_use]
    pub fn label_key(&self) -> &'static str {
        match self {
            Self::CeramicTile => "roof-ceramic-tile",
            Self::FiberCement => "roof-fiber-cement",
            Self::Metal => "roof-metal",
        }
    }
}

impl fmt::Display for RoofType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown roof type: {0}")]
pub struct ParseRoofTypeError(pub String);

impl FromStr for RoofType {
    type Err = ParseRoofTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ceramic_tile" | "ceramica" => Ok(Self::CeramicTile),
            "fiber_cement" | "fibrocimento" => Ok(Self::FiberCement),
            "metal" | "metalico" => Ok(Self::Metal),
            _ => Err(ParseRoofTypeError(s.to_owned())),
        }
    }
}

/// Raw consumption as typed into the form.
///
/// Two form variants exist: one asks for monthly energy, the other for the
/// monthly electricity bill. Both are normalized to kWh before simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum ConsumptionInput {
    /// Monthly energy (kWh)
    Energy(f64),
    /// Monthly bill amount (BRL)
    Bill(f64),
}

impl ConsumptionInput {
    #[must_use]
    pub fn value(&self) -> f64 {
        match self {
            Self::Energy(v) | Self::Bill(v) => *v,
        }
    }
}

/// Unvalidated simulation form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub name: String,
    pub city: String,
    pub consumption: ConsumptionInput,
    /// Kept as text so an unknown value surfaces as a validation issue
    #[serde(default)]
    pub roof_type: String,
}

/// Validated input with consumption normalized to kWh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    pub client_name: String,
    pub city: String,
    pub monthly_consumption_kwh: f64,
    pub roof_type: RoofType,
}

/// Outcome of a successful simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Monthly generation needed after system losses (kWh/month)
    pub required_generation_kwh: u32,
    /// Snapshot of the selected kit at simulation time
    pub selected_kit: Kit,
    /// Monthly bill without solar (BRL)
    pub current_monthly_cost: f64,
    /// Monthly bill with solar (BRL)
    pub new_monthly_cost: f64,
    pub annual_savings: f64,
    /// Years to recover the kit price; 0 when it cannot be computed
    pub payback_years: f64,
    pub proposal_number: String,
    pub created_at: DateTime<Utc>,
}
