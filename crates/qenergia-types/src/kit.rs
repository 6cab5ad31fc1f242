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

use serde::{Deserialize, Serialize};

/// A pre-priced bundle of solar hardware.
///
/// Kits are catalog data: they are never mutated once loaded and simulation
/// results keep their own copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kit {
    pub id: u32,
    pub name: String,
    /// Number of PV modules
    pub modules: u32,
    /// Rated power of a single module (kWp)
    pub power_per_module_kwp: f64,
    /// Rated power of the whole kit (kWp)
    pub total_power_kwp: f64,
    pub inverters: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micro_inverters: Option<u32>,
    /// Roof area needed for installation (m²)
    pub area_required_m2: f64,
    /// Mounting structure description
    pub structure_type: String,
    /// Estimated monthly production (kWh/month)
    pub estimated_production_kwh: u32,
    /// Price in BRL
    pub price: f64,
}

impl Kit {
    /// Rated power implied by the module count, for catalog consistency checks.
    #[must_use]
    pub fn nominal_power_kwp(&self) -> f64 {
        f64::from(self.modules) * self.power_per_module_kwp
    }
}
