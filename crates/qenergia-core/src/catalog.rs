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

//! Kit catalog.
//!
//! The catalog is constructed once (built-in or from a TOML file) and then
//! shared read-only. Selection never mutates it.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use qenergia_types::Kit;

/// Relative tolerance when comparing rated power against modules × module power.
const POWER_TOLERANCE: f64 = 0.01;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog must contain at least one kit")]
    Empty,

    #[error("duplicate kit id {0}")]
    DuplicateId(u32),

    #[error("kit {id} has invalid {field}: {value}")]
    InvalidValue {
        id: u32,
        field: &'static str,
        value: f64,
    },

    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Authoring convention breaches. Selection still works; these are logged.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogWarning {
    /// `total_power_kwp` differs from `modules × power_per_module_kwp` by more than 1%
    PowerMismatch { id: u32, declared: f64, nominal: f64 },
    /// A kit produces less than the one before it
    ProductionDecreases { id: u32, previous_id: u32 },
    /// A kit is cheaper than the one before it
    PriceDecreases { id: u32, previous_id: u32 },
}

impl std::fmt::Display for CatalogWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PowerMismatch {
                id,
                declared,
                nominal,
            } => write!(
                f,
                "kit {id}: total power {declared:.2} kWp does not match modules x module power ({nominal:.2} kWp)"
            ),
            Self::ProductionDecreases { id, previous_id } => write!(
                f,
                "kit {id}: estimated production is lower than kit {previous_id}"
            ),
            Self::PriceDecreases { id, previous_id } => {
                write!(f, "kit {id}: price is lower than kit {previous_id}")
            }
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct CatalogFile {
    kits: Vec<Kit>,
}

/// Ordered, immutable collection of kits.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    kits: Vec<Kit>,
}

impl Catalog {
    /// Build a catalog, rejecting entries no selection could sensibly use.
    pub fn new(kits: Vec<Kit>) -> Result<Self, CatalogError> {
        if kits.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for kit in &kits {
            if !seen.insert(kit.id) {
                return Err(CatalogError::DuplicateId(kit.id));
            }
            if kit.estimated_production_kwh == 0 {
                return Err(CatalogError::InvalidValue {
                    id: kit.id,
                    field: "estimated_production_kwh",
                    value: 0.0,
                });
            }
            if !kit.price.is_finite() || kit.price <= 0.0 {
                return Err(CatalogError::InvalidValue {
                    id: kit.id,
                    field: "price",
                    value: kit.price,
                });
            }
        }

        Ok(Self { kits })
    }

    /// Load `[[kits]]` entries from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            CatalogError::Parse { source, .. } => CatalogError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content).map_err(|source| CatalogError::Parse {
            path: "<inline>".to_owned(),
            source,
        })?;
        Self::new(file.kits)
    }

    /// Serialize back to the TOML file format.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&CatalogFile {
            kits: self.kits.clone(),
        })
    }

    /// The ten standard kits sold by QEnergia.
    #[must_use]
    #[rustfmt::skip]
    pub fn standard() -> Self {
        Self {
            kits: vec![
                standard_kit(1, "Kit Residencial Básico", 8, 4.4, 1, 22.0, ROOF_CERAMIC, 620, 18500.0),
                standard_kit(2, "Kit Residencial Plus", 12, 6.6, 1, 33.0, ROOF_CERAMIC, 930, 25800.0),
                standard_kit(3, "Kit Residencial Premium", 16, 8.8, 1, 44.0, ROOF_CERAMIC, 1240, 33500.0),
                standard_kit(4, "Kit Comercial Compacto", 20, 11.0, 1, 55.0, SLAB, 1550, 42000.0),
                standard_kit(5, "Kit Comercial Standard", 30, 16.5, 2, 82.0, SLAB, 2325, 62500.0),
                standard_kit(6, "Kit Industrial Básico", 40, 22.0, 2, 110.0, METAL_FRAME, 3100, 82000.0),
                standard_kit(7, "Kit Industrial Plus", 60, 33.0, 3, 165.0, METAL_FRAME, 4650, 118000.0),
                standard_kit(8, "Kit Industrial Premium", 80, 44.0, 4, 220.0, METAL_FRAME, 6200, 152000.0),
                standard_kit(9, "Kit Mega Industrial", 100, 55.0, 5, 275.0, METAL_FRAME, 7750, 185000.0),
                standard_kit(10, "Kit Ultra Industrial", 150, 82.5, 7, 412.0, METAL_FRAME, 11625, 275000.0),
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Kit> {
        self.kits.iter()
    }

    #[must_use]
    pub fn kits(&self) -> &[Kit] {
        &self.kits
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Kit> {
        self.kits.iter().find(|k| k.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.kits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kits.is_empty()
    }

    /// Largest monthly production any single kit offers.
    #[must_use]
    pub fn max_production_kwh(&self) -> u32 {
        self.kits
            .iter()
            .map(|k| k.estimated_production_kwh)
            .max()
            .unwrap_or(0)
    }

    /// Check the authoring conventions (power arithmetic, monotonic ordering).
    #[must_use]
    pub fn warnings(&self) -> Vec<CatalogWarning> {
        let mut warnings = Vec::new();

        for kit in &self.kits {
            let nominal = kit.nominal_power_kwp();
            let deviation = ((kit.total_power_kwp - nominal) / nominal).abs();
            if nominal > 0.0 && deviation > POWER_TOLERANCE {
                warnings.push(CatalogWarning::PowerMismatch {
                    id: kit.id,
                    declared: kit.total_power_kwp,
                    nominal,
                });
            }
        }

        for pair in self.kits.windows(2) {
            let [previous, kit] = pair else { continue };
            if kit.estimated_production_kwh < previous.estimated_production_kwh {
                warnings.push(CatalogWarning::ProductionDecreases {
                    id: kit.id,
                    previous_id: previous.id,
                });
            }
            if kit.price < previous.price {
                warnings.push(CatalogWarning::PriceDecreases {
                    id: kit.id,
                    previous_id: previous.id,
                });
            }
        }

        warnings
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

const MODULE_POWER_KWP: f64 = 0.55;
const ROOF_CERAMIC: &str = "Alumínio para telhado cerâmico";
const SLAB: &str = "Estrutura para laje";
const METAL_FRAME: &str = "Estrutura metálica";

#[expect(clippy::too_many_arguments, reason = "flat catalog table rows")]
fn standard_kit(
    id: u32,
    name: &str,
    modules: u32,
    total_power_kwp: f64,
    inverters: u32,
    area_required_m2: f64,
    structure_type: &str,
    estimated_production_kwh: u32,
    price: f64,
) -> Kit {
    Kit {
        id,
        name: name.to_owned(),
        modules,
        power_per_module_kwp: MODULE_POWER_KWP,
        total_power_kwp,
        inverters,
        micro_inverters: None,
        area_required_m2,
        structure_type: structure_type.to_owned(),
        estimated_production_kwh,
        price,
    }
}
