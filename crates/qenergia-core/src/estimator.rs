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

//! Energy and money arithmetic behind a quote.
//!
//! All tariff constants live in [`Tariff`] so the bill conversion, the
//! savings estimate and the bill-mode validation bounds share one unit price.

use serde::{Deserialize, Serialize};

/// Average grid price (BRL per kWh)
pub const DEFAULT_UNIT_PRICE: f64 = 0.75;
/// Grid connection fee still billed with solar (BRL per month)
pub const DEFAULT_MINIMUM_FEE: f64 = 30.0;
/// Real-world system output versus nameplate
pub const DEFAULT_PERFORMANCE_FACTOR: f64 = 0.8;

const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tariff {
    #[serde(default = "default_unit_price")]
    pub unit_price: f64,
    #[serde(default = "default_minimum_fee")]
    pub minimum_fee: f64,
    #[serde(default = "default_performance_factor")]
    pub performance_factor: f64,
}

fn default_unit_price() -> f64 {
    DEFAULT_UNIT_PRICE
}

fn default_minimum_fee() -> f64 {
    DEFAULT_MINIMUM_FEE
}

fn default_performance_factor() -> f64 {
    DEFAULT_PERFORMANCE_FACTOR
}

impl Default for Tariff {
    fn default() -> Self {
        Self {
            unit_price: DEFAULT_UNIT_PRICE,
            minimum_fee: DEFAULT_MINIMUM_FEE,
            performance_factor: DEFAULT_PERFORMANCE_FACTOR,
        }
    }
}

/// Monthly bill comparison for one kit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavingsEstimate {
    pub current_monthly_cost: f64,
    pub new_monthly_cost: f64,
    pub monthly_savings: f64,
    pub annual_savings: f64,
}

impl Tariff {
    /// Minimum monthly generation that offsets `consumption_kwh` after losses.
    ///
    /// Callers validate the range; non-positive input yields 0.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "value is clamped to the u32 range before the cast"
    )]
    pub fn required_generation(&self, consumption_kwh: f64) -> u32 {
        let required = (consumption_kwh / self.performance_factor).ceil();
        required.clamp(0.0, f64::from(u32::MAX)) as u32
    }

    /// Convert a monthly bill into the equivalent energy, rounded to whole kWh.
    #[must_use]
    pub fn bill_to_kwh(&self, bill: f64) -> f64 {
        (bill / self.unit_price).round()
    }

    /// Bill amount for a given monthly energy.
    #[must_use]
    pub fn kwh_to_bill(&self, kwh: f64) -> f64 {
        kwh * self.unit_price
    }

    /// Compare the bill without solar against the bill with a kit producing
    /// `production_kwh` per month.
    ///
    /// Surplus production is not credited: the new bill never drops below
    /// the minimum fee, and savings never go negative.
    #[must_use]
    pub fn savings(&self, consumption_kwh: f64, production_kwh: u32) -> SavingsEstimate {
        let current_monthly_cost = consumption_kwh * self.unit_price;
        let shortfall = consumption_kwh - f64::from(production_kwh);
        let new_monthly_cost = (shortfall * self.unit_price).max(0.0) + self.minimum_fee;
        let monthly_savings = (current_monthly_cost - new_monthly_cost).max(0.0);

        SavingsEstimate {
            current_monthly_cost,
            new_monthly_cost,
            monthly_savings,
            annual_savings: monthly_savings * MONTHS_PER_YEAR,
        }
    }
}

/// Years until `annual_savings` repays `price`, rounded to one decimal.
///
/// Returns 0 when savings are zero, negative or NaN ("not computable").
#[must_use]
pub fn calculate_payback(price: f64, annual_savings: f64) -> f64 {
    if annual_savings.is_nan() || annual_savings <= 0.0 {
        return 0.0;
    }
    round_to_tenth(price / annual_savings)
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_generation_inflates_by_losses() {
        let tariff = Tariff::default();
        assert_eq!(tariff.required_generation(450.0), 563);
        assert_eq!(tariff.required_generation(400.0), 500);
        assert_eq!(tariff.required_generation(100_000.0), 125_000);
        assert_eq!(tariff.required_generation(0.0), 0);
        assert_eq!(tariff.required_generation(-10.0), 0);
    }

    #[test]
    fn test_bill_conversion() {
        let tariff = Tariff::default();
        assert!((tariff.bill_to_kwh(337.5) - 450.0).abs() < f64::EPSILON);
        // 100 / 0.75 = 133.33 -> 133
        assert!((tariff.bill_to_kwh(100.0) - 133.0).abs() < f64::EPSILON);
        assert!((tariff.kwh_to_bill(450.0) - 337.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_savings_with_surplus_production() {
        let estimate = Tariff::default().savings(450.0, 930);
        assert!((estimate.current_monthly_cost - 337.5).abs() < 1e-9);
        assert!((estimate.new_monthly_cost - 30.0).abs() < 1e-9);
        assert!((estimate.monthly_savings - 307.5).abs() < 1e-9);
        assert!((estimate.annual_savings - 3690.0).abs() < 1e-9);
    }

    #[test]
    fn test_savings_with_shortfall() {
        // 1000 kWh consumption, 620 kWh production: 380 kWh still billed
        let estimate = Tariff::default().savings(1000.0, 620);
        assert!((estimate.new_monthly_cost - (380.0 * 0.75 + 30.0)).abs() < 1e-9);
        assert!((estimate.monthly_savings - (750.0 - 315.0)).abs() < 1e-9);
    }

    #[test]
    fn test_savings_never_negative() {
        // Tiny consumption: the minimum fee exceeds the current bill
        let estimate = Tariff::default().savings(20.0, 620);
        assert!((estimate.new_monthly_cost - 30.0).abs() < 1e-9);
        assert!(estimate.monthly_savings.abs() < f64::EPSILON);
        assert!(estimate.annual_savings.abs() < f64::EPSILON);
    }

    #[test]
    fn test_payback() {
        assert!((calculate_payback(25800.0, 3690.0) - 7.0).abs() < f64::EPSILON);
        assert!((calculate_payback(18500.0, 3000.0) - 6.2).abs() < 1e-9);
        assert!(calculate_payback(25800.0, 0.0).abs() < f64::EPSILON);
        assert!(calculate_payback(25800.0, -100.0).abs() < f64::EPSILON);
        assert!(calculate_payback(25800.0, f64::NAN).abs() < f64::EPSILON);
    }
}
