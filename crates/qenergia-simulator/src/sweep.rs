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

//! Consumption sweeps: the quote engine evaluated over a range of inputs.

use anyhow::{Result, bail};
use chrono::Utc;
use qenergia_core::simulator::{SimulationOutcome, Simulator};
use qenergia_types::{RoofType, SimulationInput};
use serde::Serialize;
use tracing::debug;

/// Upper bound on rows a single sweep may produce
pub const MAX_SWEEP_ROWS: u32 = 100_000;

/// One consumption of a sweep. Kit fields are empty for custom quotes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRow {
    pub consumption_kwh: f64,
    pub required_generation_kwh: u32,
    pub kit_id: Option<u32>,
    pub kit_name: Option<String>,
    pub kit_price: Option<f64>,
    pub current_monthly_cost: Option<f64>,
    pub new_monthly_cost: Option<f64>,
    pub annual_savings: Option<f64>,
    pub payback_years: Option<f64>,
}

impl SweepRow {
    #[must_use]
    pub fn is_custom_quote(&self) -> bool {
        self.kit_id.is_none()
    }
}

/// Simulate `from..=to` in `step` increments.
pub fn run_sweep(simulator: &Simulator, from: f64, to: f64, step: f64) -> Result<Vec<SweepRow>> {
    if !(from.is_finite() && from > 0.0) {
        bail!("--from must be a positive number, got {from}");
    }
    if !(to.is_finite() && to >= from) {
        bail!("--to must be at least --from ({from}), got {to}");
    }
    if !(step.is_finite() && step > 0.0) {
        bail!("--step must be a positive number, got {step}");
    }

    let span = ((to - from) / step).floor();
    if span >= f64::from(MAX_SWEEP_ROWS) {
        bail!("sweep would produce more than {MAX_SWEEP_ROWS} rows; increase --step");
    }
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "span is non-negative and below MAX_SWEEP_ROWS"
    )]
    let steps = span as u32;

    let created_at = Utc::now();
    let rows: Vec<SweepRow> = (0..=steps)
        .map(|i| {
            let consumption_kwh = step.mul_add(f64::from(i), from);
            let input = SimulationInput {
                client_name: String::new(),
                city: String::new(),
                monthly_consumption_kwh: consumption_kwh,
                roof_type: RoofType::default(),
            };
            match simulator.simulate_with(&input, String::new(), created_at) {
                SimulationOutcome::Quoted(result) => SweepRow {
                    consumption_kwh,
                    required_generation_kwh: result.required_generation_kwh,
                    kit_id: Some(result.selected_kit.id),
                    kit_name: Some(result.selected_kit.name),
                    kit_price: Some(result.selected_kit.price),
                    current_monthly_cost: Some(result.current_monthly_cost),
                    new_monthly_cost: Some(result.new_monthly_cost),
                    annual_savings: Some(result.annual_savings),
                    payback_years: Some(result.payback_years),
                },
                SimulationOutcome::CustomQuoteRequired {
                    required_generation_kwh,
                } => SweepRow {
                    consumption_kwh,
                    required_generation_kwh,
                    kit_id: None,
                    kit_name: None,
                    kit_price: None,
                    current_monthly_cost: None,
                    new_monthly_cost: None,
                    annual_savings: None,
                    payback_years: None,
                },
            }
        })
        .collect();

    debug!(from, to, step, rows = rows.len(), "Sweep complete");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_includes_both_ends() {
        let rows = run_sweep(&Simulator::default(), 100.0, 1000.0, 150.0).unwrap();
        let consumptions: Vec<f64> = rows.iter().map(|r| r.consumption_kwh).collect();
        assert_eq!(consumptions, [100.0, 250.0, 400.0, 550.0, 700.0, 850.0, 1000.0]);
    }

    #[test]
    fn test_sweep_reports_kit_changes_and_custom_quotes() {
        let rows = run_sweep(&Simulator::default(), 450.0, 10_450.0, 10_000.0).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].kit_id, Some(2));
        assert_eq!(rows[0].annual_savings, Some(3690.0));
        assert_eq!(rows[0].payback_years, Some(7.0));

        // 10 450 kWh needs 13 063 kWh, beyond the largest kit
        assert!(rows[1].is_custom_quote());
        assert_eq!(rows[1].required_generation_kwh, 13_063);
    }

    #[test]
    fn test_sweep_rejects_bad_ranges() {
        let simulator = Simulator::default();
        assert!(run_sweep(&simulator, 0.0, 100.0, 10.0).is_err());
        assert!(run_sweep(&simulator, 500.0, 100.0, 10.0).is_err());
        assert!(run_sweep(&simulator, 100.0, 500.0, 0.0).is_err());
        assert!(run_sweep(&simulator, 100.0, 1e9, 1.0).is_err());
    }
}
