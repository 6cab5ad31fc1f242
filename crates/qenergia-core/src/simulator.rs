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

use std::sync::Arc;

use chrono::{DateTime, Utc};
use qenergia_types::{Kit, SimulationInput, SimulationRequest, SimulationResult};
use tracing::debug;

use crate::catalog::Catalog;
use crate::estimator::{Tariff, calculate_payback};
use crate::proposal_number::ProposalNumberGenerator;
use crate::selector::select_best_kit;
use crate::validation::{ConsumptionLimits, ValidationReport, validate_request};

/// Result of running a validated input through the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationOutcome {
    Quoted(SimulationResult),
    /// No single catalog kit covers the consumption; sales follows up by hand.
    CustomQuoteRequired { required_generation_kwh: u32 },
}

/// The quote engine with its reference data injected.
///
/// Cheap to clone; the catalog is shared.
#[derive(Debug, Clone)]
pub struct Simulator {
    catalog: Arc<Catalog>,
    tariff: Tariff,
    limits: ConsumptionLimits,
    numbers: ProposalNumberGenerator,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(Arc::new(Catalog::standard()))
    }
}

impl Simulator {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            tariff: Tariff::default(),
            limits: ConsumptionLimits::default(),
            numbers: ProposalNumberGenerator::default(),
        }
    }

    #[must_use]
    pub fn with_tariff(mut self, tariff: Tariff) -> Self {
        self.tariff = tariff;
        self
    }

    #[must_use]
    pub fn with_limits(mut self, limits: ConsumptionLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn with_numbers(mut self, numbers: ProposalNumberGenerator) -> Self {
        self.numbers = numbers;
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    #[must_use]
    pub fn tariff(&self) -> &Tariff {
        &self.tariff
    }

    #[must_use]
    pub fn limits(&self) -> &ConsumptionLimits {
        &self.limits
    }

    #[must_use]
    pub fn numbers(&self) -> &ProposalNumberGenerator {
        &self.numbers
    }

    pub fn validate(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationInput, ValidationReport> {
        validate_request(request, &self.tariff, &self.limits)
    }

    /// Kit the engine would quote for `input`, if any.
    #[must_use]
    pub fn select_kit(&self, input: &SimulationInput) -> Option<&Kit> {
        let required = self.tariff.required_generation(input.monthly_consumption_kwh);
        select_best_kit(&self.catalog, required)
    }

    /// Simulate with a freshly generated (unchecked) proposal number.
    #[must_use]
    pub fn simulate(&self, input: &SimulationInput) -> SimulationOutcome {
        self.simulate_with(input, self.numbers.generate(), Utc::now())
    }

    /// Deterministic simulation; the caller supplies the stamp.
    #[must_use]
    pub fn simulate_with(
        &self,
        input: &SimulationInput,
        proposal_number: String,
        created_at: DateTime<Utc>,
    ) -> SimulationOutcome {
        let consumption = input.monthly_consumption_kwh;
        let required_generation_kwh = self.tariff.required_generation(consumption);

        let Some(kit) = select_best_kit(&self.catalog, required_generation_kwh) else {
            debug!(
                consumption_kwh = consumption,
                required_generation_kwh, "No catalog kit covers consumption"
            );
            return SimulationOutcome::CustomQuoteRequired {
                required_generation_kwh,
            };
        };

        let savings = self.tariff.savings(consumption, kit.estimated_production_kwh);
        let payback_years = calculate_payback(kit.price, savings.annual_savings);

        debug!(
            consumption_kwh = consumption,
            required_generation_kwh,
            kit_id = kit.id,
            annual_savings = savings.annual_savings,
            payback_years,
            "Simulation quoted"
        );

        SimulationOutcome::Quoted(SimulationResult {
            required_generation_kwh,
            selected_kit: kit.clone(),
            current_monthly_cost: savings.current_monthly_cost,
            new_monthly_cost: savings.new_monthly_cost,
            annual_savings: savings.annual_savings,
            payback_years,
            proposal_number,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use qenergia_types::RoofType;

    fn input(kwh: f64) -> SimulationInput {
        SimulationInput {
            client_name: "João Silva".to_owned(),
            city: "Fortaleza".to_owned(),
            monthly_consumption_kwh: kwh,
            roof_type: RoofType::CeramicTile,
        }
    }

    #[test]
    fn test_450_kwh_scenario() {
        let simulator = Simulator::default();
        let created_at = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();

        let outcome =
            simulator.simulate_with(&input(450.0), "QEN2025030001".to_owned(), created_at);
        let SimulationOutcome::Quoted(result) = outcome else {
            panic!("expected a quote, got {outcome:?}");
        };

        assert_eq!(result.required_generation_kwh, 563);
        assert_eq!(result.selected_kit.name, "Kit Residencial Plus");
        assert_eq!(result.selected_kit.estimated_production_kwh, 930);
        assert!((result.selected_kit.price - 25800.0).abs() < f64::EPSILON);
        assert!((result.current_monthly_cost - 337.5).abs() < 1e-9);
        assert!((result.new_monthly_cost - 30.0).abs() < 1e-9);
        assert!((result.annual_savings - 3690.0).abs() < 1e-9);
        assert!((result.payback_years - 7.0).abs() < 1e-9);
        assert_eq!(result.proposal_number, "QEN2025030001");
        assert_eq!(result.created_at, created_at);
    }

    #[test]
    fn test_oversized_consumption_needs_custom_quote() {
        let outcome = Simulator::default().simulate(&input(100_000.0));
        assert_eq!(
            outcome,
            SimulationOutcome::CustomQuoteRequired {
                required_generation_kwh: 125_000
            }
        );
    }

    #[test]
    fn test_result_keeps_kit_snapshot() {
        let simulator = Simulator::default();
        let SimulationOutcome::Quoted(result) = simulator.simulate(&input(450.0)) else {
            panic!("expected a quote");
        };
        assert_eq!(Some(&result.selected_kit), simulator.catalog().get(2));
        assert!(simulator.numbers().is_well_formed(&result.proposal_number));
    }

    #[test]
    fn test_custom_tariff_changes_savings() {
        let tariff = Tariff {
            unit_price: 1.0,
            ..Tariff::default()
        };
        let simulator = Simulator::default().with_tariff(tariff);
        let SimulationOutcome::Quoted(result) = simulator.simulate(&input(450.0)) else {
            panic!("expected a quote");
        };
        assert!((result.current_monthly_cost - 450.0).abs() < 1e-9);
        assert!((result.annual_savings - 5040.0).abs() < 1e-9);
    }
}
