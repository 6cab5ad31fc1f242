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

//! Form validation for simulation requests.
//!
//! Validation never fails the calculators: every problem becomes a
//! [`ValidationIssue`] carrying a translation key, and the caller decides
//! how to render the report.

use qenergia_i18n::{I18n, args};
use qenergia_types::{ConsumptionInput, RoofType, SimulationInput, SimulationRequest};
use serde::{Deserialize, Serialize};

use crate::estimator::Tariff;
use crate::format::NumberFormat;

pub const DEFAULT_MIN_KWH: f64 = 100.0;
pub const DEFAULT_MAX_KWH: f64 = 50_000.0;

/// Accepted monthly consumption range, in kWh.
///
/// Bill-mode bounds are derived from these through the tariff unit price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionLimits {
    #[serde(default = "default_min_kwh")]
    pub min_kwh: f64,
    #[serde(default = "default_max_kwh")]
    pub max_kwh: f64,
}

fn default_min_kwh() -> f64 {
    DEFAULT_MIN_KWH
}

fn default_max_kwh() -> f64 {
    DEFAULT_MAX_KWH
}

impl Default for ConsumptionLimits {
    fn default() -> Self {
        Self {
            min_kwh: DEFAULT_MIN_KWH,
            max_kwh: DEFAULT_MAX_KWH,
        }
    }
}

impl ConsumptionLimits {
    /// Bill range matching the kWh range at the tariff unit price.
    #[must_use]
    pub fn bill_range(&self, tariff: &Tariff) -> (f64, f64) {
        (tariff.kwh_to_bill(self.min_kwh), tariff.kwh_to_bill(self.max_kwh))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeUnit {
    Kwh,
    Currency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationKind {
    Required,
    OutOfRange { min: f64, max: f64, unit: RangeUnit },
    UnknownRoofType { value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    #[serde(flatten)]
    pub kind: ValidationKind,
}

impl ValidationIssue {
    #[must_use]
    pub fn message_key(&self) -> &'static str {
        match (&self.kind, self.field) {
            (ValidationKind::Required, "name") => "validation-name-required",
            (ValidationKind::Required, "city") => "validation-city-required",
            (ValidationKind::Required, _) => "validation-consumption-required",
            (ValidationKind::OutOfRange { .. }, _) => "validation-consumption-range",
            (ValidationKind::UnknownRoofType { .. }, _) => "validation-roof-type",
        }
    }

    /// Render the issue in the bundle's language.
    #[must_use]
    pub fn message(&self, i18n: &I18n) -> String {
        let numbers = NumberFormat::for_language(i18n.language());
        match &self.kind {
            ValidationKind::Required => i18n.text(self.message_key()),
            ValidationKind::OutOfRange { min, max, unit } => {
                let (min, max, unit) = match unit {
                    RangeUnit::Kwh => (
                        numbers.number(*min),
                        numbers.number(*max),
                        i18n.text("unit-kwh-month"),
                    ),
                    RangeUnit::Currency => (
                        numbers.currency(*min),
                        numbers.currency(*max),
                        String::new(),
                    ),
                };
                let args = args(&[("min", min), ("max", max), ("unit", unit)]);
                i18n.text_with(self.message_key(), &args).trim_end().to_owned()
            }
            ValidationKind::UnknownRoofType { value } => {
                i18n.text_with(self.message_key(), &args(&[("value", value.clone())]))
            }
        }
    }
}

/// A rendered issue, as returned to form clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedIssue {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    #[must_use]
    pub fn has_issue(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }

    #[must_use]
    pub fn localize(&self, i18n: &I18n) -> Vec<LocalizedIssue> {
        self.issues
            .iter()
            .map(|issue| LocalizedIssue {
                field: issue.field.to_owned(),
                message: issue.message(i18n),
            })
            .collect()
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<_> = self
            .issues
            .iter()
            .map(|i| format!("{}: {}", i.field, i.message_key()))
            .collect();
        write!(f, "{}", keys.join(", "))
    }
}

impl std::error::Error for ValidationReport {}

/// Validate a form submission and normalize consumption to kWh.
///
/// All fields are checked; the report lists every problem found. An empty
/// roof type selects the default ceramic tile roof.
pub fn validate_request(
    request: &SimulationRequest,
    tariff: &Tariff,
    limits: &ConsumptionLimits,
) -> Result<SimulationInput, ValidationReport> {
    let mut issues = Vec::new();

    let client_name = request.name.trim();
    if client_name.is_empty() {
        issues.push(ValidationIssue {
            field: "name",
            kind: ValidationKind::Required,
        });
    }

    let city = request.city.trim();
    if city.is_empty() {
        issues.push(ValidationIssue {
            field: "city",
            kind: ValidationKind::Required,
        });
    }

    let consumption = match validate_consumption(request.consumption, tariff, limits) {
        Ok(kwh) => Some(kwh),
        Err(issue) => {
            issues.push(issue);
            None
        }
    };

    let roof_text = request.roof_type.trim();
    let roof_type = if roof_text.is_empty() {
        Some(RoofType::default())
    } else if let Ok(roof) = roof_text.parse::<RoofType>() {
        Some(roof)
    } else {
        issues.push(ValidationIssue {
            field: "roof_type",
            kind: ValidationKind::UnknownRoofType {
                value: roof_text.to_owned(),
            },
        });
        None
    };

    match (consumption, roof_type) {
        (Some(monthly_consumption_kwh), Some(roof_type)) if issues.is_empty() => {
            Ok(SimulationInput {
                client_name: client_name.to_owned(),
                city: city.to_owned(),
                monthly_consumption_kwh,
                roof_type,
            })
        }
        _ => Err(ValidationReport { issues }),
    }
}

fn validate_consumption(
    consumption: ConsumptionInput,
    tariff: &Tariff,
    limits: &ConsumptionLimits,
) -> Result<f64, ValidationIssue> {
    let value = consumption.value();
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationIssue {
            field: "consumption",
            kind: ValidationKind::Required,
        });
    }

    let (min, max, unit) = match consumption {
        ConsumptionInput::Energy(_) => (limits.min_kwh, limits.max_kwh, RangeUnit::Kwh),
        ConsumptionInput::Bill(_) => {
            let (min, max) = limits.bill_range(tariff);
            (min, max, RangeUnit::Currency)
        }
    };
    if value < min || value > max {
        return Err(ValidationIssue {
            field: "consumption",
            kind: ValidationKind::OutOfRange { min, max, unit },
        });
    }

    Ok(match consumption {
        ConsumptionInput::Energy(kwh) => kwh,
        ConsumptionInput::Bill(bill) => tariff.bill_to_kwh(bill),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use qenergia_i18n::Language;

    fn request(
        name: &str,
        city: &str,
        consumption: ConsumptionInput,
        roof: &str,
    ) -> SimulationRequest {
        SimulationRequest {
            name: name.to_owned(),
            city: city.to_owned(),
            consumption,
            roof_type: roof.to_owned(),
        }
    }

    fn validate(request: &SimulationRequest) -> Result<SimulationInput, ValidationReport> {
        validate_request(request, &Tariff::default(), &ConsumptionLimits::default())
    }

    #[test]
    fn test_valid_energy_request_is_trimmed() {
        let input = validate(&request(
            "  Maria Souza ",
            " Fortaleza",
            ConsumptionInput::Energy(450.0),
            "fiber_cement",
        ))
        .unwrap();

        assert_eq!(input.client_name, "Maria Souza");
        assert_eq!(input.city, "Fortaleza");
        assert!((input.monthly_consumption_kwh - 450.0).abs() < f64::EPSILON);
        assert_eq!(input.roof_type, RoofType::FiberCement);
    }

    #[test]
    fn test_bill_is_converted_to_kwh() {
        let input =
            validate(&request("Ana", "Natal", ConsumptionInput::Bill(337.5), "metal")).unwrap();
        assert!((input.monthly_consumption_kwh - 450.0).abs() < f64::EPSILON);

        let input = validate(&request("Ana", "Natal", ConsumptionInput::Bill(200.0), "")).unwrap();
        // 266.67 rounds to 267
        assert!((input.monthly_consumption_kwh - 267.0).abs() < f64::EPSILON);
        assert_eq!(input.roof_type, RoofType::CeramicTile);
    }

    #[test]
    fn test_blank_fields_are_reported_together() {
        let report =
            validate(&request("   ", "", ConsumptionInput::Energy(0.0), "palha")).unwrap_err();

        assert_eq!(report.issues.len(), 4);
        assert!(report.has_issue("name"));
        assert!(report.has_issue("city"));
        assert!(report.has_issue("consumption"));
        assert!(report.has_issue("roof_type"));
    }

    #[test]
    fn test_energy_range_bounds() {
        for ok in [100.0, 50_000.0] {
            assert!(validate(&request("A", "B", ConsumptionInput::Energy(ok), "")).is_ok());
        }
        for bad in [99.9, 50_000.1] {
            let report =
                validate(&request("A", "B", ConsumptionInput::Energy(bad), "")).unwrap_err();
            assert!(matches!(
                report.issues[0].kind,
                ValidationKind::OutOfRange { unit: RangeUnit::Kwh, .. }
            ));
        }
    }

    #[test]
    fn test_bill_range_follows_unit_price() {
        let limits = ConsumptionLimits::default();
        let (min, max) = limits.bill_range(&Tariff::default());
        assert!((min - 75.0).abs() < 1e-9);
        assert!((max - 37_500.0).abs() < 1e-9);

        assert!(validate(&request("A", "B", ConsumptionInput::Bill(75.0), "")).is_ok());
        assert!(validate(&request("A", "B", ConsumptionInput::Bill(74.0), "")).is_err());
        assert!(validate(&request("A", "B", ConsumptionInput::Bill(37_501.0), "")).is_err());
    }

    #[test]
    fn test_non_finite_consumption_is_required_issue() {
        let report =
            validate(&request("A", "B", ConsumptionInput::Energy(f64::NAN), "")).unwrap_err();
        assert_eq!(report.issues[0].kind, ValidationKind::Required);
        assert_eq!(report.issues[0].message_key(), "validation-consumption-required");
    }

    #[test]
    fn test_localized_messages() {
        let pt = I18n::new(Language::Portuguese).unwrap();
        let en = I18n::new(Language::English).unwrap();
        let report =
            validate(&request("", "Recife", ConsumptionInput::Energy(60_000.0), "")).unwrap_err();

        let messages = report.localize(&pt);
        assert_eq!(messages[0].field, "name");
        assert_eq!(messages[0].message, "Informe o nome completo");
        assert_eq!(
            messages[1].message,
            "O consumo mensal deve estar entre 100 e 50.000 kWh/mês"
        );

        let messages = report.localize(&en);
        assert!(messages[1].message.contains("50,000"), "{}", messages[1].message);
    }
}
