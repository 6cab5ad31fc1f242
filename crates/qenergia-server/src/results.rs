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

use askama::Template;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono_tz::Tz;
use qenergia_core::format::NumberFormat;
use qenergia_core::pipeline::share_message;
use qenergia_i18n::I18n;
use qenergia_types::SimulationHandoff;
use tracing::{error, warn};

use crate::api::SIMULATOR_PATH;
use crate::app::AppState;

#[derive(Debug, Template)]
#[template(path = "results.html")]
pub struct ResultsTemplate<'a> {
    pub i18n: &'a I18n,
    pub lang: &'static str,
    pub proposal_number: String,
    pub date: String,
    pub client_name: String,
    pub city: String,
    pub roof: String,
    pub consumption: String,
    pub required_generation: String,
    pub kit_name: String,
    pub modules: String,
    pub power: String,
    pub inverters: String,
    pub area: String,
    pub structure: String,
    pub production: String,
    pub price: String,
    pub current_cost: String,
    pub new_cost: String,
    pub annual_savings: String,
    pub payback: String,
    pub share_message: String,
}

impl<'a> ResultsTemplate<'a> {
    pub fn new(i18n: &'a I18n, timezone: Tz, handoff: &SimulationHandoff) -> Self {
        let numbers = NumberFormat::for_language(i18n.language());
        let input = &handoff.input;
        let result = &handoff.result;
        let kit = &result.selected_kit;
        let kwh_month = i18n.text("unit-kwh-month");
        let kwp = i18n.text("unit-kwp");

        let inverters = match kit.micro_inverters {
            Some(micro) => format!("{} + {micro} micro", kit.inverters),
            None => kit.inverters.to_string(),
        };
        let payback = if result.payback_years > 0.0 {
            format!("{} {}", numbers.fixed(result.payback_years, 1), i18n.text("unit-years"))
        } else {
            i18n.text("results-payback-unavailable")
        };

        Self {
            i18n,
            lang: i18n.language().code(),
            proposal_number: result.proposal_number.clone(),
            date: result
                .created_at
                .with_timezone(&timezone)
                .format("%d/%m/%Y %H:%M")
                .to_string(),
            client_name: input.client_name.clone(),
            city: input.city.clone(),
            roof: i18n.text(input.roof_type.label_key()),
            consumption: format!("{} {kwh_month}", numbers.number(input.monthly_consumption_kwh)),
            required_generation: format!(
                "{} {kwh_month}",
                numbers.number(f64::from(result.required_generation_kwh))
            ),
            kit_name: kit.name.clone(),
            modules: format!(
                "{} × {} {kwp}",
                kit.modules,
                numbers.number(kit.power_per_module_kwp)
            ),
            power: format!("{} {kwp}", numbers.number(kit.total_power_kwp)),
            inverters,
            area: format!("{} m²", numbers.number(kit.area_required_m2)),
            structure: kit.structure_type.clone(),
            production: format!(
                "{} {kwh_month}",
                numbers.number(f64::from(kit.estimated_production_kwh))
            ),
            price: numbers.currency(kit.price),
            current_cost: numbers.currency(result.current_monthly_cost),
            new_cost: numbers.currency(result.new_monthly_cost),
            annual_savings: numbers.currency(result.annual_savings),
            payback,
            share_message: share_message(i18n, result.annual_savings),
        }
    }
}

/// Results page for the last simulation of a session.
///
/// Missing or unreadable data sends the visitor back to the simulator.
#[expect(clippy::unused_async, reason = "axum handler must be async")]
pub async fn results_handler(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Response {
    let handoff = match state.handoff.read(&session) {
        Ok(Some(handoff)) => handoff,
        Ok(None) => return Redirect::to(SIMULATOR_PATH).into_response(),
        Err(e) => {
            warn!(%session, error = %e, "Unreadable simulation hand-off");
            return Redirect::to(SIMULATOR_PATH).into_response();
        }
    };

    let timezone = state.simulator.numbers().timezone();
    let template = ResultsTemplate::new(&state.i18n, timezone, &handoff);
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "Template render error");
            Redirect::to(SIMULATOR_PATH).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use qenergia_core::simulator::{SimulationOutcome, Simulator};
    use qenergia_i18n::Language;
    use qenergia_types::{RoofType, SimulationInput};
    use uuid::Uuid;

    fn handoff() -> SimulationHandoff {
        let input = SimulationInput {
            client_name: "João <Silva>".to_owned(),
            city: "Fortaleza".to_owned(),
            monthly_consumption_kwh: 450.0,
            roof_type: RoofType::CeramicTile,
        };
        let at = Utc.with_ymd_and_hms(2025, 3, 10, 15, 0, 0).unwrap();
        let SimulationOutcome::Quoted(result) =
            Simulator::default().simulate_with(&input, "QEN2025030042".to_owned(), at)
        else {
            panic!("expected a quote");
        };
        SimulationHandoff {
            proposal_id: Uuid::new_v4(),
            input,
            result,
        }
    }

    #[test]
    fn test_results_page_renders_portuguese_figures() {
        let i18n = I18n::new(Language::Portuguese).unwrap();
        let html = ResultsTemplate::new(&i18n, chrono_tz::America::Sao_Paulo, &handoff())
            .render()
            .unwrap();

        assert!(html.contains("QEN2025030042"));
        assert!(html.contains("10/03/2025 12:00"));
        assert!(html.contains("Kit Residencial Plus"));
        assert!(html.contains("R$\u{a0}25.800,00"));
        assert!(html.contains("R$\u{a0}3.690,00"));
        assert!(html.contains("7,0 anos"));
        assert!(html.contains("563 kWh/mês"));
        assert!(html.contains("Telhado Cerâmico"));
        assert!(html.contains("João &lt;Silva&gt;"));
    }

    #[test]
    fn test_zero_payback_is_reported_unavailable() {
        let i18n = I18n::new(Language::English).unwrap();
        let mut value = handoff();
        value.result.payback_years = 0.0;
        let page = ResultsTemplate::new(&i18n, chrono_tz::UTC, &value);
        assert_eq!(page.payback, i18n.text("results-payback-unavailable"));
        assert_eq!(page.price, "R$25,800.00");
    }
}
