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
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use chrono_tz::Tz;
use qenergia_core::format::NumberFormat;
use qenergia_core::pipeline::{PipelineMetrics, ProposalFilter};
use qenergia_i18n::I18n;
use qenergia_types::{ProposalRecord, ProposalStatus};
use tracing::{error, warn};

use crate::api::ProposalQuery;
use crate::app::AppState;

#[derive(Debug, Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate<'a> {
    pub i18n: &'a I18n,
    pub lang: &'static str,
    pub total: usize,
    pub total_potential: String,
    pub approved: usize,
    pub average_payback: String,
    pub status_counts: Vec<StatusCount>,
    pub status_options: Vec<StatusOption>,
    pub search: String,
    pub rows: Vec<DashboardRow>,
}

#[derive(Debug)]
pub struct StatusCount {
    pub status: &'static str,
    pub label: String,
    pub count: usize,
}

#[derive(Debug)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug)]
pub struct DashboardRow {
    pub proposal_number: String,
    pub client_name: String,
    pub city: String,
    pub kit: String,
    pub price: String,
    pub payback: String,
    pub status: &'static str,
    pub status_label: String,
    pub date: String,
}

impl<'a> DashboardTemplate<'a> {
    pub fn new(
        i18n: &'a I18n,
        timezone: Tz,
        records: &[ProposalRecord],
        filter: &ProposalFilter,
    ) -> Self {
        let numbers = NumberFormat::for_language(i18n.language());
        let metrics = PipelineMetrics::from_records(records);
        let years = i18n.text("unit-years");

        let status_counts = ProposalStatus::ALL
            .iter()
            .map(|status| StatusCount {
                status: status.as_str(),
                label: i18n.text(status.label_key()),
                count: metrics.count(*status),
            })
            .collect();

        let status_options = ProposalStatus::ALL
            .iter()
            .map(|status| StatusOption {
                value: status.as_str(),
                label: i18n.text(status.label_key()),
                selected: filter.status == Some(*status),
            })
            .collect();

        let rows = filter
            .apply(records)
            .into_iter()
            .map(|record| {
                let p = &record.proposal;
                DashboardRow {
                    proposal_number: p.proposal_number.clone(),
                    client_name: p.client_name.clone(),
                    city: p.client_city.clone(),
                    kit: p.selected_kit_name.clone(),
                    price: numbers.currency(p.selected_kit_price),
                    payback: format!("{} {years}", numbers.fixed(p.payback_years, 1)),
                    status: record.status.as_str(),
                    status_label: i18n.text(record.status.label_key()),
                    date: p.created_at.with_timezone(&timezone).format("%d/%m/%Y").to_string(),
                }
            })
            .collect();

        Self {
            i18n,
            lang: i18n.language().code(),
            total: metrics.total,
            total_potential: numbers.currency(metrics.total_potential),
            approved: metrics.approved,
            average_payback: format!("{} {years}", numbers.fixed(metrics.average_payback_years, 1)),
            status_counts,
            status_options,
            search: filter.search.clone().unwrap_or_default(),
            rows,
        }
    }
}

#[expect(clippy::unused_async, reason = "axum handler must be async")]
pub async fn dashboard_handler(
    State(state): State<AppState>,
    Query(query): Query<ProposalQuery>,
) -> impl IntoResponse {
    let filter = query.to_filter().unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring unknown dashboard status filter");
        ProposalFilter {
            search: query.search.clone(),
            status: None,
        }
    });

    let records = match state.store.list() {
        Ok(records) => records,
        Err(e) => {
            error!(error = %e, "Failed to fetch proposals for dashboard");
            return Html("<h1>Error loading dashboard</h1>".to_owned());
        }
    };

    let template = DashboardTemplate::new(
        &state.i18n,
        state.simulator.numbers().timezone(),
        &records,
        &filter,
    );

    match template.render() {
        Ok(html) => Html(html),
        Err(e) => {
            error!(error = %e, "Template render error");
            Html(format!("<h1>Error rendering dashboard: {e}</h1>"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use qenergia_i18n::Language;
    use qenergia_types::{NewProposal, RoofType};
    use uuid::Uuid;

    fn record(name: &str, status: ProposalStatus, price: f64) -> ProposalRecord {
        let created_at = Utc.with_ymd_and_hms(2025, 3, 10, 15, 0, 0).unwrap();
        ProposalRecord {
            id: Uuid::new_v4(),
            status,
            updated_at: created_at,
            proposal: NewProposal {
                client_name: name.to_owned(),
                client_city: "Fortaleza".to_owned(),
                monthly_consumption_kwh: 450.0,
                roof_type: RoofType::Metal,
                proposal_number: format!("QEN202503{:04}", name.len()),
                selected_kit_id: 2,
                selected_kit_name: "Kit Residencial Plus".to_owned(),
                selected_kit_power_kwp: 6.6,
                selected_kit_price: price,
                required_generation_kwh: 563,
                current_monthly_cost: 337.5,
                new_monthly_cost: 30.0,
                annual_savings: 3690.0,
                payback_years: 7.0,
                created_at,
            },
        }
    }

    #[test]
    fn test_dashboard_metrics_cover_all_rows_filter_limits_table() {
        let i18n = I18n::new(Language::Portuguese).unwrap();
        let records = vec![
            record("Ana", ProposalStatus::Approved, 25800.0),
            record("Bruno", ProposalStatus::Draft, 18500.0),
        ];
        let filter = ProposalFilter {
            search: None,
            status: Some(ProposalStatus::Approved),
        };

        let page = DashboardTemplate::new(&i18n, chrono_tz::America::Sao_Paulo, &records, &filter);
        assert_eq!(page.total, 2);
        assert_eq!(page.approved, 1);
        assert_eq!(page.total_potential, "R$\u{a0}44.300,00");
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].client_name, "Ana");
        assert_eq!(page.rows[0].status_label, "Aprovada");
        assert!(page.status_options.iter().any(|o| o.selected && o.value == "approved"));

        let html = page.render().unwrap();
        assert!(html.contains("Painel de Propostas"));
        assert!(html.contains("7,0 anos"));
        assert!(!html.contains("Bruno"));
    }

    #[test]
    fn test_empty_dashboard() {
        let i18n = I18n::new(Language::English).unwrap();
        let page = DashboardTemplate::new(&i18n, chrono_tz::UTC, &[], &ProposalFilter::default());
        assert_eq!(page.total, 0);
        assert_eq!(page.average_payback, format!("0.0 {}", i18n.text("unit-years")));
        let html = page.render().unwrap();
        assert!(html.contains(&i18n.text("dashboard-empty")));
    }
}
