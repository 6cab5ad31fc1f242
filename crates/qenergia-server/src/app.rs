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
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, patch, post};
use qenergia_core::catalog::Catalog;
use qenergia_core::handoff::{FileHandoff, ResultHandoff};
use qenergia_core::pipeline::TransitionPolicy;
use qenergia_core::proposal_number::ProposalNumberGenerator;
use qenergia_core::simulator::Simulator;
use qenergia_core::store::ProposalStore;
use qenergia_i18n::I18n;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::db::Database;
use crate::{api, dashboard, results};

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub simulator: Simulator,
    pub store: Arc<dyn ProposalStore>,
    pub handoff: Arc<dyn ResultHandoff>,
    pub i18n: Arc<I18n>,
    pub policy: TransitionPolicy,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("simulator", &self.simulator)
            .field("language", &self.i18n.language())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire the collaborators described by `config`.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let catalog = match &config.catalog.path {
            Some(path) => {
                let catalog = Catalog::from_toml_file(path)
                    .with_context(|| format!("Failed to load kit catalog from {path}"))?;
                info!(path = %path, kits = catalog.len(), "Kit catalog loaded");
                catalog
            }
            None => Catalog::standard(),
        };
        for warning in catalog.warnings() {
            warn!(%warning, "Kit catalog convention breached");
        }

        let numbers = ProposalNumberGenerator::new(
            config.proposals.prefix.clone(),
            config.proposals.timezone()?,
        );
        let simulator = Simulator::new(Arc::new(catalog))
            .with_tariff(config.tariff)
            .with_limits(config.limits)
            .with_numbers(numbers);

        let store = Database::open(&config.database.path)?;
        info!(path = %config.database.path, "Database opened");

        let handoff = FileHandoff::new(Path::new(&config.handoff.dir));
        let i18n = I18n::new(config.i18n.language)
            .with_context(|| format!("Failed to load translations for {}", config.i18n.language))?;

        Ok(Self {
            simulator,
            store: Arc::new(store),
            handoff: Arc::new(handoff),
            i18n: Arc::new(i18n),
            policy: config.proposals.transition_policy,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/kits", get(api::list_kits))
        .route("/api/simulations", post(api::create_simulation))
        .route("/api/results/{session}", get(api::get_results))
        .route("/api/proposals", get(api::list_proposals))
        .route("/api/proposals/{id}/status", patch(api::update_status))
        .route("/results/{session}", get(results::results_handler))
        .route("/dashboard", get(dashboard::dashboard_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
