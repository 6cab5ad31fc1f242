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

//! JSON API consumed by the simulator form and the proposal dashboard.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use qenergia_core::pipeline::{PipelineMetrics, ProposalFilter, StatusChangeError, change_status};
use qenergia_core::submission::{SubmissionError, SubmissionOutcome, submit};
use qenergia_core::validation::LocalizedIssue;
use qenergia_types::{Kit, ParseStatusError, ProposalRecord, ProposalStatus, SimulationRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};
use uuid::Uuid;

use crate::app::AppState;

/// Where the front end sends users whose results are gone.
pub const SIMULATOR_PATH: &str = "/simulator";

#[derive(Debug, Deserialize)]
pub struct SimulationPayload {
    #[serde(flatten)]
    pub request: SimulationRequest,
    /// Browser session; a fresh one is issued when absent
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SimulationResponse {
    #[serde(flatten)]
    pub outcome: SubmissionOutcome,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub error: String,
    pub issues: Vec<LocalizedIssue>,
}

/// Query string shared by the proposal list and the dashboard page.
///
/// Status arrives as free text so an empty `status=` means "all".
#[derive(Debug, Default, Deserialize)]
pub struct ProposalQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ProposalQuery {
    pub fn to_filter(&self) -> Result<ProposalFilter, ParseStatusError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) => Some(text.parse::<ProposalStatus>()?),
        };
        Ok(ProposalFilter {
            search: self.search.clone(),
            status,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ProposalListResponse {
    pub proposals: Vec<ProposalRecord>,
    /// Computed over every stored proposal, not only the filtered ones
    pub metrics: PipelineMetrics,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: ProposalStatus,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

#[expect(clippy::unused_async, reason = "axum handler must be async")]
pub async fn list_kits(State(state): State<AppState>) -> Json<Vec<Kit>> {
    Json(state.simulator.catalog().kits().to_vec())
}

#[expect(clippy::unused_async, reason = "axum handler must be async")]
pub async fn create_simulation(
    State(state): State<AppState>,
    Json(payload): Json<SimulationPayload>,
) -> Response {
    let session_id = payload
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

    let outcome = submit(
        &state.simulator,
        state.store.as_ref(),
        state.handoff.as_ref(),
        &payload.request,
        &session_id,
    );

    match outcome {
        Ok(outcome @ SubmissionOutcome::Accepted(_)) => (
            StatusCode::CREATED,
            Json(SimulationResponse {
                outcome,
                message: state.i18n.text("outcome-success"),
            }),
        )
            .into_response(),
        Ok(outcome @ SubmissionOutcome::CustomQuoteRequired { .. }) => (
            StatusCode::OK,
            Json(SimulationResponse {
                outcome,
                message: state.i18n.text("outcome-custom-quote"),
            }),
        )
            .into_response(),
        Err(SubmissionError::Validation(report)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ValidationResponse {
                error: state.i18n.text("validation-summary"),
                issues: report.localize(&state.i18n),
            }),
        )
            .into_response(),
        Err(e @ SubmissionError::InvalidSession(_)) => {
            warn!(%session_id, error = %e, "Rejected simulation with unusable session id");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": state.i18n.text("error-session-invalid"),
                    "retryable": false,
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(%session_id, error = %e, "Simulation submission failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": state.i18n.text("error-persistence"),
                    "retryable": e.is_retryable(),
                })),
            )
                .into_response()
        }
    }
}

#[expect(clippy::unused_async, reason = "axum handler must be async")]
pub async fn get_results(State(state): State<AppState>, Path(session): Path<String>) -> Response {
    let key = match state.handoff.read(&session) {
        Ok(Some(handoff)) => return Json(handoff).into_response(),
        Ok(None) => "error-results-missing",
        Err(e) => {
            warn!(%session, error = %e, "Unreadable simulation hand-off");
            "error-results-malformed"
        }
    };

    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": state.i18n.text(key),
            "redirect": SIMULATOR_PATH,
        })),
    )
        .into_response()
}

#[expect(clippy::unused_async, reason = "axum handler must be async")]
pub async fn list_proposals(
    State(state): State<AppState>,
    Query(query): Query<ProposalQuery>,
) -> Response {
    let filter = match query.to_filter() {
        Ok(filter) => filter,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let records = match state.store.list() {
        Ok(records) => records,
        Err(e) => {
            error!(error = %e, "Failed to list proposals");
            return error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                state.i18n.text("error-persistence"),
            );
        }
    };

    let metrics = PipelineMetrics::from_records(&records);
    let proposals = filter.apply(&records).into_iter().cloned().collect();

    Json(ProposalListResponse { proposals, metrics }).into_response()
}

#[expect(clippy::unused_async, reason = "axum handler must be async")]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<StatusUpdate>,
) -> Response {
    match change_status(state.store.as_ref(), state.policy, id, update.status) {
        Ok(record) => Json(record).into_response(),
        Err(StatusChangeError::NotFound(_)) => {
            error_response(StatusCode::NOT_FOUND, state.i18n.text("proposal-not-found"))
        }
        Err(StatusChangeError::Forbidden(e)) => {
            warn!(%id, from = %e.from, to = %e.to, "Status change refused by policy");
            error_response(StatusCode::CONFLICT, e.message(&state.i18n))
        }
        Err(StatusChangeError::Store(e)) => {
            error!(%id, error = %e, "Failed to update proposal status");
            error_response(StatusCode::SERVICE_UNAVAILABLE, state.i18n.text("error-persistence"))
        }
    }
}
