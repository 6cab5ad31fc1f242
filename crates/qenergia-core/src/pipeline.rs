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

//! Sales pipeline over stored proposals: status rules, filtering, metrics.

use std::collections::BTreeMap;

use qenergia_i18n::{I18n, args};
use qenergia_types::{ProposalRecord, ProposalStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::format::NumberFormat;
use crate::store::ProposalStore;

/// Which status changes an operator may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Any status may be set from any status
    #[default]
    Unrestricted,
    /// Only forward along draft → contacted → sent → approved → installed;
    /// `rejected` is reachable from anything not yet installed
    Forward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("status change from {from} to {to} is not allowed")]
pub struct TransitionError {
    pub from: ProposalStatus,
    pub to: ProposalStatus,
}

impl TransitionError {
    /// Localized description for operator-facing responses.
    #[must_use]
    pub fn message(&self, i18n: &I18n) -> String {
        let args = args(&[
            ("from", i18n.text(self.from.label_key())),
            ("to", i18n.text(self.to.label_key())),
        ]);
        i18n.text_with("transition-forbidden", &args)
    }
}

/// Position on the forward path; `None` for the terminal `rejected`.
fn forward_rank(status: ProposalStatus) -> Option<u8> {
    match status {
        ProposalStatus::Draft => Some(0),
        ProposalStatus::Contacted => Some(1),
        ProposalStatus::Sent => Some(2),
        ProposalStatus::Approved => Some(3),
        ProposalStatus::Installed => Some(4),
        ProposalStatus::Rejected => None,
    }
}

impl TransitionPolicy {
    #[must_use]
    pub fn allows(self, from: ProposalStatus, to: ProposalStatus) -> bool {
        if from == to {
            return true;
        }
        match self {
            Self::Unrestricted => true,
            Self::Forward => match (forward_rank(from), forward_rank(to)) {
                (Some(from), Some(to)) => to > from,
                (Some(_), None) => from != ProposalStatus::Installed,
                (None, _) => false,
            },
        }
    }

    pub fn check(self, from: ProposalStatus, to: ProposalStatus) -> Result<(), TransitionError> {
        if self.allows(from, to) {
            Ok(())
        } else {
            Err(TransitionError { from, to })
        }
    }
}

#[derive(Debug, Error)]
pub enum StatusChangeError {
    #[error("proposal {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Forbidden(#[from] TransitionError),

    #[error("proposal store failed: {0:#}")]
    Store(#[from] anyhow::Error),
}

/// Apply an operator status change under `policy`.
pub fn change_status(
    store: &dyn ProposalStore,
    policy: TransitionPolicy,
    id: Uuid,
    status: ProposalStatus,
) -> Result<ProposalRecord, StatusChangeError> {
    let current = store.get(id)?.ok_or(StatusChangeError::NotFound(id))?;
    policy.check(current.status, status)?;

    let updated = store
        .update_status(id, status)?
        .ok_or(StatusChangeError::NotFound(id))?;

    info!(
        %id,
        proposal_number = %updated.proposal.proposal_number,
        from = %current.status,
        to = %status,
        "Proposal status changed"
    );
    Ok(updated)
}

/// Dashboard filter. Empty search and no status match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<ProposalStatus>,
}

impl ProposalFilter {
    #[must_use]
    pub fn matches(&self, record: &ProposalRecord) -> bool {
        if let Some(status) = self.status
            && record.status != status
        {
            return false;
        }

        let Some(needle) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            return true;
        };
        let needle = needle.to_lowercase();

        [
            record.proposal.client_name.as_str(),
            record.proposal.client_city.as_str(),
            record.proposal.proposal_number.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
            || record.id.to_string().contains(&needle)
    }

    #[must_use]
    pub fn apply<'a>(&self, records: &'a [ProposalRecord]) -> Vec<&'a ProposalRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Headline figures for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineMetrics {
    pub total: usize,
    /// Sum of quoted kit prices (BRL)
    pub total_potential: f64,
    pub approved: usize,
    /// Mean payback over all proposals; 0 when there are none
    pub average_payback_years: f64,
    pub by_status: BTreeMap<&'static str, usize>,
}

impl PipelineMetrics {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ProposalRecord>) -> Self {
        let mut by_status: BTreeMap<&'static str, usize> =
            ProposalStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
        let mut total = 0_usize;
        let mut total_potential = 0.0;
        let mut payback_sum = 0.0;

        for record in records {
            total += 1;
            total_potential += record.proposal.selected_kit_price;
            payback_sum += record.proposal.payback_years;
            *by_status.entry(record.status.as_str()).or_insert(0) += 1;
        }

        let approved = by_status
            .get(ProposalStatus::Approved.as_str())
            .copied()
            .unwrap_or(0);
        #[expect(clippy::cast_precision_loss, reason = "proposal counts stay far below 2^52")]
        let average_payback_years = if total == 0 {
            0.0
        } else {
            payback_sum / total as f64
        };

        Self {
            total,
            total_potential,
            approved,
            average_payback_years,
            by_status,
        }
    }

    #[must_use]
    pub fn count(&self, status: ProposalStatus) -> usize {
        self.by_status.get(status.as_str()).copied().unwrap_or(0)
    }
}

/// Text a client can share after seeing their results.
#[must_use]
pub fn share_message(i18n: &I18n, annual_savings: f64) -> String {
    let savings = NumberFormat::for_language(i18n.language()).currency(annual_savings);
    i18n.text_with("share-message", &args(&[("savings", savings)]))
}
