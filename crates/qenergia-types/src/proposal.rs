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

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::simulation::{RoofType, SimulationInput, SimulationResult};

/// Sales pipeline status of a proposal.
///
/// The two dashboard variants used different vocabularies; `new` and
/// `proposal_sent` are accepted as aliases of `draft` and `sent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    #[default]
    #[serde(alias = "new")]
    Draft,
    Contacted,
    #[serde(alias = "proposal_sent")]
    Sent,
    Approved,
    Rejected,
    Installed,
}

impl ProposalStatus {
    pub const ALL: [ProposalStatus; 6] = [
        ProposalStatus::Draft,
        ProposalStatus::Contacted,
        ProposalStatus::Sent,
        ProposalStatus::Approved,
        ProposalStatus::Rejected,
        ProposalStatus::Installed,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Contacted => "contacted",
            Self::Sent => "sent",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Installed => "installed",
        }
    }

    /// Translation key of the display label
    #[must_use]
    pub fn label_key(&self) -> &'static str {
        match self {
            Self::Draft => "status-draft",
            Self::Contacted => "status-contacted",
            Self::Sent => "status-sent",
            Self::Approved => "status-approved",
            Self::Rejected => "status-rejected",
            Self::Installed => "status-installed",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown proposal status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for ProposalStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" | "new" => Ok(Self::Draft),
            "contacted" => Ok(Self::Contacted),
            "sent" | "proposal_sent" => Ok(Self::Sent),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "installed" => Ok(Self::Installed),
            _ => Err(ParseStatusError(s.to_owned())),
        }
    }
}

/// Flat record handed to the proposal store on submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProposal {
    pub client_name: String,
    pub client_city: String,
    pub monthly_consumption_kwh: f64,
    pub roof_type: RoofType,
    pub proposal_number: String,
    pub selected_kit_id: u32,
    pub selected_kit_name: String,
    pub selected_kit_power_kwp: f64,
    pub selected_kit_price: f64,
    pub required_generation_kwh: u32,
    pub current_monthly_cost: f64,
    pub new_monthly_cost: f64,
    pub annual_savings: f64,
    pub payback_years: f64,
    pub created_at: DateTime<Utc>,
}

impl NewProposal {
    #[must_use]
    pub fn from_simulation(input: &SimulationInput, result: &SimulationResult) -> Self {
        Self {
            client_name: input.client_name.clone(),
            client_city: input.city.clone(),
            monthly_consumption_kwh: input.monthly_consumption_kwh,
            roof_type: input.roof_type,
            proposal_number: result.proposal_number.clone(),
            selected_kit_id: result.selected_kit.id,
            selected_kit_name: result.selected_kit.name.clone(),
            selected_kit_power_kwp: result.selected_kit.total_power_kwp,
            selected_kit_price: result.selected_kit.price,
            required_generation_kwh: result.required_generation_kwh,
            current_monthly_cost: result.current_monthly_cost,
            new_monthly_cost: result.new_monthly_cost,
            annual_savings: result.annual_savings,
            payback_years: result.payback_years,
            created_at: result.created_at,
        }
    }
}

/// A persisted proposal with its mutable pipeline status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub id: Uuid,
    pub status: ProposalStatus,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub proposal: NewProposal,
}

/// What the submission step leaves for the results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationHandoff {
    pub proposal_id: Uuid,
    pub input: SimulationInput,
    pub result: SimulationResult,
}
