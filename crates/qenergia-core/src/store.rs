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

use anyhow::Result;
use chrono::Utc;
use parking_lot::Mutex;
use qenergia_types::{NewProposal, ProposalRecord, ProposalStatus};
use thiserror::Error;
use uuid::Uuid;

/// Returned by [`ProposalStore::insert`] when another record already holds
/// the proposal number.
#[derive(Debug, Error)]
#[error("proposal number {0} already stored")]
pub struct DuplicateProposalNumber(pub String);

impl DuplicateProposalNumber {
    /// Whether a store error is a proposal number collision.
    #[must_use]
    pub fn is_cause_of(err: &anyhow::Error) -> bool {
        err.downcast_ref::<Self>().is_some()
    }
}

/// Persistence collaborator for proposals.
///
/// Implementations must be safe to share between request handlers.
pub trait ProposalStore: Send + Sync {
    /// Persist a new proposal in `draft` and return its generated id.
    /// A taken number fails with [`DuplicateProposalNumber`].
    fn insert(&self, proposal: &NewProposal) -> Result<Uuid>;

    /// Whether a proposal with this number is already stored
    fn proposal_number_exists(&self, proposal_number: &str) -> Result<bool>;

    fn get(&self, id: Uuid) -> Result<Option<ProposalRecord>>;

    /// All proposals, newest first
    fn list(&self) -> Result<Vec<ProposalRecord>>;

    /// Overwrite the status; `None` when the id is unknown.
    /// Transition rules are applied by the caller.
    fn update_status(&self, id: Uuid, status: ProposalStatus) -> Result<Option<ProposalRecord>>;
}

/// Process-local store, used by the CLI and tests.
#[derive(Debug, Default)]
pub struct InMemoryProposalStore {
    records: Mutex<Vec<ProposalRecord>>,
}

impl InMemoryProposalStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl ProposalStore for InMemoryProposalStore {
    fn insert(&self, proposal: &NewProposal) -> Result<Uuid> {
        let mut records = self.records.lock();
        if records
            .iter()
            .any(|r| r.proposal.proposal_number == proposal.proposal_number)
        {
            return Err(DuplicateProposalNumber(proposal.proposal_number.clone()).into());
        }

        let id = Uuid::new_v4();
        records.push(ProposalRecord {
            id,
            status: ProposalStatus::Draft,
            updated_at: proposal.created_at,
            proposal: proposal.clone(),
        });
        Ok(id)
    }

    fn proposal_number_exists(&self, proposal_number: &str) -> Result<bool> {
        Ok(self
            .records
            .lock()
            .iter()
            .any(|r| r.proposal.proposal_number == proposal_number))
    }

    fn get(&self, id: Uuid) -> Result<Option<ProposalRecord>> {
        Ok(self.records.lock().iter().find(|r| r.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<ProposalRecord>> {
        let mut records = self.records.lock().clone();
        records.sort_by(|a, b| b.proposal.created_at.cmp(&a.proposal.created_at));
        Ok(records)
    }

    fn update_status(&self, id: Uuid, status: ProposalStatus) -> Result<Option<ProposalRecord>> {
        let mut records = self.records.lock();
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        record.status = status;
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }
}
