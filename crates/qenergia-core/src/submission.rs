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

//! The form submission flow: validate, quote, persist, hand off.

use chrono::Utc;
use qenergia_types::{NewProposal, SimulationHandoff, SimulationRequest};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::handoff::{ResultHandoff, check_session_id};
use crate::proposal_number::ProposalNumberError;
use crate::simulator::{SimulationOutcome, Simulator};
use crate::store::{DuplicateProposalNumber, ProposalStore};
use crate::validation::ValidationReport;

/// Number draws per submission when the insert loses a race for the number
const INSERT_ATTEMPTS: usize = 2;

/// An accepted and persisted simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub proposal_id: Uuid,
    pub session_id: String,
    pub handoff: SimulationHandoff,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Accepted(Submission),
    CustomQuoteRequired { required_generation_kwh: u32 },
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("invalid simulation request: {0}")]
    Validation(ValidationReport),

    /// The session id cannot key a hand-off; nothing was persisted.
    #[error("invalid session id: {0:#}")]
    InvalidSession(anyhow::Error),

    #[error(transparent)]
    ProposalNumber(#[from] ProposalNumberError),

    /// The store rejected the record; the client may retry.
    #[error("failed to persist proposal: {0:#}")]
    Persistence(anyhow::Error),

    #[error("failed to write simulation hand-off: {0:#}")]
    Handoff(anyhow::Error),
}

impl SubmissionError {
    /// Whether resubmitting the same request can succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Validation(_) | Self::InvalidSession(_))
    }
}

/// Run one form submission end to end.
///
/// Nothing is written to the hand-off unless the proposal was persisted.
pub fn submit(
    simulator: &Simulator,
    store: &dyn ProposalStore,
    handoff: &dyn ResultHandoff,
    request: &SimulationRequest,
    session_id: &str,
) -> Result<SubmissionOutcome, SubmissionError> {
    let input = simulator.validate(request).map_err(SubmissionError::Validation)?;
    check_session_id(session_id).map_err(SubmissionError::InvalidSession)?;

    if simulator.select_kit(&input).is_none() {
        let required_generation_kwh = simulator
            .tariff()
            .required_generation(input.monthly_consumption_kwh);
        info!(
            consumption_kwh = input.monthly_consumption_kwh,
            required_generation_kwh, "Custom quote required"
        );
        return Ok(SubmissionOutcome::CustomQuoteRequired {
            required_generation_kwh,
        });
    }

    let mut attempt = 1;
    let (proposal_id, result) = loop {
        let proposal_number = simulator
            .numbers()
            .generate_unique(|candidate| store.proposal_number_exists(candidate))?;

        let result = match simulator.simulate_with(&input, proposal_number, Utc::now()) {
            SimulationOutcome::Quoted(result) => result,
            SimulationOutcome::CustomQuoteRequired {
                required_generation_kwh,
            } => {
                return Ok(SubmissionOutcome::CustomQuoteRequired {
                    required_generation_kwh,
                });
            }
        };

        // A concurrent submission can take the number between check and insert
        let record = NewProposal::from_simulation(&input, &result);
        match store.insert(&record) {
            Ok(id) => break (id, result),
            Err(e) if attempt < INSERT_ATTEMPTS && DuplicateProposalNumber::is_cause_of(&e) => {
                warn!(
                    proposal_number = %result.proposal_number,
                    attempt,
                    "Proposal number taken at insert, drawing another"
                );
                attempt += 1;
            }
            Err(e) => {
                error!(
                    proposal_number = %result.proposal_number,
                    "Failed to persist proposal: {e:#}"
                );
                return Err(SubmissionError::Persistence(e));
            }
        }
    };

    let handoff_value = SimulationHandoff {
        proposal_id,
        input,
        result,
    };
    handoff.write(session_id, &handoff_value).map_err(|e| {
        warn!(session_id, %proposal_id, "Failed to write hand-off: {e:#}");
        SubmissionError::Handoff(e)
    })?;

    info!(
        %proposal_id,
        proposal_number = %handoff_value.result.proposal_number,
        kit_id = handoff_value.result.selected_kit.id,
        "Proposal submitted"
    );

    Ok(SubmissionOutcome::Accepted(Submission {
        proposal_id,
        session_id: session_id.to_owned(),
        handoff: handoff_value,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handoff::InMemoryHandoff;
    use crate::store::InMemoryProposalStore;
    use anyhow::anyhow;
    use qenergia_types::{ConsumptionInput, NewProposal, ProposalRecord, ProposalStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct OfflineStore;

    impl ProposalStore for OfflineStore {
        fn insert(&self, _proposal: &NewProposal) -> anyhow::Result<Uuid> {
            Err(anyhow!("connection refused"))
        }

        fn proposal_number_exists(&self, _proposal_number: &str) -> anyhow::Result<bool> {
            Ok(false)
        }

        fn get(&self, _id: Uuid) -> anyhow::Result<Option<ProposalRecord>> {
            Ok(None)
        }

        fn list(&self) -> anyhow::Result<Vec<ProposalRecord>> {
            Ok(Vec::new())
        }

        fn update_status(
            &self,
            _id: Uuid,
            _status: ProposalStatus,
        ) -> anyhow::Result<Option<ProposalRecord>> {
            Ok(None)
        }
    }

    /// Loses the first insert to a concurrent submission holding the same number.
    #[derive(Default)]
    struct RacingStore {
        inner: InMemoryProposalStore,
        lost_races: AtomicUsize,
        races_to_lose: usize,
    }

    impl ProposalStore for RacingStore {
        fn insert(&self, proposal: &NewProposal) -> anyhow::Result<Uuid> {
            if self.lost_races.load(Ordering::SeqCst) < self.races_to_lose {
                self.lost_races.fetch_add(1, Ordering::SeqCst);
                let mut rival = proposal.clone();
                rival.client_name = "Concorrente".to_owned();
                self.inner.insert(&rival)?;
            }
            self.inner.insert(proposal)
        }

        fn proposal_number_exists(&self, proposal_number: &str) -> anyhow::Result<bool> {
            self.inner.proposal_number_exists(proposal_number)
        }

        fn get(&self, id: Uuid) -> anyhow::Result<Option<ProposalRecord>> {
            self.inner.get(id)
        }

        fn list(&self) -> anyhow::Result<Vec<ProposalRecord>> {
            self.inner.list()
        }

        fn update_status(
            &self,
            id: Uuid,
            status: ProposalStatus,
        ) -> anyhow::Result<Option<ProposalRecord>> {
            self.inner.update_status(id, status)
        }
    }

    fn request(consumption: ConsumptionInput) -> SimulationRequest {
        SimulationRequest {
            name: "João Silva".to_owned(),
            city: "Fortaleza".to_owned(),
            consumption,
            roof_type: "ceramic_tile".to_owned(),
        }
    }

    #[test]
    fn test_accepted_submission_is_persisted_and_handed_off() {
        let simulator = Simulator::default();
        let store = InMemoryProposalStore::new();
        let handoff = InMemoryHandoff::new();

        let outcome = submit(
            &simulator,
            &store,
            &handoff,
            &request(ConsumptionInput::Energy(450.0)),
            "session-1",
        )
        .unwrap();

        let SubmissionOutcome::Accepted(submission) = outcome else {
            panic!("expected acceptance");
        };
        let record = store.get(submission.proposal_id).unwrap().unwrap();
        assert_eq!(record.status, ProposalStatus::Draft);
        assert_eq!(record.proposal.selected_kit_id, 2);
        assert_eq!(
            record.proposal.proposal_number,
            submission.handoff.result.proposal_number
        );
        assert_eq!(handoff.read("session-1").unwrap(), Some(submission.handoff));
    }

    #[test]
    fn test_bill_mode_submission() {
        let store = InMemoryProposalStore::new();
        let outcome = submit(
            &Simulator::default(),
            &store,
            &InMemoryHandoff::new(),
            &request(ConsumptionInput::Bill(337.5)),
            "s",
        )
        .unwrap();
        let SubmissionOutcome::Accepted(submission) = outcome else {
            panic!("expected acceptance");
        };
        assert!((submission.handoff.input.monthly_consumption_kwh - 450.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_custom_quote_persists_nothing() {
        let store = InMemoryProposalStore::new();
        let handoff = InMemoryHandoff::new();
        let limits = crate::validation::ConsumptionLimits {
            min_kwh: 100.0,
            max_kwh: 200_000.0,
        };
        let simulator = Simulator::default().with_limits(limits);

        let outcome = submit(
            &simulator,
            &store,
            &handoff,
            &request(ConsumptionInput::Energy(100_000.0)),
            "s",
        )
        .unwrap();

        assert_eq!(
            outcome,
            SubmissionOutcome::CustomQuoteRequired {
                required_generation_kwh: 125_000
            }
        );
        assert!(store.is_empty());
        assert_eq!(handoff.read("s").unwrap(), None);
    }

    #[test]
    fn test_persistence_failure_skips_handoff() {
        let handoff = InMemoryHandoff::new();
        let err = submit(
            &Simulator::default(),
            &OfflineStore,
            &handoff,
            &request(ConsumptionInput::Energy(450.0)),
            "s",
        )
        .unwrap_err();

        assert!(matches!(err, SubmissionError::Persistence(_)));
        assert!(err.is_retryable());
        assert_eq!(handoff.read("s").unwrap(), None);
    }

    #[test]
    fn test_invalid_session_persists_nothing() {
        let store = InMemoryProposalStore::new();
        let handoff = InMemoryHandoff::new();

        for _ in 0..3 {
            let err = submit(
                &Simulator::default(),
                &store,
                &handoff,
                &request(ConsumptionInput::Energy(450.0)),
                "bad/session",
            )
            .unwrap_err();

            assert!(matches!(err, SubmissionError::InvalidSession(_)), "{err:?}");
            assert!(!err.is_retryable());
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_number_taken_at_insert_is_redrawn() {
        let store = RacingStore {
            races_to_lose: 1,
            ..RacingStore::default()
        };
        let handoff = InMemoryHandoff::new();

        let outcome = submit(
            &Simulator::default(),
            &store,
            &handoff,
            &request(ConsumptionInput::Energy(450.0)),
            "s",
        )
        .unwrap();

        let SubmissionOutcome::Accepted(submission) = outcome else {
            panic!("expected acceptance");
        };
        let records = store.list().unwrap();
        assert_eq!(records.len(), 2);
        let rival = records
            .iter()
            .find(|r| r.proposal.client_name == "Concorrente")
            .unwrap();
        assert_ne!(
            rival.proposal.proposal_number,
            submission.handoff.result.proposal_number
        );
        assert_eq!(handoff.read("s").unwrap(), Some(submission.handoff));
    }

    #[test]
    fn test_repeated_insert_collisions_fail_retryably() {
        let store = RacingStore {
            races_to_lose: usize::MAX,
            ..RacingStore::default()
        };
        let handoff = InMemoryHandoff::new();

        let err = submit(
            &Simulator::default(),
            &store,
            &handoff,
            &request(ConsumptionInput::Energy(450.0)),
            "s",
        )
        .unwrap_err();

        let SubmissionError::Persistence(cause) = &err else {
            panic!("expected persistence error, got {err:?}");
        };
        assert!(DuplicateProposalNumber::is_cause_of(cause));
        assert!(err.is_retryable());
        assert_eq!(store.lost_races.load(Ordering::SeqCst), 2);
        assert_eq!(handoff.read("s").unwrap(), None);
    }

    #[test]
    fn test_validation_failure() {
        let mut bad = request(ConsumptionInput::Energy(10.0));
        bad.name = " ".to_owned();
        let err = submit(
            &Simulator::default(),
            &InMemoryProposalStore::new(),
            &InMemoryHandoff::new(),
            &bad,
            "s",
        )
        .unwrap_err();

        let SubmissionError::Validation(report) = &err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(report.issues.len(), 2);
        assert!(!err.is_retryable());
    }
}
