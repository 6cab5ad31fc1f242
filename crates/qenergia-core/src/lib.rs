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

//! QEnergia quote engine.
//!
//! Maps a monthly consumption to the cheapest catalog kit that covers it,
//! estimates the bill with and without solar, and carries the result through
//! persistence and the results-page hand-off.

pub mod catalog;
pub mod estimator;
pub mod format;
pub mod handoff;
pub mod pipeline;
pub mod proposal_number;
pub mod selector;
pub mod simulator;
pub mod store;
pub mod submission;
pub mod validation;

pub use catalog::{Catalog, CatalogError, CatalogWarning};
pub use estimator::{SavingsEstimate, Tariff, calculate_payback};
pub use format::{NumberFormat, format_currency, format_number};
pub use handoff::{FileHandoff, InMemoryHandoff, ResultHandoff};
pub use pipeline::{
    PipelineMetrics, ProposalFilter, StatusChangeError, TransitionError, TransitionPolicy,
    change_status, share_message,
};
pub use proposal_number::{ProposalNumberError, ProposalNumberGenerator};
pub use selector::select_best_kit;
pub use simulator::{SimulationOutcome, Simulator};
pub use store::{DuplicateProposalNumber, InMemoryProposalStore, ProposalStore};
pub use submission::{Submission, SubmissionError, SubmissionOutcome, submit};
pub use validation::{
    ConsumptionLimits, LocalizedIssue, ValidationIssue, ValidationKind, ValidationReport,
    validate_request,
};
