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

//! Shared data types for QEnergia.
//!
//! Everything here is plain serde data: catalog kits, simulation inputs and
//! results, and the flat proposal records handed to persistence.

pub mod kit;
pub mod proposal;
pub mod simulation;

pub use kit::Kit;
pub use proposal::{
    NewProposal, ParseStatusError, ProposalRecord, ProposalStatus, SimulationHandoff,
};
pub use simulation::{
    ConsumptionInput, ParseRoofTypeError, RoofType, SimulationInput, SimulationRequest,
    SimulationResult,
};
