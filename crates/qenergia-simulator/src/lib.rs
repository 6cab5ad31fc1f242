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

//! Command-line front end for the QEnergia quote engine.
//!
//! The `qenergia-sim` binary quotes single consumptions with the same
//! validation as the web form, prints the kit catalog, and sweeps
//! consumption ranges to table or CSV.

pub mod cli;
pub mod sweep;

pub use sweep::{SweepRow, run_sweep};
