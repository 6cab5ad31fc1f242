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

//! QEnergia HTTP service: simulation submission, results hand-off, the
//! proposal API and the sales dashboard.

pub mod api;
pub mod app;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod results;

pub use app::{AppState, build_router};
pub use config::ServerConfig;
