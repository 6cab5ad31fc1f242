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

//! Per-session hand-off between the submission step and the results page.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use parking_lot::Mutex;
use qenergia_types::SimulationHandoff;
use tracing::debug;

pub const DEFAULT_HANDOFF_DIR: &str = "./data/sessions";

const MAX_SESSION_ID_LEN: usize = 128;

/// Session-scoped storage of the last simulation.
///
/// A `read` after a `write` for the same session returns exactly the
/// written value. `Ok(None)` means nothing was written; an `Err` means the
/// stored data could not be read back.
pub trait ResultHandoff: Send + Sync {
    fn write(&self, session_id: &str, handoff: &SimulationHandoff) -> Result<()>;

    fn read(&self, session_id: &str) -> Result<Option<SimulationHandoff>>;
}

/// Session ids become file names, so only `[A-Za-z0-9_-]` is accepted.
pub fn check_session_id(session_id: &str) -> Result<()> {
    if session_id.is_empty() || session_id.len() > MAX_SESSION_ID_LEN {
        bail!("session id must be 1 to {MAX_SESSION_ID_LEN} characters");
    }
    if !session_id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        bail!("session id {session_id:?} contains unsupported characters");
    }
    Ok(())
}

/// One JSON file per session under a directory.
#[derive(Debug, Clone)]
pub struct FileHandoff {
    dir: PathBuf,
}

impl FileHandoff {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, session_id: &str) -> Result<PathBuf> {
        check_session_id(session_id)?;
        Ok(self.dir.join(format!("{session_id}.json")))
    }
}

impl Default for FileHandoff {
    fn default() -> Self {
        Self::new(DEFAULT_HANDOFF_DIR)
    }
}

impl ResultHandoff for FileHandoff {
    /// Atomic write (temp file + rename), so readers never see a partial file.
    fn write(&self, session_id: &str, handoff: &SimulationHandoff) -> Result<()> {
        let path = self.path_for(session_id)?;
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory {}", self.dir.display()))?;

        let json = serde_json::to_string_pretty(handoff).context("Failed to serialize hand-off")?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &json)
            .with_context(|| format!("Failed to write temp file {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to rename temp file to {}", path.display()))?;

        debug!(
            session_id,
            proposal_number = %handoff.result.proposal_number,
            "Saved simulation hand-off"
        );
        Ok(())
    }

    fn read(&self, session_id: &str) -> Result<Option<SimulationHandoff>> {
        let path = self.path_for(session_id)?;
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read hand-off from {}", path.display()))?;
        let handoff = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse hand-off from {}", path.display()))?;
        Ok(Some(handoff))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryHandoff {
    sessions: Mutex<HashMap<String, SimulationHandoff>>,
}

impl InMemoryHandoff {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultHandoff for InMemoryHandoff {
    fn write(&self, session_id: &str, handoff: &SimulationHandoff) -> Result<()> {
        check_session_id(session_id)?;
        self.sessions
            .lock()
            .insert(session_id.to_owned(), handoff.clone());
        Ok(())
    }

    fn read(&self, session_id: &str) -> Result<Option<SimulationHandoff>> {
        check_session_id(session_id)?;
        Ok(self.sessions.lock().get(session_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::{SimulationOutcome, Simulator};
    use proptest::prelude::*;
    use qenergia_types::{RoofType, SimulationInput};
    use tempfile::tempdir;
    use uuid::Uuid;

    fn sample() -> SimulationHandoff {
        quote(450.0)
    }

    fn quote(monthly_consumption_kwh: f64) -> SimulationHandoff {
        let input = SimulationInput {
            client_name: "Ana Lima".to_owned(),
            city: "Natal".to_owned(),
            monthly_consumption_kwh,
            roof_type: RoofType::Metal,
        };
        let SimulationOutcome::Quoted(result) = Simulator::default().simulate(&input) else {
            panic!("expected a quote");
        };
        SimulationHandoff {
            proposal_id: Uuid::new_v4(),
            input,
            result,
        }
    }

    #[test]
    fn test_file_read_after_write_returns_same_value() {
        let dir = tempdir().unwrap();
        let handoff = FileHandoff::new(dir.path().join("sessions"));
        let value = sample();

        handoff.write("abc-123", &value).unwrap();
        assert_eq!(handoff.read("abc-123").unwrap(), Some(value));
        assert!(!dir.path().join("sessions/abc-123.tmp").exists());
    }

    #[test]
    fn test_file_round_trip_keeps_every_float_bit() {
        let dir = tempdir().unwrap();
        let handoff = FileHandoff::new(dir.path());
        // 120.51 kWh costs 90.38250000000001 per month
        let value = quote(120.51);
        assert_eq!(value.result.current_monthly_cost.to_bits(), (120.51_f64 * 0.75).to_bits());

        handoff.write("s", &value).unwrap();
        let read = handoff.read("s").unwrap().unwrap();
        assert_eq!(
            read.result.current_monthly_cost.to_bits(),
            value.result.current_monthly_cost.to_bits()
        );
        assert_eq!(read, value);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_file_read_returns_written_value(cents in 10_000_u32..=930_000) {
            let dir = tempdir().unwrap();
            let handoff = FileHandoff::new(dir.path());
            let value = quote(f64::from(cents) / 100.0);

            handoff.write("session", &value).unwrap();
            prop_assert_eq!(handoff.read("session").unwrap(), Some(value));
        }
    }

    #[test]
    fn test_file_missing_session_is_none() {
        let dir = tempdir().unwrap();
        let handoff = FileHandoff::new(dir.path());
        assert_eq!(handoff.read("nobody").unwrap(), None);
    }

    #[test]
    fn test_file_malformed_session_is_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        let handoff = FileHandoff::new(dir.path());
        assert!(handoff.read("broken").is_err());
    }

    #[test]
    fn test_session_id_is_restricted() {
        assert!(check_session_id("a1_B-2").is_ok());
        assert!(check_session_id("").is_err());
        assert!(check_session_id("../etc/passwd").is_err());
        assert!(check_session_id(&"x".repeat(129)).is_err());

        let handoff = InMemoryHandoff::new();
        assert!(handoff.write("a/b", &sample()).is_err());
    }

    #[test]
    fn test_memory_overwrites_per_session() {
        let handoff = InMemoryHandoff::new();
        let first = sample();
        let second = sample();

        handoff.write("s1", &first).unwrap();
        handoff.write("s1", &second).unwrap();
        assert_eq!(handoff.read("s1").unwrap(), Some(second));
        assert_eq!(handoff.read("s2").unwrap(), None);
    }
}
