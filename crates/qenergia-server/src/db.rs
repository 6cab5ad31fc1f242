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

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use qenergia_core::store::{DuplicateProposalNumber, ProposalStore};
use qenergia_types::{NewProposal, ProposalRecord, ProposalStatus, RoofType};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row, params};
use uuid::Uuid;

const SELECT_COLUMNS: &str = "id, status, updated_at, client_name, client_city,
    monthly_consumption_kwh, roof_type, proposal_number, selected_kit_id, selected_kit_name,
    selected_kit_power_kwp, selected_kit_price, required_generation_kwh, current_monthly_cost,
    new_monthly_cost, annual_savings, payback_years, created_at";

/// SQLite-backed proposal store.
#[derive(Debug)]
pub struct Database {
    conn: Mutex<rusqlite::Connection>,
}

impl Database {
    /// Open (or create) the database at `path`. `:memory:` is accepted.
    pub fn open(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let conn = rusqlite::Connection::open(path)
            .with_context(|| format!("Failed to open database: {path}"))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS proposals (
                id                       TEXT PRIMARY KEY,
                proposal_number          TEXT NOT NULL UNIQUE,
                status                   TEXT NOT NULL DEFAULT 'draft',
                client_name              TEXT NOT NULL,
                client_city              TEXT NOT NULL,
                monthly_consumption_kwh  REAL NOT NULL,
                roof_type                TEXT NOT NULL,
                selected_kit_id          INTEGER NOT NULL,
                selected_kit_name        TEXT NOT NULL,
                selected_kit_power_kwp   REAL NOT NULL,
                selected_kit_price       REAL NOT NULL,
                required_generation_kwh  INTEGER NOT NULL,
                current_monthly_cost     REAL NOT NULL,
                new_monthly_cost         REAL NOT NULL,
                annual_savings           REAL NOT NULL,
                payback_years            REAL NOT NULL,
                created_at               TEXT NOT NULL,
                updated_at               TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_proposals_created
                ON proposals(created_at DESC);",
        )
        .context("Failed to initialize database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn text_column<T, E>(
    row: &Row<'_>,
    idx: usize,
    parse: impl FnOnce(&str) -> Result<T, E>,
) -> rusqlite::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    parse(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<ProposalRecord> {
    Ok(ProposalRecord {
        id: text_column(row, 0, Uuid::parse_str)?,
        status: text_column(row, 1, str::parse::<ProposalStatus>)?,
        updated_at: row.get(2)?,
        proposal: NewProposal {
            client_name: row.get(3)?,
            client_city: row.get(4)?,
            monthly_consumption_kwh: row.get(5)?,
            roof_type: text_column(row, 6, str::parse::<RoofType>)?,
            proposal_number: row.get(7)?,
            selected_kit_id: row.get(8)?,
            selected_kit_name: row.get(9)?,
            selected_kit_power_kwp: row.get(10)?,
            selected_kit_price: row.get(11)?,
            required_generation_kwh: row.get(12)?,
            current_monthly_cost: row.get(13)?,
            new_monthly_cost: row.get(14)?,
            annual_savings: row.get(15)?,
            payback_years: row.get(16)?,
            created_at: row.get(17)?,
        },
    })
}

impl ProposalStore for Database {
    fn insert(&self, proposal: &NewProposal) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let conn = self.conn.lock();
        let inserted = conn.execute(
            "INSERT INTO proposals (id, proposal_number, status, client_name, client_city,
                monthly_consumption_kwh, roof_type, selected_kit_id, selected_kit_name,
                selected_kit_power_kwp, selected_kit_price, required_generation_kwh,
                current_monthly_cost, new_monthly_cost, annual_savings, payback_years,
                created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9,
                ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?17)",
            params![
                id.to_string(),
                proposal.proposal_number,
                ProposalStatus::Draft.as_str(),
                proposal.client_name,
                proposal.client_city,
                proposal.monthly_consumption_kwh,
                proposal.roof_type.as_str(),
                proposal.selected_kit_id,
                proposal.selected_kit_name,
                proposal.selected_kit_power_kwp,
                proposal.selected_kit_price,
                proposal.required_generation_kwh,
                proposal.current_monthly_cost,
                proposal.new_monthly_cost,
                proposal.annual_savings,
                proposal.payback_years,
                proposal.created_at,
            ],
        );

        match inserted {
            Ok(_) => Ok(id),
            Err(rusqlite::Error::SqliteFailure(failure, _))
                if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(DuplicateProposalNumber(proposal.proposal_number.clone()).into())
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Failed to insert proposal {}", proposal.proposal_number))),
        }
    }

    fn proposal_number_exists(&self, proposal_number: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM proposals WHERE proposal_number = ?1)",
            params![proposal_number],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn get(&self, id: Uuid) -> Result<Option<ProposalRecord>> {
        let conn = self.conn.lock();
        let record = conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM proposals WHERE id = ?1"),
                params![id.to_string()],
                row_to_record,
            )
            .optional()
            .with_context(|| format!("Failed to load proposal {id}"))?;
        Ok(record)
    }

    fn list(&self) -> Result<Vec<ProposalRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM proposals ORDER BY created_at DESC"
        ))?;

        let rows = stmt
            .query_map([], row_to_record)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list proposals")?;

        Ok(rows)
    }

    fn update_status(&self, id: Uuid, status: ProposalStatus) -> Result<Option<ProposalRecord>> {
        let changed = {
            let conn = self.conn.lock();
            conn.execute(
                "UPDATE proposals SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.as_str(), Utc::now(), id.to_string()],
            )
            .with_context(|| format!("Failed to update status of proposal {id}"))?
        };

        if changed == 0 {
            return Ok(None);
        }
        self.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};
    use tempfile::tempdir;

    fn proposal(number: &str, created_at: DateTime<Utc>) -> NewProposal {
        NewProposal {
            client_name: "Maria Souza".to_owned(),
            client_city: "Fortaleza".to_owned(),
            monthly_consumption_kwh: 450.0,
            roof_type: RoofType::FiberCement,
            proposal_number: number.to_owned(),
            selected_kit_id: 2,
            selected_kit_name: "Kit Residencial Plus".to_owned(),
            selected_kit_power_kwp: 6.6,
            selected_kit_price: 25800.0,
            required_generation_kwh: 563,
            current_monthly_cost: 337.5,
            new_monthly_cost: 30.0,
            annual_savings: 3690.0,
            payback_years: 7.0,
            created_at,
        }
    }

    #[test]
    fn test_insert_and_get_round_trip() {
        let db = Database::open(":memory:").unwrap();
        let created = Utc.with_ymd_and_hms(2025, 3, 10, 14, 30, 0).unwrap();
        let new = proposal("QEN2025030042", created);

        let id = db.insert(&new).unwrap();
        let record = db.get(id).unwrap().unwrap();

        assert_eq!(record.id, id);
        assert_eq!(record.status, ProposalStatus::Draft);
        assert_eq!(record.proposal, new);
        assert_eq!(record.updated_at, created);
    }

    #[test]
    fn test_proposal_number_is_unique() {
        let db = Database::open(":memory:").unwrap();
        db.insert(&proposal("QEN2025030042", Utc::now())).unwrap();

        assert!(db.proposal_number_exists("QEN2025030042").unwrap());
        assert!(!db.proposal_number_exists("QEN2025030043").unwrap());
        let err = db.insert(&proposal("QEN2025030042", Utc::now())).unwrap_err();
        assert!(DuplicateProposalNumber::is_cause_of(&err));
    }

    #[test]
    fn test_list_newest_first_and_update_status() {
        let db = Database::open(":memory:").unwrap();
        let older = db
            .insert(&proposal("QEN2025030001", Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()))
            .unwrap();
        let newer = db
            .insert(&proposal("QEN2025030002", Utc.with_ymd_and_hms(2025, 3, 5, 9, 0, 0).unwrap()))
            .unwrap();

        let ids: Vec<_> = db.list().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, [newer, older]);

        let updated = db.update_status(older, ProposalStatus::Approved).unwrap().unwrap();
        assert_eq!(updated.status, ProposalStatus::Approved);
        assert!(updated.updated_at > updated.proposal.created_at);
        assert!(db.update_status(Uuid::new_v4(), ProposalStatus::Sent).unwrap().is_none());
    }

    #[test]
    fn test_file_database_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/qenergia.db");
        let path = path.to_str().unwrap();

        let id = {
            let db = Database::open(path).unwrap();
            db.insert(&proposal("QEN2025030007", Utc::now())).unwrap()
        };

        let db = Database::open(path).unwrap();
        assert!(db.get(id).unwrap().is_some());
    }
}
