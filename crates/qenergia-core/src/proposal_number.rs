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

//! Human-readable proposal numbers: `<prefix><year><month><4 random digits>`.

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_PREFIX: &str = "QEN";
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Sao_Paulo;
/// Candidates tried against the store before giving up
pub const DEFAULT_MAX_ATTEMPTS: usize = 8;

const SUFFIX_MAX: u16 = 9999;
const SUFFIX_DIGITS: usize = 4;

#[derive(Debug, Error)]
pub enum ProposalNumberError {
    #[error("no free proposal number after {attempts} attempts")]
    Exhausted { attempts: usize },

    #[error("failed to check proposal number {candidate}: {source:#}")]
    Lookup {
        candidate: String,
        source: anyhow::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ProposalNumberGenerator {
    prefix: String,
    timezone: Tz,
    max_attempts: usize,
}

impl Default for ProposalNumberGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX, DEFAULT_TIMEZONE)
    }
}

impl ProposalNumberGenerator {
    pub fn new(prefix: impl Into<String>, timezone: Tz) -> Self {
        Self {
            prefix: prefix.into(),
            timezone,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Generate a number for the current month. Uniqueness is not checked.
    #[must_use]
    pub fn generate(&self) -> String {
        self.generate_at(Utc::now(), &mut rand::thread_rng())
    }

    /// Generate a number for the month `now` falls in, in the configured time zone.
    pub fn generate_at<R: Rng + ?Sized>(&self, now: DateTime<Utc>, rng: &mut R) -> String {
        let local = now.with_timezone(&self.timezone);
        let suffix = rng.gen_range(0..=SUFFIX_MAX);
        format!(
            "{}{:04}{:02}{:0width$}",
            self.prefix,
            local.year(),
            local.month(),
            suffix,
            width = SUFFIX_DIGITS
        )
    }

    /// Generate a number that `is_taken` reports as free.
    ///
    /// Each candidate is checked against the store; collisions are retried
    /// up to the configured attempt limit.
    pub fn generate_unique<F>(&self, is_taken: F) -> Result<String, ProposalNumberError>
    where
        F: FnMut(&str) -> anyhow::Result<bool>,
    {
        self.generate_unique_with(Utc::now(), &mut rand::thread_rng(), is_taken)
    }

    pub fn generate_unique_with<R, F>(
        &self,
        now: DateTime<Utc>,
        rng: &mut R,
        mut is_taken: F,
    ) -> Result<String, ProposalNumberError>
    where
        R: Rng + ?Sized,
        F: FnMut(&str) -> anyhow::Result<bool>,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = self.generate_at(now, rng);
            let taken = is_taken(&candidate).map_err(|source| ProposalNumberError::Lookup {
                candidate: candidate.clone(),
                source,
            })?;
            if !taken {
                debug!(proposal_number = %candidate, attempt, "Proposal number allocated");
                return Ok(candidate);
            }
            warn!(proposal_number = %candidate, attempt, "Proposal number collision, retrying");
        }

        Err(ProposalNumberError::Exhausted {
            attempts: self.max_attempts,
        })
    }

    /// Whether `number` has the shape this generator produces.
    #[must_use]
    pub fn is_well_formed(&self, number: &str) -> bool {
        let Some(rest) = number.strip_prefix(self.prefix.as_str()) else {
            return false;
        };
        if rest.len() != 4 + 2 + SUFFIX_DIGITS || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        let month: u32 = rest.get(4..6).and_then(|m| m.parse().ok()).unwrap_or(0);
        (1..=12).contains(&month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn march_2025() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 15, 0, 0).unwrap()
    }

    #[test]
    fn test_format_for_march_2025() {
        let generator = ProposalNumberGenerator::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let number = generator.generate_at(march_2025(), &mut rng);
            assert_eq!(number.len(), 13, "{number}");
            assert!(number.starts_with("QEN202503"), "{number}");
            assert!(generator.is_well_formed(&number));
        }
    }

    #[test]
    fn test_month_follows_business_timezone() {
        // 02:00 UTC on April 1st is still March 31st in São Paulo
        let now = Utc.with_ymd_and_hms(2025, 4, 1, 2, 0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let local = ProposalNumberGenerator::default().generate_at(now, &mut rng);
        assert!(local.starts_with("QEN202503"), "{local}");

        let utc = ProposalNumberGenerator::new("QEN", chrono_tz::UTC).generate_at(now, &mut rng);
        assert!(utc.starts_with("QEN202504"), "{utc}");
    }

    #[test]
    fn test_generate_unique_retries_collisions() {
        let generator = ProposalNumberGenerator::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut calls = 0;

        let number = generator
            .generate_unique_with(march_2025(), &mut rng, |_| {
                calls += 1;
                Ok(calls < 3)
            })
            .unwrap();

        assert_eq!(calls, 3);
        assert!(generator.is_well_formed(&number));
    }

    #[test]
    fn test_generate_unique_gives_up() {
        let generator = ProposalNumberGenerator::default().with_max_attempts(4);
        let mut rng = StdRng::seed_from_u64(3);

        let result = generator.generate_unique_with(march_2025(), &mut rng, |_| Ok(true));
        assert!(matches!(
            result,
            Err(ProposalNumberError::Exhausted { attempts: 4 })
        ));
    }

    #[test]
    fn test_generate_unique_propagates_lookup_failure() {
        let generator = ProposalNumberGenerator::default();
        let result = generator.generate_unique(|_| Err(anyhow::anyhow!("store offline")));
        assert!(matches!(result, Err(ProposalNumberError::Lookup { .. })));
    }

    #[test]
    fn test_well_formed_rejects_other_shapes() {
        let generator = ProposalNumberGenerator::default();
        assert!(generator.is_well_formed("QEN2025030042"));
        assert!(!generator.is_well_formed("QEN202503004"));
        assert!(!generator.is_well_formed("QEN2025130042"));
        assert!(!generator.is_well_formed("ABC2025030042"));
        assert!(!generator.is_well_formed("QEN20250300A2"));
    }
}
