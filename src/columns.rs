//! Column mapping resolution.
//!
//! Decides which table columns hold the transcript id, chromosome, strand,
//! start and end, either by matching headers against a list of likely names
//! or from explicit `role=column` entries.

use ahash::AHashMap;

use crate::error::ConfigError;
use crate::types::{RawTable, Role};

/// Likely header names per role, tried in order (case-insensitive).
pub const LIKELY_COLUMNS: [(Role, &[&str]); 5] = [
    (
        Role::Transcript,
        &["transcript", "transcript_id", "tx", "tx_id", "name", "id"],
    ),
    (Role::Chrom, &["chrom", "chromosome", "chr"]),
    (Role::Strand, &["strand", "str"]),
    (Role::Start, &["start", "tx_start", "tss", "begin"]),
    (Role::End, &["end", "tx_end", "stop", "finish"]),
];

/// Column names for each of the five transcript roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub transcript: String,
    pub chrom: String,
    pub strand: String,
    pub start: String,
    pub end: String,
}

impl ColumnMapping {
    /// Column name assigned to a role.
    pub fn column(&self, role: Role) -> &str {
        match role {
            Role::Transcript => &self.transcript,
            Role::Chrom => &self.chrom,
            Role::Strand => &self.strand,
            Role::Start => &self.start,
            Role::End => &self.end,
        }
    }

    /// Guess the mapping from table headers.
    pub fn infer(headers: &[String]) -> Result<Self, ConfigError> {
        // Later duplicates overwrite earlier ones, so the last header with a given lowercase form wins.
        let lower: AHashMap<String, &String> =
            headers.iter().map(|h| (h.to_lowercase(), h)).collect();

        let mut found: AHashMap<Role, String> = AHashMap::new();
        for (role, candidates) in LIKELY_COLUMNS {
            if let Some(column) = candidates.iter().find_map(|c| lower.get(*c)) {
                found.insert(role, (*column).clone());
            }
        }

        let missing: Vec<Role> = Role::ALL
            .into_iter()
            .filter(|r| !found.contains_key(r))
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Undetected {
                missing,
                available: headers.to_vec(),
            });
        }

        Self::from_found(found)
    }

    /// Build a mapping from `role=column` entries and check the columns exist.
    ///
    /// Each entry may itself hold several comma-separated pairs. Keys that are
    /// not a role are carried along unused, but their columns must still exist.
    pub fn from_entries<S: AsRef<str>>(entries: &[S], headers: &[String]) -> Result<Self, ConfigError> {
        let mut found: AHashMap<Role, String> = AHashMap::new();
        let mut extra: Vec<String> = Vec::new();

        for item in entries.iter().flat_map(|e| e.as_ref().split(',')) {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let (key, column) = item
                .split_once('=')
                .ok_or_else(|| ConfigError::BadEntry(item.to_string()))?;
            match key.trim().parse::<Role>() {
                Ok(role) => {
                    found.insert(role, column.trim().to_string());
                }
                Err(_) => extra.push(column.trim().to_string()),
            }
        }

        let missing: Vec<Role> = Role::ALL
            .into_iter()
            .filter(|r| !found.contains_key(r))
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingRoles { missing });
        }

        let roles = Role::ALL.iter().filter_map(|role| found.get(role));
        for column in roles.chain(&extra) {
            if !headers.contains(column) {
                return Err(ConfigError::UnknownColumn {
                    column: column.clone(),
                    available: headers.to_vec(),
                });
            }
        }

        Self::from_found(found)
    }

    /// Use explicit entries when given, otherwise infer from the table headers.
    pub fn resolve<S: AsRef<str>>(table: &RawTable, entries: Option<&[S]>) -> Result<Self, ConfigError> {
        match entries {
            Some(entries) => Self::from_entries(entries, table.headers()),
            None => Self::infer(table.headers()),
        }
    }

    fn from_found(mut found: AHashMap<Role, String>) -> Result<Self, ConfigError> {
        let mut take = |role: Role| {
            found
                .remove(&role)
                .ok_or(ConfigError::MissingRoles { missing: vec![role] })
        };
        Ok(ColumnMapping {
            transcript: take(Role::Transcript)?,
            chrom: take(Role::Chrom)?,
            strand: take(Role::Strand)?,
            start: take(Role::Start)?,
            end: take(Role::End)?,
        })
    }
}
