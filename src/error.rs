//! Errors raised while resolving which columns hold transcript fields.
//!
//! Row-level problems are not errors; see [`crate::normalize::RowRejection`].

use crate::types::Role;

/// A column mapping could not be resolved. Aborts the run before any output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "could not auto-detect columns for: {}. Found columns: {}. \
         Rename your columns or pass an explicit map like \
         transcript=tx_id,chrom=chr,strand=str,start=tx_start,end=tx_end",
        join_roles(.missing),
        .available.join(", ")
    )]
    Undetected {
        missing: Vec<Role>,
        available: Vec<String>,
    },
    #[error("column map is missing: {}", join_roles(.missing))]
    MissingRoles { missing: Vec<Role> },
    #[error("bad column map entry '{0}': use role=column_name")]
    BadEntry(String),
    #[error("column map refers to column '{column}' which is not in the table. Existing: {}", .available.join(", "))]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
