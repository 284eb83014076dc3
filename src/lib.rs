//! tesmatch - Transcript end site (TES) overlap library.
//!
//! This library flags, for every transcript in one table, whether a
//! transcript in another table ends within a tolerance window on the same
//! chromosome and strand.
//!
//! # Features
//!
//! - Read CSV/TSV (with gzip support) and Excel transcript tables
//! - Infer or explicitly map the transcript, chrom, strand, start and end columns
//! - Normalize chromosome labels and derive the strand-aware TES
//! - Test both directions with a grouped binary-search index
//! - Write annotated tables and a summary as a workbook or TSV files
//!
//! # Example
//!
//! ```ignore
//! use tesmatch::columns::ColumnMapping;
//! use tesmatch::matcher::compare;
//! use tesmatch::normalize::normalize;
//! use tesmatch::parser::read_table;
//! use std::path::Path;
//!
//! let table_a = read_table(Path::new("A.csv"), None)?;
//! let table_b = read_table(Path::new("B.xlsx"), Some("transcripts"))?;
//! let a = normalize(&table_a, &ColumnMapping::infer(table_a.headers())?)?;
//! let b = normalize(&table_b, &ColumnMapping::infer(table_b.headers())?)?;
//!
//! let result = compare(&a, &b, 100);
//! println!("{} of A found in B", result.a_matched());
//! ```

pub mod columns;
pub mod config;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod types;

pub use columns::ColumnMapping;
pub use config::Config;
pub use error::ConfigError;
pub use matcher::{compare, Comparison, TesIndex, WindowIndex};
pub use normalize::{normalize, TranscriptSet};
pub use types::{CanonicalTranscript, LocusKey, RawRow, RawTable, RawValue, Role, Strand};
