//! CLI entry point for tesmatch.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tesmatch::columns::ColumnMapping;
use tesmatch::config::{Config, DEFAULT_TOLERANCE};
use tesmatch::matcher::compare;
use tesmatch::normalize::{normalize, TranscriptSet};
use tesmatch::output::{write_results, Summary};
use tesmatch::parser::read_table;
use tesmatch::types::RawTable;

/// Find overlapping transcript 3' ends (TES) between two transcript tables.
///
/// Each transcript is flagged when a transcript in the other table has a TES
/// within the tolerance on the same chromosome and strand.
#[derive(Parser, Debug)]
#[command(name = "tesmatch")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV/TSV/Excel table with transcripts (A)
    file_a: PathBuf,

    /// CSV/TSV/Excel table with transcripts (B)
    file_b: PathBuf,

    /// ±bp tolerance around the TES
    #[arg(short = 't', long = "tolerance", default_value_t = DEFAULT_TOLERANCE, allow_negative_numbers = true)]
    tolerance: i64,

    /// Manual column map for A, e.g. transcript=tx,chrom=chr,strand=str,start=tx_start,end=tx_end
    #[arg(long = "map-a", num_args = 1..)]
    map_a: Option<Vec<String>>,

    /// Manual column map for B (same format as --map-a)
    #[arg(long = "map-b", num_args = 1..)]
    map_b: Option<Vec<String>>,

    /// Excel sheet name or index for A (default: first sheet)
    #[arg(long = "sheet-a")]
    sheet_a: Option<String>,

    /// Excel sheet name or index for B (default: first sheet)
    #[arg(long = "sheet-b")]
    sheet_b: Option<String>,

    /// Output workbook (.xlsx), or a directory for TSV files
    #[arg(short = 'o', long = "output", default_value = "tes_overlap_results.xlsx")]
    output: PathBuf,

    /// Number of worker threads (0 = auto-detect, 1 = sequential)
    #[arg(long = "threads", short = 'j', default_value = "0")]
    threads: usize,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tesmatch=debug,info")
    } else {
        EnvFilter::new("tesmatch=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Validate inputs
    for path in [&args.file_a, &args.file_b] {
        if !path.exists() {
            bail!("Input file not found: {}", path.display());
        }
    }

    // Build configuration
    let mut config = Config::new();
    config.set_tolerance(args.tolerance)?;
    config.threads = args.threads;

    info!("Reading table A: {}", args.file_a.display());
    let table_a = read_table(&args.file_a, args.sheet_a.as_deref())?;
    info!("Reading table B: {}", args.file_b.display());
    let table_b = read_table(&args.file_b, args.sheet_b.as_deref())?;

    // Resolve both mappings before any work so a bad map aborts the whole run
    let map_a = ColumnMapping::resolve(&table_a, args.map_a.as_deref())
        .context("Column mapping failed for file A")?;
    let map_b = ColumnMapping::resolve(&table_b, args.map_b.as_deref())
        .context("Column mapping failed for file B")?;

    let set_a = normalize_table("A", &table_a, &map_a)?;
    let set_b = normalize_table("B", &table_b, &map_b)?;

    let num_threads = config.num_threads();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .context("Failed to create thread pool")?;
    info!("Comparing TES with ±{} bp using {} threads", config.tolerance, num_threads);
    let comparison = pool.install(|| compare(&set_a, &set_b, config.tolerance));

    let summary = Summary::new(&comparison, &set_a, &set_b);
    for line in summary.lines() {
        println!("{}", line);
    }

    write_results(
        &args.output,
        &table_a,
        &table_b,
        &comparison,
        &summary,
        &config.found_label,
    )?;
    println!("Wrote results to: {}", args.output.display());

    Ok(())
}

fn normalize_table(label: &str, table: &RawTable, mapping: &ColumnMapping) -> Result<TranscriptSet> {
    let set = normalize(table, mapping)
        .with_context(|| format!("Column mapping failed for file {}", label))?;
    if set.dropped() > 0 {
        warn!(
            "File {}: {} of {} rows skipped (missing or invalid chrom, strand, start or end)",
            label,
            set.dropped(),
            set.total_rows
        );
    }
    info!("File {}: {} transcripts", label, set.len());
    Ok(set)
}
