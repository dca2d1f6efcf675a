// src/bin/verify.rs

use anyhow::{Context, Result};
use kenall_loader::{duck, encoding, process, Config};
use std::fs;

fn main() -> Result<()> {
    let config = Config::default();
    println!("current dir = {:?}\n", std::env::current_dir()?);

    // 1) Re-derive the expected record count from the source file
    let raw = fs::read(&config.source_path)
        .with_context(|| format!("Failed to read '{}'", config.source_path.display()))?;
    let text = encoding::decode_legacy(&raw)
        .with_context(|| format!("Failed to decode '{}'", config.source_path.display()))?;
    let rows = process::parse_rows(&text)
        .with_context(|| format!("Failed to parse '{}'", config.source_path.display()))?;
    let stats = process::assemble(&rows).stats;

    // 2) Count what actually landed in the database
    if !config.database_path.exists() {
        anyhow::bail!("Database not found at '{}'", config.database_path.display());
    }
    let conn = duck::open_disk_db(&config.database_path)
        .with_context(|| format!("Failed to open '{}'", config.database_path.display()))?;
    let stored = duck::count_records(&conn).context("Failed to count stored records")?;
    let has_index = duck::index_exists(&conn).context("Failed to inspect indexes")?;

    // 3) Print summary table
    let delta = stored as isize - stats.logical_records as isize;
    println!("{: <25} {:>15} {:>15}", "Stage", "Count", "Delta vs db");
    println!("{:-<55}", "");
    println!(
        "{: <25} {:>15} {:>15}",
        "source rows",
        stats.physical_rows,
        stored as isize - stats.physical_rows as isize
    );
    println!("{: <25} {:>15} {:>15}", "folded rows", stats.folded_rows, "");
    println!("{: <25} {:>15} {:>15}", "logical records", stats.logical_records, delta);
    println!("{: <25} {:>15} {:>15}", "database rows", stored, 0);
    println!("{: <25} {:>15}", "composite index", if has_index { "present" } else { "MISSING" });
    if stats.unterminated {
        println!("\nnote: source ends inside an open street note");
    }

    if delta != 0 || !has_index {
        anyhow::bail!(
            "database does not match source: {} stored vs {} expected, index {}",
            stored,
            stats.logical_records,
            if has_index { "present" } else { "missing" }
        );
    }
    println!("\nok");
    Ok(())
}
