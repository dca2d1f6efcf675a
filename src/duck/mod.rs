// src/duck/mod.rs
use duckdb::{params, Connection};
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::error::{LoadError, Result};
use crate::process::LogicalRecord;

pub const TABLE: &str = "pc";
pub const INDEX: &str = "index1";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS pc (
    postal_code TEXT,
    h_prefecture TEXT,
    h_city_town TEXT,
    h_street TEXT,
    k_prefecture TEXT,
    k_city_town TEXT,
    k_street TEXT
);";

// Lookup index only; duplicates are allowed.
const CREATE_INDEX: &str = "CREATE INDEX IF NOT EXISTS index1 ON pc (
    postal_code,
    h_prefecture,
    h_city_town,
    h_street,
    k_prefecture,
    k_city_town,
    k_street
);";

/// Open a DuckDB database on disk at `path`, creating the file if it doesn't exist.
pub fn open_disk_db<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Ok(Connection::open(path)?)
}

/// Open a DuckDB in-memory database
pub fn open_mem_db() -> Result<Connection> {
    Ok(Connection::open_in_memory()?)
}

/// Create the `pc` table and its composite index. Safe to run repeatedly.
pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLE)?;
    conn.execute_batch(CREATE_INDEX)?;
    Ok(())
}

/// Append every record in order, calling `on_progress(done, total)` as each row
/// is handed to the appender. Rows only become durable at the final flush; if
/// that fails the error is returned and the reported progress is void.
/// Returns the number of rows written.
pub fn insert_records<F>(conn: &Connection, records: &[LogicalRecord], mut on_progress: F) -> Result<usize>
where
    F: FnMut(usize, usize),
{
    let total = records.len();
    let mut appender = conn.appender(TABLE)?;
    for (i, rec) in records.iter().enumerate() {
        appender.append_row(params![
            rec.postal_code,
            rec.kana_prefecture,
            rec.kana_city_town,
            rec.kana_street,
            rec.kanji_prefecture,
            rec.kanji_city_town,
            rec.kanji_street,
        ])?;
        on_progress(i + 1, total);
    }
    appender.flush()?;
    Ok(total)
}

/// Reclaim free space and fold the WAL into the database file.
pub fn compact(conn: &Connection) -> Result<()> {
    conn.execute_batch("VACUUM; CHECKPOINT;")?;
    Ok(())
}

pub fn close(conn: Connection) -> Result<()> {
    conn.close().map_err(|(_, e)| LoadError::Storage(e))
}

/// Schema, inserts, compaction and close against the database file at `path`.
#[instrument(level = "info", skip(records, on_progress), fields(path = %path.as_ref().display(), records = records.len()))]
pub fn load_records<P, F>(path: P, records: &[LogicalRecord], on_progress: F) -> Result<usize>
where
    P: AsRef<Path>,
    F: FnMut(usize, usize),
{
    let conn = open_disk_db(&path)?;
    create_schema(&conn)?;
    info!("begin database insert");

    let inserted = insert_records(&conn, records, on_progress)?;
    compact(&conn)?;
    close(conn)?;

    info!(inserted, "end database insert");
    Ok(inserted)
}

pub fn count_records(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM pc;", [], |r| r.get(0))?)
}

pub fn index_exists(conn: &Connection) -> Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM duckdb_indexes() WHERE table_name = ? AND index_name = ?;",
        params![TABLE, INDEX],
        |r| r.get(0),
    )?;
    Ok(n > 0)
}

/// Read the table back in insertion order.
pub fn read_records(conn: &Connection) -> Result<Vec<LogicalRecord>> {
    let mut stmt = conn.prepare(
        "SELECT postal_code, h_prefecture, h_city_town, h_street, k_prefecture, k_city_town, k_street
         FROM pc ORDER BY rowid;",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(LogicalRecord {
            postal_code: r.get(0)?,
            kana_prefecture: r.get(1)?,
            kana_city_town: r.get(2)?,
            kana_street: r.get(3)?,
            kanji_prefecture: r.get(4)?,
            kanji_city_town: r.get(5)?,
            kanji_street: r.get(6)?,
        })
    })?;
    let records = rows.collect::<std::result::Result<Vec<_>, _>>()?;
    debug!(records = records.len(), "read back records");
    Ok(records)
}
