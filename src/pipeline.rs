use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use tracing::{error, info, instrument, trace};

use crate::config::{Config, DecodePolicy};
use crate::error::{LoadError, Result};
use crate::process::{assemble, parse_rows, AssemblyStats};
use crate::{duck, encoding};

/// Records are reported at `info` every this many inserts.
const PROGRESS_EVERY: usize = 10_000;

/// What one run did, logged as a single JSON line when it finishes.
#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    pub source: String,
    pub intermediate: String,
    pub database: String,
    /// Set when the decode failed and [`DecodePolicy::Continue`] let the run proceed.
    pub decode_error: Option<String>,
    pub assembly: AssemblyStats,
    pub inserted: usize,
    pub processing_start: DateTime<Utc>,
    pub processing_end: DateTime<Utc>,
}

/// Default progress observer: one `trace` event per record, `info` periodically.
pub fn log_progress(done: usize, total: usize) {
    trace!(done, total, "insert");
    if done % PROGRESS_EVERY == 0 || done == total {
        info!("insert loop count: {} / {}", done, total);
    }
}

/// Normalize, parse, assemble and load, strictly in that order.
#[instrument(level = "info", skip_all)]
pub fn run(config: &Config) -> Result<LoadSummary> {
    let processing_start = Utc::now();

    // ─── 1) legacy → canonical text ─────────────────────────────────
    let decode_error = match encoding::normalize_file(&config.source_path, &config.intermediate_path) {
        Ok(bytes) => {
            info!(bytes, "converted source to UTF-8");
            None
        }
        Err(e) => match config.on_decode_error {
            DecodePolicy::Halt => {
                error!("encoding conversion failed: {}", e);
                return Err(e);
            }
            DecodePolicy::Continue => {
                error!("encoding conversion failed, continuing with existing intermediate file: {}", e);
                Some(e.to_string())
            }
        },
    };

    // ─── 2) canonical text → rows ───────────────────────────────────
    let text = fs::read_to_string(&config.intermediate_path)
        .map_err(|e| LoadError::io(&config.intermediate_path, e))?;
    let rows = parse_rows(&text)?;
    drop(text);
    info!(rows = rows.len(), "parsed source rows");

    // ─── 3) rows → logical records ──────────────────────────────────
    let assembly = assemble(&rows);
    drop(rows);
    info!(
        records = assembly.stats.logical_records,
        folded = assembly.stats.folded_rows,
        "assembled logical records"
    );

    // ─── 4) records → database ──────────────────────────────────────
    let inserted = duck::load_records(&config.database_path, &assembly.records, log_progress)?;

    Ok(LoadSummary {
        source: config.source_path.display().to_string(),
        intermediate: config.intermediate_path.display().to_string(),
        database: config.database_path.display().to_string(),
        decode_error,
        assembly: assembly.stats,
        inserted,
        processing_start,
        processing_end: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::process::rows::tests::source_line;
    use anyhow::Result;
    use encoding_rs::SHIFT_JIS;
    use tempfile::tempdir;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,kenall_loader=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn write_source(config: &Config, lines: &[String]) -> Result<()> {
        let text = lines.concat();
        let (bytes, _, had_errors) = SHIFT_JIS.encode(&text);
        assert!(!had_errors);
        fs::write(&config.source_path, &bytes)?;
        Ok(())
    }

    #[test]
    fn end_to_end_load() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let config = Config::in_dir(dir.path());
        write_source(
            &config,
            &[
                source_line("1000000", ["ﾄｳｷｮｳﾄ", "ﾁﾖﾀﾞｸ", "ｲｶﾆｹｲｻｲｶﾞﾅｲﾊﾞｱｲ"], ["東京都", "千代田区", "以下に掲載がない場合"]),
                source_line("0600001", ["ﾎｯｶｲﾄﾞｳ", "ｻｯﾎﾟﾛｼﾁｭｳｵｳｸ", "ｷﾀ1ｼﾞｮｳﾆｼ(1-19ﾁｮｳﾒ"], ["北海道", "札幌市中央区", "北一条西（１～１９丁目、"]),
                source_line("0600001", ["ﾎｯｶｲﾄﾞｳ", "ｻｯﾎﾟﾛｼﾁｭｳｵｳｸ", ")"], ["北海道", "札幌市中央区", "西土地区）"]),
                source_line("1010021", ["ﾄｳｷｮｳﾄ", "ﾁﾖﾀﾞｸ", "ｿﾄｶﾝﾀﾞ"], ["東京都", "千代田区", "外神田"]),
            ],
        )?;

        let summary = run(&config)?;
        assert_eq!(summary.assembly.physical_rows, 4);
        assert_eq!(summary.assembly.logical_records, 3);
        assert_eq!(summary.inserted, 3);
        assert!(summary.decode_error.is_none());
        assert!(config.intermediate_path.exists());

        let conn = duck::open_disk_db(&config.database_path)?;
        let records = duck::read_records(&conn)?;
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].kana_street, "いかにけいさいがないばあい");
        assert_eq!(records[1].kanji_street, "北一条西（１～１９丁目、西土地区）");
        assert_eq!(records[1].kana_street, "きた1じょうにし(1-19ちょうめ)");
        assert_eq!(records[2].postal_code, "1010021");

        let json = serde_json::to_string(&summary)?;
        assert!(json.contains("\"inserted\":3"));
        Ok(())
    }

    #[test]
    fn decode_failure_halts_by_default() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let config = Config::in_dir(dir.path());
        fs::write(&config.source_path, [b'1', 0xFF])?;

        let err = run(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(!config.database_path.exists());
        Ok(())
    }

    #[test]
    fn continue_policy_uses_existing_intermediate() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let config = Config {
            on_decode_error: DecodePolicy::Continue,
            ..Config::in_dir(dir.path())
        };
        fs::write(&config.source_path, [b'1', 0xFF])?;
        fs::write(
            &config.intermediate_path,
            source_line("1000001", ["ﾄｳｷｮｳﾄ", "ﾁﾖﾀﾞｸ", "ﾁﾖﾀﾞ"], ["東京都", "千代田区", "千代田"]),
        )?;

        let summary = run(&config)?;
        assert!(summary.decode_error.is_some());
        assert_eq!(summary.inserted, 1);
        Ok(())
    }

    #[test]
    fn continue_policy_without_intermediate_fails_on_read() -> Result<()> {
        let dir = tempdir()?;
        let config = Config {
            on_decode_error: DecodePolicy::Continue,
            ..Config::in_dir(dir.path())
        };
        fs::write(&config.source_path, [0xFD])?;

        let err = run(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        Ok(())
    }
}
