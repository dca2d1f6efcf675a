use std::path::PathBuf;

/// What the orchestrator does when the legacy decode fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Abort the run with the decode error.
    #[default]
    Halt,
    /// Log the failure and keep going with whatever intermediate file is on disk.
    Continue,
}

/// Fixed file locations for a run. There is no CLI or environment surface;
/// `Config::default()` is what the binary uses.
#[derive(Clone, Debug)]
pub struct Config {
    pub source_path: PathBuf,
    pub intermediate_path: PathBuf,
    pub database_path: PathBuf,
    pub on_decode_error: DecodePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("KEN_ALL.CSV"),
            intermediate_path: PathBuf::from("KEN_ALL_UTF8.CSV"),
            database_path: PathBuf::from("dt.duckdb"),
            on_decode_error: DecodePolicy::Halt,
        }
    }
}

impl Config {
    /// Same file names, rooted under `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let defaults = Self::default();
        Self {
            source_path: dir.join(defaults.source_path),
            intermediate_path: dir.join(defaults.intermediate_path),
            database_path: dir.join(defaults.database_path),
            on_decode_error: defaults.on_decode_error,
        }
    }
}
