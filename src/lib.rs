//! Builds a local DuckDB table of Japanese postal codes from the Shift_JIS
//! `KEN_ALL.CSV` distribution.

pub mod config;
pub mod duck;
pub mod encoding;
pub mod error;
pub mod pipeline;
pub mod process;

pub use config::{Config, DecodePolicy};
pub use error::{ErrorKind, LoadError, Result};
pub use pipeline::{run, LoadSummary};
pub use process::{LogicalRecord, PhysicalRow};
