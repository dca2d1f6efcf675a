// src/process/mod.rs
pub mod assemble;
pub mod kana;
pub mod record;
pub mod rows;

pub use assemble::{assemble, Assembler, Assembly, AssemblyStats, ContinuationState};
pub use record::LogicalRecord;
pub use rows::{parse_rows, parse_rows_from_reader, PhysicalRow, SOURCE_FIELD_COUNT};
