//! Folds physical rows into logical postal-code records.
//!
//! The fixed-width source format cuts long street notes mid-row: an entry whose
//! street field opens a full-width parenthesis `（` without closing it carries on
//! in the following rows until a row brings the closing `）`. Those rows are
//! folded into the record that opened the note instead of producing records of
//! their own.

use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::record::LogicalRecord;
use super::rows::PhysicalRow;

pub const OPEN_NOTE: char = '（';
pub const CLOSE_NOTE: char = '）';

/// Whether the next row starts a new record or extends the last one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContinuationState {
    #[default]
    Normal,
    Continuing,
}

impl ContinuationState {
    /// State after a record has been freshly emitted with `kanji_street`.
    pub fn after_emit(kanji_street: &str) -> Self {
        if kanji_street.contains(OPEN_NOTE) && !kanji_street.contains(CLOSE_NOTE) {
            ContinuationState::Continuing
        } else {
            ContinuationState::Normal
        }
    }

    /// State after a continuation row was folded, leaving `kanji_street`.
    pub fn after_fold(kanji_street: &str) -> Self {
        if kanji_street.contains(CLOSE_NOTE) {
            ContinuationState::Normal
        } else {
            ContinuationState::Continuing
        }
    }
}

/// Counters describing one assembly run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AssemblyStats {
    pub physical_rows: usize,
    pub logical_records: usize,
    pub folded_rows: usize,
    /// Input ended while a note was still open.
    pub unterminated: bool,
}

#[derive(Debug, Default)]
pub struct Assembly {
    pub records: Vec<LogicalRecord>,
    pub stats: AssemblyStats,
}

/// Append a new record built from `row`; returns its index in `records`.
pub fn emit(records: &mut Vec<LogicalRecord>, row: &PhysicalRow) -> usize {
    records.push(LogicalRecord::from_row(row));
    records.len() - 1
}

/// Fold `row` into the record at `cursor`; returns the extended kanji street.
pub fn fold<'a>(records: &'a mut [LogicalRecord], cursor: usize, row: &PhysicalRow) -> &'a str {
    let record = &mut records[cursor];
    record.append_street(row);
    &record.kanji_street
}

/// Incremental assembler: feed rows in source order, then [`Assembler::finish`].
#[derive(Debug, Default)]
pub struct Assembler {
    records: Vec<LogicalRecord>,
    state: ContinuationState,
    cursor: Option<usize>,
    stats: AssemblyStats,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: &PhysicalRow) {
        self.stats.physical_rows += 1;

        // a Continuing state always has a cursor: only `emit` can enter it
        let cursor = match (self.state, self.cursor) {
            (ContinuationState::Continuing, Some(cursor)) => cursor,
            _ => {
                let cursor = emit(&mut self.records, row);
                self.cursor = Some(cursor);
                self.state = ContinuationState::after_emit(row.kanji_street());
                if self.state == ContinuationState::Continuing {
                    debug!(
                        postal_code = row.postal_code(),
                        street = row.kanji_street(),
                        "continuation start"
                    );
                }
                return;
            }
        };

        let street = fold(&mut self.records, cursor, row);
        self.stats.folded_rows += 1;
        self.state = ContinuationState::after_fold(street);
        if self.state == ContinuationState::Normal {
            debug!(
                postal_code = self.records[cursor].postal_code.as_str(),
                street = self.records[cursor].kanji_street.as_str(),
                "continuation end"
            );
        }
    }

    pub fn finish(mut self) -> Assembly {
        self.stats.logical_records = self.records.len();
        self.stats.unterminated = self.state == ContinuationState::Continuing;
        if let (true, Some(cursor)) = (self.stats.unterminated, self.cursor) {
            warn!(
                postal_code = self.records[cursor].postal_code.as_str(),
                street = self.records[cursor].kanji_street.as_str(),
                "input ended inside an open street note; keeping partial record"
            );
        }
        Assembly {
            records: self.records,
            stats: self.stats,
        }
    }
}

/// Fold the whole row sequence into logical records.
#[instrument(level = "info", skip_all, fields(rows = rows.len()))]
pub fn assemble(rows: &[PhysicalRow]) -> Assembly {
    let mut assembler = Assembler::new();
    for row in rows {
        assembler.push(row);
    }
    let assembly = assembler.finish();
    debug!(
        records = assembly.stats.logical_records,
        folded = assembly.stats.folded_rows,
        "assembled"
    );
    assembly
}
