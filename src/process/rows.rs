use csv::ReaderBuilder;
use std::io::Read;
use tracing::{debug, instrument};

use crate::error::{LoadError, Result};

/// Number of positional fields on every source line.
pub const SOURCE_FIELD_COUNT: usize = 15;

// Positional layout of the consumed fields.
pub const POSTAL_CODE: usize = 2;
pub const KANA_PREFECTURE: usize = 3;
pub const KANA_CITY_TOWN: usize = 4;
pub const KANA_STREET: usize = 5;
pub const KANJI_PREFECTURE: usize = 6;
pub const KANJI_CITY_TOWN: usize = 7;
pub const KANJI_STREET: usize = 8;

/// One line of the source table, fields in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalRow {
    fields: Vec<String>,
}

impl PhysicalRow {
    /// Wrap already-split fields. Fails unless exactly [`SOURCE_FIELD_COUNT`] are given.
    pub fn new(record: u64, fields: Vec<String>) -> Result<Self> {
        if fields.len() != SOURCE_FIELD_COUNT {
            return Err(LoadError::FieldCount {
                record,
                expected: SOURCE_FIELD_COUNT,
                found: fields.len(),
            });
        }
        Ok(Self { fields })
    }

    pub fn field(&self, idx: usize) -> &str {
        &self.fields[idx]
    }

    pub fn postal_code(&self) -> &str {
        self.field(POSTAL_CODE)
    }

    pub fn kana_street(&self) -> &str {
        self.field(KANA_STREET)
    }

    pub fn kanji_street(&self) -> &str {
        self.field(KANJI_STREET)
    }
}

/// Parse headerless comma-delimited text into rows, in input order.
pub fn parse_rows(text: &str) -> Result<Vec<PhysicalRow>> {
    parse_rows_from_reader(text.as_bytes())
}

/// Reader form of [`parse_rows`]. Any malformed record rejects the whole input.
#[instrument(level = "info", skip_all)]
pub fn parse_rows_from_reader<R: Read>(reader: R) -> Result<Vec<PhysicalRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // field count is checked per row below
        .from_reader(reader);

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record_no = idx as u64 + 1;
        let record = result.map_err(|source| LoadError::Parse {
            record: record_no,
            source,
        })?;
        // no source field contains these; seeing one means the quoting broke
        if let Some((field, value)) = record
            .iter()
            .enumerate()
            .find(|(_, v)| v.contains(['"', '\r', '\n']))
        {
            return Err(LoadError::MalformedField {
                record: record_no,
                field,
                value: value.to_string(),
            });
        }
        let fields: Vec<String> = record.iter().map(str::to_string).collect();
        rows.push(PhysicalRow::new(record_no, fields)?);
    }

    debug!(rows = rows.len(), "parsed physical rows");
    Ok(rows)
}
