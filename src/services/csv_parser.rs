//! Tabular file parsing for the import wizard
//!
//! Turns the raw bytes of an uploaded file into a [`ParsedTable`]: the header
//! row plus every data row, each row reshaped to exactly the header set.
//! The whole file is held in memory; the bytes are not kept after parsing.

use std::collections::HashSet;

use csv::ReaderBuilder;
use tracing::{debug, warn};

use crate::error::ParseError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Delimiters tried by auto-detection, in tie-break order
const CANDIDATE_DELIMITERS: &[u8] = b",;\t|";

// =============================================================================
// PARSED TABLE
// =============================================================================

/// Parsed file content: unique header names and fixed-shape rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    ragged_rows: Vec<usize>,
    delimiter: u8,
}

impl ParsedTable {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 1-based positions of data rows that had fewer or more fields than headers
    pub fn ragged_rows(&self) -> &[usize] {
        &self.ragged_rows
    }

    /// Delimiter the file was read with
    pub fn delimiter(&self) -> char {
        self.delimiter as char
    }

    pub fn has_header(&self, header: &str) -> bool {
        self.headers.iter().any(|h| h == header)
    }

    /// Row by 0-based index
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            headers: &self.headers,
            cells,
        })
    }

    /// Rows in file order
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |cells| Row {
            headers: &self.headers,
            cells,
        })
    }
}

/// A data row keyed by the table's header set
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    headers: &'a [String],
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Cell under `header`; empty for headers the table does not have
    pub fn get(&self, header: &str) -> &'a str {
        self.headers
            .iter()
            .position(|h| h == header)
            .and_then(|idx| self.cells.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// (header, value) pairs in header order
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter().map(String::as_str))
    }
}

// =============================================================================
// PARSER
// =============================================================================

/// CSV parser with optional forced delimiter
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvParser {
    delimiter: Option<u8>,
}

impl CsvParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `delimiter` instead of detecting it from the header line
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter: Some(delimiter),
        }
    }

    pub fn parse(&self, bytes: &[u8]) -> Result<ParsedTable, ParseError> {
        let (bytes, bom_len) = match bytes.strip_prefix(UTF8_BOM) {
            Some(rest) => (rest, UTF8_BOM.len()),
            None => (bytes, 0),
        };

        let text = std::str::from_utf8(bytes).map_err(|e| ParseError::InvalidEncoding {
            offset: bom_len + e.valid_up_to(),
        })?;

        let delimiter = self.delimiter.unwrap_or_else(|| detect_delimiter(text));
        check_quotes(text, delimiter)?;

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        let mut ragged_rows = Vec::new();

        for result in reader.records() {
            let record = result?;

            // Zero-length lines are skipped; blank-looking data lines like `,`
            // stay rows so they surface as failures
            let empty_line = record.len() == 1 && record[0].is_empty();
            let blank = record.iter().all(|v| v.trim().is_empty());
            if empty_line || (headers.is_none() && blank) {
                continue;
            }

            match &headers {
                None => {
                    headers = Some(unique_headers(record.iter().map(|h| h.trim())));
                }
                Some(headers) => {
                    let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
                    if cells.len() != headers.len() {
                        ragged_rows.push(rows.len() + 1);
                        cells.resize(headers.len(), String::new());
                    }
                    rows.push(cells);
                }
            }
        }

        let headers = headers.ok_or(ParseError::MissingHeader)?;

        if !ragged_rows.is_empty() {
            warn!(
                "{} row(s) do not match the header width of {} columns",
                ragged_rows.len(),
                headers.len()
            );
        }
        debug!(
            "Parsed {} columns, {} rows (delimiter {:?})",
            headers.len(),
            rows.len(),
            delimiter as char
        );

        Ok(ParsedTable {
            headers,
            rows,
            ragged_rows,
            delimiter,
        })
    }
}

/// Parse with delimiter auto-detection
pub fn parse_csv(bytes: &[u8]) -> Result<ParsedTable, ParseError> {
    CsvParser::new().parse(bytes)
}

/// Pick the candidate delimiter that occurs most often (outside quotes) on the
/// first non-blank line. Falls back to comma.
fn detect_delimiter(text: &str) -> u8 {
    let Some(line) = text.lines().find(|l| !l.trim().is_empty()) else {
        return b',';
    };

    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut in_quotes = false;
    for byte in line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(idx) = CANDIDATE_DELIMITERS.iter().position(|&d| d == byte) {
            counts[idx] += 1;
        }
    }

    let mut best = 0;
    for idx in 1..counts.len() {
        if counts[idx] > counts[best] {
            best = idx;
        }
    }
    if counts[best] == 0 {
        b','
    } else {
        CANDIDATE_DELIMITERS[best]
    }
}

/// Reject text whose quoted field is still open at end of input.
///
/// A quote only opens a quoted field at the start of a field; inside one a
/// doubled quote is an escaped literal.
fn check_quotes(text: &str, delimiter: u8) -> Result<(), ParseError> {
    let delimiter = delimiter as char;
    let mut line = 1;
    let mut open_line = 0;
    let mut in_quotes = false;
    let mut field_start = true;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                }
                '"' => in_quotes = false,
                '\n' => line += 1,
                _ => {}
            }
            continue;
        }

        match c {
            '"' if field_start => {
                in_quotes = true;
                open_line = line;
                field_start = false;
            }
            '\n' => {
                line += 1;
                field_start = true;
            }
            '\r' => field_start = true,
            c if c == delimiter => field_start = true,
            _ => field_start = false,
        }
    }

    if in_quotes {
        return Err(ParseError::UnbalancedQuotes { line: open_line });
    }
    Ok(())
}

/// Make header names unique: later duplicates get `_1`, `_2`, ... suffixes
fn unique_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let raw: Vec<&str> = raw.collect();
    let mut taken: HashSet<String> = HashSet::new();
    let mut headers = Vec::with_capacity(raw.len());

    for name in raw {
        let mut candidate = name.to_string();
        let mut suffix = 0;
        while taken.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}_{}", name, suffix);
        }
        taken.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}
