//! Board-file grammar (spec.md §6):
//!
//! ```text
//! ROWSxCOLS <LF>
//! LABEL_1 <LF>
//! ...
//! LABEL_{ROWS*COLS} <LF>
//! <LF>
//! ```
//!
//! `CRLF` is tolerated and normalized to `LF`. Any deviation is a
//! [`GameError::ParseError`] (board files are fatal to parse at startup —
//! spec.md §7's authoritative error table assigns malformed board files to
//! `parse-error`, not `invalid-input`, even though §6's prose is looser).

use crate::card::is_valid_label;
use scramble_core::GameError;
use scramble_core::GameResult;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;

/// Parses a board file at `path` into `(rows, cols, labels)`.
pub fn parse_path(path: impl AsRef<Path>) -> GameResult<(usize, usize, Vec<String>)> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| GameError::parse_error(format!("cannot open board file {}: {e}", path.display())))?;
    parse_reader(file)
}

/// Parses a board from any `Read` stream (used directly by tests, and by
/// `parse_path` once the file is opened).
pub fn parse_reader(reader: impl Read) -> GameResult<(usize, usize, Vec<String>)> {
    let buffered = BufReader::new(reader);
    let mut lines = Vec::new();
    for (i, line) in buffered.lines().enumerate() {
        let line = line.map_err(|e| GameError::parse_error(format!("error reading line {}: {e}", i + 1)))?;
        let normalized = line.strip_suffix('\r').unwrap_or(&line).to_string();
        lines.push(normalized);
    }

    if lines.is_empty() {
        return Err(GameError::parse_error("board file is empty"));
    }

    let header = &lines[0];
    let (rows_str, cols_str) = header
        .split_once('x')
        .ok_or_else(|| GameError::parse_error(format!("line 1: header must be ROWSxCOLS, got {:?}", header)))?;
    let rows: usize = rows_str
        .parse()
        .map_err(|_| GameError::parse_error(format!("line 1: invalid row count {:?}", rows_str)))?;
    let cols: usize = cols_str
        .parse()
        .map_err(|_| GameError::parse_error(format!("line 1: invalid col count {:?}", cols_str)))?;
    if rows == 0 || cols == 0 {
        return Err(GameError::parse_error("line 1: rows and cols must be positive"));
    }

    let expected_total_lines = rows
        .checked_mul(cols)
        .and_then(|n| n.checked_add(2))
        .ok_or_else(|| GameError::parse_error("line 1: board dimensions overflow"))?;
    if lines.len() != expected_total_lines {
        return Err(GameError::parse_error(format!(
            "expected {expected_total_lines} lines ({rows}x{cols} header + labels + trailing blank), got {}",
            lines.len()
        )));
    }

    let trailing = &lines[lines.len() - 1];
    if !trailing.is_empty() {
        return Err(GameError::parse_error(format!(
            "line {}: expected a trailing blank line",
            lines.len()
        )));
    }

    let mut labels = Vec::with_capacity(rows * cols);
    for (i, line) in lines[1..lines.len() - 1].iter().enumerate() {
        if !is_valid_label(line) {
            return Err(GameError::parse_error(format!("line {}: invalid card label {:?}", i + 2, line)));
        }
        labels.push(line.clone());
    }

    Ok((rows, cols, labels))
}
