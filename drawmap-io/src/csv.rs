//! Query and border CSV readers
//!
//! Both readers auto-detect the delimiter (comma, space, tab or semicolon) and
//! skip a leading header line when every cell of that line is non-numeric.
//!
//! - Query files hold one `start_x, start_y, end_x, end_y` row per query.
//!   Empty or non-numeric cells are read as missing (NaN) so the session can
//!   drop the row instead of failing the whole batch.
//! - Border files hold the ordered `x, y` pixels of a drawn border; every cell
//!   must be numeric.

use crate::error::IoError;
use drawmap_core::{PixelPoint, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Supported delimiters for CSV files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Space,
    Tab,
    Semicolon,
}

impl Delimiter {
    /// Get the character representation of the delimiter
    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Space => ' ',
            Delimiter::Tab => '\t',
            Delimiter::Semicolon => ';',
        }
    }

    /// Detect delimiter from a line of text
    pub fn detect_from_line(line: &str) -> Option<Self> {
        let line = line.trim();
        let counts = [
            (line.matches(',').count(), Delimiter::Comma),
            (line.matches('\t').count(), Delimiter::Tab),
            (line.matches(';').count(), Delimiter::Semicolon),
            (line.matches(' ').count(), Delimiter::Space),
        ];

        // Ties go to the first entry, so "1, 2" is comma separated
        counts
            .iter()
            .fold(None, |best: Option<(usize, Delimiter)>, &(count, delimiter)| {
                match best {
                    Some((best_count, _)) if best_count >= count => best,
                    _ if count > 0 => Some((count, delimiter)),
                    _ => best,
                }
            })
            .map(|(_, delimiter)| delimiter)
    }

    /// Split a line into trimmed cells
    pub fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            Delimiter::Space => line.split_whitespace().collect(),
            _ => line.split(self.as_char()).map(str::trim).collect(),
        }
    }
}

/// A header line has at least one cell and no numeric cells
fn is_header_line(cells: &[&str]) -> bool {
    let non_empty: Vec<&&str> = cells.iter().filter(|c| !c.is_empty()).collect();
    !non_empty.is_empty() && non_empty.iter().all(|c| c.parse::<f64>().is_err())
}

/// Non-empty lines of a reader with their 1-based line numbers
fn content_lines<R: BufRead>(reader: R) -> std::result::Result<Vec<(usize, String)>, IoError> {
    let mut lines = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if !line.trim().is_empty() {
            lines.push((idx + 1, line));
        }
    }
    Ok(lines)
}

/// Delimiter and data lines of a CSV stream
fn data_lines<R: BufRead>(
    reader: R,
) -> std::result::Result<(Delimiter, Vec<(usize, String)>), IoError> {
    let mut lines = content_lines(reader)?;
    let delimiter = lines
        .first()
        .and_then(|(_, line)| Delimiter::detect_from_line(line))
        .unwrap_or(Delimiter::Comma);

    if lines
        .first()
        .is_some_and(|(_, line)| is_header_line(&delimiter.split(line)))
    {
        lines.remove(0);
    }
    Ok((delimiter, lines))
}

/// Read batch query rows. Missing or non-numeric cells become NaN.
pub fn read_query_csv<R: BufRead>(reader: R) -> Result<Vec<[f64; 4]>> {
    let (delimiter, lines) = data_lines(reader)?;

    let mut rows = Vec::with_capacity(lines.len());
    for (line_no, line) in lines {
        let cells = delimiter.split(&line);
        if cells.len() > 4 {
            return Err(IoError::parse(
                line_no,
                format!("expected 4 columns, found {}", cells.len()),
            )
            .into());
        }

        let mut row = [f64::NAN; 4];
        for (slot, cell) in row.iter_mut().zip(&cells) {
            *slot = cell.parse().unwrap_or(f64::NAN);
        }
        rows.push(row);
    }

    debug!(rows = rows.len(), ?delimiter, "Read query rows");
    Ok(rows)
}

/// Read batch query rows from a file
pub fn read_query_csv_file<P: AsRef<Path>>(path: P) -> Result<Vec<[f64; 4]>> {
    read_query_csv(BufReader::new(File::open(path)?))
}

/// Read the ordered pixels of a drawn border
pub fn read_border_csv<R: BufRead>(reader: R) -> Result<Vec<PixelPoint>> {
    let (delimiter, lines) = data_lines(reader)?;

    let mut border = Vec::with_capacity(lines.len());
    for (line_no, line) in lines {
        let cells = delimiter.split(&line);
        if cells.len() != 2 {
            return Err(IoError::parse(
                line_no,
                format!("expected 2 columns, found {}", cells.len()),
            )
            .into());
        }

        let parse = |cell: &str| {
            cell.parse::<f64>()
                .map_err(|_| IoError::parse(line_no, format!("invalid coordinate {:?}", cell)))
        };
        border.push(PixelPoint::new(parse(cells[0])?, parse(cells[1])?));
    }

    debug!(pixels = border.len(), ?delimiter, "Read border pixels");
    Ok(border)
}

/// Read the ordered pixels of a drawn border from a file
pub fn read_border_csv_file<P: AsRef<Path>>(path: P) -> Result<Vec<PixelPoint>> {
    read_border_csv(BufReader::new(File::open(path)?))
}
