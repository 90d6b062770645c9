//! Loading the per-image translation table.
//!
//! The table is a CSV file with one header row followed by one row per
//! image. Only the first three fields of a row are read, as X, Y and Z.
//! Rows that cannot be read that way are skipped and loading carries on.
//! Quotes never span lines; a field wrapped in quotes is read without them.

use csv::{ByteRecord, ReaderBuilder, Trim};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::common::TranslationVector;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("could not read translation table {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read translation table: {0}")]
    Csv(#[from] csv::Error),
}

/// Reads every valid row of the translation table at `path`, in file order.
pub fn load_translations(path: &Path) -> Result<Vec<TranslationVector>, TranslationError> {
    let bytes = fs::read(path).map_err(|source| TranslationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let translations = parse_translations(&bytes)?;
    debug!(
        "Read {} translations from {}",
        translations.len(),
        path.display()
    );
    Ok(translations)
}

/// Parses table contents. The first row is always treated as a header.
pub fn parse_translations(bytes: &[u8]) -> Result<Vec<TranslationVector>, TranslationError> {
    // spreadsheet exports often start with a byte order mark
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(bytes);

    let mut translations = Vec::new();
    for record in reader.byte_records() {
        let record = match record {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
            Err(e) => {
                debug!("Skipping unreadable translation row: {}", e);
                continue;
            }
        };
        match parse_row(&record) {
            Some(translation) => translations.push(translation),
            None => debug!(
                "Skipping translation row on line {}",
                record.position().map_or(0, |p| p.line())
            ),
        }
    }
    Ok(translations)
}

fn parse_row(record: &ByteRecord) -> Option<TranslationVector> {
    if record.len() < 3 {
        return None;
    }
    let field = |i: usize| -> Option<f64> {
        std::str::from_utf8(record.get(i)?)
            .ok()?
            .trim()
            .trim_matches('"')
            .parse()
            .ok()
    };
    Some(TranslationVector::new(field(0)?, field(1)?, field(2)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(text: &str) -> Vec<TranslationVector> {
        parse_translations(text.as_bytes()).unwrap()
    }

    #[test]
    fn header_is_skipped_and_rows_kept_in_order() {
        let table = "X,Y,Z\n1.0,2.0,3.0\n-4.5,0,6e-1\n";
        assert_eq!(
            parse(table),
            vec![
                TranslationVector::new(1.0, 2.0, 3.0),
                TranslationVector::new(-4.5, 0.0, 0.6),
            ]
        );
    }

    #[test]
    fn numeric_first_row_is_still_a_header() {
        assert_eq!(
            parse("9,9,9\n1,2,3\n"),
            vec![TranslationVector::new(1.0, 2.0, 3.0)]
        );
    }

    #[test]
    fn malformed_rows_are_dropped_without_stopping() {
        let table = "X,Y,Z\nabc,2.0,3.0\n1.0,2.0\n7,8,9\n";
        assert_eq!(parse(table), vec![TranslationVector::new(7.0, 8.0, 9.0)]);
    }

    #[test]
    fn extra_columns_are_ignored() {
        let table = "X,Y,Z,Frame,Note\n1,2,3,17,ok\n4,5,6\n";
        assert_eq!(
            parse(table),
            vec![
                TranslationVector::new(1.0, 2.0, 3.0),
                TranslationVector::new(4.0, 5.0, 6.0),
            ]
        );
    }

    #[test]
    fn spreadsheet_quirks_are_tolerated() {
        let table = "\u{feff}X,Y,Z\r\n 1.5 , 2.5 ,3.5\r\n\r\n\"4\",5,6\r\n";
        assert_eq!(
            parse(table),
            vec![
                TranslationVector::new(1.5, 2.5, 3.5),
                TranslationVector::new(4.0, 5.0, 6.0),
            ]
        );
    }

    #[test]
    fn stray_quote_only_costs_its_own_row() {
        let table = "X,Y,Z\n\"abc,2.0,3.0\n4,5,6\n7,8,9\n";
        assert_eq!(
            parse(table),
            vec![
                TranslationVector::new(4.0, 5.0, 6.0),
                TranslationVector::new(7.0, 8.0, 9.0),
            ]
        );
    }

    #[test]
    fn quoted_header_does_not_swallow_the_table() {
        let table = "\"X,Y,Z\n1,2,3\n\"4\",\"5\",6\n";
        assert_eq!(
            parse(table),
            vec![
                TranslationVector::new(1.0, 2.0, 3.0),
                TranslationVector::new(4.0, 5.0, 6.0),
            ]
        );
    }

    #[test]
    fn non_utf8_row_is_dropped() {
        let mut bytes = b"X,Y,Z\n".to_vec();
        bytes.extend_from_slice(b"\xff\xfe,1,2\n");
        bytes.extend_from_slice(b"1,2,3\n");
        assert_eq!(
            parse_translations(&bytes).unwrap(),
            vec![TranslationVector::new(1.0, 2.0, 3.0)]
        );
    }

    #[test]
    fn header_only_and_empty_tables_give_nothing() {
        assert!(parse("X,Y,Z\n").is_empty());
        assert!(parse("").is_empty());
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Transforms.csv");
        fs::write(&path, "X,Y,Z\n0,0,1\n").unwrap();
        assert_eq!(
            load_translations(&path).unwrap(),
            vec![TranslationVector::new(0.0, 0.0, 1.0)]
        );
    }

    #[test]
    fn missing_table_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_translations(&dir.path().join("Transforms.csv")).unwrap_err();
        assert!(matches!(err, TranslationError::Io { .. }));
    }
}
