//! Parser for tab-separated rating files.
//!
//! Format of `u.data`, `u1.base`, `u1.test`, ...:
//! `userId \t itemId \t rating \t timestamp`
//!
//! Only the first three columns are kept. A line that does not have exactly
//! four columns is skipped without an error; a four-column line whose
//! numbers do not parse is reported as [`DataLoadError::ParseError`].

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Number of tab-separated columns in a rating line
const COLUMNS: usize = 4;

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    Ok(BufReader::new(file))
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse a rating file from disk
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    let reader = open(path)?;
    parse_ratings_from_reader(reader, &file_label(path))
}

/// Parse ratings from any buffered reader
///
/// `file` is only used in error messages.
pub fn parse_ratings_from_reader<R: BufRead>(reader: R, file: &str) -> Result<Vec<Rating>> {
    let mut ratings = Vec::new();
    let mut skipped = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        match parse_line(&line, idx + 1, file)? {
            Some(rating) => ratings.push(rating),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("Skipped {} malformed lines in {}", skipped, file);
    }
    Ok(ratings)
}

/// Parse one line; `Ok(None)` means the line has the wrong shape and is skipped
fn parse_line(line: &str, line_no: usize, file: &str) -> Result<Option<Rating>> {
    let fields: Vec<&str> = line.trim().split('\t').collect();
    if fields.len() != COLUMNS {
        return Ok(None);
    }

    let parse_err = |reason: String| DataLoadError::ParseError {
        file: file.to_string(),
        line: line_no,
        reason,
    };

    let user_id = fields[0]
        .trim()
        .parse()
        .map_err(|e| parse_err(format!("Invalid userId: {}", e)))?;
    let item_id = fields[1]
        .trim()
        .parse()
        .map_err(|e| parse_err(format!("Invalid itemId: {}", e)))?;
    let score = fields[2]
        .trim()
        .parse()
        .map_err(|e| parse_err(format!("Invalid rating: {}", e)))?;

    Ok(Some(Rating {
        user_id,
        item_id,
        score,
    }))
}

/// Embedding table sizes covering every id in a rating file
///
/// Returns `(max user id + 1, max item id + 1)` as [`IdBounds`].
pub fn max_id(path: &Path) -> Result<IdBounds> {
    let reader = open(path)?;
    let file = file_label(path);
    let mut bounds = IdBounds::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(rating) = parse_line(&line, idx + 1, &file)? {
            bounds = bounds.including(&rating);
        }
    }
    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_valid_lines() {
        let data = "196\t242\t3\t881250949\n186\t302\t3\t891717742\n22\t377\t1\t878887116\n";
        let ratings = parse_ratings_from_reader(Cursor::new(data), "u.data").unwrap();

        assert_eq!(ratings.len(), 3);
        assert_eq!(ratings[0], Rating::new(196, 242, 3.0));
        assert_eq!(ratings[2], Rating::new(22, 377, 1.0));
    }

    #[test]
    fn test_wrong_column_count_is_skipped() {
        let data = "1\t2\t3\t4\n1\t2\t3\n\n5\t6\t4.5\t7\t8\n9\t10\t2\t0\n";
        let ratings = parse_ratings_from_reader(Cursor::new(data), "u.data").unwrap();

        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings[1], Rating::new(9, 10, 2.0));
    }

    #[test]
    fn test_bad_number_is_an_error() {
        let data = "1\t2\t3\t4\nabc\t2\t3\t4\n";
        let err = parse_ratings_from_reader(Cursor::new(data), "u.data").unwrap_err();

        match err {
            DataLoadError::ParseError { file, line, .. } => {
                assert_eq!(file, "u.data");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = parse_ratings(Path::new("does/not/exist.base")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }

    #[test]
    fn test_max_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("u.data");
        std::fs::write(&path, "3\t7\t5\t0\n10\t1\t4\t0\nbroken line\n2\t9\t1\t0\n").unwrap();

        let bounds = max_id(&path).unwrap();
        assert_eq!(bounds, IdBounds::new(11, 10));
    }
}
