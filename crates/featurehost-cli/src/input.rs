//! Loading input payloads from text and files.
//!
//! A single payload comes from JSON. Batches of payloads come from JSON
//! Lines (one payload per non-empty line) or CSV (one sequence per row).
//! The format is chosen by file extension.

use featurehost_payload::{validate_payload, Payload};
use std::path::{Path, PathBuf};

/// Recognized JSON extensions.
pub const JSON_EXTENSIONS: &[&str] = &["json"];

/// Recognized JSON Lines extensions.
pub const JSONL_EXTENSIONS: &[&str] = &["jsonl", "ndjson"];

/// Recognized CSV extensions.
pub const CSV_EXTENSIONS: &[&str] = &["csv"];

/// Identifies the format of a rows file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowsFormat {
    /// A single JSON array; each element is one payload.
    Json,
    /// One JSON payload per line.
    JsonLines,
    /// Comma-separated numbers, one payload per row.
    Csv,
}

impl RowsFormat {
    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, InputError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase());

        match extension.as_deref() {
            Some(ext) if JSON_EXTENSIONS.contains(&ext) => Ok(RowsFormat::Json),
            Some(ext) if JSONL_EXTENSIONS.contains(&ext) => Ok(RowsFormat::JsonLines),
            Some(ext) if CSV_EXTENSIONS.contains(&ext) => Ok(RowsFormat::Csv),
            _ => Err(InputError::UnknownExtension { extension }),
        }
    }
}

/// Errors that can occur while loading input.
#[derive(Debug)]
pub enum InputError {
    /// File could not be read.
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Unknown file extension.
    UnknownExtension { extension: Option<String> },
    /// Text is not a numeric payload.
    Parse { line: Option<usize>, message: String },
    /// Payload parsed but is not usable.
    Invalid { line: Option<usize>, message: String },
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::FileRead { path, source } => {
                write!(f, "failed to read file '{}': {}", path.display(), source)
            }
            InputError::UnknownExtension { extension } => match extension {
                Some(ext) => write!(
                    f,
                    "unknown file extension '.{}' (expected .json, .jsonl, .ndjson or .csv)",
                    ext
                ),
                None => write!(
                    f,
                    "file has no extension (expected .json, .jsonl, .ndjson or .csv)"
                ),
            },
            InputError::Parse { line, message } => match line {
                Some(line) => write!(f, "line {}: invalid payload: {}", line, message),
                None => write!(f, "invalid payload: {}", message),
            },
            InputError::Invalid { line, message } => match line {
                Some(line) => write!(f, "line {}: unusable payload: {}", line, message),
                None => write!(f, "unusable payload: {}", message),
            },
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InputError::FileRead { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn checked(payload: Payload, line: Option<usize>) -> Result<Payload, InputError> {
    validate_payload(&payload).map_err(|e| InputError::Invalid {
        line,
        message: e.to_string(),
    })?;
    Ok(payload)
}

fn read(path: &Path) -> Result<String, InputError> {
    std::fs::read_to_string(path).map_err(|e| InputError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Parses one payload from JSON text.
pub fn parse_payload(text: &str) -> Result<Payload, InputError> {
    let payload = Payload::from_json_str(text.trim()).map_err(|e| InputError::Parse {
        line: None,
        message: e.to_string(),
    })?;
    checked(payload, None)
}

/// Loads one payload from a JSON file.
pub fn load_payload(path: &Path) -> Result<Payload, InputError> {
    parse_payload(&read(path)?)
}

/// Loads a batch of payloads, dispatching by extension.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use featurehost_cli::input::load_rows;
///
/// let rows = load_rows(Path::new("features.csv")).unwrap();
/// println!("{} rows", rows.len());
/// ```
pub fn load_rows(path: &Path) -> Result<Vec<Payload>, InputError> {
    let format = RowsFormat::from_path(path)?;
    let content = read(path)?;
    parse_rows(&content, format)
}

/// Parses a batch of payloads from text in the given format.
pub fn parse_rows(content: &str, format: RowsFormat) -> Result<Vec<Payload>, InputError> {
    match format {
        RowsFormat::Json => match parse_payload(content)? {
            Payload::Seq(items) => Ok(items),
            scalar => Ok(vec![scalar]),
        },
        RowsFormat::JsonLines => parse_json_lines(content),
        RowsFormat::Csv => parse_csv(content),
    }
}

fn parse_json_lines(content: &str) -> Result<Vec<Payload>, InputError> {
    let mut rows = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let payload = Payload::from_json_str(line).map_err(|e| InputError::Parse {
            line: Some(line_no),
            message: e.to_string(),
        })?;
        rows.push(checked(payload, Some(line_no))?);
    }
    Ok(rows)
}

fn parse_cell(cell: &str) -> Option<Payload> {
    if let Ok(i) = cell.parse::<i64>() {
        return Some(Payload::Int(i));
    }
    cell.parse::<f64>().ok().map(Payload::Float)
}

fn parse_csv(content: &str) -> Result<Vec<Payload>, InputError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    let mut first = true;
    for record in reader.records() {
        let record = record.map_err(|e| InputError::Parse {
            line: e.position().map(|p| p.line() as usize),
            message: e.to_string(),
        })?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line_no = record.position().map(|p| p.line() as usize);
        let cells: Option<Vec<Payload>> = record.iter().map(parse_cell).collect();
        match cells {
            Some(cells) => rows.push(checked(Payload::Seq(cells), line_no)?),
            // A non-numeric first row is a header.
            None if first => {}
            None => {
                return Err(InputError::Parse {
                    line: line_no,
                    message: format!(
                        "non-numeric cell in '{}'",
                        record.iter().collect::<Vec<_>>().join(",")
                    ),
                })
            }
        }
        first = false;
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_payload() {
        assert_eq!(
            parse_payload(" [1, 2.5] \n").unwrap(),
            Payload::Seq(vec![Payload::Int(1), Payload::Float(2.5)])
        );
        assert!(matches!(
            parse_payload("[\"a\"]"),
            Err(InputError::Parse { line: None, .. })
        ));
    }

    #[test]
    fn test_rows_format_from_path() {
        assert_eq!(
            RowsFormat::from_path(Path::new("a.JSONL")).unwrap(),
            RowsFormat::JsonLines
        );
        assert_eq!(
            RowsFormat::from_path(Path::new("a.ndjson")).unwrap(),
            RowsFormat::JsonLines
        );
        assert_eq!(RowsFormat::from_path(Path::new("a.csv")).unwrap(), RowsFormat::Csv);
        assert_eq!(RowsFormat::from_path(Path::new("a.json")).unwrap(), RowsFormat::Json);
        assert!(RowsFormat::from_path(Path::new("a.txt")).is_err());
        assert!(RowsFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_json_lines_skip_blank() {
        let rows = parse_rows("[1, 2]\n\n[[1.0, 2.0], [3.0, 4.0]]\n", RowsFormat::JsonLines).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], Payload::from(vec![1i64, 2]));
    }

    #[test]
    fn test_json_lines_report_line() {
        let err = parse_rows("[1]\n[oops]\n", RowsFormat::JsonLines).unwrap_err();
        assert!(err.to_string().starts_with("line 2:"), "{}", err);
    }

    #[test]
    fn test_json_array_rows() {
        let rows = parse_rows("[[1], [2, 3]]", RowsFormat::Json).unwrap();
        assert_eq!(
            rows,
            vec![Payload::from(vec![1i64]), Payload::from(vec![2i64, 3])]
        );
    }

    #[test]
    fn test_csv_with_header() {
        let rows = parse_rows("a,b,c\n1,2,3\n4.5, 5 ,6\n", RowsFormat::Csv).unwrap();
        assert_eq!(
            rows,
            vec![
                Payload::from(vec![1i64, 2, 3]),
                Payload::Seq(vec![Payload::Float(4.5), Payload::Int(5), Payload::Int(6)]),
            ]
        );
    }

    #[test]
    fn test_csv_without_header() {
        let rows = parse_rows("1,2\n3,4\n", RowsFormat::Csv).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_csv_rejects_text_after_first_row() {
        let err = parse_rows("1,2\nx,4\n", RowsFormat::Csv).unwrap_err();
        assert!(matches!(err, InputError::Parse { line: Some(2), .. }));
    }

    #[test]
    fn test_csv_quoted_cells() {
        let rows = parse_rows(
            "\"width, cm\",\"height\"\r\n\"1\",\" 2.5 \"\r\n3,\"4\"\r\n",
            RowsFormat::Csv,
        )
        .unwrap();
        assert_eq!(
            rows,
            vec![
                Payload::Seq(vec![Payload::Int(1), Payload::Float(2.5)]),
                Payload::from(vec![3i64, 4]),
            ]
        );
    }

    #[test]
    fn test_csv_quoted_comma_in_data_is_one_cell() {
        let err = parse_rows("1,2\n\"3,4\",5\n", RowsFormat::Csv).unwrap_err();
        assert!(matches!(err, InputError::Parse { line: Some(2), .. }), "{}", err);
    }

    #[test]
    fn test_csv_rejects_nan() {
        let err = parse_rows("1,NaN\n", RowsFormat::Csv).unwrap_err();
        assert!(matches!(err, InputError::Invalid { line: Some(1), .. }));
    }

    #[test]
    fn test_load_rows_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rows.jsonl");
        std::fs::write(&path, "[1]\n[2]\n").unwrap();
        assert_eq!(load_rows(&path).unwrap().len(), 2);

        let missing = tmp.path().join("missing.csv");
        assert!(matches!(
            load_rows(&missing),
            Err(InputError::FileRead { .. })
        ));
    }
}
