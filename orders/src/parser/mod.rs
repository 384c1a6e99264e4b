//! Generic CSV reader with encoding and delimiter auto-detection.
//!
//! Produces raw string rows keyed by position. No sales-specific logic here;
//! typing and schema checks happen in [`crate::loader`].

use std::path::Path;

use crate::error::{LoadError, LoadResult};

/// One raw data row.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based line in the source.
    pub line: u64,
    /// One value per header, padded with empty strings.
    pub values: Vec<String>,
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Column headers
    pub headers: Vec<String>,
    /// Data rows
    pub rows: Vec<RawRow>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        // UTF-8 and anything unknown
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };
    match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text with an explicit delimiter.
///
/// # Example
/// ```ignore
/// use sales_orders::parser::parse_str;
///
/// let result = parse_str("name,age\nAlice,30\nBob,25", ',').unwrap();
///
/// assert_eq!(result.rows.len(), 2);
/// assert_eq!(result.rows[0].values, vec!["Alice", "30"]);
/// ```
pub fn parse_str(content: &str, delimiter: char) -> LoadResult<ParseResult> {
    parse_string_with_metadata(content, delimiter, "utf-8".to_string())
}

/// Parse CSV bytes with auto-detection of encoding and, unless given, delimiter.
pub fn parse_bytes(bytes: &[u8], delimiter: Option<char>) -> LoadResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));

    parse_string_with_metadata(&content, delimiter, encoding)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> LoadResult<ParseResult> {
    parse_bytes(bytes, None)
}

/// Parse a CSV file.
///
/// # Example
/// ```ignore
/// let result = parse_file("/path/to/sales.csv", None)?;
/// println!("Encoding: {}, Delimiter: '{}'", result.encoding, result.delimiter);
/// println!("Rows: {}", result.rows.len());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P, delimiter: Option<char>) -> LoadResult<ParseResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_bytes(&bytes, delimiter)
}

/// Parse CSV text with explicit delimiter and return metadata.
///
/// Short rows are padded with empty values; extra trailing fields are ignored.
/// Header names are trimmed, data values are returned as written.
pub fn parse_string_with_metadata(
    content: &str,
    delimiter: char,
    encoding: String,
) -> LoadResult<ParseResult> {
    if !delimiter.is_ascii() {
        return Err(LoadError::Parse {
            line: 1,
            message: format!("delimiter '{}' is not an ASCII character", delimiter),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(LoadError::EmptyFile);
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let values = (0..headers.len())
            .map(|i| record.get(i).unwrap_or("").to_string())
            .collect();

        rows.push(RawRow { line, values });
    }

    Ok(ParseResult {
        headers,
        rows,
        encoding,
        delimiter,
    })
}

fn csv_error(err: csv::Error) -> LoadError {
    LoadError::Parse {
        line: err.position().map(|p| p.line()).unwrap_or(0),
        message: err.to_string(),
    }
}
