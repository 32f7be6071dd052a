use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the usage dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A source file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single CSV row could not be decoded (e.g. wrong field count).
    #[error("Malformed row at line {line} of {path}: {source}")]
    MalformedRow {
        path: PathBuf,
        line: u64,
        #[source]
        source: csv::Error,
    },

    /// No events could be parsed from any of the source files.
    #[error("No valid CSV data found in {0}")]
    NoData(PathBuf),

    /// The requested export format is neither `csv` nor `json`.
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// An export was requested while the store holds no events.
    #[error("No data available for export")]
    EmptyStore,

    /// Query parameters supplied by the caller were rejected.
    #[error("Invalid filter parameters: {0}")]
    InvalidFilter(String),

    /// A CSV document could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON document could not be parsed or produced.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = DashboardError::FileRead {
            path: PathBuf::from("/data/events.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/data/events.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_no_data() {
        let err = DashboardError::NoData(PathBuf::from("/empty/dir"));
        assert_eq!(err.to_string(), "No valid CSV data found in /empty/dir");
    }

    #[test]
    fn test_error_display_unsupported_format() {
        let err = DashboardError::UnsupportedFormat("xml".to_string());
        assert_eq!(err.to_string(), "Unsupported export format: xml");
    }

    #[test]
    fn test_error_display_empty_store() {
        assert_eq!(
            DashboardError::EmptyStore.to_string(),
            "No data available for export"
        );
    }

    #[test]
    fn test_error_display_invalid_filter() {
        let err = DashboardError::InvalidFilter("offset must not be negative".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid filter parameters: offset must not be negative"
        );
    }

    #[test]
    fn test_error_display_malformed_row() {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader("a,b\n1,2,3\n".as_bytes());
        let csv_err = reader
            .records()
            .next()
            .expect("one record")
            .expect_err("unequal lengths");
        let err = DashboardError::MalformedRow {
            path: PathBuf::from("events.csv"),
            line: 2,
            source: csv_err,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Malformed row at line 2 of events.csv"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: DashboardError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: DashboardError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
