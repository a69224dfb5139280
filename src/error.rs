use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, RemapError>;

/// Error type covering the failures that can abort a remapping run.
///
/// Unmatched LDUs and teams are not errors; they are carried as data on the
/// reconciled records and reported alongside the generated commands.
#[derive(Debug, Error)]
pub enum RemapError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a workbook lacks a requested sheet.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the JSON snapshot does not have the expected shape.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Raised when a `PATH#SHEET` argument cannot be split.
    #[error("invalid sheet reference '{0}', expected PATH#SHEET")]
    InvalidSheetRef(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised under the strict policy when specs sharing a new area disagree
    /// on the new LDU code.
    #[error(
        "specs for {area}/{ldu} moving to area {new_area} disagree on the new LDU code: {first} vs {other}"
    )]
    InconsistentMapping {
        area: String,
        ldu: String,
        new_area: String,
        first: String,
        other: String,
    },

    /// Raised under the strict policy when more than one spec covers a team.
    #[error("team {team} in {area}/{ldu} is covered by {count} mapping rows")]
    AmbiguousTeam {
        area: String,
        ldu: String,
        team: String,
        count: usize,
    },

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
