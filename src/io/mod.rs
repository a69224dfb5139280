pub mod excel_read;
pub mod excel_write;
pub mod snapshot;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::RemapError;

/// A worksheet inside a workbook, written on the command line as `PATH#SHEET`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRef {
    pub path: PathBuf,
    pub sheet: String,
}

impl SheetRef {
    pub fn new(path: impl Into<PathBuf>, sheet: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.into(),
        }
    }
}

impl FromStr for SheetRef {
    type Err = RemapError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.rsplit_once('#') {
            Some((path, sheet)) if !path.is_empty() && !sheet.is_empty() => {
                Ok(Self::new(path, sheet))
            }
            _ => Err(RemapError::InvalidSheetRef(raw.to_string())),
        }
    }
}

impl fmt::Display for SheetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.path.display(), self.sheet)
    }
}
