use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use tracing::{debug, instrument};

use crate::error::{RemapError, Result};
use crate::io::SheetRef;
use crate::model::{LduKey, TeamSpec};

/// Column positions in the remapping workbooks.
pub mod mapping_columns {
    pub const OLD_AREA: usize = 0;
    pub const NEW_AREA: usize = 1;
    pub const OLD_LDU: usize = 7;
    pub const NEW_LDU: usize = 8;
    pub const OLD_TEAM: usize = 14;
    pub const NEW_TEAM: usize = 15;
}

/// Column positions in the confirmed team mailbox workbooks.
pub mod mailbox_columns {
    pub const AREA: usize = 1;
    pub const LDU: usize = 4;
    pub const TEAM: usize = 8;
    pub const MAILBOX: usize = 10;
}

/// A team and its confirmed mailbox, as listed in a mailbox workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMailboxRow {
    pub ldu: LduKey,
    pub team_code: String,
    pub mailbox: String,
}

/// Reads the old → new team mapping rows from a remapping sheet.
#[instrument(level = "debug", skip_all, fields(sheet = %sheet))]
pub fn read_team_specs(sheet: &SheetRef) -> Result<Vec<TeamSpec>> {
    use mapping_columns::*;

    let specs = read_data_rows(sheet, |row| {
        TeamSpec::new(
            (&row.text(OLD_AREA), &row.text(OLD_LDU), &row.text(OLD_TEAM)),
            (&row.text(NEW_AREA), &row.text(NEW_LDU), &row.text(NEW_TEAM)),
        )
    })?;
    debug!(spec_count = specs.len(), "read mapping rows");
    Ok(specs)
}

/// Reads the area/LDU/team/mailbox rows from a mailbox sheet.
#[instrument(level = "debug", skip_all, fields(sheet = %sheet))]
pub fn read_team_mailboxes(sheet: &SheetRef) -> Result<Vec<TeamMailboxRow>> {
    use mailbox_columns::*;

    let rows = read_data_rows(sheet, |row| TeamMailboxRow {
        ldu: LduKey::new(row.text(AREA), row.text(LDU)),
        team_code: row.text(TEAM),
        mailbox: row.text(MAILBOX),
    })?;
    debug!(row_count = rows.len(), "read mailbox rows");
    Ok(rows)
}

/// A data row with cells addressed by absolute column index.
struct SheetRow<'a> {
    cells: &'a [DataType],
    first_column: usize,
}

impl SheetRow<'_> {
    fn cell(&self, column: usize) -> Option<&DataType> {
        column
            .checked_sub(self.first_column)
            .and_then(|offset| self.cells.get(offset))
    }

    fn text(&self, column: usize) -> String {
        cell_to_string(self.cell(column)).trim().to_string()
    }
}

/// Maps the rows below the header, stopping at the first row whose first
/// column is empty.
fn read_data_rows<T>(sheet: &SheetRef, map: impl Fn(&SheetRow<'_>) -> T) -> Result<Vec<T>> {
    let range = read_required_sheet(sheet)?;
    Ok(data_rows(&range).map(|row| map(&row)).collect())
}

fn data_rows(range: &Range<DataType>) -> impl Iterator<Item = SheetRow<'_>> {
    let first_column = range
        .start()
        .map(|(_, column)| column as usize)
        .unwrap_or(0);

    // The range begins at the first used row, which holds the header.
    range
        .rows()
        .skip(1)
        .map(move |cells| SheetRow {
            cells,
            first_column,
        })
        .take_while(|row| !row.text(0).is_empty())
}

fn read_required_sheet(sheet: &SheetRef) -> Result<Range<DataType>> {
    if !sheet.path.exists() {
        return Err(RemapError::MissingInput(sheet.path.clone()));
    }
    let mut workbook: Xlsx<_> = open_workbook(&sheet.path)?;
    let range_result = workbook.worksheet_range(&sheet.sheet).ok_or_else(|| {
        RemapError::InvalidWorkbook(format!(
            "missing sheet '{}' in {}",
            sheet.sheet,
            sheet.path.display()
        ))
    })?;
    let range = range_result.map_err(RemapError::from)?;
    Ok(range)
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
