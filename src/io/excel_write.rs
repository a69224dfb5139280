use std::path::Path;

use rust_xlsxwriter::{Format, Table, Workbook, Worksheet};
use tracing::debug;

use crate::audit::{SheetTable, WorkbookData};
use crate::error::Result;

/// Writes the audit tables to the given path, one worksheet per table with a
/// bold frozen header and columns sized to their contents.
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let header_format = Format::new().set_bold();

    for table in &workbook.tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;
        write_table(worksheet, table, &header_format)?;
        debug!(sheet = %table.sheet_name, rows = table.rows.len(), "sheet written");
    }

    workbook_writer.save(path)?;
    Ok(())
}

fn write_table(
    worksheet: &mut Worksheet,
    table: &SheetTable,
    header_format: &Format,
) -> Result<()> {
    for (col_idx, header) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, header, header_format)?;
    }
    for (row_idx, row) in table.rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            worksheet.write_string((row_idx + 1) as u32, col_idx as u16, cell)?;
        }
    }
    for (col_idx, width) in table.column_widths().into_iter().enumerate() {
        worksheet.set_column_width(col_idx as u16, width)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    // A table needs at least one data row.
    if !table.rows.is_empty() {
        let col_end = (table.columns.len() as u16).saturating_sub(1);
        let mut excel_table = Table::new();
        excel_table.set_autofilter(true);
        worksheet.add_table(0, 0, table.rows.len() as u32, col_end, &excel_table)?;
    }
    Ok(())
}
