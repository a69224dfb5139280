use crate::report::{Diagnostic, RemapReport};

/// Sheet listing every generated update command.
pub const COMMANDS_SHEET: &str = "Commands";
/// Sheet listing LDUs the mapping table did not cover.
pub const UNMATCHED_LDUS_SHEET: &str = "Unmatched LDUs";
/// Sheet listing teams the mapping table did not cover.
pub const UNMATCHED_TEAMS_SHEET: &str = "Unmatched Teams";
/// Sheet holding the found / mapped mailbox counts.
pub const SUMMARY_SHEET: &str = "Summary";

/// A table that will be materialised as an Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    fn new(sheet_name: &str, columns: &[&str]) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            columns: columns.iter().map(|column| column.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Character width of each column: the longest of its header and cells,
    /// plus padding, kept between 8 and 80.
    pub fn column_widths(&self) -> Vec<f64> {
        self.columns
            .iter()
            .enumerate()
            .map(|(col_idx, header)| {
                let longest = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(col_idx))
                    .map(|cell| cell.chars().count())
                    .fold(header.chars().count(), usize::max);
                (longest + 2).clamp(8, 80) as f64
            })
            .collect()
    }
}

/// Represents all tables required to materialise the audit workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}

impl WorkbookData {
    pub fn table(&self, sheet_name: &str) -> Option<&SheetTable> {
        self.tables
            .iter()
            .find(|table| table.sheet_name == sheet_name)
    }
}

/// Lays a remapping report out as one sheet per section.
pub fn build_audit_workbook(report: &RemapReport) -> WorkbookData {
    let mut commands = SheetTable::new(
        COMMANDS_SHEET,
        &["area", "ldu", "team", "mailbox", "command"],
    );
    for command in &report.commands {
        commands.rows.push(vec![
            command.area.clone(),
            command.ldu.clone(),
            command.team.clone().unwrap_or_default(),
            command.mailbox.clone(),
            command.to_string(),
        ]);
    }

    let mut unmatched_ldus = SheetTable::new(UNMATCHED_LDUS_SHEET, &["area", "ldu", "mailbox"]);
    let mut unmatched_teams =
        SheetTable::new(UNMATCHED_TEAMS_SHEET, &["area", "ldu", "team", "mailbox"]);
    for diagnostic in &report.diagnostics {
        match diagnostic {
            Diagnostic::UnmatchedLdu { ldu, mailbox } => unmatched_ldus.rows.push(vec![
                ldu.area.clone(),
                ldu.ldu.clone(),
                mailbox.clone().unwrap_or_default(),
            ]),
            Diagnostic::UnmatchedTeam {
                team_code,
                ldu,
                mailbox,
            } => unmatched_teams.rows.push(vec![
                ldu.area.clone(),
                ldu.ldu.clone(),
                team_code.clone(),
                mailbox.clone(),
            ]),
        }
    }

    let summary = &report.summary;
    let mut summary_table = SheetTable::new(SUMMARY_SHEET, &["level", "found", "mapped"]);
    summary_table.rows.push(vec![
        "LDU".to_string(),
        summary.ldu_mailboxes_found.to_string(),
        summary.ldu_mailboxes_mapped.to_string(),
    ]);
    summary_table.rows.push(vec![
        "Team".to_string(),
        summary.team_mailboxes_found.to_string(),
        summary.team_mailboxes_mapped.to_string(),
    ]);

    WorkbookData {
        tables: vec![commands, unmatched_ldus, unmatched_teams, summary_table],
    }
}
