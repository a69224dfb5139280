use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use fmb_remap::RemapError;
use fmb_remap::audit::{
    COMMANDS_SHEET, SUMMARY_SHEET, UNMATCHED_LDUS_SHEET, UNMATCHED_TEAMS_SHEET,
    build_audit_workbook,
};
use fmb_remap::io::SheetRef;
use fmb_remap::io::excel_read::{read_team_mailboxes, read_team_specs};
use fmb_remap::io::excel_write::write_workbook;
use fmb_remap::model::{Ldu, LduKey, Team, TeamSpec};
use fmb_remap::reconcile::{MatchPolicy, remap_ldus};
use fmb_remap::report::RemapReport;
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

/// Writes `(column, value)` cells per row; row 0 is the header.
fn write_fixture(path: &Path, sheet: &str, rows: &[Vec<(u16, &str)>]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).expect("sheet named");
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row {
            worksheet
                .write_string(row_idx as u32, *col_idx, *value)
                .expect("cell written");
        }
    }
    workbook.save(path).expect("fixture saved");
}

fn mapping_row<'a>(old: [&'a str; 3], new: [&'a str; 3]) -> Vec<(u16, &'a str)> {
    vec![
        (0, old[0]),
        (1, new[0]),
        (7, old[1]),
        (8, new[1]),
        (14, old[2]),
        (15, new[2]),
    ]
}

fn mailbox_row<'a>(
    area: &'a str,
    ldu: &'a str,
    team: &'a str,
    mailbox: &'a str,
) -> Vec<(u16, &'a str)> {
    vec![(0, "x"), (1, area), (4, ldu), (8, team), (10, mailbox)]
}

#[test]
fn mapping_rows_are_normalised_and_stop_at_first_blank_row() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("N54 v1.2.xlsx");
    write_fixture(
        &path,
        "N54 Team",
        &[
            mapping_row(["Old PA", "Old LDU", "Old Team"], ["New PA", "New LDU", "New Team"]),
            mapping_row([" n54 ", "abc", "t1"], ["N07", "xyz ", "T9"]),
            mapping_row(["N54", "ABC", "T2"], ["N08", "QRS", "T8"]),
            vec![(1, "N99"), (8, "IGNORED")],
            mapping_row(["N54", "ABC", "T3"], ["N08", "QRS", "T7"]),
        ],
    );

    let specs = read_team_specs(&SheetRef::new(&path, "N54 Team")).expect("specs read");

    assert_eq!(
        specs,
        vec![
            TeamSpec::new(("N54", "ABC", "T1"), ("N07", "XYZ", "T9")),
            TeamSpec::new(("N54", "ABC", "T2"), ("N08", "QRS", "T8")),
        ]
    );
}

#[test]
fn header_below_blank_leading_row_is_not_read_as_data() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("offset.xlsx");
    write_fixture(
        &path,
        "Confirmed NE NPS FMBs",
        &[
            Vec::new(),
            mailbox_row("Area", "LDU", "Team", "FMB"),
            mailbox_row("N54", "ABC", "T1", "a@b"),
        ],
    );

    let rows = read_team_mailboxes(&SheetRef::new(&path, "Confirmed NE NPS FMBs"))
        .expect("mailbox rows read");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].ldu, LduKey::new("N54", "ABC"));
    assert_eq!(rows[0].team_code, "T1");
    assert_eq!(rows[0].mailbox, "a@b");
}

#[test]
fn missing_cells_read_as_empty_codes() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("partial.xlsx");
    write_fixture(
        &path,
        "Team",
        &[
            mapping_row(["Old PA", "Old LDU", "Old Team"], ["New PA", "New LDU", "New Team"]),
            vec![(0, "N54"), (7, "ABC"), (14, "T1")],
        ],
    );

    let specs = read_team_specs(&SheetRef::new(&path, "Team")).expect("specs read");

    assert_eq!(
        specs,
        vec![TeamSpec::new(("N54", "ABC", "T1"), ("", "", ""))]
    );
}

#[test]
fn mailbox_rows_are_read_from_their_columns() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("mailboxes.xlsx");
    write_fixture(
        &path,
        "Confirmed NE CRC FMBs",
        &[
            mailbox_row("Area", "LDU", "Team", "FMB"),
            mailbox_row("N02", "L1", "T1", " t1@justice.gov.uk "),
            mailbox_row("N02", "L1", "T2", ""),
        ],
    );

    let rows = read_team_mailboxes(&SheetRef::new(&path, "Confirmed NE CRC FMBs"))
        .expect("mailbox rows read");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].ldu, LduKey::new("N02", "L1"));
    assert_eq!(rows[0].team_code, "T1");
    assert_eq!(rows[0].mailbox, "t1@justice.gov.uk");
    assert_eq!(rows[1].mailbox, "");
}

#[test]
fn missing_sheet_and_file_are_reported() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("mapping.xlsx");
    write_fixture(&path, "Present", &[vec![(0, "header")]]);

    assert!(matches!(
        read_team_specs(&SheetRef::new(&path, "Absent")),
        Err(RemapError::InvalidWorkbook(_))
    ));
    assert!(matches!(
        read_team_specs(&SheetRef::new(temp_dir.path().join("nope.xlsx"), "Absent")),
        Err(RemapError::MissingInput(_))
    ));
}

#[test]
fn sheet_refs_split_on_last_hash() {
    let sheet: SheetRef = "data/N54 v1.2.xlsx#N54 Team".parse().expect("sheet ref parsed");
    assert_eq!(sheet, SheetRef::new("data/N54 v1.2.xlsx", "N54 Team"));

    assert!(matches!(
        "no-sheet.xlsx".parse::<SheetRef>(),
        Err(RemapError::InvalidSheetRef(_))
    ));
    assert!(matches!(
        "book.xlsx#".parse::<SheetRef>(),
        Err(RemapError::InvalidSheetRef(_))
    ));
}

#[test]
fn audit_workbook_lists_commands_and_unmatched_entries() {
    let source = vec![
        Ldu::new(
            "N54",
            "ABC",
            None,
            vec![Team::new("T1", "t1@x"), Team::new("T3", "t3@x")],
        ),
        Ldu::new("N54", "OLD", Some("old@x".to_string()), Vec::new()),
    ];
    let specs = vec![TeamSpec::new(("N54", "ABC", "T1"), ("N07", "XYZ", "T9"))];
    let remapped = remap_ldus(&source, &specs, MatchPolicy::FirstMatch).expect("remapped");
    let report = RemapReport::build(&source, &remapped, "./probation-teams.sh", "dev");

    let workbook = build_audit_workbook(&report);
    let commands = workbook.table(COMMANDS_SHEET).expect("commands table");
    assert_eq!(
        commands.rows,
        vec![vec![
            "N07".to_string(),
            "XYZ".to_string(),
            "T9".to_string(),
            "t1@x".to_string(),
            "./probation-teams.sh -ns dev -pa N07 -ldu XYZ -team T9 -update t1@x".to_string(),
        ]]
    );
    let unmatched_teams = workbook
        .table(UNMATCHED_TEAMS_SHEET)
        .expect("unmatched teams table");
    assert_eq!(unmatched_teams.rows[0], vec!["N54", "ABC", "T3", "t3@x"]);

    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("audit.xlsx");
    write_workbook(&path, &workbook).expect("audit written");

    let mut written: Xlsx<_> = open_workbook(&path).expect("audit opened");
    let ldus = written
        .worksheet_range(UNMATCHED_LDUS_SHEET)
        .expect("unmatched sheet present")
        .expect("unmatched sheet read");
    let row: Vec<String> = ldus
        .rows()
        .nth(1)
        .expect("data row")
        .iter()
        .map(DataType::to_string)
        .collect();
    assert_eq!(row, vec!["N54", "OLD", "old@x"]);

    let summary = written
        .worksheet_range(SUMMARY_SHEET)
        .expect("summary sheet present")
        .expect("summary sheet read");
    assert_eq!(summary.get_size(), (3, 3));

    let empty_ldus = build_audit_workbook(&RemapReport::build(&[], &[], "./t.sh", "dev"));
    let empty_path = temp_dir.path().join("empty.xlsx");
    write_workbook(&empty_path, &empty_ldus).expect("audit without rows written");
}

#[test]
fn audit_columns_are_sized_to_their_longest_value() {
    let mailbox = "a.rather.long.mailbox@justice.gov.uk";
    let source = vec![Ldu::new("N54", "OLD", Some(mailbox.to_string()), Vec::new())];
    let remapped = remap_ldus(&source, &[], MatchPolicy::FirstMatch).expect("remapped");
    let report = RemapReport::build(&source, &remapped, "./probation-teams.sh", "dev");

    let workbook = build_audit_workbook(&report);
    let unmatched = workbook
        .table(UNMATCHED_LDUS_SHEET)
        .expect("unmatched LDU table");

    // Short headers are widened to the minimum; the mailbox gets two spare characters.
    assert_eq!(unmatched.column_widths(), vec![8.0, 8.0, 38.0]);
}
