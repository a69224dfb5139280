use std::fs;
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::audit::build_audit_workbook;
use crate::error::Result;
use crate::io::SheetRef;
use crate::io::excel_read::{self, TeamMailboxRow};
use crate::io::excel_write;
use crate::io::snapshot;
use crate::model::{Ldu, TeamSpec};
use crate::reconcile::{self, MatchPolicy};
use crate::report::{DEFAULT_TOOL, RemapReport};

/// Settings for a remapping run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapConfig {
    /// Namespace passed to the update tool.
    pub environment: String,
    /// Update tool invoked by each command.
    pub tool: String,
    pub policy: MatchPolicy,
}

impl Default for RemapConfig {
    fn default() -> Self {
        Self {
            environment: "dev".to_string(),
            tool: DEFAULT_TOOL.to_string(),
            policy: MatchPolicy::default(),
        }
    }
}

/// Inputs and results of a remapping run.
#[derive(Debug, Clone)]
pub struct RemapOutcome {
    pub source: Vec<Ldu>,
    pub remapped: Vec<Ldu>,
    pub report: RemapReport,
}

/// Reads the mapping rows of every sheet, in argument order.
#[instrument(level = "info", skip_all, fields(sheet_count = sheets.len()))]
pub fn load_team_specs(sheets: &[SheetRef]) -> Result<Vec<TeamSpec>> {
    let mut specs = Vec::new();
    for sheet in sheets {
        specs.extend(excel_read::read_team_specs(sheet)?);
    }
    info!(spec_count = specs.len(), "loaded mapping rows");
    Ok(specs)
}

/// Remaps the LDUs of an in-memory snapshot.
pub fn remap_snapshot(
    source: Vec<Ldu>,
    specs: &[TeamSpec],
    config: &RemapConfig,
) -> Result<RemapOutcome> {
    let remapped = reconcile::remap_ldus(&source, specs, config.policy)?;
    let report = RemapReport::build(&source, &remapped, &config.tool, &config.environment);
    info!(
        commands = report.commands.len(),
        unmatched = report.diagnostics.len(),
        "remapping complete"
    );
    Ok(RemapOutcome {
        source,
        remapped,
        report,
    })
}

/// Reads the mapping sheets and the snapshot, then remaps the snapshot.
#[instrument(
    level = "info",
    skip_all,
    fields(snapshot = %snapshot_path.display(), env = %config.environment)
)]
pub fn remap(
    mappings: &[SheetRef],
    snapshot_path: &Path,
    config: &RemapConfig,
) -> Result<RemapOutcome> {
    let specs = load_team_specs(mappings)?;
    let source = snapshot::read_snapshot(snapshot_path)?;
    info!(ldu_count = source.len(), "parsed LDUs from snapshot");
    remap_snapshot(source, &specs, config)
}

/// Writes the reconciled LDUs as pretty-printed JSON.
#[instrument(level = "debug", skip(remapped), fields(output = %output.display()))]
pub fn write_plan(remapped: &[Ldu], output: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(remapped)?;
    fs::write(output, json_string)?;
    Ok(())
}

/// Writes the report as an xlsx workbook.
#[instrument(level = "debug", skip(report), fields(output = %output.display()))]
pub fn write_audit(report: &RemapReport, output: &Path) -> Result<()> {
    let workbook = build_audit_workbook(report);
    debug!(sheet_count = workbook.tables.len(), "workbook constructed");
    excel_write::write_workbook(output, &workbook)
}

/// Reads mailbox rows sheet by sheet.
#[instrument(level = "info", skip_all, fields(sheet_count = sheets.len()))]
pub fn load_mailbox_sheets(sheets: &[SheetRef]) -> Result<Vec<(SheetRef, Vec<TeamMailboxRow>)>> {
    let mut loaded = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let rows = excel_read::read_team_mailboxes(sheet)?;
        info!(sheet = %sheet, row_count = rows.len(), "loaded mailbox rows");
        loaded.push((sheet.clone(), rows));
    }
    Ok(loaded)
}
