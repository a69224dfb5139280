use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::error::{RemapError, Result};
use crate::model::{Ldu, Team};

const LDUS_KEY: &str = "localDeliveryUnits";
const AREA_KEY: &str = "probationAreaCode";
const LDU_CODE_KEY: &str = "localDeliveryUnitCode";
const MAILBOX_KEY: &str = "functionalMailbox";
const TEAMS_KEY: &str = "probationTeams";

/// Reads and parses a snapshot file.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn read_snapshot(path: &Path) -> Result<Vec<Ldu>> {
    if !path.exists() {
        return Err(RemapError::MissingInput(path.to_path_buf()));
    }
    let source = fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&source)?;
    parse_snapshot(&document)
}

/// Extracts the LDUs of a snapshot document in document order.
///
/// LDU entries lacking an area or LDU code are skipped, as are teams without
/// a mailbox.
pub fn parse_snapshot(document: &Value) -> Result<Vec<Ldu>> {
    let root = expect_object(document, "snapshot root")?;
    let Some(entries) = root.get(LDUS_KEY) else {
        return Ok(Vec::new());
    };
    let entries = expect_object(entries, LDUS_KEY)?;

    let mut ldus = Vec::with_capacity(entries.len());
    for (id, entry) in entries {
        let entry = expect_object(entry, &format!("LDU '{id}'"))?;
        match parse_ldu(id, entry)? {
            Some(ldu) => ldus.push(ldu),
            None => debug!(ldu = %id, "skipping LDU without area or LDU code"),
        }
    }
    Ok(ldus)
}

fn parse_ldu(id: &str, entry: &Map<String, Value>) -> Result<Option<Ldu>> {
    let context = format!("LDU '{id}'");
    let area = optional_string(entry, AREA_KEY, &context)?;
    let code = optional_string(entry, LDU_CODE_KEY, &context)?;
    let (Some(area), Some(code)) = (area, code) else {
        return Ok(None);
    };

    let mailbox = optional_string(entry, MAILBOX_KEY, &context)?;
    let teams = match entry.get(TEAMS_KEY) {
        Some(teams) => parse_teams(expect_object(teams, &format!("{context} teams"))?, id)?,
        None => Vec::new(),
    };

    Ok(Some(Ldu::new(area, code, mailbox, teams)))
}

fn parse_teams(teams: &Map<String, Value>, ldu_id: &str) -> Result<Vec<Team>> {
    let mut parsed = Vec::with_capacity(teams.len());
    for (team_code, team) in teams {
        let context = format!("team '{team_code}' of LDU '{ldu_id}'");
        let team = expect_object(team, &context)?;
        if let Some(mailbox) = optional_string(team, MAILBOX_KEY, &context)? {
            parsed.push(Team::new(team_code.clone(), mailbox));
        }
    }
    Ok(parsed)
}

fn expect_object<'a>(value: &'a Value, context: &str) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        RemapError::InvalidSnapshot(format!("{context}: expected JSON object, found {value}"))
    })
}

/// A JSON `null` counts as absent.
fn optional_string(
    object: &Map<String, Value>,
    key: &str,
    context: &str,
) -> Result<Option<String>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(other) => Err(RemapError::InvalidSnapshot(format!(
            "{context}: expected string for '{key}', found {other}"
        ))),
    }
}
