//! Reports over confirmed team mailbox sheets, used to sanity check the
//! spreadsheets before a remapping run.

use std::collections::HashSet;
use std::fmt;

use crate::io::excel_read::TeamMailboxRow;
use crate::model::LduKey;

/// Shown in place of a blank mailbox.
pub const MISSING_MAILBOX: &str = "MISSING";

/// How many teams of an LDU share one mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxFrequency {
    /// Lowercased mailbox; empty when the teams have none.
    pub mailbox: String,
    pub teams: Vec<String>,
}

impl MailboxFrequency {
    pub fn count(&self) -> usize {
        self.teams.len()
    }
}

/// The distinct mailboxes of one LDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LduMailboxes {
    pub ldu: LduKey,
    pub mailboxes: Vec<MailboxFrequency>,
}

impl fmt::Display for LduMailboxes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", self.ldu.area, self.ldu.ldu)?;
        for frequency in &self.mailboxes {
            let mailbox = if frequency.mailbox.trim().is_empty() {
                MISSING_MAILBOX
            } else {
                frequency.mailbox.as_str()
            };
            writeln!(f, "\t'{mailbox}': {}", frequency.count())?;
        }
        Ok(())
    }
}

/// Groups rows by LDU, then by case-insensitive mailbox, keeping first-seen
/// order at both levels.
pub fn mailbox_frequencies(rows: &[TeamMailboxRow]) -> Vec<LduMailboxes> {
    let mut grouped: Vec<LduMailboxes> = Vec::new();

    for row in rows {
        let index = match grouped.iter().position(|entry| entry.ldu == row.ldu) {
            Some(index) => index,
            None => {
                grouped.push(LduMailboxes {
                    ldu: row.ldu.clone(),
                    mailboxes: Vec::new(),
                });
                grouped.len() - 1
            }
        };

        let mailbox = row.mailbox.to_lowercase();
        let mailboxes = &mut grouped[index].mailboxes;
        match mailboxes.iter_mut().find(|entry| entry.mailbox == mailbox) {
            Some(entry) => entry.teams.push(row.team_code.clone()),
            None => mailboxes.push(MailboxFrequency {
                mailbox,
                teams: vec![row.team_code.clone()],
            }),
        }
    }

    grouped
}

/// Distinct area/LDU pairs in first-seen order.
pub fn active_ldus<'a>(rows: impl IntoIterator<Item = &'a TeamMailboxRow>) -> Vec<LduKey> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(row.ldu.clone()))
        .map(|row| row.ldu.clone())
        .collect()
}

/// Renders LDUs as a knex seed for the `active_local_delivery_units` table.
pub fn knex_insert(ldus: &[LduKey]) -> String {
    let mut script = String::from("knex('active_local_delivery_units').insert([\n");
    for ldu in ldus {
        script.push_str(&format!(
            "{{ldu_code: '{}', probation_area_code: '{}'}}, \n",
            ldu.ldu, ldu.area
        ));
    }
    script.push_str("])");
    script
}

/// Area/LDU pairs whose LDU code already appeared under an earlier pair in
/// the same sheet.
pub fn duplicate_ldu_codes(rows: &[TeamMailboxRow]) -> Vec<LduKey> {
    let mut codes = HashSet::new();
    active_ldus(rows)
        .into_iter()
        .filter(|ldu| !codes.insert(ldu.ldu.clone()))
        .collect()
}
