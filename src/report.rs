//! Update commands, unmatched-entry diagnostics and mailbox counts derived
//! from a reconciled LDU list.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::model::{Ldu, LduKey};

/// Script invoked for every mailbox update unless overridden.
pub const DEFAULT_TOOL: &str = "./probation-teams.sh";

/// Printed in place of an absent LDU mailbox.
pub const NO_MAILBOX: &str = "(none)";

/// One invocation of the mailbox update tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateCommand {
    pub tool: String,
    pub environment: String,
    pub area: String,
    pub ldu: String,
    pub team: Option<String>,
    pub mailbox: String,
}

impl fmt::Display for UpdateCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -ns {} -pa {} -ldu {}",
            self.tool,
            shell_word(&self.environment),
            shell_word(&self.area),
            shell_word(&self.ldu)
        )?;
        if let Some(team) = &self.team {
            write!(f, " -team {}", shell_word(team))?;
        }
        write!(f, " -update {}", shell_word(&self.mailbox))
    }
}

/// Builds the LDU mailbox updates followed by the team mailbox updates.
///
/// Only matched LDUs with a mailbox and matched teams produce commands.
pub fn update_commands(remapped: &[Ldu], tool: &str, environment: &str) -> Vec<UpdateCommand> {
    let command = |ldu: &Ldu, team: Option<&str>, mailbox: &str| UpdateCommand {
        tool: tool.to_string(),
        environment: environment.to_string(),
        area: ldu.probation_area_code.clone(),
        ldu: ldu.ldu_code.clone(),
        team: team.map(str::to_string),
        mailbox: mailbox.to_string(),
    };

    let ldu_updates = remapped
        .iter()
        .filter(|ldu| ldu.matched)
        .filter_map(|ldu| ldu.mailbox.as_deref().map(|mailbox| command(ldu, None, mailbox)));

    let team_updates = remapped.iter().flat_map(|ldu| {
        ldu.teams
            .iter()
            .filter(|team| team.matched)
            .map(move |team| command(ldu, Some(team.team_code.as_str()), &team.mailbox))
    });

    ldu_updates.chain(team_updates).collect()
}

/// An entry the mapping table did not cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Diagnostic {
    UnmatchedLdu {
        ldu: LduKey,
        mailbox: Option<String>,
    },
    UnmatchedTeam {
        team_code: String,
        /// Old codes of the owning LDU.
        ldu: LduKey,
        mailbox: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnmatchedLdu { ldu, mailbox } => write!(
                f,
                "No match for LDU {ldu} {}",
                mailbox.as_deref().unwrap_or(NO_MAILBOX)
            ),
            Diagnostic::UnmatchedTeam {
                team_code,
                ldu,
                mailbox,
            } => write!(f, "No match for Team code {team_code} in {ldu} {mailbox}"),
        }
    }
}

/// Lists unmatched LDUs first, then unmatched teams, in output order.
pub fn diagnostics(remapped: &[Ldu]) -> Vec<Diagnostic> {
    let unmatched_ldus = remapped
        .iter()
        .filter(|ldu| !ldu.matched)
        .map(|ldu| Diagnostic::UnmatchedLdu {
            ldu: ldu.key(),
            mailbox: ldu.mailbox.clone(),
        });

    let unmatched_teams = remapped.iter().flat_map(|ldu| {
        ldu.teams
            .iter()
            .filter(|team| !team.matched)
            .map(move |team| Diagnostic::UnmatchedTeam {
                team_code: team.team_code.clone(),
                ldu: ldu.old_key(),
                mailbox: team.mailbox.clone(),
            })
    });

    unmatched_ldus.chain(unmatched_teams).collect()
}

/// Mailboxes found in the snapshot against mailboxes that will be updated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub ldu_mailboxes_found: usize,
    pub ldu_mailboxes_mapped: usize,
    pub team_mailboxes_found: usize,
    pub team_mailboxes_mapped: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Found {} LDU FMBs, mapped to {}",
            self.ldu_mailboxes_found, self.ldu_mailboxes_mapped
        )?;
        write!(
            f,
            "Found {} Team FMBs, mapped to {}",
            self.team_mailboxes_found, self.team_mailboxes_mapped
        )
    }
}

pub fn summarize(source: &[Ldu], remapped: &[Ldu]) -> Summary {
    Summary {
        ldu_mailboxes_found: source.iter().filter(|ldu| ldu.mailbox.is_some()).count(),
        ldu_mailboxes_mapped: remapped
            .iter()
            .filter(|ldu| ldu.matched && ldu.mailbox.is_some())
            .count(),
        team_mailboxes_found: source.iter().map(|ldu| ldu.teams.len()).sum(),
        team_mailboxes_mapped: remapped
            .iter()
            .flat_map(|ldu| &ldu.teams)
            .filter(|team| team.matched)
            .count(),
    }
}

/// Everything a remapping run reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemapReport {
    pub commands: Vec<UpdateCommand>,
    pub summary: Summary,
    pub diagnostics: Vec<Diagnostic>,
}

impl RemapReport {
    pub fn build(source: &[Ldu], remapped: &[Ldu], tool: &str, environment: &str) -> Self {
        Self {
            commands: update_commands(remapped, tool, environment),
            summary: summarize(source, remapped),
            diagnostics: diagnostics(remapped),
        }
    }
}

impl fmt::Display for RemapReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for command in &self.commands {
            writeln!(f, "{command}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.summary)?;
        writeln!(f)?;
        for diagnostic in &self.diagnostics {
            writeln!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

/// Single-quotes values that are empty or contain characters a POSIX shell
/// would interpret.
fn shell_word(value: &str) -> Cow<'_, str> {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || "@._+-/:=,%".contains(ch));
    if plain {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(format!("'{}'", value.replace('\'', r"'\''")))
    }
}

#[cfg(test)]
mod tests {
    use super::shell_word;

    #[test]
    fn shell_word_quotes_only_when_needed() {
        assert_eq!(shell_word("team.a@justice.gov.uk"), "team.a@justice.gov.uk");
        assert_eq!(shell_word(""), "''");
        assert_eq!(shell_word("a b"), "'a b'");
        assert_eq!(shell_word("o'brien@x"), r"'o'\''brien@x'");
    }
}
