use std::fmt;

use serde::{Deserialize, Serialize};

/// A probation area / local delivery unit code pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LduKey {
    pub area: String,
    pub ldu: String,
}

impl LduKey {
    pub fn new(area: impl Into<String>, ldu: impl Into<String>) -> Self {
        Self {
            area: area.into(),
            ldu: ldu.into(),
        }
    }
}

impl fmt::Display for LduKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.area, self.ldu)
    }
}

/// One row of the remapping table: an old area/LDU/team triple and the triple
/// it moves to.
///
/// Codes are trimmed and uppercased on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSpec {
    pub old_area: String,
    pub old_ldu: String,
    pub old_team: String,
    pub new_area: String,
    pub new_ldu: String,
    pub new_team: String,
}

impl TeamSpec {
    pub fn new(old: (&str, &str, &str), new: (&str, &str, &str)) -> Self {
        Self {
            old_area: normalize_code(old.0),
            old_ldu: normalize_code(old.1),
            old_team: normalize_code(old.2),
            new_area: normalize_code(new.0),
            new_ldu: normalize_code(new.1),
            new_team: normalize_code(new.2),
        }
    }

    /// Whether this row describes a team of the given old LDU.
    pub fn covers_ldu(&self, area: &str, ldu: &str) -> bool {
        self.old_area.eq_ignore_ascii_case(area) && self.old_ldu.eq_ignore_ascii_case(ldu)
    }

    /// Whether this row describes exactly the given old team.
    pub fn covers_team(&self, area: &str, ldu: &str, team: &str) -> bool {
        self.covers_ldu(area, ldu) && self.old_team.eq_ignore_ascii_case(team)
    }
}

fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// A team belonging to an LDU, with its functional mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_code: String,
    pub mailbox: String,
    /// `false` when no mapping row covered the team; the code is then the old one.
    pub matched: bool,
}

impl Team {
    pub fn new(team_code: impl Into<String>, mailbox: impl Into<String>) -> Self {
        Self {
            team_code: team_code.into(),
            mailbox: mailbox.into(),
            matched: true,
        }
    }

    pub fn unmatched(team_code: impl Into<String>, mailbox: impl Into<String>) -> Self {
        Self {
            matched: false,
            ..Self::new(team_code, mailbox)
        }
    }
}

/// A local delivery unit, either as found in the snapshot or as produced by
/// the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ldu {
    pub probation_area_code: String,
    pub ldu_code: String,
    /// LDU level mailbox. Absent when only the teams carry mailboxes.
    pub mailbox: Option<String>,
    pub teams: Vec<Team>,
    /// `false` when no mapping row covered the LDU; codes are then the old ones.
    pub matched: bool,
    /// Old codes of a remapped LDU.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<LduKey>,
}

impl Ldu {
    pub fn new(
        probation_area_code: impl Into<String>,
        ldu_code: impl Into<String>,
        mailbox: Option<String>,
        teams: Vec<Team>,
    ) -> Self {
        Self {
            probation_area_code: probation_area_code.into(),
            ldu_code: ldu_code.into(),
            mailbox,
            teams,
            matched: true,
            origin: None,
        }
    }

    pub fn key(&self) -> LduKey {
        LduKey::new(self.probation_area_code.clone(), self.ldu_code.clone())
    }

    /// The codes this LDU had in the snapshot.
    pub fn old_key(&self) -> LduKey {
        self.origin.clone().unwrap_or_else(|| self.key())
    }
}
