//! Remapping of snapshot LDUs and teams onto their new organisational codes.
//!
//! The reconciler never mutates its inputs: every output [`Ldu`] and [`Team`]
//! is built fresh. Entries that no mapping row covers keep their old codes and
//! are flagged with `matched = false` so that they can be reported.

use tracing::{debug, warn};

use crate::error::{RemapError, Result};
use crate::model::{Ldu, Team, TeamSpec};

/// How to treat mapping rows that disagree with each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// The first row in table order wins; disagreements are logged.
    #[default]
    FirstMatch,
    /// Disagreements abort the run.
    Strict,
}

/// Maps every snapshot LDU onto one LDU per new probation area its teams move
/// to, in input order.
pub fn remap_ldus(ldus: &[Ldu], specs: &[TeamSpec], policy: MatchPolicy) -> Result<Vec<Ldu>> {
    let mut remapped = Vec::with_capacity(ldus.len());
    for ldu in ldus {
        remapped.extend(remap_ldu(ldu, specs, policy)?);
    }
    debug!(
        input = ldus.len(),
        output = remapped.len(),
        "LDU remapping complete"
    );
    Ok(remapped)
}

fn remap_ldu(ldu: &Ldu, specs: &[TeamSpec], policy: MatchPolicy) -> Result<Vec<Ldu>> {
    let candidates: Vec<&TeamSpec> = specs
        .iter()
        .filter(|spec| spec.covers_ldu(&ldu.probation_area_code, &ldu.ldu_code))
        .collect();

    if candidates.is_empty() {
        debug!(ldu = %ldu.key(), dropped_teams = ldu.teams.len(), "no mapping rows for LDU");
        return Ok(vec![Ldu {
            probation_area_code: ldu.probation_area_code.clone(),
            ldu_code: ldu.ldu_code.clone(),
            mailbox: ldu.mailbox.clone(),
            teams: Vec::new(),
            matched: false,
            origin: None,
        }]);
    }

    let grouping = AreaGrouping::build(&candidates);
    grouping.check_consistency(ldu, &candidates, policy)?;

    let mut outputs: Vec<Ldu> = grouping
        .groups
        .iter()
        .map(|group| {
            let representative = candidates[group.members[0]];
            Ldu {
                probation_area_code: representative.new_area.clone(),
                ldu_code: representative.new_ldu.clone(),
                mailbox: ldu.mailbox.clone(),
                teams: Vec::new(),
                matched: true,
                origin: Some(ldu.key()),
            }
        })
        .collect();

    for team in &ldu.teams {
        match find_team_spec(ldu, team, &candidates, policy)? {
            Some(position) => {
                let spec = candidates[position];
                outputs[grouping.assignment[position]]
                    .teams
                    .push(Team::new(spec.new_team.clone(), team.mailbox.clone()));
            }
            None => {
                debug!(ldu = %ldu.key(), team = %team.team_code, "no mapping row for team");
                // Unmatched teams are attached to the first group only, so each
                // one is reported once however many areas the LDU splits into.
                outputs[0].teams.push(Team::unmatched(
                    team.team_code.clone(),
                    team.mailbox.clone(),
                ));
            }
        }
    }

    Ok(outputs)
}

/// Returns the position in `candidates` of the first row covering the team.
fn find_team_spec(
    ldu: &Ldu,
    team: &Team,
    candidates: &[&TeamSpec],
    policy: MatchPolicy,
) -> Result<Option<usize>> {
    let matches: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, spec)| {
            spec.covers_team(&ldu.probation_area_code, &ldu.ldu_code, &team.team_code)
        })
        .map(|(position, _)| position)
        .collect();

    if matches.len() > 1 {
        if policy == MatchPolicy::Strict {
            return Err(RemapError::AmbiguousTeam {
                area: ldu.probation_area_code.clone(),
                ldu: ldu.ldu_code.clone(),
                team: team.team_code.clone(),
                count: matches.len(),
            });
        }
        warn!(
            ldu = %ldu.key(),
            team = %team.team_code,
            count = matches.len(),
            "team covered by several mapping rows, using the first"
        );
    }

    Ok(matches.first().copied())
}

/// Candidate rows grouped by new probation area, in discovery order.
struct AreaGrouping {
    groups: Vec<AreaGroup>,
    /// Group index for each candidate position.
    assignment: Vec<usize>,
}

struct AreaGroup {
    new_area: String,
    members: Vec<usize>,
}

impl AreaGrouping {
    fn build(candidates: &[&TeamSpec]) -> Self {
        let mut groups: Vec<AreaGroup> = Vec::new();
        let mut assignment = Vec::with_capacity(candidates.len());

        for (position, spec) in candidates.iter().enumerate() {
            let index = match groups
                .iter()
                .position(|group| group.new_area == spec.new_area)
            {
                Some(index) => index,
                None => {
                    groups.push(AreaGroup {
                        new_area: spec.new_area.clone(),
                        members: Vec::new(),
                    });
                    groups.len() - 1
                }
            };
            groups[index].members.push(position);
            assignment.push(index);
        }

        Self { groups, assignment }
    }

    /// Checks that every row of a group agrees with its first row on the new
    /// LDU code.
    fn check_consistency(
        &self,
        ldu: &Ldu,
        candidates: &[&TeamSpec],
        policy: MatchPolicy,
    ) -> Result<()> {
        for group in &self.groups {
            let first = candidates[group.members[0]];
            let Some(other) = group
                .members
                .iter()
                .map(|&position| candidates[position])
                .find(|spec| spec.new_ldu != first.new_ldu)
            else {
                continue;
            };

            if policy == MatchPolicy::Strict {
                return Err(RemapError::InconsistentMapping {
                    area: ldu.probation_area_code.clone(),
                    ldu: ldu.ldu_code.clone(),
                    new_area: group.new_area.clone(),
                    first: first.new_ldu.clone(),
                    other: other.new_ldu.clone(),
                });
            }
            warn!(
                ldu = %ldu.key(),
                new_area = %group.new_area,
                kept = %first.new_ldu,
                ignored = %other.new_ldu,
                "mapping rows disagree on the new LDU code, using the first"
            );
        }
        Ok(())
    }
}
