//! Balanced team drawing
//!
//! This module implements the draw that splits a game's roster into teams of
//! comparable strength. Star-tier outliers are spread first: 5-star players
//! round-robin across teams in roster order, then 1-star players the same
//! way. Everyone else is sorted by technical score and greedily placed on
//! whichever team is currently lightest, a longest-processing-time heuristic
//! for multiway load balancing.
//!
//! The draw is a pure function of the roster and the requested team count:
//! same input order, same output. It never fails; undersized or empty inputs
//! produce well-formed empty teams.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::player::{Id, RatedPlayer};

/// A single team produced by a draw
///
/// Teams are labeled "Time A", "Time B", … by ordinal position. Player IDs
/// appear in assignment order, not roster order. The star-tier subsets and
/// per-attribute averages are derived from the final composition so hosts
/// can render a draw summary without re-aggregating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAssignment {
    /// Generated label, "Time A" for the first team and so on
    pub team_name: String,
    /// 1-based position matching generation order
    pub order: u32,
    /// Players on this team, in assignment order
    pub player_ids: Vec<Id>,
    /// Subset of `player_ids` rated exactly 5 stars
    pub player_ids_with_5_stars: Vec<Id>,
    /// Subset of `player_ids` rated exactly 1 star
    pub player_ids_with_1_star: Vec<Id>,
    /// Mean star rating, 0 for an empty team
    pub avg_stars: f64,
    /// Mean passing rating, 0 for an empty team
    pub avg_pass: f64,
    /// Mean shooting rating, 0 for an empty team
    pub avg_shot: f64,
    /// Mean defensive rating, 0 for an empty team
    pub avg_defense: f64,
    /// Mean energy rating, 0 for an empty team
    pub avg_energy: f64,
    /// Mean speed rating, 0 for an empty team
    pub avg_speed: f64,
}

/// Per-team working state for a single draw
///
/// Accumulates assigned players and their technical sums; never shared
/// across calls.
#[derive(Debug, Default)]
struct TeamAccumulator {
    player_ids: Vec<Id>,
    sum_pass: u32,
    sum_shot: u32,
    sum_defense: u32,
    sum_energy: u32,
    sum_speed: u32,
}

impl TeamAccumulator {
    fn assign(&mut self, player: &RatedPlayer) {
        self.player_ids.push(player.id);
        self.sum_pass += u32::from(player.pass);
        self.sum_shot += u32::from(player.shot);
        self.sum_defense += u32::from(player.defense);
        self.sum_energy += u32::from(player.energy);
        self.sum_speed += u32::from(player.speed);
    }

    /// Running total of technical attributes across every player assigned so
    /// far, regardless of which phase assigned them
    fn technical_sum(&self) -> u32 {
        self.sum_pass + self.sum_shot + self.sum_defense + self.sum_energy + self.sum_speed
    }

    fn into_assignment(self, index: usize, stars_by_id: &HashMap<Id, u8>) -> TeamAssignment {
        let star_of = |id: &Id| stars_by_id.get(id).copied().unwrap_or_default();

        // An empty team divides by 1 and reports 0, never NaN.
        let divisor = self.player_ids.len().max(1) as f64;

        let sum_stars: u32 = self
            .player_ids
            .iter()
            .map(|id| u32::from(star_of(id)))
            .sum();

        TeamAssignment {
            team_name: team_label(index),
            order: index as u32 + 1,
            player_ids_with_5_stars: self
                .player_ids
                .iter()
                .filter(|id| star_of(id) == 5)
                .copied()
                .collect(),
            player_ids_with_1_star: self
                .player_ids
                .iter()
                .filter(|id| star_of(id) == 1)
                .copied()
                .collect(),
            avg_stars: f64::from(sum_stars) / divisor,
            avg_pass: f64::from(self.sum_pass) / divisor,
            avg_shot: f64::from(self.sum_shot) / divisor,
            avg_defense: f64::from(self.sum_defense) / divisor,
            avg_energy: f64::from(self.sum_energy) / divisor,
            avg_speed: f64::from(self.sum_speed) / divisor,
            player_ids: self.player_ids,
        }
    }
}

/// Label for the team at `index`: sequential letters starting at 'A'
fn team_label(index: usize) -> String {
    let letter = char::from_u32('A' as u32 + index as u32).unwrap_or(char::REPLACEMENT_CHARACTER);
    format!("Time {letter}")
}

/// Draws `number_of_teams` balanced teams from `players`
///
/// Every player appears in exactly one team. The draw is deterministic for a
/// given roster order, which callers must keep stable (insertion order of
/// player assignment is the convention).
///
/// Assignment runs in three phases:
///
/// 1. 5-star players round-robin across teams, in roster order.
/// 2. 1-star players round-robin the same way, restarting from the first
///    team.
/// 3. Everyone else, strongest technical score first, onto the team with the
///    lowest running technical sum (lowest index wins ties). Players with
///    equal scores keep their relative roster order.
///
/// Requesting fewer than one team, or drawing an empty roster, yields
/// `max(1, number_of_teams)` empty teams with all-zero averages rather than
/// an error. A positive team count with an empty roster is a vacuous draw;
/// a non-positive team count discards the roster entirely and returns one
/// empty team.
pub fn draw_balanced_teams(players: &[RatedPlayer], number_of_teams: i32) -> Vec<TeamAssignment> {
    let team_count = number_of_teams.max(1) as usize;

    if number_of_teams < 1 || players.is_empty() {
        let no_stars = HashMap::new();
        return (0..team_count)
            .map(|index| TeamAccumulator::default().into_assignment(index, &no_stars))
            .collect();
    }

    let stars_by_id: HashMap<Id, u8> = players.iter().map(|p| (p.id, p.stars)).collect();

    let mut teams: Vec<TeamAccumulator> =
        (0..team_count).map(|_| TeamAccumulator::default()).collect();

    for (k, player) in players.iter().filter(|p| p.stars == 5).enumerate() {
        teams[k % team_count].assign(player);
    }

    for (k, player) in players.iter().filter(|p| p.stars == 1).enumerate() {
        teams[k % team_count].assign(player);
    }

    let mut remaining: Vec<&RatedPlayer> = players
        .iter()
        .filter(|p| p.stars != 5 && p.stars != 1)
        .collect();
    // Stable sort: equal scores keep roster order.
    remaining.sort_by(|a, b| b.technical_score().cmp(&a.technical_score()));

    for player in remaining {
        let lightest = teams
            .iter()
            .enumerate()
            .min_by_key(|(_, team)| team.technical_sum())
            .map(|(index, _)| index)
            .expect("there is always at least one team");
        teams[lightest].assign(player);
    }

    teams
        .into_iter()
        .enumerate()
        .map(|(index, team)| team.into_assignment(index, &stars_by_id))
        .collect()
}
