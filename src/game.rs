//! Game lifecycle and draw orchestration
//!
//! This module contains the state for a single pelada game: the roster in
//! insertion order, the game options, and the standing team draw. It
//! enforces the preconditions a real game needs (enough teams, a non-empty
//! roster, a rating for everyone) before delegating to the draw algorithm,
//! and produces the messages hosts fan out to participants.

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::{
    TruncatedVec,
    draw::{self, TeamAssignment},
    player::{Id, RatedPlayer},
    session::Tunnel,
};

/// How many roster entries waiting-screen previews include
const ROSTER_PREVIEW_LIMIT: usize = 50;

/// Represents the current phase of a game
///
/// A game starts open for roster changes, gains a standing draw once teams
/// are drawn (redraws replace it wholesale), and finally closes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum State {
    /// Roster is forming; no teams drawn yet
    Open,
    /// Teams are drawn and standing
    Drawn(Vec<TeamAssignment>),
    /// Game is closed; the final draw, if one was made, is kept for the record
    Finished(Option<Vec<TeamAssignment>>),
}

/// Configuration options for a single game
///
/// Validated at construction time; the draw itself never validates. The
/// team-count floor here is what keeps the draw's degenerate paths out of
/// reach for games created through this module.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct GameOptions {
    /// Number of teams drawn from the roster
    #[garde(range(
        min = crate::constants::game::MIN_TEAM_COUNT,
        max = crate::constants::game::MAX_TEAM_COUNT
    ))]
    pub team_count: usize,
    /// Hard cap on roster size
    #[garde(range(min = 1, max = crate::constants::game::MAX_ROSTER_SIZE))]
    pub max_players: usize,
    /// Optional human-readable title
    #[garde(inner(length(max = crate::constants::game::MAX_TITLE_LENGTH)))]
    pub title: Option<String>,
}

impl Default for GameOptions {
    /// Two teams, a full-size roster cap, no title
    fn default() -> Self {
        Self {
            team_count: crate::constants::game::MIN_TEAM_COUNT,
            max_players: crate::constants::game::MAX_ROSTER_SIZE,
            title: None,
        }
    }
}

/// Errors that can occur when operating on a game
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Error {
    /// The game is locked to roster changes
    #[error("game is locked")]
    Locked,
    /// The roster has reached its configured cap
    #[error("game roster is full")]
    RosterFull,
    /// The player is already on the roster
    #[error("player already joined")]
    AlreadyJoined,
    /// The player is not on the roster
    #[error("player is not on the roster")]
    NotOnRoster,
    /// The game has already finished
    #[error("game has finished")]
    Finished,
    /// The roster is empty, so there is nothing to draw
    #[error("cannot draw teams from an empty roster")]
    EmptyRoster,
    /// No rating is available for a roster member
    #[error("no rating found for player {0}")]
    MissingRating(Id),
}

/// A single pelada game
///
/// Holds the roster in insertion order — the stable order the draw's
/// round-robin phases depend on — together with the options and the current
/// phase. Persistence is the host's job: the whole value serializes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    /// Game configuration
    options: GameOptions,
    /// Roster in insertion order of player assignment
    roster: Vec<Id>,
    /// Whether the game is locked to roster changes
    locked: bool,
    /// Current phase of the game
    pub state: State,
}

impl Game {
    /// Creates a new open game with the given options
    ///
    /// # Errors
    ///
    /// Returns a validation report if the options are out of bounds
    /// (team count outside 2..=26, roster cap outside 1..=100, overlong
    /// title).
    pub fn new(options: GameOptions) -> Result<Self, garde::Report> {
        options.validate()?;
        Ok(Self {
            options,
            roster: Vec::new(),
            locked: false,
            state: State::Open,
        })
    }

    /// Returns the game options
    pub fn options(&self) -> &GameOptions {
        &self.options
    }

    /// Returns the roster in insertion order
    pub fn roster(&self) -> &[Id] {
        &self.roster
    }

    /// Returns whether the game is locked to roster changes
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Locks or unlocks the game for roster changes
    pub fn lock(&mut self, locked: bool) {
        self.locked = locked;
    }

    /// Returns the standing team assignments, if any
    ///
    /// Present while a draw stands and after a drawn game finishes.
    pub fn teams(&self) -> Option<&[TeamAssignment]> {
        match &self.state {
            State::Drawn(teams) => Some(teams),
            State::Finished(teams) => teams.as_deref(),
            State::Open => None,
        }
    }

    /// Adds a player to the end of the roster
    ///
    /// Joining is allowed until the game finishes; a join after a draw takes
    /// effect at the next redraw.
    ///
    /// # Errors
    ///
    /// * `Error::Finished` - the game is closed
    /// * `Error::Locked` - the roster is locked
    /// * `Error::RosterFull` - the configured cap is reached
    /// * `Error::AlreadyJoined` - the player is already on the roster
    pub fn add_player(&mut self, player_id: Id) -> Result<(), Error> {
        if matches!(self.state, State::Finished(_)) {
            return Err(Error::Finished);
        }
        if self.locked {
            return Err(Error::Locked);
        }
        if self.roster.len() >= self.options.max_players {
            return Err(Error::RosterFull);
        }
        if self.roster.contains(&player_id) {
            return Err(Error::AlreadyJoined);
        }
        self.roster.push(player_id);
        Ok(())
    }

    /// Removes a player from the roster
    ///
    /// The relative order of the remaining players is preserved.
    ///
    /// # Errors
    ///
    /// * `Error::Finished` - the game is closed
    /// * `Error::NotOnRoster` - the player never joined
    pub fn remove_player(&mut self, player_id: Id) -> Result<(), Error> {
        if matches!(self.state, State::Finished(_)) {
            return Err(Error::Finished);
        }
        let position = self
            .roster
            .iter()
            .position(|id| *id == player_id)
            .ok_or(Error::NotOnRoster)?;
        self.roster.remove(position);
        Ok(())
    }

    /// Draws balanced teams from the current roster
    ///
    /// Ratings are resolved through `ratings`, the roster-resolution seam:
    /// the host supplies current ratings per player, this module supplies
    /// the stable roster order. Any previous draw is replaced wholesale.
    ///
    /// # Errors
    ///
    /// * `Error::Finished` - the game is closed
    /// * `Error::EmptyRoster` - there is nobody to draw
    /// * `Error::MissingRating` - a roster member has no rating
    pub fn draw_teams<F: Fn(Id) -> Option<RatedPlayer>>(
        &mut self,
        ratings: F,
    ) -> Result<&[TeamAssignment], Error> {
        if matches!(self.state, State::Finished(_)) {
            return Err(Error::Finished);
        }
        if self.roster.is_empty() {
            return Err(Error::EmptyRoster);
        }

        let players = self
            .roster
            .iter()
            .map(|&id| ratings(id).ok_or(Error::MissingRating(id)))
            .collect::<Result<Vec<_>, _>>()?;

        let assignments = draw::draw_balanced_teams(&players, self.options.team_count as i32);
        self.state = State::Drawn(assignments);

        Ok(self.teams().expect("draw result was just stored"))
    }

    /// Closes the game, keeping the final draw for the record
    ///
    /// # Errors
    ///
    /// Returns `Error::Finished` if the game is already closed.
    pub fn finish(&mut self) -> Result<(), Error> {
        match std::mem::replace(&mut self.state, State::Open) {
            State::Open => {
                self.state = State::Finished(None);
                Ok(())
            }
            State::Drawn(teams) => {
                self.state = State::Finished(Some(teams));
                Ok(())
            }
            State::Finished(teams) => {
                self.state = State::Finished(teams);
                Err(Error::Finished)
            }
        }
    }

    /// Builds the sync message describing the current phase
    ///
    /// Sent to participants on connect or reconnect to replace their view.
    pub fn state_message(&self) -> SyncMessage {
        match &self.state {
            State::Open => SyncMessage::WaitingScreen(self.roster_preview()),
            State::Drawn(teams) => SyncMessage::TeamDisplay(teams.clone()),
            State::Finished(teams) => SyncMessage::Summary {
                roster_size: self.roster.len(),
                teams: teams.clone(),
            },
        }
    }

    /// Sends an update message to every reachable roster member
    ///
    /// Participants without a tunnel are skipped.
    pub fn announce<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        message: &crate::UpdateMessage,
        tunnel_finder: F,
    ) {
        for &id in &self.roster {
            if let Some(tunnel) = tunnel_finder(id) {
                tunnel.send_message(message);
            }
        }
    }

    /// Synchronizes every reachable roster member with the current phase
    pub fn sync_all<T: Tunnel, F: Fn(Id) -> Option<T>>(&self, tunnel_finder: F) {
        let state = crate::SyncMessage::from(self.state_message());
        for &id in &self.roster {
            if let Some(tunnel) = tunnel_finder(id) {
                tunnel.send_state(&state);
            }
        }
    }

    fn roster_preview(&self) -> TruncatedVec<Id> {
        TruncatedVec::new(
            self.roster.iter().copied(),
            ROSTER_PREVIEW_LIMIT,
            self.roster.len(),
        )
    }
}

/// Update messages sent to participants about game changes
#[derive(Debug, Serialize, Clone)]
pub enum UpdateMessage {
    /// A player joined the roster
    PlayerJoined {
        /// The player who joined
        player_id: Id,
        /// Roster size after the join
        roster_size: usize,
    },
    /// A player left the roster
    PlayerLeft {
        /// The player who left
        player_id: Id,
        /// Roster size after the departure
        roster_size: usize,
    },
    /// Teams were drawn (or redrawn), replacing any previous draw
    TeamsDrawn(Vec<TeamAssignment>),
    /// The game was closed
    GameOver,
}

/// Sync messages that replace a participant's view of the game
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone)]
pub enum SyncMessage {
    /// Roster preview while the game is open
    WaitingScreen(TruncatedVec<Id>),
    /// The standing draw
    TeamDisplay(Vec<TeamAssignment>),
    /// Final record after the game closed
    Summary {
        /// Number of players on the final roster
        roster_size: usize,
        /// The final draw, if one was made
        teams: Option<Vec<TeamAssignment>>,
    },
}
