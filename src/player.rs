//! Rated players and their identifiers
//!
//! This module defines the stable player identifier used across games and
//! groups, and the rated-player record the team balancer consumes: a coarse
//! star tier plus five technical attributes. Ratings are maintained by the
//! embedding application; this library only reads them.

use std::{fmt::Display, str::FromStr};

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use uuid::Uuid;

/// A unique identifier for a player
///
/// Each player gets a stable ID that persists across games, groups, and
/// draws. The embedding application maps its own identity-provider subject
/// to exactly one of these.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random player ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    /// Creates a new random player ID (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Id {
    /// Formats the ID as a UUID string
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Id {
    type Err = uuid::Error;

    /// Parses an ID from a UUID string
    ///
    /// # Errors
    ///
    /// Returns a `uuid::Error` if the string is not a valid UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// A player together with the ratings used for balanced draws
///
/// `stars` is the coarse overall tier; the five technical attributes feed
/// the technical score used to balance the middle tier. All six values live
/// in the 1..=5 range, enforced with `validate()` at the application edge.
/// The balancer itself performs no validation: out-of-range numbers flow
/// through its arithmetic unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RatedPlayer {
    /// The player this rating belongs to
    #[garde(skip)]
    pub id: Id,
    /// Overall skill tier
    #[garde(range(min = crate::constants::player::MIN_RATING, max = crate::constants::player::MAX_RATING))]
    pub stars: u8,
    /// Passing ability
    #[garde(range(min = crate::constants::player::MIN_RATING, max = crate::constants::player::MAX_RATING))]
    pub pass: u8,
    /// Shooting ability
    #[garde(range(min = crate::constants::player::MIN_RATING, max = crate::constants::player::MAX_RATING))]
    pub shot: u8,
    /// Defensive ability
    #[garde(range(min = crate::constants::player::MIN_RATING, max = crate::constants::player::MAX_RATING))]
    pub defense: u8,
    /// Stamina over a full game
    #[garde(range(min = crate::constants::player::MIN_RATING, max = crate::constants::player::MAX_RATING))]
    pub energy: u8,
    /// Pace with and without the ball
    #[garde(range(min = crate::constants::player::MIN_RATING, max = crate::constants::player::MAX_RATING))]
    pub speed: u8,
}

impl RatedPlayer {
    /// Sum of the five technical attributes, stars excluded
    ///
    /// This is the value the balancer ranks and load-balances on for players
    /// outside the 5-star and 1-star tiers.
    pub fn technical_score(&self) -> u32 {
        u32::from(self.pass)
            + u32::from(self.shot)
            + u32::from(self.defense)
            + u32::from(self.energy)
            + u32::from(self.speed)
    }
}
