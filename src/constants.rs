//! Configuration constants for the pelada game system
//!
//! This module contains the limits and constraints used throughout the
//! library to keep rosters, groups, and player data within sane boundaries.

/// Player rating configuration constants
pub mod player {
    /// Lowest allowed value for stars and technical attributes
    pub const MIN_RATING: u8 = 1;
    /// Highest allowed value for stars and technical attributes
    pub const MAX_RATING: u8 = 5;
}

/// Game and roster configuration constants
pub mod game {
    /// Minimum number of teams for a real game
    pub const MIN_TEAM_COUNT: usize = 2;
    /// Maximum number of teams; keeps team labels within "Time A".."Time Z"
    pub const MAX_TEAM_COUNT: usize = 26;
    /// Maximum number of players on a single game's roster
    pub const MAX_ROSTER_SIZE: usize = 100;
    /// Maximum length of a game title in characters
    pub const MAX_TITLE_LENGTH: usize = 200;
}

/// Group configuration constants
pub mod group {
    /// Maximum length of a group name in characters
    pub const MAX_NAME_LENGTH: usize = 50;
    /// Maximum number of members in a single group
    pub const MAX_MEMBER_COUNT: usize = 500;
    /// Maximum number of members included in list previews
    pub const MEMBER_PREVIEW_LIMIT: usize = 50;
}

/// Display name configuration constants
pub mod names {
    /// Maximum length of a player display name in characters
    pub const MAX_NAME_LENGTH: usize = 30;
}
