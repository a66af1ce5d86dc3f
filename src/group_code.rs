//! Group join-code generation and management
//!
//! This module provides the short codes players use to find and join a
//! group. Codes are displayed in octal format to make them easier to
//! communicate verbally at the pitch.

use std::{fmt::Display, num::ParseIntError, str::FromStr};

use enum_map::{Enum, EnumArray};
use serde::{Deserialize, Deserializer, Serialize};

/// Minimum value for generated group codes (in octal: 10000)
const MIN_VALUE: u16 = 0o10_000;
/// Maximum value for generated group codes (in octal: 100000)
const MAX_VALUE: u16 = 0o100_000;

/// A shareable join code for a group
///
/// Codes are generated randomly within a fixed range and displayed as
/// 5-digit octal numbers. The octal alphabet avoids the digits 8 and 9,
/// which reduces confusion when codes are shared out loud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupCode(u16);

impl GroupCode {
    /// Creates a new random group code
    ///
    /// The code is generated within the valid range so it always displays
    /// as a 5-digit octal number.
    pub fn new() -> Self {
        Self(fastrand::u16(MIN_VALUE..MAX_VALUE))
    }
}

impl Default for GroupCode {
    /// Creates a new random group code (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for GroupCode {
    /// Formats the group code as a 5-digit octal number
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:05o}", self.0)
    }
}

impl Serialize for GroupCode {
    /// Serializes the group code as an octal string
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for GroupCode {
    /// Deserializes a group code from an octal string
    fn deserialize<D>(deserializer: D) -> Result<GroupCode, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        GroupCode::from_str(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

impl FromStr for GroupCode {
    type Err = ParseIntError;

    /// Parses a group code from an octal string representation
    ///
    /// # Errors
    ///
    /// Returns a `ParseIntError` if the string cannot be parsed as a valid
    /// octal number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(u16::from_str_radix(s, 8)?))
    }
}

impl Enum for GroupCode {
    /// Total number of possible group codes
    const LENGTH: usize = (MAX_VALUE - MIN_VALUE) as usize;

    /// Creates a group code from a usize index
    ///
    /// # Panics
    ///
    /// Panics if the value is out of range for the enum.
    fn from_usize(value: usize) -> Self {
        Self(u16::try_from(value).expect("index out of range for Enum::from_usize") + MIN_VALUE)
    }

    /// Converts the group code to a usize index
    ///
    /// The returned value is clamped to the valid range to prevent
    /// array access violations.
    fn into_usize(self) -> usize {
        usize::from(self.0.saturating_sub(MIN_VALUE)).min(GroupCode::LENGTH - 1)
    }
}

impl<V> EnumArray<V> for GroupCode {
    /// Array type for storing values indexed by `GroupCode`
    type Array = [V; Self::LENGTH];
}
