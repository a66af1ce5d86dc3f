//! Player display-name management and validation
//!
//! This module handles the display names players go by inside a group. It
//! ensures names are unique within the group, filters inappropriate content,
//! normalizes casing, and maintains bidirectional mappings between player
//! IDs and names.

use std::collections::{HashMap, HashSet, hash_map::Entry};

use heck::ToTitleCase;
use rustrict::CensorStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;
use crate::player::Id;

/// Errors that can occur during name validation and assignment
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The requested name is already in use by another player
    #[error("name already in-use")]
    Used,
    /// The player already has an assigned name
    #[error("player has an existing name")]
    Assigned,
    /// The name is empty or contains only whitespace
    #[error("name cannot be empty")]
    Empty,
    /// The name contains inappropriate content
    #[error("name is inappropriate")]
    Sinful,
    /// The name exceeds the maximum allowed length
    #[error("name is too long")]
    TooLong,
}

/// Cleans up a requested name and checks it against content rules
///
/// Trims whitespace, rejects empty, overlong, or inappropriate names, and
/// title-cases the result. Uniqueness is a per-registry concern and is not
/// checked here.
///
/// # Errors
///
/// * `Error::TooLong` - name exceeds `max_length`
/// * `Error::Empty` - name is empty after trimming whitespace
/// * `Error::Sinful` - name contains inappropriate content
pub fn sanitize(name: &str, max_length: usize) -> Result<String, Error> {
    if name.len() > max_length {
        return Err(Error::TooLong);
    }
    let name = rustrict::trim_whitespace(name);
    if name.is_empty() {
        return Err(Error::Empty);
    }
    if name.is_inappropriate() {
        return Err(Error::Sinful);
    }
    Ok(name.to_title_case())
}

/// Serialization helper for Names struct
#[derive(Deserialize)]
struct NamesSerde {
    mapping: HashMap<Id, String>,
}

/// Manages display names and their associations with player IDs
///
/// This struct maintains a bidirectional mapping between player IDs and
/// names, ensuring that names are unique within a group and meet content
/// and length requirements.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(from = "NamesSerde")]
pub struct Names {
    /// Primary mapping from player ID to name
    mapping: HashMap<Id, String>,

    /// Reverse mapping from name to player ID (not serialized)
    #[serde(skip_serializing)]
    reverse_mapping: HashMap<String, Id>,
    /// Set of all existing names for quick uniqueness checks (not serialized)
    #[serde(skip_serializing)]
    existing: HashSet<String>,
}

impl From<NamesSerde> for Names {
    /// Reconstructs the Names struct from serialized data
    ///
    /// This rebuilds the reverse mapping and existing names set from the
    /// primary mapping, which is necessary since these fields are not
    /// serialized.
    fn from(serde: NamesSerde) -> Self {
        let NamesSerde { mapping } = serde;
        let mut reverse_mapping = HashMap::new();
        let mut existing = HashSet::new();
        for (id, name) in &mapping {
            reverse_mapping.insert(name.to_owned(), *id);
            existing.insert(name.to_owned());
        }
        Self {
            mapping,
            reverse_mapping,
            existing,
        }
    }
}

impl Names {
    /// Retrieves the name associated with a player ID
    pub fn get_name(&self, id: &Id) -> Option<String> {
        self.mapping.get(id).map(std::borrow::ToOwned::to_owned)
    }

    /// Assigns a name to a player after validation
    ///
    /// Runs the full validation pipeline: length limits, content filtering,
    /// uniqueness within this registry, and a check that the player doesn't
    /// already have a name.
    ///
    /// # Arguments
    ///
    /// * `id` - The player ID to assign the name to
    /// * `name` - The requested name (will be trimmed and title-cased)
    ///
    /// # Returns
    ///
    /// The cleaned and assigned name on success, or an error describing why
    /// the name was rejected.
    ///
    /// # Errors
    ///
    /// * `Error::TooLong` / `Error::Empty` / `Error::Sinful` - see [`sanitize`]
    /// * `Error::Used` - name is already taken by another player
    /// * `Error::Assigned` - player already has a name assigned
    pub fn set_name(&mut self, id: Id, name: &str) -> Result<String, Error> {
        let name = sanitize(name, constants::names::MAX_NAME_LENGTH)?;
        if !self.existing.insert(name.clone()) {
            return Err(Error::Used);
        }
        match self.mapping.entry(id) {
            Entry::Occupied(_) => Err(Error::Assigned),
            Entry::Vacant(v) => {
                v.insert(name.clone());
                self.reverse_mapping.insert(name.clone(), id);
                Ok(name)
            }
        }
    }

    /// Removes a player's name, freeing it for others
    ///
    /// Used when a player leaves the group. Unknown IDs are a no-op.
    pub fn remove_name(&mut self, id: &Id) {
        if let Some(name) = self.mapping.remove(id) {
            self.reverse_mapping.remove(&name);
            self.existing.remove(&name);
        }
    }

    /// Retrieves the player ID associated with a name
    pub fn get_id(&self, name: &str) -> Option<Id> {
        self.reverse_mapping.get(name).copied()
    }
}
