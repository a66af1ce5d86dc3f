//! Group join requests
//!
//! The mirror image of invitations: a player who found a group (usually via
//! its join code) asks to become a member, and an admin approves or rejects
//! the request. The requester can withdraw while the request is pending.
//! Like invitations, a request settles exactly once; membership effects live
//! in the parent module.

use std::{collections::HashMap, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use uuid::Uuid;
use web_time::SystemTime;

use crate::player::Id;

/// A unique identifier for a join request
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct JoinRequestId(Uuid);

impl JoinRequestId {
    /// Creates a new random join-request ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JoinRequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for JoinRequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for JoinRequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Lifecycle status of a join request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Waiting for an admin's decision
    Pending,
    /// An admin let the requester in
    Approved,
    /// An admin turned the requester away
    Rejected,
    /// The requester withdrew before a decision
    Withdrawn,
}

/// Errors that can occur when working with join requests
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// No request with the given ID exists
    #[error("join request not found")]
    NotFound,
    /// The request has already been decided or withdrawn
    #[error("join request is no longer pending")]
    NotPending,
    /// The acting player did not make this request
    #[error("join request belongs to another player")]
    WrongRequester,
    /// The requester already has a pending request
    #[error("player already has a pending join request")]
    AlreadyRequested,
}

/// A single join-request record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JoinRequest {
    /// The request's unique identifier
    pub id: JoinRequestId,
    /// The player asking to join
    pub requester: Id,
    /// When the request was submitted
    pub requested_at: SystemTime,
    /// Current lifecycle status
    pub status: Status,
}

impl JoinRequest {
    fn settle(&mut self, status: Status) -> bool {
        if self.status == Status::Pending {
            self.status = status;
            true
        } else {
            false
        }
    }
}

/// All join requests of a single group
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct JoinRequests {
    records: HashMap<JoinRequestId, JoinRequest>,
}

impl JoinRequests {
    /// Submits a new join request from `requester`
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyRequested` if the requester already has a
    /// pending request.
    pub fn submit(&mut self, requester: Id) -> Result<JoinRequestId, Error> {
        if self.pending_for(requester).is_some() {
            return Err(Error::AlreadyRequested);
        }
        let id = JoinRequestId::new();
        self.records.insert(
            id,
            JoinRequest {
                id,
                requester,
                requested_at: SystemTime::now(),
                status: Status::Pending,
            },
        );
        Ok(id)
    }

    /// Looks up a join request by ID
    pub fn get(&self, id: JoinRequestId) -> Option<&JoinRequest> {
        self.records.get(&id)
    }

    /// The pending request submitted by `requester`, if any
    pub fn pending_for(&self, requester: Id) -> Option<&JoinRequest> {
        self.records
            .values()
            .find(|request| request.requester == requester && request.status == Status::Pending)
    }

    /// Approves a pending request
    ///
    /// Authorization is the caller's concern; the parent module gates this
    /// behind admin rights.
    ///
    /// # Errors
    ///
    /// * `Error::NotFound` - no such request
    /// * `Error::NotPending` - the request already settled
    pub fn approve(&mut self, id: JoinRequestId) -> Result<&JoinRequest, Error> {
        self.decide(id, Status::Approved)
    }

    /// Rejects a pending request
    ///
    /// # Errors
    ///
    /// Same as [`JoinRequests::approve`].
    pub fn reject(&mut self, id: JoinRequestId) -> Result<&JoinRequest, Error> {
        self.decide(id, Status::Rejected)
    }

    fn decide(&mut self, id: JoinRequestId, status: Status) -> Result<&JoinRequest, Error> {
        let request = self.records.get_mut(&id).ok_or(Error::NotFound)?;
        if !request.settle(status) {
            return Err(Error::NotPending);
        }
        Ok(request)
    }

    /// Withdraws a pending request on behalf of its requester
    ///
    /// # Errors
    ///
    /// * `Error::NotFound` - no such request
    /// * `Error::WrongRequester` - `actor` did not make the request
    /// * `Error::NotPending` - the request already settled
    pub fn withdraw(&mut self, id: JoinRequestId, actor: Id) -> Result<&JoinRequest, Error> {
        let request = self.records.get_mut(&id).ok_or(Error::NotFound)?;
        if request.requester != actor {
            return Err(Error::WrongRequester);
        }
        if !request.settle(Status::Withdrawn) {
            return Err(Error::NotPending);
        }
        Ok(request)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_submit_and_approve() {
        let mut requests = JoinRequests::default();
        let requester = Id::new();

        let id = requests.submit(requester).unwrap();
        assert_eq!(requests.pending_for(requester).map(|r| r.id), Some(id));

        let approved = requests.approve(id).unwrap();
        assert_eq!(approved.status, Status::Approved);
        assert!(requests.pending_for(requester).is_none());
    }

    #[test]
    fn test_reject() {
        let mut requests = JoinRequests::default();
        let id = requests.submit(Id::new()).unwrap();

        let rejected = requests.reject(id).unwrap();
        assert_eq!(rejected.status, Status::Rejected);
    }

    #[test]
    fn test_request_settles_once() {
        let mut requests = JoinRequests::default();
        let requester = Id::new();
        let id = requests.submit(requester).unwrap();

        requests.approve(id).unwrap();
        assert_eq!(requests.reject(id).map(|r| r.id), Err(Error::NotPending));
        assert_eq!(
            requests.withdraw(id, requester).map(|r| r.id),
            Err(Error::NotPending)
        );
    }

    #[test]
    fn test_one_pending_request_per_player() {
        let mut requests = JoinRequests::default();
        let requester = Id::new();

        requests.submit(requester).unwrap();
        assert_eq!(requests.submit(requester), Err(Error::AlreadyRequested));
    }

    #[test]
    fn test_resubmit_after_rejection() {
        let mut requests = JoinRequests::default();
        let requester = Id::new();

        let first = requests.submit(requester).unwrap();
        requests.reject(first).unwrap();

        assert!(requests.submit(requester).is_ok());
    }

    #[test]
    fn test_only_requester_can_withdraw() {
        let mut requests = JoinRequests::default();
        let requester = Id::new();
        let id = requests.submit(requester).unwrap();

        assert_eq!(
            requests.withdraw(id, Id::new()).map(|r| r.id),
            Err(Error::WrongRequester)
        );

        let withdrawn = requests.withdraw(id, requester).unwrap();
        assert_eq!(withdrawn.status, Status::Withdrawn);
    }

    #[test]
    fn test_unknown_request() {
        let mut requests = JoinRequests::default();
        assert_eq!(
            requests.approve(JoinRequestId::new()).map(|r| r.id),
            Err(Error::NotFound)
        );
    }
}
