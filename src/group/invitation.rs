//! Group invitations
//!
//! Admins invite players into a group; the invitee accepts or declines, and
//! an admin can revoke a still-pending invitation. An invitation settles
//! exactly once. Membership effects live in the parent module; this one only
//! tracks the records and their transitions.

use std::{collections::HashMap, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use uuid::Uuid;
use web_time::SystemTime;

use crate::player::Id;

/// A unique identifier for an invitation
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct InvitationId(Uuid);

impl InvitationId {
    /// Creates a new random invitation ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InvitationId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for InvitationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for InvitationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Lifecycle status of an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Waiting for the invitee's answer
    Pending,
    /// Invitee accepted and joined the group
    Accepted,
    /// Invitee turned the invitation down
    Declined,
    /// An admin withdrew the invitation before it was answered
    Revoked,
}

/// Errors that can occur when working with invitations
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// No invitation with the given ID exists
    #[error("invitation not found")]
    NotFound,
    /// The invitation has already been answered or revoked
    #[error("invitation is no longer pending")]
    NotPending,
    /// The acting player is not the invitee
    #[error("invitation is addressed to another player")]
    WrongInvitee,
    /// The invitee already has a pending invitation
    #[error("player already has a pending invitation")]
    AlreadyInvited,
}

/// A single invitation record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    /// The invitation's unique identifier
    pub id: InvitationId,
    /// The admin who issued the invitation
    pub inviter: Id,
    /// The player being invited
    pub invitee: Id,
    /// When the invitation was issued
    pub issued_at: SystemTime,
    /// Current lifecycle status
    pub status: Status,
}

impl Invitation {
    /// Moves a pending invitation to `status`
    ///
    /// Returns false without changing anything if the invitation has
    /// already settled.
    fn settle(&mut self, status: Status) -> bool {
        if self.status == Status::Pending {
            self.status = status;
            true
        } else {
            false
        }
    }
}

/// All invitations of a single group
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Invitations {
    records: HashMap<InvitationId, Invitation>,
}

impl Invitations {
    /// Issues a new invitation for `invitee`
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyInvited` if the invitee already has a pending
    /// invitation.
    pub fn issue(&mut self, inviter: Id, invitee: Id) -> Result<InvitationId, Error> {
        if self.pending_for(invitee).is_some() {
            return Err(Error::AlreadyInvited);
        }
        let id = InvitationId::new();
        self.records.insert(
            id,
            Invitation {
                id,
                inviter,
                invitee,
                issued_at: SystemTime::now(),
                status: Status::Pending,
            },
        );
        Ok(id)
    }

    /// Looks up an invitation by ID
    pub fn get(&self, id: InvitationId) -> Option<&Invitation> {
        self.records.get(&id)
    }

    /// The pending invitation addressed to `invitee`, if any
    pub fn pending_for(&self, invitee: Id) -> Option<&Invitation> {
        self.records
            .values()
            .find(|invitation| invitation.invitee == invitee && invitation.status == Status::Pending)
    }

    /// Accepts a pending invitation on behalf of its invitee
    ///
    /// # Errors
    ///
    /// * `Error::NotFound` - no such invitation
    /// * `Error::WrongInvitee` - `actor` is not the invitee
    /// * `Error::NotPending` - the invitation already settled
    pub fn accept(&mut self, id: InvitationId, actor: Id) -> Result<&Invitation, Error> {
        self.answer(id, actor, Status::Accepted)
    }

    /// Declines a pending invitation on behalf of its invitee
    ///
    /// # Errors
    ///
    /// Same as [`Invitations::accept`].
    pub fn decline(&mut self, id: InvitationId, actor: Id) -> Result<&Invitation, Error> {
        self.answer(id, actor, Status::Declined)
    }

    fn answer(&mut self, id: InvitationId, actor: Id, status: Status) -> Result<&Invitation, Error> {
        let invitation = self.records.get_mut(&id).ok_or(Error::NotFound)?;
        if invitation.invitee != actor {
            return Err(Error::WrongInvitee);
        }
        if !invitation.settle(status) {
            return Err(Error::NotPending);
        }
        Ok(invitation)
    }

    /// Revokes a pending invitation
    ///
    /// Authorization is the caller's concern; the parent module gates this
    /// behind admin rights.
    ///
    /// # Errors
    ///
    /// * `Error::NotFound` - no such invitation
    /// * `Error::NotPending` - the invitation already settled
    pub fn revoke(&mut self, id: InvitationId) -> Result<&Invitation, Error> {
        let invitation = self.records.get_mut(&id).ok_or(Error::NotFound)?;
        if !invitation.settle(Status::Revoked) {
            return Err(Error::NotPending);
        }
        Ok(invitation)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_accept() {
        let mut invitations = Invitations::default();
        let inviter = Id::new();
        let invitee = Id::new();

        let id = invitations.issue(inviter, invitee).unwrap();
        assert_eq!(invitations.pending_for(invitee).map(|i| i.id), Some(id));

        let accepted = invitations.accept(id, invitee).unwrap();
        assert_eq!(accepted.status, Status::Accepted);
        assert!(invitations.pending_for(invitee).is_none());
    }

    #[test]
    fn test_decline() {
        let mut invitations = Invitations::default();
        let invitee = Id::new();
        let id = invitations.issue(Id::new(), invitee).unwrap();

        let declined = invitations.decline(id, invitee).unwrap();
        assert_eq!(declined.status, Status::Declined);
    }

    #[test]
    fn test_only_invitee_can_answer() {
        let mut invitations = Invitations::default();
        let invitee = Id::new();
        let id = invitations.issue(Id::new(), invitee).unwrap();

        assert_eq!(
            invitations.accept(id, Id::new()).map(|i| i.id),
            Err(Error::WrongInvitee)
        );
        // Still pending for the real invitee.
        assert!(invitations.accept(id, invitee).is_ok());
    }

    #[test]
    fn test_invitation_settles_once() {
        let mut invitations = Invitations::default();
        let invitee = Id::new();
        let id = invitations.issue(Id::new(), invitee).unwrap();

        invitations.accept(id, invitee).unwrap();
        assert_eq!(
            invitations.decline(id, invitee).map(|i| i.id),
            Err(Error::NotPending)
        );
        assert_eq!(invitations.revoke(id).map(|i| i.id), Err(Error::NotPending));
    }

    #[test]
    fn test_one_pending_invitation_per_invitee() {
        let mut invitations = Invitations::default();
        let invitee = Id::new();

        invitations.issue(Id::new(), invitee).unwrap();
        assert_eq!(
            invitations.issue(Id::new(), invitee),
            Err(Error::AlreadyInvited)
        );
    }

    #[test]
    fn test_reinvite_after_decline() {
        let mut invitations = Invitations::default();
        let invitee = Id::new();

        let first = invitations.issue(Id::new(), invitee).unwrap();
        invitations.decline(first, invitee).unwrap();

        assert!(invitations.issue(Id::new(), invitee).is_ok());
    }

    #[test]
    fn test_revoke_pending() {
        let mut invitations = Invitations::default();
        let invitee = Id::new();
        let id = invitations.issue(Id::new(), invitee).unwrap();

        let revoked = invitations.revoke(id).unwrap();
        assert_eq!(revoked.status, Status::Revoked);
        assert!(invitations.pending_for(invitee).is_none());
    }

    #[test]
    fn test_unknown_invitation() {
        let mut invitations = Invitations::default();
        assert_eq!(
            invitations.revoke(InvitationId::new()).map(|i| i.id),
            Err(Error::NotFound)
        );
    }
}
