//! Group membership and sharing
//!
//! A group is the long-lived social unit a pelada runs inside: it owns the
//! member list with per-member roles, the display names members go by, the
//! join code, and the two admission workflows (invitations and join
//! requests). Every mutating operation takes the acting player's ID and
//! checks it against the member roles — resolving *who* is acting from a
//! credential is the embedding application's identity provider's job.

pub mod invitation;
pub mod join_request;

use std::{
    collections::{HashMap, HashSet},
    fmt::Display,
    str::FromStr,
};

use enum_map::{Enum, EnumMap};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    TruncatedVec, constants, group_code::GroupCode, names, player::Id, session::Tunnel,
};

use invitation::{InvitationId, Invitations};
use join_request::{JoinRequestId, JoinRequests};

/// A unique identifier for a group
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct GroupId(Uuid);

impl GroupId {
    /// Creates a new random group ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for GroupId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// A member's role within a group
///
/// Roles gate the management operations: inviting, deciding join requests,
/// removing members, and changing roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum Role {
    /// The single member who created (or was handed) the group
    Owner,
    /// Members trusted with admission and removal
    Admin,
    /// Everyone else
    Member,
}

impl Role {
    /// Whether this role may invite players, decide join requests, and
    /// remove ordinary members
    pub fn can_manage(self) -> bool {
        matches!(self, Role::Owner | Role::Admin)
    }
}

/// Errors that can occur when operating on a group
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The acting player lacks the role the operation requires
    #[error("player is not authorized for this action")]
    NotAuthorized,
    /// The targeted player is not a member of the group
    #[error("player is not a member of the group")]
    NotMember,
    /// The player is already a member of the group
    #[error("player is already a member of the group")]
    AlreadyMember,
    /// The group has reached its member cap
    #[error("group is full")]
    GroupFull,
    /// The owner can only leave by handing the group to someone else first
    #[error("the owner cannot be removed from the group")]
    OwnerImmovable,
    /// A display-name problem
    #[error(transparent)]
    Name(#[from] names::Error),
    /// An invitation-workflow problem
    #[error(transparent)]
    Invitation(#[from] invitation::Error),
    /// A join-request-workflow problem
    #[error(transparent)]
    JoinRequest(#[from] join_request::Error),
}

/// Serialization helper for Group struct
#[derive(Deserialize)]
struct GroupSerde {
    id: GroupId,
    name: String,
    code: GroupCode,
    members: HashMap<Id, Role>,
    display_names: names::Names,
    invitations: Invitations,
    join_requests: JoinRequests,
}

/// A pelada group
///
/// Tracks members and their roles, member display names, and the pending
/// admission workflows. The host persists whole values; the role index is
/// rebuilt on deserialization.
#[derive(Serialize, Deserialize)]
#[serde(from = "GroupSerde")]
pub struct Group {
    /// The group's unique identifier
    id: GroupId,
    /// Validated display name of the group itself
    name: String,
    /// Shareable join code
    code: GroupCode,
    /// Primary mapping from member ID to role
    members: HashMap<Id, Role>,
    /// Reverse mapping organized by role for efficient filtering
    #[serde(skip_serializing)]
    by_role: EnumMap<Role, HashSet<Id>>,
    /// Display names members go by inside this group
    display_names: names::Names,
    /// Invitation records
    invitations: Invitations,
    /// Join-request records
    join_requests: JoinRequests,
}

impl From<GroupSerde> for Group {
    /// Reconstructs the Group from serialized data
    ///
    /// Rebuilds the role index from the member map, which is necessary
    /// since the index is not serialized.
    fn from(serde: GroupSerde) -> Self {
        let GroupSerde {
            id,
            name,
            code,
            members,
            display_names,
            invitations,
            join_requests,
        } = serde;
        let mut by_role: EnumMap<Role, HashSet<Id>> = EnumMap::default();
        for (member, role) in &members {
            by_role[*role].insert(*member);
        }
        Self {
            id,
            name,
            code,
            members,
            by_role,
            display_names,
            invitations,
            join_requests,
        }
    }
}

impl Group {
    /// Creates a new group owned by `owner`
    ///
    /// The group name goes through the same cleanup pipeline as display
    /// names (trim, content filter, title case) with its own length limit,
    /// and a fresh join code is generated.
    ///
    /// # Errors
    ///
    /// Returns a name error if the requested group name is empty, overlong,
    /// or inappropriate.
    pub fn new(name: &str, owner: Id) -> Result<Self, Error> {
        let name = names::sanitize(name, constants::group::MAX_NAME_LENGTH)?;
        let mut group = Self {
            id: GroupId::new(),
            name,
            code: GroupCode::new(),
            members: HashMap::default(),
            by_role: EnumMap::default(),
            display_names: names::Names::default(),
            invitations: Invitations::default(),
            join_requests: JoinRequests::default(),
        };
        group.admit(owner, Role::Owner);
        Ok(group)
    }

    /// Returns the group's unique identifier
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Returns the group's display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the group's join code
    pub fn code(&self) -> GroupCode {
        self.code
    }

    /// Returns the number of members
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Returns the role of `player_id`, if they are a member
    pub fn role_of(&self, player_id: Id) -> Option<Role> {
        self.members.get(&player_id).copied()
    }

    /// Returns whether `player_id` is a member
    pub fn is_member(&self, player_id: Id) -> bool {
        self.members.contains_key(&player_id)
    }

    /// Members holding `role`, in no particular order
    pub fn members_with_role(&self, role: Role) -> Vec<Id> {
        self.by_role[role].iter().copied().collect()
    }

    /// A truncated member-list preview for screens and notifications
    pub fn member_preview(&self) -> TruncatedVec<Id> {
        TruncatedVec::new(
            self.members.keys().copied(),
            constants::group::MEMBER_PREVIEW_LIMIT,
            self.members.len(),
        )
    }

    /// Read access to the invitation records
    pub fn invitations(&self) -> &Invitations {
        &self.invitations
    }

    /// Read access to the join-request records
    pub fn join_requests(&self) -> &JoinRequests {
        &self.join_requests
    }

    /// Sets the display name a member goes by inside this group
    ///
    /// # Errors
    ///
    /// * `Error::NotMember` - the player is not a member
    /// * `Error::Name` - the name failed validation or is taken
    pub fn set_display_name(&mut self, member: Id, name: &str) -> Result<String, Error> {
        if !self.is_member(member) {
            return Err(Error::NotMember);
        }
        Ok(self.display_names.set_name(member, name)?)
    }

    /// Returns the display name of a member, if set
    pub fn display_name(&self, member: Id) -> Option<String> {
        self.display_names.get_name(&member)
    }

    /// Invites `invitee` into the group
    ///
    /// # Errors
    ///
    /// * `Error::NotAuthorized` - `actor` is not an owner or admin
    /// * `Error::AlreadyMember` - the invitee is already in the group
    /// * `Error::Invitation` - the invitee already has a pending invitation
    pub fn invite(&mut self, actor: Id, invitee: Id) -> Result<InvitationId, Error> {
        self.require_manager(actor)?;
        if self.is_member(invitee) {
            return Err(Error::AlreadyMember);
        }
        Ok(self.invitations.issue(actor, invitee)?)
    }

    /// Accepts an invitation, joining the group as a regular member
    ///
    /// # Errors
    ///
    /// * `Error::AlreadyMember` - the actor is already in the group
    /// * `Error::GroupFull` - the member cap is reached
    /// * `Error::Invitation` - unknown, settled, or someone else's invitation
    pub fn accept_invitation(&mut self, id: InvitationId, actor: Id) -> Result<(), Error> {
        if self.is_member(actor) {
            return Err(Error::AlreadyMember);
        }
        if self.members.len() >= constants::group::MAX_MEMBER_COUNT {
            return Err(Error::GroupFull);
        }
        self.invitations.accept(id, actor)?;
        self.admit(actor, Role::Member);
        Ok(())
    }

    /// Declines an invitation
    ///
    /// # Errors
    ///
    /// Returns `Error::Invitation` for an unknown, settled, or someone
    /// else's invitation.
    pub fn decline_invitation(&mut self, id: InvitationId, actor: Id) -> Result<(), Error> {
        self.invitations.decline(id, actor)?;
        Ok(())
    }

    /// Revokes a pending invitation
    ///
    /// # Errors
    ///
    /// * `Error::NotAuthorized` - `actor` is not an owner or admin
    /// * `Error::Invitation` - unknown or settled invitation
    pub fn revoke_invitation(&mut self, actor: Id, id: InvitationId) -> Result<(), Error> {
        self.require_manager(actor)?;
        self.invitations.revoke(id)?;
        Ok(())
    }

    /// Submits a join request from `actor`
    ///
    /// # Errors
    ///
    /// * `Error::AlreadyMember` - the actor is already in the group
    /// * `Error::JoinRequest` - the actor already has a pending request
    pub fn request_join(&mut self, actor: Id) -> Result<JoinRequestId, Error> {
        if self.is_member(actor) {
            return Err(Error::AlreadyMember);
        }
        Ok(self.join_requests.submit(actor)?)
    }

    /// Approves a pending join request, admitting the requester
    ///
    /// # Errors
    ///
    /// * `Error::NotAuthorized` - `actor` is not an owner or admin
    /// * `Error::AlreadyMember` - the requester joined by other means meanwhile
    /// * `Error::GroupFull` - the member cap is reached
    /// * `Error::JoinRequest` - unknown or settled request
    pub fn approve_join(&mut self, actor: Id, id: JoinRequestId) -> Result<(), Error> {
        self.require_manager(actor)?;
        let requester = self
            .join_requests
            .get(id)
            .ok_or(join_request::Error::NotFound)?
            .requester;
        if self.is_member(requester) {
            return Err(Error::AlreadyMember);
        }
        if self.members.len() >= constants::group::MAX_MEMBER_COUNT {
            return Err(Error::GroupFull);
        }
        self.join_requests.approve(id)?;
        self.admit(requester, Role::Member);
        Ok(())
    }

    /// Rejects a pending join request
    ///
    /// # Errors
    ///
    /// * `Error::NotAuthorized` - `actor` is not an owner or admin
    /// * `Error::JoinRequest` - unknown or settled request
    pub fn reject_join(&mut self, actor: Id, id: JoinRequestId) -> Result<(), Error> {
        self.require_manager(actor)?;
        self.join_requests.reject(id)?;
        Ok(())
    }

    /// Withdraws a pending join request
    ///
    /// # Errors
    ///
    /// Returns `Error::JoinRequest` for an unknown, settled, or someone
    /// else's request.
    pub fn withdraw_join(&mut self, actor: Id, id: JoinRequestId) -> Result<(), Error> {
        self.join_requests.withdraw(id, actor)?;
        Ok(())
    }

    /// Removes `target` from the group
    ///
    /// Members may remove themselves (leaving); admins may remove ordinary
    /// members; the owner may remove anyone. The owner can never be removed
    /// — ownership must be handed over first via [`Group::set_role`].
    ///
    /// # Errors
    ///
    /// * `Error::NotMember` - the target is not a member
    /// * `Error::OwnerImmovable` - the target owns the group
    /// * `Error::NotAuthorized` - the actor may not remove the target
    pub fn remove_member(&mut self, actor: Id, target: Id) -> Result<(), Error> {
        let target_role = self.role_of(target).ok_or(Error::NotMember)?;
        if target_role == Role::Owner {
            return Err(Error::OwnerImmovable);
        }
        let allowed = actor == target
            || match self.role_of(actor) {
                Some(Role::Owner) => true,
                Some(Role::Admin) => target_role == Role::Member,
                Some(Role::Member) | None => false,
            };
        if !allowed {
            return Err(Error::NotAuthorized);
        }

        self.members.remove(&target);
        self.by_role[target_role].remove(&target);
        self.display_names.remove_name(&target);
        Ok(())
    }

    /// Changes `target`'s role
    ///
    /// Only the owner assigns roles. Assigning `Role::Owner` hands the
    /// group over: the previous owner becomes an admin.
    ///
    /// # Errors
    ///
    /// * `Error::NotAuthorized` - `actor` is not the owner, or targets
    ///   themselves
    /// * `Error::NotMember` - the target is not a member
    pub fn set_role(&mut self, actor: Id, target: Id, role: Role) -> Result<(), Error> {
        if self.role_of(actor) != Some(Role::Owner) || actor == target {
            return Err(Error::NotAuthorized);
        }
        if !self.is_member(target) {
            return Err(Error::NotMember);
        }

        if role == Role::Owner {
            self.reassign(actor, Role::Admin);
        }
        self.reassign(target, role);
        Ok(())
    }

    /// Sends an update message to every reachable member
    pub fn announce<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        message: &crate::UpdateMessage,
        tunnel_finder: F,
    ) {
        for &member in self.members.keys() {
            if let Some(tunnel) = tunnel_finder(member) {
                tunnel.send_message(message);
            }
        }
    }

    /// Sends an update message to reachable owners and admins only
    ///
    /// Used for admission traffic: join requests concern the people who can
    /// decide them, not the whole group.
    pub fn announce_managers<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        message: &crate::UpdateMessage,
        tunnel_finder: F,
    ) {
        for &member in self.by_role[Role::Owner]
            .iter()
            .chain(self.by_role[Role::Admin].iter())
        {
            if let Some(tunnel) = tunnel_finder(member) {
                tunnel.send_message(message);
            }
        }
    }

    /// Builds the sync message describing the current member list
    pub fn state_message(&self) -> SyncMessage {
        SyncMessage::MemberList(self.member_preview())
    }

    fn require_manager(&self, actor: Id) -> Result<(), Error> {
        if self.role_of(actor).is_some_and(Role::can_manage) {
            Ok(())
        } else {
            Err(Error::NotAuthorized)
        }
    }

    /// Inserts a member; all admission checks must already have passed
    fn admit(&mut self, player_id: Id, role: Role) {
        self.members.insert(player_id, role);
        self.by_role[role].insert(player_id);
    }

    fn reassign(&mut self, player_id: Id, role: Role) {
        if let Some(old_role) = self.members.insert(player_id, role) {
            self.by_role[old_role].remove(&player_id);
        }
        self.by_role[role].insert(player_id);
    }
}

/// Update messages sent to members about group changes
#[derive(Debug, Serialize, Clone)]
pub enum UpdateMessage {
    /// A player became a member
    MemberJoined {
        /// The new member
        player_id: Id,
        /// Member count after the join
        member_count: usize,
    },
    /// A member left or was removed
    MemberLeft {
        /// The departed member
        player_id: Id,
        /// Member count after the departure
        member_count: usize,
    },
    /// A member's role changed
    RoleChanged {
        /// The affected member
        player_id: Id,
        /// Their new role
        role: Role,
    },
    /// An invitation went out
    InvitationIssued {
        /// The invitation
        invitation_id: InvitationId,
        /// Who it is addressed to
        invitee: Id,
    },
    /// An invitation was answered or revoked
    InvitationSettled {
        /// The invitation
        invitation_id: InvitationId,
        /// How it settled
        status: invitation::Status,
    },
    /// A player asked to join
    JoinRequested {
        /// The request
        request_id: JoinRequestId,
        /// Who is asking
        requester: Id,
    },
    /// A join request was decided or withdrawn
    JoinSettled {
        /// The request
        request_id: JoinRequestId,
        /// How it settled
        status: join_request::Status,
    },
}

/// Sync messages that replace a member's view of the group
#[derive(Debug, Serialize, Clone)]
pub enum SyncMessage {
    /// Truncated member-list preview
    MemberList(TruncatedVec<Id>),
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    fn group_with_owner() -> (Group, Id) {
        let owner = Id::new();
        let group = Group::new("Pelada dos Amigos", owner).unwrap();
        (group, owner)
    }

    fn join_via_invitation(group: &mut Group, inviter: Id) -> Id {
        let invitee = Id::new();
        let invitation = group.invite(inviter, invitee).unwrap();
        group.accept_invitation(invitation, invitee).unwrap();
        invitee
    }

    #[test]
    fn test_new_group_has_single_owner() {
        let (group, owner) = group_with_owner();

        assert_eq!(group.member_count(), 1);
        assert_eq!(group.role_of(owner), Some(Role::Owner));
        assert_eq!(group.name(), "Pelada Dos Amigos");
        assert_eq!(group.members_with_role(Role::Owner), vec![owner]);
    }

    #[test]
    fn test_group_name_is_validated() {
        let owner = Id::new();
        assert!(matches!(
            Group::new("", owner),
            Err(Error::Name(names::Error::Empty))
        ));

        let long = "a".repeat(constants::group::MAX_NAME_LENGTH + 1);
        assert!(matches!(
            Group::new(&long, owner),
            Err(Error::Name(names::Error::TooLong))
        ));
    }

    #[test]
    fn test_invitation_admits_member() {
        let (mut group, owner) = group_with_owner();
        let member = join_via_invitation(&mut group, owner);

        assert_eq!(group.role_of(member), Some(Role::Member));
        assert_eq!(group.member_count(), 2);
    }

    #[test]
    fn test_plain_members_cannot_invite() {
        let (mut group, owner) = group_with_owner();
        let member = join_via_invitation(&mut group, owner);

        assert_eq!(
            group.invite(member, Id::new()),
            Err(Error::NotAuthorized)
        );
        assert_eq!(
            group.invite(Id::new(), Id::new()),
            Err(Error::NotAuthorized)
        );
    }

    #[test]
    fn test_admins_can_invite() {
        let (mut group, owner) = group_with_owner();
        let member = join_via_invitation(&mut group, owner);
        group.set_role(owner, member, Role::Admin).unwrap();

        assert!(group.invite(member, Id::new()).is_ok());
    }

    #[test]
    fn test_cannot_invite_existing_member() {
        let (mut group, owner) = group_with_owner();
        let member = join_via_invitation(&mut group, owner);

        assert_eq!(group.invite(owner, member), Err(Error::AlreadyMember));
    }

    #[test]
    fn test_accept_is_limited_to_the_invitee() {
        let (mut group, owner) = group_with_owner();
        let invitee = Id::new();
        let invitation = group.invite(owner, invitee).unwrap();

        assert_eq!(
            group.accept_invitation(invitation, Id::new()),
            Err(Error::Invitation(invitation::Error::WrongInvitee))
        );
        assert!(group.accept_invitation(invitation, invitee).is_ok());
    }

    #[test]
    fn test_declined_invitation_admits_nobody() {
        let (mut group, owner) = group_with_owner();
        let invitee = Id::new();
        let invitation = group.invite(owner, invitee).unwrap();

        group.decline_invitation(invitation, invitee).unwrap();
        assert!(!group.is_member(invitee));
        assert_eq!(group.member_count(), 1);
    }

    #[test]
    fn test_revoked_invitation_cannot_be_accepted() {
        let (mut group, owner) = group_with_owner();
        let invitee = Id::new();
        let invitation = group.invite(owner, invitee).unwrap();

        group.revoke_invitation(owner, invitation).unwrap();
        assert_eq!(
            group.accept_invitation(invitation, invitee),
            Err(Error::Invitation(invitation::Error::NotPending))
        );
    }

    #[test]
    fn test_revoke_is_gated() {
        let (mut group, owner) = group_with_owner();
        let member = join_via_invitation(&mut group, owner);
        let invitation = group.invite(owner, Id::new()).unwrap();

        assert_eq!(
            group.revoke_invitation(member, invitation),
            Err(Error::NotAuthorized)
        );
    }

    #[test]
    fn test_join_request_round_trip() {
        let (mut group, owner) = group_with_owner();
        let requester = Id::new();

        let request = group.request_join(requester).unwrap();
        group.approve_join(owner, request).unwrap();

        assert_eq!(group.role_of(requester), Some(Role::Member));
    }

    #[test]
    fn test_rejected_request_admits_nobody() {
        let (mut group, owner) = group_with_owner();
        let requester = Id::new();

        let request = group.request_join(requester).unwrap();
        group.reject_join(owner, request).unwrap();

        assert!(!group.is_member(requester));
    }

    #[test]
    fn test_approval_is_gated() {
        let (mut group, owner) = group_with_owner();
        let member = join_via_invitation(&mut group, owner);
        let request = group.request_join(Id::new()).unwrap();

        assert_eq!(
            group.approve_join(member, request),
            Err(Error::NotAuthorized)
        );
    }

    #[test]
    fn test_requester_can_withdraw() {
        let (mut group, owner) = group_with_owner();
        let requester = Id::new();
        let request = group.request_join(requester).unwrap();

        group.withdraw_join(requester, request).unwrap();
        assert_eq!(
            group.approve_join(owner, request),
            Err(Error::JoinRequest(join_request::Error::NotPending))
        );
    }

    #[test]
    fn test_members_can_leave() {
        let (mut group, owner) = group_with_owner();
        let member = join_via_invitation(&mut group, owner);

        group.remove_member(member, member).unwrap();
        assert!(!group.is_member(member));
    }

    #[test]
    fn test_admins_remove_members_but_not_admins() {
        let (mut group, owner) = group_with_owner();
        let admin = join_via_invitation(&mut group, owner);
        let other_admin = join_via_invitation(&mut group, owner);
        let member = join_via_invitation(&mut group, owner);
        group.set_role(owner, admin, Role::Admin).unwrap();
        group.set_role(owner, other_admin, Role::Admin).unwrap();

        assert!(group.remove_member(admin, member).is_ok());
        assert_eq!(
            group.remove_member(admin, other_admin),
            Err(Error::NotAuthorized)
        );
        // The owner outranks everyone.
        assert!(group.remove_member(owner, other_admin).is_ok());
    }

    #[test]
    fn test_owner_cannot_be_removed() {
        let (mut group, owner) = group_with_owner();
        let member = join_via_invitation(&mut group, owner);

        assert_eq!(
            group.remove_member(member, owner),
            Err(Error::OwnerImmovable)
        );
        assert_eq!(
            group.remove_member(owner, owner),
            Err(Error::OwnerImmovable)
        );
    }

    #[test]
    fn test_only_owner_assigns_roles() {
        let (mut group, owner) = group_with_owner();
        let admin = join_via_invitation(&mut group, owner);
        let member = join_via_invitation(&mut group, owner);
        group.set_role(owner, admin, Role::Admin).unwrap();

        assert_eq!(
            group.set_role(admin, member, Role::Admin),
            Err(Error::NotAuthorized)
        );
    }

    #[test]
    fn test_ownership_transfer_demotes_previous_owner() {
        let (mut group, owner) = group_with_owner();
        let successor = join_via_invitation(&mut group, owner);

        group.set_role(owner, successor, Role::Owner).unwrap();

        assert_eq!(group.role_of(successor), Some(Role::Owner));
        assert_eq!(group.role_of(owner), Some(Role::Admin));
        assert_eq!(group.members_with_role(Role::Owner), vec![successor]);
    }

    #[test]
    fn test_display_names_are_member_only_and_unique() {
        let (mut group, owner) = group_with_owner();
        let member = join_via_invitation(&mut group, owner);

        assert_eq!(
            group.set_display_name(Id::new(), "Intruso"),
            Err(Error::NotMember)
        );

        group.set_display_name(owner, "Capitao").unwrap();
        assert_eq!(
            group.set_display_name(member, "Capitao"),
            Err(Error::Name(names::Error::Used))
        );

        assert_eq!(group.display_name(owner), Some("Capitao".to_string()));
    }

    #[test]
    fn test_leaving_frees_the_display_name() {
        let (mut group, owner) = group_with_owner();
        let member = join_via_invitation(&mut group, owner);
        group.set_display_name(member, "Goleiro").unwrap();

        group.remove_member(member, member).unwrap();

        let replacement = join_via_invitation(&mut group, owner);
        assert!(group.set_display_name(replacement, "Goleiro").is_ok());
    }

    #[test]
    fn test_group_full() {
        let (mut group, owner) = group_with_owner();
        while group.member_count() < constants::group::MAX_MEMBER_COUNT {
            join_via_invitation(&mut group, owner);
        }

        let unlucky = Id::new();
        let invitation = group.invite(owner, unlucky).unwrap();
        assert_eq!(
            group.accept_invitation(invitation, unlucky),
            Err(Error::GroupFull)
        );

        let request = group.request_join(unlucky).unwrap();
        assert_eq!(group.approve_join(owner, request), Err(Error::GroupFull));
    }

    #[test]
    fn test_manager_announcements_skip_plain_members() {
        let (mut group, owner) = group_with_owner();
        let admin = join_via_invitation(&mut group, owner);
        let _member = join_via_invitation(&mut group, owner);
        group.set_role(owner, admin, Role::Admin).unwrap();

        struct CountingTunnel(Rc<RefCell<usize>>);
        impl Tunnel for CountingTunnel {
            fn send_message(&self, _message: &crate::UpdateMessage) {
                *self.0.borrow_mut() += 1;
            }
            fn send_state(&self, _state: &crate::SyncMessage) {}
            fn close(self) {}
        }

        let reached = Rc::new(RefCell::new(0));
        let message = crate::UpdateMessage::from(UpdateMessage::JoinRequested {
            request_id: JoinRequestId::new(),
            requester: Id::new(),
        });

        group.announce_managers(&message, |_| Some(CountingTunnel(Rc::clone(&reached))));
        assert_eq!(*reached.borrow(), 2, "owner and admin only");

        *reached.borrow_mut() = 0;
        group.announce(&message, |_| Some(CountingTunnel(Rc::clone(&reached))));
        assert_eq!(*reached.borrow(), 3, "everyone");
    }

    #[test]
    fn test_group_serde_rebuilds_role_index() {
        let (mut group, owner) = group_with_owner();
        let admin = join_via_invitation(&mut group, owner);
        group.set_role(owner, admin, Role::Admin).unwrap();

        let serialized = serde_json::to_string(&group).unwrap();
        let deserialized: Group = serde_json::from_str(&serialized).unwrap();

        assert_eq!(deserialized.member_count(), 2);
        assert_eq!(deserialized.role_of(admin), Some(Role::Admin));
        assert_eq!(deserialized.members_with_role(Role::Admin), vec![admin]);
        assert_eq!(deserialized.code(), group.code());
    }

    #[test]
    fn test_member_preview_counts_everyone() {
        let (mut group, owner) = group_with_owner();
        for _ in 0..3 {
            join_via_invitation(&mut group, owner);
        }

        let preview = group.member_preview();
        assert_eq!(preview.exact_count(), 4);
        assert_eq!(preview.items().len(), 4);
        assert!(matches!(group.state_message(), SyncMessage::MemberList(_)));
    }
}
