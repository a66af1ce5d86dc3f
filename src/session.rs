//! Notification delivery seam
//!
//! This module defines the trait for delivering notifications from the game
//! logic to connected participants. The tunnel abstraction keeps the library
//! free of transport concerns: the embedding application implements it over
//! WebSockets, push notifications, or whatever channel it has.

use super::{SyncMessage, UpdateMessage};

/// Trait for sending messages through a communication tunnel
///
/// One tunnel corresponds to one reachable participant. Fan-out helpers in
/// this crate look tunnels up per player ID through a caller-supplied finder
/// closure, so an unreachable participant simply yields no tunnel.
pub trait Tunnel {
    /// Sends an update message to the participant
    ///
    /// Update messages notify participants about changes that affect them:
    /// roster movement, a fresh draw, membership decisions.
    fn send_message(&self, message: &UpdateMessage);

    /// Sends a state synchronization message to the participant
    ///
    /// Sync messages replace the participant's view wholesale, typically on
    /// connect or reconnect.
    fn send_state(&self, state: &SyncMessage);

    /// Closes the communication tunnel
    fn close(self);
}
