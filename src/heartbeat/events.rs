//! Link lifecycle and attribute events delivered by the stack
//!
//! The vendor stack delivers these through a single serialized callback
//! path; the service reacts, it never polls.

use crate::gatt::{AttributeHandle, ConnectionToken};

/// One stack-delivered event relevant to a registered attribute group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceEvent<'a> {
    /// A central connected; the link is identified by `token`
    Connected { token: ConnectionToken },
    /// The active link was lost
    Disconnected,
    /// The remote wrote `data` to the attribute at `handle`
    Write {
        handle: AttributeHandle,
        data: &'a [u8],
    },
    /// ATT MTU negotiation completed; carried for completeness, not acted on
    MtuUpdated { mtu: u16 },
}

/// Current link status
///
/// The radio underneath supports exactly one peripheral-role link, so this
/// is a single scalar: idle, or connected under one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// No active link
    #[default]
    Idle,
    /// Connected to a central under the given token
    Connected(ConnectionToken),
}

impl LinkState {
    /// Token of the active link, if any
    pub fn token(self) -> Option<ConnectionToken> {
        match self {
            LinkState::Idle => None,
            LinkState::Connected(token) => Some(token),
        }
    }

    /// Whether a link is currently active
    pub fn is_connected(self) -> bool {
        matches!(self, LinkState::Connected(_))
    }
}
