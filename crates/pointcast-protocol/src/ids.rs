//! Identifier newtypes.
//!
//! All three identifiers are opaque string tokens. Room and user ids are
//! 64-character lowercase-hex tokens minted by the registry's generator;
//! connection ids come from the gateway (whatever its transport assigns
//! to a live connection). Wrapping them in distinct newtypes means a
//! `UserId` can never be passed where a `RoomId` is expected, even though
//! both are strings underneath.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unique identifier for a room.
///
/// `#[serde(transparent)]` serializes this as the bare string, not as a
/// one-field object — `"a3f9…"` on the wire, not `{ "0": "a3f9…" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The gateway's identifier for one live connection.
///
/// The registry records the association between a user and their current
/// connection, but the gateway owns the connection itself. Last writer
/// wins: a reconnecting client simply overwrites the old binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub String);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
