//! Error types for the registry layer.

use pointcast_protocol::{RoomId, UserId};
use pointcast_room::RoomError;

/// Errors that can occur during registry operations.
///
/// All recoverable — the caller (gateway) decides whether to surface
/// them to the client or drop the request silently. None of them crash
/// anything and none are retried internally.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No room is registered under this id.
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// No user is registered under this id.
    #[error("user {0} not found")]
    UserNotFound(UserId),

    /// The user is already a member of a different room. A user belongs
    /// to at most one room at a time; they must leave before joining
    /// another.
    #[error("user {0} is already in room {1}")]
    AlreadyInRoom(UserId, RoomId),

    /// An error from the room itself (member missing, already revealed,
    /// actor gone).
    #[error(transparent)]
    Room(#[from] RoomError),
}
