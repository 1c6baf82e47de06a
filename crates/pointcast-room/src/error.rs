//! Error types for the room layer.

use pointcast_protocol::{RoomId, UserId};

/// Errors that can occur during room operations.
///
/// All of these are recoverable: the room's state is unchanged when one
/// is returned, and surfacing them to the client is the gateway's job.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The operation referenced a user who is not a member of this room.
    #[error("user {0} is not a member of room {1}")]
    MemberNotFound(UserId, RoomId),

    /// A vote was cast after the room revealed. Votes are immutable once
    /// revealed; a reset opens a new round.
    #[error("votes in room {0} are already revealed")]
    AlreadyRevealed(RoomId),

    /// The room's command channel is closed — the actor has shut down.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
