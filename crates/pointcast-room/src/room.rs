//! Room actor: an isolated Tokio task that owns one [`Room`].
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. The channel is the room's mutual exclusion:
//! commands are processed one at a time, so a vote can never interleave
//! with a reveal, and a reveal can never observe a half-recorded vote.
//! Different rooms are different tasks — they never contend.
//!
//! Ordering for broadcast-after-mutation: every handle method awaits the
//! actor's reply before returning, so a snapshot requested after a
//! mutation completes is guaranteed to observe that mutation.

use pointcast_protocol::{Deck, RevealedVote, RoomId, RoomSnapshot, UserId};
use tokio::sync::{mpsc, oneshot};

use crate::{Room, RoomError};

/// Operations sent to a room actor through its channel.
///
/// The `oneshot::Sender` in each variant is the reply channel — the
/// caller sends a command and waits for the response on it.
enum RoomCommand {
    /// Ensure a user is a member (idempotent; preserves an existing vote).
    AddMember {
        user_id: UserId,
        username: String,
        reply: oneshot::Sender<()>,
    },

    /// Remove a member. Replies whether a removal actually occurred.
    RemoveMember {
        user_id: UserId,
        reply: oneshot::Sender<bool>,
    },

    /// Record a member's vote for the current round.
    CastVote {
        user_id: UserId,
        value: String,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Reveal the round and reply with every cast vote.
    Reveal {
        reply: oneshot::Sender<Vec<RevealedVote>>,
    },

    /// Clear all votes and open the next round. Replies with the member
    /// ids whose own activity records should be touched.
    ResetVotes {
        reply: oneshot::Sender<Vec<UserId>>,
    },

    /// Request the broadcastable state (counts as room activity).
    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },

    /// Request room metadata without touching activity (sweep read).
    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },

    /// Shut down the room.
    Shutdown,
}

/// A snapshot of room metadata (not the member-visible state).
///
/// `idle` is how long the room has gone without tracked activity —
/// this is what the registry's sweep compares against the idle timeout.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    /// The room's unique id.
    pub room_id: RoomId,
    /// The deck the room was created with.
    pub deck: Deck,
    /// Number of current members.
    pub member_count: usize,
    /// Whether the current round is revealed.
    pub votes_revealed: bool,
    /// Time since the last tracked activity.
    pub idle: std::time::Duration,
}

/// Handle to a running room actor. Used to send operations to it.
///
/// Cheap to clone — it's just an `mpsc::Sender` wrapper. The registry
/// holds one of these per room.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// The room's unique id.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Ensures a user is a member of the room.
    pub async fn add_member(
        &self,
        user_id: UserId,
        username: String,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::AddMember {
            user_id,
            username,
            reply: reply_tx,
        })
        .await?;
        self.recv(reply_rx).await
    }

    /// Removes a member. Returns whether a removal occurred.
    pub async fn remove_member(&self, user_id: UserId) -> Result<bool, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::RemoveMember {
            user_id,
            reply: reply_tx,
        })
        .await?;
        self.recv(reply_rx).await
    }

    /// Records a member's vote.
    pub async fn cast_vote(
        &self,
        user_id: UserId,
        value: String,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::CastVote {
            user_id,
            value,
            reply: reply_tx,
        })
        .await?;
        self.recv(reply_rx).await?
    }

    /// Reveals the round, returning every cast vote.
    pub async fn reveal(&self) -> Result<Vec<RevealedVote>, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Reveal { reply: reply_tx }).await?;
        self.recv(reply_rx).await
    }

    /// Clears all votes and opens the next round. Returns the member ids
    /// whose own activity the caller should touch.
    pub async fn reset_votes(&self) -> Result<Vec<UserId>, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::ResetVotes { reply: reply_tx }).await?;
        self.recv(reply_rx).await
    }

    /// Requests the broadcastable room state.
    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Snapshot { reply: reply_tx }).await?;
        self.recv(reply_rx).await
    }

    /// Requests room metadata. Does not count as activity.
    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::GetInfo { reply: reply_tx }).await?;
        self.recv(reply_rx).await
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    async fn recv<T>(&self, reply_rx: oneshot::Receiver<T>) -> Result<T, RoomError> {
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }
}

/// The internal room actor. Runs inside a Tokio task and owns the [`Room`].
struct RoomActor {
    room: Room,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown.
    ///
    /// Replies are sent with `let _ =` — a caller that dropped its reply
    /// receiver simply doesn't get an answer; the mutation still happened.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room.id(), "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::AddMember {
                    user_id,
                    username,
                    reply,
                } => {
                    self.room.add_member(user_id, username);
                    let _ = reply.send(());
                }
                RoomCommand::RemoveMember { user_id, reply } => {
                    let _ = reply.send(self.room.remove_member(&user_id));
                }
                RoomCommand::CastVote {
                    user_id,
                    value,
                    reply,
                } => {
                    let _ = reply.send(self.room.cast_vote(&user_id, value));
                }
                RoomCommand::Reveal { reply } => {
                    let _ = reply.send(self.room.reveal());
                }
                RoomCommand::ResetVotes { reply } => {
                    let _ = reply.send(self.room.reset_votes());
                }
                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send(self.room.snapshot());
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(RoomInfo {
                        room_id: self.room.id().clone(),
                        deck: self.room.deck(),
                        member_count: self.room.member_count(),
                        votes_revealed: self.room.votes_revealed(),
                        idle: self.room.idle(),
                    });
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room_id = %self.room.id(), "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.room.id(), "room actor stopped");
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
///
/// `channel_size` controls backpressure — if the channel fills up,
/// senders wait (bounded channel).
pub fn spawn_room(room_id: RoomId, deck: Deck, channel_size: usize) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        room: Room::new(room_id.clone(), deck),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
