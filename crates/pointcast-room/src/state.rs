//! The synchronous room state machine.
//!
//! A room is always in one of two states:
//!
//! ```text
//!   Open ──(reveal)──→ Revealed
//!     ↑                    │
//!     └─────(reset)────────┘
//! ```
//!
//! - **Open**: members cast and re-cast hidden votes. Nobody — including
//!   a snapshot — can see a vote's value, only whether one was cast.
//! - **Revealed**: values are exposed via the reveal result and votes are
//!   frozen until a reset opens the next round.
//!
//! Two invariants the methods below protect:
//! - No vote value leaves this struct while the room is open, except back
//!   to the voter through their own re-vote overwriting it.
//! - A vote entry exists if and only if its user is currently a member.
//!
//! `Room` is deliberately not thread-safe — it is owned by a single room
//! actor task and mutated only from there (see `room.rs`).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use pointcast_protocol::{Deck, MemberEntry, RevealedVote, RoomId, RoomSnapshot, UserId};

use crate::RoomError;

/// Per-member vote state. The value is present if and only if the member
/// has voted in the current round; a reset clears it.
#[derive(Debug, Clone)]
struct Member {
    username: String,
    vote: Option<String>,
}

/// One estimation room: its members, their votes, and the reveal flag.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    deck: Deck,
    members: HashMap<UserId, Member>,
    votes_revealed: bool,
    created_at: Instant,
    last_activity: Instant,
}

impl Room {
    /// Creates an empty, open room.
    pub fn new(id: RoomId, deck: Deck) -> Self {
        let now = Instant::now();
        tracing::info!(room_id = %id, %deck, "room created");
        Self {
            id,
            deck,
            members: HashMap::new(),
            votes_revealed: false,
            created_at: now,
            last_activity: now,
        }
    }

    /// Ensures `user_id` is a member.
    ///
    /// Idempotent: a first add initializes the member with no vote, but
    /// re-adding an existing member (a reconnect) leaves their cast vote
    /// untouched. Counts as room activity either way.
    pub fn add_member(&mut self, user_id: UserId, username: String) {
        tracing::debug!(room_id = %self.id, %user_id, "member added");
        self.members
            .entry(user_id)
            .or_insert(Member { username, vote: None });
        self.touch();
    }

    /// Removes a member, dropping their vote entry with them.
    ///
    /// Returns whether a removal actually happened, so the caller can
    /// decide whether a broadcast is warranted. Only an actual removal
    /// counts as activity.
    pub fn remove_member(&mut self, user_id: &UserId) -> bool {
        if self.members.remove(user_id).is_some() {
            tracing::debug!(room_id = %self.id, %user_id, "member removed");
            self.touch();
            true
        } else {
            false
        }
    }

    /// Records `user_id`'s vote for the current round.
    ///
    /// Re-voting before the reveal overwrites the previous value. Once
    /// revealed, votes are frozen until [`reset_votes`](Self::reset_votes).
    ///
    /// # Errors
    /// - [`RoomError::AlreadyRevealed`] — the round is already revealed.
    /// - [`RoomError::MemberNotFound`] — the voter is not a member.
    ///
    /// Both leave the room unchanged.
    pub fn cast_vote(
        &mut self,
        user_id: &UserId,
        value: String,
    ) -> Result<(), RoomError> {
        if self.votes_revealed {
            return Err(RoomError::AlreadyRevealed(self.id.clone()));
        }
        let member = self.members.get_mut(user_id).ok_or_else(|| {
            RoomError::MemberNotFound(user_id.clone(), self.id.clone())
        })?;

        member.vote = Some(value);
        tracing::debug!(room_id = %self.id, %user_id, "vote cast");
        self.touch();
        Ok(())
    }

    /// Reveals the current round and returns every cast vote.
    ///
    /// One entry per member who has voted; members without a vote are
    /// omitted. Idempotent — calling it again without a reset returns the
    /// same set (votes can't change while revealed).
    pub fn reveal(&mut self) -> Vec<RevealedVote> {
        self.votes_revealed = true;
        self.touch();
        tracing::debug!(room_id = %self.id, "votes revealed");

        self.members
            .iter()
            .filter_map(|(user_id, member)| {
                member.vote.as_ref().map(|value| RevealedVote {
                    user_id: user_id.clone(),
                    value: value.clone(),
                })
            })
            .collect()
    }

    /// Clears every vote and opens the next round.
    ///
    /// Returns the ids of all current members so the caller can touch
    /// each member's own activity record (a reset is an action everyone
    /// participates in).
    pub fn reset_votes(&mut self) -> Vec<UserId> {
        for member in self.members.values_mut() {
            member.vote = None;
        }
        self.votes_revealed = false;
        self.touch();
        tracing::debug!(room_id = %self.id, "votes reset");

        self.members.keys().cloned().collect()
    }

    /// The room's visible state, for broadcasting.
    ///
    /// Never includes vote values — only the `has_voted` flag per member.
    /// Values are obtained exclusively through [`reveal`](Self::reveal).
    /// Taking a snapshot counts as room activity (someone is watching).
    pub fn snapshot(&mut self) -> RoomSnapshot {
        self.touch();
        RoomSnapshot {
            room_id: self.id.clone(),
            deck: self.deck,
            votes_revealed: self.votes_revealed,
            members: self
                .members
                .iter()
                .map(|(user_id, member)| MemberEntry {
                    id: user_id.clone(),
                    username: member.username.clone(),
                    has_voted: member.vote.is_some(),
                })
                .collect(),
        }
    }

    /// Time since the last tracked activity. Does NOT count as activity
    /// itself — the idle sweep reads this and must not keep rooms alive.
    pub fn idle(&self) -> Duration {
        self.last_activity.elapsed()
    }

    /// Time since the room was created.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// The room's id.
    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// The deck this room was created with.
    pub fn deck(&self) -> Deck {
        self.deck
    }

    /// Whether the current round has been revealed.
    pub fn votes_revealed(&self) -> bool {
        self.votes_revealed
    }

    /// Number of current members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

// =========================================================================
// Tests
// =========================================================================
