//! User records: who is registered with the server.
//!
//! A `User` tracks:
//! - WHO they are (id token and display name, both immutable)
//! - WHERE they currently are (an optional connection handle owned by
//!   the gateway; the user only records the association)
//! - WHEN they were last active (so the idle sweep knows when to
//!   reclaim them)

use std::time::{Duration, Instant};

use pointcast_protocol::{ConnectionId, UserId};

use crate::token;

/// One registered user.
///
/// Owned exclusively by the [`Registry`](crate::Registry); rooms refer
/// to users by id only. Lookups hand out clones, so a clone is a point-
/// in-time snapshot, not a live view.
#[derive(Debug, Clone)]
pub struct User {
    /// The user's id token, assigned at creation.
    pub id: UserId,

    /// The display name supplied at registration.
    pub username: String,

    /// The current connection, if any. Last writer wins: a reconnect
    /// simply overwrites, a disconnect clears.
    connection: Option<ConnectionId>,

    created_at: Instant,
    last_activity: Instant,
}

impl User {
    /// Creates a user with a fresh id and the clock started now.
    pub fn new(username: impl Into<String>) -> Self {
        let now = Instant::now();
        Self {
            id: UserId(token::generate()),
            username: username.into(),
            connection: None,
            created_at: now,
            last_activity: now,
        }
    }

    /// Marks the user as active now. Called by every tracked action the
    /// user performs.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Replaces the connection handle (or clears it with `None`).
    ///
    /// A blank handle is logged as a warning but the assignment still
    /// occurs — this is a defensive log point, not a rejected operation.
    /// Counts as user activity.
    pub fn set_connection(&mut self, connection: Option<ConnectionId>) {
        if let Some(conn) = &connection {
            if conn.0.trim().is_empty() {
                tracing::warn!(
                    user_id = %self.id,
                    "blank connection handle assigned to user"
                );
            }
        }
        tracing::debug!(
            user_id = %self.id,
            connection = ?connection,
            "user connection updated"
        );
        self.connection = connection;
        self.touch();
    }

    /// The current connection handle, if any.
    pub fn connection(&self) -> Option<&ConnectionId> {
        self.connection.as_ref()
    }

    /// Time since the last tracked activity. Does not itself count as
    /// activity.
    pub fn idle(&self) -> Duration {
        self.last_activity.elapsed()
    }

    /// Time since the user was created.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}
