//! The registry: the process-wide maps of active rooms and users.
//!
//! One `Registry` instance is constructed at process start and passed
//! (behind an `Arc`) to every component that needs it — there are no
//! ambient globals.
//!
//! # Concurrency
//!
//! The maps live behind a single `std::sync::Mutex`. The guard is only
//! ever held for map lookups and inserts — never across an `await`.
//! Anything that needs to talk to a room clones its `RoomHandle` out of
//! the map, drops the guard, and then awaits the actor. Room-internal
//! mutation is therefore serialized by each room's own channel, while
//! registry structure changes (inserting/removing whole rooms and users)
//! are serialized by this lock, and the two never nest.
//!
//! # Indexes
//!
//! Besides the two authoritative maps (room id → handle, user id → user)
//! the registry maintains two secondary indexes, updated under the same
//! lock so they can never drift:
//!
//! - connection handle → user id, so a disconnect resolves its user
//!   without scanning every user
//! - user id → room id, which both enforces "a user is in at most one
//!   room" and lets leave/disconnect find the room directly

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use pointcast_protocol::{ConnectionId, Deck, RevealedVote, RoomId, RoomSnapshot, UserId};
use pointcast_room::{RoomHandle, spawn_room};

use crate::{RegistryError, User, token};

/// Command channel size for each spawned room actor.
const ROOM_CHANNEL_SIZE: usize = 64;

struct Inner {
    /// All live rooms, keyed by id.
    rooms: HashMap<RoomId, RoomHandle>,

    /// All registered users, keyed by id.
    users: HashMap<UserId, User>,

    /// Secondary index: connection handle → user. Kept in sync with
    /// each user's own `connection` field.
    connections: HashMap<ConnectionId, UserId>,

    /// Secondary index: which room each user is currently in.
    /// Absent key = not in any room. At most one entry per user.
    user_rooms: HashMap<UserId, RoomId>,
}

/// The authoritative mapping of id → room and id → user.
pub struct Registry {
    inner: Mutex<Inner>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                rooms: HashMap::new(),
                users: HashMap::new(),
                connections: HashMap::new(),
                user_rooms: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned mutex means another thread panicked while holding
        // the guard; the maps may be inconsistent, so propagating the
        // panic is the only sound option.
        self.inner.lock().expect("registry mutex poisoned")
    }

    // ---------------------------------------------------------------------
    // Creation and lookup
    // ---------------------------------------------------------------------

    /// Creates a room with a fresh id and spawns its actor.
    pub fn create_room(&self, deck: Deck) -> RoomId {
        let room_id = RoomId(token::generate());
        let handle = spawn_room(room_id.clone(), deck, ROOM_CHANNEL_SIZE);
        self.lock().rooms.insert(room_id.clone(), handle);
        tracing::info!(%room_id, %deck, "room registered");
        room_id
    }

    /// Registers a user with a fresh id.
    pub fn create_user(&self, username: impl Into<String>) -> UserId {
        let user = User::new(username);
        let user_id = user.id.clone();
        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        self.lock().users.insert(user_id.clone(), user);
        user_id
    }

    /// Looks up a room's handle by id. No side effects.
    pub fn lookup_room(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.lock().rooms.get(room_id).cloned()
    }

    /// Looks up a user by id, returning a point-in-time copy. No side
    /// effects.
    pub fn lookup_user(&self, user_id: &UserId) -> Option<User> {
        self.lock().users.get(user_id).cloned()
    }

    /// The room a user is currently in, if any.
    pub fn user_room(&self, user_id: &UserId) -> Option<RoomId> {
        self.lock().user_rooms.get(user_id).cloned()
    }

    /// Resolves a connection handle to its user via the secondary index.
    pub fn user_by_connection(&self, connection: &ConnectionId) -> Option<UserId> {
        self.lock().connections.get(connection).cloned()
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.lock().rooms.len()
    }

    /// Number of registered users.
    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    // ---------------------------------------------------------------------
    // Removal
    // ---------------------------------------------------------------------

    /// Removes a room, shutting down its actor and detaching any members
    /// from the one-room index. The members' user records are untouched.
    pub async fn remove_room(&self, room_id: &RoomId) -> Result<(), RegistryError> {
        let handle = {
            let mut inner = self.lock();
            let handle = inner
                .rooms
                .remove(room_id)
                .ok_or_else(|| RegistryError::RoomNotFound(room_id.clone()))?;
            inner.user_rooms.retain(|_, r| r != room_id);
            handle
        };

        // Actor may already be gone; removal from the map is what counts.
        let _ = handle.shutdown().await;
        tracing::info!(%room_id, "room removed");
        Ok(())
    }

    /// Removes a user, clearing their connection binding and their room
    /// membership. Their room itself stays alive.
    pub async fn remove_user(&self, user_id: &UserId) -> Result<(), RegistryError> {
        let membership = {
            let mut inner = self.lock();
            let user = inner
                .users
                .remove(user_id)
                .ok_or_else(|| RegistryError::UserNotFound(user_id.clone()))?;
            if let Some(conn) = user.connection() {
                inner.connections.remove(conn);
            }
            let room_id = inner.user_rooms.remove(user_id);
            room_id.and_then(|r| inner.rooms.get(&r).cloned())
        };

        if let Some(handle) = membership {
            let _ = handle.remove_member(user_id.clone()).await;
        }
        tracing::info!(%user_id, "user removed");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Room operations (resolve id, then talk to the actor)
    // ---------------------------------------------------------------------

    /// Adds a user to a room.
    ///
    /// A user can be in at most one room: joining a second room is
    /// rejected with [`RegistryError::AlreadyInRoom`]. Re-joining the
    /// room they're already in is allowed (that's a reconnect) and does
    /// not disturb any vote they have cast.
    pub async fn join_room(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
    ) -> Result<(), RegistryError> {
        let (handle, username) = {
            let mut inner = self.lock();
            let handle = inner
                .rooms
                .get(room_id)
                .cloned()
                .ok_or_else(|| RegistryError::RoomNotFound(room_id.clone()))?;
            let user = inner
                .users
                .get_mut(user_id)
                .ok_or_else(|| RegistryError::UserNotFound(user_id.clone()))?;
            user.touch();
            let username = user.username.clone();

            if let Some(current) = inner.user_rooms.get(user_id) {
                if current != room_id {
                    return Err(RegistryError::AlreadyInRoom(
                        user_id.clone(),
                        current.clone(),
                    ));
                }
            }
            inner.user_rooms.insert(user_id.clone(), room_id.clone());
            (handle, username)
        };

        if let Err(e) = handle.add_member(user_id.clone(), username).await {
            // The actor refused (shut down mid-join): roll back the index.
            self.lock().user_rooms.remove(user_id);
            return Err(e.into());
        }

        tracing::info!(%user_id, %room_id, "user joined room");
        Ok(())
    }

    /// Removes a user from their current room, if any.
    ///
    /// Returns whether a removal occurred, so the gateway knows whether
    /// a broadcast is warranted.
    pub async fn leave_room(&self, user_id: &UserId) -> Result<bool, RegistryError> {
        let handle = {
            let mut inner = self.lock();
            let Some(room_id) = inner.user_rooms.remove(user_id) else {
                return Ok(false);
            };
            if let Some(user) = inner.users.get_mut(user_id) {
                user.touch();
            }
            inner.rooms.get(&room_id).cloned()
        };

        match handle {
            // Room already swept: the membership went with it.
            None => Ok(false),
            Some(handle) => match handle.remove_member(user_id.clone()).await {
                Ok(removed) => Ok(removed),
                Err(_) => Ok(false),
            },
        }
    }

    /// Records a user's vote in a room.
    pub async fn cast_vote(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        value: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let handle = self.touch_and_resolve(room_id, user_id)?;
        handle.cast_vote(user_id.clone(), value.into()).await?;
        Ok(())
    }

    /// Reveals a room's current round, returning every cast vote.
    pub async fn reveal(&self, room_id: &RoomId) -> Result<Vec<RevealedVote>, RegistryError> {
        let handle = self.resolve(room_id)?;
        Ok(handle.reveal().await?)
    }

    /// Clears a room's votes and opens the next round.
    ///
    /// A reset is an action every member participates in, so each
    /// member's own activity record is touched along with the room's.
    pub async fn reset_votes(&self, room_id: &RoomId) -> Result<(), RegistryError> {
        let handle = self.resolve(room_id)?;
        let members = handle.reset_votes().await?;

        let mut inner = self.lock();
        for member_id in &members {
            if let Some(user) = inner.users.get_mut(member_id) {
                user.touch();
            }
        }
        Ok(())
    }

    /// The broadcastable state of a room. Counts as room activity.
    pub async fn snapshot(&self, room_id: &RoomId) -> Result<RoomSnapshot, RegistryError> {
        let handle = self.resolve(room_id)?;
        Ok(handle.snapshot().await?)
    }

    fn resolve(&self, room_id: &RoomId) -> Result<RoomHandle, RegistryError> {
        self.lock()
            .rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RegistryError::RoomNotFound(room_id.clone()))
    }

    fn touch_and_resolve(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
    ) -> Result<RoomHandle, RegistryError> {
        let mut inner = self.lock();
        if let Some(user) = inner.users.get_mut(user_id) {
            user.touch();
        }
        inner
            .rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RegistryError::RoomNotFound(room_id.clone()))
    }

    // ---------------------------------------------------------------------
    // Connection tracking
    // ---------------------------------------------------------------------

    /// Binds (or clears, with `None`) a user's connection handle.
    ///
    /// The user's field and the connection index are updated under the
    /// same lock acquisition, so the index can never point at a stale
    /// binding.
    pub fn bind_connection(
        &self,
        user_id: &UserId,
        connection: Option<ConnectionId>,
    ) -> Result<(), RegistryError> {
        let mut inner = self.lock();
        let user = inner
            .users
            .get_mut(user_id)
            .ok_or_else(|| RegistryError::UserNotFound(user_id.clone()))?;

        let old = user.connection().cloned();
        user.set_connection(connection.clone());

        if let Some(old) = old {
            inner.connections.remove(&old);
        }
        if let Some(conn) = connection {
            inner.connections.insert(conn, user_id.clone());
        }
        Ok(())
    }

    /// Handles a gateway disconnect: resolves the connection to its
    /// user, clears the binding, and removes the user from their room.
    ///
    /// Returns `(user, room they were removed from)` so the gateway can
    /// broadcast the room's new state; `None` if the connection was
    /// unknown. The user record itself survives until the idle sweep —
    /// if they reconnect in time, their id (and any cast vote, via a
    /// re-join) is still good.
    pub async fn disconnect(
        &self,
        connection: &ConnectionId,
    ) -> Option<(UserId, Option<RoomId>)> {
        let (user_id, membership) = {
            let mut inner = self.lock();
            let user_id = inner.connections.remove(connection)?;
            if let Some(user) = inner.users.get_mut(&user_id) {
                user.set_connection(None);
            }
            let room_id = inner.user_rooms.remove(&user_id);
            let handle = room_id.as_ref().and_then(|r| inner.rooms.get(r).cloned());
            (user_id, room_id.zip(handle))
        };

        let mut left = None;
        if let Some((room_id, handle)) = membership {
            if handle.remove_member(user_id.clone()).await.unwrap_or(false) {
                left = Some(room_id);
            }
        }

        tracing::info!(%user_id, %connection, room = ?left, "connection disconnected");
        Some((user_id, left))
    }

    // ---------------------------------------------------------------------
    // Idle sweep
    // ---------------------------------------------------------------------

    /// Removes every room idle longer than `room_timeout` and every user
    /// idle longer than `user_timeout`. Returns `(rooms, users)` removed.
    ///
    /// The two passes are independent by design: an expired room does
    /// not drag its still-active users down with it, and an expired user
    /// does not expire their room (the room merely loses that member).
    pub async fn sweep(
        &self,
        room_timeout: Duration,
        user_timeout: Duration,
    ) -> (usize, usize) {
        let swept_rooms = self.sweep_rooms(room_timeout).await;
        let swept_users = self.sweep_users(user_timeout).await;
        (swept_rooms, swept_users)
    }

    async fn sweep_rooms(&self, timeout: Duration) -> usize {
        let handles: Vec<RoomHandle> = {
            let inner = self.lock();
            inner.rooms.values().cloned().collect()
        };

        // Query idle times without the lock — get_info goes through each
        // room's channel and deliberately does not count as activity.
        let mut expired = Vec::new();
        for handle in handles {
            match handle.get_info().await {
                Ok(info) if info.idle > timeout => expired.push(handle),
                Ok(_) => {}
                // Actor is gone but still mapped: reclaim it too.
                Err(_) => expired.push(handle),
            }
        }

        let mut removed = 0;
        for handle in expired {
            let room_id = handle.room_id().clone();
            {
                let mut inner = self.lock();
                if inner.rooms.remove(&room_id).is_none() {
                    continue; // already removed by a concurrent caller
                }
                inner.user_rooms.retain(|_, r| r != &room_id);
            }
            let _ = handle.shutdown().await;
            tracing::info!(%room_id, "idle room swept");
            removed += 1;
        }
        removed
    }

    async fn sweep_users(&self, timeout: Duration) -> usize {
        let expired = {
            let mut inner = self.lock();
            let expired_ids: Vec<UserId> = inner
                .users
                .values()
                .filter(|u| u.idle() > timeout)
                .map(|u| u.id.clone())
                .collect();

            let mut expired = Vec::new();
            for user_id in expired_ids {
                // Checked membership above; remove cannot miss.
                let user = inner.users.remove(&user_id).expect("id collected above");
                if let Some(conn) = user.connection() {
                    inner.connections.remove(conn);
                }
                let room_id = inner.user_rooms.remove(&user_id);
                let handle = room_id.and_then(|r| inner.rooms.get(&r).cloned());
                expired.push((user_id, handle));
            }
            expired
        };

        let mut removed = 0;
        for (user_id, handle) in expired {
            // A swept user must not leave a dangling vote entry behind.
            if let Some(handle) = handle {
                let _ = handle.remove_member(user_id.clone()).await;
            }
            tracing::info!(%user_id, "idle user swept");
            removed += 1;
        }
        removed
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
