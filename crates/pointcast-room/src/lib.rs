//! Estimation-room state machine for Pointcast.
//!
//! A room is a small group of users who each cast a hidden vote from a
//! fixed deck, then reveal all votes at once. This crate provides two
//! layers:
//!
//! - [`Room`] — the synchronous state machine: membership, per-member
//!   vote state, the open ⇄ revealed flag, and activity tracking.
//! - [`RoomHandle`] / [`spawn_room`] — the actor wrapper. Each room runs
//!   in its own Tokio task and processes commands from an mpsc channel,
//!   so all mutations of one room are serialized without any lock, and
//!   different rooms never contend with each other.
//!
//! # Key types
//!
//! - [`Room`] — vote/reveal/reset state machine
//! - [`RoomHandle`] — send operations to a running room actor
//! - [`RoomInfo`] — metadata read used by the idle sweep
//! - [`RoomError`] — what can go wrong (member missing, already revealed)

mod error;
mod room;
mod state;

pub use error::RoomError;
pub use room::{RoomHandle, RoomInfo, spawn_room};
pub use state::Room;
