//! Shared vocabulary for Pointcast.
//!
//! This crate defines the types that every other layer speaks:
//!
//! - **Identifiers** ([`RoomId`], [`UserId`], [`ConnectionId`]) — opaque
//!   string tokens that name rooms, users, and live connections.
//! - **Decks** ([`Deck`]) — the closed set of voting decks a room can use.
//! - **Snapshots** ([`RoomSnapshot`], [`MemberEntry`], [`RevealedVote`]) —
//!   the payloads the gateway broadcasts to a room's members.
//!
//! # Architecture
//!
//! The protocol layer sits below everything else. It knows nothing about
//! rooms, registries, or connections — it only defines the data shapes
//! they exchange.
//!
//! ```text
//! Registry (room/user maps) → Room (vote state machine) → Protocol (this crate)
//! ```

mod deck;
mod ids;
mod snapshot;

pub use deck::{Deck, UnknownDeck};
pub use ids::{ConnectionId, RoomId, UserId};
pub use snapshot::{MemberEntry, RevealedVote, RoomSnapshot};
