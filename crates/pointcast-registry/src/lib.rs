//! Room and user registry for Pointcast.
//!
//! This crate is the authoritative record of everything alive in the
//! process:
//!
//! 1. **Identity** — minting opaque id tokens ([`token::generate`])
//!    and tracking registered users ([`User`])
//! 2. **Routing** — mapping room ids to running room actors and
//!    connection handles to users ([`Registry`])
//! 3. **Reclamation** — sweeping rooms and users that have gone idle
//!    past their thresholds ([`spawn_sweeper`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Gateway (above)  ← resolves ids here, then talks to room handles
//!     ↕
//! Registry (this crate)  ← owns the id → room / id → user maps
//!     ↕
//! Room actors (below)  ← each room serializes its own mutations
//! ```
//!
//! Nothing here persists: the registry is constructed at process start,
//! lives for the lifetime of the process, and its contents are gone on
//! restart.

mod config;
mod error;
mod registry;
mod sweep;
pub mod token;
mod user;

pub use config::RegistryConfig;
pub use error::RegistryError;
pub use registry::Registry;
pub use sweep::spawn_sweeper;
pub use user::User;
