//! Integration tests for the registry: lifecycle, routing, indexes,
//! and the idle sweep.
//!
//! # Testing time-dependent behavior
//!
//! Sweep expiry depends on elapsed time. Instead of sleeping past real
//! thresholds, these tests use two configurations:
//!   - `Duration::ZERO` timeouts → everything is expired immediately
//!   - one-hour timeouts → nothing expires during the test
//!
//! This keeps the tests fast and deterministic.

use std::sync::Arc;
use std::time::Duration;

use pointcast_protocol::{ConnectionId, Deck, RoomId, UserId};
use pointcast_registry::{Registry, RegistryConfig, RegistryError, spawn_sweeper};
use pointcast_room::RoomError;

const HOUR: Duration = Duration::from_secs(3600);

fn conn(s: &str) -> ConnectionId {
    ConnectionId(s.to_string())
}

/// Creates a registry with one fibonacci room and two joined users.
async fn registry_with_room() -> (Registry, RoomId, UserId, UserId) {
    let registry = Registry::new();
    let room = registry.create_room(Deck::Fibonacci);
    let alice = registry.create_user("alice");
    let bob = registry.create_user("bob");
    registry.join_room(&room, &alice).await.unwrap();
    registry.join_room(&room, &bob).await.unwrap();
    (registry, room, alice, bob)
}

// =========================================================================
// Creation and lookup
// =========================================================================

#[tokio::test]
async fn test_create_room_returns_unique_token_ids() {
    let registry = Registry::new();

    let r1 = registry.create_room(Deck::Fibonacci);
    let r2 = registry.create_room(Deck::Fibonacci);

    assert_ne!(r1, r2);
    assert_eq!(r1.0.len(), 64);
    assert_eq!(registry.room_count(), 2);
}

#[tokio::test]
async fn test_lookup_unknown_ids_return_none() {
    let registry = Registry::new();

    assert!(registry.lookup_room(&RoomId("nope".to_string())).is_none());
    assert!(registry.lookup_user(&UserId("nope".to_string())).is_none());
    assert!(registry.user_by_connection(&conn("nope")).is_none());
}

#[tokio::test]
async fn test_lookup_user_returns_registered_record() {
    let registry = Registry::new();
    let id = registry.create_user("alice");

    let user = registry.lookup_user(&id).unwrap();

    assert_eq!(user.id, id);
    assert_eq!(user.username, "alice");
    assert!(user.connection().is_none());
}

// =========================================================================
// Join / leave and the one-room invariant
// =========================================================================

#[tokio::test]
async fn test_join_room_then_snapshot_shows_member() {
    let (registry, room, alice, _) = registry_with_room().await;

    let snapshot = registry.snapshot(&room).await.unwrap();

    assert_eq!(snapshot.members.len(), 2);
    let entry = snapshot.members.iter().find(|m| m.id == alice).unwrap();
    assert_eq!(entry.username, "alice");
    assert!(!entry.has_voted);
}

#[tokio::test]
async fn test_join_second_room_is_rejected() {
    let (registry, room, alice, _) = registry_with_room().await;
    let other = registry.create_room(Deck::Tshirt);

    let result = registry.join_room(&other, &alice).await;

    assert!(matches!(
        result,
        Err(RegistryError::AlreadyInRoom(u, r)) if u == alice && r == room
    ));
    assert_eq!(registry.user_room(&alice), Some(room));
}

#[tokio::test]
async fn test_rejoin_same_room_preserves_cast_vote() {
    // A reconnecting user re-joins the room they're already in; their
    // hidden vote must survive.
    let (registry, room, alice, _) = registry_with_room().await;
    registry.cast_vote(&room, &alice, "5").await.unwrap();

    registry.join_room(&room, &alice).await.unwrap();

    let snapshot = registry.snapshot(&room).await.unwrap();
    let entry = snapshot.members.iter().find(|m| m.id == alice).unwrap();
    assert!(entry.has_voted);
}

#[tokio::test]
async fn test_join_unknown_room_or_user_fails() {
    let registry = Registry::new();
    let room = registry.create_room(Deck::Fibonacci);
    let user = registry.create_user("alice");

    let bad_room = registry
        .join_room(&RoomId("nope".to_string()), &user)
        .await;
    assert!(matches!(bad_room, Err(RegistryError::RoomNotFound(_))));

    let bad_user = registry
        .join_room(&room, &UserId("nope".to_string()))
        .await;
    assert!(matches!(bad_user, Err(RegistryError::UserNotFound(_))));
}

#[tokio::test]
async fn test_leave_room_reports_whether_removed() {
    let (registry, room, alice, _) = registry_with_room().await;

    assert!(registry.leave_room(&alice).await.unwrap());
    assert_eq!(registry.user_room(&alice), None);
    // Second leave: not in any room anymore.
    assert!(!registry.leave_room(&alice).await.unwrap());

    let snapshot = registry.snapshot(&room).await.unwrap();
    assert_eq!(snapshot.members.len(), 1);
}

// =========================================================================
// Voting through the registry
// =========================================================================

#[tokio::test]
async fn test_vote_reveal_reset_round_trip() {
    let (registry, room, alice, bob) = registry_with_room().await;

    registry.cast_vote(&room, &alice, "3").await.unwrap();
    registry.cast_vote(&room, &bob, "5").await.unwrap();

    let mut votes = registry.reveal(&room).await.unwrap();
    votes.sort_by(|a, b| a.user_id.0.cmp(&b.user_id.0));
    assert_eq!(votes.len(), 2);

    // Votes are frozen until reset.
    let frozen = registry.cast_vote(&room, &alice, "8").await;
    assert!(matches!(
        frozen,
        Err(RegistryError::Room(RoomError::AlreadyRevealed(_)))
    ));

    registry.reset_votes(&room).await.unwrap();
    let snapshot = registry.snapshot(&room).await.unwrap();
    assert!(!snapshot.votes_revealed);
    assert!(snapshot.members.iter().all(|m| !m.has_voted));
    registry.cast_vote(&room, &alice, "8").await.unwrap();
}

#[tokio::test]
async fn test_cast_vote_unknown_room_fails() {
    let registry = Registry::new();
    let user = registry.create_user("alice");

    let result = registry
        .cast_vote(&RoomId("nope".to_string()), &user, "5")
        .await;

    assert!(matches!(result, Err(RegistryError::RoomNotFound(_))));
}

#[tokio::test]
async fn test_reset_votes_touches_every_member() {
    let (registry, room, alice, bob) = registry_with_room().await;
    tokio::time::sleep(Duration::from_millis(15)).await;
    assert!(registry.lookup_user(&alice).unwrap().idle() >= Duration::from_millis(10));

    registry.reset_votes(&room).await.unwrap();

    // Both members were marked active by the reset.
    assert!(registry.lookup_user(&alice).unwrap().idle() < Duration::from_millis(10));
    assert!(registry.lookup_user(&bob).unwrap().idle() < Duration::from_millis(10));
}

// =========================================================================
// Connection index
// =========================================================================

#[tokio::test]
async fn test_bind_connection_maintains_index() {
    let registry = Registry::new();
    let alice = registry.create_user("alice");

    registry.bind_connection(&alice, Some(conn("sock-1"))).unwrap();
    assert_eq!(registry.user_by_connection(&conn("sock-1")), Some(alice.clone()));

    // Rebinding moves the index entry; the old handle resolves nothing.
    registry.bind_connection(&alice, Some(conn("sock-2"))).unwrap();
    assert_eq!(registry.user_by_connection(&conn("sock-1")), None);
    assert_eq!(registry.user_by_connection(&conn("sock-2")), Some(alice.clone()));

    // Clearing removes it entirely.
    registry.bind_connection(&alice, None).unwrap();
    assert_eq!(registry.user_by_connection(&conn("sock-2")), None);
    assert!(registry.lookup_user(&alice).unwrap().connection().is_none());
}

#[tokio::test]
async fn test_disconnect_removes_member_but_keeps_user() {
    let (registry, room, alice, _) = registry_with_room().await;
    registry.bind_connection(&alice, Some(conn("sock-1"))).unwrap();

    let (user_id, left) = registry.disconnect(&conn("sock-1")).await.unwrap();

    assert_eq!(user_id, alice);
    assert_eq!(left, Some(room.clone()));
    // Gone from the room and the indexes...
    assert_eq!(registry.user_room(&alice), None);
    assert_eq!(registry.user_by_connection(&conn("sock-1")), None);
    let snapshot = registry.snapshot(&room).await.unwrap();
    assert!(snapshot.members.iter().all(|m| m.id != alice));
    // ...but the user record survives until the idle sweep.
    assert!(registry.lookup_user(&alice).is_some());
}

#[tokio::test]
async fn test_disconnect_unknown_connection_returns_none() {
    let registry = Registry::new();
    assert!(registry.disconnect(&conn("nope")).await.is_none());
}

// =========================================================================
// Removal
// =========================================================================

#[tokio::test]
async fn test_remove_room_detaches_members() {
    let (registry, room, alice, bob) = registry_with_room().await;

    registry.remove_room(&room).await.unwrap();

    assert!(registry.lookup_room(&room).is_none());
    assert_eq!(registry.user_room(&alice), None);
    assert_eq!(registry.user_room(&bob), None);
    // The users themselves are untouched.
    assert_eq!(registry.user_count(), 2);
}

#[tokio::test]
async fn test_remove_user_leaves_their_room() {
    let (registry, room, alice, _) = registry_with_room().await;

    registry.remove_user(&alice).await.unwrap();

    assert!(registry.lookup_user(&alice).is_none());
    let snapshot = registry.snapshot(&room).await.unwrap();
    assert_eq!(snapshot.members.len(), 1);
}

#[tokio::test]
async fn test_remove_unknown_entities_fail() {
    let registry = Registry::new();

    let room = registry.remove_room(&RoomId("nope".to_string())).await;
    assert!(matches!(room, Err(RegistryError::RoomNotFound(_))));

    let user = registry.remove_user(&UserId("nope".to_string())).await;
    assert!(matches!(user, Err(RegistryError::UserNotFound(_))));
}

// =========================================================================
// Idle sweep
// =========================================================================

#[tokio::test]
async fn test_sweep_within_thresholds_removes_nothing() {
    let (registry, room, alice, _) = registry_with_room().await;

    let (rooms, users) = registry.sweep(HOUR, HOUR).await;

    assert_eq!((rooms, users), (0, 0));
    assert!(registry.lookup_room(&room).is_some());
    assert!(registry.lookup_user(&alice).is_some());
}

#[tokio::test]
async fn test_sweep_past_threshold_removes_room_and_lookup_fails() {
    // Zero timeout: any elapsed time counts as expired.
    let registry = Registry::new();
    let room = registry.create_room(Deck::Fibonacci);

    let (rooms, _) = registry.sweep(Duration::ZERO, HOUR).await;

    assert_eq!(rooms, 1);
    assert!(registry.lookup_room(&room).is_none());
    assert_eq!(registry.room_count(), 0);
}

#[tokio::test]
async fn test_sweep_expired_room_keeps_active_users() {
    // The room and user passes are independent: losing the room does
    // not expire its members.
    let (registry, room, alice, bob) = registry_with_room().await;

    let (rooms, users) = registry.sweep(Duration::ZERO, HOUR).await;

    assert_eq!((rooms, users), (1, 0));
    assert!(registry.lookup_room(&room).is_none());
    assert!(registry.lookup_user(&alice).is_some());
    assert!(registry.lookup_user(&bob).is_some());
    // Their membership went with the room.
    assert_eq!(registry.user_room(&alice), None);
}

#[tokio::test]
async fn test_sweep_expired_user_keeps_room_and_drops_membership() {
    let (registry, room, alice, bob) = registry_with_room().await;

    let (rooms, users) = registry.sweep(HOUR, Duration::ZERO).await;

    assert_eq!((rooms, users), (0, 2));
    assert!(registry.lookup_room(&room).is_some());
    assert!(registry.lookup_user(&alice).is_none());
    assert!(registry.lookup_user(&bob).is_none());
    // No dangling vote entries: the room is empty now.
    let snapshot = registry.snapshot(&room).await.unwrap();
    assert!(snapshot.members.is_empty());
}

#[tokio::test]
async fn test_sweep_expired_user_connection_index_cleared() {
    let registry = Registry::new();
    let alice = registry.create_user("alice");
    registry.bind_connection(&alice, Some(conn("sock-1"))).unwrap();

    let (_, users) = registry.sweep(HOUR, Duration::ZERO).await;

    assert_eq!(users, 1);
    assert!(registry.user_by_connection(&conn("sock-1")).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_sweeper_task_runs_on_interval() {
    // Paused time auto-advances, so the sweeper's first interval fires
    // without real waiting. Zero thresholds make everything expired.
    let registry = Arc::new(Registry::new());
    registry.create_room(Deck::Fibonacci);
    registry.create_user("alice");

    let config = RegistryConfig {
        room_idle_timeout: Duration::ZERO,
        user_idle_timeout: Duration::ZERO,
        sweep_interval: Duration::from_secs(300),
    };
    let sweeper = spawn_sweeper(Arc::clone(&registry), &config);

    // Wait past one sweep interval, then give the pass time to finish.
    tokio::time::sleep(Duration::from_secs(301)).await;
    for _ in 0..100 {
        if registry.room_count() == 0 && registry.user_count() == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(registry.room_count(), 0);
    assert_eq!(registry.user_count(), 0);
    sweeper.abort();
}
