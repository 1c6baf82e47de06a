//! Broadcast payloads: what the gateway sends to a room's members.
//!
//! The key rule lives here as a matter of shape, not just discipline:
//! [`RoomSnapshot`] has no field that could carry a vote value. While a
//! round is open, clients learn only *who* has voted. Actual values travel
//! exclusively in [`RevealedVote`] entries, which only a reveal produces.
//!
//! Field names serialize as `camelCase` — these structs go straight to a
//! JavaScript frontend.

use serde::{Deserialize, Serialize};

use crate::{Deck, RoomId, UserId};

/// One member's visible state within a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberEntry {
    /// The member's user id.
    pub id: UserId,
    /// The display name chosen at registration.
    pub username: String,
    /// Whether this member has cast a vote in the current round.
    pub has_voted: bool,
}

/// The full visible state of a room, broadcast after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    /// Which room this snapshot describes.
    pub room_id: RoomId,
    /// The deck the room was created with.
    pub deck: Deck,
    /// Whether the current round has been revealed.
    pub votes_revealed: bool,
    /// Every current member. Order is arbitrary.
    pub members: Vec<MemberEntry>,
}

/// One revealed vote. Produced only by a reveal, one entry per member
/// who had voted at that moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealedVote {
    /// Who cast the vote.
    pub user_id: UserId,
    /// The card they chose.
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let snapshot = RoomSnapshot {
            room_id: RoomId("r1".to_string()),
            deck: Deck::Fibonacci,
            votes_revealed: false,
            members: vec![MemberEntry {
                id: UserId("u1".to_string()),
                username: "alice".to_string(),
                has_voted: true,
            }],
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["roomId"], "r1");
        assert_eq!(json["deck"], "fibonacci");
        assert_eq!(json["votesRevealed"], false);
        assert_eq!(json["members"][0]["hasVoted"], true);
        assert_eq!(json["members"][0]["username"], "alice");
    }

    #[test]
    fn test_snapshot_has_no_value_field() {
        // The wire shape itself must not be able to leak a vote value.
        let entry = MemberEntry {
            id: UserId("u1".to_string()),
            username: "alice".to_string(),
            has_voted: true,
        };
        let json = serde_json::to_value(&entry).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["hasVoted", "id", "username"]);
    }

    #[test]
    fn test_revealed_vote_round_trips() {
        let vote = RevealedVote {
            user_id: UserId("u1".to_string()),
            value: "13".to_string(),
        };
        let json = serde_json::to_string(&vote).unwrap();
        let back: RevealedVote = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vote);
    }
}
