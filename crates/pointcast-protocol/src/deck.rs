//! Voting decks.
//!
//! A deck is the fixed set of values members of a room may vote with.
//! The set of decks is closed — clients pick one by name at room creation
//! and the boundary layer rejects names that don't parse.
//!
//! The core deliberately does NOT check a cast vote against the room's
//! deck; that validation belongs to the boundary layer, which has
//! [`Deck::contains`] for exactly that purpose.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of voting decks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Deck {
    /// Classic planning-poker Fibonacci deck.
    Fibonacci,
    /// T-shirt sizes for coarse estimates.
    Tshirt,
    /// Powers of two.
    PowersOfTwo,
}

impl Deck {
    /// Every deck, for listing valid choices to clients.
    pub const ALL: [Deck; 3] = [Deck::Fibonacci, Deck::Tshirt, Deck::PowersOfTwo];

    /// The values a member may vote with. `"?"` is the abstain card.
    pub fn values(&self) -> &'static [&'static str] {
        match self {
            Deck::Fibonacci => &[
                "0", "1", "2", "3", "5", "8", "13", "21", "34", "55", "89", "?",
            ],
            Deck::Tshirt => &["xs", "s", "m", "l", "xl", "?"],
            Deck::PowersOfTwo => &["1", "2", "4", "8", "16", "32", "?"],
        }
    }

    /// Whether `vote` is a card in this deck.
    pub fn contains(&self, vote: &str) -> bool {
        self.values().contains(&vote)
    }
}

impl fmt::Display for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deck::Fibonacci => write!(f, "fibonacci"),
            Deck::Tshirt => write!(f, "tshirt"),
            Deck::PowersOfTwo => write!(f, "powers-of-two"),
        }
    }
}

/// A deck name that isn't in the closed set.
#[derive(Debug, thiserror::Error)]
#[error("unknown deck: {0}")]
pub struct UnknownDeck(pub String);

impl FromStr for Deck {
    type Err = UnknownDeck;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fibonacci" => Ok(Deck::Fibonacci),
            "tshirt" => Ok(Deck::Tshirt),
            "powers-of-two" => Ok(Deck::PowersOfTwo),
            other => Err(UnknownDeck(other.to_string())),
        }
    }
}
