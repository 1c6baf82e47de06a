//! Identifier token generation.
//!
//! Every room and user id is a 64-character lowercase-hex token carrying
//! 256 bits of randomness from a cryptographically secure generator.
//! At that entropy size, collisions are not a practical concern, so no
//! uniqueness check is performed against existing ids — that is a
//! deliberate design acceptance, not an oversight.

use rand::Rng;

/// Number of random bytes per token: 32 bytes = 256 bits.
const TOKEN_BYTES: usize = 32;

/// Generates a fresh identifier token.
///
/// `rand::rng()` is a CSPRNG seeded from the operating system. There is
/// no recoverable failure mode here: if the OS randomness source is
/// unavailable, initialization panics, which is the intended
/// process-fatal behavior — the server cannot mint identities without it.
pub fn generate() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; TOKEN_BYTES] = rng.random();
    // `{:02x}` renders each byte as two lowercase hex digits.
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
