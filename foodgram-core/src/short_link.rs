//! Short random codes that map one-to-one to recipes.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;

use crate::error::ShortLinkError;

/// Random bytes per code; 4 bytes encode to 6 URL-safe characters.
pub const CODE_BYTES: usize = 4;

/// Upper bound enforced by the storage column.
pub const MAX_CODE_LEN: usize = 16;

/// How many fresh codes are tried before giving up on a recipe.
pub const MAX_ATTEMPTS: usize = 5;

/// Outcome of trying to persist one candidate code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// The candidate was stored for the recipe.
    Claimed,
    /// The recipe already had a code (e.g. a concurrent request won).
    Existing(String),
    /// Another recipe owns this candidate; try a new one.
    Collision,
}

/// A fresh random URL-safe code.
pub fn generate_code() -> String {
    let mut bytes = [0u8; CODE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Whether `code` could have been produced by [`generate_code`]-style
/// generators. Used to reject junk before touching storage.
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Try up to `max_attempts` generated codes until one is claimed.
///
/// `claim` performs the conditional insert and reports what happened. Storage
/// errors from `claim` are returned as-is; running out of attempts becomes a
/// [`ShortLinkError::Exhausted`] converted into the caller's error type.
pub fn claim_with_retry<E, G, C>(
    max_attempts: usize,
    mut generate: G,
    mut claim: C,
) -> Result<String, E>
where
    E: From<ShortLinkError>,
    G: FnMut() -> String,
    C: FnMut(&str) -> Result<Claim, E>,
{
    for _ in 0..max_attempts {
        let candidate = generate();
        match claim(&candidate)? {
            Claim::Claimed => return Ok(candidate),
            Claim::Existing(code) => return Ok(code),
            Claim::Collision => continue,
        }
    }

    Err(ShortLinkError::Exhausted {
        attempts: max_attempts,
    }
    .into())
}
