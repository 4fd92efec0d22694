// src/auth/token.rs
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

pub const GRID_ID_BYTES: usize = 32;

/// Fresh grid session id from the OS RNG.
pub fn generate_grid_id() -> String {
    let mut rng = OsRng;
    generate_token(&mut rng, GRID_ID_BYTES)
}

/// URL-safe base64 (no padding) of `nbytes` random bytes.
/// 32 bytes -> 43 chars, safe in cookies and query strings.
pub fn generate_token<R: RngCore>(rng: &mut R, nbytes: usize) -> String {
    let mut buf = vec![0u8; nbytes];
    rng.fill_bytes(&mut buf);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&buf)
}

/// Rejects cookie values that could not have come from [`generate_grid_id`].
pub fn looks_like_grid_id(raw: &str) -> bool {
    raw.len() == 43
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
