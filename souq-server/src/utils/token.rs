//! Token Generation
//!
//! Charge-key codes and short-lived verification codes.

use rand::Rng;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 12;

/// Generate an unguessable charge-key code, e.g. `SQ-9F3KX27PQ4BM`.
///
/// Ambiguous characters (0/O, 1/I) are excluded so keys survive being read
/// aloud or retyped from a screenshot.
pub fn generate_key_code() -> String {
    let mut rng = rand::thread_rng();
    let body: String = (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    format!("SQ-{body}")
}

/// Generate a 6-digit verification code for site login.
pub fn generate_verify_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(0..1_000_000))
}
