//! Site login verification codes
//!
//! `/code` issues a short-lived numeric code; the storefront exchanges it at
//! `POST /verify` for a session cookie. Codes are single-use and expire
//! after five minutes; issuing a new code replaces the previous one for
//! that user.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::utils::token::generate_verify_code;

const CODE_TTL_MINUTES: i64 = 5;

#[derive(Debug, Clone)]
struct PendingCode {
    code: String,
    user_name: String,
    issued_at: DateTime<Utc>,
}

/// Outstanding verification codes, keyed by user id.
#[derive(Debug, Default)]
pub struct VerifyCodes {
    pending: DashMap<i64, PendingCode>,
}

impl VerifyCodes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh code for the user, replacing any outstanding one.
    pub fn issue(&self, user_id: i64, user_name: &str) -> String {
        let code = generate_verify_code();
        self.pending.insert(
            user_id,
            PendingCode {
                code: code.clone(),
                user_name: user_name.to_string(),
                issued_at: Utc::now(),
            },
        );
        code
    }

    /// Consume the user's code. Returns the name captured at issue time when
    /// the code matches and has not expired; the code is removed either way
    /// once matched, so it cannot be replayed.
    pub fn consume(&self, user_id: i64, code: &str) -> Option<String> {
        let entry = self.pending.get(&user_id)?;
        if entry.code != code {
            return None;
        }
        let expired = Utc::now() - entry.issued_at > Duration::minutes(CODE_TTL_MINUTES);
        drop(entry);
        let (_, pending) = self.pending.remove(&user_id)?;
        if expired { None } else { Some(pending.user_name) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_matches_once() {
        let codes = VerifyCodes::new();
        let code = codes.issue(42, "sara");
        assert_eq!(codes.consume(42, &code), Some("sara".to_string()));
        assert_eq!(codes.consume(42, &code), None);
    }

    #[test]
    fn wrong_code_is_rejected_and_kept() {
        let codes = VerifyCodes::new();
        let code = codes.issue(42, "sara");
        assert_eq!(codes.consume(42, "000000"), None);
        // The real code still works after a bad attempt.
        assert_eq!(codes.consume(42, &code), Some("sara".to_string()));
    }

    #[test]
    fn reissue_replaces_the_previous_code() {
        let codes = VerifyCodes::new();
        let first = codes.issue(42, "sara");
        let second = codes.issue(42, "sara");
        if first != second {
            assert_eq!(codes.consume(42, &first), None);
        }
        assert_eq!(codes.consume(42, &second), Some("sara".to_string()));
    }
}
