use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A visitor's browsing session — mirrors the DuckDB `visitor_sessions` table
/// columns exactly. Keyed externally by `session_token` (globally unique).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitorSession {
    pub id: String,
    pub session_token: String,
    pub channel_id: String,
    /// Set when an authenticated shopper is linked; NULL for anonymous traffic.
    pub customer_id: Option<String>,
    pub first_seen: DateTime<Utc>,
    /// Updated on every recorded event. Invariant: `first_seen <= last_seen`.
    pub last_seen: DateTime<Utc>,
}

impl VisitorSession {
    /// Builds the row for a token never seen before.
    pub fn new(
        session_token: String,
        channel_id: String,
        customer_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_token,
            channel_id,
            customer_id,
            first_seen: now,
            last_seen: now,
        }
    }
}

/// Synthesize a session token for tracking calls that arrive without one.
///
/// Format: `anonymous-<unix_millis>-<12 hex chars>`. Uniqueness is
/// probabilistic — the unique constraint on `session_token` is the actual
/// guarantee, and a losing insert resolves to the stored row.
pub fn synthesize_session_token(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("anonymous-{}-{}", now.timestamp_millis(), &suffix[..12])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_token_has_anonymous_prefix() {
        let token = synthesize_session_token(Utc::now());
        assert!(
            token.starts_with("anonymous-"),
            "synthesized tokens must be recognizable as anonymous"
        );
        assert_eq!(token.split('-').count(), 3);
    }

    #[test]
    fn synthesized_tokens_differ_across_calls() {
        let now = Utc::now();
        // Same millisecond timestamp — the random suffix alone must differ.
        assert_ne!(synthesize_session_token(now), synthesize_session_token(now));
    }

    #[test]
    fn new_session_starts_with_equal_timestamps() {
        let now = Utc::now();
        let session = VisitorSession::new("tok-1".into(), "ch-1".into(), None, now);
        assert_eq!(session.first_seen, session.last_seen);
        assert!(session.customer_id.is_none());
    }
}
