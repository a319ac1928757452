use axum::http::{header, HeaderMap};
use sha2::{Digest, Sha256};

use crate::error::AppError;
use crate::state::AppState;

/// Hash a bearer token with SHA-256.
fn hash_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Require the admin bearer token on mutating endpoints.
///
/// With `SHOPLYTICS_ADMIN_TOKEN` unset the check is disabled and every
/// request passes (single-operator deployments behind their own ingress
/// auth). Tokens are compared through their SHA-256 digests.
pub fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = state.config.admin_token.as_deref() else {
        return Ok(());
    };

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    if hash_token(presented) != hash_token(expected) {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::hash_token;

    #[test]
    fn hash_token_is_hex_sha256() {
        let hash = hash_token("token-1");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, hash_token("token-1"));
        assert_ne!(hash, hash_token("token-2"));
    }
}
