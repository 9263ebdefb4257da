use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;

use once_cell::sync::Lazy;
use tracing::{debug, info, warn};

/// Process-wide list of revoked token ids
static TOKEN_BLACKLIST: Lazy<TokenBlacklist> = Lazy::new(TokenBlacklist::new);

const DEFAULT_MAX_SIZE: usize = 10_000;

/// Revoked token ids (JWT `jti`) kept until the token would have expired anyway.
///
/// `max_size` is a soft limit. Reaching it triggers a sweep of expired
/// entries; entries that have not expired are never evicted.
pub struct TokenBlacklist {
    /// jti -> natural expiry
    revoked_tokens: Mutex<HashMap<String, SystemTime>>,
    max_size: usize,
}

impl Default for TokenBlacklist {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenBlacklist {
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_SIZE)
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            revoked_tokens: Mutex::new(HashMap::new()),
            max_size: max_size.max(1),
        }
    }

    fn tokens(&self) -> MutexGuard<'_, HashMap<String, SystemTime>> {
        // The map stays consistent even if a holder panicked.
        self.revoked_tokens.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a token id to the blacklist until `expiration`
    pub fn revoke_token(&self, token_id: &str, expiration: SystemTime) {
        let mut tokens = self.tokens();

        if tokens.len() >= self.max_size {
            Self::cleanup_expired(&mut tokens);

            if tokens.len() >= self.max_size {
                warn!(
                    "Token blacklist holds {} unexpired entries, above its soft limit of {}",
                    tokens.len(),
                    self.max_size
                );
            }
        }

        tokens.insert(token_id.to_string(), expiration);
        info!("Token revoked: {}", token_id);
    }

    /// True if the token id has been revoked and not yet cleaned up
    pub fn is_revoked(&self, token_id: &str) -> bool {
        self.tokens().contains_key(token_id)
    }

    pub fn size(&self) -> usize {
        self.tokens().len()
    }

    /// Remove entries whose token has expired. Returns the number removed.
    pub fn cleanup_expired_tokens(&self) -> usize {
        let mut tokens = self.tokens();
        Self::cleanup_expired(&mut tokens)
    }

    fn cleanup_expired(tokens: &mut HashMap<String, SystemTime>) -> usize {
        let now = SystemTime::now();
        let before_count = tokens.len();

        tokens.retain(|_, expiration| *expiration > now);

        let removed = before_count - tokens.len();
        if removed > 0 {
            debug!("Removed {} expired tokens from blacklist", removed);
        }
        removed
    }
}

/// The global token blacklist
pub fn blacklist() -> &'static TokenBlacklist {
    &TOKEN_BLACKLIST
}
