use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::{Params, Pbkdf2};
use tracing::error;

use crate::auth::token::SecurityError;

/// PBKDF2-SHA256 iteration count used for new hashes
pub const DEFAULT_HASH_ROUNDS: u32 = 100_000;

const SALT_LEN: usize = 16;
const OUTPUT_LEN: usize = 32;

/// Password hashing policy.
///
/// Hashes are PHC strings, so verification reads the rounds and salt from the
/// stored hash and keeps working after the policy changes.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHashing {
    rounds: u32,
}

impl Default for PasswordHashing {
    fn default() -> Self {
        Self::with_rounds(DEFAULT_HASH_ROUNDS)
    }
}

impl PasswordHashing {
    pub fn with_rounds(rounds: u32) -> Self {
        Self { rounds: rounds.max(1) }
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Hash a plain-text password into a PHC string
    pub fn hash(&self, password: &str) -> Result<String, SecurityError> {
        let salt_bytes: [u8; SALT_LEN] = rand::random();
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| {
            error!("Failed to encode password salt: {}", e);
            SecurityError::Hashing(e.to_string())
        })?;

        let params = Params {
            rounds: self.rounds,
            output_length: OUTPUT_LEN,
        };

        let hash = Pbkdf2
            .hash_password_customized(password.as_bytes(), None, None, params, &salt)
            .map_err(|e| {
                error!("Failed to hash password: {}", e);
                SecurityError::Hashing(e.to_string())
            })?;

        Ok(hash.to_string())
    }

    /// Check a plain-text password against a stored PHC string.
    /// Malformed hashes never verify.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                error!("Stored password hash is malformed: {}", e);
                false
            }
        }
    }
}
