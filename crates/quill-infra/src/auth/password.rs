//! Argon2 password hashing implementation.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use quill_core::ports::{AuthError, PasswordService};

/// Argon2id password service producing PHC-format hash strings.
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Build a hasher with explicit cost parameters.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AuthError::Hashing(format!("Invalid parameters: {e}")))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            tracing::warn!("Stored password hash could not be parsed");
            return false;
        };

        // Params embedded in the hash take precedence over the service's own.
        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_service() -> Argon2PasswordService {
        Argon2PasswordService::with_params(1024, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let service = fast_service();
        let password = "secure_password_123";

        let hash = service.hash(password).unwrap();
        assert!(service.verify(password, &hash));
        assert!(!service.verify("wrong_password", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let service = fast_service();

        let first = service.hash("pw").unwrap();
        let second = service.hash("pw").unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(service.verify("pw", &first));
        assert!(service.verify("pw", &second));
    }

    #[test]
    fn test_hash_from_other_params_still_verifies() {
        let default_service = Argon2PasswordService::new();
        let hash = fast_service().hash("pw").unwrap();

        assert!(default_service.verify("pw", &hash));
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        let service = fast_service();

        assert!(!service.verify("pw", "not-a-hash"));
        assert!(!service.verify("pw", ""));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = Argon2PasswordService::with_params(0, 0, 0);
        assert!(matches!(result, Err(AuthError::Hashing(_))));
    }
}
