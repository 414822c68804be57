//! # Password hashing and verification: Argon2id
//!
//! [`Passwords`] hashes new passwords with a random salt and the cost parameters
//! from [`settings::Password`](crate::settings::Password), producing a PHC-format
//! string (e.g. `$argon2id$v=19$m=19456,t=2,p=1$...`) for the `password_hash`
//! column of the `users` table.
//!
//! Verification parses the stored PHC string and checks the attempt against it with
//! [`PasswordVerifier`], using the parameters recorded in the hash. An attempt is
//! never re-hashed and compared as a string: with a fresh salt the two hashes would
//! not match even for the right password.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::{Error, Result};
use crate::settings;

#[derive(Clone)]
pub struct Passwords {
    argon2: Argon2<'static>,
}

impl Passwords {
    pub fn new(settings: &settings::Password) -> Result<Self> {
        let params = Params::new(
            settings.memory_kib,
            settings.iterations,
            settings.parallelism,
            None,
        )
        .map_err(|e| Error::PasswordHash(format!("Invalid Argon2 parameters: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password. Returns a PHC-format string.
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::PasswordHash(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a PHC-format hash string.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| Error::PasswordHash(format!("Invalid password hash: {}", e)))?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

impl Default for Passwords {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

#[cfg(test)]
pub(crate) fn cheap() -> Passwords {
    Passwords::new(&settings::Password {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let passwords = cheap();
        let hash = passwords.hash("secret123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("secret123"));
        assert!(passwords.verify("secret123", &hash).unwrap());
        assert!(!passwords.verify("wrongpass", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_fresh_salt() {
        let passwords = cheap();
        let first = passwords.hash("secret123").unwrap();
        let second = passwords.hash("secret123").unwrap();

        assert_ne!(first, second);
        assert!(passwords.verify("secret123", &second).unwrap());
    }

    #[test]
    fn test_verify_uses_parameters_from_hash() {
        let hash = cheap().hash("secret123").unwrap();
        assert!(Passwords::default().verify("secret123", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            cheap().verify("secret123", "not-a-hash"),
            Err(Error::PasswordHash(_))
        ));
    }

    #[test]
    fn test_invalid_parameters() {
        let result = Passwords::new(&settings::Password {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(result.is_err());
    }
}
