use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::config::PasswordConfig;

/// Well-formed hash that matches no password. Verified against when the
/// account does not exist so both login failure paths do the same work.
pub const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

fn hasher(cfg: &PasswordConfig) -> anyhow::Result<Argon2<'static>> {
    let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None).map_err(|e| {
        error!(error = %e, "invalid argon2 parameters");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

pub fn hash_password(plain: &str, cfg: &PasswordConfig) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher(cfg)?
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Checks `plain` against a stored PHC string. Cost parameters come from the
/// hash itself; the digest comparison is constant time.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> PasswordConfig {
        crate::config::AppConfig::for_tests().password
    }

    #[test]
    fn verifies_only_the_registered_password() {
        let hash = hash_password("secret1", &cfg()).unwrap();
        assert!(verify_password("secret1", &hash).unwrap());
        assert!(!verify_password("Secret1", &hash).unwrap());
        assert!(verify_password("secret1", "plain-text-in-db").is_err());
    }

    #[test]
    fn hashes_are_salted_and_carry_configured_cost() {
        let a = hash_password("secret1", &cfg()).unwrap();
        let b = hash_password("secret1", &cfg()).unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
        assert!(!a.contains("secret1"));
    }

    #[test]
    fn dummy_hash_parses_and_matches_nothing() {
        assert!(!verify_password("secret1", DUMMY_PASSWORD_HASH).expect("dummy hash is well formed"));
        assert!(!verify_password("", DUMMY_PASSWORD_HASH).expect("dummy hash is well formed"));
    }

    #[test]
    fn rejects_impossible_parameters() {
        let bad = PasswordConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(hash_password("secret1", &bad).is_err());
    }
}
