use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

fn hash_with_salt(plain: &str, salt: &SaltString) -> anyhow::Result<String> {
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash error");
            anyhow::anyhow!(e.to_string())
        })?;
    Ok(hash.to_string())
}

/// Hashes an account password with a fresh random salt. The returned PHC string
/// (`$argon2id$v=19$m=..,t=..,p=..$<salt>$<digest>`) is what the users table stores.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    hash_with_salt(plain, &SaltString::generate(&mut OsRng))
}

/// Checks a login attempt against a stored PHC string.
///
/// Returns `Ok(true)` exactly when hashing `plain` with the salt and parameters recorded
/// in `stored` reproduces the stored digest. A wrong password, or a stored string whose
/// salt or digest was altered, gives `Ok(false)`. Only an unparseable `stored` value is
/// an error, since that means the row itself is corrupt.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored password hash is not a PHC string");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swap_first_char(segment: &str) -> String {
        let mut chars: Vec<char> = segment.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        chars.into_iter().collect()
    }

    /// Rebuilds a PHC string with its salt (`salt = true`) or digest segment altered.
    fn tamper(stored: &str, salt: bool) -> String {
        let mut parts: Vec<String> = stored.split('$').map(str::to_string).collect();
        let idx = if salt { parts.len() - 2 } else { parts.len() - 1 };
        parts[idx] = swap_first_char(&parts[idx]);
        parts.join("$")
    }

    #[test]
    fn one_character_password_round_trips() {
        let stored = hash_password("x").expect("hashing should succeed");
        assert!(stored.starts_with("$argon2id$"));
        assert!(verify_password("x", &stored).expect("verify should succeed"));
        assert!(!verify_password("y", &stored).expect("verify should not error"));
    }

    #[test]
    fn rehash_with_stored_salt_reproduces_stored_hash() {
        let stored = hash_password("correct-horse").unwrap();
        let parsed = PasswordHash::new(&stored).unwrap();
        let salt = SaltString::from_b64(parsed.salt.unwrap().as_str()).unwrap();

        assert_eq!(hash_with_salt("correct-horse", &salt).unwrap(), stored);
        assert_ne!(hash_with_salt("correct-horsf", &salt).unwrap(), stored);
    }

    #[test]
    fn altered_salt_or_digest_is_rejected() {
        let stored = hash_password("correct-horse").unwrap();
        for altered in [tamper(&stored, true), tamper(&stored, false)] {
            assert_ne!(altered, stored);
            assert!(!verify_password("correct-horse", &altered).unwrap());
        }
    }

    #[test]
    fn same_password_gets_a_fresh_salt() {
        let a = hash_password("repeat").unwrap();
        let b = hash_password("repeat").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("repeat", &a).unwrap());
        assert!(verify_password("repeat", &b).unwrap());
    }

    #[test]
    fn corrupt_stored_value_is_an_error() {
        assert!(verify_password("anything", "plaintext-password").is_err());
    }
}
