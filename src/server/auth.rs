//! Admin authentication: argon2 password verification and JWT session tokens.

use anyhow::{anyhow, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Session tokens expire after one hour.
pub const TOKEN_TTL_SECONDS: u64 = 3600;

mod ranker_argon2 {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    pub fn hash(plain: &[u8]) -> Result<String> {
        let argon2 = Argon2::default();
        let salt = SaltString::generate(&mut OsRng);
        let hash_string = argon2
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string();
        Ok(hash_string)
    }

    pub fn verify<T: AsRef<str>>(plain_pw: &[u8], target_hash: T) -> Result<bool> {
        let argon2 = Argon2::default();
        let password_hash =
            PasswordHash::new(target_hash.as_ref()).map_err(|err| anyhow!("{}", err))?;
        Ok(argon2.verify_password(plain_pw, &password_hash).is_ok())
    }
}

/// Hashes a plaintext password into a PHC-format argon2 digest, suitable for
/// the `admin_password_hash` config entry.
pub fn hash_password(plain: &str) -> Result<String> {
    ranker_argon2::hash(plain.as_bytes())
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: u64,
    exp: u64,
}

/// Verifies admin credentials and mints/validates session JWTs.
#[derive(Clone)]
pub struct AdminAuth {
    username: String,
    password_hash: String,
    token_secret: String,
}

impl AdminAuth {
    pub fn new(username: String, password_hash: String, token_secret: String) -> Self {
        AdminAuth {
            username,
            password_hash,
            token_secret,
        }
    }

    /// Checks the submitted credentials; a matching pair yields a signed
    /// token, anything else yields `None`. Password hashing failures are
    /// treated as a mismatch so callers can answer uniformly.
    pub fn login(&self, username: &str, password: &str) -> Option<String> {
        if username != self.username {
            return None;
        }
        match ranker_argon2::verify(password.as_bytes(), &self.password_hash) {
            Ok(true) => self.issue_token().ok(),
            _ => None,
        }
    }

    fn issue_token(&self) -> Result<String> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        let claims = Claims {
            sub: self.username.clone(),
            iat: now,
            exp: now + TOKEN_TTL_SECONDS,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.token_secret.as_bytes()),
        )
        .map_err(|err| anyhow!("Failed to sign token: {}", err))
    }

    /// Validates a bearer token, returning the subject it was issued to.
    /// Expired and tampered tokens fail alike.
    pub fn verify_token(&self, token: &str) -> Result<String> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.token_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|err| anyhow!("Invalid token: {}", err))?;
        Ok(data.claims.sub)
    }
}
