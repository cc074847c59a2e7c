//! Ed25519-signed session tokens
//!
//! A token is `base64url(claims JSON) . base64url(signature)`. Verification
//! checks the signature over the claims bytes, then the expiry. The signing
//! key lives only in server memory; it is loaded from the environment or
//! generated at startup.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{Duration, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::users::Role;
use crate::{Error, Result};

/// Size of Ed25519 signature in bytes
pub const SIGNATURE_SIZE: usize = 64;

/// Size of Ed25519 private key in bytes
pub const PRIVATE_KEY_SIZE: usize = 32;

/// Default session lifetime: 7 days
pub const DEFAULT_TOKEN_TTL: Duration = Duration::days(7);

/// Claims carried inside a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id
    pub sub: String,
    /// User role at issue time
    pub role: Role,
    /// Expiry as a unix timestamp (seconds)
    pub exp: i64,
}

impl Claims {
    /// Whether this claim set has expired
    pub fn is_expired(&self) -> bool {
        self.exp < Utc::now().timestamp()
    }
}

/// Ed25519 key pair used to issue and verify session tokens
#[derive(Debug)]
pub struct TokenSigner {
    signing_key: SigningKey,
}

impl TokenSigner {
    /// Generate a new random signing key pair
    pub fn generate() -> Self {
        let mut secret_bytes = [0u8; PRIVATE_KEY_SIZE];
        OsRng.fill_bytes(&mut secret_bytes);
        let signing_key = SigningKey::from_bytes(&secret_bytes);
        Self { signing_key }
    }

    /// Create a signer from raw private key bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PRIVATE_KEY_SIZE {
            return Err(Error::Config(format!(
                "Invalid token key length: expected {}, got {}",
                PRIVATE_KEY_SIZE,
                bytes.len()
            )));
        }

        let mut key_bytes = [0u8; PRIVATE_KEY_SIZE];
        key_bytes.copy_from_slice(bytes);

        Ok(Self {
            signing_key: SigningKey::from_bytes(&key_bytes),
        })
    }

    /// Create a signer from a hex-encoded private key (as stored in the
    /// `CAMPUSNOTES_TOKEN_KEY` environment variable)
    pub fn from_hex(hex_key: &str) -> Result<Self> {
        let bytes = hex::decode(hex_key.trim())
            .map_err(|e| Error::Config(format!("Invalid token key hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Export the private key bytes (use carefully!)
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_SIZE] {
        self.signing_key.to_bytes()
    }

    /// Issue a signed session token for a user
    pub fn issue(&self, user_id: &str, role: Role, ttl: Duration) -> Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            exp: (Utc::now() + ttl).timestamp(),
        };

        let payload = serde_json::to_vec(&claims)
            .map_err(|e| Error::Other(format!("Failed to encode claims: {}", e)))?;
        let signature = self.signing_key.sign(&payload);

        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        ))
    }

    /// Verify a session token and return its claims
    ///
    /// Fails with `Error::InvalidToken` on any malformation, signature
    /// mismatch or expiry.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let (payload_b64, sig_b64) = token.split_once('.').ok_or(Error::InvalidToken)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| Error::InvalidToken)?;
        let sig_bytes = URL_SAFE_NO_PAD
            .decode(sig_b64)
            .map_err(|_| Error::InvalidToken)?;

        let sig_array: [u8; SIGNATURE_SIZE] =
            sig_bytes.try_into().map_err(|_| Error::InvalidToken)?;
        let signature = Signature::from_bytes(&sig_array);

        self.signing_key
            .verifying_key()
            .verify(&payload, &signature)
            .map_err(|_| Error::InvalidToken)?;

        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| Error::InvalidToken)?;

        if claims.is_expired() {
            return Err(Error::InvalidToken);
        }

        Ok(claims)
    }
}
