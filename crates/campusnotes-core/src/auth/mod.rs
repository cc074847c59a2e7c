//! Authentication
//!
//! Password hashing (argon2) and signed session tokens (Ed25519).

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenSigner, DEFAULT_TOKEN_TTL};
