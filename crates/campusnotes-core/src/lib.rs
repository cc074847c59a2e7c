//! CampusNotes Core Library
//!
//! This crate provides the core functionality for CampusNotes, including:
//! - Domain entities and repositories (users, notes, ratings, reports, catalog)
//! - Storage (SQLite connection pool + versioned migrations)
//! - Authentication (argon2 password hashing, signed session tokens)
//! - Homepage content management (FAQs, features, testimonials, about, contact)
//! - Site theme management
//! - Outbound clients (transactional email, media host)

pub mod auth;
pub mod catalog;
pub mod config;
pub mod content;
pub mod email;
pub mod error;
pub mod media;
pub mod notes;
pub mod ratings;
pub mod reports;
pub mod services;
pub mod storage;
pub mod theme;
pub mod users;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::storage::Database;
}
