//! User accounts
//!
//! Provides the user entity and database operations for registration,
//! lookup and administration.

use crate::storage::Database;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use uuid::Uuid;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Parse from database string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address, stored lowercase and unique
    pub email: String,
    /// Argon2 password hash (PHC string), never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// User role
    pub role: Role,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the given details
    pub fn new(name: impl Into<String>, email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into().to_lowercase(),
            password_hash: password_hash.into(),
            role: Role::User,
            created_at: now,
            updated_at: now,
        }
    }

    /// Promote to the admin role
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Whether this user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// User repository for database operations
pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a new user in the database
    pub async fn create(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    /// Get a user by ID
    pub async fn get(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, role, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(row_to_user))
    }

    /// Get a user by email (case-insensitive)
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, role, created_at, updated_at FROM users WHERE email = ?",
        )
        .bind(email.to_lowercase())
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(row_to_user))
    }

    /// Check if a user with the given email exists
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM users WHERE email = ?")
            .bind(email.to_lowercase())
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.is_some())
    }

    /// List all users, newest first
    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(
            "SELECT id, name, email, password_hash, role, created_at, updated_at FROM users ORDER BY created_at DESC",
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(row_to_user).collect())
    }

    /// Update a user's role
    pub async fn set_role(&self, id: &str, role: Role) -> Result<()> {
        sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    /// Delete a user and all associated data
    pub async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }
}

/// Convert a database row to a User
fn row_to_user(row: sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: Role::parse(row.get("role")).unwrap_or_default(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_user() {
        let db = Database::in_memory().await.expect("Failed to create database");
        let repo = UserRepository::new(&db);

        let user = User::new("Alice", "Alice@Example.com", "hash");
        repo.create(&user).await.expect("Failed to create user");

        let retrieved = repo
            .get(&user.id)
            .await
            .expect("Failed to get user")
            .expect("User should exist");

        assert_eq!(retrieved.name, "Alice");
        // Email is normalized to lowercase
        assert_eq!(retrieved.email, "alice@example.com");
        assert_eq!(retrieved.role, Role::User);
    }

    #[tokio::test]
    async fn test_get_by_email_case_insensitive() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(&db);

        let user = User::new("Bob", "bob@example.com", "hash");
        repo.create(&user).await.unwrap();

        let retrieved = repo
            .get_by_email("BOB@EXAMPLE.COM")
            .await
            .unwrap()
            .expect("Lookup should be case-insensitive");
        assert_eq!(retrieved.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(&db);

        repo.create(&User::new("A", "dup@example.com", "h1")).await.unwrap();
        let result = repo.create(&User::new("B", "dup@example.com", "h2")).await;
        assert!(result.is_err(), "Duplicate email should be rejected");
    }

    #[tokio::test]
    async fn test_set_role() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(&db);

        let user = User::new("Carol", "carol@example.com", "hash");
        repo.create(&user).await.unwrap();

        repo.set_role(&user.id, Role::Admin).await.unwrap();

        let retrieved = repo.get(&user.id).await.unwrap().unwrap();
        assert!(retrieved.is_admin());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(&db);

        let user = User::new("Dave", "dave@example.com", "hash");
        repo.create(&user).await.unwrap();
        repo.delete(&user.id).await.unwrap();

        assert!(repo.get(&user.id).await.unwrap().is_none());
    }

    #[test]
    fn test_role_roundtrip() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("user"), Some(Role::User));
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::Admin.as_str(), "admin");
    }
}
