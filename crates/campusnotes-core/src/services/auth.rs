//! Registration, login and token authentication

use chrono::Duration;

use crate::auth::{hash_password, verify_password, TokenSigner};
use crate::storage::Database;
use crate::users::{Role, User, UserRepository};
use crate::{Error, Result};

/// Account management and session issuance
pub struct AuthService<'a> {
    db: &'a Database,
    signer: &'a TokenSigner,
    token_ttl: Duration,
    min_password_len: usize,
}

impl<'a> AuthService<'a> {
    pub fn new(
        db: &'a Database,
        signer: &'a TokenSigner,
        token_ttl: Duration,
        min_password_len: usize,
    ) -> Self {
        Self {
            db,
            signer,
            token_ttl,
            min_password_len,
        }
    }

    /// Create an account and return the user with a fresh session token
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<(User, String)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Name cannot be empty".to_string()));
        }
        validate_email(email)?;
        if password.len() < self.min_password_len {
            return Err(Error::Validation(format!(
                "Password must be at least {} characters",
                self.min_password_len
            )));
        }

        let repo = UserRepository::new(self.db);
        if repo.email_exists(email).await? {
            return Err(Error::Conflict(format!(
                "An account with email '{}' already exists",
                email.to_lowercase()
            )));
        }

        let user = User::new(name, email, hash_password(password)?);
        repo.create(&user).await?;

        let token = self.signer.issue(&user.id, user.role, self.token_ttl)?;
        Ok((user, token))
    }

    /// Verify credentials and return the user with a fresh session token
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String)> {
        let user = UserRepository::new(self.db)
            .get_by_email(email)
            .await?
            .ok_or(Error::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(Error::InvalidCredentials);
        }

        let token = self.signer.issue(&user.id, user.role, self.token_ttl)?;
        Ok((user, token))
    }

    /// Resolve a session token to its user; deleted users are rejected
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.signer.verify(token)?;

        UserRepository::new(self.db)
            .get(&claims.sub)
            .await?
            .ok_or(Error::InvalidToken)
    }

    /// Create an admin account directly, bypassing registration defaults
    pub async fn create_admin(&self, name: &str, email: &str, password: &str) -> Result<User> {
        let (user, _) = self.register(name, email, password).await?;
        UserRepository::new(self.db)
            .set_role(&user.id, Role::Admin)
            .await?;
        Ok(user.with_role(Role::Admin))
    }
}

fn validate_email(email: &str) -> Result<()> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));

    if valid {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "'{}' is not a valid email address",
            email
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::generate()
    }

    fn service<'a>(db: &'a Database, signer: &'a TokenSigner) -> AuthService<'a> {
        AuthService::new(db, signer, Duration::days(7), 8)
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let db = Database::in_memory().await.unwrap();
        let signer = signer();
        let auth = service(&db, &signer);

        let (user, token) = auth
            .register("Priya", "priya@example.com", "correct horse")
            .await
            .unwrap();
        assert_eq!(user.role, Role::User);
        assert!(!token.is_empty());

        let (logged_in, _) = auth.login("priya@example.com", "correct horse").await.unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let db = Database::in_memory().await.unwrap();
        let signer = signer();
        let auth = service(&db, &signer);

        let result = auth.register("", "a@example.com", "long enough").await;
        assert!(matches!(result, Err(Error::Validation(_))));

        let result = auth.register("A", "not-an-email", "long enough").await;
        assert!(matches!(result, Err(Error::Validation(_))));

        let result = auth.register("A", "a@example.com", "short").await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let db = Database::in_memory().await.unwrap();
        let signer = signer();
        let auth = service(&db, &signer);

        auth.register("A", "same@example.com", "password1").await.unwrap();
        let result = auth.register("B", "Same@Example.com", "password2").await;
        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let db = Database::in_memory().await.unwrap();
        let signer = signer();
        let auth = service(&db, &signer);

        auth.register("A", "a@example.com", "password1").await.unwrap();

        let result = auth.login("a@example.com", "wrong password").await;
        assert!(matches!(result, Err(Error::InvalidCredentials)));

        let result = auth.login("nobody@example.com", "password1").await;
        assert!(matches!(result, Err(Error::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_roundtrip() {
        let db = Database::in_memory().await.unwrap();
        let signer = signer();
        let auth = service(&db, &signer);

        let (user, token) = auth
            .register("A", "a@example.com", "password1")
            .await
            .unwrap();

        let resolved = auth.authenticate(&token).await.unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn test_authenticate_rejects_deleted_user() {
        let db = Database::in_memory().await.unwrap();
        let signer = signer();
        let auth = service(&db, &signer);

        let (user, token) = auth
            .register("A", "a@example.com", "password1")
            .await
            .unwrap();
        UserRepository::new(&db).delete(&user.id).await.unwrap();

        let result = auth.authenticate(&token).await;
        assert!(matches!(result, Err(Error::InvalidToken)));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_foreign_token() {
        let db = Database::in_memory().await.unwrap();
        let signer = signer();
        let auth = service(&db, &signer);

        let (_, token) = auth
            .register("A", "a@example.com", "password1")
            .await
            .unwrap();

        let other_signer = TokenSigner::generate();
        let other_auth = service(&db, &other_signer);
        let result = other_auth.authenticate(&token).await;
        assert!(matches!(result, Err(Error::InvalidToken)));
    }

    #[tokio::test]
    async fn test_create_admin() {
        let db = Database::in_memory().await.unwrap();
        let signer = signer();
        let auth = service(&db, &signer);

        let admin = auth
            .create_admin("Root", "root@example.com", "password1")
            .await
            .unwrap();
        assert!(admin.is_admin());

        let stored = UserRepository::new(&db).get(&admin.id).await.unwrap().unwrap();
        assert_eq!(stored.role, Role::Admin);
    }
}
