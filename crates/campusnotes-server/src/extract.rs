//! Request extractors for authenticated and admin users

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;

use campusnotes_core::services::Actor;
use campusnotes_core::users::User;
use campusnotes_core::Error;

use crate::error::ApiError;
use crate::state::SharedState;

const SESSION_COOKIE: &str = "session";

/// A request carrying a valid session token
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor::new(self.0.id.clone(), self.0.role)
    }
}

/// Like [`AuthUser`] but only admins pass
pub struct AdminUser(pub User);

/// Token is optional; anonymous requests extract as `None`
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn actor(&self) -> Option<Actor> {
        self.0.as_ref().map(|u| Actor::new(u.id.clone(), u.role))
    }
}

/// Pull the session token from the Authorization header or session cookie
fn token_from_parts(parts: &Parts) -> Option<String> {
    if let Some(value) = parts.headers.get(AUTHORIZATION) {
        if let Ok(value) = value.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    let cookies = parts.headers.get(COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts).ok_or(ApiError(Error::InvalidToken))?;
        let user = state.auth_service().authenticate(&token).await?;
        Ok(AuthUser(user))
    }
}

impl FromRequestParts<SharedState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError(Error::Forbidden));
        }
        Ok(AdminUser(user))
    }
}

impl FromRequestParts<SharedState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = token_from_parts(parts) else {
            return Ok(MaybeUser(None));
        };
        // A token was presented, so a stale or tampered one is still a 401
        let user = state.auth_service().authenticate(&token).await?;
        Ok(MaybeUser(Some(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(name: axum::http::HeaderName, value: &str) -> Parts {
        let request = Request::builder()
            .header(name, value)
            .body(())
            .unwrap();
        request.into_parts().0
    }

    #[test]
    fn test_bearer_token() {
        let parts = parts_with(AUTHORIZATION, "Bearer abc.def");
        assert_eq!(token_from_parts(&parts).as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_session_cookie() {
        let parts = parts_with(COOKIE, "theme=dark; session=abc.def; lang=en");
        assert_eq!(token_from_parts(&parts).as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_missing_token() {
        let request = Request::builder().body(()).unwrap();
        let (parts, _) = request.into_parts();
        assert!(token_from_parts(&parts).is_none());

        let parts = parts_with(AUTHORIZATION, "Basic dXNlcg==");
        assert!(token_from_parts(&parts).is_none());
    }
}
