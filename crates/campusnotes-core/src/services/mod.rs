//! Service layer
//!
//! Business rules on top of the repositories: input validation, ownership and
//! visibility checks, moderation, and outbound notifications. The HTTP layer
//! calls services, never repositories directly.

mod auth;
mod catalog;
mod contact;
mod moderation;
mod notes;

pub use auth::AuthService;
pub use catalog::CatalogService;
pub use contact::ContactService;
pub use moderation::ModerationService;
pub use notes::{NoteService, UploadRequest};

use crate::email::{Email, Mailer};
use crate::users::Role;

/// The authenticated principal acting on a request
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Best-effort admin notifications; every send is log-and-continue
pub struct Notifier {
    mailer: Box<dyn Mailer>,
    from_address: String,
    admin_address: String,
}

impl Notifier {
    pub fn new(mailer: Box<dyn Mailer>, from_address: String, admin_address: String) -> Self {
        Self {
            mailer,
            from_address,
            admin_address,
        }
    }

    /// Notifier that drops everything; used when email is not configured
    pub fn disabled() -> Self {
        Self::new(
            Box::new(crate::email::NoopMailer),
            String::new(),
            String::new(),
        )
    }

    pub async fn note_reported(&self, note_title: &str, reason: &str) {
        self.send("Note reported", &format!("'{}': {}", note_title, reason))
            .await;
    }

    pub async fn contact_message_received(&self, sender: &str) {
        self.send(
            "New contact message",
            &format!("A message from {} is waiting in the admin panel", sender),
        )
        .await;
    }

    async fn send(&self, subject: &str, body: &str) {
        if self.admin_address.is_empty() {
            return;
        }
        let email = Email {
            to: self.admin_address.clone(),
            from: self.from_address.clone(),
            subject: subject.to_string(),
            body: body.to_string(),
        };
        self.mailer.send_or_log(&email).await;
    }
}
