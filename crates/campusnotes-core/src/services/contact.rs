//! Public contact form and the admin inbox

use crate::content::{ContactMessage, ContentRepository};
use crate::services::Notifier;
use crate::storage::Database;
use crate::{Error, Result};

/// Contact form submissions and admin message handling
pub struct ContactService<'a> {
    db: &'a Database,
    notifier: &'a Notifier,
}

impl<'a> ContactService<'a> {
    pub fn new(db: &'a Database, notifier: &'a Notifier) -> Self {
        Self { db, notifier }
    }

    /// Accept a contact form submission and notify the admin address
    pub async fn submit(&self, name: &str, email: &str, message: &str) -> Result<ContactMessage> {
        let name = name.trim();
        let message = message.trim();
        if name.is_empty() {
            return Err(Error::Validation("Name cannot be empty".to_string()));
        }
        if !email.contains('@') {
            return Err(Error::Validation(format!(
                "'{}' is not a valid email address",
                email
            )));
        }
        if message.is_empty() {
            return Err(Error::Validation("Message cannot be empty".to_string()));
        }

        let contact_message = ContactMessage::new(name, email, message);
        ContentRepository::new(self.db)
            .create_message(&contact_message)
            .await?;

        self.notifier.contact_message_received(name).await;
        Ok(contact_message)
    }

    pub async fn list(&self, unread_only: bool) -> Result<Vec<ContactMessage>> {
        ContentRepository::new(self.db).list_messages(unread_only).await
    }

    pub async fn mark_read(&self, id: &str) -> Result<()> {
        let marked = ContentRepository::new(self.db).mark_message_read(id).await?;
        if !marked {
            return Err(Error::NotFound("Message", id.to_string()));
        }
        Ok(())
    }
}
