//! Homepage and site content
//!
//! Admin-managed content blocks: FAQs, feature cards, testimonials, the
//! about page, contact details, and contact-form messages.

use crate::storage::Database;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use uuid::Uuid;

/// Key used for singleton rows (theme, about, contact details)
pub const SINGLETON_ID: &str = "default";

/// A frequently asked question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub order_index: i64,
    pub created_at: DateTime<Utc>,
}

impl Faq {
    pub fn new(question: impl Into<String>, answer: impl Into<String>, order_index: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            question: question.into(),
            answer: answer.into(),
            order_index,
            created_at: Utc::now(),
        }
    }
}

/// A homepage feature card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    pub order_index: i64,
    pub created_at: DateTime<Utc>,
}

impl Feature {
    pub fn new(title: impl Into<String>, description: impl Into<String>, order_index: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            icon: None,
            order_index,
            created_at: Utc::now(),
        }
    }
}

/// A testimonial quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: String,
    pub author: String,
    pub role: Option<String>,
    pub quote: String,
    pub order_index: i64,
    pub created_at: DateTime<Utc>,
}

impl Testimonial {
    pub fn new(author: impl Into<String>, quote: impl Into<String>, order_index: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            author: author.into(),
            role: None,
            quote: quote.into(),
            order_index,
            created_at: Utc::now(),
        }
    }
}

/// About page content (singleton)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct About {
    pub title: String,
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

/// Site contact details (singleton)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactDetails {
    pub email: String,
    pub phone: String,
    pub address: String,
    pub updated_at: DateTime<Utc>,
}

/// A message submitted through the contact form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl ContactMessage {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            message: message.into(),
            read: false,
            created_at: Utc::now(),
        }
    }
}

/// Content repository for database operations
pub struct ContentRepository<'a> {
    db: &'a Database,
}

impl<'a> ContentRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    // --- FAQs ---

    pub async fn create_faq(&self, faq: &Faq) -> Result<()> {
        sqlx::query(
            "INSERT INTO faqs (id, question, answer, order_index, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&faq.id)
        .bind(&faq.question)
        .bind(&faq.answer)
        .bind(faq.order_index)
        .bind(faq.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn list_faqs(&self) -> Result<Vec<Faq>> {
        let rows = sqlx::query(
            "SELECT id, question, answer, order_index, created_at FROM faqs ORDER BY order_index, rowid",
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Faq {
                id: r.get("id"),
                question: r.get("question"),
                answer: r.get("answer"),
                order_index: r.get("order_index"),
                created_at: r.get("created_at"),
            })
            .collect())
    }

    pub async fn delete_faq(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM faqs WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Features ---

    pub async fn create_feature(&self, feature: &Feature) -> Result<()> {
        sqlx::query(
            "INSERT INTO features (id, title, description, icon, order_index, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&feature.id)
        .bind(&feature.title)
        .bind(&feature.description)
        .bind(&feature.icon)
        .bind(feature.order_index)
        .bind(feature.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn list_features(&self) -> Result<Vec<Feature>> {
        let rows = sqlx::query(
            "SELECT id, title, description, icon, order_index, created_at FROM features ORDER BY order_index, rowid",
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Feature {
                id: r.get("id"),
                title: r.get("title"),
                description: r.get("description"),
                icon: r.get("icon"),
                order_index: r.get("order_index"),
                created_at: r.get("created_at"),
            })
            .collect())
    }

    pub async fn delete_feature(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM features WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Testimonials ---

    pub async fn create_testimonial(&self, testimonial: &Testimonial) -> Result<()> {
        sqlx::query(
            "INSERT INTO testimonials (id, author, role, quote, order_index, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&testimonial.id)
        .bind(&testimonial.author)
        .bind(&testimonial.role)
        .bind(&testimonial.quote)
        .bind(testimonial.order_index)
        .bind(testimonial.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn list_testimonials(&self) -> Result<Vec<Testimonial>> {
        let rows = sqlx::query(
            "SELECT id, author, role, quote, order_index, created_at FROM testimonials ORDER BY order_index, rowid",
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Testimonial {
                id: r.get("id"),
                author: r.get("author"),
                role: r.get("role"),
                quote: r.get("quote"),
                order_index: r.get("order_index"),
                created_at: r.get("created_at"),
            })
            .collect())
    }

    pub async fn delete_testimonial(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM testimonials WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- About (singleton) ---

    pub async fn get_about(&self) -> Result<Option<About>> {
        let row = sqlx::query("SELECT title, body, updated_at FROM about WHERE id = ?")
            .bind(SINGLETON_ID)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|r| About {
            title: r.get("title"),
            body: r.get("body"),
            updated_at: r.get("updated_at"),
        }))
    }

    pub async fn upsert_about(&self, title: &str, body: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO about (id, title, body, updated_at) VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET title = excluded.title, body = excluded.body, updated_at = excluded.updated_at
            "#,
        )
        .bind(SINGLETON_ID)
        .bind(title)
        .bind(body)
        .bind(Utc::now())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    // --- Contact details (singleton) ---

    pub async fn get_contact_details(&self) -> Result<Option<ContactDetails>> {
        let row = sqlx::query("SELECT email, phone, address, updated_at FROM contact_details WHERE id = ?")
            .bind(SINGLETON_ID)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|r| ContactDetails {
            email: r.get("email"),
            phone: r.get("phone"),
            address: r.get("address"),
            updated_at: r.get("updated_at"),
        }))
    }

    pub async fn upsert_contact_details(&self, email: &str, phone: &str, address: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO contact_details (id, email, phone, address, updated_at) VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET email = excluded.email, phone = excluded.phone, address = excluded.address, updated_at = excluded.updated_at
            "#,
        )
        .bind(SINGLETON_ID)
        .bind(email)
        .bind(phone)
        .bind(address)
        .bind(Utc::now())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    // --- Contact messages ---

    pub async fn create_message(&self, message: &ContactMessage) -> Result<()> {
        sqlx::query(
            "INSERT INTO contact_messages (id, name, email, message, read, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&message.id)
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.message)
        .bind(message.read)
        .bind(message.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// List contact messages, newest first, optionally unread only
    pub async fn list_messages(&self, unread_only: bool) -> Result<Vec<ContactMessage>> {
        let sql = if unread_only {
            "SELECT id, name, email, message, read, created_at FROM contact_messages WHERE read = 0 ORDER BY created_at DESC"
        } else {
            "SELECT id, name, email, message, read, created_at FROM contact_messages ORDER BY created_at DESC"
        };

        let rows = sqlx::query(sql).fetch_all(self.db.pool()).await?;

        Ok(rows
            .into_iter()
            .map(|r| ContactMessage {
                id: r.get("id"),
                name: r.get("name"),
                email: r.get("email"),
                message: r.get("message"),
                read: r.get("read"),
                created_at: r.get("created_at"),
            })
            .collect())
    }

    /// Mark a contact message as read. Returns false if the id is unknown.
    pub async fn mark_message_read(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE contact_messages SET read = 1 WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_faq_ordering() {
        let db = Database::in_memory().await.unwrap();
        let repo = ContentRepository::new(&db);

        repo.create_faq(&Faq::new("Second?", "Yes", 2)).await.unwrap();
        repo.create_faq(&Faq::new("First?", "Yes", 1)).await.unwrap();

        let faqs = repo.list_faqs().await.unwrap();
        assert_eq!(faqs.len(), 2);
        assert_eq!(faqs[0].question, "First?");
        assert_eq!(faqs[1].question, "Second?");
    }

    #[tokio::test]
    async fn test_delete_faq() {
        let db = Database::in_memory().await.unwrap();
        let repo = ContentRepository::new(&db);

        let faq = Faq::new("Q?", "A", 0);
        repo.create_faq(&faq).await.unwrap();

        assert!(repo.delete_faq(&faq.id).await.unwrap());
        assert!(!repo.delete_faq(&faq.id).await.unwrap());
        assert!(repo.list_faqs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_features_and_testimonials() {
        let db = Database::in_memory().await.unwrap();
        let repo = ContentRepository::new(&db);

        repo.create_feature(&Feature::new("Search", "Find notes fast", 0))
            .await
            .unwrap();
        let mut t = Testimonial::new("Priya", "Saved my finals week", 0);
        t.role = Some("CS student".to_string());
        repo.create_testimonial(&t).await.unwrap();

        assert_eq!(repo.list_features().await.unwrap().len(), 1);
        let testimonials = repo.list_testimonials().await.unwrap();
        assert_eq!(testimonials[0].role.as_deref(), Some("CS student"));
    }

    #[tokio::test]
    async fn test_about_singleton_upsert() {
        let db = Database::in_memory().await.unwrap();
        let repo = ContentRepository::new(&db);

        assert!(repo.get_about().await.unwrap().is_none());

        repo.upsert_about("About us", "First version").await.unwrap();
        repo.upsert_about("About us", "Second version").await.unwrap();

        let about = repo.get_about().await.unwrap().unwrap();
        assert_eq!(about.body, "Second version");
    }

    #[tokio::test]
    async fn test_contact_details_singleton() {
        let db = Database::in_memory().await.unwrap();
        let repo = ContentRepository::new(&db);

        repo.upsert_contact_details("hello@campusnotes.example", "+1-555-0100", "42 Campus Way")
            .await
            .unwrap();

        let details = repo.get_contact_details().await.unwrap().unwrap();
        assert_eq!(details.email, "hello@campusnotes.example");
    }

    #[tokio::test]
    async fn test_contact_messages_read_flow() {
        let db = Database::in_memory().await.unwrap();
        let repo = ContentRepository::new(&db);

        let msg = ContactMessage::new("Sam", "sam@example.com", "Love the site");
        repo.create_message(&msg).await.unwrap();

        assert_eq!(repo.list_messages(true).await.unwrap().len(), 1);

        assert!(repo.mark_message_read(&msg.id).await.unwrap());
        assert!(repo.list_messages(true).await.unwrap().is_empty());
        assert_eq!(repo.list_messages(false).await.unwrap().len(), 1);
    }
}
