//! Notes
//!
//! The central entity of the platform: uploaded study notes, filed under a
//! university/branch/subject/semester, carrying denormalized rating
//! aggregates and a moderation status.

use crate::storage::Database;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use uuid::Uuid;

/// Note moderation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl NoteStatus {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteStatus::Pending => "pending",
            NoteStatus::Approved => "approved",
            NoteStatus::Rejected => "rejected",
        }
    }

    /// Parse from database string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(NoteStatus::Pending),
            "approved" => Some(NoteStatus::Approved),
            "rejected" => Some(NoteStatus::Rejected),
            _ => None,
        }
    }
}

/// An uploaded note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub uploader_id: String,
    pub university_id: String,
    pub subject_id: String,
    pub branch_id: String,
    pub semester: i64,
    /// Public URL of the hosted file
    pub file_url: String,
    /// SHA-256 hex digest of the file contents
    pub file_hash: String,
    pub download_count: i64,
    /// Average of all stars, recomputed on every rating write
    pub avg_rating: f64,
    pub rating_count: i64,
    pub status: NoteStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a note
#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: String,
    pub description: Option<String>,
    pub uploader_id: String,
    pub university_id: String,
    pub subject_id: String,
    pub branch_id: String,
    pub semester: i64,
    pub file_url: String,
    pub file_hash: String,
}

impl Note {
    /// Create a new pending note
    pub fn new(fields: NewNote) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: fields.title,
            description: fields.description,
            uploader_id: fields.uploader_id,
            university_id: fields.university_id,
            subject_id: fields.subject_id,
            branch_id: fields.branch_id,
            semester: fields.semester,
            file_url: fields.file_url,
            file_hash: fields.file_hash,
            download_count: 0,
            avg_rating: 0.0,
            rating_count: 0,
            status: NoteStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Filters for browsing notes
#[derive(Debug, Clone, Default)]
pub struct NoteFilter {
    pub university_id: Option<String>,
    pub subject_id: Option<String>,
    pub branch_id: Option<String>,
    pub semester: Option<i64>,
    pub uploader_id: Option<String>,
    /// Case-insensitive substring match on the title
    pub search: Option<String>,
    pub status: Option<NoteStatus>,
}

const NOTE_COLUMNS: &str = "id, title, description, uploader_id, university_id, subject_id, branch_id, semester, file_url, file_hash, download_count, avg_rating, rating_count, status, created_at, updated_at";

/// Note repository for database operations
pub struct NoteRepository<'a> {
    db: &'a Database,
}

impl<'a> NoteRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a new note in the database
    pub async fn create(&self, note: &Note) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notes (id, title, description, uploader_id, university_id, subject_id, branch_id, semester, file_url, file_hash, download_count, avg_rating, rating_count, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&note.id)
        .bind(&note.title)
        .bind(&note.description)
        .bind(&note.uploader_id)
        .bind(&note.university_id)
        .bind(&note.subject_id)
        .bind(&note.branch_id)
        .bind(note.semester)
        .bind(&note.file_url)
        .bind(&note.file_hash)
        .bind(note.download_count)
        .bind(note.avg_rating)
        .bind(note.rating_count)
        .bind(note.status.as_str())
        .bind(note.created_at)
        .bind(note.updated_at)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    /// Get a note by ID
    pub async fn get(&self, id: &str) -> Result<Option<Note>> {
        let row = sqlx::query(&format!("SELECT {} FROM notes WHERE id = ?", NOTE_COLUMNS))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(row_to_note))
    }

    /// List notes matching a filter, newest first
    pub async fn list(&self, filter: &NoteFilter) -> Result<Vec<Note>> {
        let mut sql = format!("SELECT {} FROM notes WHERE 1=1", NOTE_COLUMNS);
        if filter.university_id.is_some() {
            sql.push_str(" AND university_id = ?");
        }
        if filter.subject_id.is_some() {
            sql.push_str(" AND subject_id = ?");
        }
        if filter.branch_id.is_some() {
            sql.push_str(" AND branch_id = ?");
        }
        if filter.semester.is_some() {
            sql.push_str(" AND semester = ?");
        }
        if filter.uploader_id.is_some() {
            sql.push_str(" AND uploader_id = ?");
        }
        if filter.search.is_some() {
            sql.push_str(" AND title LIKE ?");
        }
        if filter.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query(&sql);
        if let Some(v) = &filter.university_id {
            query = query.bind(v);
        }
        if let Some(v) = &filter.subject_id {
            query = query.bind(v);
        }
        if let Some(v) = &filter.branch_id {
            query = query.bind(v);
        }
        if let Some(v) = filter.semester {
            query = query.bind(v);
        }
        if let Some(v) = &filter.uploader_id {
            query = query.bind(v);
        }
        if let Some(v) = &filter.search {
            query = query.bind(format!("%{}%", v));
        }
        if let Some(v) = filter.status {
            query = query.bind(v.as_str());
        }

        let rows = query.fetch_all(self.db.pool()).await?;
        Ok(rows.into_iter().map(row_to_note).collect())
    }

    /// Increment the download counter
    pub async fn record_download(&self, id: &str) -> Result<()> {
        sqlx::query("UPDATE notes SET download_count = download_count + 1 WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    /// Update the moderation status
    pub async fn set_status(&self, id: &str, status: NoteStatus) -> Result<()> {
        sqlx::query("UPDATE notes SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    /// Check whether a file with this content hash was already uploaded
    pub async fn hash_exists(&self, file_hash: &str) -> Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM notes WHERE file_hash = ?")
            .bind(file_hash)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.is_some())
    }

    /// Check if a note exists
    pub async fn exists(&self, id: &str) -> Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM notes WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.is_some())
    }

    /// Permanently delete a note; ratings and reports cascade
    pub async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }
}

/// Convert a database row to a Note
fn row_to_note(row: sqlx::sqlite::SqliteRow) -> Note {
    Note {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        uploader_id: row.get("uploader_id"),
        university_id: row.get("university_id"),
        subject_id: row.get("subject_id"),
        branch_id: row.get("branch_id"),
        semester: row.get("semester"),
        file_url: row.get("file_url"),
        file_hash: row.get("file_hash"),
        download_count: row.get("download_count"),
        avg_rating: row.get("avg_rating"),
        rating_count: row.get("rating_count"),
        status: NoteStatus::parse(row.get("status")).unwrap_or_default(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{sample_note, seed};
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_note() {
        let db = Database::in_memory().await.unwrap();
        let fx = seed(&db).await;
        let repo = NoteRepository::new(&db);

        let note = sample_note(&fx, "Sorting Algorithms");
        repo.create(&note).await.unwrap();

        let retrieved = repo.get(&note.id).await.unwrap().expect("Note should exist");
        assert_eq!(retrieved.title, "Sorting Algorithms");
        assert_eq!(retrieved.status, NoteStatus::Pending);
        assert_eq!(retrieved.avg_rating, 0.0);
        assert_eq!(retrieved.rating_count, 0);
    }

    #[tokio::test]
    async fn test_list_filters_by_status_and_search() {
        let db = Database::in_memory().await.unwrap();
        let fx = seed(&db).await;
        let repo = NoteRepository::new(&db);

        let approved = sample_note(&fx, "Graph Theory Lecture");
        repo.create(&approved).await.unwrap();
        repo.set_status(&approved.id, NoteStatus::Approved).await.unwrap();

        let pending = sample_note(&fx, "Graph Coloring Draft");
        repo.create(&pending).await.unwrap();

        let visible = repo
            .list(&NoteFilter {
                status: Some(NoteStatus::Approved),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, approved.id);

        let matched = repo
            .list(&NoteFilter {
                search: Some("Graph".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(matched.len(), 2);
    }

    #[tokio::test]
    async fn test_list_filters_by_catalog() {
        let db = Database::in_memory().await.unwrap();
        let fx = seed(&db).await;
        let repo = NoteRepository::new(&db);

        repo.create(&sample_note(&fx, "Note A")).await.unwrap();
        repo.create(&sample_note(&fx, "Note B")).await.unwrap();

        let by_subject = repo
            .list(&NoteFilter {
                subject_id: Some(fx.subject_id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_subject.len(), 2);

        let wrong_semester = repo
            .list(&NoteFilter {
                semester: Some(7),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(wrong_semester.is_empty());
    }

    #[tokio::test]
    async fn test_record_download() {
        let db = Database::in_memory().await.unwrap();
        let fx = seed(&db).await;
        let repo = NoteRepository::new(&db);

        let note = sample_note(&fx, "Download Me");
        repo.create(&note).await.unwrap();

        repo.record_download(&note.id).await.unwrap();
        repo.record_download(&note.id).await.unwrap();

        let retrieved = repo.get(&note.id).await.unwrap().unwrap();
        assert_eq!(retrieved.download_count, 2);
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let db = Database::in_memory().await.unwrap();
        let fx = seed(&db).await;
        let repo = NoteRepository::new(&db);

        let note = sample_note(&fx, "Moderate Me");
        repo.create(&note).await.unwrap();

        repo.set_status(&note.id, NoteStatus::Approved).await.unwrap();
        assert_eq!(repo.get(&note.id).await.unwrap().unwrap().status, NoteStatus::Approved);

        repo.set_status(&note.id, NoteStatus::Rejected).await.unwrap();
        assert_eq!(repo.get(&note.id).await.unwrap().unwrap().status, NoteStatus::Rejected);
    }

    #[tokio::test]
    async fn test_hash_exists() {
        let db = Database::in_memory().await.unwrap();
        let fx = seed(&db).await;
        let repo = NoteRepository::new(&db);

        let note = sample_note(&fx, "Hashed");
        repo.create(&note).await.unwrap();

        assert!(repo.hash_exists(&note.file_hash).await.unwrap());
        assert!(!repo.hash_exists("missing-hash").await.unwrap());
    }
}
