//! Reports
//!
//! Users can flag a note for moderation. One open report per reporter per
//! note; admins resolve or dismiss them.

use crate::storage::Database;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use uuid::Uuid;

/// Report lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Open,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Open => "open",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Dismissed => "dismissed",
        }
    }

    /// Parse from database string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(ReportStatus::Open),
            "resolved" => Some(ReportStatus::Resolved),
            "dismissed" => Some(ReportStatus::Dismissed),
            _ => None,
        }
    }
}

/// A report filed against a note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub note_id: String,
    pub reporter_id: String,
    pub reason: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    pub fn new(
        note_id: impl Into<String>,
        reporter_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            note_id: note_id.into(),
            reporter_id: reporter_id.into(),
            reason: reason.into(),
            status: ReportStatus::Open,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Report repository for database operations
pub struct ReportRepository<'a> {
    db: &'a Database,
}

impl<'a> ReportRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// File a new report
    pub async fn create(&self, report: &Report) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reports (id, note_id, reporter_id, reason, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&report.id)
        .bind(&report.note_id)
        .bind(&report.reporter_id)
        .bind(&report.reason)
        .bind(report.status.as_str())
        .bind(report.created_at)
        .bind(report.updated_at)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    /// Get a report by ID
    pub async fn get(&self, id: &str) -> Result<Option<Report>> {
        let row = sqlx::query(
            "SELECT id, note_id, reporter_id, reason, status, created_at, updated_at FROM reports WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(row_to_report))
    }

    /// List reports, optionally filtered by status, oldest open first
    pub async fn list(&self, status: Option<ReportStatus>) -> Result<Vec<Report>> {
        let rows = if let Some(status) = status {
            sqlx::query(
                "SELECT id, note_id, reporter_id, reason, status, created_at, updated_at FROM reports WHERE status = ? ORDER BY created_at",
            )
            .bind(status.as_str())
            .fetch_all(self.db.pool())
            .await?
        } else {
            sqlx::query(
                "SELECT id, note_id, reporter_id, reason, status, created_at, updated_at FROM reports ORDER BY created_at",
            )
            .fetch_all(self.db.pool())
            .await?
        };

        Ok(rows.into_iter().map(row_to_report).collect())
    }

    /// Check whether this user already reported this note
    pub async fn exists_for(&self, note_id: &str, reporter_id: &str) -> Result<bool> {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM reports WHERE note_id = ? AND reporter_id = ?")
                .bind(note_id)
                .bind(reporter_id)
                .fetch_optional(self.db.pool())
                .await?;

        Ok(row.is_some())
    }

    /// Update a report's status
    pub async fn set_status(&self, id: &str, status: ReportStatus) -> Result<()> {
        sqlx::query("UPDATE reports SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }
}

fn row_to_report(row: sqlx::sqlite::SqliteRow) -> Report {
    Report {
        id: row.get("id"),
        note_id: row.get("note_id"),
        reporter_id: row.get("reporter_id"),
        reason: row.get("reason"),
        status: ReportStatus::parse(row.get("status")).unwrap_or_default(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
