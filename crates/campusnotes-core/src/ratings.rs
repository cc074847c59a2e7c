//! Ratings
//!
//! One rating per user per note. Every write goes through a transaction that
//! also recomputes the note's denormalized `avg_rating`/`rating_count` from
//! the ratings table, so the aggregates can never drift from the source rows.

use crate::storage::Database;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, Sqlite, Transaction};
use uuid::Uuid;

/// A star rating left on a note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub id: String,
    pub note_id: String,
    pub user_id: String,
    /// 1 to 5 stars
    pub stars: i64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rating {
    pub fn new(
        note_id: impl Into<String>,
        user_id: impl Into<String>,
        stars: i64,
        comment: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            note_id: note_id.into(),
            user_id: user_id.into(),
            stars,
            comment,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Rating repository for database operations
pub struct RatingRepository<'a> {
    db: &'a Database,
}

impl<'a> RatingRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert or replace this user's rating for a note, then recompute the
    /// note's aggregates within the same transaction.
    pub async fn upsert(&self, rating: &Rating) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO ratings (id, note_id, user_id, stars, comment, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(note_id, user_id)
            DO UPDATE SET stars = excluded.stars, comment = excluded.comment, updated_at = excluded.updated_at
            "#,
        )
        .bind(&rating.id)
        .bind(&rating.note_id)
        .bind(&rating.user_id)
        .bind(rating.stars)
        .bind(&rating.comment)
        .bind(rating.created_at)
        .bind(rating.updated_at)
        .execute(&mut *tx)
        .await?;

        recompute_aggregates(&mut tx, &rating.note_id).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Remove a user's rating from a note and recompute the aggregates.
    /// Returns true if a rating was deleted.
    pub async fn delete(&self, note_id: &str, user_id: &str) -> Result<bool> {
        let mut tx = self.db.pool().begin().await?;

        let result = sqlx::query("DELETE FROM ratings WHERE note_id = ? AND user_id = ?")
            .bind(note_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        recompute_aggregates(&mut tx, note_id).await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Get a user's rating for a note
    pub async fn get(&self, note_id: &str, user_id: &str) -> Result<Option<Rating>> {
        let row = sqlx::query(
            "SELECT id, note_id, user_id, stars, comment, created_at, updated_at FROM ratings WHERE note_id = ? AND user_id = ?",
        )
        .bind(note_id)
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(row_to_rating))
    }

    /// List all ratings for a note, newest first
    pub async fn list_for_note(&self, note_id: &str) -> Result<Vec<Rating>> {
        let rows = sqlx::query(
            "SELECT id, note_id, user_id, stars, comment, created_at, updated_at FROM ratings WHERE note_id = ? ORDER BY created_at DESC",
        )
        .bind(note_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(row_to_rating).collect())
    }
}

/// Recompute a note's avg_rating and rating_count from the ratings table.
/// Must run inside the transaction that modified the ratings.
async fn recompute_aggregates(tx: &mut Transaction<'_, Sqlite>, note_id: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE notes
        SET avg_rating = COALESCE((SELECT AVG(stars) FROM ratings WHERE note_id = ?), 0.0),
            rating_count = (SELECT COUNT(*) FROM ratings WHERE note_id = ?),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(note_id)
    .bind(note_id)
    .bind(Utc::now())
    .bind(note_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

fn row_to_rating(row: sqlx::sqlite::SqliteRow) -> Rating {
    Rating {
        id: row.get("id"),
        note_id: row.get("note_id"),
        user_id: row.get("user_id"),
        stars: row.get("stars"),
        comment: row.get("comment"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::test_support::{sample_note, seed, seed_with_email};
    use crate::notes::NoteRepository;

    #[tokio::test]
    async fn test_rating_updates_note_aggregates() {
        let db = Database::in_memory().await.unwrap();
        let fx = seed(&db).await;
        let rater_a = seed_with_email(&db, "a@example.com").await;
        let rater_b = seed_with_email(&db, "b@example.com").await;

        let note_repo = NoteRepository::new(&db);
        let note = sample_note(&fx, "Rated Note");
        note_repo.create(&note).await.unwrap();

        let repo = RatingRepository::new(&db);
        repo.upsert(&Rating::new(&note.id, &rater_a.user_id, 5, None))
            .await
            .unwrap();
        repo.upsert(&Rating::new(&note.id, &rater_b.user_id, 2, Some("meh".into())))
            .await
            .unwrap();

        let updated = note_repo.get(&note.id).await.unwrap().unwrap();
        assert_eq!(updated.rating_count, 2);
        assert!((updated.avg_rating - 3.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_second_rating_by_same_user_replaces_first() {
        let db = Database::in_memory().await.unwrap();
        let fx = seed(&db).await;
        let rater = seed_with_email(&db, "rater@example.com").await;

        let note_repo = NoteRepository::new(&db);
        let note = sample_note(&fx, "Re-rated Note");
        note_repo.create(&note).await.unwrap();

        let repo = RatingRepository::new(&db);
        repo.upsert(&Rating::new(&note.id, &rater.user_id, 5, None))
            .await
            .unwrap();
        repo.upsert(&Rating::new(&note.id, &rater.user_id, 1, Some("changed my mind".into())))
            .await
            .unwrap();

        let updated = note_repo.get(&note.id).await.unwrap().unwrap();
        assert_eq!(updated.rating_count, 1, "Upsert must not add a second row");
        assert!((updated.avg_rating - 1.0).abs() < f64::EPSILON);

        let stored = repo.get(&note.id, &rater.user_id).await.unwrap().unwrap();
        assert_eq!(stored.stars, 1);
        assert_eq!(stored.comment.as_deref(), Some("changed my mind"));
    }

    #[tokio::test]
    async fn test_delete_rating_recomputes() {
        let db = Database::in_memory().await.unwrap();
        let fx = seed(&db).await;
        let rater_a = seed_with_email(&db, "a@example.com").await;
        let rater_b = seed_with_email(&db, "b@example.com").await;

        let note_repo = NoteRepository::new(&db);
        let note = sample_note(&fx, "Deleted Rating Note");
        note_repo.create(&note).await.unwrap();

        let repo = RatingRepository::new(&db);
        repo.upsert(&Rating::new(&note.id, &rater_a.user_id, 4, None))
            .await
            .unwrap();
        repo.upsert(&Rating::new(&note.id, &rater_b.user_id, 2, None))
            .await
            .unwrap();

        assert!(repo.delete(&note.id, &rater_b.user_id).await.unwrap());

        let updated = note_repo.get(&note.id).await.unwrap().unwrap();
        assert_eq!(updated.rating_count, 1);
        assert!((updated.avg_rating - 4.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_deleting_last_rating_zeroes_aggregates() {
        let db = Database::in_memory().await.unwrap();
        let fx = seed(&db).await;
        let rater = seed_with_email(&db, "only@example.com").await;

        let note_repo = NoteRepository::new(&db);
        let note = sample_note(&fx, "Zeroed Note");
        note_repo.create(&note).await.unwrap();

        let repo = RatingRepository::new(&db);
        repo.upsert(&Rating::new(&note.id, &rater.user_id, 3, None))
            .await
            .unwrap();
        repo.delete(&note.id, &rater.user_id).await.unwrap();

        let updated = note_repo.get(&note.id).await.unwrap().unwrap();
        assert_eq!(updated.rating_count, 0);
        assert_eq!(updated.avg_rating, 0.0);
    }

    #[tokio::test]
    async fn test_delete_missing_rating_returns_false() {
        let db = Database::in_memory().await.unwrap();
        let fx = seed(&db).await;

        let note_repo = NoteRepository::new(&db);
        let note = sample_note(&fx, "Untouched Note");
        note_repo.create(&note).await.unwrap();

        let repo = RatingRepository::new(&db);
        assert!(!repo.delete(&note.id, &fx.user_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_for_note() {
        let db = Database::in_memory().await.unwrap();
        let fx = seed(&db).await;
        let rater = seed_with_email(&db, "lister@example.com").await;

        let note_repo = NoteRepository::new(&db);
        let note = sample_note(&fx, "Listed Note");
        note_repo.create(&note).await.unwrap();

        let repo = RatingRepository::new(&db);
        repo.upsert(&Rating::new(&note.id, &rater.user_id, 5, Some("great".into())))
            .await
            .unwrap();

        let ratings = repo.list_for_note(&note.id).await.unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].stars, 5);
    }
}
