//! Academic catalog
//!
//! Universities, branches and subjects. These are admin-managed reference
//! data that notes are filed under.

use crate::storage::Database;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use uuid::Uuid;

/// A university
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct University {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl University {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A branch of study (e.g. computer science, mechanical engineering)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Branch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A subject, scoped to a university, branch and semester
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub university_id: String,
    pub branch_id: String,
    pub semester: i64,
    pub created_at: DateTime<Utc>,
}

impl Subject {
    pub fn new(
        name: impl Into<String>,
        university_id: impl Into<String>,
        branch_id: impl Into<String>,
        semester: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            university_id: university_id.into(),
            branch_id: branch_id.into(),
            semester,
            created_at: Utc::now(),
        }
    }
}

/// University repository for database operations
pub struct UniversityRepository<'a> {
    db: &'a Database,
}

impl<'a> UniversityRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, university: &University) -> Result<()> {
        sqlx::query("INSERT INTO universities (id, name, created_at) VALUES (?, ?, ?)")
            .bind(&university.id)
            .bind(&university.name)
            .bind(university.created_at)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<University>> {
        let row = sqlx::query("SELECT id, name, created_at FROM universities WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|r| University {
            id: r.get("id"),
            name: r.get("name"),
            created_at: r.get("created_at"),
        }))
    }

    pub async fn list(&self) -> Result<Vec<University>> {
        let rows = sqlx::query("SELECT id, name, created_at FROM universities ORDER BY name")
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| University {
                id: r.get("id"),
                name: r.get("name"),
                created_at: r.get("created_at"),
            })
            .collect())
    }

    pub async fn name_exists(&self, name: &str) -> Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM universities WHERE name = ?")
            .bind(name)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.is_some())
    }

    /// Delete a university. Fails if notes still reference it (FK RESTRICT);
    /// subjects under it are removed via cascade.
    pub async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM universities WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }
}

/// Branch repository for database operations
pub struct BranchRepository<'a> {
    db: &'a Database,
}

impl<'a> BranchRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, branch: &Branch) -> Result<()> {
        sqlx::query("INSERT INTO branches (id, name, created_at) VALUES (?, ?, ?)")
            .bind(&branch.id)
            .bind(&branch.name)
            .bind(branch.created_at)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Branch>> {
        let row = sqlx::query("SELECT id, name, created_at FROM branches WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|r| Branch {
            id: r.get("id"),
            name: r.get("name"),
            created_at: r.get("created_at"),
        }))
    }

    pub async fn list(&self) -> Result<Vec<Branch>> {
        let rows = sqlx::query("SELECT id, name, created_at FROM branches ORDER BY name")
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| Branch {
                id: r.get("id"),
                name: r.get("name"),
                created_at: r.get("created_at"),
            })
            .collect())
    }

    pub async fn name_exists(&self, name: &str) -> Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM branches WHERE name = ?")
            .bind(name)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.is_some())
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM branches WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }
}

/// Subject repository for database operations
pub struct SubjectRepository<'a> {
    db: &'a Database,
}

impl<'a> SubjectRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, subject: &Subject) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO subjects (id, name, university_id, branch_id, semester, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&subject.id)
        .bind(&subject.name)
        .bind(&subject.university_id)
        .bind(&subject.branch_id)
        .bind(subject.semester)
        .bind(subject.created_at)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Subject>> {
        let row = sqlx::query(
            "SELECT id, name, university_id, branch_id, semester, created_at FROM subjects WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(row_to_subject))
    }

    /// List subjects, optionally filtered by university and/or branch
    pub async fn list(
        &self,
        university_id: Option<&str>,
        branch_id: Option<&str>,
    ) -> Result<Vec<Subject>> {
        let mut sql = String::from(
            "SELECT id, name, university_id, branch_id, semester, created_at FROM subjects WHERE 1=1",
        );
        if university_id.is_some() {
            sql.push_str(" AND university_id = ?");
        }
        if branch_id.is_some() {
            sql.push_str(" AND branch_id = ?");
        }
        sql.push_str(" ORDER BY semester, name");

        let mut query = sqlx::query(&sql);
        if let Some(uid) = university_id {
            query = query.bind(uid);
        }
        if let Some(bid) = branch_id {
            query = query.bind(bid);
        }

        let rows = query.fetch_all(self.db.pool()).await?;
        Ok(rows.into_iter().map(row_to_subject).collect())
    }

    /// Check whether an identical subject already exists
    pub async fn exists(
        &self,
        name: &str,
        university_id: &str,
        branch_id: &str,
        semester: i64,
    ) -> Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT 1 FROM subjects WHERE name = ? AND university_id = ? AND branch_id = ? AND semester = ?",
        )
        .bind(name)
        .bind(university_id)
        .bind(branch_id)
        .bind(semester)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.is_some())
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM subjects WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }
}

fn row_to_subject(row: sqlx::sqlite::SqliteRow) -> Subject {
    Subject {
        id: row.get("id"),
        name: row.get("name"),
        university_id: row.get("university_id"),
        branch_id: row.get("branch_id"),
        semester: row.get("semester"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed(db: &Database) -> (University, Branch) {
        let uni = University::new("Test University");
        UniversityRepository::new(db).create(&uni).await.unwrap();
        let branch = Branch::new("Computer Science");
        BranchRepository::new(db).create(&branch).await.unwrap();
        (uni, branch)
    }

    #[tokio::test]
    async fn test_university_crud() {
        let db = Database::in_memory().await.unwrap();
        let repo = UniversityRepository::new(&db);

        let uni = University::new("Purdue");
        repo.create(&uni).await.unwrap();

        assert!(repo.name_exists("Purdue").await.unwrap());
        assert_eq!(repo.list().await.unwrap().len(), 1);

        repo.delete(&uni.id).await.unwrap();
        assert!(repo.get(&uni.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_university_name_rejected() {
        let db = Database::in_memory().await.unwrap();
        let repo = UniversityRepository::new(&db);

        repo.create(&University::new("MIT")).await.unwrap();
        assert!(repo.create(&University::new("MIT")).await.is_err());
    }

    #[tokio::test]
    async fn test_subject_compound_uniqueness() {
        let db = Database::in_memory().await.unwrap();
        let (uni, branch) = seed(&db).await;
        let repo = SubjectRepository::new(&db);

        let subject = Subject::new("Algorithms", &uni.id, &branch.id, 4);
        repo.create(&subject).await.unwrap();

        // Same name in a different semester is fine
        repo.create(&Subject::new("Algorithms", &uni.id, &branch.id, 5))
            .await
            .unwrap();

        // Identical tuple is rejected
        let dup = Subject::new("Algorithms", &uni.id, &branch.id, 4);
        assert!(repo.create(&dup).await.is_err());
        assert!(repo.exists("Algorithms", &uni.id, &branch.id, 4).await.unwrap());
    }

    #[tokio::test]
    async fn test_subject_list_filters() {
        let db = Database::in_memory().await.unwrap();
        let (uni, branch) = seed(&db).await;
        let other_branch = Branch::new("Mechanical");
        BranchRepository::new(&db).create(&other_branch).await.unwrap();

        let repo = SubjectRepository::new(&db);
        repo.create(&Subject::new("Algorithms", &uni.id, &branch.id, 4))
            .await
            .unwrap();
        repo.create(&Subject::new("Thermodynamics", &uni.id, &other_branch.id, 4))
            .await
            .unwrap();

        let all = repo.list(Some(&uni.id), None).await.unwrap();
        assert_eq!(all.len(), 2);

        let cs_only = repo.list(Some(&uni.id), Some(&branch.id)).await.unwrap();
        assert_eq!(cs_only.len(), 1);
        assert_eq!(cs_only[0].name, "Algorithms");
    }

    #[tokio::test]
    async fn test_university_delete_cascades_subjects() {
        let db = Database::in_memory().await.unwrap();
        let (uni, branch) = seed(&db).await;

        let subject_repo = SubjectRepository::new(&db);
        let subject = Subject::new("Databases", &uni.id, &branch.id, 3);
        subject_repo.create(&subject).await.unwrap();

        UniversityRepository::new(&db).delete(&uni.id).await.unwrap();

        assert!(subject_repo.get(&subject.id).await.unwrap().is_none());
    }
}
