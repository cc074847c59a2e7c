//! Admin management of universities, branches and subjects

use crate::catalog::{
    Branch, BranchRepository, Subject, SubjectRepository, University, UniversityRepository,
};
use crate::storage::Database;
use crate::{Error, Result};

/// Catalog CRUD with uniqueness and referential checks
pub struct CatalogService<'a> {
    db: &'a Database,
}

impl<'a> CatalogService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn create_university(&self, name: &str) -> Result<University> {
        let name = non_empty(name, "University name")?;

        let repo = UniversityRepository::new(self.db);
        if repo.name_exists(name).await? {
            return Err(Error::Conflict(format!(
                "University '{}' already exists",
                name
            )));
        }

        let university = University::new(name);
        repo.create(&university).await?;
        Ok(university)
    }

    pub async fn list_universities(&self) -> Result<Vec<University>> {
        UniversityRepository::new(self.db).list().await
    }

    /// Delete a university; its subjects cascade, notes referencing it block
    pub async fn delete_university(&self, id: &str) -> Result<()> {
        let repo = UniversityRepository::new(self.db);
        if repo.get(id).await?.is_none() {
            return Err(Error::NotFound("University", id.to_string()));
        }
        repo.delete(id).await.map_err(restrict_to_conflict)
    }

    pub async fn create_branch(&self, name: &str) -> Result<Branch> {
        let name = non_empty(name, "Branch name")?;

        let repo = BranchRepository::new(self.db);
        if repo.name_exists(name).await? {
            return Err(Error::Conflict(format!("Branch '{}' already exists", name)));
        }

        let branch = Branch::new(name);
        repo.create(&branch).await?;
        Ok(branch)
    }

    pub async fn list_branches(&self) -> Result<Vec<Branch>> {
        BranchRepository::new(self.db).list().await
    }

    pub async fn delete_branch(&self, id: &str) -> Result<()> {
        let repo = BranchRepository::new(self.db);
        if repo.get(id).await?.is_none() {
            return Err(Error::NotFound("Branch", id.to_string()));
        }
        repo.delete(id).await.map_err(restrict_to_conflict)
    }

    pub async fn create_subject(
        &self,
        name: &str,
        university_id: &str,
        branch_id: &str,
        semester: i64,
    ) -> Result<Subject> {
        let name = non_empty(name, "Subject name")?;
        if !(1..=12).contains(&semester) {
            return Err(Error::Validation(
                "Semester must be between 1 and 12".to_string(),
            ));
        }

        if UniversityRepository::new(self.db)
            .get(university_id)
            .await?
            .is_none()
        {
            return Err(Error::NotFound("University", university_id.to_string()));
        }
        if BranchRepository::new(self.db).get(branch_id).await?.is_none() {
            return Err(Error::NotFound("Branch", branch_id.to_string()));
        }

        let repo = SubjectRepository::new(self.db);
        if repo.exists(name, university_id, branch_id, semester).await? {
            return Err(Error::Conflict(format!(
                "Subject '{}' already exists for that branch and semester",
                name
            )));
        }

        let subject = Subject::new(name, university_id, branch_id, semester);
        repo.create(&subject).await?;
        Ok(subject)
    }

    pub async fn list_subjects(
        &self,
        university_id: Option<&str>,
        branch_id: Option<&str>,
    ) -> Result<Vec<Subject>> {
        SubjectRepository::new(self.db)
            .list(university_id, branch_id)
            .await
    }

    pub async fn delete_subject(&self, id: &str) -> Result<()> {
        let repo = SubjectRepository::new(self.db);
        if repo.get(id).await?.is_none() {
            return Err(Error::NotFound("Subject", id.to_string()));
        }
        repo.delete(id).await.map_err(restrict_to_conflict)
    }
}

fn non_empty<'s>(value: &'s str, what: &str) -> Result<&'s str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{} cannot be empty", what)));
    }
    Ok(trimmed)
}

/// Foreign-key RESTRICT failures mean notes still reference the row
fn restrict_to_conflict(err: Error) -> Error {
    match &err {
        Error::Database(sqlx::Error::Database(db_err))
            if db_err.message().contains("FOREIGN KEY constraint failed") =>
        {
            Error::Conflict("Cannot delete while notes still reference it".to_string())
        }
        _ => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::test_support::{sample_note, seed};
    use crate::notes::NoteRepository;

    #[tokio::test]
    async fn test_university_crud() {
        let db = Database::in_memory().await.unwrap();
        let service = CatalogService::new(&db);

        let uni = service.create_university("  IIT Delhi  ").await.unwrap();
        assert_eq!(uni.name, "IIT Delhi");

        let result = service.create_university("IIT Delhi").await;
        assert!(matches!(result, Err(Error::Conflict(_))));

        assert_eq!(service.list_universities().await.unwrap().len(), 1);

        service.delete_university(&uni.id).await.unwrap();
        assert!(service.list_universities().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_names_rejected() {
        let db = Database::in_memory().await.unwrap();
        let service = CatalogService::new(&db);

        assert!(matches!(
            service.create_university("   ").await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            service.create_branch("").await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_subject_requires_existing_parents() {
        let db = Database::in_memory().await.unwrap();
        let service = CatalogService::new(&db);

        let result = service.create_subject("Calculus", "no-uni", "no-branch", 1).await;
        assert!(matches!(result, Err(Error::NotFound("University", _))));

        let uni = service.create_university("MIT").await.unwrap();
        let result = service.create_subject("Calculus", &uni.id, "no-branch", 1).await;
        assert!(matches!(result, Err(Error::NotFound("Branch", _))));
    }

    #[tokio::test]
    async fn test_subject_uniqueness_and_semester() {
        let db = Database::in_memory().await.unwrap();
        let service = CatalogService::new(&db);

        let uni = service.create_university("MIT").await.unwrap();
        let branch = service.create_branch("CS").await.unwrap();

        let result = service.create_subject("Calculus", &uni.id, &branch.id, 0).await;
        assert!(matches!(result, Err(Error::Validation(_))));

        service
            .create_subject("Calculus", &uni.id, &branch.id, 1)
            .await
            .unwrap();
        let result = service.create_subject("Calculus", &uni.id, &branch.id, 1).await;
        assert!(matches!(result, Err(Error::Conflict(_))));

        // Same name in another semester is fine
        service
            .create_subject("Calculus", &uni.id, &branch.id, 2)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_rows() {
        let db = Database::in_memory().await.unwrap();
        let service = CatalogService::new(&db);

        assert!(matches!(
            service.delete_university("missing").await,
            Err(Error::NotFound("University", _))
        ));
        assert!(matches!(
            service.delete_subject("missing").await,
            Err(Error::NotFound("Subject", _))
        ));
    }

    #[tokio::test]
    async fn test_delete_blocked_by_notes() {
        let db = Database::in_memory().await.unwrap();
        let fx = seed(&db).await;

        let note = sample_note(&fx, "Blocking Note");
        NoteRepository::new(&db).create(&note).await.unwrap();

        let service = CatalogService::new(&db);
        let result = service.delete_university(&fx.university_id).await;
        assert!(matches!(result, Err(Error::Conflict(_))));

        // After the note goes away the delete succeeds
        NoteRepository::new(&db).delete(&note.id).await.unwrap();
        service.delete_university(&fx.university_id).await.unwrap();
    }
}
