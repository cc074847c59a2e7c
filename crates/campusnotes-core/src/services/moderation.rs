//! Admin moderation of notes and reports

use crate::notes::{Note, NoteFilter, NoteRepository, NoteStatus};
use crate::reports::{Report, ReportRepository, ReportStatus};
use crate::storage::Database;
use crate::{Error, Result};

/// Moderation queue operations; callers must already be admin-gated
pub struct ModerationService<'a> {
    db: &'a Database,
}

impl<'a> ModerationService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Notes in a given moderation state, or all when none given
    pub async fn notes(&self, status: Option<NoteStatus>) -> Result<Vec<Note>> {
        NoteRepository::new(self.db)
            .list(&NoteFilter {
                status,
                ..Default::default()
            })
            .await
    }

    pub async fn approve_note(&self, id: &str) -> Result<Note> {
        self.set_note_status(id, NoteStatus::Approved).await
    }

    pub async fn reject_note(&self, id: &str) -> Result<Note> {
        self.set_note_status(id, NoteStatus::Rejected).await
    }

    async fn set_note_status(&self, id: &str, status: NoteStatus) -> Result<Note> {
        let repo = NoteRepository::new(self.db);
        if !repo.exists(id).await? {
            return Err(Error::NoteNotFound(id.to_string()));
        }
        repo.set_status(id, status).await?;

        repo.get(id)
            .await?
            .ok_or_else(|| Error::NoteNotFound(id.to_string()))
    }

    /// Reports, oldest first; defaults to the open queue
    pub async fn reports(&self, status: Option<ReportStatus>) -> Result<Vec<Report>> {
        ReportRepository::new(self.db).list(status).await
    }

    /// Resolve a report; optionally delete the reported note as well
    pub async fn resolve_report(&self, id: &str, remove_note: bool) -> Result<Report> {
        let repo = ReportRepository::new(self.db);
        let report = repo
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound("Report", id.to_string()))?;

        if remove_note {
            // Deleting the note cascades away the report, so flip the status
            // first on the copy we return.
            NoteRepository::new(self.db).delete(&report.note_id).await?;
        } else {
            repo.set_status(id, ReportStatus::Resolved).await?;
        }

        Ok(Report {
            status: ReportStatus::Resolved,
            ..report
        })
    }

    pub async fn dismiss_report(&self, id: &str) -> Result<Report> {
        let repo = ReportRepository::new(self.db);
        let report = repo
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound("Report", id.to_string()))?;

        repo.set_status(id, ReportStatus::Dismissed).await?;
        Ok(Report {
            status: ReportStatus::Dismissed,
            ..report
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::test_support::{sample_note, seed, seed_with_email};
    use crate::reports::Report;

    #[tokio::test]
    async fn test_moderation_queue() {
        let db = Database::in_memory().await.unwrap();
        let fx = seed(&db).await;
        let note_repo = NoteRepository::new(&db);

        let first = sample_note(&fx, "First");
        let second = sample_note(&fx, "Second");
        note_repo.create(&first).await.unwrap();
        note_repo.create(&second).await.unwrap();

        let service = ModerationService::new(&db);
        let pending = service.notes(Some(NoteStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 2);

        let approved = service.approve_note(&first.id).await.unwrap();
        assert_eq!(approved.status, NoteStatus::Approved);

        let rejected = service.reject_note(&second.id).await.unwrap();
        assert_eq!(rejected.status, NoteStatus::Rejected);

        assert!(service.notes(Some(NoteStatus::Pending)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_moderating_missing_note() {
        let db = Database::in_memory().await.unwrap();
        let service = ModerationService::new(&db);

        let result = service.approve_note("missing").await;
        assert!(matches!(result, Err(Error::NoteNotFound(_))));
    }

    #[tokio::test]
    async fn test_resolve_report_keeping_note() {
        let db = Database::in_memory().await.unwrap();
        let fx = seed(&db).await;
        let reporter = seed_with_email(&db, "reporter@example.com").await;

        let note = sample_note(&fx, "Reported");
        NoteRepository::new(&db).create(&note).await.unwrap();

        let report = Report::new(&note.id, &reporter.user_id, "low quality");
        ReportRepository::new(&db).create(&report).await.unwrap();

        let service = ModerationService::new(&db);
        let resolved = service.resolve_report(&report.id, false).await.unwrap();
        assert_eq!(resolved.status, ReportStatus::Resolved);
        assert!(NoteRepository::new(&db).exists(&note.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_resolve_report_removing_note() {
        let db = Database::in_memory().await.unwrap();
        let fx = seed(&db).await;
        let reporter = seed_with_email(&db, "reporter@example.com").await;

        let note = sample_note(&fx, "Removed");
        NoteRepository::new(&db).create(&note).await.unwrap();

        let report = Report::new(&note.id, &reporter.user_id, "plagiarism");
        ReportRepository::new(&db).create(&report).await.unwrap();

        let service = ModerationService::new(&db);
        service.resolve_report(&report.id, true).await.unwrap();

        assert!(!NoteRepository::new(&db).exists(&note.id).await.unwrap());
        // Report rows cascade with the note
        assert!(ReportRepository::new(&db).get(&report.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dismiss_report() {
        let db = Database::in_memory().await.unwrap();
        let fx = seed(&db).await;
        let reporter = seed_with_email(&db, "reporter@example.com").await;

        let note = sample_note(&fx, "Fine Actually");
        NoteRepository::new(&db).create(&note).await.unwrap();

        let report = Report::new(&note.id, &reporter.user_id, "disagree with it");
        ReportRepository::new(&db).create(&report).await.unwrap();

        let service = ModerationService::new(&db);
        let dismissed = service.dismiss_report(&report.id).await.unwrap();
        assert_eq!(dismissed.status, ReportStatus::Dismissed);

        let open = service.reports(Some(ReportStatus::Open)).await.unwrap();
        assert!(open.is_empty());
    }

    #[tokio::test]
    async fn test_missing_report() {
        let db = Database::in_memory().await.unwrap();
        let service = ModerationService::new(&db);

        assert!(matches!(
            service.resolve_report("missing", false).await,
            Err(Error::NotFound("Report", _))
        ));
        assert!(matches!(
            service.dismiss_report("missing").await,
            Err(Error::NotFound("Report", _))
        ));
    }
}
