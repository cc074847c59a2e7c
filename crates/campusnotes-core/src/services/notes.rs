//! Note upload, browsing, ratings and reports

use crate::catalog::{BranchRepository, SubjectRepository, UniversityRepository};
use crate::media::{content_hash, MediaStore};
use crate::notes::{NewNote, Note, NoteFilter, NoteRepository, NoteStatus};
use crate::ratings::{Rating, RatingRepository};
use crate::reports::{Report, ReportRepository};
use crate::services::{Actor, Notifier};
use crate::storage::Database;
use crate::{Error, Result};

/// Semester range shared with the subjects table CHECK constraint
const SEMESTER_RANGE: std::ops::RangeInclusive<i64> = 1..=12;

/// An incoming note upload
#[derive(Debug)]
pub struct UploadRequest {
    pub title: String,
    pub description: Option<String>,
    pub university_id: String,
    pub subject_id: String,
    pub branch_id: String,
    pub semester: i64,
    pub filename: String,
    pub data: Vec<u8>,
}

/// Note lifecycle from upload through rating and reporting
pub struct NoteService<'a> {
    db: &'a Database,
    media: &'a dyn MediaStore,
    notifier: &'a Notifier,
}

impl<'a> NoteService<'a> {
    pub fn new(db: &'a Database, media: &'a dyn MediaStore, notifier: &'a Notifier) -> Self {
        Self {
            db,
            media,
            notifier,
        }
    }

    /// Store the file and create a pending note
    pub async fn upload(&self, actor: &Actor, request: UploadRequest) -> Result<Note> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("Title cannot be empty".to_string()));
        }
        if !SEMESTER_RANGE.contains(&request.semester) {
            return Err(Error::Validation(format!(
                "Semester must be between {} and {}",
                SEMESTER_RANGE.start(),
                SEMESTER_RANGE.end()
            )));
        }

        if UniversityRepository::new(self.db)
            .get(&request.university_id)
            .await?
            .is_none()
        {
            return Err(Error::NotFound("University", request.university_id));
        }
        if BranchRepository::new(self.db)
            .get(&request.branch_id)
            .await?
            .is_none()
        {
            return Err(Error::NotFound("Branch", request.branch_id));
        }
        if SubjectRepository::new(self.db)
            .get(&request.subject_id)
            .await?
            .is_none()
        {
            return Err(Error::NotFound("Subject", request.subject_id));
        }

        // Detect duplicates before touching the media store, so a rejected
        // upload never leaves an orphaned file behind
        let repo = NoteRepository::new(self.db);
        if repo.hash_exists(&content_hash(&request.data)).await? {
            return Err(Error::Conflict(
                "An identical file was already uploaded".to_string(),
            ));
        }

        let stored = self.media.store(&request.filename, request.data).await?;

        let note = Note::new(NewNote {
            title: title.to_string(),
            description: request.description,
            uploader_id: actor.user_id.clone(),
            university_id: request.university_id,
            subject_id: request.subject_id,
            branch_id: request.branch_id,
            semester: request.semester,
            file_url: stored.url,
            file_hash: stored.hash,
        });
        repo.create(&note).await?;

        Ok(note)
    }

    /// Public browse: approved notes only, newest first
    pub async fn browse(&self, mut filter: NoteFilter) -> Result<Vec<Note>> {
        filter.status = Some(NoteStatus::Approved);
        NoteRepository::new(self.db).list(&filter).await
    }

    /// Fetch one note. Pending and rejected notes are visible only to their
    /// uploader and to admins; everyone else gets not-found.
    pub async fn get(&self, id: &str, viewer: Option<&Actor>) -> Result<Note> {
        let note = NoteRepository::new(self.db)
            .get(id)
            .await?
            .ok_or_else(|| Error::NoteNotFound(id.to_string()))?;

        if note.status == NoteStatus::Approved {
            return Ok(note);
        }
        match viewer {
            Some(actor) if actor.is_admin() || actor.user_id == note.uploader_id => Ok(note),
            _ => Err(Error::NoteNotFound(id.to_string())),
        }
    }

    /// Record a download of an approved note and return it
    pub async fn download(&self, id: &str) -> Result<Note> {
        let note = self.get(id, None).await?;
        NoteRepository::new(self.db).record_download(id).await?;
        Ok(note)
    }

    /// Uploader or admin may delete; ratings and reports cascade
    pub async fn delete(&self, id: &str, actor: &Actor) -> Result<()> {
        let repo = NoteRepository::new(self.db);
        let note = repo
            .get(id)
            .await?
            .ok_or_else(|| Error::NoteNotFound(id.to_string()))?;

        if !actor.is_admin() && actor.user_id != note.uploader_id {
            return Err(Error::Forbidden);
        }

        repo.delete(id).await
    }

    /// Rate an approved note; a repeat rating by the same user replaces the
    /// earlier one and the note's aggregates are recomputed.
    pub async fn rate(
        &self,
        note_id: &str,
        actor: &Actor,
        stars: i64,
        comment: Option<String>,
    ) -> Result<Note> {
        if !(1..=5).contains(&stars) {
            return Err(Error::Validation(
                "Stars must be between 1 and 5".to_string(),
            ));
        }

        let note = self.get(note_id, None).await?;
        if note.uploader_id == actor.user_id {
            return Err(Error::Validation(
                "You cannot rate your own note".to_string(),
            ));
        }

        let rating = Rating::new(note_id, &actor.user_id, stars, comment);
        RatingRepository::new(self.db).upsert(&rating).await?;

        self.get(note_id, None).await
    }

    /// Remove this user's rating; aggregates are recomputed
    pub async fn unrate(&self, note_id: &str, actor: &Actor) -> Result<Note> {
        self.get(note_id, None).await?;

        let removed = RatingRepository::new(self.db)
            .delete(note_id, &actor.user_id)
            .await?;
        if !removed {
            return Err(Error::NotFound("Rating", note_id.to_string()));
        }

        self.get(note_id, None).await
    }

    /// Ratings left on an approved note
    pub async fn ratings(&self, note_id: &str) -> Result<Vec<Rating>> {
        self.get(note_id, None).await?;
        RatingRepository::new(self.db).list_for_note(note_id).await
    }

    /// File a report; the admin address is notified best-effort
    pub async fn report(&self, note_id: &str, actor: &Actor, reason: &str) -> Result<Report> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(Error::Validation("Reason cannot be empty".to_string()));
        }

        let note = self.get(note_id, None).await?;

        let repo = ReportRepository::new(self.db);
        if repo.exists_for(note_id, &actor.user_id).await? {
            return Err(Error::Conflict(
                "You already reported this note".to_string(),
            ));
        }

        let report = Report::new(note_id, &actor.user_id, reason);
        repo.create(&report).await?;

        self.notifier.note_reported(&note.title, reason).await;
        Ok(report)
    }
}
