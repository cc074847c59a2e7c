//! HTTP route handlers

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod content;
pub mod notes;

use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::json;

use campusnotes_core::Error;

use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

/// Assemble all API routes under `/api`
pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/health", get(health))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Notes
        .route("/notes", get(notes::list).post(notes::upload))
        .route("/notes/{id}", get(notes::get).delete(notes::remove))
        .route("/notes/{id}/download", post(notes::download))
        .route(
            "/notes/{id}/ratings",
            get(notes::list_ratings)
                .post(notes::rate)
                .delete(notes::unrate),
        )
        .route("/notes/{id}/reports", post(notes::report))
        // Catalog
        .route(
            "/universities",
            get(catalog::list_universities).post(catalog::create_university),
        )
        .route("/universities/{id}", delete(catalog::delete_university))
        .route(
            "/branches",
            get(catalog::list_branches).post(catalog::create_branch),
        )
        .route("/branches/{id}", delete(catalog::delete_branch))
        .route(
            "/subjects",
            get(catalog::list_subjects).post(catalog::create_subject),
        )
        .route("/subjects/{id}", delete(catalog::delete_subject))
        // Homepage content
        .route(
            "/content/faqs",
            get(content::list_faqs).post(content::create_faq),
        )
        .route("/content/faqs/{id}", delete(content::delete_faq))
        .route(
            "/content/features",
            get(content::list_features).post(content::create_feature),
        )
        .route("/content/features/{id}", delete(content::delete_feature))
        .route(
            "/content/testimonials",
            get(content::list_testimonials).post(content::create_testimonial),
        )
        .route(
            "/content/testimonials/{id}",
            delete(content::delete_testimonial),
        )
        .route(
            "/content/about",
            get(content::get_about).put(content::put_about),
        )
        .route(
            "/content/contact",
            get(content::get_contact_details).put(content::put_contact_details),
        )
        // Theme
        .route("/theme", get(content::get_theme).put(content::put_theme))
        // Contact form
        .route("/contact", post(content::submit_contact))
        // Admin
        .route("/admin/notes", get(admin::list_notes))
        .route("/admin/notes/{id}/approve", post(admin::approve_note))
        .route("/admin/notes/{id}/reject", post(admin::reject_note))
        .route("/admin/reports", get(admin::list_reports))
        .route("/admin/reports/{id}/resolve", post(admin::resolve_report))
        .route("/admin/reports/{id}/dismiss", post(admin::dismiss_report))
        .route("/admin/messages", get(admin::list_messages))
        .route("/admin/messages/{id}/read", post(admin::mark_message_read))
}

async fn health(
    axum::extract::State(state): axum::extract::State<SharedState>,
) -> ApiResult<Json<serde_json::Value>> {
    state
        .db
        .health_check()
        .await
        .map_err(|e| ApiError(Error::Other(e.to_string())))?;
    Ok(Json(json!({ "status": "ok" })))
}
