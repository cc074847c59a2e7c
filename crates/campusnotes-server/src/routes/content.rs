//! Homepage content, theme and the contact form

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use campusnotes_core::content::{
    About, ContactDetails, ContactMessage, ContentRepository, Faq, Feature, Testimonial,
};
use campusnotes_core::theme::{Theme, ThemeRepository};
use campusnotes_core::{Error, Result};

use crate::error::ApiResult;
use crate::extract::AdminUser;
use crate::state::SharedState;

pub async fn list_faqs(State(state): State<SharedState>) -> ApiResult<Json<Vec<Faq>>> {
    Ok(Json(ContentRepository::new(&state.db).list_faqs().await?))
}

#[derive(Deserialize)]
pub struct CreateFaqRequest {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub order_index: i64,
}

pub async fn create_faq(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Json(request): Json<CreateFaqRequest>,
) -> ApiResult<(StatusCode, Json<Faq>)> {
    require(&request.question, "Question")?;
    require(&request.answer, "Answer")?;

    let faq = Faq::new(
        request.question.trim(),
        request.answer.trim(),
        request.order_index,
    );
    ContentRepository::new(&state.db).create_faq(&faq).await?;
    Ok((StatusCode::CREATED, Json(faq)))
}

pub async fn delete_faq(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if !ContentRepository::new(&state.db).delete_faq(&id).await? {
        return Err(Error::NotFound("FAQ", id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_features(State(state): State<SharedState>) -> ApiResult<Json<Vec<Feature>>> {
    Ok(Json(ContentRepository::new(&state.db).list_features().await?))
}

#[derive(Deserialize)]
pub struct CreateFeatureRequest {
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    #[serde(default)]
    pub order_index: i64,
}

pub async fn create_feature(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Json(request): Json<CreateFeatureRequest>,
) -> ApiResult<(StatusCode, Json<Feature>)> {
    require(&request.title, "Title")?;
    require(&request.description, "Description")?;

    let mut feature = Feature::new(
        request.title.trim(),
        request.description.trim(),
        request.order_index,
    );
    feature.icon = request.icon;
    ContentRepository::new(&state.db).create_feature(&feature).await?;
    Ok((StatusCode::CREATED, Json(feature)))
}

pub async fn delete_feature(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if !ContentRepository::new(&state.db).delete_feature(&id).await? {
        return Err(Error::NotFound("Feature", id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_testimonials(
    State(state): State<SharedState>,
) -> ApiResult<Json<Vec<Testimonial>>> {
    Ok(Json(
        ContentRepository::new(&state.db).list_testimonials().await?,
    ))
}

#[derive(Deserialize)]
pub struct CreateTestimonialRequest {
    pub author: String,
    pub quote: String,
    pub role: Option<String>,
    #[serde(default)]
    pub order_index: i64,
}

pub async fn create_testimonial(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Json(request): Json<CreateTestimonialRequest>,
) -> ApiResult<(StatusCode, Json<Testimonial>)> {
    require(&request.author, "Author")?;
    require(&request.quote, "Quote")?;

    let mut testimonial = Testimonial::new(
        request.author.trim(),
        request.quote.trim(),
        request.order_index,
    );
    testimonial.role = request.role;
    ContentRepository::new(&state.db)
        .create_testimonial(&testimonial)
        .await?;
    Ok((StatusCode::CREATED, Json(testimonial)))
}

pub async fn delete_testimonial(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if !ContentRepository::new(&state.db)
        .delete_testimonial(&id)
        .await?
    {
        return Err(Error::NotFound("Testimonial", id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// About defaults to an empty page rather than 404 so the frontend can
/// always render something.
pub async fn get_about(State(state): State<SharedState>) -> ApiResult<Json<About>> {
    let about = ContentRepository::new(&state.db)
        .get_about()
        .await?
        .unwrap_or(About {
            title: String::new(),
            body: String::new(),
            updated_at: Utc::now(),
        });
    Ok(Json(about))
}

#[derive(Deserialize)]
pub struct AboutRequest {
    pub title: String,
    pub body: String,
}

pub async fn put_about(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Json(request): Json<AboutRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    require(&request.title, "Title")?;

    ContentRepository::new(&state.db)
        .upsert_about(request.title.trim(), &request.body)
        .await?;
    Ok(Json(json!({ "status": "updated" })))
}

pub async fn get_contact_details(
    State(state): State<SharedState>,
) -> ApiResult<Json<ContactDetails>> {
    let details = ContentRepository::new(&state.db)
        .get_contact_details()
        .await?
        .unwrap_or(ContactDetails {
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            updated_at: Utc::now(),
        });
    Ok(Json(details))
}

#[derive(Deserialize)]
pub struct ContactDetailsRequest {
    pub email: String,
    pub phone: String,
    pub address: String,
}

pub async fn put_contact_details(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Json(request): Json<ContactDetailsRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    ContentRepository::new(&state.db)
        .upsert_contact_details(&request.email, &request.phone, &request.address)
        .await?;
    Ok(Json(json!({ "status": "updated" })))
}

pub async fn get_theme(State(state): State<SharedState>) -> ApiResult<Json<Theme>> {
    Ok(Json(ThemeRepository::new(&state.db).get().await?))
}

#[derive(Deserialize)]
pub struct ThemeRequest {
    pub primary_color: String,
    pub secondary_color: String,
    pub background_color: String,
    pub text_color: String,
}

pub async fn put_theme(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Json(request): Json<ThemeRequest>,
) -> ApiResult<Json<Theme>> {
    let theme = Theme {
        primary_color: request.primary_color,
        secondary_color: request.secondary_color,
        background_color: request.background_color,
        text_color: request.text_color,
        updated_at: Utc::now(),
    };
    let repo = ThemeRepository::new(&state.db);
    repo.set(&theme).await?;
    Ok(Json(repo.get().await?))
}

#[derive(Deserialize)]
pub struct ContactFormRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

pub async fn submit_contact(
    State(state): State<SharedState>,
    Json(request): Json<ContactFormRequest>,
) -> ApiResult<(StatusCode, Json<ContactMessage>)> {
    let message = state
        .contact_service()
        .submit(&request.name, &request.email, &request.message)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

fn require(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{} cannot be empty", what)));
    }
    Ok(())
}
