//! Shared application state

use std::sync::Arc;

use anyhow::Context;
use chrono::Duration;
use tracing::{info, warn};

use campusnotes_core::auth::TokenSigner;
use campusnotes_core::config::Config;
use campusnotes_core::email::HttpMailer;
use campusnotes_core::media::{media_store_from_config, MediaStore};
use campusnotes_core::services::{
    AuthService, CatalogService, ContactService, ModerationService, NoteService, Notifier,
};
use campusnotes_core::storage::Database;

/// State handed to every request handler
pub struct AppState {
    pub db: Database,
    pub config: Config,
    pub signer: TokenSigner,
    pub media: Box<dyn MediaStore>,
    pub notifier: Notifier,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wire up signer, media store and notifier from configuration
    pub fn new(config: Config, db: Database) -> anyhow::Result<Self> {
        let signer = match config.auth.resolved_token_key()? {
            Some(hex_key) => {
                TokenSigner::from_hex(&hex_key).context("Invalid CAMPUSNOTES_TOKEN_KEY")?
            }
            None => {
                warn!("CAMPUSNOTES_TOKEN_KEY not set; sessions will not survive a restart");
                TokenSigner::generate()
            }
        };

        let media = media_store_from_config(&config.media)?;

        let notifier = if config.email.is_configured() {
            info!(admin = %config.email.admin_address, "Email notifications enabled");
            Notifier::new(
                Box::new(HttpMailer::from_config(&config.email)?),
                config.email.from_address.clone(),
                config.email.admin_address.clone(),
            )
        } else {
            info!("Email not configured; notifications disabled");
            Notifier::disabled()
        };

        Ok(Self {
            db,
            config,
            signer,
            media,
            notifier,
        })
    }

    pub fn auth_service(&self) -> AuthService<'_> {
        AuthService::new(
            &self.db,
            &self.signer,
            Duration::days(self.config.auth.token_ttl_days),
            self.config.auth.min_password_len,
        )
    }

    pub fn note_service(&self) -> NoteService<'_> {
        NoteService::new(&self.db, self.media.as_ref(), &self.notifier)
    }

    pub fn catalog_service(&self) -> CatalogService<'_> {
        CatalogService::new(&self.db)
    }

    pub fn moderation_service(&self) -> ModerationService<'_> {
        ModerationService::new(&self.db)
    }

    pub fn contact_service(&self) -> ContactService<'_> {
        ContactService::new(&self.db, &self.notifier)
    }
}
