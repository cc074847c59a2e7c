//! Transactional email client
//!
//! Notifications (new reports, contact messages) are best-effort: delivery
//! failures are logged and never fail the request that triggered them.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::EmailConfig;
use crate::{Error, Result};

/// Request timeout for the email API
const SEND_TIMEOUT_SECS: u64 = 10;

/// An outgoing email
#[derive(Debug, Clone, Serialize)]
pub struct Email {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

/// Abstraction over a transactional email provider
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<()>;

    /// Send without propagating failures; used for optional notifications
    async fn send_or_log(&self, email: &Email) {
        if let Err(e) = self.send(email).await {
            warn!(to = %email.to, subject = %email.subject, "Email delivery failed: {}", e);
        }
    }
}

/// Mailer backed by an HTTP transactional email API
pub struct HttpMailer {
    http_client: HttpClient,
    api_url: String,
    api_key: Option<String>,
}

impl HttpMailer {
    /// Build a mailer from config; the API key comes from the environment
    pub fn from_config(config: &EmailConfig) -> anyhow::Result<Self> {
        Ok(Self::new(config.api_url.clone(), config.resolved_api_key()?))
    }

    pub fn new(api_url: String, api_key: Option<String>) -> Self {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            api_url,
            api_key,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &Email) -> Result<()> {
        let mut request = self.http_client.post(&self.api_url).json(email);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Email(format!(
                "Provider returned {}: {}",
                status, body
            )));
        }

        debug!(to = %email.to, "Email accepted by provider");
        Ok(())
    }
}

/// Mailer that silently drops everything; used when email is not configured
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, email: &Email) -> Result<()> {
        debug!(to = %email.to, subject = %email.subject, "Email not configured, dropping message");
        Ok(())
    }
}
