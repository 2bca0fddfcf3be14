//! Course feedback form persisted to a hosted Postgres table through its REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::i18n::Language;

pub const DEFAULT_TABLE: &str = "feedback";

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),
    #[error("feedback text is empty")]
    EmptyText,
    #[error("`{0}` is not an email address")]
    InvalidEmail(String),
    #[error("feedback storage is not configured")]
    NotConfigured,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("feedback storage answered {status}: {body}")]
    Status { status: u16, body: String },
}

/// One row of the feedback table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub rating: u8,
    pub feedback: String,
    pub email: Option<String>,
    pub language: String,
}

impl Feedback {
    pub fn new(
        rating: u8,
        text: &str,
        email: Option<&str>,
        lang: Language,
    ) -> Result<Self, FeedbackError> {
        let rating = validate_rating(rating)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(FeedbackError::EmptyText);
        }
        let email = match email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => Some(validate_email(email)?),
            None => None,
        };

        Ok(Self {
            rating,
            feedback: text.to_string(),
            email,
            language: lang.code().to_string(),
        })
    }
}

pub fn validate_rating(rating: u8) -> Result<u8, FeedbackError> {
    if (1..=5).contains(&rating) {
        Ok(rating)
    } else {
        Err(FeedbackError::InvalidRating(rating))
    }
}

pub fn validate_email(email: &str) -> Result<String, FeedbackError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && !domain.is_empty() && !email.contains(' ') => {
            Ok(email.to_string())
        }
        _ => Err(FeedbackError::InvalidEmail(email.to_string())),
    }
}

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn submit(&self, feedback: &Feedback) -> Result<(), FeedbackError>;
}

#[derive(Debug, Clone)]
struct Credentials {
    url: String,
    anon_key: String,
}

/// Inserts rows with `POST {url}/rest/v1/{table}`.
#[derive(Debug, Clone)]
pub struct SupabaseFeedbackStore {
    client: Client,
    credentials: Option<Credentials>,
    table: String,
}

impl SupabaseFeedbackStore {
    /// Missing url or key yields a store that refuses every submission.
    pub fn new(
        url: Option<String>,
        anon_key: Option<String>,
        table: &str,
        timeout: Duration,
    ) -> Result<Self, FeedbackError> {
        let credentials = match (url, anon_key) {
            (Some(url), Some(anon_key)) if !url.is_empty() && !anon_key.is_empty() => {
                Some(Credentials {
                    url: url.trim_end_matches('/').to_string(),
                    anon_key,
                })
            }
            _ => {
                log::warn!("Supabase environment variables are missing, feedback submission is disabled");
                None
            }
        };
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            credentials,
            table: table.to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }
}

#[async_trait]
impl FeedbackStore for SupabaseFeedbackStore {
    async fn submit(&self, feedback: &Feedback) -> Result<(), FeedbackError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(FeedbackError::NotConfigured)?;
        let url = format!("{}/rest/v1/{}", credentials.url, self.table);

        let response = self
            .client
            .post(url)
            .header("apikey", &credentials.anon_key)
            .bearer_auth(&credentials.anon_key)
            .header("Prefer", "return=minimal")
            .json(&[feedback])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Feedback insert failed with {}: {}", status, body);
            return Err(FeedbackError::Status {
                status: status.as_u16(),
                body,
            });
        }
        log::info!("Stored feedback with rating {}", feedback.rating);
        Ok(())
    }
}
