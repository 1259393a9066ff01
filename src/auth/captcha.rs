//! Human-verification check performed before credentials are looked at
//!
//! [`RecaptchaVerifier`] talks to a reCAPTCHA-compatible `siteverify`
//! endpoint. Any transport or decoding failure counts as a failed check.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("CAPTCHA token missing")]
    Missing,

    #[error("CAPTCHA rejected: {0:?}")]
    Rejected(Vec<String>),

    #[error("CAPTCHA verification unavailable: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<(), CaptchaError>;
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

pub struct RecaptchaVerifier {
    client: reqwest::Client,
    secret: String,
    verify_url: String,
}

impl RecaptchaVerifier {
    pub fn new(secret: String, verify_url: String, timeout_seconds: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            secret,
            verify_url,
        })
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<(), CaptchaError> {
        if token.trim().is_empty() {
            return Err(CaptchaError::Missing);
        }

        let response: SiteVerifyResponse = self
            .client
            .post(&self.verify_url)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.success {
            Ok(())
        } else {
            Err(CaptchaError::Rejected(response.error_codes))
        }
    }
}

/// Accepts every token. Only installed in dev when no CAPTCHA secret is configured.
pub struct PermissiveCaptcha;

#[async_trait]
impl CaptchaVerifier for PermissiveCaptcha {
    async fn verify(&self, _token: &str) -> Result<(), CaptchaError> {
        Ok(())
    }
}
