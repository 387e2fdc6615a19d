//! Forwarding accepted forms to the external form endpoint.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use std::borrow::Cow;
use std::time::Duration;
use trip_domain::config::SubmissionConfig;
use trip_domain::model::RegistrationForm;

#[trip_derive::trip_error]
pub enum SubmissionError {
    /// The request never produced a response: DNS, connect, TLS, timeout.
    #[error("Form endpoint unreachable{}: {source}", format_context(.context))]
    Http { source: reqwest::Error, context: Option<Cow<'static, str>> },

    /// The endpoint answered with a non-success status.
    #[error("Form endpoint rejected the submission{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Delivers one validated form. Success means the endpoint accepted it.
#[async_trait]
pub trait Submitter: std::fmt::Debug + Send + Sync {
    async fn submit(&self, form: &RegistrationForm) -> Result<(), SubmissionError>;
}

/// Posts the form fields, URL-encoded, to a fixed endpoint.
///
/// Any 2xx status counts as accepted; the response body is ignored.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: Client,
    endpoint: String,
}

impl HttpSubmitter {
    /// With `timeout` unset a request waits for the endpoint indefinitely.
    ///
    /// # Errors
    /// [`SubmissionError::Http`] if the HTTP client cannot be built (e.g. no TLS backend).
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, SubmissionError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().context("Building HTTP client")?;
        Ok(Self { client, endpoint: endpoint.into() })
    }

    /// # Errors
    /// See [`Self::new`].
    pub fn from_config(config: &SubmissionConfig) -> Result<Self, SubmissionError> {
        Self::new(config.endpoint.clone(), config.timeout_ms.map(Duration::from_millis))
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(&self, form: &RegistrationForm) -> Result<(), SubmissionError> {
        tracing::debug!(endpoint = %self.endpoint, "Posting registration form");

        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .form(form)
            .send()
            .await
            .context("Posting registration form")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "Form endpoint rejected the submission");
            return Err(SubmissionError::Rejected {
                message: format!("status {status}: {body}").into(),
                context: None,
            });
        }

        tracing::debug!(%status, "Form endpoint accepted the submission");
        Ok(())
    }
}
