//! Entity submission client.
//!
//! The client side of the creation flow: serialize a validated form into an
//! entity document, POST it to the backend's append route, then ask the
//! backend to register the org file with the catalog. Every outcome is
//! reported as a user-visible [`Notification`]; a failed registration after
//! a successful save is a warning, not a failure.

use std::time::Duration;

use reqwest::{Client, Url, header};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::entity::{EntityDocument, EntityKind};
use crate::domain::form::FormState;

/// Notification severity mirroring what the portal UI renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// Transient user-visible outcome of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    message: String,
    severity: Severity,
}

impl Notification {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    /// Successful submission.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    /// Informational notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// Partial failure: the document was saved but a follow-up step failed.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Hard failure: nothing was saved.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Message shown to the user.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Severity the UI renders the message with.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Whether the submitted document ended up in the org file.
    pub fn saved(&self) -> bool {
        matches!(self.severity, Severity::Success | Severity::Warning)
    }
}

/// HTTP client submitting entity documents to the backend.
pub struct SubmissionClient {
    client: Client,
    base_url: Url,
}

impl SubmissionClient {
    /// Build a client against the backend base URL with a request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: ensure_trailing_slash(base_url),
        })
    }

    fn endpoint(&self, kind: EntityKind, action: &str) -> Result<Url, url::ParseError> {
        self.base_url
            .join(&format!("api/{}-entity/{action}", kind.slug()))
    }

    /// Submit a serialized document and interpret the backend's answer.
    ///
    /// The call is fire-and-forget from the form's perspective: it does not
    /// wait for catalog refresh propagation.
    pub async fn submit(&self, document: &EntityDocument) -> Notification {
        let kind = document.kind();
        let yaml = match document.to_yaml() {
            Ok(yaml) => yaml,
            Err(error) => {
                warn!(%error, "failed to serialize entity document");
                return Notification::error("Failed to generate entity YAML");
            }
        };
        let add_url = match self.endpoint(kind, "add") {
            Ok(url) => url,
            Err(error) => {
                warn!(%error, "invalid backend base URL");
                return Notification::error("An error occurred while saving.");
            }
        };

        let response = self
            .client
            .post(add_url)
            .header(header::CONTENT_TYPE, "application/yaml")
            .body(yaml)
            .send()
            .await;
        let response = match response {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "error sending YAML");
                return Notification::error("An error occurred while saving.");
            }
        };
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%body, "failed to save YAML");
            return Notification::error("Failed to save YAML to catalog.");
        }

        match self.register(kind, document.name()).await {
            Ok(()) => Notification::success(format!(
                "{kind} entity appended to org.yaml successfully! The catalog will pick up the change in a few minutes.",
            )),
            Err(error) => {
                warn!(%error, "catalog registration failed after save");
                Notification::warning("YAML saved, but catalog registration failed.")
            }
        }
    }

    async fn register(&self, kind: EntityKind, name: &str) -> Result<(), String> {
        let mut url = self
            .endpoint(kind, "register")
            .map_err(|error| error.to_string())?;
        url.query_pairs_mut().append_pair("name", name);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| error.to_string())?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("register returned status {}", response.status()))
        }
    }

    /// Run the full form flow: validate, submit, and reset the form once the
    /// document has been saved.
    ///
    /// Validation failures never reach the network; the error map stays on
    /// the form for inline display.
    pub async fn submit_form(&self, form: &mut FormState) -> Notification {
        let record = match form.record() {
            Ok(record) => record,
            Err(_) => {
                return Notification::error(
                    "Please correct the highlighted fields before submitting.",
                );
            }
        };
        let notification = self.submit(&record.document()).await;
        if notification.saved() {
            form.reset();
        }
        notification
    }
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
