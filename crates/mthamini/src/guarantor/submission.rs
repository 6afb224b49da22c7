use std::fmt;
use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use super::domain::{FormId, GuarantorEntry};
use super::gateway::{
    GuarantorContact, GuarantorDocuments, GuarantorGateway, RegistrationRequest,
    RegistrationResponse, TransportError, UploadRequest, UploadResponse,
};
use crate::config::ApiConfig;

pub const VALIDATION_MESSAGE: &str =
    "Please fill in all fields for each guarantor and ensure all files are uploaded";
pub const GENERIC_FAILURE_MESSAGE: &str = "An unexpected error occurred";
pub const REJECTION_FALLBACK_MESSAGE: &str = "The server rejected the submission";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Registration,
    Upload,
}

impl fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionPhase::Registration => f.write_str("registration"),
            SubmissionPhase::Upload => f.write_str("upload"),
        }
    }
}

/// Terminal failure of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("{} (incomplete entries: {incomplete_entries:?})", VALIDATION_MESSAGE)]
    Validation { incomplete_entries: Vec<usize> },
    #[error(
        "{phase} rejected: {}",
        .message.as_deref().unwrap_or(REJECTION_FALLBACK_MESSAGE)
    )]
    Application {
        phase: SubmissionPhase,
        message: Option<String>,
    },
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SubmissionError {
    /// Text for the session's single error slot.
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::Validation { .. } => VALIDATION_MESSAGE.to_string(),
            SubmissionError::Application { message, .. } => message
                .as_deref()
                .filter(|text| !text.trim().is_empty())
                .unwrap_or(REJECTION_FALLBACK_MESSAGE)
                .to_string(),
            SubmissionError::Transport(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Per-attempt limits. The timeout spans both phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOptions {
    pub timeout: Duration,
}

impl SubmitOptions {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            timeout: config.request_timeout,
        }
    }
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self::from_config(&ApiConfig::default())
    }
}

/// Owner side of a cancellation pair.
#[derive(Debug)]
pub struct CancellationSource {
    sender: watch::Sender<bool>,
}

impl CancellationSource {
    pub fn new() -> (Self, CancellationToken) {
        let (sender, receiver) = watch::channel(false);
        (Self { sender }, CancellationToken { receiver })
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

/// Observed by an in-flight submission; fires once the paired source cancels.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    receiver: watch::Receiver<bool>,
}

impl CancellationToken {
    /// A token that never fires.
    pub fn never() -> Self {
        let (_, receiver) = watch::channel(false);
        Self { receiver }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            // Source dropped without cancelling.
            std::future::pending::<()>().await;
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::never()
    }
}

/// Result of a fully successful two-phase submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub confirmed_form_id: FormId,
    pub guarantor_count: usize,
}

/// Outcome of one executed plan. `confirmed_form_id` is set once registration was
/// accepted, even when the upload phase failed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionAttempt {
    pub confirmed_form_id: Option<FormId>,
    pub result: Result<SubmissionReceipt, SubmissionError>,
}

impl SubmissionAttempt {
    fn failed(err: impl Into<SubmissionError>) -> Self {
        Self {
            confirmed_form_id: None,
            result: Err(err.into()),
        }
    }
}

/// Validated snapshot of the session, detached so the session can keep rendering
/// while the network calls are pending.
#[derive(Debug, Clone)]
pub struct SubmissionPlan {
    registration_form_id: FormId,
    contacts: Vec<GuarantorContact>,
    documents: Vec<GuarantorDocuments>,
}

impl SubmissionPlan {
    /// Presence check across every entry. Nothing is submitted if any entry is incomplete.
    pub fn from_entries(
        registration_form_id: FormId,
        entries: &[GuarantorEntry],
    ) -> Result<Self, SubmissionError> {
        let mut contacts = Vec::with_capacity(entries.len());
        let mut documents = Vec::with_capacity(entries.len());
        let mut incomplete_entries = Vec::new();

        for (index, entry) in entries.iter().enumerate() {
            match split_entry(entry) {
                Some((contact, docs)) => {
                    contacts.push(contact);
                    documents.push(docs);
                }
                None => incomplete_entries.push(index),
            }
        }

        if !incomplete_entries.is_empty() {
            return Err(SubmissionError::Validation { incomplete_entries });
        }

        Ok(Self {
            registration_form_id,
            contacts,
            documents,
        })
    }

    /// Form id sent with the registration call.
    pub fn registration_form_id(&self) -> &FormId {
        &self.registration_form_id
    }

    pub fn guarantor_count(&self) -> usize {
        self.contacts.len()
    }

    /// Run both phases under the configured deadline, aborting early on cancellation.
    pub async fn execute<G>(
        self,
        gateway: &G,
        options: &SubmitOptions,
        cancel: &CancellationToken,
    ) -> SubmissionAttempt
    where
        G: GuarantorGateway + ?Sized,
    {
        if cancel.is_cancelled() {
            return SubmissionAttempt::failed(TransportError::Cancelled);
        }

        let deadline = options.timeout;
        let mut confirmed_form_id = None;
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransportError::Cancelled.into()),
            outcome = tokio::time::timeout(
                deadline,
                self.run_phases(gateway, &mut confirmed_form_id),
            ) => match outcome {
                Ok(result) => result,
                Err(_) => Err(TransportError::TimedOut { after: deadline }.into()),
            },
        };

        SubmissionAttempt {
            confirmed_form_id,
            result,
        }
    }

    async fn run_phases<G>(
        self,
        gateway: &G,
        confirmed: &mut Option<FormId>,
    ) -> Result<SubmissionReceipt, SubmissionError>
    where
        G: GuarantorGateway + ?Sized,
    {
        let guarantor_count = self.contacts.len();
        info!(
            form_id = %self.registration_form_id,
            guarantors = guarantor_count,
            "registering guarantors"
        );

        let registration = RegistrationRequest {
            form_id: self.registration_form_id,
            guarantors: self.contacts,
        };
        let confirmed_form_id = match gateway.register(registration).await? {
            RegistrationResponse::Accepted { form_id } => form_id,
            RegistrationResponse::Rejected { message } => {
                return Err(SubmissionError::Application {
                    phase: SubmissionPhase::Registration,
                    message,
                })
            }
        };
        *confirmed = Some(confirmed_form_id.clone());

        info!(form_id = %confirmed_form_id, "uploading guarantor documents");
        let upload = UploadRequest {
            form_id: confirmed_form_id.clone(),
            uploads: self.documents,
        };
        match gateway.upload(upload).await? {
            UploadResponse::Accepted => Ok(SubmissionReceipt {
                confirmed_form_id,
                guarantor_count,
            }),
            UploadResponse::Rejected { message } => Err(SubmissionError::Application {
                phase: SubmissionPhase::Upload,
                message,
            }),
        }
    }
}

fn split_entry(entry: &GuarantorEntry) -> Option<(GuarantorContact, GuarantorDocuments)> {
    if !entry.is_complete() {
        return None;
    }

    let documents = GuarantorDocuments {
        national_id_front: entry.national_id_front.clone()?,
        national_id_back: entry.national_id_back.clone()?,
        letter_file: entry.letter_file.clone()?,
    };
    let contact = GuarantorContact {
        first_name: entry.first_name.clone(),
        last_name: entry.last_name.clone(),
        email: entry.email.clone(),
        phone: entry.phone.clone(),
    };

    Some((contact, documents))
}
