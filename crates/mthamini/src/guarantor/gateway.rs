use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::domain::{DocumentRef, FormId, GuarantorField};

/// Contact details sent during the registration phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuarantorContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Phase one payload: the form identifier plus every guarantor's contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[serde(default)]
    pub form_id: FormId,
    pub guarantors: Vec<GuarantorContact>,
}

/// The three documents belonging to one guarantor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuarantorDocuments {
    pub national_id_front: DocumentRef,
    pub national_id_back: DocumentRef,
    pub letter_file: DocumentRef,
}

impl GuarantorDocuments {
    pub fn parts(&self) -> [(GuarantorField, &DocumentRef); 3] {
        [
            (GuarantorField::NationalIdFront, &self.national_id_front),
            (GuarantorField::NationalIdBack, &self.national_id_back),
            (GuarantorField::LetterFile, &self.letter_file),
        ]
    }
}

/// Phase two payload, keyed by entry position and bound to the confirmed form id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub form_id: FormId,
    pub uploads: Vec<GuarantorDocuments>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiStatus {
    #[serde(rename = "Ok")]
    Ok,
    #[serde(rename = "error")]
    Error,
}

/// JSON body shared by both guarantor endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope {
    pub status: ApiStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_id: Option<FormId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiEnvelope {
    pub fn ok() -> Self {
        Self {
            status: ApiStatus::Ok,
            form_id: None,
            message: None,
        }
    }

    pub fn ok_with_form(form_id: FormId) -> Self {
        Self {
            form_id: Some(form_id),
            ..Self::ok()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Error,
            form_id: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationResponse {
    Accepted { form_id: FormId },
    Rejected { message: Option<String> },
}

impl TryFrom<ApiEnvelope> for RegistrationResponse {
    type Error = TransportError;

    fn try_from(envelope: ApiEnvelope) -> Result<Self, Self::Error> {
        match envelope.status {
            ApiStatus::Ok => match envelope.form_id {
                Some(form_id) if !form_id.is_empty() => Ok(Self::Accepted { form_id }),
                _ => Err(TransportError::Malformed(
                    "registration succeeded without a form id".to_string(),
                )),
            },
            ApiStatus::Error => Ok(Self::Rejected {
                message: envelope.message,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResponse {
    Accepted,
    Rejected { message: Option<String> },
}

impl From<ApiEnvelope> for UploadResponse {
    fn from(envelope: ApiEnvelope) -> Self {
        match envelope.status {
            ApiStatus::Ok => Self::Accepted,
            ApiStatus::Error => Self::Rejected {
                message: envelope.message,
            },
        }
    }
}

/// Failures below the application protocol: the server never produced a usable answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("could not build request: {0}")]
    Request(String),
    #[error("network failure: {0}")]
    Network(String),
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("request timed out after {after:?}")]
    TimedOut { after: Duration },
    #[error("submission cancelled")]
    Cancelled,
}

/// HTTP collaborator issuing the registration and upload calls.
pub trait GuarantorGateway: Send + Sync {
    fn register(
        &self,
        request: RegistrationRequest,
    ) -> impl Future<Output = Result<RegistrationResponse, TransportError>> + Send;

    fn upload(
        &self,
        request: UploadRequest,
    ) -> impl Future<Output = Result<UploadResponse, TransportError>> + Send;
}
