//! Guarantor ("Mthamini") step of the onboarding wizard.
//!
//! A [`GuarantorFormSession`] owns the editable entries and drives a two-phase
//! submission: guarantor records are registered first, then their identity and
//! letter documents are uploaded against the form id the server confirmed. The
//! HTTP transport and the wizard navigation are reached through the
//! [`GuarantorGateway`] and [`WizardNavigator`] traits.

pub mod domain;
pub mod gateway;
pub mod http;
pub mod manifest;
pub mod navigation;
pub mod session;
pub mod stub;
pub mod submission;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    DocumentRef, FieldKind, FieldKindMismatch, FieldValue, FormContext, FormId, GuarantorEntry,
    GuarantorField,
};
pub use gateway::{
    ApiEnvelope, ApiStatus, GuarantorContact, GuarantorDocuments, GuarantorGateway,
    RegistrationRequest, RegistrationResponse, TransportError, UploadRequest, UploadResponse,
};
pub use http::HttpGuarantorGateway;
pub use manifest::{GuarantorManifest, ManifestError};
pub use navigation::{WizardNavigator, WizardRoute, WizardRoutes};
pub use session::{
    EntryIndexError, GuarantorFormSession, SessionError, SubmissionState, SubmitOutcome,
    SubmitRejected,
};
pub use stub::{stub_router, InMemoryGuarantorStore, StoredDocument, StoredForm, StubRejection};
pub use submission::{
    CancellationSource, CancellationToken, SubmissionAttempt, SubmissionError, SubmissionPhase,
    SubmissionPlan, SubmissionReceipt, SubmitOptions, GENERIC_FAILURE_MESSAGE, VALIDATION_MESSAGE,
};
pub use views::GuarantorFormView;
