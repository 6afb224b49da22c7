//! In-memory reference backend for the guarantor endpoints, used for local runs and
//! integration tests of the HTTP gateway.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, warn};

use super::domain::{FormId, GuarantorField};
use super::gateway::{ApiEnvelope, GuarantorContact, RegistrationRequest};
use super::http::{REGISTRATION_PATH, UPLOAD_PATH};

/// Registered guarantors for one form and any documents received for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredForm {
    pub form_id: FormId,
    pub guarantors: Vec<GuarantorContact>,
    pub registered_at: DateTime<Utc>,
    pub documents: Vec<StoredDocument>,
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub guarantor_index: usize,
    pub field: GuarantorField,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: usize,
}

/// Rejection surfaced to clients as `{"status":"error","message":...}`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StubRejection {
    #[error("at least one guarantor is required")]
    NoGuarantors,
    #[error("guarantor {0} is missing required fields")]
    MissingFields(usize),
    #[error("duplicate email")]
    DuplicateEmail,
    #[error("unknown form")]
    UnknownForm,
    #[error("guarantor {0} is missing documents")]
    MissingDocuments(usize),
    #[error("invalid multipart payload")]
    InvalidPayload,
}

impl StubRejection {
    fn status_code(&self) -> StatusCode {
        match self {
            StubRejection::DuplicateEmail => StatusCode::CONFLICT,
            StubRejection::UnknownForm => StatusCode::NOT_FOUND,
            StubRejection::InvalidPayload => StatusCode::BAD_REQUEST,
            StubRejection::NoGuarantors
            | StubRejection::MissingFields(_)
            | StubRejection::MissingDocuments(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for StubRejection {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ApiEnvelope::error(self.to_string()))).into_response()
    }
}

#[derive(Debug, Default)]
struct StubState {
    issued_forms: u64,
    forms: BTreeMap<FormId, StoredForm>,
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryGuarantorStore {
    state: Arc<Mutex<StubState>>,
}

impl InMemoryGuarantorStore {
    /// Register (or re-register) the guarantors of a form. A blank form id is
    /// replaced by a newly issued `form-NNNNNN` id.
    pub fn register(&self, request: RegistrationRequest) -> Result<FormId, StubRejection> {
        if request.guarantors.is_empty() {
            return Err(StubRejection::NoGuarantors);
        }
        if let Some(position) = request.guarantors.iter().position(|g| !contact_complete(g)) {
            return Err(StubRejection::MissingFields(position + 1));
        }

        let mut guard = self.state.lock().expect("stub store mutex poisoned");

        let mut seen = HashSet::new();
        for guarantor in &request.guarantors {
            if !seen.insert(normalize_email(&guarantor.email)) {
                return Err(StubRejection::DuplicateEmail);
            }
        }
        let taken = guard
            .forms
            .values()
            .filter(|form| form.form_id != request.form_id)
            .flat_map(|form| form.guarantors.iter())
            .any(|existing| seen.contains(&normalize_email(&existing.email)));
        if taken {
            return Err(StubRejection::DuplicateEmail);
        }

        let form_id = if request.form_id.is_empty() {
            guard.issued_forms += 1;
            FormId(format!("form-{:06}", guard.issued_forms))
        } else {
            request.form_id
        };

        guard.forms.insert(
            form_id.clone(),
            StoredForm {
                form_id: form_id.clone(),
                guarantors: request.guarantors,
                registered_at: Utc::now(),
                documents: Vec::new(),
                uploaded_at: None,
            },
        );
        Ok(form_id)
    }

    /// Attach uploaded documents. Every registered guarantor needs all three.
    pub fn record_upload(
        &self,
        form_id: &FormId,
        documents: Vec<StoredDocument>,
    ) -> Result<(), StubRejection> {
        let mut guard = self.state.lock().expect("stub store mutex poisoned");
        let form = guard
            .forms
            .get_mut(form_id)
            .ok_or(StubRejection::UnknownForm)?;

        for index in 0..form.guarantors.len() {
            let complete = [
                GuarantorField::NationalIdFront,
                GuarantorField::NationalIdBack,
                GuarantorField::LetterFile,
            ]
            .into_iter()
            .all(|field| {
                documents
                    .iter()
                    .any(|doc| doc.guarantor_index == index && doc.field == field)
            });
            if !complete {
                return Err(StubRejection::MissingDocuments(index + 1));
            }
        }

        form.documents = documents;
        form.uploaded_at = Some(Utc::now());
        Ok(())
    }

    pub fn form(&self, form_id: &FormId) -> Option<StoredForm> {
        let guard = self.state.lock().expect("stub store mutex poisoned");
        guard.forms.get(form_id).cloned()
    }

    pub fn forms(&self) -> Vec<StoredForm> {
        let guard = self.state.lock().expect("stub store mutex poisoned");
        guard.forms.values().cloned().collect()
    }
}

fn contact_complete(contact: &GuarantorContact) -> bool {
    [
        &contact.first_name,
        &contact.last_name,
        &contact.email,
        &contact.phone,
    ]
    .into_iter()
    .all(|value| !value.trim().is_empty())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Router exposing `/health` plus the registration and upload endpoints.
pub fn stub_router(store: InMemoryGuarantorStore) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route(REGISTRATION_PATH, post(register_handler))
        .route(UPLOAD_PATH, post(upload_handler))
        .with_state(store)
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn register_handler(
    State(store): State<InMemoryGuarantorStore>,
    Json(request): Json<RegistrationRequest>,
) -> Response {
    let guarantors = request.guarantors.len();
    match store.register(request) {
        Ok(form_id) => {
            info!(%form_id, guarantors, "stub registered guarantors");
            (StatusCode::OK, Json(ApiEnvelope::ok_with_form(form_id))).into_response()
        }
        Err(rejection) => {
            warn!(reason = %rejection, "stub rejected registration");
            rejection.into_response()
        }
    }
}

async fn upload_handler(
    State(store): State<InMemoryGuarantorStore>,
    multipart: Multipart,
) -> Response {
    let (form_id, documents) = match read_upload(multipart).await {
        Ok(parsed) => parsed,
        Err(rejection) => return rejection.into_response(),
    };

    let received = documents.len();
    match store.record_upload(&form_id, documents) {
        Ok(()) => {
            info!(%form_id, documents = received, "stub stored guarantor documents");
            (StatusCode::OK, Json(ApiEnvelope::ok())).into_response()
        }
        Err(rejection) => {
            warn!(%form_id, reason = %rejection, "stub rejected upload");
            rejection.into_response()
        }
    }
}

async fn read_upload(
    mut multipart: Multipart,
) -> Result<(FormId, Vec<StoredDocument>), StubRejection> {
    let mut form_id = None;
    let mut documents = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StubRejection::InvalidPayload)?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "formId" {
            let value = field
                .text()
                .await
                .map_err(|_| StubRejection::InvalidPayload)?;
            form_id = Some(FormId(value));
            continue;
        }

        let Some((guarantor_index, document_field)) = parse_upload_key(&name) else {
            continue;
        };
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|_| StubRejection::InvalidPayload)?;

        documents.push(StoredDocument {
            guarantor_index,
            field: document_field,
            file_name,
            content_type,
            size: bytes.len(),
        });
    }

    let form_id = form_id
        .filter(|id| !id.is_empty())
        .ok_or(StubRejection::UnknownForm)?;
    Ok((form_id, documents))
}

/// Parse `uploads[3][letterFile]` into `(3, LetterFile)`.
fn parse_upload_key(name: &str) -> Option<(usize, GuarantorField)> {
    let rest = name.strip_prefix("uploads[")?;
    let (index, rest) = rest.split_once("][")?;
    let key = rest.strip_suffix(']')?;
    let field = GuarantorField::from_key(key)?;
    if field.kind() != super::domain::FieldKind::Document {
        return None;
    }
    Some((index.parse().ok()?, field))
}
