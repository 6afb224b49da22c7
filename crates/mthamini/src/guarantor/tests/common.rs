use std::collections::VecDeque;
use std::sync::Mutex;

use crate::guarantor::domain::{DocumentRef, FormContext, FormId, GuarantorEntry};
use crate::guarantor::gateway::{
    GuarantorGateway, RegistrationRequest, RegistrationResponse, TransportError, UploadRequest,
    UploadResponse,
};
use crate::guarantor::navigation::{WizardNavigator, WizardRoute, WizardRoutes};
use crate::guarantor::session::GuarantorFormSession;

pub(super) fn document(name: &str, mime_type: &str) -> DocumentRef {
    DocumentRef::new(name, mime_type, format!("contents of {name}").into_bytes())
}

pub(super) fn complete_entry(seed: usize) -> GuarantorEntry {
    GuarantorEntry {
        first_name: format!("Neema{seed}"),
        last_name: "Kimaro".to_string(),
        email: format!("neema{seed}@example.org"),
        phone: format!("+2557000000{seed:02}"),
        national_id_front: Some(document(&format!("front-{seed}.jpg"), "image/jpeg")),
        national_id_back: Some(document(&format!("back-{seed}.jpg"), "image/jpeg")),
        letter_file: Some(document(&format!("letter-{seed}.pdf"), "application/pdf")),
    }
}

pub(super) fn context() -> FormContext {
    FormContext::new(FormId::new("ctx-1"))
}

pub(super) fn session_with(entries: Vec<GuarantorEntry>) -> GuarantorFormSession {
    GuarantorFormSession::with_entries(context(), WizardRoutes::default(), entries)
}

pub(super) fn accepted(form_id: &str) -> Result<RegistrationResponse, TransportError> {
    Ok(RegistrationResponse::Accepted {
        form_id: FormId::new(form_id),
    })
}

pub(super) fn rejected(message: Option<&str>) -> Result<RegistrationResponse, TransportError> {
    Ok(RegistrationResponse::Rejected {
        message: message.map(str::to_string),
    })
}

/// Gateway answering from pre-scripted queues and recording every request.
#[derive(Default)]
pub(super) struct ScriptedGateway {
    registration_script: Mutex<VecDeque<Result<RegistrationResponse, TransportError>>>,
    upload_script: Mutex<VecDeque<Result<UploadResponse, TransportError>>>,
    registrations: Mutex<Vec<RegistrationRequest>>,
    uploads: Mutex<Vec<UploadRequest>>,
}

impl ScriptedGateway {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn then_register(
        self,
        response: Result<RegistrationResponse, TransportError>,
    ) -> Self {
        self.registration_script
            .lock()
            .expect("script mutex")
            .push_back(response);
        self
    }

    pub(super) fn then_upload(self, response: Result<UploadResponse, TransportError>) -> Self {
        self.upload_script
            .lock()
            .expect("script mutex")
            .push_back(response);
        self
    }

    pub(super) fn registrations(&self) -> Vec<RegistrationRequest> {
        self.registrations.lock().expect("call mutex").clone()
    }

    pub(super) fn uploads(&self) -> Vec<UploadRequest> {
        self.uploads.lock().expect("call mutex").clone()
    }

    pub(super) fn call_count(&self) -> usize {
        self.registrations().len() + self.uploads().len()
    }
}

impl GuarantorGateway for ScriptedGateway {
    async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<RegistrationResponse, TransportError> {
        self.registrations.lock().expect("call mutex").push(request);
        self.registration_script
            .lock()
            .expect("script mutex")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted registration".into())))
    }

    async fn upload(&self, request: UploadRequest) -> Result<UploadResponse, TransportError> {
        self.uploads.lock().expect("call mutex").push(request);
        self.upload_script
            .lock()
            .expect("script mutex")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted upload".into())))
    }
}

/// Gateway whose calls never complete.
pub(super) struct HangingGateway;

impl GuarantorGateway for HangingGateway {
    async fn register(
        &self,
        _request: RegistrationRequest,
    ) -> Result<RegistrationResponse, TransportError> {
        std::future::pending().await
    }

    async fn upload(&self, _request: UploadRequest) -> Result<UploadResponse, TransportError> {
        std::future::pending().await
    }
}

#[derive(Default)]
pub(super) struct RecordingNavigator {
    visits: Mutex<Vec<WizardRoute>>,
}

impl RecordingNavigator {
    pub(super) fn visits(&self) -> Vec<WizardRoute> {
        self.visits.lock().expect("navigator mutex").clone()
    }
}

impl WizardNavigator for RecordingNavigator {
    fn navigate_to(&self, route: &WizardRoute) {
        self.visits
            .lock()
            .expect("navigator mutex")
            .push(route.clone());
    }
}
