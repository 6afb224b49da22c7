use std::time::Duration;

use reqwest::multipart::{Form, Part};
use tracing::debug;

use super::gateway::{
    ApiEnvelope, ApiStatus, GuarantorGateway, RegistrationRequest, RegistrationResponse,
    TransportError, UploadRequest, UploadResponse,
};
use crate::config::ApiConfig;

pub const REGISTRATION_PATH: &str = "/api/v1/guarantor/guarantors";
pub const UPLOAD_PATH: &str = "/api/v1/guarantor/upload";

/// `reqwest`-backed gateway speaking the guarantor API's JSON + multipart protocol.
#[derive(Debug, Clone)]
pub struct HttpGuarantorGateway {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpGuarantorGateway {
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| TransportError::Request(err.to_string()))?;
        Ok(Self::with_client(
            client,
            config.base_url.clone(),
            config.request_timeout,
        ))
    }

    pub fn with_client(client: reqwest::Client, base_url: String, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn map_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::TimedOut {
                after: self.timeout,
            }
        } else if err.is_decode() {
            TransportError::Malformed(err.to_string())
        } else if err.is_builder() {
            TransportError::Request(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }

    /// Decode the JSON envelope. Non-2xx answers still count as application errors
    /// when they carry `status: "error"`; anything else is a transport failure.
    async fn read_envelope(
        &self,
        response: reqwest::Response,
    ) -> Result<ApiEnvelope, TransportError> {
        let status = response.status();
        let body = response.bytes().await.map_err(|err| self.map_error(err))?;
        debug!(status = status.as_u16(), bytes = body.len(), "guarantor API responded");

        match serde_json::from_slice::<ApiEnvelope>(&body) {
            Ok(envelope) if status.is_success() || envelope.status == ApiStatus::Error => {
                Ok(envelope)
            }
            Ok(_) => Err(TransportError::Status {
                status: status.as_u16(),
            }),
            Err(err) if status.is_success() => Err(TransportError::Malformed(err.to_string())),
            Err(_) => Err(TransportError::Status {
                status: status.as_u16(),
            }),
        }
    }
}

impl GuarantorGateway for HttpGuarantorGateway {
    async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<RegistrationResponse, TransportError> {
        let response = self
            .client
            .post(self.endpoint(REGISTRATION_PATH))
            .json(&request)
            .send()
            .await
            .map_err(|err| self.map_error(err))?;

        let envelope = self.read_envelope(response).await?;
        RegistrationResponse::try_from(envelope)
    }

    async fn upload(&self, request: UploadRequest) -> Result<UploadResponse, TransportError> {
        let form = upload_form(&request)?;
        let response = self
            .client
            .post(self.endpoint(UPLOAD_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(|err| self.map_error(err))?;

        let envelope = self.read_envelope(response).await?;
        Ok(UploadResponse::from(envelope))
    }
}

/// Multipart body: a `formId` text part plus `uploads[i][field]` file parts.
pub(crate) fn upload_form(request: &UploadRequest) -> Result<Form, TransportError> {
    let mut form = Form::new().text("formId", request.form_id.as_str().to_string());

    for (index, documents) in request.uploads.iter().enumerate() {
        for (field, document) in documents.parts() {
            let mime_type = document
                .mime_type()
                .parse::<mime::Mime>()
                .unwrap_or(mime::APPLICATION_OCTET_STREAM);
            let part = Part::stream_with_length(document.shared_content(), document.len() as u64)
                .file_name(document.file_name().to_string())
                .mime_str(mime_type.as_ref())
                .map_err(|err| TransportError::Request(err.to_string()))?;
            form = form.part(upload_key(index, field.key()), part);
        }
    }

    Ok(form)
}

pub(crate) fn upload_key(index: usize, field_key: &str) -> String {
    format!("uploads[{index}][{field_key}]")
}
