use std::fmt;
use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Identifier shared across wizard steps for one onboarding form.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormId(pub String);

impl FormId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Values the surrounding wizard hands to this step at construction time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormContext {
    pub form_id: FormId,
}

impl FormContext {
    pub fn new(form_id: FormId) -> Self {
        Self { form_id }
    }
}

/// Opaque handle to an uploaded document. Cloning shares the content bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentRef {
    file_name: String,
    mime_type: String,
    content: Bytes,
}

impl DocumentRef {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            content: content.into(),
        }
    }

    /// Read a document from disk, guessing the MIME type from its extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self::new(file_name, mime_type, content))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Reference-counted handle to the content; cloning it never copies the bytes.
    pub fn shared_content(&self) -> Bytes {
        self.content.clone()
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl fmt::Debug for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentRef")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.content.len())
            .finish()
    }
}

/// One guarantor's contact details and supporting documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuarantorEntry {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub national_id_front: Option<DocumentRef>,
    pub national_id_back: Option<DocumentRef>,
    pub letter_file: Option<DocumentRef>,
}

impl GuarantorEntry {
    pub fn blank() -> Self {
        Self::default()
    }

    /// Fields that fail the presence check, in display order.
    pub fn missing_fields(&self) -> Vec<GuarantorField> {
        GuarantorField::ALL
            .into_iter()
            .filter(|field| !self.is_present(*field))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        GuarantorField::ALL
            .into_iter()
            .all(|field| self.is_present(field))
    }

    pub fn is_blank(&self) -> bool {
        self == &Self::blank()
    }

    fn is_present(&self, field: GuarantorField) -> bool {
        match field {
            GuarantorField::FirstName => !self.first_name.is_empty(),
            GuarantorField::LastName => !self.last_name.is_empty(),
            GuarantorField::Email => !self.email.is_empty(),
            GuarantorField::Phone => !self.phone.is_empty(),
            GuarantorField::NationalIdFront => self.national_id_front.is_some(),
            GuarantorField::NationalIdBack => self.national_id_back.is_some(),
            GuarantorField::LetterFile => self.letter_file.is_some(),
        }
    }

    /// Return a copy of this entry with a single field replaced.
    pub fn with_field(
        &self,
        field: GuarantorField,
        value: FieldValue,
    ) -> Result<Self, FieldKindMismatch> {
        let mut updated = self.clone();
        match (field, value) {
            (GuarantorField::FirstName, FieldValue::Text(text)) => updated.first_name = text,
            (GuarantorField::LastName, FieldValue::Text(text)) => updated.last_name = text,
            (GuarantorField::Email, FieldValue::Text(text)) => updated.email = text,
            (GuarantorField::Phone, FieldValue::Text(text)) => updated.phone = text,
            (GuarantorField::NationalIdFront, FieldValue::Document(doc)) => {
                updated.national_id_front = doc
            }
            (GuarantorField::NationalIdBack, FieldValue::Document(doc)) => {
                updated.national_id_back = doc
            }
            (GuarantorField::LetterFile, FieldValue::Document(doc)) => updated.letter_file = doc,
            (field, value) => {
                return Err(FieldKindMismatch {
                    field,
                    expected: field.kind(),
                    actual: value.kind(),
                })
            }
        }
        Ok(updated)
    }
}

/// The seven editable fields of a guarantor entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GuarantorField {
    FirstName,
    LastName,
    Email,
    Phone,
    NationalIdFront,
    NationalIdBack,
    LetterFile,
}

impl GuarantorField {
    pub const ALL: [GuarantorField; 7] = [
        GuarantorField::FirstName,
        GuarantorField::LastName,
        GuarantorField::Email,
        GuarantorField::Phone,
        GuarantorField::NationalIdFront,
        GuarantorField::NationalIdBack,
        GuarantorField::LetterFile,
    ];

    pub fn kind(self) -> FieldKind {
        match self {
            GuarantorField::FirstName
            | GuarantorField::LastName
            | GuarantorField::Email
            | GuarantorField::Phone => FieldKind::Text,
            GuarantorField::NationalIdFront
            | GuarantorField::NationalIdBack
            | GuarantorField::LetterFile => FieldKind::Document,
        }
    }

    /// Wire key used by the guarantor API.
    pub fn key(self) -> &'static str {
        match self {
            GuarantorField::FirstName => "firstName",
            GuarantorField::LastName => "lastName",
            GuarantorField::Email => "email",
            GuarantorField::Phone => "phone",
            GuarantorField::NationalIdFront => "nationalIdFront",
            GuarantorField::NationalIdBack => "nationalIdBack",
            GuarantorField::LetterFile => "letterFile",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            GuarantorField::FirstName => "First Name",
            GuarantorField::LastName => "Last Name",
            GuarantorField::Email => "Email",
            GuarantorField::Phone => "Phone Number",
            GuarantorField::NationalIdFront => "National ID Front",
            GuarantorField::NationalIdBack => "National ID Back",
            GuarantorField::LetterFile => "Upload Letter (PDF)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Document,
}

/// New value for a single field edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Document(Option<DocumentRef>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn document(document: DocumentRef) -> Self {
        Self::Document(Some(document))
    }

    pub fn cleared_document() -> Self {
        Self::Document(None)
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Document(_) => FieldKind::Document,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("field {field:?} expects a {expected:?} value but received {actual:?}")]
pub struct FieldKindMismatch {
    pub field: GuarantorField,
    pub expected: FieldKind,
    pub actual: FieldKind,
}
