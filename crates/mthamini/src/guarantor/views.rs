use serde::Serialize;

use super::domain::{DocumentRef, GuarantorField};
use super::session::GuarantorFormSession;

pub const FORM_HEADING: &str = "Mthamini Details";
pub const FORM_SUBHEADING: &str = "Please fill out the form below";
pub const ADD_ENTRY_LABEL: &str = "Add Another Guarantor";

/// Render-ready snapshot of a guarantor form session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuarantorFormView {
    pub heading: &'static str,
    pub subheading: &'static str,
    pub cards: Vec<GuarantorCardView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_banner: Option<String>,
    pub add_entry_label: &'static str,
    pub submit: SubmitButtonView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuarantorCardView {
    pub index: usize,
    pub title: String,
    pub missing_fields: Vec<GuarantorField>,
    pub documents: Vec<AttachedDocumentView>,
    pub removable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachedDocumentView {
    pub field: GuarantorField,
    pub file_name: String,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmitButtonView {
    pub label: &'static str,
    pub enabled: bool,
}

impl GuarantorFormView {
    pub fn from_session(session: &GuarantorFormSession) -> Self {
        let submitting = session.is_submitting();
        let sole_entry = session.len() == 1;

        let cards = session
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let documents = [
                    (GuarantorField::NationalIdFront, &entry.national_id_front),
                    (GuarantorField::NationalIdBack, &entry.national_id_back),
                    (GuarantorField::LetterFile, &entry.letter_file),
                ]
                .into_iter()
                .filter_map(|(field, document)| document.as_ref().map(|doc| attached(field, doc)))
                .collect();

                GuarantorCardView {
                    index,
                    title: format!("Mthamini {}", index + 1),
                    missing_fields: entry.missing_fields(),
                    documents,
                    // Removing a lone blank entry would only re-seed it.
                    removable: !submitting && !(sole_entry && entry.is_blank()),
                }
            })
            .collect();

        Self {
            heading: FORM_HEADING,
            subheading: FORM_SUBHEADING,
            cards,
            error_banner: session.last_error().map(str::to_string),
            add_entry_label: ADD_ENTRY_LABEL,
            submit: SubmitButtonView {
                label: if submitting { "Loading..." } else { "Submit" },
                enabled: !submitting,
            },
        }
    }
}

fn attached(field: GuarantorField, document: &DocumentRef) -> AttachedDocumentView {
    AttachedDocumentView {
        field,
        file_name: document.file_name().to_string(),
        size: document.len(),
    }
}
