use super::common::*;
use crate::guarantor::domain::{FieldKind, FieldValue, GuarantorEntry, GuarantorField};
use crate::guarantor::navigation::{WizardRoute, WizardRoutes};
use crate::guarantor::session::{
    EntryIndexError, GuarantorFormSession, SessionError, SubmissionState,
};

#[test]
fn new_session_starts_with_one_blank_entry() {
    let session = GuarantorFormSession::new(context(), WizardRoutes::default());

    assert_eq!(session.len(), 1);
    assert!(session.entries()[0].is_blank());
    assert_eq!(session.state(), SubmissionState::Idle);
    assert!(session.last_error().is_none());
    assert_eq!(session.context().form_id.as_str(), "ctx-1");
}

#[test]
fn add_entry_appends_exactly_one_blank_entry() {
    let mut session = session_with(vec![complete_entry(1)]);
    let before = session.entries().to_vec();

    session.add_entry();

    assert_eq!(session.len(), before.len() + 1);
    assert_eq!(&session.entries()[..1], &before[..]);
    let appended = session.entries().last().expect("appended entry");
    assert!(appended.is_blank());
    assert_eq!(appended.missing_fields(), GuarantorField::ALL.to_vec());
}

#[test]
fn update_entry_changes_only_the_target_field() {
    let mut session = session_with(vec![complete_entry(1), complete_entry(2), complete_entry(3)]);
    let before = session.entries().to_vec();
    let held = session.entry(1).expect("entry exists").clone();

    session
        .update_entry(1, GuarantorField::Email, FieldValue::text("updated@example.org"))
        .expect("update succeeds");

    let after = session.entries();
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2], before[2]);
    assert_eq!(after[1].email, "updated@example.org");
    assert_eq!(
        GuarantorEntry {
            email: before[1].email.clone(),
            ..after[1].clone()
        },
        before[1]
    );
    assert_eq!(held, before[1], "earlier copies observe no change");
}

#[test]
fn update_entry_sets_and_clears_documents() {
    let mut session = session_with(Vec::new());
    let letter = document("letter.pdf", "application/pdf");

    session
        .update_entry(0, GuarantorField::LetterFile, FieldValue::document(letter.clone()))
        .expect("attach letter");
    assert_eq!(session.entries()[0].letter_file.as_ref(), Some(&letter));

    session
        .update_entry(0, GuarantorField::LetterFile, FieldValue::cleared_document())
        .expect("clear letter");
    assert!(session.entries()[0].letter_file.is_none());
}

#[test]
fn update_entry_rejects_wrong_value_kind_and_bad_index() {
    let mut session = session_with(vec![complete_entry(1)]);
    let before = session.entries().to_vec();

    match session.update_entry(0, GuarantorField::Phone, FieldValue::cleared_document()) {
        Err(SessionError::FieldKind(mismatch)) => {
            assert_eq!(mismatch.field, GuarantorField::Phone);
            assert_eq!(mismatch.expected, FieldKind::Text);
            assert_eq!(mismatch.actual, FieldKind::Document);
        }
        other => panic!("expected field kind mismatch, got {other:?}"),
    }

    assert_eq!(
        session.update_entry(4, GuarantorField::Phone, FieldValue::text("1")),
        Err(SessionError::Index(EntryIndexError { index: 4, len: 1 }))
    );
    assert_eq!(session.entries(), &before[..]);
}

#[test]
fn remove_entry_shifts_later_entries_down() {
    let mut session = session_with(vec![complete_entry(1), complete_entry(2), complete_entry(3)]);

    session.remove_entry(1).expect("remove middle entry");

    assert_eq!(session.len(), 2);
    assert_eq!(session.entries()[0], complete_entry(1));
    assert_eq!(session.entries()[1], complete_entry(3));
}

#[test]
fn removing_the_last_entry_reseeds_a_blank_one() {
    let mut session = session_with(vec![complete_entry(1)]);

    session.remove_entry(0).expect("remove sole entry");

    assert_eq!(session.len(), 1);
    assert!(session.entries()[0].is_blank());
}

#[test]
fn remove_entry_out_of_bounds_leaves_entries_untouched() {
    let mut session = session_with(vec![complete_entry(1), complete_entry(2)]);

    assert_eq!(
        session.remove_entry(2),
        Err(SessionError::Index(EntryIndexError { index: 2, len: 2 }))
    );
    assert_eq!(session.len(), 2);
}

#[test]
fn go_back_navigates_to_previous_step() {
    let session = session_with(Vec::new());
    let navigator = RecordingNavigator::default();

    session.go_back(&navigator).expect("navigation allowed");

    assert_eq!(navigator.visits(), vec![WizardRoute::new("/personal")]);
}

#[test]
fn edits_are_refused_while_submitting() {
    let mut session = session_with(vec![complete_entry(1)]);
    let _plan = session.begin_submission().expect("valid session");
    let navigator = RecordingNavigator::default();

    assert_eq!(
        session.update_entry(0, GuarantorField::FirstName, FieldValue::text("Late")),
        Err(SessionError::SubmissionInFlight)
    );
    assert_eq!(session.remove_entry(0), Err(SessionError::SubmissionInFlight));
    assert_eq!(
        session.go_back(&navigator),
        Err(SessionError::SubmissionInFlight)
    );
    assert!(navigator.visits().is_empty());

    session.add_entry();
    assert_eq!(session.len(), 2);
}

#[test]
fn dismiss_error_clears_the_slot() {
    let mut session = session_with(Vec::new());
    assert!(session.begin_submission().is_err());
    assert!(session.last_error().is_some());

    session.dismiss_error();

    assert!(session.last_error().is_none());
}
