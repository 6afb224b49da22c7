use tracing::{debug, error, info, warn};

use super::domain::{
    FieldKindMismatch, FieldValue, FormContext, FormId, GuarantorEntry, GuarantorField,
};
use super::gateway::GuarantorGateway;
use super::navigation::{WizardNavigator, WizardRoutes};
use super::submission::{
    CancellationToken, SubmissionAttempt, SubmissionError, SubmissionPlan, SubmissionReceipt,
    SubmitOptions, GENERIC_FAILURE_MESSAGE,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
}

/// Form state for the guarantor step: an ordered, never-empty list of entries plus
/// the submission status and the single user-visible error slot.
#[derive(Debug, Clone)]
pub struct GuarantorFormSession {
    context: FormContext,
    routes: WizardRoutes,
    entries: Vec<GuarantorEntry>,
    /// Id the server confirmed on an earlier registration, reused on retries.
    confirmed_form_id: Option<FormId>,
    state: SubmissionState,
    last_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("entry index {index} is out of bounds for {len} entries")]
pub struct EntryIndexError {
    pub index: usize,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Index(#[from] EntryIndexError),
    #[error(transparent)]
    FieldKind(#[from] FieldKindMismatch),
    #[error("a submission is already in flight")]
    SubmissionInFlight,
}

/// Why `begin_submission` refused to hand out a plan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejected {
    #[error("a submission is already in flight")]
    InFlight,
    #[error(transparent)]
    Invalid(SubmissionError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Both phases succeeded and the navigator was asked to advance.
    Completed(SubmissionReceipt),
    /// The attempt ended with an error now shown in `last_error`.
    Failed(SubmissionError),
    /// Another submission was still in flight; nothing happened.
    AlreadySubmitting,
}

impl GuarantorFormSession {
    pub fn new(context: FormContext, routes: WizardRoutes) -> Self {
        Self::with_entries(context, routes, Vec::new())
    }

    /// Start from pre-filled entries. An empty list is seeded with one blank entry.
    pub fn with_entries(
        context: FormContext,
        routes: WizardRoutes,
        entries: Vec<GuarantorEntry>,
    ) -> Self {
        let entries = if entries.is_empty() {
            vec![GuarantorEntry::blank()]
        } else {
            entries
        };

        Self {
            context,
            routes,
            entries,
            confirmed_form_id: None,
            state: SubmissionState::Idle,
            last_error: None,
        }
    }

    pub fn context(&self) -> &FormContext {
        &self.context
    }

    pub fn routes(&self) -> &WizardRoutes {
        &self.routes
    }

    pub fn entries(&self) -> &[GuarantorEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Result<&GuarantorEntry, EntryIndexError> {
        self.entries.get(index).ok_or(EntryIndexError {
            index,
            len: self.entries.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Form id confirmed by the last accepted registration, if any.
    pub fn confirmed_form_id(&self) -> Option<&FormId> {
        self.confirmed_form_id.as_ref()
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == SubmissionState::Submitting
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    pub fn add_entry(&mut self) {
        self.entries.push(GuarantorEntry::blank());
    }

    /// Remove the entry at `index`; later entries shift down by one. Removing the
    /// sole remaining entry leaves a single blank entry in its place.
    pub fn remove_entry(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_editable()?;
        self.check_index(index)?;

        let remaining: Vec<GuarantorEntry> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(position, _)| *position != index)
            .map(|(_, entry)| entry.clone())
            .collect();

        self.entries = if remaining.is_empty() {
            vec![GuarantorEntry::blank()]
        } else {
            remaining
        };
        debug!(index, remaining = self.entries.len(), "guarantor entry removed");
        Ok(())
    }

    /// Replace one field of one entry. The entry is rebuilt, never edited in place,
    /// so clones taken before the edit are unaffected.
    pub fn update_entry(
        &mut self,
        index: usize,
        field: GuarantorField,
        value: FieldValue,
    ) -> Result<(), SessionError> {
        self.ensure_editable()?;
        self.check_index(index)?;

        let updated = self.entries[index].with_field(field, value)?;
        self.entries[index] = updated;
        debug!(index, field = field.key(), "guarantor entry updated");
        Ok(())
    }

    /// Navigate to the previous wizard step.
    pub fn go_back<N>(&self, navigator: &N) -> Result<(), SessionError>
    where
        N: WizardNavigator + ?Sized,
    {
        self.ensure_editable()?;
        navigator.navigate_to(&self.routes.previous);
        Ok(())
    }

    /// Validate every entry and, when complete, switch to `Submitting` and return a
    /// detached plan for the network phases. A failed validation sets the error slot.
    ///
    /// Registration carries the context form id until the server has confirmed one;
    /// later attempts re-register under the confirmed id.
    pub fn begin_submission(&mut self) -> Result<SubmissionPlan, SubmitRejected> {
        if self.is_submitting() {
            return Err(SubmitRejected::InFlight);
        }

        let registration_form_id = self
            .confirmed_form_id
            .clone()
            .unwrap_or_else(|| self.context.form_id.clone());

        match SubmissionPlan::from_entries(registration_form_id, &self.entries) {
            Ok(plan) => {
                self.last_error = None;
                self.state = SubmissionState::Submitting;
                Ok(plan)
            }
            Err(err) => {
                warn!(error = %err, "guarantor form failed validation");
                self.last_error = Some(err.user_message());
                Err(SubmitRejected::Invalid(err))
            }
        }
    }

    /// Apply an executed plan and return to `Idle`. On success the navigator
    /// advances to the next wizard step exactly once.
    pub fn finish<N>(&mut self, attempt: SubmissionAttempt, navigator: &N) -> SubmitOutcome
    where
        N: WizardNavigator + ?Sized,
    {
        self.state = SubmissionState::Idle;
        if let Some(form_id) = attempt.confirmed_form_id {
            self.confirmed_form_id = Some(form_id);
        }

        match attempt.result {
            Ok(receipt) => {
                info!(
                    form_id = %receipt.confirmed_form_id,
                    guarantors = receipt.guarantor_count,
                    next = %self.routes.next,
                    "guarantor submission completed"
                );
                self.last_error = None;
                navigator.navigate_to(&self.routes.next);
                SubmitOutcome::Completed(receipt)
            }
            Err(err) => {
                match &err {
                    SubmissionError::Transport(source) => {
                        error!(error = %source, "guarantor submission failed in transport")
                    }
                    other => warn!(error = %other, "guarantor submission rejected"),
                }
                self.last_error = Some(err.user_message());
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Validate, register, upload, then navigate. Errors never escape: they land in
    /// `last_error` and the session is `Idle` again when this returns.
    pub async fn submit<G, N>(
        &mut self,
        gateway: &G,
        navigator: &N,
        options: &SubmitOptions,
        cancel: &CancellationToken,
    ) -> SubmitOutcome
    where
        G: GuarantorGateway + ?Sized,
        N: WizardNavigator + ?Sized,
    {
        let plan = match self.begin_submission() {
            Ok(plan) => plan,
            Err(SubmitRejected::InFlight) => return SubmitOutcome::AlreadySubmitting,
            Err(SubmitRejected::Invalid(err)) => return SubmitOutcome::Failed(err),
        };

        let mut in_flight = InFlight {
            session: self,
            settled: false,
        };
        let attempt = plan.execute(gateway, options, cancel).await;
        in_flight.settled = true;
        in_flight.session.finish(attempt, navigator)
    }

    fn ensure_editable(&self) -> Result<(), SessionError> {
        if self.is_submitting() {
            Err(SessionError::SubmissionInFlight)
        } else {
            Ok(())
        }
    }

    fn check_index(&self, index: usize) -> Result<(), EntryIndexError> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(EntryIndexError {
                index,
                len: self.entries.len(),
            })
        }
    }
}

/// Returns the session to `Idle` if a `submit` future is dropped mid-flight.
struct InFlight<'a> {
    session: &'a mut GuarantorFormSession,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.session.state = SubmissionState::Idle;
            self.session.last_error = Some(GENERIC_FAILURE_MESSAGE.to_string());
        }
    }
}
