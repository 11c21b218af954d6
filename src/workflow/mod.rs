// Entity edit dialog: open with a draft, resolve the reference field against a
// freshly fetched list, filter and validate edits field by field, submit a
// flattened payload with the session's bearer token.
//
// Phases: Closed -> LoadingReference -> Ready -> Submitting -> Closed | Ready

use serde::Serialize;
use thiserror::Error;

use crate::entity::{
    accepts_input, resolve_reference, validate, validate_field, Draft, EntityKind, ErrorMap, FieldValue,
    ReferenceItem, ReferenceKind,
};
use crate::remote::{EntityGateway, ReferenceSource, RemoteError};
use crate::session::SessionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogPhase {
    Closed,
    LoadingReference,
    Ready,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    Add,
    Edit,
}

/// Handle for one outstanding reference fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceTicket {
    seq: u64,
    kind: ReferenceKind,
}

impl ReferenceTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }
}

/// What a completed reference fetch did to the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceApplied {
    Resolved(ReferenceItem),
    Unresolved,
    /// Fetch failed; the raw value stays in place.
    Failed,
    /// A newer response was already applied.
    Stale,
    /// Dialog was closed or reopened since the fetch was issued.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Accepted,
    /// Keystroke did not fit the field's class and was discarded.
    Rejected,
    ReadOnly,
    UnknownField,
    NotOpen,
    Busy,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Draft is for a {found}, dialog edits {expected}")]
    KindMismatch { expected: EntityKind, found: EntityKind },

    #[error("Edit dialog requires a draft with an identifier")]
    MissingIdentifier,

    #[error("Dialog is not open")]
    NotOpen,

    #[error("Dialog is busy submitting")]
    Busy,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Dialog is not open")]
    NotOpen,

    #[error("A submission is already in flight")]
    Busy,

    #[error("Draft has validation errors")]
    Invalid(ErrorMap),

    #[error("No active session")]
    NoSession,

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Successful submission; the caller should refresh its list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved {
    pub kind: EntityKind,
    pub mode: EditMode,
    pub message: Option<String>,
}

/// One dialog instance. Owns its draft and error map exclusively.
#[derive(Debug)]
pub struct EditDialog {
    kind: EntityKind,
    session: SessionContext,
    mode: EditMode,
    phase: DialogPhase,
    draft: Option<Draft>,
    errors: ErrorMap,
    reference_options: Vec<ReferenceItem>,
    issued_seq: u64,
    applied_seq: u64,
}

impl EditDialog {
    pub fn new(kind: EntityKind, session: SessionContext) -> Self {
        Self {
            kind,
            session,
            mode: EditMode::Add,
            phase: DialogPhase::Closed,
            draft: None,
            errors: ErrorMap::default(),
            reference_options: Vec::new(),
            issued_seq: 0,
            applied_seq: 0,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn phase(&self) -> DialogPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase != DialogPhase::Closed
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// Last reference list applied to this dialog.
    pub fn reference_options(&self) -> &[ReferenceItem] {
        &self.reference_options
    }

    /// Open with a blank draft.
    pub fn open_add(&mut self) -> Option<ReferenceTicket> {
        self.open(EditMode::Add, Draft::empty(self.kind))
    }

    /// Open pre-filled with an existing entity.
    pub fn open_edit(&mut self, draft: Draft) -> Result<Option<ReferenceTicket>, WorkflowError> {
        self.check_draft(&draft)?;
        if self.phase == DialogPhase::Submitting {
            return Err(WorkflowError::Busy);
        }
        Ok(self.open(EditMode::Edit, draft))
    }

    /// Swap in a different entity while open; the reference list is fetched again.
    pub fn change_entity(&mut self, draft: Draft) -> Result<Option<ReferenceTicket>, WorkflowError> {
        match self.phase {
            DialogPhase::Closed => return Err(WorkflowError::NotOpen),
            DialogPhase::Submitting => return Err(WorkflowError::Busy),
            DialogPhase::LoadingReference | DialogPhase::Ready => {}
        }
        self.check_draft(&draft)?;

        self.draft = Some(draft);
        self.errors.clear();
        Ok(self.issue_reference_fetch())
    }

    fn check_draft(&self, draft: &Draft) -> Result<(), WorkflowError> {
        if draft.kind() != self.kind {
            return Err(WorkflowError::KindMismatch {
                expected: self.kind,
                found: draft.kind(),
            });
        }
        if draft.id_string().is_none() {
            return Err(WorkflowError::MissingIdentifier);
        }
        Ok(())
    }

    fn open(&mut self, mode: EditMode, draft: Draft) -> Option<ReferenceTicket> {
        // Anything issued for a previous opening no longer applies
        self.applied_seq = self.issued_seq;
        self.mode = mode;
        self.draft = Some(draft);
        self.errors.clear();
        self.reference_options.clear();

        tracing::debug!("Opening {} dialog in {:?} mode", self.kind, mode);
        self.issue_reference_fetch()
    }

    fn issue_reference_fetch(&mut self) -> Option<ReferenceTicket> {
        match self.kind.reference_field().and_then(|spec| spec.reference) {
            Some(kind) => {
                self.issued_seq += 1;
                self.phase = DialogPhase::LoadingReference;
                Some(ReferenceTicket { seq: self.issued_seq, kind })
            }
            None => {
                self.phase = DialogPhase::Ready;
                None
            }
        }
    }

    /// Apply the outcome of a reference fetch.
    ///
    /// Only the highest-sequence response observed is applied; earlier ones
    /// arriving late are dropped. A failed fetch leaves the raw value in place.
    pub fn complete_reference(
        &mut self,
        ticket: ReferenceTicket,
        result: Result<Vec<ReferenceItem>, RemoteError>,
    ) -> ReferenceApplied {
        if self.phase == DialogPhase::Closed {
            return ReferenceApplied::Ignored;
        }
        if ticket.seq <= self.applied_seq {
            tracing::warn!(
                "Discarding stale {:?} response #{} (already applied #{})",
                ticket.kind, ticket.seq, self.applied_seq
            );
            return ReferenceApplied::Stale;
        }

        self.applied_seq = ticket.seq;
        if ticket.seq == self.issued_seq && self.phase == DialogPhase::LoadingReference {
            self.phase = DialogPhase::Ready;
        }

        let items = match result {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("Reference list {:?} unavailable, leaving value unresolved: {}", ticket.kind, e);
                return ReferenceApplied::Failed;
            }
        };
        self.reference_options = items;

        let (Some(draft), Some(spec)) = (self.draft.as_mut(), self.kind.reference_field()) else {
            return ReferenceApplied::Unresolved;
        };
        let current = draft.get(spec.name).cloned().unwrap_or_default();

        match resolve_reference(&current, &self.reference_options) {
            Some(item) => {
                draft.set(spec.name, FieldValue::Reference(item.clone()));
                tracing::debug!("Resolved {} to reference #{}", spec.name, item.id);
                ReferenceApplied::Resolved(item)
            }
            None => ReferenceApplied::Unresolved,
        }
    }

    /// Fetch the reference list for `ticket` and apply it.
    pub async fn fetch_reference<S>(&mut self, ticket: ReferenceTicket, source: &S) -> ReferenceApplied
    where
        S: ReferenceSource + ?Sized,
    {
        let result = match self.session.token() {
            Some(token) => source.fetch_reference(ticket.kind, &token).await,
            None => Err(RemoteError::Unauthorized),
        };
        self.complete_reference(ticket, result)
    }

    /// One edit to one field: filter by class, then revalidate that field.
    pub fn input(&mut self, field: &str, value: &str) -> InputOutcome {
        match self.phase {
            DialogPhase::Closed => return InputOutcome::NotOpen,
            DialogPhase::Submitting => return InputOutcome::Busy,
            DialogPhase::LoadingReference | DialogPhase::Ready => {}
        }
        if field == self.kind.id_field() {
            return InputOutcome::ReadOnly;
        }
        let Some(spec) = self.kind.field(field) else {
            return InputOutcome::UnknownField;
        };
        if !accepts_input(spec.class, value) {
            return InputOutcome::Rejected;
        }

        let Some(draft) = self.draft.as_mut() else {
            return InputOutcome::NotOpen;
        };
        let value = FieldValue::Text(value.to_string());
        self.errors.set(spec.name, validate_field(spec, Some(&value)));
        draft.set(spec.name, value);
        InputOutcome::Accepted
    }

    /// Pick an entry from the reference list for the reference field.
    pub fn select_reference(&mut self, item: ReferenceItem) -> InputOutcome {
        match self.phase {
            DialogPhase::Closed => return InputOutcome::NotOpen,
            DialogPhase::Submitting => return InputOutcome::Busy,
            DialogPhase::LoadingReference | DialogPhase::Ready => {}
        }
        let Some(spec) = self.kind.reference_field() else {
            return InputOutcome::UnknownField;
        };
        let Some(draft) = self.draft.as_mut() else {
            return InputOutcome::NotOpen;
        };

        let value = FieldValue::Reference(item);
        self.errors.set(spec.name, validate_field(spec, Some(&value)));
        draft.set(spec.name, value);
        InputOutcome::Accepted
    }

    /// Validate every field and, if clean, send the flattened payload.
    ///
    /// On success the dialog closes. On a remote failure it returns to
    /// `Ready` with the draft intact so the user can correct and resubmit.
    pub async fn submit<G>(&mut self, gateway: &G) -> Result<Saved, SubmitError>
    where
        G: EntityGateway + ?Sized,
    {
        match self.phase {
            DialogPhase::Closed => return Err(SubmitError::NotOpen),
            DialogPhase::Submitting => return Err(SubmitError::Busy),
            DialogPhase::LoadingReference | DialogPhase::Ready => {}
        }
        let Some(draft) = self.draft.as_ref() else {
            return Err(SubmitError::NotOpen);
        };

        self.errors = validate(draft, self.kind.fields());
        if self.errors.has_errors() {
            return Err(SubmitError::Invalid(self.errors.clone()));
        }

        let token = self.session.token().ok_or(SubmitError::NoSession)?;
        let payload = draft.to_payload();
        let id = draft.id_string();

        tracing::info!("Submitting {} ({:?})", self.kind, self.mode);

        let result = {
            let _submitting = PhaseGuard::enter(&mut self.phase, DialogPhase::Submitting);
            match (self.mode, id) {
                (EditMode::Edit, Some(id)) => gateway.update(self.kind, &id, &payload, &token).await,
                _ => gateway.create(self.kind, &payload, &token).await,
            }
        };

        match result {
            Ok(reply) => {
                let saved = Saved {
                    kind: self.kind,
                    mode: self.mode,
                    message: reply.message,
                };
                self.close();
                Ok(saved)
            }
            Err(e) => {
                tracing::info!("Submission of {} rejected: {}", self.kind, e);
                self.phase = DialogPhase::Ready;
                Err(SubmitError::Remote(e))
            }
        }
    }

    /// Discard the draft without submitting.
    pub fn cancel(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.phase = DialogPhase::Closed;
        self.draft = None;
        self.errors.clear();
        self.reference_options.clear();
        self.applied_seq = self.issued_seq;
    }
}

/// Holds the dialog in a transient phase and puts the previous phase back
/// when dropped, including when the owning future is cancelled mid-await.
struct PhaseGuard<'a> {
    phase: &'a mut DialogPhase,
    previous: DialogPhase,
}

impl<'a> PhaseGuard<'a> {
    fn enter(phase: &'a mut DialogPhase, transient: DialogPhase) -> Self {
        let previous = std::mem::replace(phase, transient);
        Self { phase, previous }
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        *self.phase = self.previous;
    }
}
