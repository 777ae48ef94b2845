//! Link-authoring panel.
//!
//! # Responsibility
//! - Hold the draft being edited (source, relationship kind, destination).
//! - Submit through `LinkService` and decide what the surface does next.
//!
//! # Invariants
//! - A successful submit closes the panel and requires a full reload.
//! - A failed submit leaves the panel open with the draft intact and an
//!   error message; nothing is retried automatically.
//! - Submitting twice writes twice.

use crate::model::entry::EntryRef;
use crate::model::link::{Link, LinkDraft, LinkValidationError, RelationshipKind};
use crate::model::session::Session;
use crate::repo::link_repo::LinkRepository;
use crate::service::link_service::LinkService;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PanelState {
    #[default]
    Closed,
    Open {
        draft: LinkDraft,
        /// Message of the last failed submit.
        error: Option<String>,
    },
}

/// What the review surface must do after a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Row written; the panel is closed and entries/links must be reloaded.
    Saved(Link),
    /// Validation or storage failure; the panel stays open for retry.
    Rejected(String),
    /// Submit pressed while the panel was closed.
    NotOpen,
}

impl SubmitOutcome {
    pub fn requires_reload(&self) -> bool {
        matches!(self, Self::Saved(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkAuthoringPanel {
    state: PanelState,
}

impl LinkAuthoringPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the panel with a fresh draft, optionally preselecting the source.
    pub fn open(&mut self, source: Option<EntryRef>) {
        self.state = PanelState::Open {
            draft: LinkDraft {
                source,
                ..LinkDraft::default()
            },
            error: None,
        };
    }

    /// Discards the draft.
    pub fn close(&mut self) {
        self.state = PanelState::Closed;
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, PanelState::Open { .. })
    }

    pub fn draft(&self) -> Option<&LinkDraft> {
        match &self.state {
            PanelState::Open { draft, .. } => Some(draft),
            PanelState::Closed => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            PanelState::Open { error, .. } => error.as_deref(),
            PanelState::Closed => None,
        }
    }

    pub fn set_source(&mut self, source: EntryRef) {
        self.edit(|draft| draft.source = Some(source));
    }

    pub fn set_target(&mut self, target: EntryRef) {
        self.edit(|draft| draft.target = Some(target));
    }

    pub fn set_kind(&mut self, kind: RelationshipKind) {
        self.edit(|draft| draft.kind = Some(kind));
    }

    /// Selects the relationship from its stored name.
    ///
    /// # Errors
    /// - `UnknownKind` when `value` is outside the vocabulary; the draft is
    ///   left unchanged.
    pub fn select_kind(&mut self, value: &str) -> Result<(), LinkValidationError> {
        let kind = RelationshipKind::parse(value)?;
        self.set_kind(kind);
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        let description = description.into();
        self.edit(|draft| draft.description = description);
    }

    /// Writes the draft as one link.
    pub fn submit<R: LinkRepository>(
        &mut self,
        service: &LinkService<R>,
        session: &Session,
    ) -> SubmitOutcome {
        let PanelState::Open { draft, error } = &mut self.state else {
            return SubmitOutcome::NotOpen;
        };

        match service.create_link(session, draft) {
            Ok(link) => {
                self.state = PanelState::Closed;
                SubmitOutcome::Saved(link)
            }
            Err(err) => {
                let message = err.to_string();
                *error = Some(message.clone());
                SubmitOutcome::Rejected(message)
            }
        }
    }

    fn edit(&mut self, change: impl FnOnce(&mut LinkDraft)) {
        if let PanelState::Open { draft, error } = &mut self.state {
            change(draft);
            *error = None;
        }
    }
}
