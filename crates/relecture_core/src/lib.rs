//! Core domain logic for the Relecture spiritual journal.
//! This crate is the single source of truth for journal invariants.

pub mod config;
pub mod db;
pub mod index;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod review;
pub mod service;

pub use config::{ConfigError, JournalConfig};
pub use index::link_index::{LinkDirection, LinkIndex, LinkedEntry};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::entry::{
    Entry, EntryBody, EntryId, EntryKind, EntryRef, EntryValidationError, Grace,
    MissionaryEncounter, NewEntry, Prayer, PropheticWord, ScriptureWord,
};
pub use model::link::{Link, LinkDraft, LinkId, LinkValidationError, NewLink, RelationshipKind};
pub use model::session::{FixedSessionProvider, Session, SessionProvider, UserId};
pub use notify::{LogOnlyNotifier, SecurityAlert, SecurityAlertNotifier, SecurityAlertType};
pub use repo::entry_repo::{
    EntryListQuery, EntryRepository, RepoError, RepoResult, SqliteEntryRepository,
};
pub use repo::link_repo::{LinkRepository, SqliteLinkRepository};
pub use review::authoring::{LinkAuthoringPanel, PanelState, SubmitOutcome};
pub use review::layout::{render, ReviewItem, ReviewLayout, Theme};
pub use review::mode::{ReviewState, ViewMode};
pub use review::reminder::{
    pick_reminder, Reminder, ReminderCategory, ReminderPolicy, ReminderPolicyError,
};
pub use service::entry_service::{EntryLookup, EntryService, EntryServiceError};
pub use service::link_service::{LinkService, LinkServiceError};
pub use service::review_service::{
    LoadFailure, LoadSource, ReviewLoadError, ReviewService, ReviewSnapshot,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
