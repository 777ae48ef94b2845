//! Entry use-case service.
//!
//! # Responsibility
//! - Create, edit, open, list and delete journal entries for one session.
//! - Map "entry vanished" into a redirect to the kind's listing.
//!
//! # Invariants
//! - Validation runs before the repository is called.
//! - Create/update return the row as read back from storage.

use crate::model::entry::{Entry, EntryKind, EntryRef, EntryValidationError, NewEntry};
use crate::model::session::Session;
use crate::repo::entry_repo::{EntryListQuery, EntryRepository, RepoError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum EntryServiceError {
    Validation(EntryValidationError),
    EntryNotFound(EntryRef),
    Repo(RepoError),
    /// Write succeeded but the row could not be read back.
    InconsistentState(&'static str),
}

impl Display for EntryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::EntryNotFound(entry) => write!(f, "entry not found: {entry}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent entry state: {details}"),
        }
    }
}

impl Error for EntryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for EntryServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::EntryNotFound(entry) => Self::EntryNotFound(entry),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<EntryValidationError> for EntryServiceError {
    fn from(value: EntryValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Outcome of navigating to one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryLookup {
    Found(Entry),
    /// The entry no longer exists; show the listing of its kind instead.
    RedirectToListing(EntryKind),
}

pub struct EntryService<R: EntryRepository> {
    repo: R,
}

impl<R: EntryRepository> EntryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Records a new entry owned by the session user.
    pub fn create_entry(
        &self,
        session: &Session,
        entry: &NewEntry,
    ) -> Result<Entry, EntryServiceError> {
        entry.validate()?;
        let kind = entry.kind();
        let created = self
            .repo
            .create_entry(session.user_id, entry)
            .inspect_err(|err| log_failure("entry_create", kind, err))?;
        info!(
            "event=entry_create module=service status=ok kind={} id={}",
            kind, created.id
        );
        self.repo
            .get_entry(session.user_id, created)?
            .ok_or(EntryServiceError::InconsistentState(
                "created entry not found in read-back",
            ))
    }

    /// Replaces date and content of an entry. The kind cannot change.
    pub fn update_entry(
        &self,
        session: &Session,
        target: EntryRef,
        update: &NewEntry,
    ) -> Result<Entry, EntryServiceError> {
        if update.kind() != target.kind {
            return Err(EntryValidationError::KindChanged {
                stored: target.kind,
                requested: update.kind(),
            }
            .into());
        }
        update.validate()?;
        self.repo
            .update_entry(session.user_id, target, update)
            .inspect_err(|err| log_failure("entry_update", target.kind, err))?;
        info!(
            "event=entry_update module=service status=ok kind={} id={}",
            target.kind, target.id
        );
        self.repo
            .get_entry(session.user_id, target)?
            .ok_or(EntryServiceError::InconsistentState(
                "updated entry not found in read-back",
            ))
    }

    pub fn get_entry(
        &self,
        session: &Session,
        target: EntryRef,
    ) -> Result<Option<Entry>, EntryServiceError> {
        Ok(self.repo.get_entry(session.user_id, target)?)
    }

    /// Loads an entry for display, or redirects to its listing when gone.
    pub fn open_entry(
        &self,
        session: &Session,
        target: EntryRef,
    ) -> Result<EntryLookup, EntryServiceError> {
        match self.get_entry(session, target)? {
            Some(entry) => Ok(EntryLookup::Found(entry)),
            None => {
                info!(
                    "event=entry_open module=service status=redirect kind={} id={}",
                    target.kind, target.id
                );
                Ok(EntryLookup::RedirectToListing(target.kind))
            }
        }
    }

    /// All entries of one kind, newest first.
    pub fn list_entries(
        &self,
        session: &Session,
        kind: EntryKind,
    ) -> Result<Vec<Entry>, EntryServiceError> {
        Ok(self
            .repo
            .list_entries(&EntryListQuery::all(session.user_id, kind))?)
    }

    /// Deletes an entry. Links pointing at it are left dangling.
    pub fn delete_entry(
        &self,
        session: &Session,
        target: EntryRef,
    ) -> Result<(), EntryServiceError> {
        self.repo
            .delete_entry(session.user_id, target)
            .inspect_err(|err| log_failure("entry_delete", target.kind, err))?;
        info!(
            "event=entry_delete module=service status=ok kind={} id={}",
            target.kind, target.id
        );
        Ok(())
    }
}

fn log_failure(event: &str, kind: EntryKind, err: &RepoError) {
    error!("event={event} module=service status=error kind={kind} error={err}");
}
