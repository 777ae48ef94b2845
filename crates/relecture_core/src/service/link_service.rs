//! Link use-case service.
//!
//! # Responsibility
//! - Validate and persist links authored on the review surface.
//! - Serve the link set, the recent links, and link deletion.
//!
//! # Invariants
//! - A draft is fully validated before any write.
//! - One submit writes exactly one row; nothing prevents duplicates, and a
//!   failed submit is never retried here.

use crate::config::DEFAULT_RECENT_LINKS_LIMIT;
use crate::model::link::{Link, LinkDraft, LinkId, LinkValidationError};
use crate::model::session::Session;
use crate::repo::entry_repo::RepoError;
use crate::repo::link_repo::LinkRepository;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum LinkServiceError {
    Validation(LinkValidationError),
    LinkNotFound(LinkId),
    Repo(RepoError),
    InconsistentState(&'static str),
}

impl Display for LinkServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::LinkNotFound(id) => write!(f, "link not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent link state: {details}"),
        }
    }
}

impl Error for LinkServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for LinkServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::LinkNotFound(id) => Self::LinkNotFound(id),
            RepoError::LinkValidation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<LinkValidationError> for LinkServiceError {
    fn from(value: LinkValidationError) -> Self {
        Self::Validation(value)
    }
}

pub struct LinkService<R: LinkRepository> {
    repo: R,
    recent_limit: u32,
}

impl<R: LinkRepository> LinkService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            recent_limit: DEFAULT_RECENT_LINKS_LIMIT,
        }
    }

    /// Overrides the size of `recent_links` (minimum 1).
    pub fn with_recent_limit(mut self, limit: u32) -> Self {
        self.recent_limit = limit.max(1);
        self
    }

    /// Validates `draft` and writes one link row.
    pub fn create_link(
        &self,
        session: &Session,
        draft: &LinkDraft,
    ) -> Result<Link, LinkServiceError> {
        let link = draft.validate()?;
        let id = self
            .repo
            .create_link(session.user_id, &link)
            .inspect_err(|err| {
                error!("event=link_create module=service status=error error={err}");
            })?;
        info!(
            "event=link_create module=service status=ok id={} kind={} source={} target={}",
            id, link.kind, link.source, link.target
        );
        self.repo
            .get_link(session.user_id, id)?
            .ok_or(LinkServiceError::InconsistentState(
                "created link not found in read-back",
            ))
    }

    pub fn delete_link(&self, session: &Session, id: LinkId) -> Result<(), LinkServiceError> {
        self.repo.delete_link(session.user_id, id).inspect_err(|err| {
            error!("event=link_delete module=service status=error id={id} error={err}");
        })?;
        info!("event=link_delete module=service status=ok id={id}");
        Ok(())
    }

    /// Every link of the session user in insertion order.
    pub fn list_links(&self, session: &Session) -> Result<Vec<Link>, LinkServiceError> {
        Ok(self.repo.list_links(session.user_id)?)
    }

    /// Most recently created links, newest first.
    pub fn recent_links(&self, session: &Session) -> Result<Vec<Link>, LinkServiceError> {
        Ok(self
            .repo
            .list_recent_links(session.user_id, self.recent_limit)?)
    }
}
