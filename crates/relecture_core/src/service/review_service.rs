//! Review snapshot loading.
//!
//! # Responsibility
//! - Fetch every entry kind, the link set and the recent links of the
//!   signed-in user.
//! - Keep going when one fetch fails and report which ones did.
//!
//! # Invariants
//! - Each fetch is guarded on its own; a failure never aborts its siblings.
//! - A snapshot is immutable once loaded; a reload builds a new one.

use crate::config::DEFAULT_RECENT_LINKS_LIMIT;
use crate::index::link_index::LinkIndex;
use crate::model::entry::{Entry, EntryKind, EntryRef};
use crate::model::link::Link;
use crate::model::session::{Session, SessionProvider};
use crate::repo::entry_repo::{EntryListQuery, EntryRepository};
use crate::repo::link_repo::LinkRepository;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Which fetch of the snapshot failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Entries(EntryKind),
    Links,
    RecentLinks,
}

impl Display for LoadSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entries(kind) => write!(f, "entries:{kind}"),
            Self::Links => f.write_str("links"),
            Self::RecentLinks => f.write_str("recent_links"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub source: LoadSource,
    /// Message suitable for an inline error banner.
    pub message: String,
}

/// Everything the review surface renders, loaded in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSnapshot {
    pub entries: Vec<Entry>,
    /// Insertion order.
    pub links: Vec<Link>,
    /// Newest first.
    pub recent_links: Vec<Link>,
    pub failures: Vec<LoadFailure>,
}

impl ReviewSnapshot {
    pub fn link_index(&self) -> LinkIndex<'_> {
        LinkIndex::new(&self.links)
    }

    pub fn entry(&self, entry: EntryRef) -> Option<&Entry> {
        self.entries.iter().find(|candidate| candidate.entry_ref() == entry)
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewLoadError {
    /// Nobody is signed in.
    SignedOut,
}

impl Display for ReviewLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SignedOut => write!(f, "review requires a signed-in user"),
        }
    }
}

impl Error for ReviewLoadError {}

pub struct ReviewService<E: EntryRepository, L: LinkRepository> {
    entries: E,
    links: L,
    recent_limit: u32,
}

impl<E: EntryRepository, L: LinkRepository> ReviewService<E, L> {
    pub fn new(entries: E, links: L) -> Self {
        Self {
            entries,
            links,
            recent_limit: DEFAULT_RECENT_LINKS_LIMIT,
        }
    }

    pub fn with_recent_limit(mut self, limit: u32) -> Self {
        self.recent_limit = limit.max(1);
        self
    }

    /// Loads the snapshot for whoever `provider` reports as signed in.
    pub fn load_current(
        &self,
        provider: &impl SessionProvider,
    ) -> Result<ReviewSnapshot, ReviewLoadError> {
        let session = provider
            .current_session()
            .ok_or(ReviewLoadError::SignedOut)?;
        Ok(self.load(&session))
    }

    /// Loads all entries and links of `session`'s user.
    pub fn load(&self, session: &Session) -> ReviewSnapshot {
        let started_at = Instant::now();
        let mut snapshot = ReviewSnapshot::default();

        for kind in EntryKind::ALL {
            let query = EntryListQuery::all(session.user_id, kind);
            match self.entries.list_entries(&query) {
                Ok(mut entries) => snapshot.entries.append(&mut entries),
                Err(err) => record_failure(&mut snapshot, LoadSource::Entries(kind), &err),
            }
        }

        match self.links.list_links(session.user_id) {
            Ok(links) => snapshot.links = links,
            Err(err) => record_failure(&mut snapshot, LoadSource::Links, &err),
        }

        match self
            .links
            .list_recent_links(session.user_id, self.recent_limit)
        {
            Ok(links) => snapshot.recent_links = links,
            Err(err) => record_failure(&mut snapshot, LoadSource::RecentLinks, &err),
        }

        info!(
            "event=review_load module=service status={} entries={} links={} failures={} duration_ms={}",
            if snapshot.is_complete() { "ok" } else { "partial" },
            snapshot.entries.len(),
            snapshot.links.len(),
            snapshot.failures.len(),
            started_at.elapsed().as_millis()
        );
        snapshot
    }
}

fn record_failure(snapshot: &mut ReviewSnapshot, source: LoadSource, err: &dyn Error) {
    error!("event=review_load module=service status=error source={source} error={err}");
    snapshot.failures.push(LoadFailure {
        source,
        message: err.to_string(),
    });
}
