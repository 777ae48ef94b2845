//! Typed links between journal entries.
//!
//! # Responsibility
//! - Define the fixed relationship vocabulary.
//! - Turn an authoring draft into a validated `NewLink`.
//!
//! # Invariants
//! - Links are stored as ordered pairs but read from either endpoint.
//! - A link never points from an entry to itself.
//! - Endpoint pairs are not unique: the same pair may carry several links.

use crate::model::entry::EntryRef;
use crate::model::session::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type LinkId = i64;

/// Why two entries are connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    /// Source answers the destination (a grace answering a prayer).
    Exauce,
    /// Source fulfills the destination (an event fulfilling a word).
    Accomplit,
    /// Source derives from the destination.
    Decoule,
    /// Source illuminates the destination.
    Eclaire,
    /// Source echoes the destination.
    Echo,
}

impl RelationshipKind {
    pub const ALL: [RelationshipKind; 5] = [
        RelationshipKind::Exauce,
        RelationshipKind::Accomplit,
        RelationshipKind::Decoule,
        RelationshipKind::Eclaire,
        RelationshipKind::Echo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exauce => "exauce",
            Self::Accomplit => "accomplit",
            Self::Decoule => "decoule",
            Self::Eclaire => "eclaire",
            Self::Echo => "echo",
        }
    }

    /// Short label shown on the authoring panel.
    pub fn label(self) -> &'static str {
        match self {
            Self::Exauce => "answers",
            Self::Accomplit => "fulfills",
            Self::Decoule => "derives from",
            Self::Eclaire => "illuminates",
            Self::Echo => "echoes",
        }
    }

    /// Parses the stored vocabulary.
    ///
    /// # Errors
    /// - `UnknownKind` for anything outside the fixed vocabulary.
    pub fn parse(value: &str) -> Result<Self, LinkValidationError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| LinkValidationError::UnknownKind(value.to_string()))
    }
}

impl Display for RelationshipKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted link row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub owner: UserId,
    pub source: EntryRef,
    pub target: EntryRef,
    pub kind: RelationshipKind,
    pub description: String,
    /// Unix epoch milliseconds, assigned by storage on insert.
    pub created_at: i64,
}

impl Link {
    /// Whether `entry` is either endpoint.
    pub fn touches(&self, entry: EntryRef) -> bool {
        self.source == entry || self.target == entry
    }

    /// The endpoint opposite to `entry`, or `None` when `entry` is not an
    /// endpoint.
    pub fn other_end(&self, entry: EntryRef) -> Option<EntryRef> {
        if self.source == entry {
            Some(self.target)
        } else if self.target == entry {
            Some(self.source)
        } else {
            None
        }
    }
}

/// Validated link input ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub source: EntryRef,
    pub target: EntryRef,
    pub kind: RelationshipKind,
    pub description: String,
}

impl NewLink {
    pub fn validate(&self) -> Result<(), LinkValidationError> {
        if self.source == self.target {
            return Err(LinkValidationError::SelfLink(self.source));
        }
        Ok(())
    }
}

/// In-progress link as edited on the authoring panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkDraft {
    pub source: Option<EntryRef>,
    pub target: Option<EntryRef>,
    pub kind: Option<RelationshipKind>,
    pub description: String,
}

impl LinkDraft {
    /// Checks the draft and produces a persistable link.
    ///
    /// # Errors
    /// - `MissingSource`, `MissingTarget`, `MissingKind` for unset fields.
    /// - `SelfLink` when source and destination are the same entry.
    pub fn validate(&self) -> Result<NewLink, LinkValidationError> {
        let source = self.source.ok_or(LinkValidationError::MissingSource)?;
        let target = self.target.ok_or(LinkValidationError::MissingTarget)?;
        let kind = self.kind.ok_or(LinkValidationError::MissingKind)?;
        let link = NewLink {
            source,
            target,
            kind,
            description: self.description.trim().to_string(),
        };
        link.validate()?;
        Ok(link)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkValidationError {
    MissingSource,
    MissingTarget,
    MissingKind,
    SelfLink(EntryRef),
    UnknownKind(String),
}

impl Display for LinkValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSource => write!(f, "link requires a source entry"),
            Self::MissingTarget => write!(f, "link requires a destination entry"),
            Self::MissingKind => write!(f, "link requires a relationship kind"),
            Self::SelfLink(entry) => write!(f, "entry {entry} cannot be linked to itself"),
            Self::UnknownKind(value) => write!(f, "unknown relationship kind: `{value}`"),
        }
    }
}

impl Error for LinkValidationError {}
