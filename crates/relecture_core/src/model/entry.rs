//! Journal entry domain model.
//!
//! # Responsibility
//! - Represent grace, prayer, scripture word, prophetic word and missionary
//!   encounter records as one tagged union (`EntryBody`).
//! - Validate entry content before it reaches storage.
//!
//! # Invariants
//! - Each kind has its own id sequence; `EntryRef` pairs the id with the kind.
//! - The main text field of every kind is non-blank.
//! - An answer/fulfillment date is never earlier than `occurred_on`.

use crate::model::session::UserId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Row id inside one entry kind's table.
pub type EntryId = i64;

/// Discriminant of the five journal entry kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A received grace (consolation, gift, answered need).
    Grace,
    /// A prayer intention, possibly answered later.
    Prayer,
    /// A scripture passage that spoke to the user.
    ScriptureWord,
    /// A prophetic word received, possibly fulfilled later.
    PropheticWord,
    /// A meeting with someone during mission.
    MissionaryEncounter,
}

impl EntryKind {
    pub const ALL: [EntryKind; 5] = [
        EntryKind::Grace,
        EntryKind::Prayer,
        EntryKind::ScriptureWord,
        EntryKind::PropheticWord,
        EntryKind::MissionaryEncounter,
    ];

    /// Stable storage/wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grace => "grace",
            Self::Prayer => "prayer",
            Self::ScriptureWord => "scripture_word",
            Self::PropheticWord => "prophetic_word",
            Self::MissionaryEncounter => "missionary_encounter",
        }
    }

    /// Parses a stable storage/wire name. Exact, lowercase match only.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl Display for EntryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed address of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryRef {
    pub kind: EntryKind,
    pub id: EntryId,
}

impl EntryRef {
    pub fn new(kind: EntryKind, id: EntryId) -> Self {
        Self { kind, id }
    }
}

impl Display for EntryRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grace {
    pub title: String,
    pub description: String,
    pub people: Vec<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prayer {
    pub intention: String,
    pub people: Vec<String>,
    /// Set once the prayer is considered answered.
    pub answered_on: Option<NaiveDate>,
    pub answer_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptureWord {
    /// Book/chapter/verse reference, e.g. `Jn 15:5`.
    pub reference: String,
    pub text: String,
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropheticWord {
    pub text: String,
    pub received_from: Option<String>,
    pub fulfilled_on: Option<NaiveDate>,
    pub fulfillment_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionaryEncounter {
    pub person_name: String,
    pub location: Option<String>,
    pub story: String,
    pub follow_up: Option<String>,
}

/// Kind-specific content. Serialized with a `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryBody {
    Grace(Grace),
    Prayer(Prayer),
    ScriptureWord(ScriptureWord),
    PropheticWord(PropheticWord),
    MissionaryEncounter(MissionaryEncounter),
}

impl EntryBody {
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Grace(_) => EntryKind::Grace,
            Self::Prayer(_) => EntryKind::Prayer,
            Self::ScriptureWord(_) => EntryKind::ScriptureWord,
            Self::PropheticWord(_) => EntryKind::PropheticWord,
            Self::MissionaryEncounter(_) => EntryKind::MissionaryEncounter,
        }
    }

    /// Main human-readable text of the entry.
    pub fn headline(&self) -> &str {
        match self {
            Self::Grace(grace) => grace.title.as_str(),
            Self::Prayer(prayer) => prayer.intention.as_str(),
            Self::ScriptureWord(word) => word.reference.as_str(),
            Self::PropheticWord(word) => word.text.as_str(),
            Self::MissionaryEncounter(encounter) => encounter.person_name.as_str(),
        }
    }

    /// Answer date for prayers, fulfillment date for prophetic words.
    pub fn fulfilled_on(&self) -> Option<NaiveDate> {
        match self {
            Self::Prayer(prayer) => prayer.answered_on,
            Self::PropheticWord(word) => word.fulfilled_on,
            Self::Grace(_) | Self::ScriptureWord(_) | Self::MissionaryEncounter(_) => None,
        }
    }

    /// Validates content against the entry date.
    ///
    /// # Errors
    /// - `BlankField` when a required text field is empty after trimming.
    /// - `FulfilledBeforeOccurrence` when the answer/fulfillment date precedes
    ///   `occurred_on`.
    pub fn validate(&self, occurred_on: NaiveDate) -> Result<(), EntryValidationError> {
        let kind = self.kind();
        let required: Vec<(&'static str, &str)> = match self {
            Self::Grace(grace) => vec![("title", grace.title.as_str())],
            Self::Prayer(prayer) => vec![("intention", prayer.intention.as_str())],
            Self::ScriptureWord(word) => vec![
                ("reference", word.reference.as_str()),
                ("text", word.text.as_str()),
            ],
            Self::PropheticWord(word) => vec![("text", word.text.as_str())],
            Self::MissionaryEncounter(encounter) => vec![
                ("person_name", encounter.person_name.as_str()),
                ("story", encounter.story.as_str()),
            ],
        };
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(EntryValidationError::BlankField { kind, field });
            }
        }

        if let Some(fulfilled_on) = self.fulfilled_on() {
            if fulfilled_on < occurred_on {
                return Err(EntryValidationError::FulfilledBeforeOccurrence {
                    kind,
                    occurred_on,
                    fulfilled_on,
                });
            }
        }

        Ok(())
    }
}

/// Input for creating an entry. Owner and id are assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub occurred_on: NaiveDate,
    #[serde(flatten)]
    pub body: EntryBody,
}

impl NewEntry {
    pub fn new(occurred_on: NaiveDate, body: EntryBody) -> Self {
        Self { occurred_on, body }
    }

    pub fn kind(&self) -> EntryKind {
        self.body.kind()
    }

    pub fn validate(&self) -> Result<(), EntryValidationError> {
        self.body.validate(self.occurred_on)
    }
}

/// Persisted journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub owner: UserId,
    pub occurred_on: NaiveDate,
    /// Unix epoch milliseconds, assigned by storage on insert.
    pub created_at: i64,
    #[serde(flatten)]
    pub body: EntryBody,
}

impl Entry {
    pub fn kind(&self) -> EntryKind {
        self.body.kind()
    }

    pub fn entry_ref(&self) -> EntryRef {
        EntryRef::new(self.kind(), self.id)
    }

    pub fn headline(&self) -> &str {
        self.body.headline()
    }

    pub fn validate(&self) -> Result<(), EntryValidationError> {
        self.body.validate(self.occurred_on)
    }

    /// Whether the entry belongs to the "consolations" reading: graces,
    /// answered prayers and fulfilled prophetic words.
    pub fn is_consolation(&self) -> bool {
        match &self.body {
            EntryBody::Grace(_) => true,
            EntryBody::Prayer(prayer) => prayer.answered_on.is_some(),
            EntryBody::PropheticWord(word) => word.fulfilled_on.is_some(),
            EntryBody::ScriptureWord(_) | EntryBody::MissionaryEncounter(_) => false,
        }
    }
}

/// Entry content validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    BlankField {
        kind: EntryKind,
        field: &'static str,
    },
    FulfilledBeforeOccurrence {
        kind: EntryKind,
        occurred_on: NaiveDate,
        fulfilled_on: NaiveDate,
    },
    /// Update attempted to change the kind of a stored entry.
    KindChanged {
        stored: EntryKind,
        requested: EntryKind,
    },
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField { kind, field } => {
                write!(f, "{kind} entry requires a non-empty `{field}`")
            }
            Self::FulfilledBeforeOccurrence {
                kind,
                occurred_on,
                fulfilled_on,
            } => write!(
                f,
                "{kind} entry fulfilled on {fulfilled_on} before it occurred on {occurred_on}"
            ),
            Self::KindChanged { stored, requested } => {
                write!(f, "entry kind cannot change from {stored} to {requested}")
            }
        }
    }
}

impl Error for EntryValidationError {}
