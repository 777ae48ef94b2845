//! Gentle reminder: resurface one stale prayer, grace or word.
//!
//! # Invariants
//! - Only entries at least `stale_after_days` old are candidates; unanswered
//!   prayers only, graces and words regardless of fulfillment.
//! - A category is drawn with its policy weight among non-empty categories,
//!   then one entry uniformly inside it.
//! - The random source is supplied by the caller.

use crate::model::entry::{Entry, EntryBody};
use chrono::NaiveDate;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Selection policy for the gentle reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReminderPolicy {
    pub stale_after_days: u32,
    pub prayer_weight: f64,
    pub grace_weight: f64,
    pub word_weight: f64,
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self {
            stale_after_days: 30,
            prayer_weight: 0.5,
            grace_weight: 0.3,
            word_weight: 0.2,
        }
    }
}

impl ReminderPolicy {
    /// Weights must be finite, non-negative and not all zero.
    pub fn validate(&self) -> Result<(), ReminderPolicyError> {
        let weights = [
            ("prayer_weight", self.prayer_weight),
            ("grace_weight", self.grace_weight),
            ("word_weight", self.word_weight),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ReminderPolicyError::NegativeWeight { name, value });
            }
        }
        if weights.iter().all(|(_, value)| *value == 0.0) {
            return Err(ReminderPolicyError::AllWeightsZero);
        }
        Ok(())
    }

    fn weight(&self, category: ReminderCategory) -> f64 {
        match category {
            ReminderCategory::Prayer => self.prayer_weight,
            ReminderCategory::Grace => self.grace_weight,
            ReminderCategory::Word => self.word_weight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReminderPolicyError {
    /// Weight is negative, NaN or infinite.
    NegativeWeight { name: &'static str, value: f64 },
    AllWeightsZero,
}

impl Display for ReminderPolicyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeWeight { name, value } => write!(
                f,
                "reminder {name} must be a non-negative number, got {value}"
            ),
            Self::AllWeightsZero => write!(f, "reminder weights cannot all be zero"),
        }
    }
}

impl Error for ReminderPolicyError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderCategory {
    Prayer,
    Grace,
    Word,
}

impl ReminderCategory {
    const ALL: [ReminderCategory; 3] = [
        ReminderCategory::Prayer,
        ReminderCategory::Grace,
        ReminderCategory::Word,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prayer => "prayer",
            Self::Grace => "grace",
            Self::Word => "word",
        }
    }

    fn of(entry: &Entry) -> Option<Self> {
        match &entry.body {
            EntryBody::Prayer(prayer) if prayer.answered_on.is_none() => Some(Self::Prayer),
            EntryBody::Grace(_) => Some(Self::Grace),
            EntryBody::ScriptureWord(_) | EntryBody::PropheticWord(_) => Some(Self::Word),
            EntryBody::Prayer(_) | EntryBody::MissionaryEncounter(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder<'a> {
    pub category: ReminderCategory,
    pub entry: &'a Entry,
    pub days_since: i64,
}

/// Picks one stale entry to resurface, or `None` when nothing qualifies.
pub fn pick_reminder<'a, R: Rng + ?Sized>(
    entries: &'a [Entry],
    today: NaiveDate,
    policy: &ReminderPolicy,
    rng: &mut R,
) -> Option<Reminder<'a>> {
    let stale_after = i64::from(policy.stale_after_days);
    let buckets: Vec<(ReminderCategory, Vec<&'a Entry>)> = ReminderCategory::ALL
        .into_iter()
        .map(|category| {
            let members = entries
                .iter()
                .filter(|entry| ReminderCategory::of(entry) == Some(category))
                .filter(|entry| (today - entry.occurred_on).num_days() >= stale_after)
                .collect::<Vec<_>>();
            (category, members)
        })
        .filter(|(category, members)| !members.is_empty() && policy.weight(*category) > 0.0)
        .collect();

    if buckets.is_empty() {
        return None;
    }

    let weights = buckets
        .iter()
        .map(|(category, _)| policy.weight(*category));
    let distribution = WeightedIndex::new(weights).ok()?;
    let (category, members) = &buckets[distribution.sample(rng)];
    let entry = *members.choose(rng)?;

    Some(Reminder {
        category: *category,
        entry,
        days_since: (today - entry.occurred_on).num_days(),
    })
}
