//! Review layouts.
//!
//! # Responsibility
//! - Derive per-entry display fields (excerpt, link count, hover highlight).
//! - Arrange entries for each `ViewMode`.
//!
//! # Invariants
//! - Layouts only sort, filter, group and position loaded entries.
//! - River and constellation coordinates lie in the unit square.
//! - Edges are emitted only for links whose both endpoints are loaded.

use crate::index::link_index::LinkIndex;
use crate::model::entry::{Entry, EntryBody, EntryKind, EntryRef};
use crate::model::link::{LinkId, RelationshipKind};
use crate::review::mode::{ReviewState, ViewMode};
use crate::service::review_service::ReviewSnapshot;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::f64::consts::TAU;

const EXCERPT_MAX_CHARS: usize = 80;
const RIVER_AMPLITUDE: f64 = 0.35;
const RIVER_TURNS: f64 = 1.5;
const CONSTELLATION_MIN_RADIUS: f64 = 0.1;
const CONSTELLATION_RADIUS_SPAN: f64 = 0.35;
/// Share of each kind's angular sector actually used by its stars.
const CONSTELLATION_SECTOR_FILL: f64 = 0.8;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// One entry with its derived display fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem<'a> {
    pub entry: &'a Entry,
    pub excerpt: String,
    pub link_count: usize,
    /// The hovered entry and this one share at least one link.
    pub linked_to_hovered: bool,
}

impl ReviewItem<'_> {
    pub fn entry_ref(&self) -> EntryRef {
        self.entry.entry_ref()
    }
}

/// Theme derived from the entry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Theme {
    Gratitude,
    Intercession,
    Word,
    Mission,
}

impl Theme {
    pub const ALL: [Theme; 4] = [
        Theme::Gratitude,
        Theme::Intercession,
        Theme::Word,
        Theme::Mission,
    ];

    pub fn of(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Grace => Self::Gratitude,
            EntryKind::Prayer => Self::Intercession,
            EntryKind::ScriptureWord | EntryKind::PropheticWord => Self::Word,
            EntryKind::MissionaryEncounter => Self::Mission,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gratitude => "gratitude",
            Self::Intercession => "intercession",
            Self::Word => "word",
            Self::Mission => "mission",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeGroup<'a> {
    pub theme: Theme,
    pub items: Vec<ReviewItem<'a>>,
}

/// Drawable link between two loaded entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub link_id: LinkId,
    pub source: EntryRef,
    pub target: EntryRef,
    pub kind: RelationshipKind,
}

/// Entry placed in the unit square.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedItem<'a> {
    pub item: ReviewItem<'a>,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphLayout<'a> {
    pub nodes: Vec<PlacedItem<'a>>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewLayout<'a> {
    Chronological(Vec<ReviewItem<'a>>),
    Thematic(Vec<ThemeGroup<'a>>),
    Consolations(Vec<ReviewItem<'a>>),
    River(GraphLayout<'a>),
    Constellation(GraphLayout<'a>),
}

impl ReviewLayout<'_> {
    pub fn mode(&self) -> ViewMode {
        match self {
            Self::Chronological(_) => ViewMode::Chronological,
            Self::Thematic(_) => ViewMode::Thematic,
            Self::Consolations(_) => ViewMode::Consolations,
            Self::River(_) => ViewMode::River,
            Self::Constellation(_) => ViewMode::Constellation,
        }
    }
}

/// Lays out `snapshot` for the mode and hover held in `state`.
pub fn render<'a>(snapshot: &'a ReviewSnapshot, state: &ReviewState) -> ReviewLayout<'a> {
    let index = snapshot.link_index();
    let items = derive_items(&snapshot.entries, &index, state.hovered);

    match state.mode {
        ViewMode::Chronological => ReviewLayout::Chronological(chronological(items)),
        ViewMode::Thematic => ReviewLayout::Thematic(thematic(items)),
        ViewMode::Consolations => ReviewLayout::Consolations(chronological(
            items
                .into_iter()
                .filter(|item| item.entry.is_consolation())
                .collect(),
        )),
        ViewMode::River => ReviewLayout::River(river(items, &index)),
        ViewMode::Constellation => ReviewLayout::Constellation(constellation(items, &index)),
    }
}

/// Computes display fields for each entry. Input order is preserved.
pub fn derive_items<'a>(
    entries: &'a [Entry],
    index: &LinkIndex<'_>,
    hovered: Option<EntryRef>,
) -> Vec<ReviewItem<'a>> {
    entries
        .iter()
        .map(|entry| {
            let entry_ref = entry.entry_ref();
            ReviewItem {
                entry,
                excerpt: excerpt(entry),
                link_count: index.count_links_for(entry_ref),
                linked_to_hovered: hovered.is_some_and(|hovered| {
                    hovered != entry_ref && index.are_linked(hovered, entry_ref)
                }),
            }
        })
        .collect()
}

/// Newest first: `occurred_on`, then `created_at`, then id.
pub fn chronological(mut items: Vec<ReviewItem<'_>>) -> Vec<ReviewItem<'_>> {
    items.sort_by(|a, b| newest_first(a.entry, b.entry));
    items
}

/// Groups by theme in `Theme::ALL` order; empty themes are omitted.
pub fn thematic(items: Vec<ReviewItem<'_>>) -> Vec<ThemeGroup<'_>> {
    let mut groups: Vec<ThemeGroup<'_>> = Theme::ALL
        .into_iter()
        .map(|theme| ThemeGroup {
            theme,
            items: Vec::new(),
        })
        .collect();
    for item in items {
        let theme = Theme::of(item.entry.kind());
        if let Some(group) = groups.iter_mut().find(|group| group.theme == theme) {
            group.items.push(item);
        }
    }
    groups.retain(|group| !group.items.is_empty());
    for group in &mut groups {
        group.items.sort_by(|a, b| newest_first(a.entry, b.entry));
    }
    groups
}

/// Oldest first along a sine curve crossing the square left to right.
pub fn river<'a>(mut items: Vec<ReviewItem<'a>>, index: &LinkIndex<'_>) -> GraphLayout<'a> {
    items.sort_by(|a, b| newest_first(b.entry, a.entry));
    let last = items.len().saturating_sub(1);
    let nodes = items
        .into_iter()
        .enumerate()
        .map(|(position, item)| {
            let x = if last == 0 {
                0.5
            } else {
                position as f64 / last as f64
            };
            let y = 0.5 + RIVER_AMPLITUDE * (x * RIVER_TURNS * TAU).sin();
            PlacedItem { item, x, y }
        })
        .collect::<Vec<_>>();
    let edges = edges_between(&nodes, index);
    GraphLayout { nodes, edges }
}

/// One angular sector per kind; the more links, the closer to the centre.
pub fn constellation<'a>(items: Vec<ReviewItem<'a>>, index: &LinkIndex<'_>) -> GraphLayout<'a> {
    let sector = TAU / EntryKind::ALL.len() as f64;
    let mut nodes = Vec::with_capacity(items.len());

    for (slot, kind) in EntryKind::ALL.into_iter().enumerate() {
        let mut members: Vec<ReviewItem<'a>> = items
            .iter()
            .filter(|item| item.entry.kind() == kind)
            .cloned()
            .collect();
        members.sort_by(|a, b| newest_first(b.entry, a.entry));

        let count = members.len();
        let sector_start = slot as f64 * sector + sector * (1.0 - CONSTELLATION_SECTOR_FILL) / 2.0;
        for (position, item) in members.into_iter().enumerate() {
            let fraction = (position as f64 + 1.0) / (count as f64 + 1.0);
            let angle = sector_start + fraction * sector * CONSTELLATION_SECTOR_FILL;
            let radius = CONSTELLATION_MIN_RADIUS
                + CONSTELLATION_RADIUS_SPAN / (1.0 + item.link_count as f64);
            nodes.push(PlacedItem {
                item,
                x: 0.5 + radius * angle.cos(),
                y: 0.5 + radius * angle.sin(),
            });
        }
    }

    let edges = edges_between(&nodes, index);
    GraphLayout { nodes, edges }
}

/// Edges for links whose endpoints are both among `nodes`, in link order.
fn edges_between(nodes: &[PlacedItem<'_>], index: &LinkIndex<'_>) -> Vec<Edge> {
    let present: HashSet<EntryRef> = nodes.iter().map(|node| node.item.entry_ref()).collect();
    index
        .links()
        .iter()
        .filter_map(|link| {
            if present.contains(&link.source) && present.contains(&link.target) {
                Some(Edge {
                    link_id: link.id,
                    source: link.source,
                    target: link.target,
                    kind: link.kind,
                })
            } else {
                debug!(
                    "event=review_edge module=review status=skipped link_id={} reason=missing_endpoint",
                    link.id
                );
                None
            }
        })
        .collect()
}

fn newest_first(a: &Entry, b: &Entry) -> Ordering {
    b.occurred_on
        .cmp(&a.occurred_on)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
        .then_with(|| a.kind().cmp(&b.kind()))
}

/// Single-line preview of the entry's main text.
pub fn excerpt(entry: &Entry) -> String {
    let raw = match &entry.body {
        EntryBody::Grace(grace) => grace.title.clone(),
        EntryBody::Prayer(prayer) => prayer.intention.clone(),
        EntryBody::ScriptureWord(word) => format!("{} {}", word.reference, word.text),
        EntryBody::PropheticWord(word) => word.text.clone(),
        EntryBody::MissionaryEncounter(encounter) => {
            format!("{}: {}", encounter.person_name, encounter.story)
        }
    };
    let collapsed = WHITESPACE_RE.replace_all(raw.trim(), " ");
    let mut preview: String = collapsed.chars().take(EXCERPT_MAX_CHARS).collect();
    if collapsed.chars().count() > EXCERPT_MAX_CHARS {
        preview.push_str("...");
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::{excerpt, Theme};
    use crate::model::entry::{Entry, EntryBody, EntryKind, ScriptureWord};
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn excerpt_collapses_whitespace_and_truncates() {
        let entry = Entry {
            id: 1,
            owner: Uuid::nil(),
            occurred_on: NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date"),
            created_at: 0,
            body: EntryBody::ScriptureWord(ScriptureWord {
                reference: "Jn 15:5".to_string(),
                text: format!("Je suis la vigne,\n\n  vous les sarments. {}", "x".repeat(100)),
                context: None,
            }),
        };
        let preview = excerpt(&entry);
        assert!(preview.starts_with("Jn 15:5 Je suis la vigne, vous les sarments."));
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 83);
    }

    #[test]
    fn words_share_one_theme() {
        assert_eq!(Theme::of(EntryKind::ScriptureWord), Theme::Word);
        assert_eq!(Theme::of(EntryKind::PropheticWord), Theme::Word);
        assert_eq!(Theme::of(EntryKind::Grace), Theme::Gratitude);
    }
}
