//! Link index over one user's link snapshot.
//!
//! # Responsibility
//! - Answer "how many / which / whether / how" questions about links that
//!   touch an entry.
//!
//! # Invariants
//! - Every query is a linear scan of the borrowed snapshot; nothing is cached.
//! - Queries never fail, including for entries that no longer exist.
//! - `are_linked` is symmetric.
//! - `relationship_between` reports the first match in snapshot order. That
//!   order is incidental and callers must not depend on it.

use crate::model::entry::EntryRef;
use crate::model::link::{Link, RelationshipKind};

/// Direction of a link as seen from one of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDirection {
    /// The viewed entry is the stored source.
    Outgoing,
    /// The viewed entry is the stored destination.
    Incoming,
}

/// One neighbour of an entry, seen from that entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkedEntry<'a> {
    pub entry: EntryRef,
    pub kind: RelationshipKind,
    pub direction: LinkDirection,
    pub link: &'a Link,
}

/// Read-only view over a link snapshot.
#[derive(Debug, Clone, Copy)]
pub struct LinkIndex<'a> {
    links: &'a [Link],
}

impl<'a> LinkIndex<'a> {
    pub fn new(links: &'a [Link]) -> Self {
        Self { links }
    }

    pub fn links(&self) -> &'a [Link] {
        self.links
    }

    /// Number of links where `entry` is source or destination.
    pub fn count_links_for(&self, entry: EntryRef) -> usize {
        self.links.iter().filter(|link| link.touches(entry)).count()
    }

    /// Links where `entry` is source or destination.
    pub fn links_for(&self, entry: EntryRef) -> Vec<&'a Link> {
        self.links.iter().filter(|link| link.touches(entry)).collect()
    }

    /// Opposite endpoints of every link touching `entry`.
    ///
    /// A neighbour linked twice appears twice, once per link.
    pub fn linked_entries(&self, entry: EntryRef) -> Vec<LinkedEntry<'a>> {
        self.links
            .iter()
            .filter_map(|link| {
                let direction = if link.source == entry {
                    LinkDirection::Outgoing
                } else if link.target == entry {
                    LinkDirection::Incoming
                } else {
                    return None;
                };
                let other = link.other_end(entry)?;
                Some(LinkedEntry {
                    entry: other,
                    kind: link.kind,
                    direction,
                    link,
                })
            })
            .collect()
    }

    /// Whether some link joins `a` and `b`, in either stored direction.
    pub fn are_linked(&self, a: EntryRef, b: EntryRef) -> bool {
        self.links.iter().any(|link| joins(link, a, b))
    }

    /// Kind of the first link joining `a` and `b`, if any.
    pub fn relationship_between(&self, a: EntryRef, b: EntryRef) -> Option<RelationshipKind> {
        self.links
            .iter()
            .find(|link| joins(link, a, b))
            .map(|link| link.kind)
    }
}

fn joins(link: &Link, a: EntryRef, b: EntryRef) -> bool {
    (link.source == a && link.target == b) || (link.source == b && link.target == a)
}

#[cfg(test)]
mod tests {
    use super::{LinkDirection, LinkIndex};
    use crate::model::entry::{EntryKind, EntryRef};
    use crate::model::link::{Link, RelationshipKind};
    use proptest::prelude::*;
    use uuid::Uuid;

    fn link(id: i64, source: EntryRef, target: EntryRef, kind: RelationshipKind) -> Link {
        Link {
            id,
            owner: Uuid::nil(),
            source,
            target,
            kind,
            description: String::new(),
            created_at: id,
        }
    }

    #[test]
    fn linked_entries_report_direction_from_viewer() {
        let grace = EntryRef::new(EntryKind::Grace, 1);
        let prayer = EntryRef::new(EntryKind::Prayer, 2);
        let links = vec![link(1, grace, prayer, RelationshipKind::Exauce)];
        let index = LinkIndex::new(&links);

        let from_grace = index.linked_entries(grace);
        assert_eq!(from_grace.len(), 1);
        assert_eq!(from_grace[0].entry, prayer);
        assert_eq!(from_grace[0].direction, LinkDirection::Outgoing);

        let from_prayer = index.linked_entries(prayer);
        assert_eq!(from_prayer[0].entry, grace);
        assert_eq!(from_prayer[0].direction, LinkDirection::Incoming);
    }

    #[test]
    fn ids_are_compared_together_with_kind() {
        let grace = EntryRef::new(EntryKind::Grace, 1);
        let prayer_one = EntryRef::new(EntryKind::Prayer, 1);
        let word = EntryRef::new(EntryKind::ScriptureWord, 4);
        let links = vec![link(1, grace, word, RelationshipKind::Eclaire)];
        let index = LinkIndex::new(&links);

        assert_eq!(index.count_links_for(prayer_one), 0);
        assert!(!index.are_linked(prayer_one, word));
    }

    #[test]
    fn empty_snapshot_answers_without_panicking() {
        let index = LinkIndex::new(&[]);
        let entry = EntryRef::new(EntryKind::MissionaryEncounter, 9);
        assert_eq!(index.count_links_for(entry), 0);
        assert!(index.links_for(entry).is_empty());
        assert_eq!(index.relationship_between(entry, entry), None);
    }

    fn entry_ref_strategy() -> impl Strategy<Value = EntryRef> {
        (prop::sample::select(EntryKind::ALL.to_vec()), 1i64..=3)
            .prop_map(|(kind, id)| EntryRef::new(kind, id))
    }

    fn links_strategy() -> impl Strategy<Value = Vec<Link>> {
        let endpoints = (
            entry_ref_strategy(),
            entry_ref_strategy(),
            prop::sample::select(RelationshipKind::ALL.to_vec()),
        )
            .prop_filter("self links are rejected on write", |(source, target, _)| {
                source != target
            });
        prop::collection::vec(endpoints, 0..=32).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(idx, (source, target, kind))| link(idx as i64 + 1, source, target, kind))
                .collect()
        })
    }

    fn all_entry_refs() -> Vec<EntryRef> {
        EntryKind::ALL
            .into_iter()
            .flat_map(|kind| (1..=3).map(move |id| EntryRef::new(kind, id)))
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            failure_persistence: None,
            ..ProptestConfig::default()
        })]

        #[test]
        fn pair_queries_are_symmetric_and_agree(links in links_strategy()) {
            let index = LinkIndex::new(&links);
            let entries = all_entry_refs();
            for &a in &entries {
                for &b in &entries {
                    prop_assert_eq!(index.are_linked(a, b), index.are_linked(b, a));
                    prop_assert_eq!(
                        index.relationship_between(a, b).is_some(),
                        index.are_linked(a, b)
                    );
                }
            }
        }

        #[test]
        fn counts_match_touching_links(links in links_strategy()) {
            let index = LinkIndex::new(&links);
            for entry in all_entry_refs() {
                let touching = links
                    .iter()
                    .filter(|link| link.source == entry || link.target == entry)
                    .count();
                prop_assert_eq!(index.count_links_for(entry), touching);
                prop_assert_eq!(index.links_for(entry).len(), touching);
                prop_assert_eq!(index.linked_entries(entry).len(), touching);
            }
        }

        #[test]
        fn removing_a_link_decrements_both_endpoints_once(
            links in links_strategy().prop_filter("need a link", |links| !links.is_empty()),
            pick in any::<prop::sample::Index>(),
        ) {
            let removed = links[pick.index(links.len())].clone();
            let remaining: Vec<Link> = links
                .iter()
                .filter(|link| link.id != removed.id)
                .cloned()
                .collect();
            let before = LinkIndex::new(&links);
            let after = LinkIndex::new(&remaining);

            for entry in all_entry_refs() {
                let expected = if removed.touches(entry) {
                    before.count_links_for(entry) - 1
                } else {
                    before.count_links_for(entry)
                };
                prop_assert_eq!(after.count_links_for(entry), expected);
                prop_assert!(after.links_for(entry).iter().all(|link| link.id != removed.id));
            }
        }
    }
}
