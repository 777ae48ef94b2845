use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use relecture_core::db::open_db_in_memory;
use relecture_core::{
    pick_reminder, render, Entry, EntryBody, EntryKind, EntryListQuery, EntryRef,
    EntryRepository, FixedSessionProvider, Grace, LinkAuthoringPanel, LinkService, LoadSource,
    MissionaryEncounter, NewEntry, PanelState, Prayer, PropheticWord, RelationshipKind,
    ReminderCategory, ReminderPolicy, RepoError, RepoResult, ReviewLayout, ReviewLoadError,
    ReviewService, ReviewSnapshot, ReviewState, ScriptureWord, Session, SqliteEntryRepository,
    SqliteLinkRepository, SubmitOutcome, Theme, UserId, ViewMode,
};
use rusqlite::Connection;
use uuid::Uuid;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct Seeded {
    grace: EntryRef,
    prayer: EntryRef,
    answered: EntryRef,
    word: EntryRef,
    prophecy: EntryRef,
    encounter: EntryRef,
}

fn seed(conn: &Connection, session: &Session) -> Seeded {
    let repo = SqliteEntryRepository::try_new(conn).unwrap();
    let create = |on: NaiveDate, body: EntryBody| {
        repo.create_entry(session.user_id, &NewEntry::new(on, body))
            .unwrap()
    };

    let grace = create(
        day(2024, 4, 10),
        EntryBody::Grace(Grace {
            title: "peace after confession".to_string(),
            description: String::new(),
            people: Vec::new(),
            location: None,
        }),
    );
    let prayer = create(
        day(2024, 1, 5),
        EntryBody::Prayer(Prayer {
            intention: "reconciliation with my brother".to_string(),
            people: vec!["Jean".to_string()],
            answered_on: None,
            answer_notes: None,
        }),
    );
    let answered = create(
        day(2024, 2, 1),
        EntryBody::Prayer(Prayer {
            intention: "a flat near work".to_string(),
            people: Vec::new(),
            answered_on: Some(day(2024, 3, 1)),
            answer_notes: None,
        }),
    );
    let word = create(
        day(2024, 3, 20),
        EntryBody::ScriptureWord(ScriptureWord {
            reference: "Ps 23:1".to_string(),
            text: "Le Seigneur est mon berger.".to_string(),
            context: None,
        }),
    );
    let prophecy = create(
        day(2024, 2, 14),
        EntryBody::PropheticWord(PropheticWord {
            text: "Your family will be gathered.".to_string(),
            received_from: None,
            fulfilled_on: None,
            fulfillment_notes: None,
        }),
    );
    let encounter = create(
        day(2024, 5, 2),
        EntryBody::MissionaryEncounter(MissionaryEncounter {
            person_name: "Sami".to_string(),
            location: None,
            story: "Talked about hope on the bus.".to_string(),
            follow_up: None,
        }),
    );

    Seeded {
        grace,
        prayer,
        answered,
        word,
        prophecy,
        encounter,
    }
}

fn load(conn: &Connection, session: &Session) -> ReviewSnapshot {
    ReviewService::new(
        SqliteEntryRepository::try_new(conn).unwrap(),
        SqliteLinkRepository::try_new(conn).unwrap(),
    )
    .load(session)
}

fn state(mode: ViewMode) -> ReviewState {
    let mut state = ReviewState::new();
    state.select_mode(mode);
    state
}

#[test]
fn chronological_view_is_newest_first_with_link_counts() {
    let conn = open_db_in_memory().unwrap();
    let session = Session::new(Uuid::new_v4());
    let seeded = seed(&conn, &session);
    let links = LinkService::new(SqliteLinkRepository::try_new(&conn).unwrap());
    links
        .create_link(
            &session,
            &relecture_core::LinkDraft {
                source: Some(seeded.grace),
                target: Some(seeded.prayer),
                kind: Some(RelationshipKind::Exauce),
                description: "first step".to_string(),
            },
        )
        .unwrap();

    let snapshot = load(&conn, &session);
    assert!(snapshot.is_complete());
    let ReviewLayout::Chronological(items) = render(&snapshot, &ReviewState::new()) else {
        panic!("default view must be chronological");
    };

    let order: Vec<EntryRef> = items.iter().map(|item| item.entry_ref()).collect();
    assert_eq!(
        order,
        vec![
            seeded.encounter,
            seeded.grace,
            seeded.word,
            seeded.prophecy,
            seeded.answered,
            seeded.prayer,
        ]
    );
    let grace_item = items
        .iter()
        .find(|item| item.entry_ref() == seeded.grace)
        .unwrap();
    assert_eq!(grace_item.link_count, 1);
    assert!(items
        .iter()
        .filter(|item| item.entry_ref() == seeded.word)
        .all(|item| item.link_count == 0));
}

#[test]
fn hover_highlights_only_linked_entries() {
    let conn = open_db_in_memory().unwrap();
    let session = Session::new(Uuid::new_v4());
    let seeded = seed(&conn, &session);
    let links = LinkService::new(SqliteLinkRepository::try_new(&conn).unwrap());
    links
        .create_link(
            &session,
            &relecture_core::LinkDraft {
                source: Some(seeded.word),
                target: Some(seeded.prophecy),
                kind: Some(RelationshipKind::Eclaire),
                description: String::new(),
            },
        )
        .unwrap();

    let snapshot = load(&conn, &session);
    let mut review = ReviewState::new();
    review.hover(seeded.prophecy);
    let ReviewLayout::Chronological(items) = render(&snapshot, &review) else {
        panic!("chronological expected");
    };

    let highlighted: Vec<EntryRef> = items
        .iter()
        .filter(|item| item.linked_to_hovered)
        .map(|item| item.entry_ref())
        .collect();
    assert_eq!(highlighted, vec![seeded.word]);
}

#[test]
fn thematic_and_consolation_views_group_and_filter() {
    let conn = open_db_in_memory().unwrap();
    let session = Session::new(Uuid::new_v4());
    let seeded = seed(&conn, &session);
    let snapshot = load(&conn, &session);

    let ReviewLayout::Thematic(groups) = render(&snapshot, &state(ViewMode::Thematic)) else {
        panic!("thematic expected");
    };
    let themes: Vec<Theme> = groups.iter().map(|group| group.theme).collect();
    assert_eq!(
        themes,
        vec![Theme::Gratitude, Theme::Intercession, Theme::Word, Theme::Mission]
    );
    let words: Vec<EntryRef> = groups[2].items.iter().map(|item| item.entry_ref()).collect();
    assert_eq!(words, vec![seeded.word, seeded.prophecy]);

    let ReviewLayout::Consolations(items) = render(&snapshot, &state(ViewMode::Consolations))
    else {
        panic!("consolations expected");
    };
    let consolations: Vec<EntryRef> = items.iter().map(|item| item.entry_ref()).collect();
    assert_eq!(consolations, vec![seeded.grace, seeded.answered]);
}

#[test]
fn graph_views_stay_in_unit_square_and_skip_dangling_links() {
    let conn = open_db_in_memory().unwrap();
    let session = Session::new(Uuid::new_v4());
    let seeded = seed(&conn, &session);
    let links = LinkService::new(SqliteLinkRepository::try_new(&conn).unwrap());
    for (source, target) in [
        (seeded.grace, seeded.prayer),
        (seeded.encounter, seeded.word),
    ] {
        links
            .create_link(
                &session,
                &relecture_core::LinkDraft {
                    source: Some(source),
                    target: Some(target),
                    kind: Some(RelationshipKind::Echo),
                    description: String::new(),
                },
            )
            .unwrap();
    }
    SqliteEntryRepository::try_new(&conn)
        .unwrap()
        .delete_entry(session.user_id, seeded.encounter)
        .unwrap();

    let snapshot = load(&conn, &session);
    assert_eq!(snapshot.links.len(), 2);

    for mode in [ViewMode::River, ViewMode::Constellation] {
        let graph = match render(&snapshot, &state(mode)) {
            ReviewLayout::River(graph) | ReviewLayout::Constellation(graph) => graph,
            other => panic!("graph layout expected, got {:?}", other.mode()),
        };
        assert_eq!(graph.nodes.len(), 5);
        assert!(graph
            .nodes
            .iter()
            .all(|node| (0.0..=1.0).contains(&node.x) && (0.0..=1.0).contains(&node.y)));
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].source, seeded.grace);
    }

    let ReviewLayout::River(river) = render(&snapshot, &state(ViewMode::River)) else {
        panic!("river expected");
    };
    assert_eq!(river.nodes[0].item.entry_ref(), seeded.prayer);
    assert_eq!(river.nodes[0].x, 0.0);
    assert_eq!(river.nodes[4].x, 1.0);
}

#[test]
fn constellation_pulls_linked_entries_toward_centre() {
    let conn = open_db_in_memory().unwrap();
    let session = Session::new(Uuid::new_v4());
    let seeded = seed(&conn, &session);
    let links = LinkService::new(SqliteLinkRepository::try_new(&conn).unwrap());
    links
        .create_link(
            &session,
            &relecture_core::LinkDraft {
                source: Some(seeded.answered),
                target: Some(seeded.word),
                kind: Some(RelationshipKind::Decoule),
                description: String::new(),
            },
        )
        .unwrap();

    let snapshot = load(&conn, &session);
    let ReviewLayout::Constellation(graph) = render(&snapshot, &state(ViewMode::Constellation))
    else {
        panic!("constellation expected");
    };
    let radius = |entry: EntryRef| {
        let node = graph
            .nodes
            .iter()
            .find(|node| node.item.entry_ref() == entry)
            .unwrap();
        ((node.x - 0.5).powi(2) + (node.y - 0.5).powi(2)).sqrt()
    };
    assert!(radius(seeded.answered) < radius(seeded.prayer));
}

#[test]
fn authoring_panel_closes_on_success_and_stays_open_on_failure() {
    let conn = open_db_in_memory().unwrap();
    let session = Session::new(Uuid::new_v4());
    let seeded = seed(&conn, &session);
    let service = LinkService::new(SqliteLinkRepository::try_new(&conn).unwrap());
    let mut panel = LinkAuthoringPanel::new();

    assert_eq!(panel.submit(&service, &session), SubmitOutcome::NotOpen);

    panel.open(Some(seeded.prophecy));
    panel.select_kind("accomplit").unwrap();
    let rejected = panel.submit(&service, &session);
    assert!(matches!(rejected, SubmitOutcome::Rejected(_)));
    assert!(!rejected.requires_reload());
    assert!(panel.is_open());
    assert!(panel.error().unwrap().contains("destination"));

    panel.set_target(seeded.grace);
    assert_eq!(panel.error(), None);
    panel.set_description("the family reunion");
    let saved = panel.submit(&service, &session);
    assert!(saved.requires_reload());
    assert_eq!(panel.state(), &PanelState::Closed);

    let SubmitOutcome::Saved(link) = saved else {
        panic!("saved expected");
    };
    assert_eq!(link.source, seeded.prophecy);
    assert_eq!(link.target, seeded.grace);
    assert_eq!(link.description, "the family reunion");

    let reloaded = load(&conn, &session);
    assert_eq!(reloaded.links.len(), 1);
    assert_eq!(reloaded.recent_links[0].id, link.id);
}

struct FailingPrayers<'conn> {
    inner: SqliteEntryRepository<'conn>,
}

impl EntryRepository for FailingPrayers<'_> {
    fn create_entry(&self, owner: UserId, entry: &NewEntry) -> RepoResult<EntryRef> {
        self.inner.create_entry(owner, entry)
    }

    fn update_entry(&self, owner: UserId, entry: EntryRef, update: &NewEntry) -> RepoResult<()> {
        self.inner.update_entry(owner, entry, update)
    }

    fn get_entry(&self, owner: UserId, entry: EntryRef) -> RepoResult<Option<Entry>> {
        self.inner.get_entry(owner, entry)
    }

    fn list_entries(&self, query: &EntryListQuery) -> RepoResult<Vec<Entry>> {
        if query.kind == EntryKind::Prayer {
            return Err(RepoError::InvalidData("prayers unavailable".to_string()));
        }
        self.inner.list_entries(query)
    }

    fn delete_entry(&self, owner: UserId, entry: EntryRef) -> RepoResult<()> {
        self.inner.delete_entry(owner, entry)
    }
}

#[test]
fn one_failed_fetch_does_not_abort_the_others() {
    let conn = open_db_in_memory().unwrap();
    let session = Session::new(Uuid::new_v4());
    seed(&conn, &session);

    let service = ReviewService::new(
        FailingPrayers {
            inner: SqliteEntryRepository::try_new(&conn).unwrap(),
        },
        SqliteLinkRepository::try_new(&conn).unwrap(),
    );
    let snapshot = service.load(&session);

    assert!(!snapshot.is_complete());
    assert_eq!(snapshot.failures.len(), 1);
    assert_eq!(snapshot.failures[0].source, LoadSource::Entries(EntryKind::Prayer));
    assert_eq!(snapshot.entries.len(), 4);
    assert!(snapshot
        .entries
        .iter()
        .all(|entry| entry.kind() != EntryKind::Prayer));
}

#[test]
fn review_requires_a_signed_in_user() {
    let conn = open_db_in_memory().unwrap();
    let session = Session::new(Uuid::new_v4());
    seed(&conn, &session);
    let service = ReviewService::new(
        SqliteEntryRepository::try_new(&conn).unwrap(),
        SqliteLinkRepository::try_new(&conn).unwrap(),
    );

    assert_eq!(
        service
            .load_current(&FixedSessionProvider::signed_out())
            .unwrap_err(),
        ReviewLoadError::SignedOut
    );
    let snapshot = service
        .load_current(&FixedSessionProvider::signed_in(session))
        .unwrap();
    assert_eq!(snapshot.entries.len(), 6);
}

#[test]
fn reminder_follows_injected_policy_and_rng() {
    let conn = open_db_in_memory().unwrap();
    let session = Session::new(Uuid::new_v4());
    let seeded = seed(&conn, &session);
    let snapshot = load(&conn, &session);
    let today = day(2024, 6, 1);

    let only_prayers = ReminderPolicy {
        stale_after_days: 30,
        prayer_weight: 1.0,
        grace_weight: 0.0,
        word_weight: 0.0,
    };
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let reminder = pick_reminder(&snapshot.entries, today, &only_prayers, &mut rng).unwrap();
        assert_eq!(reminder.category, ReminderCategory::Prayer);
        assert_eq!(reminder.entry.entry_ref(), seeded.prayer);
        assert_eq!(reminder.days_since, 148);
    }

    let words_only = ReminderPolicy {
        prayer_weight: 0.0,
        grace_weight: 0.0,
        word_weight: 1.0,
        ..only_prayers.clone()
    };
    let mut rng = StdRng::seed_from_u64(7);
    let first = pick_reminder(&snapshot.entries, today, &words_only, &mut rng).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let second = pick_reminder(&snapshot.entries, today, &words_only, &mut rng).unwrap();
    assert_eq!(first.entry.entry_ref(), second.entry.entry_ref());
    assert!([seeded.word, seeded.prophecy].contains(&first.entry.entry_ref()));

    let too_recent = ReminderPolicy {
        stale_after_days: 365,
        ..ReminderPolicy::default()
    };
    let mut rng = StdRng::seed_from_u64(1);
    assert!(pick_reminder(&snapshot.entries, today, &too_recent, &mut rng).is_none());
}
