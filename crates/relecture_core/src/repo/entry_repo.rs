//! Entry repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped CRUD over the five entry tables.
//! - Map each `EntryBody` variant to its own table and columns.
//!
//! # Invariants
//! - Every statement filters on `owner`; rows of other users are invisible.
//! - Writes call `NewEntry::validate()` before SQL mutations.
//! - Deleting an entry leaves links pointing at it untouched.
//! - Listing order is `occurred_on DESC, id DESC`.

use crate::db::DbError;
use crate::model::entry::{
    Entry, EntryBody, EntryKind, EntryRef, EntryValidationError, Grace, MissionaryEncounter,
    NewEntry, Prayer, PropheticWord, ScriptureWord,
};
use crate::model::link::{LinkId, LinkValidationError};
use crate::model::session::UserId;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by entry and link persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(EntryValidationError),
    LinkValidation(LinkValidationError),
    Db(DbError),
    EntryNotFound(EntryRef),
    LinkNotFound(LinkId),
    InvalidData(String),
    /// Connection schema is not at the version this build expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::LinkValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::EntryNotFound(entry) => write!(f, "entry not found: {entry}"),
            Self::LinkNotFound(id) => write!(f, "link not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted journal data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "journal repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "journal repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::LinkValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EntryValidationError> for RepoError {
    fn from(value: EntryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<LinkValidationError> for RepoError {
    fn from(value: LinkValidationError) -> Self {
        Self::LinkValidation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Select-with-filter options for one entry kind.
#[derive(Debug, Clone)]
pub struct EntryListQuery {
    pub owner: UserId,
    pub kind: EntryKind,
    /// Inclusive lower bound on `occurred_on`.
    pub occurred_from: Option<NaiveDate>,
    /// Inclusive upper bound on `occurred_on`.
    pub occurred_to: Option<NaiveDate>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl EntryListQuery {
    /// Unpaginated query for all entries of `kind` owned by `owner`.
    pub fn all(owner: UserId, kind: EntryKind) -> Self {
        Self {
            owner,
            kind,
            occurred_from: None,
            occurred_to: None,
            limit: None,
            offset: 0,
        }
    }
}

/// Repository interface for entry CRUD.
pub trait EntryRepository {
    fn create_entry(&self, owner: UserId, entry: &NewEntry) -> RepoResult<EntryRef>;
    /// Replaces date and content of an existing entry of the same kind.
    fn update_entry(&self, owner: UserId, entry: EntryRef, update: &NewEntry) -> RepoResult<()>;
    fn get_entry(&self, owner: UserId, entry: EntryRef) -> RepoResult<Option<Entry>>;
    fn list_entries(&self, query: &EntryListQuery) -> RepoResult<Vec<Entry>>;
    /// Hard-deletes one entry. Links referencing it are kept.
    fn delete_entry(&self, owner: UserId, entry: EntryRef) -> RepoResult<()>;
}

/// SQLite-backed entry repository.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    /// Wraps a connection opened through `db::open_db*`.
    ///
    /// # Errors
    /// - `UninitializedConnection` / `MissingRequiredTable` for raw or stale
    ///   connections.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let tables: Vec<&'static str> = EntryKind::ALL.into_iter().map(table_name).collect();
        super::ensure_connection_ready(conn, &tables)?;
        Ok(Self { conn })
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn create_entry(&self, owner: UserId, entry: &NewEntry) -> RepoResult<EntryRef> {
        entry.validate()?;

        let kind = entry.kind();
        let columns = body_columns(kind);
        let placeholders = (0..columns.len() + 2)
            .map(|idx| format!("?{}", idx + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} (owner, occurred_on, {}) VALUES ({placeholders});",
            table_name(kind),
            columns.join(", ")
        );

        let mut values = vec![
            Value::Text(owner.to_string()),
            date_value(entry.occurred_on),
        ];
        values.extend(body_values(&entry.body)?);

        self.conn.execute(&sql, params_from_iter(values))?;
        Ok(EntryRef::new(kind, self.conn.last_insert_rowid()))
    }

    fn update_entry(&self, owner: UserId, entry: EntryRef, update: &NewEntry) -> RepoResult<()> {
        if update.kind() != entry.kind {
            return Err(EntryValidationError::KindChanged {
                stored: entry.kind,
                requested: update.kind(),
            }
            .into());
        }
        update.validate()?;

        let columns = body_columns(entry.kind);
        let assignments = columns
            .iter()
            .enumerate()
            .map(|(idx, column)| format!("{column} = ?{}", idx + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let id_slot = columns.len() + 2;
        let sql = format!(
            "UPDATE {}
             SET
                occurred_on = ?1,
                {assignments},
                updated_at = (CAST(strftime('%s', 'now') AS INTEGER) * 1000)
             WHERE id = ?{id_slot} AND owner = ?{};",
            table_name(entry.kind),
            id_slot + 1
        );

        let mut values = vec![date_value(update.occurred_on)];
        values.extend(body_values(&update.body)?);
        values.push(Value::Integer(entry.id));
        values.push(Value::Text(owner.to_string()));

        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        if changed == 0 {
            return Err(RepoError::EntryNotFound(entry));
        }
        Ok(())
    }

    fn get_entry(&self, owner: UserId, entry: EntryRef) -> RepoResult<Option<Entry>> {
        let sql = format!(
            "{} WHERE id = ?1 AND owner = ?2;",
            select_sql(entry.kind)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(rusqlite::params![entry.id, owner.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_entry_row(entry.kind, row)?));
        }
        Ok(None)
    }

    fn list_entries(&self, query: &EntryListQuery) -> RepoResult<Vec<Entry>> {
        let mut sql = format!("{} WHERE owner = ?", select_sql(query.kind));
        let mut bind_values: Vec<Value> = vec![Value::Text(query.owner.to_string())];

        if let Some(from) = query.occurred_from {
            sql.push_str(" AND occurred_on >= ?");
            bind_values.push(date_value(from));
        }
        if let Some(to) = query.occurred_to {
            sql.push_str(" AND occurred_on <= ?");
            bind_values.push(date_value(to));
        }

        sql.push_str(" ORDER BY occurred_on DESC, id DESC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(query.kind, row)?);
        }
        Ok(entries)
    }

    fn delete_entry(&self, owner: UserId, entry: EntryRef) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!(
                "DELETE FROM {} WHERE id = ?1 AND owner = ?2;",
                table_name(entry.kind)
            ),
            rusqlite::params![entry.id, owner.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::EntryNotFound(entry));
        }
        Ok(())
    }
}

/// Storage table backing one entry kind.
pub fn table_name(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Grace => "graces",
        EntryKind::Prayer => "prayers",
        EntryKind::ScriptureWord => "scripture_words",
        EntryKind::PropheticWord => "prophetic_words",
        EntryKind::MissionaryEncounter => "missionary_encounters",
    }
}

fn body_columns(kind: EntryKind) -> &'static [&'static str] {
    match kind {
        EntryKind::Grace => &["title", "description", "people", "location"],
        EntryKind::Prayer => &["intention", "people", "answered_on", "answer_notes"],
        EntryKind::ScriptureWord => &["reference", "text", "context"],
        EntryKind::PropheticWord => &["text", "received_from", "fulfilled_on", "fulfillment_notes"],
        EntryKind::MissionaryEncounter => &["person_name", "location", "story", "follow_up"],
    }
}

fn select_sql(kind: EntryKind) -> String {
    format!(
        "SELECT id, owner, occurred_on, created_at, {} FROM {}",
        body_columns(kind).join(", "),
        table_name(kind)
    )
}

/// Bind values in `body_columns` order.
fn body_values(body: &EntryBody) -> RepoResult<Vec<Value>> {
    let values = match body {
        EntryBody::Grace(grace) => vec![
            Value::Text(grace.title.trim().to_string()),
            Value::Text(grace.description.clone()),
            people_value(&grace.people)?,
            opt_text(&grace.location),
        ],
        EntryBody::Prayer(prayer) => vec![
            Value::Text(prayer.intention.trim().to_string()),
            people_value(&prayer.people)?,
            opt_date(prayer.answered_on),
            opt_text(&prayer.answer_notes),
        ],
        EntryBody::ScriptureWord(word) => vec![
            Value::Text(word.reference.trim().to_string()),
            Value::Text(word.text.clone()),
            opt_text(&word.context),
        ],
        EntryBody::PropheticWord(word) => vec![
            Value::Text(word.text.clone()),
            opt_text(&word.received_from),
            opt_date(word.fulfilled_on),
            opt_text(&word.fulfillment_notes),
        ],
        EntryBody::MissionaryEncounter(encounter) => vec![
            Value::Text(encounter.person_name.trim().to_string()),
            opt_text(&encounter.location),
            Value::Text(encounter.story.clone()),
            opt_text(&encounter.follow_up),
        ],
    };
    Ok(values)
}

fn parse_entry_row(kind: EntryKind, row: &Row<'_>) -> RepoResult<Entry> {
    let table = table_name(kind);
    let owner_text: String = row.get("owner")?;
    let owner = Uuid::parse_str(&owner_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid owner `{owner_text}` in {table}.owner"))
    })?;

    let body = match kind {
        EntryKind::Grace => EntryBody::Grace(Grace {
            title: row.get("title")?,
            description: row.get("description")?,
            people: parse_people(table, row)?,
            location: row.get("location")?,
        }),
        EntryKind::Prayer => EntryBody::Prayer(Prayer {
            intention: row.get("intention")?,
            people: parse_people(table, row)?,
            answered_on: row.get("answered_on")?,
            answer_notes: row.get("answer_notes")?,
        }),
        EntryKind::ScriptureWord => EntryBody::ScriptureWord(ScriptureWord {
            reference: row.get("reference")?,
            text: row.get("text")?,
            context: row.get("context")?,
        }),
        EntryKind::PropheticWord => EntryBody::PropheticWord(PropheticWord {
            text: row.get("text")?,
            received_from: row.get("received_from")?,
            fulfilled_on: row.get("fulfilled_on")?,
            fulfillment_notes: row.get("fulfillment_notes")?,
        }),
        EntryKind::MissionaryEncounter => EntryBody::MissionaryEncounter(MissionaryEncounter {
            person_name: row.get("person_name")?,
            location: row.get("location")?,
            story: row.get("story")?,
            follow_up: row.get("follow_up")?,
        }),
    };

    let entry = Entry {
        id: row.get("id")?,
        owner,
        occurred_on: row.get("occurred_on")?,
        created_at: row.get("created_at")?,
        body,
    };
    entry.validate()?;
    Ok(entry)
}

fn parse_people(table: &str, row: &Row<'_>) -> RepoResult<Vec<String>> {
    let raw: String = row.get("people")?;
    serde_json::from_str(&raw).map_err(|err| {
        RepoError::InvalidData(format!("invalid people list in {table}.people: {err}"))
    })
}

fn people_value(people: &[String]) -> RepoResult<Value> {
    let names: Vec<&str> = people
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .collect();
    serde_json::to_string(&names)
        .map(Value::Text)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode people list: {err}")))
}

fn date_value(date: NaiveDate) -> Value {
    Value::Text(date.format("%Y-%m-%d").to_string())
}

fn opt_date(date: Option<NaiveDate>) -> Value {
    date.map_or(Value::Null, date_value)
}

fn opt_text(value: &Option<String>) -> Value {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Value::Text(text.to_string()),
        _ => Value::Null,
    }
}
