//! Link repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist ordered entry-to-entry relationships per owner.
//! - Serve the full link set in insertion order and the most recent links.
//!
//! # Invariants
//! - No uniqueness on endpoint pairs: every insert creates a new row.
//! - Endpoints are not checked against the entry tables.
//! - `list_links` order is insertion order (`id ASC`).

use crate::model::entry::{EntryKind, EntryRef};
use crate::model::link::{Link, LinkId, NewLink, RelationshipKind};
use crate::model::session::UserId;
use crate::repo::entry_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const LINK_SELECT_SQL: &str = "SELECT
    id,
    owner,
    source_kind,
    source_id,
    target_kind,
    target_id,
    kind,
    description,
    created_at
FROM links";

/// Repository interface for link persistence.
pub trait LinkRepository {
    fn create_link(&self, owner: UserId, link: &NewLink) -> RepoResult<LinkId>;
    fn get_link(&self, owner: UserId, id: LinkId) -> RepoResult<Option<Link>>;
    /// All links of `owner`, oldest first.
    fn list_links(&self, owner: UserId) -> RepoResult<Vec<Link>>;
    /// The `limit` most recently inserted links of `owner`, newest first.
    fn list_recent_links(&self, owner: UserId, limit: u32) -> RepoResult<Vec<Link>>;
    fn delete_link(&self, owner: UserId, id: LinkId) -> RepoResult<()>;
}

/// SQLite-backed link repository.
pub struct SqliteLinkRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLinkRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        super::ensure_connection_ready(conn, &["links"])?;
        Ok(Self { conn })
    }
}

impl LinkRepository for SqliteLinkRepository<'_> {
    fn create_link(&self, owner: UserId, link: &NewLink) -> RepoResult<LinkId> {
        link.validate()?;

        self.conn.execute(
            "INSERT INTO links (
                owner,
                source_kind,
                source_id,
                target_kind,
                target_id,
                kind,
                description
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                owner.to_string(),
                link.source.kind.as_str(),
                link.source.id,
                link.target.kind.as_str(),
                link.target.id,
                link.kind.as_str(),
                link.description.as_str(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_link(&self, owner: UserId, id: LinkId) -> RepoResult<Option<Link>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LINK_SELECT_SQL} WHERE id = ?1 AND owner = ?2;"))?;
        let mut rows = stmt.query(params![id, owner.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_link_row(row)?));
        }
        Ok(None)
    }

    fn list_links(&self, owner: UserId) -> RepoResult<Vec<Link>> {
        self.query_links(
            &format!("{LINK_SELECT_SQL} WHERE owner = ?1 ORDER BY id ASC;"),
            params![owner.to_string()],
        )
    }

    fn list_recent_links(&self, owner: UserId, limit: u32) -> RepoResult<Vec<Link>> {
        self.query_links(
            &format!("{LINK_SELECT_SQL} WHERE owner = ?1 ORDER BY id DESC LIMIT ?2;"),
            params![owner.to_string(), i64::from(limit)],
        )
    }

    fn delete_link(&self, owner: UserId, id: LinkId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM links WHERE id = ?1 AND owner = ?2;",
            params![id, owner.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::LinkNotFound(id));
        }
        Ok(())
    }
}

impl SqliteLinkRepository<'_> {
    fn query_links(&self, sql: &str, bind: impl rusqlite::Params) -> RepoResult<Vec<Link>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        let mut links = Vec::new();
        while let Some(row) = rows.next()? {
            links.push(parse_link_row(row)?);
        }
        Ok(links)
    }
}

fn parse_link_row(row: &Row<'_>) -> RepoResult<Link> {
    let owner_text: String = row.get("owner")?;
    let owner = Uuid::parse_str(&owner_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid owner `{owner_text}` in links.owner"))
    })?;

    let kind_text: String = row.get("kind")?;
    let kind = RelationshipKind::parse(&kind_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid relationship `{kind_text}` in links.kind"))
    })?;

    Ok(Link {
        id: row.get("id")?,
        owner,
        source: parse_endpoint(row, "source_kind", "source_id")?,
        target: parse_endpoint(row, "target_kind", "target_id")?,
        kind,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_endpoint(
    row: &Row<'_>,
    kind_column: &'static str,
    id_column: &'static str,
) -> RepoResult<EntryRef> {
    let kind_text: String = row.get(kind_column)?;
    let kind = EntryKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid entry kind `{kind_text}` in links.{kind_column}"
        ))
    })?;
    Ok(EntryRef::new(kind, row.get(id_column)?))
}
