//! Storage layer for cardbox.
//!
//! This module provides the SQLite-backed card repository: validated
//! create/read/update/delete/list operations plus deduplicated prefix
//! search over the `last_name` and `profession` indexes.

pub mod handle;
pub mod migrations;
pub mod schema;
pub mod search;

use std::path::Path;

use chrono::{DateTime, Duration, SecondsFormat, Timelike, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::{debug, warn};

use crate::card::{CardDraft, CardPatch, ContactCard};
use crate::config::Config;
use crate::error::{Error, Result};

use self::handle::{HandleManager, SharedHandle};

/// Repository of contact cards.
///
/// All operations acquire the shared store handle lazily, run inside a
/// transaction, and surface storage failures as storage-class errors,
/// distinct from validation and not-found conditions.
#[derive(Debug)]
pub struct CardRepository {
    manager: HandleManager,
}

impl CardRepository {
    /// Create a repository backed by the store at `path`.
    ///
    /// The store is opened on first use, not here.
    #[must_use]
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            manager: HandleManager::new(path.as_ref()),
        }
    }

    /// Create a repository backed by a transient in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            manager: HandleManager::in_memory(),
        }
    }

    /// Create a repository from loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            manager: HandleManager::new(config.database_path())
                .with_busy_timeout(config.busy_timeout()),
        }
    }

    /// Get the path of the backing store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.manager.path()
    }

    /// Save a card, returning its id.
    ///
    /// Validates and normalizes the draft before any I/O, then writes in a
    /// single read-write transaction: a draft without an id inserts a new
    /// card with a storage-assigned id, a draft with an id replaces that
    /// card. The transaction commits before the future resolves.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a missing first or last name, or a
    /// storage error if the write fails.
    pub async fn save(&self, draft: CardDraft) -> Result<i64> {
        let card = draft.normalize(Utc::now())?;

        let handle = self.manager.handle().await?;
        let mut conn = handle.lock().await;
        let tx = conn.transaction()?;
        tx.execute(
            r"
            INSERT OR REPLACE INTO cards
                (id, first_name, last_name, profession, title, address,
                 email, phone, logo_url, qr_code_url, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ",
            params![
                card.id,
                card.first_name,
                card.last_name,
                card.profession,
                card.title,
                card.address,
                card.email,
                card.phone,
                card.logo_url,
                card.qr_code_url,
                timestamp(card.created_at),
                timestamp(card.updated_at),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        debug!("saved card {}", id);
        Ok(id)
    }

    /// Get a card by its id.
    ///
    /// Absence is reported as `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails.
    pub async fn get(&self, id: i64) -> Result<Option<ContactCard>> {
        let handle = self.manager.handle().await?;
        let conn = handle.lock().await;
        let card = conn
            .query_row(
                r"
                SELECT id, first_name, last_name, profession, title, address,
                       email, phone, logo_url, qr_code_url, created_at, updated_at
                FROM cards WHERE id = ?1
                ",
                [id],
                row_to_card,
            )
            .optional()?;
        Ok(card)
    }

    /// List all cards ordered by creation time, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails.
    pub async fn list(&self) -> Result<Vec<ContactCard>> {
        let handle = self.manager.handle().await?;
        let conn = handle.lock().await;
        let mut stmt = conn.prepare(
            r"
            SELECT id, first_name, last_name, profession, title, address,
                   email, phone, logo_url, qr_code_url, created_at, updated_at
            FROM cards ORDER BY created_at ASC
            ",
        )?;
        let cards = stmt
            .query_map([], row_to_card)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(cards)
    }

    /// Apply a partial update to the card with the given id.
    ///
    /// The read and the write happen inside one transaction while holding
    /// the store lock, so interleaved updates cannot lose fields. The merge
    /// follows [`CardPatch::apply_to`]; `updated_at` strictly increases
    /// across successive writes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no card has this id, or a storage
    /// error if the transaction fails.
    pub async fn update(&self, id: i64, patch: CardPatch) -> Result<ContactCard> {
        let handle = self.manager.handle().await?;
        let mut conn = handle.lock().await;
        let tx = conn.transaction()?;

        let existing = tx
            .query_row(
                r"
                SELECT id, first_name, last_name, profession, title, address,
                       email, phone, logo_url, qr_code_url, created_at, updated_at
                FROM cards WHERE id = ?1
                ",
                [id],
                row_to_card,
            )
            .optional()?
            .ok_or(Error::NotFound { id })?;

        // Timestamps persist at microsecond precision; nudge the stamp when
        // the clock has not visibly advanced so updated_at still increases,
        // and truncate so the returned card equals what a later read sees.
        let stamp = truncate_to_micros(std::cmp::max(
            Utc::now(),
            existing.updated_at + Duration::microseconds(1),
        ));
        let merged = patch.apply_to(&existing, stamp);

        tx.execute(
            r"
            UPDATE cards SET
                first_name = ?2, last_name = ?3, profession = ?4, title = ?5,
                address = ?6, email = ?7, phone = ?8, logo_url = ?9,
                qr_code_url = ?10, updated_at = ?11
            WHERE id = ?1
            ",
            params![
                id,
                merged.first_name,
                merged.last_name,
                merged.profession,
                merged.title,
                merged.address,
                merged.email,
                merged.phone,
                merged.logo_url,
                merged.qr_code_url,
                timestamp(merged.updated_at),
            ],
        )?;
        tx.commit()?;

        debug!("updated card {}", id);
        Ok(merged)
    }

    /// Delete a card by its id.
    ///
    /// Idempotent: deleting an id with no matching card succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let handle = self.manager.handle().await?;
        let mut conn = handle.lock().await;
        let tx = conn.transaction()?;
        let affected = tx.execute("DELETE FROM cards WHERE id = ?1", [id])?;
        tx.commit()?;

        debug!("deleted card {} (affected {})", id, affected);
        Ok(())
    }

    /// Search cards whose `last_name` or `profession` starts with `query`.
    ///
    /// The query is case-folded, then two bounded range scans run against
    /// the two indexes, issued concurrently and joined. Results are the
    /// deduplicated union keyed by id; order beyond that is unspecified.
    /// No ranking, fuzzy matching, or tokenization.
    ///
    /// # Errors
    ///
    /// Returns an error if either scan fails.
    pub async fn search(&self, query: &str) -> Result<Vec<ContactCard>> {
        let (lower, upper) = search::prefix_bounds(query);
        let handle = self.manager.handle().await?;

        let (by_last_name, by_profession) = tokio::join!(
            scan_index(&handle, "last_name", &lower, &upper),
            scan_index(&handle, "profession", &lower, &upper),
        );

        Ok(search::merge_by_id(vec![by_last_name?, by_profession?]))
    }
}

/// Run one bounded range scan against a secondary index.
async fn scan_index(
    handle: &SharedHandle,
    field: &str,
    lower: &str,
    upper: &str,
) -> Result<Vec<ContactCard>> {
    let conn = handle.lock().await;
    let sql = format!(
        "SELECT id, first_name, last_name, profession, title, address, \
         email, phone, logo_url, qr_code_url, created_at, updated_at \
         FROM cards WHERE {field} >= ?1 AND {field} <= ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let cards = stmt
        .query_map(params![lower, upper], row_to_card)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(cards)
}

/// Format a timestamp for storage.
///
/// Fixed-width UTC RFC 3339 with microseconds, so lexicographic index order
/// matches chronological order.
fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Convert a store row to a `ContactCard`.
fn row_to_card(row: &rusqlite::Row) -> rusqlite::Result<ContactCard> {
    let created_at: String = row.get(10)?;
    let updated_at: String = row.get(11)?;

    Ok(ContactCard {
        id: Some(row.get(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        profession: row.get(3)?,
        title: row.get(4)?,
        address: row.get(5)?,
        email: row.get(6)?,
        phone: row.get(7)?,
        logo_url: row.get(8)?,
        qr_code_url: row.get(9)?,
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
    })
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(err) => {
            // Only reachable on a corrupted store; the fallback keeps the
            // row readable but perturbs created_at ordering, so leave a
            // trace of it.
            warn!("unparseable stored timestamp {:?} ({}), substituting current time", value, err);
            Utc::now()
        }
    }
}

/// Clamp a timestamp to stored (microsecond) precision.
fn truncate_to_micros(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(dt.nanosecond() / 1000 * 1000).unwrap_or(dt)
}
