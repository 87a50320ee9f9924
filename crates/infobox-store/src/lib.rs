//! Infobox Storage Layer
//!
//! Implements the [`ClaimStore`] and [`EntityLabelLookup`] traits on SQLite.
//!
//! # Architecture
//!
//! - `claims` holds one row per stored claim, with its target as JSON
//! - `qualifiers` holds the ordered qualifiers of each claim
//! - `labels` holds display labels per record and language
//!
//! Records are loaded from a JSON [`Snapshot`] of the knowledge base; the
//! import planner only ever reads them.
//!
//! # Examples
//!
//! ```
//! use infobox_domain::{ClaimStore, EntityId, EntityLabelLookup};
//! use infobox_store::SqliteStore;
//!
//! let mut store = SqliteStore::new(":memory:").unwrap();
//! store.import_json(r#"{ "entities": { "Q7": { "labels": { "en": "Example Person" } } } }"#).unwrap();
//!
//! let id = EntityId::parse("Q7").unwrap();
//! assert_eq!(store.lookup(&id).unwrap().label, "Example Person");
//! assert!(store.existing_claims(&id).unwrap().is_empty());
//! ```

#![warn(missing_docs)]

mod snapshot;

pub use snapshot::{EntitySnapshot, Snapshot};

use infobox_domain::{
    ClaimStore, ClaimTarget, EntityId, EntityLabel, EntityLabelLookup, LookupError, PropertyId,
    Qualifier, StoredClaim,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Preferred label language when a record has several
const DEFAULT_LABEL_LANGUAGE: &str = "en";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Snapshot or stored target could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Snapshot file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// SQLite-based implementation of ClaimStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    /// Set the label of `entity` in `label.language`, replacing any previous one
    pub fn set_label(&self, entity: &EntityId, label: &EntityLabel) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO labels (entity, language, label) VALUES (?1, ?2, ?3)
             ON CONFLICT(entity, language) DO UPDATE SET label = excluded.label",
            params![entity.as_str(), &label.language, &label.label],
        )?;
        Ok(())
    }

    /// Store a claim of `entity`; returns its row number
    pub fn add_claim(&self, entity: &EntityId, claim: &StoredClaim) -> Result<i64, StoreError> {
        Self::insert_claim(&self.conn, entity, claim)
    }

    /// Load every record of a snapshot in one transaction
    ///
    /// Claims are appended; labels replace existing ones. Returns the number
    /// of claims stored.
    pub fn import_snapshot(&mut self, snapshot: &Snapshot) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        let mut claims = 0;

        for (entity, record) in &snapshot.entities {
            for (language, label) in &record.labels {
                tx.execute(
                    "INSERT INTO labels (entity, language, label) VALUES (?1, ?2, ?3)
                     ON CONFLICT(entity, language) DO UPDATE SET label = excluded.label",
                    params![entity.as_str(), language, label],
                )?;
            }
            for claim in &record.claims {
                Self::insert_claim(&tx, entity, claim)?;
                claims += 1;
            }
        }

        tx.commit()?;
        info!("Imported {} records, {} claims", snapshot.entities.len(), claims);
        Ok(claims)
    }

    /// Load a snapshot from JSON text
    pub fn import_json(&mut self, json: &str) -> Result<usize, StoreError> {
        let snapshot = Snapshot::from_json(json)?;
        self.import_snapshot(&snapshot)
    }

    /// Load a snapshot from a JSON file
    pub fn import_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, StoreError> {
        let json = std::fs::read_to_string(path)?;
        self.import_json(&json)
    }

    /// Ids of every record with labels or claims
    pub fn entities(&self) -> Result<Vec<EntityId>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT entity FROM labels UNION SELECT entity FROM claims ORDER BY entity",
        )?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        ids.iter()
            .map(|id| EntityId::parse(id).map_err(|e| StoreError::InvalidData(e.to_string())))
            .collect()
    }

    fn insert_claim(conn: &Connection, entity: &EntityId, claim: &StoredClaim) -> Result<i64, StoreError> {
        let target = serde_json::to_string(&claim.target)?;
        conn.execute(
            "INSERT INTO claims (entity, statement_id, property, target) VALUES (?1, ?2, ?3, ?4)",
            params![entity.as_str(), &claim.id, claim.property.as_str(), &target],
        )?;
        let seq = conn.last_insert_rowid();

        for (position, qualifier) in claim.qualifiers.iter().enumerate() {
            let target = serde_json::to_string(&qualifier.target)?;
            conn.execute(
                "INSERT INTO qualifiers (claim, position, property, target) VALUES (?1, ?2, ?3, ?4)",
                params![seq, position as i64, qualifier.property.as_str(), &target],
            )?;
        }

        debug!("Stored {} {} = {}", entity, claim.property, claim.target);
        Ok(seq)
    }

    fn qualifiers_of(&self, seq: i64) -> Result<Vec<Qualifier>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT property, target FROM qualifiers WHERE claim = ?1 ORDER BY position",
        )?;
        let rows = stmt
            .query_map(params![seq], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(property, target)| {
                Ok(Qualifier {
                    property: parse_property(&property)?,
                    target: serde_json::from_str::<ClaimTarget>(&target)?,
                })
            })
            .collect()
    }
}

fn parse_property(raw: &str) -> Result<PropertyId, StoreError> {
    PropertyId::parse(raw).map_err(|e| StoreError::InvalidData(e.to_string()))
}

impl ClaimStore for SqliteStore {
    type Error = StoreError;

    fn existing_claims(&self, entity: &EntityId) -> Result<Vec<StoredClaim>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT seq, statement_id, property, target FROM claims WHERE entity = ?1 ORDER BY seq",
        )?;
        let rows = stmt
            .query_map(params![entity.as_str()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(seq, id, property, target)| {
                Ok(StoredClaim {
                    id,
                    property: parse_property(&property)?,
                    target: serde_json::from_str(&target)?,
                    qualifiers: self.qualifiers_of(seq)?,
                })
            })
            .collect()
    }
}

impl EntityLabelLookup for SqliteStore {
    /// The English label if present, otherwise the first by language code
    fn lookup(&self, entity: &EntityId) -> Result<EntityLabel, LookupError> {
        self.conn
            .query_row(
                "SELECT label, language FROM labels WHERE entity = ?1
                 ORDER BY language = ?2 DESC, language LIMIT 1",
                params![entity.as_str(), DEFAULT_LABEL_LANGUAGE],
                |row| Ok(EntityLabel::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()
            .map_err(|e| LookupError::Unavailable(e.to_string()))?
            .ok_or_else(|| LookupError::NotFound(entity.clone()))
    }
}
