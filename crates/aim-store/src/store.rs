//! SQLite-backed store for processed submissions.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use aim_model::{OutputRecord, RawRecord};

use crate::error::{Result, StoreError};
use crate::hash::{canonical_json, content_hash};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS records (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    product_type TEXT NOT NULL,
    data         TEXT NOT NULL,
    output       TEXT,
    data_hash    TEXT NOT NULL UNIQUE,
    created_at   TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS records_product_type ON records (product_type);
";

const SELECT_COLUMNS: &str = "SELECT id, product_type, data, output, data_hash, created_at FROM records";

/// Result of a save attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { id: i64 },
    /// Identical content is already stored under `existing_id`.
    Duplicate { existing_id: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredRecord {
    pub id: i64,
    pub product_type: String,
    pub data: RawRecord,
    pub output: Option<OutputRecord>,
    pub data_hash: String,
    /// RFC 3339, UTC.
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total: usize,
    pub by_product: BTreeMap<String, usize>,
}

/// Records sharing an applicant name, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameGroup {
    pub name: String,
    pub ids: Vec<i64>,
}

struct StoredRow {
    id: i64,
    product_type: String,
    data: String,
    output: Option<String>,
    data_hash: String,
    created_at: String,
}

pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    /// Opens (creating if needed) the store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::init(conn)?;
        debug!(path = %path.display(), "opened record store");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Stores a raw record and, when available, its assembled output.
    /// Content already present is reported as a duplicate, not an error.
    pub fn save(
        &self,
        product_type: &str,
        data: &RawRecord,
        output: Option<&OutputRecord>,
    ) -> Result<SaveOutcome> {
        let data_hash = content_hash(data)?;
        let data_json = canonical_json(data)?;
        let output_json = output
            .map(serde_json::to_string)
            .transpose()
            .map_err(StoreError::Serialization)?;
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

        let inserted = self.conn.execute(
            "INSERT INTO records (product_type, data, output, data_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (data_hash) DO NOTHING",
            params![product_type, data_json, output_json, data_hash, created_at],
        )?;
        if inserted == 0 {
            let existing_id: i64 = self.conn.query_row(
                "SELECT id FROM records WHERE data_hash = ?1",
                params![data_hash],
                |row| row.get(0),
            )?;
            info!(existing_id, "duplicate record not saved");
            return Ok(SaveOutcome::Duplicate { existing_id });
        }
        let id = self.conn.last_insert_rowid();
        info!(id, product = %product_type, "record saved");
        Ok(SaveOutcome::Saved { id })
    }

    pub fn get(&self, id: i64) -> Result<Option<StoredRecord>> {
        let row = self
            .conn
            .query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), params![id], read_row)
            .optional()?;
        row.map(decode).transpose()
    }

    /// Every record, newest first.
    pub fn list(&self) -> Result<Vec<StoredRecord>> {
        self.query(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC"), &[])
    }

    /// Records whose raw JSON contains `term` (case-insensitive), newest
    /// first, optionally limited to one product.
    pub fn search(&self, term: &str, product_type: Option<&str>) -> Result<Vec<StoredRecord>> {
        let needle = term.to_lowercase();
        match product_type {
            Some(product) => self.query(
                &format!(
                    "{SELECT_COLUMNS} WHERE product_type = ?1 AND instr(lower(data), ?2) > 0 \
                     ORDER BY created_at DESC, id DESC"
                ),
                &[&product, &needle],
            ),
            None => self.query(
                &format!(
                    "{SELECT_COLUMNS} WHERE instr(lower(data), ?1) > 0 \
                     ORDER BY created_at DESC, id DESC"
                ),
                &[&needle],
            ),
        }
    }

    pub fn stats(&self) -> Result<StoreStats> {
        let mut stmt = self
            .conn
            .prepare("SELECT product_type, COUNT(*) FROM records GROUP BY product_type")?;
        let by_product = stmt
            .query_map([], |row| {
                let count: i64 = row.get(1)?;
                Ok((row.get::<_, String>(0)?, usize::try_from(count).unwrap_or_default()))
            })?
            .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;
        Ok(StoreStats {
            total: by_product.values().sum(),
            by_product,
        })
    }

    /// Returns whether a record was removed.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let removed = self.conn.execute("DELETE FROM records WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    /// Removes every record, returning how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let removed = self.conn.execute("DELETE FROM records", [])?;
        info!(removed, "record store cleared");
        Ok(removed)
    }

    /// Groups records sharing a first and last name. Groups are ordered by
    /// name; ids within a group ascend.
    pub fn duplicate_names(&self) -> Result<Vec<NameGroup>> {
        let mut groups: BTreeMap<String, Vec<i64>> = BTreeMap::new();
        for record in self.list()? {
            if let Some(name) = applicant_name(&record.data) {
                groups.entry(name).or_default().push(record.id);
            }
        }
        Ok(groups
            .into_iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(name, mut ids)| {
                ids.sort_unstable();
                NameGroup { name, ids }
            })
            .collect())
    }

    fn query(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<StoredRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, read_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(decode).collect()
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredRow> {
    Ok(StoredRow {
        id: row.get(0)?,
        product_type: row.get(1)?,
        data: row.get(2)?,
        output: row.get(3)?,
        data_hash: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn decode(row: StoredRow) -> Result<StoredRecord> {
    let id = row.id;
    let data = match serde_json::from_str(&row.data).map_err(|source| StoreError::Corrupt { id, source })? {
        Value::Object(map) => map,
        _ => return Err(StoreError::NotAnObject { id }),
    };
    let output = row
        .output
        .map(|text| serde_json::from_str(&text))
        .transpose()
        .map_err(|source| StoreError::Corrupt { id, source })?;
    Ok(StoredRecord {
        id,
        product_type: row.product_type,
        data,
        output,
        data_hash: row.data_hash,
        created_at: row.created_at,
    })
}

/// Lowercased "first last" from the usual applicant name fields.
fn applicant_name(data: &RawRecord) -> Option<String> {
    let pick = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| data.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .filter(|name| !name.is_empty())
    };
    let first = pick(&["applicant_first_name", "first_name"])?;
    let last = pick(&["applicant_last_name", "last_name"])?;
    Some(format!("{first} {last}").to_lowercase())
}
