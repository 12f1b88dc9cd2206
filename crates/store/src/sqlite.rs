use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use enrolytics_core::Tier;

use crate::error::StoreError;
use crate::record::TableRecord;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Append,
    Overwrite,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableMetadata {
    pub exists: bool,
    pub row_count: i64,
    pub last_modified: Option<String>,
    /// Write counter, incremented once per committed write call.
    pub version: i64,
}

impl TableMetadata {
    fn absent() -> Self {
        TableMetadata {
            exists: false,
            row_count: 0,
            last_modified: None,
            version: 0,
        }
    }
}

/// Tiered table storage.
///
/// Reads of missing tables yield empty vectors, never errors; the pipeline
/// treats "tier not materialized yet" as ordinary emptiness.
pub trait LayeredStore {
    fn exists(&self, tier: Tier, table: &str) -> Result<bool, StoreError>;

    /// Write rows, returning the count written. An empty slice writes
    /// nothing and never creates the table; an empty overwrite of an
    /// existing table truncates it.
    fn write<R: TableRecord>(
        &self,
        tier: Tier,
        rows: &[R],
        mode: WriteMode,
    ) -> Result<usize, StoreError>;

    fn read<R: TableRecord>(&self, tier: Tier) -> Result<Vec<R>, StoreError>;

    fn metadata(&self, tier: Tier, table: &str) -> Result<TableMetadata, StoreError>;

    /// Logical table names present in a tier, sorted.
    fn list(&self, tier: Tier) -> Result<Vec<String>, StoreError>;

    /// Drop a table. Returns whether it existed.
    fn delete(&self, tier: Tier, table: &str) -> Result<bool, StoreError>;
}

// ---------------------------------------------------------------------------
// SQLite implementation
// ---------------------------------------------------------------------------

const CATALOG_DDL: &str = "CREATE TABLE IF NOT EXISTS _catalog (
    tier TEXT NOT NULL,
    table_name TEXT NOT NULL,
    version INTEGER NOT NULL,
    last_modified TEXT NOT NULL,
    PRIMARY KEY (tier, table_name)
)";

pub struct SqliteStore {
    conn: Connection,
    path: PathBuf,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Open(format!("{}: {e}", parent.display())))?;
            }
        }
        let conn = Connection::open(path)
            .map_err(|e| StoreError::Open(format!("{}: {e}", path.display())))?;
        conn.execute_batch(CATALOG_DDL)?;
        Ok(SqliteStore {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn qualified(tier: Tier, table: &str) -> String {
        format!("{}_{table}", tier.as_str())
    }

    fn table_exists(&self, qualified: &str) -> Result<bool, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
        Ok(stmt.exists(params![qualified])?)
    }
}

impl LayeredStore for SqliteStore {
    fn exists(&self, tier: Tier, table: &str) -> Result<bool, StoreError> {
        self.table_exists(&Self::qualified(tier, table))
    }

    fn write<R: TableRecord>(
        &self,
        tier: Tier,
        rows: &[R],
        mode: WriteMode,
    ) -> Result<usize, StoreError> {
        let qualified = Self::qualified(tier, R::TABLE);

        if rows.is_empty() {
            if mode == WriteMode::Overwrite && self.table_exists(&qualified)? {
                let tx = self.conn.unchecked_transaction()?;
                tx.execute(&format!("DELETE FROM {qualified}"), [])?;
                bump_catalog(&tx, tier, R::TABLE)?;
                tx.commit()?;
            }
            return Ok(0);
        }

        self.conn.execute_batch(&R::create_sql(&qualified))?;

        let tx = self.conn.unchecked_transaction()?;
        if mode == WriteMode::Overwrite {
            tx.execute(&format!("DELETE FROM {qualified}"), [])?;
        }
        {
            let mut stmt = tx.prepare(&R::insert_sql(&qualified))?;
            for row in rows {
                row.insert(&mut stmt)?;
            }
        }
        bump_catalog(&tx, tier, R::TABLE)?;
        tx.commit()?;

        Ok(rows.len())
    }

    fn read<R: TableRecord>(&self, tier: Tier) -> Result<Vec<R>, StoreError> {
        let qualified = Self::qualified(tier, R::TABLE);
        if !self.table_exists(&qualified)? {
            return Ok(Vec::new());
        }

        // rowid order preserves append order; silver dedup depends on it.
        let sql = format!(
            "SELECT {} FROM {qualified} ORDER BY rowid",
            R::SELECT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mapped = stmt.query_map([], |row| R::from_row(row))?;

        let mut out = Vec::new();
        for row in mapped {
            out.push(row?);
        }
        Ok(out)
    }

    fn metadata(&self, tier: Tier, table: &str) -> Result<TableMetadata, StoreError> {
        let qualified = Self::qualified(tier, table);
        if !self.table_exists(&qualified)? {
            return Ok(TableMetadata::absent());
        }

        let row_count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {qualified}"), [], |row| {
                    row.get(0)
                })?;

        let catalog: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT version, last_modified FROM _catalog WHERE tier = ?1 AND table_name = ?2",
                params![tier.as_str(), table],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (version, last_modified) = match catalog {
            Some((version, stamp)) => (version, Some(stamp)),
            None => (0, None),
        };

        Ok(TableMetadata {
            exists: true,
            row_count,
            last_modified,
            version,
        })
    }

    fn list(&self, tier: Tier) -> Result<Vec<String>, StoreError> {
        let prefix = format!("{}_", tier.as_str());
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
        let names = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut out = Vec::new();
        for name in names {
            if let Some(logical) = name?.strip_prefix(&prefix) {
                out.push(logical.to_string());
            }
        }
        Ok(out)
    }

    fn delete(&self, tier: Tier, table: &str) -> Result<bool, StoreError> {
        let qualified = Self::qualified(tier, table);
        let existed = self.table_exists(&qualified)?;
        if existed {
            self.conn.execute_batch(&format!("DROP TABLE {qualified}"))?;
        }
        self.conn.execute(
            "DELETE FROM _catalog WHERE tier = ?1 AND table_name = ?2",
            params![tier.as_str(), table],
        )?;
        Ok(existed)
    }
}

fn bump_catalog(conn: &Connection, tier: Tier, table: &str) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO _catalog (tier, table_name, version, last_modified) VALUES (?1, ?2, 1, ?3)
         ON CONFLICT(tier, table_name) DO UPDATE SET
             version = version + 1,
             last_modified = excluded.last_modified",
        params![tier.as_str(), table, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
