mod batch;
mod contract;

pub use batch::{BatchOutcome, DEFAULT_BATCH_SIZE, ListOperation};
pub use contract::{
    ItemType, LIST_ITEM_ID_SEPARATOR, ParsedListItemId, list_item_id, parse_list_item_id,
    split_list_item_id,
};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Error as SqlError, ErrorCode, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use shelf_core::{ShelfError, ShelfResult};
use shelf_fs::WorkspacePaths;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

const KEY_LAST_SYNC_LISTS: &str = "last_sync_lists_ms";
const KEY_HAS_MERGED_LISTS: &str = "has_merged_lists";
const KEY_LAST_SYNC_STATUS: &str = "last_sync_status";
const KEY_LAST_SYNC_ATTEMPT: &str = "last_sync_attempt_at";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub profile: String,
    pub server: String,
    pub access_token: String,
    pub saved_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalList {
    pub list_id: String,
    pub name: String,
    pub order: i32,
    pub item_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalListItem {
    pub list_item_id: String,
    pub item_ref_id: i32,
    pub item_type: ItemType,
    pub list_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncSettingsView {
    pub last_lists_sync_at: Option<DateTime<Utc>>,
    pub has_merged_lists: bool,
    pub last_sync_status: Option<String>,
    pub last_sync_attempt_at: Option<String>,
}

/// Local lists database for one profile of a workspace.
#[derive(Debug, Clone)]
pub struct ListsStore {
    db_path: PathBuf,
    profile: String,
    batch_size: usize,
}

impl ListsStore {
    pub fn open(paths: &WorkspacePaths, profile: &str) -> ShelfResult<Self> {
        Self::open_at(&paths.state_db_path, profile)
    }

    pub fn open_at(db_path: &Path, profile: &str) -> ShelfResult<Self> {
        let store = Self {
            db_path: db_path.to_path_buf(),
            profile: profile_key(profile),
            batch_size: DEFAULT_BATCH_SIZE,
        };

        let conn = store.connection()?;
        store.initialize_schema(&conn)?;

        Ok(store)
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn list_ids(&self) -> ShelfResult<HashSet<String>> {
        let conn = self.connection()?;
        let mut statement = conn
            .prepare("SELECT list_id FROM lists WHERE profile = ?1")
            .map_err(|err| sqlite_error("prepare list id query", &self.db_path, err))?;

        let rows = statement
            .query_map(params![self.profile], |row| row.get::<_, String>(0))
            .map_err(|err| sqlite_error("query list ids", &self.db_path, err))?;

        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row.map_err(|err| sqlite_error("read list id row", &self.db_path, err))?);
        }

        Ok(ids)
    }

    /// Applies `operations` in chunks of `batch_size`, one transaction per
    /// chunk. A failing chunk is rolled back; chunks before it stay committed.
    pub fn apply_batch(&self, operations: &[ListOperation]) -> ShelfResult<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        if operations.is_empty() {
            return Ok(outcome);
        }

        let mut conn = self.connection()?;
        for chunk in operations.chunks(self.batch_size) {
            let transaction = conn
                .transaction()
                .map_err(|err| sqlite_error("start batch transaction", &self.db_path, err))?;

            for operation in chunk {
                batch::apply_operation(&transaction, &self.profile, operation).map_err(|err| {
                    sqlite_error(
                        &format!("apply operation for list '{}'", operation.list_id()),
                        &self.db_path,
                        err,
                    )
                })?;
            }

            transaction
                .commit()
                .map_err(|err| sqlite_error("commit batch transaction", &self.db_path, err))?;

            outcome.applied += chunk.len();
            outcome.chunks += 1;
            debug!(
                applied = outcome.applied,
                total = operations.len(),
                "committed list operations chunk"
            );
        }

        Ok(outcome)
    }

    pub fn load_lists(&self) -> ShelfResult<Vec<LocalList>> {
        let conn = self.connection()?;
        let mut statement = conn
            .prepare(
                "SELECT l.list_id, l.name, l.list_order,
                        (SELECT COUNT(*) FROM list_items i
                          WHERE i.profile = l.profile AND i.list_id = l.list_id)
                 FROM lists l
                 WHERE l.profile = ?1
                 ORDER BY l.list_order ASC, l.name ASC",
            )
            .map_err(|err| sqlite_error("prepare lists query", &self.db_path, err))?;

        let rows = statement
            .query_map(params![self.profile], |row| {
                Ok(LocalList {
                    list_id: row.get(0)?,
                    name: row.get(1)?,
                    order: row.get(2)?,
                    item_count: row.get::<_, i64>(3)?.max(0) as usize,
                })
            })
            .map_err(|err| sqlite_error("query lists", &self.db_path, err))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|err| sqlite_error("read list row", &self.db_path, err))
    }

    pub fn load_list_items(&self, list_id: &str) -> ShelfResult<Vec<LocalListItem>> {
        let conn = self.connection()?;
        let mut statement = conn
            .prepare(
                "SELECT list_item_id, item_ref_id, item_type, list_id FROM list_items
                 WHERE profile = ?1 AND list_id = ?2
                 ORDER BY item_type ASC, item_ref_id ASC",
            )
            .map_err(|err| sqlite_error("prepare list items query", &self.db_path, err))?;

        let rows = statement
            .query_map(params![self.profile, list_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i32>(1)?,
                    row.get::<_, i32>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(|err| sqlite_error("query list items", &self.db_path, err))?;

        let mut items = Vec::new();
        for row in rows {
            let (list_item_id, item_ref_id, code, list_id) =
                row.map_err(|err| sqlite_error("read list item row", &self.db_path, err))?;
            let Some(item_type) = ItemType::from_code(code) else {
                continue;
            };
            items.push(LocalListItem {
                list_item_id,
                item_ref_id,
                item_type,
                list_id,
            });
        }

        Ok(items)
    }

    pub fn load_session(&self) -> ShelfResult<Option<StoredSession>> {
        let conn = self.connection()?;
        let payload = conn
            .query_row(
                "SELECT payload_json FROM sessions WHERE profile = ?1",
                params![self.profile],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|err| sqlite_error("load session", &self.db_path, err))?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        serde_json::from_str::<StoredSession>(&payload)
            .map(Some)
            .map_err(|err| {
                ShelfError::storage(format!(
                    "failed to parse stored session in '{}': {}",
                    self.db_path.display(),
                    err
                ))
            })
    }

    pub fn save_session(&self, session: &StoredSession) -> ShelfResult<()> {
        let payload = serde_json::to_string(session)
            .map_err(|err| ShelfError::storage(format!("failed to serialize session data: {err}")))?;

        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO sessions (profile, payload_json, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(profile) DO UPDATE SET payload_json = excluded.payload_json, updated_at = excluded.updated_at",
            params![self.profile, payload, Utc::now().to_rfc3339()],
        )
        .map_err(|err| sqlite_error("save session", &self.db_path, err))?;

        Ok(())
    }

    pub fn remove_session(&self) -> ShelfResult<()> {
        let conn = self.connection()?;
        conn.execute("DELETE FROM sessions WHERE profile = ?1", params![self.profile])
            .map_err(|err| sqlite_error("remove session", &self.db_path, err))?;
        Ok(())
    }

    /// Unix epoch when no incremental sync has completed yet.
    pub fn last_lists_sync_time(&self) -> ShelfResult<DateTime<Utc>> {
        let Some(raw) = self.get_setting(KEY_LAST_SYNC_LISTS)? else {
            return Ok(DateTime::<Utc>::UNIX_EPOCH);
        };

        raw.parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(|| {
                ShelfError::storage(format!(
                    "invalid last lists sync time '{raw}' in '{}'",
                    self.db_path.display()
                ))
            })
    }

    pub fn set_last_lists_sync_time(&self, time: DateTime<Utc>) -> ShelfResult<()> {
        self.put_setting(KEY_LAST_SYNC_LISTS, &time.timestamp_millis().to_string())
    }

    pub fn has_merged_lists(&self) -> ShelfResult<bool> {
        Ok(self.get_setting(KEY_HAS_MERGED_LISTS)?.as_deref() == Some("true"))
    }

    pub fn set_has_merged_lists(&self, merged: bool) -> ShelfResult<()> {
        self.put_setting(KEY_HAS_MERGED_LISTS, if merged { "true" } else { "false" })
    }

    pub fn record_sync_status(&self, status: &str) -> ShelfResult<()> {
        self.put_setting(KEY_LAST_SYNC_STATUS, status)?;
        self.put_setting(KEY_LAST_SYNC_ATTEMPT, &Utc::now().to_rfc3339())
    }

    pub fn sync_settings(&self) -> ShelfResult<SyncSettingsView> {
        let last_lists_sync_at = match self.get_setting(KEY_LAST_SYNC_LISTS)? {
            Some(_) => Some(self.last_lists_sync_time()?),
            None => None,
        };

        Ok(SyncSettingsView {
            last_lists_sync_at,
            has_merged_lists: self.has_merged_lists()?,
            last_sync_status: self.get_setting(KEY_LAST_SYNC_STATUS)?,
            last_sync_attempt_at: self.get_setting(KEY_LAST_SYNC_ATTEMPT)?,
        })
    }

    /// Forgets sync progress so the next pull downloads every list.
    pub fn reset_sync_settings(&self) -> ShelfResult<()> {
        let conn = self.connection()?;
        conn.execute(
            "DELETE FROM settings WHERE profile = ?1 AND key IN (?2, ?3)",
            params![self.profile, KEY_LAST_SYNC_LISTS, KEY_HAS_MERGED_LISTS],
        )
        .map_err(|err| sqlite_error("reset sync settings", &self.db_path, err))?;
        Ok(())
    }

    fn get_setting(&self, key: &str) -> ShelfResult<Option<String>> {
        let conn = self.connection()?;
        conn.query_row(
            "SELECT value FROM settings WHERE profile = ?1 AND key = ?2",
            params![self.profile, key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|err| sqlite_error(&format!("load setting '{key}'"), &self.db_path, err))
    }

    fn put_setting(&self, key: &str, value: &str) -> ShelfResult<()> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO settings (profile, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(profile, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![self.profile, key, value, Utc::now().to_rfc3339()],
        )
        .map_err(|err| sqlite_error(&format!("save setting '{key}'"), &self.db_path, err))?;
        Ok(())
    }

    fn connection(&self) -> ShelfResult<Connection> {
        Connection::open(&self.db_path)
            .map_err(|err| sqlite_error("open state database", &self.db_path, err))
    }

    fn initialize_schema(&self, conn: &Connection) -> ShelfResult<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             CREATE TABLE IF NOT EXISTS lists (
                 profile TEXT NOT NULL,
                 list_id TEXT NOT NULL,
                 name TEXT NOT NULL,
                 list_order INTEGER NOT NULL DEFAULT 0,
                 PRIMARY KEY (profile, list_id)
             );
             CREATE TABLE IF NOT EXISTS list_items (
                 profile TEXT NOT NULL,
                 list_item_id TEXT NOT NULL,
                 item_ref_id INTEGER NOT NULL,
                 item_type INTEGER NOT NULL,
                 list_id TEXT NOT NULL,
                 PRIMARY KEY (profile, list_item_id)
             );
             CREATE INDEX IF NOT EXISTS list_items_by_list ON list_items (profile, list_id);
             CREATE TABLE IF NOT EXISTS sessions (
                 profile TEXT PRIMARY KEY,
                 payload_json TEXT NOT NULL,
                 updated_at TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS settings (
                 profile TEXT NOT NULL,
                 key TEXT NOT NULL,
                 value TEXT NOT NULL,
                 updated_at TEXT NOT NULL,
                 PRIMARY KEY (profile, key)
             );",
        )
        .map_err(|err| sqlite_error("initialize schema", &self.db_path, err))?;

        Ok(())
    }
}

fn sqlite_error(action: &str, db_path: &Path, err: SqlError) -> ShelfError {
    if let SqlError::SqliteFailure(code, message) = &err
        && (code.code == ErrorCode::DatabaseCorrupt || code.code == ErrorCode::NotADatabase)
    {
        let detail = message.as_deref().unwrap_or("sqlite reported corruption");
        return ShelfError::storage(format!(
            "failed to {action}: state database '{}' is corrupted ({detail}); remove '.shelf/state.db' and run `shelf sync pull --full` to rebuild it",
            db_path.display()
        ));
    }

    ShelfError::storage(format!(
        "failed to {action} using state database '{}': {}",
        db_path.display(),
        err
    ))
}

fn profile_key(profile: &str) -> String {
    let mut output = String::with_capacity(profile.len());
    for ch in profile.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            output.push(ch);
        } else {
            output.push('_');
        }
    }

    if output.is_empty() {
        "default".to_string()
    } else {
        output
    }
}
