use crate::contract::ItemType;
use rusqlite::{Transaction, params};

pub const DEFAULT_BATCH_SIZE: usize = 50;

/// A single write against the lists tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOperation {
    InsertList {
        list_id: String,
        name: String,
        order: Option<i32>,
    },
    /// `order: None` keeps the stored order.
    UpdateList {
        list_id: String,
        name: String,
        order: Option<i32>,
    },
    /// Replaces any existing row with the same `list_item_id`.
    InsertListItem {
        list_item_id: String,
        item_ref_id: i32,
        item_type: ItemType,
        list_id: String,
    },
}

impl ListOperation {
    pub fn list_id(&self) -> &str {
        match self {
            Self::InsertList { list_id, .. }
            | Self::UpdateList { list_id, .. }
            | Self::InsertListItem { list_id, .. } => list_id,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub applied: usize,
    pub chunks: usize,
}

pub(crate) fn apply_operation(
    transaction: &Transaction<'_>,
    profile: &str,
    operation: &ListOperation,
) -> rusqlite::Result<usize> {
    match operation {
        ListOperation::InsertList {
            list_id,
            name,
            order,
        } => transaction.execute(
            "INSERT INTO lists (profile, list_id, name, list_order) VALUES (?1, ?2, ?3, COALESCE(?4, 0))
             ON CONFLICT(profile, list_id) DO UPDATE SET
                 name = excluded.name,
                 list_order = COALESCE(?4, lists.list_order)",
            params![profile, list_id, name, order],
        ),
        ListOperation::UpdateList {
            list_id,
            name,
            order,
        } => transaction.execute(
            "UPDATE lists SET name = ?3, list_order = COALESCE(?4, list_order)
             WHERE profile = ?1 AND list_id = ?2",
            params![profile, list_id, name, order],
        ),
        ListOperation::InsertListItem {
            list_item_id,
            item_ref_id,
            item_type,
            list_id,
        } => transaction.execute(
            "INSERT OR REPLACE INTO list_items (profile, list_item_id, item_ref_id, item_type, list_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![profile, list_item_id, item_ref_id, item_type.code(), list_id],
        ),
    }
}
