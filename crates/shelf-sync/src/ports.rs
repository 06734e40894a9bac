use chrono::{DateTime, Utc};
use shelf_api::{ListsPage, ListsQuery};
use shelf_core::ShelfResult;
use shelf_store::{BatchOutcome, ListOperation, ListsStore};
use std::collections::HashSet;

/// Remote paginated lists endpoint.
pub trait ListsService {
    /// `Ok(None)` is a null response, not an error.
    fn get(&self, query: &ListsQuery) -> ShelfResult<Option<ListsPage>>;
}

impl<T: ListsService + ?Sized> ListsService for &T {
    fn get(&self, query: &ListsQuery) -> ShelfResult<Option<ListsPage>> {
        (**self).get(query)
    }
}

/// Hands out a lists service for the signed-in account.
pub trait SessionProvider {
    /// `Ok(None)` when nobody is signed in.
    fn lists_service(&self) -> ShelfResult<Option<Box<dyn ListsService + '_>>>;
}

pub trait ListStore {
    fn list_ids(&self) -> ShelfResult<HashSet<String>>;

    fn apply_batch(&self, operations: &[ListOperation]) -> ShelfResult<BatchOutcome>;
}

pub trait SyncSettings {
    fn last_lists_sync_time(&self) -> ShelfResult<DateTime<Utc>>;

    fn set_last_lists_sync_time(&self, time: DateTime<Utc>) -> ShelfResult<()>;
}

impl ListStore for ListsStore {
    fn list_ids(&self) -> ShelfResult<HashSet<String>> {
        ListsStore::list_ids(self)
    }

    fn apply_batch(&self, operations: &[ListOperation]) -> ShelfResult<BatchOutcome> {
        ListsStore::apply_batch(self, operations)
    }
}

impl SyncSettings for ListsStore {
    fn last_lists_sync_time(&self) -> ShelfResult<DateTime<Utc>> {
        ListsStore::last_lists_sync_time(self)
    }

    fn set_last_lists_sync_time(&self, time: DateTime<Utc>) -> ShelfResult<()> {
        ListsStore::set_last_lists_sync_time(self, time)
    }
}
