mod merge;
mod ports;
mod session;

pub use merge::{PagePlan, PageSummary, build_page_operations};
pub use ports::{ListStore, ListsService, SessionProvider, SyncSettings};
pub use session::{AuthorizedLists, StoredSessionProvider};

use chrono::{DateTime, Utc};
use serde::Serialize;
use shelf_api::{ListsQuery, RemoteList};
use shelf_core::{ShelfError, ShelfResult};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

pub const LISTS_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Serialize)]
pub struct PullOutcome {
    pub incremental: bool,
    pub pages: usize,
    pub lists: usize,
    pub operations: usize,
    #[serde(flatten)]
    pub summary: PageSummary,
    pub started_at: DateTime<Utc>,
    pub last_sync_updated: bool,
}

/// Result of asking the backend for one page.
#[derive(Debug)]
pub enum PageFetch {
    NextPage {
        cursor: Option<String>,
        lists: Vec<RemoteList>,
    },
    /// Null response or empty page.
    End,
    Failure(ShelfError),
}

pub struct ListsSyncEngine<'a> {
    sessions: &'a dyn SessionProvider,
    store: &'a dyn ListStore,
    settings: &'a dyn SyncSettings,
    page_size: u32,
    clock: fn() -> DateTime<Utc>,
}

impl<'a> ListsSyncEngine<'a> {
    pub fn new(
        sessions: &'a dyn SessionProvider,
        store: &'a dyn ListStore,
        settings: &'a dyn SyncSettings,
    ) -> Self {
        Self {
            sessions,
            store,
            settings,
            page_size: LISTS_PAGE_SIZE,
            clock: Utc::now,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Downloads lists and merges them into the local store.
    ///
    /// With `has_merged_lists` only lists changed since the last incremental
    /// sync are requested, and the start time of the run becomes the new last
    /// sync time once every page merged. Returns `false` on any failure; pages
    /// merged before the failure stay in the store.
    pub fn download_from_remote(&self, has_merged_lists: bool) -> bool {
        match self.pull(has_merged_lists) {
            Ok(_) => true,
            Err(err) => {
                error!(kind = ?err.kind, "lists download failed: {}", err.message);
                false
            }
        }
    }

    /// Same as [`Self::download_from_remote`], keeping the failure cause.
    pub fn pull(&self, has_merged_lists: bool) -> ShelfResult<PullOutcome> {
        let started_at = (self.clock)();
        let last_sync = self.settings.last_lists_sync_time()?;

        if has_merged_lists {
            debug!(since = %last_sync, "downloading lists changed since last sync");
        } else {
            debug!("downloading all lists");
        }

        let local_list_ids = self.store.list_ids()?;
        let mut outcome = PullOutcome {
            incremental: has_merged_lists,
            pages: 0,
            lists: 0,
            operations: 0,
            summary: PageSummary::default(),
            started_at,
            last_sync_updated: false,
        };

        let mut cursor: Option<String> = None;
        loop {
            let Some(service) = self.sessions.lists_service()? else {
                return Err(ShelfError::auth(
                    "not signed in; run `shelf auth login` first",
                ));
            };

            let query = ListsQuery {
                limit: self.page_size,
                updated_since: has_merged_lists.then_some(last_sync),
                cursor: cursor.take(),
            };

            let (next_cursor, lists) = match fetch_page(&*service, &query) {
                PageFetch::NextPage { cursor, lists } => (cursor, lists),
                PageFetch::End => break,
                PageFetch::Failure(err) => return Err(err),
            };

            let (summary, operations) = self.merge_page(&lists, &local_list_ids)?;
            outcome.pages += 1;
            outcome.lists += lists.len();
            outcome.operations += operations;
            outcome.summary.absorb(summary);
            debug!(
                page = outcome.pages,
                lists = lists.len(),
                "merged lists page"
            );

            cursor = next_cursor.filter(|value| !value.is_empty());
            if cursor.is_none() {
                break;
            }
        }

        if has_merged_lists {
            self.settings.set_last_lists_sync_time(started_at)?;
            outcome.last_sync_updated = true;
        }

        info!(
            incremental = outcome.incremental,
            pages = outcome.pages,
            lists = outcome.lists,
            skipped_items = outcome.summary.skipped_items,
            "lists download finished"
        );
        Ok(outcome)
    }

    /// Applies one page as a single batch submission.
    pub fn merge_page(
        &self,
        lists: &[RemoteList],
        local_list_ids: &HashSet<String>,
    ) -> ShelfResult<(PageSummary, usize)> {
        let plan = build_page_operations(lists, local_list_ids);
        let applied = self.store.apply_batch(&plan.operations).map_err(|err| {
            error!("lists database update failed: {}", err.message);
            err
        })?;

        Ok((plan.summary, applied.applied))
    }
}

pub fn fetch_page(service: &dyn ListsService, query: &ListsQuery) -> PageFetch {
    match service.get(query) {
        Ok(Some(page)) if !page.lists.is_empty() => PageFetch::NextPage {
            cursor: page.cursor,
            lists: page.lists,
        },
        Ok(Some(_)) => {
            debug!("lists page is empty, assuming end of data");
            PageFetch::End
        }
        Ok(None) => {
            warn!("lists response is null, stopping download");
            PageFetch::End
        }
        Err(err) => PageFetch::Failure(err),
    }
}
