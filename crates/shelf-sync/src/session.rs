use crate::ports::{ListsService, SessionProvider};
use shelf_api::{ListsApi, ListsPage, ListsQuery};
use shelf_core::ShelfResult;
use shelf_store::ListsStore;
use tracing::warn;

/// Lists API bound to one access token.
#[derive(Debug, Clone)]
pub struct AuthorizedLists<'a> {
    api: &'a ListsApi,
    access_token: String,
}

impl<'a> AuthorizedLists<'a> {
    pub fn new(api: &'a ListsApi, access_token: impl Into<String>) -> Self {
        Self {
            api,
            access_token: access_token.into(),
        }
    }
}

impl ListsService for AuthorizedLists<'_> {
    fn get(&self, query: &ListsQuery) -> ShelfResult<Option<ListsPage>> {
        self.api.get_lists(&self.access_token, query)
    }
}

/// Resolves the service from the session saved for the store's profile.
#[derive(Debug, Clone)]
pub struct StoredSessionProvider<'a> {
    api: &'a ListsApi,
    store: &'a ListsStore,
}

impl<'a> StoredSessionProvider<'a> {
    pub fn new(api: &'a ListsApi, store: &'a ListsStore) -> Self {
        Self { api, store }
    }
}

impl SessionProvider for StoredSessionProvider<'_> {
    fn lists_service(&self) -> ShelfResult<Option<Box<dyn ListsService + '_>>> {
        let Some(session) = self.store.load_session()? else {
            return Ok(None);
        };

        if session.access_token.trim().is_empty() {
            return Ok(None);
        }

        if session.server.trim_end_matches('/') != self.api.base_url() {
            warn!(
                profile = self.store.profile(),
                session_server = %session.server,
                server = self.api.base_url(),
                "stored session belongs to a different server"
            );
            return Ok(None);
        }

        Ok(Some(Box::new(AuthorizedLists::new(
            self.api,
            session.access_token,
        ))))
    }
}
