pub(crate) mod auth;
pub(crate) mod list;
pub(crate) mod profile;
pub(crate) mod sync;
