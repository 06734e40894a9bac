mod error;

pub use error::{ErrorKind, ExitCode, ShelfError, ShelfResult};
