use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Usage,
    Auth,
    Sync,
    Storage,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Usage = 2,
    Auth = 3,
    Sync = 4,
    Storage = 5,
    Io = 6,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, thiserror::Error, Serialize)]
#[error("{message}")]
pub struct ShelfError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ShelfError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Usage, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, message)
    }

    pub fn sync(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Sync, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn exit_code(&self) -> ExitCode {
        match self.kind {
            ErrorKind::Usage => ExitCode::Usage,
            ErrorKind::Auth => ExitCode::Auth,
            ErrorKind::Sync => ExitCode::Sync,
            ErrorKind::Storage => ExitCode::Storage,
            ErrorKind::Io => ExitCode::Io,
        }
    }
}

impl From<std::io::Error> for ShelfError {
    fn from(value: std::io::Error) -> Self {
        Self::io(value.to_string())
    }
}

pub type ShelfResult<T> = Result<T, ShelfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        assert_eq!(ShelfError::usage("bad flag").exit_code().as_i32(), 2);
        assert_eq!(ShelfError::auth("not signed in").exit_code().as_i32(), 3);
        assert_eq!(ShelfError::sync("offline").exit_code().as_i32(), 4);
        assert_eq!(ShelfError::storage("locked").exit_code().as_i32(), 5);
        assert_eq!(ShelfError::io("disk full").exit_code().as_i32(), 6);
    }
}
