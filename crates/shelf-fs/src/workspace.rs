use crate::config::{DEFAULT_SERVER_URL, WorkspaceConfig, load_config, save_config};
use shelf_core::{ShelfError, ShelfResult};
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_DIR_NAME: &str = ".shelf";

#[derive(Debug, Clone)]
pub struct WorkspacePaths {
    pub root: PathBuf,
    pub data_dir: PathBuf,
    pub config_path: PathBuf,
    pub state_db_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct WorkspaceInitResult {
    pub paths: WorkspacePaths,
    pub created: Vec<PathBuf>,
}

impl WorkspacePaths {
    pub fn from_root(root: PathBuf) -> Self {
        let data_dir = root.join(DATA_DIR_NAME);

        Self {
            config_path: data_dir.join("config.toml"),
            state_db_path: data_dir.join("state.db"),
            root,
            data_dir,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.data_dir.is_dir() && self.config_path.is_file()
    }
}

/// Creates the workspace layout under `target` (or the current directory).
/// Existing files are left alone; an existing config is only validated.
pub fn init_workspace(
    target: Option<&Path>,
    server: Option<&str>,
) -> ShelfResult<WorkspaceInitResult> {
    let root = match target {
        Some(path) => absolutize(path)?,
        None => current_dir("init")?,
    };

    let paths = WorkspacePaths::from_root(root);
    let mut created = Vec::new();

    ensure_dir(&paths.root, &mut created)?;
    ensure_dir(&paths.data_dir, &mut created)?;

    if paths.config_path.exists() {
        let _ = load_config(&paths)?;
    } else {
        let default_server = server.unwrap_or(DEFAULT_SERVER_URL);
        let config = WorkspaceConfig::with_default_server(default_server.trim_end_matches('/'));
        save_config(&paths, &config)?;
        created.push(paths.config_path.clone());
    }

    if !paths.state_db_path.exists() {
        fs::write(&paths.state_db_path, []).map_err(|err| {
            ShelfError::io(format!(
                "failed to create state database '{}': {}",
                paths.state_db_path.display(),
                err
            ))
        })?;
        created.push(paths.state_db_path.clone());
    }

    Ok(WorkspaceInitResult { paths, created })
}

pub fn resolve_workspace(explicit: Option<&Path>) -> ShelfResult<WorkspacePaths> {
    let root = match explicit {
        Some(path) => absolutize(path)?,
        None => current_dir("workspace lookup")?,
    };

    let paths = WorkspacePaths::from_root(root);
    if !paths.is_initialized() {
        let root_display = paths.root.display();
        return Err(ShelfError::usage(format!(
            "workspace is not initialized at '{root_display}'; run `shelf init --workspace {root_display}` first"
        )));
    }

    Ok(paths)
}

fn current_dir(purpose: &str) -> ShelfResult<PathBuf> {
    std::env::current_dir().map_err(|err| {
        ShelfError::io(format!(
            "failed to resolve current directory for {purpose}: {err}"
        ))
    })
}

fn absolutize(path: &Path) -> ShelfResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    Ok(current_dir("path")?.join(path))
}

fn ensure_dir(path: &Path, created: &mut Vec<PathBuf>) -> ShelfResult<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(ShelfError::io(format!(
                "expected '{}' to be a directory",
                path.display()
            )));
        }
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|err| {
        ShelfError::io(format!(
            "failed to create directory '{}': {}",
            path.display(),
            err
        ))
    })?;
    created.push(path.to_path_buf());
    Ok(())
}
