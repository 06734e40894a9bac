mod config;
mod workspace;

pub use config::{
    DEFAULT_PROFILE, DEFAULT_SERVER_URL, ProfileConfig, ProfileView, ResolvedProfile,
    WorkspaceConfig, list_profiles, load_config, resolve_profile, save_config, set_active_profile,
    set_profile_server,
};
pub use workspace::{WorkspaceInitResult, WorkspacePaths, init_workspace, resolve_workspace};
