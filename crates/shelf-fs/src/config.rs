use crate::workspace::WorkspacePaths;
use serde::{Deserialize, Serialize};
use shelf_core::{ShelfError, ShelfResult};
use std::collections::BTreeMap;
use std::fs;

pub const CONFIG_VERSION: u32 = 1;
pub const DEFAULT_PROFILE: &str = "default";
pub const DEFAULT_SERVER_URL: &str = "https://lists.shelf-sync.app";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub version: u32,
    pub active_profile: String,
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub server: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub name: String,
    pub active: bool,
    pub server: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedProfile {
    pub name: String,
    pub server: String,
}

impl WorkspaceConfig {
    pub fn with_default_server(server: impl Into<String>) -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            DEFAULT_PROFILE.to_string(),
            ProfileConfig {
                server: server.into(),
            },
        );

        Self {
            version: CONFIG_VERSION,
            active_profile: DEFAULT_PROFILE.to_string(),
            profiles,
        }
    }

    /// Repairs configs written by hand: missing version, no profiles, or an
    /// active profile that no longer exists.
    pub fn ensure_defaults(&mut self) {
        if self.version == 0 {
            self.version = CONFIG_VERSION;
        }

        if self.profiles.is_empty() {
            self.profiles.insert(
                DEFAULT_PROFILE.to_string(),
                ProfileConfig {
                    server: DEFAULT_SERVER_URL.to_string(),
                },
            );
        }

        if !self.profiles.contains_key(&self.active_profile) {
            self.active_profile = self
                .profiles
                .keys()
                .next()
                .cloned()
                .unwrap_or_else(|| DEFAULT_PROFILE.to_string());
        }
    }
}

pub fn load_config(paths: &WorkspacePaths) -> ShelfResult<WorkspaceConfig> {
    let contents = fs::read_to_string(&paths.config_path).map_err(|err| {
        ShelfError::io(format!(
            "failed to read workspace config '{}': {}",
            paths.config_path.display(),
            err
        ))
    })?;

    let mut config: WorkspaceConfig = toml::from_str(&contents).map_err(|err| {
        ShelfError::io(format!(
            "failed to parse workspace config '{}': {}",
            paths.config_path.display(),
            err
        ))
    })?;
    config.ensure_defaults();
    Ok(config)
}

pub fn save_config(paths: &WorkspacePaths, config: &WorkspaceConfig) -> ShelfResult<()> {
    let serialized = toml::to_string_pretty(config)
        .map_err(|err| ShelfError::io(format!("failed to encode config.toml: {err}")))?;

    fs::write(&paths.config_path, serialized).map_err(|err| {
        ShelfError::io(format!(
            "failed to write workspace config '{}': {}",
            paths.config_path.display(),
            err
        ))
    })
}

pub fn list_profiles(config: &WorkspaceConfig) -> Vec<ProfileView> {
    config
        .profiles
        .iter()
        .map(|(name, profile)| ProfileView {
            name: name.clone(),
            active: name == &config.active_profile,
            server: profile.server.clone(),
        })
        .collect()
}

pub fn set_active_profile(config: &mut WorkspaceConfig, name: &str) -> ShelfResult<()> {
    if !config.profiles.contains_key(name) {
        return Err(ShelfError::usage(format!(
            "profile '{name}' not found in workspace config"
        )));
    }

    config.active_profile = name.to_string();
    Ok(())
}

pub fn set_profile_server(config: &mut WorkspaceConfig, name: &str, server: &str) -> ShelfResult<()> {
    let server = validate_server_url(server)?;
    config
        .profiles
        .insert(name.to_string(), ProfileConfig { server });

    if config.active_profile.is_empty() {
        config.active_profile = name.to_string();
    }

    Ok(())
}

pub fn resolve_profile(
    config: &WorkspaceConfig,
    profile_override: Option<&str>,
    server_override: Option<&str>,
) -> ShelfResult<ResolvedProfile> {
    let requested_profile = profile_override.unwrap_or(&config.active_profile);
    let profile = config.profiles.get(requested_profile).ok_or_else(|| {
        ShelfError::usage(format!(
            "profile '{requested_profile}' not found in workspace config"
        ))
    })?;

    let server = validate_server_url(server_override.unwrap_or(profile.server.as_str()))?;

    Ok(ResolvedProfile {
        name: requested_profile.to_string(),
        server,
    })
}

fn validate_server_url(server: &str) -> ShelfResult<String> {
    let trimmed = server.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ShelfError::usage(format!(
            "server '{server}' must be an http:// or https:// URL"
        )));
    }

    Ok(trimmed.to_string())
}
