use serde_json::json;
use shelf_core::{ExitCode, ShelfResult};
use shelf_fs::{
    init_workspace, list_profiles, load_config, resolve_profile, save_config, set_active_profile,
    set_profile_server,
};

use crate::{
    GlobalOptions, InitOutput, ProfileChangedOutput, ProfileCommand, ensure_workspace, print_json,
    workspace_target,
};

pub(crate) fn cmd_init(globals: &GlobalOptions) -> ShelfResult<ExitCode> {
    let target = workspace_target(globals)?;
    let result = init_workspace(Some(&target), globals.server.as_deref())?;

    let output = InitOutput {
        workspace: result.paths.root.display().to_string(),
        created: result
            .created
            .iter()
            .map(|path| path.display().to_string())
            .collect(),
    };

    if globals.json {
        print_json(&json!({"ok": true, "result": output}))?;
    } else {
        println!("Workspace initialized: {}", output.workspace);
        if output.created.is_empty() {
            println!("Nothing to create; workspace already set up.");
        } else {
            println!("Created:");
            for path in &output.created {
                println!("  - {path}");
            }
        }
    }

    Ok(ExitCode::Success)
}

pub(crate) fn cmd_profile(command: ProfileCommand, globals: &GlobalOptions) -> ShelfResult<ExitCode> {
    let paths = ensure_workspace(globals)?;
    let mut config = load_config(&paths)?;

    match command {
        ProfileCommand::List => {
            let profiles = list_profiles(&config);
            if globals.json {
                print_json(
                    &json!({"ok": true, "result": {"active_profile": config.active_profile, "profiles": profiles}}),
                )?;
            } else {
                println!("Active profile: {}", config.active_profile);
                for profile in profiles {
                    let marker = if profile.active { "*" } else { " " };
                    println!("{} {} ({})", marker, profile.name, profile.server);
                }
            }
        }
        ProfileCommand::Use { name } => {
            set_active_profile(&mut config, &name)?;
            save_config(&paths, &config)?;

            let resolved = resolve_profile(&config, Some(&name), globals.server.as_deref())?;
            let output = ProfileChangedOutput {
                profile: resolved.name,
                server: resolved.server,
            };

            if globals.json {
                print_json(&json!({"ok": true, "result": output}))?;
            } else {
                println!(
                    "Active profile set to '{}' ({})",
                    output.profile, output.server
                );
            }
        }
        ProfileCommand::Set { name, server } => {
            let target_profile = name.unwrap_or_else(|| config.active_profile.clone());
            set_profile_server(&mut config, &target_profile, &server)?;
            save_config(&paths, &config)?;

            let resolved = resolve_profile(&config, Some(&target_profile), None)?;
            let output = ProfileChangedOutput {
                profile: resolved.name,
                server: resolved.server,
            };

            if globals.json {
                print_json(&json!({"ok": true, "result": output}))?;
            } else {
                println!(
                    "Profile '{}' server set to {}",
                    output.profile, output.server
                );
            }
        }
    }

    Ok(ExitCode::Success)
}
