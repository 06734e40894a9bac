mod commands;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use shelf_api::ListsApi;
use shelf_core::{ExitCode, ShelfError, ShelfResult};
use shelf_fs::{WorkspacePaths, init_workspace, load_config, resolve_profile, resolve_workspace};
use shelf_store::ListsStore;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "shelf",
    version,
    about = "Keeps a local copy of your show lists in sync with the lists backend",
    arg_required_else_help = true
)]
struct Cli {
    #[arg(long, global = true)]
    profile: Option<String>,

    #[arg(long, global = true, value_name = "PATH")]
    workspace: Option<PathBuf>,

    #[arg(long, global = true)]
    server: Option<String>,

    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true)]
    no_color: bool,

    #[arg(long, global = true)]
    debug: bool,

    #[arg(long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Init,
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
    Sync {
        #[command(subcommand)]
        command: SyncCommand,
    },
    List {
        #[command(subcommand)]
        command: ListCommand,
    },
}

#[derive(Debug, Subcommand)]
enum ProfileCommand {
    List,
    Use {
        name: String,
    },
    Set {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        server: String,
    },
}

#[derive(Debug, Subcommand)]
enum AuthCommand {
    /// Stores an access token for the active profile.
    Login {
        #[arg(long, env = "SHELF_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
    Status,
    Logout,
}

#[derive(Debug, Subcommand)]
enum SyncCommand {
    /// Downloads lists; incremental once the profile has merged all lists.
    Pull {
        #[arg(long)]
        full: bool,
    },
    Status,
    Reset,
}

#[derive(Debug, Subcommand)]
enum ListCommand {
    Show,
    Items { list_id: String },
}

#[derive(Debug, Clone)]
struct GlobalOptions {
    profile: Option<String>,
    workspace: Option<PathBuf>,
    server: Option<String>,
    json: bool,
    yes: bool,
}

#[derive(Debug)]
struct ProfileContext {
    paths: WorkspacePaths,
    profile: String,
    server: String,
    api: ListsApi,
    store: ListsStore,
}

#[derive(Debug, Serialize)]
struct InitOutput {
    workspace: String,
    created: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ProfileChangedOutput {
    profile: String,
    server: String,
}

fn main() {
    let cli = Cli::parse();
    configure_logging(cli.debug, cli.json, cli.no_color);

    let globals = GlobalOptions {
        profile: cli.profile,
        workspace: cli.workspace,
        server: cli.server,
        json: cli.json,
        yes: cli.yes,
    };

    let exit = match run_command(cli.command, &globals) {
        Ok(code) => code,
        Err(error) => {
            render_error(&error, globals.json);
            error.exit_code()
        }
    };

    std::process::exit(exit.as_i32());
}

fn configure_logging(debug: bool, json: bool, no_color: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_ansi(false)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_ansi(!no_color)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn run_command(command: Command, globals: &GlobalOptions) -> ShelfResult<ExitCode> {
    match command {
        Command::Init => commands::profile::cmd_init(globals),
        Command::Profile { command } => commands::profile::cmd_profile(command, globals),
        Command::Auth { command } => commands::auth::cmd_auth(command, globals),
        Command::Sync { command } => commands::sync::cmd_sync(command, globals),
        Command::List { command } => commands::list::cmd_list(command, globals),
    }
}

fn with_profile_context<F>(globals: &GlobalOptions, run: F) -> ShelfResult<ExitCode>
where
    F: FnOnce(ProfileContext) -> ShelfResult<ExitCode>,
{
    let paths = ensure_workspace(globals)?;
    let config = load_config(&paths)?;
    let resolved = resolve_profile(
        &config,
        globals.profile.as_deref(),
        globals.server.as_deref(),
    )?;
    let api = ListsApi::new(&resolved.server)?;
    let store = ListsStore::open(&paths, &resolved.name)?;

    run(ProfileContext {
        paths,
        profile: resolved.name,
        server: resolved.server,
        api,
        store,
    })
}

fn ensure_workspace(globals: &GlobalOptions) -> ShelfResult<WorkspacePaths> {
    let target = workspace_target(globals)?;
    if !WorkspacePaths::from_root(target.clone()).is_initialized() {
        init_workspace(Some(&target), globals.server.as_deref())?;
    }

    resolve_workspace(Some(&target))
}

fn workspace_target(globals: &GlobalOptions) -> ShelfResult<PathBuf> {
    if let Some(path) = &globals.workspace {
        return absolutize(path);
    }

    std::env::current_dir().map_err(|err| {
        ShelfError::io(format!(
            "failed to resolve current directory for default workspace: {err}"
        ))
    })
}

fn absolutize(path: &Path) -> ShelfResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let cwd = std::env::current_dir().map_err(|err| {
        ShelfError::io(format!(
            "failed to resolve current directory for path: {err}"
        ))
    })?;

    Ok(cwd.join(path))
}

fn render_error(error: &ShelfError, json_output: bool) {
    if json_output {
        let payload = json!({
            "ok": false,
            "error": {
                "kind": error.kind,
                "message": &error.message,
            }
        });
        let serialized = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| {
            "{\"ok\":false,\"error\":{\"kind\":\"io\",\"message\":\"failed to serialize error\"}}".to_string()
        });
        eprintln!("{serialized}");
    } else {
        eprintln!("error: {}", error.message);
    }
}

fn print_json<T: Serialize>(value: &T) -> ShelfResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| ShelfError::io(format!("failed to render JSON output: {err}")))?;
    println!("{rendered}");
    Ok(())
}
