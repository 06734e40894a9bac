use serde_json::json;
use shelf_core::{ExitCode, ShelfError, ShelfResult};
use shelf_sync::{ListsSyncEngine, PullOutcome, StoredSessionProvider};
use tracing::{info, warn};

use crate::{GlobalOptions, ProfileContext, SyncCommand, print_json, with_profile_context};

pub(crate) fn cmd_sync(command: SyncCommand, globals: &GlobalOptions) -> ShelfResult<ExitCode> {
    with_profile_context(globals, |ctx| match command {
        SyncCommand::Pull { full } => {
            let outcome = pull_lists(&ctx, full)?;
            if globals.json {
                print_json(&json!({"ok": true, "result": outcome}))?;
            } else {
                let mode = if outcome.incremental {
                    "incremental"
                } else {
                    "full"
                };
                println!(
                    "Pulled {} lists in {} pages ({mode}).",
                    outcome.lists, outcome.pages
                );
                println!(
                    "Inserted {} lists, updated {}, stored {} items.",
                    outcome.summary.inserted_lists,
                    outcome.summary.updated_lists,
                    outcome.summary.items
                );
                if outcome.summary.skipped_items > 0 {
                    println!(
                        "Skipped {} items with unrecognized ids.",
                        outcome.summary.skipped_items
                    );
                }
            }

            Ok(ExitCode::Success)
        }
        SyncCommand::Status => {
            let settings = ctx.store.sync_settings()?;
            let lists = ctx.store.load_lists()?;

            if globals.json {
                print_json(&json!({
                    "ok": true,
                    "result": {
                        "profile": ctx.profile,
                        "server": ctx.server,
                        "local_lists": lists.len(),
                        "settings": settings,
                    }
                }))?;
            } else {
                println!("Profile: {}", ctx.profile);
                println!("Server: {}", ctx.server);
                println!("Local lists: {}", lists.len());
                println!(
                    "Merged all lists: {}",
                    if settings.has_merged_lists { "yes" } else { "no" }
                );
                println!(
                    "Last lists sync: {}",
                    settings
                        .last_lists_sync_at
                        .map(|at| at.to_rfc3339())
                        .unwrap_or_else(|| "never".to_string())
                );
                println!(
                    "Last sync status: {}",
                    settings.last_sync_status.as_deref().unwrap_or("none")
                );
            }

            Ok(ExitCode::Success)
        }
        SyncCommand::Reset => {
            if !globals.yes {
                return Err(ShelfError::usage(
                    "sync reset forgets sync progress; pass --yes to confirm",
                ));
            }

            ctx.store.reset_sync_settings()?;

            if globals.json {
                print_json(&json!({
                    "ok": true,
                    "result": {"profile": ctx.profile, "reset": true}
                }))?;
            } else {
                println!(
                    "Sync progress reset for '{}'; next pull downloads every list.",
                    ctx.profile
                );
            }

            Ok(ExitCode::Success)
        }
    })
}

/// Runs one download and records how it went.
///
/// A full run that merges every page marks the profile as merged and starts
/// the incremental window at the run's start time.
fn pull_lists(ctx: &ProfileContext, full: bool) -> ShelfResult<PullOutcome> {
    let has_merged_lists = !full && ctx.store.has_merged_lists()?;
    let sessions = StoredSessionProvider::new(&ctx.api, &ctx.store);
    let engine = ListsSyncEngine::new(&sessions, &ctx.store, &ctx.store);

    let outcome = match engine.pull(has_merged_lists) {
        Ok(outcome) => outcome,
        Err(err) => {
            if let Err(record_err) = ctx
                .store
                .record_sync_status(&format!("error: {}", err.message))
            {
                warn!("failed to record sync status: {}", record_err.message);
            }
            return Err(err);
        }
    };

    if !outcome.incremental {
        ctx.store.set_last_lists_sync_time(outcome.started_at)?;
        ctx.store.set_has_merged_lists(true)?;
    }
    ctx.store.record_sync_status("ok")?;

    info!(
        profile = %ctx.profile,
        incremental = outcome.incremental,
        lists = outcome.lists,
        "lists pull recorded"
    );
    Ok(outcome)
}
