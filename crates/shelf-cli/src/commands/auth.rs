use chrono::Utc;
use serde_json::json;
use shelf_core::{ExitCode, ShelfError, ShelfResult};
use shelf_store::StoredSession;

use crate::{AuthCommand, GlobalOptions, print_json, with_profile_context};

pub(crate) fn cmd_auth(command: AuthCommand, globals: &GlobalOptions) -> ShelfResult<ExitCode> {
    with_profile_context(globals, |ctx| match command {
        AuthCommand::Login { token } => {
            let access_token = token
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    ShelfError::auth("missing access token; pass --token or set SHELF_TOKEN")
                })?;

            let session = StoredSession {
                profile: ctx.profile.clone(),
                server: ctx.server.clone(),
                access_token,
                saved_at: Utc::now().to_rfc3339(),
            };
            ctx.store.save_session(&session)?;

            if globals.json {
                print_json(&json!({
                    "ok": true,
                    "result": {
                        "profile": ctx.profile,
                        "server": ctx.server,
                        "saved_at": session.saved_at,
                    }
                }))?;
            } else {
                println!("Token saved for {}", ctx.server);
                println!("Profile: {}", ctx.profile);
                println!("Session saved: {}", ctx.paths.state_db_path.display());
            }

            Ok(ExitCode::Success)
        }
        AuthCommand::Status => {
            let session = ctx.store.load_session()?;
            let reason = match &session {
                None => Some("no stored session"),
                Some(stored) if stored.server.trim_end_matches('/') != ctx.api.base_url() => {
                    Some("stored session belongs to a different server")
                }
                Some(_) => None,
            };
            let authenticated = reason.is_none();

            if globals.json {
                print_json(&json!({
                    "ok": authenticated,
                    "result": {
                        "profile": ctx.profile,
                        "server": ctx.server,
                        "authenticated": authenticated,
                        "reason": reason,
                        "saved_at": session.as_ref().map(|stored| stored.saved_at.clone()),
                    }
                }))?;
            } else {
                println!("Server: {}", ctx.server);
                println!("Profile: {}", ctx.profile);
                println!("Authenticated: {}", if authenticated { "yes" } else { "no" });
                if let Some(reason) = reason {
                    println!("Reason: {reason}");
                }
                if let Some(stored) = &session {
                    println!("Saved at: {}", stored.saved_at);
                }
            }

            Ok(if authenticated {
                ExitCode::Success
            } else {
                ExitCode::Auth
            })
        }
        AuthCommand::Logout => {
            ctx.store.remove_session()?;

            if globals.json {
                print_json(&json!({
                    "ok": true,
                    "result": {
                        "profile": ctx.profile,
                        "logged_out": true,
                    }
                }))?;
            } else {
                println!("Logged out profile '{}'.", ctx.profile);
            }

            Ok(ExitCode::Success)
        }
    })
}
