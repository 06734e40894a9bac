use serde_json::json;
use shelf_core::{ExitCode, ShelfError, ShelfResult};

use crate::{GlobalOptions, ListCommand, print_json, with_profile_context};

pub(crate) fn cmd_list(command: ListCommand, globals: &GlobalOptions) -> ShelfResult<ExitCode> {
    with_profile_context(globals, |ctx| match command {
        ListCommand::Show => {
            let lists = ctx.store.load_lists()?;

            if globals.json {
                print_json(&json!({"ok": true, "result": {"lists": lists}}))?;
            } else if lists.is_empty() {
                println!("No lists stored for '{}'.", ctx.profile);
            } else {
                for list in &lists {
                    println!(
                        "{}\t{}\t(order {}, {} items)",
                        list.list_id, list.name, list.order, list.item_count
                    );
                }
            }

            Ok(ExitCode::Success)
        }
        ListCommand::Items { list_id } => {
            let known = ctx
                .store
                .load_lists()?
                .into_iter()
                .any(|list| list.list_id == list_id);
            if !known {
                return Err(ShelfError::usage(format!(
                    "list '{list_id}' not found in local store"
                )));
            }

            let items = ctx.store.load_list_items(&list_id)?;

            if globals.json {
                print_json(&json!({
                    "ok": true,
                    "result": {"list_id": list_id, "items": items}
                }))?;
            } else {
                for item in &items {
                    println!(
                        "{}\t{:?}\t{}",
                        item.list_item_id, item.item_type, item.item_ref_id
                    );
                }
            }

            Ok(ExitCode::Success)
        }
    })
}
