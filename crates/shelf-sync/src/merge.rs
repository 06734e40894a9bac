use serde::Serialize;
use shelf_api::RemoteList;
use shelf_store::{ListOperation, parse_list_item_id};
use std::collections::HashSet;
use tracing::debug;

/// Operations for one page of remote lists, plus what went into them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagePlan {
    pub operations: Vec<ListOperation>,
    pub summary: PageSummary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub inserted_lists: usize,
    pub updated_lists: usize,
    pub items: usize,
    pub skipped_items: usize,
}

impl PageSummary {
    pub fn absorb(&mut self, other: PageSummary) {
        self.inserted_lists += other.inserted_lists;
        self.updated_lists += other.updated_lists;
        self.items += other.items;
        self.skipped_items += other.skipped_items;
    }
}

/// Turns a page of remote lists into store operations.
///
/// `local_list_ids` is the snapshot taken before the run; lists inserted by
/// earlier pages are not in it. Item ids that do not parse are dropped.
pub fn build_page_operations(lists: &[RemoteList], local_list_ids: &HashSet<String>) -> PagePlan {
    let mut plan = PagePlan::default();

    for list in lists {
        let list_id = list.list_id.clone();
        if local_list_ids.contains(&list.list_id) {
            plan.summary.updated_lists += 1;
            plan.operations.push(ListOperation::UpdateList {
                list_id: list_id.clone(),
                name: list.name.clone(),
                order: list.order,
            });
        } else {
            plan.summary.inserted_lists += 1;
            plan.operations.push(ListOperation::InsertList {
                list_id: list_id.clone(),
                name: list.name.clone(),
                order: list.order,
            });
        }

        for item in &list.list_items {
            let Some(parsed) = parse_list_item_id(&item.list_item_id) else {
                debug!(
                    list_id = %list.list_id,
                    list_item_id = %item.list_item_id,
                    "skipping list item with unrecognized id"
                );
                plan.summary.skipped_items += 1;
                continue;
            };

            plan.summary.items += 1;
            plan.operations.push(ListOperation::InsertListItem {
                list_item_id: item.list_item_id.clone(),
                item_ref_id: parsed.item_ref_id,
                item_type: parsed.item_type,
                list_id: list_id.clone(),
            });
        }
    }

    plan
}
