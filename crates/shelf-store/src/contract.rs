use serde::{Deserialize, Serialize};

pub const LIST_ITEM_ID_SEPARATOR: char = '-';

/// Kind of entity a list item points at. The discriminant is the code used
/// in list item ids and in the `item_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Show = 1,
    Season = 2,
    Episode = 3,
}

impl ItemType {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Show),
            2 => Some(Self::Season),
            3 => Some(Self::Episode),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedListItemId {
    pub item_ref_id: i32,
    pub item_type: ItemType,
}

/// Builds `<itemRefId>-<itemType>-<listId>`.
pub fn list_item_id(item_ref_id: i32, item_type: ItemType, list_id: &str) -> String {
    format!(
        "{item_ref_id}{LIST_ITEM_ID_SEPARATOR}{}{LIST_ITEM_ID_SEPARATOR}{list_id}",
        item_type.code()
    )
}

/// Splits a list item id into its item reference and type components.
///
/// Accepts `<ref>-<type>` and `<ref>-<type>-<listId>`; the list id suffix may
/// itself contain separators. Returns `None` when either leading component
/// is missing or empty.
pub fn split_list_item_id(list_item_id: &str) -> Option<(&str, &str)> {
    let mut parts = list_item_id.splitn(3, LIST_ITEM_ID_SEPARATOR);
    let item_ref = parts.next()?;
    let item_type = parts.next()?;
    if item_ref.is_empty() || item_type.is_empty() {
        return None;
    }

    Some((item_ref, item_type))
}

/// `None` for anything that should not produce a local record.
pub fn parse_list_item_id(list_item_id: &str) -> Option<ParsedListItemId> {
    let (item_ref, item_type) = split_list_item_id(list_item_id)?;
    let item_ref_id = item_ref.parse::<i32>().ok()?;
    let item_type = ItemType::from_code(item_type.parse::<i32>().ok()?)?;

    Some(ParsedListItemId {
        item_ref_id,
        item_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_and_three_part_ids() {
        assert_eq!(
            parse_list_item_id("100-1"),
            Some(ParsedListItemId {
                item_ref_id: 100,
                item_type: ItemType::Show,
            })
        );
        assert_eq!(
            parse_list_item_id("81189-3-list-favorites"),
            Some(ParsedListItemId {
                item_ref_id: 81189,
                item_type: ItemType::Episode,
            })
        );
    }

    #[test]
    fn rejects_unparseable_or_unknown_ids() {
        for id in ["bad-id", "100", "", "-1", "100-", "abc-1", "100-x", "100-4", "100-0", "-100-1"] {
            assert_eq!(parse_list_item_id(id), None, "{id} should be rejected");
        }
    }

    #[test]
    fn generated_ids_parse_back() {
        let id = list_item_id(42, ItemType::Season, "5");
        assert_eq!(id, "42-2-5");
        let parsed = parse_list_item_id(&id).expect("parse generated id");
        assert_eq!(parsed.item_ref_id, 42);
        assert_eq!(parsed.item_type, ItemType::Season);
    }
}
