use chrono::{TimeZone, Utc};
use httpmock::Method::GET;
use httpmock::MockServer;
use serde_json::json;
use shelf_api::{ListsApi, ListsQuery};
use shelf_core::ErrorKind;

#[test]
fn get_lists_sends_paging_parameters_and_decodes_page() {
    let server = MockServer::start();

    let page = server.mock(|when, then| {
        when.method(GET)
            .path("/lists/v1/lists")
            .header("authorization", "Bearer token-1")
            .query_param("limit", "10")
            .query_param("updatedSince", "2026-01-02T03:04:05.000Z")
            .query_param("cursor", "cursor-1");
        then.status(200).json_body(json!({
            "cursor": "cursor-2",
            "lists": [{
                "listId": "5",
                "name": "Favorites",
                "order": 1,
                "listItems": [{"listItemId": "100-1-5"}]
            }]
        }));
    });

    let api = ListsApi::new(&server.base_url()).expect("api client");
    let result = api
        .get_lists(
            "token-1",
            &ListsQuery {
                limit: 10,
                updated_since: Some(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()),
                cursor: Some("cursor-1".to_string()),
            },
        )
        .expect("get lists")
        .expect("page present");

    page.assert_hits(1);
    assert_eq!(result.cursor.as_deref(), Some("cursor-2"));
    assert_eq!(result.lists.len(), 1);
    assert_eq!(result.lists[0].list_id, "5");
    assert_eq!(result.lists[0].name, "Favorites");
    assert_eq!(result.lists[0].order, Some(1));
    assert_eq!(result.lists[0].list_items[0].list_item_id, "100-1-5");
}

#[test]
fn get_lists_maps_no_content_to_none() {
    let server = MockServer::start();

    let empty = server.mock(|when, then| {
        when.method(GET).path("/lists/v1/lists");
        then.status(204);
    });

    let api = ListsApi::new(&server.base_url()).expect("api client");
    let result = api
        .get_lists("token-1", &ListsQuery { limit: 10, ..ListsQuery::default() })
        .expect("get lists");

    empty.assert_hits(1);
    assert!(result.is_none());
}

#[test]
fn get_lists_maps_null_body_to_none() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/lists/v1/lists");
        then.status(200)
            .header("content-type", "application/json")
            .body("null");
    });

    let api = ListsApi::new(&server.base_url()).expect("api client");
    let result = api
        .get_lists("token-1", &ListsQuery { limit: 10, ..ListsQuery::default() })
        .expect("get lists");

    assert!(result.is_none());
}

#[test]
fn get_lists_maps_null_lists_to_empty_page() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/lists/v1/lists");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"cursor":"c2","lists":null}"#);
    });

    let api = ListsApi::new(&server.base_url()).expect("api client");
    let page = api
        .get_lists("token-1", &ListsQuery::default())
        .expect("get lists")
        .expect("page present");

    assert_eq!(page.cursor.as_deref(), Some("c2"));
    assert!(page.lists.is_empty());
}

#[test]
fn get_lists_accepts_null_name_and_items() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/lists/v1/lists");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"lists":[{"listId":"5","name":null,"listItems":null}]}"#);
    });

    let api = ListsApi::new(&server.base_url()).expect("api client");
    let page = api
        .get_lists("token-1", &ListsQuery::default())
        .expect("get lists")
        .expect("page present");

    assert_eq!(page.lists.len(), 1);
    assert_eq!(page.lists[0].list_id, "5");
    assert_eq!(page.lists[0].name, "");
    assert!(page.lists[0].list_items.is_empty());
}

#[test]
fn get_lists_reports_unauthorized_as_auth_error() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/lists/v1/lists");
        then.status(401).json_body(json!({
            "error": {"code": 401, "message": "Invalid credentials"}
        }));
    });

    let api = ListsApi::new(&server.base_url()).expect("api client");
    let error = api
        .get_lists("expired", &ListsQuery { limit: 10, ..ListsQuery::default() })
        .expect_err("unauthorized should fail");

    assert_eq!(error.kind, ErrorKind::Auth);
    assert!(error.message.contains("Invalid credentials"));
    assert!(error.message.contains("[http_status=401]"));
}

#[test]
fn get_lists_reports_server_errors_as_sync_error() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/lists/v1/lists");
        then.status(503).body("backend unavailable");
    });

    let api = ListsApi::new(&server.base_url()).expect("api client");
    let error = api
        .get_lists("token-1", &ListsQuery { limit: 10, ..ListsQuery::default() })
        .expect_err("503 should fail");

    assert_eq!(error.kind, ErrorKind::Sync);
    assert!(error.message.contains("backend unavailable"));
}

#[test]
fn get_lists_requires_access_token() {
    let api = ListsApi::new("http://127.0.0.1:9").expect("api client");
    let error = api
        .get_lists("  ", &ListsQuery::default())
        .expect_err("blank token should fail");

    assert_eq!(error.kind, ErrorKind::Auth);
}
