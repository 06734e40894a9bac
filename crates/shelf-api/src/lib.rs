use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Deserializer, Serialize};
use shelf_core::{ShelfError, ShelfResult};
use std::time::Duration;

const LISTS_PATH: &str = "/lists/v1/lists";
const USER_AGENT: &str = concat!("shelf/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ListsApi {
    base_url: String,
    client: Client,
}

/// Query for one page of the remote lists endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListsQuery {
    pub limit: u32,
    pub updated_since: Option<DateTime<Utc>>,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListsPage {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lists: Vec<RemoteList>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteList {
    pub list_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub list_items: Vec<RemoteListItem>,
}

/// The backend sends `null` where a field has no value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteListItem {
    pub list_item_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    reason: Option<String>,
}

impl ListsApi {
    pub fn new(base_url: &str) -> ShelfResult<Self> {
        let trimmed = base_url.trim_end_matches('/').to_string();
        if trimmed.is_empty() {
            return Err(ShelfError::usage("server URL cannot be empty"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| ShelfError::io(format!("failed to construct API client: {err}")))?;

        Ok(Self {
            base_url: trimmed,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches one page of lists.
    ///
    /// `Ok(None)` means the backend answered without a body (204 or a JSON
    /// `null`). Callers treat that as the end of data rather than a failure.
    pub fn get_lists(&self, access_token: &str, query: &ListsQuery) -> ShelfResult<Option<ListsPage>> {
        if access_token.trim().is_empty() {
            return Err(ShelfError::auth("access token is required to fetch lists"));
        }

        let mut params: Vec<(&str, String)> = vec![("limit", query.limit.max(1).to_string())];
        if let Some(updated_since) = query.updated_since {
            params.push((
                "updatedSince",
                updated_since.to_rfc3339_opts(SecondsFormat::Millis, true),
            ));
        }
        if let Some(cursor) = query.cursor.as_deref()
            && !cursor.trim().is_empty()
        {
            params.push(("cursor", cursor.to_string()));
        }

        let response = self
            .client
            .get(self.url(LISTS_PATH))
            .bearer_auth(access_token)
            .query(&params)
            .send()
            .map_err(network_error)?;

        parse_optional_page(response)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn parse_optional_page(response: Response) -> ShelfResult<Option<ListsPage>> {
    let status = response.status();
    if status == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let body_text = response
        .text()
        .map_err(|err| ShelfError::sync(format!("failed to read API response body: {err}")))?;

    if !status.is_success() {
        return Err(parse_error_response(status, &body_text));
    }

    let trimmed = body_text.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }

    serde_json::from_str::<ListsPage>(trimmed)
        .map(Some)
        .map_err(|err| ShelfError::sync(format!("failed to decode lists response JSON: {err}")))
}

fn parse_error_response(status: StatusCode, body_text: &str) -> ShelfError {
    let body_trimmed = body_text.trim();
    let fallback = if body_trimmed.is_empty() {
        format!("request failed with status {}", status.as_u16())
    } else {
        format!(
            "request failed with status {}: {}",
            status.as_u16(),
            truncate_for_error(body_trimmed, 240)
        )
    };

    let parsed = serde_json::from_str::<ErrorEnvelope>(body_text).ok();
    let message = parsed
        .as_ref()
        .and_then(|payload| payload.error.as_ref())
        .and_then(|error| error.message.clone().or_else(|| error.reason.clone()))
        .or_else(|| parsed.as_ref().and_then(|payload| payload.message.clone()))
        .unwrap_or(fallback);

    let message = format!("{message} [http_status={}]", status.as_u16());
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        ShelfError::auth(message)
    } else {
        ShelfError::sync(message)
    }
}

fn truncate_for_error(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }

    let truncated: String = input.chars().take(max_chars).collect();
    format!("{truncated}...")
}

fn network_error(err: reqwest::Error) -> ShelfError {
    ShelfError::sync(format!("network request failed: {err}"))
}
