//! Cursor-following retrieval of the users collection.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::fields::CORE_FIELDS;
use crate::selection::Selection;
use crate::{AccessToken, ExportResult, GraphClient};

/// `$top` used when no expensive field is selected.
pub const DEFAULT_PAGE_SIZE: u32 = 999;

/// `$top` used when an expensive field (sign-in activity) is selected.
pub const REDUCED_PAGE_SIZE: u32 = 500;

/// One page of a Graph collection response.
#[derive(Debug, Deserialize)]
pub struct ODataPage {
    #[serde(default)]
    pub value: Vec<Value>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// `$select` value: core fields, then the selection in order.
#[must_use]
pub fn select_clause(selection: &Selection) -> String {
    CORE_FIELDS
        .into_iter()
        .chain(selection.keys())
        .collect::<Vec<_>>()
        .join(",")
}

/// `$top` value for the selection.
#[must_use]
pub fn page_size(selection: &Selection) -> u32 {
    if selection.fields().iter().any(|f| f.is_expensive()) {
        REDUCED_PAGE_SIZE
    } else {
        DEFAULT_PAGE_SIZE
    }
}

/// Fetches every page of `resource_url` and returns all records in arrival
/// order.
///
/// The query is applied to the first request only; `@odata.nextLink` URLs
/// already carry it. There is no cap on the number of pages.
#[instrument(skip(client, token, selection))]
pub async fn list_all(
    client: &GraphClient,
    resource_url: &str,
    token: &AccessToken,
    selection: &Selection,
) -> ExportResult<Vec<Value>> {
    info!("Fetching users");

    let select = select_clause(selection);
    let top = page_size(selection).to_string();
    let query = [("$select", select.as_str()), ("$top", top.as_str())];

    let mut records = Vec::new();
    let mut page = fetch_page(client, resource_url, token, &query).await?;
    let mut pages = 1usize;

    loop {
        debug!("Page {} with {} records", pages, page.value.len());
        records.extend(page.value);

        match page.next_link {
            Some(next) => {
                debug!("Paging...");
                page = fetch_page(client, &next, token, &[]).await?;
                pages += 1;
            }
            None => break,
        }
    }

    info!("Fetched {} users across {} page(s)", records.len(), pages);
    Ok(records)
}

async fn fetch_page(
    client: &GraphClient,
    url: &str,
    token: &AccessToken,
    query: &[(&str, &str)],
) -> ExportResult<ODataPage> {
    let body = client.get(url, token, query, &[]).await?;
    Ok(serde_json::from_value(body)?)
}
