//! Two-way mapping between [`QueryState`] and the page's query string.
//!
//! | param      | present when            |
//! |------------|-------------------------|
//! | `search`   | search text non-empty   |
//! | `category` | a category is selected  |
//! | `sort`     | sort is not the default |
//! | `page`     | page > 1                |

use std::sync::Mutex;

use shared::domain::{CategoryId, SortSpec};
use tracing::debug;
use url::form_urlencoded;

use crate::state::{coerce_page, QueryState};

pub const PARAM_SEARCH: &str = "search";
pub const PARAM_CATEGORY: &str = "category";
pub const PARAM_SORT: &str = "sort";
pub const PARAM_PAGE: &str = "page";

/// The location the current view's query string lives in.
pub trait AddressBar: Send + Sync {
    fn query(&self) -> String;
    /// Replaces the query string without adding a history entry.
    fn replace_query(&self, query: &str);
}

pub fn encode_query(state: &QueryState) -> String {
    let mut params = form_urlencoded::Serializer::new(String::new());
    if !state.search_text().is_empty() {
        params.append_pair(PARAM_SEARCH, state.search_text());
    }
    if let Some(category) = state.category() {
        params.append_pair(PARAM_CATEGORY, &category.to_string());
    }
    if !state.sort().is_default() {
        params.append_pair(PARAM_SORT, &state.sort().token());
    }
    if state.page() > 1 {
        params.append_pair(PARAM_PAGE, &state.page().to_string());
    }
    params.finish()
}

/// Missing or malformed params fall back to their defaults; the first
/// occurrence of a repeated key wins.
pub fn decode_query(raw: &str) -> QueryState {
    let raw = raw.trim().trim_start_matches('?');

    let mut search = None;
    let mut category = None;
    let mut sort = None;
    let mut page = None;

    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        let slot = match key.as_ref() {
            PARAM_SEARCH => &mut search,
            PARAM_CATEGORY => &mut category,
            PARAM_SORT => &mut sort,
            PARAM_PAGE => &mut page,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }

    let category = category.and_then(|raw| match raw.parse::<CategoryId>() {
        Ok(id) => Some(id),
        Err(_) => {
            if !raw.trim().is_empty() {
                debug!(category = %raw, "ignoring malformed category param");
            }
            None
        }
    });
    let sort = sort
        .and_then(|raw| match raw.parse::<SortSpec>() {
            Ok(spec) => Some(spec),
            Err(err) => {
                debug!(%err, "falling back to default sort");
                None
            }
        })
        .unwrap_or_default();
    let page = page.as_deref().map(coerce_page).unwrap_or(1);

    QueryState::new(search.unwrap_or_default(), category, sort, page)
}

pub fn read_state(address_bar: &dyn AddressBar) -> QueryState {
    decode_query(&address_bar.query())
}

pub fn write_state(address_bar: &dyn AddressBar, state: &QueryState) {
    address_bar.replace_query(&encode_query(state));
}

/// In-process address bar, used by the CLI and tests.
#[derive(Debug)]
pub struct MemoryAddressBar {
    path: String,
    query: Mutex<String>,
}

impl MemoryAddressBar {
    pub fn new(path: impl Into<String>, query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            path: path.into(),
            query: Mutex::new(query.trim_start_matches('?').to_string()),
        }
    }

    /// Splits `path?query` the way a browser location would.
    pub fn from_href(href: &str) -> Self {
        match href.split_once('?') {
            Some((path, query)) => Self::new(path, query),
            None => Self::new(href, ""),
        }
    }

    pub fn href(&self) -> String {
        let query = self.query();
        if query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{query}", self.path)
        }
    }
}

impl AddressBar for MemoryAddressBar {
    fn query(&self) -> String {
        self.query
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn replace_query(&self, query: &str) {
        let mut guard = self
            .query
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = query.trim_start_matches('?').to_string();
    }
}
