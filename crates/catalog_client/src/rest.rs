//! PostgREST-backed [`CatalogApi`] for the hosted catalog database.

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, AUTHORIZATION, CONTENT_RANGE},
    Client, RequestBuilder, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use shared::{
    domain::{SortSpec, WorkId},
    error::ApiError,
    protocol::{
        Category, CreatorSummary, WorkDetail, WorkSummary, WORK_DETAIL_SELECT, WORK_LIST_SELECT,
    },
};
use tracing::{debug, warn};

use crate::{
    api::CatalogApi,
    error::{CatalogError, CatalogResult},
    query::{QueryDescriptor, ResultPage, WorkListQuery},
};

const WORKS: &str = "works";
const CATEGORIES: &str = "categories";
const CREATORS: &str = "creators";

type Params = Vec<(&'static str, String)>;

pub struct RestCatalogApi {
    http: Client,
    rest_url: String,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct IdRow {
    id: WorkId,
}

#[derive(Debug, Serialize)]
struct ViewsPatch {
    views: u64,
}

impl RestCatalogApi {
    /// `project_url` is the service root; tables live under `/rest/v1`.
    pub fn new(project_url: impl AsRef<str>, anon_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), project_url, anon_key)
    }

    pub fn with_client(
        http: Client,
        project_url: impl AsRef<str>,
        anon_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            rest_url: format!("{}/rest/v1", project_url.as_ref().trim_end_matches('/')),
            anon_key: anon_key.into(),
        }
    }

    fn request(&self, method: reqwest::Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{table}", self.rest_url))
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.anon_key))
    }

    async fn get_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &Params,
    ) -> CatalogResult<Vec<T>> {
        debug!(table, ?params, "data api select");
        let response = execute(self.request(reqwest::Method::GET, table).query(params)).await?;
        Ok(response.json().await?)
    }
}

async fn execute(request: RequestBuilder) -> CatalogResult<Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(remote_error(status, response).await)
}

async fn remote_error(status: StatusCode, response: Response) -> CatalogError {
    let body = response.text().await.unwrap_or_default();
    let error = serde_json::from_str::<ApiError>(&body)
        .unwrap_or_else(|_| ApiError::new(status.as_str(), body.trim()));
    CatalogError::Remote {
        status: status.as_u16(),
        error,
    }
}

/// Reads the total from `Content-Range: 0-11/57` or `*/0`.
pub(crate) fn content_range_total(headers: &HeaderMap) -> Option<u64> {
    let value = headers.get(CONTENT_RANGE)?.to_str().ok()?;
    let (_, total) = value.rsplit_once('/')?;
    total.trim().parse().ok()
}

/// Quotes a value for use inside a PostgREST logical expression, wrapping
/// it in `*` wildcards for a substring match.
///
/// Escapes apply twice: once for the PostgREST quoted value and once for
/// LIKE, so `\`, `%` and `_` match literally. A `*` in `text` still acts as
/// a wildcard; PostgREST offers no way to escape it.
pub(crate) fn substring_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str(r"\\\\"),
            '%' | '_' => {
                escaped.push_str(r"\\");
                escaped.push(ch);
            }
            '"' => escaped.push_str(r#"\""#),
            _ => escaped.push(ch),
        }
    }
    format!("\"*{escaped}*\"")
}

fn order_param(sort: SortSpec) -> String {
    format!("{}.{}", sort.field.column(), sort.direction.as_str())
}

pub(crate) fn search_params(descriptor: &QueryDescriptor) -> Params {
    let mut params: Params = vec![("select", WORK_LIST_SELECT.to_string())];
    if let Some(text) = &descriptor.text {
        let pattern = substring_pattern(text);
        params.push((
            "or",
            format!("(title.ilike.{pattern},description.ilike.{pattern})"),
        ));
    }
    if let Some(category) = descriptor.category {
        params.push(("category_id", format!("eq.{category}")));
    }
    params.push(("order", order_param(descriptor.sort)));
    params.push(("offset", descriptor.offset.to_string()));
    params.push(("limit", descriptor.limit.to_string()));
    params
}

pub(crate) fn list_params(query: &WorkListQuery) -> Params {
    let mut params: Params = vec![("select", WORK_LIST_SELECT.to_string())];
    if let Some(featured) = query.featured {
        params.push(("featured", format!("eq.{featured}")));
    }
    if let Some(category) = query.category {
        params.push(("category_id", format!("eq.{category}")));
    }
    if let Some(creator) = query.creator {
        params.push(("creator_id", format!("eq.{creator}")));
    }
    if let Some(exclude) = query.exclude {
        params.push(("id", format!("neq.{exclude}")));
    }
    params.push(("order", order_param(query.sort)));
    params.push(("limit", query.limit.to_string()));
    params
}

#[async_trait]
impl CatalogApi for RestCatalogApi {
    async fn search_works(&self, descriptor: &QueryDescriptor) -> CatalogResult<ResultPage> {
        let params = search_params(descriptor);
        debug!(?params, "data api search");
        let response = self
            .request(reqwest::Method::GET, WORKS)
            .header("Prefer", "count=exact")
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        // Past-the-end offsets are reported as 416 but still carry the total.
        if status == StatusCode::RANGE_NOT_SATISFIABLE {
            if let Some(total_count) = content_range_total(response.headers()) {
                return Ok(ResultPage {
                    rows: Vec::new(),
                    total_count,
                });
            }
        }
        if !status.is_success() {
            return Err(remote_error(status, response).await);
        }

        let total = content_range_total(response.headers());
        let rows: Vec<WorkSummary> = response.json().await?;
        let total_count = total.unwrap_or_else(|| {
            warn!("data api omitted the exact count; estimating from the page");
            u64::from(descriptor.offset) + rows.len() as u64
        });
        Ok(ResultPage { rows, total_count })
    }

    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let params = vec![("select", "*".to_string()), ("order", "name.asc".to_string())];
        self.get_rows(CATEGORIES, &params).await
    }

    async fn fetch_work(&self, work_id: WorkId) -> CatalogResult<WorkDetail> {
        let params = vec![
            ("select", WORK_DETAIL_SELECT.to_string()),
            ("id", format!("eq.{work_id}")),
            ("limit", "1".to_string()),
        ];
        let rows: Vec<WorkDetail> = self.get_rows(WORKS, &params).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| CatalogError::not_found("work", work_id))
    }

    async fn list_works(&self, query: &WorkListQuery) -> CatalogResult<Vec<WorkSummary>> {
        self.get_rows(WORKS, &list_params(query)).await
    }

    async fn update_views(&self, work_id: WorkId, views: u64) -> CatalogResult<()> {
        debug!(%work_id, views, "data api update views");
        execute(
            self.request(reqwest::Method::PATCH, WORKS)
                .header("Prefer", "return=minimal")
                .query(&[("id", format!("eq.{work_id}"))])
                .json(&ViewsPatch { views }),
        )
        .await?;
        Ok(())
    }

    async fn list_work_ids(
        &self,
        exclude: Option<WorkId>,
        limit: u32,
    ) -> CatalogResult<Vec<WorkId>> {
        let mut params = vec![("select", "id".to_string())];
        if let Some(exclude) = exclude {
            params.push(("id", format!("neq.{exclude}")));
        }
        params.push(("limit", limit.to_string()));
        let rows: Vec<IdRow> = self.get_rows(WORKS, &params).await?;
        Ok(rows.into_iter().map(|row| row.id).collect())
    }

    async fn list_creators(
        &self,
        featured_only: bool,
        limit: u32,
    ) -> CatalogResult<Vec<CreatorSummary>> {
        let mut params = Vec::new();
        if featured_only {
            params.push(("select", "*".to_string()));
            params.push(("featured", "eq.true".to_string()));
        } else {
            params.push(("select", "*,works(count)".to_string()));
        }
        params.push(("order", "created_at.desc".to_string()));
        params.push(("limit", limit.to_string()));
        self.get_rows(CREATORS, &params).await
    }
}

#[cfg(test)]
#[path = "tests/rest_tests.rs"]
mod tests;
