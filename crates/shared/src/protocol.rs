use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{CategoryId, CreatorId, WorkId};

pub const UNKNOWN_CREATOR: &str = "Unknown creator";
pub const UNCATEGORIZED: &str = "Uncategorized";
pub const DEFAULT_SPECIALTY: &str = "Creative worker";

/// Columns (and embeddings) requested for list views.
pub const WORK_LIST_SELECT: &str = "*,creators(name),categories(name)";
/// Columns (and embeddings) requested for the detail view.
pub const WORK_DETAIL_SELECT: &str = "*,creators(*),categories(*)";

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub trait Named {
    fn name(&self) -> &str;
}

/// An embedded row that may be absent (deleted creator, work without a
/// category, or a query that did not request the embedding).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Related<T>(Option<T>);

impl<T> Default for Related<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T> Related<T> {
    pub fn new(value: T) -> Self {
        Self(Some(value))
    }

    pub fn absent() -> Self {
        Self(None)
    }

    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }
}

impl<T: Named> Related<T> {
    pub fn name_or<'a>(&'a self, default: &'a str) -> &'a str {
        match &self.0 {
            Some(value) if !value.name().trim().is_empty() => value.name(),
            _ => default,
        }
    }
}

impl<T> From<Option<T>> for Related<T> {
    fn from(value: Option<T>) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

impl Named for NamedRef {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Named for Category {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorProfile {
    pub id: CreatorId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl CreatorProfile {
    pub fn specialty_or_default(&self) -> &str {
        self.specialty
            .as_deref()
            .filter(|specialty| !specialty.trim().is_empty())
            .unwrap_or(DEFAULT_SPECIALTY)
    }
}

impl Named for CreatorProfile {
    fn name(&self) -> &str {
        &self.name
    }
}

/// One row of the `works` list views, with creator and category names embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSummary {
    pub id: WorkId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<CreatorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, rename = "creators")]
    pub creator: Related<NamedRef>,
    #[serde(default, rename = "categories")]
    pub category: Related<NamedRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub views: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
}

impl WorkSummary {
    pub fn creator_name(&self) -> &str {
        self.creator.name_or(UNKNOWN_CREATOR)
    }

    pub fn category_name(&self) -> &str {
        self.category.name_or(UNCATEGORIZED)
    }
}

/// A single work with its full creator and category rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkDetail {
    pub id: WorkId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<CreatorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, rename = "creators")]
    pub creator: Related<CreatorProfile>,
    #[serde(default, rename = "categories")]
    pub category: Related<Category>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub views: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
}

impl WorkDetail {
    pub fn creator_name(&self) -> &str {
        self.creator.name_or(UNKNOWN_CREATOR)
    }

    pub fn category_name(&self) -> &str {
        self.category.name_or(UNCATEGORIZED)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedCount {
    pub count: u64,
}

/// A creator card row; `works` is only filled when `works(count)` was embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorSummary {
    pub id: CreatorId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_views: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub works: Vec<EmbeddedCount>,
}

impl CreatorSummary {
    pub fn work_count(&self) -> u64 {
        self.works.iter().map(|entry| entry.count).sum()
    }

    pub fn specialty_or_default(&self) -> &str {
        self.specialty
            .as_deref()
            .filter(|specialty| !specialty.trim().is_empty())
            .unwrap_or(DEFAULT_SPECIALTY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_row_tolerates_missing_embeddings_and_null_counters() {
        let raw = r#"{
            "id": 5,
            "title": "Tide",
            "description": null,
            "creator_id": 2,
            "category_id": null,
            "creators": null,
            "views": null,
            "created_at": "2024-03-01T10:00:00+00:00",
            "featured": null
        }"#;
        let work: WorkSummary = serde_json::from_str(raw).expect("decode");
        assert_eq!(work.id, WorkId(5));
        assert_eq!(work.views, 0);
        assert!(!work.featured);
        assert_eq!(work.creator_name(), UNKNOWN_CREATOR);
        assert_eq!(work.category_name(), UNCATEGORIZED);
    }

    #[test]
    fn embedded_names_are_used_when_present() {
        let raw = r#"{
            "id": 1,
            "title": "Dunes",
            "creators": {"name": "Ada"},
            "categories": {"name": "Photography"},
            "views": 12,
            "created_at": "2024-03-01T10:00:00Z"
        }"#;
        let work: WorkSummary = serde_json::from_str(raw).expect("decode");
        assert_eq!(work.creator_name(), "Ada");
        assert_eq!(work.category_name(), "Photography");
    }

    #[test]
    fn blank_embedded_name_falls_back() {
        let related = Related::new(NamedRef { name: "  ".into() });
        assert_eq!(related.name_or(UNKNOWN_CREATOR), UNKNOWN_CREATOR);
    }

    #[test]
    fn creator_work_count_reads_embedded_aggregate() {
        let raw = r#"{"id": 3, "name": "Lin", "works": [{"count": 7}]}"#;
        let creator: CreatorSummary = serde_json::from_str(raw).expect("decode");
        assert_eq!(creator.work_count(), 7);
        assert_eq!(creator.specialty_or_default(), DEFAULT_SPECIALTY);
    }
}
