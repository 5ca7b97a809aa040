use shared::{
    domain::{CategoryId, CreatorId, SortDirection, SortField, SortSpec, WorkId},
    protocol::WorkSummary,
};

use crate::state::QueryState;

/// Normalized request sent to the data API for one search dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    /// Case-insensitive substring matched against title OR description.
    pub text: Option<String>,
    pub category: Option<CategoryId>,
    pub sort: SortSpec,
    pub offset: u32,
    pub limit: u32,
}

impl QueryDescriptor {
    pub fn from_state(state: &QueryState, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let text = Some(state.search_text())
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        Self {
            text,
            category: state.category(),
            sort: state.sort(),
            offset: (state.page() - 1).saturating_mul(page_size),
            limit: page_size,
        }
    }

    /// Inclusive end of the requested row range.
    pub fn range_end(&self) -> u32 {
        self.offset.saturating_add(self.limit.saturating_sub(1))
    }
}

/// Plain list request used by the home and detail views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkListQuery {
    pub featured: Option<bool>,
    pub category: Option<CategoryId>,
    pub creator: Option<CreatorId>,
    pub exclude: Option<WorkId>,
    pub sort: SortSpec,
    pub limit: u32,
}

impl WorkListQuery {
    pub fn new(sort: SortSpec, limit: u32) -> Self {
        Self {
            featured: None,
            category: None,
            creator: None,
            exclude: None,
            sort,
            limit,
        }
    }

    pub fn most_viewed(limit: u32) -> Self {
        Self::new(SortSpec::new(SortField::Views, SortDirection::Desc), limit)
    }

    pub fn latest(limit: u32) -> Self {
        Self::new(SortSpec::default(), limit)
    }

    pub fn featured(mut self) -> Self {
        self.featured = Some(true);
        self
    }

    pub fn in_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    pub fn by_creator(mut self, creator: CreatorId) -> Self {
        self.creator = Some(creator);
        self
    }

    pub fn excluding(mut self, work_id: WorkId) -> Self {
        self.exclude = Some(work_id);
        self
    }
}

/// Rows of one result page together with the exact match count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultPage {
    pub rows: Vec<WorkSummary>,
    pub total_count: u64,
}

impl ResultPage {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_pages(&self, page_size: u32) -> u32 {
        total_pages(self.total_count, page_size)
    }
}

pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    let pages = total_count.div_ceil(u64::from(page_size.max(1)));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_offsets_are_zero_based() {
        let state = QueryState::new("fern", Some(CategoryId(4)), SortSpec::default(), 3);
        let descriptor = state.descriptor(12);
        assert_eq!(descriptor.text.as_deref(), Some("fern"));
        assert_eq!(descriptor.category, Some(CategoryId(4)));
        assert_eq!(descriptor.offset, 24);
        assert_eq!(descriptor.limit, 12);
        assert_eq!(descriptor.range_end(), 35);
    }

    #[test]
    fn empty_search_text_has_no_text_predicate() {
        let descriptor = QueryState::default().descriptor(12);
        assert_eq!(descriptor.text, None);
        assert_eq!(descriptor.offset, 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 12), 0);
        assert_eq!(total_pages(1, 12), 1);
        assert_eq!(total_pages(12, 12), 1);
        assert_eq!(total_pages(13, 12), 2);
        assert_eq!(total_pages(120, 12), 10);
    }
}
