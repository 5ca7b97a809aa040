//! Search/filter/sort/page state for one search view.

use shared::domain::{CategoryId, SortSpec};

use crate::query::QueryDescriptor;

pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Mutable search state. Every mutator keeps `page >= 1`, and every filter
/// or sort change sends the view back to the first page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    search_text: String,
    category: Option<CategoryId>,
    sort: SortSpec,
    page: u32,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            category: None,
            sort: SortSpec::default(),
            page: 1,
        }
    }
}

impl QueryState {
    pub fn new(
        search_text: impl AsRef<str>,
        category: Option<CategoryId>,
        sort: SortSpec,
        page: u32,
    ) -> Self {
        Self {
            search_text: search_text.as_ref().trim().to_string(),
            category,
            sort,
            page: page.max(1),
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn category(&self) -> Option<CategoryId> {
        self.category
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Returns `false` and leaves the state untouched when the trimmed text
    /// equals the current one.
    pub fn apply_search_text(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text == self.search_text {
            return false;
        }
        self.search_text = text.to_string();
        self.page = 1;
        true
    }

    pub fn apply_category(&mut self, category: Option<CategoryId>) {
        self.category = category;
        self.page = 1;
    }

    pub fn apply_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
        self.page = 1;
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn descriptor(&self, page_size: u32) -> QueryDescriptor {
        QueryDescriptor::from_state(self, page_size)
    }
}

/// Coerces an untyped page value the way the address bar does: anything that
/// is not an integer `>= 1` becomes page 1.
pub fn coerce_page(raw: &str) -> u32 {
    match raw.trim().parse::<i64>() {
        Ok(page) if page >= 1 => u32::try_from(page).unwrap_or(u32::MAX),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::{SortDirection, SortField};

    use super::*;

    #[test]
    fn fresh_state_matches_documented_defaults() {
        let state = QueryState::default();
        assert_eq!(state.search_text(), "");
        assert_eq!(state.category(), None);
        assert_eq!(
            state.sort(),
            SortSpec::new(SortField::CreatedAt, SortDirection::Desc)
        );
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn filter_and_sort_changes_reset_page() {
        let mut state = QueryState::new("", None, SortSpec::default(), 4);
        assert!(state.apply_search_text("  lantern "));
        assert_eq!(state.search_text(), "lantern");
        assert_eq!(state.page(), 1);

        state.set_page(3);
        state.apply_category(Some(CategoryId(2)));
        assert_eq!(state.page(), 1);

        state.set_page(5);
        state.apply_sort(SortSpec::new(SortField::Views, SortDirection::Desc));
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn unchanged_search_text_keeps_page() {
        let mut state = QueryState::new("lantern", None, SortSpec::default(), 3);
        assert!(!state.apply_search_text(" lantern  "));
        assert_eq!(state.page(), 3);
    }

    #[test]
    fn page_coercion() {
        assert_eq!(coerce_page("3"), 3);
        assert_eq!(coerce_page("0"), 1);
        assert_eq!(coerce_page("-5"), 1);
        assert_eq!(coerce_page("NaN"), 1);
        assert_eq!(coerce_page(""), 1);
        assert_eq!(coerce_page("99999999999"), u32::MAX);
    }
}
