pub mod address_bar;
pub mod api;
pub mod debounce;
pub mod detail;
pub mod error;
pub mod events;
pub mod format;
pub mod home;
pub mod pagination;
pub mod query;
pub mod random;
pub mod rest;
pub mod search;
pub mod state;

pub use address_bar::{AddressBar, MemoryAddressBar};
pub use api::{CatalogApi, MissingCatalogApi};
pub use detail::{DetailController, DetailOutcome};
pub use error::{CatalogError, CatalogResult};
pub use events::{CatalogEvent, NoticeLevel, View};
pub use home::HomeController;
pub use rest::RestCatalogApi;
pub use search::{DispatchOutcome, SearchController, SearchOptions};
pub use state::QueryState;

/// Buffer for controller event channels; slow subscribers lag rather than block.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
