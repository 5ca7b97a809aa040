use std::sync::Arc;

use shared::domain::{CategoryId, CreatorId};

use super::*;
use crate::{
    address_bar::MemoryAddressBar,
    error::CatalogError,
    events::NoticeLevel,
    test_support::{catalog, drain, work, FakeCatalogApi},
};

fn controller_at(api: &Arc<FakeCatalogApi>, query: &str) -> Arc<DetailController> {
    DetailController::new(api.clone(), Arc::new(MemoryAddressBar::new("/work", query)))
}

fn related_ids(events: &[CatalogEvent]) -> Option<Vec<i64>> {
    events.iter().find_map(|event| match event {
        CatalogEvent::RelatedWorks(works) => Some(works.iter().map(|w| w.id.0).collect()),
        _ => None,
    })
}

#[tokio::test]
async fn missing_or_malformed_id_shows_not_found() {
    for query in ["", "?id=abc", "?id="] {
        let api = FakeCatalogApi::with_works(catalog(3));
        let controller = controller_at(&api, query);
        let mut events = controller.subscribe_events();

        assert_eq!(controller.initialize().await, DetailOutcome::NotFound);
        assert!(drain(&mut events)
            .iter()
            .any(|event| matches!(event, CatalogEvent::WorkNotFound(None))));
        assert!(api.view_updates().is_empty());
    }
}

#[tokio::test]
async fn loading_counts_the_visit_and_shows_related_works() {
    let api = FakeCatalogApi::with_works(catalog(10));
    let controller = controller_at(&api, "?id=3");
    let mut events = controller.subscribe_events();

    assert_eq!(controller.initialize().await, DetailOutcome::Loaded(WorkId(3)));

    let work = controller.work().await.expect("work stored");
    assert_eq!(work.views, 31);
    assert_eq!(work.category_name(), "Category 1");
    assert_eq!(api.view_updates(), vec![(WorkId(3), 31)]);
    assert_eq!(
        api.list_queries()[0],
        WorkListQuery::most_viewed(RELATED_LIMIT)
            .excluding(WorkId(3))
            .in_category(CategoryId(1))
    );

    let events = drain(&mut events);
    assert!(matches!(events[0], CatalogEvent::Loading(View::WorkDetail)));
    assert!(matches!(&events[1], CatalogEvent::WorkLoaded(w) if w.views == 31));
    assert_eq!(related_ids(&events), Some(vec![9, 7, 5, 1]));
}

#[tokio::test]
async fn unknown_work_is_reported_as_not_found() {
    let api = FakeCatalogApi::with_works(catalog(3));
    let controller = controller_at(&api, "?id=99");
    let mut events = controller.subscribe_events();

    assert_eq!(controller.initialize().await, DetailOutcome::NotFound);
    assert!(drain(&mut events)
        .iter()
        .any(|event| matches!(event, CatalogEvent::WorkNotFound(Some(WorkId(99))))));
    assert!(api.view_updates().is_empty());
    assert_eq!(controller.work().await, None);
}

#[tokio::test]
async fn other_failures_surface_an_error() {
    let api = FakeCatalogApi::with_works(catalog(3));
    api.state().fail_fetch = Some(CatalogError::Network("timed out".into()));
    let controller = controller_at(&api, "?id=1");
    let mut events = controller.subscribe_events();

    assert_eq!(
        controller.initialize().await,
        DetailOutcome::Failed(ErrorCode::Network)
    );
    assert!(drain(&mut events).iter().any(|event| matches!(
        event,
        CatalogEvent::Error { view: View::WorkDetail, .. }
    )));
}

#[tokio::test]
async fn failed_view_update_does_not_block_the_page() {
    let api = FakeCatalogApi::with_works(catalog(3));
    api.state().fail_update_views = Some(CatalogError::Network("offline".into()));
    let controller = controller_at(&api, "?id=2");

    assert_eq!(controller.initialize().await, DetailOutcome::Loaded(WorkId(2)));
    assert_eq!(controller.work().await.map(|w| w.views), Some(21));
}

#[tokio::test]
async fn related_works_fall_back_to_latest() {
    let api = FakeCatalogApi::with_works(vec![
        work(1, "Solo", Some(5), 1),
        work(2, "Other", Some(6), 2),
        work(3, "Third", Some(6), 3),
    ]);
    let controller = controller_at(&api, "");
    let mut events = controller.subscribe_events();

    controller.load(WorkId(1)).await;

    let queries = api.list_queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(
        queries[1],
        WorkListQuery::latest(RELATED_LIMIT).excluding(WorkId(1))
    );
    assert_eq!(related_ids(&drain(&mut events)), Some(vec![3, 2]));
}

#[tokio::test]
async fn uncategorized_work_relates_by_creator() {
    let api = FakeCatalogApi::with_works(vec![
        work(1, "Loose", None, 1),
        work(2, "Sibling", None, 2),
    ]);
    let controller = controller_at(&api, "");

    controller.load(WorkId(1)).await;

    assert_eq!(api.list_queries()[0].creator, Some(CreatorId(1)));
    assert_eq!(api.list_queries()[0].category, None);
}

#[tokio::test]
async fn related_failure_hides_the_section() {
    let api = FakeCatalogApi::with_works(catalog(4));
    api.state().fail_list_works = Some(CatalogError::Network("offline".into()));
    let controller = controller_at(&api, "");
    let mut events = controller.subscribe_events();

    assert_eq!(controller.load(WorkId(2)).await, DetailOutcome::Loaded(WorkId(2)));
    assert_eq!(related_ids(&drain(&mut events)), Some(Vec::new()));
}

#[tokio::test]
async fn random_work_skips_the_current_one() {
    let api = FakeCatalogApi::with_works(catalog(2));
    let controller = controller_at(&api, "?id=1");
    controller.initialize().await;

    assert_eq!(controller.random_work().await, Some(WorkId(2)));
}

#[tokio::test]
async fn random_work_with_nothing_else_shows_a_notice() {
    let api = FakeCatalogApi::with_works(catalog(1));
    let controller = controller_at(&api, "?id=1");
    controller.initialize().await;
    let mut events = controller.subscribe_events();

    assert_eq!(controller.random_work().await, None);
    assert!(drain(&mut events).iter().any(|event| matches!(
        event,
        CatalogEvent::Notice { level: NoticeLevel::Info, message } if message == "No other works to browse yet"
    )));
}
