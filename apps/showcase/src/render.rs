//! Plain-text rendering of controller events.

use catalog_client::{
    format::{avatar_url, relative_time, truncate_text, work_image_url, DEFAULT_TRUNCATE_CHARS},
    pagination::{PageControl, PaginationWindow},
    CatalogEvent, NoticeLevel, QueryState, View,
};
use chrono::{DateTime, Utc};
use shared::protocol::{Category, CreatorSummary, WorkDetail, WorkSummary};

fn view_label(view: View) -> &'static str {
    match view {
        View::SearchResults => "results",
        View::WorkDetail => "work",
        View::RelatedWorks => "related works",
        View::FeaturedWorks => "featured works",
        View::FeaturedCreators => "featured creators",
    }
}

pub fn work_card(work: &WorkSummary, now: DateTime<Utc>) -> String {
    let mut card = format!(
        "#{} {} by {} [{}] - {} views - {}",
        work.id,
        work.title,
        work.creator_name(),
        work.category_name(),
        work.views,
        relative_time(work.created_at, now),
    );
    if let Some(description) = work.description.as_deref().filter(|d| !d.trim().is_empty()) {
        card.push_str("\n    ");
        card.push_str(&truncate_text(description, DEFAULT_TRUNCATE_CHARS));
    }
    card
}

fn work_detail(work: &WorkDetail, now: DateTime<Utc>) -> String {
    let mut lines = vec![
        format!("{} (#{})", work.title, work.id),
        format!("  image: {}", work_image_url(work.image_url.as_deref(), &work.title)),
        format!("  category: {}", work.category_name()),
        format!(
            "  views: {}  published: {}",
            work.views,
            relative_time(work.created_at, now)
        ),
    ];
    match work.creator.get() {
        Some(creator) => {
            let avatar = creator
                .avatar_url
                .clone()
                .unwrap_or_else(|| avatar_url(&creator.name));
            lines.push(format!(
                "  creator: {} ({}) {avatar}",
                creator.name,
                creator.specialty_or_default()
            ));
            if let Some(bio) = creator.bio.as_deref() {
                lines.push(format!("    {bio}"));
            }
        }
        None => lines.push(format!("  creator: {}", work.creator_name())),
    }
    if let Some(description) = work.description.as_deref() {
        lines.push(String::new());
        lines.push(description.to_string());
    }
    lines.join("\n")
}

fn creator_card(creator: &CreatorSummary) -> String {
    format!(
        "{} - {} - {} works - {} views",
        creator.name,
        creator.specialty_or_default(),
        creator.work_count(),
        creator.total_views
    )
}

pub fn pagination_strip(window: &PaginationWindow) -> String {
    window
        .controls
        .iter()
        .map(|control| match control {
            PageControl::Previous(_) => "<".to_string(),
            PageControl::Next(_) => ">".to_string(),
            PageControl::Ellipsis => "...".to_string(),
            PageControl::Page {
                number,
                current: true,
            } => format!("[{number}]"),
            PageControl::Page { number, .. } => number.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn controls(state: &QueryState, categories: &[Category]) -> String {
    let category = state
        .category()
        .map(|id| {
            categories
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| id.to_string())
        })
        .unwrap_or_else(|| "all".to_string());
    format!(
        "search: \"{}\"  category: {category}  sort: {}  page: {}",
        state.search_text(),
        state.sort(),
        state.page()
    )
}

fn list<T>(title: &str, items: &[T], card: impl Fn(&T) -> String) -> String {
    let mut out = format!("{title}:");
    for item in items {
        out.push_str("\n  ");
        out.push_str(&card(item));
    }
    out
}

/// Text for one event, or `None` for events with nothing to show.
pub fn render_event(
    event: &CatalogEvent,
    categories: &[Category],
    now: DateTime<Utc>,
) -> Option<String> {
    let text = match event {
        CatalogEvent::Loading(view) => format!("loading {}...", view_label(*view)),
        CatalogEvent::ControlsSynced(state) => controls(state, categories),
        CatalogEvent::CategoriesLoaded(loaded) => {
            let names: Vec<_> = loaded.iter().map(|c| format!("{}={}", c.id, c.name)).collect();
            format!("categories: {}", names.join(", "))
        }
        CatalogEvent::SearchResults {
            page,
            total_pages,
            pagination,
        } => {
            let mut out = format!("{} works, {} pages", page.total_count, total_pages);
            for work in &page.rows {
                out.push_str("\n  ");
                out.push_str(&work_card(work, now));
            }
            if let Some(window) = pagination {
                out.push_str("\n  ");
                out.push_str(&pagination_strip(window));
            }
            out
        }
        CatalogEvent::NoResults => "No matching works. Try different keywords or filters.".into(),
        CatalogEvent::WorkLoaded(work) => work_detail(work, now),
        CatalogEvent::WorkNotFound(Some(id)) => format!("Work {id} does not exist or was removed."),
        CatalogEvent::WorkNotFound(None) => "No work selected.".into(),
        CatalogEvent::RelatedWorks(works) if works.is_empty() => return None,
        CatalogEvent::RelatedWorks(works) => list("related", works, |w| work_card(w, now)),
        CatalogEvent::FeaturedWorks(works) => list("featured works", works, |w| work_card(w, now)),
        CatalogEvent::FeaturedCreators(creators) => {
            list("featured creators", creators, creator_card)
        }
        CatalogEvent::Navigate(id) => format!("-> open work {id}"),
        CatalogEvent::Notice { level, message } => {
            let tag = match level {
                NoticeLevel::Info => "info",
                NoticeLevel::Success => "ok",
                NoticeLevel::Error => "error",
            };
            format!("[{tag}] {message}")
        }
        CatalogEvent::Error { view, message } => {
            format!("failed to load {}: {message}", view_label(*view))
        }
    };
    Some(text)
}
