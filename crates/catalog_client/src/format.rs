//! Display helpers shared by every renderer.

use chrono::{DateTime, Utc};
use url::form_urlencoded::byte_serialize;

pub const DEFAULT_TRUNCATE_CHARS: usize = 100;

const PLACEHOLDER_HOST: &str = "https://picsum.photos/seed";

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

/// "just now", "5 minutes ago", ... and a plain date past 30 days.
pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);
    if elapsed.num_minutes() < 1 {
        "just now".to_string()
    } else if elapsed.num_hours() < 1 {
        plural(elapsed.num_minutes(), "minute")
    } else if elapsed.num_days() < 1 {
        plural(elapsed.num_hours(), "hour")
    } else if elapsed.num_days() < 30 {
        plural(elapsed.num_days(), "day")
    } else {
        timestamp.format("%Y-%m-%d").to_string()
    }
}

pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn seed(text: &str, fallback: &str) -> String {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|word| byte_serialize(word.as_bytes()).collect())
        .collect();
    if words.is_empty() {
        fallback.to_string()
    } else {
        words.join("+")
    }
}

pub fn placeholder_image_url(title: &str) -> String {
    format!("{PLACEHOLDER_HOST}/{}/400/300.jpg", seed(title, "creative"))
}

pub fn avatar_url(name: &str) -> String {
    format!("{PLACEHOLDER_HOST}/{}/100/100.jpg", seed(name, "user"))
}

/// The stored image, or a stable placeholder derived from the title.
pub fn work_image_url(image_url: Option<&str>, title: &str) -> String {
    image_url
        .filter(|url| !url.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| placeholder_image_url(title))
}
