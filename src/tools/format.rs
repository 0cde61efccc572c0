//! Plain-text rendering of SocialData records for tool results.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::core::error::ApiFailure;

fn str_field<'a>(v: &'a Value, key: &str) -> &'a str {
    v.get(key).and_then(Value::as_str).unwrap_or("")
}

fn count_field(v: &Value, key: &str) -> i64 {
    v.get(key)
        .and_then(|c| c.as_i64().or_else(|| c.as_str().and_then(|s| s.parse().ok())))
        .unwrap_or(0)
}

/// `1234567` -> `1,234,567`.
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// RFC 3339 timestamps become `YYYY-MM-DD HH:MM UTC`; anything else is kept.
pub fn display_time(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(t) => t.with_timezone(&Utc).format("%Y-%m-%d %H:%M UTC").to_string(),
        Err(_) => raw.to_string(),
    }
}

pub fn format_tweet(tweet: &Value) -> String {
    let empty = Value::Null;
    let user = tweet.get("user").unwrap_or(&empty);
    let text = tweet
        .get("full_text")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| str_field(tweet, "text"));
    let name = user.get("name").and_then(Value::as_str).unwrap_or("Unknown");
    let screen_name = user
        .get("screen_name")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let id = str_field(tweet, "id_str");

    [
        format!(
            "@{screen_name} ({name}) · {}",
            display_time(str_field(tweet, "tweet_created_at"))
        ),
        format!("Followers: {}", group_thousands(count_field(user, "followers_count"))),
        String::new(),
        text.to_string(),
        String::new(),
        format!(
            "Likes: {}  Retweets: {}  Replies: {}  Bookmarks: {}  Views: {}",
            group_thousands(count_field(tweet, "favorite_count")),
            group_thousands(count_field(tweet, "retweet_count")),
            group_thousands(count_field(tweet, "reply_count")),
            group_thousands(count_field(tweet, "bookmark_count")),
            group_thousands(count_field(tweet, "views_count")),
        ),
        format!("Tweet ID: {id}"),
        format!("URL: https://x.com/{screen_name}/status/{id}"),
    ]
    .join("\n")
}

pub fn format_user(user: &Value) -> String {
    let screen_name = str_field(user, "screen_name");
    let verified = user.get("verified").and_then(Value::as_bool).unwrap_or(false);
    [
        format!("@{screen_name} ({})", str_field(user, "name")),
        format!("Bio: {}", str_field(user, "description")),
        format!("Location: {}", str_field(user, "location")),
        format!("Followers: {}", group_thousands(count_field(user, "followers_count"))),
        format!("Following: {}", group_thousands(count_field(user, "friends_count"))),
        format!("Tweets: {}", group_thousands(count_field(user, "statuses_count"))),
        format!("Likes: {}", group_thousands(count_field(user, "favourites_count"))),
        format!("Created: {}", display_time(str_field(user, "created_at"))),
        format!("Verified: {verified}"),
        format!("User ID: {}", str_field(user, "id_str")),
        format!("URL: https://x.com/{screen_name}"),
    ]
    .join("\n")
}

/// Header line, an optional preamble (e.g. a profile), then numbered blocks.
pub fn format_list<F>(title: &str, preamble: Option<String>, items: &[Value], render: F) -> String
where
    F: Fn(&Value) -> String,
{
    let mut out = vec![format!("=== {title} | {} items ===\n", items.len())];
    if let Some(p) = preamble {
        out.push(p);
        out.push(String::new());
    }
    for (i, item) in items.iter().enumerate() {
        out.push(format!("--- [{}] ---", i + 1));
        out.push(render(item));
        out.push(String::new());
    }
    out.join("\n")
}

/// One-line failure text, prefixed with the operation that failed.
pub fn format_failure(operation: &str, failure: &ApiFailure) -> String {
    let detail = failure.to_string();
    let detail: Vec<&str> = detail.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    format!("{operation} failed: {}", detail.join(" "))
}
