//! Cursor pagination over a `Transport`.
//!
//! Pages are fetched strictly in cursor order, at most `max_pages` of them.
//! An empty page or a missing cursor ends the pull normally; the first
//! failing page ends it with `error` set.

use serde_json::Value;

use crate::core::error::ApiFailure;
use crate::domain::{ListRequest, Transport};

/// Terminal state of one pagination run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A page came back with zero items.
    Exhausted,
    /// A page carried items but no continuation token.
    NoCursor,
    /// `max_pages` pages were fetched and a cursor was still pending.
    PageLimitReached,
    /// A page call failed.
    PageError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    /// Page-arrival order, then within-page order.
    pub items: Vec<Value>,
    pub pages_fetched: u32,
    pub terminated_early: bool,
    pub error: Option<ApiFailure>,
    pub stop: StopReason,
}

impl AggregateResult {
    /// Fail the whole pull if any page failed; partial items are never
    /// handed out as a complete answer.
    pub fn into_complete(self) -> Result<Self, ApiFailure> {
        match self.error {
            Some(failure) => Err(failure),
            None => Ok(self),
        }
    }
}

pub async fn paginate(
    transport: &dyn Transport,
    request: &ListRequest,
    max_pages: u32,
) -> AggregateResult {
    let max_pages = max_pages.max(1);
    let path = request.endpoint.path.as_str();
    let mut items: Vec<Value> = Vec::new();
    let mut pages_fetched: u32 = 0;
    let mut cursor: Option<String> = None;

    for _ in 0..max_pages {
        let query = request.endpoint.query_with_cursor(cursor.as_deref());
        let page = match transport.fetch_page(path, &query, request.items_key).await {
            Ok(page) => page,
            Err(failure) => {
                tracing::warn!(
                    path = %path,
                    pages_fetched,
                    kind = %failure.kind,
                    "pagination stopped by page failure"
                );
                return AggregateResult {
                    items,
                    pages_fetched,
                    terminated_early: true,
                    error: Some(failure),
                    stop: StopReason::PageError,
                };
            }
        };

        if page.items.is_empty() {
            return done(items, pages_fetched, StopReason::Exhausted, path);
        }

        items.extend(page.items);
        pages_fetched += 1;

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => return done(items, pages_fetched, StopReason::NoCursor, path),
        }
    }

    done(items, pages_fetched, StopReason::PageLimitReached, path)
}

fn done(items: Vec<Value>, pages_fetched: u32, stop: StopReason, path: &str) -> AggregateResult {
    tracing::debug!(path = %path, pages_fetched, items = items.len(), stop = ?stop, "pagination finished");
    AggregateResult {
        items,
        pages_fetched,
        terminated_early: false,
        error: None,
        stop,
    }
}
