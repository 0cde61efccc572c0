use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::error::ApiFailure;

/// Flat string-keyed query parameters for one upstream GET.
pub type Query = BTreeMap<String, String>;

/// Query key under which the continuation token is sent.
pub const CURSOR_PARAM: &str = "cursor";

/// Key of the id field used when resolving a handle to an internal user id.
pub const USER_ID_FIELD: &str = "id_str";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRequest {
    pub path: String,
    pub query: Query,
}

impl EndpointRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Query::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Base query merged with the cursor of the previous page, if any.
    pub fn query_with_cursor(&self, cursor: Option<&str>) -> Query {
        let mut query = self.query.clone();
        if let Some(c) = cursor {
            query.insert(CURSOR_PARAM.to_string(), c.to_string());
        }
        query
    }
}

/// A list endpoint together with the body key its records live under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub endpoint: EndpointRequest,
    pub items_key: &'static str,
}

impl ListRequest {
    pub fn tweets(endpoint: EndpointRequest) -> Self {
        Self { endpoint, items_key: "tweets" }
    }

    pub fn users(endpoint: EndpointRequest) -> Self {
        Self { endpoint, items_key: "users" }
    }
}

/// One batch of opaque records plus the token for the next batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    pub next_cursor: Option<String>,
}

impl Page {
    /// Shape a list body (`{"tweets": [...], "next_cursor": "..."}`).
    /// A missing or non-array items key is an empty page; an empty cursor
    /// string counts as no cursor.
    pub fn from_body(mut body: Value, items_key: &str) -> Self {
        let items = match body.get_mut(items_key).map(Value::take) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        let next_cursor = body
            .get("next_cursor")
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
            .map(str::to_owned);
        Self { items, next_cursor }
    }
}

/// Single authenticated GET against a named endpoint.
///
/// Every failure, whether transport or HTTP status, comes back as an
/// `ApiFailure`; implementations never panic on upstream errors.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, path: &str, query: &Query) -> Result<Value, ApiFailure>;

    async fn fetch_page(
        &self,
        path: &str,
        query: &Query,
        items_key: &str,
    ) -> Result<Page, ApiFailure> {
        let body = self.fetch(path, query).await?;
        Ok(Page::from_body(body, items_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cursor_is_merged_into_base_query() {
        let req = EndpointRequest::new("/twitter/search")
            .with_param("query", "rust")
            .with_param("type", "Latest");
        assert_eq!(req.query_with_cursor(None).len(), 2);
        let q = req.query_with_cursor(Some("c1"));
        assert_eq!(q.get("cursor").map(String::as_str), Some("c1"));
        assert_eq!(q.get("query").map(String::as_str), Some("rust"));
        // base request is untouched
        assert!(!req.query.contains_key("cursor"));
    }

    #[test]
    fn page_takes_items_and_cursor() {
        let page = Page::from_body(
            json!({"tweets": [{"id_str": "1"}, {"id_str": "2"}], "next_cursor": "abc"}),
            "tweets",
        );
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1]["id_str"], "2");
        assert_eq!(page.next_cursor.as_deref(), Some("abc"));
    }

    #[test]
    fn page_treats_missing_key_and_empty_cursor_as_end() {
        let page = Page::from_body(json!({"next_cursor": ""}), "tweets");
        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());

        let page = Page::from_body(json!({"users": [{}], "next_cursor": null}), "users");
        assert_eq!(page.items.len(), 1);
        assert!(page.next_cursor.is_none());
    }
}
