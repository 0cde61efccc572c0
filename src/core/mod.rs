//! Core retrieval engine: failure model, cursor pagination and the
//! lookup-then-paginate pipeline. Nothing here knows about MCP or text.

pub mod aggregate;
pub mod error;
pub mod paginate;

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use serde_json::{json, Value};

    use super::error::ApiFailure;
    use crate::domain::{Query, Transport};

    /// Replays a fixed script of upstream outcomes and records every call.
    pub struct ScriptedTransport {
        script: Mutex<VecDeque<Result<Value, ApiFailure>>>,
        calls: Mutex<Vec<(String, Query)>>,
    }

    impl ScriptedTransport {
        pub fn new(script: Vec<Result<Value, ApiFailure>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<(String, Query)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Transport for ScriptedTransport {
        async fn fetch(&self, path: &str, query: &Query) -> Result<Value, ApiFailure> {
            self.calls
                .lock()
                .unwrap()
                .push((path.to_string(), query.clone()));
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiFailure::transport("script exhausted")))
        }
    }

    /// A `tweets` list body with `count` records numbered from `start`.
    pub fn tweets_page(start: usize, count: usize, next_cursor: Option<&str>) -> Value {
        let tweets: Vec<Value> = (start..start + count)
            .map(|i| json!({ "id_str": i.to_string(), "full_text": format!("tweet {i}") }))
            .collect();
        json!({ "tweets": tweets, "next_cursor": next_cursor })
    }
}
