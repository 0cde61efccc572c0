use std::future::Future;
use std::sync::Arc;

use rmcp::handler::server::tool::{Parameters, ToolRouter};
use rmcp::model::{CallToolResult, Content, JsonObject, ServerCapabilities, ServerInfo};
use rmcp::ErrorData as McpError;
use serde_json::Value;

use crate::core::aggregate::{collect, collect_after_lookup, fetch_one, Lookup, Resolved};
use crate::core::error::ApiFailure;
use crate::domain::{EndpointRequest, ListRequest, Transport, USER_ID_FIELD};
use crate::infra::runtime::mcp_transport::ServerHandler;
use crate::tools::format::{format_failure, format_list, format_tweet, format_user};

/// Page ceilings per tool; each page is roughly 20 records of API spend.
pub const MAX_SEARCH_PAGES: u32 = 5;
pub const MAX_TIMELINE_PAGES: u32 = 5;
pub const MAX_REPLY_PAGES: u32 = 3;
pub const MAX_COMMUNITY_PAGES: u32 = 3;

/// MCP handler exposing the SocialData tools. Holds no per-call state; the
/// transport carries the credential injected at startup.
#[derive(Clone)]
pub struct SocialSvc {
    transport: Arc<dyn Transport>,
}

impl SocialSvc {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

impl ServerHandler for SocialSvc {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Read-only Twitter/X data via the SocialData API: search tweets and users, \
                 profiles, timelines, replies and community feeds. Keep max_pages low; every \
                 page costs API credit."
                    .into(),
            ),
            ..Default::default()
        }
    }
}

#[rmcp::tool_router]
impl SocialSvc {
    #[rmcp::tool(
        name = "twitter_search_tweets",
        description = "Search tweets with Twitter advanced search syntax, e.g. 'from:jack', '#bitcoin', 'crypto min_faves:100', 'rust lang:en', 'solana since:2025-01-01 until:2025-02-01'. Arguments: query (string), search_type ('Latest' or 'Top', default 'Latest'), max_pages (1-5, default 1, ~20 tweets per page).",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    async fn search_tweets(&self, params: Parameters<JsonObject>) -> Result<CallToolResult, McpError> {
        let args = params.0;
        let query = required_str(&args, "query")?;
        let search_type = search_type(&args)?;
        let max_pages = page_count(&args, MAX_SEARCH_PAGES)?;
        tracing::debug!(query = %query, search_type, max_pages, "twitter_search_tweets invoked");

        let request = ListRequest::tweets(
            EndpointRequest::new("/twitter/search")
                .with_param("query", query.as_str())
                .with_param("type", search_type),
        );
        Ok(self
            .list(
                "Search",
                &request,
                max_pages,
                &format!("Search: {query} | type: {search_type}"),
                &format!("No tweets found for '{query}'."),
                format_tweet,
            )
            .await)
    }

    #[rmcp::tool(
        name = "twitter_get_user_profile",
        description = "Get a Twitter user's profile: bio, followers, following, tweet count, creation date. Arguments: screen_name (handle without @).",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    async fn get_user_profile(&self, params: Parameters<JsonObject>) -> Result<CallToolResult, McpError> {
        let screen_name = screen_name(&params.0)?;
        tracing::debug!(screen_name = %screen_name, "twitter_get_user_profile invoked");

        let request = EndpointRequest::new(format!("/twitter/user/{screen_name}"));
        Ok(match fetch_one(self.transport.as_ref(), &request).await {
            Ok(user) => text(format_user(&user)),
            Err(failure) => failed("User profile lookup", &failure),
        })
    }

    #[rmcp::tool(
        name = "twitter_get_user_tweets",
        description = "Get a user's recent timeline. Resolves the handle first, then pages through the timeline. Arguments: screen_name (without @), max_pages (1-5, default 1), include_replies (bool, default false).",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    async fn get_user_tweets(&self, params: Parameters<JsonObject>) -> Result<CallToolResult, McpError> {
        let args = params.0;
        let screen_name = screen_name(&args)?;
        let max_pages = page_count(&args, MAX_TIMELINE_PAGES)?;
        let include_replies = optional_bool(&args, "include_replies", false)?;
        tracing::debug!(screen_name = %screen_name, max_pages, include_replies, "twitter_get_user_tweets invoked");

        let lookup = Lookup {
            request: EndpointRequest::new(format!("/twitter/user/{screen_name}")),
            id_field: USER_ID_FIELD,
            subject: format!("user @{screen_name}"),
        };
        let derive = |user: &Resolved| {
            let suffix = if include_replies { "tweets-and-replies" } else { "tweets" };
            ListRequest::tweets(EndpointRequest::new(format!("/twitter/user/{}/{suffix}", user.id)))
        };

        let (user, aggregate) =
            match collect_after_lookup(self.transport.as_ref(), &lookup, derive, max_pages).await {
                Ok(out) => out,
                Err(failure) => return Ok(failed("User lookup", &failure)),
            };
        let aggregate = match aggregate.into_complete() {
            Ok(a) => a,
            Err(failure) => return Ok(failed("Timeline fetch", &failure)),
        };
        if aggregate.items.is_empty() {
            return Ok(text(format!("No tweets found for @{screen_name}.")));
        }
        Ok(text(format_list(
            &format!("Tweets by @{screen_name}"),
            Some(format_user(&user.record)),
            &aggregate.items,
            format_tweet,
        )))
    }

    #[rmcp::tool(
        name = "twitter_get_tweet_detail",
        description = "Get the full text and engagement numbers of a single tweet. Arguments: tweet_id (numeric string).",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    async fn get_tweet_detail(&self, params: Parameters<JsonObject>) -> Result<CallToolResult, McpError> {
        let tweet_id = numeric_id(&params.0, "tweet_id")?;
        tracing::debug!(tweet_id = %tweet_id, "twitter_get_tweet_detail invoked");

        let request = EndpointRequest::new(format!("/twitter/tweets/{tweet_id}"));
        Ok(match fetch_one(self.transport.as_ref(), &request).await {
            Ok(tweet) => text(format_tweet(&tweet)),
            Err(failure) => failed("Tweet detail", &failure),
        })
    }

    #[rmcp::tool(
        name = "twitter_get_tweet_replies",
        description = "Get replies under a tweet, to gauge the reaction to an announcement or opinion. Arguments: tweet_id (numeric string), max_pages (1-3, default 1).",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    async fn get_tweet_replies(&self, params: Parameters<JsonObject>) -> Result<CallToolResult, McpError> {
        let args = params.0;
        let tweet_id = numeric_id(&args, "tweet_id")?;
        let max_pages = page_count(&args, MAX_REPLY_PAGES)?;
        tracing::debug!(tweet_id = %tweet_id, max_pages, "twitter_get_tweet_replies invoked");

        let request = ListRequest::tweets(EndpointRequest::new(format!(
            "/twitter/tweets/{tweet_id}/comments"
        )));
        Ok(self
            .list(
                "Replies",
                &request,
                max_pages,
                &format!("Replies to tweet {tweet_id}"),
                &format!("No replies found for tweet {tweet_id}."),
                format_tweet,
            )
            .await)
    }

    #[rmcp::tool(
        name = "twitter_get_community_tweets",
        description = "Get tweets posted in a Twitter Community. Arguments: community_id (numeric string), max_pages (1-3, default 1).",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    async fn get_community_tweets(&self, params: Parameters<JsonObject>) -> Result<CallToolResult, McpError> {
        let args = params.0;
        let community_id = numeric_id(&args, "community_id")?;
        let max_pages = page_count(&args, MAX_COMMUNITY_PAGES)?;
        tracing::debug!(community_id = %community_id, max_pages, "twitter_get_community_tweets invoked");

        let request = ListRequest::tweets(EndpointRequest::new(format!(
            "/twitter/community/{community_id}/tweets"
        )));
        Ok(self
            .list(
                "Community feed",
                &request,
                max_pages,
                &format!("Community {community_id}"),
                &format!("No tweets found in community {community_id}."),
                format_tweet,
            )
            .await)
    }

    #[rmcp::tool(
        name = "twitter_search_users",
        description = "Search Twitter users by name or keyword, e.g. to find a project's official account. Arguments: query (string).",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    async fn search_users(&self, params: Parameters<JsonObject>) -> Result<CallToolResult, McpError> {
        let query = required_str(&params.0, "query")?;
        tracing::debug!(query = %query, "twitter_search_users invoked");

        let request = ListRequest::users(
            EndpointRequest::new("/twitter/user/search").with_param("query", query.as_str()),
        );
        Ok(self
            .list(
                "User search",
                &request,
                1,
                &format!("User search: {query}"),
                &format!("No users found for '{query}'."),
                format_user,
            )
            .await)
    }
}

pub type SocialRouter = ToolRouter<SocialSvc>;

impl SocialSvc {
    pub fn router() -> SocialRouter {
        // Wrapper to expose the macro-generated private tool_router
        Self::tool_router()
    }

    /// Paginate a list endpoint and render it, failing the whole call if
    /// any page failed.
    async fn list(
        &self,
        operation: &str,
        request: &ListRequest,
        max_pages: u32,
        title: &str,
        empty_message: &str,
        render: fn(&Value) -> String,
    ) -> CallToolResult {
        let aggregate = match collect(self.transport.as_ref(), request, max_pages)
            .await
            .into_complete()
        {
            Ok(a) => a,
            Err(failure) => return failed(operation, &failure),
        };
        if aggregate.items.is_empty() {
            return text(empty_message.to_string());
        }
        text(format_list(title, None, &aggregate.items, render))
    }
}

fn text(body: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(body)])
}

fn failed(operation: &str, failure: &ApiFailure) -> CallToolResult {
    tracing::warn!(operation, kind = %failure.kind, "tool call failed upstream");
    CallToolResult::error(vec![Content::text(format_failure(operation, failure))])
}

// --- argument parsing ---

fn required_str(args: &JsonObject, key: &str) -> Result<String, McpError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| McpError::invalid_params(format!("missing required field: {key}"), None))
}

fn optional_bool(args: &JsonObject, key: &str, default: bool) -> Result<bool, McpError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(McpError::invalid_params(format!("{key} must be a boolean"), None)),
    }
}

fn page_count(args: &JsonObject, max: u32) -> Result<u32, McpError> {
    let n = match args.get("max_pages") {
        None | Some(Value::Null) => return Ok(1),
        Some(v) => v.as_u64(),
    };
    match n {
        Some(n) if (1..=u64::from(max)).contains(&n) => Ok(n as u32),
        _ => Err(McpError::invalid_params(
            format!("max_pages must be an integer between 1 and {max}"),
            None,
        )),
    }
}

fn search_type(args: &JsonObject) -> Result<&'static str, McpError> {
    match args.get("search_type") {
        None | Some(Value::Null) => Ok("Latest"),
        Some(Value::String(s)) if s == "Latest" => Ok("Latest"),
        Some(Value::String(s)) if s == "Top" => Ok("Top"),
        Some(_) => Err(McpError::invalid_params("search_type must be 'Latest' or 'Top'", None)),
    }
}

fn screen_name(args: &JsonObject) -> Result<String, McpError> {
    let raw = required_str(args, "screen_name")?;
    let name = raw.trim_start_matches('@');
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(McpError::invalid_params(
            "screen_name may only contain letters, digits and underscores",
            None,
        ));
    }
    Ok(name.to_string())
}

fn numeric_id(args: &JsonObject, key: &str) -> Result<String, McpError> {
    let id = required_str(args, key)?;
    if !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(McpError::invalid_params(format!("{key} must be a numeric string"), None));
    }
    Ok(id)
}
