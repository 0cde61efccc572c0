//! MCP gateway exposing SocialData (Twitter/X) search, profiles, timelines,
//! replies, community feeds and user search as read-only tools.

pub mod clients;
pub mod core;
pub mod domain;
pub mod infra;
pub mod tools;
