//! Two-stage retrievals: an optional lookup that yields an identifier,
//! then pagination of an endpoint derived from it.

use serde_json::Value;

use crate::core::error::ApiFailure;
use crate::core::paginate::{paginate, AggregateResult};
use crate::domain::{EndpointRequest, ListRequest, Transport};

/// Stage-1 request: a single-entity endpoint plus the field holding its id.
#[derive(Debug, Clone)]
pub struct Lookup {
    pub request: EndpointRequest,
    pub id_field: &'static str,
    /// Used in the `NotFound` message, e.g. `user @jack`.
    pub subject: String,
}

/// Output of a successful lookup stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub id: String,
    pub record: Value,
}

pub async fn collect(
    transport: &dyn Transport,
    request: &ListRequest,
    max_pages: u32,
) -> AggregateResult {
    paginate(transport, request, max_pages).await
}

pub async fn resolve(transport: &dyn Transport, lookup: &Lookup) -> Result<Resolved, ApiFailure> {
    let record = transport
        .fetch(&lookup.request.path, &lookup.request.query)
        .await?;
    let id = record
        .get(lookup.id_field)
        .and_then(id_as_string)
        .ok_or_else(|| ApiFailure::not_found(&lookup.subject))?;
    tracing::debug!(subject = %lookup.subject, id = %id, "lookup resolved");
    Ok(Resolved { id, record })
}

/// Resolve, derive the list endpoint from the resolved id, paginate.
/// Pagination is never attempted when the lookup fails.
pub async fn collect_after_lookup<F>(
    transport: &dyn Transport,
    lookup: &Lookup,
    derive: F,
    max_pages: u32,
) -> Result<(Resolved, AggregateResult), ApiFailure>
where
    F: FnOnce(&Resolved) -> ListRequest,
{
    let resolved = resolve(transport, lookup).await?;
    let request = derive(&resolved);
    let aggregate = paginate(transport, &request, max_pages).await;
    Ok((resolved, aggregate))
}

/// Single-entity fetch with no pagination (profile, tweet detail).
pub async fn fetch_one(transport: &dyn Transport, request: &EndpointRequest) -> Result<Value, ApiFailure> {
    transport.fetch(&request.path, &request.query).await
}

fn id_as_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
