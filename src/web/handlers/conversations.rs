//! Conversation lifecycle handlers for the relay API.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Number;

use crate::client::service::CreateConversationParams;
use crate::client::types::ConversationList;
use crate::web::error::WebError;
use crate::web::state::RelayState;

/// List page size, matching the original route.
const LIST_LIMIT: usize = 50;

/// The organisation id arrives as a number, a numeric string, or null.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrganisationIdParam {
    Number(Number),
    Text(String),
    Null(()),
}

impl OrganisationIdParam {
    /// Resolve to a tenant scope: finite numbers are truncated, parseable
    /// strings are accepted, anything else means unscoped.
    pub fn resolve(&self) -> Option<i64> {
        match self {
            OrganisationIdParam::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
            OrganisationIdParam::Text(s) => s.trim().parse().ok(),
            OrganisationIdParam::Null(()) => None,
        }
    }
}

fn parse_scope(param: Option<&OrganisationIdParam>) -> Option<i64> {
    param.and_then(OrganisationIdParam::resolve)
}

/// Request body for conversation creation. The whole body is optional;
/// a missing or unreadable body means an unscoped conversation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    #[serde(default)]
    pub organisation_id: Option<OrganisationIdParam>,
    #[serde(default)]
    pub user_identifier: Option<String>,
}

/// Create a conversation scoped to an optional tenant.
pub async fn create_conversation(
    State(state): State<RelayState>,
    body: Option<Json<CreateConversationRequest>>,
) -> Result<Response, WebError> {
    let request = body.map(|Json(req)| req).unwrap_or_default();

    let user_identifier = request
        .user_identifier
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let conversation = state
        .service()
        .create_conversation(CreateConversationParams {
            organisation_id: parse_scope(request.organisation_id.as_ref()),
            user_identifier,
        })
        .await?;

    Ok(Json(conversation).into_response())
}

/// Query parameters for conversation retrieval/listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetConversationsQuery {
    pub id: Option<String>,
    pub organisation_id: Option<String>,
}

/// Retrieve one conversation by id, or list recent conversations with an
/// optional tenant scope filter.
pub async fn get_conversations(
    State(state): State<RelayState>,
    Query(query): Query<GetConversationsQuery>,
) -> Result<Response, WebError> {
    if let Some(id) = query.id.as_deref().filter(|id| !id.is_empty()) {
        let conversation = state.service().retrieve_conversation(id).await?;
        return Ok(Json(conversation).into_response());
    }

    let scope = query
        .organisation_id
        .as_deref()
        .and_then(|s| s.trim().parse().ok());

    let data = state.service().list_conversations(scope, LIST_LIMIT).await?;
    Ok(Json(ConversationList { data }).into_response())
}
