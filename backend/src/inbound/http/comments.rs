//! Comment API handlers.

use actix_web::{HttpResponse, delete, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{AddCommentRequest, CommentPayload, DeleteCommentRequest};
use crate::domain::{CommentId, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::tickets::parse_ticket_id;
use crate::inbound::http::validation::{FieldName, parse_uuid, require};

/// Request body for `POST /api/v1/tickets/{id}/comments`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentBody {
    pub content: Option<String>,
}

/// Comment on a ticket as the logged-in user.
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{id}/comments",
    params(("id" = String, Path, description = "Ticket id")),
    request_body = AddCommentBody,
    responses(
        (status = 201, description = "Comment added", body = CommentPayload),
        (status = 400, description = "Missing content", body = Error),
        (status = 404, description = "Unknown ticket", body = Error),
        (status = 422, description = "Blank content", body = Error)
    ),
    tags = ["comments"],
    operation_id = "addComment"
)]
#[post("/tickets/{id}/comments")]
pub async fn add_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AddCommentBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let ticket_id = parse_ticket_id(&path)?;
    let content = require(payload.into_inner().content, FieldName::new("content"))?;
    let comment = state
        .tickets
        .add_comment(AddCommentRequest {
            actor,
            ticket_id,
            content,
        })
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// Remove a comment from its ticket. Author only.
#[utoipa::path(
    delete,
    path = "/api/v1/tickets/{id}/comments/{comment_id}",
    params(
        ("id" = String, Path, description = "Ticket id"),
        ("comment_id" = String, Path, description = "Comment id")
    ),
    responses(
        (status = 204, description = "Comment removed"),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown ticket or comment", body = Error)
    ),
    tags = ["comments"],
    operation_id = "deleteComment"
)]
#[delete("/tickets/{id}/comments/{comment_id}")]
pub async fn delete_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let (raw_ticket, raw_comment) = path.into_inner();
    let ticket_id = parse_ticket_id(&raw_ticket)?;
    let comment_id = CommentId::from_uuid(parse_uuid(&raw_comment, FieldName::new("commentId"))?);
    state
        .tickets
        .delete_comment(DeleteCommentRequest {
            actor,
            ticket_id,
            comment_id,
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
