//! Ticket API handlers.
//!
//! ```text
//! POST   /api/v1/tickets {"title":"…","description":"…","priority":"normal"}
//! GET    /api/v1/tickets/{id}
//! PUT    /api/v1/tickets/{id} {"priority":"high"}
//! DELETE /api/v1/tickets/{id}
//! POST   /api/v1/tickets/{id}/assign {"assigneeId":"…"}
//! POST   /api/v1/tickets/{id}/unassign | /start | /close
//! GET    /api/v1/my-tickets
//! GET    /api/v1/assigned-tickets
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{
    AssignTicketRequest, CreateTicketRequest, TicketActionRequest, TicketPayload,
    TicketSummaryPayload, UpdateTicketRequest,
};
use crate::domain::workflow::TicketChanges;
use crate::domain::{Error, TicketId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_priority, parse_uuid, require};

const TICKET_ID: FieldName = FieldName::new("ticketId");

/// Request body for `POST /api/v1/tickets`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketBody {
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(example = "normal")]
    pub priority: Option<String>,
}

impl CreateTicketBody {
    fn into_request(self, actor: UserId) -> Result<CreateTicketRequest, Error> {
        let title = require(self.title, FieldName::new("title"))?;
        let description = require(self.description, FieldName::new("description"))?;
        let priority_field = FieldName::new("priority");
        let priority = parse_priority(&require(self.priority, priority_field)?, priority_field)?;
        Ok(CreateTicketRequest {
            actor,
            title,
            description,
            priority,
        })
    }
}

/// Request body for `PUT /api/v1/tickets/{id}`. Absent fields are left as
/// they are.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
}

impl UpdateTicketBody {
    fn into_changes(self) -> Result<TicketChanges, Error> {
        let priority = self
            .priority
            .map(|raw| parse_priority(&raw, FieldName::new("priority")))
            .transpose()?;
        Ok(TicketChanges {
            title: self.title,
            description: self.description,
            priority,
        })
    }
}

/// Request body for `POST /api/v1/tickets/{id}/assign`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignTicketBody {
    #[schema(format = Uuid)]
    pub assignee_id: Option<String>,
}

pub(crate) fn parse_ticket_id(raw: &str) -> Result<TicketId, Error> {
    parse_uuid(raw, TICKET_ID).map(TicketId::from_uuid)
}

fn action(session: &SessionContext, raw_id: &str) -> Result<TicketActionRequest, Error> {
    let actor = session.require_user_id()?;
    let ticket_id = parse_ticket_id(raw_id)?;
    Ok(TicketActionRequest { actor, ticket_id })
}

/// Open a ticket owned by the logged-in user.
#[utoipa::path(
    post,
    path = "/api/v1/tickets",
    request_body = CreateTicketBody,
    responses(
        (status = 201, description = "Ticket created", body = TicketPayload),
        (status = 400, description = "Missing field or unknown priority", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 422, description = "Constraint violations", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "createTicket"
)]
#[post("/tickets")]
pub async fn create_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateTicketBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let request = payload.into_inner().into_request(actor)?;
    let ticket = state.tickets.create(request).await?;
    Ok(HttpResponse::Created().json(ticket))
}

/// Fetch one ticket with its comments.
#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}",
    params(("id" = String, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Ticket", body = TicketPayload),
        (status = 400, description = "Malformed id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Unknown ticket", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "getTicket"
)]
#[get("/tickets/{id}")]
pub async fn get_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<TicketPayload>> {
    session.require_user_id()?;
    let ticket_id = parse_ticket_id(&path)?;
    Ok(web::Json(state.ticket_query.get_ticket(ticket_id).await?))
}

/// Change title, description or priority. Owner only.
#[utoipa::path(
    put,
    path = "/api/v1/tickets/{id}",
    params(("id" = String, Path, description = "Ticket id")),
    request_body = UpdateTicketBody,
    responses(
        (status = 200, description = "Updated ticket", body = TicketPayload),
        (status = 400, description = "Malformed request", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Unknown ticket", body = Error),
        (status = 422, description = "Constraint violations", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "updateTicket"
)]
#[put("/tickets/{id}")]
pub async fn update_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateTicketBody>,
) -> ApiResult<web::Json<TicketPayload>> {
    let TicketActionRequest { actor, ticket_id } = action(&session, &path)?;
    let changes = payload.into_inner().into_changes()?;
    let ticket = state
        .tickets
        .update(UpdateTicketRequest {
            actor,
            ticket_id,
            changes,
        })
        .await?;
    Ok(web::Json(ticket))
}

/// Delete a ticket. Owner only; comments are kept but detached.
#[utoipa::path(
    delete,
    path = "/api/v1/tickets/{id}",
    params(("id" = String, Path, description = "Ticket id")),
    responses(
        (status = 204, description = "Ticket deleted"),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Unknown ticket", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "deleteTicket"
)]
#[delete("/tickets/{id}")]
pub async fn delete_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.tickets.delete(action(&session, &path)?).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Assign a user. Owner only; the first assignment moves a pending ticket to
/// waiting.
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{id}/assign",
    params(("id" = String, Path, description = "Ticket id")),
    request_body = AssignTicketBody,
    responses(
        (status = 200, description = "Assigned ticket", body = TicketPayload),
        (status = 400, description = "Missing or malformed assignee", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Unknown ticket or assignee", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "assignTicket"
)]
#[post("/tickets/{id}/assign")]
pub async fn assign_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AssignTicketBody>,
) -> ApiResult<web::Json<TicketPayload>> {
    let TicketActionRequest { actor, ticket_id } = action(&session, &path)?;
    let assignee_field = FieldName::new("assigneeId");
    let raw = require(payload.into_inner().assignee_id, assignee_field)?;
    let assignee_id = UserId::from_uuid(parse_uuid(&raw, assignee_field)?);
    let ticket = state
        .tickets
        .assign(AssignTicketRequest {
            actor,
            ticket_id,
            assignee_id,
        })
        .await?;
    Ok(web::Json(ticket))
}

/// Clear the assignee. Owner only; timestamps and status are kept.
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{id}/unassign",
    params(("id" = String, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Unassigned ticket", body = TicketPayload),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Unknown ticket", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "unassignTicket"
)]
#[post("/tickets/{id}/unassign")]
pub async fn unassign_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<TicketPayload>> {
    let ticket = state.tickets.unassign(action(&session, &path)?).await?;
    Ok(web::Json(ticket))
}

/// Move a waiting ticket to in progress. Assignee only.
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{id}/start",
    params(("id" = String, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Started ticket", body = TicketPayload),
        (status = 400, description = "Ticket is not waiting", body = Error),
        (status = 403, description = "Not the assignee", body = Error),
        (status = 404, description = "Unknown ticket", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "startTicket"
)]
#[post("/tickets/{id}/start")]
pub async fn start_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<TicketPayload>> {
    let ticket = state.tickets.start(action(&session, &path)?).await?;
    Ok(web::Json(ticket))
}

/// Move an in-progress ticket to done. Assignee only.
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{id}/close",
    params(("id" = String, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Closed ticket", body = TicketPayload),
        (status = 400, description = "Ticket is not in progress", body = Error),
        (status = 403, description = "Not the assignee", body = Error),
        (status = 404, description = "Unknown ticket", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "closeTicket"
)]
#[post("/tickets/{id}/close")]
pub async fn close_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<TicketPayload>> {
    let ticket = state.tickets.close(action(&session, &path)?).await?;
    Ok(web::Json(ticket))
}

/// Tickets owned by the logged-in user.
#[utoipa::path(
    get,
    path = "/api/v1/my-tickets",
    responses(
        (status = 200, description = "Owned tickets", body = [TicketSummaryPayload]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "myTickets"
)]
#[get("/my-tickets")]
pub async fn my_tickets(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<TicketSummaryPayload>>> {
    let actor = session.require_user_id()?;
    Ok(web::Json(state.ticket_query.list_owned(actor).await?))
}

/// Tickets assigned to the logged-in user.
#[utoipa::path(
    get,
    path = "/api/v1/assigned-tickets",
    responses(
        (status = 200, description = "Assigned tickets", body = [TicketSummaryPayload]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "assignedTickets"
)]
#[get("/assigned-tickets")]
pub async fn assigned_tickets(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<TicketSummaryPayload>>> {
    let actor = session.require_user_id()?;
    Ok(web::Json(state.ticket_query.list_assigned(actor).await?))
}

#[cfg(test)]
#[path = "tickets_tests.rs"]
mod tests;
