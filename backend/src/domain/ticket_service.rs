//! Ticket domain services.
//!
//! These services implement the ticket driving ports: they load the
//! aggregate, run the workflow checks, validate fields, and persist the
//! result. Policy checks always run before any write so a denied request
//! leaves storage untouched.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    AddCommentRequest, AssignTicketRequest, CommentPayload, CreateTicketRequest,
    DeleteCommentRequest, TicketActionRequest, TicketCommand, TicketPayload, TicketQuery,
    TicketRepository, TicketSummaryPayload, TicketValidator, UpdateTicketRequest,
    UserRepository, Violation,
};
use crate::domain::policy::TicketAction;
use crate::domain::service_support::{map_repository_error, map_user_error};
use crate::domain::workflow::{self, WorkflowError};
use crate::domain::{Comment, CommentId, Error, NewTicket, Ticket, TicketId, User, UserId};

fn map_workflow_error(error: WorkflowError) -> Error {
    warn!(%error, "ticket workflow refused");
    let message = error.to_string();
    match error {
        WorkflowError::AccessDenied { .. } | WorkflowError::CommentAccessDenied { .. } => {
            Error::forbidden(message)
        }
        WorkflowError::InvalidTransition { .. } => Error::invalid_transition(message),
        WorkflowError::MissingComment { .. } => Error::not_found(message),
    }
}

fn reject_violations(violations: Vec<Violation>) -> Result<(), Error> {
    if violations.is_empty() {
        return Ok(());
    }
    Err(Error::validation_failed("validation failed")
        .with_details(json!({ "violations": violations })))
}

async fn load_ticket<T>(tickets: &T, ticket_id: &TicketId) -> Result<Ticket, Error>
where
    T: TicketRepository + ?Sized,
{
    tickets
        .find_by_id(ticket_id)
        .await
        .map_err(map_repository_error)?
        .ok_or_else(|| Error::not_found(format!("ticket {ticket_id} not found")))
}

/// Ticket service implementing the command driving port.
#[derive(Clone)]
pub struct TicketCommandService<T, U> {
    tickets: Arc<T>,
    users: Arc<U>,
    validator: Arc<dyn TicketValidator>,
    clock: Arc<dyn Clock>,
}

impl<T, U> TicketCommandService<T, U> {
    /// Create a new command service.
    pub fn new(
        tickets: Arc<T>,
        users: Arc<U>,
        validator: Arc<dyn TicketValidator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tickets,
            users,
            validator,
            clock,
        }
    }
}

impl<T, U> TicketCommandService<T, U>
where
    T: TicketRepository,
    U: UserRepository,
{
    async fn save(&self, ticket: &Ticket) -> Result<(), Error> {
        self.tickets.save(ticket).await.map_err(map_repository_error)
    }

    /// The user currently assigned to `ticket`, unless it is `replacement`.
    /// A former assignee whose account is gone yields `None`.
    async fn previous_assignee(
        &self,
        ticket: &Ticket,
        replacement: Option<&UserId>,
    ) -> Result<Option<User>, Error> {
        match ticket.assignee_id() {
            Some(current) if Some(current) != replacement => {
                self.users.find_by_id(current).await.map_err(map_user_error)
            }
            _ => Ok(None),
        }
    }

    /// Load, mutate through `step`, then persist. Nothing is written when
    /// `step` fails.
    async fn transition<F>(&self, request: TicketActionRequest, step: F) -> Result<Ticket, Error>
    where
        F: FnOnce(&mut Ticket, &UserId) -> Result<(), WorkflowError> + Send,
    {
        let mut ticket = load_ticket(self.tickets.as_ref(), &request.ticket_id).await?;
        step(&mut ticket, &request.actor).map_err(map_workflow_error)?;
        self.save(&ticket).await?;
        Ok(ticket)
    }
}

#[async_trait]
impl<T, U> TicketCommand for TicketCommandService<T, U>
where
    T: TicketRepository,
    U: UserRepository,
{
    async fn create(&self, request: CreateTicketRequest) -> Result<TicketPayload, Error> {
        let CreateTicketRequest {
            actor,
            title,
            description,
            priority,
        } = request;
        let mut owner = self
            .users
            .find_by_id(&actor)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("login required"))?;

        let mut ticket = Ticket::open(
            TicketId::random(),
            NewTicket {
                title,
                description,
                priority,
                owner_id: actor,
            },
            self.clock.utc(),
        );
        crate::domain::link_owner(&mut ticket, &mut owner, None);
        reject_violations(self.validator.validate_ticket(&ticket))?;

        self.save(&ticket).await?;
        info!(ticket_id = %ticket.id(), actor = %actor, "ticket created");
        Ok(TicketPayload::from(&ticket))
    }

    async fn update(&self, request: UpdateTicketRequest) -> Result<TicketPayload, Error> {
        let UpdateTicketRequest {
            actor,
            ticket_id,
            changes,
        } = request;
        let mut ticket = load_ticket(self.tickets.as_ref(), &ticket_id).await?;
        workflow::edit(&mut ticket, &actor, changes).map_err(map_workflow_error)?;
        reject_violations(self.validator.validate_ticket(&ticket))?;

        self.save(&ticket).await?;
        info!(%ticket_id, %actor, "ticket updated");
        Ok(TicketPayload::from(&ticket))
    }

    async fn delete(&self, request: TicketActionRequest) -> Result<(), Error> {
        let TicketActionRequest { actor, ticket_id } = request;
        let ticket = load_ticket(self.tickets.as_ref(), &ticket_id).await?;
        workflow::ensure_allowed(&ticket, &actor, TicketAction::Delete)
            .map_err(map_workflow_error)?;

        let removed = self
            .tickets
            .delete(&ticket_id)
            .await
            .map_err(map_repository_error)?;
        if !removed {
            return Err(Error::not_found(format!("ticket {ticket_id} not found")));
        }
        info!(%ticket_id, %actor, "ticket deleted");
        Ok(())
    }

    async fn assign(&self, request: AssignTicketRequest) -> Result<TicketPayload, Error> {
        let AssignTicketRequest {
            actor,
            ticket_id,
            assignee_id,
        } = request;
        let mut ticket = load_ticket(self.tickets.as_ref(), &ticket_id).await?;
        workflow::ensure_allowed(&ticket, &actor, TicketAction::Edit)
            .map_err(map_workflow_error)?;

        let mut assignee = self
            .users
            .find_by_id(&assignee_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {assignee_id} not found")))?;

        let mut previous = self.previous_assignee(&ticket, Some(&assignee_id)).await?;

        workflow::assign(
            &mut ticket,
            &actor,
            &mut assignee,
            previous.as_mut(),
            self.clock.utc(),
        )
        .map_err(map_workflow_error)?;
        self.save(&ticket).await?;
        info!(%ticket_id, %actor, assignee = %assignee_id, "ticket assigned");
        Ok(TicketPayload::from(&ticket))
    }

    async fn unassign(&self, request: TicketActionRequest) -> Result<TicketPayload, Error> {
        let TicketActionRequest { actor, ticket_id } = request;
        let mut ticket = load_ticket(self.tickets.as_ref(), &ticket_id).await?;
        workflow::ensure_allowed(&ticket, &actor, TicketAction::Edit)
            .map_err(map_workflow_error)?;

        let mut previous = self.previous_assignee(&ticket, None).await?;
        workflow::unassign(&mut ticket, &actor, previous.as_mut(), self.clock.utc())
            .map_err(map_workflow_error)?;
        self.save(&ticket).await?;
        info!(%ticket_id, %actor, "ticket unassigned");
        Ok(TicketPayload::from(&ticket))
    }

    async fn start(&self, request: TicketActionRequest) -> Result<TicketPayload, Error> {
        let ticket = self.transition(request, workflow::start).await?;
        info!(ticket_id = %request.ticket_id, actor = %request.actor, "ticket started");
        Ok(TicketPayload::from(&ticket))
    }

    async fn close(&self, request: TicketActionRequest) -> Result<TicketPayload, Error> {
        let ticket = self.transition(request, workflow::close).await?;
        info!(ticket_id = %request.ticket_id, actor = %request.actor, "ticket closed");
        Ok(TicketPayload::from(&ticket))
    }

    async fn add_comment(&self, request: AddCommentRequest) -> Result<CommentPayload, Error> {
        let AddCommentRequest {
            actor,
            ticket_id,
            content,
        } = request;
        let mut ticket = load_ticket(self.tickets.as_ref(), &ticket_id).await?;
        let comment = Comment::new(CommentId::random(), content, actor, self.clock.utc());
        reject_violations(self.validator.validate_comment(&comment))?;

        let payload = CommentPayload::from(&comment);
        ticket.add_comment(comment);
        self.save(&ticket).await?;
        info!(%ticket_id, %actor, comment_id = %payload.id, "comment added");
        Ok(payload)
    }

    async fn delete_comment(&self, request: DeleteCommentRequest) -> Result<(), Error> {
        let DeleteCommentRequest {
            actor,
            ticket_id,
            comment_id,
        } = request;
        let mut ticket = load_ticket(self.tickets.as_ref(), &ticket_id).await?;
        workflow::remove_comment(&mut ticket, &actor, &comment_id).map_err(map_workflow_error)?;

        self.save(&ticket).await?;
        info!(%ticket_id, %actor, %comment_id, "comment removed");
        Ok(())
    }
}

/// Ticket service implementing the query driving port.
#[derive(Clone)]
pub struct TicketQueryService<T> {
    tickets: Arc<T>,
}

impl<T> TicketQueryService<T> {
    /// Create a new query service with the ticket repository.
    pub fn new(tickets: Arc<T>) -> Self {
        Self { tickets }
    }
}

#[async_trait]
impl<T> TicketQuery for TicketQueryService<T>
where
    T: TicketRepository,
{
    async fn get_ticket(&self, ticket_id: TicketId) -> Result<TicketPayload, Error> {
        let ticket = load_ticket(self.tickets.as_ref(), &ticket_id).await?;
        Ok(TicketPayload::from(&ticket))
    }

    async fn list_owned(&self, actor: UserId) -> Result<Vec<TicketSummaryPayload>, Error> {
        let tickets = self
            .tickets
            .list_by_owner(&actor)
            .await
            .map_err(map_repository_error)?;
        Ok(tickets.iter().map(TicketSummaryPayload::from).collect())
    }

    async fn list_assigned(&self, actor: UserId) -> Result<Vec<TicketSummaryPayload>, Error> {
        let tickets = self
            .tickets
            .list_by_assignee(&actor)
            .await
            .map_err(map_repository_error)?;
        Ok(tickets.iter().map(TicketSummaryPayload::from).collect())
    }
}

#[cfg(test)]
#[path = "ticket_service_tests.rs"]
mod tests;
