// src/handlers/tickets.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError, config::AppState, middleware::auth::AuthenticatedPrincipal,
    models::ticket::SupportTicket,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTicketPayload {
    #[validate(length(min = 1, max = 200, message = "O assunto deve ter entre 1 e 200 caracteres."))]
    pub subject: String,
    #[validate(length(min = 1, message = "A mensagem é obrigatória."))]
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/tickets",
    tag = "Suporte",
    request_body = CreateTicketPayload,
    responses((status = 201, description = "Ticket aberto", body = SupportTicket)),
    security(("api_jwt" = []))
)]
pub async fn create_ticket(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Json(payload): Json<CreateTicketPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let ticket = app_state
        .ticket_service
        .create(&principal, &payload.subject, &payload.message)
        .await?;

    Ok((StatusCode::CREATED, Json(ticket)))
}

#[utoipa::path(
    get,
    path = "/api/tickets",
    tag = "Suporte",
    responses((status = 200, description = "Meus tickets", body = Vec<SupportTicket>)),
    security(("api_jwt" = []))
)]
pub async fn my_tickets(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let tickets = app_state.ticket_service.my_tickets(&principal).await?;
    Ok(Json(tickets))
}
