// src/handlers/admin.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedPrincipal,
    models::{
        account::{Account, AccountSummary, StaffMember},
        auth::MessageResponse,
        hospital::Category,
        ticket::{SupportTicket, TenantTicket},
    },
};

// ---
// Médicos do tenant
// ---

#[utoipa::path(
    get,
    path = "/api/admin/doctors",
    tag = "Admin",
    responses(
        (status = 200, description = "Médicos do hospital", body = Vec<StaffMember>),
        (status = 403, description = "Hospital não aprovado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_doctors(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let doctors = app_state.approval_service.list_doctors(&principal).await?;
    Ok(Json(doctors))
}

#[utoipa::path(
    put,
    path = "/api/admin/doctors/approve/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do médico")),
    responses(
        (status = 200, description = "Médico aprovado", body = Account),
        (status = 404, description = "Médico não encontrado neste hospital")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_doctor(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let doctor = app_state.approval_service.approve_doctor(&principal, id).await?;
    Ok(Json(doctor))
}

#[utoipa::path(
    put,
    path = "/api/admin/doctors/toggle/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do médico")),
    responses((status = 200, description = "Aprovação alternada", body = Account)),
    security(("api_jwt" = []))
)]
pub async fn toggle_doctor(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let doctor = app_state.approval_service.toggle_doctor(&principal, id).await?;
    Ok(Json(doctor))
}

#[utoipa::path(
    delete,
    path = "/api/admin/doctors/reject/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do médico")),
    responses((status = 200, description = "Médico rejeitado e removido", body = MessageResponse)),
    security(("api_jwt" = []))
)]
pub async fn reject_doctor(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.approval_service.reject_doctor(&principal, id).await?;
    Ok(Json(MessageResponse::new("Médico rejeitado e removido.")))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    responses((status = 200, description = "Contas vinculadas ao hospital", body = Vec<AccountSummary>)),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let accounts = app_state.approval_service.list_tenant_accounts(&principal).await?;
    Ok(Json(accounts))
}

// ---
// Categorias
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, max = 120, message = "O nome deve ter entre 1 e 120 caracteres."))]
    #[schema(example = "Cardiologia")]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryPayload {
    #[validate(length(min = 1, max = 120, message = "O nome deve ter entre 1 e 120 caracteres."))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/admin/category",
    tag = "Admin",
    request_body = CreateCategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = Category),
        (status = 409, description = "Categoria com o mesmo nome já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category = app_state
        .approval_service
        .create_category(&principal, &payload.name, payload.description.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    get,
    path = "/api/admin/category",
    tag = "Admin",
    responses((status = 200, description = "Categorias do hospital", body = Vec<Category>)),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state.approval_service.list_categories(&principal).await?;
    Ok(Json(categories))
}

#[utoipa::path(
    put,
    path = "/api/admin/category/{id}",
    tag = "Admin",
    request_body = UpdateCategoryPayload,
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 200, description = "Categoria atualizada", body = Category),
        (status = 404, description = "Categoria não encontrada neste hospital")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category = app_state
        .approval_service
        .update_category(&principal, id, payload.name.as_deref(), payload.description.as_deref())
        .await?;

    Ok(Json(category))
}

#[utoipa::path(
    delete,
    path = "/api/admin/category/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses((status = 200, description = "Categoria removida", body = MessageResponse)),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.approval_service.delete_category(&principal, id).await?;
    Ok(Json(MessageResponse::new("Categoria removida.")))
}

// ---
// Tickets do tenant
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReplyTicketPayload {
    #[validate(length(min = 1, message = "A resposta é obrigatória."))]
    pub reply: String,
}

#[utoipa::path(
    get,
    path = "/api/admin/tickets",
    tag = "Admin",
    responses((status = 200, description = "Tickets das contas do hospital", body = Vec<TenantTicket>)),
    security(("api_jwt" = []))
)]
pub async fn list_tickets(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let tickets = app_state.ticket_service.tenant_tickets(&principal).await?;
    Ok(Json(tickets))
}

#[utoipa::path(
    put,
    path = "/api/admin/tickets/{account_id}/{ticket_id}/reply",
    tag = "Admin",
    request_body = ReplyTicketPayload,
    params(
        ("account_id" = Uuid, Path, description = "ID da conta dona do ticket"),
        ("ticket_id" = Uuid, Path, description = "ID do ticket")
    ),
    responses(
        (status = 200, description = "Ticket respondido e fechado", body = SupportTicket),
        (status = 404, description = "Conta ou ticket não encontrados neste hospital")
    ),
    security(("api_jwt" = []))
)]
pub async fn reply_ticket(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path((account_id, ticket_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ReplyTicketPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let ticket = app_state
        .ticket_service
        .reply(&principal, account_id, ticket_id, &payload.reply)
        .await?;

    Ok(Json(ticket))
}
