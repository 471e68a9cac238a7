// src/handlers/superadmin.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedPrincipal,
    models::{
        account::AccountSummary,
        auth::MessageResponse,
        hospital::{Hospital, HospitalChanges, HospitalOverview},
    },
};

#[utoipa::path(
    get,
    path = "/api/superadmin/hospitals",
    tag = "Superadmin",
    responses((status = 200, description = "Hospitais com categorias e contas vinculadas", body = Vec<HospitalOverview>)),
    security(("api_jwt" = []))
)]
pub async fn list_hospitals(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let overview = app_state.hospital_service.overview(&principal).await?;
    Ok(Json(overview))
}

#[utoipa::path(
    put,
    path = "/api/superadmin/hospitals/{id}",
    tag = "Superadmin",
    request_body = HospitalChanges,
    params(("id" = Uuid, Path, description = "ID do hospital")),
    responses(
        (status = 200, description = "Hospital atualizado", body = Hospital),
        (status = 404, description = "Hospital não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_hospital(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
    Json(changes): Json<HospitalChanges>,
) -> Result<impl IntoResponse, AppError> {
    let hospital = app_state.hospital_service.update_hospital(&principal, id, changes).await?;
    Ok(Json(hospital))
}

#[utoipa::path(
    put,
    path = "/api/superadmin/hospitals/{id}/approve",
    tag = "Superadmin",
    params(("id" = Uuid, Path, description = "ID do hospital")),
    responses((status = 200, description = "Hospital aprovado", body = Hospital)),
    security(("api_jwt" = []))
)]
pub async fn approve_hospital(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let hospital = app_state.hospital_service.approve_hospital(&principal, id).await?;
    Ok(Json(hospital))
}

#[utoipa::path(
    put,
    path = "/api/superadmin/hospitals/{id}/reject",
    tag = "Superadmin",
    params(("id" = Uuid, Path, description = "ID do hospital")),
    responses((status = 200, description = "Hospital rejeitado", body = Hospital)),
    security(("api_jwt" = []))
)]
pub async fn reject_hospital(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let hospital = app_state.hospital_service.reject_hospital(&principal, id).await?;
    Ok(Json(hospital))
}

#[utoipa::path(
    delete,
    path = "/api/superadmin/hospitals/{id}",
    tag = "Superadmin",
    params(("id" = Uuid, Path, description = "ID do hospital")),
    responses(
        (status = 200, description = "Hospital excluído", body = MessageResponse),
        (status = 409, description = "Ainda há contas vinculadas ao hospital")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_hospital(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.hospital_service.delete_hospital(&principal, id).await?;
    Ok(Json(MessageResponse::new("Hospital excluído.")))
}

#[utoipa::path(
    get,
    path = "/api/superadmin/users",
    tag = "Superadmin",
    responses((status = 200, description = "Todas as contas", body = Vec<AccountSummary>)),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let accounts = app_state.hospital_service.list_accounts(&principal).await?;
    Ok(Json(accounts))
}

#[utoipa::path(
    get,
    path = "/api/superadmin/doctors",
    tag = "Superadmin",
    responses((status = 200, description = "Todos os médicos", body = Vec<AccountSummary>)),
    security(("api_jwt" = []))
)]
pub async fn list_doctors(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let doctors = app_state.hospital_service.list_doctors(&principal).await?;
    Ok(Json(doctors))
}
