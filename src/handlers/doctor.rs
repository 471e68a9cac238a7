// src/handlers/doctor.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedPrincipal,
    models::{
        account::{Account, StaffMember},
        appointment::{Appointment, AppointmentStatus, AppointmentView},
        auth::MessageResponse,
        dashboard::DoctorDashboard,
    },
};

// Usado também pelas rotas do enfermeiro
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChooseCategoryPayload {
    pub category_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusPayload {
    pub status: AppointmentStatus,
}

#[utoipa::path(
    put,
    path = "/api/doctor/choose-category",
    tag = "Médico",
    request_body = ChooseCategoryPayload,
    responses(
        (status = 200, description = "Categoria escolhida; aguardando aprovação", body = Account),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn choose_category(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Json(payload): Json<ChooseCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    let account = app_state
        .approval_service
        .choose_category(&principal, payload.category_id)
        .await?;
    Ok(Json(account))
}

#[utoipa::path(
    get,
    path = "/api/doctor/dashboard",
    tag = "Médico",
    responses((status = 200, description = "Resumo do médico", body = DoctorDashboard)),
    security(("api_jwt" = []))
)]
pub async fn dashboard(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let dashboard = app_state.dashboard_service.doctor(&principal).await?;
    Ok(Json(dashboard))
}

#[utoipa::path(
    get,
    path = "/api/doctor/nurse",
    tag = "Médico",
    responses((status = 200, description = "Enfermeiros do mesmo departamento", body = Vec<StaffMember>)),
    security(("api_jwt" = []))
)]
pub async fn list_nurses(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let nurses = app_state.approval_service.list_nurses(&principal).await?;
    Ok(Json(nurses))
}

#[utoipa::path(
    put,
    path = "/api/doctor/nurse/approve/{id}",
    tag = "Médico",
    params(("id" = Uuid, Path, description = "ID do enfermeiro")),
    responses(
        (status = 200, description = "Enfermeiro aprovado", body = Account),
        (status = 403, description = "Enfermeiro de outro departamento")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_nurse(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let nurse = app_state.approval_service.approve_nurse(&principal, id).await?;
    Ok(Json(nurse))
}

#[utoipa::path(
    put,
    path = "/api/doctor/nurse/disapprove/{id}",
    tag = "Médico",
    params(("id" = Uuid, Path, description = "ID do enfermeiro")),
    responses((status = 200, description = "Aprovação revogada", body = Account)),
    security(("api_jwt" = []))
)]
pub async fn disapprove_nurse(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let nurse = app_state.approval_service.disapprove_nurse(&principal, id).await?;
    Ok(Json(nurse))
}

#[utoipa::path(
    delete,
    path = "/api/doctor/nurse/reject/{id}",
    tag = "Médico",
    params(("id" = Uuid, Path, description = "ID do enfermeiro")),
    responses((status = 200, description = "Enfermeiro rejeitado e removido", body = MessageResponse)),
    security(("api_jwt" = []))
)]
pub async fn reject_nurse(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.approval_service.reject_nurse(&principal, id).await?;
    Ok(Json(MessageResponse::new("Enfermeiro rejeitado e removido.")))
}

#[utoipa::path(
    get,
    path = "/api/doctor/appointments",
    tag = "Médico",
    responses((status = 200, description = "Agenda do médico", body = Vec<AppointmentView>)),
    security(("api_jwt" = []))
)]
pub async fn list_appointments(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let appointments = app_state.appointment_service.doctor_appointments(&principal).await?;
    Ok(Json(appointments))
}

#[utoipa::path(
    put,
    path = "/api/doctor/appointments/{patient_id}/{appointment_id}/status",
    tag = "Médico",
    request_body = UpdateStatusPayload,
    params(
        ("patient_id" = Uuid, Path, description = "ID do paciente"),
        ("appointment_id" = Uuid, Path, description = "ID do agendamento")
    ),
    responses(
        (status = 200, description = "Status atualizado", body = Appointment),
        (status = 400, description = "Transição não permitida")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_appointment_status(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path((patient_id, appointment_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = app_state
        .appointment_service
        .set_status(&principal, patient_id, appointment_id, payload.status)
        .await?;
    Ok(Json(appointment))
}
