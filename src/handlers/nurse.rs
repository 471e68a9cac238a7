// src/handlers/nurse.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::doctor::ChooseCategoryPayload,
    middleware::auth::AuthenticatedPrincipal,
    models::{
        account::{Account, DoctorCard},
        appointment::{Appointment, AppointmentView},
        dashboard::NurseDashboard,
        hospital::CategoryListing,
    },
};

#[utoipa::path(
    get,
    path = "/api/nurse/dashboard",
    tag = "Enfermeiro",
    responses((status = 200, description = "Resumo do enfermeiro", body = NurseDashboard)),
    security(("api_jwt" = []))
)]
pub async fn dashboard(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let dashboard = app_state.dashboard_service.nurse(&principal).await?;
    Ok(Json(dashboard))
}

#[utoipa::path(
    get,
    path = "/api/nurse/categories",
    tag = "Enfermeiro",
    responses((status = 200, description = "Categorias de todos os hospitais", body = Vec<CategoryListing>)),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state.approval_service.all_categories(&principal).await?;
    Ok(Json(categories))
}

#[utoipa::path(
    put,
    path = "/api/nurse/choose-category",
    tag = "Enfermeiro",
    request_body = ChooseCategoryPayload,
    responses((status = 200, description = "Categoria escolhida; aguardando aprovação", body = Account)),
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
    path = "/api/nurse/my-doctor",
    tag = "Enfermeiro",
    responses((status = 200, description = "Médicos do mesmo departamento", body = Vec<DoctorCard>)),
    security(("api_jwt" = []))
)]
pub async fn my_doctor(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let doctors = app_state.approval_service.my_doctors(&principal).await?;
    Ok(Json(doctors))
}

#[utoipa::path(
    get,
    path = "/api/nurse/appointments",
    tag = "Enfermeiro",
    responses(
        (status = 200, description = "Agenda dos médicos do departamento", body = Vec<AppointmentView>),
        (status = 403, description = "Enfermeiro ainda não aprovado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_appointments(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let appointments = app_state.appointment_service.nurse_appointments(&principal).await?;
    Ok(Json(appointments))
}

#[utoipa::path(
    put,
    path = "/api/nurse/appointments/{patient_id}/{appointment_id}/complete",
    tag = "Enfermeiro",
    params(
        ("patient_id" = Uuid, Path, description = "ID do paciente"),
        ("appointment_id" = Uuid, Path, description = "ID do agendamento")
    ),
    responses(
        (status = 200, description = "Atendimento concluído pelo enfermeiro", body = Appointment),
        (status = 400, description = "Agendamento ainda não aceito pelo médico")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_appointment(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path((patient_id, appointment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = app_state
        .appointment_service
        .complete_as_nurse(&principal, patient_id, appointment_id)
        .await?;
    Ok(Json(appointment))
}
