// src/handlers/appointments.rs

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
        account::{DoctorCard, Review},
        appointment::{Appointment, AppointmentView, AvailableSlots},
        auth::MessageResponse,
        hospital::CategoryListing,
    },
    services::appointment_service::BookingRequest,
};

// ---
// Payload: CreateAppointment
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentPayload {
    // Conta do paciente (o próprio usuário, ou qualquer uma para o superadmin)
    #[serde(alias = "userId")]
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub category_id: Uuid,
    pub hospital_id: Option<Uuid>,

    #[schema(example = "2025-06-01")]
    #[validate(length(min = 1, message = "A data é obrigatória."))]
    pub date: String,

    #[schema(example = "09:00")]
    #[validate(length(min = 1, message = "O horário é obrigatório."))]
    pub time: String,

    #[validate(length(max = 2000, message = "A descrição é longa demais."))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReviewPayload {
    #[validate(range(min = 1, max = 5, message = "A nota deve estar entre 1 e 5."))]
    #[schema(example = 5)]
    pub rating: i16,
    pub comment: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/appointment/categories",
    tag = "Agendamentos",
    responses((status = 200, description = "Categorias de todos os hospitais", body = Vec<CategoryListing>)),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(_principal): AuthenticatedPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state.appointment_service.list_categories().await?;
    Ok(Json(categories))
}

#[utoipa::path(
    get,
    path = "/api/appointment/doctors/{category_id}",
    tag = "Agendamentos",
    params(("category_id" = Uuid, Path, description = "ID da categoria")),
    responses((status = 200, description = "Médicos ativos da categoria", body = Vec<DoctorCard>)),
    security(("api_jwt" = []))
)]
pub async fn list_doctors(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(_principal): AuthenticatedPrincipal,
    Path(category_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let doctors = app_state.appointment_service.list_doctors_by_category(category_id).await?;
    Ok(Json(doctors))
}

#[utoipa::path(
    get,
    path = "/api/appointment/slots/{doctor_id}/{date}",
    tag = "Agendamentos",
    params(
        ("doctor_id" = Uuid, Path, description = "ID do médico"),
        ("date" = String, Path, description = "Data no formato AAAA-MM-DD")
    ),
    responses(
        (status = 200, description = "Horários livres em ordem crescente", body = AvailableSlots),
        (status = 400, description = "Data inválida"),
        (status = 404, description = "Médico não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn available_slots(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(_principal): AuthenticatedPrincipal,
    Path((doctor_id, date)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, AppError> {
    let slots = app_state.appointment_service.available_slots(doctor_id, &date).await?;
    Ok(Json(slots))
}

#[utoipa::path(
    post,
    path = "/api/appointment/create",
    tag = "Agendamentos",
    request_body = CreateAppointmentPayload,
    responses(
        (status = 201, description = "Agendamento criado (PENDING)", body = Appointment),
        (status = 400, description = "Data ou horário inválidos"),
        (status = 409, description = "Horário já ocupado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_appointment(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Json(payload): Json<CreateAppointmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let appointment = app_state
        .appointment_service
        .create(
            &principal,
            BookingRequest {
                patient_id: payload.patient_id,
                doctor_id: payload.doctor_id,
                category_id: payload.category_id,
                hospital_id: payload.hospital_id,
                date: payload.date,
                time: payload.time,
                description: payload.description,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

#[utoipa::path(
    get,
    path = "/api/appointment/user/{user_id}",
    tag = "Agendamentos",
    params(("user_id" = Uuid, Path, description = "ID do paciente")),
    responses(
        (status = 200, description = "Agendamentos do paciente, mais recentes primeiro", body = Vec<AppointmentView>),
        (status = 403, description = "Acesso aos dados de outro paciente")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_for_user(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let appointments = app_state
        .appointment_service
        .list_for_patient(&principal, user_id)
        .await?;
    Ok(Json(appointments))
}

#[utoipa::path(
    delete,
    path = "/api/appointment/{user_id}/{appointment_id}",
    tag = "Agendamentos",
    params(
        ("user_id" = Uuid, Path, description = "ID do paciente"),
        ("appointment_id" = Uuid, Path, description = "ID do agendamento")
    ),
    responses(
        (status = 200, description = "Agendamento cancelado", body = MessageResponse),
        (status = 404, description = "Agendamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_appointment(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path((user_id, appointment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .appointment_service
        .cancel(&principal, user_id, appointment_id)
        .await?;
    Ok(Json(MessageResponse::new("Agendamento cancelado.")))
}

#[utoipa::path(
    post,
    path = "/api/appointment/review/{doctor_id}",
    tag = "Agendamentos",
    request_body = ReviewPayload,
    params(("doctor_id" = Uuid, Path, description = "ID do médico")),
    responses(
        (status = 201, description = "Avaliação registrada", body = Review),
        (status = 400, description = "Nota fora do intervalo 1..5")
    ),
    security(("api_jwt" = []))
)]
pub async fn review_doctor(
    State(app_state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(doctor_id): Path<Uuid>,
    Json(payload): Json<ReviewPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let review = app_state
        .appointment_service
        .add_review(&principal, doctor_id, payload.rating, payload.comment.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(review)))
}
