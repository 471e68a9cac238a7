// src/handlers/hospitals.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::hospital::{HospitalCreated, PublicHospital},
    services::hospital_service::HospitalRegistration,
};

// ---
// Payload: CreateHospital (cadastro público)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHospitalPayload {
    #[validate(length(min = 1, message = "O nome do hospital é obrigatório."))]
    #[schema(example = "Hospital São Lucas")]
    pub hospital_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub password: String,

    #[validate(length(min = 1, message = "O número de licença é obrigatório."))]
    pub license_number: String,

    pub address: Option<String>,
    pub phone: Option<String>,

    // Imagem já enviada ao storage; aqui só guardamos a URL
    #[validate(url(message = "A URL da imagem é inválida."))]
    pub image_url: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/hospitals",
    tag = "Hospitais",
    request_body = CreateHospitalPayload,
    responses(
        (status = 201, description = "Hospital cadastrado (pendente de aprovação)", body = HospitalCreated),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail, licença ou nome já cadastrados")
    )
)]
pub async fn create_hospital(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateHospitalPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let created = app_state
        .hospital_service
        .create_hospital(HospitalRegistration {
            hospital_name: payload.hospital_name,
            email: payload.email,
            password: payload.password,
            license_number: payload.license_number,
            address: payload.address,
            phone: payload.phone,
            image_url: payload.image_url,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/hospitals",
    tag = "Hospitais",
    responses((status = 200, description = "Lista pública de hospitais", body = Vec<PublicHospital>))
)]
pub async fn list_hospitals(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let hospitals = app_state.hospital_service.list_public().await?;
    Ok(Json(hospitals))
}
