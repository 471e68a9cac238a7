// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedPrincipal,
    models::{
        account::{Account, Role},
        auth::{
            AuthResponse, EmailPayload, LoginPayload, MessageResponse, PrincipalView, RegisterAccountPayload,
            ResetPasswordPayload, VerifyOtpPayload,
        },
    },
    services::auth::Registration,
};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterAccountPayload,
    responses(
        (status = 201, description = "Conta criada; código enviado por e-mail", body = Account),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já em uso")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterAccountPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let account = app_state
        .auth_service
        .register_account(Registration {
            email: payload.email,
            password: payload.password,
            name: payload.name,
            first_name: payload.first_name,
            last_name: payload.last_name,
            specialization: payload.specialization,
            role: payload.role.unwrap_or(Role::User),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(account)))
}

#[utoipa::path(
    post,
    path = "/api/auth/verify-otp",
    tag = "Auth",
    request_body = VerifyOtpPayload,
    responses(
        (status = 200, description = "E-mail confirmado", body = Account),
        (status = 400, description = "Código inválido ou expirado")
    )
)]
pub async fn verify_otp(
    State(app_state): State<AppState>,
    Json(payload): Json<VerifyOtpPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let account = app_state.auth_service.verify_otp(&payload.email, &payload.otp).await?;
    Ok(Json(account))
}

#[utoipa::path(
    post,
    path = "/api/auth/resend-otp",
    tag = "Auth",
    request_body = EmailPayload,
    responses((status = 200, description = "Novo código enviado", body = MessageResponse))
)]
pub async fn resend_otp(
    State(app_state): State<AppState>,
    Json(payload): Json<EmailPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    app_state.auth_service.resend_otp(&payload.email).await?;
    Ok(Json(MessageResponse::new("Novo código enviado.")))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Autenticado", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas"),
        (status = 403, description = "Conta não verificada")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (token, principal) = app_state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse { token, principal: principal.view() }))
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "Auth",
    request_body = EmailPayload,
    responses((status = 200, description = "Se o e-mail existir, o token foi enviado", body = MessageResponse))
)]
pub async fn forgot_password(
    State(app_state): State<AppState>,
    Json(payload): Json<EmailPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    app_state.auth_service.forgot_password(&payload.email).await?;
    Ok(Json(MessageResponse::new(
        "Se o e-mail estiver cadastrado, você receberá as instruções de redefinição.",
    )))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    tag = "Auth",
    request_body = ResetPasswordPayload,
    responses(
        (status = 200, description = "Senha redefinida", body = MessageResponse),
        (status = 400, description = "Token inválido, senha fraca ou repetida")
    )
)]
pub async fn reset_password(
    State(app_state): State<AppState>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    app_state
        .auth_service
        .reset_password(&payload.token, &payload.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Senha redefinida com sucesso.")))
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses((status = 200, description = "Principal autenticado", body = PrincipalView)),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedPrincipal(principal): AuthenticatedPrincipal) -> Json<PrincipalView> {
    Json(principal.view())
}
