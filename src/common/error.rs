// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// As categorias estáveis de erro expostas ao cliente no campo `code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ValidationError,
    Conflict,
    NotFound,
    AuthenticationError,
    AuthorizationError,
    UnexpectedError,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::AuthenticationError => StatusCode::UNAUTHORIZED,
            ErrorKind::AuthorizationError => StatusCode::FORBIDDEN,
            ErrorKind::UnexpectedError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("{0}")]
    Forbidden(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::ValidationError(_) | AppError::InvalidInput(_) => ErrorKind::ValidationError,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::InvalidCredentials | AppError::InvalidToken => ErrorKind::AuthenticationError,
            AppError::Forbidden(_) => ErrorKind::AuthorizationError,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => ErrorKind::UnexpectedError,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = kind.status();

        let body = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "error": "Um ou mais campos são inválidos.",
                    "code": kind,
                    "details": details,
                })
            }
            AppError::InvalidCredentials => json!({ "error": "E-mail ou senha inválidos.", "code": kind }),
            AppError::InvalidToken => {
                json!({ "error": "Token de autenticação inválido ou ausente.", "code": kind })
            }

            // Erros inesperados: o detalhe vai para o log, nunca para o cliente.
            ref e if kind == ErrorKind::UnexpectedError => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                json!({ "error": "Ocorreu um erro inesperado.", "code": kind })
            }

            e => json!({ "error": e.to_string(), "code": kind }),
        };

        (status, Json(body)).into_response()
    }
}

/// Converte violação de unicidade do Postgres em `Conflict`, usando o nome da constraint.
pub(crate) fn map_unique_violation(e: sqlx::Error, describe: impl Fn(&str) -> Option<String>) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            if let Some(message) = describe(constraint) {
                return AppError::Conflict(message);
            }
            return AppError::Conflict("Registro duplicado.".into());
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_has_a_stable_kind() {
        assert_eq!(AppError::invalid("x").kind().status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::conflict("x").kind().status(), StatusCode::CONFLICT);
        assert_eq!(AppError::NotFound("Médico").kind().status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::InvalidToken.kind().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::forbidden("x").kind().status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::InternalServerError(anyhow::anyhow!("boom")).kind(),
            ErrorKind::UnexpectedError
        );
    }

    #[test]
    fn unexpected_errors_do_not_leak_details() {
        let response = AppError::InternalServerError(anyhow::anyhow!("senha do banco: 123")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn codes_on_the_wire_are_stable() {
        let codes: Vec<String> = [
            ErrorKind::ValidationError,
            ErrorKind::Conflict,
            ErrorKind::NotFound,
            ErrorKind::AuthenticationError,
            ErrorKind::AuthorizationError,
            ErrorKind::UnexpectedError,
        ]
        .into_iter()
        .map(|k| serde_json::to_value(k).unwrap().as_str().unwrap().to_string())
        .collect();
        assert_eq!(
            codes,
            [
                "VALIDATION_ERROR",
                "CONFLICT",
                "NOT_FOUND",
                "AUTHENTICATION_ERROR",
                "AUTHORIZATION_ERROR",
                "UNEXPECTED_ERROR"
            ]
        );
    }

    #[test]
    fn not_found_message_names_the_entity() {
        assert_eq!(AppError::NotFound("Hospital").to_string(), "Hospital não encontrado(a)");
    }
}
