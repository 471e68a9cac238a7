// src/services/mailer.rs

use async_trait::async_trait;

use crate::common::error::AppError;

/// Envio de e-mails (OTP, link de redefinição). A entrega real fica fora deste serviço.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError>;
}

/// Implementação padrão: só registra a mensagem no log.
#[derive(Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        tracing::info!(to, subject, "📧 E-mail enfileirado: {}", body);
        Ok(())
    }
}
