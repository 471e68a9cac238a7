// src/services/ticket_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AccountRepository, TicketRepository},
    models::{
        auth::Principal,
        ticket::{SupportTicket, TenantTicket},
    },
    services::access,
};

#[derive(Clone)]
pub struct TicketService {
    tickets: Arc<dyn TicketRepository>,
    accounts: Arc<dyn AccountRepository>,
}

impl TicketService {
    pub fn new(tickets: Arc<dyn TicketRepository>, accounts: Arc<dyn AccountRepository>) -> Self {
        Self { tickets, accounts }
    }

    /// Abre um ticket em nome da própria conta (status `open`).
    pub async fn create(&self, actor: &Principal, subject: &str, message: &str) -> Result<SupportTicket, AppError> {
        let account_id = access::account_holder(actor)?;
        let (subject, message) = (subject.trim(), message.trim());
        if subject.is_empty() || message.is_empty() {
            return Err(AppError::invalid("Assunto e mensagem são obrigatórios."));
        }

        let ticket = self.tickets.create(account_id, subject, message).await?;
        tracing::info!(ticket_id = %ticket.id, account_id = %account_id, "🎫 Ticket aberto");
        Ok(ticket)
    }

    pub async fn my_tickets(&self, actor: &Principal) -> Result<Vec<SupportTicket>, AppError> {
        let account_id = access::account_holder(actor)?;
        self.tickets.list_for_account(account_id).await
    }

    /// Tickets de todas as contas do tenant do admin, com nome e e-mail do dono.
    pub async fn tenant_tickets(&self, actor: &Principal) -> Result<Vec<TenantTicket>, AppError> {
        let scope = access::hospital_admin(actor)?;
        self.tickets.list_for_tenant(&scope.tenant_id).await
    }

    pub async fn reply(
        &self,
        actor: &Principal,
        account_id: Uuid,
        ticket_id: Uuid,
        reply: &str,
    ) -> Result<SupportTicket, AppError> {
        let scope = access::hospital_admin(actor)?;
        let reply = reply.trim();
        if reply.is_empty() {
            return Err(AppError::invalid("A resposta não pode ser vazia."));
        }

        // Conta de outro tenant é tratada como inexistente
        self.accounts
            .find_by_id(account_id)
            .await?
            .filter(|a| a.selected_hospital_tenant_id.as_deref() == Some(scope.tenant_id.as_str()))
            .ok_or(AppError::NotFound("Conta"))?;

        let ticket = self.tickets.reply(account_id, ticket_id, reply, Utc::now()).await?;
        tracing::info!(ticket_id = %ticket_id, tenant_id = %scope.tenant_id, "Ticket respondido e fechado");
        Ok(ticket)
    }
}
