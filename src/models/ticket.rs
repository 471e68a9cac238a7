// src/models/ticket.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "ticket_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    // Existe no modelo, mas nenhuma operação leva um ticket até aqui
    Pending,
    Closed,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicket {
    pub id: Uuid,
    pub account_id: Uuid,
    pub subject: String,
    pub message: String,
    pub status: TicketStatus,
    pub reply: Option<String>,
    pub reply_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// Visão do admin: ticket + dono
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantTicket {
    #[serde(flatten)]
    pub ticket: SupportTicket,
    pub account_name: String,
    pub account_email: String,
}
