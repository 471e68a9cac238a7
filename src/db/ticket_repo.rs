// src/db/ticket_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::repository::TicketRepository,
    models::ticket::{SupportTicket, TenantTicket, TicketStatus},
};

#[derive(Clone)]
pub struct PgTicketRepository {
    pool: PgPool,
}

impl PgTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Linha do JOIN ticket + conta
#[derive(FromRow)]
struct TenantTicketRow {
    #[sqlx(flatten)]
    ticket: SupportTicket,
    account_name: String,
    account_first_name: Option<String>,
    account_last_name: Option<String>,
    account_email: String,
}

impl From<TenantTicketRow> for TenantTicket {
    fn from(row: TenantTicketRow) -> Self {
        let account_name = if row.account_name.trim().is_empty() {
            [row.account_first_name, row.account_last_name]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            row.account_name
        };
        TenantTicket {
            ticket: row.ticket,
            account_name,
            account_email: row.account_email,
        }
    }
}

#[async_trait]
impl TicketRepository for PgTicketRepository {
    async fn create(&self, account_id: Uuid, subject: &str, message: &str) -> Result<SupportTicket, AppError> {
        let ticket = sqlx::query_as::<_, SupportTicket>(
            r#"
            INSERT INTO support_tickets (account_id, subject, message)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(account_id)
        .bind(subject)
        .bind(message)
        .fetch_one(&self.pool)
        .await?;
        Ok(ticket)
    }

    async fn list_for_account(&self, account_id: Uuid) -> Result<Vec<SupportTicket>, AppError> {
        let tickets = sqlx::query_as::<_, SupportTicket>(
            "SELECT * FROM support_tickets WHERE account_id = $1 ORDER BY created_at DESC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tickets)
    }

    async fn list_for_tenant(&self, tenant_id: &str) -> Result<Vec<TenantTicket>, AppError> {
        let rows = sqlx::query_as::<_, TenantTicketRow>(
            r#"
            SELECT t.*,
                   a.name       AS account_name,
                   a.first_name AS account_first_name,
                   a.last_name  AS account_last_name,
                   a.email      AS account_email
            FROM support_tickets t
            JOIN accounts a ON a.id = t.account_id
            WHERE a.selected_hospital_tenant_id = $1
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(TenantTicket::from).collect())
    }

    async fn reply(
        &self,
        account_id: Uuid,
        ticket_id: Uuid,
        reply: &str,
        replied_at: DateTime<Utc>,
    ) -> Result<SupportTicket, AppError> {
        sqlx::query_as::<_, SupportTicket>(
            r#"
            UPDATE support_tickets
            SET reply = $3, status = $4, reply_at = $5
            WHERE id = $1 AND account_id = $2
            RETURNING *
            "#,
        )
        .bind(ticket_id)
        .bind(account_id)
        .bind(reply)
        .bind(TicketStatus::Closed)
        .bind(replied_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Ticket"))
    }
}
