// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        AccountRepository, AppointmentRepository, HospitalRepository, MemoryStore, PgAccountRepository,
        PgAppointmentRepository, PgHospitalRepository, PgTicketRepository, TicketRepository,
    },
    models::appointment::SlotPolicy,
    services::{
        appointment_service::AppointmentService,
        approval_service::ApprovalService,
        auth::{AuthService, AuthSettings},
        dashboard_service::DashboardService,
        hospital_service::HospitalService,
        mailer::LogMailer,
        ticket_service::TicketService,
    },
};

// ---
// Configuração lida do ambiente (.env)
// ---
#[derive(Debug, Clone)]
pub struct Config {
    // Sem DATABASE_URL a aplicação sobe com o backend em memória
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub slot_policy: SlotPolicy,
    pub otp_ttl_minutes: i64,
    pub reset_ttl_minutes: i64,
    pub bind_addr: String,
    pub superadmin_email: Option<String>,
    pub superadmin_password: Option<String>,
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Valor inválido para {key} ('{raw}'): {e}")),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: optional_var("DATABASE_URL"),
            db_max_connections: parsed_var("DB_MAX_CONNECTIONS", 5)?,
            jwt_secret: optional_var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            jwt_ttl_hours: parsed_var("JWT_TTL_HOURS", 168)?,
            bcrypt_cost: parsed_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            slot_policy: parsed_var("SLOT_POLICY", SlotPolicy::default())?,
            otp_ttl_minutes: parsed_var("OTP_TTL_MINUTES", 10)?,
            reset_ttl_minutes: parsed_var("RESET_TTL_MINUTES", 30)?,
            bind_addr: optional_var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            superadmin_email: optional_var("SUPERADMIN_EMAIL"),
            superadmin_password: optional_var("SUPERADMIN_PASSWORD"),
        })
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            jwt_secret: self.jwt_secret.clone(),
            token_ttl: chrono::Duration::hours(self.jwt_ttl_hours),
            otp_ttl: chrono::Duration::minutes(self.otp_ttl_minutes),
            reset_ttl: chrono::Duration::minutes(self.reset_ttl_minutes),
            bcrypt_cost: self.bcrypt_cost,
        }
    }
}

// ---
// O estado compartilhado que será acessível em toda a aplicação
// ---
#[derive(Clone)]
pub struct AppState {
    pub db_pool: Option<PgPool>,
    pub auth_service: AuthService,
    pub hospital_service: HospitalService,
    pub approval_service: ApprovalService,
    pub appointment_service: AppointmentService,
    pub ticket_service: TicketService,
    pub dashboard_service: DashboardService,
}

struct Repositories {
    hospitals: Arc<dyn HospitalRepository>,
    accounts: Arc<dyn AccountRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    tickets: Arc<dyn TicketRepository>,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let Some(database_url) = &config.database_url else {
            tracing::warn!("⚠️ DATABASE_URL não definida: usando o backend em memória (dados não persistem)");
            return Ok(Self::in_memory(config));
        };

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let repos = Repositories {
            hospitals: Arc::new(PgHospitalRepository::new(db_pool.clone())),
            accounts: Arc::new(PgAccountRepository::new(db_pool.clone())),
            appointments: Arc::new(PgAppointmentRepository::new(db_pool.clone())),
            tickets: Arc::new(PgTicketRepository::new(db_pool.clone())),
        };
        Ok(Self::assemble(Some(db_pool), repos, config))
    }

    pub fn in_memory(config: &Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let repos = Repositories {
            hospitals: store.clone(),
            accounts: store.clone(),
            appointments: store.clone(),
            tickets: store,
        };
        Self::assemble(None, repos, config)
    }

    // --- Monta o gráfico de dependências ---
    fn assemble(db_pool: Option<PgPool>, repos: Repositories, config: &Config) -> Self {
        let Repositories { hospitals, accounts, appointments, tickets } = repos;

        Self {
            db_pool,
            auth_service: AuthService::new(
                accounts.clone(),
                hospitals.clone(),
                Arc::new(LogMailer),
                config.auth_settings(),
            ),
            hospital_service: HospitalService::new(hospitals.clone(), accounts.clone(), config.bcrypt_cost),
            approval_service: ApprovalService::new(hospitals.clone(), accounts.clone()),
            appointment_service: AppointmentService::new(
                appointments.clone(),
                accounts.clone(),
                hospitals.clone(),
                config.slot_policy,
            ),
            ticket_service: TicketService::new(tickets, accounts.clone()),
            dashboard_service: DashboardService::new(accounts, hospitals, appointments),
        }
    }
}
