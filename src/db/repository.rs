// src/db/repository.rs

//! Contratos de acesso a dados. Há duas implementações: Postgres (`Pg*Repository`)
//! e memória (`MemoryStore`). Os serviços só conhecem estes traits.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        account::{Account, DepartmentLink, NewAccount, Review, Role},
        appointment::{Appointment, AppointmentStatus, NewAppointment, SlotPolicy},
        hospital::{Category, CategoryListing, Hospital, HospitalChanges, HospitalStatus, NewHospital},
        ticket::{SupportTicket, TenantTicket},
    },
};

// ---
// Hospitais e suas categorias
// ---
#[async_trait]
pub trait HospitalRepository: Send + Sync {
    /// `Conflict` em e-mail, licença, nome ou tenant duplicados.
    async fn create(&self, input: NewHospital) -> Result<Hospital, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Hospital>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Hospital>, AppError>;
    async fn find_by_tenant(&self, tenant_id: &str) -> Result<Option<Hospital>, AppError>;
    async fn list(&self) -> Result<Vec<Hospital>, AppError>;

    async fn set_approval(
        &self,
        id: Uuid,
        is_hospital: bool,
        status: HospitalStatus,
    ) -> Result<Hospital, AppError>;

    async fn update(&self, id: Uuid, changes: HospitalChanges) -> Result<Hospital, AppError>;

    /// Remove o hospital (e as categorias dele). `Conflict` se alguma conta ainda o referencia.
    async fn delete_if_unreferenced(&self, id: Uuid) -> Result<(), AppError>;

    async fn list_categories(&self, hospital_id: Uuid) -> Result<Vec<Category>, AppError>;
    async fn list_all_categories(&self) -> Result<Vec<CategoryListing>, AppError>;
    async fn find_category(&self, category_id: Uuid) -> Result<Option<Category>, AppError>;

    /// `Conflict` se já existe categoria com o mesmo nome (sem diferenciar maiúsculas) no hospital.
    async fn add_category(
        &self,
        hospital_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, AppError>;

    async fn update_category(
        &self,
        hospital_id: Uuid,
        category_id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Category, AppError>;

    async fn delete_category(&self, hospital_id: Uuid, category_id: Uuid) -> Result<(), AppError>;
}

// ---
// Contas (e avaliações)
// ---
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// `Conflict` se o e-mail já existe.
    async fn create(&self, input: NewAccount) -> Result<Account, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError>;
    async fn find_by_reset_token(&self, token: &str) -> Result<Option<Account>, AppError>;

    async fn list_all(&self) -> Result<Vec<Account>, AppError>;
    async fn list_by_roles(&self, roles: &[Role]) -> Result<Vec<Account>, AppError>;

    /// Contas cujo `selected_hospital_tenant_id` é o tenant; `roles` vazio = todos os papéis.
    async fn list_by_tenant(&self, tenant_id: &str, roles: &[Role]) -> Result<Vec<Account>, AppError>;
    async fn list_by_hospital(&self, hospital_id: Uuid) -> Result<Vec<Account>, AppError>;
    async fn list_by_department(
        &self,
        role: Role,
        category_id: Uuid,
        hospital_id: Uuid,
    ) -> Result<Vec<Account>, AppError>;
    async fn list_active_doctors_by_category(&self, category_id: Uuid) -> Result<Vec<Account>, AppError>;

    /// Define `is_verified` e, opcionalmente, troca o papel.
    async fn set_verification(
        &self,
        id: Uuid,
        is_verified: bool,
        role: Option<Role>,
    ) -> Result<Account, AppError>;

    /// Grava categoria + hospital + tenant juntos e volta a conta para "não aprovada".
    async fn set_department(&self, id: Uuid, link: &DepartmentLink) -> Result<Account, AppError>;

    async fn set_otp(
        &self,
        id: Uuid,
        otp: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError>;

    /// Confirma o e-mail: `is_verified = true` e descarta o OTP.
    async fn verify_email(&self, id: Uuid) -> Result<Account, AppError>;

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError>;

    /// Troca a senha, acrescenta o hash ao histórico e descarta o token de reset.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    async fn add_review(
        &self,
        doctor_id: Uuid,
        reviewer_id: Uuid,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Review, AppError>;
    async fn list_reviews(&self, doctor_id: Uuid) -> Result<Vec<Review>, AppError>;
}

// ---
// Agendamentos
// ---
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Reconfere o horário e insere de forma atômica. `Conflict` se o horário já está ocupado.
    async fn book(&self, input: NewAppointment, policy: SlotPolicy) -> Result<Appointment, AppError>;

    /// Horários ocupados do médico na data, conforme a política.
    async fn booked_times(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        policy: SlotPolicy,
    ) -> Result<Vec<String>, AppError>;

    /// Mais recentes primeiro.
    async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, AppError>;
    async fn list_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, AppError>;

    async fn find(&self, patient_id: Uuid, appointment_id: Uuid) -> Result<Option<Appointment>, AppError>;

    async fn update_status(
        &self,
        patient_id: Uuid,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppError>;

    async fn delete(&self, patient_id: Uuid, appointment_id: Uuid) -> Result<(), AppError>;
}

// ---
// Tickets de suporte
// ---
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn create(&self, account_id: Uuid, subject: &str, message: &str) -> Result<SupportTicket, AppError>;
    async fn list_for_account(&self, account_id: Uuid) -> Result<Vec<SupportTicket>, AppError>;
    async fn list_for_tenant(&self, tenant_id: &str) -> Result<Vec<TenantTicket>, AppError>;

    /// Grava a resposta e fecha o ticket. `NotFound` se o ticket não pertence à conta.
    async fn reply(
        &self,
        account_id: Uuid,
        ticket_id: Uuid,
        reply: &str,
        replied_at: DateTime<Utc>,
    ) -> Result<SupportTicket, AppError>;
}
