// src/models/account.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// 1. Papéis e Status
// ---
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "account_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Superadmin,
    Doctor,
    DoctorPending, // Vira "doctor_pending"
    Nurse,
    Receptionist,
    Pharmacist,
    User,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Doctor => "doctor",
            Role::DoctorPending => "doctor_pending",
            Role::Nurse => "nurse",
            Role::Receptionist => "receptionist",
            Role::Pharmacist => "pharmacist",
            Role::User => "user",
        }
    }

    /// Papéis que podem se cadastrar pela rota pública.
    pub fn is_self_registrable(self) -> bool {
        !matches!(self, Role::Superadmin)
    }

    /// Médico já aprovado ou aguardando promoção.
    pub fn is_doctor_like(self) -> bool {
        matches!(self, Role::Doctor | Role::DoctorPending)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "account_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Inactive,
    Locked,
    PasswordExpired,
}

// ---
// 2. Account (usuário, médico, enfermeiro, equipe...)
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_picture: Option<String>,
    pub specialization: Option<String>,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_history: Vec<String>,

    pub role: Role,

    // Usuário comum: e-mail confirmado via OTP.
    // Médico/enfermeiro: aprovado pelo superior.
    pub is_verified: bool,

    pub status: AccountStatus,

    pub selected_hospital: Option<Uuid>,
    pub selected_hospital_tenant_id: Option<String>,
    pub selected_category: Option<Uuid>,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub otp: Option<String>,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub otp_expires_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub reset_token: Option<String>,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Nome de exibição: `name` ou, na falta dele, "nome sobrenome".
    pub fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.clone();
        }
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.trim().is_empty())
            .collect();
        parts.join(" ")
    }

    /// Já vinculada a um departamento: daqui em diante só o superior altera `is_verified`.
    pub fn has_department(&self) -> bool {
        self.selected_category.is_some()
    }

    /// Mesmo par (categoria, hospital), que é a regra de vínculo médico ↔ enfermeiro.
    pub fn shares_department_with(&self, other: &Account) -> bool {
        self.selected_category.is_some()
            && self.selected_hospital.is_some()
            && self.selected_category == other.selected_category
            && self.selected_hospital == other.selected_hospital
    }
}

// Projeção curta usada em listagens
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_verified: bool,
    pub status: AccountStatus,
}

impl From<&Account> for AccountSummary {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id,
            name: a.display_name(),
            email: a.email.clone(),
            role: a.role,
            is_verified: a.is_verified,
            status: a.status,
        }
    }
}

// Projeção "segura" de médico para o fluxo público de agendamento
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorCard {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_picture: Option<String>,
    pub specialization: Option<String>,
}

impl From<&Account> for DoctorCard {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id,
            name: a.display_name(),
            email: a.email.clone(),
            profile_picture: a.profile_picture.clone(),
            specialization: a.specialization.clone(),
        }
    }
}

// Dados prontos para inserir uma nova conta
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub specialization: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub is_verified: bool,
    pub otp: Option<String>,
    pub otp_expires_at: Option<DateTime<Utc>>,
}

// Vínculo de departamento: categoria + hospital + tenant andam sempre juntos
#[derive(Debug, Clone)]
pub struct DepartmentLink {
    pub category_id: Uuid,
    pub hospital_id: Uuid,
    pub tenant_id: String,
}

// ---
// 3. Review (avaliação de um médico, pertence à conta do médico)
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub reviewer_id: Uuid,
    #[schema(example = 5)]
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Médico/enfermeiro com a categoria já resolvida (painel do admin e do médico)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    #[serde(flatten)]
    pub account: AccountSummary,
    pub specialization: Option<String>,
    pub category: Option<crate::models::hospital::Category>,
}
