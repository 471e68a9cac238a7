// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    account::{Account, Role},
    hospital::Hospital,
};

/// Papel gravado no JWT para administradores de hospital.
pub const ADMIN_ROLE: &str = "admin";

// Dados para registro de uma nova conta
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAccountPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "ana@exemplo.com")]
    pub email: String,

    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub password: String,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub specialization: Option<String>,

    // Padrão: "user"
    pub role: Option<Role>,
}

// Dados para login (conta ou hospital)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyOtpPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(equal = 6, message = "O código deve ter 6 dígitos."))]
    pub otp: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EmailPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordPayload {
    #[validate(length(min = 1, message = "O token é obrigatório."))]
    pub token: String,
    #[validate(length(min = 1, message = "A nova senha é obrigatória."))]
    pub new_password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub principal: PrincipalView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID da conta ou do hospital)
    pub email: String,
    pub role: String,
    pub tenant_id: Option<String>,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}

// ---
// Principal: a identidade autenticada da requisição
// ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    SuperAdmin {
        id: Uuid,
        email: String,
    },
    HospitalAdmin {
        hospital_id: Uuid,
        email: String,
        name: String,
        tenant_id: String,
        // `isHospital`: segunda etapa do portão de acesso
        approved: bool,
    },
    Doctor {
        id: Uuid,
        email: String,
        tenant_id: Option<String>,
    },
    Nurse {
        id: Uuid,
        email: String,
        tenant_id: Option<String>,
    },
    // Recepcionista, farmacêutico e médico ainda não promovido
    Staff {
        id: Uuid,
        email: String,
        role: Role,
        tenant_id: Option<String>,
    },
    Patient {
        id: Uuid,
        email: String,
    },
}

impl Principal {
    pub fn from_account(account: &Account) -> Self {
        let id = account.id;
        let email = account.email.clone();
        let tenant_id = account.selected_hospital_tenant_id.clone();
        match account.role {
            Role::Superadmin => Principal::SuperAdmin { id, email },
            Role::Doctor => Principal::Doctor { id, email, tenant_id },
            Role::Nurse => Principal::Nurse { id, email, tenant_id },
            role @ (Role::DoctorPending | Role::Receptionist | Role::Pharmacist) => {
                Principal::Staff { id, email, role, tenant_id }
            }
            Role::User => Principal::Patient { id, email },
        }
    }

    pub fn from_hospital(hospital: &Hospital) -> Self {
        Principal::HospitalAdmin {
            hospital_id: hospital.id,
            email: hospital.email.clone(),
            name: hospital.hospital_name.clone(),
            tenant_id: hospital.tenant_id.clone(),
            approved: hospital.is_hospital,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Principal::SuperAdmin { id, .. }
            | Principal::Doctor { id, .. }
            | Principal::Nurse { id, .. }
            | Principal::Staff { id, .. }
            | Principal::Patient { id, .. } => *id,
            Principal::HospitalAdmin { hospital_id, .. } => *hospital_id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Principal::SuperAdmin { email, .. }
            | Principal::HospitalAdmin { email, .. }
            | Principal::Doctor { email, .. }
            | Principal::Nurse { email, .. }
            | Principal::Staff { email, .. }
            | Principal::Patient { email, .. } => email,
        }
    }

    /// O papel como aparece no JWT.
    pub fn role_label(&self) -> &'static str {
        match self {
            Principal::SuperAdmin { .. } => Role::Superadmin.as_str(),
            Principal::HospitalAdmin { .. } => ADMIN_ROLE,
            Principal::Doctor { .. } => Role::Doctor.as_str(),
            Principal::Nurse { .. } => Role::Nurse.as_str(),
            Principal::Staff { role, .. } => role.as_str(),
            Principal::Patient { .. } => Role::User.as_str(),
        }
    }

    pub fn tenant_id(&self) -> Option<&str> {
        match self {
            Principal::HospitalAdmin { tenant_id, .. } => Some(tenant_id),
            Principal::Doctor { tenant_id, .. }
            | Principal::Nurse { tenant_id, .. }
            | Principal::Staff { tenant_id, .. } => tenant_id.as_deref(),
            Principal::SuperAdmin { .. } | Principal::Patient { .. } => None,
        }
    }

    pub fn view(&self) -> PrincipalView {
        let name = match self {
            Principal::HospitalAdmin { name, .. } => Some(name.clone()),
            _ => None,
        };
        PrincipalView {
            id: self.id(),
            email: self.email().to_string(),
            role: self.role_label().to_string(),
            name,
            tenant_id: self.tenant_id().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalView {
    pub id: Uuid,
    pub email: String,
    #[schema(example = "admin")]
    pub role: String,
    pub name: Option<String>,
    pub tenant_id: Option<String>,
}
