// src/models/hospital.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::account::AccountSummary;

// ---
// 1. Status do Hospital
// ---
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "hospital_status", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum HospitalStatus {
    Pending,
    Verified,
    Active,
    Suspended,
    Inactive,
}

// ---
// 2. Hospital (a raiz do Tenant)
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    pub id: Uuid,

    #[schema(example = "tenant-482913")]
    pub tenant_id: String,

    #[schema(example = "Hospital São Lucas")]
    pub hospital_name: String,

    pub email: String,
    pub license_number: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    // Hashes anteriores (o atual incluído), usados para barrar reuso de senha
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_history: Vec<String>,

    pub status: HospitalStatus,

    // Só vira `true` depois da aprovação do superadmin
    pub is_hospital: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 3. Category (Departamento, pertence a um Hospital)
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub hospital_id: Uuid,

    #[schema(example = "Cardiologia")]
    pub name: String,

    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Categoria "achatada" para o fluxo público de agendamento
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListing {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub hospital_id: Uuid,
    pub hospital_name: String,
}

// Visão do superadmin: hospital + categorias + contas vinculadas
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HospitalOverview {
    #[serde(flatten)]
    pub hospital: Hospital,
    pub categories: Vec<Category>,
    pub members: Vec<AccountSummary>,
}

// Listagem pública (sem dados sensíveis)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicHospital {
    pub id: Uuid,
    pub tenant_id: String,
    pub hospital_name: String,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub status: HospitalStatus,
}

impl From<&Hospital> for PublicHospital {
    fn from(h: &Hospital) -> Self {
        Self {
            id: h.id,
            tenant_id: h.tenant_id.clone(),
            hospital_name: h.hospital_name.clone(),
            address: h.address.clone(),
            image_url: h.image_url.clone(),
            status: h.status,
        }
    }
}

// Dados já validados e com a senha em hash, prontos para o repositório
#[derive(Debug, Clone)]
pub struct NewHospital {
    pub tenant_id: String,
    pub hospital_name: String,
    pub email: String,
    pub license_number: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub password_hash: String,
}

// Atualização parcial feita pelo superadmin
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HospitalChanges {
    pub hospital_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<HospitalStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HospitalCreated {
    pub id: Uuid,
    pub tenant_id: String,
}
