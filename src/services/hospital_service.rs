// src/services/hospital_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        password::{check_policy, hash_password},
        tokens::generate_tenant_id,
    },
    db::{AccountRepository, HospitalRepository},
    models::{
        account::{AccountSummary, Role},
        auth::Principal,
        hospital::{
            Hospital, HospitalChanges, HospitalCreated, HospitalOverview, HospitalStatus, NewHospital,
            PublicHospital,
        },
    },
    services::access,
};

// Quantas vezes tentamos sortear um tenant livre
const TENANT_ID_ATTEMPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct HospitalRegistration {
    pub hospital_name: String,
    pub email: String,
    pub password: String,
    pub license_number: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    // URL de uma imagem já enviada ao storage externo
    pub image_url: Option<String>,
}

#[derive(Clone)]
pub struct HospitalService {
    hospitals: Arc<dyn HospitalRepository>,
    accounts: Arc<dyn AccountRepository>,
    bcrypt_cost: u32,
}

impl HospitalService {
    pub fn new(
        hospitals: Arc<dyn HospitalRepository>,
        accounts: Arc<dyn AccountRepository>,
        bcrypt_cost: u32,
    ) -> Self {
        Self { hospitals, accounts, bcrypt_cost }
    }

    /// Cadastro público de hospital: nasce PENDING e com `is_hospital = false`.
    pub async fn create_hospital(&self, input: HospitalRegistration) -> Result<HospitalCreated, AppError> {
        let required = [
            ("hospitalName", &input.hospital_name),
            ("email", &input.email),
            ("password", &input.password),
            ("licenseNumber", &input.license_number),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(AppError::invalid(format!("O campo '{field}' é obrigatório.")));
        }
        check_policy(&input.password)?;

        let email = input.email.trim().to_lowercase();
        // O login tenta contas antes de hospitais: o e-mail precisa ser único nas duas coleções
        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Este e-mail já está em uso."));
        }

        let tenant_id = self.free_tenant_id().await?;
        let password_hash = hash_password(&input.password, self.bcrypt_cost).await?;

        let hospital = self
            .hospitals
            .create(NewHospital {
                tenant_id,
                hospital_name: input.hospital_name.trim().to_string(),
                email,
                license_number: input.license_number.trim().to_string(),
                address: input.address,
                phone: input.phone,
                image_url: input.image_url,
                password_hash,
            })
            .await?;

        tracing::info!(hospital_id = %hospital.id, tenant_id = %hospital.tenant_id, "🏥 Hospital cadastrado");
        Ok(HospitalCreated { id: hospital.id, tenant_id: hospital.tenant_id })
    }

    async fn free_tenant_id(&self) -> Result<String, AppError> {
        for _ in 0..TENANT_ID_ATTEMPTS {
            let candidate = generate_tenant_id();
            if self.hospitals.find_by_tenant(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }
        Err(anyhow::anyhow!("Não foi possível gerar um tenant livre").into())
    }

    pub async fn list_public(&self) -> Result<Vec<PublicHospital>, AppError> {
        let hospitals = self.hospitals.list().await?;
        Ok(hospitals.iter().map(PublicHospital::from).collect())
    }

    /// Idempotente: aprovar de novo apenas regrava o mesmo estado.
    pub async fn approve_hospital(&self, actor: &Principal, id: Uuid) -> Result<Hospital, AppError> {
        access::superadmin(actor)?;
        let hospital = self.hospitals.set_approval(id, true, HospitalStatus::Verified).await?;
        tracing::info!(hospital_id = %id, "Hospital aprovado");
        Ok(hospital)
    }

    pub async fn reject_hospital(&self, actor: &Principal, id: Uuid) -> Result<Hospital, AppError> {
        access::superadmin(actor)?;
        let hospital = self.hospitals.set_approval(id, false, HospitalStatus::Inactive).await?;
        tracing::info!(hospital_id = %id, "Hospital rejeitado");
        Ok(hospital)
    }

    /// Todos os hospitais, cada um com suas categorias e contas vinculadas.
    pub async fn overview(&self, actor: &Principal) -> Result<Vec<HospitalOverview>, AppError> {
        access::superadmin(actor)?;

        let hospitals = self.hospitals.list().await?;
        let mut overview = Vec::with_capacity(hospitals.len());
        for hospital in hospitals {
            let categories = self.hospitals.list_categories(hospital.id).await?;
            let members = self
                .accounts
                .list_by_hospital(hospital.id)
                .await?
                .iter()
                .map(AccountSummary::from)
                .collect();
            overview.push(HospitalOverview { hospital, categories, members });
        }
        Ok(overview)
    }

    pub async fn update_hospital(
        &self,
        actor: &Principal,
        id: Uuid,
        mut changes: HospitalChanges,
    ) -> Result<Hospital, AppError> {
        access::superadmin(actor)?;
        changes.hospital_name = changes.hospital_name.map(|n| n.trim().to_string());
        if changes.hospital_name.as_deref().is_some_and(str::is_empty) {
            return Err(AppError::invalid("O nome do hospital não pode ser vazio."));
        }
        self.hospitals.update(id, changes).await
    }

    /// Recusada com `Conflict` enquanto houver contas vinculadas ao hospital.
    pub async fn delete_hospital(&self, actor: &Principal, id: Uuid) -> Result<(), AppError> {
        access::superadmin(actor)?;
        self.hospitals.delete_if_unreferenced(id).await?;
        tracing::info!(hospital_id = %id, "🗑️ Hospital excluído");
        Ok(())
    }

    pub async fn list_accounts(&self, actor: &Principal) -> Result<Vec<AccountSummary>, AppError> {
        access::superadmin(actor)?;
        let accounts = self.accounts.list_all().await?;
        Ok(accounts.iter().map(AccountSummary::from).collect())
    }

    pub async fn list_doctors(&self, actor: &Principal) -> Result<Vec<AccountSummary>, AppError> {
        access::superadmin(actor)?;
        let doctors = self
            .accounts
            .list_by_roles(&[Role::Doctor, Role::DoctorPending])
            .await?;
        Ok(doctors.iter().map(AccountSummary::from).collect())
    }
}
