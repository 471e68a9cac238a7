// src/services/approval_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AccountRepository, HospitalRepository},
    models::{
        account::{Account, AccountSummary, DepartmentLink, DoctorCard, Role, StaffMember},
        auth::Principal,
        hospital::{Category, CategoryListing},
    },
    services::access::{self, AdminScope},
};

#[derive(Clone)]
pub struct ApprovalService {
    hospitals: Arc<dyn HospitalRepository>,
    accounts: Arc<dyn AccountRepository>,
}

impl ApprovalService {
    pub fn new(hospitals: Arc<dyn HospitalRepository>, accounts: Arc<dyn AccountRepository>) -> Self {
        Self { hospitals, accounts }
    }

    async fn to_staff(&self, account: &Account) -> Result<StaffMember, AppError> {
        let category = match account.selected_category {
            Some(id) => self.hospitals.find_category(id).await?,
            None => None,
        };
        Ok(StaffMember {
            account: AccountSummary::from(account),
            specialization: account.specialization.clone(),
            category,
        })
    }

    // =========================================================================
    //  1. ADMIN DO HOSPITAL: MÉDICOS
    // =========================================================================

    /// Médicos do tenant do admin, com a categoria resolvida.
    pub async fn list_doctors(&self, actor: &Principal) -> Result<Vec<StaffMember>, AppError> {
        let scope = access::hospital_admin(actor)?;
        let doctors = self
            .accounts
            .list_by_tenant(&scope.tenant_id, &[Role::Doctor, Role::DoctorPending])
            .await?;

        let mut staff = Vec::with_capacity(doctors.len());
        for doctor in &doctors {
            staff.push(self.to_staff(doctor).await?);
        }
        Ok(staff)
    }

    /// Todas as contas vinculadas ao tenant do admin.
    pub async fn list_tenant_accounts(&self, actor: &Principal) -> Result<Vec<AccountSummary>, AppError> {
        let scope = access::hospital_admin(actor)?;
        let accounts = self.accounts.list_by_tenant(&scope.tenant_id, &[]).await?;
        Ok(accounts.iter().map(AccountSummary::from).collect())
    }

    // Fora do tenant do admin o médico simplesmente "não existe"
    async fn tenant_doctor(&self, scope: &AdminScope, doctor_id: Uuid) -> Result<Account, AppError> {
        self.accounts
            .find_by_id(doctor_id)
            .await?
            .filter(|a| a.role.is_doctor_like())
            .filter(|a| a.selected_hospital_tenant_id.as_deref() == Some(scope.tenant_id.as_str()))
            .ok_or(AppError::NotFound("Médico"))
    }

    /// Idempotente. Um `doctor_pending` é promovido a `doctor`.
    pub async fn approve_doctor(&self, actor: &Principal, doctor_id: Uuid) -> Result<Account, AppError> {
        let scope = access::hospital_admin(actor)?;
        self.tenant_doctor(&scope, doctor_id).await?;

        let doctor = self
            .accounts
            .set_verification(doctor_id, true, Some(Role::Doctor))
            .await?;
        tracing::info!(doctor_id = %doctor_id, tenant_id = %scope.tenant_id, "✅ Médico aprovado");
        Ok(doctor)
    }

    pub async fn toggle_doctor(&self, actor: &Principal, doctor_id: Uuid) -> Result<Account, AppError> {
        let scope = access::hospital_admin(actor)?;
        let current = self.tenant_doctor(&scope, doctor_id).await?;

        let doctor = self
            .accounts
            .set_verification(doctor_id, !current.is_verified, None)
            .await?;
        tracing::info!(doctor_id = %doctor_id, is_verified = doctor.is_verified, "Aprovação do médico alternada");
        Ok(doctor)
    }

    /// Rejeitar apaga a conta do médico.
    pub async fn reject_doctor(&self, actor: &Principal, doctor_id: Uuid) -> Result<(), AppError> {
        let scope = access::hospital_admin(actor)?;
        self.tenant_doctor(&scope, doctor_id).await?;

        self.accounts.delete(doctor_id).await?;
        tracing::info!(doctor_id = %doctor_id, tenant_id = %scope.tenant_id, "Médico rejeitado e removido");
        Ok(())
    }

    // =========================================================================
    //  2. ADMIN DO HOSPITAL: CATEGORIAS
    // =========================================================================

    pub async fn create_category(
        &self,
        actor: &Principal,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, AppError> {
        let scope = access::hospital_admin(actor)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::invalid("O nome da categoria é obrigatório."));
        }

        let category = self
            .hospitals
            .add_category(scope.hospital_id, name, description)
            .await?;
        tracing::info!(category_id = %category.id, tenant_id = %scope.tenant_id, "Categoria criada");
        Ok(category)
    }

    pub async fn list_categories(&self, actor: &Principal) -> Result<Vec<Category>, AppError> {
        let scope = access::hospital_admin(actor)?;
        self.hospitals.list_categories(scope.hospital_id).await
    }

    pub async fn update_category(
        &self,
        actor: &Principal,
        category_id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Category, AppError> {
        let scope = access::hospital_admin(actor)?;
        let name = name.map(str::trim);
        if name.is_some_and(str::is_empty) {
            return Err(AppError::invalid("O nome da categoria não pode ser vazio."));
        }
        self.hospitals
            .update_category(scope.hospital_id, category_id, name, description)
            .await
    }

    pub async fn delete_category(&self, actor: &Principal, category_id: Uuid) -> Result<(), AppError> {
        let scope = access::hospital_admin(actor)?;
        self.hospitals.delete_category(scope.hospital_id, category_id).await?;
        tracing::info!(category_id = %category_id, tenant_id = %scope.tenant_id, "Categoria removida");
        Ok(())
    }

    // =========================================================================
    //  3. MÉDICO / ENFERMEIRO: ESCOLHA DE DEPARTAMENTO
    // =========================================================================

    /// Escolher a categoria define também o hospital (e o tenant) e volta a conta para pendente.
    pub async fn choose_category(&self, actor: &Principal, category_id: Uuid) -> Result<Account, AppError> {
        let account_id = access::clinician(actor)?;

        let category = self
            .hospitals
            .find_category(category_id)
            .await?
            .ok_or(AppError::NotFound("Categoria"))?;
        let hospital = self
            .hospitals
            .find_by_id(category.hospital_id)
            .await?
            .ok_or(AppError::NotFound("Hospital"))?;

        let link = DepartmentLink {
            category_id: category.id,
            hospital_id: hospital.id,
            tenant_id: hospital.tenant_id.clone(),
        };
        let account = self.accounts.set_department(account_id, &link).await?;
        tracing::info!(
            account_id = %account_id,
            category_id = %category.id,
            tenant_id = %hospital.tenant_id,
            "Departamento escolhido; aguardando aprovação"
        );
        Ok(account)
    }

    /// Catálogo completo para quem ainda não tem hospital.
    pub async fn all_categories(&self, actor: &Principal) -> Result<Vec<CategoryListing>, AppError> {
        access::clinician(actor)?;
        self.hospitals.list_all_categories().await
    }

    // =========================================================================
    //  4. MÉDICO: ENFERMEIROS DO MESMO DEPARTAMENTO
    // =========================================================================

    async fn current_account(&self, id: Uuid) -> Result<Account, AppError> {
        self.accounts.find_by_id(id).await?.ok_or(AppError::NotFound("Conta"))
    }

    // O token continua válido depois de trocar de categoria ou ser desativado;
    // a aprovação é conferida na conta a cada operação.
    async fn approved_doctor(&self, actor: &Principal) -> Result<Account, AppError> {
        let doctor = self.current_account(access::doctor(actor)?).await?;
        if !doctor.is_verified {
            return Err(AppError::forbidden("Médico ainda não aprovado pelo hospital."));
        }
        Ok(doctor)
    }

    pub async fn list_nurses(&self, actor: &Principal) -> Result<Vec<StaffMember>, AppError> {
        let doctor = self.approved_doctor(actor).await?;
        let (Some(category_id), Some(hospital_id)) = (doctor.selected_category, doctor.selected_hospital) else {
            return Ok(Vec::new());
        };

        let nurses = self
            .accounts
            .list_by_department(Role::Nurse, category_id, hospital_id)
            .await?;
        let mut staff = Vec::with_capacity(nurses.len());
        for nurse in &nurses {
            staff.push(self.to_staff(nurse).await?);
        }
        Ok(staff)
    }

    // Enfermeiro de outro departamento: existe, mas não é deste médico
    async fn department_nurse(&self, doctor: &Account, nurse_id: Uuid) -> Result<Account, AppError> {
        let nurse = self
            .accounts
            .find_by_id(nurse_id)
            .await?
            .filter(|a| a.role == Role::Nurse)
            .ok_or(AppError::NotFound("Enfermeiro"))?;

        if !doctor.shares_department_with(&nurse) {
            return Err(AppError::forbidden(
                "O enfermeiro não pertence à mesma categoria e hospital do médico.",
            ));
        }
        Ok(nurse)
    }

    pub async fn approve_nurse(&self, actor: &Principal, nurse_id: Uuid) -> Result<Account, AppError> {
        let doctor = self.approved_doctor(actor).await?;
        self.department_nurse(&doctor, nurse_id).await?;

        let nurse = self.accounts.set_verification(nurse_id, true, None).await?;
        tracing::info!(nurse_id = %nurse_id, doctor_id = %doctor.id, "✅ Enfermeiro aprovado");
        Ok(nurse)
    }

    pub async fn disapprove_nurse(&self, actor: &Principal, nurse_id: Uuid) -> Result<Account, AppError> {
        let doctor = self.approved_doctor(actor).await?;
        self.department_nurse(&doctor, nurse_id).await?;

        let nurse = self.accounts.set_verification(nurse_id, false, None).await?;
        tracing::info!(nurse_id = %nurse_id, doctor_id = %doctor.id, "Aprovação do enfermeiro revogada");
        Ok(nurse)
    }

    pub async fn reject_nurse(&self, actor: &Principal, nurse_id: Uuid) -> Result<(), AppError> {
        let doctor = self.approved_doctor(actor).await?;
        self.department_nurse(&doctor, nurse_id).await?;

        self.accounts.delete(nurse_id).await?;
        tracing::info!(nurse_id = %nurse_id, doctor_id = %doctor.id, "Enfermeiro rejeitado e removido");
        Ok(())
    }

    // =========================================================================
    //  5. ENFERMEIRO: MÉDICO(S) DO DEPARTAMENTO
    // =========================================================================

    pub async fn my_doctors(&self, actor: &Principal) -> Result<Vec<DoctorCard>, AppError> {
        let nurse = self.current_account(access::nurse(actor)?).await?;
        if !nurse.is_verified {
            return Err(AppError::forbidden("Enfermeiro ainda não aprovado por um médico."));
        }
        let (Some(category_id), Some(hospital_id)) = (nurse.selected_category, nurse.selected_hospital) else {
            return Ok(Vec::new());
        };

        let doctors = self
            .accounts
            .list_by_department(Role::Doctor, category_id, hospital_id)
            .await?;
        Ok(doctors.iter().map(DoctorCard::from).collect())
    }
}
