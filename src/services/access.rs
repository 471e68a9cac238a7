// src/services/access.rs

//! Verificações de papel. Cada função casa o `Principal` de forma exaustiva e
//! devolve só o que a operação precisa (ids, tenant).

use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{account::Role, auth::Principal},
};

/// Escopo de um administrador de hospital já aprovado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminScope {
    pub hospital_id: Uuid,
    pub tenant_id: String,
}

pub fn superadmin(principal: &Principal) -> Result<(), AppError> {
    match principal {
        Principal::SuperAdmin { .. } => Ok(()),
        Principal::HospitalAdmin { .. }
        | Principal::Doctor { .. }
        | Principal::Nurse { .. }
        | Principal::Staff { .. }
        | Principal::Patient { .. } => Err(AppError::forbidden("Acesso restrito ao superadmin.")),
    }
}

pub fn hospital_admin(principal: &Principal) -> Result<AdminScope, AppError> {
    match principal {
        Principal::HospitalAdmin { hospital_id, tenant_id, approved: true, .. } => Ok(AdminScope {
            hospital_id: *hospital_id,
            tenant_id: tenant_id.clone(),
        }),
        Principal::HospitalAdmin { approved: false, .. } => Err(AppError::forbidden(
            "Hospital ainda não aprovado pelo superadmin.",
        )),
        Principal::SuperAdmin { .. }
        | Principal::Doctor { .. }
        | Principal::Nurse { .. }
        | Principal::Staff { .. }
        | Principal::Patient { .. } => Err(AppError::forbidden("Acesso restrito ao administrador do hospital.")),
    }
}

pub fn doctor(principal: &Principal) -> Result<Uuid, AppError> {
    match principal {
        Principal::Doctor { id, .. } => Ok(*id),
        Principal::SuperAdmin { .. }
        | Principal::HospitalAdmin { .. }
        | Principal::Nurse { .. }
        | Principal::Staff { .. }
        | Principal::Patient { .. } => Err(AppError::forbidden("Acesso restrito a médicos.")),
    }
}

pub fn nurse(principal: &Principal) -> Result<Uuid, AppError> {
    match principal {
        Principal::Nurse { id, .. } => Ok(*id),
        Principal::SuperAdmin { .. }
        | Principal::HospitalAdmin { .. }
        | Principal::Doctor { .. }
        | Principal::Staff { .. }
        | Principal::Patient { .. } => Err(AppError::forbidden("Acesso restrito a enfermeiros.")),
    }
}

/// Médico, médico aguardando promoção ou enfermeiro: todos escolhem departamento.
pub fn clinician(principal: &Principal) -> Result<Uuid, AppError> {
    match principal {
        Principal::Doctor { id, .. }
        | Principal::Nurse { id, .. }
        | Principal::Staff { id, role: Role::DoctorPending, .. } => Ok(*id),
        Principal::SuperAdmin { .. }
        | Principal::HospitalAdmin { .. }
        | Principal::Staff { .. }
        | Principal::Patient { .. } => Err(AppError::forbidden("Acesso restrito a médicos e enfermeiros.")),
    }
}

/// Qualquer principal que seja uma conta (não um hospital).
pub fn account_holder(principal: &Principal) -> Result<Uuid, AppError> {
    match principal {
        Principal::SuperAdmin { id, .. }
        | Principal::Doctor { id, .. }
        | Principal::Nurse { id, .. }
        | Principal::Staff { id, .. }
        | Principal::Patient { id, .. } => Ok(*id),
        Principal::HospitalAdmin { .. } => Err(AppError::forbidden("Operação disponível apenas para contas de usuário.")),
    }
}

/// A própria conta ou o superadmin podem agir sobre os dados de `account_id`.
pub fn self_or_superadmin(principal: &Principal, account_id: Uuid) -> Result<(), AppError> {
    match principal {
        Principal::SuperAdmin { .. } => Ok(()),
        Principal::Doctor { id, .. }
        | Principal::Nurse { id, .. }
        | Principal::Staff { id, .. }
        | Principal::Patient { id, .. }
            if *id == account_id =>
        {
            Ok(())
        }
        Principal::HospitalAdmin { .. }
        | Principal::Doctor { .. }
        | Principal::Nurse { .. }
        | Principal::Staff { .. }
        | Principal::Patient { .. } => Err(AppError::forbidden("Você só pode acessar os seus próprios dados.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin(approved: bool) -> Principal {
        Principal::HospitalAdmin {
            hospital_id: Uuid::new_v4(),
            email: "h@x.com".into(),
            name: "H".into(),
            tenant_id: "tenant-1".into(),
            approved,
        }
    }

    #[test]
    fn unapproved_hospital_cannot_act_as_admin() {
        assert!(hospital_admin(&admin(true)).is_ok());
        let err = hospital_admin(&admin(false)).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn patient_can_only_touch_own_data() {
        let me = Uuid::new_v4();
        let patient = Principal::Patient { id: me, email: "p@x.com".into() };
        assert!(self_or_superadmin(&patient, me).is_ok());
        assert!(self_or_superadmin(&patient, Uuid::new_v4()).is_err());

        let root = Principal::SuperAdmin { id: Uuid::new_v4(), email: "r@x.com".into() };
        assert!(self_or_superadmin(&root, me).is_ok());
        assert!(self_or_superadmin(&admin(true), me).is_err());
    }

    #[test]
    fn role_guards_reject_other_roles() {
        let nurse_id = Uuid::new_v4();
        let nurse_principal = Principal::Nurse { id: nurse_id, email: "n@x.com".into(), tenant_id: None };
        assert_eq!(nurse(&nurse_principal).unwrap(), nurse_id);
        assert_eq!(clinician(&nurse_principal).unwrap(), nurse_id);
        assert!(doctor(&nurse_principal).is_err());
        assert!(superadmin(&nurse_principal).is_err());
        assert!(account_holder(&admin(true)).is_err());
    }

    #[test]
    fn only_pending_doctors_among_staff_choose_a_department() {
        let staff = |role| Principal::Staff { id: Uuid::new_v4(), email: "s@x.com".into(), role, tenant_id: None };
        assert!(clinician(&staff(Role::DoctorPending)).is_ok());
        assert!(clinician(&staff(Role::Receptionist)).is_err());
        assert!(clinician(&staff(Role::Pharmacist)).is_err());
        assert!(doctor(&staff(Role::DoctorPending)).is_err());
    }
}
