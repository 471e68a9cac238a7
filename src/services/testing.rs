// src/services/testing.rs

//! Montagem dos serviços sobre o `MemoryStore` para os testes.

use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use crate::{
    db::{AccountRepository, HospitalRepository, MemoryStore},
    models::{
        account::{Account, NewAccount, Role},
        appointment::SlotPolicy,
        auth::Principal,
        hospital::{Category, Hospital},
    },
    services::{
        appointment_service::AppointmentService,
        approval_service::ApprovalService,
        auth::{AuthService, AuthSettings},
        dashboard_service::DashboardService,
        hospital_service::{HospitalRegistration, HospitalService},
        mailer::LogMailer,
        ticket_service::TicketService,
    },
};

pub const TEST_BCRYPT_COST: u32 = 4;
pub const STRONG_PASSWORD: &str = "Senha@123";

pub struct Harness {
    pub store: MemoryStore,
    pub auth: AuthService,
    pub hospitals: HospitalService,
    pub approvals: ApprovalService,
    pub appointments: AppointmentService,
    pub tickets: TicketService,
    pub dashboards: DashboardService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_policy(SlotPolicy::default())
    }

    pub fn with_policy(policy: SlotPolicy) -> Self {
        let store = MemoryStore::new();
        let shared = Arc::new(store.clone());

        let settings = AuthSettings {
            jwt_secret: "segredo-de-teste".into(),
            token_ttl: Duration::hours(1),
            otp_ttl: Duration::minutes(10),
            reset_ttl: Duration::minutes(30),
            bcrypt_cost: TEST_BCRYPT_COST,
        };

        Self {
            auth: AuthService::new(shared.clone(), shared.clone(), Arc::new(LogMailer), settings),
            hospitals: HospitalService::new(shared.clone(), shared.clone(), TEST_BCRYPT_COST),
            approvals: ApprovalService::new(shared.clone(), shared.clone()),
            appointments: AppointmentService::new(shared.clone(), shared.clone(), shared.clone(), policy),
            tickets: TicketService::new(shared.clone(), shared.clone()),
            dashboards: DashboardService::new(shared.clone(), shared.clone(), shared),
            store,
        }
    }

    pub fn superadmin(&self) -> Principal {
        Principal::SuperAdmin { id: Uuid::new_v4(), email: "root@hospital.test".into() }
    }

    /// Hospital cadastrado pela rota pública, ainda pendente.
    pub async fn pending_hospital(&self, name: &str) -> Hospital {
        let slug = name.to_lowercase().replace(' ', "-");
        let created = self
            .hospitals
            .create_hospital(HospitalRegistration {
                hospital_name: name.into(),
                email: format!("{slug}@hospital.test"),
                password: STRONG_PASSWORD.into(),
                license_number: format!("LIC-{slug}"),
                address: None,
                phone: None,
                image_url: None,
            })
            .await
            .unwrap();
        HospitalRepository::find_by_id(&self.store, created.id)
            .await
            .unwrap()
            .unwrap()
    }

    /// Hospital já aprovado pelo superadmin, com o principal do seu admin.
    pub async fn approved_hospital(&self, name: &str) -> (Hospital, Principal) {
        let pending = self.pending_hospital(name).await;
        let hospital = self
            .hospitals
            .approve_hospital(&self.superadmin(), pending.id)
            .await
            .unwrap();
        let admin = Principal::from_hospital(&hospital);
        (hospital, admin)
    }

    /// Conta verificada criada direto no repositório (pula o OTP).
    pub async fn account(&self, email: &str, role: Role) -> (Account, Principal) {
        let account = AccountRepository::create(
            &self.store,
            NewAccount {
                email: email.into(),
                name: email.split('@').next().unwrap_or(email).into(),
                first_name: None,
                last_name: None,
                specialization: None,
                password_hash: "$2b$04$naoimportaparaestesteste".into(),
                role,
                is_verified: true,
                otp: None,
                otp_expires_at: None,
            },
        )
        .await
        .unwrap();
        let principal = Principal::from_account(&account);
        (account, principal)
    }

    pub async fn category(&self, admin: &Principal, name: &str) -> Category {
        self.approvals.create_category(admin, name, None).await.unwrap()
    }

    /// Médico que escolheu a categoria e foi aprovado pelo admin do hospital.
    pub async fn approved_doctor(&self, admin: &Principal, category: &Category, email: &str) -> (Account, Principal) {
        let (_, principal) = self.account(email, Role::Doctor).await;
        self.approvals.choose_category(&principal, category.id).await.unwrap();
        let doctor = self.approvals.approve_doctor(admin, principal.id()).await.unwrap();
        let principal = Principal::from_account(&doctor);
        (doctor, principal)
    }

    /// Enfermeiro que escolheu a categoria e foi aprovado pelo médico.
    pub async fn approved_nurse(&self, doctor: &Principal, category: &Category, email: &str) -> (Account, Principal) {
        let (_, principal) = self.account(email, Role::Nurse).await;
        self.approvals.choose_category(&principal, category.id).await.unwrap();
        let nurse = self.approvals.approve_nurse(doctor, principal.id()).await.unwrap();
        let principal = Principal::from_account(&nurse);
        (nurse, principal)
    }
}
