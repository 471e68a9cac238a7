// src/db/memory_repo.rs

//! Backend em memória. Usado nos testes e quando `DATABASE_URL` não está definida.
//! Todas as escritas passam pelo mesmo `RwLock`, então cada operação é atômica.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        appointment_repo::SLOT_TAKEN,
        repository::{AccountRepository, AppointmentRepository, HospitalRepository, TicketRepository},
    },
    models::{
        account::{Account, AccountStatus, DepartmentLink, NewAccount, Review, Role},
        appointment::{Appointment, AppointmentStatus, NewAppointment, SlotPolicy},
        hospital::{Category, CategoryListing, Hospital, HospitalChanges, HospitalStatus, NewHospital},
        ticket::{SupportTicket, TenantTicket, TicketStatus},
    },
};

#[derive(Default)]
struct MemoryState {
    hospitals: Vec<Hospital>,
    categories: Vec<Category>,
    accounts: Vec<Account>,
    // Mais recentes primeiro
    appointments: Vec<Appointment>,
    tickets: Vec<SupportTicket>,
    reviews: Vec<Review>,
}

impl MemoryState {
    fn hospital_mut(&mut self, id: Uuid) -> Result<&mut Hospital, AppError> {
        self.hospitals
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or(AppError::NotFound("Hospital"))
    }

    fn account_mut(&mut self, id: Uuid) -> Result<&mut Account, AppError> {
        self.accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AppError::NotFound("Conta"))
    }

    fn category_name_taken(&self, hospital_id: Uuid, name: &str, except: Option<Uuid>) -> bool {
        let wanted = name.to_lowercase();
        self.categories.iter().any(|c| {
            c.hospital_id == hospital_id && Some(c.id) != except && c.name.to_lowercase() == wanted
        })
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HospitalRepository for MemoryStore {
    async fn create(&self, input: NewHospital) -> Result<Hospital, AppError> {
        let mut state = self.state.write().await;

        for h in &state.hospitals {
            if h.email == input.email {
                return Err(AppError::conflict("Este e-mail já está em uso."));
            }
            if h.license_number == input.license_number {
                return Err(AppError::conflict("Este número de licença já está cadastrado."));
            }
            if h.hospital_name == input.hospital_name {
                return Err(AppError::conflict("Já existe um hospital com esse nome."));
            }
            if h.tenant_id == input.tenant_id {
                return Err(AppError::conflict("Identificador de tenant já utilizado."));
            }
        }

        let now = Utc::now();
        let hospital = Hospital {
            id: Uuid::new_v4(),
            tenant_id: input.tenant_id,
            hospital_name: input.hospital_name,
            email: input.email,
            license_number: input.license_number,
            address: input.address,
            phone: input.phone,
            image_url: input.image_url,
            password_history: vec![input.password_hash.clone()],
            password_hash: input.password_hash,
            status: HospitalStatus::Pending,
            is_hospital: false,
            created_at: now,
            updated_at: now,
        };
        state.hospitals.push(hospital.clone());
        Ok(hospital)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Hospital>, AppError> {
        let state = self.state.read().await;
        Ok(state.hospitals.iter().find(|h| h.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Hospital>, AppError> {
        let state = self.state.read().await;
        Ok(state.hospitals.iter().find(|h| h.email == email).cloned())
    }

    async fn find_by_tenant(&self, tenant_id: &str) -> Result<Option<Hospital>, AppError> {
        let state = self.state.read().await;
        Ok(state.hospitals.iter().find(|h| h.tenant_id == tenant_id).cloned())
    }

    async fn list(&self) -> Result<Vec<Hospital>, AppError> {
        Ok(self.state.read().await.hospitals.clone())
    }

    async fn set_approval(
        &self,
        id: Uuid,
        is_hospital: bool,
        status: HospitalStatus,
    ) -> Result<Hospital, AppError> {
        let mut state = self.state.write().await;
        let hospital = state.hospital_mut(id)?;
        hospital.is_hospital = is_hospital;
        hospital.status = status;
        hospital.updated_at = Utc::now();
        Ok(hospital.clone())
    }

    async fn update(&self, id: Uuid, changes: HospitalChanges) -> Result<Hospital, AppError> {
        let mut state = self.state.write().await;

        if let Some(name) = &changes.hospital_name {
            if state.hospitals.iter().any(|h| h.id != id && &h.hospital_name == name) {
                return Err(AppError::conflict("Já existe um hospital com esse nome."));
            }
        }

        let hospital = state.hospital_mut(id)?;
        if let Some(name) = changes.hospital_name {
            hospital.hospital_name = name;
        }
        if let Some(address) = changes.address {
            hospital.address = Some(address);
        }
        if let Some(phone) = changes.phone {
            hospital.phone = Some(phone);
        }
        if let Some(image_url) = changes.image_url {
            hospital.image_url = Some(image_url);
        }
        if let Some(status) = changes.status {
            hospital.status = status;
        }
        hospital.updated_at = Utc::now();
        Ok(hospital.clone())
    }

    async fn delete_if_unreferenced(&self, id: Uuid) -> Result<(), AppError> {
        let mut state = self.state.write().await;

        if !state.hospitals.iter().any(|h| h.id == id) {
            return Err(AppError::NotFound("Hospital"));
        }

        let members = state
            .accounts
            .iter()
            .filter(|a| a.selected_hospital == Some(id))
            .count();
        if members > 0 {
            return Err(AppError::conflict(format!(
                "Não é possível excluir o hospital: {members} conta(s) ainda vinculada(s)."
            )));
        }

        state.hospitals.retain(|h| h.id != id);
        state.categories.retain(|c| c.hospital_id != id);
        Ok(())
    }

    async fn list_categories(&self, hospital_id: Uuid) -> Result<Vec<Category>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .categories
            .iter()
            .filter(|c| c.hospital_id == hospital_id)
            .cloned()
            .collect())
    }

    async fn list_all_categories(&self) -> Result<Vec<CategoryListing>, AppError> {
        let state = self.state.read().await;
        let mut listing = Vec::new();
        for hospital in &state.hospitals {
            for category in state.categories.iter().filter(|c| c.hospital_id == hospital.id) {
                listing.push(CategoryListing {
                    id: category.id,
                    name: category.name.clone(),
                    description: category.description.clone(),
                    hospital_id: hospital.id,
                    hospital_name: hospital.hospital_name.clone(),
                });
            }
        }
        Ok(listing)
    }

    async fn find_category(&self, category_id: Uuid) -> Result<Option<Category>, AppError> {
        let state = self.state.read().await;
        Ok(state.categories.iter().find(|c| c.id == category_id).cloned())
    }

    async fn add_category(
        &self,
        hospital_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, AppError> {
        let mut state = self.state.write().await;

        if !state.hospitals.iter().any(|h| h.id == hospital_id) {
            return Err(AppError::NotFound("Hospital"));
        }
        if state.category_name_taken(hospital_id, name, None) {
            return Err(AppError::conflict("Já existe uma categoria com esse nome neste hospital."));
        }

        let category = Category {
            id: Uuid::new_v4(),
            hospital_id,
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: Utc::now(),
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        hospital_id: Uuid,
        category_id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Category, AppError> {
        let mut state = self.state.write().await;

        if let Some(name) = name {
            if state.category_name_taken(hospital_id, name, Some(category_id)) {
                return Err(AppError::conflict("Já existe uma categoria com esse nome neste hospital."));
            }
        }

        let category = state
            .categories
            .iter_mut()
            .find(|c| c.id == category_id && c.hospital_id == hospital_id)
            .ok_or(AppError::NotFound("Categoria"))?;
        if let Some(name) = name {
            category.name = name.to_string();
        }
        if let Some(description) = description {
            category.description = Some(description.to_string());
        }
        Ok(category.clone())
    }

    async fn delete_category(&self, hospital_id: Uuid, category_id: Uuid) -> Result<(), AppError> {
        let mut state = self.state.write().await;

        let before = state.categories.len();
        state
            .categories
            .retain(|c| !(c.id == category_id && c.hospital_id == hospital_id));
        if state.categories.len() == before {
            return Err(AppError::NotFound("Categoria"));
        }

        // Mesmo efeito do ON DELETE SET NULL
        for account in state.accounts.iter_mut() {
            if account.selected_category == Some(category_id) {
                account.selected_category = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn create(&self, input: NewAccount) -> Result<Account, AppError> {
        let mut state = self.state.write().await;

        if state.accounts.iter().any(|a| a.email == input.email) {
            return Err(AppError::conflict("Este e-mail já está em uso."));
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            email: input.email,
            name: input.name,
            first_name: input.first_name,
            last_name: input.last_name,
            profile_picture: None,
            specialization: input.specialization,
            password_history: vec![input.password_hash.clone()],
            password_hash: input.password_hash,
            role: input.role,
            is_verified: input.is_verified,
            status: AccountStatus::Active,
            selected_hospital: None,
            selected_hospital_tenant_id: None,
            selected_category: None,
            otp: input.otp,
            otp_expires_at: input.otp_expires_at,
            reset_token: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        state.accounts.push(account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        let state = self.state.read().await;
        Ok(state.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let state = self.state.read().await;
        Ok(state.accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<Account>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .accounts
            .iter()
            .find(|a| a.reset_token.as_deref() == Some(token))
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.state.read().await.accounts.clone())
    }

    async fn list_by_roles(&self, roles: &[Role]) -> Result<Vec<Account>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .accounts
            .iter()
            .filter(|a| roles.contains(&a.role))
            .cloned()
            .collect())
    }

    async fn list_by_tenant(&self, tenant_id: &str, roles: &[Role]) -> Result<Vec<Account>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .accounts
            .iter()
            .filter(|a| a.selected_hospital_tenant_id.as_deref() == Some(tenant_id))
            .filter(|a| roles.is_empty() || roles.contains(&a.role))
            .cloned()
            .collect())
    }

    async fn list_by_hospital(&self, hospital_id: Uuid) -> Result<Vec<Account>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .accounts
            .iter()
            .filter(|a| a.selected_hospital == Some(hospital_id))
            .cloned()
            .collect())
    }

    async fn list_by_department(
        &self,
        role: Role,
        category_id: Uuid,
        hospital_id: Uuid,
    ) -> Result<Vec<Account>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .accounts
            .iter()
            .filter(|a| {
                a.role == role
                    && a.selected_category == Some(category_id)
                    && a.selected_hospital == Some(hospital_id)
            })
            .cloned()
            .collect())
    }

    async fn list_active_doctors_by_category(&self, category_id: Uuid) -> Result<Vec<Account>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .accounts
            .iter()
            .filter(|a| {
                a.role == Role::Doctor
                    && a.status == AccountStatus::Active
                    && a.selected_category == Some(category_id)
            })
            .cloned()
            .collect())
    }

    async fn set_verification(
        &self,
        id: Uuid,
        is_verified: bool,
        role: Option<Role>,
    ) -> Result<Account, AppError> {
        let mut state = self.state.write().await;
        let account = state.account_mut(id)?;
        account.is_verified = is_verified;
        if let Some(role) = role {
            account.role = role;
        }
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn set_department(&self, id: Uuid, link: &DepartmentLink) -> Result<Account, AppError> {
        let mut state = self.state.write().await;
        let account = state.account_mut(id)?;
        account.selected_category = Some(link.category_id);
        account.selected_hospital = Some(link.hospital_id);
        account.selected_hospital_tenant_id = Some(link.tenant_id.clone());
        account.is_verified = false;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn set_otp(
        &self,
        id: Uuid,
        otp: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let account = state.account_mut(id)?;
        account.otp = otp.map(str::to_string);
        account.otp_expires_at = expires_at;
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn verify_email(&self, id: Uuid) -> Result<Account, AppError> {
        let mut state = self.state.write().await;
        let account = state.account_mut(id)?;
        account.is_verified = true;
        account.otp = None;
        account.otp_expires_at = None;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let account = state.account_mut(id)?;
        account.reset_token = token.map(str::to_string);
        account.reset_token_expires_at = expires_at;
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let account = state.account_mut(id)?;
        account.password_hash = password_hash.to_string();
        account.password_history.push(password_hash.to_string());
        account.reset_token = None;
        account.reset_token_expires_at = None;
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut state = self.state.write().await;

        let before = state.accounts.len();
        state.accounts.retain(|a| a.id != id);
        if state.accounts.len() == before {
            return Err(AppError::NotFound("Conta"));
        }

        // Coleções da conta vão junto (ON DELETE CASCADE)
        state.appointments.retain(|a| a.patient_id != id);
        state.tickets.retain(|t| t.account_id != id);
        state.reviews.retain(|r| r.doctor_id != id);
        Ok(())
    }

    async fn add_review(
        &self,
        doctor_id: Uuid,
        reviewer_id: Uuid,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Review, AppError> {
        let mut state = self.state.write().await;

        if !state.accounts.iter().any(|a| a.id == doctor_id) {
            return Err(AppError::NotFound("Médico"));
        }

        let review = Review {
            id: Uuid::new_v4(),
            doctor_id,
            reviewer_id,
            rating,
            comment: comment.map(str::to_string),
            created_at: Utc::now(),
        };
        state.reviews.insert(0, review.clone());
        Ok(review)
    }

    async fn list_reviews(&self, doctor_id: Uuid) -> Result<Vec<Review>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .reviews
            .iter()
            .filter(|r| r.doctor_id == doctor_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AppointmentRepository for MemoryStore {
    async fn book(&self, input: NewAppointment, policy: SlotPolicy) -> Result<Appointment, AppError> {
        // A mesma trava cobre a conferência e a inserção
        let mut state = self.state.write().await;

        let taken = state.appointments.iter().any(|a| {
            a.doctor_id == input.doctor_id
                && a.appointment_date == input.appointment_date
                && a.appointment_time == input.appointment_time
                && (policy.blocks(a.status) || a.status != AppointmentStatus::Canceled)
        });
        if taken {
            return Err(AppError::conflict(SLOT_TAKEN));
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: input.patient_id,
            doctor_id: input.doctor_id,
            category_id: input.category_id,
            hospital_id: input.hospital_id,
            appointment_date: input.appointment_date,
            appointment_time: input.appointment_time,
            description: input.description,
            status: AppointmentStatus::Pending,
            created_at: Utc::now(),
        };
        state.appointments.insert(0, appointment.clone());
        Ok(appointment)
    }

    async fn booked_times(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        policy: SlotPolicy,
    ) -> Result<Vec<String>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .appointments
            .iter()
            .filter(|a| a.doctor_id == doctor_id && a.appointment_date == date && policy.blocks(a.status))
            .map(|a| a.appointment_time.clone())
            .collect())
    }

    async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .appointments
            .iter()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect())
    }

    async fn list_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, AppError> {
        let state = self.state.read().await;
        let mut appointments: Vec<Appointment> = state
            .appointments
            .iter()
            .filter(|a| a.doctor_id == doctor_id)
            .cloned()
            .collect();
        appointments.sort_by(|a, b| {
            (a.appointment_date, &a.appointment_time).cmp(&(b.appointment_date, &b.appointment_time))
        });
        Ok(appointments)
    }

    async fn find(&self, patient_id: Uuid, appointment_id: Uuid) -> Result<Option<Appointment>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .appointments
            .iter()
            .find(|a| a.id == appointment_id && a.patient_id == patient_id)
            .cloned())
    }

    async fn update_status(
        &self,
        patient_id: Uuid,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppError> {
        let mut state = self.state.write().await;
        let appointment = state
            .appointments
            .iter_mut()
            .find(|a| a.id == appointment_id && a.patient_id == patient_id)
            .ok_or(AppError::NotFound("Agendamento"))?;
        appointment.status = status;
        Ok(appointment.clone())
    }

    async fn delete(&self, patient_id: Uuid, appointment_id: Uuid) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let before = state.appointments.len();
        state
            .appointments
            .retain(|a| !(a.id == appointment_id && a.patient_id == patient_id));
        if state.appointments.len() == before {
            return Err(AppError::NotFound("Agendamento"));
        }
        Ok(())
    }
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn create(&self, account_id: Uuid, subject: &str, message: &str) -> Result<SupportTicket, AppError> {
        let mut state = self.state.write().await;

        if !state.accounts.iter().any(|a| a.id == account_id) {
            return Err(AppError::NotFound("Conta"));
        }

        let ticket = SupportTicket {
            id: Uuid::new_v4(),
            account_id,
            subject: subject.to_string(),
            message: message.to_string(),
            status: TicketStatus::Open,
            reply: None,
            reply_at: None,
            created_at: Utc::now(),
        };
        state.tickets.insert(0, ticket.clone());
        Ok(ticket)
    }

    async fn list_for_account(&self, account_id: Uuid) -> Result<Vec<SupportTicket>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .tickets
            .iter()
            .filter(|t| t.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn list_for_tenant(&self, tenant_id: &str) -> Result<Vec<TenantTicket>, AppError> {
        let state = self.state.read().await;
        let mut tickets = Vec::new();
        for ticket in &state.tickets {
            let owner = state.accounts.iter().find(|a| {
                a.id == ticket.account_id && a.selected_hospital_tenant_id.as_deref() == Some(tenant_id)
            });
            if let Some(owner) = owner {
                tickets.push(TenantTicket {
                    ticket: ticket.clone(),
                    account_name: owner.display_name(),
                    account_email: owner.email.clone(),
                });
            }
        }
        Ok(tickets)
    }

    async fn reply(
        &self,
        account_id: Uuid,
        ticket_id: Uuid,
        reply: &str,
        replied_at: DateTime<Utc>,
    ) -> Result<SupportTicket, AppError> {
        let mut state = self.state.write().await;
        let ticket = state
            .tickets
            .iter_mut()
            .find(|t| t.id == ticket_id && t.account_id == account_id)
            .ok_or(AppError::NotFound("Ticket"))?;
        ticket.reply = Some(reply.to_string());
        ticket.status = TicketStatus::Closed;
        ticket.reply_at = Some(replied_at);
        Ok(ticket.clone())
    }
}
