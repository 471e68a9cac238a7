// src/services/appointment_service.rs

use std::{collections::HashMap, sync::Arc};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AccountRepository, AppointmentRepository, HospitalRepository},
    models::{
        account::{Account, DoctorCard, Review, Role},
        appointment::{
            is_valid_slot, Appointment, AppointmentStatus, AppointmentView, AvailableSlots, NewAppointment,
            RefSummary, SlotPolicy, SLOT_TIMES,
        },
        auth::Principal,
        hospital::CategoryListing,
    },
    services::access,
};

// Pedido de agendamento já desserializado pelo handler
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub category_id: Uuid,
    pub hospital_id: Option<Uuid>,
    pub date: String,
    pub time: String,
    pub description: Option<String>,
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::invalid(format!("Data inválida: '{raw}' (use AAAA-MM-DD).")))
}

// Cache de nomes para montar as views sem repetir consultas
#[derive(Default)]
struct NameCache {
    accounts: HashMap<Uuid, Option<RefSummary>>,
    categories: HashMap<Uuid, Option<RefSummary>>,
    hospitals: HashMap<Uuid, Option<RefSummary>>,
}

#[derive(Clone)]
pub struct AppointmentService {
    appointments: Arc<dyn AppointmentRepository>,
    accounts: Arc<dyn AccountRepository>,
    hospitals: Arc<dyn HospitalRepository>,
    slot_policy: SlotPolicy,
}

impl AppointmentService {
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        accounts: Arc<dyn AccountRepository>,
        hospitals: Arc<dyn HospitalRepository>,
        slot_policy: SlotPolicy,
    ) -> Self {
        Self { appointments, accounts, hospitals, slot_policy }
    }

    // =========================================================================
    //  1. CATÁLOGO (categorias, médicos, horários)
    // =========================================================================

    pub async fn list_categories(&self) -> Result<Vec<CategoryListing>, AppError> {
        self.hospitals.list_all_categories().await
    }

    pub async fn list_doctors_by_category(&self, category_id: Uuid) -> Result<Vec<DoctorCard>, AppError> {
        let doctors = self.accounts.list_active_doctors_by_category(category_id).await?;
        Ok(doctors.iter().map(DoctorCard::from).collect())
    }

    async fn doctor_account(&self, doctor_id: Uuid) -> Result<Account, AppError> {
        self.accounts
            .find_by_id(doctor_id)
            .await?
            .filter(|a| a.role == Role::Doctor)
            .ok_or(AppError::NotFound("Médico"))
    }

    // Médico agindo sobre a própria agenda: precisa estar aprovado agora, não só no login
    async fn acting_doctor(&self, actor: &Principal) -> Result<Uuid, AppError> {
        let doctor = self.doctor_account(access::doctor(actor)?).await?;
        if !doctor.is_verified {
            return Err(AppError::forbidden("Médico ainda não aprovado pelo hospital."));
        }
        Ok(doctor.id)
    }

    /// Universo de 16 horários menos os ocupados, em ordem crescente.
    pub async fn available_slots(&self, doctor_id: Uuid, date: &str) -> Result<AvailableSlots, AppError> {
        let date = parse_date(date)?;
        self.doctor_account(doctor_id).await?;

        let booked = self
            .appointments
            .booked_times(doctor_id, date, self.slot_policy)
            .await?;
        let available_slots = SLOT_TIMES
            .iter()
            .filter(|slot| !booked.iter().any(|b| b == *slot))
            .map(|slot| slot.to_string())
            .collect();

        Ok(AvailableSlots { doctor_id, date, available_slots })
    }

    // =========================================================================
    //  2. PACIENTE: CRIAR, LISTAR, CANCELAR
    // =========================================================================

    pub async fn create(&self, actor: &Principal, input: BookingRequest) -> Result<Appointment, AppError> {
        access::self_or_superadmin(actor, input.patient_id)?;

        let date = parse_date(&input.date)?;
        let time = input.time.trim().to_string();
        if !is_valid_slot(&time) {
            return Err(AppError::invalid(format!(
                "Horário inválido: '{time}'. Use um horário entre 09:00 e 16:30, de meia em meia hora."
            )));
        }

        self.accounts
            .find_by_id(input.patient_id)
            .await?
            .ok_or(AppError::NotFound("Paciente"))?;
        self.doctor_account(input.doctor_id).await?;
        let category = self
            .hospitals
            .find_category(input.category_id)
            .await?
            .ok_or(AppError::NotFound("Categoria"))?;

        let appointment = self
            .appointments
            .book(
                NewAppointment {
                    patient_id: input.patient_id,
                    doctor_id: input.doctor_id,
                    category_id: category.id,
                    hospital_id: input.hospital_id.or(Some(category.hospital_id)),
                    appointment_date: date,
                    appointment_time: time,
                    description: input.description,
                },
                self.slot_policy,
            )
            .await
            .inspect_err(|e| {
                if matches!(e, AppError::Conflict(_)) {
                    tracing::warn!(doctor_id = %input.doctor_id, %date, "Horário já ocupado");
                }
            })?;

        tracing::info!(
            appointment_id = %appointment.id,
            doctor_id = %appointment.doctor_id,
            date = %appointment.appointment_date,
            time = %appointment.appointment_time,
            "📅 Agendamento criado"
        );
        Ok(appointment)
    }

    /// Agendamentos do paciente, mais recentes primeiro, com as referências resolvidas.
    pub async fn list_for_patient(&self, actor: &Principal, patient_id: Uuid) -> Result<Vec<AppointmentView>, AppError> {
        access::self_or_superadmin(actor, patient_id)?;
        let appointments = self.appointments.list_for_patient(patient_id).await?;
        self.to_views(appointments).await
    }

    pub async fn cancel(&self, actor: &Principal, patient_id: Uuid, appointment_id: Uuid) -> Result<(), AppError> {
        access::self_or_superadmin(actor, patient_id)?;
        self.appointments.delete(patient_id, appointment_id).await?;
        tracing::info!(appointment_id = %appointment_id, patient_id = %patient_id, "Agendamento cancelado");
        Ok(())
    }

    // =========================================================================
    //  3. MÉDICO: AGENDA E STATUS
    // =========================================================================

    pub async fn doctor_appointments(&self, actor: &Principal) -> Result<Vec<AppointmentView>, AppError> {
        let doctor_id = self.acting_doctor(actor).await?;
        let appointments = self.appointments.list_for_doctor(doctor_id).await?;
        self.to_views(appointments).await
    }

    pub async fn set_status(
        &self,
        actor: &Principal,
        patient_id: Uuid,
        appointment_id: Uuid,
        next: AppointmentStatus,
    ) -> Result<Appointment, AppError> {
        let doctor_id = self.acting_doctor(actor).await?;

        let appointment = self
            .appointments
            .find(patient_id, appointment_id)
            .await?
            .filter(|a| a.doctor_id == doctor_id)
            .ok_or(AppError::NotFound("Agendamento"))?;

        if !appointment.status.doctor_can_move_to(next) {
            return Err(AppError::invalid(format!(
                "Transição de status não permitida: {:?} → {:?}.",
                appointment.status, next
            )));
        }

        let updated = self
            .appointments
            .update_status(patient_id, appointment_id, next)
            .await?;
        tracing::info!(appointment_id = %appointment_id, status = ?next, "Status do agendamento alterado pelo médico");
        Ok(updated)
    }

    // =========================================================================
    //  4. ENFERMEIRO: ATENDIMENTOS DOS MÉDICOS DO DEPARTAMENTO
    // =========================================================================

    // Médicos aprovados no mesmo (categoria, hospital) do enfermeiro aprovado
    async fn nurse_doctors(&self, nurse_id: Uuid) -> Result<Vec<Account>, AppError> {
        let nurse = self
            .accounts
            .find_by_id(nurse_id)
            .await?
            .ok_or(AppError::NotFound("Enfermeiro"))?;
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
        Ok(doctors.into_iter().filter(|d| d.is_verified).collect())
    }

    pub async fn nurse_appointments(&self, actor: &Principal) -> Result<Vec<AppointmentView>, AppError> {
        let nurse_id = access::nurse(actor)?;

        let mut appointments = Vec::new();
        for doctor in self.nurse_doctors(nurse_id).await? {
            appointments.extend(self.appointments.list_for_doctor(doctor.id).await?);
        }
        self.to_views(appointments).await
    }

    pub async fn complete_as_nurse(
        &self,
        actor: &Principal,
        patient_id: Uuid,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppError> {
        let nurse_id = access::nurse(actor)?;

        let appointment = self
            .appointments
            .find(patient_id, appointment_id)
            .await?
            .ok_or(AppError::NotFound("Agendamento"))?;

        let doctors = self.nurse_doctors(nurse_id).await?;
        if !doctors.iter().any(|d| d.id == appointment.doctor_id) {
            return Err(AppError::forbidden(
                "Este agendamento não pertence a um médico do seu departamento.",
            ));
        }
        if !appointment.status.nurse_can_complete() {
            return Err(AppError::invalid("Só é possível concluir atendimentos aceitos pelo médico."));
        }

        let updated = self
            .appointments
            .update_status(patient_id, appointment_id, AppointmentStatus::NurseCompleted)
            .await?;
        tracing::info!(appointment_id = %appointment_id, nurse_id = %nurse_id, "Atendimento concluído pelo enfermeiro");
        Ok(updated)
    }

    // =========================================================================
    //  5. AVALIAÇÕES
    // =========================================================================

    pub async fn add_review(
        &self,
        actor: &Principal,
        doctor_id: Uuid,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Review, AppError> {
        let reviewer_id = access::account_holder(actor)?;
        if !(1..=5).contains(&rating) {
            return Err(AppError::invalid("A nota deve estar entre 1 e 5."));
        }
        if reviewer_id == doctor_id {
            return Err(AppError::invalid("Não é possível avaliar a si mesmo."));
        }
        self.doctor_account(doctor_id).await?;

        let review = self
            .accounts
            .add_review(doctor_id, reviewer_id, rating, comment.map(str::trim).filter(|c| !c.is_empty()))
            .await?;
        tracing::info!(doctor_id = %doctor_id, rating, "Nova avaliação registrada");
        Ok(review)
    }

    // =========================================================================
    //  Montagem das views
    // =========================================================================

    async fn to_views(&self, appointments: Vec<Appointment>) -> Result<Vec<AppointmentView>, AppError> {
        let mut cache = NameCache::default();
        let mut views = Vec::with_capacity(appointments.len());

        for a in appointments {
            let patient = self.account_ref(&mut cache, a.patient_id).await?;
            let doctor = self.account_ref(&mut cache, a.doctor_id).await?;
            let category = self.category_ref(&mut cache, a.category_id).await?;
            let hospital = match a.hospital_id {
                Some(id) => self.hospital_ref(&mut cache, id).await?,
                None => None,
            };

            views.push(AppointmentView {
                id: a.id,
                date: a.appointment_date,
                time: a.appointment_time,
                description: a.description,
                status: a.status,
                patient,
                doctor,
                category,
                hospital,
                created_at: a.created_at,
            });
        }
        Ok(views)
    }

    async fn account_ref(&self, cache: &mut NameCache, id: Uuid) -> Result<Option<RefSummary>, AppError> {
        if let Some(hit) = cache.accounts.get(&id) {
            return Ok(hit.clone());
        }
        let summary = self
            .accounts
            .find_by_id(id)
            .await?
            .map(|a| RefSummary { id: a.id, name: a.display_name() });
        cache.accounts.insert(id, summary.clone());
        Ok(summary)
    }

    async fn category_ref(&self, cache: &mut NameCache, id: Uuid) -> Result<Option<RefSummary>, AppError> {
        if let Some(hit) = cache.categories.get(&id) {
            return Ok(hit.clone());
        }
        let summary = self
            .hospitals
            .find_category(id)
            .await?
            .map(|c| RefSummary { id: c.id, name: c.name });
        cache.categories.insert(id, summary.clone());
        Ok(summary)
    }

    async fn hospital_ref(&self, cache: &mut NameCache, id: Uuid) -> Result<Option<RefSummary>, AppError> {
        if let Some(hit) = cache.hospitals.get(&id) {
            return Ok(hit.clone());
        }
        let summary = self
            .hospitals
            .find_by_id(id)
            .await?
            .map(|h| RefSummary { id: h.id, name: h.hospital_name });
        cache.hospitals.insert(id, summary.clone());
        Ok(summary)
    }
}
