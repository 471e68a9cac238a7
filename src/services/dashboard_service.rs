// src/services/dashboard_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{AccountRepository, AppointmentRepository, HospitalRepository},
    models::{
        account::{Account, AccountSummary, DoctorCard, Role},
        appointment::RefSummary,
        auth::Principal,
        dashboard::{AppointmentCounts, DoctorDashboard, NurseDashboard},
    },
    services::access,
};

#[derive(Clone)]
pub struct DashboardService {
    accounts: Arc<dyn AccountRepository>,
    hospitals: Arc<dyn HospitalRepository>,
    appointments: Arc<dyn AppointmentRepository>,
}

impl DashboardService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        hospitals: Arc<dyn HospitalRepository>,
        appointments: Arc<dyn AppointmentRepository>,
    ) -> Self {
        Self { accounts, hospitals, appointments }
    }

    async fn department_refs(&self, account: &Account) -> Result<(Option<RefSummary>, Option<RefSummary>), AppError> {
        let hospital = match account.selected_hospital {
            Some(id) => self
                .hospitals
                .find_by_id(id)
                .await?
                .map(|h| RefSummary { id: h.id, name: h.hospital_name }),
            None => None,
        };
        let category = match account.selected_category {
            Some(id) => self
                .hospitals
                .find_category(id)
                .await?
                .map(|c| RefSummary { id: c.id, name: c.name }),
            None => None,
        };
        Ok((hospital, category))
    }

    pub async fn doctor(&self, actor: &Principal) -> Result<DoctorDashboard, AppError> {
        let doctor_id = access::doctor(actor)?;
        let doctor = self
            .accounts
            .find_by_id(doctor_id)
            .await?
            .ok_or(AppError::NotFound("Médico"))?;

        let (hospital, category) = self.department_refs(&doctor).await?;
        let appointments = self.appointments.list_for_doctor(doctor_id).await?;

        let pending_nurses = match (doctor.selected_category, doctor.selected_hospital) {
            (Some(category_id), Some(hospital_id)) => self
                .accounts
                .list_by_department(Role::Nurse, category_id, hospital_id)
                .await?
                .iter()
                .filter(|n| !n.is_verified)
                .count(),
            _ => 0,
        };

        let reviews = self.accounts.list_reviews(doctor_id).await?;
        let average_rating = (!reviews.is_empty())
            .then(|| reviews.iter().map(|r| f64::from(r.rating)).sum::<f64>() / reviews.len() as f64);

        Ok(DoctorDashboard {
            profile: AccountSummary::from(&doctor),
            specialization: doctor.specialization.clone(),
            hospital,
            category,
            appointments: AppointmentCounts::tally(appointments.iter().map(|a| a.status)),
            pending_nurses,
            reviews,
            average_rating,
        })
    }

    pub async fn nurse(&self, actor: &Principal) -> Result<NurseDashboard, AppError> {
        let nurse_id = access::nurse(actor)?;
        let nurse = self
            .accounts
            .find_by_id(nurse_id)
            .await?
            .ok_or(AppError::NotFound("Enfermeiro"))?;

        let (hospital, category) = self.department_refs(&nurse).await?;

        let doctors = match (nurse.selected_category, nurse.selected_hospital) {
            (Some(category_id), Some(hospital_id)) => {
                self.accounts
                    .list_by_department(Role::Doctor, category_id, hospital_id)
                    .await?
            }
            _ => Vec::new(),
        };

        // Enquanto não for aprovado, o enfermeiro não enxerga a agenda dos médicos
        let mut statuses = Vec::new();
        if nurse.is_verified {
            for doctor in doctors.iter().filter(|d| d.is_verified) {
                statuses.extend(
                    self.appointments
                        .list_for_doctor(doctor.id)
                        .await?
                        .into_iter()
                        .map(|a| a.status),
                );
            }
        }

        Ok(NurseDashboard {
            profile: AccountSummary::from(&nurse),
            hospital,
            category,
            doctors: doctors.iter().map(DoctorCard::from).collect(),
            appointments: AppointmentCounts::tally(statuses),
        })
    }
}
