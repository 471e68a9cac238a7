// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{
    account::{AccountSummary, DoctorCard, Review},
    appointment::{AppointmentStatus, RefSummary},
};

// 1. Contagem de agendamentos por status (os cards do topo)
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentCounts {
    pub total: usize,
    pub pending: usize,
    pub doctor_accepted: usize,
    pub nurse_completed: usize,
    pub doctor_completed: usize,
    pub rejected: usize,
    pub canceled: usize,
}

impl AppointmentCounts {
    pub fn tally(statuses: impl IntoIterator<Item = AppointmentStatus>) -> Self {
        let mut counts = Self::default();
        for status in statuses {
            counts.total += 1;
            match status {
                AppointmentStatus::Pending => counts.pending += 1,
                AppointmentStatus::DoctorAccepted => counts.doctor_accepted += 1,
                AppointmentStatus::NurseCompleted => counts.nurse_completed += 1,
                AppointmentStatus::DoctorCompleted => counts.doctor_completed += 1,
                AppointmentStatus::Rejected => counts.rejected += 1,
                AppointmentStatus::Canceled => counts.canceled += 1,
            }
        }
        counts
    }
}

// 2. Painel do médico
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorDashboard {
    pub profile: AccountSummary,
    pub specialization: Option<String>,
    pub hospital: Option<RefSummary>,
    pub category: Option<RefSummary>,
    pub appointments: AppointmentCounts,
    pub pending_nurses: usize,
    pub reviews: Vec<Review>,
    // Média das notas; None quando ainda não há avaliações
    pub average_rating: Option<f64>,
}

// 3. Painel do enfermeiro
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NurseDashboard {
    pub profile: AccountSummary,
    pub hospital: Option<RefSummary>,
    pub category: Option<RefSummary>,
    pub doctors: Vec<DoctorCard>,
    pub appointments: AppointmentCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_counts_every_status_once() {
        use AppointmentStatus::*;
        let counts = AppointmentCounts::tally([Pending, Pending, Canceled, DoctorAccepted]);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.canceled, 1);
        assert_eq!(counts.doctor_accepted, 1);
        assert_eq!(counts.doctor_completed, 0);
    }
}
