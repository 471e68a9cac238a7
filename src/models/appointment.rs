// src/models/appointment.rs

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Os 16 horários de meia hora entre 09:00 e 16:30, em ordem crescente.
pub const SLOT_TIMES: [&str; 16] = [
    "09:00", "09:30", "10:00", "10:30", "11:00", "11:30", "12:00", "12:30",
    "13:00", "13:30", "14:00", "14:30", "15:00", "15:30", "16:00", "16:30",
];

pub fn is_valid_slot(time: &str) -> bool {
    SLOT_TIMES.contains(&time)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "appointment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    DoctorAccepted,  // Vira "DOCTOR_ACCEPTED"
    NurseCompleted,  // Vira "NURSE_COMPLETED"
    DoctorCompleted, // Vira "DOCTOR_COMPLETED"
    Rejected,
    Canceled,
}

impl AppointmentStatus {
    /// Transições permitidas ao médico responsável.
    pub fn doctor_can_move_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, DoctorAccepted)
                | (Pending, Rejected)
                | (DoctorAccepted, Canceled)
                | (NurseCompleted, DoctorCompleted)
        )
    }

    /// O enfermeiro só conclui atendimentos já aceitos pelo médico.
    pub fn nurse_can_complete(self) -> bool {
        self == AppointmentStatus::DoctorAccepted
    }
}

/// Quais agendamentos ocupam um horário no cálculo de disponibilidade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotPolicy {
    /// Todo agendamento gravado ocupa o horário, inclusive cancelados.
    #[default]
    AllAppointments,
    /// Agendamentos CANCELED liberam o horário.
    ActiveOnly,
}

impl SlotPolicy {
    pub fn blocks(self, status: AppointmentStatus) -> bool {
        match self {
            SlotPolicy::AllAppointments => true,
            SlotPolicy::ActiveOnly => status != AppointmentStatus::Canceled,
        }
    }
}

impl FromStr for SlotPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(SlotPolicy::AllAppointments),
            "active" => Ok(SlotPolicy::ActiveOnly),
            other => Err(format!("SLOT_POLICY desconhecida: '{other}' (use 'all' ou 'active')")),
        }
    }
}

// ---
// Appointment (pertence à conta do paciente)
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub category_id: Uuid,
    pub hospital_id: Option<Uuid>,

    #[serde(rename = "date")]
    #[schema(value_type = String, example = "2025-06-01")]
    pub appointment_date: NaiveDate,

    #[serde(rename = "time")]
    #[schema(example = "09:00")]
    pub appointment_time: String,

    pub description: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub category_id: Uuid,
    pub hospital_id: Option<Uuid>,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub description: Option<String>,
}

// Referências resolvidas para exibição
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentView {
    pub id: Uuid,
    #[schema(value_type = String, example = "2025-06-01")]
    pub date: NaiveDate,
    pub time: String,
    pub description: Option<String>,
    pub status: AppointmentStatus,
    pub patient: Option<RefSummary>,
    pub doctor: Option<RefSummary>,
    pub category: Option<RefSummary>,
    pub hospital: Option<RefSummary>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlots {
    pub doctor_id: Uuid,
    #[schema(value_type = String, example = "2025-06-01")]
    pub date: NaiveDate,
    pub available_slots: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_universe_is_sorted_half_hours() {
        assert_eq!(SLOT_TIMES.len(), 16);
        assert_eq!(SLOT_TIMES.first(), Some(&"09:00"));
        assert_eq!(SLOT_TIMES.last(), Some(&"16:30"));
        assert!(SLOT_TIMES.windows(2).all(|w| w[0] < w[1]));
        assert!(!is_valid_slot("17:00"));
        assert!(!is_valid_slot("09:15"));
    }

    #[test]
    fn doctor_transitions() {
        use AppointmentStatus::*;
        assert!(Pending.doctor_can_move_to(DoctorAccepted));
        assert!(Pending.doctor_can_move_to(Rejected));
        assert!(NurseCompleted.doctor_can_move_to(DoctorCompleted));
        assert!(!Pending.doctor_can_move_to(DoctorCompleted));
        assert!(!Rejected.doctor_can_move_to(DoctorAccepted));
        assert!(DoctorAccepted.nurse_can_complete());
        assert!(!Pending.nurse_can_complete());
    }

    #[test]
    fn slot_policy_parsing() {
        assert_eq!("all".parse::<SlotPolicy>(), Ok(SlotPolicy::AllAppointments));
        assert_eq!(" Active ".parse::<SlotPolicy>(), Ok(SlotPolicy::ActiveOnly));
        assert!("bogus".parse::<SlotPolicy>().is_err());
        assert!(SlotPolicy::AllAppointments.blocks(AppointmentStatus::Canceled));
        assert!(!SlotPolicy::ActiveOnly.blocks(AppointmentStatus::Canceled));
        assert!(SlotPolicy::ActiveOnly.blocks(AppointmentStatus::Rejected));
    }
}
