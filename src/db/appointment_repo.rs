// src/db/appointment_repo.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    db::repository::AppointmentRepository,
    models::appointment::{Appointment, AppointmentStatus, NewAppointment, SlotPolicy},
};

pub const SLOT_TAKEN: &str = "Este horário já está reservado para o médico nesta data.";

#[derive(Clone)]
pub struct PgAppointmentRepository {
    pool: PgPool,
}

impl PgAppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Lê os horários ocupados; a política decide quais status contam.
async fn fetch_booked<'e, E>(
    executor: E,
    doctor_id: Uuid,
    date: NaiveDate,
    policy: SlotPolicy,
) -> Result<Vec<String>, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, (String, AppointmentStatus)>(
        r#"
        SELECT appointment_time, status
        FROM appointments
        WHERE doctor_id = $1 AND appointment_date = $2
        "#,
    )
    .bind(doctor_id)
    .bind(date)
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .filter(|(_, status)| policy.blocks(*status))
        .map(|(time, _)| time)
        .collect())
}

fn slot_conflict(constraint: &str) -> Option<String> {
    (constraint == "appointments_doctor_slot_key").then(|| SLOT_TAKEN.to_string())
}

#[async_trait]
impl AppointmentRepository for PgAppointmentRepository {
    async fn book(&self, input: NewAppointment, policy: SlotPolicy) -> Result<Appointment, AppError> {
        let mut tx = self.pool.begin().await?;

        // Um escritor por (médico, data) até o commit
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text || '|' || $2::text, 0))")
            .bind(input.doctor_id)
            .bind(input.appointment_date)
            .execute(&mut *tx)
            .await?;

        let booked = fetch_booked(&mut *tx, input.doctor_id, input.appointment_date, policy).await?;
        if booked.iter().any(|t| t == &input.appointment_time) {
            return Err(AppError::conflict(SLOT_TAKEN));
        }

        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (
                patient_id, doctor_id, category_id, hospital_id,
                appointment_date, appointment_time, description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(input.patient_id)
        .bind(input.doctor_id)
        .bind(input.category_id)
        .bind(input.hospital_id)
        .bind(input.appointment_date)
        .bind(&input.appointment_time)
        .bind(&input.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, slot_conflict))?;

        tx.commit().await?;
        Ok(appointment)
    }

    async fn booked_times(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        policy: SlotPolicy,
    ) -> Result<Vec<String>, AppError> {
        fetch_booked(&self.pool, doctor_id, date, policy).await
    }

    async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, AppError> {
        let appointments = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE patient_id = $1 ORDER BY created_at DESC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(appointments)
    }

    async fn list_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, AppError> {
        let appointments = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM appointments
            WHERE doctor_id = $1
            ORDER BY appointment_date ASC, appointment_time ASC
            "#,
        )
        .bind(doctor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(appointments)
    }

    async fn find(&self, patient_id: Uuid, appointment_id: Uuid) -> Result<Option<Appointment>, AppError> {
        let appointment = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE id = $1 AND patient_id = $2",
        )
        .bind(appointment_id)
        .bind(patient_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(appointment)
    }

    async fn update_status(
        &self,
        patient_id: Uuid,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppError> {
        sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
            SET status = $3
            WHERE id = $1 AND patient_id = $2
            RETURNING *
            "#,
        )
        .bind(appointment_id)
        .bind(patient_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, slot_conflict))?
        .ok_or(AppError::NotFound("Agendamento"))
    }

    async fn delete(&self, patient_id: Uuid, appointment_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1 AND patient_id = $2")
            .bind(appointment_id)
            .bind(patient_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Agendamento"));
        }
        Ok(())
    }
}
