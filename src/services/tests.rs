// src/services/tests.rs

//! Fluxos completos sobre o backend em memória.

use crate::{
    common::error::AppError,
    db::AccountRepository,
    models::{
        account::Role,
        appointment::{AppointmentStatus, SlotPolicy},
        auth::Principal,
        ticket::TicketStatus,
    },
    services::{
        appointment_service::BookingRequest,
        auth::Registration,
        testing::{Harness, STRONG_PASSWORD},
    },
};

fn booking(patient: &Principal, doctor: &Principal, category_id: uuid::Uuid, date: &str, time: &str) -> BookingRequest {
    BookingRequest {
        patient_id: patient.id(),
        doctor_id: doctor.id(),
        category_id,
        hospital_id: None,
        date: date.into(),
        time: time.into(),
        description: Some("Consulta de rotina".into()),
    }
}

// -----------------------------------------------------------------------------
// Agendamentos
// -----------------------------------------------------------------------------

#[tokio::test]
async fn booking_scenario_from_category_to_cancel() {
    let h = Harness::new();
    let (hospital, admin) = h.approved_hospital("Hospital Central").await;
    let cardio = h.category(&admin, "Cardio").await;
    let (_, doctor) = h.approved_doctor(&admin, &cardio, "dr.ana@clinica.test").await;
    let (_, patient) = h.account("paciente@clinica.test", Role::User).await;

    let doctors = h.appointments.list_doctors_by_category(cardio.id).await.unwrap();
    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0].id, doctor.id());

    let appointment = h
        .appointments
        .create(&patient, booking(&patient, &doctor, cardio.id, "2025-06-01", "09:00"))
        .await
        .unwrap();
    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert_eq!(appointment.hospital_id, Some(hospital.id));

    let slots = h.appointments.available_slots(doctor.id(), "2025-06-01").await.unwrap();
    assert_eq!(slots.available_slots.len(), 15);
    assert!(!slots.available_slots.contains(&"09:00".to_string()));

    let (_, other_patient) = h.account("outro@clinica.test", Role::User).await;
    let err = h
        .appointments
        .create(&other_patient, booking(&other_patient, &doctor, cardio.id, "2025-06-01", "09:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let views = h.appointments.list_for_patient(&patient, patient.id()).await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].category.as_ref().map(|c| c.name.as_str()), Some("Cardio"));
    assert_eq!(views[0].hospital.as_ref().map(|c| c.name.as_str()), Some("Hospital Central"));

    h.appointments.cancel(&patient, patient.id(), appointment.id).await.unwrap();

    let slots = h.appointments.available_slots(doctor.id(), "2025-06-01").await.unwrap();
    assert_eq!(slots.available_slots.len(), 16);
    assert!(h.appointments.list_for_patient(&patient, patient.id()).await.unwrap().is_empty());

    h.appointments
        .create(&other_patient, booking(&other_patient, &doctor, cardio.id, "2025-06-01", "09:00"))
        .await
        .unwrap();
}

#[tokio::test]
async fn slot_universe_and_input_validation() {
    let h = Harness::new();
    let (_, admin) = h.approved_hospital("Hospital Norte").await;
    let cat = h.category(&admin, "Pediatria").await;
    let (_, doctor) = h.approved_doctor(&admin, &cat, "dr.pedro@clinica.test").await;
    let (_, patient) = h.account("p@clinica.test", Role::User).await;

    let slots = h.appointments.available_slots(doctor.id(), "2025-07-10").await.unwrap();
    assert_eq!(slots.available_slots.first().map(String::as_str), Some("09:00"));
    assert_eq!(slots.available_slots.last().map(String::as_str), Some("16:30"));
    assert_eq!(slots.available_slots.len(), 16);

    for (date, time) in [("2025-07-10", "17:00"), ("2025-07-10", "09:15"), ("10/07/2025", "09:00")] {
        let err = h
            .appointments
            .create(&patient, booking(&patient, &doctor, cat.id, date, time))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)), "{date} {time}");
    }

    let err = h
        .appointments
        .available_slots(uuid::Uuid::new_v4(), "2025-07-10")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn patient_cannot_address_someone_else() {
    let h = Harness::new();
    let (_, admin) = h.approved_hospital("Hospital Sul").await;
    let cat = h.category(&admin, "Ortopedia").await;
    let (_, doctor) = h.approved_doctor(&admin, &cat, "dr.lu@clinica.test").await;
    let (_, alice) = h.account("alice@clinica.test", Role::User).await;
    let (_, bob) = h.account("bob@clinica.test", Role::User).await;

    let err = h
        .appointments
        .create(&alice, booking(&bob, &doctor, cat.id, "2025-06-02", "10:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = h.appointments.list_for_patient(&alice, bob.id()).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // O superadmin pode agir por qualquer paciente
    h.appointments
        .create(&h.superadmin(), booking(&bob, &doctor, cat.id, "2025-06-02", "10:00"))
        .await
        .unwrap();
}

#[tokio::test]
async fn canceled_status_frees_slot_only_under_active_policy() {
    for (policy, freed) in [(SlotPolicy::AllAppointments, false), (SlotPolicy::ActiveOnly, true)] {
        let h = Harness::with_policy(policy);
        let (_, admin) = h.approved_hospital("Hospital Leste").await;
        let cat = h.category(&admin, "Neuro").await;
        let (_, doctor) = h.approved_doctor(&admin, &cat, "dr.neuro@clinica.test").await;
        let (_, patient) = h.account("pac@clinica.test", Role::User).await;

        let appt = h
            .appointments
            .create(&patient, booking(&patient, &doctor, cat.id, "2025-06-03", "11:00"))
            .await
            .unwrap();
        h.appointments
            .set_status(&doctor, patient.id(), appt.id, AppointmentStatus::DoctorAccepted)
            .await
            .unwrap();
        h.appointments
            .set_status(&doctor, patient.id(), appt.id, AppointmentStatus::Canceled)
            .await
            .unwrap();

        let slots = h.appointments.available_slots(doctor.id(), "2025-06-03").await.unwrap();
        assert_eq!(slots.available_slots.contains(&"11:00".to_string()), freed, "{policy:?}");

        let rebook = h
            .appointments
            .create(&patient, booking(&patient, &doctor, cat.id, "2025-06-03", "11:00"))
            .await;
        assert_eq!(rebook.is_ok(), freed, "{policy:?}");
    }
}

#[tokio::test]
async fn status_lifecycle_between_doctor_and_nurse() {
    let h = Harness::new();
    let (_, admin) = h.approved_hospital("Hospital Oeste").await;
    let cat = h.category(&admin, "Clínica Geral").await;
    let (_, doctor) = h.approved_doctor(&admin, &cat, "dr.geral@clinica.test").await;
    let (_, nurse) = h.approved_nurse(&doctor, &cat, "enf@clinica.test").await;
    let (_, patient) = h.account("pac@clinica.test", Role::User).await;

    let appt = h
        .appointments
        .create(&patient, booking(&patient, &doctor, cat.id, "2025-06-04", "14:00"))
        .await
        .unwrap();

    // Enfermeiro não conclui antes do aceite do médico
    let err = h
        .appointments
        .complete_as_nurse(&nurse, patient.id(), appt.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let err = h
        .appointments
        .set_status(&doctor, patient.id(), appt.id, AppointmentStatus::DoctorCompleted)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    h.appointments
        .set_status(&doctor, patient.id(), appt.id, AppointmentStatus::DoctorAccepted)
        .await
        .unwrap();
    assert_eq!(h.appointments.nurse_appointments(&nurse).await.unwrap().len(), 1);

    let done = h
        .appointments
        .complete_as_nurse(&nurse, patient.id(), appt.id)
        .await
        .unwrap();
    assert_eq!(done.status, AppointmentStatus::NurseCompleted);

    let done = h
        .appointments
        .set_status(&doctor, patient.id(), appt.id, AppointmentStatus::DoctorCompleted)
        .await
        .unwrap();
    assert_eq!(done.status, AppointmentStatus::DoctorCompleted);

    let dashboard = h.dashboards.doctor(&doctor).await.unwrap();
    assert_eq!(dashboard.appointments.total, 1);
    assert_eq!(dashboard.appointments.doctor_completed, 1);
    assert_eq!(dashboard.category.map(|c| c.name), Some("Clínica Geral".to_string()));

    let nurse_dashboard = h.dashboards.nurse(&nurse).await.unwrap();
    assert_eq!(nurse_dashboard.doctors.len(), 1);
    assert_eq!(nurse_dashboard.appointments.total, 1);
}

#[tokio::test]
async fn another_doctor_cannot_touch_the_appointment() {
    let h = Harness::new();
    let (_, admin) = h.approved_hospital("Hospital Azul").await;
    let cat = h.category(&admin, "Dermato").await;
    let (_, doctor) = h.approved_doctor(&admin, &cat, "dr.um@clinica.test").await;
    let (_, intruder) = h.approved_doctor(&admin, &cat, "dr.dois@clinica.test").await;
    let (_, patient) = h.account("pac@clinica.test", Role::User).await;

    let appt = h
        .appointments
        .create(&patient, booking(&patient, &doctor, cat.id, "2025-06-05", "15:30"))
        .await
        .unwrap();

    let err = h
        .appointments
        .set_status(&intruder, patient.id(), appt.id, AppointmentStatus::DoctorAccepted)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_bookings_of_one_slot_admit_a_single_winner() {
    let h = Harness::new();
    let (_, admin) = h.approved_hospital("Hospital Corrida").await;
    let cat = h.category(&admin, "Ortopedia").await;
    let (_, doctor) = h.approved_doctor(&admin, &cat, "dr.orto@clinica.test").await;
    let (_, first) = h.account("primeiro@clinica.test", Role::User).await;
    let (_, second) = h.account("segundo@clinica.test", Role::User).await;

    let (a, b) = tokio::join!(
        h.appointments.create(&first, booking(&first, &doctor, cat.id, "2025-06-06", "10:30")),
        h.appointments.create(&second, booking(&second, &doctor, cat.id, "2025-06-06", "10:30")),
    );

    let results = [a, b];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results.iter().filter(|r| matches!(r, Err(AppError::Conflict(_)))).count(),
        1
    );

    // Tarefas separadas no runtime multi-thread
    let racers: Vec<_> = ["09:30", "09:30", "09:30"]
        .into_iter()
        .enumerate()
        .map(|(i, time)| {
            let service = h.appointments.clone();
            let patient = if i % 2 == 0 { first.clone() } else { second.clone() };
            let request = booking(&patient, &doctor, cat.id, "2025-06-06", time);
            tokio::spawn(async move { service.create(&patient, request).await })
        })
        .collect();

    let mut won = 0;
    for racer in racers {
        match racer.await.unwrap() {
            Ok(_) => won += 1,
            Err(e) => assert!(matches!(e, AppError::Conflict(_))),
        }
    }
    assert_eq!(won, 1);

    let slots = h.appointments.available_slots(doctor.id(), "2025-06-06").await.unwrap();
    assert_eq!(slots.available_slots.len(), 14);
}

#[tokio::test]
async fn unapproved_doctor_loses_doctor_powers() {
    let h = Harness::new();
    let (_, admin) = h.approved_hospital("Hospital Cedro").await;
    let cardio = h.category(&admin, "Cardio").await;
    let neuro = h.category(&admin, "Neuro").await;
    let (_, doctor) = h.approved_doctor(&admin, &cardio, "dr.cedro@clinica.test").await;
    let (_, patient) = h.account("pac@clinica.test", Role::User).await;
    let appt = h
        .appointments
        .create(&patient, booking(&patient, &doctor, cardio.id, "2025-06-07", "13:00"))
        .await
        .unwrap();

    // Médico que acabou de escolher categoria, ainda pendente
    let (_, fresh) = h.account("dr.novato@clinica.test", Role::Doctor).await;
    h.approvals.choose_category(&fresh, cardio.id).await.unwrap();
    let (_, nurse) = h.account("enf.cedro@clinica.test", Role::Nurse).await;
    h.approvals.choose_category(&nurse, cardio.id).await.unwrap();

    let err = h.approvals.approve_nurse(&fresh, nurse.id()).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    let err = h.approvals.list_nurses(&fresh).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // Médico aprovado e depois desativado pelo admin
    h.approvals.toggle_doctor(&admin, doctor.id()).await.unwrap();
    for result in [
        h.approvals.approve_nurse(&doctor, nurse.id()).await.map(|_| ()),
        h.approvals.disapprove_nurse(&doctor, nurse.id()).await.map(|_| ()),
        h.approvals.reject_nurse(&doctor, nurse.id()).await,
        h.appointments.doctor_appointments(&doctor).await.map(|_| ()),
        h.appointments
            .set_status(&doctor, patient.id(), appt.id, AppointmentStatus::DoctorAccepted)
            .await
            .map(|_| ()),
    ] {
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
    let still_pending = AccountRepository::find_by_id(&h.store, nurse.id()).await.unwrap().unwrap();
    assert!(!still_pending.is_verified);

    // Mudar de categoria também suspende até nova aprovação
    h.approvals.toggle_doctor(&admin, doctor.id()).await.unwrap();
    h.approvals.choose_category(&doctor, neuro.id).await.unwrap();
    let err = h.appointments.doctor_appointments(&doctor).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    h.approvals.approve_doctor(&admin, doctor.id()).await.unwrap();
    assert_eq!(h.appointments.doctor_appointments(&doctor).await.unwrap().len(), 1);
}

#[tokio::test]
async fn reviews_feed_the_doctor_dashboard() {
    let h = Harness::new();
    let (_, admin) = h.approved_hospital("Hospital Verde").await;
    let cat = h.category(&admin, "Cardio").await;
    let (_, doctor) = h.approved_doctor(&admin, &cat, "dr.review@clinica.test").await;
    let (_, patient) = h.account("pac@clinica.test", Role::User).await;

    let err = h
        .appointments
        .add_review(&patient, doctor.id(), 6, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    h.appointments.add_review(&patient, doctor.id(), 5, Some("Ótimo")).await.unwrap();
    h.appointments.add_review(&patient, doctor.id(), 4, None).await.unwrap();

    let dashboard = h.dashboards.doctor(&doctor).await.unwrap();
    assert_eq!(dashboard.reviews.len(), 2);
    assert_eq!(dashboard.average_rating, Some(4.5));
}

// -----------------------------------------------------------------------------
// Aprovações e tenants
// -----------------------------------------------------------------------------

#[tokio::test]
async fn admin_cannot_see_or_touch_other_tenants() {
    let h = Harness::new();
    let (_, admin_a) = h.approved_hospital("Hospital A").await;
    let (_, admin_b) = h.approved_hospital("Hospital B").await;
    let cat_a = h.category(&admin_a, "Cardio").await;

    let (_, doctor) = h.account("dr.a@clinica.test", Role::Doctor).await;
    h.approvals.choose_category(&doctor, cat_a.id).await.unwrap();

    assert_eq!(h.approvals.list_doctors(&admin_a).await.unwrap().len(), 1);
    assert!(h.approvals.list_doctors(&admin_b).await.unwrap().is_empty());
    assert!(h.approvals.list_tenant_accounts(&admin_b).await.unwrap().is_empty());

    for result in [
        h.approvals.approve_doctor(&admin_b, doctor.id()).await.map(|_| ()),
        h.approvals.toggle_doctor(&admin_b, doctor.id()).await.map(|_| ()),
        h.approvals.reject_doctor(&admin_b, doctor.id()).await,
    ] {
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    let err = h
        .approvals
        .delete_category(&admin_b, cat_a.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn doctor_approval_is_idempotent_and_promotes_pending() {
    let h = Harness::new();
    let (_, admin) = h.approved_hospital("Hospital Ipê").await;
    let cat = h.category(&admin, "Oncologia").await;

    let (_, pending) = h.account("dr.novo@clinica.test", Role::DoctorPending).await;
    assert!(matches!(pending, Principal::Staff { role: Role::DoctorPending, .. }));

    let linked = h.approvals.choose_category(&pending, cat.id).await.unwrap();
    assert!(!linked.is_verified);
    assert_eq!(linked.selected_hospital_tenant_id.as_deref(), admin.tenant_id());
    assert_eq!(h.approvals.list_doctors(&admin).await.unwrap().len(), 1);

    let first = h.approvals.approve_doctor(&admin, pending.id()).await.unwrap();
    let second = h.approvals.approve_doctor(&admin, pending.id()).await.unwrap();
    assert_eq!(first.role, Role::Doctor);
    assert!(first.is_verified && second.is_verified);
    assert_eq!(second.role, Role::Doctor);

    let toggled = h.approvals.toggle_doctor(&admin, pending.id()).await.unwrap();
    assert!(!toggled.is_verified);

    h.approvals.reject_doctor(&admin, pending.id()).await.unwrap();
    assert!(AccountRepository::find_by_id(&h.store, pending.id()).await.unwrap().is_none());
}

#[tokio::test]
async fn choosing_a_category_resets_approval() {
    let h = Harness::new();
    let (hospital, admin) = h.approved_hospital("Hospital Sol").await;
    let cat = h.category(&admin, "Cardio").await;
    let other = h.category(&admin, "Neuro").await;
    let (_, doctor) = h.approved_doctor(&admin, &cat, "dr.sol@clinica.test").await;

    let moved = h.approvals.choose_category(&doctor, other.id).await.unwrap();
    assert!(!moved.is_verified);
    assert_eq!(moved.selected_category, Some(other.id));
    assert_eq!(moved.selected_hospital, Some(hospital.id));
    assert_eq!(moved.selected_hospital_tenant_id.as_deref(), Some(hospital.tenant_id.as_str()));

    let err = h
        .approvals
        .choose_category(&doctor, uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn nurse_approval_requires_same_department() {
    let h = Harness::new();
    let (_, admin) = h.approved_hospital("Hospital Lua").await;
    let cardio = h.category(&admin, "Cardio").await;
    let neuro = h.category(&admin, "Neuro").await;
    let (_, doctor) = h.approved_doctor(&admin, &cardio, "dr.lua@clinica.test").await;

    let (_, stranger) = h.account("enf.neuro@clinica.test", Role::Nurse).await;
    h.approvals.choose_category(&stranger, neuro.id).await.unwrap();

    let err = h.approvals.approve_nurse(&doctor, stranger.id()).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    let err = h.approvals.reject_nurse(&doctor, stranger.id()).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // Não-enfermeiro = não encontrado
    let (_, patient) = h.account("pac@clinica.test", Role::User).await;
    let err = h.approvals.approve_nurse(&doctor, patient.id()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let (_, nurse) = h.account("enf.cardio@clinica.test", Role::Nurse).await;
    h.approvals.choose_category(&nurse, cardio.id).await.unwrap();
    assert_eq!(h.dashboards.doctor(&doctor).await.unwrap().pending_nurses, 1);
    assert!(h.approvals.approve_nurse(&doctor, nurse.id()).await.unwrap().is_verified);

    let mine = h.approvals.my_doctors(&nurse).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, doctor.id());

    assert!(!h.approvals.disapprove_nurse(&doctor, nurse.id()).await.unwrap().is_verified);
    let err = h.approvals.my_doctors(&nurse).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let listed = h.approvals.list_nurses(&doctor).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].category.as_ref().map(|c| c.id), Some(cardio.id));
}

#[tokio::test]
async fn category_names_are_unique_ignoring_case() {
    let h = Harness::new();
    let (_, admin) = h.approved_hospital("Hospital Mar").await;
    let (_, other_admin) = h.approved_hospital("Hospital Rio").await;

    let cardio = h.category(&admin, "Cardio").await;
    let err = h.approvals.create_category(&admin, "  cardio ", None).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Outro hospital pode repetir o nome
    h.category(&other_admin, "CARDIO").await;

    let neuro = h.category(&admin, "Neuro").await;
    let err = h
        .approvals
        .update_category(&admin, neuro.id, Some("CARDIO"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let renamed = h
        .approvals
        .update_category(&admin, cardio.id, Some("Cardiologia"), Some("Coração"))
        .await
        .unwrap();
    assert_eq!(renamed.name, "Cardiologia");

    let err = h.approvals.create_category(&admin, "   ", None).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
    assert_eq!(h.approvals.list_categories(&admin).await.unwrap().len(), 2);
}

#[tokio::test]
async fn pending_hospital_is_gated_until_approved() {
    let h = Harness::new();
    let hospital = h.pending_hospital("Hospital Novo").await;
    assert!(!hospital.is_hospital);

    // Login permitido mesmo pendente
    let (token, principal) = h.auth.login(&hospital.email, STRONG_PASSWORD).await.unwrap();
    assert!(matches!(principal, Principal::HospitalAdmin { approved: false, .. }));
    let resolved = h.auth.resolve_token(&token).await.unwrap();
    assert_eq!(resolved.id(), hospital.id);

    let err = h.approvals.create_category(&resolved, "Cardio", None).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // Só o superadmin aprova
    let err = h.hospitals.approve_hospital(&resolved, hospital.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    h.hospitals.approve_hospital(&h.superadmin(), hospital.id).await.unwrap();

    let resolved = h.auth.resolve_token(&token).await.unwrap();
    assert!(h.approvals.create_category(&resolved, "Cardio", None).await.is_ok());

    let rejected = h.hospitals.reject_hospital(&h.superadmin(), hospital.id).await.unwrap();
    assert!(!rejected.is_hospital);
}

#[tokio::test]
async fn hospital_delete_is_refused_while_accounts_reference_it() {
    let h = Harness::new();
    let (hospital, admin) = h.approved_hospital("Hospital Pinho").await;
    let cat = h.category(&admin, "Cardio").await;
    let (_, doctor) = h.approved_doctor(&admin, &cat, "dr.pinho@clinica.test").await;
    let root = h.superadmin();

    let overview = h.hospitals.overview(&root).await.unwrap();
    assert_eq!(overview[0].members.len(), 1);
    assert_eq!(overview[0].categories.len(), 1);

    let err = h.hospitals.delete_hospital(&root, hospital.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    h.approvals.reject_doctor(&admin, doctor.id()).await.unwrap();
    h.hospitals.delete_hospital(&root, hospital.id).await.unwrap();
    assert!(h.hospitals.list_public().await.unwrap().is_empty());
    assert!(h.appointments.list_categories().await.unwrap().is_empty());
}

#[tokio::test]
async fn hospital_registration_rejects_duplicates() {
    let h = Harness::new();
    let hospital = h.pending_hospital("Hospital Único").await;

    // Mesmo nome
    let err = h
        .hospitals
        .create_hospital(crate::services::hospital_service::HospitalRegistration {
            hospital_name: "Hospital Único".into(),
            email: "outro@hospital.test".into(),
            password: STRONG_PASSWORD.into(),
            license_number: "LIC-OUTRA".into(),
            address: None,
            phone: None,
            image_url: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Senha fraca
    let err = h
        .hospitals
        .create_hospital(crate::services::hospital_service::HospitalRegistration {
            hospital_name: "Hospital Fraco".into(),
            email: "fraco@hospital.test".into(),
            password: "abc".into(),
            license_number: "LIC-FRACO".into(),
            address: None,
            phone: None,
            image_url: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    // E-mail de hospital não pode virar conta
    let err = h
        .auth
        .register_account(Registration {
            email: hospital.email.clone(),
            password: STRONG_PASSWORD.into(),
            name: "Fulano".into(),
            first_name: None,
            last_name: None,
            specialization: None,
            role: Role::User,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert!(hospital.tenant_id.starts_with("tenant-"));
}

#[tokio::test]
async fn hospital_rename_is_trimmed_before_saving() {
    let h = Harness::new();
    let root = h.superadmin();
    h.pending_hospital("Hospital A").await;
    let other = h.pending_hospital("Hospital B").await;

    let rename = |name: &str| crate::models::hospital::HospitalChanges {
        hospital_name: Some(name.into()),
        address: None,
        phone: None,
        image_url: None,
        status: None,
    };

    let err = h
        .hospitals
        .update_hospital(&root, other.id, rename("Hospital A "))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = h.hospitals.update_hospital(&root, other.id, rename("   ")).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let renamed = h
        .hospitals
        .update_hospital(&root, other.id, rename("  Hospital C  "))
        .await
        .unwrap();
    assert_eq!(renamed.hospital_name, "Hospital C");
}

// -----------------------------------------------------------------------------
// Autenticação
// -----------------------------------------------------------------------------

fn registration(email: &str, role: Role) -> Registration {
    Registration {
        email: email.into(),
        password: STRONG_PASSWORD.into(),
        name: "Maria Silva".into(),
        first_name: Some("Maria".into()),
        last_name: Some("Silva".into()),
        specialization: None,
        role,
    }
}

#[tokio::test]
async fn registration_requires_otp_before_login() {
    let h = Harness::new();
    let account = h.auth.register_account(registration("Maria@Clinica.test", Role::User)).await.unwrap();
    assert_eq!(account.email, "maria@clinica.test");
    assert!(!account.is_verified);

    let err = h.auth.login("maria@clinica.test", STRONG_PASSWORD).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = h.auth.verify_otp("maria@clinica.test", "000000x").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    h.auth.resend_otp("maria@clinica.test").await.unwrap();
    let otp = AccountRepository::find_by_email(&h.store, "maria@clinica.test")
        .await
        .unwrap()
        .and_then(|a| a.otp)
        .unwrap();
    h.auth.verify_otp("maria@clinica.test", &otp).await.unwrap();

    let err = h.auth.login("maria@clinica.test", "Errada@123").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));

    let (token, principal) = h.auth.login("maria@clinica.test", STRONG_PASSWORD).await.unwrap();
    assert!(matches!(principal, Principal::Patient { .. }));
    let resolved = h.auth.resolve_token(&token).await.unwrap();
    assert_eq!(resolved.id(), account.id);

    let err = h.auth.resend_otp("maria@clinica.test").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let err = h.auth.register_account(registration("maria@clinica.test", Role::Nurse)).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = h
        .auth
        .register_account(registration("root@clinica.test", Role::Superadmin))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn otp_cannot_stand_in_for_department_approval() {
    let h = Harness::new();
    let (_, admin) = h.approved_hospital("Hospital Jatobá").await;
    let cat = h.category(&admin, "Cardio").await;

    let account = h.auth.register_account(registration("dr.jatoba@clinica.test", Role::Doctor)).await.unwrap();
    let otp = account.otp.clone().unwrap();
    h.auth.verify_otp(&account.email, &otp).await.unwrap();
    let (_, doctor) = h.auth.login(&account.email, STRONG_PASSWORD).await.unwrap();

    let linked = h.approvals.choose_category(&doctor, cat.id).await.unwrap();
    assert!(!linked.is_verified);

    let err = h.auth.resend_otp(&account.email).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    let err = h.auth.verify_otp(&account.email, &otp).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let current = AccountRepository::find_by_id(&h.store, account.id).await.unwrap().unwrap();
    assert!(!current.is_verified);
    assert!(current.otp.is_none());

    let approved = h.approvals.approve_doctor(&admin, account.id).await.unwrap();
    assert!(approved.is_verified);
}

#[tokio::test]
async fn tokens_for_missing_principals_are_rejected() {
    let h = Harness::new();
    let err = h.auth.resolve_token("nem-um-jwt").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidToken));

    let (account, _) = h.account("sumiu@clinica.test", Role::User).await;
    // Conta criada com hash falso: troca por um hash real antes de logar
    let hash = crate::common::password::hash_password(STRONG_PASSWORD, 4).await.unwrap();
    AccountRepository::update_password(&h.store, account.id, &hash).await.unwrap();
    let (token, _) = h.auth.login(&account.email, STRONG_PASSWORD).await.unwrap();

    AccountRepository::delete(&h.store, account.id).await.unwrap();
    let err = h.auth.resolve_token(&token).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidToken));
}

#[tokio::test]
async fn password_reset_rejects_reused_passwords() {
    let h = Harness::new();
    h.auth.register_account(registration("reset@clinica.test", Role::User)).await.unwrap();

    // E-mail desconhecido não revela nada
    h.auth.forgot_password("ninguem@clinica.test").await.unwrap();

    h.auth.forgot_password("reset@clinica.test").await.unwrap();
    let token = AccountRepository::find_by_email(&h.store, "reset@clinica.test")
        .await
        .unwrap()
        .and_then(|a| a.reset_token)
        .unwrap();

    let err = h.auth.reset_password(&token, STRONG_PASSWORD).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    h.auth.reset_password(&token, "Nova@Senha9").await.unwrap();

    // Token é de uso único
    let err = h.auth.reset_password(&token, "Outra@Senha9").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn superadmin_bootstrap_is_idempotent() {
    let h = Harness::new();
    h.auth.ensure_superadmin("root@hospital.test", STRONG_PASSWORD).await.unwrap();
    h.auth.ensure_superadmin("root@hospital.test", STRONG_PASSWORD).await.unwrap();

    let (_, principal) = h.auth.login("root@hospital.test", STRONG_PASSWORD).await.unwrap();
    assert!(matches!(principal, Principal::SuperAdmin { .. }));
    assert_eq!(h.hospitals.list_accounts(&principal).await.unwrap().len(), 1);

    h.account("comum@clinica.test", Role::User).await;
    let err = h
        .auth
        .ensure_superadmin("comum@clinica.test", STRONG_PASSWORD)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

// -----------------------------------------------------------------------------
// Tickets
// -----------------------------------------------------------------------------

#[tokio::test]
async fn tickets_are_answered_only_inside_the_tenant() {
    let h = Harness::new();
    let (_, admin) = h.approved_hospital("Hospital Ticket").await;
    let (_, other_admin) = h.approved_hospital("Hospital Alheio").await;
    let cat = h.category(&admin, "Cardio").await;
    let (_, doctor) = h.approved_doctor(&admin, &cat, "dr.ticket@clinica.test").await;

    let ticket = h.tickets.create(&doctor, "Acesso", "Não consigo ver a agenda").await.unwrap();
    assert_eq!(ticket.status, TicketStatus::Open);
    assert_eq!(h.tickets.my_tickets(&doctor).await.unwrap().len(), 1);

    let listed = h.tickets.tenant_tickets(&admin).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].account_email, "dr.ticket@clinica.test");
    assert!(h.tickets.tenant_tickets(&other_admin).await.unwrap().is_empty());

    let err = h
        .tickets
        .reply(&admin, doctor.id(), ticket.id, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let err = h
        .tickets
        .reply(&other_admin, doctor.id(), ticket.id, "Resolvido")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let answered = h.tickets.reply(&admin, doctor.id(), ticket.id, "Resolvido").await.unwrap();
    assert_eq!(answered.status, TicketStatus::Closed);
    assert_eq!(answered.reply.as_deref(), Some("Resolvido"));
    assert!(answered.reply_at.is_some());

    // Hospital não abre ticket
    let err = h.tickets.create(&admin, "x", "y").await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}
