// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::verify_otp,
        handlers::auth::resend_otp,
        handlers::auth::login,
        handlers::auth::forgot_password,
        handlers::auth::reset_password,
        handlers::auth::get_me,

        // --- Hospitais ---
        handlers::hospitals::create_hospital,
        handlers::hospitals::list_hospitals,

        // --- Admin ---
        handlers::admin::list_doctors,
        handlers::admin::approve_doctor,
        handlers::admin::toggle_doctor,
        handlers::admin::reject_doctor,
        handlers::admin::list_users,
        handlers::admin::create_category,
        handlers::admin::list_categories,
        handlers::admin::update_category,
        handlers::admin::delete_category,
        handlers::admin::list_tickets,
        handlers::admin::reply_ticket,

        // --- Médico ---
        handlers::doctor::choose_category,
        handlers::doctor::dashboard,
        handlers::doctor::list_nurses,
        handlers::doctor::approve_nurse,
        handlers::doctor::disapprove_nurse,
        handlers::doctor::reject_nurse,
        handlers::doctor::list_appointments,
        handlers::doctor::update_appointment_status,

        // --- Enfermeiro ---
        handlers::nurse::dashboard,
        handlers::nurse::list_categories,
        handlers::nurse::choose_category,
        handlers::nurse::my_doctor,
        handlers::nurse::list_appointments,
        handlers::nurse::complete_appointment,

        // --- Agendamentos ---
        handlers::appointments::list_categories,
        handlers::appointments::list_doctors,
        handlers::appointments::available_slots,
        handlers::appointments::create_appointment,
        handlers::appointments::list_for_user,
        handlers::appointments::cancel_appointment,
        handlers::appointments::review_doctor,

        // --- Suporte ---
        handlers::tickets::create_ticket,
        handlers::tickets::my_tickets,

        // --- Superadmin ---
        handlers::superadmin::list_hospitals,
        handlers::superadmin::update_hospital,
        handlers::superadmin::approve_hospital,
        handlers::superadmin::reject_hospital,
        handlers::superadmin::delete_hospital,
        handlers::superadmin::list_users,
        handlers::superadmin::list_doctors,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::RegisterAccountPayload,
            models::auth::LoginPayload,
            models::auth::VerifyOtpPayload,
            models::auth::EmailPayload,
            models::auth::ResetPasswordPayload,
            models::auth::AuthResponse,
            models::auth::PrincipalView,
            models::auth::MessageResponse,

            // --- Hospitais ---
            models::hospital::HospitalStatus,
            models::hospital::Hospital,
            models::hospital::Category,
            models::hospital::CategoryListing,
            models::hospital::HospitalOverview,
            models::hospital::PublicHospital,
            models::hospital::HospitalChanges,
            models::hospital::HospitalCreated,

            // --- Contas ---
            models::account::Role,
            models::account::AccountStatus,
            models::account::Account,
            models::account::AccountSummary,
            models::account::DoctorCard,
            models::account::StaffMember,
            models::account::Review,

            // --- Agendamentos ---
            models::appointment::AppointmentStatus,
            models::appointment::Appointment,
            models::appointment::AppointmentView,
            models::appointment::AvailableSlots,
            models::appointment::RefSummary,

            // --- Painéis ---
            models::dashboard::AppointmentCounts,
            models::dashboard::DoctorDashboard,
            models::dashboard::NurseDashboard,

            // --- Suporte ---
            models::ticket::TicketStatus,
            models::ticket::SupportTicket,
            models::ticket::TenantTicket,

            // --- Payloads ---
            handlers::hospitals::CreateHospitalPayload,
            handlers::admin::CreateCategoryPayload,
            handlers::admin::UpdateCategoryPayload,
            handlers::admin::ReplyTicketPayload,
            handlers::doctor::ChooseCategoryPayload,
            handlers::doctor::UpdateStatusPayload,
            handlers::appointments::CreateAppointmentPayload,
            handlers::appointments::ReviewPayload,
            handlers::tickets::CreateTicketPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Cadastro, Login, OTP e Redefinição de Senha"),
        (name = "Hospitais", description = "Cadastro e Listagem Pública de Hospitais"),
        (name = "Admin", description = "Administração do Hospital (Médicos, Categorias e Tickets)"),
        (name = "Médico", description = "Departamento, Enfermeiros e Agenda do Médico"),
        (name = "Enfermeiro", description = "Departamento e Agenda do Enfermeiro"),
        (name = "Agendamentos", description = "Categorias, Horários e Consultas do Paciente"),
        (name = "Suporte", description = "Tickets de Suporte"),
        (name = "Superadmin", description = "Gestão Global de Hospitais e Contas")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/api/auth/login",
            "/api/hospitals",
            "/api/admin/category/{id}",
            "/api/appointment/slots/{doctor_id}/{date}",
            "/api/superadmin/hospitals/{id}/approve",
            "/api/nurse/appointments/{patient_id}/{appointment_id}/complete",
        ] {
            assert!(paths.contains_key(path), "rota sem documentação: {path}");
        }
        assert!(doc.components.is_some_and(|c| c.security_schemes.contains_key("api_jwt")));
    }
}
