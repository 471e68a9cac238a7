//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

// Importações principais
use crate::{
    config::{AppState, Config},
    docs::ApiDoc,
    middleware::auth::auth_guard,
};

fn build_router(app_state: AppState) -> Router {
    // Rotas públicas de autenticação
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/verify-otp", post(handlers::auth::verify_otp))
        .route("/resend-otp", post(handlers::auth::resend_otp))
        .route("/login", post(handlers::auth::login))
        .route("/forgot-password", post(handlers::auth::forgot_password))
        .route("/reset-password", post(handlers::auth::reset_password))
        .merge(
            Router::new()
                .route("/me", get(handlers::auth::get_me))
                .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard)),
        );

    // Listagem e cadastro de hospitais são públicos
    let hospital_routes = Router::new().route(
        "/",
        get(handlers::hospitals::list_hospitals).post(handlers::hospitals::create_hospital),
    );

    let admin_routes = Router::new()
        .route("/doctors", get(handlers::admin::list_doctors))
        .route("/doctors/approve/{id}", put(handlers::admin::approve_doctor))
        .route("/doctors/toggle/{id}", put(handlers::admin::toggle_doctor))
        .route("/doctors/reject/{id}", delete(handlers::admin::reject_doctor))
        .route("/users", get(handlers::admin::list_users))
        .route(
            "/category",
            post(handlers::admin::create_category).get(handlers::admin::list_categories),
        )
        .route(
            "/category/{id}",
            put(handlers::admin::update_category).delete(handlers::admin::delete_category),
        )
        .route("/tickets", get(handlers::admin::list_tickets))
        .route("/tickets/{account_id}/{ticket_id}/reply", put(handlers::admin::reply_ticket));

    let doctor_routes = Router::new()
        .route("/choose-category", put(handlers::doctor::choose_category))
        .route("/dashboard", get(handlers::doctor::dashboard))
        .route("/nurse", get(handlers::doctor::list_nurses))
        .route("/nurse/approve/{id}", put(handlers::doctor::approve_nurse))
        .route("/nurse/disapprove/{id}", put(handlers::doctor::disapprove_nurse))
        .route("/nurse/reject/{id}", delete(handlers::doctor::reject_nurse))
        .route("/appointments", get(handlers::doctor::list_appointments))
        .route(
            "/appointments/{patient_id}/{appointment_id}/status",
            put(handlers::doctor::update_appointment_status),
        );

    let nurse_routes = Router::new()
        .route("/dashboard", get(handlers::nurse::dashboard))
        .route("/categories", get(handlers::nurse::list_categories))
        .route("/choose-category", put(handlers::nurse::choose_category))
        .route("/my-doctor", get(handlers::nurse::my_doctor))
        .route("/appointments", get(handlers::nurse::list_appointments))
        .route(
            "/appointments/{patient_id}/{appointment_id}/complete",
            put(handlers::nurse::complete_appointment),
        );

    let appointment_routes = Router::new()
        .route("/categories", get(handlers::appointments::list_categories))
        .route("/doctors/{category_id}", get(handlers::appointments::list_doctors))
        .route("/create", post(handlers::appointments::create_appointment))
        .route("/slots/{doctor_id}/{date}", get(handlers::appointments::available_slots))
        .route("/user/{user_id}", get(handlers::appointments::list_for_user))
        .route("/review/{doctor_id}", post(handlers::appointments::review_doctor))
        .route("/{user_id}/{appointment_id}", delete(handlers::appointments::cancel_appointment));

    let ticket_routes = Router::new().route(
        "/",
        post(handlers::tickets::create_ticket).get(handlers::tickets::my_tickets),
    );

    let superadmin_routes = Router::new()
        .route("/hospitals", get(handlers::superadmin::list_hospitals))
        .route(
            "/hospitals/{id}",
            put(handlers::superadmin::update_hospital).delete(handlers::superadmin::delete_hospital),
        )
        .route("/hospitals/{id}/approve", put(handlers::superadmin::approve_hospital))
        .route("/hospitals/{id}/reject", put(handlers::superadmin::reject_hospital))
        .route("/users", get(handlers::superadmin::list_users))
        .route("/doctors", get(handlers::superadmin::list_doctors));

    // Tudo abaixo exige um bearer válido
    let protected = Router::new()
        .nest("/admin", admin_routes)
        .nest("/doctor", doctor_routes)
        .nest("/nurse", nurse_routes)
        .nest("/appointment", appointment_routes)
        .nest("/tickets", ticket_routes)
        .nest("/superadmin", superadmin_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api/auth", auth_routes)
        .nest("/api/hospitals", hospital_routes)
        .nest("/api", protected)
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controla o nível; padrão "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    if let Some(pool) = &app_state.db_pool {
        sqlx::migrate!().run(pool).await?;
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
    }

    if let (Some(email), Some(password)) = (&config.superadmin_email, &config.superadmin_password) {
        app_state.auth_service.ensure_superadmin(email, password).await?;
    }

    let app = build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
