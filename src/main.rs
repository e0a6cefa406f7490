// src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::{accounting_guard, operation_guard};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    let app_state = AppState::new()
        .await
        .expect("failed to initialise application state");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("failed to run database migrations");

    tracing::info!("database migrations applied");

    // Pending outbox rows are retried in the background until they resolve.
    services::outbox_worker::spawn(
        app_state.db_pool.clone(),
        app_state.outbox_repo.clone(),
        app_state.sms_provider.clone(),
        app_state.outbox_poll_interval,
    );

    // Public: login, logout and the customer-facing tracking lookup.
    let public_routes = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/track/{token}", get(handlers::tracking::track_repair));

    // Everything the shop staff touches sits behind the operation session.
    let operation_routes = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route(
            "/users",
            post(handlers::users::create_user).get(handlers::users::list_users),
        )
        .route("/users/{id}", patch(handlers::users::update_user))
        .route(
            "/clients",
            post(handlers::masterdata::create_client).get(handlers::masterdata::list_clients),
        )
        .route(
            "/clients/{id}",
            get(handlers::masterdata::get_client)
                .patch(handlers::masterdata::update_client)
                .delete(handlers::masterdata::delete_client),
        )
        .route(
            "/brands",
            post(handlers::masterdata::create_brand).get(handlers::masterdata::list_brands),
        )
        .route(
            "/brands/{id}",
            patch(handlers::masterdata::update_brand).delete(handlers::masterdata::delete_brand),
        )
        .route(
            "/stores",
            post(handlers::masterdata::create_store).get(handlers::masterdata::list_stores),
        )
        .route(
            "/stores/{id}",
            patch(handlers::masterdata::update_store).delete(handlers::masterdata::delete_store),
        )
        .route(
            "/repair-types",
            post(handlers::masterdata::create_repair_type)
                .get(handlers::masterdata::list_repair_types),
        )
        .route(
            "/repair-types/{id}",
            patch(handlers::masterdata::update_repair_type)
                .delete(handlers::masterdata::delete_repair_type),
        )
        .route(
            "/repairs",
            post(handlers::repairs::create_repair).get(handlers::repairs::list_repairs),
        )
        .route(
            "/repairs/{id}",
            get(handlers::repairs::get_repair)
                .patch(handlers::repairs::update_repair)
                .delete(handlers::repairs::delete_repair),
        )
        .route(
            "/repairs/{id}/reminder",
            post(handlers::repairs::send_delivery_reminder),
        )
        .route("/sms", get(handlers::sms::list_sms))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            operation_guard,
        ));

    // The accounting portal only reads; its session cookie is disjoint from
    // the operation one.
    let accounting_routes = Router::new()
        .route("/reports/income", get(handlers::reports::income_report))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            accounting_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .nest("/api", public_routes)
        .nest("/api", operation_routes)
        .nest("/accounting-api", accounting_routes)
        .with_state(app_state.clone());

    let listener = TcpListener::bind(&app_state.bind_addr)
        .await
        .expect("failed to bind TCP listener");
    tracing::info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("server error");
}
