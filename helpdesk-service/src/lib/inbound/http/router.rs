use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::assign_work_order::assign_work_order;
use super::handlers::create_work_order::create_work_order;
use super::handlers::finalize_work_order::finalize_work_order;
use super::handlers::get_work_order::get_work_order;
use super::handlers::list_work_orders::list_work_orders;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::me::me;
use super::handlers::refresh::refresh;
use super::handlers::revoke_session::revoke_session;
use super::handlers::take_work_order::take_work_order;
use super::middleware::authenticate as auth_middleware;
use super::middleware::require_admin;
use crate::domain::session::service::SessionService;
use crate::domain::work_order::service::WorkOrderService;
use crate::outbound::repositories::PostgresSessionStore;
use crate::outbound::repositories::PostgresUserRepository;
use crate::outbound::repositories::PostgresWorkOrderRepository;

pub type HelpdeskSessionService = SessionService<PostgresUserRepository, PostgresSessionStore>;
pub type HelpdeskWorkOrderService =
    WorkOrderService<PostgresWorkOrderRepository, PostgresUserRepository>;

#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<HelpdeskSessionService>,
    pub work_order_service: Arc<HelpdeskWorkOrderService>,
    pub user_repository: Arc<PostgresUserRepository>,
}

pub fn create_router(
    session_service: Arc<HelpdeskSessionService>,
    work_order_service: Arc<HelpdeskWorkOrderService>,
    user_repository: Arc<PostgresUserRepository>,
) -> Router {
    let state = AppState {
        session_service,
        work_order_service,
        user_repository,
    };

    // Logout resolves its own token so that it works without a live session.
    let public_routes = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/logout", post(logout));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(me))
        .route(
            "/api/workorders",
            get(list_work_orders).post(create_work_order),
        )
        .route("/api/workorders/:id", get(get_work_order))
        .route("/api/workorders/:id/take", patch(take_work_order))
        .route("/api/workorders/:id/finalize", patch(finalize_work_order))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Layers run bottom-up: authentication first, then the admin check.
    let admin_routes = Router::new()
        .route("/api/admin/users/:user_id/session", delete(revoke_session))
        .route("/api/admin/workorders/:id/assign", patch(assign_work_order))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            // Headers stay out of the span: they carry bearer tokens.
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
