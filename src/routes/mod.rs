pub mod donation;
pub mod health;
pub mod quiz;
pub mod vendor;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, MethodRouter},
    Router,
};

use crate::middleware::auth::{permissions, require_permission, PermissionGate};
use crate::middleware::rate_limit::{rps_middleware, RateLimiter};
use crate::AppState;

/// Wraps `route` so it only runs for principals holding `permission`.
fn guarded(
    state: &AppState,
    permission: &'static str,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(
        PermissionGate::new(state.jwt_secret.clone(), permission),
        require_permission,
    ))
}

/// Unauthenticated quiz game endpoints.
pub fn public_router(rps: u32) -> Router<AppState> {
    Router::new()
        .route("/api/quizzes", get(quiz::list_quizzes))
        .route("/api/start", post(quiz::start_quiz))
        .route("/api/submit", post(quiz::submit_quiz))
        .route("/api/leaderboard/:quiz_id", get(quiz::leaderboard))
        .layer(from_fn_with_state(RateLimiter::new(rps), rps_middleware))
}

/// Bearer-protected admin endpoints; each method carries its own permission.
pub fn admin_router(state: &AppState, rps: u32) -> Router<AppState> {
    use permissions::*;

    Router::new()
        .route(
            "/api/admin/quizzes",
            guarded(state, QUIZZES_WRITE, post(quiz::create_quiz)),
        )
        .route(
            "/api/admin/donations",
            guarded(state, DONATIONS_READ, get(donation::list_donations))
                .merge(guarded(state, DONATIONS_WRITE, post(donation::create_donation))),
        )
        .route(
            "/api/admin/donations/:id",
            guarded(state, DONATIONS_READ, get(donation::get_donation)).merge(guarded(
                state,
                DONATIONS_WRITE,
                axum::routing::patch(donation::update_donation)
                    .delete(donation::delete_donation),
            )),
        )
        .route(
            "/api/admin/donations/:id/history",
            guarded(state, DONATIONS_READ, get(donation::donation_history)),
        )
        .route(
            "/api/admin/vendors",
            guarded(state, VENDORS_READ, get(vendor::list_vendors))
                .merge(guarded(state, VENDORS_WRITE, post(vendor::create_vendor))),
        )
        .route(
            "/api/admin/vendors/:id",
            guarded(state, VENDORS_READ, get(vendor::get_vendor)).merge(guarded(
                state,
                VENDORS_WRITE,
                axum::routing::patch(vendor::update_vendor).delete(vendor::delete_vendor),
            )),
        )
        .route(
            "/api/admin/vendors/:id/history",
            guarded(state, VENDORS_READ, get(vendor::vendor_history)),
        )
        .layer(from_fn_with_state(RateLimiter::new(rps), rps_middleware))
}

pub fn app(state: AppState, public_rps: u32, admin_rps: u32) -> Router {
    let admin = admin_router(&state, admin_rps);
    Router::new()
        .route("/health", get(health::health))
        .merge(public_router(public_rps))
        .merge(admin)
        .with_state(state)
}
