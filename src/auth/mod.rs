use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod jwt;
#[cfg(test)]
pub mod memory_repo;
pub mod middleware;
pub mod password;
pub mod repo;
pub mod repo_types;

/// Routes mounted under `/api/auth`. Everything except register and login
/// sits behind the auth gate.
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::account_routes(state))
}
