use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod error;
pub mod handlers;
pub mod password;
pub mod rate_limit;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod session;
pub mod token;
pub mod validate;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}
