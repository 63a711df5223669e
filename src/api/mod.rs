//! Config API routes, mounted under `/api/gateway`.

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use crate::service::ConfigService;
use self::handlers::*;

pub const API_PREFIX: &str = "/api/gateway";

pub fn setup_api_router(service: ConfigService) -> Router {
    Router::new()
        .route("/conf/list", get(list_confs))
        .route("/conf", get(get_conf).post(create_conf).put(update_conf))
        .route("/apply", post(apply_changes))
        .route("/apply/status", get(apply_status))
        .with_state(service)
}
