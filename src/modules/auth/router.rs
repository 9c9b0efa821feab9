use axum::{
    Router,
    routing::{get, post, put},
};

use crate::modules::auth::controller::{change_password, login, me, update_profile};
use crate::state::AppState;

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/profile", put(update_profile))
        .route("/change-password", post(change_password))
}
