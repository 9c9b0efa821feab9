use axum::{Router, routing::get};

use crate::modules::announcements::controller::{
    create_announcement, delete_announcement, get_announcement, get_announcements,
    update_announcement,
};
use crate::state::AppState;

pub fn init_announcements_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_announcements).post(create_announcement))
        .route("/{id}", get(get_announcement).put(update_announcement).delete(delete_announcement))
}
