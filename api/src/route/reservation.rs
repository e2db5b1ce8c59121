use axum::{
    routing::{delete, get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::reservation::{
    create_reservation, delete_reservation, show_line, show_reservation, show_reservation_list,
    update_line_status, update_reservation, update_reservation_status,
};

pub fn build_reservation_routers() -> Router<AppRegistry> {
    let reservation_routers = Router::new()
        .route("/", post(create_reservation))
        .route("/", get(show_reservation_list))
        .route("/:reservation_id", get(show_reservation))
        .route("/:reservation_id", put(update_reservation))
        .route("/:reservation_id", delete(delete_reservation))
        .route("/:reservation_id/status", put(update_reservation_status));

    let line_routers = Router::new()
        .route("/:line_id", get(show_line))
        .route("/:line_id/status", put(update_line_status));

    Router::new()
        .nest("/reservations", reservation_routers)
        .nest("/lines", line_routers)
}
