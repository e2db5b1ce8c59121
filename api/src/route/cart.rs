use axum::{
    routing::{delete, get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::cart::{add_cart_line, confirm_cart, empty_cart, remove_cart_line, show_cart};

pub fn build_cart_routers() -> Router<AppRegistry> {
    let cart_routers = Router::new()
        .route("/:user_id", get(show_cart))
        .route("/:user_id", delete(empty_cart))
        .route("/:user_id/lines", post(add_cart_line))
        .route("/:user_id/lines/:line_id", delete(remove_cart_line))
        .route("/:user_id/confirm", post(confirm_cart));

    Router::new().nest("/cart", cart_routers)
}
