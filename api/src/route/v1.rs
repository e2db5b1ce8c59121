use super::{
    availability::build_availability_routers, cart::build_cart_routers,
    health::build_health_check_routers, plan::build_plan_routers,
    reservation::build_reservation_routers,
};
use axum::Router;
use registry::AppRegistry;

pub fn routes() -> Router<AppRegistry> {
    let router = Router::new()
        .merge(build_health_check_routers())
        .merge(build_cart_routers())
        .merge(build_reservation_routers())
        .merge(build_availability_routers())
        .merge(build_plan_routers());
    Router::new().nest("/api/v1", router)
}
