use axum::{
    routing::{post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::plan::{enroll_in_plan, materialize_enrollment, update_enrollment_status};

pub fn build_plan_routers() -> Router<AppRegistry> {
    let plan_routers = Router::new().route("/:plan_id/enrollments", post(enroll_in_plan));

    let enrollment_routers = Router::new()
        .route("/:enrollment_id/status", put(update_enrollment_status))
        .route("/:enrollment_id/materialize", post(materialize_enrollment));

    Router::new()
        .nest("/plans", plan_routers)
        .nest("/enrollments", enrollment_routers)
}
