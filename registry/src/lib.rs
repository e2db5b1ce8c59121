use std::sync::Arc;

use adapter::database::ConnectionPool;
use adapter::repository::availability::AvailabilityRepositoryImpl;
use adapter::repository::health::HealthCheckRepositoryImpl;
use adapter::repository::plan::PlanRepositoryImpl;
use adapter::repository::reservation::ReservationRepositoryImpl;
use adapter::repository::service::ServiceRepositoryImpl;
use kernel::repository::availability::AvailabilityRepository;
use kernel::repository::health::HealthCheckRepository;
use kernel::repository::plan::PlanRepository;
use kernel::repository::reservation::ReservationRepository;
use kernel::repository::service::ServiceRepository;

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    reservation_repository: Arc<dyn ReservationRepository>,
    availability_repository: Arc<dyn AvailabilityRepository>,
    service_repository: Arc<dyn ServiceRepository>,
    plan_repository: Arc<dyn PlanRepository>,
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool) -> Self {
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        let reservation_repository = Arc::new(ReservationRepositoryImpl::new(pool.clone()));
        let availability_repository = Arc::new(AvailabilityRepositoryImpl::new(pool.clone()));
        let service_repository = Arc::new(ServiceRepositoryImpl::new(pool.clone()));
        let plan_repository = Arc::new(PlanRepositoryImpl::new(pool.clone()));
        Self {
            health_check_repository,
            reservation_repository,
            availability_repository,
            service_repository,
            plan_repository,
        }
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn reservation_repository(&self) -> Arc<dyn ReservationRepository> {
        self.reservation_repository.clone()
    }

    pub fn availability_repository(&self) -> Arc<dyn AvailabilityRepository> {
        self.availability_repository.clone()
    }

    pub fn service_repository(&self) -> Arc<dyn ServiceRepository> {
        self.service_repository.clone()
    }

    pub fn plan_repository(&self) -> Arc<dyn PlanRepository> {
        self.plan_repository.clone()
    }
}
