use std::sync::Arc;

use adapter::database::ConnectionPool;
use adapter::repository::{
    health::HealthCheckRepositoryImpl, reservation::ReservationRepositoryImpl,
};
use kernel::model::schedule::SlotTable;
use kernel::repository::{health::HealthCheckRepository, reservation::ReservationRepository};
use shared::{config::AppConfig, error::AppResult};

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    reservation_repository: Arc<dyn ReservationRepository>,
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool, app_config: AppConfig) -> AppResult<Self> {
        // スロット表はここで一度だけ構築し、すべての経路で同じものを使う
        let slot_table = Arc::new(SlotTable::new(app_config.venue.utc_offset_hours)?);
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        let reservation_repository =
            Arc::new(ReservationRepositoryImpl::new(pool.clone(), slot_table));
        Ok(Self {
            health_check_repository,
            reservation_repository,
        })
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn reservation_repository(&self) -> Arc<dyn ReservationRepository> {
        self.reservation_repository.clone()
    }
}
