use crate::model::id::{ProviderId, ServiceId};
use rust_decimal::Decimal;

/// Read model of a bookable service, owned by the catalog subsystem.
/// The engine only ever reads these.
#[derive(Debug, Clone)]
pub struct ServiceSummary {
    pub service_id: ServiceId,
    pub service_name: String,
    pub provider_id: ProviderId,
    pub capacity: i32,
    pub reference_price: Decimal,
    pub is_active: bool,
}
