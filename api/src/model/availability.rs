use chrono::{NaiveDate, NaiveTime};
use garde::Validate;
use kernel::model::id::{LineId, ServiceId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    #[garde(skip)]
    pub service_id: ServiceId,
    #[garde(skip)]
    pub date: NaiveDate,
    #[garde(skip)]
    pub end_date: Option<NaiveDate>,
    #[garde(skip)]
    pub start: NaiveTime,
    #[garde(skip)]
    pub end: NaiveTime,
    #[garde(skip)]
    pub exclude_line_id: Option<LineId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub available: bool,
    pub within_schedule: bool,
    pub overlapping: bool,
    pub capacity_left: bool,
}
