use garde::Validate;
use serde::Deserialize;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmCartRequest {
    #[garde(skip)]
    pub notes: Option<String>,
}
