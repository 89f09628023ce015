use serde::{Deserialize, Serialize};

use crate::models::ReservationStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationInput {
    pub product_id: i64,
    pub business_id: i64,
    pub quantity: i32,
}

/// Status filter accepted by the list operations. `None` means every status.
pub type StatusFilter = Option<ReservationStatus>;
