use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Car;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CarsResponse {
    pub success: bool,
    pub cars: Vec<Car>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarIdRequest {
    pub car_id: Uuid,
}
