use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: Uuid,
    /// `None` once the owner has removed the listing.
    #[sqlx(rename = "owner_id")]
    pub owner: Option<Uuid>,
    pub brand: String,
    pub model: String,
    pub image: String,
    pub year: i32,
    pub category: String,
    pub seating_capacity: i32,
    pub fuel_type: String,
    pub transmission: String,
    pub price_per_day: f64,
    pub location: String,
    pub description: String,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

/// Listing details supplied by an owner when adding a car.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CarData {
    #[validate(length(min = 1, message = "Brand is required"))]
    pub brand: String,
    #[validate(length(min = 1, message = "Model is required"))]
    pub model: String,
    #[validate(url(message = "Image must be a valid URL"))]
    pub image: String,
    #[validate(range(min = 1900, max = 2100, message = "Year is out of range"))]
    pub year: i32,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[validate(range(min = 1, message = "Seating capacity must be positive"))]
    pub seating_capacity: i32,
    #[validate(length(min = 1, message = "Fuel type is required"))]
    pub fuel_type: String,
    #[validate(length(min = 1, message = "Transmission is required"))]
    pub transmission: String,
    #[validate(range(exclusive_min = 0.0, message = "Price per day must be positive"))]
    pub price_per_day: f64,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewCar {
    pub owner: Uuid,
    pub data: CarData,
}

/// Selection criteria for car listings. Empty filter matches every car.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarFilter {
    pub owner: Option<Uuid>,
    pub location: Option<String>,
    pub available_only: bool,
}

impl CarFilter {
    pub fn owned_by(owner: Uuid) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }

    pub fn available() -> Self {
        Self {
            available_only: true,
            ..Self::default()
        }
    }

    pub fn available_at(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            available_only: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, car: &Car) -> bool {
        if self.available_only && !car.is_available {
            return false;
        }
        if let Some(owner) = self.owner {
            if car.owner != Some(owner) {
                return false;
            }
        }
        match &self.location {
            Some(location) => car.location == *location,
            None => true,
        }
    }
}
