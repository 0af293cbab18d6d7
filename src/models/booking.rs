use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{Car, UserProfile};

/// Booking status. Owners may set any string; the well-known values get
/// their own variants.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Other(String),
}

impl BookingStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Other(status) => status,
        }
    }
}

impl From<String> for BookingStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "pending" => BookingStatus::Pending,
            "confirmed" => BookingStatus::Confirmed,
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Other(status),
        }
    }
}

impl From<&str> for BookingStatus {
    fn from(status: &str) -> Self {
        BookingStatus::from(status.to_string())
    }
}

impl From<BookingStatus> for String {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Other(status) => status,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub car: Uuid,
    pub user: Uuid,
    pub owner: Uuid,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// A booking ready to be stored; price and owner are already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub car: Uuid,
    pub user: Uuid,
    pub owner: Uuid,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub price: f64,
}

/// Booking joined with its car, as listed to the renter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingWithCar {
    pub id: Uuid,
    pub car: Car,
    pub user: Uuid,
    pub owner: Uuid,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl BookingWithCar {
    pub fn new(booking: Booking, car: Car) -> Self {
        Self {
            id: booking.id,
            car,
            user: booking.user,
            owner: booking.owner,
            pickup_date: booking.pickup_date,
            return_date: booking.return_date,
            price: booking.price,
            status: booking.status,
            created_at: booking.created_at,
        }
    }
}

impl From<OwnerBooking> for BookingWithCar {
    fn from(booking: OwnerBooking) -> Self {
        Self {
            id: booking.id,
            car: booking.car,
            user: booking.user.id,
            owner: booking.owner,
            pickup_date: booking.pickup_date,
            return_date: booking.return_date,
            price: booking.price,
            status: booking.status,
            created_at: booking.created_at,
        }
    }
}

/// Booking joined with its car and renter, as listed to the car owner.
/// The renter carries no credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerBooking {
    pub id: Uuid,
    pub car: Car,
    pub user: UserProfile,
    pub owner: Uuid,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl OwnerBooking {
    pub fn new(booking: Booking, car: Car, user: UserProfile) -> Self {
        Self {
            id: booking.id,
            car,
            user,
            owner: booking.owner,
            pickup_date: booking.pickup_date,
            return_date: booking.return_date,
            price: booking.price,
            status: booking.status,
            created_at: booking.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub car: Uuid,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAvailabilityRequest {
    pub location: String,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusRequest {
    pub booking_id: Uuid,
    pub status: BookingStatus,
}

/// Whole days between pickup and return.
pub fn rental_days(pickup_date: NaiveDate, return_date: NaiveDate) -> i64 {
    (return_date - pickup_date).num_days()
}

pub fn rental_price(price_per_day: f64, days: i64) -> f64 {
    price_per_day * days as f64
}

/// Inclusive overlap test between two date ranges.
pub fn ranges_overlap(
    existing_pickup: NaiveDate,
    existing_return: NaiveDate,
    requested_pickup: NaiveDate,
    requested_return: NaiveDate,
) -> bool {
    existing_pickup <= requested_return && existing_return >= requested_pickup
}
