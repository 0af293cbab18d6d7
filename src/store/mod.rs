// Persistence for users, cars and bookings

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::UserRole;
use crate::models::{
    Booking, BookingStatus, BookingWithCar, Car, CarFilter, NewBooking, NewCar, NewUser,
    OwnerBooking, User,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0} already exists")]
    Conflict(&'static str),
    #[error("Car is already booked for the selected dates")]
    Overlap,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Store state is unavailable")]
    Poisoned,
}

/// Record storage used by every service. Implementations must make
/// `insert_booking` atomic with respect to overlapping bookings on the same car.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn set_user_role(&self, id: Uuid, role: UserRole) -> Result<(), StoreError>;
    async fn set_user_image(&self, id: Uuid, image: &str) -> Result<(), StoreError>;

    async fn insert_car(&self, car: NewCar) -> Result<Car, StoreError>;
    async fn find_car(&self, id: Uuid) -> Result<Option<Car>, StoreError>;
    async fn list_cars(&self, filter: CarFilter) -> Result<Vec<Car>, StoreError>;
    /// Persists the mutable listing fields: owner and availability flag.
    async fn update_car(&self, car: &Car) -> Result<(), StoreError>;

    /// Number of bookings on `car` whose dates overlap the inclusive range.
    async fn count_overlapping_bookings(
        &self,
        car: Uuid,
        pickup_date: NaiveDate,
        return_date: NaiveDate,
    ) -> Result<i64, StoreError>;
    /// Inserts with status pending, or fails with `StoreError::Overlap`.
    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, StoreError>;
    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;
    async fn set_booking_status(&self, id: Uuid, status: &BookingStatus)
        -> Result<(), StoreError>;
    /// Newest first.
    async fn bookings_for_user(&self, user: Uuid) -> Result<Vec<BookingWithCar>, StoreError>;
    /// Newest first.
    async fn bookings_for_owner(&self, owner: Uuid) -> Result<Vec<OwnerBooking>, StoreError>;
}
