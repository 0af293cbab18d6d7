use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    rental_days, rental_price, Booking, BookingStatus, BookingWithCar, CreateBookingRequest,
    NewBooking, OwnerBooking, UserProfile,
};
use crate::services::ServiceError;
use crate::store::Store;

/// Booking creation, listing and status changes.
#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn Store>,
}

impl BookingService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Books a car for `user`. Price is fixed here from the car's daily rate
    /// and never recomputed. Fails with `Unavailable` if the dates collide
    /// with an existing booking at insert time.
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn create_booking(
        &self,
        user: &UserProfile,
        request: CreateBookingRequest,
    ) -> Result<Booking, ServiceError> {
        let car = self
            .store
            .find_car(request.car)
            .await?
            .ok_or(ServiceError::NotFound("Car"))?;

        // Removed listings keep their record but have no owner to book from.
        let owner = car.owner.ok_or(ServiceError::NotFound("Car"))?;

        let days = rental_days(request.pickup_date, request.return_date);
        if days <= 0 {
            return Err(ServiceError::Validation("Invalid date range".to_string()));
        }

        let booking = self
            .store
            .insert_booking(NewBooking {
                car: car.id,
                user: user.id,
                owner,
                pickup_date: request.pickup_date,
                return_date: request.return_date,
                price: rental_price(car.price_per_day, days),
            })
            .await
            .map_err(|err| {
                tracing::warn!(car_id = %car.id, error = %err, "booking rejected");
                ServiceError::from(err)
            })?;

        tracing::info!(booking_id = %booking.id, price = booking.price, "booking created");
        Ok(booking)
    }

    pub async fn user_bookings(&self, user: &UserProfile) -> Result<Vec<BookingWithCar>, ServiceError> {
        Ok(self.store.bookings_for_user(user.id).await?)
    }

    pub async fn owner_bookings(&self, user: &UserProfile) -> Result<Vec<OwnerBooking>, ServiceError> {
        if !user.is_owner() {
            return Err(ServiceError::Unauthorized);
        }

        Ok(self.store.bookings_for_owner(user.id).await?)
    }

    /// Overwrites the status of a booking owned by `user`. Any status string
    /// is accepted.
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn change_status(
        &self,
        user: &UserProfile,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<(), ServiceError> {
        let booking = self
            .store
            .find_booking(booking_id)
            .await?
            .ok_or(ServiceError::NotFound("Booking"))?;

        if booking.owner != user.id {
            tracing::warn!(%booking_id, "status change by non-owner rejected");
            return Err(ServiceError::Unauthorized);
        }

        self.store.set_booking_status(booking.id, &status).await?;
        Ok(())
    }
}
