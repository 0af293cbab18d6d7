use std::sync::Arc;
use uuid::Uuid;
use validator::{Validate, ValidateUrl};

use crate::auth::UserRole;
use crate::models::{BookingWithCar, Car, CarData, CarFilter, DashboardData, NewCar, UserProfile};
use crate::services::ServiceError;
use crate::store::Store;

/// Owner-facing account and listing management.
#[derive(Clone)]
pub struct OwnerService {
    store: Arc<dyn Store>,
}

impl OwnerService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn change_role_to_owner(&self, user: &UserProfile) -> Result<(), ServiceError> {
        self.store.set_user_role(user.id, UserRole::Owner).await?;
        tracing::info!(user_id = %user.id, "user upgraded to owner");
        Ok(())
    }

    #[tracing::instrument(skip(self, user, data), fields(user_id = %user.id))]
    pub async fn add_car(&self, user: &UserProfile, data: CarData) -> Result<Car, ServiceError> {
        if !user.is_owner() {
            return Err(ServiceError::Unauthorized);
        }
        data.validate()?;

        let car = self
            .store
            .insert_car(NewCar {
                owner: user.id,
                data,
            })
            .await?;

        tracing::info!(car_id = %car.id, "car listed");
        Ok(car)
    }

    pub async fn owner_cars(&self, user: &UserProfile) -> Result<Vec<Car>, ServiceError> {
        Ok(self.store.list_cars(CarFilter::owned_by(user.id)).await?)
    }

    pub async fn toggle_car_availability(
        &self,
        user: &UserProfile,
        car_id: Uuid,
    ) -> Result<Car, ServiceError> {
        let mut car = self.owned_car(user, car_id).await?;
        car.is_available = !car.is_available;
        self.store.update_car(&car).await?;
        Ok(car)
    }

    /// Unlists a car. The record stays so existing bookings still resolve it.
    pub async fn remove_car(&self, user: &UserProfile, car_id: Uuid) -> Result<(), ServiceError> {
        let mut car = self.owned_car(user, car_id).await?;
        car.owner = None;
        car.is_available = false;
        self.store.update_car(&car).await?;
        tracing::info!(%car_id, "car removed");
        Ok(())
    }

    pub async fn dashboard(&self, user: &UserProfile) -> Result<DashboardData, ServiceError> {
        if !user.is_owner() {
            return Err(ServiceError::Unauthorized);
        }

        let cars = self.store.list_cars(CarFilter::owned_by(user.id)).await?;
        let bookings = self
            .store
            .bookings_for_owner(user.id)
            .await?
            .into_iter()
            .map(BookingWithCar::from)
            .collect();

        Ok(DashboardData::summarize(&cars, bookings))
    }

    pub async fn update_image(&self, user: &UserProfile, image: &str) -> Result<(), ServiceError> {
        if !image.validate_url() {
            return Err(ServiceError::Validation("Image must be a valid URL".to_string()));
        }
        self.store.set_user_image(user.id, image).await?;
        Ok(())
    }

    async fn owned_car(&self, user: &UserProfile, car_id: Uuid) -> Result<Car, ServiceError> {
        let car = self
            .store
            .find_car(car_id)
            .await?
            .ok_or(ServiceError::NotFound("Car"))?;

        if car.owner != Some(user.id) {
            return Err(ServiceError::Unauthorized);
        }
        Ok(car)
    }
}
