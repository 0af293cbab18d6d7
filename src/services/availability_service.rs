use chrono::NaiveDate;
use futures::future::try_join_all;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{Car, CarFilter};
use crate::services::ServiceError;
use crate::store::Store;

/// Answers whether cars are free for a date range.
#[derive(Clone)]
pub struct AvailabilityService {
    store: Arc<dyn Store>,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// True iff no booking on `car` overlaps the inclusive range.
    pub async fn is_car_available(
        &self,
        car: Uuid,
        pickup_date: NaiveDate,
        return_date: NaiveDate,
    ) -> Result<bool, ServiceError> {
        let conflicts = self
            .store
            .count_overlapping_bookings(car, pickup_date, return_date)
            .await?;

        Ok(conflicts == 0)
    }

    /// Listed cars at `location` with no booking overlapping the range.
    #[tracing::instrument(skip(self))]
    pub async fn available_cars(
        &self,
        location: &str,
        pickup_date: NaiveDate,
        return_date: NaiveDate,
    ) -> Result<Vec<Car>, ServiceError> {
        if pickup_date >= return_date {
            return Err(ServiceError::Validation("Invalid date range".to_string()));
        }

        let cars = self.store.list_cars(CarFilter::available_at(location)).await?;

        let checks = cars
            .iter()
            .map(|car| self.is_car_available(car.id, pickup_date, return_date));
        let free = try_join_all(checks).await?;

        let available: Vec<Car> = cars
            .into_iter()
            .zip(free)
            .filter_map(|(car, free)| free.then_some(car))
            .collect();

        tracing::debug!(count = available.len(), "availability search complete");
        Ok(available)
    }

    /// Every car currently listed for rent.
    pub async fn listed_cars(&self) -> Result<Vec<Car>, ServiceError> {
        Ok(self.store.list_cars(CarFilter::available()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserRole;
    use crate::models::{CarData, NewBooking, NewCar, NewUser};
    use crate::store::MemoryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn car_data(location: &str) -> CarData {
        CarData {
            brand: "Honda".to_string(),
            model: "Civic".to_string(),
            image: "https://cdn.example.com/cars/civic.png".to_string(),
            year: 2023,
            category: "Sedan".to_string(),
            seating_capacity: 5,
            fuel_type: "Petrol".to_string(),
            transmission: "Manual".to_string(),
            price_per_day: 40.0,
            location: location.to_string(),
            description: String::new(),
        }
    }

    async fn seeded() -> (Arc<MemoryStore>, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let owner = store
            .insert_user(NewUser {
                name: "Olive Owner".to_string(),
                email: "olive@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: UserRole::Owner,
            })
            .await
            .unwrap();
        (store, owner.id)
    }

    #[tokio::test]
    async fn test_overlapping_booking_makes_car_unavailable() {
        let (store, owner) = seeded().await;
        let car = store
            .insert_car(NewCar { owner, data: car_data("Denver") })
            .await
            .unwrap();
        store
            .insert_booking(NewBooking {
                car: car.id,
                user: owner,
                owner,
                pickup_date: date(2024, 5, 10),
                return_date: date(2024, 5, 12),
                price: 80.0,
            })
            .await
            .unwrap();

        let service = AvailabilityService::new(store);

        assert!(!service
            .is_car_available(car.id, date(2024, 5, 12), date(2024, 5, 14))
            .await
            .unwrap());
        assert!(service
            .is_car_available(car.id, date(2024, 5, 13), date(2024, 5, 14))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_available_cars_filters_location_flag_and_bookings() {
        let (store, owner) = seeded().await;
        let booked = store
            .insert_car(NewCar { owner, data: car_data("Denver") })
            .await
            .unwrap();
        let free = store
            .insert_car(NewCar { owner, data: car_data("Denver") })
            .await
            .unwrap();
        let mut unlisted = store
            .insert_car(NewCar { owner, data: car_data("Denver") })
            .await
            .unwrap();
        unlisted.is_available = false;
        store.update_car(&unlisted).await.unwrap();
        store
            .insert_car(NewCar { owner, data: car_data("Boulder") })
            .await
            .unwrap();
        store
            .insert_booking(NewBooking {
                car: booked.id,
                user: owner,
                owner,
                pickup_date: date(2024, 7, 1),
                return_date: date(2024, 7, 5),
                price: 160.0,
            })
            .await
            .unwrap();

        let service = AvailabilityService::new(store);
        let cars = service
            .available_cars("Denver", date(2024, 7, 3), date(2024, 7, 8))
            .await
            .unwrap();

        assert_eq!(cars.len(), 1);
        assert_eq!(cars[0].id, free.id);
    }

    #[tokio::test]
    async fn test_available_cars_rejects_inverted_range() {
        let (store, _) = seeded().await;
        let service = AvailabilityService::new(store);

        let result = service
            .available_cars("Denver", date(2024, 7, 8), date(2024, 7, 3))
            .await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}
