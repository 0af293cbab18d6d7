use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{Store, StoreError};
use crate::auth::UserRole;
use crate::models::{
    ranges_overlap, Booking, BookingStatus, BookingWithCar, Car, CarFilter, NewBooking, NewCar,
    NewUser, OwnerBooking, User, UserProfile,
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    cars: HashMap<Uuid, Car>,
    bookings: Vec<Booking>,
}

impl Tables {
    fn overlapping(&self, car: Uuid, pickup_date: NaiveDate, return_date: NaiveDate) -> usize {
        self.bookings
            .iter()
            .filter(|b| {
                b.car == car && ranges_overlap(b.pickup_date, b.return_date, pickup_date, return_date)
            })
            .count()
    }

    fn car_of(&self, booking: &Booking) -> Result<Car, StoreError> {
        self.cars
            .get(&booking.car)
            .cloned()
            .ok_or(StoreError::NotFound("Car"))
    }

    /// Bookings matching `keep`, newest first.
    fn newest_first(&self, keep: impl Fn(&Booking) -> bool) -> Vec<Booking> {
        // Reverse insertion order so ties on created_at still list the latest first.
        let mut bookings: Vec<Booking> =
            self.bookings.iter().rev().filter(|b| keep(b)).cloned().collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        bookings
    }
}

/// Process-local store. Every operation takes a single lock, so booking
/// insertion is atomic with its overlap check.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables()?;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("Email"));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            image: None,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.tables()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .tables()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn set_user_role(&self, id: Uuid, role: UserRole) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        let user = tables.users.get_mut(&id).ok_or(StoreError::NotFound("User"))?;
        user.role = role;
        Ok(())
    }

    async fn set_user_image(&self, id: Uuid, image: &str) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        let user = tables.users.get_mut(&id).ok_or(StoreError::NotFound("User"))?;
        user.image = Some(image.to_string());
        Ok(())
    }

    async fn insert_car(&self, car: NewCar) -> Result<Car, StoreError> {
        let NewCar { owner, data } = car;
        let car = Car {
            id: Uuid::new_v4(),
            owner: Some(owner),
            brand: data.brand,
            model: data.model,
            image: data.image,
            year: data.year,
            category: data.category,
            seating_capacity: data.seating_capacity,
            fuel_type: data.fuel_type,
            transmission: data.transmission,
            price_per_day: data.price_per_day,
            location: data.location,
            description: data.description,
            is_available: true,
            created_at: Utc::now(),
        };
        self.tables()?.cars.insert(car.id, car.clone());
        Ok(car)
    }

    async fn find_car(&self, id: Uuid) -> Result<Option<Car>, StoreError> {
        Ok(self.tables()?.cars.get(&id).cloned())
    }

    async fn list_cars(&self, filter: CarFilter) -> Result<Vec<Car>, StoreError> {
        let mut cars: Vec<Car> = self
            .tables()?
            .cars
            .values()
            .filter(|car| filter.matches(car))
            .cloned()
            .collect();
        cars.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cars)
    }

    async fn update_car(&self, car: &Car) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        let stored = tables.cars.get_mut(&car.id).ok_or(StoreError::NotFound("Car"))?;
        stored.owner = car.owner;
        stored.is_available = car.is_available;
        Ok(())
    }

    async fn count_overlapping_bookings(
        &self,
        car: Uuid,
        pickup_date: NaiveDate,
        return_date: NaiveDate,
    ) -> Result<i64, StoreError> {
        Ok(self.tables()?.overlapping(car, pickup_date, return_date) as i64)
    }

    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, StoreError> {
        let mut tables = self.tables()?;
        if !tables.cars.contains_key(&booking.car) {
            return Err(StoreError::NotFound("Car"));
        }
        if tables.overlapping(booking.car, booking.pickup_date, booking.return_date) > 0 {
            return Err(StoreError::Overlap);
        }

        let booking = Booking {
            id: Uuid::new_v4(),
            car: booking.car,
            user: booking.user,
            owner: booking.owner,
            pickup_date: booking.pickup_date,
            return_date: booking.return_date,
            price: booking.price,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        };
        tables.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        Ok(self.tables()?.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn set_booking_status(
        &self,
        id: Uuid,
        status: &BookingStatus,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        let booking = tables
            .bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(StoreError::NotFound("Booking"))?;
        booking.status = status.clone();
        Ok(())
    }

    async fn bookings_for_user(&self, user: Uuid) -> Result<Vec<BookingWithCar>, StoreError> {
        let tables = self.tables()?;
        tables
            .newest_first(|b| b.user == user)
            .into_iter()
            .map(|booking| {
                let car = tables.car_of(&booking)?;
                Ok(BookingWithCar::new(booking, car))
            })
            .collect()
    }

    async fn bookings_for_owner(&self, owner: Uuid) -> Result<Vec<OwnerBooking>, StoreError> {
        let tables = self.tables()?;
        tables
            .newest_first(|b| b.owner == owner)
            .into_iter()
            .map(|booking| {
                let car = tables.car_of(&booking)?;
                let user = tables
                    .users
                    .get(&booking.user)
                    .cloned()
                    .map(UserProfile::from)
                    .ok_or(StoreError::NotFound("User"))?;
                Ok(OwnerBooking::new(booking, car, user))
            })
            .collect()
    }
}
