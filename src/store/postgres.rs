use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::auth::UserRole;
use crate::models::{
    Booking, BookingStatus, BookingWithCar, Car, CarFilter, NewBooking, NewCar, NewUser,
    OwnerBooking, User, UserProfile,
};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, image, created_at";
const CAR_COLUMNS: &str = "id, owner_id, brand, model, image, year, category, seating_capacity, \
     fuel_type, transmission, price_per_day, location, description, is_available, created_at";
const BOOKING_COLUMNS: &str =
    "id, car_id, user_id, owner_id, pickup_date, return_date, price, status, created_at";

/// SQLSTATE raised by the `bookings_no_overlap` exclusion constraint.
const EXCLUSION_VIOLATION: &str = "23P01";

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    image: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse().unwrap_or_default(),
            image: row.image,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct BookingRow {
    id: Uuid,
    car_id: Uuid,
    user_id: Uuid,
    owner_id: Uuid,
    pickup_date: NaiveDate,
    return_date: NaiveDate,
    price: f64,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id,
            car: row.car_id,
            user: row.user_id,
            owner: row.owner_id,
            pickup_date: row.pickup_date,
            return_date: row.return_date,
            price: row.price,
            status: BookingStatus::from(row.status),
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL-backed store. Overlap protection for bookings comes from the
/// `bookings_no_overlap` exclusion constraint.
#[derive(Debug, Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn cars_by_id(&self, ids: Vec<Uuid>) -> Result<HashMap<Uuid, Car>, StoreError> {
        let cars = sqlx::query_as::<_, Car>(&format!(
            "SELECT {CAR_COLUMNS} FROM cars WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.db)
        .await?;

        Ok(cars.into_iter().map(|car| (car.id, car)).collect())
    }

    async fn users_by_id(&self, ids: Vec<Uuid>) -> Result<HashMap<Uuid, User>, StoreError> {
        let users = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.db)
        .await?;

        Ok(users
            .into_iter()
            .map(|row| (row.id, User::from(row)))
            .collect())
    }

    async fn bookings_where(&self, column: &str, id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE {column} = $1 ORDER BY created_at DESC"
        ))
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }
}

fn map_write_error(err: sqlx::Error, entity: &'static str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(EXCLUSION_VIOLATION) {
            return StoreError::Overlap;
        }
        if db_err.is_unique_violation() {
            return StoreError::Conflict(entity);
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::NotFound("Referenced record");
        }
    }
    StoreError::Database(err)
}

fn ensure_updated(rows_affected: u64, entity: &'static str) -> Result<(), StoreError> {
    if rows_affected == 0 {
        return Err(StoreError::NotFound(entity));
    }
    Ok(())
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (id, name, email, password_hash, role, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await
        .map_err(|err| map_write_error(err, "Email"))?;

        Ok(row.into())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(User::from))
    }

    async fn set_user_role(&self, id: Uuid, role: UserRole) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(role.as_str())
            .execute(&self.db)
            .await?;

        ensure_updated(result.rows_affected(), "User")
    }

    async fn set_user_image(&self, id: Uuid, image: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET image = $2 WHERE id = $1")
            .bind(id)
            .bind(image)
            .execute(&self.db)
            .await?;

        ensure_updated(result.rows_affected(), "User")
    }

    async fn insert_car(&self, car: NewCar) -> Result<Car, StoreError> {
        let NewCar { owner, data } = car;
        let car = sqlx::query_as::<_, Car>(&format!(
            "INSERT INTO cars (
                id, owner_id, brand, model, image, year, category, seating_capacity,
                fuel_type, transmission, price_per_day, location, description, is_available, created_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, TRUE, $14)
             RETURNING {CAR_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(data.brand)
        .bind(data.model)
        .bind(data.image)
        .bind(data.year)
        .bind(data.category)
        .bind(data.seating_capacity)
        .bind(data.fuel_type)
        .bind(data.transmission)
        .bind(data.price_per_day)
        .bind(data.location)
        .bind(data.description)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await
        .map_err(|err| map_write_error(err, "Car"))?;

        Ok(car)
    }

    async fn find_car(&self, id: Uuid) -> Result<Option<Car>, StoreError> {
        let car = sqlx::query_as::<_, Car>(&format!("SELECT {CAR_COLUMNS} FROM cars WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(car)
    }

    async fn list_cars(&self, filter: CarFilter) -> Result<Vec<Car>, StoreError> {
        let cars = sqlx::query_as::<_, Car>(&format!(
            "SELECT {CAR_COLUMNS} FROM cars
             WHERE ($1::uuid IS NULL OR owner_id = $1)
               AND ($2::text IS NULL OR location = $2)
               AND (NOT $3 OR is_available)
             ORDER BY created_at DESC"
        ))
        .bind(filter.owner)
        .bind(filter.location)
        .bind(filter.available_only)
        .fetch_all(&self.db)
        .await?;

        Ok(cars)
    }

    async fn update_car(&self, car: &Car) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE cars SET owner_id = $2, is_available = $3 WHERE id = $1")
            .bind(car.id)
            .bind(car.owner)
            .bind(car.is_available)
            .execute(&self.db)
            .await?;

        ensure_updated(result.rows_affected(), "Car")
    }

    async fn count_overlapping_bookings(
        &self,
        car: Uuid,
        pickup_date: NaiveDate,
        return_date: NaiveDate,
    ) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bookings
             WHERE car_id = $1 AND pickup_date <= $3 AND return_date >= $2",
        )
        .bind(car)
        .bind(pickup_date)
        .bind(return_date)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "INSERT INTO bookings (id, car_id, user_id, owner_id, pickup_date, return_date, price, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(booking.car)
        .bind(booking.user)
        .bind(booking.owner)
        .bind(booking.pickup_date)
        .bind(booking.return_date)
        .bind(booking.price)
        .bind(BookingStatus::Pending.as_str())
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await
        .map_err(|err| map_write_error(err, "Booking"))?;

        Ok(row.into())
    }

    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Booking::from))
    }

    async fn set_booking_status(
        &self,
        id: Uuid,
        status: &BookingStatus,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE bookings SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.db)
            .await?;

        ensure_updated(result.rows_affected(), "Booking")
    }

    async fn bookings_for_user(&self, user: Uuid) -> Result<Vec<BookingWithCar>, StoreError> {
        let bookings = self.bookings_where("user_id", user).await?;
        let cars = self
            .cars_by_id(bookings.iter().map(|b| b.car).collect())
            .await?;

        bookings
            .into_iter()
            .map(|booking| {
                let car = cars.get(&booking.car).cloned().ok_or(StoreError::NotFound("Car"))?;
                Ok(BookingWithCar::new(booking, car))
            })
            .collect()
    }

    async fn bookings_for_owner(&self, owner: Uuid) -> Result<Vec<OwnerBooking>, StoreError> {
        let bookings = self.bookings_where("owner_id", owner).await?;
        let cars = self
            .cars_by_id(bookings.iter().map(|b| b.car).collect())
            .await?;
        let users = self
            .users_by_id(bookings.iter().map(|b| b.user).collect())
            .await?;

        bookings
            .into_iter()
            .map(|booking| {
                let car = cars.get(&booking.car).cloned().ok_or(StoreError::NotFound("Car"))?;
                let user = users
                    .get(&booking.user)
                    .cloned()
                    .map(UserProfile::from)
                    .ok_or(StoreError::NotFound("User"))?;
                Ok(OwnerBooking::new(booking, car, user))
            })
            .collect()
    }
}
