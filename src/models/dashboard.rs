use serde::Serialize;

use super::{BookingStatus, BookingWithCar, Car};

const RECENT_BOOKINGS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub total_cars: usize,
    pub total_bookings: usize,
    pub pending_bookings: usize,
    pub completed_bookings: usize,
    pub recent_bookings: Vec<BookingWithCar>,
    pub monthly_revenue: f64,
}

impl DashboardData {
    /// Aggregates an owner's cars and bookings. `bookings` must be newest first.
    pub fn summarize(cars: &[Car], bookings: Vec<BookingWithCar>) -> Self {
        let pending_bookings = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Pending)
            .count();
        let completed_bookings = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Confirmed)
            .count();
        let monthly_revenue = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Confirmed)
            .map(|b| b.price)
            .sum();
        let total_bookings = bookings.len();
        let recent_bookings = bookings.into_iter().take(RECENT_BOOKINGS).collect();

        Self {
            total_cars: cars.len(),
            total_bookings,
            pending_bookings,
            completed_bookings,
            recent_bookings,
            monthly_revenue,
        }
    }
}
