// API routes and handlers

pub mod bookings;
pub mod health;
pub mod owner;
pub mod responses;
pub mod routes;
pub mod user;
