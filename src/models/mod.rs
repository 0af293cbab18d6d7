// Domain records and wire shapes

pub mod booking;
pub mod car;
pub mod dashboard;
pub mod user;

pub use booking::*;
pub use car::*;
pub use dashboard::*;
pub use user::*;
