pub mod availability;
pub mod cart;
pub mod health;
pub mod plan;
pub mod reservation;
pub mod v1;
