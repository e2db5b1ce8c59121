pub mod availability;
pub mod health;
pub mod plan;
pub mod reservation;
pub mod service;
