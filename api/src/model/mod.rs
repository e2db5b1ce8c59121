pub mod availability;
pub mod cart;
pub mod plan;
pub mod reservation;
