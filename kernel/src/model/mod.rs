pub mod id;
pub mod plan;
pub mod reservation;
pub mod schedule;
pub mod service;
pub mod slot;
