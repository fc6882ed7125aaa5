//! Document models and query DTOs.

pub mod coerce;
pub mod order;
pub mod paging;
pub mod user;
