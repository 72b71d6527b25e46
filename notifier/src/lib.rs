pub mod admission;
pub mod error;
pub mod pushover;
pub mod quota;
pub mod sink;
