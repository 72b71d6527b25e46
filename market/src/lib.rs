pub mod detector;
pub mod history;
pub mod pulse;
pub mod types;
