pub mod aggregate;
pub mod dataset;
pub mod filters;
pub mod metrics;
pub mod persist;
pub mod players;
pub mod records;
pub mod state;
