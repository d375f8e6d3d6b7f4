//! Dashboard aggregation and fetch-cycle state handling.

pub mod aggregator;
pub mod controller;

pub use aggregator::fetch_dashboard;
pub use controller::{DashboardController, FetchState};
