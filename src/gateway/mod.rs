//! Remote data gateway for the survey service.
//!
//! This module provides the typed HTTP access layer the dashboard is
//! built on.

pub mod client;

pub use client::{GatewayConfig, SurveyApi, SurveyGateway, TransportError};
