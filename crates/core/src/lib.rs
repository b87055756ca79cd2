//! Core business logic for crm-rs.

pub mod services;

pub use services::*;
