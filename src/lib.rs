//! Landledger Contract Servicing Platform Library
//!
//! This library provides the core functionality for servicing seller-financed
//! land sales: contracts for deed, their installment schedules, received
//! payments, and the reports the servicing desk works from.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

// Re-export commonly used types
pub use modules::contracts;
pub use modules::installments;
pub use modules::payments;
pub use modules::reports;
