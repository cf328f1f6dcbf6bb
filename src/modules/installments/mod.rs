// Installments module

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Installment, InstallmentKind, InstallmentStatus};
pub use repositories::InstallmentRepository;
pub use services::{ScheduleGenerator, ScheduleService};
