// Contracts module

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Contract, ContractStatus, DeedStatus, FinancingTerms, NewContract, SaleType};
pub use repositories::ContractRepository;
pub use services::{ContractImporter, ContractService};
