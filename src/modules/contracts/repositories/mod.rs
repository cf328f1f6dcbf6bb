mod contract_repository;

pub use contract_repository::{ContractRepository, MySqlContractRepository};
