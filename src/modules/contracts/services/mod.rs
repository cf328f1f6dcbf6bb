mod contract_importer;
mod contract_service;

pub use contract_importer::{ContractImporter, ContractRow, ImportSummary};
pub use contract_service::ContractService;
