mod contract;

pub use contract::{
    Contract, ContractStatus, DeedStatus, FinancingTerms, NewContract, SaleType,
};
