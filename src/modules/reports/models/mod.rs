mod portfolio_report;

pub use portfolio_report::{InstallmentActivityRow, PortfolioRow};
