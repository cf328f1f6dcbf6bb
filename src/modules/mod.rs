pub mod contracts;
pub mod health;
pub mod installments;
pub mod payments;
pub mod reports;
