mod installment;

pub use installment::{Installment, InstallmentKind, InstallmentStatus};
