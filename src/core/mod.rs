// Core scoring exports
pub mod assembler;
pub mod form;
pub mod scorer;

pub use assembler::assemble_features;
pub use form::{form_layout, loan_percent_income, one_hot, ApplicantForm, LOAN_PERCENT_INCOME};
pub use scorer::Scorer;
