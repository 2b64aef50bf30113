use thiserror::Error;

/// Validation errors raised while turning user input into domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("company name or keyword cannot be empty")]
    EmptyCompany,

    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol contains whitespace at index {index}")]
    SymbolWhitespace { index: usize },

    #[error("invalid date '{value}', expected DD-MM-YYYY")]
    InvalidDate { value: String },
    #[error("date {value} cannot be expressed as a provider timestamp")]
    DateOutOfRange { value: String },
}
