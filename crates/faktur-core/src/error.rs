use thiserror::Error;

/// Rejected user input. Raised before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("template name is required")]
    NameRequired,
    #[error("start date is required")]
    StartDateRequired,
    #[error("end date must not be before start date")]
    EndBeforeStart,
    #[error("customer is required")]
    CustomerRequired,
}

/// Import payload could not be understood; storage is left untouched.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("import payload is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("import payload must be a JSON array of invoices")]
    NotAnArray,
    #[error("invoice at index {index} is invalid: {source}")]
    InvalidEntry {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}
