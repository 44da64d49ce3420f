use std::fmt;

use thiserror::Error as ThisError;

use malman_data::{QueryError, Role};

/// A validation message for a single input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// All validation messages of a submitted form
#[derive(ThisError, Debug, Clone, Default, PartialEq, Eq)]
#[error("{}", join_errors(.0))]
pub struct FormErrors(pub Vec<FieldError>);

impl FormErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Ok if nothing was reported
    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[derive(ThisError, Debug)]
pub enum AccountingError {
    #[error("invalid input: {0}")]
    Invalid(#[from] FormErrors),

    #[error("transaction {0} was already filed")]
    AlreadyFiled(u32),

    #[error("transaction {0} is not filed yet")]
    NotFiled(u32),

    #[error("{0} needs the {1} privilege")]
    Forbidden(String, Role),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Error(anyhow::Error),
}

impl From<anyhow::Error> for AccountingError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<QueryError>() {
            Some(QueryError::NotFound) => AccountingError::NotFound(err.to_string()),
            _ => AccountingError::Error(err),
        }
    }
}

impl From<QueryError> for AccountingError {
    fn from(err: QueryError) -> Self {
        anyhow::Error::from(err).into()
    }
}
