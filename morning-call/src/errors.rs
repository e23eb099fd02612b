use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::reason::NgReason;

/// Sentinel failures surfaced by the in-memory repositories.
///
/// Repositories never apply business rules, so this set stays small. Use cases
/// translate these into a [`DomainError`] before returning to their caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    /// No record is stored under the requested key.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A record already occupies the key (primary id, pair, or unique email).
    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: &'static str, key: String },

    /// The caller handed the repository something it cannot store.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// The operation was cancelled before it acquired the repository lock.
    #[error("operation cancelled")]
    Cancelled,
}

impl RepoError {
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn already_exists(entity: &'static str, key: impl fmt::Display) -> Self {
        Self::AlreadyExists {
            entity,
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failure taxonomy exposed to hosting layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    Validation,
    Authorization,
    Conflict,
    Internal,
    BadRequest,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::Authorization => "AUTHORIZATION",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Internal => "INTERNAL",
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::Cancelled => "CANCELLED",
        }
    }

    /// HTTP-equivalent status code for a transport layer.
    ///
    /// `Cancelled` uses 499, the conventional "client closed request" code.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Validation | ErrorKind::BadRequest => 400,
            ErrorKind::Authorization => 403,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
            ErrorKind::Cancelled => 499,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure returned by every use-case operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message}")]
pub struct DomainError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

impl DomainError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.details.insert(key.into(), value.to_string());
        self
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(ErrorKind::NotFound, format!("{resource} not found")).with_detail("resource", resource)
    }

    pub fn validation(field: &str, reason: &str) -> Self {
        Self::new(ErrorKind::Validation, format!("validation failed for {field}: {reason}"))
            .with_detail("field", field)
            .with_detail("reason", reason)
    }

    pub fn authorization(action: &str) -> Self {
        Self::new(ErrorKind::Authorization, format!("not authorized to {action}")).with_detail("action", action)
    }

    pub fn conflict(resource: &str) -> Self {
        Self::new(ErrorKind::Conflict, format!("{resource} already exists")).with_detail("resource", resource)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "operation cancelled")
    }

    /// Wraps a business-rule rejection reported by an entity predicate.
    pub fn rejected(reason: NgReason, action: &str) -> Self {
        Self::new(reason.kind(), format!("{action} rejected: {reason}"))
            .with_detail("action", action)
            .with_detail("reason", reason.code())
    }

    pub fn reason_code(&self) -> Option<&str> {
        self.details.get("reason").map(String::as_str)
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    pub fn is_conflict(&self) -> bool {
        self.kind == ErrorKind::Conflict
    }

    pub fn is_validation(&self) -> bool {
        self.kind == ErrorKind::Validation
    }

    pub fn is_authorization(&self) -> bool {
        self.kind == ErrorKind::Authorization
    }
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { entity, id } => DomainError::not_found(entity).with_detail("id", id),
            RepoError::AlreadyExists { entity, key } => DomainError::conflict(entity).with_detail("key", key),
            RepoError::InvalidRequest { message } => DomainError::bad_request(message),
            RepoError::Cancelled => DomainError::cancelled(),
        }
    }
}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let summary = err
            .issues
            .iter()
            .map(|issue| format!("{}: {}", issue.field, issue.reason))
            .collect::<Vec<_>>()
            .join("; ");
        err.issues.iter().fold(
            DomainError::new(ErrorKind::Validation, format!("validation failed: {summary}")),
            |domain, issue| domain.with_detail(issue.field, issue.reason.code()),
        )
    }
}

/// Every field a registration failed on.
#[derive(Debug, Error)]
#[error("validation errors: {issues:?}")]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        Self {
            issues: issues.into_iter().collect(),
        }
    }
}

/// A refused input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub reason: NgReason,
}

impl ValidationIssue {
    pub fn from_reason(field: &'static str, reason: NgReason) -> Self {
        Self { field, reason }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;
