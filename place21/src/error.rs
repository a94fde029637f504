//!
//! # Placement Result and Error Types
//!

// Local Imports
use crate::solver::SolveStatus;
use crate::utils::{self, ErrorContext};

/// # [PlaceError] Result Type
pub type PlaceResult<T> = Result<T, PlaceError>;

///
/// # Placement Error Enumeration
///
pub enum PlaceError {
    /// Lookup of a named master, template, instance, or pin failed
    NotFound { kind: &'static str, name: String },
    /// Invalid configuration, e.g. an undersized big-M
    Config(String),
    /// The solver did not return an optimal solution
    Solver(SolveStatus),
    /// Failed placement-legality check
    Validation(String),
    /// Error importing a circuit description
    Import {
        message: String,
        stack: Vec<ErrorContext>,
    },
    /// Boxed External Errors
    Boxed(Box<dyn std::error::Error + Send + Sync>),
    /// Uncategorized Error, with String Message
    Str(String),
}
impl PlaceError {
    /// Create a [PlaceError::Str] from anything String-convertible
    pub fn msg(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }
    /// Create a [PlaceError::NotFound]
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
    /// Create an error-variant [Result] of our [PlaceError::Str] variant
    pub fn fail<T>(s: impl Into<String>) -> Result<T, Self> {
        Err(Self::msg(s))
    }
}
impl std::fmt::Debug for PlaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PlaceError::NotFound { kind, name } => write!(f, "{} not found: {}", kind, name),
            PlaceError::Config(msg) => write!(f, "Configuration Error: {}", msg),
            PlaceError::Solver(status) => {
                write!(f, "Solver returned non-optimal status {}", status)
            }
            PlaceError::Validation(msg) => write!(f, "Placement Validation Error: {}", msg),
            PlaceError::Import { message, stack } => {
                write!(f, "Import Error: \n - {} \n - {:?}", message, stack)
            }
            PlaceError::Boxed(err) => write!(f, "{}", err),
            PlaceError::Str(err) => write!(f, "{}", err),
        }
    }
}
impl std::fmt::Display for PlaceError {
    /// Delegates to the [Debug] implementation
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
impl std::error::Error for PlaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Boxed(e) => Some(&**e),
            _ => None,
        }
    }
}
impl From<String> for PlaceError {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}
impl From<&str> for PlaceError {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}
impl From<utils::ser::Error> for PlaceError {
    fn from(e: utils::ser::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
