//! # Error Types
//!
//! Domain-specific error types for resale-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  resale-core errors (this file)                                        │
//! │  ├── CalcError        - "Not computable" outcomes of a calculation     │
//! │  └── ValidationError  - Master data / input validation failures        │
//! │                                                                         │
//! │  resale-data errors (separate crate)                                   │
//! │  └── DataError        - File, JSON and TOML loading failures           │
//! │                                                                         │
//! │  Flow: ValidationError → CalcError → caller suppresses the figure      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. The engine never panics; every failure is a returned value
//! 2. A missing field and a degenerate result are both "not computable"
//! 3. "No eligible shipping rule" is NOT an error (see `shipping`)

use thiserror::Error;

// =============================================================================
// Calculation Error
// =============================================================================

/// Why a calculation produced no figure.
///
/// ## User Workflow
/// ```text
/// User clears the cost field
///      │
///      ▼
/// evaluate(...) → Err(MissingInput { field: "cost" })
///      │
///      ▼
/// UI hides the profit panel and shows "complete the input"
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// A required input is unset. No default is substituted.
    #[error("{field} is required")]
    MissingInput { field: String },

    /// Exchange rate is zero, negative or non-finite.
    #[error("Exchange rate must be a positive finite number, got {rate}")]
    InvalidExchangeRate { rate: f64 },

    /// Percentage fees (plus margin and conversion fee) consume the whole
    /// selling price, so no price can cover the landed cost.
    #[error("Fees take {fee_share_percent:.2}% of revenue; no price can cover costs")]
    FeesExceedRevenue { fee_share_percent: f64 },

    /// An output came out NaN or infinite.
    #[error("{quantity} is not a finite number")]
    NonFinite { quantity: String },

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CalcError {
    /// Creates a MissingInput error for the named field.
    pub fn missing(field: impl Into<String>) -> Self {
        CalcError::MissingInput {
            field: field.into(),
        }
    }

    /// True when the user simply has not filled everything in yet.
    ///
    /// Callers suppress the figure either way; this only picks the prompt.
    pub fn is_missing_input(&self) -> bool {
        matches!(self, CalcError::MissingInput { .. })
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised while checking master data (rate tables, category fees) and
/// user-entered numbers before any arithmetic runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Invalid format (e.g. a malformed dimension string).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g. duplicate category label).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CalcError.
pub type CalcResult<T> = Result<T, CalcError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(CalcError::missing("cost").to_string(), "cost is required");
        assert_eq!(
            CalcError::FeesExceedRevenue {
                fee_share_percent: 102.2
            }
            .to_string(),
            "Fees take 102.20% of revenue; no price can cover costs"
        );
        assert_eq!(
            CalcError::NonFinite {
                quantity: "breakEvenUSD".to_string()
            }
            .to_string(),
            "breakEvenUSD is not a finite number"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::OutOfRange {
            field: "percent".to_string(),
            min: 0.0,
            max: 100.0,
            value: 120.0,
        };
        assert_eq!(err.to_string(), "percent must be between 0 and 100, got 120");

        let err = ValidationError::Duplicate {
            field: "label".to_string(),
            value: "Books".to_string(),
        };
        assert_eq!(err.to_string(), "label 'Books' already exists");
    }

    #[test]
    fn test_validation_converts_to_calc_error() {
        let validation_err = ValidationError::Required {
            field: "method".to_string(),
        };
        let calc_err: CalcError = validation_err.into();
        assert!(matches!(calc_err, CalcError::Validation(_)));
        assert!(!calc_err.is_missing_input());
        assert!(CalcError::missing("rate").is_missing_input());
    }
}
