//! Common error infrastructure for survivor-core.
//!
//! Domain errors ([`NavError`], [`crate::path::PathError`]) live next to the
//! components that raise them. All of them implement [`GameError`] so callers
//! can classify failures without matching on every variant.
//!
//! None of the navigation failures are fatal: a missing path or an unready
//! grid leaves the agent standing still for a tick.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the condition may clear by itself on a later tick
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistencies that require investigation
/// - **Fatal**: unrecoverable errors indicating corrupted state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Examples: goal enclosed by walls, search budget exhausted.
    Recoverable,

    /// Examples: collision layer with the wrong dimensions.
    Validation,

    /// Examples: grid queried before the level finished loading.
    Internal,

    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all survivor-core errors.
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors raised while building or accessing the navigation grid.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    /// The level context has no grid yet (map still loading or torn down).
    #[error("navigation grid is not ready")]
    NotReady,

    #[error(
        "collision layer `{layer}` is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}"
    )]
    LayerSizeMismatch {
        layer: String,
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },

    #[error("ascii grid row {row} has {actual} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

impl GameError for NavError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotReady => ErrorSeverity::Internal,
            Self::LayerSizeMismatch { .. } | Self::EmptyGrid { .. } | Self::RaggedRow { .. } => {
                ErrorSeverity::Validation
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotReady => "NAV_NOT_READY",
            Self::LayerSizeMismatch { .. } => "NAV_LAYER_SIZE_MISMATCH",
            Self::EmptyGrid { .. } => "NAV_EMPTY_GRID",
            Self::RaggedRow { .. } => "NAV_RAGGED_ROW",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nav_errors_classify_by_cause() {
        assert_eq!(NavError::NotReady.severity(), ErrorSeverity::Internal);
        assert!(NavError::NotReady.severity().is_internal());

        let mismatch = NavError::LayerSizeMismatch {
            layer: "walls".into(),
            expected_width: 40,
            expected_height: 20,
            actual_width: 20,
            actual_height: 10,
        };
        assert_eq!(mismatch.severity(), ErrorSeverity::Validation);
        assert_eq!(mismatch.error_code(), "NAV_LAYER_SIZE_MISMATCH");
        assert_eq!(
            mismatch.to_string(),
            "collision layer `walls` is 20x10, expected 40x20"
        );
    }
}
